//! Metric samples and their Prometheus exposition.

use std::sync::Arc;

use prometheus::proto::{Gauge, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, TextEncoder};

use super::catalog::MetricDescriptor;
use crate::errors::{ExporterError, Result};

/// One gauge value of a metric family, produced fresh by each scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub descriptor: Arc<MetricDescriptor>,
    pub value: f64,
    /// Parallel to the descriptor's label names.
    pub label_values: Vec<String>,
}

impl MetricSample {
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .label_names()
            .iter()
            .position(|l| l == name)
            .and_then(|i| self.label_values.get(i))
            .map(String::as_str)
    }

    fn to_metric(&self) -> Metric {
        let labels: Vec<LabelPair> = self
            .descriptor
            .label_names()
            .iter()
            .zip(&self.label_values)
            .map(|(name, value)| {
                let mut pair = LabelPair::default();
                pair.set_name(name.clone());
                pair.set_value(value.clone());
                pair
            })
            .collect();

        let mut gauge = Gauge::default();
        gauge.set_value(self.value);

        let mut metric = Metric::default();
        metric.set_label(labels.into());
        metric.set_gauge(gauge);
        metric
    }
}

/// Groups consecutive samples of the same family into gauge families.
pub fn to_metric_families(samples: &[MetricSample]) -> Vec<MetricFamily> {
    let mut families: Vec<(Arc<MetricDescriptor>, Vec<Metric>)> = Vec::new();

    for sample in samples {
        match families.last_mut() {
            Some((descriptor, metrics)) if Arc::ptr_eq(descriptor, &sample.descriptor) => {
                metrics.push(sample.to_metric());
            }
            _ => families.push((sample.descriptor.clone(), vec![sample.to_metric()])),
        }
    }

    families
        .into_iter()
        .map(|(descriptor, metrics)| {
            let mut family = MetricFamily::default();
            family.set_name(descriptor.name().to_string());
            family.set_help(descriptor.help().to_string());
            family.set_field_type(MetricType::GAUGE);
            family.set_metric(metrics.into());
            family
        })
        .collect()
}

/// Renders families in the Prometheus text exposition format.
pub fn encode_text(families: &[MetricFamily]) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(families, &mut buffer)
        .map_err(|err| ExporterError::Encode(err.to_string()))?;

    String::from_utf8(buffer).map_err(|err| ExporterError::Encode(err.to_string()))
}
