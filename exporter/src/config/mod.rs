//! Central module for exporter configuration settings.
//!
//! The configuration is built once at process start by whatever front end
//! hosts the exporter (flags, environment, a file) and is then passed by
//! reference to the constructors that need it. Nothing in the core reads
//! the environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{ExporterError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Prefix of every exported metric name. May be empty.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// TLS certificate of the node's RPC listener.
    #[serde(default = "default_tls_cert_path")]
    pub tls_cert_path: PathBuf,

    /// Read-only macaroon presented on every call.
    #[serde(default)]
    pub macaroon_path: PathBuf,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive (`info`, `exporter=debug`, ...). `RUST_LOG` wins if set.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

fn default_namespace() -> String {
    "lnd".to_string()
}

fn default_rpc_host() -> String {
    "localhost".to_string()
}

fn default_rpc_port() -> u16 {
    10009
}

fn default_tls_cert_path() -> PathBuf {
    PathBuf::from("/root/.lnd/tls.cert")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            tls_cert_path: default_tls_cert_path(),
            macaroon_path: PathBuf::new(),
            log: LogConfig::default(),
        }
    }
}

impl ExporterConfig {
    /// Address of the node's gRPC listener.
    pub fn rpc_address(&self) -> String {
        format!("https://{}:{}", self.rpc_host, self.rpc_port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_host.trim().is_empty() {
            return Err(ExporterError::Config("rpc_host must not be empty".to_string()));
        }

        let mut chars = self.namespace.chars();
        let valid_namespace = match chars.next() {
            None => true,
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_' || first == ':')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
            }
        };
        if !valid_namespace {
            return Err(ExporterError::Config(format!(
                "namespace {:?} is not a valid metric name prefix",
                self.namespace
            )));
        }

        Ok(())
    }
}
