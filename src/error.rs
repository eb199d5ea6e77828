use std::fmt;

use thiserror::Error;

/// Which half of kernel preparation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelStage {
    /// Signature checked against the device limits.
    Compile,
    /// Signature bound to the allocated field layouts.
    Link,
}

impl fmt::Display for KernelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelStage::Compile => f.write_str("compile"),
            KernelStage::Link => f.write_str("link"),
        }
    }
}

/// Fatal solver errors. Each variant halts stepping; the host may re-initialize.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    #[error("kernel `{kernel}` failed at {stage} stage: {reason}")]
    InitializationFailure {
        kernel: &'static str,
        stage: KernelStage,
        reason: String,
    },
    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(String),
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Errors from reading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] FluidError),
}
