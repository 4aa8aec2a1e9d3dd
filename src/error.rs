use thiserror::Error;

use crate::shader::ShaderStage;

/// Failures surfaced by the core modules.
///
/// Every variant is fatal to the operation that produced it; callers may
/// retry after correcting the input, nothing is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// The named resource does not exist in the store.
    #[error("resource not found: {name}")]
    ResourceNotFound { name: String },

    /// The resource exists but could not be read.
    #[error("failed to read resource {name}")]
    ResourceIo {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A shader stage was rejected by the compiler.
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    /// The vertex/fragment pair does not form a valid program.
    #[error("shader program failed to link:\n{log}")]
    Link { log: String },

    /// A caller-supplied value is outside the accepted domain.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

impl Error {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
