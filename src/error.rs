use std::io;
use thiserror::Error;

/// Every way a run can fail before or while talking to Lambda.
/// All of them end the process with status 1.
/// A function that ran and reported an error is not one of these, see [crate::run::Outcome].
#[derive(Debug, Error)]
pub enum Error {
    #[error("function name must be specified")]
    MissingFunction,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("loading config: {0}")]
    Config(String),

    #[error("invoking {function}: {details}")]
    Invoke { function: String, details: String },

    #[error("err base64 decoding log tail: {0}")]
    LogTail(#[from] base64::DecodeError),

    #[error("fetching of 4KB+ logs not implemented yet")]
    LogsTooLarge,
}

impl Error {
    /// Wraps an I/O error with a short description of what was being done.
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
