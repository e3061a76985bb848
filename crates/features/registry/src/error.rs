use crate::document::DocumentError;
use crate::host::UpstreamError;
use bsync_kernel::prelude::SecurityError;
use std::borrow::Cow;

/// A specialized [`RegistryError`] enum of this crate.
#[bsync_derive::bsync_error]
pub enum RegistryError {
    /// Caller credential missing or wrong.
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Request body is malformed or fails validation.
    #[error("Invalid payload{}: {message}", format_context(.context))]
    InvalidPayload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Recognized but unsupported merge strategy.
    #[error("Not implemented{}: {message}", format_context(.context))]
    NotImplemented { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Append collided with an existing entry.
    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// The base branch (or another upstream object) does not exist.
    #[error("Upstream not found{}: {message}", format_context(.context))]
    UpstreamNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// The conditional write was refused, usually a stale version token.
    #[error("Upstream rejected write{}: {message}", format_context(.context))]
    UpstreamWriteRejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Any other repository host failure.
    #[error("Upstream error{}: {source}", format_context(.context))]
    Upstream { source: UpstreamError, context: Option<Cow<'static, str>> },
    /// The stored registry document could not be decoded or encoded.
    #[error("Registry document error{}: {source}", format_context(.context))]
    Document { source: DocumentError, context: Option<Cow<'static, str>> },
    /// The commit landed but opening the pull request failed.
    #[error("Pull request failed after commit {commit_url}{}: {message}", format_context(.context))]
    PullRequest {
        commit_url: String,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal registry error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl RegistryError {
    /// Classifies a host failure; `NotFound` and `WriteRejected` keep their own variants.
    pub(crate) fn upstream(err: UpstreamError) -> Self {
        match err {
            UpstreamError::NotFound { message, .. } => {
                Self::UpstreamNotFound { message, context: None }
            }
            UpstreamError::WriteRejected { message, .. } => {
                Self::UpstreamWriteRejected { message, context: None }
            }
            other => Self::Upstream { source: other, context: None },
        }
    }

    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidPayload { message: message.into(), context: None }
    }
}

impl From<SecurityError> for RegistryError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::Unauthorized { message, context } => Self::Unauthorized { message, context },
        }
    }
}
