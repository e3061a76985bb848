use std::borrow::Cow;

#[bsync_derive::bsync_error]
pub enum UpstreamError {
    /// Requested object does not exist.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Conditional write refused.
    #[error("Write rejected{}: {message}", format_context(.context))]
    WriteRejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Transport failure (connect, timeout, body decoding).
    #[error("HTTP error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },
    /// Unexpected status from the host.
    #[error("Host responded {status}{}: {message}", format_context(.context))]
    Status { status: u16, message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Internal upstream error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
