use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

const BEARER_SCHEME: &str = "bearer";

#[bsync_derive::bsync_error]
pub enum SecurityError {
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Extracts the credential from an `Authorization` header value.
///
/// The scheme is matched case-insensitively and must be followed by whitespace;
/// anything else yields `None`.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim_start();
    (!token.is_empty()).then_some(token)
}

/// Static shared-secret check for callers.
///
/// A guard built without a secret (or with an empty one) rejects everybody.
#[derive(Clone, Default)]
pub struct BearerGuard {
    secret: Option<Arc<str>>,
}

impl BearerGuard {
    #[must_use]
    pub fn new(secret: Option<&str>) -> Self {
        Self { secret: secret.filter(|s| !s.is_empty()).map(Arc::from) }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Accepts the presented token only if it equals the configured secret exactly.
    ///
    /// # Errors
    /// Returns [`SecurityError::Unauthorized`] when no secret is configured, no token
    /// was presented, or the token differs.
    pub fn verify(&self, presented: Option<&str>) -> Result<(), SecurityError> {
        let Some(secret) = self.secret.as_deref() else {
            return Err(SecurityError::Unauthorized {
                message: "no API bearer is configured".into(),
                context: None,
            });
        };

        match presented {
            Some(token) if token == secret => Ok(()),
            Some(_) => Err(SecurityError::Unauthorized {
                message: "bearer token mismatch".into(),
                context: None,
            }),
            None => Err(SecurityError::Unauthorized {
                message: "missing bearer token".into(),
                context: None,
            }),
        }
    }
}

impl fmt::Debug for BearerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerGuard").field("configured", &self.is_configured()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_case_insensitively() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER\tabc"), Some("abc"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn empty_secret_is_not_configured() {
        assert!(!BearerGuard::new(Some("")).is_configured());
        assert!(!BearerGuard::new(None).is_configured());
        assert!(BearerGuard::new(Some("x")).is_configured());
    }
}
