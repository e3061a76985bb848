use bsync_kernel::security::{BearerGuard, SecurityError, bearer_token};

#[test]
fn accepts_exact_match_only() {
    let guard = BearerGuard::new(Some("s3cret"));

    assert!(guard.verify(Some("s3cret")).is_ok());
    assert!(guard.verify(Some("S3CRET")).is_err());
    assert!(guard.verify(Some("s3cret ")).is_err());
    assert!(guard.verify(None).is_err());
}

#[test]
fn unconfigured_guard_rejects_everyone() {
    let guard = BearerGuard::new(None);
    let err = guard.verify(bearer_token("Bearer anything")).unwrap_err();
    assert!(matches!(err, SecurityError::Unauthorized { .. }));
}

#[test]
fn debug_does_not_leak_secret() {
    let guard = BearerGuard::new(Some("s3cret"));
    assert!(!format!("{guard:?}").contains("s3cret"));
}
