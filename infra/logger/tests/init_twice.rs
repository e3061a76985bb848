use bsync_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn second_subscriber_is_refused() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let _first = Logger::builder().name("bsync-first").level(LevelFilter::WARN).init().expect("first logger");

    let second = Logger::builder()
        .name("bsync-second")
        .console(false)
        .path(tmp.path().join("logs"))
        .init();

    match second {
        Err(LoggerError::Subscriber { .. }) => {}
        other => panic!("expected a subscriber error, got {other:?}"),
    }
}
