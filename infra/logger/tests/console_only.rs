use bsync_logger::{LevelFilter, Logger};

#[test]
fn json_console_without_files_holds_no_writer_guard() {
    let logger = Logger::builder()
        .name("bsync-console")
        .console_json(true)
        .env_filter("bsync_registry=debug")
        .level(LevelFilter::DEBUG)
        .init()
        .expect("console logger");

    tracing::debug!(repo = "org/repo", "console event");
    assert!(logger.guard().is_none());
}
