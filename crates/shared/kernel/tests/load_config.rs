use bsync_kernel::config::load_config;
use bsync_kernel::domain::config::{ApiConfig, UpstreamProvider};
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_values_from_toml_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("server.toml");
    fs::write(
        &path,
        r#"
[server]
port = 9090

[security]
api_bearer = "from-file"

[upstream]
provider = "memory"
user_agent = "registry-tests"
"#,
    )?;

    let cfg: ApiConfig = load_config(Some(&path))?;
    assert_eq!(cfg.server.port, 9090);
    assert_eq!(cfg.security.api_bearer.as_deref(), Some("from-file"));
    assert_eq!(cfg.upstream.provider, UpstreamProvider::Memory);
    assert_eq!(cfg.upstream.user_agent, "registry-tests");
    assert_eq!(cfg.upstream.api_url, "https://api.github.com");
    Ok(())
}

#[test]
fn missing_file_falls_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let cfg: ApiConfig = load_config(Some(dir.path().join("absent")))?;
    assert_eq!(cfg.server.port, 4583);
    assert_eq!(cfg.upstream.provider, UpstreamProvider::GitHub);
    Ok(())
}

#[test]
fn malformed_values_are_reported() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("server.toml");
    fs::write(&path, "[server]\nport = \"not-a-port\"\n")?;

    let res: Result<ApiConfig, _> = load_config(Some(&path));
    assert!(res.is_err());
    Ok(())
}
