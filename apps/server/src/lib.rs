//! # Blueprint Sync Server
//!
//! Hosts the registry sync API over HTTP or HTTPS.
//!
//! ```no_run
//! use bsync_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder().port(4583).build()?.run().await
//! }
//! ```

mod router;

use anyhow::{Context, Result, anyhow, bail};
use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use bsync::domain::config::{ApiConfig, SslConfig};
use bsync::kernel::server::ApiState;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// How long in-flight requests may run after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Overrides `server.port`.
    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Checks TLS files, initializes the feature slices and assembles [`ApiState`].
    ///
    /// # Errors
    /// Fails when a configured certificate or key is missing, or when a slice cannot
    /// be initialized (for example an unusable `upstream.api_url`).
    pub fn build(self) -> Result<Server> {
        if let Some(ssl) = &self.cfg.server.ssl {
            check_tls_files(ssl)?;
        }

        info!(
            address = %bind_address(&self.cfg),
            upstream = ?self.cfg.upstream.provider,
            api_bearer = self.cfg.security.has_api_bearer(),
            "Initializing server"
        );

        let slices = bsync::init(&self.cfg).map_err(|e| anyhow!("Slice initialization failed: {e}"))?;
        let state = ApiState::builder()
            .config(self.cfg)
            .register_slices(slices)
            .build()
            .context("Assembling API state")?;

        info!(slices = ?state.slice_names().collect::<Vec<_>>(), "API state ready");
        Ok(Server { state })
    }
}

/// Initialized server; call [`Server::run`] to start accepting connections.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// HTTP application with every route, the API reference and request tracing.
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// Serves until Ctrl+C or SIGTERM, then drains connections for up to 30 seconds.
    ///
    /// # Errors
    /// Fails if the address cannot be bound or the TLS material cannot be loaded.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = bind_address(&cfg);
        let app = self.router().into_make_service();

        let handle = Handle::<SocketAddr>::new();
        tokio::spawn(drain_on_signal(handle.clone()));

        match &cfg.server.ssl {
            Some(ssl) => {
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Loading TLS certificate and key")?;
                info!("Listening on https://{address}");
                axum_server::bind_rustls(address, tls)
                    .handle(handle)
                    .serve(app)
                    .await
                    .context("HTTPS listener stopped")?;
            }
            None => {
                info!("Listening on http://{address}");
                axum_server::bind(address)
                    .handle(handle)
                    .serve(app)
                    .await
                    .context("HTTP listener stopped")?;
            }
        }

        info!("Server stopped");
        Ok(())
    }
}

fn bind_address(cfg: &ApiConfig) -> SocketAddr {
    SocketAddr::new(cfg.server.address, cfg.server.port)
}

fn check_tls_files(ssl: &SslConfig) -> Result<()> {
    for (kind, path) in [("certificate", &ssl.cert), ("key", &ssl.key)] {
        if !path.exists() {
            bail!("TLS {kind} not found at: {}", path.display());
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = ssl.key.metadata().context("Reading TLS key metadata")?.permissions().mode();
        if mode & 0o077 != 0 {
            warn!(key = %ssl.key.display(), "TLS key is readable by group or others; use mode 600");
        }
    }

    Ok(())
}

async fn drain_on_signal(handle: Handle<SocketAddr>) {
    match shutdown_signal().await {
        Ok(()) => {
            info!("Shutdown requested, draining connections");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
        Err(e) => error!("Shutdown signal listener failed: {e}"),
    }
}

async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Installing Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Installing SIGTERM handler")?
            .recv()
            .await;
        Ok(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}
