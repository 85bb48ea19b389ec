//! Listener lifecycle and graceful shutdown.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parallels_config::ServerConfig;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::ServerError;
use crate::router::create_router;
use crate::state::AppState;

const FLUSH_GRACE: Duration = Duration::from_secs(1);

/// Bind the configured address.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
  let addr = config.addr();
  match TcpListener::bind(&addr).await {
    Ok(listener) => Ok(listener),
    Err(source) => Err(ServerError::Bind { addr, source }),
  }
}

/// Serve until `signal` resolves, then drain.
///
/// After the signal no new connections are accepted. In-flight requests get
/// `config.shutdown_timeout`; if they are still running after that, every
/// batch scope is cancelled and [`ServerError::ShutdownTimeout`] is returned.
pub async fn serve<F>(
  listener: TcpListener,
  state: Arc<AppState>,
  config: &ServerConfig,
  signal: F,
) -> Result<(), ServerError>
where
  F: Future<Output = ()> + Send + 'static,
{
  let local_addr = listener
    .local_addr()
    .map_err(|source| ServerError::Serve { source })?;
  let shutdown = state.shutdown.clone();
  let router = create_router(state, config.read_timeout());

  let draining = CancellationToken::new();
  let trigger = draining.clone();

  let server = axum::serve(
    listener,
    router.into_make_service_with_connect_info::<SocketAddr>(),
  )
  .with_graceful_shutdown(async move {
    signal.await;
    info!("shutdown signal received, draining in-flight requests");
    trigger.cancel();
  })
  .into_future();
  tokio::pin!(server);

  info!(addr = %local_addr, "server listening");

  tokio::select! {
    result = &mut server => {
      return result.map_err(|source| ServerError::Serve { source });
    }
    _ = draining.cancelled() => {}
  }

  match tokio::time::timeout(config.shutdown_timeout(), &mut server).await {
    Ok(result) => {
      result.map_err(|source| ServerError::Serve { source })?;
      info!("server stopped");
      Ok(())
    }
    Err(_) => {
      warn!(
        shutdown_timeout = config.shutdown_timeout,
        "shutdown timed out, cancelling in-flight batches"
      );
      shutdown.cancel();
      // Cancelled batches answer at once; let those answers go out.
      let _ = tokio::time::timeout(FLUSH_GRACE, &mut server).await;
      Err(ServerError::ShutdownTimeout {
        timeout_secs: config.shutdown_timeout,
      })
    }
  }
}

/// Resolves on SIGINT, or SIGTERM on unix.
pub async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      error!(error = %e, "failed to listen for ctrl-c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
      Ok(mut stream) => {
        stream.recv().await;
      }
      Err(e) => {
        error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {}
    _ = terminate => {}
  }
}
