use std::sync::Arc;

use parallels_config::DispatchConfig;
use parallels_dispatch::Dispatcher;
use tokio_util::sync::CancellationToken;

/// Shared handler state.
pub struct AppState {
  pub dispatcher: Dispatcher,
  pub dispatch: DispatchConfig,
  /// Parent of every batch scope. Cancelled when the shutdown grace period
  /// runs out.
  pub shutdown: CancellationToken,
}

impl AppState {
  pub fn new(
    dispatcher: Dispatcher,
    dispatch: DispatchConfig,
    shutdown: CancellationToken,
  ) -> Arc<Self> {
    Arc::new(Self {
      dispatcher,
      dispatch,
      shutdown,
    })
  }
}
