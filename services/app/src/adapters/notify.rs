//! services/app/src/adapters/notify.rs
//!
//! Production implementations of the `Notifier` and `Navigator` ports.
//! The original UI shows toasts and drives a client-side router; the CLI
//! surfaces both through `tracing`.

use polaris_core::domain::Route;
use polaris_core::ports::{Navigator, Notifier};
use tracing::{error, info};

/// A notifier that logs user-facing messages through `tracing`.
#[derive(Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}

/// A navigator that logs navigation requests. The interactive binary keeps
/// its own notion of the current view and follows these requests.
#[derive(Clone, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: Route) {
        info!("Navigating to {:?}", route);
    }
}
