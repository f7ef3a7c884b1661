//! Explicit readiness signal for components that mount before the controller exists.

use std::{sync::Arc, time::Duration};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::controller::FilterController;

pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Publishing side, owned by whoever composes the page.
pub struct ControllerReadiness {
    tx: watch::Sender<Option<Arc<FilterController>>>,
}

impl ControllerReadiness {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn publish(&self, controller: Arc<FilterController>) {
        self.tx.send_replace(Some(controller));
        debug!("filter controller published");
    }

    pub fn waiter(&self) -> ReadinessWaiter {
        ReadinessWaiter {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ControllerReadiness {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ReadinessWaiter {
    rx: watch::Receiver<Option<Arc<FilterController>>>,
}

impl ReadinessWaiter {
    /// Waits up to `timeout` for the controller.
    ///
    /// Returns `None` (after logging a warning) when it never shows up or the publisher is
    /// dropped first; the caller abandons the integration instead of failing.
    pub async fn wait(mut self, timeout: Duration, component: &str) -> Option<Arc<FilterController>> {
        let ready = tokio::time::timeout(timeout, self.rx.wait_for(Option::is_some)).await;
        match ready {
            Ok(Ok(controller)) => controller.clone(),
            Ok(Err(_)) => {
                warn!(component, "filter controller publisher dropped before it was ready");
                None
            }
            Err(_) => {
                warn!(component, ?timeout, "filter controller not found after timeout");
                None
            }
        }
    }
}
