//! Reference-counted busy indicator shared by overlapping chart requests.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

/// Receives show/hide transitions of the busy indicator.
pub trait BusyListener: Send + Sync {
    fn busy_changed(&self, busy: bool);
}

/// Discards transitions; for surfaces without a spinner.
pub struct NoBusyListener;

impl BusyListener for NoBusyListener {
    fn busy_changed(&self, _busy: bool) {}
}

pub struct BusyIndicator {
    in_flight: Mutex<usize>,
    listener: Arc<dyn BusyListener>,
}

impl BusyIndicator {
    pub fn new(listener: Arc<dyn BusyListener>) -> Arc<Self> {
        Arc::new(Self {
            in_flight: Mutex::new(0),
            listener,
        })
    }

    /// Marks one request in flight until the returned guard drops.
    pub fn begin(self: &Arc<Self>) -> BusyGuard {
        // listener runs under the count lock so show/hide can never be observed out of order
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *in_flight += 1;
        if *in_flight == 1 {
            self.listener.busy_changed(true);
        }
        debug!(in_flight = *in_flight, "chart request started");
        BusyGuard {
            indicator: Arc::clone(self),
        }
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    fn end(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *in_flight = in_flight.saturating_sub(1);
        if *in_flight == 0 {
            self.listener.busy_changed(false);
        }
        debug!(in_flight = *in_flight, "chart request finished");
    }
}

pub struct BusyGuard {
    indicator: Arc<BusyIndicator>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.indicator.end();
    }
}
