//! Terminal stand-ins for the browser's chart canvas, alert box and spinner.

use chart_client::{AlertSink, BusyListener, ChartBackend, ChartError, ChartInstance, ChartSpec};
use tracing::{info, warn};

pub struct LogChartBackend;

struct LogChart {
    canvas_id: String,
}

impl ChartInstance for LogChart {
    fn destroy(&mut self) {
        info!(canvas = %self.canvas_id, "chart destroyed");
    }
}

impl ChartBackend for LogChartBackend {
    fn create(&self, spec: &ChartSpec) -> Result<Box<dyn ChartInstance>, ChartError> {
        let series: Vec<&str> = spec.datasets.iter().map(|d| d.label.as_str()).collect();
        info!(
            canvas = %spec.canvas_id,
            x = %spec.x_title,
            y = %spec.y_title,
            labels = ?spec.labels,
            ?series,
            "line chart created"
        );
        Ok(Box::new(LogChart {
            canvas_id: spec.canvas_id.clone(),
        }))
    }
}

pub struct ConsoleAlerts;

impl AlertSink for ConsoleAlerts {
    fn alert(&self, message: &str) {
        warn!(message, "alert");
        eprintln!("alert: {message}");
    }
}

pub struct LogSpinner;

impl BusyListener for LogSpinner {
    fn busy_changed(&self, busy: bool) {
        info!(busy, "chart loading indicator");
    }
}
