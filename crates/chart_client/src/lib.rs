pub mod busy;
pub mod error;
pub mod query;
pub mod renderer;
pub mod source;

pub use busy::{BusyGuard, BusyIndicator, BusyListener, NoBusyListener};
pub use error::ChartError;
pub use query::GraphDataQuery;
pub use renderer::{stat_title, AlertSink, ChartBackend, ChartInstance, ChartRenderer, ChartSpec};
pub use source::{GraphDataSource, HttpDataService};
