pub mod controller;
pub mod feedback;
mod html;
pub mod readiness;
pub mod registry;
pub mod sort;
pub mod table;
pub mod widget;

pub use controller::{FilterController, FilterEventKind, FilterListener, FnListener, SelectionView};
pub use feedback::{Notice, NoticeBoard, NoticeKind, NoticeSink};
pub use html::escape_html;
pub use readiness::{ControllerReadiness, ReadinessWaiter, DEFAULT_READY_TIMEOUT};
pub use registry::{FilterDescriptor, FilterOption, FilterRegistry, RegistryError};
pub use table::{FilterableTable, TableConfig, TableLoadError};
pub use widget::{ClickTarget, MasterState, PanelCoordinator, SelectionWidget};
