pub mod error;
pub mod resource;
pub mod state;
pub mod status;

pub use error::{MonitorError, MonitorErrorKind};
pub use resource::{OperationKind, ResourceId, TaskHandle};
pub use state::{
    MonitorSnapshot, MonitorState, PersistedMonitorState, RescueCredentials, TimelineEntry,
};
pub use status::CanonicalStatus;

pub type MonitorResult<T> = Result<T, MonitorError>;
