pub mod reinstall;
pub mod rescue;

pub use reinstall::{REINSTALL_NAMESPACE, ReinstallMonitor};
pub use rescue::{RESCUE_NAMESPACE, RescueMonitor};
