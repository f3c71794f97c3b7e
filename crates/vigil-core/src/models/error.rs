use thiserror::Error;

use crate::models::{OperationKind, ResourceId};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MonitorErrorKind {
    Transport,
    StorageFailure,
    InvalidInput,
    Internal,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{kind:?}: {message}")]
pub struct MonitorError {
    pub resource: Option<ResourceId>,
    pub operation: Option<OperationKind>,
    pub kind: MonitorErrorKind,
    pub message: String,
}

impl MonitorError {
    pub fn transport(resource: ResourceId, message: impl Into<String>) -> Self {
        Self {
            resource: Some(resource),
            operation: None,
            kind: MonitorErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn attributed(mut self, operation: OperationKind) -> Self {
        self.operation = self.operation.or(Some(operation));
        self
    }
}
