use crate::workflow::RejectionReason;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown {workflow} status '{value}'")]
    UnknownStatus { workflow: &'static str, value: String },

    #[error("Unknown order kind '{0}'")]
    UnknownOrderKind(String),

    #[error("Cannot move {workflow} from '{from}' to '{to}': {}", .reason.message())]
    InvalidTransition {
        workflow: &'static str,
        from: &'static str,
        to: &'static str,
        reason: RejectionReason,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl CoreError {
    /// Rejection reason carried by an [`CoreError::InvalidTransition`], if any.
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            CoreError::InvalidTransition { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
