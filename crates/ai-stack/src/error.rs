use thiserror::Error;

/// Recoverable configuration errors. Protocol violations are not represented here:
/// they mean the stack is corrupt and panic instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("behavior `{behavior}` has no initial action configured")]
    MissingInitialAction { behavior: String },

    #[error("action type `{0}` is not registered")]
    UnknownAction(String),

    #[error("behavior `{0}` has already begun")]
    AlreadyBegun(String),

    #[error("snapshot contains no actions")]
    EmptySnapshot,

    #[error("snapshot belongs to behavior `{found}`, not `{expected}`")]
    SnapshotMismatch { expected: String, found: String },
}

pub type Result<T> = std::result::Result<T, StackError>;
