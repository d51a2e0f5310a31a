use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// A collaborator the bridge cannot run without was never supplied.
    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),
    #[error("runtime has been dropped")]
    RuntimeUnavailable,
    #[error("bridge is already attached")]
    AlreadyAttached,
}
