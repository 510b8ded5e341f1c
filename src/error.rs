use thiserror::Error;

/// Errors raised by the augmentation, flow, matching and balancing
/// algorithms.
///
/// Identifiers are carried as their `Debug` rendering so the error type does
/// not depend on the graph type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    /// A constructor argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was called out of protocol order.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// A node required by the operation is not in the graph.
    #[error("node not found in graph: {0}")]
    NodeNotFound(String),

    /// The capacity function returned a negative value.
    #[error("negative capacity {capacity} on edge {edge}")]
    NegativeCapacity { edge: String, capacity: f64 },

    /// The computation was cancelled through its cancellation token.
    #[error("computation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, FlowError>;

impl FlowError {
    pub(crate) fn node_not_found(node: &impl std::fmt::Debug) -> Self {
        FlowError::NodeNotFound(format!("{:?}", node))
    }
}
