//! Error types for graph editing and sample loading.
//!
//! Nothing here is ever raised from the audio path: `NodeGraph::solve` is
//! infallible and falls back to the last valid sample instead.

use thiserror::Error;

use crate::graph::{LinkId, NodeId};

/// Structural editing failures. The graph is left unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    MissingNode(NodeId),

    #[error("link {0} does not exist")]
    MissingLink(LinkId),

    #[error("node {node} has no input slot {slot}")]
    InvalidInput { node: NodeId, slot: usize },

    #[error("node {node} has no output slot {slot}")]
    InvalidOutput { node: NodeId, slot: usize },

    #[error("node {node} has no port named `{name}`")]
    UnknownPort { node: NodeId, name: String },

    #[error("node {node} has no parameter named `{name}`")]
    UnknownParam { node: NodeId, name: String },

    #[error("unknown node type `{0}`")]
    UnknownType(String),

    #[error("linking {from} to {to} would create a cycle")]
    Cycle { from: NodeId, to: NodeId },
}

/// Sample library failures. The sample is not added when one is returned.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("failed to decode sample: {0}")]
    Decode(#[from] hound::Error),

    #[error("sample contains no frames")]
    Empty,

    #[error("invalid sample rate {0}")]
    InvalidRate(u32),

    #[error("sample lasts {duration:.2}s but the limit at {sample_rate} Hz is {limit:.0}s")]
    TooLong {
        duration: f32,
        sample_rate: u32,
        limit: f32,
    },
}
