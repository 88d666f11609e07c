//! The node graph: data model, execution order and the per-sample solve.
//!
//! Nodes wrap a [`UnitGenerator`] with named ports and parameters. Links
//! copy whole voice arrays from an output port to an input port. The graph
//! keeps a producer-first execution order that is recomputed on every
//! structural edit, so each tick is a straight walk down a list.

/// Saved-document data types.
pub mod document;
/// Directed edges between ports.
pub mod link;
/// Node, unit generator trait and solve context.
pub mod node;
mod node_graph;
mod order;
/// Typed parameter declarations and values.
pub mod param;
/// Voice-array ports.
pub mod port;
/// Type name to factory map.
pub mod registry;
mod shared;
/// Global storage slots.
pub mod storage;

pub use document::{GraphDocument, LinkDoc, NodeDoc, SampleDoc, DOCUMENT_VERSION};
pub use link::{Link, LinkId};
pub use node::{Category, FactoryCtx, Node, NodeId, NodeIo, NodeSpec, SolveCtx, UnitGenerator};
pub use node_graph::NodeGraph;
pub use param::{ParamKind, ParamSet, ParamSpec};
pub use port::Port;
pub use registry::{Factory, NodeRegistry};
pub use shared::SharedGraph;
pub use storage::Storage;
