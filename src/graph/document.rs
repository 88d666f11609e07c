//! Plain-data snapshot of a graph for saving and loading.
//!
//! Documents carry no behaviour; `NodeGraph::to_document` and
//! `NodeGraph::from_document` translate to and from live graphs. With the
//! `serde` feature every type here (de)serializes as plain JSON-friendly data.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::samples::SampleId;

pub const DOCUMENT_VERSION: u32 = 1;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GraphDocument {
    pub version: u32,
    pub sample_rate: f32,
    pub bpm: f32,
    pub output: Option<NodeId>,
    pub nodes: Vec<NodeDoc>,
    pub links: Vec<LinkDoc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub samples: Vec<SampleDoc>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDoc {
    pub id: NodeId,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: [f32; 2],
    #[cfg_attr(feature = "serde", serde(default = "enabled_default"))]
    pub enabled: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: BTreeMap<String, f32>,
}

#[cfg(feature = "serde")]
fn enabled_default() -> bool {
    true
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDoc {
    pub from: NodeId,
    pub from_slot: usize,
    pub to: NodeId,
    pub to_slot: usize,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SampleDoc {
    pub id: SampleId,
    pub name: String,
    pub sample_rate: u32,
    pub duration: f32,
    pub data: Vec<f32>,
}
