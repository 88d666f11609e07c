use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    document::NodeDoc,
    param::{ParamSet, ParamSpec},
    port::{ports, Port},
    storage::Storage,
};
use crate::{error::GraphError, nodes::keys::NoteSender, samples::SampleLibrary, Voices, VOICES};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Display grouping for the node picker.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Source,
    Envelope,
    Effect,
    Math,
    Sequencing,
    Storage,
    Output,
}

/// Static description of a node type: its ports and parameters.
#[derive(Debug)]
pub struct NodeSpec {
    pub type_name: &'static str,
    pub category: Category,
    pub inputs: &'static [&'static str],
    pub outputs: &'static [&'static str],
    pub params: &'static [ParamSpec],
}

/// What a unit generator sees of its node during one tick.
pub struct NodeIo<'a> {
    pub inputs: &'a [Port],
    pub outputs: &'a mut [Port],
    pub params: &'a ParamSet,
}

impl NodeIo<'_> {
    pub fn input(&self, name: &str) -> Option<&Port> {
        self.inputs.iter().find(|port| port.name == name)
    }

    pub fn is_connected(&self, name: &str) -> bool {
        self.input(name).is_some_and(|port| port.connected)
    }

    /// The wired input named `name`, or else the same-named parameter on every voice.
    #[inline]
    pub fn resolve(&self, name: &str) -> Voices {
        match self.input(name) {
            Some(port) if port.connected => port.voices,
            _ => [self.params.value(name); VOICES],
        }
    }

    /// Voice 0 of [`NodeIo::resolve`].
    #[inline]
    pub fn resolve_mono(&self, name: &str) -> f32 {
        match self.input(name) {
            Some(port) if port.connected => port.voices[0],
            _ => self.params.value(name),
        }
    }

    #[inline]
    pub fn param(&self, name: &str) -> f32 {
        self.params.value(name)
    }

    #[inline]
    pub fn set_output(&mut self, slot: usize, voices: Voices) {
        if let Some(port) = self.outputs.get_mut(slot) {
            port.voices = voices;
        }
    }

    #[inline]
    pub fn set_output_mono(&mut self, slot: usize, value: f32) {
        if let Some(port) = self.outputs.get_mut(slot) {
            port.fill(value);
        }
    }
}

/// Graph state a unit generator may use while solving.
pub struct SolveCtx<'a> {
    pub sample_rate: f32,
    pub bpm: f32,
    pub tick: u64,
    pub storage: &'a mut Storage,
    pub samples: &'a SampleLibrary,
}

/// Inputs to a node factory.
pub struct FactoryCtx<'a> {
    pub params: &'a ParamSet,
    pub sample_rate: f32,
    pub seed: u64,
}

/// A DSP algorithm driven once per tick by its node.
pub trait UnitGenerator: Send {
    fn solve(&mut self, io: NodeIo<'_>, ctx: &mut SolveCtx<'_>);

    /// Clear internal state (buffers, phases, envelopes).
    fn reset(&mut self) {}

    /// Sinks publish outside the link graph and are always scheduled.
    fn is_sink(&self) -> bool {
        false
    }

    /// Hand out the sending half of a note queue. Only the first call returns it.
    fn take_note_sender(&mut self) -> Option<NoteSender> {
        None
    }
}

pub struct Node {
    id: NodeId,
    spec: &'static NodeSpec,
    pub(crate) inputs: Vec<Port>,
    pub(crate) outputs: Vec<Port>,
    params: ParamSet,
    generator: Box<dyn UnitGenerator>,
    pub(crate) solved: bool,
    enabled: bool,
    position: [f32; 2],
}

impl Node {
    pub fn new(
        id: NodeId,
        spec: &'static NodeSpec,
        params: ParamSet,
        generator: Box<dyn UnitGenerator>,
    ) -> Self {
        Self {
            id,
            spec,
            inputs: ports(spec.inputs),
            outputs: ports(spec.outputs),
            params,
            generator,
            solved: false,
            enabled: true,
            position: [0.0, 0.0],
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn type_name(&self) -> &'static str {
        self.spec.type_name
    }

    pub fn spec(&self) -> &'static NodeSpec {
        self.spec
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|port| port.name == name)
    }

    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|port| port.name == name)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: [f32; 2]) {
        self.position = position;
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn is_sink(&self) -> bool {
        self.generator.is_sink()
    }

    pub(crate) fn take_note_sender(&mut self) -> Option<NoteSender> {
        self.generator.take_note_sender()
    }

    /// Run the generator, or pass input 0 through to output 0 when disabled.
    pub(crate) fn process(&mut self, ctx: &mut SolveCtx<'_>) {
        if self.enabled {
            let io = NodeIo {
                inputs: &self.inputs,
                outputs: &mut self.outputs,
                params: &self.params,
            };
            self.generator.solve(io, ctx);
        } else {
            let through = self.inputs.first().map(|port| port.voices);
            if let (Some(voices), Some(out)) = (through, self.outputs.first_mut()) {
                out.voices = voices;
            }
        }
        self.solved = true;
    }

    pub fn reset(&mut self) {
        self.generator.reset();
        for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            port.clear();
        }
    }

    pub fn save(&self) -> NodeDoc {
        NodeDoc {
            id: self.id,
            type_name: self.spec.type_name.to_string(),
            position: self.position,
            enabled: self.enabled,
            params: self
                .params
                .iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }

    /// Apply saved parameters, enabled flag and position.
    ///
    /// Parameters unknown to this type are reported; known ones before and
    /// after an unknown one are still applied.
    pub fn load(&mut self, doc: &NodeDoc) -> Result<(), GraphError> {
        self.position = doc.position;
        self.enabled = doc.enabled;
        let mut unknown = None;
        for (name, &value) in &doc.params {
            if self.params.set(name, value).is_none() && unknown.is_none() {
                unknown = Some(name.clone());
            }
        }
        match unknown {
            Some(name) => Err(GraphError::UnknownParam { node: self.id, name }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("type", &self.spec.type_name)
            .field("enabled", &self.enabled)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
