use std::{path::Path, sync::Arc};

use hashbrown::HashMap;
use tracing::{debug, warn};

use super::{
    document::{GraphDocument, LinkDoc, SampleDoc, DOCUMENT_VERSION},
    link::{Link, LinkId},
    node::{Node, NodeId, SolveCtx},
    order,
    registry::NodeRegistry,
    storage::Storage,
};
use crate::{
    config::EngineConfig,
    error::{GraphError, SampleError},
    nodes::keys::NoteSender,
    samples::{self, Sample, SampleId, SampleLibrary},
};

/// One outgoing link of a scheduled node, resolved at rebuild time.
#[derive(Debug, Clone, Copy)]
struct Fanout {
    from_slot: usize,
    to: NodeId,
    to_slot: usize,
}

#[derive(Debug, Clone)]
struct Step {
    node: NodeId,
    fanout: Vec<Fanout>,
}

/// Nodes, links and the cached execution order for one document.
///
/// Structural edits recompute the order immediately. `solve` only walks the
/// cached schedule: it never searches, allocates or logs.
pub struct NodeGraph {
    config: EngineConfig,
    registry: Arc<NodeRegistry>,
    nodes: HashMap<NodeId, Node>,
    links: HashMap<LinkId, Link>,
    output: Option<NodeId>,
    order: Vec<NodeId>,
    schedule: Vec<Step>,
    storage: Storage,
    samples: SampleLibrary,
    next_node: u32,
    next_link: u32,
    tick: u64,
    last_sample: f32,
}

impl NodeGraph {
    /// A graph holding a single Output node, which is the root.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, Arc::new(NodeRegistry::with_builtins()))
    }

    pub fn with_registry(config: EngineConfig, registry: Arc<NodeRegistry>) -> Self {
        let mut graph = Self::empty(config, registry);
        match graph.add_node("Output") {
            Ok(id) => {
                graph.output = Some(id);
                graph.rebuild();
            }
            Err(err) => warn!(%err, "registry has no Output type; graph starts without a root"),
        }
        graph
    }

    fn empty(config: EngineConfig, registry: Arc<NodeRegistry>) -> Self {
        Self {
            config,
            registry,
            nodes: HashMap::new(),
            links: HashMap::new(),
            output: None,
            order: Vec::new(),
            schedule: Vec::new(),
            storage: Storage::new(),
            samples: SampleLibrary::new(),
            next_node: 0,
            next_link: 0,
            tick: 0,
            last_sample: 0.0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate
    }

    pub fn bpm(&self) -> f32 {
        self.config.bpm
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All node ids, ascending.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<_> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    /// All links, ordered by id.
    pub fn links(&self) -> Vec<Link> {
        let mut links: Vec<_> = self.links.values().copied().collect();
        links.sort_unstable_by_key(|link| link.id);
        links
    }

    /// The link feeding `node`'s input `slot`, if any.
    pub fn link_into(&self, node: NodeId, slot: usize) -> Option<&Link> {
        self.links
            .values()
            .find(|link| link.to == node && link.to_slot == slot)
    }

    pub fn output(&self) -> Option<NodeId> {
        self.output
    }

    /// Cached execution order; the output node is last.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn samples(&self) -> &SampleLibrary {
        &self.samples
    }

    /// Number of ticks solved since creation or the last reset.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn add_node(&mut self, type_name: &str) -> Result<NodeId, GraphError> {
        self.add_node_with(type_name, &[])
    }

    /// Add a node with some parameters set up front.
    pub fn add_node_with(&mut self, type_name: &str, params: &[(&str, f32)]) -> Result<NodeId, GraphError> {
        let id = NodeId(self.next_node);
        let node = self.registry.instantiate(
            type_name,
            id,
            params,
            self.config.sample_rate,
            self.config.seed,
        )?;
        self.next_node += 1;
        self.nodes.insert(id, node);
        debug!(%id, type_name, "node added");
        self.rebuild();
        Ok(id)
    }

    /// Remove a node and every link touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        if self.nodes.remove(&id).is_none() {
            return Err(GraphError::MissingNode(id));
        }

        let dangling: Vec<LinkId> = self
            .links
            .values()
            .filter(|link| link.touches(id))
            .map(|link| link.id)
            .collect();
        for link_id in dangling {
            if let Some(link) = self.links.remove(&link_id) {
                self.refresh_ports(&link, false);
                debug!(link = %link_id, "link removed with node");
            }
        }

        if self.output == Some(id) {
            self.output = None;
        }
        debug!(%id, "node removed");
        self.rebuild();
        Ok(())
    }

    /// Link `from`'s output slot to `to`'s input slot.
    ///
    /// An occupied input is re-linked: the old link is removed. Links that
    /// would close a cycle are rejected.
    pub fn connect(
        &mut self,
        from: NodeId,
        from_slot: usize,
        to: NodeId,
        to_slot: usize,
    ) -> Result<LinkId, GraphError> {
        let source = self.nodes.get(&from).ok_or(GraphError::MissingNode(from))?;
        let dest = self.nodes.get(&to).ok_or(GraphError::MissingNode(to))?;
        if from_slot >= source.outputs().len() {
            return Err(GraphError::InvalidOutput {
                node: from,
                slot: from_slot,
            });
        }
        if to_slot >= dest.inputs().len() {
            return Err(GraphError::InvalidInput { node: to, slot: to_slot });
        }
        if from == to {
            return Err(GraphError::Cycle { from, to });
        }

        let replaced = self.link_into(to, to_slot).copied();
        if let Some(existing) = replaced {
            if existing.from == from && existing.from_slot == from_slot {
                return Ok(existing.id);
            }
        }

        // Ignore the link being replaced when looking for a path back
        let producers = order::producers(
            self.links
                .values()
                .filter(|link| Some(link.id) != replaced.map(|r| r.id)),
        );
        if order::feeds_into(to, from, &producers) {
            return Err(GraphError::Cycle { from, to });
        }

        if let Some(old) = replaced {
            self.links.remove(&old.id);
            self.refresh_ports(&old, false);
            debug!(link = %old.id, "link replaced");
        }

        let id = LinkId(self.next_link);
        self.next_link += 1;
        let link = Link {
            id,
            from,
            from_slot,
            to,
            to_slot,
        };
        self.links.insert(id, link);
        self.refresh_ports(&link, true);
        debug!(%id, %from, from_slot, %to, to_slot, "link created");
        self.rebuild();
        Ok(id)
    }

    /// [`NodeGraph::connect`] by port names.
    pub fn connect_named(
        &mut self,
        from: NodeId,
        output: &str,
        to: NodeId,
        input: &str,
    ) -> Result<LinkId, GraphError> {
        let source = self.nodes.get(&from).ok_or(GraphError::MissingNode(from))?;
        let dest = self.nodes.get(&to).ok_or(GraphError::MissingNode(to))?;
        let from_slot = source.output_index(output).ok_or_else(|| GraphError::UnknownPort {
            node: from,
            name: output.to_string(),
        })?;
        let to_slot = dest.input_index(input).ok_or_else(|| GraphError::UnknownPort {
            node: to,
            name: input.to_string(),
        })?;
        self.connect(from, from_slot, to, to_slot)
    }

    pub fn disconnect(&mut self, id: LinkId) -> Result<(), GraphError> {
        let link = self.links.remove(&id).ok_or(GraphError::MissingLink(id))?;
        self.refresh_ports(&link, false);
        debug!(%id, "link removed");
        self.rebuild();
        Ok(())
    }

    /// Remove whatever feeds `node`'s input `slot`. Returns the removed link.
    pub fn disconnect_input(&mut self, node: NodeId, slot: usize) -> Result<Option<LinkId>, GraphError> {
        let target = self.nodes.get(&node).ok_or(GraphError::MissingNode(node))?;
        if slot >= target.inputs().len() {
            return Err(GraphError::InvalidInput { node, slot });
        }
        match self.link_into(node, slot).map(|link| link.id) {
            Some(id) => {
                self.disconnect(id)?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// Make `id` the node whose output 0 is the graph's sample.
    pub fn set_output(&mut self, id: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::MissingNode(id));
        }
        self.output = Some(id);
        debug!(%id, "output node set");
        self.rebuild();
        Ok(())
    }

    /// Recompute the execution order and per-node fanout.
    pub fn rebuild(&mut self) {
        let producers = order::producers(self.links.values());
        let mut sinks: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.is_sink())
            .map(Node::id)
            .collect();
        sinks.sort_unstable();

        self.order = order::execution_order(self.output, &sinks, &producers);

        let mut fanout: HashMap<NodeId, Vec<(LinkId, Fanout)>> = HashMap::new();
        for link in self.links.values() {
            fanout.entry(link.from).or_default().push((
                link.id,
                Fanout {
                    from_slot: link.from_slot,
                    to: link.to,
                    to_slot: link.to_slot,
                },
            ));
        }

        self.schedule = self
            .order
            .iter()
            .map(|&node| {
                let mut outgoing = fanout.remove(&node).unwrap_or_default();
                outgoing.sort_unstable_by_key(|(id, _)| *id);
                Step {
                    node,
                    fanout: outgoing.into_iter().map(|(_, f)| f).collect(),
                }
            })
            .collect();

        debug!(scheduled = self.order.len(), nodes = self.nodes.len(), "execution order rebuilt");
    }

    fn refresh_ports(&mut self, link: &Link, connected: bool) {
        if let Some(port) = self
            .nodes
            .get_mut(&link.to)
            .and_then(|dest| dest.inputs.get_mut(link.to_slot))
        {
            port.connected = connected;
            if !connected {
                port.clear();
            }
        }

        let source_connected = connected
            || self
                .links
                .values()
                .any(|other| other.from == link.from && other.from_slot == link.from_slot);
        if let Some(port) = self
            .nodes
            .get_mut(&link.from)
            .and_then(|source| source.outputs.get_mut(link.from_slot))
        {
            port.connected = source_connected;
        }
    }

    // ------------------------------------------------------------------
    // Non-structural edits
    // ------------------------------------------------------------------

    /// Set a parameter and return the value actually stored after clamping.
    pub fn set_param(&mut self, id: NodeId, name: &str, value: f32) -> Result<f32, GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::MissingNode(id))?;
        node.params_mut()
            .set(name, value)
            .ok_or_else(|| GraphError::UnknownParam {
                node: id,
                name: name.to_string(),
            })
    }

    pub fn param(&self, id: NodeId, name: &str) -> Result<f32, GraphError> {
        let node = self.nodes.get(&id).ok_or(GraphError::MissingNode(id))?;
        node.params().get(name).ok_or_else(|| GraphError::UnknownParam {
            node: id,
            name: name.to_string(),
        })
    }

    /// Disabled nodes pass input 0 straight to output 0.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::MissingNode(id))?;
        node.set_enabled(enabled);
        Ok(())
    }

    pub fn set_position(&mut self, id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::MissingNode(id))?;
        node.set_position(position);
        Ok(())
    }

    /// Global tempo for nodes whose own bpm is 0.
    pub fn set_bpm(&mut self, bpm: f32) {
        if bpm.is_finite() {
            self.config = self.config.with_bpm(bpm);
        }
    }

    /// Take the note queue of a Keys node. Later calls return `None`.
    pub fn note_sender(&mut self, id: NodeId) -> Result<Option<NoteSender>, GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::MissingNode(id))?;
        Ok(node.take_note_sender())
    }

    /// Clear all node state, storage and the tick counter.
    pub fn reset(&mut self) {
        for node in self.nodes.values_mut() {
            node.reset();
        }
        // Wired inputs keep their flag; only the carried values are gone
        self.storage.clear();
        self.tick = 0;
        self.last_sample = 0.0;
    }

    // ------------------------------------------------------------------
    // Samples
    // ------------------------------------------------------------------

    pub fn add_sample(&mut self, name: &str, pcm: Vec<f32>, sample_rate: u32) -> Result<SampleId, SampleError> {
        self.samples.add(name, pcm, sample_rate)
    }

    /// Decode a WAV file on the calling thread and add it to the library.
    pub fn load_sample(&mut self, path: impl AsRef<Path>) -> Result<SampleId, SampleError> {
        self.samples.load_wav(path)
    }

    pub fn sample(&self, id: SampleId) -> Option<&Sample> {
        self.samples.get(id)
    }

    // ------------------------------------------------------------------
    // Audio
    // ------------------------------------------------------------------

    /// Run one tick and return the output sample in [-1, 1].
    pub fn solve(&mut self) -> f32 {
        let Self {
            config,
            nodes,
            output,
            schedule,
            storage,
            samples,
            tick,
            last_sample,
            ..
        } = self;

        let mut ctx = SolveCtx {
            sample_rate: config.sample_rate,
            bpm: config.bpm,
            tick: *tick,
            storage,
            samples,
        };

        for step in schedule.iter() {
            if let Some(node) = nodes.get_mut(&step.node) {
                node.solved = false;
            }
        }

        for step in schedule.iter() {
            match nodes.get_mut(&step.node) {
                Some(node) if !node.solved => node.process(&mut ctx),
                Some(_) => {}
                None => continue,
            }

            for fan in &step.fanout {
                let voices = nodes
                    .get(&step.node)
                    .and_then(|node| node.outputs.get(fan.from_slot))
                    .map(|port| port.voices);
                let dest = nodes
                    .get_mut(&fan.to)
                    .and_then(|node| node.inputs.get_mut(fan.to_slot));
                if let (Some(voices), Some(dest)) = (voices, dest) {
                    dest.voices = voices;
                }
            }
        }

        let raw = output
            .and_then(|id| nodes.get(&id))
            .and_then(|node| node.outputs.first())
            .map_or(0.0, |port| port.voices[0]);

        let sample = if raw.is_finite() {
            raw.clamp(-1.0, 1.0)
        } else {
            *last_sample
        };
        *last_sample = sample;
        *tick += 1;
        sample
    }

    /// Fill `out` with consecutive ticks.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.solve();
        }
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    pub fn to_document(&self) -> GraphDocument {
        let nodes = self
            .node_ids()
            .into_iter()
            .filter_map(|id| self.nodes.get(&id))
            .map(Node::save)
            .collect();

        let links = self
            .links()
            .into_iter()
            .map(|link| LinkDoc {
                from: link.from,
                from_slot: link.from_slot,
                to: link.to,
                to_slot: link.to_slot,
            })
            .collect();

        let samples = self
            .samples
            .iter()
            .map(|(id, sample)| SampleDoc {
                id,
                name: sample.name.clone(),
                sample_rate: sample.sample_rate,
                duration: sample.duration,
                data: sample.data.to_vec(),
            })
            .collect();

        GraphDocument {
            version: DOCUMENT_VERSION,
            sample_rate: self.config.sample_rate,
            bpm: self.config.bpm,
            output: self.output,
            nodes,
            links,
            samples,
        }
    }

    /// Rebuild a graph from a document using the built-in node types.
    pub fn from_document(doc: &GraphDocument, config: EngineConfig) -> Result<Self, GraphError> {
        Self::from_document_with(doc, config, Arc::new(NodeRegistry::with_builtins()))
    }

    /// Rebuild a graph from a document.
    ///
    /// Node ids are preserved. An unknown node type fails the whole load.
    /// Links, samples and parameters that no longer fit are skipped with a
    /// warning. The document's tempo replaces `config.bpm`; the sample rate
    /// comes from `config`.
    pub fn from_document_with(
        doc: &GraphDocument,
        config: EngineConfig,
        registry: Arc<NodeRegistry>,
    ) -> Result<Self, GraphError> {
        if doc.version > DOCUMENT_VERSION {
            warn!(version = doc.version, supported = DOCUMENT_VERSION, "document is newer than this engine");
        }

        let mut graph = Self::empty(config.with_bpm(doc.bpm), registry);

        for entry in &doc.samples {
            match samples::validate(&entry.name, entry.data.clone(), entry.sample_rate) {
                Ok(sample) => graph.samples.insert(entry.id, sample),
                Err(err) => warn!(id = %entry.id, name = %entry.name, %err, "skipping sample"),
            }
        }

        for entry in &doc.nodes {
            if graph.nodes.contains_key(&entry.id) {
                warn!(id = %entry.id, "skipping duplicate node id");
                continue;
            }
            let mut node = graph.registry.instantiate(
                &entry.type_name,
                entry.id,
                &[],
                graph.config.sample_rate,
                graph.config.seed,
            )?;
            if let Err(err) = node.load(entry) {
                warn!(%err, "ignoring saved parameter");
            }
            graph.next_node = graph.next_node.max(entry.id.0 + 1);
            graph.nodes.insert(entry.id, node);
        }

        graph.output = match doc.output {
            Some(id) if graph.nodes.contains_key(&id) => Some(id),
            Some(id) => {
                warn!(%id, "output node missing from document");
                None
            }
            None => None,
        };

        for link in &doc.links {
            if let Err(err) = graph.connect(link.from, link.from_slot, link.to, link.to_slot) {
                warn!(%err, "skipping link");
            }
        }

        graph.rebuild();
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Output conditioning off, so solves return the wired value exactly.
    fn graph() -> NodeGraph {
        let mut graph = NodeGraph::new(EngineConfig::default());
        let out = graph.output().unwrap();
        graph.set_param(out, "dc_block", 0.0).unwrap();
        graph.set_param(out, "normalize", 0.0).unwrap();
        graph
    }

    fn root(graph: &NodeGraph) -> NodeId {
        graph.output().unwrap()
    }

    #[test]
    fn new_graph_has_an_output_root() {
        let graph = graph();
        let output = root(&graph);
        assert_eq!(graph.node(output).unwrap().type_name(), "Output");
        assert_eq!(graph.order(), &[output]);
    }

    #[test]
    fn value_into_output() {
        let mut graph = graph();
        let value = graph.add_node_with("Value", &[("value", 0.25)]).unwrap();
        graph.connect(value, 0, root(&graph), 0).unwrap();
        assert_eq!(graph.solve(), 0.25);
        assert_eq!(graph.order().last(), Some(&root(&graph)));
    }

    #[test]
    fn default_output_drains_a_constant_offset() {
        let mut graph = NodeGraph::new(EngineConfig::default().with_sample_rate(1_000.0));
        let value = graph.add_node_with("Value", &[("value", 0.5)]).unwrap();
        graph.connect(value, 0, root(&graph), 0).unwrap();

        let first = graph.solve();
        let mut block = vec![0.0; 20_000];
        graph.render(&mut block);
        assert!(first > 0.49);
        assert!(block[19_999].abs() < 0.01, "residual {}", block[19_999]);
    }

    #[test]
    fn unlinked_nodes_are_not_scheduled() {
        let mut graph = graph();
        let lonely = graph.add_node("Oscillator").unwrap();
        assert!(!graph.order().contains(&lonely));
        assert_eq!(graph.solve(), 0.0);
    }

    #[test]
    fn connect_validates_slots_and_nodes() {
        let mut graph = graph();
        let value = graph.add_node("Value").unwrap();
        let out = root(&graph);
        assert_eq!(
            graph.connect(value, 3, out, 0),
            Err(GraphError::InvalidOutput { node: value, slot: 3 })
        );
        assert_eq!(
            graph.connect(value, 0, out, 9),
            Err(GraphError::InvalidInput { node: out, slot: 9 })
        );
        assert_eq!(
            graph.connect(NodeId(99), 0, out, 0),
            Err(GraphError::MissingNode(NodeId(99)))
        );
        assert!(graph.links().is_empty());
    }

    #[test]
    fn cycles_are_rejected() {
        let mut graph = graph();
        let a = graph.add_node("Math").unwrap();
        let b = graph.add_node("Math").unwrap();
        graph.connect(a, 0, b, 0).unwrap();
        assert_eq!(graph.connect(b, 0, a, 0), Err(GraphError::Cycle { from: b, to: a }));
        assert_eq!(graph.connect(a, 0, a, 1), Err(GraphError::Cycle { from: a, to: a }));
        assert_eq!(graph.links().len(), 1);
    }

    #[test]
    fn relinking_an_input_replaces_the_link() {
        let mut graph = graph();
        let a = graph.add_node_with("Value", &[("value", 0.1)]).unwrap();
        let b = graph.add_node_with("Value", &[("value", 0.3)]).unwrap();
        let out = root(&graph);
        let first = graph.connect(a, 0, out, 0).unwrap();
        let second = graph.connect(b, 0, out, 0).unwrap();

        assert!(graph.link(first).is_none());
        assert_eq!(graph.links().len(), 1);
        assert!(!graph.node(a).unwrap().outputs()[0].connected);
        assert!((graph.solve() - 0.3).abs() < 1e-6);
        assert_eq!(graph.link_into(out, 0).map(|l| l.id), Some(second));
    }

    #[test]
    fn removing_a_node_purges_its_links() {
        let mut graph = graph();
        let value = graph.add_node("Value").unwrap();
        let out = root(&graph);
        graph.connect(value, 0, out, 0).unwrap();
        graph.remove_node(value).unwrap();

        assert!(graph.links().is_empty());
        assert!(!graph.order().contains(&value));
        assert!(!graph.node(out).unwrap().inputs()[0].connected);
        assert_eq!(graph.remove_node(value), Err(GraphError::MissingNode(value)));
    }

    #[test]
    fn removing_the_root_yields_silence() {
        let mut graph = graph();
        let out = root(&graph);
        graph.remove_node(out).unwrap();
        assert_eq!(graph.output(), None);
        assert!(graph.order().is_empty());
        assert_eq!(graph.solve(), 0.0);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut graph = graph();
        let a = graph.add_node("Value").unwrap();
        graph.remove_node(a).unwrap();
        let b = graph.add_node("Value").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn disabled_node_is_bypassed() {
        let mut graph = graph();
        let value = graph.add_node_with("Value", &[("value", 0.4)]).unwrap();
        let math = graph.add_node_with("Math", &[("op", 2.0), ("b", 0.5)]).unwrap();
        let out = root(&graph);
        graph.connect(value, 0, math, 0).unwrap();
        graph.connect(math, 0, out, 0).unwrap();

        assert!((graph.solve() - 0.2).abs() < 1e-6);
        graph.set_enabled(math, false).unwrap();
        assert!((graph.solve() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn set_param_reports_clamped_value() {
        let mut graph = graph();
        let value = graph.add_node("Value").unwrap();
        let order_before = graph.order().to_vec();
        assert_eq!(graph.set_param(value, "value", 1.0e9).unwrap(), 1.0e6);
        assert!(matches!(
            graph.set_param(value, "nope", 1.0),
            Err(GraphError::UnknownParam { .. })
        ));
        assert_eq!(graph.order(), &order_before[..]);
    }

    #[test]
    fn non_finite_output_holds_last_sample() {
        let mut graph = graph();
        let value = graph.add_node_with("Value", &[("value", 0.5)]).unwrap();
        let out = root(&graph);
        graph.connect(value, 0, out, 0).unwrap();
        assert_eq!(graph.solve(), 0.5);

        // pow(-1, 0.5) is NaN
        let math = graph.add_node_with("Math", &[("op", 6.0), ("b", 0.5)]).unwrap();
        graph.set_param(value, "value", -1.0).unwrap();
        graph.connect(value, 0, math, 0).unwrap();
        graph.connect(math, 0, out, 0).unwrap();
        assert_eq!(graph.solve(), 0.5);
    }
}
