//! Reader and Writer share values through the graph's global storage slots.
//!
//! A Writer is a sink: it is scheduled even when nothing consumes its output.
//! A Reader scheduled before the Writer of the same slot sees last tick's value.

use crate::{
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
    STORAGE_SLOTS,
};

pub static READER_SPEC: NodeSpec = NodeSpec {
    type_name: "Reader",
    category: Category::Storage,
    inputs: &[],
    outputs: &["out"],
    params: &[ParamSpec::integer("slot", 0, 0, STORAGE_SLOTS as i32 - 1)],
};

pub static WRITER_SPEC: NodeSpec = NodeSpec {
    type_name: "Writer",
    category: Category::Storage,
    inputs: &["in"],
    outputs: &["out"],
    params: &[
        ParamSpec::integer("slot", 0, 0, STORAGE_SLOTS as i32 - 1),
        ParamSpec::range("in", 0.0, -1.0e6, 1.0e6),
    ],
};

pub struct ReaderNode;

pub fn reader_factory(_: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(ReaderNode)
}

impl UnitGenerator for ReaderNode {
    fn solve(&mut self, mut io: NodeIo<'_>, ctx: &mut SolveCtx<'_>) {
        let voices = ctx.storage.read(io.params.index("slot"));
        io.set_output(0, voices);
    }
}

pub struct WriterNode;

pub fn writer_factory(_: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(WriterNode)
}

impl UnitGenerator for WriterNode {
    fn solve(&mut self, mut io: NodeIo<'_>, ctx: &mut SolveCtx<'_>) {
        let voices = io.resolve("in");
        ctx.storage.write(io.params.index("slot"), voices);
        io.set_output(0, voices);
    }

    fn is_sink(&self) -> bool {
        true
    }
}
