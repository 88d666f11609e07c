use crate::graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator};

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Value",
    category: Category::Source,
    inputs: &[],
    outputs: &["out"],
    params: &[ParamSpec::range("value", 0.0, -1.0e6, 1.0e6)],
};

/// A constant on every voice.
pub struct ValueNode;

pub fn factory(_: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(ValueNode)
}

impl UnitGenerator for ValueNode {
    fn solve(&mut self, mut io: NodeIo<'_>, _: &mut SolveCtx<'_>) {
        let value = io.param("value");
        io.set_output_mono(0, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::harness::Harness;

    #[test]
    fn emits_its_value_everywhere() {
        let mut h = Harness::new(&SPEC, factory, &[("value", -3.5)], 44_100.0);
        h.step();
        assert_eq!(h.out("out"), [-3.5; crate::VOICES]);
    }
}
