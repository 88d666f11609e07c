use crate::{
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
    VOICES,
};

pub const OPERATIONS: &[&str] = &["add", "sub", "mul", "div", "min", "max", "pow", "mod"];

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Math",
    category: Category::Math,
    inputs: &["a", "b"],
    outputs: &["out"],
    params: &[
        ParamSpec::options("op", 0, OPERATIONS),
        ParamSpec::range("a", 0.0, -1.0e6, 1.0e6),
        ParamSpec::range("b", 0.0, -1.0e6, 1.0e6),
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    Pow,
    Mod,
}

impl Operation {
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => Self::Sub,
            2 => Self::Mul,
            3 => Self::Div,
            4 => Self::Min,
            5 => Self::Max,
            6 => Self::Pow,
            7 => Self::Mod,
            _ => Self::Add,
        }
    }

    /// Division and modulo by zero give 0.
    #[inline]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => {
                if b == 0.0 {
                    0.0
                } else {
                    a / b
                }
            }
            Self::Min => a.min(b),
            Self::Max => a.max(b),
            Self::Pow => a.powf(b),
            Self::Mod => {
                if b == 0.0 {
                    0.0
                } else {
                    a.rem_euclid(b)
                }
            }
        }
    }
}

pub struct MathNode;

pub fn factory(_: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(MathNode)
}

impl UnitGenerator for MathNode {
    fn solve(&mut self, mut io: NodeIo<'_>, _: &mut SolveCtx<'_>) {
        let op = Operation::from_index(io.params.index("op"));
        let a = io.resolve("a");
        let b = io.resolve("b");

        let mut out = [0.0; VOICES];
        for voice in 0..VOICES {
            out[voice] = op.apply(a[voice], b[voice]);
        }
        io.set_output(0, out);
    }
}
