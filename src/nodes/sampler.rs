use crate::{
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
    nodes::GateEdges,
    samples::{Sample, SampleId},
    VOICES,
};

pub static SPEC: NodeSpec = NodeSpec {
    type_name: "Sampler",
    category: Category::Source,
    inputs: &["gate", "speed"],
    outputs: &["out", "mix"],
    params: &[
        ParamSpec::integer("sample", 0, 0, 65_535),
        ParamSpec::range("gate", 0.0, 0.0, 1.0),
        ParamSpec::range("speed", 1.0, 0.0, 4.0),
        ParamSpec::toggle("loop", false),
        ParamSpec::range("gain", 1.0, 0.0, 2.0),
    ],
};

#[derive(Debug, Clone, Copy, Default)]
struct Playhead {
    position: f64,
    playing: bool,
}

/// Plays a library sample on every voice whose gate rises.
///
/// The read position advances by `speed · sample_rate / graph_rate` per tick
/// and is interpolated linearly. Without looping a voice stops at the end.
/// An unwired gate drives voice 0 only.
pub struct SamplerNode {
    heads: [Playhead; VOICES],
    edges: GateEdges,
}

pub fn factory(_: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(SamplerNode {
        heads: [Playhead::default(); VOICES],
        edges: GateEdges::default(),
    })
}

/// Linear interpolation at a fractional frame. The frame after the last one is
/// the first (looping) or silence.
#[inline]
fn read(sample: &Sample, position: f64, looping: bool) -> f32 {
    let data = &sample.data;
    let index = position.floor() as usize;
    let frac = (position - index as f64) as f32;
    let Some(&a) = data.get(index) else {
        return 0.0;
    };
    let b = match data.get(index + 1) {
        Some(&b) => b,
        None if looping => data[0],
        None => 0.0,
    };
    a + (b - a) * frac
}

impl UnitGenerator for SamplerNode {
    fn solve(&mut self, mut io: NodeIo<'_>, ctx: &mut SolveCtx<'_>) {
        let gates = if io.is_connected("gate") {
            io.resolve("gate")
        } else {
            let mut gates = [0.0; VOICES];
            gates[0] = io.param("gate");
            gates
        };
        let rising = self.edges.update(&gates);

        let speed = io.resolve("speed");
        let looping = io.params.flag("loop");
        let gain = io.param("gain");
        let sample = ctx.samples.get(SampleId(io.params.index("sample") as u32));

        let mut out = [0.0; VOICES];
        let mut sum = 0.0;
        let mut playing = 0;
        for voice in 0..VOICES {
            let head = &mut self.heads[voice];
            if rising[voice] {
                head.position = 0.0;
                head.playing = true;
            }
            let Some(sample) = sample.filter(|_| head.playing) else {
                continue;
            };

            out[voice] = read(sample, head.position, looping) * gain;
            sum += out[voice];
            playing += 1;

            let step = speed[voice].max(0.0) as f64 * sample.sample_rate as f64 / ctx.sample_rate.max(1.0) as f64;
            head.position += step;
            let len = sample.len() as f64;
            if head.position >= len {
                if looping {
                    head.position %= len;
                } else {
                    head.playing = false;
                }
            }
        }

        io.set_output(0, out);
        io.set_output_mono(1, if playing > 0 { sum / playing as f32 } else { 0.0 });
    }

    fn reset(&mut self) {
        self.heads = [Playhead::default(); VOICES];
        self.edges.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::harness::Harness;

    fn sampler(params: &[(&str, f32)], pcm: Vec<f32>, rate: u32) -> Harness {
        let mut h = Harness::new(&SPEC, factory, params, 1_000.0);
        h.samples.add("ramp", pcm, rate).expect("valid sample");
        h
    }

    #[test]
    fn silent_until_triggered() {
        let mut h = sampler(&[], vec![0.5; 8], 1_000);
        assert_eq!(h.next("out"), 0.0);
        h.set("gate", 1.0);
        assert_eq!(h.next("out"), 0.5);
    }

    #[test]
    fn plays_once_then_stops() {
        let mut h = sampler(&[("gate", 1.0)], vec![0.1, 0.2, 0.3], 1_000);
        let out: Vec<f32> = (0..5).map(|_| h.next("out")).collect();
        assert_eq!(out, vec![0.1, 0.2, 0.3, 0.0, 0.0]);
    }

    #[test]
    fn rate_ratio_interpolates() {
        // Source at half the graph rate: every other tick falls between frames
        let mut h = sampler(&[("gate", 1.0)], vec![0.0, 1.0, 0.0], 500);
        let out: Vec<f32> = (0..4).map(|_| h.next("out")).collect();
        assert_eq!(out, vec![0.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn loops_when_enabled() {
        let mut h = sampler(&[("gate", 1.0), ("loop", 1.0)], vec![0.1, 0.2], 1_000);
        let out: Vec<f32> = (0..5).map(|_| h.next("out")).collect();
        assert_eq!(out, vec![0.1, 0.2, 0.1, 0.2, 0.1]);
    }

    #[test]
    fn rising_edge_restarts_each_voice() {
        let mut h = sampler(&[], vec![0.1, 0.2, 0.3, 0.4], 1_000);
        let mut gates = [0.0; VOICES];
        gates[2] = 1.0;
        h.feed("gate", gates);
        h.step();
        h.step();
        assert_eq!(h.out("out")[2], 0.2);
        assert_eq!(h.out("mix")[0], 0.2);

        gates[2] = 0.0;
        h.feed("gate", gates);
        h.step();
        gates[2] = 1.0;
        h.feed("gate", gates);
        assert_eq!(h.next("out"), 0.0);
        assert_eq!(h.out("out")[2], 0.1);
    }

    #[test]
    fn missing_sample_is_silent() {
        let mut h = Harness::new(&SPEC, factory, &[("gate", 1.0), ("sample", 9.0)], 1_000.0);
        assert_eq!(h.next("out"), 0.0);
    }
}
