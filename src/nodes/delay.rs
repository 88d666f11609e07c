use std::f32::consts::TAU;

use crate::{
    dsp::WaveGuide,
    graph::{Category, FactoryCtx, NodeIo, NodeSpec, ParamSpec, SolveCtx, UnitGenerator},
};

/*
Delay and Chorus share one wave-guide each and run on voice 0; the result is
copied to every voice.

    Delay:   wet = guide.tick(x, time·sr/1000, feedback)
    Chorus:  time = base + depth · sin(lfo), lfo advancing by 2π·rate/sr

    out = x·(1 - mix) + wet·mix
*/

/// Longest Delay time in ms. The line is sized for it at the graph rate.
const MAX_TIME_MS: f32 = 499.0;

/// Longest Chorus sweep: base plus depth at their maxima.
const MAX_SWEEP_MS: f32 = 60.0;

pub static DELAY_SPEC: NodeSpec = NodeSpec {
    type_name: "Delay",
    category: Category::Effect,
    inputs: &["in", "time", "feedback", "mix"],
    outputs: &["out"],
    params: &[
        ParamSpec::range("in", 0.0, -1.0e6, 1.0e6),
        ParamSpec::range("time", 250.0, 1.0, MAX_TIME_MS),
        ParamSpec::range("feedback", 0.4, 0.0, 0.99),
        ParamSpec::range("mix", 0.5, 0.0, 1.0),
    ],
};

pub static CHORUS_SPEC: NodeSpec = NodeSpec {
    type_name: "Chorus",
    category: Category::Effect,
    inputs: &["in"],
    outputs: &["out"],
    params: &[
        ParamSpec::range("in", 0.0, -1.0e6, 1.0e6),
        ParamSpec::range("rate", 0.8, 0.1, 10.0),
        ParamSpec::range("depth", 2.0, 0.5, 10.0),
        ParamSpec::range("base", 20.0, 5.0, 50.0),
        ParamSpec::range("mix", 0.5, 0.0, 1.0),
        ParamSpec::range("feedback", 0.0, 0.0, 0.9),
    ],
};

#[inline]
fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1_000.0
}

#[inline]
fn blend(dry: f32, wet: f32, mix: f32) -> f32 {
    let mix = mix.clamp(0.0, 1.0);
    dry * (1.0 - mix) + wet * mix
}

pub struct DelayNode {
    guide: WaveGuide,
}

pub fn delay_factory(ctx: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(DelayNode {
        guide: WaveGuide::with_max_delay(ms_to_samples(MAX_TIME_MS, ctx.sample_rate)),
    })
}

impl UnitGenerator for DelayNode {
    fn solve(&mut self, mut io: NodeIo<'_>, ctx: &mut SolveCtx<'_>) {
        let input = io.resolve_mono("in");
        let time = io.resolve_mono("time");
        let feedback = io.resolve_mono("feedback").clamp(0.0, 0.99);
        let mix = io.resolve_mono("mix");

        let wet = self.guide.tick(input, ms_to_samples(time, ctx.sample_rate), feedback);
        io.set_output_mono(0, blend(input, wet, mix));
    }

    fn reset(&mut self) {
        self.guide.reset();
    }
}

pub struct ChorusNode {
    guide: WaveGuide,
    lfo_phase: f32,
}

pub fn chorus_factory(ctx: &FactoryCtx<'_>) -> Box<dyn UnitGenerator> {
    Box::new(ChorusNode {
        guide: WaveGuide::with_max_delay(ms_to_samples(MAX_SWEEP_MS, ctx.sample_rate)),
        lfo_phase: 0.0,
    })
}

impl UnitGenerator for ChorusNode {
    fn solve(&mut self, mut io: NodeIo<'_>, ctx: &mut SolveCtx<'_>) {
        let input = io.resolve_mono("in");
        let rate = io.param("rate");
        let depth = io.param("depth");
        let base = io.param("base");

        let delay_ms = base + self.lfo_phase.sin() * depth;
        let wet = self
            .guide
            .tick(input, ms_to_samples(delay_ms, ctx.sample_rate).max(1.0), io.param("feedback"));

        self.lfo_phase += TAU * rate / ctx.sample_rate.max(1.0);
        if self.lfo_phase >= TAU {
            self.lfo_phase -= TAU;
        }

        io.set_output_mono(0, blend(input, wet, io.param("mix")));
    }

    fn reset(&mut self) {
        self.guide.reset();
        self.lfo_phase = 0.0;
    }
}
