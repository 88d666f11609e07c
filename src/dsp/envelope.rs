/*
Exponential ADSR Envelope
=========================

An envelope shapes a voice's level over the lifetime of a note. This one uses
one-pole exponential segments instead of straight lines, which is how analog
envelope generators behave (a capacitor charging through a resistor).

Vocabulary
----------

  level       Current output, always within [0, 1].

  stage       Idle, Attack, Decay, Sustain or Release. A state machine governs
              transitions.

  gate        Note on/off. gate(true) forces Attack from any stage, so a
              retrigger starts climbing from the current level rather than
              jumping to zero. gate(false) forces Release unless Idle.

  ratio       How far past the segment's target the exponential curve is
              aimed. A curve aimed exactly at its target never reaches it; a
              curve aimed slightly beyond crosses it in finite time, at which
              point we clamp and change stage. Small ratios give strongly
              curved segments, large ratios approach a straight line.


The Math: One Multiply-Add Per Sample
-------------------------------------

Each segment runs

    level = base + level · coef

with

    coef = exp(-ln((1 + ratio) / ratio) / rate_samples)

Starting at the segment's origin, after `rate_samples` iterations the level
has covered exactly the distance from origin to target. The base term sets
the point the curve is heading for:

    attack   base = (1 + ratio_a) · (1 - coef_a)          heads for 1 + ratio_a
    decay    base = (sustain - ratio_dr) · (1 - coef_d)   heads for sustain - ratio_dr
    release  base = -ratio_dr · (1 - coef_r)              heads for -ratio_dr

A rate of zero samples gives coef = 0, so the very next sample lands on (or
past) the target: an instantaneous segment with no special casing.


The State Machine
-----------------

    Idle ──gate on──→ Attack ──level ≥ 1──→ Decay ──level ≤ S──→ Sustain
     ↑                  │                    │                     │
     │                  └──────gate off──────┴─────────────────────┤
     │                                                             ↓
     └──────────────────────────level ≤ 0─────────────────── Release
*/

const ATTACK_RATIO: f32 = 0.3;
const DECAY_RELEASE_RATIO: f32 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Adsr {
    stage: EnvelopeStage,
    level: f32,

    sustain: f32,
    attack_coef: f32,
    attack_base: f32,
    decay_coef: f32,
    decay_base: f32,
    release_coef: f32,
    release_base: f32,

    // Segment lengths in samples, kept so sustain changes can rebuild decay_base.
    decay_samples: f32,
}

impl Adsr {
    /// Build an envelope from segment lengths in samples and a sustain level.
    pub fn new(attack_samples: f32, decay_samples: f32, sustain: f32, release_samples: f32) -> Self {
        let mut env = Self {
            stage: EnvelopeStage::Idle,
            level: 0.0,
            sustain: 0.0,
            attack_coef: 0.0,
            attack_base: 0.0,
            decay_coef: 0.0,
            decay_base: 0.0,
            release_coef: 0.0,
            release_base: 0.0,
            decay_samples: 0.0,
        };
        env.set_attack(attack_samples);
        env.set_decay(decay_samples);
        env.set_sustain(sustain);
        env.set_release(release_samples);
        env
    }

    pub fn set_attack(&mut self, samples: f32) {
        self.attack_coef = segment_coef(samples, ATTACK_RATIO);
        self.attack_base = (1.0 + ATTACK_RATIO) * (1.0 - self.attack_coef);
    }

    pub fn set_decay(&mut self, samples: f32) {
        self.decay_samples = samples;
        self.decay_coef = segment_coef(samples, DECAY_RELEASE_RATIO);
        self.decay_base = (self.sustain - DECAY_RELEASE_RATIO) * (1.0 - self.decay_coef);
    }

    pub fn set_sustain(&mut self, sustain: f32) {
        self.sustain = if sustain.is_finite() { sustain.clamp(0.0, 1.0) } else { 0.0 };
        self.decay_base = (self.sustain - DECAY_RELEASE_RATIO) * (1.0 - self.decay_coef);
    }

    pub fn set_release(&mut self, samples: f32) {
        self.release_coef = segment_coef(samples, DECAY_RELEASE_RATIO);
        self.release_base = -DECAY_RELEASE_RATIO * (1.0 - self.release_coef);
    }

    pub fn gate(&mut self, on: bool) {
        if on {
            self.stage = EnvelopeStage::Attack;
        } else if self.stage != EnvelopeStage::Idle {
            self.stage = EnvelopeStage::Release;
        }
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {}

            EnvelopeStage::Attack => {
                self.level = self.attack_base + self.level * self.attack_coef;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                self.level = self.decay_base + self.level * self.decay_coef;
                if self.level <= self.sustain {
                    self.level = self.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                // Follows sustain edits while the note is held
                self.level = self.sustain;
            }

            EnvelopeStage::Release => {
                self.level = self.release_base + self.level * self.release_coef;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        self.level = self.level.clamp(0.0, 1.0);
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
    }
}

/// `exp(-ln((1 + ratio) / ratio) / samples)`, or 0 for an instant segment.
fn segment_coef(samples: f32, ratio: f32) -> f32 {
    if !samples.is_finite() || samples <= 0.0 {
        return 0.0;
    }
    (-((1.0 + ratio) / ratio).ln() / samples).exp()
}
