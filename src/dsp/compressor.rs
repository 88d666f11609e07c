//! Feed-forward dynamics compressor.
//!
//! The detector works on the undelayed input while the audible path runs
//! through a short pre-delay buffer, so gain reduction is already under way
//! when a transient reaches the output (lookahead).
//!
//! ```text
//! input ──┬──────────────→ [pre-delay] ──────────→ (×) ──→ output
//!         │                                         ↑
//!         └→ |x| → [knee curve] → [detector] → [envelope] → sin warp → gain
//! ```
//!
//! # Static curve
//!
//! Below the threshold the curve is linear. Between threshold and
//! threshold + knee it follows `t + (1 - e^{-k(x - t)}) / k`, whose slope starts
//! at 1 and flattens. Above the knee it continues in dB with slope `1 / ratio`.
//! `k` is found by bisection so the knee's slope at its upper end matches
//! `1 / ratio`, keeping the first derivative continuous at both joins.
//!
//! # Envelope
//!
//! Control values (attack/release rate) are recomputed once per division of
//! [`DIVISION_FRAMES`] samples; the per-sample loop only does multiply-adds.
//! Release time adapts to how deep the compression is: it is a 4th-order
//! polynomial through four release-zone breakpoints, sampled at compression
//! depths of 0, 4, 8 and 12 dB below the target. Heavy compression releases
//! faster than light compression.
//!
//! # Gain warp
//!
//! The envelope is passed through `sin(π/2 · g)` before being applied. The
//! target is pre-warped with `asin` so the steady-state gain is unchanged;
//! only the shape of transitions is softened.

use std::f32::consts::FRAC_PI_2;

/// Frames between control-rate updates.
pub const DIVISION_FRAMES: usize = 32;
/// Pre-delay buffer length. Must be a power of two.
const MAX_PRE_DELAY_FRAMES: usize = 1024;
const PRE_DELAY_MASK: usize = MAX_PRE_DELAY_FRAMES - 1;
/// dB covered by one adaptive release period.
const RELEASE_SPACING_DB: f32 = 5.0;
const SATURATION_RELEASE_SECONDS: f32 = 0.0025;
const METERING_RELEASE_SECONDS: f32 = 0.325;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    pub threshold_db: f32,
    pub knee_db: f32,
    pub ratio: f32,
    /// Seconds.
    pub attack: f32,
    /// Seconds.
    pub release: f32,
    /// Seconds of lookahead.
    pub pre_delay: f32,
    pub makeup_db: f32,
    /// 0 = dry, 1 = fully compressed.
    pub blend: f32,
    /// Fractions of `release` at 12, 8, 4 and 0 dB of remaining compression.
    pub release_zones: [f32; 4],
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold_db: -24.0,
            knee_db: 30.0,
            ratio: 12.0,
            attack: 0.003,
            release: 0.25,
            pre_delay: 0.006,
            makeup_db: 0.0,
            blend: 1.0,
            release_zones: [0.09, 0.16, 0.42, 0.98],
        }
    }
}

impl CompressorSettings {
    /// Bring every field into a usable range.
    pub fn sanitized(self) -> Self {
        let finite = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };
        let defaults = Self::default();
        Self {
            threshold_db: finite(self.threshold_db, defaults.threshold_db).clamp(-100.0, 0.0),
            knee_db: finite(self.knee_db, defaults.knee_db).clamp(0.0, 40.0),
            ratio: finite(self.ratio, defaults.ratio).clamp(1.0, 20.0),
            attack: finite(self.attack, defaults.attack).clamp(0.0, 1.0),
            release: finite(self.release, defaults.release).clamp(0.0, 1.0),
            pre_delay: finite(self.pre_delay, defaults.pre_delay).max(0.0),
            makeup_db: finite(self.makeup_db, 0.0).clamp(-24.0, 24.0),
            blend: finite(self.blend, 1.0).clamp(0.0, 1.0),
            release_zones: self.release_zones.map(|z| finite(z, 0.5).clamp(0.01, 1.0)),
        }
    }
}

/// Parameters of the static curve, rebuilt only when threshold, knee or ratio change.
#[derive(Debug, Clone, Copy)]
struct Curve {
    threshold_db: f32,
    knee_db: f32,
    ratio: f32,
    linear_threshold: f32,
    slope: f32,
    knee_threshold: f32,
    knee_threshold_db: f32,
    yknee_threshold_db: f32,
    k: f32,
}

impl Curve {
    fn new(threshold_db: f32, knee_db: f32, ratio: f32) -> Self {
        let mut curve = Self {
            threshold_db,
            knee_db,
            ratio,
            linear_threshold: db_to_linear(threshold_db),
            slope: 1.0 / ratio,
            knee_threshold: 0.0,
            knee_threshold_db: 0.0,
            yknee_threshold_db: 0.0,
            k: 5.0,
        };
        curve.k = curve.k_at_slope(1.0 / ratio);
        curve.knee_threshold_db = threshold_db + knee_db;
        curve.knee_threshold = db_to_linear(curve.knee_threshold_db);
        curve.yknee_threshold_db = linear_to_db(curve.knee_curve(curve.knee_threshold, curve.k));
        curve
    }

    fn matches(&self, threshold_db: f32, knee_db: f32, ratio: f32) -> bool {
        self.threshold_db == threshold_db && self.knee_db == knee_db && self.ratio == ratio
    }

    fn knee_curve(&self, x: f32, k: f32) -> f32 {
        if x < self.linear_threshold {
            return x;
        }
        self.linear_threshold + (1.0 - (-k * (x - self.linear_threshold)).exp()) / k
    }

    fn saturate(&self, x: f32) -> f32 {
        if x < self.knee_threshold {
            self.knee_curve(x, self.k)
        } else {
            let x_db = linear_to_db(x);
            let y_db = self.yknee_threshold_db + self.slope * (x_db - self.knee_threshold_db);
            db_to_linear(y_db)
        }
    }

    fn slope_at(&self, x: f32, k: f32) -> f32 {
        if x < self.linear_threshold {
            return 1.0;
        }
        let x2 = x * 1.001;
        let x_db = linear_to_db(x);
        let x2_db = linear_to_db(x2);
        let y_db = linear_to_db(self.knee_curve(x, k));
        let y2_db = linear_to_db(self.knee_curve(x2, k));
        (y2_db - y_db) / (x2_db - x_db)
    }

    fn k_at_slope(&self, desired_slope: f32) -> f32 {
        let x = db_to_linear(self.threshold_db + self.knee_db);
        let mut min_k = 0.1f32;
        let mut max_k = 10_000.0f32;
        let mut k = 5.0f32;

        for _ in 0..15 {
            // Larger k flattens the knee faster
            if self.slope_at(x, k) < desired_slope {
                max_k = k;
            } else {
                min_k = k;
            }
            k = (min_k * max_k).sqrt();
        }
        k
    }
}

pub struct Compressor {
    sample_rate: f32,
    settings: CompressorSettings,
    curve: Curve,

    pre_delay: Vec<f32>,
    pre_delay_frames: usize,
    read_index: usize,
    write_index: usize,

    detector_average: f32,
    compressor_gain: f32,
    max_attack_compression_db: f32,
    metering_gain_db: f32,
    metering_release_k: f32,

    // Control-rate state, refreshed at the start of each division
    frame_in_division: usize,
    envelope_rate: f32,
    scaled_desired_gain: f32,
    master_linear_gain: f32,
    sat_release_frames: f32,
}

impl Compressor {
    pub fn new(sample_rate: f32, settings: CompressorSettings) -> Self {
        let settings = settings.sanitized();
        let sample_rate = sample_rate.max(1.0);
        let mut compressor = Self {
            sample_rate,
            settings,
            curve: Curve::new(settings.threshold_db, settings.knee_db, settings.ratio),
            pre_delay: vec![0.0; MAX_PRE_DELAY_FRAMES],
            pre_delay_frames: 0,
            read_index: 0,
            write_index: 0,
            detector_average: 1.0,
            compressor_gain: 1.0,
            max_attack_compression_db: -1.0,
            metering_gain_db: 0.0,
            metering_release_k: 1.0
                - (-1.0 / (METERING_RELEASE_SECONDS * sample_rate)).exp(),
            frame_in_division: 0,
            envelope_rate: 1.0,
            scaled_desired_gain: 1.0,
            master_linear_gain: 1.0,
            sat_release_frames: SATURATION_RELEASE_SECONDS * sample_rate,
        };
        compressor.apply_pre_delay();
        compressor
    }

    /// Replace the settings. The static curve is only rebuilt when its inputs change.
    pub fn set_settings(&mut self, settings: CompressorSettings) {
        let settings = settings.sanitized();
        if !self
            .curve
            .matches(settings.threshold_db, settings.knee_db, settings.ratio)
        {
            self.curve = Curve::new(settings.threshold_db, settings.knee_db, settings.ratio);
        }
        self.settings = settings;
        self.apply_pre_delay();
    }

    pub fn settings(&self) -> &CompressorSettings {
        &self.settings
    }

    /// Current gain reduction in dB (0 or negative), smoothed for display.
    pub fn reduction_db(&self) -> f32 {
        self.metering_gain_db
    }

    /// Process one sample.
    pub fn process(&mut self, input: f32) -> f32 {
        if self.frame_in_division == 0 {
            self.update_division();
        }
        self.frame_in_division = (self.frame_in_division + 1) % DIVISION_FRAMES;

        let input = if input.is_finite() { input } else { 0.0 };
        self.pre_delay[self.write_index] = input;

        // Shaped power on the undelayed input
        let abs_input = input.abs();
        let shaped = self.curve.saturate(abs_input);
        let attenuation = if abs_input <= 0.0001 { 1.0 } else { shaped / abs_input };

        let attenuation_db = (-linear_to_db(attenuation)).max(2.0);
        let sat_release_rate = db_to_linear(attenuation_db / self.sat_release_frames) - 1.0;

        let rate = if attenuation > self.detector_average {
            sat_release_rate
        } else {
            1.0
        };
        self.detector_average += (attenuation - self.detector_average) * rate;
        self.detector_average = self.detector_average.min(1.0);
        if !self.detector_average.is_finite() {
            self.detector_average = 1.0;
        }

        if self.envelope_rate < 1.0 {
            // Attack: move towards the desired gain
            self.compressor_gain +=
                (self.scaled_desired_gain - self.compressor_gain) * self.envelope_rate;
        } else {
            // Release: grow exponentially back to unity
            self.compressor_gain = (self.compressor_gain * self.envelope_rate).min(1.0);
        }

        let warped_gain = (FRAC_PI_2 * self.compressor_gain).sin();
        let dry = 1.0 - self.settings.blend;
        let total_gain = dry + self.settings.blend * self.master_linear_gain * warped_gain;

        let real_gain_db = linear_to_db(warped_gain);
        if real_gain_db < self.metering_gain_db {
            self.metering_gain_db = real_gain_db;
        } else {
            self.metering_gain_db += (real_gain_db - self.metering_gain_db) * self.metering_release_k;
        }

        let output = self.pre_delay[self.read_index] * total_gain;
        self.read_index = (self.read_index + 1) & PRE_DELAY_MASK;
        self.write_index = (self.write_index + 1) & PRE_DELAY_MASK;

        if output.is_finite() {
            output
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        self.pre_delay.fill(0.0);
        self.read_index = 0;
        self.write_index = self.pre_delay_frames;
        self.detector_average = 1.0;
        self.compressor_gain = 1.0;
        self.max_attack_compression_db = -1.0;
        self.metering_gain_db = 0.0;
        self.frame_in_division = 0;
    }

    fn apply_pre_delay(&mut self) {
        let frames = ((self.settings.pre_delay * self.sample_rate) as usize).min(MAX_PRE_DELAY_FRAMES - 1);
        if frames != self.pre_delay_frames {
            self.pre_delay_frames = frames;
            self.pre_delay.fill(0.0);
            self.read_index = 0;
            self.write_index = frames;
        }
    }

    fn update_division(&mut self) {
        let s = self.settings;

        // Makeup: undo part of the gain the curve removes at full scale
        let full_range_gain = self.curve.saturate(1.0);
        let full_range_makeup = (1.0 / full_range_gain).powf(0.6);
        self.master_linear_gain = db_to_linear(s.makeup_db) * full_range_makeup;

        let attack_frames = s.attack.max(0.001) * self.sample_rate;
        let release_frames = s.release * self.sample_rate;

        let desired_gain = if self.detector_average.is_finite() {
            self.detector_average.clamp(0.0, 1.0)
        } else {
            1.0
        };
        // Pre-warp so the sin() warp lands on desired_gain
        self.scaled_desired_gain = desired_gain.asin() / FRAC_PI_2;

        let is_releasing = self.scaled_desired_gain > self.compressor_gain;
        let compression_diff_db = linear_to_db(self.compressor_gain / self.scaled_desired_gain);

        if is_releasing {
            self.max_attack_compression_db = -1.0;
            let diff = if compression_diff_db.is_finite() { compression_diff_db } else { -1.0 };

            // -12..0 dB mapped onto 0..3 across the four release zones
            let x = 0.25 * (diff.clamp(-12.0, 0.0) + 12.0);
            let frames = adaptive_release_frames(release_frames, &s.release_zones, x).max(1.0);
            self.envelope_rate = db_to_linear(RELEASE_SPACING_DB / frames);
        } else {
            let diff = if compression_diff_db.is_finite() { compression_diff_db } else { 1.0 };
            // Attack rate follows the deepest reduction seen in this attack
            if self.max_attack_compression_db == -1.0 || self.max_attack_compression_db < diff {
                self.max_attack_compression_db = diff;
            }
            let effective_db = self.max_attack_compression_db.max(0.5);
            let x = 0.25 / effective_db;
            self.envelope_rate = 1.0 - x.powf(1.0 / attack_frames);
        }
    }
}

/// Evaluate the 4th-order release polynomial at `x` in [0, 3].
///
/// The coefficients interpolate the four release-zone frame counts at x = 0,
/// 1, 2 and 3 with a smooth monotonic curve.
fn adaptive_release_frames(release_frames: f32, zones: &[f32; 4], x: f32) -> f32 {
    let y1 = release_frames * zones[0];
    let y2 = release_frames * zones[1];
    let y3 = release_frames * zones[2];
    let y4 = release_frames * zones[3];

    let a = 0.999_999_999_999_999_8 * y1 + 1.843_221_968_432_392_3e-16 * y2
        - 1.937_339_435_167_642_3e-16 * y3
        + 8.824_516_011_816_245e-18 * y4;
    let b = -1.578_832_035_284_588_8 * y1 + 2.330_583_703_207_428_6 * y2
        - 0.914_119_420_484_042_9 * y3
        + 0.162_367_752_561_203_2 * y4;
    let c = 0.533_414_286_910_642_4 * y1 - 1.272_736_789_213_631 * y2
        + 0.925_885_604_220_751_2 * y3
        - 0.186_563_101_917_762_26 * y4;
    let d = 0.087_834_631_382_072_34 * y1 - 0.169_416_296_792_562_2 * y2
        + 0.085_880_579_515_952_72 * y3
        - 0.004_298_914_105_462_83 * y4;
    let e = -0.042_416_883_008_123_074 * y1 + 0.111_569_382_798_760_2 * y2
        - 0.097_646_763_252_658_72 * y3
        + 0.028_494_263_462_021_576 * y4;

    let x2 = x * x;
    let x3 = x2 * x;
    let x4 = x2 * x2;
    a + b * x + c * x2 + d * x3 + e * x4
}

#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10f32.powf(0.05 * db)
}

#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    // Avoid -inf for silence
    20.0 * linear.max(1.0e-9).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(compressor: &mut Compressor, amplitude: f32, samples: usize) -> f32 {
        let mut peak = 0.0f32;
        for n in 0..samples {
            let x = amplitude * (n as f32 * 0.05).sin();
            peak = peak.max(compressor.process(x).abs());
        }
        peak
    }

    #[test]
    fn quiet_signals_pass_nearly_unchanged() {
        let settings = CompressorSettings {
            threshold_db: -6.0,
            knee_db: 0.0,
            ratio: 4.0,
            ..Default::default()
        };
        let mut compressor = Compressor::new(44_100.0, settings);
        let makeup = compressor.master_linear_gain_for_test();

        run(&mut compressor, 0.05, 4_410);
        let peak = run(&mut compressor, 0.05, 4_410);
        assert!((peak - 0.05 * makeup).abs() < 0.01, "peak {peak}, makeup {makeup}");
    }

    #[test]
    fn loud_signals_are_reduced() {
        let settings = CompressorSettings {
            threshold_db: -30.0,
            knee_db: 6.0,
            ratio: 10.0,
            makeup_db: 0.0,
            ..Default::default()
        };
        let mut compressor = Compressor::new(44_100.0, settings);
        let makeup = compressor.master_linear_gain_for_test();

        run(&mut compressor, 1.0, 44_100);
        let peak = run(&mut compressor, 1.0, 4_410);
        assert!(peak < 0.9 * makeup, "expected gain reduction, peak {peak}");
        assert!(compressor.reduction_db() < -1.0);
    }

    #[test]
    fn output_stays_finite_under_abuse() {
        let mut compressor = Compressor::new(44_100.0, CompressorSettings::default());
        for n in 0..10_000 {
            let x = match n % 4 {
                0 => f32::NAN,
                1 => 1.0e6,
                2 => -1.0e6,
                _ => 0.0,
            };
            assert!(compressor.process(x).is_finite());
        }
    }

    #[test]
    fn pre_delay_shifts_the_signal() {
        let settings = CompressorSettings {
            pre_delay: 0.001,
            threshold_db: 0.0,
            blend: 0.0,
            ..Default::default()
        };
        // 44 frames of lookahead, fully dry so the gain is exactly 1
        let mut compressor = Compressor::new(44_000.0, settings);
        let mut out = Vec::new();
        for n in 0..100 {
            out.push(compressor.process(if n == 0 { 1.0 } else { 0.0 }));
        }
        assert_eq!(out[44], 1.0);
        assert!(out[..44].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn release_polynomial_hits_zone_breakpoints() {
        let zones = [0.09, 0.16, 0.42, 0.98];
        for (x, zone) in zones.iter().enumerate() {
            let frames = adaptive_release_frames(1_000.0, &zones, x as f32);
            assert!((frames - zone * 1_000.0).abs() < 0.5, "x={x}: {frames}");
        }
    }

    impl Compressor {
        fn master_linear_gain_for_test(&mut self) -> f32 {
            self.update_division();
            self.master_linear_gain
        }
    }
}
