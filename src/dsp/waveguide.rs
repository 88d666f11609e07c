/*
Wave-Guide (Feedback Delay Line)
================================

A circular buffer written once per sample and read some distance behind the
write head. Reading at a fractional distance needs interpolation; without it
a delay time that sweeps (chorus, flanger) snaps between whole samples and
produces zipper noise and comb artifacts.

Reads use 4-point cubic (Catmull-Rom) interpolation over the neighbours of
the read position:

      y0      y1  ·   y2      y3
    ──●───────●───x───●───────●──→ newer
              ↑   ↑
              i   i + frac

    c0 = y1
    c1 = ½(y2 - y0)
    c2 = y0 - 2.5·y1 + 2·y2 - ½·y3
    c3 = ½(y3 - y0) + 1.5·(y1 - y2)
    y  = ((c3·frac + c2)·frac + c1)·frac + c0

At frac = 0 this returns y1 exactly, so integer delays are bit-exact.

Feedback: the value written is input + feedback · delayed output, which turns
the line into a recirculating echo. The delayed output is read before the
write so a delay of D samples returns the input from exactly D ticks ago.
*/

/// Default buffer length: 0.5 s at 44.1 kHz.
pub const WAVEGUIDE_CAPACITY: usize = 22_050;

/// Slots kept beyond the longest delay for the interpolation taps.
const TAP_HEADROOM: usize = 3;

pub struct WaveGuide {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl WaveGuide {
    pub fn new() -> Self {
        Self::with_capacity(WAVEGUIDE_CAPACITY)
    }

    /// A line able to hold at least `max_delay` samples of history.
    pub fn with_max_delay(max_delay: f32) -> Self {
        let samples = if max_delay.is_finite() { max_delay.ceil().max(1.0) as usize } else { 1 };
        Self::with_capacity(samples + TAP_HEADROOM)
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(TAP_HEADROOM + 1)],
            write_pos: 0,
        }
    }

    /// Largest delay a read can request, leaving room for the interpolation taps.
    pub fn max_delay(&self) -> f32 {
        (self.buffer.len() - TAP_HEADROOM) as f32
    }

    /// Read the sample written `delay_samples` ticks ago.
    ///
    /// The delay is clamped to `[1, max_delay()]`.
    pub fn read(&self, delay_samples: f32) -> f32 {
        let delay = if delay_samples.is_finite() {
            delay_samples.clamp(1.0, self.max_delay())
        } else {
            1.0
        };

        let cap = self.buffer.len();
        let position = (self.write_pos as f32 - delay).rem_euclid(cap as f32);
        let index = position.floor();
        let frac = position - index;
        let i = index as usize % cap;

        let y1 = self.buffer[i];
        if frac == 0.0 {
            return y1;
        }

        let y0 = self.buffer[(i + cap - 1) % cap];
        let y2 = self.buffer[(i + 1) % cap];
        // Under two samples back y2 is the newest write; the slot after it is
        // the oldest in the ring, so hold y2 instead
        let y3 = if delay < 2.0 { y2 } else { self.buffer[(i + 2) % cap] };

        cubic(y0, y1, y2, y3, frac)
    }

    /// Push one sample at the write head.
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = if sample.is_finite() { sample } else { 0.0 };
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Read the delayed output, then write the input plus attenuated feedback.
    pub fn tick(&mut self, input: f32, delay_samples: f32, feedback: f32) -> f32 {
        let delayed = self.read(delay_samples);
        self.write(input + delayed * feedback.clamp(-0.99, 0.99));
        delayed
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for WaveGuide {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn cubic(y0: f32, y1: f32, y2: f32, y3: f32, frac: f32) -> f32 {
    let c0 = y1;
    let c1 = 0.5 * (y2 - y0);
    let c2 = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
    let c3 = 0.5 * (y3 - y0) + 1.5 * (y1 - y2);
    ((c3 * frac + c2) * frac + c1) * frac + c0
}
