//! PCM sample library read by Sampler nodes.
//!
//! Samples are decoded and validated on the editor thread; the audio thread
//! only ever sees finished, immutable buffers behind an `Arc`.

use core::fmt;
use std::{io::Read, path::Path, sync::Arc};

use hashbrown::HashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SampleError;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId(pub u32);

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sample#{}", self.0)
    }
}

/// Mono PCM at its original rate.
#[derive(Debug, Clone)]
pub struct Sample {
    pub name: String,
    pub data: Arc<[f32]>,
    pub sample_rate: u32,
    /// Seconds.
    pub duration: f32,
}

impl Sample {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Longest accepted sample, in seconds, for a source rate.
pub fn duration_limit(sample_rate: u32) -> f32 {
    if sample_rate > 44_100 {
        5.0
    } else {
        10.0
    }
}

/// Validate raw PCM and wrap it as a [`Sample`].
pub fn validate(name: &str, pcm: Vec<f32>, sample_rate: u32) -> Result<Sample, SampleError> {
    if sample_rate == 0 {
        return Err(SampleError::InvalidRate(sample_rate));
    }
    if pcm.is_empty() {
        return Err(SampleError::Empty);
    }

    let duration = pcm.len() as f32 / sample_rate as f32;
    let limit = duration_limit(sample_rate);
    if duration > limit {
        return Err(SampleError::TooLong {
            duration,
            sample_rate,
            limit,
        });
    }

    let data: Arc<[f32]> = pcm
        .into_iter()
        .map(|x| if x.is_finite() { x } else { 0.0 })
        .collect();

    Ok(Sample {
        name: name.to_string(),
        data,
        sample_rate,
        duration,
    })
}

/// Decode a WAV stream to mono f32, averaging channels.
pub fn decode_wav<R: Read>(source: R) -> Result<(Vec<f32>, u32), SampleError> {
    let mut reader = hound::WavReader::new(source)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let max_val = (1u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<_, _>>()?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    Ok((mono, spec.sample_rate))
}

#[derive(Debug, Clone, Default)]
pub struct SampleLibrary {
    samples: HashMap<SampleId, Sample>,
    next_id: u32,
}

impl SampleLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add raw mono PCM. Rejects empty data, a zero rate and overlong samples.
    pub fn add(&mut self, name: &str, pcm: Vec<f32>, sample_rate: u32) -> Result<SampleId, SampleError> {
        let sample = validate(name, pcm, sample_rate)?;
        let id = SampleId(self.next_id);
        self.next_id += 1;
        debug!(%id, name, frames = sample.len(), sample_rate, "sample added");
        self.samples.insert(id, sample);
        Ok(id)
    }

    /// Decode a WAV file and add it under its file stem.
    pub fn load_wav(&mut self, path: impl AsRef<Path>) -> Result<SampleId, SampleError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(hound::Error::IoError)?;
        let (pcm, sample_rate) = decode_wav(std::io::BufReader::new(file))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.add(&name, pcm, sample_rate)
    }

    /// Insert under a fixed id, replacing whatever was there.
    pub(crate) fn insert(&mut self, id: SampleId, sample: Sample) {
        self.next_id = self.next_id.max(id.0 + 1);
        self.samples.insert(id, sample);
    }

    pub fn get(&self, id: SampleId) -> Option<&Sample> {
        self.samples.get(&id)
    }

    pub fn remove(&mut self, id: SampleId) -> Option<Sample> {
        self.samples.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SampleId, &Sample)> {
        let mut entries: Vec<_> = self.samples.iter().map(|(&id, sample)| (id, sample)).collect();
        entries.sort_unstable_by_key(|(id, _)| *id);
        entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_depends_on_rate() {
        assert_eq!(duration_limit(44_100), 10.0);
        assert_eq!(duration_limit(48_000), 5.0);
    }

    #[test]
    fn add_and_get() {
        let mut library = SampleLibrary::new();
        let id = library.add("click", vec![1.0, 0.5, 0.0], 44_100).unwrap();
        let sample = library.get(id).unwrap();
        assert_eq!(sample.name, "click");
        assert_eq!(sample.len(), 3);
        assert!((sample.duration - 3.0 / 44_100.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_input() {
        let mut library = SampleLibrary::new();
        assert!(matches!(library.add("a", vec![], 44_100), Err(SampleError::Empty)));
        assert!(matches!(library.add("b", vec![0.0], 0), Err(SampleError::InvalidRate(0))));

        // 6 s at 48 kHz exceeds the 5 s cap
        let long = vec![0.0; 48_000 * 6];
        assert!(matches!(
            library.add("c", long, 48_000),
            Err(SampleError::TooLong { .. })
        ));
        // but 6 s at 44.1 kHz is fine
        assert!(library.add("d", vec![0.0; 44_100 * 6], 44_100).is_ok());
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn non_finite_pcm_is_zeroed() {
        let mut library = SampleLibrary::new();
        let id = library.add("bad", vec![f32::NAN, 0.5], 8_000).unwrap();
        assert_eq!(&library.get(id).unwrap().data[..], &[0.0, 0.5]);
    }

    #[test]
    fn ids_are_not_reused() {
        let mut library = SampleLibrary::new();
        let a = library.add("a", vec![0.0], 8_000).unwrap();
        library.remove(a);
        let b = library.add("b", vec![0.0], 8_000).unwrap();
        assert_ne!(a, b);
    }
}
