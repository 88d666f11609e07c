//! patchbay - play a node graph through the default audio device
//!
//! Run with: cargo run -- --seconds 8
//! Or load a saved patch: cargo run -- --document patch.json

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use clap::Parser;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::info;
use tracing_subscriber::EnvFilter;

use patchbay::{
    engine::AudioEngine,
    graph::{GraphDocument, NodeGraph, SharedGraph},
    EngineConfig, GraphError,
};

#[derive(Debug, Parser)]
#[command(name = "patchbay", about = "Play a patchbay node graph")]
struct Args {
    /// How long to play, in seconds.
    #[arg(long, default_value_t = 8.0)]
    seconds: f32,

    /// Global tempo.
    #[arg(long)]
    bpm: Option<f32>,

    /// Graph document (JSON) to load instead of the built-in demo.
    #[arg(long)]
    document: Option<PathBuf>,

    /// Ask the device for this rate instead of its default.
    #[arg(long)]
    sample_rate: Option<u32>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let mut stream_config: cpal::StreamConfig = supported.into();
    if let Some(rate) = args.sample_rate {
        stream_config.sample_rate = cpal::SampleRate(rate);
    }
    let channels = stream_config.channels as usize;

    let mut config = EngineConfig::default().with_sample_rate(stream_config.sample_rate.0 as f32);
    if let Some(bpm) = args.bpm {
        config = config.with_bpm(bpm);
    }

    let graph = match &args.document {
        Some(path) => {
            let text = std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
            let doc: GraphDocument = serde_json::from_str(&text).wrap_err("invalid graph document")?;
            let mut graph = NodeGraph::from_document(&doc, config)?;
            if let Some(bpm) = args.bpm {
                graph.set_bpm(bpm);
            }
            graph
        }
        None => demo_patch(config)?,
    };

    info!(
        sample_rate = config.sample_rate,
        bpm = graph.bpm(),
        channels,
        nodes = graph.node_ids().len(),
        "starting playback"
    );

    let shared = SharedGraph::new(graph);
    let (mut engine, mut samples) = AudioEngine::start(shared, &config)?;

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _| {
            // Mono to all channels; an underrun plays silence
            for frame in data.chunks_mut(channels) {
                let sample = samples.pop().unwrap_or(0.0);
                frame.fill(sample);
            }
        },
        |err| tracing::error!(%err, "audio stream error"),
        None,
    )?;
    stream.play()?;

    let started = Instant::now();
    let length = Duration::from_secs_f32(args.seconds.max(0.0));
    while started.elapsed() < length && engine.is_running() {
        thread::sleep(Duration::from_millis(50));
    }

    drop(stream);
    engine.stop();
    Ok(())
}

/// Sequencer -> Oscillator -> ADSR -> Filter -> Reverb -> Output.
fn demo_patch(config: EngineConfig) -> Result<NodeGraph, GraphError> {
    let mut graph = NodeGraph::new(config);
    let output = graph
        .output()
        .ok_or(GraphError::UnknownType("Output".into()))?;

    let sequencer = graph.add_node_with("Sequencer", &[("gate_length", 0.6)])?;
    let osc = graph.add_node_with("Oscillator", &[("waveform", 3.0), ("amplitude", 0.6)])?;
    let env = graph.add_node_with("ADSR", &[("attack", 5.0), ("decay", 120.0), ("sustain", 0.3), ("release", 150.0)])?;
    let filter = graph.add_node_with("Filter", &[("cutoff", 1_800.0)])?;
    let reverb = graph.add_node_with("Reverb", &[("mix", 0.25), ("room", 0.6)])?;

    graph.connect_named(sequencer, "frequency", osc, "frequency")?;
    graph.connect_named(sequencer, "gate", env, "gate")?;
    graph.connect_named(osc, "out", env, "in")?;
    graph.connect_named(env, "mix", filter, "in")?;
    graph.connect_named(filter, "out", reverb, "in")?;
    graph.connect_named(reverb, "out", output, "in")?;
    Ok(graph)
}
