//! Stepwave — render a drum pattern to a WAV file.
//!
//! Reads a pattern JSON file (or uses a built-in four-bar groove), renders it
//! against the embedded kit, and writes a 16-bit stereo WAV.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use stepwave::config::{self, RenderConfig};
use stepwave::{render, wav, Pattern, SampleStore};

/// Render a step-sequenced drum pattern to WAV.
#[derive(Debug, Parser)]
#[command(name = "stepwave", version, about)]
struct Cli {
    /// Pattern JSON file. Renders a built-in demo groove when omitted.
    pattern: Option<PathBuf>,

    /// Output WAV path (defaults to the config's `output`).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render config YAML (defaults to ~/.stepwave/render.yaml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// List the drums in the embedded kit and exit.
    #[arg(long)]
    list_drums: bool,
}

/// Kick on the beat, snare on 2 and 4, closed hats on eighths, open hat and clap accents.
const DEMO_PATTERN: &str = r#"{
  "meta": { "bpm": 96, "bars": 4 },
  "tracks": [
    { "id": "d_kick", "type": "drum", "drum": "kick",
      "steps": [1,0,0,0, 0,0,1,0, 1,0,0,0, 0,0,0,0, 1,0,0,0, 0,0,1,0, 1,0,0,1, 0,0,0,0,
                1,0,0,0, 0,0,1,0, 1,0,0,0, 0,0,0,0, 1,0,0,0, 0,0,1,0, 1,0,1,0, 0,0,0,0],
      "adsr": { "attack": 0.0, "decay": 0.05, "sustain": 0.9, "release": 0.05 } },
    { "id": "d_snare", "type": "drum", "drum": "snare",
      "steps": [0,0,0,0, 1,0,0,0, 0,0,0,0, 1,0,0,0, 0,0,0,0, 1,0,0,0, 0,0,0,0, 1,0,0,1,
                0,0,0,0, 1,0,0,0, 0,0,0,0, 1,0,0,0, 0,0,0,0, 1,0,0,0, 0,0,0,0, 1,0,1,1],
      "adsr": { "attack": 0.0, "decay": 0.02, "sustain": 0.8, "release": 0.04 } },
    { "id": "d_hat", "type": "drum", "drum": "hihat",
      "steps": [1,0,1,0, 1,0,1,0, 1,0,1,0, 1,0,0,0, 1,0,1,0, 1,0,1,0, 1,0,1,0, 1,0,0,0,
                1,0,1,0, 1,0,1,0, 1,0,1,0, 1,0,0,0, 1,0,1,0, 1,0,1,0, 1,0,1,0, 1,0,0,0],
      "adsr": { "attack": 0.0, "decay": 0.01, "sustain": 0.6, "release": 0.01 } },
    { "id": "d_open", "type": "drum", "drum": "open_hat",
      "steps": [0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,1,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,1,0,
                0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,1,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,1,0],
      "adsr": { "attack": 0.0, "decay": 0.1, "sustain": 0.5, "release": 0.1 } },
    { "id": "d_clap", "type": "drum", "drum": "clap",
      "steps": [0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0,
                0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0, 1,0,0,0, 0,0,0,0, 1,0,0,0],
      "adsr": { "attack": 0.0, "decay": 0.0, "sustain": 0.7, "release": 0.05 } }
  ]
}"#;

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("stepwave: {message}");
    process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let config: RenderConfig = match config::load_config(&config_path) {
        Ok(c) => c,
        Err(e) => fail(format!("{}: {e}", config_path.display())),
    };

    let store = SampleStore::with_sample_rate(config.sample_rate);

    if cli.list_drums {
        for key in store.keys() {
            println!("{key}");
        }
        for key in store.failed_keys() {
            println!("{key} (unavailable)");
        }
        return;
    }

    let json = match &cli.pattern {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => fail(format!("{}: {e}", path.display())),
        },
        None => DEMO_PATTERN.to_string(),
    };

    let pattern = match Pattern::from_json(&json) {
        Ok(p) => p,
        Err(e) => fail(e),
    };

    log::info!(
        "{} tracks, {} BPM, {} bars ({:.2} s)",
        pattern.tracks.len(),
        pattern.bpm(),
        pattern.bars(),
        pattern.duration_secs()
    );

    let buffer = match render(&pattern, &store) {
        Ok(b) => b,
        Err(e) => fail(e),
    };

    let output = cli.output.unwrap_or(config.output);
    let file = match std::fs::File::create(&output) {
        Ok(f) => std::io::BufWriter::new(f),
        Err(e) => fail(format!("{}: {e}", output.display())),
    };
    if let Err(e) = wav::encode_to(&buffer, file) {
        fail(format!("{}: {e}", output.display()));
    }

    println!(
        "wrote {} ({:.2} s, {} Hz, {} ch, {} bytes)",
        output.display(),
        buffer.duration_secs(),
        buffer.sample_rate(),
        buffer.channels(),
        wav::encoded_len(&buffer)
    );
}
