//! Integration tests for the render pipeline.
//!
//! Tests the full path: pattern JSON → SampleStore → render → WAV bytes.
//! Output is read back with hound; no audio hardware required.

use std::io::Cursor;

use serde_json::json;
use stepwave::render::OUTPUT_CHANNELS;
use stepwave::wav::{self, HEADER_LEN};
use stepwave::{render, render_to_wav, Envelope, Pattern, RenderError, SampleStore, Track};

fn every_fourth() -> Vec<u8> {
    (0..64).map(|i| u8::from(i % 4 == 0)).collect()
}

fn pattern_json(bpm: u32, bars: u32, tracks: Vec<serde_json::Value>) -> String {
    json!({ "meta": { "bpm": bpm, "bars": bars }, "tracks": tracks }).to_string()
}

fn dry() -> serde_json::Value {
    json!({ "attack": 0.0, "decay": 0.0, "sustain": 1.0, "release": 0.0 })
}

fn adsr(attack: f64, decay: f64, sustain: f64, release: f64) -> serde_json::Value {
    json!({ "attack": attack, "decay": decay, "sustain": sustain, "release": release })
}

fn track_json(id: &str, drum: &str, steps: &[u8], adsr: serde_json::Value) -> serde_json::Value {
    json!({ "id": id, "type": "drum", "drum": drum, "steps": steps, "adsr": adsr })
}

fn decode(bytes: &[u8]) -> (hound::WavSpec, Vec<i16>) {
    let reader = hound::WavReader::new(Cursor::new(bytes.to_vec())).unwrap();
    let spec = reader.spec();
    let samples = reader.into_samples::<i16>().map(Result::unwrap).collect();
    (spec, samples)
}

fn data_len_field(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]])
}

#[test]
fn kick_on_every_beat_at_120_bpm() {
    let kick = track_json("d_kick", "kick", &every_fourth(), dry());
    let json = pattern_json(120, 4, vec![kick]);
    let pattern = Pattern::from_json(&json).unwrap();
    let store = SampleStore::embedded();
    let rate = store.sample_rate();

    assert!((pattern.seconds_per_step() - 0.125).abs() < 1e-12);
    assert!((pattern.duration_secs() - 8.0).abs() < 1e-12);

    let bytes = render_to_wav(&pattern, &store).unwrap();
    assert_eq!(data_len_field(&bytes), 8 * rate * 2 * 2);
    assert_eq!(bytes.len(), HEADER_LEN + (8 * rate * 2 * 2) as usize);

    let (spec, samples) = decode(&bytes);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, rate);
    assert_eq!(spec.bits_per_sample, 16);

    let kick = store.get("kick").unwrap();
    let first = wav::quantize(kick.channel(0)[0]);
    assert_ne!(first, 0);

    for beat in 0..16usize {
        let onset = (beat as f64 * 0.5 * rate as f64).round() as usize;
        assert_eq!(samples[onset * 2], first, "left onset of beat {beat}");
        assert_eq!(samples[onset * 2 + 1], first, "right onset of beat {beat}");
        if onset > 0 {
            // The quarter-second kick has died out well before the next beat.
            assert_eq!(samples[(onset - 1) * 2], 0, "silence before beat {beat}");
        }
    }
}

#[test]
fn four_bars_span_sixty_four_steps() {
    let store = SampleStore::embedded();
    for bpm in [80, 97, 113, 120, 133, 160] {
        let pattern = Pattern::new(bpm, 4).with_track(Track::new(
            "k",
            "kick",
            every_fourth(),
            Envelope::PASSTHROUGH,
        ));
        let buffer = render(&pattern, &store).unwrap();
        let expected = 64.0 * pattern.seconds_per_step() * store.sample_rate() as f64;
        let frames = buffer.frames() as f64;
        assert!(
            (frames - expected).abs() <= 1.0,
            "bpm {bpm}: {frames} frames, expected {expected}"
        );
        assert_eq!(buffer.channels(), OUTPUT_CHANNELS);
    }
}

#[test]
fn identical_inputs_give_identical_bytes() {
    let json = pattern_json(
        104,
        4,
        vec![
            track_json("k", "kick", &every_fourth(), adsr(0.0, 0.05, 0.8, 0.05)),
            track_json("s", "snare", &[0, 0, 0, 0, 1, 0, 0, 1], adsr(0.001, 0.02, 0.6, 0.1)),
            track_json("h", "hihat", &[1; 64], dry()),
            track_json("o", "open_hat", &[0, 0, 1, 0, 0, 0, 1, 0], dry()),
            track_json("c", "clap", &[0, 0, 0, 0, 1], dry()),
        ],
    );
    let pattern = Pattern::from_json(&json).unwrap();

    let store = SampleStore::embedded();
    let first = render_to_wav(&pattern, &store).unwrap();
    let second = render_to_wav(&pattern, &store).unwrap();
    assert_eq!(first, second);

    let fresh = render_to_wav(&pattern, &SampleStore::embedded()).unwrap();
    assert_eq!(first, fresh);
}

#[test]
fn all_zero_steps_give_silent_payload() {
    let json = pattern_json(
        120,
        4,
        vec![
            track_json("k", "kick", &[0; 64], dry()),
            track_json("s", "snare", &[0; 64], dry()),
            track_json("h", "hihat", &[], dry()),
        ],
    );
    let pattern = Pattern::from_json(&json).unwrap();
    let bytes = render_to_wav(&pattern, &SampleStore::embedded()).unwrap();
    assert!(bytes.len() > HEADER_LEN);
    assert!(bytes[HEADER_LEN..].iter().all(|&b| b == 0));
}

#[test]
fn stacked_voices_saturate_instead_of_wrapping() {
    let store = SampleStore::embedded();
    let kick = store.get("kick").unwrap();
    let mut pattern = Pattern::new(120, 4);
    for id in ["a", "b", "c", "d"] {
        pattern = pattern.with_track(Track::new(id, "kick", vec![1], Envelope::PASSTHROUGH));
    }

    let bytes = render_to_wav(&pattern, &store).unwrap();
    let (_, samples) = decode(&bytes);

    let mut saturated = 0;
    for (i, &k) in kick.channel(0).iter().enumerate() {
        let encoded = samples[i * 2];
        let summed = 4.0 * k;
        if summed >= 1.0 {
            assert_eq!(encoded, i16::MAX, "frame {i}");
            saturated += 1;
        } else if summed <= -1.0 {
            assert_eq!(encoded, i16::MIN, "frame {i}");
            saturated += 1;
        } else {
            assert_eq!(encoded, wav::quantize(summed), "frame {i}");
        }
    }
    assert!(saturated > 0, "expected some frames above full scale");
}

#[test]
fn unknown_drum_is_left_out_of_the_mix() {
    let store = SampleStore::embedded();
    let with_unknown = Pattern::from_json(&pattern_json(
        120,
        4,
        vec![
            track_json("k", "kick", &every_fourth(), dry()),
            track_json("x", "nonexistent", &[1; 64], dry()),
        ],
    ))
    .unwrap();
    let kick_only = Pattern::from_json(&pattern_json(
        120,
        4,
        vec![track_json("k", "kick", &every_fourth(), dry())],
    ))
    .unwrap();

    assert_eq!(
        render_to_wav(&with_unknown, &store).unwrap(),
        render_to_wav(&kick_only, &store).unwrap()
    );
}

#[test]
fn short_and_long_step_arrays_render_like_their_repair() {
    let store = SampleStore::embedded();
    let raw = Pattern::from_json(&pattern_json(
        120,
        4,
        vec![
            track_json("k", "kick", &[1, 0, 0, 0, 1], dry()),
            track_json("h", "hihat", &[1; 90], dry()),
        ],
    ))
    .unwrap();
    let repaired = raw.repaired();
    assert!(repaired.tracks.iter().all(|t| t.steps.len() == 64));
    assert_eq!(
        render_to_wav(&raw, &store).unwrap(),
        render_to_wav(&repaired, &store).unwrap()
    );
}

#[test]
fn envelope_release_fades_each_hit() {
    let store = SampleStore::embedded();
    let open_hat = store.get("open_hat").unwrap();
    let release = open_hat.duration_secs() / 2.0;
    let pattern = Pattern::new(120, 4).with_track(Track::new(
        "o",
        "open_hat",
        vec![1],
        Envelope {
            attack: 0.0,
            decay: 0.0,
            sustain: 1.0,
            release,
        },
    ));
    let buffer = render(&pattern, &store).unwrap();
    let frames = open_hat.frames();
    let first_half = frames / 2;

    // Untouched before the release window.
    for i in 0..first_half - 1 {
        assert_eq!(buffer.frame(i)[0], open_hat.channel(0)[i], "frame {i}");
    }
    // Attenuated inside it, and never louder than the dry sample.
    for i in first_half + 1..frames {
        assert!(buffer.frame(i)[0].abs() <= open_hat.channel(0)[i].abs(), "frame {i}");
    }
    let tail = frames - 10;
    assert!(buffer.frame(tail)[0].abs() < 0.01);
}

#[test]
fn resampled_store_renders_at_its_own_rate() {
    let store = SampleStore::with_sample_rate(22050);
    let pattern = Pattern::new(120, 4)
        .with_track(Track::new("k", "kick", every_fourth(), Envelope::PASSTHROUGH));
    let bytes = render_to_wav(&pattern, &store).unwrap();
    let (spec, samples) = decode(&bytes);
    assert_eq!(spec.sample_rate, 22050);
    assert_eq!(samples.len(), 8 * 22050 * 2);
    assert_ne!(samples[11025 * 2], 0);
}

#[test]
fn broken_embedded_source_only_silences_its_own_track() {
    let good = SampleStore::embedded();
    let kick_b64 = stepwave::sample::kit::KIT
        .iter()
        .find(|(key, _)| *key == "kick")
        .map(|(_, text)| *text)
        .unwrap();
    let store = SampleStore::from_sources(
        44100,
        vec![("kick", kick_b64), ("clap", "UklGRkoAAABXQVZFZm10IBIAAAABAAEA-g")],
    );
    assert!(store.failure("clap").is_some());

    let pattern = Pattern::new(120, 4)
        .with_track(Track::new("k", "kick", every_fourth(), Envelope::PASSTHROUGH))
        .with_track(Track::new("c", "clap", vec![1; 64], Envelope::PASSTHROUGH));
    let kick_only = Pattern::new(120, 4)
        .with_track(Track::new("k", "kick", every_fourth(), Envelope::PASSTHROUGH));

    assert_eq!(
        render_to_wav(&pattern, &store).unwrap(),
        render_to_wav(&kick_only, &good).unwrap()
    );
}

#[test]
fn pattern_longer_than_a_wav_file_is_an_error() {
    let json = pattern_json(80, 10_000, vec![track_json("k", "kick", &every_fourth(), dry())]);
    let pattern = Pattern::from_json(&json).unwrap();
    let err = render_to_wav(&pattern, &SampleStore::embedded()).unwrap_err();
    match err {
        RenderError::TooLong { frames } => assert!(frames > wav::max_frames(OUTPUT_CHANNELS)),
        other => panic!("expected TooLong, got {other:?}"),
    }
}
