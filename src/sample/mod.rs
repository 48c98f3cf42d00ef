//! Sample store — the drum library, decoded at most once and shared read-only.
//!
//! The store owns the encoded sources and a one-shot initialization gate.
//! The first lookup decodes the whole library; every later caller, on any
//! thread, waits for that decode and then reads the cached result. Entries
//! that fail to decode stay unavailable for the lifetime of the store.

pub mod data;
pub mod kit;
pub mod text;

pub use data::{Sample, SampleError};
pub use kit::KIT_SAMPLE_RATE;

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use rayon::prelude::*;

/// Decoded library contents.
#[derive(Default)]
struct Library {
    samples: HashMap<String, Arc<Sample>>,
    failures: HashMap<String, SampleError>,
}

/// A named collection of percussive samples at one shared sample rate.
pub struct SampleStore {
    sample_rate: u32,
    sources: Vec<(String, Cow<'static, str>)>,
    library: OnceCell<Library>,
}

impl SampleStore {
    /// The compiled-in kit at its native rate.
    pub fn embedded() -> Self {
        Self::with_sample_rate(KIT_SAMPLE_RATE)
    }

    /// The compiled-in kit, resampled to `sample_rate` on first use.
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self::from_sources(
            sample_rate,
            kit::KIT.iter().map(|&(key, text)| (key, Cow::Borrowed(text))),
        )
    }

    /// A store over arbitrary base64-encoded WAV sources.
    ///
    /// Nothing is decoded until the first lookup. A later source with the
    /// same key replaces an earlier one.
    pub fn from_sources<I, K, T>(sample_rate: u32, sources: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Cow<'static, str>>,
    {
        let mut by_key: Vec<(String, Cow<'static, str>)> = Vec::new();
        for (key, text) in sources {
            let key = key.into();
            by_key.retain(|(existing, _)| *existing != key);
            by_key.push((key, text.into()));
        }
        Self {
            sample_rate,
            sources: by_key,
            library: OnceCell::new(),
        }
    }

    /// A store over already-decoded samples, resampled to `sample_rate` where needed.
    pub fn from_samples<I, K>(sample_rate: u32, samples: I) -> Self
    where
        I: IntoIterator<Item = (K, Sample)>,
        K: Into<String>,
    {
        let library = Library {
            samples: samples
                .into_iter()
                .map(|(key, sample)| (key.into(), Arc::new(sample.resampled(sample_rate))))
                .collect(),
            failures: HashMap::new(),
        };
        Self {
            sample_rate,
            sources: Vec::new(),
            library: OnceCell::with_value(library),
        }
    }

    /// The rate every stored sample is converted to, and the rate renders run at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Decode the library now if nothing has triggered it yet.
    ///
    /// Returns the number of usable samples.
    pub fn load(&self) -> usize {
        self.library().samples.len()
    }

    /// Whether the one-time decode has completed.
    pub fn is_loaded(&self) -> bool {
        self.library.get().is_some()
    }

    /// Look up a sample by drum key.
    ///
    /// Keys that were never registered and keys whose decode failed both
    /// report [`SampleError::Unknown`].
    pub fn get(&self, key: &str) -> Result<Arc<Sample>, SampleError> {
        self.library()
            .samples
            .get(key)
            .cloned()
            .ok_or_else(|| SampleError::Unknown(key.to_string()))
    }

    /// Whether `key` resolves to a usable sample.
    pub fn contains(&self, key: &str) -> bool {
        self.library().samples.contains_key(key)
    }

    /// Usable drum keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.library().samples.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// The decode error recorded for `key`, if its source was present but invalid.
    pub fn failure(&self, key: &str) -> Option<&SampleError> {
        self.library().failures.get(key)
    }

    /// Keys whose source failed to decode, sorted.
    pub fn failed_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.library().failures.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn library(&self) -> &Library {
        self.library.get_or_init(|| decode_library(&self.sources, self.sample_rate))
    }
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::embedded()
    }
}

fn decode_library(sources: &[(String, Cow<'static, str>)], sample_rate: u32) -> Library {
    let decoded: Vec<(&str, Result<Sample, SampleError>)> = sources
        .par_iter()
        .map(|(key, text)| (key.as_str(), decode_source(text, sample_rate)))
        .collect();

    let mut library = Library::default();
    for (key, result) in decoded {
        match result {
            Ok(sample) => {
                log::debug!(
                    "decoded sample \"{key}\": {} frames, {} ch @ {} Hz",
                    sample.frames(),
                    sample.channel_count(),
                    sample.sample_rate()
                );
                library.samples.insert(key.to_string(), Arc::new(sample));
            }
            Err(e) => {
                log::warn!("sample \"{key}\" is unavailable: {e}");
                library.failures.insert(key.to_string(), e);
            }
        }
    }
    library
}

fn decode_source(text: &str, sample_rate: u32) -> Result<Sample, SampleError> {
    let bytes = text::decode_text(text)?;
    Sample::from_wav(Cursor::new(bytes), sample_rate)
}
