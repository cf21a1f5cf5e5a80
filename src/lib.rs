#![forbid(unsafe_code)]
#![allow(clippy::needless_raw_string_hashes)]

pub mod cli;
pub mod compare;
pub mod emotion;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod markers;
pub mod model;
pub mod orchestrator;
pub mod process;
pub mod storage;
pub mod validate;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::{VoiceError, VoiceResult};
pub use model::{AnalysisPair, BatchItem, BatchOutcome, PraatAnalysisResult};
pub use orchestrator::{VoiceAnalysisEngine, analyze_prosody};
