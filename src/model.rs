use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Extractor configuration
// ---------------------------------------------------------------------------

/// Pitch-tracking floor assumed by the extractor (lower for male voices).
pub const DEFAULT_PITCH_FLOOR_HZ: f64 = 75.0;
/// Pitch-tracking ceiling assumed by the extractor (higher for female/child
/// voices).
pub const DEFAULT_PITCH_CEILING_HZ: f64 = 500.0;
/// Minimum pitch used by the extractor's intensity analysis.
pub const DEFAULT_INTENSITY_MIN_PITCH_HZ: f64 = 100.0;
/// Hard deadline for one extractor subprocess.
pub const DEFAULT_EXTRACTOR_TIMEOUT_MS: u64 = 120_000;

/// Engine-level knobs for one analysis invocation.
///
/// The acoustic parameters mirror the extractor's own defaults; the wire
/// contract stays `analyze <path>` and the engine applies them internally, so
/// they are recorded here for callers rather than forwarded per call. The
/// remaining fields control the Rust side: subprocess deadline, extractor
/// binary override, and batch parallelism.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub pitch_floor_hz: f64,
    pub pitch_ceiling_hz: f64,
    /// `None` lets the extractor choose its own analysis frame step.
    pub time_step_sec: Option<f64>,
    pub intensity_min_pitch_hz: f64,
    pub timeout_ms: u64,
    /// Explicit extractor binary; overrides the environment variable and the
    /// PATH default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extractor_bin: Option<PathBuf>,
    /// Worker count for batch runs. 1 is the sequential reference path.
    pub jobs: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            pitch_floor_hz: DEFAULT_PITCH_FLOOR_HZ,
            pitch_ceiling_hz: DEFAULT_PITCH_CEILING_HZ,
            time_step_sec: None,
            intensity_min_pitch_hz: DEFAULT_INTENSITY_MIN_PITCH_HZ,
            timeout_ms: DEFAULT_EXTRACTOR_TIMEOUT_MS,
            extractor_bin: None,
            jobs: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Extractor output schema
// ---------------------------------------------------------------------------

/// Pitch (F0) statistics block from the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchStats {
    pub mean_f0: f64,
    pub median_f0: f64,
    pub std_f0: f64,
    pub min_f0: f64,
    pub max_f0: f64,
    pub range_f0: f64,
    pub range_semitones: f64,
    pub voiced_fraction: f64,
}

/// Intensity (loudness) statistics block, all in dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityStats {
    pub mean_intensity: f64,
    pub median_intensity: f64,
    pub std_intensity: f64,
    pub min_intensity: f64,
    pub max_intensity: f64,
    pub dynamic_range: f64,
}

/// Rhythm and timing block. Rates are syllables/sec, durations seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RhythmStats {
    pub speech_rate: f64,
    pub articulation_rate: f64,
    pub pause_count: u32,
    pub mean_pause_duration: f64,
    pub total_pause_time: f64,
    pub speaking_time: f64,
    pub total_duration: f64,
}

/// Voice-quality block: perturbation measures plus harmonics-to-noise ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceQualityStats {
    pub jitter_local: f64,
    pub shimmer_local: f64,
    pub hnr_mean: f64,
    pub crest_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariabilityLevel {
    Low,
    Medium,
    High,
}

impl VariabilityLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakingPace {
    Slow,
    Moderate,
    Fast,
}

impl SpeakingPace {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Moderate => "moderate",
            Self::Fast => "fast",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceQualityRating {
    Clear,
    Moderate,
    Rough,
    Breathy,
}

impl VoiceQualityRating {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Moderate => "moderate",
            Self::Rough => "rough",
            Self::Breathy => "breathy",
        }
    }
}

/// Heuristic emotional-prosody block estimated by the extractor.
///
/// `arousal_estimate` is nominally [0, 1] and `valence_estimate` [-1, 1];
/// validation accepts [-1, 1] for both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalProsody {
    pub arousal_estimate: f64,
    pub valence_estimate: f64,
    pub pitch_variability: VariabilityLevel,
    pub intensity_variability: VariabilityLevel,
    pub speaking_pace: SpeakingPace,
    pub voice_quality_rating: VoiceQualityRating,
}

/// Fully validated extractor output for one recording.
///
/// Exists only in the success shape: the `success`/`error` envelope is
/// stripped during validation, and every field here has passed the
/// plausibility checks. There is no partial-success state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PraatAnalysisResult {
    pub file_path: String,
    pub duration: f64,
    pub pitch: PitchStats,
    pub intensity: IntensityStats,
    pub rhythm: RhythmStats,
    pub voice_quality: VoiceQualityStats,
    pub emotional_prosody: EmotionalProsody,
}

// ---------------------------------------------------------------------------
// Emotion label
// ---------------------------------------------------------------------------

/// Closed set of emotion labels produced by the circumplex classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionLabel {
    Joy,
    Anger,
    Surprise,
    Calm,
    Sadness,
    Neutral,
    Pride,
    Fear,
}

impl EmotionLabel {
    pub const ALL: [Self; 8] = [
        Self::Joy,
        Self::Anger,
        Self::Surprise,
        Self::Calm,
        Self::Sadness,
        Self::Neutral,
        Self::Pride,
        Self::Fear,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Joy => "joy",
            Self::Anger => "anger",
            Self::Surprise => "surprise",
            Self::Calm => "calm",
            Self::Sadness => "sadness",
            Self::Neutral => "neutral",
            Self::Pride => "pride",
            Self::Fear => "fear",
        }
    }

    /// Inverse of [`as_str`](Self::as_str), used when loading stored rows.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == value)
    }
}

// ---------------------------------------------------------------------------
// Persisted records
// ---------------------------------------------------------------------------

/// Method stamp on every prosodic row.
pub const PROSODIC_ANALYSIS_METHOD: &str = "praat_parselmouth";
/// Version stamp on every prosodic row.
pub const PROSODIC_ANALYSIS_VERSION: &str = "1.0.0";
/// Method stamp on every emotion row.
pub const EMOTION_ANALYSIS_METHOD: &str = "praat_prosodic_mapping";
/// Version stamp on every emotion row.
pub const EMOTION_MODEL_VERSION: &str = "1.0.0";

/// One persisted prosodic-measurement row. Append-only: re-analysis of the
/// same `audio_id` inserts a new row with a fresh id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProsodicAnalysisRecord {
    pub id: String,
    pub audio_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
    pub mean_pitch_hz: f64,
    pub median_pitch_hz: f64,
    pub pitch_std_hz: f64,
    pub min_pitch_hz: f64,
    pub max_pitch_hz: f64,
    pub pitch_range_hz: f64,
    pub pitch_range_semitones: f64,
    pub voiced_fraction: f64,
    pub mean_intensity_db: f64,
    pub median_intensity_db: f64,
    pub intensity_std_db: f64,
    pub min_intensity_db: f64,
    pub max_intensity_db: f64,
    pub intensity_range_db: f64,
    pub speech_rate_sps: f64,
    pub articulation_rate_sps: f64,
    pub pause_count: u32,
    pub mean_pause_duration_s: f64,
    pub total_pause_time_s: f64,
    pub speaking_time_s: f64,
    pub total_duration_s: f64,
    pub jitter: f64,
    pub shimmer: f64,
    pub hnr_db: f64,
    pub crest_factor: f64,
    pub analysis_method: String,
    pub analysis_version: String,
    pub created_at: String,
}

impl ProsodicAnalysisRecord {
    /// Build a fresh row from a validated extractor result.
    ///
    /// The field mapping is 1:1 with no rounding: persisted values stay
    /// bit-identical to the validated output.
    #[must_use]
    pub fn from_analysis(
        audio_id: &str,
        story_id: Option<&str>,
        analysis: &PraatAnalysisResult,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            audio_id: audio_id.to_owned(),
            story_id: story_id.map(str::to_owned),
            mean_pitch_hz: analysis.pitch.mean_f0,
            median_pitch_hz: analysis.pitch.median_f0,
            pitch_std_hz: analysis.pitch.std_f0,
            min_pitch_hz: analysis.pitch.min_f0,
            max_pitch_hz: analysis.pitch.max_f0,
            pitch_range_hz: analysis.pitch.range_f0,
            pitch_range_semitones: analysis.pitch.range_semitones,
            voiced_fraction: analysis.pitch.voiced_fraction,
            mean_intensity_db: analysis.intensity.mean_intensity,
            median_intensity_db: analysis.intensity.median_intensity,
            intensity_std_db: analysis.intensity.std_intensity,
            min_intensity_db: analysis.intensity.min_intensity,
            max_intensity_db: analysis.intensity.max_intensity,
            intensity_range_db: analysis.intensity.dynamic_range,
            speech_rate_sps: analysis.rhythm.speech_rate,
            articulation_rate_sps: analysis.rhythm.articulation_rate,
            pause_count: analysis.rhythm.pause_count,
            mean_pause_duration_s: analysis.rhythm.mean_pause_duration,
            total_pause_time_s: analysis.rhythm.total_pause_time,
            speaking_time_s: analysis.rhythm.speaking_time,
            total_duration_s: analysis.rhythm.total_duration,
            jitter: analysis.voice_quality.jitter_local,
            shimmer: analysis.voice_quality.shimmer_local,
            hnr_db: analysis.voice_quality.hnr_mean,
            crest_factor: analysis.voice_quality.crest_factor,
            analysis_method: PROSODIC_ANALYSIS_METHOD.to_owned(),
            analysis_version: PROSODIC_ANALYSIS_VERSION.to_owned(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// One persisted emotion-estimate row, companion to a prosodic row.
///
/// `temporal_segments` is reserved for future sub-clip segmentation and is
/// always NULL on insert. `culturally_validated` starts false and is only ever
/// flipped by the external human-review workflow; this crate exposes no write
/// path for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionAnalysisRecord {
    pub id: String,
    pub audio_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
    pub emotion_label: EmotionLabel,
    pub arousal: f64,
    pub valence: f64,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_segments: Option<Value>,
    pub culturally_validated: bool,
    pub analysis_method: String,
    pub model_version: String,
    pub created_at: String,
}

impl EmotionAnalysisRecord {
    /// Build a fresh row from a classification outcome.
    #[must_use]
    pub fn from_classification(
        audio_id: &str,
        story_id: Option<&str>,
        emotion_label: EmotionLabel,
        arousal: f64,
        valence: f64,
        confidence: f64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            audio_id: audio_id.to_owned(),
            story_id: story_id.map(str::to_owned),
            emotion_label,
            arousal,
            valence,
            confidence,
            temporal_segments: None,
            culturally_validated: false,
            analysis_method: EMOTION_ANALYSIS_METHOD.to_owned(),
            model_version: EMOTION_MODEL_VERSION.to_owned(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// The two rows created together by one full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPair {
    pub prosodic: ProsodicAnalysisRecord,
    pub emotion: EmotionAnalysisRecord,
}

/// Listing row for the CLI `recent` view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub id: String,
    pub audio_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
    pub mean_pitch_hz: f64,
    pub total_duration_s: f64,
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Batch types
// ---------------------------------------------------------------------------

/// One entry of a batch manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub audio_id: String,
    pub file_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
}

/// Per-item outcome of a batch run: one per input item, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub audio_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable code from [`crate::error::VoiceError::error_code`] for machine
    /// consumers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl BatchOutcome {
    #[must_use]
    pub fn succeeded(audio_id: &str) -> Self {
        Self {
            audio_id: audio_id.to_owned(),
            success: true,
            error: None,
            error_code: None,
        }
    }

    #[must_use]
    pub fn failed(audio_id: &str, error: &crate::error::VoiceError) -> Self {
        Self {
            audio_id: audio_id.to_owned(),
            success: false,
            error: Some(error.to_string()),
            error_code: Some(error.error_code().to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> Value {
        json!({
            "success": true,
            "file_path": "/tmp/story.wav",
            "duration": 12.5,
            "pitch": {
                "mean_f0": 180.0,
                "median_f0": 178.5,
                "std_f0": 24.0,
                "min_f0": 120.0,
                "max_f0": 320.0,
                "range_f0": 200.0,
                "range_semitones": 17.0,
                "voiced_fraction": 0.72
            },
            "intensity": {
                "mean_intensity": 62.0,
                "median_intensity": 63.1,
                "std_intensity": 7.5,
                "min_intensity": 38.0,
                "max_intensity": 81.0,
                "dynamic_range": 43.0
            },
            "rhythm": {
                "speech_rate": 4.1,
                "articulation_rate": 4.9,
                "pause_count": 7,
                "mean_pause_duration": 0.42,
                "total_pause_time": 2.94,
                "speaking_time": 9.56,
                "total_duration": 12.5
            },
            "voice_quality": {
                "jitter_local": 0.012,
                "shimmer_local": 0.08,
                "hnr_mean": 14.2,
                "crest_factor": 4.8
            },
            "emotional_prosody": {
                "arousal_estimate": 0.55,
                "valence_estimate": 0.1,
                "pitch_variability": "medium",
                "intensity_variability": "high",
                "speaking_pace": "moderate",
                "voice_quality_rating": "clear"
            }
        })
    }

    #[test]
    fn praat_result_deserializes_from_full_payload() {
        let result: PraatAnalysisResult =
            serde_json::from_value(sample_payload()).expect("payload should deserialize");
        assert_eq!(result.file_path, "/tmp/story.wav");
        assert_eq!(result.rhythm.pause_count, 7);
        assert_eq!(
            result.emotional_prosody.pitch_variability,
            VariabilityLevel::Medium
        );
        assert_eq!(
            result.emotional_prosody.voice_quality_rating,
            VoiceQualityRating::Clear
        );
    }

    #[test]
    fn praat_result_rejects_missing_field() {
        let mut payload = sample_payload();
        payload["pitch"]
            .as_object_mut()
            .unwrap()
            .remove("voiced_fraction");
        let result = serde_json::from_value::<PraatAnalysisResult>(payload);
        assert!(result.is_err(), "missing voiced_fraction must not parse");
    }

    #[test]
    fn praat_result_rejects_negative_pause_count() {
        let mut payload = sample_payload();
        payload["rhythm"]["pause_count"] = json!(-3);
        let result = serde_json::from_value::<PraatAnalysisResult>(payload);
        assert!(result.is_err(), "negative pause_count must not parse");
    }

    #[test]
    fn praat_result_rejects_unknown_enum_value() {
        let mut payload = sample_payload();
        payload["emotional_prosody"]["speaking_pace"] = json!("frantic");
        let result = serde_json::from_value::<PraatAnalysisResult>(payload);
        assert!(result.is_err(), "unknown speaking_pace must not parse");
    }

    #[test]
    fn emotion_label_serde_matches_as_str() {
        for label in EmotionLabel::ALL {
            let encoded = serde_json::to_string(&label).expect("serialize");
            assert_eq!(encoded, format!("\"{}\"", label.as_str()));
            let decoded: EmotionLabel = serde_json::from_str(&encoded).expect("deserialize");
            assert_eq!(decoded, label);
        }
    }

    #[test]
    fn emotion_label_parse_is_inverse_of_as_str() {
        for label in EmotionLabel::ALL {
            assert_eq!(EmotionLabel::parse(label.as_str()), Some(label));
        }
        assert_eq!(EmotionLabel::parse("melancholy"), None);
        assert_eq!(EmotionLabel::parse(""), None);
    }

    #[test]
    fn categorical_enums_serde_matches_as_str() {
        for level in [
            VariabilityLevel::Low,
            VariabilityLevel::Medium,
            VariabilityLevel::High,
        ] {
            let encoded = serde_json::to_string(&level).expect("serialize");
            assert_eq!(encoded, format!("\"{}\"", level.as_str()));
        }
        for pace in [
            SpeakingPace::Slow,
            SpeakingPace::Moderate,
            SpeakingPace::Fast,
        ] {
            let encoded = serde_json::to_string(&pace).expect("serialize");
            assert_eq!(encoded, format!("\"{}\"", pace.as_str()));
        }
        for rating in [
            VoiceQualityRating::Clear,
            VoiceQualityRating::Moderate,
            VoiceQualityRating::Rough,
            VoiceQualityRating::Breathy,
        ] {
            let encoded = serde_json::to_string(&rating).expect("serialize");
            assert_eq!(encoded, format!("\"{}\"", rating.as_str()));
        }
    }

    #[test]
    fn analysis_options_defaults() {
        let options = AnalysisOptions::default();
        assert_eq!(options.pitch_floor_hz, 75.0);
        assert_eq!(options.pitch_ceiling_hz, 500.0);
        assert_eq!(options.time_step_sec, None);
        assert_eq!(options.intensity_min_pitch_hz, 100.0);
        assert_eq!(options.timeout_ms, 120_000);
        assert!(options.extractor_bin.is_none());
        assert_eq!(options.jobs, 1);
    }

    #[test]
    fn analysis_options_partial_json_uses_defaults() {
        let options: AnalysisOptions =
            serde_json::from_str(r#"{"timeout_ms": 5000}"#).expect("partial options");
        assert_eq!(options.timeout_ms, 5000);
        assert_eq!(options.pitch_floor_hz, 75.0);
        assert_eq!(options.jobs, 1);
    }

    #[test]
    fn prosodic_record_copies_every_field_unchanged() {
        let analysis: PraatAnalysisResult =
            serde_json::from_value(sample_payload()).expect("payload");
        let record = ProsodicAnalysisRecord::from_analysis("audio-1", Some("story-9"), &analysis);

        assert_eq!(record.audio_id, "audio-1");
        assert_eq!(record.story_id.as_deref(), Some("story-9"));
        assert_eq!(record.mean_pitch_hz, analysis.pitch.mean_f0);
        assert_eq!(record.median_pitch_hz, analysis.pitch.median_f0);
        assert_eq!(record.pitch_std_hz, analysis.pitch.std_f0);
        assert_eq!(record.min_pitch_hz, analysis.pitch.min_f0);
        assert_eq!(record.max_pitch_hz, analysis.pitch.max_f0);
        assert_eq!(record.pitch_range_hz, analysis.pitch.range_f0);
        assert_eq!(record.pitch_range_semitones, analysis.pitch.range_semitones);
        assert_eq!(record.voiced_fraction, analysis.pitch.voiced_fraction);
        assert_eq!(record.mean_intensity_db, analysis.intensity.mean_intensity);
        assert_eq!(
            record.median_intensity_db,
            analysis.intensity.median_intensity
        );
        assert_eq!(record.intensity_std_db, analysis.intensity.std_intensity);
        assert_eq!(record.min_intensity_db, analysis.intensity.min_intensity);
        assert_eq!(record.max_intensity_db, analysis.intensity.max_intensity);
        assert_eq!(record.intensity_range_db, analysis.intensity.dynamic_range);
        assert_eq!(record.speech_rate_sps, analysis.rhythm.speech_rate);
        assert_eq!(
            record.articulation_rate_sps,
            analysis.rhythm.articulation_rate
        );
        assert_eq!(record.pause_count, analysis.rhythm.pause_count);
        assert_eq!(
            record.mean_pause_duration_s,
            analysis.rhythm.mean_pause_duration
        );
        assert_eq!(record.total_pause_time_s, analysis.rhythm.total_pause_time);
        assert_eq!(record.speaking_time_s, analysis.rhythm.speaking_time);
        assert_eq!(record.total_duration_s, analysis.rhythm.total_duration);
        assert_eq!(record.jitter, analysis.voice_quality.jitter_local);
        assert_eq!(record.shimmer, analysis.voice_quality.shimmer_local);
        assert_eq!(record.hnr_db, analysis.voice_quality.hnr_mean);
        assert_eq!(record.crest_factor, analysis.voice_quality.crest_factor);
        assert_eq!(record.analysis_method, PROSODIC_ANALYSIS_METHOD);
        assert_eq!(record.analysis_version, PROSODIC_ANALYSIS_VERSION);
        assert!(!record.id.is_empty());
        assert!(
            chrono::DateTime::parse_from_rfc3339(&record.created_at).is_ok(),
            "created_at must be RFC3339: {}",
            record.created_at
        );
    }

    #[test]
    fn prosodic_record_ids_are_unique_per_row() {
        let analysis: PraatAnalysisResult =
            serde_json::from_value(sample_payload()).expect("payload");
        let a = ProsodicAnalysisRecord::from_analysis("audio-1", None, &analysis);
        let b = ProsodicAnalysisRecord::from_analysis("audio-1", None, &analysis);
        assert_ne!(a.id, b.id, "re-analysis must mint a fresh row id");
    }

    #[test]
    fn emotion_record_defaults() {
        let record = EmotionAnalysisRecord::from_classification(
            "audio-2",
            None,
            EmotionLabel::Calm,
            0.2,
            0.5,
            0.8,
        );
        assert_eq!(record.emotion_label, EmotionLabel::Calm);
        assert!(record.temporal_segments.is_none());
        assert!(!record.culturally_validated);
        assert_eq!(record.analysis_method, EMOTION_ANALYSIS_METHOD);
        assert_eq!(record.model_version, EMOTION_MODEL_VERSION);
        assert!(record.story_id.is_none());
    }

    #[test]
    fn batch_item_manifest_roundtrip() {
        let manifest = r#"[
            {"audio_id": "a1", "file_path": "/tmp/a1.wav", "story_id": "s1"},
            {"audio_id": "a2", "file_path": "/tmp/a2.wav"}
        ]"#;
        let items: Vec<BatchItem> = serde_json::from_str(manifest).expect("manifest parses");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].story_id.as_deref(), Some("s1"));
        assert!(items[1].story_id.is_none());
    }

    #[test]
    fn batch_outcome_failed_carries_message_and_code() {
        let error = crate::error::VoiceError::from_extractor_failure(
            "praat-analyzer analyze a.wav".to_owned(),
            3,
            "no such file".to_owned(),
        );
        let outcome = BatchOutcome::failed("a3", &error);
        assert!(!outcome.success);
        assert_eq!(outcome.error_code.as_deref(), Some("VP-PROC-EXIT"));
        assert!(outcome.error.as_deref().unwrap().contains("no such file"));

        let ok = BatchOutcome::succeeded("a1");
        assert!(ok.success);
        assert!(ok.error.is_none());
        assert!(ok.error_code.is_none());

        // success entries serialize without the error keys at all
        let encoded = serde_json::to_string(&ok).expect("serialize");
        assert!(!encoded.contains("error"));
    }
}
