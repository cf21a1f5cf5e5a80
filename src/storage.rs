use std::fs;
use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{VoiceError, VoiceResult};
use crate::model::{AnalysisSummary, EmotionAnalysisRecord, EmotionLabel, ProsodicAnalysisRecord};

/// Append-only store for prosodic and emotion analysis rows.
///
/// One connection per store; batch workers each open their own. Writes go
/// through a bounded busy-retry loop so concurrent workers sharing a database
/// file ride out short lock windows instead of failing.
pub struct AnalysisStore {
    connection: Connection,
}

const PERSIST_BUSY_RETRY_ATTEMPTS: usize = 8;
const PERSIST_BUSY_BASE_BACKOFF_MS: u64 = 5;

const PROSODIC_COLUMNS: &str = "id, audio_id, story_id, mean_pitch_hz, median_pitch_hz, \
     pitch_std_hz, min_pitch_hz, max_pitch_hz, pitch_range_hz, pitch_range_semitones, \
     voiced_fraction, mean_intensity_db, median_intensity_db, intensity_std_db, \
     min_intensity_db, max_intensity_db, intensity_range_db, speech_rate_sps, \
     articulation_rate_sps, pause_count, mean_pause_duration_s, total_pause_time_s, \
     speaking_time_s, total_duration_s, jitter, shimmer, hnr_db, crest_factor, \
     analysis_method, analysis_version, created_at";

const EMOTION_COLUMNS: &str = "id, audio_id, story_id, emotion_label, arousal, valence, \
     confidence, temporal_segments, culturally_validated, analysis_method, model_version, \
     created_at";

impl std::fmt::Debug for AnalysisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisStore").finish_non_exhaustive()
    }
}

impl AnalysisStore {
    pub fn open(db_path: &Path) -> VoiceResult<Self> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let connection =
            Connection::open(db_path).map_err(|error| VoiceError::Storage(error.to_string()))?;

        let store = Self { connection };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn insert_prosodic(&self, record: &ProsodicAnalysisRecord) -> VoiceResult<()> {
        self.with_busy_retry(|| self.insert_prosodic_once(record))
    }

    pub fn insert_emotion(&self, record: &EmotionAnalysisRecord) -> VoiceResult<()> {
        self.with_busy_retry(|| self.insert_emotion_once(record))
    }

    /// Newest prosodic row for an audio id. Rows are append-only, so "the
    /// analysis for X" always means the latest insert; ties on `created_at`
    /// break by id so the answer is stable.
    pub fn latest_prosodic_by_audio_id(
        &self,
        audio_id: &str,
    ) -> VoiceResult<Option<ProsodicAnalysisRecord>> {
        let sql = format!(
            "SELECT {PROSODIC_COLUMNS} FROM prosodic_analyses WHERE audio_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        self.connection
            .query_row(&sql, [audio_id], map_prosodic_row)
            .optional()
            .map_err(|error| VoiceError::Storage(error.to_string()))
    }

    pub fn latest_emotion_by_audio_id(
        &self,
        audio_id: &str,
    ) -> VoiceResult<Option<EmotionAnalysisRecord>> {
        let sql = format!(
            "SELECT {EMOTION_COLUMNS} FROM emotion_analyses WHERE audio_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        self.connection
            .query_row(&sql, [audio_id], map_emotion_row)
            .optional()
            .map_err(|error| VoiceError::Storage(error.to_string()))
    }

    pub fn prosodic_by_id(&self, id: &str) -> VoiceResult<Option<ProsodicAnalysisRecord>> {
        let sql = format!("SELECT {PROSODIC_COLUMNS} FROM prosodic_analyses WHERE id = ?1");
        self.connection
            .query_row(&sql, [id], map_prosodic_row)
            .optional()
            .map_err(|error| VoiceError::Storage(error.to_string()))
    }

    pub fn emotion_by_id(&self, id: &str) -> VoiceResult<Option<EmotionAnalysisRecord>> {
        let sql = format!("SELECT {EMOTION_COLUMNS} FROM emotion_analyses WHERE id = ?1");
        self.connection
            .query_row(&sql, [id], map_emotion_row)
            .optional()
            .map_err(|error| VoiceError::Storage(error.to_string()))
    }

    pub fn recent(&self, limit: usize) -> VoiceResult<Vec<AnalysisSummary>> {
        let mut statement = self
            .connection
            .prepare(
                "SELECT id, audio_id, story_id, mean_pitch_hz, total_duration_s, created_at \
                 FROM prosodic_analyses ORDER BY created_at DESC, id DESC LIMIT ?1",
            )
            .map_err(|error| VoiceError::Storage(error.to_string()))?;

        let rows = statement
            .query_map([limit as i64], |row| {
                Ok(AnalysisSummary {
                    id: row.get(0)?,
                    audio_id: row.get(1)?,
                    story_id: row.get(2)?,
                    mean_pitch_hz: row.get(3)?,
                    total_duration_s: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .map_err(|error| VoiceError::Storage(error.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|error| VoiceError::Storage(error.to_string()))
    }

    /// Current schema version. Bump when adding migrations.
    pub const SCHEMA_VERSION: u32 = 2;

    fn initialize_schema(&self) -> VoiceResult<()> {
        // WAL lets batch workers read while another worker writes.
        let _ = self.connection.pragma_update(None, "journal_mode", "WAL");
        let _ = self.connection.pragma_update(None, "busy_timeout", 5000);

        // Base tables (v1 schema).
        let sql = r#"
CREATE TABLE IF NOT EXISTS prosodic_analyses (
    id TEXT PRIMARY KEY,
    audio_id TEXT NOT NULL,
    story_id TEXT,
    mean_pitch_hz REAL NOT NULL,
    median_pitch_hz REAL NOT NULL,
    pitch_std_hz REAL NOT NULL,
    min_pitch_hz REAL NOT NULL,
    max_pitch_hz REAL NOT NULL,
    pitch_range_hz REAL NOT NULL,
    pitch_range_semitones REAL NOT NULL,
    voiced_fraction REAL NOT NULL,
    mean_intensity_db REAL NOT NULL,
    median_intensity_db REAL NOT NULL,
    intensity_std_db REAL NOT NULL,
    min_intensity_db REAL NOT NULL,
    max_intensity_db REAL NOT NULL,
    intensity_range_db REAL NOT NULL,
    speech_rate_sps REAL NOT NULL,
    articulation_rate_sps REAL NOT NULL,
    pause_count INTEGER NOT NULL,
    mean_pause_duration_s REAL NOT NULL,
    total_pause_time_s REAL NOT NULL,
    speaking_time_s REAL NOT NULL,
    total_duration_s REAL NOT NULL,
    jitter REAL NOT NULL,
    shimmer REAL NOT NULL,
    hnr_db REAL NOT NULL,
    crest_factor REAL NOT NULL,
    analysis_method TEXT NOT NULL,
    analysis_version TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS emotion_analyses (
    id TEXT PRIMARY KEY,
    audio_id TEXT NOT NULL,
    story_id TEXT,
    emotion_label TEXT NOT NULL,
    arousal REAL NOT NULL,
    valence REAL NOT NULL,
    confidence REAL NOT NULL,
    temporal_segments TEXT,
    culturally_validated INTEGER NOT NULL DEFAULT 0,
    analysis_method TEXT NOT NULL,
    model_version TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS _meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

        self.connection
            .execute_batch(sql)
            .map_err(|error| VoiceError::Storage(error.to_string()))?;

        self.run_migrations()?;
        Ok(())
    }

    /// Read the current schema version from _meta, or 0 if not set.
    fn current_schema_version(&self) -> VoiceResult<u32> {
        let meta_exists: i64 = self
            .connection
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = '_meta'",
                [],
                |row| row.get(0),
            )
            .map_err(|error| VoiceError::Storage(error.to_string()))?;
        if meta_exists == 0 {
            return Ok(0);
        }

        let stored: Option<String> = self
            .connection
            .query_row(
                "SELECT value FROM _meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|error| VoiceError::Storage(error.to_string()))?;

        match stored {
            Some(value) => value.parse::<u32>().map_err(|_| {
                VoiceError::Storage(format!("invalid schema_version in _meta: {value}"))
            }),
            None => Ok(0),
        }
    }

    fn set_schema_version(&self, version: u32) -> VoiceResult<()> {
        self.connection
            .execute(
                "INSERT OR REPLACE INTO _meta (key, value) VALUES ('schema_version', ?1)",
                [version.to_string()],
            )
            .map_err(|error| VoiceError::Storage(error.to_string()))?;
        Ok(())
    }

    /// Run forward migrations from the current version to SCHEMA_VERSION.
    fn run_migrations(&self) -> VoiceResult<()> {
        let mut current = self.current_schema_version()?;

        if current > Self::SCHEMA_VERSION {
            return Err(VoiceError::Storage(format!(
                "DB schema version {current} is newer than supported version {}; \
                 upgrade voice_prosody to open this database",
                Self::SCHEMA_VERSION
            )));
        }

        if current == Self::SCHEMA_VERSION {
            return Ok(());
        }

        tracing::info!(
            current_version = current,
            target_version = Self::SCHEMA_VERSION,
            "running schema migrations"
        );

        while current < Self::SCHEMA_VERSION {
            let next = current + 1;

            self.connection
                .execute_batch("BEGIN")
                .map_err(|error| VoiceError::Storage(error.to_string()))?;

            match self.apply_migration(next) {
                Ok(()) => {
                    self.set_schema_version(next)?;
                    self.connection
                        .execute_batch("COMMIT")
                        .map_err(|error| VoiceError::Storage(error.to_string()))?;
                    current = next;
                }
                Err(error) => {
                    let _ = self.connection.execute_batch("ROLLBACK");
                    return Err(VoiceError::Storage(format!(
                        "migration to v{next} failed: {error}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Apply a single migration step. Each migration only adds (never drops).
    fn apply_migration(&self, version: u32) -> VoiceResult<()> {
        match version {
            1 => {
                // v1: base schema, created by initialize_schema. Version
                // marker only.
                Ok(())
            }
            2 => {
                // v2: indexes for the latest-by-audio-id lookups.
                self.connection
                    .execute_batch(
                        "CREATE INDEX IF NOT EXISTS idx_prosodic_audio_created \
                             ON prosodic_analyses(audio_id, created_at); \
                         CREATE INDEX IF NOT EXISTS idx_emotion_audio_created \
                             ON emotion_analyses(audio_id, created_at);",
                    )
                    .map_err(|error| VoiceError::Storage(error.to_string()))?;
                Ok(())
            }
            _ => Err(VoiceError::Storage(format!(
                "unknown migration version: {version}"
            ))),
        }
    }

    fn with_busy_retry(&self, mut operation: impl FnMut() -> VoiceResult<()>) -> VoiceResult<()> {
        for attempt in 0..=PERSIST_BUSY_RETRY_ATTEMPTS {
            match operation() {
                Ok(()) => return Ok(()),
                Err(error)
                    if is_busy_storage_error(&error) && attempt < PERSIST_BUSY_RETRY_ATTEMPTS =>
                {
                    let delay_ms = PERSIST_BUSY_BASE_BACKOFF_MS * (attempt as u64 + 1);
                    std::thread::sleep(Duration::from_millis(delay_ms));
                }
                Err(error) => return Err(error),
            }
        }

        Err(VoiceError::Storage(
            "persist retry loop exhausted unexpectedly".to_owned(),
        ))
    }

    fn insert_prosodic_once(&self, record: &ProsodicAnalysisRecord) -> VoiceResult<()> {
        let sql = format!(
            "INSERT INTO prosodic_analyses ({PROSODIC_COLUMNS}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
              ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31)"
        );
        self.connection
            .execute(
                &sql,
                params![
                    record.id,
                    record.audio_id,
                    record.story_id,
                    record.mean_pitch_hz,
                    record.median_pitch_hz,
                    record.pitch_std_hz,
                    record.min_pitch_hz,
                    record.max_pitch_hz,
                    record.pitch_range_hz,
                    record.pitch_range_semitones,
                    record.voiced_fraction,
                    record.mean_intensity_db,
                    record.median_intensity_db,
                    record.intensity_std_db,
                    record.min_intensity_db,
                    record.max_intensity_db,
                    record.intensity_range_db,
                    record.speech_rate_sps,
                    record.articulation_rate_sps,
                    record.pause_count,
                    record.mean_pause_duration_s,
                    record.total_pause_time_s,
                    record.speaking_time_s,
                    record.total_duration_s,
                    record.jitter,
                    record.shimmer,
                    record.hnr_db,
                    record.crest_factor,
                    record.analysis_method,
                    record.analysis_version,
                    record.created_at,
                ],
            )
            .map_err(|error| VoiceError::Storage(error.to_string()))?;
        Ok(())
    }

    fn insert_emotion_once(&self, record: &EmotionAnalysisRecord) -> VoiceResult<()> {
        let temporal_segments = record
            .temporal_segments
            .as_ref()
            .map(serde_json::Value::to_string);
        let sql = format!(
            "INSERT INTO emotion_analyses ({EMOTION_COLUMNS}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        );
        self.connection
            .execute(
                &sql,
                params![
                    record.id,
                    record.audio_id,
                    record.story_id,
                    record.emotion_label.as_str(),
                    record.arousal,
                    record.valence,
                    record.confidence,
                    temporal_segments,
                    record.culturally_validated,
                    record.analysis_method,
                    record.model_version,
                    record.created_at,
                ],
            )
            .map_err(|error| VoiceError::Storage(error.to_string()))?;
        Ok(())
    }
}

fn map_prosodic_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProsodicAnalysisRecord> {
    Ok(ProsodicAnalysisRecord {
        id: row.get(0)?,
        audio_id: row.get(1)?,
        story_id: row.get(2)?,
        mean_pitch_hz: row.get(3)?,
        median_pitch_hz: row.get(4)?,
        pitch_std_hz: row.get(5)?,
        min_pitch_hz: row.get(6)?,
        max_pitch_hz: row.get(7)?,
        pitch_range_hz: row.get(8)?,
        pitch_range_semitones: row.get(9)?,
        voiced_fraction: row.get(10)?,
        mean_intensity_db: row.get(11)?,
        median_intensity_db: row.get(12)?,
        intensity_std_db: row.get(13)?,
        min_intensity_db: row.get(14)?,
        max_intensity_db: row.get(15)?,
        intensity_range_db: row.get(16)?,
        speech_rate_sps: row.get(17)?,
        articulation_rate_sps: row.get(18)?,
        pause_count: row.get(19)?,
        mean_pause_duration_s: row.get(20)?,
        total_pause_time_s: row.get(21)?,
        speaking_time_s: row.get(22)?,
        total_duration_s: row.get(23)?,
        jitter: row.get(24)?,
        shimmer: row.get(25)?,
        hnr_db: row.get(26)?,
        crest_factor: row.get(27)?,
        analysis_method: row.get(28)?,
        analysis_version: row.get(29)?,
        created_at: row.get(30)?,
    })
}

fn map_emotion_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmotionAnalysisRecord> {
    let label_text: String = row.get(3)?;
    let emotion_label = EmotionLabel::parse(&label_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown emotion label `{label_text}`").into(),
        )
    })?;

    let temporal_segments: Option<String> = row.get(7)?;
    let temporal_segments = temporal_segments
        .map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })?;

    Ok(EmotionAnalysisRecord {
        id: row.get(0)?,
        audio_id: row.get(1)?,
        story_id: row.get(2)?,
        emotion_label,
        arousal: row.get(4)?,
        valence: row.get(5)?,
        confidence: row.get(6)?,
        temporal_segments,
        culturally_validated: row.get(8)?,
        analysis_method: row.get(9)?,
        model_version: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn is_busy_storage_error(error: &VoiceError) -> bool {
    let VoiceError::Storage(message) = error else {
        return false;
    };
    let lowered = message.to_ascii_lowercase();
    lowered.contains("database is locked") || lowered.contains("database table is locked")
}
