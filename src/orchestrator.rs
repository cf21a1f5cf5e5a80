//! Analysis engine: the full pipeline and the operations built on stored rows.
//!
//! Single-item operations return typed errors directly. The batch runner is
//! the only place that catches them, converting every failure into a per-item
//! outcome so one bad file never disturbs its neighbours.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::compare::{self, ProsodyComparison};
use crate::emotion::{classify_emotion, emotion_confidence};
use crate::error::{VoiceError, VoiceResult};
use crate::extractor;
use crate::markers::{self, CulturalMarkerReport};
use crate::model::{
    AnalysisOptions, AnalysisPair, AnalysisSummary, BatchItem, BatchOutcome,
    EmotionAnalysisRecord, PraatAnalysisResult, ProsodicAnalysisRecord,
};
use crate::storage::AnalysisStore;

/// Run the extractor on one file and validate its output. No persistence.
pub fn analyze_prosody(
    file_path: &Path,
    options: &AnalysisOptions,
) -> VoiceResult<PraatAnalysisResult> {
    let analysis = extractor::extract(file_path, options)?;
    tracing::info!(
        file = %file_path.display(),
        duration_s = analysis.duration,
        voiced_fraction = analysis.pitch.voiced_fraction,
        "prosodic analysis complete"
    );
    Ok(analysis)
}

/// Store-backed analysis operations for one database file.
///
/// Holds one connection for single-item operations; [`batch_analyze`]
/// workers open their own connections against the same path.
///
/// [`batch_analyze`]: VoiceAnalysisEngine::batch_analyze
#[derive(Debug)]
pub struct VoiceAnalysisEngine {
    store: AnalysisStore,
    db_path: PathBuf,
}

impl VoiceAnalysisEngine {
    pub fn open(db_path: &Path) -> VoiceResult<Self> {
        let store = AnalysisStore::open(db_path)?;
        Ok(Self {
            store,
            db_path: db_path.to_path_buf(),
        })
    }

    /// Full pipeline for one recording: extract, validate, persist the
    /// prosodic row, classify, score, persist the emotion row.
    pub fn analyze_and_save(
        &self,
        audio_id: &str,
        file_path: &Path,
        story_id: Option<&str>,
        options: &AnalysisOptions,
    ) -> VoiceResult<AnalysisPair> {
        analyze_and_save_with(&self.store, audio_id, file_path, story_id, options)
    }

    /// Run the full pipeline over every item, isolating failures per item.
    ///
    /// Returns exactly one outcome per input, in input order, no matter which
    /// items fail. `options.jobs` above 1 fans items out over that many
    /// worker threads; order of the returned outcomes is unaffected.
    pub fn batch_analyze(
        &self,
        items: &[BatchItem],
        options: &AnalysisOptions,
    ) -> Vec<BatchOutcome> {
        if items.is_empty() {
            return Vec::new();
        }

        if !extractor::is_available(options) {
            // Every item will fail with the same missing-binary error; warn
            // once up front instead of once per item.
            tracing::warn!(
                binary = %extractor::resolve_binary(options),
                "extractor binary not resolvable; batch items will fail individually"
            );
        }

        let jobs = options.jobs.max(1).min(items.len());
        tracing::info!(items = items.len(), jobs, "starting batch analysis");

        let outcomes = if jobs == 1 {
            items
                .iter()
                .map(|item| run_batch_item(&self.store, item, options))
                .collect()
        } else {
            self.batch_analyze_parallel(items, options, jobs)
        };

        let failed = outcomes.iter().filter(|outcome| !outcome.success).count();
        tracing::info!(
            items = items.len(),
            succeeded = items.len() - failed,
            failed,
            "batch analysis finished"
        );
        outcomes
    }

    fn batch_analyze_parallel(
        &self,
        items: &[BatchItem],
        options: &AnalysisOptions,
        jobs: usize,
    ) -> Vec<BatchOutcome> {
        let cursor = AtomicUsize::new(0);
        let db_path = self.db_path.as_path();

        let mut slots: Vec<Option<BatchOutcome>> = (0..items.len()).map(|_| None).collect();

        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(jobs);
            for _ in 0..jobs {
                handles.push(scope.spawn(|| {
                    // Connections are not shared across threads; each worker
                    // opens its own against the same file.
                    let store = AnalysisStore::open(db_path);
                    let mut completed = Vec::new();
                    loop {
                        let index = cursor.fetch_add(1, Ordering::SeqCst);
                        if index >= items.len() {
                            break;
                        }
                        let item = &items[index];
                        let outcome = match &store {
                            Ok(store) => run_batch_item(store, item, options),
                            Err(error) => BatchOutcome::failed(&item.audio_id, error),
                        };
                        completed.push((index, outcome));
                    }
                    completed
                }));
            }

            for handle in handles {
                match handle.join() {
                    Ok(completed) => {
                        for (index, outcome) in completed {
                            slots[index] = Some(outcome);
                        }
                    }
                    Err(_) => {
                        tracing::warn!("batch worker panicked; its items are reported as failed");
                    }
                }
            }
        });

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| match slot {
                Some(outcome) => outcome,
                None => BatchOutcome {
                    audio_id: items[index].audio_id.clone(),
                    success: false,
                    error: Some("batch worker terminated before completing this item".to_owned()),
                    error_code: None,
                },
            })
            .collect()
    }

    /// Compare the latest stored analyses of two recordings.
    pub fn compare_prosody(
        &self,
        audio_id_1: &str,
        audio_id_2: &str,
    ) -> VoiceResult<ProsodyComparison> {
        let first = self
            .store
            .latest_prosodic_by_audio_id(audio_id_1)?
            .ok_or_else(|| VoiceError::not_found("prosodic analysis", audio_id_1))?;
        let second = self
            .store
            .latest_prosodic_by_audio_id(audio_id_2)?
            .ok_or_else(|| VoiceError::not_found("prosodic analysis", audio_id_2))?;

        let first_emotion = self.store.latest_emotion_by_audio_id(audio_id_1)?;
        let second_emotion = self.store.latest_emotion_by_audio_id(audio_id_2)?;

        Ok(compare::between(
            &first,
            &second,
            first_emotion.as_ref(),
            second_emotion.as_ref(),
        ))
    }

    /// Screen the latest stored analysis of a recording for cultural markers.
    pub fn detect_cultural_markers(&self, audio_id: &str) -> VoiceResult<CulturalMarkerReport> {
        let record = self
            .store
            .latest_prosodic_by_audio_id(audio_id)?
            .ok_or_else(|| VoiceError::not_found("prosodic analysis", audio_id))?;
        Ok(markers::detect(&record))
    }

    pub fn recent(&self, limit: usize) -> VoiceResult<Vec<AnalysisSummary>> {
        self.store.recent(limit)
    }
}

fn analyze_and_save_with(
    store: &AnalysisStore,
    audio_id: &str,
    file_path: &Path,
    story_id: Option<&str>,
    options: &AnalysisOptions,
) -> VoiceResult<AnalysisPair> {
    if audio_id.trim().is_empty() {
        return Err(VoiceError::InvalidRequest(
            "audio_id must not be empty".to_owned(),
        ));
    }

    let analysis = extractor::extract(file_path, options)?;

    let prosodic = ProsodicAnalysisRecord::from_analysis(audio_id, story_id, &analysis);
    store.insert_prosodic(&prosodic)?;

    let arousal = analysis.emotional_prosody.arousal_estimate;
    let valence = analysis.emotional_prosody.valence_estimate;
    let label = classify_emotion(arousal, valence);
    let confidence = emotion_confidence(&analysis);

    let emotion = EmotionAnalysisRecord::from_classification(
        audio_id, story_id, label, arousal, valence, confidence,
    );
    store.insert_emotion(&emotion)?;

    tracing::info!(
        audio_id = %audio_id,
        emotion = label.as_str(),
        confidence,
        "analysis persisted"
    );

    Ok(AnalysisPair { prosodic, emotion })
}

fn run_batch_item(
    store: &AnalysisStore,
    item: &BatchItem,
    options: &AnalysisOptions,
) -> BatchOutcome {
    match analyze_and_save_with(
        store,
        &item.audio_id,
        &item.file_path,
        item.story_id.as_deref(),
        options,
    ) {
        Ok(_) => BatchOutcome::succeeded(&item.audio_id),
        Err(error) => {
            tracing::warn!(
                audio_id = %item.audio_id,
                code = error.error_code(),
                error = %error,
                "batch item failed"
            );
            BatchOutcome::failed(&item.audio_id, &error)
        }
    }
}
