//! Pipeline orchestration: parallel segmentation, then scoring, ranking
//! and extraction over the pooled sections.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{unbounded, RecvTimeoutError};

use super::options::RankOptions;
use super::source::BlockSource;
use crate::error::{Error, Result};
use crate::extract::PassageExtractor;
use crate::model::{
    DocumentOutcome, DocumentStatus, Query, RankedResult, RankingOutput, RunStats, Section,
};
use crate::scoring::{rank_candidates, CorpusStatistics, EnsembleScorer};
use crate::segment::{validate_blocks, Segmenter};
use crate::text::{select_tokenizer, TokenizerBackend};

/// Result slot of one document's segmentation task.
type Segmented = Option<Result<Vec<Section>>>;

/// A configured ranking pipeline.
///
/// Construction validates the configuration, compiles the segmenter and
/// selects the tokenizer. Each run starts its own segmentation worker pool,
/// so a pipeline can be run any number of times and workers left behind by
/// a timed-out run never delay the next one.
pub struct Pipeline {
    options: RankOptions,
    segmenter: Arc<Segmenter>,
    scorer: EnsembleScorer,
    extractor: PassageExtractor,
    warnings: Vec<String>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("options", &self.options)
            .field("workers", &self.options.worker_count())
            .field("warnings", &self.warnings)
            .finish()
    }
}

impl Pipeline {
    /// Create a pipeline. Fails fast on invalid configuration.
    pub fn new(options: RankOptions) -> Result<Self> {
        options.validate()?;

        let segmenter = Arc::new(Segmenter::new(&options.segment)?);
        let selection = select_tokenizer(&options.tokenizer);
        let warnings = selection.warning.iter().map(|e| e.to_string()).collect();

        let scorer = EnsembleScorer::new(
            Arc::clone(&selection.tokenizer),
            options.weights,
            options.bm25,
            options.contextual,
        )?;
        let extractor = PassageExtractor::new(
            selection.tokenizer,
            options.weights,
            options.bm25,
            options.passage,
        )?;

        Ok(Self {
            options,
            segmenter,
            scorer,
            extractor,
            warnings,
        })
    }

    /// Get the run options.
    pub fn options(&self) -> &RankOptions {
        &self.options
    }

    /// Tokenizer backend selected at construction.
    pub fn tokenizer_backend(&self) -> TokenizerBackend {
        self.scorer.tokenizer().backend()
    }

    /// Non-fatal warnings raised at construction.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Rank the sections of every document against the query.
    ///
    /// Per-document failures and timeouts never abort the run; they are
    /// reported in [`RankingOutput::documents`].
    pub fn run(&self, sources: &[Arc<dyn BlockSource>], query: &Query) -> RankingOutput {
        let started = Instant::now();
        if query.is_blank() {
            log::warn!("Query is blank; lexical scores will be zero");
        }

        let slots = self.segment_all(sources, started);
        let elapsed_at_barrier = started.elapsed().as_millis() as u64;

        let mut documents = Vec::with_capacity(sources.len());
        let mut pooled: Vec<Section> = Vec::new();
        for (source, slot) in sources.iter().zip(slots) {
            let document_id = source.document_id().to_string();
            let status = match slot {
                Some(Ok(sections)) if sections.is_empty() => {
                    log::debug!("Document '{}' produced no sections", document_id);
                    DocumentStatus::Empty
                }
                Some(Ok(sections)) => {
                    let count = sections.len();
                    pooled.extend(sections);
                    DocumentStatus::Segmented { sections: count }
                }
                Some(Err(e)) => {
                    log::warn!("Excluding document '{}': {}", document_id, e);
                    DocumentStatus::Failed {
                        reason: e.to_string(),
                    }
                }
                None => {
                    let e = Error::Timeout {
                        document_id: document_id.clone(),
                        elapsed_ms: elapsed_at_barrier,
                    };
                    log::warn!("{}", e);
                    DocumentStatus::TimedOut {
                        reason: e.to_string(),
                    }
                }
            };
            documents.push(DocumentOutcome {
                document_id,
                status,
            });
        }

        let tokens = self.scorer.tokenize_sections(&pooled);
        let corpus = CorpusStatistics::build(&tokens);
        let breakdowns = self.scorer.score_with_corpus(query, &pooled, &corpus);
        let section_count = pooled.len();

        let min_chars = self.options.min_section_chars;
        let (sections, breakdowns): (Vec<_>, Vec<_>) = pooled
            .into_iter()
            .zip(breakdowns)
            .filter(|(s, _)| s.scoring_text().chars().count() >= min_chars)
            .unzip();
        let candidate_count = sections.len();

        let mut ranked = rank_candidates(sections, breakdowns);
        ranked.truncate(self.options.top_k);

        let mut passages: BTreeMap<usize, _> = self
            .extractor
            .extract(&ranked, query)
            .into_iter()
            .map(|p| (p.candidate_rank, p))
            .collect();
        let results: Vec<RankedResult> = ranked
            .into_iter()
            .map(|candidate| RankedResult {
                passage: passages.remove(&candidate.rank),
                candidate,
            })
            .collect();

        let stats = RunStats {
            document_count: sources.len(),
            segmented_count: documents
                .iter()
                .filter(|d| matches!(d.status, DocumentStatus::Segmented { .. }))
                .count(),
            section_count,
            candidate_count,
            vocabulary_size: corpus.vocabulary_size(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        log::info!(
            "Ranked {} of {} sections from {} documents ({} segmented) in {} ms",
            results.len(),
            stats.candidate_count,
            stats.document_count,
            stats.segmented_count,
            stats.elapsed_ms
        );

        RankingOutput {
            query: query.clone(),
            results,
            documents,
            warnings: self.warnings.clone(),
            stats,
        }
    }

    /// Segment every document on a worker pool owned by this batch.
    ///
    /// Returns one slot per source in input order; `None` marks a document
    /// still pending when the batch timeout elapsed. Dropping the pool at the
    /// end detaches workers still stuck in a slow source.
    fn segment_all(&self, sources: &[Arc<dyn BlockSource>], started: Instant) -> Vec<Segmented> {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.worker_count())
            .thread_name(|i| format!("sectionrank-segment-{}", i))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                log::warn!("Cannot start worker pool: {}", e);
                return sources
                    .iter()
                    .map(|source| {
                        Some(Err(Error::input(
                            source.document_id(),
                            format!("cannot start worker pool: {}", e),
                        )))
                    })
                    .collect();
            }
        };

        let (result_tx, result_rx) = unbounded::<(usize, Result<Vec<Section>>)>();
        let cancelled = Arc::new(AtomicBool::new(false));

        for (index, source) in sources.iter().enumerate() {
            let source = Arc::clone(source);
            let segmenter = Arc::clone(&self.segmenter);
            let cancelled = Arc::clone(&cancelled);
            let result_tx = result_tx.clone();
            pool.spawn(move || {
                if cancelled.load(Ordering::Relaxed) {
                    return;
                }
                let result = catch_unwind(AssertUnwindSafe(|| {
                    segment_document(&segmenter, source.as_ref())
                }))
                .unwrap_or_else(|payload| {
                    Err(Error::input(
                        source.document_id(),
                        format!("segmentation panicked: {}", panic_message(&*payload)),
                    ))
                });
                // The receiver is gone once the batch timed out.
                let _ = result_tx.send((index, result));
            });
        }
        drop(result_tx);

        let deadline = self.options.timeout().map(|t| started + t);
        let mut slots: Vec<Segmented> = sources.iter().map(|_| None).collect();
        let mut pending = sources.len();

        while pending > 0 {
            let received = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match result_rx.recv_timeout(remaining) {
                        Ok(message) => message,
                        Err(RecvTimeoutError::Timeout) => {
                            log::warn!(
                                "Batch timeout reached with {} document(s) still pending",
                                pending
                            );
                            break;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match result_rx.recv() {
                    Ok(message) => message,
                    Err(_) => break,
                },
            };
            let (index, result) = received;
            slots[index] = Some(result);
            pending -= 1;
        }

        cancelled.store(true, Ordering::Relaxed);
        slots
    }
}

/// Load, validate and segment one document.
pub fn segment_document(segmenter: &Segmenter, source: &dyn BlockSource) -> Result<Vec<Section>> {
    let blocks = source.load_blocks()?;
    validate_blocks(source.document_id(), &blocks)?;
    Ok(segmenter.segment(&blocks))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
