//! Batch grading engine.
//!
//! Grades many submissions concurrently. Scoring is pure and CPU-bound, so
//! each submission runs on the blocking pool against a shared, read-only
//! dictionary; a semaphore bounds how many run at once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::dictionary::Dictionary;
use crate::report::{BatchReport, BatchSummary, FailedSubmission, GradedSubmission};
use crate::scorer::Evaluator;
use crate::submission::Submission;

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum submissions graded at once.
    pub parallelism: usize,
    /// Reject submissions whose topic is not in the dictionary instead of
    /// scoring them with empty tables.
    pub strict_topics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            strict_topics: false,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_graded(&self, graded: &GradedSubmission);
    fn on_error(&self, submission_id: &str, error: &str);
    fn on_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_graded(&self, _: &GradedSubmission) {}
    fn on_error(&self, _: &str, _: &str) {}
    fn on_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Grade a single submission synchronously.
pub fn grade_submission(
    dictionary: &Dictionary,
    submission: &Submission,
    strict_topics: bool,
) -> Result<GradedSubmission> {
    if strict_topics {
        dictionary.require(&submission.topic)?;
    }

    let report =
        Evaluator::new(dictionary).score_submission(&submission.answer_texts(), &submission.topic);

    Ok(GradedSubmission {
        submission_id: submission.id.clone(),
        engineer: submission.engineer.clone(),
        assignment: submission.assignment.clone(),
        report,
    })
}

/// The batch grading engine.
pub struct GradingEngine {
    dictionary: Arc<Dictionary>,
    config: EngineConfig,
}

impl GradingEngine {
    pub fn new(dictionary: Arc<Dictionary>, config: EngineConfig) -> Self {
        Self { dictionary, config }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Grade every submission and collect the results in input order.
    ///
    /// A submission that fails is reported and counted; it never aborts the
    /// rest of the batch.
    pub async fn run(
        &self,
        submissions: &[Submission],
        progress: &dyn ProgressReporter,
    ) -> Result<BatchReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let mut futures = FuturesUnordered::new();

        for (index, submission) in submissions.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let dictionary = Arc::clone(&self.dictionary);
            let submission = submission.clone();
            let strict = self.config.strict_topics;

            futures.push(async move {
                let ctx_id = submission.id.clone();
                let inner = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .context("semaphore closed")?;

                    let graded = tokio::task::spawn_blocking(move || {
                        grade_submission(&dictionary, &submission, strict)
                    })
                    .await
                    .context("grading task failed")??;

                    Ok::<_, anyhow::Error>(graded)
                };
                (index, ctx_id, inner.await)
            });
        }

        let total = futures.len();
        let mut graded = Vec::with_capacity(total);
        let mut failures = Vec::new();

        while let Some((index, submission_id, result)) = futures.next().await {
            match result {
                Ok(g) => {
                    progress.on_graded(&g);
                    graded.push((index, g));
                }
                Err(e) => {
                    tracing::error!("grading failed for {submission_id}: {e:#}");
                    progress.on_error(&submission_id, &format!("{e:#}"));
                    failures.push((
                        index,
                        FailedSubmission {
                            submission_id,
                            error: format!("{e:#}"),
                        },
                    ));
                }
            }
        }

        graded.sort_by_key(|(i, _)| *i);
        failures.sort_by_key(|(i, _)| *i);
        let results: Vec<GradedSubmission> = graded.into_iter().map(|(_, g)| g).collect();
        let failures: Vec<FailedSubmission> = failures.into_iter().map(|(_, f)| f).collect();

        let elapsed = start.elapsed();
        progress.on_complete(total, results.len(), failures.len(), elapsed);
        tracing::info!(
            "graded {}/{} submission(s) in {}ms",
            results.len(),
            total,
            elapsed.as_millis()
        );

        let summary = BatchSummary::from_results(&results, failures.len());

        Ok(BatchReport {
            id: run_id,
            created_at: chrono::Utc::now(),
            results,
            failures,
            summary,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::Answer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn submission(id: &str, topic: &str, texts: &[&str]) -> Submission {
        Submission {
            id: id.into(),
            engineer: format!("eng-{id}"),
            assignment: "batch".into(),
            topic: topic.into(),
            answers: texts
                .iter()
                .enumerate()
                .map(|(i, t)| Answer {
                    question: format!("Q{}", i + 1),
                    text: t.to_string(),
                })
                .collect(),
        }
    }

    #[derive(Default)]
    struct CountingReporter {
        graded: AtomicUsize,
        errors: AtomicUsize,
        completed: AtomicUsize,
    }

    impl ProgressReporter for CountingReporter {
        fn on_graded(&self, _: &GradedSubmission) {
            self.graded.fetch_add(1, Ordering::SeqCst);
        }
        fn on_error(&self, _: &str, _: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
        fn on_complete(&self, _: usize, _: usize, _: usize, _: Duration) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn batch() -> Vec<Submission> {
        (0..10)
            .map(|i| {
                submission(
                    &format!("s{i:02}"),
                    ["floorplanning", "placement", "routing", "unknown"][i % 4],
                    &[
                        "We analyze macro placement, IR drop on the power grid and congestion.",
                        "Detailed routing fixes DRC, via and antenna issues at 7 nm.",
                    ],
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let engine = GradingEngine::new(
            Arc::new(Dictionary::builtin().clone()),
            EngineConfig {
                parallelism: 3,
                strict_topics: false,
            },
        );
        let subs = batch();
        let reporter = CountingReporter::default();
        let report = engine.run(&subs, &reporter).await.unwrap();

        let ids: Vec<&str> = report.results.iter().map(|r| r.submission_id.as_str()).collect();
        let expected: Vec<&str> = subs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, expected);
        assert!(report.failures.is_empty());
        assert_eq!(reporter.graded.load(Ordering::SeqCst), 10);
        assert_eq!(reporter.completed.load(Ordering::SeqCst), 1);
        assert_eq!(report.summary.submissions, 10);
    }

    #[tokio::test]
    async fn batch_matches_direct_scoring() {
        let dict = Arc::new(Dictionary::builtin().clone());
        let engine = GradingEngine::new(Arc::clone(&dict), EngineConfig::default());
        let subs = batch();
        let report = engine.run(&subs, &NoopReporter).await.unwrap();

        for (sub, graded) in subs.iter().zip(&report.results) {
            let direct = grade_submission(&dict, sub, false).unwrap();
            assert_eq!(graded.report, direct.report);
        }
    }

    #[tokio::test]
    async fn strict_mode_fails_unknown_topics_individually() {
        let engine = GradingEngine::new(
            Arc::new(Dictionary::builtin().clone()),
            EngineConfig {
                parallelism: 2,
                strict_topics: true,
            },
        );
        let reporter = CountingReporter::default();
        let report = engine.run(&batch(), &reporter).await.unwrap();

        // Indices 3 and 7 use the unknown topic.
        assert_eq!(report.results.len(), 8);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].submission_id, "s03");
        assert!(report.failures[0].error.contains("unknown topic"));
        assert_eq!(report.summary.failed, 2);
        assert_eq!(reporter.errors.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_batch() {
        let engine = GradingEngine::new(
            Arc::new(Dictionary::builtin().clone()),
            EngineConfig::default(),
        );
        let report = engine.run(&[], &NoopReporter).await.unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.summary.mean_score, 0.0);
    }
}
