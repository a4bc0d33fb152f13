//! Batch report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{GradeCount, SubmissionReport};
use crate::scorer::Grade;

/// The result of grading a batch of submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Graded submissions, in input order.
    pub results: Vec<GradedSubmission>,
    /// Submissions that could not be graded.
    #[serde(default)]
    pub failures: Vec<FailedSubmission>,
    /// Summary over the graded submissions.
    pub summary: BatchSummary,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// A submission together with its report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedSubmission {
    pub submission_id: String,
    pub engineer: String,
    pub assignment: String,
    pub report: SubmissionReport,
}

/// A submission rejected before scoring (strict topic mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedSubmission {
    pub submission_id: String,
    pub error: String,
}

/// Batch-level statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of graded submissions.
    pub submissions: usize,
    /// Number of submissions that failed.
    pub failed: usize,
    /// Mean submission score over graded submissions.
    pub mean_score: f64,
    /// Submission grade frequencies, best first.
    pub grade_distribution: Vec<GradeCount>,
    /// Graded submissions with a passing grade.
    pub passing: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[GradedSubmission], failed: usize) -> Self {
        let n = results.len();
        let mean_score = if n == 0 {
            0.0
        } else {
            results.iter().map(|r| r.report.overall_score).sum::<f64>() / n as f64
        };

        let grade_distribution = Grade::ALL
            .iter()
            .filter_map(|grade| {
                let count = results.iter().filter(|r| r.report.grade == *grade).count();
                (count > 0).then_some(GradeCount {
                    grade: *grade,
                    count,
                })
            })
            .collect();

        let passing = results
            .iter()
            .filter(|r| r.report.grade.is_passing())
            .count();

        Self {
            submissions: n,
            failed,
            mean_score,
            grade_distribution,
            passing,
        }
    }
}

impl BatchReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: BatchReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Look up a graded submission by id.
    pub fn find(&self, submission_id: &str) -> Option<&GradedSubmission> {
        self.results.iter().find(|r| r.submission_id == submission_id)
    }
}
