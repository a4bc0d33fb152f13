//! TOML submission files.
//!
//! A submission is one engineer's ordered answers to an assignment's
//! questions. Loading and validation mirror how a web layer would hand
//! answers to the evaluator.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dictionary::{Dictionary, ValidationWarning};
use crate::scorer::MIN_ANSWER_CHARS;

/// One engineer's answers for one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Unique identifier for this submission.
    pub id: String,
    /// Who submitted it.
    #[serde(default)]
    pub engineer: String,
    /// The assignment the answers belong to.
    #[serde(default)]
    pub assignment: String,
    /// Topic selecting the term/concept dictionary.
    pub topic: String,
    /// Answers in question order.
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// A question and the free-text answer given to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub text: String,
}

impl Submission {
    /// Answer texts in question order.
    pub fn answer_texts(&self) -> Vec<&str> {
        self.answers.iter().map(|a| a.text.as_str()).collect()
    }
}

/// Intermediate TOML structure for submission files.
#[derive(Debug, Deserialize)]
struct TomlSubmissionFile {
    submission: TomlSubmissionHeader,
    #[serde(default)]
    answers: Vec<Answer>,
}

#[derive(Debug, Deserialize)]
struct TomlSubmissionHeader {
    id: String,
    #[serde(default)]
    engineer: String,
    #[serde(default)]
    assignment: String,
    topic: String,
}

/// Parse a single submission file.
pub fn parse_submission(path: &Path) -> Result<Submission> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submission file: {}", path.display()))?;

    parse_submission_str(&content, path)
}

/// Parse a TOML string into a `Submission`.
pub fn parse_submission_str(content: &str, source_path: &Path) -> Result<Submission> {
    let parsed: TomlSubmissionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(Submission {
        id: parsed.submission.id,
        engineer: parsed.submission.engineer,
        assignment: parsed.submission.assignment,
        topic: parsed.submission.topic,
        answers: parsed.answers,
    })
}

/// Recursively load all `.toml` submission files from a directory, sorted by
/// path so batch output is stable.
pub fn load_submission_directory(dir: &Path) -> Result<Vec<Submission>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = Vec::new();
    collect_toml_files(dir, &mut paths)?;
    paths.sort();

    let mut submissions = Vec::new();
    for path in paths {
        match parse_submission(&path) {
            Ok(sub) => submissions.push(sub),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(submissions)
}

fn collect_toml_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            collect_toml_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            out.push(path);
        }
    }
    Ok(())
}

/// Load a file or every submission under a directory.
pub fn load_submissions(path: &Path) -> Result<Vec<Submission>> {
    if path.is_dir() {
        load_submission_directory(path)
    } else {
        Ok(vec![parse_submission(path)?])
    }
}

/// Check a submission for input that will score poorly for reasons other
/// than answer quality.
pub fn validate_submission(sub: &Submission, dictionary: &Dictionary) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if sub.answers.is_empty() {
        warnings.push(ValidationWarning {
            subject: None,
            message: "submission has no answers; it will score 0 (F)".into(),
        });
    }

    if !dictionary.contains_topic(&sub.topic) {
        warnings.push(ValidationWarning {
            subject: None,
            message: format!(
                "unknown topic '{}'; technical and concept scores will be 0",
                sub.topic
            ),
        });
    }

    let mut seen = HashSet::new();
    for (i, answer) in sub.answers.iter().enumerate() {
        let subject = if answer.question.is_empty() {
            format!("answer {}", i + 1)
        } else {
            answer.question.clone()
        };

        if !answer.question.is_empty() && !seen.insert(answer.question.as_str()) {
            warnings.push(ValidationWarning {
                subject: Some(subject.clone()),
                message: "duplicate question".into(),
            });
        }

        if answer.text.trim().chars().count() < MIN_ANSWER_CHARS {
            warnings.push(ValidationWarning {
                subject: Some(subject),
                message: format!(
                    "answer is shorter than {MIN_ANSWER_CHARS} characters and will score 0"
                ),
            });
        }
    }

    warnings
}
