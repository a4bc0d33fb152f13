//! pdgrade-core — Heuristic scoring engine for physical-design answers.
//!
//! This crate holds the term/concept dictionary, the per-answer scorer, the
//! submission aggregator, and the batch engine that the `pdgrade` binary and
//! any web layer build on. Scoring is a pure function of its inputs.

pub mod aggregate;
pub mod config;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod report;
pub mod scorer;
pub mod submission;

pub use aggregate::{Breakdown, GradeCount, SubmissionReport};
pub use dictionary::{Concept, Dictionary, TopicTables};
pub use error::DictionaryError;
pub use scorer::{score_answer, score_submission, AnswerScore, Evaluator, Grade};
