//! Heuristic per-answer scoring.
//!
//! An answer is scored on four sub-metrics, each in `[0, 100]`:
//!
//! | metric      | weight | signal                                         |
//! |-------------|--------|------------------------------------------------|
//! | technical   | 0.40   | weighted topic terms found as substrings       |
//! | concept     | 0.30   | fraction of topic concepts with a keyword hit  |
//! | methodology | 0.20   | distinct methodology verbs (3 saturates)       |
//! | practical   | 0.10   | tool names, numbers with units, answer length  |
//!
//! All matching is plain substring matching on the lowercased answer, so
//! "timing" also matches inside "retiming". Scoring never fails: unknown
//! topics and short answers degrade to zero scores.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::aggregate::SubmissionReport;
use crate::dictionary::{Concept, Dictionary};

/// Answers shorter than this (in chars, after trimming) score 0 / "F".
pub const MIN_ANSWER_CHARS: usize = 20;

/// Word count at which the length component of the practical score saturates.
pub const TARGET_WORD_COUNT: usize = 150;

pub const TECHNICAL_WEIGHT: f64 = 0.40;
pub const CONCEPT_WEIGHT: f64 = 0.30;
pub const METHODOLOGY_WEIGHT: f64 = 0.20;
pub const PRACTICAL_WEIGHT: f64 = 0.10;

/// Verbs that signal a structured approach. Counted once each.
pub const METHODOLOGY_VERBS: [&str; 6] = [
    "analyze",
    "approach",
    "strategy",
    "method",
    "implement",
    "optimize",
];

/// Distinct methodology verbs needed for a full methodology score.
const METHODOLOGY_SATURATION: f64 = 3.0;

/// EDA tools whose mention signals hands-on experience.
pub const INDUSTRY_TOOLS: [&str; 12] = [
    "innovus",
    "icc2",
    "ic compiler",
    "fusion compiler",
    "primetime",
    "tempus",
    "voltus",
    "redhawk",
    "calibre",
    "starrc",
    "openroad",
    "encounter",
];

const TOOL_POINTS: f64 = 20.0;
const NUMERIC_POINTS: f64 = 15.0;

static NUMERIC_WITH_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+(?:\.\d+)?\s*(?:mm|nm|ps|ns|ma|mhz|ghz|%)")
        .expect("numeric-with-unit pattern is a valid regex")
});

const SHORT_ANSWER_FEEDBACK: &str =
    "Answer is too short to evaluate. Provide a detailed explanation.";

// ---------------------------------------------------------------------------
// Grade
// ---------------------------------------------------------------------------

/// Letter grade derived from an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

/// Inclusive lower bounds, best grade first. Anything below the last is F.
const GRADE_THRESHOLDS: [(f64, Grade); 10] = [
    (95.0, Grade::APlus),
    (90.0, Grade::A),
    (85.0, Grade::AMinus),
    (80.0, Grade::BPlus),
    (75.0, Grade::B),
    (70.0, Grade::BMinus),
    (65.0, Grade::CPlus),
    (60.0, Grade::C),
    (55.0, Grade::CMinus),
    (50.0, Grade::D),
];

impl Grade {
    /// Every grade, best first.
    pub const ALL: [Grade; 11] = [
        Grade::APlus,
        Grade::A,
        Grade::AMinus,
        Grade::BPlus,
        Grade::B,
        Grade::BMinus,
        Grade::CPlus,
        Grade::C,
        Grade::CMinus,
        Grade::D,
        Grade::F,
    ];

    /// Map an overall score to a grade. NaN maps to F.
    pub fn from_score(score: f64) -> Grade {
        GRADE_THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    /// D and above.
    pub fn is_passing(&self) -> bool {
        *self != Grade::F
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Grade::ALL
            .iter()
            .find(|g| g.as_str() == upper)
            .copied()
            .ok_or_else(|| format!("unknown grade: {s}"))
    }
}

// ---------------------------------------------------------------------------
// AnswerScore
// ---------------------------------------------------------------------------

/// The scored result for a single answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerScore {
    /// Weighted term coverage, 0-100.
    pub technical_score: f64,
    /// Share of topic concepts covered, 0-100.
    pub concept_score: f64,
    /// Methodology language, 0-100.
    pub methodology_score: f64,
    /// Tools, quantities and length, 0-100.
    pub practical_score: f64,
    /// Weighted combination of the four sub-scores, 0-100.
    pub overall_score: f64,
    pub grade: Grade,
    /// Terms found, in term-table order.
    pub found_terms: Vec<String>,
    /// Labels of concepts with no keyword hit, in table order.
    pub missing_concepts: Vec<String>,
    /// Whitespace-delimited tokens in the raw answer.
    pub word_count: usize,
    pub feedback: String,
}

impl AnswerScore {
    fn too_short(word_count: usize) -> Self {
        Self {
            technical_score: 0.0,
            concept_score: 0.0,
            methodology_score: 0.0,
            practical_score: 0.0,
            overall_score: 0.0,
            grade: Grade::F,
            found_terms: Vec::new(),
            missing_concepts: Vec::new(),
            word_count,
            feedback: SHORT_ANSWER_FEEDBACK.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Stateless scorer bound to a read-only dictionary.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    dictionary: &'a Dictionary,
}

impl Default for Evaluator<'static> {
    fn default() -> Self {
        Self::new(Dictionary::builtin())
    }
}

impl<'a> Evaluator<'a> {
    pub fn new(dictionary: &'a Dictionary) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &'a Dictionary {
        self.dictionary
    }

    /// Score one answer against a topic.
    pub fn score_answer(&self, answer: &str, topic: &str) -> AnswerScore {
        let word_count = answer.split_whitespace().count();
        if answer.trim().chars().count() < MIN_ANSWER_CHARS {
            return AnswerScore::too_short(word_count);
        }

        if !self.dictionary.contains_topic(topic) {
            tracing::warn!("unknown topic '{}', term and concept scores will be 0", topic.trim());
        }

        let folded = answer.to_lowercase();

        let (technical, found_terms) = technical_score(&folded, self.dictionary.terms(topic));
        let (concept, missing_concepts) = concept_score(&folded, self.dictionary.concepts(topic));
        let methodology = methodology_score(&folded);
        let practical = practical_score(&folded, answer, word_count);

        let overall = (technical * TECHNICAL_WEIGHT
            + concept * CONCEPT_WEIGHT
            + methodology * METHODOLOGY_WEIGHT
            + practical * PRACTICAL_WEIGHT)
            .min(100.0);

        tracing::debug!(
            "scored answer ({topic}): technical={technical:.1} concept={concept:.1} \
             methodology={methodology:.1} practical={practical:.1} overall={overall:.1}"
        );

        let feedback = feedback(
            topic.trim(),
            technical,
            concept,
            methodology,
            practical,
            &missing_concepts,
        );

        AnswerScore {
            technical_score: technical,
            concept_score: concept,
            methodology_score: methodology,
            practical_score: practical,
            overall_score: overall,
            grade: Grade::from_score(overall),
            found_terms,
            missing_concepts,
            word_count,
            feedback,
        }
    }

    /// Score every answer of a submission, in order, and aggregate.
    pub fn score_submission<S: AsRef<str>>(&self, answers: &[S], topic: &str) -> SubmissionReport {
        let scores = answers
            .iter()
            .map(|a| self.score_answer(a.as_ref(), topic))
            .collect();
        SubmissionReport::from_scores(topic, scores, self.dictionary)
    }
}

/// Score one answer with the built-in dictionary.
pub fn score_answer(answer: &str, topic: &str) -> AnswerScore {
    Evaluator::default().score_answer(answer, topic)
}

/// Score a whole submission with the built-in dictionary.
pub fn score_submission<S: AsRef<str>>(answers: &[S], topic: &str) -> SubmissionReport {
    Evaluator::default().score_submission(answers, topic)
}

// ---------------------------------------------------------------------------
// Sub-scores
// ---------------------------------------------------------------------------

/// Weighted share of the term table present in the answer, plus the terms hit.
pub fn technical_score(folded: &str, terms: &[(String, u32)]) -> (f64, Vec<String>) {
    let total: u64 = terms.iter().map(|(_, w)| u64::from(*w)).sum();
    if total == 0 {
        return (0.0, Vec::new());
    }

    let mut hit = 0u64;
    let mut found = Vec::new();
    for (term, weight) in terms {
        if folded.contains(term.as_str()) {
            hit += u64::from(*weight);
            found.push(term.clone());
        }
    }

    let score = (hit as f64 / total as f64 * 100.0).min(100.0);
    (score, found)
}

/// Share of concepts covered, plus the labels of those that are not.
pub fn concept_score(folded: &str, concepts: &[Concept]) -> (f64, Vec<String>) {
    if concepts.is_empty() {
        return (0.0, Vec::new());
    }

    let mut covered = 0usize;
    let mut missing = Vec::new();
    for concept in concepts {
        if concept.is_covered_by(folded) {
            covered += 1;
        } else {
            missing.push(concept.label());
        }
    }

    let score = covered as f64 / concepts.len() as f64 * 100.0;
    (score, missing)
}

/// Distinct methodology verbs present; three or more saturate at 100.
pub fn methodology_score(folded: &str) -> f64 {
    let distinct = METHODOLOGY_VERBS
        .iter()
        .filter(|verb| folded.contains(*verb))
        .count();
    (distinct as f64 / METHODOLOGY_SATURATION * 100.0).min(100.0)
}

/// Number of distinct industry tools mentioned.
pub fn tool_mentions(folded: &str) -> usize {
    INDUSTRY_TOOLS
        .iter()
        .filter(|tool| folded.contains(*tool))
        .count()
}

/// Non-overlapping numbers followed by a unit, e.g. "10.5 mm" or "3GHz".
pub fn numeric_mentions(answer: &str) -> usize {
    NUMERIC_WITH_UNIT.find_iter(answer).count()
}

/// Tools, quantities and length combined and capped at 100.
pub fn practical_score(folded: &str, raw: &str, word_count: usize) -> f64 {
    let tools = tool_mentions(folded) as f64;
    let numbers = numeric_mentions(raw) as f64;
    let length = (word_count as f64 / TARGET_WORD_COUNT as f64 * 100.0).min(100.0);
    (tools * TOOL_POINTS + numbers * NUMERIC_POINTS + length * 0.5).min(100.0)
}

fn feedback(
    topic: &str,
    technical: f64,
    concept: f64,
    methodology: f64,
    practical: f64,
    missing: &[String],
) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);

    parts.push(if technical >= 70.0 {
        "Excellent use of technical terminology.".to_string()
    } else {
        format!("Consider using more {topic}-specific technical terms.")
    });

    parts.push(if concept >= 70.0 {
        "Good coverage of key concepts.".to_string()
    } else if missing.is_empty() {
        format!("Cover the fundamental {topic} concepts.")
    } else {
        let named: Vec<&str> = missing.iter().take(3).map(String::as_str).collect();
        format!("Address missing {topic} concepts: {}.", named.join(", "))
    });

    parts.push(if methodology >= 60.0 {
        "Clear methodology and approach.".to_string()
    } else {
        "Explain your methodology and approach more explicitly.".to_string()
    });

    parts.push(if practical >= 60.0 {
        "Good practical and quantitative detail.".to_string()
    } else {
        "Add practical examples, tool references, or quantitative values.".to_string()
    });

    parts.join(" ")
}
