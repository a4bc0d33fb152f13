//! Submission-level aggregation of per-answer scores.
//!
//! The submission grade is mapped from the mean overall score, never from an
//! average of letter grades. Strengths, weaknesses and recommendations are
//! fixed phrases chosen by threshold triggers, capped at three each.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::scorer::{AnswerScore, Grade, TARGET_WORD_COUNT};

const MAX_FINDINGS: usize = 3;

/// Answers with at least this many words count as detailed.
const DETAILED_WORDS: usize = 100;
/// Answers with fewer words than this count as too brief.
const BRIEF_WORDS: usize = 50;

pub const STRENGTH_VOCABULARY: &str = "Strong technical vocabulary";
pub const STRENGTH_PROBLEM_SOLVING: &str = "Good problem-solving approach";
pub const STRENGTH_DETAIL: &str = "Detailed explanations";

pub const WEAKNESS_DEPTH: &str = "Needs more technical depth";
pub const WEAKNESS_CONCEPTS: &str = "Missing key concepts";
pub const WEAKNESS_BRIEF: &str = "Some answers too brief";

/// How often a grade occurred among the answers of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCount {
    pub grade: Grade,
    pub count: usize,
}

/// Secondary diagnostics across all answers, each in `[0, 100]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Unique terms used relative to the topic's term table.
    pub technical_terms: f64,
    /// Inverse of the missing-concept ratio over all answers.
    pub concept_coverage: f64,
    /// Percentage of answers using any methodology language.
    pub methodology: f64,
    /// Mean answer length relative to the target length.
    pub practical: f64,
}

/// The consolidated result for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub topic: String,
    /// Arithmetic mean of the per-answer overall scores.
    pub overall_score: f64,
    pub grade: Grade,
    /// Per-answer scores, in answer order.
    pub answers: Vec<AnswerScore>,
    /// Per-answer grade frequencies, best grade first.
    pub grade_distribution: Vec<GradeCount>,
    /// Terms used anywhere, deduplicated, in first-seen order.
    pub unique_terms: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub breakdown: Breakdown,
}

impl SubmissionReport {
    /// Aggregate precomputed answer scores for `topic`.
    ///
    /// An empty score list yields overall 0 / "F"; assignments normally have
    /// at least one question, so this is only a fallback.
    pub fn from_scores(topic: &str, answers: Vec<AnswerScore>, dictionary: &Dictionary) -> Self {
        let topic = topic.trim().to_string();

        let overall_score = if answers.is_empty() {
            0.0
        } else {
            answers.iter().map(|a| a.overall_score).sum::<f64>() / answers.len() as f64
        };
        let grade = Grade::from_score(overall_score);

        let grade_distribution = grade_distribution(&answers);

        let mut seen = HashSet::new();
        let unique_terms: Vec<String> = answers
            .iter()
            .flat_map(|a| a.found_terms.iter())
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();

        // Concatenated, duplicates kept: used for counting.
        let all_missing: Vec<&String> = answers
            .iter()
            .flat_map(|a| a.missing_concepts.iter())
            .collect();

        let mut strengths = Vec::new();
        if !unique_terms.is_empty() {
            strengths.push(STRENGTH_VOCABULARY.to_string());
        }
        if overall_score >= 70.0 {
            strengths.push(STRENGTH_PROBLEM_SOLVING.to_string());
        }
        if answers.iter().any(|a| a.word_count >= DETAILED_WORDS) {
            strengths.push(STRENGTH_DETAIL.to_string());
        }
        strengths.truncate(MAX_FINDINGS);

        let mut weaknesses = Vec::new();
        if overall_score < 60.0 {
            weaknesses.push(WEAKNESS_DEPTH.to_string());
        }
        if !all_missing.is_empty() {
            weaknesses.push(WEAKNESS_CONCEPTS.to_string());
        }
        if answers.iter().any(|a| a.word_count < BRIEF_WORDS) {
            weaknesses.push(WEAKNESS_BRIEF.to_string());
        }
        weaknesses.truncate(MAX_FINDINGS);

        let recommendations = recommendations(&topic, &weaknesses);

        let breakdown = breakdown(
            &answers,
            unique_terms.len(),
            all_missing.len(),
            dictionary.terms(&topic).len(),
            dictionary.concepts(&topic).len(),
        );

        tracing::debug!(
            "aggregated {} answer(s) for '{topic}': overall={overall_score:.2} grade={grade}",
            answers.len()
        );

        Self {
            topic,
            overall_score,
            grade,
            answers,
            grade_distribution,
            unique_terms,
            strengths,
            weaknesses,
            recommendations,
            breakdown,
        }
    }

    /// Every term found across all answers, duplicates kept, in answer order.
    pub fn all_found_terms(&self) -> Vec<&str> {
        self.answers
            .iter()
            .flat_map(|a| a.found_terms.iter().map(String::as_str))
            .collect()
    }

    /// Every missing-concept label across all answers, duplicates kept.
    pub fn all_missing_concepts(&self) -> Vec<&str> {
        self.answers
            .iter()
            .flat_map(|a| a.missing_concepts.iter().map(String::as_str))
            .collect()
    }

    /// Render the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Topic:** {} | **Score:** {:.2} | **Grade:** {}\n\n",
            self.topic, self.overall_score, self.grade
        ));

        if !self.answers.is_empty() {
            md.push_str("| # | Technical | Concepts | Methodology | Practical | Overall | Grade |\n");
            md.push_str("|---|-----------|----------|-------------|-----------|---------|-------|\n");
            for (i, a) in self.answers.iter().enumerate() {
                md.push_str(&format!(
                    "| {} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} | {} |\n",
                    i + 1,
                    a.technical_score,
                    a.concept_score,
                    a.methodology_score,
                    a.practical_score,
                    a.overall_score,
                    a.grade
                ));
            }
            md.push('\n');
        }

        for (title, items) in [
            ("Strengths", &self.strengths),
            ("Weaknesses", &self.weaknesses),
            ("Recommendations", &self.recommendations),
        ] {
            if items.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            for item in items {
                md.push_str(&format!("- {item}\n"));
            }
            md.push('\n');
        }

        if !self.answers.is_empty() {
            md.push_str("### Feedback\n\n");
            for (i, a) in self.answers.iter().enumerate() {
                md.push_str(&format!("{}. {}\n", i + 1, a.feedback));
            }
        }

        md
    }
}

fn grade_distribution(answers: &[AnswerScore]) -> Vec<GradeCount> {
    Grade::ALL
        .iter()
        .filter_map(|grade| {
            let count = answers.iter().filter(|a| a.grade == *grade).count();
            (count > 0).then_some(GradeCount {
                grade: *grade,
                count,
            })
        })
        .collect()
}

fn recommendations(topic: &str, weaknesses: &[String]) -> Vec<String> {
    let mut recs: Vec<String> = weaknesses
        .iter()
        .filter_map(|w| match w.as_str() {
            WEAKNESS_DEPTH => Some(format!("Study advanced {topic} terminology")),
            WEAKNESS_CONCEPTS => Some(format!("Review fundamental {topic} principles")),
            WEAKNESS_BRIEF => Some("Provide more detailed explanations with examples".to_string()),
            _ => None,
        })
        .collect();

    if recs.is_empty() {
        recs = vec![
            format!("Practice advanced {topic} scenarios"),
            "Explore industry case studies and tool flows".to_string(),
            "Keep up with current EDA methodologies".to_string(),
        ];
    }

    recs.truncate(MAX_FINDINGS);
    recs
}

fn breakdown(
    answers: &[AnswerScore],
    unique_terms: usize,
    missing_total: usize,
    topic_terms: usize,
    topic_concepts: usize,
) -> Breakdown {
    if answers.is_empty() {
        return Breakdown::default();
    }
    let n = answers.len() as f64;

    let technical_terms = if topic_terms == 0 {
        0.0
    } else {
        (unique_terms as f64 / topic_terms as f64 * 100.0).min(100.0)
    };

    let concept_coverage = if topic_concepts == 0 {
        0.0
    } else {
        let possible = n * topic_concepts as f64;
        (100.0 - missing_total as f64 / possible * 100.0).clamp(0.0, 100.0)
    };

    let with_methodology = answers.iter().filter(|a| a.methodology_score > 0.0).count();
    let methodology = (with_methodology as f64 / n * 100.0).min(100.0);

    let mean_words = answers.iter().map(|a| a.word_count).sum::<usize>() as f64 / n;
    let practical = (mean_words / TARGET_WORD_COUNT as f64 * 100.0).min(100.0);

    Breakdown {
        technical_terms,
        concept_coverage,
        methodology,
        practical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{score_answer, score_submission, Evaluator};

    fn synthetic(overall: f64, words: usize, terms: &[&str], missing: &[&str]) -> AnswerScore {
        AnswerScore {
            technical_score: overall,
            concept_score: overall,
            methodology_score: overall,
            practical_score: overall,
            overall_score: overall,
            grade: Grade::from_score(overall),
            found_terms: terms.iter().map(|t| t.to_string()).collect(),
            missing_concepts: missing.iter().map(|m| m.to_string()).collect(),
            word_count: words,
            feedback: String::new(),
        }
    }

    fn aggregate(scores: Vec<AnswerScore>) -> SubmissionReport {
        SubmissionReport::from_scores("routing", scores, Dictionary::builtin())
    }

    #[test]
    fn empty_submission_falls_back_to_f() {
        let empty: [&str; 0] = [];
        let report = score_submission(&empty, "routing");
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.grade, Grade::F);
        assert!(report.answers.is_empty());
        assert!(report.grade_distribution.is_empty());
        assert_eq!(report.breakdown, Breakdown::default());
        assert_eq!(report.weaknesses, vec![WEAKNESS_DEPTH]);
    }

    #[test]
    fn mean_of_80_80_40_is_c_plus() {
        let report = aggregate(vec![
            synthetic(80.0, 120, &["drc"], &[]),
            synthetic(80.0, 120, &["via"], &[]),
            synthetic(40.0, 120, &[], &[]),
        ]);
        assert!((report.overall_score - 66.666_666_666_666_67).abs() < 1e-9);
        assert_eq!(format!("{:.2}", report.overall_score), "66.67");
        assert_eq!(report.grade, Grade::CPlus);
        assert_eq!(
            report.grade_distribution,
            vec![
                GradeCount { grade: Grade::BPlus, count: 2 },
                GradeCount { grade: Grade::F, count: 1 },
            ]
        );
    }

    #[test]
    fn overall_is_exact_mean_of_answer_scores() {
        let answers = [
            "Global routing assigns nets to gcells, then detailed routing fixes DRC and via issues.",
            "Crosstalk is reduced with shielding and spacing; we analyze signal integrity with StarRC at 7nm.",
            "too short",
            "Electromigration limits current density on each metal layer, so we optimize wire widths.",
        ];
        let report = score_submission(&answers, "routing");
        let per_answer: Vec<f64> = answers
            .iter()
            .map(|a| score_answer(a, "routing").overall_score)
            .collect();
        let mean = per_answer.iter().sum::<f64>() / per_answer.len() as f64;
        assert_eq!(report.overall_score, mean);
        assert_eq!(report.grade, Grade::from_score(mean));
        assert_eq!(report.answers.len(), 4);
        assert_eq!(report.answers[2].overall_score, 0.0);
    }

    #[test]
    fn unique_terms_deduplicate_but_counts_keep_duplicates() {
        let report = aggregate(vec![
            synthetic(50.0, 60, &["drc", "via"], &["Reliability"]),
            synthetic(50.0, 60, &["via", "crosstalk"], &["Reliability", "Routing Flow"]),
        ]);
        assert_eq!(report.unique_terms, vec!["drc", "via", "crosstalk"]);
        assert_eq!(report.all_found_terms(), vec!["drc", "via", "via", "crosstalk"]);
        assert_eq!(
            report.all_missing_concepts(),
            vec!["Reliability", "Reliability", "Routing Flow"]
        );
        // 3 unique of 15 routing terms; 3 missing of 2 * 5 possible concepts.
        assert!((report.breakdown.technical_terms - 20.0).abs() < 1e-9);
        assert!((report.breakdown.concept_coverage - 70.0).abs() < 1e-9);
        assert!((report.breakdown.practical - 40.0).abs() < 1e-9);
        assert_eq!(report.breakdown.methodology, 100.0);
    }

    #[test]
    fn strengths_follow_trigger_order() {
        let report = aggregate(vec![synthetic(90.0, 150, &["drc"], &[])]);
        assert_eq!(
            report.strengths,
            vec![STRENGTH_VOCABULARY, STRENGTH_PROBLEM_SOLVING, STRENGTH_DETAIL]
        );
        assert!(report.weaknesses.is_empty());
        assert_eq!(report.recommendations.len(), 3);
        assert_eq!(report.recommendations[0], "Practice advanced routing scenarios");
    }

    #[test]
    fn weaknesses_map_to_recommendations() {
        let report = aggregate(vec![
            synthetic(30.0, 10, &[], &["Design Rules"]),
            synthetic(30.0, 80, &[], &[]),
        ]);
        assert!(report.strengths.is_empty());
        assert_eq!(
            report.weaknesses,
            vec![WEAKNESS_DEPTH, WEAKNESS_CONCEPTS, WEAKNESS_BRIEF]
        );
        assert_eq!(
            report.recommendations,
            vec![
                "Study advanced routing terminology",
                "Review fundamental routing principles",
                "Provide more detailed explanations with examples",
            ]
        );
    }

    #[test]
    fn unknown_topic_never_fails() {
        let answers = ["A long enough answer about antenna rules and DRC on every metal layer."; 3];
        let report = Evaluator::default().score_submission(&answers, "mixed-signal");
        for a in &report.answers {
            assert_eq!(a.technical_score, 0.0);
            assert_eq!(a.concept_score, 0.0);
        }
        assert_eq!(report.breakdown.technical_terms, 0.0);
        assert_eq!(report.breakdown.concept_coverage, 0.0);
        assert!(!report.weaknesses.contains(&WEAKNESS_CONCEPTS.to_string()));
    }

    #[test]
    fn markdown_lists_answers_and_findings() {
        let report = aggregate(vec![synthetic(80.0, 120, &["drc"], &[])]);
        let md = report.to_markdown();
        assert!(md.contains("**Grade:** B+"));
        assert!(md.contains("| 1 | 80.0"));
        assert!(md.contains("### Strengths"));
        assert!(!md.contains("### Weaknesses"));
    }

    #[test]
    fn report_serializes_grades_as_labels() {
        let report = aggregate(vec![synthetic(96.0, 120, &[], &[])]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["grade"], "A+");
        assert_eq!(json["grade_distribution"][0]["grade"], "A+");
        let back: SubmissionReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
