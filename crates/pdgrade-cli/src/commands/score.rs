//! The `pdgrade score` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use pdgrade_core::config::load_config_from;
use pdgrade_core::engine::{EngineConfig, GradingEngine, ProgressReporter};
use pdgrade_core::report::{BatchReport, GradedSubmission};
use pdgrade_core::submission::load_submissions;
use pdgrade_report::html::write_html_report;

const FORMATS: [&str; 6] = ["text", "json", "markdown", "md", "html", "all"];

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_graded(&self, graded: &GradedSubmission) {
        eprintln!(
            "  Graded: {} ({}) {:.2} [{}]",
            graded.submission_id,
            graded.report.topic,
            graded.report.overall_score,
            graded.report.grade,
        );
    }

    fn on_error(&self, submission_id: &str, error: &str) {
        eprintln!("  ERROR: {submission_id}: {error}");
    }

    fn on_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {graded}/{total} graded, {failed} failed ({:.3}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub struct ScoreArgs {
    pub submission: PathBuf,
    pub dictionary: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub parallelism: Option<usize>,
    pub strict: bool,
    pub output: Option<PathBuf>,
    pub format: String,
}

pub async fn execute(args: ScoreArgs) -> Result<()> {
    anyhow::ensure!(
        FORMATS.contains(&args.format.as_str()),
        "unknown format '{}', expected one of: text, json, markdown, html, all",
        args.format
    );

    let config = load_config_from(args.config.as_deref())?;

    let parallelism = args.parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let dictionary = super::resolve_dictionary(args.dictionary, &config)?;

    let submissions = load_submissions(&args.submission)?;
    anyhow::ensure!(
        !submissions.is_empty(),
        "no submissions found in {}",
        args.submission.display()
    );

    tracing::debug!(
        "parallelism={parallelism} strict={} output={}",
        args.strict || config.strict_topics,
        args.output
            .as_deref()
            .unwrap_or(&config.output_dir)
            .display()
    );
    eprintln!("pdgrade — grading {} submission(s)", submissions.len());

    let engine = GradingEngine::new(
        Arc::new(dictionary),
        EngineConfig {
            parallelism,
            strict_topics: args.strict || config.strict_topics,
        },
    );
    let report = engine.run(&submissions, &ConsoleReporter).await?;

    let output = args.output.unwrap_or_else(|| config.output_dir.clone());

    match args.format.as_str() {
        "text" => print_summary(&report),
        "markdown" | "md" => print_markdown(&report),
        "json" => save_json(&report, &output)?,
        "html" => save_html(&report, &output)?,
        _ => {
            print_summary(&report);
            save_json(&report, &output)?;
            save_html(&report, &output)?;
        }
    }

    Ok(())
}

fn save_json(report: &BatchReport, output: &std::path::Path) -> Result<()> {
    let path = output.join("report.json");
    report.save_json(&path)?;
    println!("Results saved to: {}", path.display());
    Ok(())
}

fn save_html(report: &BatchReport, output: &std::path::Path) -> Result<()> {
    let path = output.join("report.html");
    write_html_report(report, &path)?;
    println!("HTML report: {}", path.display());
    Ok(())
}

fn print_markdown(report: &BatchReport) {
    for r in &report.results {
        println!("## {} ({})\n", r.submission_id, r.engineer);
        println!("{}", r.report.to_markdown());
    }
    for f in &report.failures {
        println!("## {} (failed)\n\n{}\n", f.submission_id, f.error);
    }
}

fn print_summary(report: &BatchReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Submission",
        "Engineer",
        "Topic",
        "Answers",
        "Score",
        "Grade",
        "Strengths",
        "Weaknesses",
    ]);

    for r in &report.results {
        table.add_row(vec![
            Cell::new(&r.submission_id),
            Cell::new(&r.engineer),
            Cell::new(&r.report.topic),
            Cell::new(r.report.answers.len()),
            Cell::new(format!("{:.2}", r.report.overall_score)),
            Cell::new(r.report.grade),
            Cell::new(r.report.strengths.join("; ")),
            Cell::new(r.report.weaknesses.join("; ")),
        ]);
    }

    println!("{table}");
    println!(
        "Mean score: {:.2} | {}/{} passing | {} failed",
        report.summary.mean_score,
        report.summary.passing,
        report.summary.submissions,
        report.summary.failed
    );
}
