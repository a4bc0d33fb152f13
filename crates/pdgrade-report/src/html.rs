//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use pdgrade_core::report::{BatchReport, GradedSubmission};
use pdgrade_core::scorer::Grade;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn grade_class(grade: Grade) -> &'static str {
    match grade {
        Grade::APlus | Grade::A | Grade::AMinus | Grade::BPlus | Grade::B | Grade::BMinus => {
            "pass"
        }
        Grade::CPlus | Grade::C | Grade::CMinus | Grade::D => "warn",
        Grade::F => "fail",
    }
}

/// Generate an HTML page from a batch report.
pub fn generate_html(report: &BatchReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>pdgrade report</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>pdgrade report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} graded | {} failed | mean {:.2} | {} passing | {}</p>\n",
        report.summary.submissions,
        report.summary.failed,
        report.summary.mean_score,
        report.summary.passing,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Submission</th><th>Engineer</th><th>Assignment</th><th>Topic</th><th>Score</th><th>Grade</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for r in &report.results {
        html.push_str(&format!(
            "<tr><td><a href=\"#{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td class=\"{}\">{}</td></tr>\n",
            html_escape(&r.submission_id),
            html_escape(&r.submission_id),
            html_escape(&r.engineer),
            html_escape(&r.assignment),
            html_escape(&r.report.topic),
            r.report.overall_score,
            grade_class(r.report.grade),
            r.report.grade,
        ));
    }
    html.push_str("</tbody></table>\n");

    if !report.results.is_empty() {
        html.push_str(&generate_bar_chart(&report.results));
    }

    if !report.failures.is_empty() {
        html.push_str("<h3>Failed</h3>\n<ul class=\"failures\">\n");
        for f in &report.failures {
            html.push_str(&format!(
                "<li><strong>{}</strong>: {}</li>\n",
                html_escape(&f.submission_id),
                html_escape(&f.error)
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</section>\n");

    // Per-submission details
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Submissions</h2>\n");
    for r in &report.results {
        html.push_str(&submission_section(r));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

fn submission_section(r: &GradedSubmission) -> String {
    let report = &r.report;
    let mut html = format!(
        "<article id=\"{}\">\n<h3>{} <span class=\"{}\">{} ({:.2})</span></h3>\n",
        html_escape(&r.submission_id),
        html_escape(&r.submission_id),
        grade_class(report.grade),
        report.grade,
        report.overall_score
    );

    html.push_str("<table class=\"answers\">\n");
    html.push_str("<thead><tr><th>#</th><th>Technical</th><th>Concepts</th><th>Methodology</th><th>Practical</th><th>Overall</th><th>Grade</th><th>Feedback</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (i, a) in report.answers.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
            i + 1,
            a.technical_score,
            a.concept_score,
            a.methodology_score,
            a.practical_score,
            a.overall_score,
            grade_class(a.grade),
            a.grade,
            html_escape(&a.feedback),
        ));
    }
    html.push_str("</tbody></table>\n");

    for (title, items) in [
        ("Strengths", &report.strengths),
        ("Weaknesses", &report.weaknesses),
        ("Recommendations", &report.recommendations),
    ] {
        if items.is_empty() {
            continue;
        }
        html.push_str(&format!("<h4>{title}</h4>\n<ul>\n"));
        for item in items {
            html.push_str(&format!("<li>{}</li>\n", html_escape(item)));
        }
        html.push_str("</ul>\n");
    }

    if !report.unique_terms.is_empty() {
        html.push_str(&format!(
            "<p class=\"terms\">Terms used: {}</p>\n",
            html_escape(&report.unique_terms.join(", "))
        ));
    }

    html.push_str("</article>\n");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &BatchReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(results: &[GradedSubmission]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 200;

    let total_height = results.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, r) in results.iter().enumerate() {
        let score = r.report.overall_score;
        let y = i * (bar_height + padding) + padding;
        let width = (score / 100.0 * max_width as f64) as usize;

        let color = match grade_class(r.report.grade) {
            "pass" => "#22c55e",
            "warn" => "#eab308",
            _ => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&r.submission_id)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --warn: #fef9c3; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --warn: #713f12; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .terms { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.warn { background: var(--warn); }
.fail { background: var(--fail); }
article { border-top: 1px solid var(--border); margin-top: 1.5rem; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use pdgrade_core::report::{BatchSummary, FailedSubmission};
    use pdgrade_core::scorer::score_submission;

    fn make_test_report() -> BatchReport {
        let results = vec![GradedSubmission {
            submission_id: "sub-1".into(),
            engineer: "<script>".into(),
            assignment: "fp-basics".into(),
            report: score_submission(
                &["We analyze macro placement and the power grid to keep IR drop under 5% at 1 GHz."],
                "floorplanning",
            ),
        }];
        let summary = BatchSummary::from_results(&results, 1);
        BatchReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            results,
            failures: vec![FailedSubmission {
                submission_id: "sub-2".into(),
                error: "unknown topic: analog".into(),
            }],
            summary,
            duration_ms: 10,
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("sub-1"));
        assert!(html.contains("fp-basics"));
        assert!(html.contains("floorplanning"));
        assert!(html.contains("unknown topic: analog"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn html_report_escapes_content() {
        let html = generate_html(&make_test_report());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }

    #[test]
    fn grade_classes() {
        assert_eq!(grade_class(Grade::APlus), "pass");
        assert_eq!(grade_class(Grade::D), "warn");
        assert_eq!(grade_class(Grade::F), "fail");
    }
}
