//! The `pdgrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use pdgrade_core::config::load_config;
use pdgrade_core::dictionary::{load_dictionary, validate_dictionary, ValidationWarning};
use pdgrade_core::submission::{load_submissions, validate_submission};

fn print_warnings(warnings: &[ValidationWarning]) {
    for w in warnings {
        let prefix = w
            .subject
            .as_ref()
            .map(|s| format!("  [{s}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }
}

pub fn execute(dictionary_path: Option<PathBuf>, submission_path: Option<PathBuf>) -> Result<()> {
    let mut total_warnings = 0;

    if let Some(path) = &dictionary_path {
        let dict = load_dictionary(path)?;
        println!("Dictionary: {} ({} topics)", path.display(), dict.len());
        let warnings = validate_dictionary(&dict);
        print_warnings(&warnings);
        total_warnings += warnings.len();
    }

    if let Some(path) = &submission_path {
        let config = load_config()?;
        let dictionary = super::resolve_dictionary(dictionary_path.clone(), &config)?;
        for sub in load_submissions(path)? {
            println!(
                "Submission: {} ({} answers, topic {})",
                sub.id,
                sub.answers.len(),
                sub.topic
            );
            let warnings = validate_submission(&sub, &dictionary);
            print_warnings(&warnings);
            total_warnings += warnings.len();
        }
    }

    if total_warnings == 0 {
        println!("All files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
