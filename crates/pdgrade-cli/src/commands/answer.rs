//! The `pdgrade answer` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use pdgrade_core::config::load_config;
use pdgrade_core::scorer::Evaluator;

pub fn execute(
    topic: String,
    text: Option<String>,
    file: Option<PathBuf>,
    dictionary_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let answer = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read answer file: {}", path.display()))?,
        (None, None) => anyhow::bail!("either --text or --file is required"),
    };

    let config = load_config()?;
    let dictionary = super::resolve_dictionary(dictionary_path, &config)?;
    let score = Evaluator::new(&dictionary).score_answer(&answer, &topic);

    if json {
        println!("{}", serde_json::to_string_pretty(&score)?);
        return Ok(());
    }

    println!("Topic:       {}", topic.trim());
    println!("Overall:     {:.2} ({})", score.overall_score, score.grade);
    println!("Technical:   {:.1}", score.technical_score);
    println!("Concepts:    {:.1}", score.concept_score);
    println!("Methodology: {:.1}", score.methodology_score);
    println!("Practical:   {:.1}", score.practical_score);
    if !score.found_terms.is_empty() {
        println!("Terms:       {}", score.found_terms.join(", "));
    }
    if !score.missing_concepts.is_empty() {
        println!("Missing:     {}", score.missing_concepts.join(", "));
    }
    println!("\n{}", score.feedback);

    Ok(())
}
