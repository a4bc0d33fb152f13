//! The `pdgrade topics` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use pdgrade_core::config::load_config;

pub fn execute(topic: Option<String>, dictionary_path: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let dictionary = super::resolve_dictionary(dictionary_path, &config)?;

    if let Some(topic) = topic {
        let tables = dictionary.require(&topic)?;

        let mut terms = Table::new();
        terms.set_header(vec!["Term", "Weight"]);
        for (term, weight) in &tables.terms {
            terms.add_row(vec![Cell::new(term), Cell::new(weight)]);
        }
        println!("Terms ({} total weight):\n{terms}", tables.total_weight());

        let mut concepts = Table::new();
        concepts.set_header(vec!["Concept", "Keywords"]);
        for concept in &tables.concepts {
            concepts.add_row(vec![
                Cell::new(concept.label()),
                Cell::new(concept.keywords.join(", ")),
            ]);
        }
        println!("\nConcepts:\n{concepts}");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Topic", "Terms", "Total weight", "Concepts"]);
    for name in dictionary.topic_names() {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(dictionary.terms(name).len()),
            Cell::new(dictionary.terms(name).iter().map(|(_, w)| u64::from(*w)).sum::<u64>()),
            Cell::new(dictionary.concepts(name).len()),
        ]);
    }
    println!("{table}");

    Ok(())
}
