//! Per-topic term and concept tables.
//!
//! A [`Dictionary`] maps a topic (e.g. "routing") to a weighted vocabulary and
//! to a set of named concepts, each covered by any one of its trigger
//! keywords. The built-in dictionary is initialised once and never mutated;
//! extra topics can be layered on from a TOML file before a dictionary is
//! shared with the scorer.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::DictionaryError;

static BUILTIN: Lazy<Dictionary> = Lazy::new(builtin_dictionary);

/// A named competency area and the keywords that mark it as covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// Identifier, e.g. `power_planning`.
    pub name: String,
    /// Lowercase trigger keywords; any one present covers the concept.
    pub keywords: Vec<String>,
}

impl Concept {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Human-readable label: underscores become spaces and each word is
    /// title-cased (`power_planning` -> `Power Planning`).
    pub fn label(&self) -> String {
        self.name
            .split('_')
            .filter(|w| !w.is_empty())
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether any keyword occurs in an already case-folded answer.
    pub fn is_covered_by(&self, folded_answer: &str) -> bool {
        self.keywords.iter().any(|k| folded_answer.contains(k.as_str()))
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// The term table and concept groups for one topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTables {
    /// Lowercase terms with their importance weights, in table order.
    pub terms: Vec<(String, u32)>,
    /// Concept groups, in table order.
    #[serde(default)]
    pub concepts: Vec<Concept>,
}

impl TopicTables {
    /// Sum of all term weights in the table.
    pub fn total_weight(&self) -> u64 {
        self.terms.iter().map(|(_, w)| u64::from(*w)).sum()
    }
}

/// Topic name -> term table and concept groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    topics: BTreeMap<String, TopicTables>,
}

/// Topic keys are compared trimmed and lowercased.
pub fn normalize_topic(topic: &str) -> String {
    topic.trim().to_lowercase()
}

impl Dictionary {
    /// An empty dictionary with no topics.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared built-in dictionary (floorplanning, placement, routing).
    pub fn builtin() -> &'static Dictionary {
        &BUILTIN
    }

    /// Look up a topic's tables, or `None` if the topic is unknown.
    pub fn get(&self, topic: &str) -> Option<&TopicTables> {
        self.topics.get(&normalize_topic(topic))
    }

    /// Strict lookup for callers that require pre-validated topics.
    pub fn require(&self, topic: &str) -> Result<&TopicTables, DictionaryError> {
        self.get(topic)
            .ok_or_else(|| DictionaryError::UnknownTopic(topic.trim().to_string()))
    }

    /// Term table for a topic; empty for an unknown topic.
    pub fn terms(&self, topic: &str) -> &[(String, u32)] {
        self.get(topic).map(|t| t.terms.as_slice()).unwrap_or(&[])
    }

    /// Concept groups for a topic; empty for an unknown topic.
    pub fn concepts(&self, topic: &str) -> &[Concept] {
        self.get(topic).map(|t| t.concepts.as_slice()).unwrap_or(&[])
    }

    pub fn contains_topic(&self, topic: &str) -> bool {
        self.get(topic).is_some()
    }

    /// Topic names in sorted order.
    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Add or replace a topic. Rejects tables that would make term scoring
    /// divide by zero, and blank terms or keywords, which would match every
    /// answer.
    pub fn insert_topic(&mut self, name: &str, tables: TopicTables) -> Result<(), DictionaryError> {
        let key = normalize_topic(name);
        if key.is_empty() {
            return Err(DictionaryError::EmptyTopicName);
        }
        if tables.terms.is_empty() {
            return Err(DictionaryError::EmptyTermTable(key));
        }
        if let Some((term, _)) = tables.terms.iter().find(|(t, _)| t.trim().is_empty()) {
            return Err(DictionaryError::EmptyTerm {
                topic: key,
                term: term.clone(),
            });
        }
        if let Some(concept) = tables
            .concepts
            .iter()
            .find(|c| c.keywords.iter().any(|k| k.trim().is_empty()))
        {
            return Err(DictionaryError::EmptyKeyword {
                topic: key,
                concept: concept.name.clone(),
            });
        }
        if let Some((term, _)) = tables.terms.iter().find(|(_, w)| *w == 0) {
            return Err(DictionaryError::ZeroWeight {
                topic: key,
                term: term.clone(),
            });
        }
        self.topics.insert(key, tables);
        Ok(())
    }

    /// Overlay every topic of `other` onto this dictionary; `other` wins on
    /// topic collisions.
    pub fn merge(&mut self, other: Dictionary) {
        for (name, tables) in other.topics {
            if self.topics.insert(name.clone(), tables).is_some() {
                tracing::debug!("topic '{name}' overridden by loaded dictionary");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TOML loading
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TomlDictionaryFile {
    #[serde(default)]
    topics: BTreeMap<String, TomlTopic>,
}

#[derive(Debug, Deserialize)]
struct TomlTopic {
    #[serde(default)]
    terms: BTreeMap<String, u32>,
    #[serde(default)]
    concepts: BTreeMap<String, Vec<String>>,
}

/// Parse a TOML string into a dictionary containing only the file's topics.
pub fn parse_dictionary_str(content: &str, source_path: &Path) -> Result<Dictionary> {
    let parsed: TomlDictionaryFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut dict = Dictionary::new();
    for (name, topic) in parsed.topics {
        let tables = TopicTables {
            terms: topic
                .terms
                .into_iter()
                .map(|(term, weight)| (term.trim().to_lowercase(), weight))
                .collect(),
            concepts: topic
                .concepts
                .into_iter()
                .map(|(name, keywords)| Concept {
                    name,
                    keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
                })
                .collect(),
        };
        dict.insert_topic(&name, tables)
            .with_context(|| format!("invalid topic in {}", source_path.display()))?;
    }

    Ok(dict)
}

/// Load extra topics from a TOML dictionary file.
pub fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dictionary file: {}", path.display()))?;

    parse_dictionary_str(&content, path)
}

/// The built-in topics, with an optional file layered on top.
pub fn load_with_builtins(path: Option<&Path>) -> Result<Dictionary> {
    let mut dict = Dictionary::builtin().clone();
    if let Some(path) = path {
        let extra = load_dictionary(path)?;
        tracing::info!("loaded {} topic(s) from {}", extra.len(), path.display());
        dict.merge(extra);
    }
    Ok(dict)
}

/// A non-fatal problem found while validating input files.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The topic, concept, or question the warning is about (if any).
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a dictionary for entries that can never match or that skew scores.
pub fn validate_dictionary(dict: &Dictionary) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (name, tables) in &dict.topics {
        if tables.concepts.is_empty() {
            warnings.push(ValidationWarning {
                subject: Some(name.clone()),
                message: "topic has no concepts; concept score will always be 0".into(),
            });
        }

        let mut seen = HashSet::new();
        for (term, _) in &tables.terms {
            if !seen.insert(term.as_str()) {
                warnings.push(ValidationWarning {
                    subject: Some(name.clone()),
                    message: format!("duplicate term: {term}"),
                });
            }
            if !is_matchable(term) {
                warnings.push(ValidationWarning {
                    subject: Some(name.clone()),
                    message: format!("term '{term}' is not lowercase/trimmed and will never match"),
                });
            }
        }

        for concept in &tables.concepts {
            if concept.keywords.is_empty() {
                warnings.push(ValidationWarning {
                    subject: Some(format!("{name}/{}", concept.name)),
                    message: "concept has no keywords and can never be covered".into(),
                });
            }
            for keyword in &concept.keywords {
                if !is_matchable(keyword) {
                    warnings.push(ValidationWarning {
                        subject: Some(format!("{name}/{}", concept.name)),
                        message: format!(
                            "keyword '{keyword}' is not lowercase/trimmed and will never match"
                        ),
                    });
                }
            }
        }
    }

    warnings
}

fn is_matchable(s: &str) -> bool {
    !s.is_empty() && s.trim() == s && s.to_lowercase() == s
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

fn tables(terms: &[(&str, u32)], concepts: Vec<Concept>) -> TopicTables {
    TopicTables {
        terms: terms.iter().map(|(t, w)| (t.to_string(), *w)).collect(),
        concepts,
    }
}

fn builtin_dictionary() -> Dictionary {
    let mut topics = BTreeMap::new();

    topics.insert(
        "floorplanning".to_string(),
        tables(
            &[
                ("macro", 3),
                ("utilization", 3),
                ("aspect ratio", 2),
                ("power grid", 3),
                ("ir drop", 3),
                ("congestion", 2),
                ("pin placement", 2),
                ("blockage", 2),
                ("halo", 1),
                ("io ring", 2),
                ("thermal", 2),
                ("die size", 2),
                ("core area", 2),
                ("channel", 1),
                ("hierarchical", 1),
            ],
            vec![
                Concept::new("macro_placement", &["macro", "hard ip", "memory placement"]),
                Concept::new(
                    "power_planning",
                    &["power grid", "power ring", "ir drop", "pdn", "power stripe"],
                ),
                Concept::new(
                    "area_estimation",
                    &["utilization", "aspect ratio", "die size", "core area"],
                ),
                Concept::new("thermal_management", &["thermal", "hotspot", "heat"]),
                Concept::new("io_planning", &["io ring", "pin placement", "pad ring", "bump"]),
            ],
        ),
    );

    topics.insert(
        "placement".to_string(),
        tables(
            &[
                ("global placement", 3),
                ("detailed placement", 3),
                ("legalization", 3),
                ("timing driven", 3),
                ("congestion", 2),
                ("wirelength", 3),
                ("hpwl", 2),
                ("density", 2),
                ("cell spreading", 2),
                ("scan chain", 1),
                ("clock tree", 2),
                ("buffer", 1),
                ("setup", 2),
                ("hold", 2),
                ("slack", 2),
            ],
            vec![
                Concept::new(
                    "placement_flow",
                    &["global placement", "detailed placement", "legalization"],
                ),
                Concept::new(
                    "timing_optimization",
                    &["timing", "slack", "setup", "hold", "critical path"],
                ),
                Concept::new(
                    "congestion_control",
                    &["congestion", "density", "spreading", "routability"],
                ),
                Concept::new("wirelength_minimization", &["wirelength", "hpwl", "net length"]),
                Concept::new(
                    "physical_synthesis",
                    &["buffer", "resizing", "gate sizing", "scan chain"],
                ),
            ],
        ),
    );

    topics.insert(
        "routing".to_string(),
        tables(
            &[
                ("global routing", 3),
                ("detailed routing", 3),
                ("drc", 3),
                ("via", 2),
                ("crosstalk", 3),
                ("antenna", 2),
                ("track", 1),
                ("metal layer", 2),
                ("congestion", 2),
                ("shielding", 2),
                ("electromigration", 2),
                ("signal integrity", 3),
                ("timing", 2),
                ("net ordering", 1),
                ("double patterning", 2),
            ],
            vec![
                Concept::new(
                    "routing_flow",
                    &["global routing", "detailed routing", "track assignment"],
                ),
                Concept::new("design_rules", &["drc", "design rule", "spacing", "min width"]),
                Concept::new(
                    "signal_integrity",
                    &["crosstalk", "signal integrity", "noise", "shielding", "coupling"],
                ),
                Concept::new(
                    "reliability",
                    &["electromigration", "antenna", "current density"],
                ),
                Concept::new("layer_assignment", &["metal layer", "via", "layer assignment"]),
            ],
        ),
    );

    Dictionary { topics }
}
