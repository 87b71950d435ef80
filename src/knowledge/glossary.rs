//! Bundled market glossary, used as the default knowledge document.

use regex::Regex;
use std::sync::LazyLock;

pub const GLOSSARY_SOURCE: &str = "market_basics.txt";
pub const GLOSSARY_TEXT: &str = include_str!("../../data/sample_docs/market_basics.txt");

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<term>[A-Z][A-Za-z/\- ]{1,40}):\s+(?P<definition>\S.*)$")
        .expect("glossary pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

/// `Term: definition` paragraphs of a document
pub fn parse_entries(text: &str) -> Vec<GlossaryEntry> {
    text.split("\n\n")
        .map(str::trim)
        .filter_map(|paragraph| {
            let caps = ENTRY.captures(paragraph)?;
            Some(GlossaryEntry {
                term: caps["term"].trim().to_string(),
                definition: caps["definition"].trim().to_string(),
            })
        })
        .collect()
}

pub fn entries() -> Vec<GlossaryEntry> {
    parse_entries(GLOSSARY_TEXT)
}

/// Case-insensitive exact term lookup
pub fn define(term: &str) -> Option<GlossaryEntry> {
    let wanted = term.trim();
    entries()
        .into_iter()
        .find(|entry| entry.term.eq_ignore_ascii_case(wanted))
}
