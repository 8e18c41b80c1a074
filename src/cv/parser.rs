//! CV bibliography parser.
//!
//! Input is plain text copied from a CV: section headings separated by blank
//! lines, each followed by bulleted entries that may wrap over several
//! lines. An entry reads
//!
//! ```text
//! ❑Authors. (Year or status). Title. Venue. Location. Extras.
//! ```
//!
//! Parsing is heuristic. Entries that do not fit are skipped and logged.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    matching::{names::is_suffix, ParsedName},
    models::{PublicationStatus, PublicationType},
};

const BULLETS: [char; 4] = ['❑', '•', '●', '▪'];

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid regex"));
static DOI: Lazy<Regex> = Lazy::new(|| Regex::new(r"10\.\d{4,9}/\S+").expect("valid regex"));
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid regex"));
static INITIALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\p{Lu}\.\s*)+\.*$|^\p{Lu}$").expect("valid regex"));
static BARE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?(19|20)\d{2}\)?$").expect("valid regex"));

/// One publication read from a CV
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CvEntry {
    /// Heading of the section the entry was found under
    pub section: String,
    pub publication_type: PublicationType,
    pub authors: Vec<ParsedName>,
    pub year: i32,
    pub status: PublicationStatus,
    pub title: String,
    pub venue: Option<String>,
    pub location: Option<String>,
    pub award: Option<String>,
    pub doi: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ParsedCv {
    pub entries: Vec<CvEntry>,
    /// Raw text of entries that could not be parsed
    pub skipped: Vec<String>,
}

/// Parse a whole CV. `default_year` is used for entries without a year.
pub fn parse_cv(text: &str, default_year: i32) -> ParsedCv {
    let mut raw_entries: Vec<(String, String)> = Vec::new();
    let mut section = String::new();
    let mut current: Option<String> = None;
    let mut after_blank = true;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if let Some(entry) = current.take() {
                raw_entries.push((section.clone(), entry));
            }
            after_blank = true;
            continue;
        }

        if line.starts_with(&BULLETS[..]) {
            if let Some(entry) = current.take() {
                raw_entries.push((section.clone(), entry));
            }
            current = Some(line.to_string());
        } else if let Some(entry) = current.as_mut().filter(|_| !after_blank) {
            join_line(entry, line);
        } else if after_blank {
            section = line.to_string();
        } else {
            // Heading wrapped over two lines
            section.push(' ');
            section.push_str(line);
        }
        after_blank = false;
    }
    if let Some(entry) = current.take() {
        raw_entries.push((section, entry));
    }

    let mut parsed = ParsedCv::default();
    for (section, raw) in raw_entries {
        match parse_entry(&raw, &section, default_year) {
            Some(entry) => parsed.entries.push(entry),
            None => {
                tracing::warn!("Skipping unparseable CV entry: {}", raw);
                parsed.skipped.push(raw);
            }
        }
    }

    tracing::debug!(
        "Parsed {} CV entries, skipped {}",
        parsed.entries.len(),
        parsed.skipped.len()
    );
    parsed
}

/// Parse a single bulleted entry (already joined onto one line).
pub fn parse_entry(raw: &str, section: &str, default_year: i32) -> Option<CvEntry> {
    let body = raw.trim().strip_prefix(&BULLETS[..])?.trim();

    let open = body.find('(')?;
    let close = open + body[open..].find(')')?;

    let authors = split_authors(&body[..open]);
    if authors.is_empty() {
        return None;
    }

    let (year, status) = year_and_status(&body[open + 1..close], default_year);

    let rest = body[close + 1..].trim_start().trim_start_matches('.').trim();
    let doi = DOI.find(rest).map(|m| trim_identifier(m.as_str()));
    let url = URL.find(rest).map(|m| trim_identifier(m.as_str()));
    let text = URL.replace_all(rest, "");
    let text = DOI.replace_all(&text, "");

    let mut sentences = split_sentences(&text)
        .into_iter()
        .filter(|s| !BARE_YEAR.is_match(s));

    let title = sentences.next()?;
    let mut venue = None;
    let mut award = None;
    let mut location = Vec::new();
    for sentence in sentences {
        if sentence.contains("Award") {
            award = Some(strip_quotes(&sentence));
        } else if venue.is_none() {
            venue = Some(sentence);
        } else {
            location.push(sentence);
        }
    }

    Some(CvEntry {
        section: section.to_string(),
        publication_type: PublicationType::from_section_heading(section),
        authors,
        year,
        status,
        title,
        venue,
        location: Some(location.join(". ")).filter(|l| !l.is_empty()),
        award,
        doi,
        url,
    })
}

/// Append a wrapped line to an entry. Hyphenation breaks are undone and a
/// URL split across lines is rejoined.
fn join_line(entry: &mut String, next: &str) {
    let ends_with_url = entry
        .split_whitespace()
        .last()
        .map(|token| token.starts_with("http://") || token.starts_with("https://"))
        .unwrap_or(false);
    let next_is_lowercase = next.chars().next().map(char::is_lowercase).unwrap_or(false);

    if !ends_with_url {
        if entry.ends_with('-') && next_is_lowercase {
            entry.pop();
        } else {
            entry.push(' ');
        }
    }
    entry.push_str(next);
}

/// Split the author list. Initials-only tokens (`M.`, `A.M.`, `P. G.`) belong
/// to the surname before them and a suffix (`Jr.`) to the name before it; a
/// surname with no initials stands alone.
fn split_authors(part: &str) -> Vec<ParsedName> {
    let mut names = Vec::new();
    let mut surname: Option<String> = None;

    for token in part.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if INITIALS.is_match(token) {
            match surname.take() {
                Some(last) => names.push(format!("{}, {}", last, collapse_periods(token))),
                None => tracing::debug!("Initials '{}' without a surname", token),
            }
        } else if is_suffix(token) {
            match (surname.as_mut(), names.last_mut()) {
                (Some(last), _) => {
                    last.push(' ');
                    last.push_str(token);
                }
                (None, Some(previous)) => {
                    previous.push_str(", ");
                    previous.push_str(token);
                }
                (None, None) => tracing::debug!("Suffix '{}' without a name", token),
            }
        } else if let Some(last) = surname.replace(token.to_string()) {
            names.push(last);
        }
    }
    if let Some(last) = surname {
        names.push(last);
    }

    names.iter().filter_map(|n| ParsedName::parse(n)).collect()
}

/// `M..` -> `M.`
fn collapse_periods(token: &str) -> String {
    if token.ends_with('.') {
        format!("{}.", token.trim_end_matches('.'))
    } else {
        token.to_string()
    }
}

fn year_and_status(group: &str, default_year: i32) -> (i32, PublicationStatus) {
    let lower = group.to_lowercase();
    let year = YEAR
        .find(group)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default_year);

    let status = if lower.contains("in review") {
        PublicationStatus::InReview
    } else if lower.contains("in progress") || lower.contains("in preparation") {
        PublicationStatus::InPreparation
    } else {
        PublicationStatus::Published
    };
    (year, status)
}

/// Split at `.`, `?` or `!` followed by whitespace. `?` and `!` stay with
/// their sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let at_boundary =
            matches!(c, '.' | '?' | '!') && chars.peek().map_or(true, |n| n.is_whitespace());
        if !at_boundary {
            current.push(c);
            continue;
        }
        if c != '.' {
            current.push(c);
        }
        push_sentence(&mut sentences, &mut current);
    }
    push_sentence(&mut sentences, &mut current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let sentence = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if sentence.chars().any(char::is_alphanumeric) {
        sentences.push(sentence);
    }
    current.clear();
}

fn trim_identifier(s: &str) -> String {
    s.trim_end_matches(&['.', ','][..]).to_string()
}

fn strip_quotes(s: &str) -> String {
    const QUOTES: [char; 6] = ['\'', '"', '‘', '’', '“', '”'];
    let s = s.trim();
    if s.starts_with(&QUOTES[..]) && s.ends_with(&QUOTES[..]) {
        s.trim_matches(&QUOTES[..]).trim().to_string()
    } else {
        s.to_string()
    }
}
