//! Personal-name parsing.
//!
//! Accepted shapes, tried in order:
//!
//! 1. `Last, First [Middle ...]` (anything containing a comma)
//! 2. `Last` (a single token: surname only, first name empty)
//! 3. `First Last`
//! 4. `First [Middle ...] Last [Suffix]`, where a trailing `Jr`, `Sr` or a
//!    roman numeral up to `VI` (optional period) stays with the surname
//!
//! LaTeX bold wrappers and braces are stripped first. Compact initials such
//! as `A.M.` are split into a first and a middle initial, and one-letter
//! initials lose their period (`M.` becomes `M`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use super::similarity::normalize;
use crate::models::author::full_name;

static LATEX_BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\textbf\{([^}]*)\}").expect("valid regex"));
static SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(jr|sr|i{1,3}|iv|v|vi)\.?$").expect("valid regex"));
static COMPACT_INITIALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\p{Lu}\.){2,}$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ParsedName {
    /// Empty when only a surname was given
    pub first: String,
    pub middle: Option<String>,
    pub last: String,
}

impl ParsedName {
    pub fn parse(raw: &str) -> Option<Self> {
        let name = clean(raw);
        if name.is_empty() {
            return None;
        }

        let (first, middle, last) = match name.split_once(',') {
            Some((last, rest)) => {
                // `Last, First, Jr.`: the suffix segment joins the surname
                let (given, suffix) = match rest.rsplit_once(',') {
                    Some((given, tail)) if is_suffix(tail.trim()) => (given, Some(tail.trim())),
                    _ => (rest, None),
                };
                let mut given = given
                    .split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|s| !s.is_empty());
                let first = given.next().unwrap_or("").to_string();
                let middle: Vec<&str> = given.collect();
                let last = match suffix {
                    Some(suffix) => format!("{} {}", last.trim(), suffix),
                    None => last.trim().to_string(),
                };
                (first, middle.join(" "), last)
            }
            None => {
                let parts: Vec<&str> = name.split_whitespace().collect();
                match parts.as_slice() {
                    [] => return None,
                    [last] => (String::new(), String::new(), last.to_string()),
                    [last, suffix] if is_suffix(suffix) && suffix.trim_end_matches('.').len() > 1 => {
                        (String::new(), String::new(), format!("{} {}", last, suffix))
                    }
                    [first, last] => (first.to_string(), String::new(), last.to_string()),
                    [first, rest @ ..] => {
                        let (middle, last) = match rest {
                            [middle @ .., surname, suffix] if SUFFIX.is_match(suffix) => {
                                (middle.join(" "), format!("{} {}", surname, suffix))
                            }
                            [middle @ .., surname] => (middle.join(" "), surname.to_string()),
                            [] => (String::new(), String::new()),
                        };
                        (first.to_string(), middle, last)
                    }
                }
            }
        };

        if last.is_empty() {
            return None;
        }

        let (first, middle) = split_compact_initials(first, middle);

        Some(Self {
            first: strip_initial_period(&first),
            middle: Some(
                middle
                    .split_whitespace()
                    .map(strip_initial_period)
                    .collect::<Vec<_>>()
                    .join(" "),
            )
            .filter(|m| !m.is_empty()),
            last,
        })
    }

    /// A one-letter first name such as `M`.
    pub fn is_initial(&self) -> bool {
        let mut chars = self.first.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
    }

    pub fn first_initial(&self) -> Option<char> {
        self.first.chars().next().map(|c| c.to_ascii_lowercase())
    }

    pub fn full_name(&self) -> String {
        full_name(&self.first, self.middle.as_deref(), &self.last)
    }

    /// Normalized keys an author can be looked up by: the full name,
    /// `f last` and `last f`.
    pub fn lookup_keys(&self) -> Vec<String> {
        let mut keys = vec![normalize(&self.full_name())];
        if let Some(initial) = self.first_initial() {
            keys.push(normalize(&format!("{} {}", initial, self.last)));
            keys.push(normalize(&format!("{} {}", self.last, initial)));
        }
        keys.dedup();
        keys
    }
}

/// `Jr`, `Sr` or a roman numeral up to `VI`, with or without a period.
pub fn is_suffix(token: &str) -> bool {
    SUFFIX.is_match(token)
}

fn clean(raw: &str) -> String {
    let unwrapped = LATEX_BOLD.replace_all(raw, "$1");
    unwrapped
        .replace(['{', '}'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_compact_initials(first: String, middle: String) -> (String, String) {
    if !COMPACT_INITIALS.is_match(&first) {
        return (first, middle);
    }
    let mut initials = first.split('.').filter(|s| !s.is_empty());
    let head = initials.next().unwrap_or("").to_string();
    let mut rest: Vec<&str> = initials.collect();
    if !middle.is_empty() {
        rest.push(&middle);
    }
    (head, rest.join(" "))
}

fn strip_initial_period(part: &str) -> String {
    if part.chars().count() <= 2 && part.ends_with('.') {
        part.trim_end_matches('.').to_string()
    } else {
        part.to_string()
    }
}
