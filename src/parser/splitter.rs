//! Splitting one compound cell ("subject - description") into two fields.
//!
//! Never fails loudly: when no usable separator is found the caller gets [`Split::Whole`]
//! back and decides how to react.

use regex::Regex;

#[derive(Debug, Clone)]
pub enum Separator {
    Literal(String),
    Pattern(Regex),
}

impl Separator {
    pub fn literal(s: impl Into<String>) -> Self {
        Separator::Literal(s.into())
    }

    pub fn pattern(re: Regex) -> Self {
        Separator::Pattern(re)
    }

    /// Byte ranges of every non-overlapping occurrence in `text`.
    fn occurrences(&self, text: &str) -> Vec<(usize, usize)> {
        match self {
            Separator::Literal(sep) if sep.is_empty() => Vec::new(),
            Separator::Literal(sep) => text
                .match_indices(sep.as_str())
                .map(|(i, m)| (i, i + m.len()))
                .collect(),
            Separator::Pattern(re) => re
                .find_iter(text)
                .filter(|m| !m.as_str().is_empty())
                .map(|m| (m.start(), m.end()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Succeeds only when exactly one separator of the set occurs exactly once, leaving two
    /// non-empty parts. Separators that occur more often do not count against it.
    Exact,
    /// Splits at the rightmost occurrence of any separator in the set.
    LastMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split<'a> {
    Parts(&'a str, &'a str),
    /// No usable separator; the whole (trimmed) text.
    Whole(&'a str),
}

impl<'a> Split<'a> {
    pub fn is_parts(&self) -> bool {
        matches!(self, Split::Parts(..))
    }
}

pub fn split<'a>(text: &'a str, separators: &[Separator], strategy: Strategy) -> Split<'a> {
    match strategy {
        Strategy::Exact => split_exact(text, separators),
        Strategy::LastMatch => split_last_match(text, separators),
    }
}

fn split_exact<'a>(text: &'a str, separators: &[Separator]) -> Split<'a> {
    let mut single = separators
        .iter()
        .filter_map(|sep| match sep.occurrences(text).as_slice() {
            [only] => Some(*only),
            _ => None,
        });
    match (single.next(), single.next()) {
        (Some((start, end)), None) => {
            let (before, after) = (text[..start].trim(), text[end..].trim());
            if before.is_empty() || after.is_empty() {
                Split::Whole(text.trim())
            } else {
                Split::Parts(before, after)
            }
        }
        _ => Split::Whole(text.trim()),
    }
}

fn split_last_match<'a>(text: &'a str, separators: &[Separator]) -> Split<'a> {
    let rightmost = separators
        .iter()
        .filter_map(|sep| sep.occurrences(text).last().copied())
        .max_by_key(|&(start, _)| start);

    match rightmost {
        Some((start, end)) => Split::Parts(text[..start].trim(), text[end..].trim()),
        None => Split::Whole(text.trim()),
    }
}
