pub mod splitter;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::constants::{
    CASE_ROW_CELLS, DATE_CELL, DATE_FORMAT, LOOSE_SUBJECT_SEPARATOR, REPORTER_CELL,
    SUBJECT_CELL, SUBJECT_SEPARATORS, SUPERVISOR_CELL, SUPERVISOR_SEPARATOR,
};
use crate::normalize::NameNormalizer;
use crate::types::{CaseRecord, Diagnostic, DiagnosticKind, ParseOutcome, Row, SkipReason};

use splitter::{Separator, Split, Strategy};

static LOOSE_SUBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(LOOSE_SUBJECT_SEPARATOR).expect("valid loose separator regex"));

static SUPERVISOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(SUPERVISOR_SEPARATOR).expect("valid supervisor separator regex"));

/// Turns one case-list row into a [`CaseRecord`] or a skip decision.
///
/// Holds no mutable state: the fallback separators are chosen per row, never carried
/// over from an earlier ambiguous row.
#[derive(Debug, Clone)]
pub struct RowParser {
    normalizer: NameNormalizer,
    date_format: String,
    strict_separators: Vec<Separator>,
    loose_separators: Vec<Separator>,
}

impl Default for RowParser {
    fn default() -> Self {
        Self::new(NameNormalizer::default())
    }
}

impl RowParser {
    pub fn new(normalizer: NameNormalizer) -> Self {
        Self {
            normalizer,
            date_format: DATE_FORMAT.to_string(),
            strict_separators: SUBJECT_SEPARATORS
                .iter()
                .map(|s| Separator::literal(*s))
                .collect(),
            loose_separators: vec![Separator::pattern(Regex::clone(&LOOSE_SUBJECT_RE))],
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// `is_last_row` only lowers the severity of an unparsable date: stray template
    /// remnants at the bottom of a table are expected and are skipped silently.
    pub fn parse(&self, row: &Row, is_last_row: bool) -> ParseOutcome {
        if row.cells.len() != CASE_ROW_CELLS {
            let diagnostic = Diagnostic::warning(
                DiagnosticKind::RowSkipped,
                format!(
                    "row has {} columns instead of the usual {}, skipping",
                    row.cells.len(),
                    CASE_ROW_CELLS
                ),
            )
            .with_row(row.raw_text());
            return ParseOutcome::Skipped(
                SkipReason::ColumnCount {
                    found: row.cells.len(),
                },
                Some(diagnostic),
            );
        }

        let cell = move |i: usize| row.cell(i).unwrap_or_default().trim();

        let date_text = cell(DATE_CELL);
        let assigned_date = match NaiveDate::parse_from_str(date_text, &self.date_format) {
            Ok(date) => date,
            Err(e) => {
                let reason = SkipReason::InvalidDate {
                    text: date_text.to_string(),
                };
                if is_last_row {
                    debug!(date = %date_text, "skipping trailing row without a valid date");
                    return ParseOutcome::Skipped(reason, None);
                }
                let diagnostic = Diagnostic::warning(
                    DiagnosticKind::RowSkipped,
                    format!(
                        "row has an invalid date '{}' ({}) and is not the last one, skipping",
                        date_text, e
                    ),
                )
                .with_row(row.raw_text());
                return ParseOutcome::Skipped(reason, Some(diagnostic));
            }
        };

        let mut diagnostics = Vec::new();

        let subject_text = cell(SUBJECT_CELL);
        let (subject, description) = self.split_subject(subject_text, row, &mut diagnostics);

        let supervisor_text = cell(SUPERVISOR_CELL);
        let supervisor = match split_supervisor(supervisor_text) {
            Some(name) => name,
            None => {
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::AmbiguousSplit,
                        format!(
                            "can't decisively split the supervisor and their caseload from '{}'",
                            supervisor_text
                        ),
                    )
                    .with_row(row.raw_text()),
                );
                supervisor_text
            }
        };

        let record = CaseRecord {
            reporter: cell(REPORTER_CELL).to_string(),
            subject: subject.to_string(),
            description: description.to_string(),
            supervisor: self.normalizer.normalize(supervisor),
            assigned_date,
            has_warnings: !diagnostics.is_empty(),
            source_row_text: row.raw_text(),
        };

        if diagnostics.is_empty() {
            ParseOutcome::Parsed(record)
        } else {
            ParseOutcome::Ambiguous(record, diagnostics)
        }
    }

    fn split_subject<'a>(
        &self,
        text: &'a str,
        row: &Row,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (&'a str, &'a str) {
        if let Split::Parts(subject, description) =
            splitter::split(text, &self.strict_separators, Strategy::Exact)
        {
            return (subject, description);
        }

        diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::AmbiguousSplit,
                format!(
                    "can't decisively split the subject and the description from '{}', \
                     consider fixing this row",
                    text
                ),
            )
            .with_row(row.raw_text()),
        );

        match splitter::split(text, &self.loose_separators, Strategy::LastMatch) {
            Split::Parts(subject, description) => (subject, description),
            Split::Whole(subject) => (subject, ""),
        }
    }
}

/// First part of "name - caseload", or `None` when the cell has no usable separator.
fn split_supervisor(text: &str) -> Option<&str> {
    let mut parts = SUPERVISOR_RE.splitn(text, 2);
    match (parts.next(), parts.next()) {
        (Some(name), Some(_)) if !name.trim().is_empty() => Some(name.trim()),
        _ => None,
    }
}
