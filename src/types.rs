use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// One table row as plain cell text, decoupled from whatever markup it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<String>,
    /// Original row markup, kept only for diagnostics.
    pub source: Option<String>,
}

impl Row {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// Text used to point at this row in warnings.
    pub fn raw_text(&self) -> String {
        match &self.source {
            Some(source) => source.clone(),
            None => self.cells.join(" | "),
        }
    }
}

/// One year-table of the case list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// All cell text of the table joined with spaces.
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An inspection case extracted from a single row. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseRecord {
    pub reporter: String,
    pub subject: String,
    pub description: String,
    pub supervisor: String,
    pub assigned_date: NaiveDate,
    pub has_warnings: bool,
    #[serde(skip)]
    pub source_row_text: String,
}

impl fmt::Display for CaseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Case] assigned={} subject='{}' supervisor='{}' description='{}'",
            self.assigned_date.format("%Y-%m-%d"),
            self.subject,
            self.supervisor,
            self.description
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Unexpected document structure that does not stop the run.
    Structure,
    /// A configuration value was out of range and has been replaced.
    Config,
    /// A row was not turned into a record.
    RowSkipped,
    /// A cell could not be split cleanly; the record was still produced.
    AmbiguousSplit,
    /// A supervisor has suspiciously few cases.
    AuditAdvisory,
}

/// A non-fatal finding reported alongside the extracted records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub row: Option<String>,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            row: None,
        }
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Info,
            message: message.into(),
            row: None,
        }
    }

    pub fn with_row(mut self, row: impl Into<String>) -> Self {
        self.row = Some(row.into());
        self
    }

    /// Emit through `tracing` at the matching level.
    pub fn log(&self) {
        let kind = format!("{:?}", self.kind);
        match (self.severity, &self.row) {
            (Severity::Warning, Some(row)) => warn!(kind = %kind, row = %row, "{}", self.message),
            (Severity::Warning, None) => warn!(kind = %kind, "{}", self.message),
            (Severity::Info, Some(row)) => info!(kind = %kind, row = %row, "{}", self.message),
            (Severity::Info, None) => info!(kind = %kind, "{}", self.message),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}: {}", self.severity, self.kind, self.message)?;
        if let Some(row) = &self.row {
            write!(f, "\n  {}", row.lines().collect::<Vec<_>>().join("\n  "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ColumnCount { found: usize },
    InvalidDate { text: String },
}

/// Result of parsing one row. Skips and ambiguity are ordinary values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(CaseRecord),
    Ambiguous(CaseRecord, Vec<Diagnostic>),
    /// The diagnostic is absent when the skip is expected (malformed trailing row).
    Skipped(SkipReason, Option<Diagnostic>),
}

impl ParseOutcome {
    pub fn record(&self) -> Option<&CaseRecord> {
        match self {
            ParseOutcome::Parsed(record) | ParseOutcome::Ambiguous(record, _) => Some(record),
            ParseOutcome::Skipped(..) => None,
        }
    }

    /// Split into the produced record, if any, and the diagnostics raised.
    pub fn into_parts(self) -> (Option<CaseRecord>, Vec<Diagnostic>) {
        match self {
            ParseOutcome::Parsed(record) => (Some(record), Vec::new()),
            ParseOutcome::Ambiguous(record, diagnostics) => (Some(record), diagnostics),
            ParseOutcome::Skipped(_, diagnostic) => (None, diagnostic.into_iter().collect()),
        }
    }
}
