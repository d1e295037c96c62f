//! Extraction of inspection case records from the yearly case-list tables of a legacy,
//! hand-maintained document.
//!
//! The flow is markup -> [`markup::extract_tables`] -> [`pipeline::ExtractionPipeline`]
//! (table selection, row parsing, name normalization, caseload audit) -> [`output`].

pub mod audit;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod markup;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod selector;
pub mod source;
pub mod types;

pub use error::{ExtractError, Result};
pub use pipeline::{ExtractionPipeline, ExtractionReport};
pub use types::{CaseRecord, Diagnostic, ParseOutcome, Row, Table};

/// Run the configured pipeline over an HTML rendering of the case list.
pub fn extract_from_html(html: &str, config: &config::Config) -> Result<ExtractionReport> {
    let (pipeline, config_diagnostic) = config.pipeline();
    let mut report = pipeline.run(markup::extract_tables(html))?;
    if let Some(diagnostic) = config_diagnostic {
        report.diagnostics.insert(0, diagnostic);
    }
    Ok(report)
}
