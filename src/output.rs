use std::io::Write;

use clap::ValueEnum;

use crate::error::Result;
use crate::pipeline::ExtractionReport;
use crate::types::CaseRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One tab-separated line per case
    Tsv,
    /// Records, diagnostics and caseload as one JSON document
    Json,
}

pub fn write_report<W: Write>(
    report: &ExtractionReport,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Tsv => {
            for record in &report.records {
                writeln!(out, "{}", tsv_line(record))?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// date, subject, description, reporter, supervisor, warnings flag
pub fn tsv_line(record: &CaseRecord) -> String {
    [
        record.assigned_date.format("%Y-%m-%d").to_string(),
        tsv_field(&record.subject),
        tsv_field(&record.description),
        tsv_field(&record.reporter),
        tsv_field(&record.supervisor),
        if record.has_warnings { "1" } else { "0" }.to_string(),
    ]
    .join("\t")
}

fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

/// Caseload table, busiest supervisors first, flagged names marked.
pub fn write_caseload<W: Write>(report: &ExtractionReport, out: &mut W) -> Result<()> {
    let mut rows: Vec<_> = report.caseload.caseload.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (name, count) in rows {
        let flag = if report.caseload.flagged.contains(name) { "\t?" } else { "" };
        writeln!(out, "{}\t{}{}", count, name, flag)?;
    }
    out.flush()?;
    Ok(())
}
