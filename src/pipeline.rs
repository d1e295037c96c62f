use metrics::counter;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::audit::{CaseloadAudit, CaseloadAuditor};
use crate::error::Result;
use crate::parser::RowParser;
use crate::selector::TableSelector;
use crate::types::{CaseRecord, Diagnostic, ParseOutcome, Table};

/// Where a run currently is. Only [`Stage::Start`] can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    TablesSelected,
    RowsParsed,
    Audited,
    Done,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub tables_found: usize,
    pub tables_parsed: usize,
    pub rows_seen: usize,
    pub records: usize,
    pub records_with_warnings: usize,
    pub rows_skipped: usize,
}

/// Everything a run produces: records in document order plus all non-fatal findings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    pub records: Vec<CaseRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub caseload: CaseloadAudit,
    pub stats: PipelineStats,
}

impl ExtractionReport {
    pub fn log_diagnostics(&self) {
        for diagnostic in &self.diagnostics {
            diagnostic.log();
        }
    }
}

/// TableSelector -> RowParser (per row) -> CaseloadAuditor.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    selector: TableSelector,
    parser: RowParser,
    auditor: CaseloadAuditor,
    skip_heading_row: bool,
}

impl ExtractionPipeline {
    pub fn new(selector: TableSelector, parser: RowParser, auditor: CaseloadAuditor) -> Self {
        Self {
            selector,
            parser,
            auditor,
            skip_heading_row: true,
        }
    }

    /// Each year-table starts with a heading row; turn this off for headless input.
    pub fn skip_heading_row(mut self, skip: bool) -> Self {
        self.skip_heading_row = skip;
        self
    }

    #[instrument(skip_all, fields(tables = tables.len()))]
    pub fn run(&self, tables: Vec<Table>) -> Result<ExtractionReport> {
        let mut stage = Stage::Start;
        let mut stats = PipelineStats {
            tables_found: tables.len(),
            ..Default::default()
        };

        let selection = self.selector.select(tables)?;
        advance(&mut stage, Stage::TablesSelected);
        stats.tables_parsed = selection.tables.len();
        let mut diagnostics = selection.diagnostics;

        let mut records = Vec::new();
        for table in &selection.tables {
            let body = if self.skip_heading_row {
                table.rows.get(1..).unwrap_or_default()
            } else {
                &table.rows[..]
            };

            for (i, row) in body.iter().enumerate() {
                stats.rows_seen += 1;
                let is_last_row = i + 1 == body.len();
                let outcome = self.parser.parse(row, is_last_row);
                if let ParseOutcome::Ambiguous(..) = outcome {
                    stats.records_with_warnings += 1;
                }
                let (record, found) = outcome.into_parts();
                match record {
                    Some(record) => records.push(record),
                    None => stats.rows_skipped += 1,
                }
                diagnostics.extend(found);
            }
        }
        stats.records = records.len();
        advance(&mut stage, Stage::RowsParsed);
        info!(
            "parsed {} records ({} skipped, {} with warnings)",
            stats.records, stats.rows_skipped, stats.records_with_warnings
        );

        let caseload = self.auditor.audit(&records);
        diagnostics.extend(caseload.advisories());
        advance(&mut stage, Stage::Audited);

        counter!("inspection_cases_records_total").increment(stats.records as u64);
        counter!("inspection_cases_rows_skipped_total").increment(stats.rows_skipped as u64);
        counter!("inspection_cases_diagnostics_total").increment(diagnostics.len() as u64);
        advance(&mut stage, Stage::Done);

        Ok(ExtractionReport {
            records,
            diagnostics,
            caseload,
            stats,
        })
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = ?*stage, to = ?next, "pipeline stage");
    *stage = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::selector::TemplateMarkers;
    use crate::types::{DiagnosticKind, Row};

    fn pipeline(years: usize) -> ExtractionPipeline {
        ExtractionPipeline::new(
            TableSelector::new(years, TemplateMarkers::default()),
            RowParser::default(),
            CaseloadAuditor::new(2),
        )
    }

    fn heading() -> Row {
        Row::new(["#", "prijavitelj", "zavezanec - opis", "nadzornik - št.", "datum dodelitve"])
    }

    fn case(n: &str, supervisor: &str, date: &str) -> Row {
        Row::new([n, "Janez Novak", "Podjetje X - opis", supervisor, date])
    }

    fn template() -> Table {
        Table::new(vec![Row::new(["Vrsta zadeve:", ""]), Row::new(["Subjekt zadeve:", ""])])
    }

    #[test]
    fn runs_all_stages_and_keeps_document_order() {
        let tables = vec![
            Table::new(vec![heading(), case("1", "Ana Kos - 1", "02.01.16")]),
            Table::new(vec![
                heading(),
                case("1", "Ana Kos - 1", "03.01.17"),
                case("2", "Tana Slak - 1", "04.01.17"),
            ]),
            Table::new(vec![
                heading(),
                case("1", "Tanja Slak - 2", "05.01.18"),
                Row::new(["", "", "", "", ""]),
            ]),
            template(),
        ];

        let report = pipeline(2).run(tables).unwrap();
        let dates: Vec<String> = report
            .records
            .iter()
            .map(|r| r.assigned_date.format("%d.%m.%y").to_string())
            .collect();
        assert_eq!(dates, vec!["03.01.17", "04.01.17", "05.01.18"]);
        assert_eq!(report.stats.tables_found, 4);
        assert_eq!(report.stats.tables_parsed, 2);
        assert_eq!(report.stats.rows_skipped, 1);
        // trailing blank row is skipped silently, heading rows never reach the parser
        assert!(report.diagnostics.iter().all(|d| d.kind == DiagnosticKind::AuditAdvisory));
        assert_eq!(report.caseload.caseload["Tanja Slak"], 2);
        assert_eq!(report.caseload.flagged.iter().collect::<Vec<_>>(), vec!["Ana Kos"]);
    }

    #[test]
    fn structural_error_aborts_the_run() {
        assert!(matches!(pipeline(3).run(Vec::new()), Err(ExtractError::NoTables)));
    }

    #[test]
    fn bad_rows_degrade_to_warnings() {
        let tables = vec![Table::new(vec![
            heading(),
            Row::new(["1", "Janez Novak"]),
            case("2", "Ana Kos - 1", "kdaj"),
            case("3", "Ana Kos", "01.02.18"),
            case("4", "Ana Kos - 1", "02.02.18"),
        ])];

        let report = pipeline(3).run(tables).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.stats.rows_skipped, 2);
        assert_eq!(report.stats.records_with_warnings, 1);
        assert!(report.records[0].has_warnings);
        assert!(!report.records[1].has_warnings);

        let kinds: Vec<_> = report.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::Structure,
                DiagnosticKind::Structure,
                DiagnosticKind::RowSkipped,
                DiagnosticKind::RowSkipped,
                DiagnosticKind::AmbiguousSplit,
            ]
        );
    }

    #[test]
    fn headless_tables_parse_every_row() {
        let tables = vec![Table::new(vec![case("1", "Ana Kos - 1", "02.01.16")]), template()];
        let report = pipeline(3).skip_heading_row(false).run(tables).unwrap();
        assert_eq!(report.records.len(), 1);
    }
}
