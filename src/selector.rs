use tracing::debug;

use crate::constants::{TEMPLATE_CASE_TYPE_MARKER, TEMPLATE_SUBJECT_MARKER};
use crate::error::{ExtractError, Result};
use crate::types::{Diagnostic, DiagnosticKind, Table};

/// The two phrases that identify the trailing "open a new case" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMarkers {
    pub case_type: String,
    pub subject: String,
}

impl Default for TemplateMarkers {
    fn default() -> Self {
        Self {
            case_type: TEMPLATE_CASE_TYPE_MARKER.to_string(),
            subject: TEMPLATE_SUBJECT_MARKER.to_string(),
        }
    }
}

impl TemplateMarkers {
    pub fn matches(&self, table: &Table) -> bool {
        let text = table.text();
        text.contains(&self.case_type) && text.contains(&self.subject)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Oldest to newest, as in the document.
    pub tables: Vec<Table>,
    pub template_removed: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Drops the trailing template table and keeps the most recent year-tables.
#[derive(Debug, Clone)]
pub struct TableSelector {
    include_last_n_years: usize,
    markers: TemplateMarkers,
}

impl TableSelector {
    pub fn new(include_last_n_years: usize, markers: TemplateMarkers) -> Self {
        Self {
            include_last_n_years,
            markers,
        }
    }

    pub fn select(&self, mut tables: Vec<Table>) -> Result<Selection> {
        if tables.is_empty() {
            return Err(ExtractError::NoTables);
        }

        let mut diagnostics = Vec::new();
        if tables.len() < 2 {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::Structure,
                format!("there seem to be too few tables ({}) in the case list", tables.len()),
            ));
        }

        // When in doubt keep the data: a last table without both markers stays in.
        let template_removed = match tables.last() {
            Some(last) if self.markers.matches(last) => {
                tables.pop();
                true
            }
            _ => {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::Structure,
                    "the last table doesn't look like a new case template, keeping it",
                ));
                false
            }
        };

        let keep = self.include_last_n_years.min(tables.len());
        let tables = tables.split_off(tables.len() - keep);
        debug!(
            selected = tables.len(),
            requested = self.include_last_n_years,
            template_removed,
            "tables selected"
        );

        Ok(Selection {
            tables,
            template_removed,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Row;

    fn year(label: &str) -> Table {
        Table::new(vec![Row::new(["#", "prijavitelj", "zavezanec - opis", "nadzornik", label])])
    }

    fn template() -> Table {
        Table::new(vec![
            Row::new(["Vrsta zadeve", "prijava"]),
            Row::new(["Subjekt zadeve:", ""]),
        ])
    }

    fn labels(selection: &Selection) -> Vec<String> {
        selection.tables.iter().map(|t| t.rows[0].cells[4].clone()).collect()
    }

    #[test]
    fn no_tables_is_a_structural_error() {
        let selector = TableSelector::new(3, TemplateMarkers::default());
        assert!(matches!(selector.select(Vec::new()), Err(ExtractError::NoTables)));
    }

    #[test]
    fn template_is_dropped_and_last_years_kept_in_order() {
        let selector = TableSelector::new(2, TemplateMarkers::default());
        let selection = selector
            .select(vec![year("2016"), year("2017"), year("2018"), template()])
            .unwrap();
        assert!(selection.template_removed);
        assert_eq!(labels(&selection), vec!["2017", "2018"]);
        assert!(selection.diagnostics.is_empty());
    }

    #[test]
    fn last_table_without_markers_is_kept_with_warning() {
        let selector = TableSelector::new(3, TemplateMarkers::default());
        let selection = selector.select(vec![year("2017"), year("2018")]).unwrap();
        assert!(!selection.template_removed);
        assert_eq!(labels(&selection), vec!["2017", "2018"]);
        assert_eq!(selection.diagnostics.len(), 1);
        assert_eq!(selection.diagnostics[0].kind, DiagnosticKind::Structure);
    }

    #[test]
    fn one_marker_is_not_enough() {
        let selector = TableSelector::new(3, TemplateMarkers::default());
        let half = Table::new(vec![Row::new(["Vrsta zadeve", "prijava"])]);
        let selection = selector.select(vec![year("2018"), half]).unwrap();
        assert!(!selection.template_removed);
        assert_eq!(selection.tables.len(), 2);
    }

    #[test]
    fn request_larger_than_available_uses_everything() {
        let selector = TableSelector::new(15, TemplateMarkers::default());
        let selection = selector
            .select(vec![year("2015"), year("2016"), year("2017"), year("2018")])
            .unwrap();
        assert_eq!(labels(&selection), vec!["2015", "2016", "2017", "2018"]);
    }

    #[test]
    fn only_template_leaves_nothing_to_parse() {
        let selector = TableSelector::new(3, TemplateMarkers::default());
        let selection = selector.select(vec![template()]).unwrap();
        assert!(selection.template_removed);
        assert!(selection.tables.is_empty());
    }

    #[test]
    fn never_returns_more_than_requested_or_available() {
        for total in 1..6 {
            for n in 0..12 {
                let mut tables: Vec<Table> = (0..total).map(|i| year(&i.to_string())).collect();
                let with_template = total % 2 == 0;
                if with_template {
                    tables.push(template());
                }
                let selection = TableSelector::new(n, TemplateMarkers::default())
                    .select(tables)
                    .unwrap();
                assert!(selection.tables.len() <= n.min(total));
            }
        }
    }
}
