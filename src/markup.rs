//! Turns the converter's HTML rendering of the case list into plain [`Table`] values.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::types::{Row, Table};

static TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("valid table selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid row selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid cell selector"));

/// Every `<table>` in document order, each `<tr>` as a row of `<td>` texts.
pub fn extract_tables(html: &str) -> Vec<Table> {
    let document = Html::parse_document(html);
    let tables: Vec<Table> = document.select(&TABLE).map(table_from_element).collect();
    info!("found {} tables in the case list markup", tables.len());
    tables
}

fn table_from_element(table: ElementRef<'_>) -> Table {
    let rows: Vec<Row> = table
        .select(&ROW)
        .map(|tr| {
            let cells = tr.select(&CELL).map(|td| cell_text(&td));
            Row::new(cells).with_source(tr.inner_html().trim())
        })
        .collect();
    debug!(rows = rows.len(), "table extracted");
    Table::new(rows)
}

/// Text content with whitespace runs collapsed to single spaces.
fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
