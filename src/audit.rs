use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::info;

use crate::constants::DEFAULT_LOW_CASELOAD_THRESHOLD;
use crate::types::{CaseRecord, Diagnostic, DiagnosticKind};

/// Per-supervisor case counts and the names whose count looks like a misspelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaseloadAudit {
    pub caseload: BTreeMap<String, usize>,
    pub flagged: BTreeSet<String>,
    pub threshold: usize,
}

impl CaseloadAudit {
    pub fn advisories(&self) -> Vec<Diagnostic> {
        self.flagged
            .iter()
            .map(|name| {
                let count = self.caseload.get(name).copied().unwrap_or_default();
                Diagnostic::warning(
                    DiagnosticKind::AuditAdvisory,
                    format!("probably a misspelled supervisor name: '{}' ({} uses)", name, count),
                )
            })
            .collect()
    }
}

/// Flags supervisors with fewer than `threshold` cases.
///
/// A real supervisor with a light caseload trips it too, so the result is only ever
/// reported.
#[derive(Debug, Clone, Copy)]
pub struct CaseloadAuditor {
    threshold: usize,
}

impl Default for CaseloadAuditor {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_CASELOAD_THRESHOLD)
    }
}

impl CaseloadAuditor {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn audit(&self, records: &[CaseRecord]) -> CaseloadAudit {
        let mut caseload: BTreeMap<String, usize> = BTreeMap::new();
        for record in records {
            *caseload.entry(record.supervisor.clone()).or_default() += 1;
        }

        for (supervisor, count) in &caseload {
            info!(supervisor = %supervisor, cases = *count, "supervisor caseload");
        }

        let flagged = caseload
            .iter()
            .filter(|(_, count)| **count < self.threshold)
            .map(|(name, _)| name.clone())
            .collect();

        CaseloadAudit {
            caseload,
            flagged,
            threshold: self.threshold,
        }
    }
}
