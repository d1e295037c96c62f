use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audit::CaseloadAuditor;
use crate::constants::{
    DATE_FORMAT, DEFAULT_INCLUDE_LAST_N_YEARS, DEFAULT_LOW_CASELOAD_THRESHOLD,
    DEFAULT_SUPERVISOR_TYPOS, MAX_INCLUDE_LAST_N_YEARS, MIN_INCLUDE_LAST_N_YEARS,
    RESOLVING_MARKER,
};
use crate::error::{ExtractError, Result};
use crate::normalize::{NameNormalizer, NormalizationTable};
use crate::parser::RowParser;
use crate::pipeline::ExtractionPipeline;
use crate::selector::{TableSelector, TemplateMarkers};
use crate::types::{Diagnostic, DiagnosticKind};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub include_last_n_years: i64,
    pub skip_heading_row: bool,
    pub low_caseload_threshold: usize,
    pub date_format: String,
    pub template_markers: TemplateMarkersConfig,
    pub resolving_marker: String,
    pub supervisor_typos: BTreeMap<String, String>,
    /// Pre-converted HTML used instead of running the converter, when it exists.
    pub debug_html: Option<PathBuf>,
    pub converter: Option<ConverterConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateMarkersConfig {
    pub case_type: String,
    pub subject: String,
}

/// External doc-to-markup converter; the input path is appended after `args`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConverterConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_last_n_years: DEFAULT_INCLUDE_LAST_N_YEARS,
            skip_heading_row: true,
            low_caseload_threshold: DEFAULT_LOW_CASELOAD_THRESHOLD,
            date_format: DATE_FORMAT.to_string(),
            template_markers: TemplateMarkersConfig::default(),
            resolving_marker: RESOLVING_MARKER.to_string(),
            supervisor_typos: DEFAULT_SUPERVISOR_TYPOS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            debug_html: None,
            converter: None,
        }
    }
}

impl Default for TemplateMarkersConfig {
    fn default() -> Self {
        let markers = TemplateMarkers::default();
        Self {
            case_type: markers.case_type,
            subject: markers.subject,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ExtractError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Reads `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Number of year-tables to parse. Values outside 1-10 fall back to 1 with a warning.
    pub fn years(&self) -> (usize, Option<Diagnostic>) {
        let n = self.include_last_n_years;
        if (MIN_INCLUDE_LAST_N_YEARS..=MAX_INCLUDE_LAST_N_YEARS).contains(&n) {
            return (n as usize, None);
        }
        let diagnostic = Diagnostic::warning(
            DiagnosticKind::Config,
            format!(
                "invalid include_last_n_years {}, should be an integer in [{}, {}]; \
                 defaulting to {}",
                n, MIN_INCLUDE_LAST_N_YEARS, MAX_INCLUDE_LAST_N_YEARS, MIN_INCLUDE_LAST_N_YEARS
            ),
        );
        (MIN_INCLUDE_LAST_N_YEARS as usize, Some(diagnostic))
    }

    pub fn normalizer(&self) -> NameNormalizer {
        let table = NormalizationTable::new(self.supervisor_typos.clone());
        NameNormalizer::new(Arc::new(table), self.resolving_marker.clone())
    }

    /// Wire up a pipeline from this configuration. The returned diagnostic, if any,
    /// belongs in the run's report.
    pub fn pipeline(&self) -> (ExtractionPipeline, Option<Diagnostic>) {
        let (years, diagnostic) = self.years();
        let markers = TemplateMarkers {
            case_type: self.template_markers.case_type.clone(),
            subject: self.template_markers.subject.clone(),
        };
        let pipeline = ExtractionPipeline::new(
            TableSelector::new(years, markers),
            RowParser::new(self.normalizer()).with_date_format(self.date_format.clone()),
            CaseloadAuditor::new(self.low_caseload_threshold),
        )
        .skip_heading_row(self.skip_heading_row);
        (pipeline, diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_the_case_list() {
        let config = Config::default();
        assert_eq!(config.years(), (3, None));
        assert_eq!(config.low_caseload_threshold, 5);
        assert_eq!(config.normalizer().normalize("Klenem Mišič"), "Klemen Mišič");
    }

    #[test]
    fn out_of_range_years_fall_back_to_one() {
        for n in [0, -3, 11, 15] {
            let config = Config {
                include_last_n_years: n,
                ..Config::default()
            };
            let (years, diagnostic) = config.years();
            assert_eq!(years, 1);
            assert_eq!(diagnostic.unwrap().kind, DiagnosticKind::Config);
        }
        let config = Config {
            include_last_n_years: 10,
            ..Config::default()
        };
        assert_eq!(config.years(), (10, None));
    }

    #[test]
    fn loads_partial_toml_over_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
include_last_n_years = 2
low_caseload_threshold = 3
debug_html = "zadeve.html"

[supervisor_typos]
"Ana Kso" = "Ana Kos"

[converter]
program = "tika"
args = ["--html"]
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.years(), (2, None));
        assert_eq!(config.low_caseload_threshold, 3);
        assert_eq!(config.date_format, DATE_FORMAT);
        assert_eq!(config.debug_html, Some(PathBuf::from("zadeve.html")));
        assert_eq!(config.converter.as_ref().unwrap().args, vec!["--html"]);
        // a configured table replaces the built-in one
        let normalizer = config.normalizer();
        assert_eq!(normalizer.normalize("Ana Kso"), "Ana Kos");
        assert_eq!(normalizer.normalize("Klenem Mišič"), "Klenem Mišič");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
        assert!(Config::load_or_default(dir.path().join("nope.toml")).is_ok());
    }

    #[test]
    fn example_config_matches_defaults() {
        let config: Config = toml::from_str(include_str!("../config.example.toml")).unwrap();
        let defaults = Config::default();
        assert_eq!(config.years(), defaults.years());
        assert_eq!(config.supervisor_typos, defaults.supervisor_typos);
        assert_eq!(config.template_markers.subject, defaults.template_markers.subject);
        assert!(config.converter.is_none());
    }

    #[test]
    fn malformed_toml_is_reported() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "include_last_n_years = \"three\"").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ExtractError::Toml(_))));
    }
}
