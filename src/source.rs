use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::{info, instrument};

use crate::config::{Config, ConverterConfig};
use crate::error::{ExtractError, Result};

/// HTML rendering of the case list document at `path`.
///
/// HTML input is read as is. Anything else goes through the configured external
/// converter, unless a pre-converted `debug_html` file is available.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_markup(path: &Path, config: &Config) -> Result<String> {
    if is_html(path) {
        return Ok(fs::read_to_string(path)?);
    }

    if let Some(debug_html) = config.debug_html.as_deref().filter(|p| p.exists()) {
        info!("loading case list from debug file {}", debug_html.display());
        return Ok(fs::read_to_string(debug_html)?);
    }

    if !path.exists() {
        return Err(ExtractError::Config(format!(
            "case list file '{}' could not be found",
            path.display()
        )));
    }

    let converter = config.converter.as_ref().ok_or_else(|| {
        ExtractError::Converter(format!(
            "'{}' is not HTML and no [converter] is configured",
            path.display()
        ))
    })?;
    convert(converter, path)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

fn convert(converter: &ConverterConfig, path: &Path) -> Result<String> {
    info!(program = %converter.program, "converting case list to HTML");
    let output = Command::new(&converter.program)
        .args(&converter.args)
        .arg(path)
        .output()
        .map_err(|e| {
            ExtractError::Converter(format!("failed to run '{}': {}", converter.program, e))
        })?;

    if !output.status.success() {
        return Err(ExtractError::Converter(format!(
            "'{}' exited with {}: {}",
            converter.program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    info!(bytes = output.stdout.len(), "conversion done");
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
