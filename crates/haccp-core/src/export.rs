//! Report export.
//!
//! PDF and Word renderers live outside this crate and plug in through
//! [`ReportExporter`]. [`JsonExporter`] is the built-in one.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ExportError, FormData, GeneratedResult};

/// What an exporter gets: the collected form and the generated report.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBundle<'a> {
    pub form: &'a FormData,
    pub result: &'a GeneratedResult,
}

pub trait ReportExporter {
    /// Write the artifact and return where it went.
    fn export(&self, bundle: &ReportBundle<'_>) -> Result<PathBuf, ExportError>;
}

/// File stem derived from the business name, e.g. `HACCP_Bistro_Pod_Lipami`.
pub fn report_file_stem(business_name: &str) -> String {
    let mut stem = String::from("HACCP_");
    let mut in_space = false;
    for ch in business_name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else if std::path::is_separator(ch) {
            stem.push('-');
            in_space = false;
        } else {
            stem.push(ch);
            in_space = false;
        }
    }
    stem
}

/// Writes the bundle as pretty-printed JSON into a directory.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    dir: PathBuf,
}

impl JsonExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportExporter for JsonExporter {
    /// Uses an atomic write (temp file + rename) so a reader never sees a
    /// half-written report.
    fn export(&self, bundle: &ReportBundle<'_>) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let stem = report_file_stem(&bundle.form.details.name);
        let path = self.dir.join(format!("{stem}.json"));
        let tmp = self.dir.join(format!(".{stem}.json.tmp"));

        let json = serde_json::to_string_pretty(bundle)?;
        fs::write(&tmp, json).map_err(|source| ExportError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "report exported");
        Ok(path)
    }
}
