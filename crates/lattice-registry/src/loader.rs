use std::path::{Path, PathBuf};

use lattice_core::mod_manifest::ModDescriptor;
use ron::extensions::Extensions;

use crate::mods::{ModHandler, ModLoadReport};
use crate::LoadError;

/// Parse a mod descriptor from a RON string.
///
/// Optional fields may be written bare (`name: "base"`) instead of wrapped in
/// `Some(...)`.
pub fn parse_mod_descriptor(ron_str: &str) -> Result<ModDescriptor, LoadError> {
    let options = ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME);
    options
        .from_str(ron_str)
        .map_err(|e| LoadError::ParseError(e.to_string()))
}

/// Read and parse a mod descriptor file.
pub fn read_mod_descriptor(path: &Path) -> Result<ModDescriptor, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mod_descriptor(&contents)
}

/// Per-file outcome of [`load_mods`].
#[derive(Debug, Default)]
pub struct ModSetReport {
    pub files: Vec<(PathBuf, Result<ModLoadReport, LoadError>)>,
}

impl ModSetReport {
    /// Number of mods that were registered.
    pub fn loaded_count(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, r)| matches!(r, Ok(report) if report.mod_index.is_some()))
            .count()
    }

    /// Total warnings across all files that parsed.
    pub fn warning_count(&self) -> usize {
        self.files
            .iter()
            .filter_map(|(_, r)| r.as_ref().ok())
            .map(|report| report.warnings.len())
            .sum()
    }
}

/// Build a mod registry sized for `paths` and register each descriptor in
/// order. A file that fails to read or parse is reported and skipped; the
/// remaining files still load.
pub fn load_mods<P: AsRef<Path>>(paths: &[P]) -> (ModHandler, ModSetReport) {
    let mut handler = ModHandler::new(paths.len());
    let mut report = ModSetReport::default();

    for path in paths {
        let path = path.as_ref();
        let result = handler.add_mod_from_path(path);
        if let Err(e) = &result {
            log::warn!("Skipping mod {}: {}", path.display(), e);
        }
        report.files.push((path.to_path_buf(), result));
    }

    log::info!(
        "Loaded {} of {} mods ({} warnings)",
        report.loaded_count(),
        paths.len(),
        report.warning_count()
    );
    (handler, report)
}
