//! Flat CSV reader for formation-responsible assignments.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One row of the formations CSV, as exported by the registrar. All
/// fields default to empty so ragged exports still read.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CsvRecord {
    #[serde(default)]
    pub formation_nom: String,
    #[serde(default)]
    pub composante: String,
    #[serde(default)]
    pub departement: String,
    #[serde(default)]
    pub mention: String,
    #[serde(default)]
    pub parcours: String,
    #[serde(default)]
    pub role_exact: String,
    #[serde(default)]
    pub responsable_nom: String,
    #[serde(default)]
    pub responsable_prenom: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub bureau: String,
}

/// Read every record of the formations CSV. The file is a hard
/// requirement of the pipeline; a missing or unreadable file aborts
/// the run.
pub fn read_records(path: &Path) -> Result<Vec<CsvRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open formations CSV: {}", path.display()))?;
    parse_records(file).with_context(|| format!("Malformed formations CSV: {}", path.display()))
}

fn parse_records<R: Read>(reader: R) -> csv::Result<Vec<CsvRecord>> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader)
        .deserialize()
        .collect()
}
