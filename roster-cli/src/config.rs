//! Fixed run configuration: input locations and seed constants.
//!
//! These are compile-time constants on purpose: the seed build is a
//! one-shot generator wired to the repository layout, not a
//! user-configurable tool.

use chrono::NaiveDate;

/// Workbook with the per-section responsibility tables. Optional: the
/// run proceeds without it.
pub const XLSX_PATH: &str = "files/donnee_responsable/Responsables Licence 2025-26.xlsx";

/// Flat export of formation-responsible assignments. Required.
pub const CSV_PATH: &str = "files/donnee_responsable/formations_responsables.csv";

/// Generated seed document, overwritten on every run.
pub const OUT_SQL: &str = "script/db/init/004_seed_responsables.sql";

/// Academic year the seed targets (2025-2026).
pub const YEAR_ID: i64 = 3;

/// Start date stamped on every generated assignment.
pub fn date_debut() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).expect("static seed start date")
}
