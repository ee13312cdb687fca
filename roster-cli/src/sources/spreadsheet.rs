//! Section-table reader for the responsibilities workbook.
//!
//! The sheet is a sequence of sections: a decorated single-cell title
//! row, a "Fonction / Nom / Bureau / Contact / Telephone" header row,
//! then positional data rows until the next title row.

use log::debug;

use crate::text::{clean_whitespace, strip_decorations};
use crate::xlsx::SheetRow;

const DEFAULT_SECTION: &str = "GENERAL";

/// One staffing line extracted from the workbook, tagged with the
/// section it appeared under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetEntry {
    pub section: String,
    pub fonction: String,
    pub nom: String,
    pub bureau: String,
    pub email: String,
    pub telephone: String,
}

/// Walk the sheet rows and collect the data rows of every section table.
/// Rows seen before the first column-header row are ignored.
pub fn read_entries(rows: &[SheetRow]) -> Vec<SheetEntry> {
    let mut entries = Vec::new();
    let mut current_section: Option<String> = None;
    let mut in_table = false;

    for sheet_row in rows {
        let mut row: Vec<String> = sheet_row
            .cells
            .iter()
            .map(|cell| clean_whitespace(cell))
            .collect();
        while row.last().is_some_and(|cell| cell.is_empty()) {
            row.pop();
        }
        if row.is_empty() {
            continue;
        }
        if row.len() == 1 && !row[0].eq_ignore_ascii_case("fonction") {
            let title = strip_decorations(&row[0]);
            debug!("Section {title:?} starts at row {}", sheet_row.number);
            current_section = Some(if title.is_empty() {
                DEFAULT_SECTION.to_string()
            } else {
                title
            });
            in_table = false;
            continue;
        }
        if row[0].eq_ignore_ascii_case("fonction") {
            in_table = true;
            continue;
        }
        if !in_table {
            continue;
        }
        let cell = |index: usize| row.get(index).cloned().unwrap_or_default();
        entries.push(SheetEntry {
            section: current_section
                .clone()
                .unwrap_or_else(|| DEFAULT_SECTION.to_string()),
            fonction: cell(0),
            nom: cell(1),
            bureau: cell(2),
            email: cell(3),
            telephone: cell(4),
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(number: u32, cells: &[&str]) -> SheetRow {
        SheetRow {
            number,
            cells: cells.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_sections_and_tables() {
        let rows = vec![
            row(1, &["Responsables Licence 2025-26"]),
            row(2, &["\u{1F4CC} MATHÉMATIQUES"]),
            row(3, &["Fonction", "Nom", "Bureau", "Contact", "Telephone"]),
            row(4, &["Directeur", "Jean DUPONT", "B 101", "jd@example.org", "01 02 03 04 05"]),
            row(5, &["Responsable L1", "Alice MARTIN", "", "am@example.org", ""]),
            row(6, &["GENERAL"]),
            row(7, &["Fonction", "Nom", "Bureau", "Contact", "Telephone"]),
            row(8, &["Directeur", "Paul DURAND"]),
        ];
        let entries = read_entries(&rows);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].section, "MATHÉMATIQUES");
        assert_eq!(entries[0].fonction, "Directeur");
        assert_eq!(entries[0].nom, "Jean DUPONT");
        assert_eq!(entries[0].email, "jd@example.org");
        assert_eq!(entries[1].fonction, "Responsable L1");
        assert_eq!(entries[2].section, "GENERAL");
        assert_eq!(entries[2].nom, "Paul DURAND");
        assert_eq!(entries[2].bureau, "");
    }

    #[test]
    fn test_rows_before_first_header_are_ignored() {
        let rows = vec![
            row(1, &["Some", "stray", "row"]),
            row(2, &["INFORMATIQUE"]),
            row(3, &["Another", "stray", "row"]),
        ];
        assert!(read_entries(&rows).is_empty());
    }

    #[test]
    fn test_trailing_empty_cells_do_not_break_section_detection() {
        let rows = vec![
            row(1, &["CHIMIE", "", "", ""]),
            row(2, &["Fonction", "Nom", "", "", ""]),
            row(3, &["Responsable M1", "Luc BERNARD", "", "", ""]),
        ];
        let entries = read_entries(&rows);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].section, "CHIMIE");
        assert_eq!(entries[0].fonction, "Responsable M1");
    }

    #[test]
    fn test_empty_title_falls_back_to_general() {
        let rows = vec![
            row(1, &["\u{1F4CC}"]),
            row(2, &["Fonction", "Nom"]),
            row(3, &["Directeur", "Nina PETIT"]),
        ];
        let entries = read_entries(&rows);
        assert_eq!(entries[0].section, "GENERAL");
    }
}
