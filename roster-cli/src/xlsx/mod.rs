//! Raw workbook extraction.
//!
//! Reads the workbook container directly (zip archive + XML parts)
//! instead of going through a spreadsheet library: the roster sources
//! only need the first worksheet's cell grid with shared-string
//! references resolved. Extraction is best-effort; a cell that cannot
//! be resolved becomes an empty string rather than failing the run.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

/// One worksheet row: 1-based row number plus the cell texts of the
/// row's used range, gaps filled with empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub number: u32,
    pub cells: Vec<String>,
}

/// Read every non-empty row of the workbook's first sheet.
pub fn read_rows(path: &Path) -> Result<Vec<SheetRow>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open workbook: {}", path.display()))?;
    read_rows_from(file).with_context(|| format!("Failed to extract workbook: {}", path.display()))
}

fn read_rows_from<R: Read + Seek>(reader: R) -> Result<Vec<SheetRow>> {
    let mut archive = ZipArchive::new(reader).context("Not a valid workbook archive")?;

    let workbook_xml = read_part(&mut archive, "xl/workbook.xml")?;
    let sheets = workbook_sheets(&workbook_xml)?;
    let Some((_, rid)) = sheets.first() else {
        return Ok(Vec::new());
    };

    let rels_xml = read_part(&mut archive, "xl/_rels/workbook.xml.rels")?;
    let targets = relationship_targets(&rels_xml)?;
    let target = targets
        .get(rid)
        .with_context(|| format!("Workbook relationship {rid} has no target"))?;
    let sheet_part = if target.starts_with("xl/") {
        target.clone()
    } else {
        format!("xl/{target}")
    };

    // The shared-string table is optional; a workbook without one just
    // has no shared cells.
    let shared = match read_part(&mut archive, "xl/sharedStrings.xml") {
        Ok(xml) => shared_strings(&xml)?,
        Err(_) => Vec::new(),
    };

    let sheet_xml = read_part(&mut archive, &sheet_part)?;
    worksheet_rows(&sheet_xml, &shared)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut part = archive
        .by_name(name)
        .with_context(|| format!("Workbook archive is missing part {name}"))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .with_context(|| format!("Failed to read workbook part {name}"))?;
    Ok(xml)
}

/// Sheets declared in the workbook part, as (name, relationship id).
fn workbook_sheets(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let mut name = String::new();
                let mut rid = String::new();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => name = attr.unescape_value()?.into_owned(),
                        b"r:id" => rid = attr.unescape_value()?.into_owned(),
                        _ => {}
                    }
                }
                sheets.push((name, rid));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(sheets)
}

/// Relationship id to target part, from the workbook rels part.
fn relationship_targets(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = String::new();
                let mut target = String::new();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = attr.unescape_value()?.into_owned(),
                        b"Target" => target = attr.unescape_value()?.into_owned(),
                        _ => {}
                    }
                }
                targets.insert(id, target);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(targets)
}

/// Ordered shared-string table: every `<t>` fragment under one `<si>`
/// concatenated into a single entry.
fn shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Event::Text(t) if in_t => current.push_str(&t.xml_content()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = false;
                    strings.push(std::mem::take(&mut current));
                }
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(strings)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Shared,
    Inline,
    Plain,
}

/// Parse the worksheet cell grid into ordered rows.
fn worksheet_rows(xml: &str, shared: &[String]) -> Result<Vec<SheetRow>> {
    let mut grid: BTreeMap<u32, BTreeMap<u32, String>> = BTreeMap::new();
    let mut reader = Reader::from_str(xml);
    let mut cell: Option<(u32, u32, CellKind)> = None;
    let mut pending = String::new();
    let mut in_value = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                cell = parse_cell_start(&e)?;
                pending.clear();
            }
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                if let Some((row, col, _)) = parse_cell_start(&e)? {
                    grid.entry(row).or_default().insert(col, String::new());
                }
            }
            // cell payloads: <v> for plain/shared cells, <is><t> inline
            Event::Start(e)
                if cell.is_some()
                    && matches!(e.local_name().as_ref(), b"v" | b"t") =>
            {
                in_value = true;
            }
            Event::Text(t) if in_value => pending.push_str(&t.xml_content()?),
            Event::End(e) if matches!(e.local_name().as_ref(), b"v" | b"t") => {
                in_value = false;
            }
            Event::End(e) if e.local_name().as_ref() == b"c" => {
                if let Some((row, col, kind)) = cell.take() {
                    let value = resolve_cell(kind, &pending, shared);
                    grid.entry(row).or_default().insert(col, value);
                }
                pending.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let rows = grid
        .into_iter()
        .map(|(number, cols)| {
            let max = cols.keys().copied().max().unwrap_or(0);
            let cells = (1..=max)
                .map(|i| cols.get(&i).cloned().unwrap_or_default())
                .collect();
            SheetRow { number, cells }
        })
        .collect();
    Ok(rows)
}

fn parse_cell_start(e: &quick_xml::events::BytesStart<'_>) -> Result<Option<(u32, u32, CellKind)>> {
    let mut reference = String::new();
    let mut kind = CellKind::Plain;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => reference = attr.unescape_value()?.into_owned(),
            b"t" => {
                kind = match attr.unescape_value()?.as_ref() {
                    "s" => CellKind::Shared,
                    "inlineStr" => CellKind::Inline,
                    _ => CellKind::Plain,
                }
            }
            _ => {}
        }
    }
    Ok(parse_cell_ref(&reference).map(|(row, col)| (row, col, kind)))
}

/// Resolve the collected text for one cell. Shared-string references
/// that do not resolve fall back to an empty string.
fn resolve_cell(kind: CellKind, pending: &str, shared: &[String]) -> String {
    match kind {
        CellKind::Shared => match pending.trim().parse::<usize>() {
            Ok(index) => match shared.get(index) {
                Some(text) => text.clone(),
                None => {
                    debug!("Shared string index {index} out of range, substituting empty text");
                    String::new()
                }
            },
            Err(_) => {
                debug!("Unreadable shared string reference {pending:?}, substituting empty text");
                String::new()
            }
        },
        CellKind::Inline | CellKind::Plain => pending.to_string(),
    }
}

/// Split a cell reference like "B3" into (row, column), both 1-based.
fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let row: u32 = digits.parse().ok()?;
    Some((row, column_index(letters)))
}

/// Convert column letters to a 1-based index: base 26 with 'A' = 1.
fn column_index(letters: &str) -> u32 {
    letters
        .bytes()
        .fold(0, |acc, b| acc * 26 + u32::from(b - b'A' + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A"), 1);
        assert_eq!(column_index("Z"), 26);
        assert_eq!(column_index("AA"), 27);
        assert_eq!(column_index("AB"), 28);
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("B3"), Some((3, 2)));
        assert_eq!(parse_cell_ref("AA10"), Some((10, 27)));
        assert_eq!(parse_cell_ref(""), None);
        assert_eq!(parse_cell_ref("12"), None);
    }

    #[test]
    fn test_shared_strings_concatenates_fragments() {
        let xml = r#"<sst>
            <si><t>Fonction</t></si>
            <si><r><t>Jean </t></r><r><t>DUPONT</t></r></si>
            <si><t/></si>
        </sst>"#;
        let strings = shared_strings(xml).unwrap();
        assert_eq!(strings, vec!["Fonction", "Jean DUPONT", ""]);
    }

    #[test]
    fn test_worksheet_rows_fills_gaps_and_resolves_shared() {
        let shared = vec!["Fonction".to_string(), "Nom".to_string()];
        let xml = r#"<worksheet><sheetData>
            <row r="1">
                <c r="A1" t="s"><v>0</v></c>
                <c r="C1"><v>42</v></c>
            </row>
            <row r="3">
                <c r="B3" t="inlineStr"><is><t>bureau B 101</t></is></c>
            </row>
        </sheetData></worksheet>"#;
        let rows = worksheet_rows(xml, &shared).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number, 1);
        assert_eq!(rows[0].cells, vec!["Fonction", "", "42"]);
        assert_eq!(rows[1].number, 3);
        assert_eq!(rows[1].cells, vec!["", "bureau B 101"]);
    }

    #[test]
    fn test_worksheet_rows_bad_shared_reference_becomes_empty() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>99</v></c><c r="B1"><v>kept</v></c></row>
        </sheetData></worksheet>"#;
        let rows = worksheet_rows(xml, &[]).unwrap();
        assert_eq!(rows[0].cells, vec!["", "kept"]);
    }

    fn fixture_archive() -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let parts: [(&str, &str); 4] = [
            (
                "xl/workbook.xml",
                r#"<workbook><sheets><sheet name="Feuil1" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships><Relationship Id="rId1" Target="worksheets/sheet1.xml"/></Relationships>"#,
            ),
            (
                "xl/sharedStrings.xml",
                r#"<sst><si><t>Fonction</t></si><si><t>Directeur</t></si></sst>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData>
                    <row r="1"><c r="A1" t="s"><v>0</v></c></row>
                    <row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2" t="inlineStr"><is><t>Jean DUPONT</t></is></c></row>
                </sheetData></worksheet>"#,
            ),
        ];
        for (name, content) in parts {
            writer.start_file(name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap()
    }

    #[test]
    fn test_read_rows_from_archive() {
        let rows = read_rows_from(fixture_archive()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells, vec!["Fonction"]);
        assert_eq!(rows[1].cells, vec!["Directeur", "Jean DUPONT"]);
    }
}
