//! Tabular download of a disconnection report.

use base64::Engine as _;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use thiserror::Error;

use crate::explorer::Report;

pub const CSV_MEDIA_TYPE: &str = "text/csv";
pub const XLSX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const SVG_MEDIA_TYPE: &str = "image/svg+xml";

pub const CSV_HEADER: [&str; 6] = [
    "index",
    "smiles",
    "bond_indices",
    "broken_bonds",
    "feature_name",
    "feature",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

/// One precursor as a table row. `index` is the 1-based discovery
/// position, the same number shown in the `Fragment` legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub index: usize,
    pub smiles: String,
    pub bond_indices: Vec<usize>,
    pub broken_bonds: Vec<String>,
    pub feature_name: String,
    pub feature: f64,
}

/// RFC 4180 CSV with CRLF line endings. List cells are joined with `;`.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut out = String::new();
    push_record(&mut out, CSV_HEADER.iter().map(|s| s.to_string()));
    for row in rows {
        let bonds = row
            .bond_indices
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(";");
        push_record(
            &mut out,
            [
                row.index.to_string(),
                row.smiles.clone(),
                bonds,
                row.broken_bonds.join(";"),
                row.feature_name.clone(),
                row.feature.to_string(),
            ]
            .into_iter(),
        );
    }
    out
}

fn push_record(out: &mut String, fields: impl Iterator<Item = String>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&csv_field(&field));
    }
    out.push_str("\r\n");
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Single-sheet workbook with the same columns as [`to_csv`]. Index and
/// feature are written as numbers.
pub fn to_xlsx(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Precursors")?;
    for (col, title) in (0u16..).zip(CSV_HEADER) {
        sheet.write_string_with_format(0, col, title, &bold)?;
    }
    for (row, r) in (1u32..).zip(rows) {
        let bonds = r
            .bond_indices
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(";");
        sheet.write_number(row, 0, r.index as f64)?;
        sheet.write_string(row, 1, r.smiles.as_str())?;
        sheet.write_string(row, 2, bonds.as_str())?;
        sheet.write_string(row, 3, r.broken_bonds.join(";").as_str())?;
        sheet.write_string(row, 4, r.feature_name.as_str())?;
        sheet.write_number(row, 5, r.feature)?;
    }
    Ok(workbook.save_to_buffer()?)
}

/// `data:` URL carrying `bytes` base64-encoded.
pub fn download_link(bytes: &[u8], media_type: &str) -> String {
    let data = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{media_type};base64,{data}")
}

pub fn report_json(report: &Report) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, smiles: &str) -> ExportRow {
        ExportRow {
            index,
            smiles: smiles.to_string(),
            bond_indices: vec![0, 2],
            broken_bonds: vec!["C1-C2".to_string(), "C3-O4".to_string()],
            feature_name: "MolWt".to_string(),
            feature: 46.5,
        }
    }

    #[test]
    fn header_only() {
        assert_eq!(
            to_csv(&[]),
            "index,smiles,bond_indices,broken_bonds,feature_name,feature\r\n"
        );
    }

    #[test]
    fn plain_rows() {
        let csv = to_csv(&[row(1, "C.CCO")]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[1], "1,C.CCO,0;2,C1-C2;C3-O4,MolWt,46.5");
        assert_eq!(lines[2], "");
    }

    #[test]
    fn quoting() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(csv_field("C(=O)O"), "C(=O)O");
    }

    #[test]
    fn workbook_is_a_zip_archive() {
        let bytes = to_xlsx(&[row(1, "C.CCO"), row(2, "CC.O")]).unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));
        let link = download_link(&bytes, XLSX_MEDIA_TYPE);
        assert!(link.starts_with(
            "data:application/vnd.openxmlformats-officedocument.spreadsheetml.sheet;base64,UEsDB"
        ));
    }

    #[test]
    fn data_url() {
        assert_eq!(download_link(b"hello", "text/plain"), "data:text/plain;base64,aGVsbG8=");
        assert_eq!(download_link(b"", CSV_MEDIA_TYPE), "data:text/csv;base64,");
    }
}
