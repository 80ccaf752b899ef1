//! CSV and PDF export of the staff listing.
//!
//! Exports operate on [`ExportRow`]s, the four user-facing columns of the
//! listing. The CSV writer joins raw values by default, so a value holding
//! a comma shifts the remaining columns of its line; [`CsvStyle::Quoted`]
//! opts into RFC 4180 quoting. The PDF writer emits a small self-contained
//! PDF 1.4 file with one table, paginated with a repeated header.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::record::StaffRecord;

/// File name of the CSV export.
pub const CSV_FILE_NAME: &str = "staff_data.csv";

/// File name of the PDF export.
pub const PDF_FILE_NAME: &str = "staff_data.pdf";

/// Column names of an export row, in column order.
pub const FIELD_NAMES: [&str; 4] = ["id", "fullName", "birthday", "gender"];

/// One exported line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    /// User-facing identifier.
    pub id: String,
    /// Full name.
    pub full_name: String,
    /// Birthday as `YYYY-MM-DD`.
    pub birthday: String,
    /// Gender label.
    pub gender: String,
}

impl ExportRow {
    fn values(&self) -> [&str; 4] {
        [&self.id, &self.full_name, &self.birthday, &self.gender]
    }
}

impl From<&StaffRecord> for ExportRow {
    fn from(record: &StaffRecord) -> Self {
        Self {
            id: record.id.clone(),
            full_name: record.full_name.clone(),
            birthday: record.birthday_text(),
            gender: record.gender_label().to_string(),
        }
    }
}

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// A PDF table.
    Pdf,
}

impl ExportFormat {
    /// The file name written for this format.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Csv => CSV_FILE_NAME,
            Self::Pdf => PDF_FILE_NAME,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Pdf => write!(f, "pdf"),
        }
    }
}

/// How CSV values are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CsvStyle {
    /// Values joined as-is.
    #[default]
    Raw,
    /// Values containing `,`, `"` or a newline are quoted.
    Quoted,
}

impl CsvStyle {
    /// Pick the style from the `export.quote_csv` setting.
    #[must_use]
    pub fn from_quote_flag(quote: bool) -> Self {
        if quote {
            Self::Quoted
        } else {
            Self::Raw
        }
    }

    fn field<'a>(self, value: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            Self::Quoted if value.contains([',', '"', '\n', '\r']) => {
                format!("\"{}\"", value.replace('"', "\"\"")).into()
            }
            _ => value.into(),
        }
    }
}

/// Render rows as CSV text.
///
/// The first line holds the column names; lines are separated by `\n`
/// with no trailing newline. No rows yields an empty string.
#[must_use]
pub fn to_csv(rows: &[ExportRow], style: CsvStyle) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(FIELD_NAMES.join(","));
    for row in rows {
        let fields: Vec<_> = row.values().into_iter().map(|v| style.field(v)).collect();
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

/// Write the CSV export into `dir` and return the file path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn write_csv(dir: &Path, rows: &[ExportRow], style: CsvStyle) -> Result<PathBuf> {
    let path = write_file(dir, ExportFormat::Csv, to_csv(rows, style).as_bytes())?;
    info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(path)
}

/// Write the PDF export into `dir` and return the file path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn write_pdf(dir: &Path, rows: &[ExportRow]) -> Result<PathBuf> {
    let path = write_file(dir, ExportFormat::Pdf, &to_pdf(rows))?;
    info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(path)
}

fn write_file(dir: &Path, format: ExportFormat, contents: &[u8]) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let path = dir.join(format.file_name());
    fs::write(&path, contents).map_err(|source| Error::Export {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

// A4 portrait, in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 40.0;
const ROW_HEIGHT: f32 = 18.0;
const FONT_SIZE: f32 = 10.0;
const CELL_PADDING: f32 = 4.0;
const ROWS_PER_PAGE: usize = 40;

/// Table columns: heading, width in points, characters that fit.
const COLUMNS: [(&str, f32, usize); 4] = [
    ("ID", 70.0, 12),
    ("Full Name", 255.0, 46),
    ("Birthday", 95.0, 16),
    ("Gender", 95.0, 16),
];

/// Render rows as a PDF document with one table.
///
/// Columns are ID, Full Name, Birthday and Gender. Rows that do not fit
/// on a page continue on the next one under a repeated header. Text
/// outside Latin-1 is replaced by `?`; over-long cells are truncated.
#[must_use]
pub fn to_pdf(rows: &[ExportRow]) -> Vec<u8> {
    let mut pages: Vec<&[ExportRow]> = rows.chunks(ROWS_PER_PAGE).collect();
    if pages.is_empty() {
        pages.push(&[]);
    }

    let mut pdf = PdfWriter::new();
    let page_refs: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect();

    pdf.object(b"<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            page_refs.join(" "),
            pages.len()
        )
        .as_bytes(),
    );
    pdf.object(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");

    for (index, chunk) in pages.iter().enumerate() {
        let content = page_content(chunk, index + 1, pages.len());
        let page_obj = 4 + 2 * index;
        pdf.object(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                page_obj + 1
            )
            .as_bytes(),
        );
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(&content);
        stream.extend_from_slice(b"\nendstream");
        pdf.object(&stream);
    }

    pdf.finish()
}

fn page_content(rows: &[ExportRow], page: usize, total: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let table_width: f32 = COLUMNS.iter().map(|(_, width, _)| width).sum();
    let top = PAGE_HEIGHT - MARGIN;

    // Header band.
    out.extend_from_slice(
        format!(
            "0.85 g {MARGIN:.2} {:.2} {table_width:.2} {ROW_HEIGHT:.2} re f 0 g\n",
            top - ROW_HEIGHT
        )
        .as_bytes(),
    );
    let headings = COLUMNS.map(|(heading, _, _)| heading);
    write_row(&mut out, top, &headings);

    let mut row_top = top - ROW_HEIGHT;
    for row in rows {
        write_row(&mut out, row_top, &row.values());
        row_top -= ROW_HEIGHT;
        write_rule(&mut out, row_top, table_width);
    }

    let footer = format!("Page {page} of {total}");
    write_text(&mut out, MARGIN, MARGIN / 2.0, &footer);
    out
}

fn write_row(out: &mut Vec<u8>, row_top: f32, cells: &[&str; 4]) {
    let baseline = row_top - ROW_HEIGHT + (ROW_HEIGHT - FONT_SIZE) / 2.0 + 2.0;
    let mut x = MARGIN;
    for ((_, width, max_chars), cell) in COLUMNS.iter().zip(cells) {
        write_text(out, x + CELL_PADDING, baseline, &truncate(cell, *max_chars));
        x += width;
    }
}

fn write_rule(out: &mut Vec<u8>, y: f32, width: f32) {
    out.extend_from_slice(
        format!(
            "0.5 w 0.7 G {MARGIN:.2} {y:.2} m {:.2} {y:.2} l S 0 G\n",
            MARGIN + width
        )
        .as_bytes(),
    );
}

fn write_text(out: &mut Vec<u8>, x: f32, y: f32, text: &str) {
    out.extend_from_slice(format!("BT /F1 {FONT_SIZE:.0} Tf {x:.2} {y:.2} Td (").as_bytes());
    push_pdf_string(out, text);
    out.extend_from_slice(b") Tj ET\n");
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Append `text` as the body of a PDF literal string in Latin-1.
fn push_pdf_string(out: &mut Vec<u8>, text: &str) {
    for ch in text.chars() {
        match ch {
            '(' => out.extend_from_slice(b"\\("),
            ')' => out.extend_from_slice(b"\\)"),
            '\\' => out.extend_from_slice(b"\\\\"),
            c if c.is_control() => out.push(b' '),
            c => match u8::try_from(u32::from(c)) {
                Ok(byte) if !(0x80..0xA0).contains(&byte) => out.push(byte),
                _ => out.push(b'?'),
            },
        }
    }
}

/// Sequential writer of numbered PDF objects with a cross-reference table.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        Self {
            buf: b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec(),
            offsets: Vec::new(),
        }
    }

    /// Append the next object; objects are numbered from 1 in call order.
    fn object(&mut self, body: &[u8]) {
        self.offsets.push(self.buf.len());
        let number = self.offsets.len();
        self.buf
            .extend_from_slice(format!("{number} 0 obj\n").as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.buf.len();
        let size = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
        ));
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}
