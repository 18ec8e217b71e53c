//! Export of the change list to spreadsheet files
//!
//! Every export writes a fixed header row followed by one row per change into
//! a file with a fixed name inside the export directory. An empty change list
//! is refused before anything touches the filesystem.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};

use crate::diff::{ChangeKind, ChangeSummary};
use crate::error::{Result, SideDiffError};

/// Base name of every exported file
pub const EXPORT_BASENAME: &str = "diff_changes";

/// Header row shared by all export formats
pub const HEADER: [&str; 5] = ["kind", "old line #", "new line #", "old content", "new content"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Longest string, in characters, an xlsx cell can hold
pub const XLSX_CELL_LIMIT: usize = 32_767;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

/// One spreadsheet row derived from a change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub kind: ChangeKind,
    pub old_line_number: Option<usize>,
    pub new_line_number: Option<usize>,
    pub old_content: Option<String>,
    pub new_content: Option<String>,
}

impl From<&ChangeSummary> for ExportRow {
    fn from(change: &ChangeSummary) -> Self {
        Self {
            kind: change.kind,
            old_line_number: change.old_line_number,
            new_line_number: change.new_line_number,
            old_content: change.old_text().map(str::to_string),
            new_content: change.new_text().map(str::to_string),
        }
    }
}

impl ExportRow {
    fn cells(&self) -> [String; 5] {
        let number = |n: Option<usize>| n.map(|n| n.to_string()).unwrap_or_default();
        [
            self.kind.label().to_string(),
            number(self.old_line_number),
            number(self.new_line_number),
            self.old_content.clone().unwrap_or_default(),
            self.new_content.clone().unwrap_or_default(),
        ]
    }
}

/// Writes change lists into the export directory
#[derive(Debug, Clone)]
pub struct ChangeExporter {
    directory: PathBuf,
}

impl ChangeExporter {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// Fixed destination path for a format
    pub fn output_path(&self, format: ExportFormat) -> PathBuf {
        self.directory
            .join(format!("{}.{}", EXPORT_BASENAME, format.extension()))
    }

    /// Export the change list, returning the written file's path
    pub fn export(&self, changes: &[ChangeSummary], format: ExportFormat) -> Result<PathBuf> {
        if changes.is_empty() {
            tracing::warn!("Export refused: no changes");
            return Err(SideDiffError::NothingToExport);
        }

        fs::create_dir_all(&self.directory)?;
        let path = self.output_path(format);
        let rows: Vec<ExportRow> = changes.iter().map(ExportRow::from).collect();

        match format {
            ExportFormat::Xlsx => write_xlsx(&rows, &path)?,
            ExportFormat::Csv => {
                let mut writer = BufWriter::new(File::create(&path)?);
                writer.write_all(UTF8_BOM)?;
                write_csv(&rows, &mut writer)?;
                writer.flush()?;
            }
        }

        tracing::info!("Exported {} changes to {}", rows.len(), path.display());
        Ok(path)
    }
}

fn write_xlsx(rows: &[ExportRow], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Changes")?;

        for (col, title) in HEADER.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
        }
        worksheet.set_freeze_panes(1, 0)?;
        worksheet.set_column_width(0, 10.0)?;
        worksheet.set_column_width(3, 60.0)?;
        worksheet.set_column_width(4, 60.0)?;

        for (i, row) in rows.iter().enumerate() {
            let r = (i + 1) as u32;
            worksheet.write_string(r, 0, row.kind.label())?;
            if let Some(number) = row.old_line_number {
                worksheet.write_number(r, 1, number as f64)?;
            }
            if let Some(number) = row.new_line_number {
                worksheet.write_number(r, 2, number as f64)?;
            }
            if let Some(content) = &row.old_content {
                worksheet.write_string(r, 3, xlsx_cell(content, r))?;
            }
            if let Some(content) = &row.new_content {
                worksheet.write_string(r, 4, xlsx_cell(content, r))?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// Cut `content` down to what an xlsx cell accepts. CSV rows are never cut.
fn xlsx_cell(content: &str, row: u32) -> &str {
    match content.char_indices().nth(XLSX_CELL_LIMIT) {
        Some((end, _)) => {
            tracing::warn!(
                "Row {} content truncated from {} to {} characters for xlsx",
                row,
                content.chars().count(),
                XLSX_CELL_LIMIT
            );
            &content[..end]
        }
        None => content,
    }
}

/// Write the header and rows as CSV to any writer
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for row in rows {
        csv_writer.write_record(row.cells())?;
    }
    csv_writer.flush()?;
    Ok(())
}
