use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::prelude::*;
use clap::ValueEnum;
use csv::WriterBuilder;
use log::info;

use crate::freq::FrequencyTable;

/// Output format for dictionary exports (tsv, csv, json).
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Tab-separated `token<TAB>frequency` lines.
    Tsv,
    /// Semicolon-separated `token;frequency` lines.
    Csv,
    /// JSON array of entries.
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Tsv => "tsv",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            ExportFormat::Csv => b';',
            _ => b'\t',
        }
    }
}

/// Neutralize cells a spreadsheet would interpret as formulas by prefixing
/// a single quote. Cells already starting with a quote are left alone.
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=') | Some('+') | Some('-') | Some('@') => format!("'{cell}"),
        _ => cell,
    }
}

/// Destination for per-round artifacts: dictionary exports, token streams,
/// and free-form text reports. The folder name is derived from the corpus
/// file's base name by the caller.
pub trait ExportSink {
    fn write_dictionary(
        &mut self,
        folder: &str,
        file_name: &str,
        table: &FrequencyTable,
        format: ExportFormat,
    ) -> Result<(), String>;

    fn write_tokens(&mut self, folder: &str, file_name: &str, words: &[String])
    -> Result<(), String>;

    fn write_text(&mut self, folder: &str, file_name: &str, text: &str) -> Result<(), String>;
}

/// Filesystem sink. Creates `<base>/<folder>` on demand and writes all
/// artifacts below it.
pub struct FsExport {
    base: PathBuf,
}

impl FsExport {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        FsExport { base: base.into() }
    }

    fn ensure_folder(&self, folder: &str) -> Result<PathBuf, String> {
        let path = self.base.join(folder);
        fs::create_dir_all(&path)
            .map_err(|e| format!("Failed to create folder {}: {e}", path.display()))?;
        Ok(path)
    }

    /// Writes the cross-round summary under a timestamped file name and
    /// returns the path written to.
    pub fn write_summary(&mut self, folder: &str, text: &str) -> Result<PathBuf, String> {
        let local: DateTime<Local> = Local::now();
        let file_name = local
            .format("%Y_%m_%d_%H_%M_%S_collocation_summary.txt")
            .to_string();
        let path = self.ensure_folder(folder)?.join(file_name);

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
        file.write_all(text.as_bytes())
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        info!("Summary saved to {}", path.display());
        Ok(path)
    }
}

impl ExportSink for FsExport {
    fn write_dictionary(
        &mut self,
        folder: &str,
        file_name: &str,
        table: &FrequencyTable,
        format: ExportFormat,
    ) -> Result<(), String> {
        let path = self
            .ensure_folder(folder)?
            .join(format!("{file_name}.{}", format.extension()));
        info!("Saving dictionary to file {}", path.display());

        match format {
            ExportFormat::Json => {
                let json = serde_json::to_string_pretty(&table.entries)
                    .map_err(|e| format!("Failed to serialize {}: {e}", path.display()))?;
                fs::write(&path, json)
                    .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            }
            _ => {
                let mut wtr = WriterBuilder::new()
                    .delimiter(format.delimiter())
                    .from_path(&path)
                    .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
                for entry in &table.entries {
                    wtr.write_record([
                        csv_safe_cell(entry.token.clone()),
                        table.display_value(entry),
                    ])
                    .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
                }
                wtr.flush()
                    .map_err(|e| format!("Failed to flush {}: {e}", path.display()))?;
            }
        }
        Ok(())
    }

    fn write_tokens(
        &mut self,
        folder: &str,
        file_name: &str,
        words: &[String],
    ) -> Result<(), String> {
        let path = self.ensure_folder(folder)?.join(format!("{file_name}.txt"));
        fs::write(&path, words.join(" "))
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        Ok(())
    }

    fn write_text(&mut self, folder: &str, file_name: &str, text: &str) -> Result<(), String> {
        let path = self.ensure_folder(folder)?.join(file_name);
        info!("Saving report to file {}", path.display());
        fs::write(&path, text)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        Ok(())
    }
}
