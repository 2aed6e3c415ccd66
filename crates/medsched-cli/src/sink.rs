//! Record sink: one file per source in the output directory.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use medsched_core::OutputRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Pretty-printed JSON array
    Json,
    /// One JSON object per line
    Ndjson,
}

impl OutputFormat {
    pub(crate) fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Ndjson => "ndjson",
        }
    }
}

/// Serialize `records` in order into `writer`.
pub(crate) fn encode_records<W: Write>(
    writer: &mut W,
    records: &[OutputRecord],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, records)?;
            writeln!(writer)?;
        }
        OutputFormat::Ndjson => {
            for record in records {
                serde_json::to_writer(&mut *writer, record)?;
                writeln!(writer)?;
            }
        }
    }
    Ok(())
}

/// Write `records` to `{dir}/{source_name}.{ext}`, creating `dir` if needed.
/// Returns the path written.
pub(crate) fn write_records(
    dir: &Path,
    source_name: &str,
    records: &[OutputRecord],
    format: OutputFormat,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let path = dir.join(format!("{source_name}.{}", format.extension()));
    let file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    encode_records(&mut writer, records, format)?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;

    Ok(path)
}
