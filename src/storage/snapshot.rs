//! Dataset snapshot persistence
//!
//! A snapshot is a row-oriented UTF-8 text table: one header line, one
//! serialized record per data line, fully rewritten each cycle. Persisting
//! writes a complete new file beside the old one and renames it into place,
//! so the on-disk snapshot is replaced atomically and never left partial.

use crate::record::{Record, ROW_HEADER};
use crate::storage::dataset::Dataset;
use crate::storage::StorageError;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Loads a dataset snapshot from disk
///
/// An absent file yields an empty dataset; a present file must carry the
/// expected header and parseable rows. Should a snapshot ever contain two
/// rows with the same id, the later row wins, matching merge policy.
pub fn load_dataset(path: &Path) -> Result<Dataset, StorageError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Dataset::new()),
        Err(e) => return Err(e.into()),
    };

    let mut dataset = Dataset::new();
    let mut lines = content.lines().enumerate();

    match lines.next() {
        None => return Ok(dataset),
        Some((_, header)) if header == ROW_HEADER => {}
        Some((_, header)) => return Err(StorageError::Header(header.to_string())),
    }

    for (index, line) in lines {
        if line.is_empty() {
            continue;
        }
        let record = Record::from_row(line).map_err(|source| StorageError::Row {
            line: index + 1,
            source,
        })?;
        dataset.insert(record);
    }

    Ok(dataset)
}

/// Persists a dataset snapshot to disk, replacing any previous snapshot
///
/// The snapshot is written in full to a sibling temporary file, synced,
/// then renamed over the target path. A failure leaves the previous
/// snapshot untouched and authoritative.
pub fn persist_dataset(path: &Path, dataset: &Dataset) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = tmp_sibling(path);
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", ROW_HEADER)?;
        for record in dataset.records() {
            writeln!(writer, "{}", record.to_row())?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Builds the temporary path the snapshot is staged at before the rename
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
