use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, SetupError};

/// Write any report as pretty-printed JSON
pub fn write_json_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| SetupError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, report).map_err(|source| SetupError::Report {
        path: path.to_path_buf(),
        source,
    })?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| SetupError::io(path, e))
}
