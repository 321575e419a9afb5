use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use zip::ZipArchive;

use crate::error::{Result, SetupError};
use crate::ui::Ui;

/// Extract the CSV entries of a zip file into `dest_dir`.
///
/// Directory prefixes inside the archive are dropped. Returns the number of
/// files written.
pub fn extract_zip(zip_path: &Path, dest_dir: &Path, ui: &mut impl Ui) -> Result<u64> {
    let archive_err = |source: zip::result::ZipError| SetupError::Archive {
        path: zip_path.to_path_buf(),
        source,
    };

    let file = File::open(zip_path).map_err(|e| SetupError::io(zip_path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(archive_err)?;

    if dest_dir.exists() {
        fs::remove_dir_all(dest_dir).map_err(|e| SetupError::io(dest_dir, e))?;
    }
    fs::create_dir_all(dest_dir).map_err(|e| SetupError::io(dest_dir, e))?;

    let total_files = archive.len() as u64;
    let mut written = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_err)?;
        ui.set_progress(i as u64 + 1, total_files, "Extracting");

        if !entry.is_file() {
            continue;
        }

        let name = entry.name().to_string();
        let file_name = Path::new(&name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&name)
            .to_string();

        // Only extract .csv files, skipping macOS resource forks
        if !file_name.ends_with(".csv") || file_name.starts_with("._") {
            continue;
        }

        let dest_path = dest_dir.join(&file_name);
        let mut dest_file =
            File::create(&dest_path).map_err(|e| SetupError::io(&dest_path, e))?;
        io::copy(&mut entry, &mut dest_file).map_err(|e| SetupError::io(&dest_path, e))?;

        ui.log(format!("Extracted {}", file_name));
        written += 1;
    }

    ui.clear_progress();
    Ok(written)
}
