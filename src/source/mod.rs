//! Locating the CSV directory: used as-is, or extracted from a zip archive

pub mod cache;
pub mod extract;

pub use cache::*;
pub use extract::*;

use std::path::{Path, PathBuf};

use crate::error::{Result, SetupError};
use crate::ui::{Phase, Ui};

/// Resolve `input` to a directory holding the CSV files.
///
/// A `.zip` is extracted into the cache once and reused on later runs
/// unless `force` is set.
pub fn resolve_input(
    input: &Path,
    cache_dir: Option<PathBuf>,
    force: bool,
    ui: &mut impl Ui,
) -> Result<PathBuf> {
    if input.is_dir() {
        return Ok(input.to_path_buf());
    }

    let is_zip = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

    if !input.is_file() || !is_zip {
        return Err(SetupError::Config(format!(
            "{} is neither a directory nor a .zip archive",
            input.display()
        )));
    }

    let cache = CacheManager::new(cache_dir)?;
    let dir = cache.archive_dir(input)?;

    if !force && cache.is_cached(&dir) {
        ui.log(format!("Using cached extraction at {}", dir.display()));
        return Ok(dir);
    }

    if dir.exists() && !cache.is_extraction(&dir) {
        return Err(SetupError::Config(format!(
            "{} exists and was not created by this tool; choose another --cache-dir",
            dir.display()
        )));
    }

    ui.set_phase(Phase::Extracting);
    ui.set_info(input.display().to_string());
    extract_zip(input, &dir, ui)?;
    cache.mark_extracted(&dir)?;
    cache.cleanup_except(&dir)?;

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ALL_TABLES;
    use crate::ui::SilentUi;
    use std::fs;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// A zip holding a header-only CSV for every table
    fn write_movies_zip(path: &Path) {
        let mut buf = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buf));
            for table in ALL_TABLES {
                zip.start_file(format!("sql_movie_data/{}", table.source_file), SimpleFileOptions::default())
                    .unwrap();
                zip.write_all(b"id\n").unwrap();
            }
            zip.finish().unwrap();
        }
        fs::write(path, buf).unwrap();
    }

    #[test]
    fn test_directory_passes_through() {
        let root = TempDir::new().unwrap();
        let resolved = resolve_input(root.path(), None, false, &mut SilentUi::new()).unwrap();
        assert_eq!(resolved, root.path());
    }

    #[test]
    fn test_zip_extraction_spares_unrelated_folders() {
        let root = TempDir::new().unwrap();
        let zip_path = root.path().join("movies.zip");
        write_movies_zip(&zip_path);

        let workdir = root.path().join("workdir");
        fs::create_dir_all(workdir.join("thesis")).unwrap();
        fs::write(workdir.join("thesis/chapter1.tex"), "draft").unwrap();

        let first = resolve_input(&zip_path, Some(workdir.clone()), false, &mut SilentUi::new()).unwrap();
        assert!(first.join("gender.csv").is_file());
        assert!(workdir.join("thesis/chapter1.tex").is_file());

        // Second run reuses the marked extraction
        let second = resolve_input(&zip_path, Some(workdir.clone()), false, &mut SilentUi::new()).unwrap();
        assert_eq!(first, second);
        assert!(workdir.join("thesis/chapter1.tex").is_file());
    }

    #[test]
    fn test_refuses_to_overwrite_unmarked_directory() {
        let root = TempDir::new().unwrap();
        let zip_path = root.path().join("movies.zip");
        write_movies_zip(&zip_path);

        let workdir = root.path().join("workdir");
        let cache = CacheManager::new(Some(workdir.clone())).unwrap();
        let target = cache.archive_dir(&zip_path).unwrap();
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("keep.txt"), "mine").unwrap();

        let err = resolve_input(&zip_path, Some(workdir), true, &mut SilentUi::new()).unwrap_err();
        assert!(matches!(err, SetupError::Config(_)));
        assert!(target.join("keep.txt").is_file());
    }

    #[test]
    fn test_rejects_other_files() {
        let root = TempDir::new().unwrap();
        let csv = root.path().join("movies.csv");
        fs::write(&csv, "id\n").unwrap();

        let err = resolve_input(&csv, Some(root.path().join("cache")), false, &mut SilentUi::new())
            .unwrap_err();
        assert!(matches!(err, SetupError::Config(_)));
    }
}
