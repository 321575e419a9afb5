use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SetupError};
use crate::schema::ALL_TABLES;

/// Written into every extraction directory; cleanup only touches marked ones
const EXTRACTION_MARKER: &str = ".movies-db-loader";

/// Where extracted CSV archives are kept between runs
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => ProjectDirs::from("", "", "movies-db-loader")
                .ok_or_else(|| {
                    SetupError::Config("could not determine cache directory".to_string())
                })?
                .cache_dir()
                .to_path_buf(),
        };

        fs::create_dir_all(&cache_dir).map_err(|e| SetupError::io(&cache_dir, e))?;

        Ok(Self { cache_dir })
    }

    /// Extraction directory for an archive, keyed by file name and size
    pub fn archive_dir(&self, archive: &Path) -> Result<PathBuf> {
        let len = fs::metadata(archive)
            .map_err(|e| SetupError::io(archive, e))?
            .len();
        let stem = archive
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("archive");

        Ok(self.cache_dir.join(format!("{}-{}", stem, len)))
    }

    /// Check a marked extraction holds every table's source file
    pub fn is_cached(&self, dir: &Path) -> bool {
        self.is_extraction(dir) && ALL_TABLES.iter().all(|t| dir.join(t.source_file).is_file())
    }

    /// Record that `dir` holds an extraction made by this tool
    pub fn mark_extracted(&self, dir: &Path) -> Result<()> {
        let marker = dir.join(EXTRACTION_MARKER);
        fs::write(&marker, b"").map_err(|e| SetupError::io(&marker, e))
    }

    pub fn is_extraction(&self, dir: &Path) -> bool {
        dir.join(EXTRACTION_MARKER).is_file()
    }

    /// Remove every marked extraction except `keep`; anything else in the
    /// cache directory is left alone
    pub fn cleanup_except(&self, keep: &Path) -> Result<()> {
        let entries = fs::read_dir(&self.cache_dir).map_err(|e| SetupError::io(&self.cache_dir, e))?;

        for entry in entries {
            let path = entry.map_err(|e| SetupError::io(&self.cache_dir, e))?.path();
            if path.is_dir() && path != keep && self.is_extraction(&path) {
                fs::remove_dir_all(&path).ok();
            }
        }
        Ok(())
    }
}
