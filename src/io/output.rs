use crate::types::SwesarrResult;
use std::path::{Path, PathBuf};

/// Where generated tables go.
///
/// The caller decides the directory (for example a fast scratch disk on a
/// remote server); nothing here inspects the running platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    /// Directory whose files are copied into `output_dir` on `prepare`
    pub seed_dir: Option<PathBuf>,
}

impl OutputConfig {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            seed_dir: None,
        }
    }

    /// Copy the files of `seed_dir` (e.g. bundled sample data) on `prepare`
    pub fn with_seed_dir<P: Into<PathBuf>>(mut self, seed_dir: P) -> Self {
        self.seed_dir = Some(seed_dir.into());
        self
    }

    /// Create the output directory and stage seed files into it
    pub fn prepare(&self) -> SwesarrResult<&Path> {
        if self.output_dir.is_dir() {
            log::info!("Output directory prepared: {}", self.output_dir.display());
        } else {
            std::fs::create_dir_all(&self.output_dir)?;
            log::info!("Created output directory: {}", self.output_dir.display());
        }

        if let Some(seed_dir) = &self.seed_dir {
            if seed_dir != &self.output_dir {
                let copied = self.copy_seed_files(seed_dir)?;
                log::debug!("Copied {} seed files from {}", copied, seed_dir.display());
            }
        }

        Ok(&self.output_dir)
    }

    fn copy_seed_files(&self, seed_dir: &Path) -> SwesarrResult<usize> {
        let mut copied = 0;
        for entry in std::fs::read_dir(seed_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                std::fs::copy(entry.path(), self.output_dir.join(entry.file_name()))?;
                copied += 1;
            }
        }
        Ok(copied)
    }

    /// Path of a file inside the output directory
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}
