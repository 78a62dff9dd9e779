use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::default_data_dir;
use crate::repository::traits::KeyValueStore;

const FILE_EXTENSION: &str = "json";

/// Stores each key in its own `<key>.json` file under the data directory.
#[derive(Clone, Debug)]
pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let base_dir = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("Could not create data directory {}", base_dir.display()))?;

        Ok(FileKeyValueStore { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.{}", key, FILE_EXTENSION))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Could not read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        // Write next to the target and rename over it so readers never see
        // a partially written file.
        let tmp_path = path.with_extension(format!("{}.tmp", FILE_EXTENSION));
        {
            let file = File::create(&tmp_path)
                .with_context(|| format!("Could not create {}", tmp_path.display()))?;
            let mut writer = BufWriter::new(file);
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Could not replace {}", path.display()))?;
        tracing::trace!(key, path = %path.display(), bytes = value.len(), "stored value");
        Ok(())
    }
}
