use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, path::PathBuf};
use tempfile::TempDir;

use crate::{Error, InternalResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Program and leading arguments used to launch the evaluator.
    #[serde(default = "default_openscad_command")]
    pub openscad_command: Vec<String>,

    /// Exported to the evaluator as `OPENSCADPATH`.
    #[serde(default)]
    pub library_path: Option<PathBuf>,

    /// Parent of the per-run temporary directory; the system default when unset.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub extract_objects: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            openscad_command: default_openscad_command(),
            library_path: None,
            temp_dir: None,
            extract_objects: default_true(),
        }
    }
}

impl SystemConfig {
    // JSONファイルから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> InternalResult<Self> {
        from_file::<Self, _>(path)?.validated()
    }

    pub fn from_json(s: &str) -> InternalResult<Self> {
        from_str::<Self>(s)?.validated()
    }

    fn validated(self) -> InternalResult<Self> {
        if self.openscad_command.is_empty() {
            return Err(Error::internal("openscad_command must not be empty"));
        }
        Ok(self)
    }

    /// Creates the directory holding one run's geometry files. Removed when
    /// the returned guard is dropped.
    pub fn create_temp_dir(&self) -> InternalResult<TempDir> {
        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix("os2cx-");
            builder
        };
        match &self.temp_dir {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(|e| Error::Internal(format!("Failed to create temp dir: {}", e)))
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> InternalResult<T> {
    let file = File::open(path)
        .map_err(|e| Error::Internal(format!("Failed to open config file: {}", e)))?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| Error::Internal(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> InternalResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| Error::Internal(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

// デフォルト値の定義
fn default_openscad_command() -> Vec<String> {
    vec!["openscad".to_string()]
}

fn default_true() -> bool {
    true
}
