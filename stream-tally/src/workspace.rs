use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// File locations for one script's run, all relative to a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub script_name: String,
    pub scripts_dir: PathBuf,
    pub script: PathBuf,
    pub stream_file: PathBuf,
    pub snapshot_file: PathBuf,
    pub log_file: PathBuf,
}

impl Workspace {
    pub fn resolve(root: &Path, script_name: &str) -> Self {
        let scripts_dir = root.join("scripts");
        Self {
            script_name: script_name.to_string(),
            script: scripts_dir.join(format!("{script_name}.sh")),
            scripts_dir,
            stream_file: root.join("streams").join(format!("{script_name}_stream.txt")),
            snapshot_file: root.join("jsons").join(format!("{script_name}_out.json")),
            log_file: root.join("logs").join(format!("{script_name}_log.txt")),
        }
    }

    /// Checks the script exists and creates the output directories. The
    /// stream file is truncated when `stream` is set.
    pub fn prepare(root: &Path, script_name: &str, stream: bool) -> Result<Self> {
        let ws = Self::resolve(root, script_name);
        if !ws.scripts_dir.is_dir() {
            return Err(Error::MissingScriptsDir(ws.scripts_dir));
        }
        if !ws.script.is_file() {
            return Err(Error::MissingScript(ws.script));
        }
        for file in [&ws.stream_file, &ws.snapshot_file, &ws.log_file] {
            if let Some(dir) = file.parent() {
                fs::create_dir_all(dir)?;
            }
        }
        if stream {
            fs::File::create(&ws.stream_file)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&ws.log_file)?;
        Ok(ws)
    }

    pub fn script_file_name(&self) -> String {
        format!("{}.sh", self.script_name)
    }
}
