use std::{fs, path::Path};

use crate::{error::Result, models::ColumnBatch};

pub fn load(path: &Path) -> Result<ColumnBatch> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn store(path: &Path, batch: &ColumnBatch) -> Result<()> {
    fs::write(path, serde_json::to_vec(batch)?)?;
    Ok(())
}
