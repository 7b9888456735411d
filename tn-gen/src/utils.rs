//! File helpers for the run front end.

use std::fs::File;
use std::io::{
    BufReader,
    BufWriter,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::time::SystemTime;

use anyhow::{
    Context,
    Result,
};
use chrono::{
    DateTime,
    Utc,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{
    debug,
    instrument,
};

/// Create a timestamped output directory under `base_dir` and write basic metadata.
#[instrument]
pub fn create_timestamped_output_dir(base_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(base_dir).with_context(|| format!("creating {}", base_dir.display()))?;

    let now: DateTime<Utc> = SystemTime::now().into();
    let timestamp = now.to_rfc3339().replace([':', '.'], "-"); // make filesystem-friendly
    let output_dir = base_dir.join(timestamp);
    std::fs::create_dir_all(&output_dir)?;

    let metadata = json!({
        "timestamp": now.to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "command_args": std::env::args().collect::<Vec<_>>()
    });
    write_json(&output_dir, "metadata.json", &metadata)?;

    Ok(output_dir)
}

/// Pretty-print `value` as JSON into `output_dir/filename` and return the path.
#[instrument(skip(value))]
pub fn write_json<T: Serialize + ?Sized>(output_dir: &Path, filename: &str, value: &T) -> Result<PathBuf> {
    let file_path = output_dir.join(filename);
    let file = File::create(&file_path).with_context(|| format!("creating {}", file_path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;

    debug!("written to: {}", file_path.display());
    Ok(file_path)
}

/// Read a YAML (`.yaml`, `.yml`) or JSON (anything else) document.
pub fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    let is_yaml = path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext == "yaml" || ext == "yml");
    if is_yaml {
        serde_yaml::from_reader(reader).with_context(|| format!("parsing YAML from {}", path.display()))
    } else {
        serde_json::from_reader(reader).with_context(|| format!("parsing JSON from {}", path.display()))
    }
}
