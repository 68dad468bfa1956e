use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;

use crate::{KvError, Result};

/// File suffix of an entry file.
pub(crate) const ENTRY_SUFFIX: &str = ".json";

/// File suffix of an entry being written.
pub(crate) const TEMP_SUFFIX: &str = ".json.tmp";

const INDENT: &[u8] = b"    ";

/// Rejects keys that would not map to a single file inside the root.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0'])
    {
        return Err(KvError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

/// Returns `<dir>/<key>.json`.
pub(crate) fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}{ENTRY_SUFFIX}"))
}

/// Returns `<dir>/<key>.json.tmp`.
pub(crate) fn temp_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}{TEMP_SUFFIX}"))
}

/// Extracts the key from an entry file path, or `None` for any other file.
pub(crate) fn key_from_path(path: &Path) -> Option<String> {
    let key = path
        .file_name()
        .and_then(OsStr::to_str)
        .and_then(|name| name.strip_suffix(ENTRY_SUFFIX))?;
    validate_key(key).ok()?;
    Some(key.to_owned())
}

/// Serializes `value` as JSON indented with four spaces.
pub(crate) fn encode<V: Serialize + ?Sized>(value: &V) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut ser)?;
    Ok(buf)
}

pub(crate) fn decode<V: DeserializeOwned>(bytes: &[u8]) -> Result<V> {
    Ok(serde_json::from_slice(bytes)?)
}
