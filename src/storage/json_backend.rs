use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::FallbackBackend;
use crate::error::Result;

/// Flat fallback store: one `<key>.json` file per key in a directory.
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Path for a key. Bytes outside `[A-Za-z0-9_-]` are written as `%XX`,
    /// so distinct keys never share a file and none can leave the directory.
    fn file_for(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("%{:02X}", byte));
            }
        }
        name.push_str(".json");
        self.dir.join(name)
    }
}

impl FallbackBackend for JsonFileBackend {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        match fs::read_to_string(self.file_for(key)) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.file_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_key_is_none() {
        let tmp = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(tmp.path());
        assert!(backend.get("pv_prompts").unwrap().is_none());
    }

    #[test]
    fn test_set_creates_directory_and_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("fallback");
        let mut backend = JsonFileBackend::new(&dir);

        backend.set("pv_prompts", &serde_json::json!([])).unwrap();
        assert!(dir.join("pv_prompts.json").exists());
        assert!(!dir.join("pv_prompts.json.tmp").exists());
        assert_eq!(backend.get("pv_prompts").unwrap(), Some(serde_json::json!([])));
    }

    #[test]
    fn test_key_cannot_escape_directory() {
        let tmp = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(tmp.path());
        assert_eq!(backend.file_for("../etc"), tmp.path().join("%2E%2E%2Fetc.json"));
        assert_eq!(backend.file_for("pv_prompts"), tmp.path().join("pv_prompts.json"));
    }

    #[test]
    fn test_similar_keys_use_separate_files() {
        let tmp = TempDir::new().unwrap();
        let mut backend = JsonFileBackend::new(tmp.path());

        backend.set("a.b", &serde_json::json!(1)).unwrap();
        backend.set("a_b", &serde_json::json!(2)).unwrap();
        backend.set("a%2Eb", &serde_json::json!(3)).unwrap();

        assert_eq!(backend.get("a.b").unwrap(), Some(serde_json::json!(1)));
        assert_eq!(backend.get("a_b").unwrap(), Some(serde_json::json!(2)));
        assert_eq!(backend.get("a%2Eb").unwrap(), Some(serde_json::json!(3)));
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("k.json"), "{not json").unwrap();
        let backend = JsonFileBackend::new(tmp.path());
        assert!(backend.get("k").is_err());
    }
}
