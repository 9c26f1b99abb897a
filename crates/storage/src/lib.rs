use anyhow::Result;
use async_trait::async_trait;
use loadscout_core::CaptureRecord;
use std::path::{Path, PathBuf};

/// Replace every non-ASCII-alphanumeric character with `_`.
///
/// `"Los Angeles, CA"` → `"Los_Angeles__CA"` (comma and space each become
/// an underscore). Deterministic, so the next run with the same location
/// overwrites the same file.
pub fn sanitize_location(location: &str) -> String {
    location
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

pub fn location_filename(location: &str) -> String {
    format!("{}.json", sanitize_location(location))
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist one capture, returning the path it was written to.
    async fn save_capture(&self, record: &CaptureRecord) -> Result<PathBuf>;
}

pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn save_capture(&self, record: &CaptureRecord) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(location_filename(&record.location));
        let data = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn record(location: &str, data: serde_json::Value) -> CaptureRecord {
        CaptureRecord {
            url: "https://members.123loadboard.com/api/loads/named-searches/x/search".into(),
            status: 200,
            data,
            timestamp: Utc::now(),
            location: location.into(),
        }
    }

    #[test]
    fn sanitization_replaces_every_special_character() {
        assert_eq!(sanitize_location("Los Angeles, CA"), "Los_Angeles__CA");
        assert_eq!(sanitize_location("Baltimore, MD-Los Angeles, CA"), "Baltimore__MD_Los_Angeles__CA");
        assert_eq!(sanitize_location("plain"), "plain");
        assert_eq!(sanitize_location("a/b\\c:d"), "a_b_c_d");
    }

    #[test]
    fn filename_is_deterministic() {
        assert_eq!(location_filename("Los Angeles, CA"), "Los_Angeles__CA.json");
        assert_eq!(
            location_filename("Los Angeles, CA"),
            location_filename("Los Angeles, CA")
        );
    }

    #[tokio::test]
    async fn save_writes_pretty_json_under_the_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("data"));

        let path = storage
            .save_capture(&record("Dallas, TX", json!({"loads": [1, 2, 3]})))
            .await
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "Dallas__TX.json");
        let written = std::fs::read_to_string(&path).unwrap();
        let back: CaptureRecord = serde_json::from_str(&written).unwrap();
        assert_eq!(back.location, "Dallas, TX");
        assert_eq!(back.data["loads"], json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn second_save_with_same_location_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());

        let first = storage
            .save_capture(&record("Reno, NV", json!({"run": 1})))
            .await
            .unwrap();
        let second = storage
            .save_capture(&record("Reno, NV", json!({"run": 2})))
            .await
            .unwrap();

        assert_eq!(first, second);
        let back: CaptureRecord =
            serde_json::from_str(&std::fs::read_to_string(&second).unwrap()).unwrap();
        assert_eq!(back.data["run"], 2);
    }
}
