//! Practice-history persistence: one JSON blob holding every record.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use talknest_schema::PracticeRecord;
use tokio::fs;
use tracing::warn;

/// Reads and writes the serialized history list. The blob is overwritten
/// whole on every save; there are no partial writes and no schema
/// migrations.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records, most recent first as stored. A missing file is an
    /// empty history; so is a blob that no longer parses. Corrupt state is
    /// logged and treated as "no history", never surfaced as an error.
    pub async fn load(&self) -> Result<Vec<PracticeRecord>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read history file: {}", self.path.display())
                })
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "history file is corrupt, starting empty");
                Ok(Vec::new())
            }
        }
    }

    /// Serialize and overwrite the blob. Creates parent directories on the
    /// first save.
    pub async fn save(&self, records: &[PracticeRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("failed to write history file: {}", self.path.display()))?;
        Ok(())
    }

    /// Remove one record by id and persist the survivors in their original
    /// order. Returns whether anything was removed.
    pub async fn delete_record(&self, id: &str) -> Result<bool> {
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|record| record.id != id);

        if records.len() == before {
            return Ok(false);
        }

        self.save(&records).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryStore;
    use anyhow::Result;
    use talknest_schema::{catalog, DimensionReport, Level, Message, PracticeRecord, ReportData};
    use tempfile::TempDir;
    use tokio::fs;

    fn sample_record(tag: &str) -> PracticeRecord {
        let dim = |level| DimensionReport {
            level,
            reason: format!("{tag} 说明"),
        };
        let report = ReportData {
            empathy: dim(Level::Good),
            listening: dim(Level::Average),
            emotion: dim(Level::Average),
            boundary: dim(Level::NeedsAttention),
            needs: dim(Level::Good),
        };
        let scenario = catalog::builtin_scenarios().remove(0);
        PracticeRecord::new(
            &scenario,
            report,
            vec![Message::child("开场"), Message::parent(tag)],
        )
    }

    #[tokio::test]
    async fn load_missing_file_is_empty() -> Result<()> {
        let dir = TempDir::new()?;
        let store = HistoryStore::new(dir.path().join("history.json"));

        assert!(store.load().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn load_corrupt_file_is_empty() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json at all").await?;

        let store = HistoryStore::new(&path);
        assert!(store.load().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn save_then_load_round_trips() -> Result<()> {
        let dir = TempDir::new()?;
        let store = HistoryStore::new(dir.path().join("nested").join("history.json"));

        let records = vec![sample_record("第一次"), sample_record("第二次")];
        store.save(&records).await?;

        let loaded = store.load().await?;
        assert_eq!(loaded, records);
        assert_eq!(loaded[0].chat_history[1].text, "第一次");
        Ok(())
    }

    #[tokio::test]
    async fn timestamps_survive_the_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let store = HistoryStore::new(dir.path().join("history.json"));

        let record = sample_record("时间");
        let stamp = record.timestamp;
        store.save(&[record]).await?;

        let loaded = store.load().await?;
        assert_eq!(loaded[0].timestamp, stamp);
        Ok(())
    }

    #[tokio::test]
    async fn delete_record_removes_exactly_one() -> Result<()> {
        let dir = TempDir::new()?;
        let store = HistoryStore::new(dir.path().join("history.json"));

        let records = vec![
            sample_record("保留甲"),
            sample_record("删除"),
            sample_record("保留乙"),
        ];
        let target = records[1].id.clone();
        store.save(&records).await?;

        assert!(store.delete_record(&target).await?);

        let loaded = store.load().await?;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, records[0].id);
        assert_eq!(loaded[1].id, records[2].id);
        Ok(())
    }

    #[tokio::test]
    async fn delete_unknown_id_reports_false() -> Result<()> {
        let dir = TempDir::new()?;
        let store = HistoryStore::new(dir.path().join("history.json"));
        store.save(&[sample_record("唯一")]).await?;

        assert!(!store.delete_record("no-such-id").await?);
        assert_eq!(store.load().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn loads_hand_written_history_files() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("history.json");

        // Raw file shape: camelCase keys, RFC 3339 timestamps.
        let raw = r#"[{
            "id": "1724300000000",
            "scenarioId": "school",
            "scenarioTitle": "孩子不想上学",
            "scenarioIcon": "school",
            "timestamp": "2026-08-20T01:30:00.000Z",
            "report": {
                "empathy": {"level": "较好", "reason": "能够回应情绪"},
                "listening": {"level": "一般", "reason": "有打断"},
                "emotion": {"level": "较好", "reason": "全程平稳"},
                "boundary": {"level": "一般", "reason": "规则不清"},
                "needs": {"level": "需注意", "reason": "未追问原因"}
            },
            "chatHistory": [
                {"id": "1", "role": "model", "text": "我今天不想去学校了，烦死了！", "timestamp": "2026-08-20T01:20:00.000Z"},
                {"id": "2", "role": "user", "text": "怎么了？", "timestamp": "2026-08-20T01:21:00.000Z"}
            ]
        }]"#;
        fs::write(&path, raw).await?;

        let store = HistoryStore::new(&path);
        let loaded = store.load().await?;

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].scenario_id, "school");
        assert_eq!(loaded[0].report.needs.level, Level::NeedsAttention);
        assert_eq!(loaded[0].chat_history.len(), 2);
        assert_eq!(
            loaded[0].timestamp,
            chrono::DateTime::parse_from_rfc3339("2026-08-20T01:30:00.000Z")?.with_timezone(&chrono::Utc)
        );
        Ok(())
    }
}
