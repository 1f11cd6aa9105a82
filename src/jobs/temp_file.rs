use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{ExamLedgerError, Result};

/// 上传的临时文件，由持有它的任务独占，drop 时删除
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    original_name: String,
}

impl TempUpload {
    /// 把上传内容写入临时目录
    pub async fn persist(dir: impl AsRef<Path>, original_name: &str, data: &[u8]) -> Result<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            ExamLedgerError::file_operation(format!("创建上传目录失败: {e}"))
        })?;

        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();
        let stored_name = format!(
            "{}-{}{}",
            chrono::Utc::now().timestamp(),
            Uuid::new_v4(),
            extension
        );
        let path = dir.join(stored_name);

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| ExamLedgerError::file_operation(format!("写入临时文件失败: {e}")))?;

        debug!("Stored upload {} at {}", original_name, path.display());
        Ok(Self {
            path,
            original_name: original_name.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 原始文件名，用于判断表格格式
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temporary upload {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove temporary upload {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_removed_on_drop() {
        let dir = std::env::temp_dir().join(format!("exam-ledger-test-{}", Uuid::new_v4()));
        let upload = TempUpload::persist(&dir, "Marks.CSV", b"Roll No\n1\n")
            .await
            .unwrap();

        let path = upload.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("csv"));
        assert_eq!(upload.original_name(), "Marks.CSV");
        assert_eq!(upload.read().await.unwrap(), b"Roll No\n1\n");

        drop(upload);
        assert!(!path.exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
