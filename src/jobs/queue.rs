use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::temp_file::TempUpload;
use crate::cache::{CacheResult, ObjectCache, ObjectCacheExt};
use crate::config::ImportConfig;
use crate::errors::{ExamLedgerError, Result};
use crate::models::uploads::entities::{
    UploadJobKind, UploadJobRecord, UploadJobStatus, UploadJobSummary,
};
use crate::sheet::{ColumnMapping, normalize_rows, read_sheet};
use crate::storage::Storage;

/// 队列参数
#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub capacity: usize,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    // 任务记录在缓存中的保留时间（秒）
    pub result_ttl: u64,
    pub max_rows: usize,
}

impl QueueSettings {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            capacity: config.queue_capacity.max(1),
            max_attempts: config.max_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            result_ttl: config.result_ttl,
            max_rows: config.max_rows,
        }
    }
}

/// 任务参数
#[derive(Debug, Clone)]
pub enum UploadTask {
    ExamResults {
        exam_id: i64,
        class_id: i64,
        mapping: ColumnMapping,
    },
    StudentRoster {
        class_id: Option<i64>,
        mapping: ColumnMapping,
    },
}

impl UploadTask {
    pub fn kind(&self) -> UploadJobKind {
        match self {
            UploadTask::ExamResults { .. } => UploadJobKind::ExamResults,
            UploadTask::StudentRoster { .. } => UploadJobKind::StudentRoster,
        }
    }

    fn mapping(&self) -> &ColumnMapping {
        match self {
            UploadTask::ExamResults { mapping, .. } | UploadTask::StudentRoster { mapping, .. } => {
                mapping
            }
        }
    }
}

struct UploadJob {
    id: String,
    task: UploadTask,
    // 任务结束时随 job 一起 drop，删除临时文件
    file: TempUpload,
}

/// 上传任务队列句柄
#[derive(Clone)]
pub struct UploadQueue {
    sender: mpsc::Sender<UploadJob>,
    cache: Arc<dyn ObjectCache>,
    result_ttl: u64,
}

impl UploadQueue {
    /// 启动唯一的 worker，返回队列句柄和 worker 的 JoinHandle
    ///
    /// 所有句柄 drop 后 worker 处理完剩余任务即退出。
    pub fn start(
        storage: Arc<dyn Storage>,
        cache: Arc<dyn ObjectCache>,
        settings: QueueSettings,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(settings.capacity);
        let queue = Self {
            sender,
            cache: cache.clone(),
            result_ttl: settings.result_ttl,
        };
        let worker = UploadWorker {
            storage,
            cache,
            settings,
        };
        let handle = tokio::spawn(worker.run(receiver));
        (queue, handle)
    }

    /// 登记任务并送入队列
    pub async fn enqueue(&self, task: UploadTask, file: TempUpload) -> Result<UploadJobRecord> {
        let job_id = Uuid::new_v4().to_string();
        let record = UploadJobRecord::queued(job_id.clone(), task.kind());
        self.cache
            .insert_json(
                UploadJobRecord::cache_key(&job_id),
                &record,
                self.result_ttl,
            )
            .await;

        let job = UploadJob {
            id: job_id.clone(),
            task,
            file,
        };
        if self.sender.send(job).await.is_err() {
            self.cache.remove(&UploadJobRecord::cache_key(&job_id)).await;
            return Err(ExamLedgerError::queue_closed("上传队列已关闭"));
        }

        info!("Upload job {} queued ({:?})", job_id, record.kind);
        Ok(record)
    }

    /// 查询任务记录
    pub async fn job(&self, job_id: &str) -> Option<UploadJobRecord> {
        find_job(self.cache.as_ref(), job_id).await
    }
}

pub async fn find_job(cache: &dyn ObjectCache, job_id: &str) -> Option<UploadJobRecord> {
    match cache
        .get_json::<UploadJobRecord>(&UploadJobRecord::cache_key(job_id))
        .await
    {
        CacheResult::Found(record) => Some(record),
        _ => None,
    }
}

struct UploadWorker {
    storage: Arc<dyn Storage>,
    cache: Arc<dyn ObjectCache>,
    settings: QueueSettings,
}

impl UploadWorker {
    async fn run(self, mut receiver: mpsc::Receiver<UploadJob>) {
        info!("Upload worker started");
        while let Some(job) = receiver.recv().await {
            self.process(job).await;
        }
        info!("Upload worker stopped");
    }

    async fn process(&self, job: UploadJob) {
        let job_id = job.id.clone();
        let mut record = UploadJobRecord::queued(job_id.clone(), job.task.kind());
        let mut summary = None;

        for attempt in 1..=self.settings.max_attempts {
            record.status = UploadJobStatus::Running;
            record.attempts = attempt;
            self.save(&mut record).await;

            match self.execute(&job).await {
                Ok(result) => {
                    summary = Some(result);
                    break;
                }
                Err(e) => {
                    record.error = Some(e.to_string());
                    if attempt < self.settings.max_attempts {
                        warn!(
                            "Upload job {} attempt {}/{} failed: {}",
                            job_id, attempt, self.settings.max_attempts, e
                        );
                        tokio::time::sleep(self.settings.retry_backoff * attempt).await;
                    }
                }
            }
        }

        // 写入最终状态前删除临时文件
        drop(job);

        match summary {
            Some(summary) => {
                record.message = Some(match &summary {
                    UploadJobSummary::ExamResults(s) => s.message(true),
                    UploadJobSummary::StudentRoster(s) => s.message(),
                });
                record.summary = Some(summary);
                record.status = UploadJobStatus::Completed;
                record.error = None;
                info!(
                    "Upload job {} completed after {} attempt(s)",
                    job_id, record.attempts
                );
            }
            None => {
                record.status = UploadJobStatus::Failed;
                error!(
                    "Upload job {} failed after {} attempt(s): {}",
                    job_id,
                    record.attempts,
                    record.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        self.save(&mut record).await;
    }

    async fn execute(&self, job: &UploadJob) -> Result<UploadJobSummary> {
        let data = job.file.read().await?;
        let sheet = read_sheet(&data, job.file.original_name())?;
        if sheet.data_rows().len() > self.settings.max_rows {
            return Err(ExamLedgerError::validation(format!(
                "文件行数超过上限 {}",
                self.settings.max_rows
            )));
        }
        let rows = normalize_rows(&sheet, job.task.mapping());

        match &job.task {
            UploadTask::ExamResults {
                exam_id,
                class_id,
                mapping,
            } => self
                .storage
                .process_exam_results(*exam_id, *class_id, &rows, mapping)
                .await
                .map(UploadJobSummary::ExamResults),
            UploadTask::StudentRoster { class_id, .. } => self
                .storage
                .process_student_roster(&rows, *class_id)
                .await
                .map(UploadJobSummary::StudentRoster),
        }
    }

    async fn save(&self, record: &mut UploadJobRecord) {
        record.updated_at = chrono::Utc::now();
        self.cache
            .insert_json(
                UploadJobRecord::cache_key(&record.job_id),
                &*record,
                self.settings.result_ttl,
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_clamp() {
        let config = ImportConfig {
            default_class_name: "General".to_string(),
            max_attempts: 0,
            retry_backoff_ms: 250,
            queue_capacity: 0,
            result_ttl: 60,
            max_rows: 100,
            seed_subjects: vec![],
        };
        let settings = QueueSettings::from_config(&config);
        assert_eq!(settings.max_attempts, 1);
        assert_eq!(settings.capacity, 1);
        assert_eq!(settings.retry_backoff, Duration::from_millis(250));
    }

    #[test]
    fn test_task_kind() {
        let task = UploadTask::StudentRoster {
            class_id: None,
            mapping: ColumnMapping::default(),
        };
        assert_eq!(task.kind(), UploadJobKind::StudentRoster);
    }
}
