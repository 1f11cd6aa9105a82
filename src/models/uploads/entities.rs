use serde::{Deserialize, Serialize};

use super::responses::{ReconcileSummary, RosterSummary};

// 后台上传任务类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadJobKind {
    ExamResults,    // 考试成绩
    StudentRoster,  // 学生名册
}

// 后台上传任务状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadJobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl UploadJobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, UploadJobStatus::Completed | UploadJobStatus::Failed)
    }
}

// 任务产出的汇总
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UploadJobSummary {
    ExamResults(ReconcileSummary),
    StudentRoster(RosterSummary),
}

// 缓存中保存的任务记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadJobRecord {
    pub job_id: String,
    pub kind: UploadJobKind,
    pub status: UploadJobStatus,
    // 已尝试次数
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<UploadJobSummary>,
    // 最后一次失败原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UploadJobRecord {
    pub const CACHE_PREFIX: &'static str = "upload_job:";

    pub fn queued(job_id: impl Into<String>, kind: UploadJobKind) -> Self {
        Self {
            job_id: job_id.into(),
            kind,
            status: UploadJobStatus::Queued,
            attempts: 0,
            summary: None,
            error: None,
            message: None,
            updated_at: chrono::Utc::now(),
        }
    }

    pub fn cache_key(job_id: &str) -> String {
        format!("{}{job_id}", Self::CACHE_PREFIX)
    }
}
