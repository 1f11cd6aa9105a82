//! 后台上传任务
//!
//! 上传文件先落盘为临时文件，再作为任务送入有界队列，由单个 worker 顺序处理。
//! 任务状态与结果写入缓存，键为 `upload_job:{job_id}`。

pub mod queue;
pub mod temp_file;

pub use queue::{QueueSettings, UploadQueue, UploadTask};
pub use temp_file::TempUpload;
