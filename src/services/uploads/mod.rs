pub mod exam_results;
pub mod headers;
pub mod jobs;
pub mod multipart;
pub mod quick;
pub mod students;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;
use tracing::error;

use crate::errors::ExamLedgerError;
use crate::jobs::UploadQueue;
use crate::models::uploads::entities::UploadJobRecord;
use crate::models::uploads::responses::UploadAcceptedResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct UploadService {
    storage: Option<Arc<dyn Storage>>,
}

impl UploadService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_queue(&self, request: &HttpRequest) -> Option<UploadQueue> {
        request
            .app_data::<web::Data<UploadQueue>>()
            .map(|queue| queue.get_ref().clone())
    }

    // 识别表头
    pub async fn handle_headers(&self, payload: Multipart) -> ActixResult<HttpResponse> {
        headers::read_sheet_headers(payload).await
    }

    // 已知班级的成绩上传（后台任务）
    pub async fn handle_exam_results(
        &self,
        request: &HttpRequest,
        exam_id: i64,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        exam_results::upload_exam_results(self, request, exam_id, payload).await
    }

    // 学生名册上传（后台任务）
    pub async fn handle_students(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        students::upload_students(self, request, payload).await
    }

    // 快速上传（同步处理）
    pub async fn handle_quick_upload(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        quick::quick_upload(self, request, payload).await
    }

    // 查询任务状态
    pub async fn handle_job_status(
        &self,
        request: &HttpRequest,
        job_id: String,
    ) -> ActixResult<HttpResponse> {
        jobs::get_job_status(self, request, job_id).await
    }
}

/// 把批次错误映射为 HTTP 响应
pub(crate) fn error_response(err: &ExamLedgerError) -> HttpResponse {
    let code = ErrorCode::from_ledger_error(err);
    match err {
        ExamLedgerError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(code, msg.as_str()))
        }
        ExamLedgerError::QueueClosed(msg) => {
            HttpResponse::ServiceUnavailable().json(ApiResponse::error_empty(code, msg.as_str()))
        }
        _ if code.is_client_error() => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(code, err.message()))
        }
        _ => {
            error!("{}", err);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                code,
                "Internal server error",
            ))
        }
    }
}

pub(crate) fn accepted(record: UploadJobRecord) -> HttpResponse {
    HttpResponse::Accepted().json(ApiResponse::success(
        UploadAcceptedResponse {
            job_id: record.job_id,
            kind: record.kind,
            status: record.status,
        },
        "Upload accepted for processing",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (ExamLedgerError::not_found("exam 9"), StatusCode::NOT_FOUND),
            (
                ExamLedgerError::queue_closed("closed"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ExamLedgerError::exam_has_no_subjects("none"),
                StatusCode::BAD_REQUEST,
            ),
            (
                ExamLedgerError::database_operation("locked"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(error_response(&err).status(), status, "{err}");
        }
    }
}
