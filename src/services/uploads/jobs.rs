use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UploadService;
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_job_status(
    service: &UploadService,
    request: &HttpRequest,
    job_id: String,
) -> ActixResult<HttpResponse> {
    let record = match service.get_queue(request) {
        Some(queue) => queue.job(&job_id).await,
        None => None,
    };

    match record {
        Some(record) => Ok(HttpResponse::Ok().json(ApiResponse::success(record, "Job found"))),
        None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UploadJobNotFound,
            "Upload job not found",
        ))),
    }
}
