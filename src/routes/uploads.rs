use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::UploadService;

// 懒加载的全局 UploadService 实例
static UPLOAD_SERVICE: Lazy<UploadService> = Lazy::new(UploadService::new_lazy);

pub async fn read_headers(payload: actix_multipart::Multipart) -> ActixResult<HttpResponse> {
    UPLOAD_SERVICE.handle_headers(payload).await
}

pub async fn upload_exam_results(
    request: HttpRequest,
    exam_id: web::Path<i64>,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    UPLOAD_SERVICE
        .handle_exam_results(&request, exam_id.into_inner(), payload)
        .await
}

pub async fn upload_students(
    request: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    UPLOAD_SERVICE.handle_students(&request, payload).await
}

pub async fn quick_upload(
    request: HttpRequest,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    UPLOAD_SERVICE.handle_quick_upload(&request, payload).await
}

pub async fn get_job_status(
    request: HttpRequest,
    job_id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    UPLOAD_SERVICE
        .handle_job_status(&request, job_id.into_inner())
        .await
}

// 配置路由
pub fn configure_upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/uploads/headers", web::post().to(read_headers))
            .route("/uploads/jobs/{job_id}", web::get().to(get_job_status))
            .route(
                "/exams/{exam_id}/results/upload",
                web::post().to(upload_exam_results),
            )
            .route("/students/upload", web::post().to(upload_students))
            .route("/quick-upload", web::post().to(quick_upload)),
    );
}
