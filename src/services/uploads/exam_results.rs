use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::multipart::{UploadPayload, read_upload};
use super::{UploadService, accepted, error_response};
use crate::config::AppConfig;
use crate::errors::{ExamLedgerError, Result};
use crate::jobs::{TempUpload, UploadTask};
use crate::models::uploads::entities::UploadJobRecord;
use crate::models::uploads::requests::ExamResultUploadForm;
use crate::models::{ApiResponse, ErrorCode};
use crate::sheet::ColumnMapping;

pub async fn upload_exam_results(
    service: &UploadService,
    request: &HttpRequest,
    exam_id: i64,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let config = AppConfig::get();
    let upload = match read_upload(&mut payload, config).await {
        Ok(upload) => upload,
        Err(e) => return Ok(e.into_response()),
    };

    let form = match ExamResultUploadForm::from_fields(&upload.fields) {
        Ok(form) => form,
        Err(e) => return Ok(error_response(&e)),
    };

    let storage = service.get_storage(request);
    match storage.get_exam_by_id(exam_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ExamNotFound,
                "Exam not found",
            )));
        }
        Err(e) => return Ok(error_response(&e)),
    }
    match storage.get_class_by_id(form.class_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::ClassNotFound,
                "Class not found",
            )));
        }
        Err(e) => return Ok(error_response(&e)),
    }

    match enqueue(service, request, config, exam_id, form, upload).await {
        Ok(record) => Ok(accepted(record)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn enqueue(
    service: &UploadService,
    request: &HttpRequest,
    config: &AppConfig,
    exam_id: i64,
    form: ExamResultUploadForm,
    upload: UploadPayload,
) -> Result<UploadJobRecord> {
    let mapping = ColumnMapping::from_fields(&form.column_mapping);
    mapping.validate()?;

    let queue = service
        .get_queue(request)
        .ok_or_else(|| ExamLedgerError::queue_closed("上传队列未启动"))?;
    let file = TempUpload::persist(&config.upload.dir, &upload.file_name, &upload.data).await?;

    queue
        .enqueue(
            UploadTask::ExamResults {
                exam_id,
                class_id: form.class_id,
                mapping,
            },
            file,
        )
        .await
}
