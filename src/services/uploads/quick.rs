//! 快速上传：建考试 + 全局匹配学生，同步返回汇总

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::multipart::{UploadPayload, read_upload};
use super::{UploadService, error_response};
use crate::config::AppConfig;
use crate::errors::{ExamLedgerError, Result};
use crate::models::ApiResponse;
use crate::models::exams::requests::NewExam;
use crate::models::uploads::requests::QuickUploadForm;
use crate::models::uploads::responses::QuickUploadResponse;
use crate::sheet::{ColumnMapping, normalize_rows, read_sheet};

pub async fn quick_upload(
    service: &UploadService,
    request: &HttpRequest,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let config = AppConfig::get();
    let upload = match read_upload(&mut payload, config).await {
        Ok(upload) => upload,
        Err(e) => return Ok(e.into_response()),
    };

    match process(service, request, config, upload).await {
        Ok(response) => {
            let message = response.message.clone();
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, message)))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

async fn process(
    service: &UploadService,
    request: &HttpRequest,
    config: &AppConfig,
    upload: UploadPayload,
) -> Result<QuickUploadResponse> {
    let form = QuickUploadForm::from_fields(&upload.fields)?;
    let exam = NewExam {
        name: form.exam_name,
        exam_date: form.exam_date,
    }
    .validated()?;
    let mapping = ColumnMapping::from_fields(&form.column_mapping);
    mapping.validate()?;

    let sheet = read_sheet(&upload.data, &upload.file_name)?;
    if sheet.data_rows().len() > config.import.max_rows {
        return Err(ExamLedgerError::validation(format!(
            "单次上传最多支持 {} 行",
            config.import.max_rows
        )));
    }
    let rows = normalize_rows(&sheet, &mapping);

    let exam_name = exam.name.clone();
    let storage = service.get_storage(request);
    let summary = storage
        .process_quick_upload(exam, &rows, &mapping, &config.import.default_class_name)
        .await?;

    info!(
        "Quick upload '{}' finished: exam_id={:?}, processed={}",
        exam_name, summary.exam_id, summary.processed
    );
    let message = format!(
        "Exam '{}' created successfully! {}",
        exam_name,
        summary.message(false)
    );
    Ok(QuickUploadResponse { summary, message })
}
