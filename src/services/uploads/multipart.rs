//! multipart 上传读取
//!
//! 约定：表单中恰好一个 `file` 字段，其余字段按文本读取。

use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures_util::StreamExt;
use futures_util::TryStreamExt;
use std::path::Path;

use crate::config::AppConfig;
use crate::models::uploads::requests::FormFields;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate_magic_bytes;

// 文本字段上限
const MAX_TEXT_FIELD_SIZE: usize = 64 * 1024;

/// 已读入内存的上传
#[derive(Debug)]
pub struct UploadPayload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub fields: FormFields,
}

#[derive(Debug)]
pub enum PayloadError {
    Read(String),
    MissingFile,
    MultipleFiles,
    TypeNotAllowed,
    ContentMismatch,
    SizeExceeded,
    FieldTooLarge(String),
}

impl PayloadError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::Read(_) => ErrorCode::FileUploadFailed,
            Self::MissingFile => ErrorCode::FileNotFound,
            Self::MultipleFiles => ErrorCode::MultifileUploadNotAllowed,
            Self::TypeNotAllowed | Self::ContentMismatch => ErrorCode::FileTypeNotAllowed,
            Self::SizeExceeded => ErrorCode::FileSizeExceeded,
            Self::FieldTooLarge(_) => ErrorCode::BadRequest,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Read(msg) => format!("文件读取失败: {msg}"),
            Self::MissingFile => "No file found in upload payload".to_string(),
            Self::MultipleFiles => "Only one file can be uploaded at a time".to_string(),
            Self::TypeNotAllowed => "File type not allowed".to_string(),
            Self::ContentMismatch => "文件内容与扩展名不匹配".to_string(),
            Self::SizeExceeded => "File size exceeds the limit".to_string(),
            Self::FieldTooLarge(name) => format!("字段 {name} 过长"),
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::BadRequest().json(ApiResponse::error_empty(self.error_code(), self.message()))
    }
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// 读取整个 multipart 请求，校验扩展名、魔术字节与大小
pub async fn read_upload(
    payload: &mut Multipart,
    config: &AppConfig,
) -> Result<UploadPayload, PayloadError> {
    let max_size = config.upload.max_size;
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut fields = FormFields::new();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| PayloadError::Read(e.to_string()))?
    {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name == "file" {
            if file.is_some() {
                return Err(PayloadError::MultipleFiles);
            }

            let original_name = content_disposition
                .and_then(|cd| cd.get_filename())
                .map(|s| s.to_string())
                .unwrap_or_default();
            let extension = extension_of(&original_name);
            if !config.is_upload_type_allowed(&extension) {
                return Err(PayloadError::TypeNotAllowed);
            }

            let mut data = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| PayloadError::Read(e.to_string()))?;
                if data.len() + chunk.len() > max_size {
                    return Err(PayloadError::SizeExceeded);
                }
                data.extend_from_slice(&chunk);
            }

            if data.is_empty() {
                return Err(PayloadError::MissingFile);
            }
            if !validate_magic_bytes(&data, &extension) {
                return Err(PayloadError::ContentMismatch);
            }
            file = Some((original_name, data));
        } else {
            let mut value = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| PayloadError::Read(e.to_string()))?;
                if value.len() + chunk.len() > MAX_TEXT_FIELD_SIZE {
                    return Err(PayloadError::FieldTooLarge(name));
                }
                value.extend_from_slice(&chunk);
            }
            fields.insert(name, String::from_utf8_lossy(&value).into_owned());
        }
    }

    let (file_name, data) = file.ok_or(PayloadError::MissingFile)?;
    Ok(UploadPayload {
        file_name,
        data,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Marks.XLSX"), ".xlsx");
        assert_eq!(extension_of("roster.csv"), ".csv");
        assert_eq!(extension_of("noext"), "");
    }

    #[test]
    fn test_payload_error_codes() {
        assert_eq!(
            PayloadError::SizeExceeded.error_code(),
            ErrorCode::FileSizeExceeded
        );
        assert_eq!(
            PayloadError::ContentMismatch.error_code(),
            ErrorCode::FileTypeNotAllowed
        );
        assert_eq!(
            PayloadError::into_response(PayloadError::MissingFile).status(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
    }
}
