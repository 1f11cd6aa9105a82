use actix_multipart::Multipart;
use actix_web::{HttpResponse, Result as ActixResult};

use super::error_response;
use super::multipart::read_upload;
use crate::config::AppConfig;
use crate::models::ApiResponse;
use crate::models::uploads::responses::SheetHeadersResponse;
use crate::sheet::read_headers;

pub async fn read_sheet_headers(mut payload: Multipart) -> ActixResult<HttpResponse> {
    let upload = match read_upload(&mut payload, AppConfig::get()).await {
        Ok(upload) => upload,
        Err(e) => return Ok(e.into_response()),
    };

    match read_headers(&upload.data, &upload.file_name) {
        Ok(headers) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SheetHeadersResponse { headers },
            "Headers read successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
