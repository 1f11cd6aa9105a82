use serde::Serialize;

use crate::errors::ExamLedgerError;

/// 业务错误码
///
/// 0 表示成功；1xxx 通用错误；2xxx 上传与文件；3xxx 导入与对账。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1500,

    FileNotFound = 2000,
    FileUploadFailed = 2001,
    FileTypeNotAllowed = 2002,
    FileSizeExceeded = 2003,
    MultifileUploadNotAllowed = 2004,

    ImportFileParseFailed = 3000,
    ImportFileDataInvalid = 3002,
    ExamNotFound = 3010,
    ClassNotFound = 3011,
    ExamHasNoSubjects = 3013,
    SubjectMappingFailed = 3014,
    UploadJobNotFound = 3020,
    UploadQueueUnavailable = 3021,
}

impl ErrorCode {
    /// 把批次级错误映射为对外错误码
    pub fn from_ledger_error(err: &ExamLedgerError) -> Self {
        match err {
            ExamLedgerError::ExamHasNoSubjects(_) => ErrorCode::ExamHasNoSubjects,
            ExamLedgerError::SubjectMapping(_) => ErrorCode::SubjectMappingFailed,
            ExamLedgerError::SheetParse(_) => ErrorCode::ImportFileParseFailed,
            ExamLedgerError::Validation(_) | ExamLedgerError::DateParse(_) => {
                ErrorCode::ImportFileDataInvalid
            }
            ExamLedgerError::NotFound(_) => ErrorCode::NotFound,
            ExamLedgerError::QueueClosed(_) => ErrorCode::UploadQueueUnavailable,
            _ => ErrorCode::InternalServerError,
        }
    }

    /// 是否属于调用方输入问题（对应 4xx）
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            ErrorCode::Success
                | ErrorCode::InternalServerError
                | ErrorCode::FileUploadFailed
                | ErrorCode::UploadQueueUnavailable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_errors_map_to_client_codes() {
        let code = ErrorCode::from_ledger_error(&ExamLedgerError::subject_mapping("none"));
        assert_eq!(code, ErrorCode::SubjectMappingFailed);
        assert!(code.is_client_error());

        let code = ErrorCode::from_ledger_error(&ExamLedgerError::exam_has_no_subjects("x"));
        assert!(code.is_client_error());
    }

    #[test]
    fn test_store_failure_is_server_error() {
        let code = ErrorCode::from_ledger_error(&ExamLedgerError::database_operation("boom"));
        assert_eq!(code, ErrorCode::InternalServerError);
        assert!(!code.is_client_error());
        assert!(!ErrorCode::Success.is_client_error());
    }
}
