use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::{ExamLedgerError, Result};

// 创建考试请求
#[derive(Debug, Clone, Deserialize)]
pub struct NewExam {
    pub name: String,
    pub exam_date: String,
}

impl NewExam {
    pub const DATE_FORMAT: &'static str = "%Y-%m-%d";

    /// 校验名称非空、日期格式合法，返回规范化后的请求
    pub fn validated(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ExamLedgerError::validation("Exam name must not be empty"));
        }
        let date = NaiveDate::parse_from_str(self.exam_date.trim(), Self::DATE_FORMAT)?;
        Ok(Self {
            name,
            exam_date: date.format(Self::DATE_FORMAT).to_string(),
        })
    }
}
