use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entities::{UploadJobKind, UploadJobStatus};

/// 一行上传数据：逻辑字段 → 值
pub type RowData = BTreeMap<String, Option<String>>;

/// 未匹配到学生的行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnmappedRow {
    pub row: usize,
    pub roll_number: Option<String>,
    pub roll_number_original: Option<String>,
    pub data: RowData,
}

/// 处理失败的行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowError {
    pub row: usize,
    pub data: RowData,
    pub error: String,
}

/// 成绩对账汇总
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReconcileSummary {
    pub processed: usize,
    pub absent_marked: usize,
    pub unmapped: Vec<UnmappedRow>,
    pub errors: Vec<RowError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<i64>,
}

impl ReconcileSummary {
    const UNMAPPED_PREVIEW: usize = 10;

    /// 生成面向用户的计数摘要
    pub fn message(&self, include_absent: bool) -> String {
        let mut parts = vec![format!("Processed {} students.", self.processed)];

        if !self.unmapped.is_empty() {
            let preview: Vec<&str> = self
                .unmapped
                .iter()
                .take(Self::UNMAPPED_PREVIEW)
                .map(|u| {
                    u.roll_number
                        .as_deref()
                        .or(u.roll_number_original.as_deref())
                        .unwrap_or("N/A")
                })
                .collect();
            parts.push(format!(
                "{} students could not be matched.",
                self.unmapped.len()
            ));
            if self.unmapped.len() <= Self::UNMAPPED_PREVIEW {
                parts.push(format!("Unmapped roll numbers: {}", preview.join(", ")));
            } else {
                parts.push(format!("First 10 unmapped: {}...", preview.join(", ")));
            }
        }

        if !self.errors.is_empty() {
            parts.push(format!(
                "{} errors occurred during processing.",
                self.errors.len()
            ));
        }

        if include_absent && self.absent_marked > 0 {
            parts.push(format!("{} absent students marked.", self.absent_marked));
        }

        parts.join(" ")
    }
}

/// 学生名册导入汇总
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RosterSummary {
    pub created: usize,
    pub updated: usize,
    pub assigned: usize,
    pub errors: Vec<RowError>,
}

impl RosterSummary {
    pub fn message(&self) -> String {
        let mut message = format!(
            "Created {} students, updated {} students.",
            self.created, self.updated
        );
        if self.assigned > 0 {
            message.push_str(&format!(" Assigned {} students to class.", self.assigned));
        }
        if !self.errors.is_empty() {
            message.push_str(&format!(
                " {} errors occurred during processing.",
                self.errors.len()
            ));
        }
        message
    }
}

/// 表头识别响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetHeadersResponse {
    pub headers: Vec<String>,
}

/// 任务已受理响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAcceptedResponse {
    pub job_id: String,
    pub kind: UploadJobKind,
    pub status: UploadJobStatus,
}

/// 快速上传响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickUploadResponse {
    #[serde(flatten)]
    pub summary: ReconcileSummary,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unmapped(roll: &str) -> UnmappedRow {
        UnmappedRow {
            row: 1,
            roll_number: Some(roll.to_string()),
            roll_number_original: Some(roll.to_string()),
            data: RowData::new(),
        }
    }

    #[test]
    fn test_message_lists_all_unmapped_when_few() {
        let summary = ReconcileSummary {
            processed: 3,
            absent_marked: 2,
            unmapped: vec![unmapped("901"), unmapped("902")],
            ..Default::default()
        };
        assert_eq!(
            summary.message(true),
            "Processed 3 students. 2 students could not be matched. \
             Unmapped roll numbers: 901, 902 2 absent students marked."
        );
        assert!(!summary.message(false).contains("absent"));
    }

    #[test]
    fn test_message_truncates_unmapped_preview() {
        let summary = ReconcileSummary {
            processed: 0,
            unmapped: (0..12).map(|i| unmapped(&format!("R{i}"))).collect(),
            errors: vec![RowError {
                row: 4,
                data: RowData::new(),
                error: "boom".to_string(),
            }],
            ..Default::default()
        };
        let message = summary.message(false);
        assert!(message.contains("12 students could not be matched."));
        assert!(message.contains("First 10 unmapped: R0, R1"));
        assert!(message.contains("R9..."));
        assert!(!message.contains("R10"));
        assert!(message.ends_with("1 errors occurred during processing."));
    }

    #[test]
    fn test_exam_id_only_serialized_when_set() {
        let json = serde_json::to_value(ReconcileSummary::default()).unwrap();
        assert!(json.get("exam_id").is_none());

        let json = serde_json::to_value(ReconcileSummary {
            exam_id: Some(7),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json["exam_id"], 7);
    }
}
