//! 成绩对账流水线
//!
//! 规范化后的行 → 科目列解析（每批一次）→ 逐行身份解析与成绩写入 → 缺考补全。
//! 整批在一个事务内执行，每行在自己的保存点内执行：行级失败只回滚本行并记录，
//! 批次级失败回滚整批并向上返回。

pub mod absentees;
pub mod batch;
pub mod enrollment;
pub mod identity;
pub mod results;
pub mod roster;
pub mod subjects;

pub use batch::{ExamResultBatch, QuickUploadBatch, RosterBatch};
pub use identity::{IdentityResolver, StudentLookup};
pub use subjects::SubjectColumns;

use crate::models::results::entities::ResultStatus;
use crate::models::uploads::responses::{RowError, UnmappedRow};

/// 单行处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// 已写入成绩
    Processed {
        class_student_id: i64,
        status: ResultStatus,
    },
    /// 学号无法匹配到学生
    Unmapped(UnmappedRow),
    /// 行内出错，已回滚本行
    Failed(RowError),
}

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 解析单科分数；非数字视为未记录。0 与负数是有效分数。
pub fn parse_mark(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// 由已记录的分数计算 (总分, 平均分)
pub fn total_and_average(marks: &[f64]) -> (f64, f64) {
    if marks.is_empty() {
        return (0.0, 0.0);
    }
    let total: f64 = marks.iter().sum();
    (round2(total), round2(total / marks.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mark() {
        assert_eq!(parse_mark(Some("80")), Some(80.0));
        assert_eq!(parse_mark(Some(" 72.5 ")), Some(72.5));
        assert_eq!(parse_mark(Some("0")), Some(0.0));
        assert_eq!(parse_mark(Some("-4")), Some(-4.0));
        assert_eq!(parse_mark(Some("AB")), None);
        assert_eq!(parse_mark(Some("")), None);
        assert_eq!(parse_mark(Some("NaN")), None);
        assert_eq!(parse_mark(None), None);
    }

    #[test]
    fn test_total_and_average() {
        assert_eq!(total_and_average(&[80.0, 70.0]), (150.0, 75.0));
        assert_eq!(total_and_average(&[0.0, 10.0]), (10.0, 5.0));
        assert_eq!(total_and_average(&[]), (0.0, 0.0));
        assert_eq!(total_and_average(&[10.0, 10.0, 11.0]).1, 10.33);
        assert_eq!(total_and_average(&[-5.0, 5.0]), (0.0, 0.0));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666), 66.67);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }
}
