use serde::{Deserialize, Serialize};

// 成绩状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Present, // 出席
    Absent,  // 缺考
}

impl ResultStatus {
    pub const PRESENT: &'static str = "present";
    pub const ABSENT: &'static str = "absent";

    /// 本行至少有一个科目有分数即视为出席
    pub fn from_recorded_marks(recorded: usize) -> Self {
        if recorded > 0 {
            ResultStatus::Present
        } else {
            ResultStatus::Absent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Present => Self::PRESENT,
            ResultStatus::Absent => Self::ABSENT,
        }
    }
}

impl<'de> Deserialize<'de> for ResultStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的成绩状态: '{s}'. 支持的状态: present, absent"
            ))
        })
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResultStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::PRESENT => Ok(ResultStatus::Present),
            Self::ABSENT => Ok(ResultStatus::Absent),
            _ => Err(format!("Invalid result status: {s}")),
        }
    }
}

// 单科成绩，marks 为 None 表示该科目没有记录分数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectMark {
    pub subject_id: i64,
    pub marks: Option<f64>,
}

// 考试成绩：每个考试每条学籍一条
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: i64,
    pub exam_id: i64,
    pub class_student_id: i64,
    pub student_id: i64,
    pub roll_number: String,
    pub total: f64,
    pub average: f64,
    pub status: ResultStatus,
    pub marks: Vec<SubjectMark>,
}

impl ExamResult {
    pub fn mark_for(&self, subject_id: i64) -> Option<f64> {
        self.marks
            .iter()
            .find(|m| m.subject_id == subject_id)
            .and_then(|m| m.marks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_str() {
        assert_eq!("absent".parse::<ResultStatus>(), Ok(ResultStatus::Absent));
        assert_eq!(ResultStatus::Present.to_string(), "present");
        assert!("late".parse::<ResultStatus>().is_err());
    }

    #[test]
    fn test_status_from_recorded_marks() {
        assert_eq!(ResultStatus::from_recorded_marks(0), ResultStatus::Absent);
        assert_eq!(ResultStatus::from_recorded_marks(2), ResultStatus::Present);
    }
}
