use serde::{Deserialize, Serialize};

// 考试
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub name: String,
    // YYYY-MM-DD
    pub exam_date: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 科目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}
