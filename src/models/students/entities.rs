use serde::{Deserialize, Serialize};

// 学生
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    // 父亲/监护人姓名
    pub father_name: Option<String>,
    // 全局学号，存在时全系统唯一
    pub roll_number: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 创建学生请求（存储层使用）
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub father_name: Option<String>,
    pub roll_number: Option<String>,
}
