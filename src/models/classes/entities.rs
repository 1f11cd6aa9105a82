use serde::{Deserialize, Serialize};

// 班级
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicClass {
    // 班级ID
    pub id: i64,
    // 班级名称（全局唯一）
    pub name: String,
    // 创建时间
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 更新时间
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 学籍：学生在某个班级中的成员记录
//
// 同一学生可以有多条历史学籍，但同一时间最多只有一条处于激活状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassMembership {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    // 班级内学号，班级内唯一
    pub roll_number: String,
    pub is_active: bool,
    pub joined_at: Option<chrono::DateTime<chrono::Utc>>,
}
