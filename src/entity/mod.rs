//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! 对账流水线直接在事务连接上使用这些实体，然后转换为 models 中的业务实体。

pub mod class_exams;
pub mod class_students;
pub mod classes;
pub mod exam_results;
pub mod exam_subject_marks;
pub mod exam_subjects;
pub mod exams;
pub mod students;
pub mod subjects;
