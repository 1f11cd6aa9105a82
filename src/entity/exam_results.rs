//! 考试成绩实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exam_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exam_id: i64,
    pub class_student_id: i64,
    pub total: f64,
    pub average: f64,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exams::Entity",
        from = "Column::ExamId",
        to = "super::exams::Column::Id"
    )]
    Exam,
    #[sea_orm(
        belongs_to = "super::class_students::Entity",
        from = "Column::ClassStudentId",
        to = "super::class_students::Column::Id"
    )]
    ClassStudent,
    #[sea_orm(has_many = "super::exam_subject_marks::Entity")]
    SubjectMarks,
}

impl Related<super::exams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::class_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassStudent.def()
    }
}

impl Related<super::exam_subject_marks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubjectMarks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_exam_result(
        self,
        member: &super::class_students::Model,
        marks: Vec<crate::models::results::entities::SubjectMark>,
    ) -> crate::models::results::entities::ExamResult {
        use crate::models::results::entities::{ExamResult, ResultStatus};

        ExamResult {
            id: self.id,
            exam_id: self.exam_id,
            class_student_id: self.class_student_id,
            student_id: member.student_id,
            roll_number: member.roll_number.clone(),
            total: self.total,
            average: self.average,
            status: self
                .status
                .parse::<ResultStatus>()
                .unwrap_or(ResultStatus::Present),
            marks,
        }
    }
}
