//! 科目成绩实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exam_subject_marks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exam_result_id: i64,
    pub subject_id: i64,
    // NULL 表示该科目没有记录分数
    pub marks: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exam_results::Entity",
        from = "Column::ExamResultId",
        to = "super::exam_results::Column::Id"
    )]
    ExamResult,
    #[sea_orm(
        belongs_to = "super::subjects::Entity",
        from = "Column::SubjectId",
        to = "super::subjects::Column::Id"
    )]
    Subject,
}

impl Related<super::exam_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExamResult.def()
    }
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_subject_mark(self) -> crate::models::results::entities::SubjectMark {
        crate::models::results::entities::SubjectMark {
            subject_id: self.subject_id,
            marks: self.marks,
        }
    }
}
