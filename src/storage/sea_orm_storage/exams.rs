//! 考试存储操作

use super::SeaOrmStorage;
use crate::entity::class_exams::{
    ActiveModel as ClassExamActiveModel, Column as ClassExamColumn, Entity as ClassExams,
};
use crate::entity::exam_subjects::{
    ActiveModel as ExamSubjectActiveModel, Column as ExamSubjectColumn, Entity as ExamSubjects,
};
use crate::entity::exams::{ActiveModel, Entity as Exams, Model};
use crate::entity::subjects::{Column as SubjectColumn, Entity as Subjects};
use crate::errors::{ExamLedgerError, Result};
use crate::models::exams::{
    entities::{Exam, Subject},
    requests::NewExam,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建考试并关联班级与科目
    pub async fn create_exam_impl(
        &self,
        exam: NewExam,
        class_ids: &[i64],
        subject_ids: &[i64],
    ) -> Result<Exam> {
        let exam = exam.validated()?;
        let now = chrono::Utc::now().timestamp();

        let txn = self.db.begin().await?;
        let model = insert_exam(&txn, &exam, now).await?;
        for class_id in class_ids {
            attach_class(&txn, model.id, *class_id, now).await?;
        }
        for subject_id in subject_ids {
            attach_subject(&txn, model.id, *subject_id).await?;
        }
        txn.commit()
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("创建考试失败: {e}")))?;

        Ok(model.into_exam())
    }

    /// 通过 ID 获取考试
    pub async fn get_exam_by_id_impl(&self, exam_id: i64) -> Result<Option<Exam>> {
        let result = Exams::find_by_id(exam_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("查询考试失败: {e}")))?;

        Ok(result.map(|m| m.into_exam()))
    }

    /// 列出考试科目
    pub async fn list_exam_subjects_impl(&self, exam_id: i64) -> Result<Vec<Subject>> {
        exam_subjects(&self.db, exam_id).await
    }
}

pub(super) async fn insert_exam<C: ConnectionTrait>(
    conn: &C,
    exam: &NewExam,
    now: i64,
) -> Result<Model> {
    Ok(ActiveModel {
        name: Set(exam.name.clone()),
        exam_date: Set(exam.exam_date.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}

/// 关联班级（已关联则跳过）
pub(super) async fn attach_class<C: ConnectionTrait>(
    conn: &C,
    exam_id: i64,
    class_id: i64,
    now: i64,
) -> Result<()> {
    if class_in_exam(conn, exam_id, class_id).await? {
        return Ok(());
    }
    ClassExamActiveModel {
        exam_id: Set(exam_id),
        class_id: Set(class_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// 关联科目（已关联则跳过）
pub(super) async fn attach_subject<C: ConnectionTrait>(
    conn: &C,
    exam_id: i64,
    subject_id: i64,
) -> Result<()> {
    let exists = ExamSubjects::find()
        .filter(ExamSubjectColumn::ExamId.eq(exam_id))
        .filter(ExamSubjectColumn::SubjectId.eq(subject_id))
        .count(conn)
        .await?
        > 0;
    if exists {
        return Ok(());
    }
    ExamSubjectActiveModel {
        exam_id: Set(exam_id),
        subject_id: Set(subject_id),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

pub(super) async fn class_in_exam<C: ConnectionTrait>(
    conn: &C,
    exam_id: i64,
    class_id: i64,
) -> Result<bool> {
    let count = ClassExams::find()
        .filter(ClassExamColumn::ExamId.eq(exam_id))
        .filter(ClassExamColumn::ClassId.eq(class_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// 考试关联的科目，按科目 ID 排序
pub(super) async fn exam_subjects<C: ConnectionTrait>(
    conn: &C,
    exam_id: i64,
) -> Result<Vec<Subject>> {
    let subject_ids: Vec<i64> = ExamSubjects::find()
        .select_only()
        .column(ExamSubjectColumn::SubjectId)
        .filter(ExamSubjectColumn::ExamId.eq(exam_id))
        .into_tuple()
        .all(conn)
        .await?;

    if subject_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(Subjects::find()
        .filter(SubjectColumn::Id.is_in(subject_ids))
        .order_by_asc(SubjectColumn::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(|m| m.into_subject())
        .collect())
}
