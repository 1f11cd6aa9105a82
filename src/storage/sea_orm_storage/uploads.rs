//! 上传对账：每次上传一个事务

use super::SeaOrmStorage;
use super::classes::find_or_create_class;
use super::exams::{attach_class, attach_subject, class_in_exam, exam_subjects, insert_exam};
use super::subjects::all_subjects;
use crate::entity::classes::Entity as Classes;
use crate::entity::exams::Entity as Exams;
use crate::errors::{ExamLedgerError, Result};
use crate::models::exams::requests::NewExam;
use crate::models::uploads::responses::{ReconcileSummary, RosterSummary};
use crate::reconcile::{ExamResultBatch, QuickUploadBatch, RosterBatch, SubjectColumns};
use crate::sheet::{ColumnMapping, SheetRow};
use sea_orm::{DatabaseTransaction, EntityTrait, TransactionTrait};
use tracing::error;

impl SeaOrmStorage {
    /// 已知班级的成绩上传
    pub async fn process_exam_results_impl(
        &self,
        exam_id: i64,
        class_id: i64,
        rows: &[SheetRow],
        mapping: &ColumnMapping,
    ) -> Result<ReconcileSummary> {
        mapping.validate()?;

        let txn = self.db.begin().await?;
        let outcome = reconcile_exam_results(&txn, exam_id, class_id, rows, mapping).await;
        finish(txn, outcome, "exam result upload").await
    }

    /// 快速上传：创建考试、归入默认班级、全局匹配学生
    pub async fn process_quick_upload_impl(
        &self,
        exam: NewExam,
        rows: &[SheetRow],
        mapping: &ColumnMapping,
        default_class_name: &str,
    ) -> Result<ReconcileSummary> {
        let exam = exam.validated()?;
        mapping.validate()?;

        let txn = self.db.begin().await?;
        let outcome = reconcile_quick_upload(&txn, &exam, rows, mapping, default_class_name).await;
        finish(txn, outcome, "quick upload").await
    }

    /// 学生名册导入
    pub async fn process_student_roster_impl(
        &self,
        rows: &[SheetRow],
        class_id: Option<i64>,
    ) -> Result<RosterSummary> {
        let txn = self.db.begin().await?;
        let outcome = import_roster(&txn, rows, class_id).await;
        finish(txn, outcome, "student roster upload").await
    }
}

/// 成功提交，失败回滚整批
async fn finish<T>(txn: DatabaseTransaction, outcome: Result<T>, what: &str) -> Result<T> {
    match outcome {
        Ok(value) => {
            txn.commit()
                .await
                .map_err(|e| ExamLedgerError::database_operation(format!("提交事务失败: {e}")))?;
            Ok(value)
        }
        Err(e) => {
            error!("{} rolled back: {}", what, e);
            if let Err(rollback) = txn.rollback().await {
                error!("回滚事务失败: {}", rollback);
            }
            Err(e)
        }
    }
}

async fn reconcile_exam_results(
    txn: &DatabaseTransaction,
    exam_id: i64,
    class_id: i64,
    rows: &[SheetRow],
    mapping: &ColumnMapping,
) -> Result<ReconcileSummary> {
    if Exams::find_by_id(exam_id).one(txn).await?.is_none() {
        return Err(ExamLedgerError::not_found(format!("Exam {exam_id} not found")));
    }
    if Classes::find_by_id(class_id).one(txn).await?.is_none() {
        return Err(ExamLedgerError::not_found(format!("Class {class_id} not found")));
    }
    if !class_in_exam(txn, exam_id, class_id).await? {
        return Err(ExamLedgerError::validation(format!(
            "Class {class_id} is not assigned to exam {exam_id}"
        )));
    }

    let subjects = exam_subjects(txn, exam_id).await?;
    if subjects.is_empty() {
        return Err(ExamLedgerError::exam_has_no_subjects(format!(
            "Exam {exam_id} has no subjects. Please add subjects to the exam first."
        )));
    }

    let columns = SubjectColumns::resolve(&subjects, mapping)?;
    let batch = ExamResultBatch {
        exam_id,
        class_id,
        columns,
        exam_subject_ids: subjects.iter().map(|s| s.id).collect(),
    };
    batch.run(txn, rows).await
}

async fn reconcile_quick_upload(
    txn: &DatabaseTransaction,
    exam: &NewExam,
    rows: &[SheetRow],
    mapping: &ColumnMapping,
    default_class_name: &str,
) -> Result<ReconcileSummary> {
    let now = chrono::Utc::now().timestamp();

    let subjects = all_subjects(txn).await?;
    let columns = SubjectColumns::resolve(&subjects, mapping)?;

    let default_class = find_or_create_class(txn, default_class_name, now).await?;
    let exam = insert_exam(txn, exam, now).await?;
    attach_class(txn, exam.id, default_class.id, now).await?;
    for subject in columns.subjects() {
        attach_subject(txn, exam.id, subject.id).await?;
    }

    let batch = QuickUploadBatch {
        exam_id: exam.id,
        default_class_id: default_class.id,
        columns,
    };
    batch.run(txn, rows).await
}

async fn import_roster(
    txn: &DatabaseTransaction,
    rows: &[SheetRow],
    class_id: Option<i64>,
) -> Result<RosterSummary> {
    if let Some(class_id) = class_id
        && Classes::find_by_id(class_id).one(txn).await?.is_none()
    {
        return Err(ExamLedgerError::not_found(format!("Class {class_id} not found")));
    }

    RosterBatch { class_id }.run(txn, rows).await
}
