use std::collections::HashSet;

use sea_orm::{DatabaseTransaction, TransactionTrait};
use tracing::{debug, info, warn};

use super::absentees::mark_absentees;
use super::enrollment::activate_membership;
use super::identity::{IdentityQuery, IdentityResolver};
use super::results::apply_row_marks;
use super::roster::{RosterChange, upsert_student};
use super::subjects::SubjectColumns;
use super::RowOutcome;
use crate::errors::Result;
use crate::models::uploads::responses::{ReconcileSummary, RosterSummary, RowError, UnmappedRow};
use crate::sheet::SheetRow;

/// 已知班级的成绩上传
#[derive(Debug, Clone)]
pub struct ExamResultBatch {
    pub exam_id: i64,
    pub class_id: i64,
    pub columns: SubjectColumns,
    /// 考试的全部科目，缺考补建时使用
    pub exam_subject_ids: Vec<i64>,
}

impl ExamResultBatch {
    pub async fn run(&self, txn: &DatabaseTransaction, rows: &[SheetRow]) -> Result<ReconcileSummary> {
        let now = chrono::Utc::now().timestamp();
        let resolver = IdentityResolver::ClassScoped {
            class_id: self.class_id,
        };

        let (mut summary, seen) =
            reconcile_rows(txn, self.exam_id, &resolver, &self.columns, rows, now).await?;

        summary.absent_marked = mark_absentees(
            txn,
            self.exam_id,
            self.class_id,
            &seen,
            &self.exam_subject_ids,
            now,
        )
        .await?;

        info!(
            "Exam {} class {} upload reconciled: processed={}, absent_marked={}, unmapped={}, errors={}",
            self.exam_id,
            self.class_id,
            summary.processed,
            summary.absent_marked,
            summary.unmapped.len(),
            summary.errors.len()
        );
        Ok(summary)
    }
}

/// 快速上传：全局匹配学生并归入默认班级，不做缺考补全
#[derive(Debug, Clone)]
pub struct QuickUploadBatch {
    pub exam_id: i64,
    pub default_class_id: i64,
    pub columns: SubjectColumns,
}

impl QuickUploadBatch {
    pub async fn run(&self, txn: &DatabaseTransaction, rows: &[SheetRow]) -> Result<ReconcileSummary> {
        let now = chrono::Utc::now().timestamp();
        let resolver = IdentityResolver::Open {
            default_class_id: self.default_class_id,
        };

        let (mut summary, _) =
            reconcile_rows(txn, self.exam_id, &resolver, &self.columns, rows, now).await?;
        summary.exam_id = Some(self.exam_id);

        info!(
            "Quick upload for exam {} reconciled: processed={}, unmapped={}, errors={}",
            self.exam_id,
            summary.processed,
            summary.unmapped.len(),
            summary.errors.len()
        );
        Ok(summary)
    }
}

/// 逐行对账，每行一个保存点；返回汇总与本批出现过的学籍
async fn reconcile_rows(
    txn: &DatabaseTransaction,
    exam_id: i64,
    resolver: &IdentityResolver,
    columns: &SubjectColumns,
    rows: &[SheetRow],
    now: i64,
) -> Result<(ReconcileSummary, HashSet<i64>)> {
    let mut summary = ReconcileSummary::default();
    let mut seen = HashSet::new();

    for row in rows {
        let savepoint = txn.begin().await?;
        let outcome = match reconcile_row(&savepoint, exam_id, resolver, columns, row, now).await {
            Ok(outcome) => {
                savepoint.commit().await?;
                outcome
            }
            Err(e) => {
                savepoint.rollback().await?;
                RowOutcome::Failed(RowError {
                    row: row.index,
                    data: row.fields.clone(),
                    error: e.message().to_string(),
                })
            }
        };

        match outcome {
            RowOutcome::Processed {
                class_student_id,
                status,
            } => {
                debug!("Row {}: class student {} marked {}", row.index, class_student_id, status);
                summary.processed += 1;
                seen.insert(class_student_id);
            }
            RowOutcome::Unmapped(unmapped) => {
                warn!(
                    "Row {}: roll number {:?} could not be matched",
                    unmapped.row, unmapped.roll_number
                );
                summary.unmapped.push(unmapped);
            }
            RowOutcome::Failed(error) => {
                warn!("Row {} failed: {}", error.row, error.error);
                summary.errors.push(error);
            }
        }
    }

    Ok((summary, seen))
}

async fn reconcile_row(
    conn: &DatabaseTransaction,
    exam_id: i64,
    resolver: &IdentityResolver,
    columns: &SubjectColumns,
    row: &SheetRow,
    now: i64,
) -> Result<RowOutcome> {
    let unmapped = || {
        RowOutcome::Unmapped(UnmappedRow {
            row: row.index,
            roll_number: row.roll_number().map(str::to_string),
            roll_number_original: row.raw_roll_number.clone(),
            data: row.fields.clone(),
        })
    };

    let Some(query) = IdentityQuery::from_row(row) else {
        return Ok(unmapped());
    };
    let Some(member) = resolver.resolve(conn, &query, now).await? else {
        return Ok(unmapped());
    };

    let (_, status) = apply_row_marks(conn, exam_id, member.id, row, columns, now).await?;

    Ok(RowOutcome::Processed {
        class_student_id: member.id,
        status,
    })
}

/// 学生名册导入，可选地把每个学生分入指定班级
#[derive(Debug, Clone, Copy)]
pub struct RosterBatch {
    pub class_id: Option<i64>,
}

impl RosterBatch {
    pub async fn run(&self, txn: &DatabaseTransaction, rows: &[SheetRow]) -> Result<RosterSummary> {
        let now = chrono::Utc::now().timestamp();
        let mut summary = RosterSummary::default();

        for row in rows {
            let savepoint = txn.begin().await?;
            match self.apply_row(&savepoint, row, now).await {
                Ok((change, assigned)) => {
                    savepoint.commit().await?;
                    match change {
                        RosterChange::Created => summary.created += 1,
                        RosterChange::Updated => summary.updated += 1,
                    }
                    if assigned {
                        summary.assigned += 1;
                    }
                }
                Err(e) => {
                    savepoint.rollback().await?;
                    warn!("Roster row {} failed: {}", row.index, e.message());
                    summary.errors.push(RowError {
                        row: row.index,
                        data: row.fields.clone(),
                        error: e.message().to_string(),
                    });
                }
            }
        }

        info!(
            "Student roster imported: created={}, updated={}, assigned={}, errors={}",
            summary.created,
            summary.updated,
            summary.assigned,
            summary.errors.len()
        );
        Ok(summary)
    }

    async fn apply_row(
        &self,
        conn: &DatabaseTransaction,
        row: &SheetRow,
        now: i64,
    ) -> Result<(RosterChange, bool)> {
        let (student, change) = upsert_student(conn, row, now).await?;

        let assigned = match (self.class_id, row.roll_number()) {
            (Some(class_id), Some(roll_number)) => {
                activate_membership(conn, student.id, class_id, roll_number, now).await?;
                true
            }
            _ => false,
        };

        Ok((change, assigned))
    }
}
