//! 成绩查询

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::class_students::{Column as MemberColumn, Entity as ClassStudents};
use crate::entity::exam_results::{Column, Entity as ExamResults};
use crate::entity::exam_subject_marks::{Column as MarkColumn, Entity as ExamSubjectMarks};
use crate::errors::{ExamLedgerError, Result};
use crate::models::results::entities::{ExamResult, SubjectMark};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    /// 列出考试全部成绩，附带学号与单科分数
    pub async fn list_exam_results_impl(&self, exam_id: i64) -> Result<Vec<ExamResult>> {
        let results = ExamResults::find()
            .filter(Column::ExamId.eq(exam_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("查询成绩失败: {e}")))?;

        if results.is_empty() {
            return Ok(Vec::new());
        }

        let member_ids: Vec<i64> = results.iter().map(|r| r.class_student_id).collect();
        let result_ids: Vec<i64> = results.iter().map(|r| r.id).collect();

        let members: HashMap<i64, _> = ClassStudents::find()
            .filter(MemberColumn::Id.is_in(member_ids))
            .all(&self.db)
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("查询学籍失败: {e}")))?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut marks: HashMap<i64, Vec<SubjectMark>> = HashMap::new();
        for mark in ExamSubjectMarks::find()
            .filter(MarkColumn::ExamResultId.is_in(result_ids))
            .order_by_asc(MarkColumn::SubjectId)
            .all(&self.db)
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("查询科目成绩失败: {e}")))?
        {
            marks
                .entry(mark.exam_result_id)
                .or_default()
                .push(mark.into_subject_mark());
        }

        let mut items = Vec::with_capacity(results.len());
        for result in results {
            let Some(member) = members.get(&result.class_student_id) else {
                continue;
            };
            let result_marks = marks.remove(&result.id).unwrap_or_default();
            items.push(result.into_exam_result(member, result_marks));
        }

        Ok(items)
    }
}
