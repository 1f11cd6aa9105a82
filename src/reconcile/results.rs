use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};

use super::subjects::SubjectColumns;
use super::{parse_mark, total_and_average};
use crate::entity::exam_results::{
    ActiveModel as ResultActiveModel, Column as ResultColumn, Entity as ExamResults,
    Model as ResultModel,
};
use crate::entity::exam_subject_marks::{
    ActiveModel as MarkActiveModel, Column as MarkColumn, Entity as ExamSubjectMarks,
};
use crate::errors::Result;
use crate::models::results::entities::ResultStatus;
use crate::sheet::SheetRow;

/// 查找或创建 (考试, 学籍) 成绩，新建时为 present、总分平均分为 0
pub async fn find_or_create_result<C: ConnectionTrait>(
    conn: &C,
    exam_id: i64,
    class_student_id: i64,
    now: i64,
) -> Result<ResultModel> {
    if let Some(existing) = find_result(conn, exam_id, class_student_id).await? {
        return Ok(existing);
    }

    Ok(ResultActiveModel {
        exam_id: Set(exam_id),
        class_student_id: Set(class_student_id),
        total: Set(0.0),
        average: Set(0.0),
        status: Set(ResultStatus::Present.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}

pub async fn find_result<C: ConnectionTrait>(
    conn: &C,
    exam_id: i64,
    class_student_id: i64,
) -> Result<Option<ResultModel>> {
    Ok(ExamResults::find()
        .filter(ResultColumn::ExamId.eq(exam_id))
        .filter(ResultColumn::ClassStudentId.eq(class_student_id))
        .one(conn)
        .await?)
}

/// 按 (成绩, 科目) 写入单科分数，已存在则覆盖
pub async fn upsert_subject_mark<C: ConnectionTrait>(
    conn: &C,
    exam_result_id: i64,
    subject_id: i64,
    marks: Option<f64>,
    now: i64,
) -> Result<()> {
    let existing = ExamSubjectMarks::find()
        .filter(MarkColumn::ExamResultId.eq(exam_result_id))
        .filter(MarkColumn::SubjectId.eq(subject_id))
        .one(conn)
        .await?;

    match existing {
        Some(existing) => {
            let mut model: MarkActiveModel = existing.into();
            model.marks = Set(marks);
            model.updated_at = Set(now);
            model.update(conn).await?;
        }
        None => {
            MarkActiveModel {
                exam_result_id: Set(exam_result_id),
                subject_id: Set(subject_id),
                marks: Set(marks),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

/// 用库中全部非空分数重算总分与平均分
pub async fn recompute_totals<C: ConnectionTrait>(
    conn: &C,
    result: ResultModel,
    status: ResultStatus,
    now: i64,
) -> Result<ResultModel> {
    let marks: Vec<f64> = ExamSubjectMarks::find()
        .select_only()
        .column(MarkColumn::Marks)
        .filter(MarkColumn::ExamResultId.eq(result.id))
        .filter(MarkColumn::Marks.is_not_null())
        .into_tuple::<Option<f64>>()
        .all(conn)
        .await?
        .into_iter()
        .flatten()
        .collect();

    let (total, average) = total_and_average(&marks);

    let mut model: ResultActiveModel = result.into();
    model.total = Set(total);
    model.average = Set(average);
    model.status = Set(status.to_string());
    model.updated_at = Set(now);
    Ok(model.update(conn).await?)
}

/// 把一行的各科分数写入对应学籍的成绩
///
/// 本行至少有一科有分数则为 present，否则为 absent。
/// 多列对应同一科目时取第一个非空分数。
pub async fn apply_row_marks<C: ConnectionTrait>(
    conn: &C,
    exam_id: i64,
    class_student_id: i64,
    row: &SheetRow,
    columns: &SubjectColumns,
    now: i64,
) -> Result<(ResultModel, ResultStatus)> {
    let result = find_or_create_result(conn, exam_id, class_student_id, now).await?;

    let marks = marks_per_subject(row, columns);
    let recorded = marks.iter().filter(|(_, m)| m.is_some()).count();
    for (subject_id, value) in marks {
        upsert_subject_mark(conn, result.id, subject_id, value, now).await?;
    }

    let status = ResultStatus::from_recorded_marks(recorded);
    let result = recompute_totals(conn, result, status, now).await?;
    Ok((result, status))
}

/// 科目 id → 分数，保持列顺序
fn marks_per_subject(row: &SheetRow, columns: &SubjectColumns) -> Vec<(i64, Option<f64>)> {
    let mut marks: Vec<(i64, Option<f64>)> = Vec::new();
    for (field, subject) in columns.iter() {
        let value = parse_mark(row.get(field));
        match marks.iter_mut().find(|(id, _)| *id == subject.id) {
            Some((_, existing)) => {
                if existing.is_none() {
                    *existing = value;
                }
            }
            None => marks.push((subject.id, value)),
        }
    }
    marks
}
