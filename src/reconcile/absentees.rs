use std::collections::HashSet;

use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::debug;

use super::results::{find_result, upsert_subject_mark};
use crate::entity::class_students::{Column as MemberColumn, Entity as ClassStudents};
use crate::entity::exam_results::ActiveModel as ResultActiveModel;
use crate::errors::Result;
use crate::models::results::entities::ResultStatus;

/// 为本批未出现、且还没有成绩的激活学籍补建缺考成绩
///
/// 每个考试科目写一条空分数。返回补建条数。
pub async fn mark_absentees<C: ConnectionTrait>(
    conn: &C,
    exam_id: i64,
    class_id: i64,
    seen: &HashSet<i64>,
    subject_ids: &[i64],
    now: i64,
) -> Result<usize> {
    let members = ClassStudents::find()
        .filter(MemberColumn::ClassId.eq(class_id))
        .filter(MemberColumn::IsActive.eq(true))
        .order_by_asc(MemberColumn::Id)
        .all(conn)
        .await?;

    let mut marked = 0;
    for member in members {
        if seen.contains(&member.id) {
            continue;
        }
        if find_result(conn, exam_id, member.id).await?.is_some() {
            continue;
        }

        let result = ResultActiveModel {
            exam_id: Set(exam_id),
            class_student_id: Set(member.id),
            total: Set(0.0),
            average: Set(0.0),
            status: Set(ResultStatus::Absent.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        for subject_id in subject_ids {
            upsert_subject_mark(conn, result.id, *subject_id, None, now).await?;
        }

        debug!(
            "Marked roll number {} absent for exam {}",
            member.roll_number, exam_id
        );
        marked += 1;
    }

    Ok(marked)
}
