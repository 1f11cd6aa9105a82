use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::class_students::{ActiveModel, Column, Entity as ClassStudents, Model};
use crate::errors::{ExamLedgerError, Result};

/// 把学生放入指定班级并设为唯一激活学籍
///
/// 已有该班级学籍则复用：更新学号并重新激活；否则新建。
/// 学生在其他班级的激活学籍全部停用。学号已被同班其他学生占用时返回错误。
pub async fn activate_membership<C: ConnectionTrait>(
    conn: &C,
    student_id: i64,
    class_id: i64,
    roll_number: &str,
    now: i64,
) -> Result<Model> {
    let holder = ClassStudents::find()
        .filter(Column::ClassId.eq(class_id))
        .filter(Column::RollNumber.eq(roll_number))
        .one(conn)
        .await?;

    if let Some(holder) = &holder
        && holder.student_id != student_id
    {
        return Err(ExamLedgerError::validation(format!(
            "Roll number {roll_number} is already taken in class {class_id}"
        )));
    }

    let existing = match holder {
        Some(holder) => Some(holder),
        None => {
            ClassStudents::find()
                .filter(Column::StudentId.eq(student_id))
                .filter(Column::ClassId.eq(class_id))
                .order_by_desc(Column::IsActive)
                .order_by_asc(Column::Id)
                .one(conn)
                .await?
        }
    };

    // 停用其他激活学籍
    let mut deactivate = ClassStudents::update_many()
        .col_expr(Column::IsActive, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::StudentId.eq(student_id))
        .filter(Column::IsActive.eq(true));
    if let Some(existing) = &existing {
        deactivate = deactivate.filter(Column::Id.ne(existing.id));
    }
    deactivate.exec(conn).await?;

    let membership = match existing {
        Some(existing) => {
            if existing.is_active && existing.roll_number == roll_number {
                existing
            } else {
                let mut model: ActiveModel = existing.into();
                model.roll_number = Set(roll_number.to_string());
                model.is_active = Set(true);
                model.updated_at = Set(now);
                model.update(conn).await?
            }
        }
        None => {
            ActiveModel {
                student_id: Set(student_id),
                class_id: Set(class_id),
                roll_number: Set(roll_number.to_string()),
                is_active: Set(true),
                joined_at: Set(Some(now)),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await?
        }
    };

    Ok(membership)
}
