use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::entity::students::{ActiveModel, Column, Entity as Students, Model};
use crate::errors::{ExamLedgerError, Result};
use crate::sheet::{FATHER_NAME_FIELD, NAME_FIELD, SheetRow};

/// 名册行对学生记录的影响
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterChange {
    Created,
    Updated,
}

/// 按全局学号创建或更新学生
///
/// 学号已存在时姓名总是覆盖，父亲姓名仅在非空时覆盖。
pub async fn upsert_student<C: ConnectionTrait>(
    conn: &C,
    row: &SheetRow,
    now: i64,
) -> Result<(Model, RosterChange)> {
    let name = row
        .get(NAME_FIELD)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ExamLedgerError::validation("Student name is required"))?;
    let father_name = row
        .get(FATHER_NAME_FIELD)
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let roll_number = row.roll_number();

    let existing = match roll_number {
        Some(roll) => {
            Students::find()
                .filter(Column::RollNumber.eq(roll))
                .one(conn)
                .await?
        }
        None => None,
    };

    match existing {
        Some(student) => {
            let mut model: ActiveModel = student.into();
            model.name = Set(name.to_string());
            if let Some(father_name) = father_name {
                model.father_name = Set(Some(father_name.to_string()));
            }
            model.updated_at = Set(now);
            Ok((model.update(conn).await?, RosterChange::Updated))
        }
        None => {
            let student = ActiveModel {
                name: Set(name.to_string()),
                father_name: Set(father_name.map(str::to_string)),
                roll_number: Set(roll_number.map(str::to_string)),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            Ok((student, RosterChange::Created))
        }
    }
}
