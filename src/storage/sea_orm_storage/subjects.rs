//! 科目存储操作

use super::SeaOrmStorage;
use crate::entity::subjects::{ActiveModel, Column, Entity as Subjects, Model};
use crate::errors::Result;
use crate::models::exams::entities::Subject;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 按名称查找或创建科目，保持传入顺序
    pub async fn ensure_subjects_impl(&self, names: &[String]) -> Result<Vec<Subject>> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().timestamp();

        let mut subjects = Vec::new();
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let subject = find_or_create_subject(&txn, name, now).await?;
            if !subjects.iter().any(|s: &Subject| s.id == subject.id) {
                subjects.push(subject.into_subject());
            }
        }

        txn.commit().await?;
        Ok(subjects)
    }
}

async fn find_or_create_subject<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    now: i64,
) -> Result<Model> {
    if let Some(existing) = Subjects::find()
        .filter(Column::Name.eq(name))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    Ok(ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}

/// 全部科目（在调用方的事务内）
pub(super) async fn all_subjects<C: ConnectionTrait>(conn: &C) -> Result<Vec<Subject>> {
    Ok(Subjects::find()
        .order_by_asc(Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(|m| m.into_subject())
        .collect())
}
