//! 班级存储操作

use super::SeaOrmStorage;
use crate::entity::classes::{ActiveModel, Column, Entity as Classes, Model};
use crate::errors::{ExamLedgerError, Result};
use crate::models::classes::entities::AcademicClass;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 创建班级
    pub async fn create_class_impl(&self, name: &str) -> Result<AcademicClass> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ExamLedgerError::validation("Class name must not be empty"));
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("创建班级失败: {e}")))?;

        Ok(result.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<AcademicClass>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 通过名称获取班级
    pub async fn get_class_by_name_impl(&self, name: &str) -> Result<Option<AcademicClass>> {
        let result = Classes::find()
            .filter(Column::Name.eq(name.trim()))
            .one(&self.db)
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }
}

/// 按名称查找或创建班级（在调用方的事务内）
pub(super) async fn find_or_create_class<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    now: i64,
) -> Result<Model> {
    if let Some(existing) = Classes::find()
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
