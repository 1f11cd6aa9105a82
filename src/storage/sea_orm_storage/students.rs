//! 学生与学籍存储操作

use super::SeaOrmStorage;
use crate::entity::class_students::{Column as MemberColumn, Entity as ClassStudents};
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::{ExamLedgerError, Result};
use crate::models::{
    classes::entities::ClassMembership,
    students::entities::{NewStudent, Student},
};
use crate::reconcile::enrollment::activate_membership;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建学生
    pub async fn create_student_impl(&self, student: NewStudent) -> Result<Student> {
        let name = student.name.trim();
        if name.is_empty() {
            return Err(ExamLedgerError::validation("Student name is required"));
        }

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            name: Set(name.to_string()),
            father_name: Set(student.father_name.filter(|f| !f.trim().is_empty())),
            roll_number: Set(student
                .roll_number
                .map(|r| r.split_whitespace().collect::<String>())
                .filter(|r| !r.is_empty())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("创建学生失败: {e}")))?;

        Ok(result.into_student())
    }

    /// 通过全局学号获取学生
    pub async fn get_student_by_roll_number_impl(
        &self,
        roll_number: &str,
    ) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::RollNumber.eq(roll_number))
            .one(&self.db)
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 分班：在事务内激活该班级学籍并停用其他学籍
    pub async fn enroll_student_impl(
        &self,
        student_id: i64,
        class_id: i64,
        roll_number: &str,
    ) -> Result<ClassMembership> {
        let roll_number: String = roll_number.split_whitespace().collect();
        if roll_number.is_empty() {
            return Err(ExamLedgerError::validation("Roll number is required"));
        }

        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;
        let member = activate_membership(&txn, student_id, class_id, &roll_number, now).await?;
        txn.commit().await?;

        Ok(member.into_membership())
    }

    /// 列出学生的全部学籍
    pub async fn list_student_memberships_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<ClassMembership>> {
        let members = ClassStudents::find()
            .filter(MemberColumn::StudentId.eq(student_id))
            .order_by_asc(MemberColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("查询学籍失败: {e}")))?;

        Ok(members.into_iter().map(|m| m.into_membership()).collect())
    }
}
