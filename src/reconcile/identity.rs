use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::debug;

use super::enrollment::activate_membership;
use crate::entity::class_students::{
    Column as MemberColumn, Entity as ClassStudents, Model as MemberModel,
};
use crate::entity::students::{
    ActiveModel as StudentActiveModel, Column as StudentColumn, Entity as Students,
    Model as StudentModel,
};
use crate::errors::Result;
use crate::sheet::{NAME_FIELD, SheetRow};
use crate::utils::escape_like_pattern;

/// 一行中用于身份识别的信息
#[derive(Debug, Clone, Copy)]
pub struct IdentityQuery<'a> {
    /// 去除全部空白后的学号
    pub roll_number: &'a str,
    /// 仅去首尾空白的学号原文
    pub raw_roll_number: Option<&'a str>,
    pub name: Option<&'a str>,
}

impl<'a> IdentityQuery<'a> {
    pub fn from_row(row: &'a SheetRow) -> Option<Self> {
        Some(Self {
            roll_number: row.roll_number()?,
            raw_roll_number: row.raw_roll_number.as_deref(),
            name: row.get(NAME_FIELD),
        })
    }
}

/// 全局查找学生的策略，按顺序尝试，命中即停
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentLookup {
    /// 学生全局学号精确匹配
    GlobalRoll,
    /// 用原文再精确匹配一次（数字/文本存储差异）
    RawRoll,
    /// 学生全局学号包含匹配
    PartialRoll,
    /// 激活学籍的班级学号精确或包含匹配
    MembershipRoll,
    /// 姓名包含匹配
    NameMatch,
}

impl StudentLookup {
    pub const CASCADE: [StudentLookup; 5] = [
        StudentLookup::GlobalRoll,
        StudentLookup::RawRoll,
        StudentLookup::PartialRoll,
        StudentLookup::MembershipRoll,
        StudentLookup::NameMatch,
    ];

    pub async fn find<C: ConnectionTrait>(
        &self,
        conn: &C,
        query: &IdentityQuery<'_>,
    ) -> Result<Option<StudentModel>> {
        match self {
            StudentLookup::GlobalRoll => by_roll_number(conn, query.roll_number).await,
            StudentLookup::RawRoll => match query.raw_roll_number {
                Some(raw) if raw != query.roll_number => by_roll_number(conn, raw).await,
                _ => Ok(None),
            },
            StudentLookup::PartialRoll => {
                Ok(Students::find()
                    .filter(StudentColumn::RollNumber.like(contains_pattern(query.roll_number)))
                    .order_by_asc(StudentColumn::Id)
                    .one(conn)
                    .await?)
            }
            StudentLookup::MembershipRoll => {
                let mut roll_match = Condition::any()
                    .add(MemberColumn::RollNumber.eq(query.roll_number))
                    .add(MemberColumn::RollNumber.like(contains_pattern(query.roll_number)));
                if let Some(raw) = query.raw_roll_number {
                    roll_match = roll_match.add(MemberColumn::RollNumber.eq(raw));
                }

                let member = ClassStudents::find()
                    .filter(MemberColumn::IsActive.eq(true))
                    .filter(roll_match)
                    .order_by_asc(MemberColumn::Id)
                    .one(conn)
                    .await?;

                match member {
                    Some(member) => Ok(Students::find_by_id(member.student_id).one(conn).await?),
                    None => Ok(None),
                }
            }
            StudentLookup::NameMatch => match query.name.map(str::trim).filter(|n| !n.is_empty()) {
                Some(name) => Ok(Students::find()
                    .filter(StudentColumn::Name.like(contains_pattern(name)))
                    .order_by_asc(StudentColumn::Id)
                    .one(conn)
                    .await?),
                None => Ok(None),
            },
        }
    }
}

async fn by_roll_number<C: ConnectionTrait>(
    conn: &C,
    roll_number: &str,
) -> Result<Option<StudentModel>> {
    Ok(Students::find()
        .filter(StudentColumn::RollNumber.eq(roll_number))
        .one(conn)
        .await?)
}

fn contains_pattern(value: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like_pattern(value))).escape('\\')
}

/// 学号 → 学籍 的解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityResolver {
    /// 已知班级：只在该班级的激活学籍中精确匹配
    ClassScoped { class_id: i64 },
    /// 未指定班级：全局查找学生，再归入默认班级
    Open { default_class_id: i64 },
}

impl IdentityResolver {
    /// 返回 None 表示无法匹配
    pub async fn resolve<C: ConnectionTrait>(
        &self,
        conn: &C,
        query: &IdentityQuery<'_>,
        now: i64,
    ) -> Result<Option<MemberModel>> {
        match self {
            IdentityResolver::ClassScoped { class_id } => Ok(ClassStudents::find()
                .filter(MemberColumn::ClassId.eq(*class_id))
                .filter(MemberColumn::RollNumber.eq(query.roll_number))
                .filter(MemberColumn::IsActive.eq(true))
                .one(conn)
                .await?),
            IdentityResolver::Open { default_class_id } => {
                let Some(student) = find_student(conn, query).await? else {
                    return Ok(None);
                };
                let student = backfill_roll_number(conn, student, query.roll_number, now).await?;
                let member =
                    activate_membership(conn, student.id, *default_class_id, query.roll_number, now)
                        .await?;
                Ok(Some(member))
            }
        }
    }
}

/// 依次尝试全部查找策略
pub async fn find_student<C: ConnectionTrait>(
    conn: &C,
    query: &IdentityQuery<'_>,
) -> Result<Option<StudentModel>> {
    for lookup in StudentLookup::CASCADE {
        if let Some(student) = lookup.find(conn, query).await? {
            debug!(
                "Roll number {} matched student {} via {:?}",
                query.roll_number, student.id, lookup
            );
            return Ok(Some(student));
        }
    }
    Ok(None)
}

async fn backfill_roll_number<C: ConnectionTrait>(
    conn: &C,
    student: StudentModel,
    roll_number: &str,
    now: i64,
) -> Result<StudentModel> {
    if student.roll_number.is_some() {
        return Ok(student);
    }
    let mut model: StudentActiveModel = student.into();
    model.roll_number = Set(Some(roll_number.to_string()));
    model.updated_at = Set(now);
    Ok(model.update(conn).await?)
}
