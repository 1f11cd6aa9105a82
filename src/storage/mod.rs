use crate::errors::Result;
use crate::models::{
    classes::entities::{AcademicClass, ClassMembership},
    exams::{
        entities::{Exam, Subject},
        requests::NewExam,
    },
    results::entities::ExamResult,
    students::entities::{NewStudent, Student},
    uploads::responses::{ReconcileSummary, RosterSummary},
};
use crate::sheet::{ColumnMapping, SheetRow};

pub mod sea_orm_storage;

pub use sea_orm_storage::SeaOrmStorage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 班级管理方法
    // 创建班级
    async fn create_class(&self, name: &str) -> Result<AcademicClass>;
    // 通过ID获取班级信息
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<AcademicClass>>;
    // 通过名称获取班级信息
    async fn get_class_by_name(&self, name: &str) -> Result<Option<AcademicClass>>;

    /// 科目管理方法
    // 按名称查找或创建科目
    async fn ensure_subjects(&self, names: &[String]) -> Result<Vec<Subject>>;

    /// 考试管理方法
    // 创建考试并关联班级与科目
    async fn create_exam(
        &self,
        exam: NewExam,
        class_ids: &[i64],
        subject_ids: &[i64],
    ) -> Result<Exam>;
    // 通过ID获取考试信息
    async fn get_exam_by_id(&self, exam_id: i64) -> Result<Option<Exam>>;
    // 列出考试科目
    async fn list_exam_subjects(&self, exam_id: i64) -> Result<Vec<Subject>>;

    /// 学生管理方法
    // 创建学生
    async fn create_student(&self, student: NewStudent) -> Result<Student>;
    // 通过全局学号获取学生
    async fn get_student_by_roll_number(&self, roll_number: &str) -> Result<Option<Student>>;
    // 把学生分入班级（设为唯一激活学籍）
    async fn enroll_student(
        &self,
        student_id: i64,
        class_id: i64,
        roll_number: &str,
    ) -> Result<ClassMembership>;
    // 列出学生的全部学籍
    async fn list_student_memberships(&self, student_id: i64) -> Result<Vec<ClassMembership>>;

    /// 成绩查询方法
    // 列出考试全部成绩（含单科分数）
    async fn list_exam_results(&self, exam_id: i64) -> Result<Vec<ExamResult>>;

    /// 上传对账方法（整批一个事务）
    // 已知班级的成绩上传
    async fn process_exam_results(
        &self,
        exam_id: i64,
        class_id: i64,
        rows: &[SheetRow],
        mapping: &ColumnMapping,
    ) -> Result<ReconcileSummary>;
    // 快速上传：建考试并全局匹配学生
    async fn process_quick_upload(
        &self,
        exam: NewExam,
        rows: &[SheetRow],
        mapping: &ColumnMapping,
        default_class_name: &str,
    ) -> Result<ReconcileSummary>;
    // 学生名册导入
    async fn process_student_roster(
        &self,
        rows: &[SheetRow],
        class_id: Option<i64>,
    ) -> Result<RosterSummary>;
}
