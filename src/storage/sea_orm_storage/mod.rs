//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod classes;
mod exams;
mod results;
mod students;
mod subjects;
mod uploads;

use crate::config::DatabaseConfig;
use crate::errors::{ExamLedgerError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 连接数据库并运行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| ExamLedgerError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 使用已有连接（不运行迁移）
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ExamLedgerError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");
        if !in_memory {
            opt = opt
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("mmap_size", "536870912")
                .pragma("wal_autocheckpoint", "1000");
        }

        // 内存库每个连接各自独立，只能用单连接且不能回收
        let mut pool = SqlitePoolOptions::new()
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout));
        pool = if in_memory {
            pool.max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            pool.max_connections(config.pool_size)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool
            .connect_with(opt)
            .await
            .map_err(|e| ExamLedgerError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ExamLedgerError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ExamLedgerError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 班级模块
    async fn create_class(&self, name: &str) -> Result<AcademicClass> {
        self.create_class_impl(name).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<AcademicClass>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_by_name(&self, name: &str) -> Result<Option<AcademicClass>> {
        self.get_class_by_name_impl(name).await
    }

    // 科目模块
    async fn ensure_subjects(&self, names: &[String]) -> Result<Vec<Subject>> {
        self.ensure_subjects_impl(names).await
    }

    // 考试模块
    async fn create_exam(
        &self,
        exam: NewExam,
        class_ids: &[i64],
        subject_ids: &[i64],
    ) -> Result<Exam> {
        self.create_exam_impl(exam, class_ids, subject_ids).await
    }

    async fn get_exam_by_id(&self, exam_id: i64) -> Result<Option<Exam>> {
        self.get_exam_by_id_impl(exam_id).await
    }

    async fn list_exam_subjects(&self, exam_id: i64) -> Result<Vec<Subject>> {
        self.list_exam_subjects_impl(exam_id).await
    }

    // 学生模块
    async fn create_student(&self, student: NewStudent) -> Result<Student> {
        self.create_student_impl(student).await
    }

    async fn get_student_by_roll_number(&self, roll_number: &str) -> Result<Option<Student>> {
        self.get_student_by_roll_number_impl(roll_number).await
    }

    async fn enroll_student(
        &self,
        student_id: i64,
        class_id: i64,
        roll_number: &str,
    ) -> Result<ClassMembership> {
        self.enroll_student_impl(student_id, class_id, roll_number)
            .await
    }

    async fn list_student_memberships(&self, student_id: i64) -> Result<Vec<ClassMembership>> {
        self.list_student_memberships_impl(student_id).await
    }

    // 成绩模块
    async fn list_exam_results(&self, exam_id: i64) -> Result<Vec<ExamResult>> {
        self.list_exam_results_impl(exam_id).await
    }

    // 上传对账模块
    async fn process_exam_results(
        &self,
        exam_id: i64,
        class_id: i64,
        rows: &[SheetRow],
        mapping: &ColumnMapping,
    ) -> Result<ReconcileSummary> {
        self.process_exam_results_impl(exam_id, class_id, rows, mapping)
            .await
    }

    async fn process_quick_upload(
        &self,
        exam: NewExam,
        rows: &[SheetRow],
        mapping: &ColumnMapping,
        default_class_name: &str,
    ) -> Result<ReconcileSummary> {
        self.process_quick_upload_impl(exam, rows, mapping, default_class_name)
            .await
    }

    async fn process_student_roster(
        &self,
        rows: &[SheetRow],
        class_id: Option<i64>,
    ) -> Result<RosterSummary> {
        self.process_student_roster_impl(rows, class_id).await
    }
}
