//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_ledger_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum ExamLedgerError {
            $($variant(String),)*
        }

        impl ExamLedgerError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ExamLedgerError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ExamLedgerError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ExamLedgerError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl ExamLedgerError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ExamLedgerError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_ledger_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    DateParse("E011", "Date Parse Error"),
    SheetParse("E014", "Sheet Parse Error"),
    ExamHasNoSubjects("E015", "Exam Has No Subjects"),
    SubjectMapping("E016", "Subject Mapping Error"),
    QueueClosed("E017", "Upload Queue Closed"),
}

impl ExamLedgerError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ExamLedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ExamLedgerError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ExamLedgerError {
    fn from(err: sea_orm::DbErr) -> Self {
        ExamLedgerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ExamLedgerError {
    fn from(err: std::io::Error) -> Self {
        ExamLedgerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ExamLedgerError {
    fn from(err: serde_json::Error) -> Self {
        ExamLedgerError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for ExamLedgerError {
    fn from(err: chrono::ParseError) -> Self {
        ExamLedgerError::DateParse(err.to_string())
    }
}

impl From<calamine::Error> for ExamLedgerError {
    fn from(err: calamine::Error) -> Self {
        ExamLedgerError::SheetParse(err.to_string())
    }
}

impl From<csv::Error> for ExamLedgerError {
    fn from(err: csv::Error) -> Self {
        ExamLedgerError::SheetParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExamLedgerError>;
