//! 表格读取与规范化
//!
//! - `reader`: 把上传的二进制文件读成原始单元格（xlsx/xls/ods 走 calamine，csv 走 csv）
//! - `mapping`: 表头 → 逻辑字段映射
//! - `normalizer`: 按映射把原始行整理成逻辑字段记录

pub mod cells;
pub mod mapping;
pub mod normalizer;
pub mod reader;

pub use cells::{RawSheet, SheetCell};
pub use mapping::ColumnMapping;
pub use normalizer::{SheetRow, normalize_header, normalize_rows};
pub use reader::{SheetFormat, read_headers, read_sheet};

/// 学号字段（必填）
pub const ROLL_NUMBER_FIELD: &str = "roll_number";
/// 姓名字段
pub const NAME_FIELD: &str = "name";
/// 父亲/监护人姓名字段
pub const FATHER_NAME_FIELD: &str = "father_name";

/// 身份类字段，不参与科目匹配
pub const IDENTITY_FIELDS: [&str; 3] = [ROLL_NUMBER_FIELD, NAME_FIELD, FATHER_NAME_FIELD];
