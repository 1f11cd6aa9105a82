//! ExamLedger - 考试成绩导入与对账服务
//!
//! 基于 Actix Web 与 SeaORM 构建，把教师上传的成绩表格对账写入规范化的成绩库。
//!
//! # 架构
//! - `cache`: 缓存层（Moka/Redis），保存上传任务状态
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `jobs`: 后台上传任务队列
//! - `models`: 数据模型定义
//! - `reconcile`: 身份识别、成绩写入与缺考推断
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `sheet`: 表格读取与规范化
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod reconcile;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod sheet;
pub mod storage;
pub mod utils;
