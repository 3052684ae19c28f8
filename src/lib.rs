//! # Checkmate Grader
//!
//! 一个借助大语言模型批量评阅学生答卷的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每项能力互不依赖
//! - `prompt_builder` - 按评分模式构建提示词
//! - `LlmService` - 实现 `Generator`，调用 LLM 获取回复
//! - `statistics` - 平均分 / 中位数 / 标准差 / 等级分布
//! - `FsProjectStore` - 实现 `ProjectStore`，保存与读取项目记录
//! - `DiagnosticsWriter` - 记录无法解析的回复
//! - `PlainTextExtractor` - 实现 `TextExtractor`，把文档变成文本
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一个项目"的完整评分流程
//! - `GradingCtx` - 上下文封装（project_id + project_name）
//! - `GradingFlow` - 流程编排（validate → prompt → generate → parse → stats → save）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 应用入口，组装依赖并控制并发
//! - `orchestrator/project_processor` - 单个项目处理器，读取文档后交给流程层
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ErrorPayload, GradingError, GradingResult};
pub use models::{GradeReport, GradingMode, ProjectRecord, ProjectRequest, ProjectSummary};
pub use orchestrator::{process_project, App, BatchStats};
pub use services::{FsProjectStore, Generator, LlmService, ProjectStore, TextExtractor};
pub use workflow::{GradingCtx, GradingFlow};
