//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责组装依赖、加载项目清单和并发调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量项目处理器
//! - 创建生成器、项目存储和评分流程
//! - 批量加载项目清单（Vec<ProjectManifest>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `project_processor` - 单个项目处理器
//! - 校验评分模式后再读取文档
//! - 抽取参考答案与答卷文本
//! - 委托 GradingFlow 完成评分与保存
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ProjectManifest>)
//!     ↓
//! project_processor (处理单个 ProjectManifest)
//!     ↓
//! workflow::GradingFlow (一次评分运行)
//!     ↓
//! services (能力层：prompt / llm / statistics / store / diagnostics)
//! ```

pub mod batch_processor;
pub mod project_processor;

pub use batch_processor::{App, BatchStats};
pub use project_processor::process_project;
