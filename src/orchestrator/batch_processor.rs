//! 批量项目处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责组装依赖、批量评分和查询历史项目。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建 `LlmService`、`FsProjectStore`、`GradingFlow`
//! 2. **批量加载**：扫描文件夹中的所有项目清单
//! 3. **并发控制**：使用 Semaphore 限制同时评分的项目数量
//! 4. **全局统计**：汇总所有项目的评分结果
//!
//! 每个项目的评分互相独立，不共享可变状态。

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::GradingError;
use crate::models::{load_all_manifests, load_manifest, ProjectRecord, ProjectSummary};
use crate::orchestrator::project_processor;
use crate::services::{FsProjectStore, Generator, LlmService, PlainTextExtractor, ProjectStore, TextExtractor};
use crate::utils::logging;
use crate::workflow::GradingFlow;

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<GradingFlow>,
    store: Arc<dyn ProjectStore>,
    extractor: Arc<dyn TextExtractor>,
}

impl App {
    /// 使用真实的生成器与文件存储初始化应用
    pub fn initialize(config: Config) -> Self {
        let generator: Arc<dyn Generator> = Arc::new(LlmService::new(&config));
        let store: Arc<dyn ProjectStore> = Arc::new(FsProjectStore::new(&config));
        Self::with_parts(config, generator, store, Arc::new(PlainTextExtractor))
    }

    /// 使用自定义协作者初始化应用
    pub fn with_parts(
        config: Config,
        generator: Arc<dyn Generator>,
        store: Arc<dyn ProjectStore>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let flow = Arc::new(GradingFlow::new(&config, generator, store.clone()));
        Self {
            config,
            flow,
            store,
            extractor,
        }
    }

    /// 评分单个项目清单
    pub async fn grade_manifest(&self, manifest_path: &Path) -> Result<ProjectRecord> {
        let manifest = load_manifest(manifest_path).await?;
        project_processor::process_project(&self.flow, &manifest, self.extractor.as_ref()).await
    }

    /// 批量评分文件夹中的所有项目清单
    pub async fn run_batch(&self, folder: &Path) -> Result<BatchStats> {
        logging::init_log_file(&self.config.output_log_file)?;
        logging::log_startup(&self.config.llm_model_name, self.config.max_concurrent_projects);

        info!("\n📁 正在扫描待评分的项目...");
        let manifests = load_all_manifests(folder).await?;

        if manifests.is_empty() {
            warn!("⚠️ 没有找到项目清单 (*.toml)，程序结束");
            return Ok(BatchStats::default());
        }

        logging::log_projects_loaded(manifests.len(), self.config.max_concurrent_projects);

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_projects));
        let mut handles = Vec::with_capacity(manifests.len());

        for manifest in manifests {
            let permit = semaphore.clone().acquire_owned().await?;
            let flow = self.flow.clone();
            let extractor = self.extractor.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result =
                    project_processor::process_project(&flow, &manifest, extractor.as_ref()).await;
                (manifest.project_name, result)
            });
            handles.push(handle);
        }

        let mut stats = BatchStats {
            total: handles.len(),
            ..Default::default()
        };

        for handle in handles {
            let line = match handle.await {
                Ok((name, Ok(record))) => {
                    stats.success += 1;
                    format!(
                        "✅ {} | ID: {} | 学生: {} | 平均分: {:.2}",
                        name,
                        record.id,
                        record.results.len(),
                        record.stats.average
                    )
                }
                Ok((name, Err(e))) => {
                    stats.failed += 1;
                    error!("[项目 {}] ❌ 评分失败: {:#}", name, e);
                    failure_line(&name, &e)
                }
                Err(e) => {
                    stats.failed += 1;
                    error!("评分任务执行失败: {}", e);
                    format!("❌ 任务执行失败: {}", e)
                }
            };

            if let Err(e) = logging::append_log_line(&self.config.output_log_file, &line) {
                warn!("⚠️ 写入日志文件失败: {}", e);
            }
        }

        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 列出历史项目
    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        self.store
            .list_projects()
            .await
            .context("无法列出历史项目")
    }

    /// 读取单个历史项目
    pub async fn load_project(&self, id: Uuid) -> Result<ProjectRecord> {
        self.store
            .load_project(id)
            .await
            .with_context(|| format!("无法读取项目 {}", id))
    }
}

/// 失败项目的日志行
///
/// 已评分但保存失败时，评分结果一并写入。
fn failure_line(name: &str, err: &anyhow::Error) -> String {
    match err.downcast_ref::<GradingError>() {
        Some(GradingError::Persistence(e)) => {
            let graded = serde_json::to_string(&e.record.response())
                .unwrap_or_else(|json_err| format!("<无法序列化评分结果: {}>", json_err));
            format!("❌ {} | {} | 评分结果: {}", name, err, graded)
        }
        _ => format!("❌ {} | {:#}", name, err),
    }
}

/// 批量评分统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}
