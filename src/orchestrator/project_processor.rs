//! 单个项目处理器 - 编排层
//!
//! ## 职责
//!
//! 把一份项目清单变成 `GradingFlow` 的输入并执行评分。
//!
//! ## 核心功能
//!
//! 1. **快速失败**：先校验评分模式、题目数量等配置并分配项目ID，再读取任何文档
//! 2. **文本抽取**：参考答案与答卷并发抽取，失败退化为空文本
//! 3. **流程调度**：委托 `GradingFlow::run_in`，记录 ID 与日志中的项目ID一致
//! 4. **统计输出**：记录单个项目的评分结果

use anyhow::Result;
use futures::future::join_all;
use std::path::Path;
use tracing::info;

use crate::error::GradingError;
use crate::models::{ProjectConfig, ProjectManifest, ProjectRecord, ReferenceMaterial, Submission};
use crate::services::{extract_file, TextExtractor};
use crate::workflow::{GradingCtx, GradingFlow};

/// 处理单个项目
///
/// # 参数
/// - `flow`: 评分流程
/// - `manifest`: 项目清单
/// - `extractor`: 文本抽取器
///
/// # 返回
/// 评分记录；评分阶段的错误以 [`GradingError`] 包在 `anyhow::Error` 中，可用 `downcast_ref` 取回
pub async fn process_project(
    flow: &GradingFlow,
    manifest: &ProjectManifest,
    extractor: &dyn TextExtractor,
) -> Result<ProjectRecord> {
    let request = manifest.to_request();

    // 配置非法时不读取任何文档
    ProjectConfig::check_request(&request).map_err(GradingError::from)?;

    let ctx = GradingCtx::new(request.name.trim());
    log_project_start(&ctx, manifest);

    let reference = match manifest.solution_path() {
        Some(path) => Some(ReferenceMaterial::new(extract_file(extractor, &path).await)),
        None => None,
    };

    let paths = manifest.submission_paths().await?;
    let submissions = join_all(paths.iter().map(|path| async move {
        Submission::new(submitter_label(path), extract_file(extractor, path).await)
    }))
    .await;
    info!("{} 📄 已读取 {} 份答卷", ctx, submissions.len());

    let record = flow.run_in(ctx, &request, reference, submissions).await?;

    log_project_complete(&record);

    Ok(record)
}

/// 答卷标签取原始文件名
fn submitter_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

// ========== 日志辅助函数 ==========

fn log_project_start(ctx: &GradingCtx, manifest: &ProjectManifest) {
    info!("{} 开始处理", ctx);
    if let Some(path) = &manifest.file_path {
        info!("{} 清单: {}", ctx, path.display());
    }
}

fn log_project_complete(record: &ProjectRecord) {
    let dist = record
        .stats
        .grade_distribution
        .iter()
        .map(|(grade, pct)| format!("{}: {:.2}%", grade, pct))
        .collect::<Vec<_>>()
        .join(", ");
    info!("[项目 {}] 等级分布: {}", record.config.name, dist);
    info!("\n[项目 {}] ✅ 项目处理完成\n", record.config.name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submitter_label_is_file_name() {
        assert_eq!(submitter_label(Path::new("/tmp/tests/alice.pdf")), "alice.pdf");
        assert_eq!(submitter_label(Path::new("bob.txt")), "bob.txt");
    }
}
