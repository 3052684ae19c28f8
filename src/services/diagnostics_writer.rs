//! 诊断写入服务 - 业务能力层
//!
//! 只负责"把无法解析的生成器回复追加到诊断文件"，不关心流程

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

/// 诊断写入服务
///
/// 职责：
/// - 保留内容错误时的原始回复，供人工排查
/// - 与项目存储分开，失败的运行不会产生项目记录
pub struct DiagnosticsWriter {
    file_path: PathBuf,
}

impl DiagnosticsWriter {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// 追加一条诊断记录
    ///
    /// # 参数
    /// - `project_id`: 本次运行的项目ID
    /// - `reason`: 失败原因
    /// - `raw_reply`: 生成器原始回复
    pub async fn write(&self, project_id: Uuid, reason: &str, raw_reply: &str) -> Result<()> {
        debug!(
            "写入诊断: 项目 {} | 回复长度: {}",
            project_id,
            raw_reply.len()
        );

        let entry = format!(
            "{}\n[{}] 项目 {} | 原因: {}\n{}\n{}\n\n",
            "=".repeat(60),
            chrono::Utc::now().to_rfc3339(),
            project_id,
            reason,
            "-".repeat(60),
            raw_reply
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .await
            .with_context(|| format!("无法打开诊断文件: {}", self.file_path.display()))?;

        file.write_all(entry.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}
