//! 项目存储 - 业务能力层
//!
//! 目录布局：
//!
//! ```text
//! <projects_dir>/
//!   <项目名>_<id>/
//!     meta.json      项目配置
//!     prompt.txt     发送给生成器的提示词
//!     results.json   成绩报告
//!     record.json    完整记录（最后写入）
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::StoreError;
use crate::models::{ProjectRecord, ProjectSummary};

const RECORD_FILE: &str = "record.json";

/// 项目存储
///
/// 并发写入的串行化由实现自己负责。
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn save_project(&self, record: &ProjectRecord) -> Result<(), StoreError>;

    /// 按创建时间倒序
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, StoreError>;

    async fn load_project(&self, id: Uuid) -> Result<ProjectRecord, StoreError>;
}

/// 基于文件系统的项目存储
pub struct FsProjectStore {
    root: PathBuf,
}

impl FsProjectStore {
    pub fn new(config: &Config) -> Self {
        Self::with_root(&config.projects_dir)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 项目目录名：`<清洗后的项目名>_<id>`
    pub fn folder_name(record: &ProjectRecord) -> String {
        format!("{}_{}", sanitize_name(&record.config.name), record.id)
    }

    async fn find_project_dir(&self, id: Uuid) -> Result<Option<PathBuf>, StoreError> {
        let suffix = format!("_{}", id);
        for dir in self.project_dirs().await? {
            let matches = dir
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&suffix));
            if matches {
                return Ok(Some(dir));
            }
        }
        Ok(None)
    }

    async fn project_dirs(&self) -> Result<Vec<PathBuf>, StoreError> {
        if !fs::try_exists(&self.root).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let root = self.root.display().to_string();
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;

        let mut dirs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&root, e))?
        {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                dirs.push(entry.path());
            }
        }
        Ok(dirs)
    }
}

#[async_trait]
impl ProjectStore for FsProjectStore {
    async fn save_project(&self, record: &ProjectRecord) -> Result<(), StoreError> {
        let dir = self.root.join(Self::folder_name(record));
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(dir.display().to_string(), e))?;

        write_json(&dir.join("meta.json"), &record.config).await?;
        write_file(&dir.join("prompt.txt"), record.prompt.as_bytes()).await?;
        write_json(&dir.join("results.json"), &record.results).await?;
        write_json(&dir.join(RECORD_FILE), record).await?;

        debug!("项目已保存: {}", dir.display());
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, StoreError> {
        let mut summaries = Vec::new();

        for dir in self.project_dirs().await? {
            match read_record(&dir.join(RECORD_FILE)).await {
                Ok(record) => summaries.push(record.summary()),
                Err(e) => warn!("⚠️ 跳过无法读取的项目 {}: {}", dir.display(), e),
            }
        }

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn load_project(&self, id: Uuid) -> Result<ProjectRecord, StoreError> {
        let dir = self
            .find_project_dir(id)
            .await?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        read_record(&dir.join(RECORD_FILE)).await
    }
}

/// 把空白和路径敏感字符替换为 `_`
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "project".to_string()
    } else {
        cleaned
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    fs::write(path, bytes)
        .await
        .map_err(|e| StoreError::io(path.display().to_string(), e))
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| StoreError::serde(path.display().to_string(), e))?;
    write_file(path, &json).await
}

async fn read_record(path: &Path) -> Result<ProjectRecord, StoreError> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| StoreError::io(path.display().to_string(), e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::serde(path.display().to_string(), e))
}
