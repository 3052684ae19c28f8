use crate::models::project::ProjectRequest;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 项目清单（TOML）
///
/// 字段与上传表单一致，文件路径相对于清单所在目录。
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectManifest {
    pub project_name: String,
    pub subject: String,
    pub num_questions: u32,
    #[serde(default)]
    pub num_tests: Option<usize>,
    pub project_type: String,
    #[serde(default)]
    pub expected_average: Option<i64>,
    #[serde(default)]
    pub solution_file: Option<PathBuf>,
    #[serde(default)]
    pub test_files: Vec<PathBuf>,
    #[serde(default)]
    pub tests_dir: Option<PathBuf>,
    #[serde(skip)]
    pub file_path: Option<PathBuf>,
}

impl ProjectManifest {
    pub fn to_request(&self) -> ProjectRequest {
        ProjectRequest {
            name: self.project_name.clone(),
            subject: self.subject.clone(),
            question_count: self.num_questions,
            submission_count: self.num_tests,
            mode: self.project_type.clone(),
            expected_average: self.expected_average,
        }
    }

    /// 清单所在目录
    fn base_dir(&self) -> PathBuf {
        self.file_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn solution_path(&self) -> Option<PathBuf> {
        self.solution_file
            .as_ref()
            .map(|p| self.base_dir().join(p))
    }

    /// 解析所有答卷路径
    ///
    /// `test_files` 按声明顺序在前，`tests_dir` 中的文件按文件名排序追加在后。
    pub async fn submission_paths(&self) -> Result<Vec<PathBuf>> {
        let base = self.base_dir();
        let mut paths: Vec<PathBuf> = self.test_files.iter().map(|p| base.join(p)).collect();

        if let Some(dir) = &self.tests_dir {
            let dir = base.join(dir);
            let mut entries = fs::read_dir(&dir)
                .await
                .with_context(|| format!("无法读取答卷目录: {}", dir.display()))?;

            let mut found = Vec::new();
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_file() {
                    found.push(path);
                }
            }
            found.sort();
            paths.extend(found);
        }

        Ok(paths)
    }
}

/// 从 TOML 文件加载项目清单
pub async fn load_manifest(toml_file_path: &Path) -> Result<ProjectManifest> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut manifest: ProjectManifest = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    manifest.file_path = Some(toml_file_path.to_path_buf());

    Ok(manifest)
}

/// 从文件夹中加载所有项目清单
///
/// 解析失败的文件只记录警告，不影响其余清单。
pub async fn load_all_manifests(folder_path: &Path) -> Result<Vec<ProjectManifest>> {
    if !fs::try_exists(folder_path).await.unwrap_or(false) {
        anyhow::bail!("文件夹不存在: {}", folder_path.display());
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(folder_path)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut manifests = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_manifest(&path).await {
            Ok(manifest) => manifests.push(manifest),
            Err(e) => tracing::warn!("加载文件失败 {}: {:#}", path.display(), e),
        }
    }

    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
project_name = "Physics Midterm"
subject = "Physics"
num_questions = 4
project_type = "multichoice"
expected_average = 70
solution_file = "key.txt"
test_files = ["alice.txt", "bob.txt"]
"#;

    #[test]
    fn test_parse_manifest() {
        let mut manifest: ProjectManifest = toml::from_str(MANIFEST).unwrap();
        manifest.file_path = Some(PathBuf::from("/data/physics/project.toml"));

        let request = manifest.to_request();
        assert_eq!(request.name, "Physics Midterm");
        assert_eq!(request.mode, "multichoice");
        assert_eq!(request.expected_average, Some(70));
        assert_eq!(request.submission_count, None);
        assert_eq!(
            manifest.solution_path(),
            Some(PathBuf::from("/data/physics/key.txt"))
        );
    }

    #[tokio::test]
    async fn test_submission_paths_from_list() {
        let mut manifest: ProjectManifest = toml::from_str(MANIFEST).unwrap();
        manifest.file_path = Some(PathBuf::from("/data/physics/project.toml"));

        let paths = manifest.submission_paths().await.unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/data/physics/alice.txt"),
                PathBuf::from("/data/physics/bob.txt"),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_tests_dir_is_error() {
        let mut manifest: ProjectManifest = toml::from_str(MANIFEST).unwrap();
        manifest.tests_dir = Some(PathBuf::from("/definitely/not/here"));
        assert!(manifest.submission_paths().await.is_err());
    }
}
