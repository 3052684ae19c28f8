//! 评分流水线错误类型
//!
//! 一次评分运行只会以四种方式失败，调用方仅凭错误本身即可判断是哪个阶段出了问题：
//!
//! - [`ConfigError`]：配置非法（评分模式、题目数量、目标平均分等），在任何 I/O 之前发现
//! - [`TransportError`]：生成器不可达、超时或返回传输层错误
//! - [`ContentError`]：生成器有回复，但内容不是 JSON 或结构不符合成绩报告
//! - [`PersistenceError`]：评分已成功，但保存失败（携带已评完的记录）

use serde::Serialize;
use thiserror::Error;

use crate::models::ProjectRecord;

/// 评分运行错误
#[derive(Debug, Error)]
pub enum GradingError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Configuration(#[from] ConfigError),
    /// 生成器传输错误
    #[error("生成器传输错误: {0}")]
    Transport(#[from] TransportError),
    /// 生成器回复内容错误
    #[error("生成器回复内容错误: {0}")]
    Content(#[from] ContentError),
    /// 持久化错误
    #[error("持久化错误: {0}")]
    Persistence(#[from] PersistenceError),
}

impl GradingError {
    /// 对外暴露的问题代码
    pub fn problem_code(&self) -> &'static str {
        match self {
            GradingError::Configuration(_) => "configuration_error",
            GradingError::Transport(_) => "transport_error",
            GradingError::Content(_) => "content_error",
            GradingError::Persistence(_) => "persistence_error",
        }
    }

    /// 只有传输错误值得由调用方重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, GradingError::Transport(_))
    }

    /// 转换为可序列化的错误载荷
    pub fn to_payload(&self) -> ErrorPayload {
        let (raw_reply, project_id, graded) = match self {
            GradingError::Content(e) => (Some(e.raw_reply().to_string()), None, None),
            GradingError::Persistence(e) => (
                None,
                Some(e.record.id.to_string()),
                serde_json::to_value(e.record.response()).ok(),
            ),
            _ => (None, None, None),
        };

        ErrorPayload {
            problem: self.problem_code(),
            message: self.to_string(),
            retryable: self.is_retryable(),
            project_id,
            raw_reply,
            graded,
        }
    }
}

/// 结构化错误载荷
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub problem: &'static str,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_reply: Option<String>,
    /// 保存失败时已评好的结果（projectId / config / results / stats）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graded: Option<serde_json::Value>,
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 不支持的评分模式
    #[error("不支持的评分模式: '{mode}' (可选: open, multichoice, homework)")]
    UnsupportedMode { mode: String },
    /// 题目数量必须为正数
    #[error("题目数量必须大于 0")]
    ZeroQuestions,
    /// 目标平均分超出范围
    #[error("目标平均分 {value} 超出范围 [0, 100]")]
    ExpectedAverageOutOfRange { value: i64 },
    /// 没有提交任何答卷
    #[error("至少需要一份答卷")]
    NoSubmissions,
    /// 项目名称为空
    #[error("项目名称不能为空")]
    EmptyName,
}

/// 生成器传输错误
#[derive(Debug, Error)]
pub enum TransportError {
    /// API 调用失败
    #[error("LLM API 调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 请求构建失败
    #[error("LLM 请求构建失败: {0}")]
    RequestBuild(String),
    /// 等待生成器超时
    #[error("等待生成器超时 (上限 {limit:?})")]
    Timeout { limit: std::time::Duration },
    /// 生成器不可用（测试替身或未配置的客户端）
    #[error("生成器不可用: {0}")]
    Unavailable(String),
}

/// 成绩报告结构校验失败
///
/// 只报告第一个失败位置，`path` 形如 `$[1].grades[0].grade`。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: 期望 {expected}, 实际为 {found}")]
pub struct ShapeError {
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl ShapeError {
    pub fn new(path: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self {
            path: path.into(),
            expected,
            found,
        }
    }
}

/// 生成器回复内容错误
///
/// 所有变体都保留原始回复，便于人工排查。
#[derive(Debug, Clone, Error)]
pub enum ContentError {
    /// 回复为空
    #[error("生成器返回了空回复")]
    EmptyReply { raw_reply: String },
    /// 回复不是合法 JSON
    #[error("回复不是合法 JSON: {message}")]
    InvalidJson { message: String, raw_reply: String },
    /// JSON 结构不符合成绩报告
    #[error("成绩报告结构不合法: {source}")]
    InvalidShape {
        #[source]
        source: ShapeError,
        raw_reply: String,
    },
}

impl ContentError {
    /// 原始回复
    pub fn raw_reply(&self) -> &str {
        match self {
            ContentError::EmptyReply { raw_reply }
            | ContentError::InvalidJson { raw_reply, .. }
            | ContentError::InvalidShape { raw_reply, .. } => raw_reply,
        }
    }
}

/// 持久化错误
///
/// 评分本身已经成功，`record` 即评分结果，调用方可以自行补存。
#[derive(Debug, Error)]
#[error("项目 {} 已评分但保存失败: {source}", .record.id)]
pub struct PersistenceError {
    pub record: Box<ProjectRecord>,
    #[source]
    pub source: StoreError,
}

/// 项目存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 项目不存在
    #[error("项目不存在: {id}")]
    NotFound { id: String },
    /// 文件读写失败
    #[error("文件操作失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 记录序列化 / 反序列化失败
    #[error("记录序列化失败 ({path}): {source}")]
    Serde {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn serde(path: impl Into<String>, source: serde_json::Error) -> Self {
        StoreError::Serde {
            path: path.into(),
            source,
        }
    }
}

/// 评分结果类型
pub type GradingResult<T> = Result<T, GradingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_codes_are_distinct() {
        let config: GradingError = ConfigError::ZeroQuestions.into();
        let transport: GradingError = TransportError::Timeout {
            limit: std::time::Duration::from_secs(5),
        }
        .into();
        let content: GradingError = ContentError::EmptyReply {
            raw_reply: String::new(),
        }
        .into();

        assert_eq!(config.problem_code(), "configuration_error");
        assert_eq!(transport.problem_code(), "transport_error");
        assert_eq!(content.problem_code(), "content_error");
        assert!(transport.is_retryable());
        assert!(!content.is_retryable());
    }

    #[test]
    fn test_content_payload_keeps_raw_reply() {
        let err: GradingError = ContentError::InvalidJson {
            message: "expected value at line 1 column 1".to_string(),
            raw_reply: "Sure! Here are the grades".to_string(),
        }
        .into();

        let payload = err.to_payload();
        assert_eq!(payload.problem, "content_error");
        assert_eq!(
            payload.raw_reply.as_deref(),
            Some("Sure! Here are the grades")
        );
    }

    #[test]
    fn test_shape_error_display() {
        let err = ShapeError::new("$[0].overall_score", "整数", "缺失");
        assert_eq!(err.to_string(), "$[0].overall_score: 期望 整数, 实际为 缺失");
    }
}
