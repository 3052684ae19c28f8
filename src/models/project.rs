use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// 评分模式
///
/// 决定提示词模板以及隐含的评分尺度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradingMode {
    /// 开放题考试
    #[serde(rename = "open")]
    Open,
    /// 选择题考试
    #[serde(rename = "multichoice")]
    MultipleChoice,
    /// 家庭作业（评分更宽松）
    #[serde(rename = "homework")]
    Homework,
}

impl GradingMode {
    pub const ALL: [GradingMode; 3] = [
        GradingMode::Open,
        GradingMode::MultipleChoice,
        GradingMode::Homework,
    ];

    /// 外部使用的字符串形式
    pub fn as_str(self) -> &'static str {
        match self {
            GradingMode::Open => "open",
            GradingMode::MultipleChoice => "multichoice",
            GradingMode::Homework => "homework",
        }
    }
}

impl FromStr for GradingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GradingMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedMode {
                mode: s.to_string(),
            })
    }
}

impl fmt::Display for GradingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未经校验的项目请求
///
/// 来自上传表单或项目清单，`mode` 仍是原始字符串。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    pub subject: String,
    pub question_count: u32,
    /// 声明的答卷数量，缺省时取实际提交数量
    #[serde(default)]
    pub submission_count: Option<usize>,
    pub mode: String,
    #[serde(default)]
    pub expected_average: Option<i64>,
}

/// 项目配置
///
/// 评分开始后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub subject: String,
    pub question_count: u32,
    pub submission_count: usize,
    pub mode: GradingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_average: Option<u8>,
}

impl ProjectConfig {
    /// 校验与答卷无关的部分：评分模式、名称、题目数量、目标平均分
    ///
    /// 不依赖任何文档，编排层在读取文件之前调用。
    pub fn check_request(request: &ProjectRequest) -> Result<(GradingMode, Option<u8>), ConfigError> {
        let mode = request.mode.parse::<GradingMode>()?;

        if request.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if request.question_count == 0 {
            return Err(ConfigError::ZeroQuestions);
        }

        let expected_average = match request.expected_average {
            Some(value) if (0..=100).contains(&value) => Some(value as u8),
            Some(value) => return Err(ConfigError::ExpectedAverageOutOfRange { value }),
            None => None,
        };

        Ok((mode, expected_average))
    }

    /// 校验请求并生成配置
    ///
    /// 评分模式最先校验；任何失败都发生在 I/O 之前。
    pub fn validate(request: &ProjectRequest, submitted: usize) -> Result<Self, ConfigError> {
        let (mode, expected_average) = Self::check_request(request)?;
        if submitted == 0 {
            return Err(ConfigError::NoSubmissions);
        }

        let name = request.name.trim();
        Ok(Self {
            name: name.to_string(),
            subject: request.subject.trim().to_string(),
            question_count: request.question_count,
            submission_count: request.submission_count.unwrap_or(submitted),
            mode,
            expected_average,
        })
    }
}

/// 参考答案（教师提供的标准答案文本）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMaterial {
    text: String,
}

impl ReferenceMaterial {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 抽取失败会退化为空文本，等同于没有参考答案
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// 一份待评分的答卷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// 来自原始文件名
    pub label: String,
    pub text: String,
}

impl Submission {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: &str) -> ProjectRequest {
        ProjectRequest {
            name: "Midterm".to_string(),
            subject: "Physics".to_string(),
            question_count: 5,
            submission_count: None,
            mode: mode.to_string(),
            expected_average: Some(75),
        }
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("open".parse::<GradingMode>().unwrap(), GradingMode::Open);
        assert_eq!(
            "multichoice".parse::<GradingMode>().unwrap(),
            GradingMode::MultipleChoice
        );
        assert_eq!(
            " MultiChoice ".parse::<GradingMode>(),
            Err(ConfigError::UnsupportedMode {
                mode: " MultiChoice ".to_string()
            })
        );
        assert_eq!(
            "homework".parse::<GradingMode>().unwrap(),
            GradingMode::Homework
        );
        assert_eq!(
            "essay".parse::<GradingMode>(),
            Err(ConfigError::UnsupportedMode {
                mode: "essay".to_string()
            })
        );
    }

    #[test]
    fn test_mode_serde_uses_external_names() {
        let json = serde_json::to_string(&GradingMode::MultipleChoice).unwrap();
        assert_eq!(json, "\"multichoice\"");
    }

    #[test]
    fn test_validate_fills_submission_count() {
        let config = ProjectConfig::validate(&request("open"), 3).unwrap();
        assert_eq!(config.submission_count, 3);
        assert_eq!(config.expected_average, Some(75));
        assert_eq!(config.mode, GradingMode::Open);
    }

    #[test]
    fn test_validate_rejects_mode_first() {
        let mut req = request("oral");
        req.question_count = 0;
        assert!(matches!(
            ProjectConfig::validate(&req, 0),
            Err(ConfigError::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut req = request("homework");
        req.expected_average = Some(130);
        assert_eq!(
            ProjectConfig::validate(&req, 2),
            Err(ConfigError::ExpectedAverageOutOfRange { value: 130 })
        );

        let mut req = request("homework");
        req.question_count = 0;
        assert_eq!(
            ProjectConfig::validate(&req, 2),
            Err(ConfigError::ZeroQuestions)
        );

        assert_eq!(
            ProjectConfig::validate(&request("open"), 0),
            Err(ConfigError::NoSubmissions)
        );
    }

    #[test]
    fn test_check_request_ignores_submissions() {
        let (mode, avg) = ProjectConfig::check_request(&request("multichoice")).unwrap();
        assert_eq!(mode, GradingMode::MultipleChoice);
        assert_eq!(avg, Some(75));

        let mut req = request("open");
        req.name = "   ".to_string();
        assert_eq!(ProjectConfig::check_request(&req), Err(ConfigError::EmptyName));
    }

    #[test]
    fn test_blank_reference() {
        assert!(ReferenceMaterial::new("  \n").is_blank());
        assert!(!ReferenceMaterial::new("1. B\n2. C").is_blank());
    }
}
