use std::path::PathBuf;
use std::time::Duration;

/// 程序配置
///
/// 启动时构建一次，显式注入 `LlmService`、`FsProjectStore` 与 `GradingFlow`。
#[derive(Clone, Debug)]
pub struct Config {
    /// 批量模式下同时评分的项目数量
    pub max_concurrent_projects: usize,
    /// 项目存储根目录
    pub projects_dir: PathBuf,
    /// 无法解析的生成器回复写入此文件
    pub diagnostics_file: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// 等待生成器的最长时间
    pub generator_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_projects: 4,
            projects_dir: PathBuf::from("projects"),
            diagnostics_file: PathBuf::from("failed_replies.log"),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4".to_string(),
            llm_temperature: 0.0,
            llm_max_tokens: 4000,
            generator_timeout: Duration::from_secs(120),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_projects: parse_env("MAX_CONCURRENT_PROJECTS")
                .filter(|n| *n > 0)
                .unwrap_or(default.max_concurrent_projects),
            projects_dir: std::env::var("PROJECTS_DIR").map(PathBuf::from).unwrap_or(default.projects_dir),
            diagnostics_file: std::env::var("DIAGNOSTICS_FILE").map(PathBuf::from).unwrap_or(default.diagnostics_file),
            verbose_logging: parse_env("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            llm_api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: parse_env("LLM_TEMPERATURE").unwrap_or(default.llm_temperature),
            llm_max_tokens: parse_env("LLM_MAX_TOKENS").unwrap_or(default.llm_max_tokens),
            generator_timeout: parse_env("GENERATOR_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(default.generator_timeout),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm_model_name, "gpt-4");
        assert_eq!(config.llm_max_tokens, 4000);
        assert_eq!(config.generator_timeout, Duration::from_secs(120));
        assert!(config.llm_api_key.is_empty());
    }
}
