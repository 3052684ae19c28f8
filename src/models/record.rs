use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::grade::GradeReport;
use crate::models::project::{GradingMode, ProjectConfig};
use crate::models::summary::StatisticsSummary;

/// 一次评分运行的完整记录
///
/// 创建后不可变，之后只会被列出或读取。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub config: ProjectConfig,
    pub has_reference: bool,
    pub prompt: String,
    pub results: GradeReport,
    pub stats: StatisticsSummary,
}

impl ProjectRecord {
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id,
            name: self.config.name.clone(),
            subject: self.config.subject.clone(),
            mode: self.config.mode,
            created_at: self.created_at,
            student_count: self.results.len(),
            average: self.stats.average,
        }
    }

    /// 返回给上层（HTTP / CLI）的结果
    pub fn response(&self) -> GradingResponse<'_> {
        GradingResponse {
            project_id: self.id,
            config: &self.config,
            results: &self.results,
            stats: &self.stats,
        }
    }
}

/// 项目列表中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub mode: GradingMode,
    pub created_at: DateTime<Utc>,
    pub student_count: usize,
    pub average: f64,
}

/// 评分成功时的响应
#[derive(Debug, Serialize)]
pub struct GradingResponse<'a> {
    pub project_id: Uuid,
    pub config: &'a ProjectConfig,
    pub results: &'a GradeReport,
    pub stats: &'a StatisticsSummary,
}
