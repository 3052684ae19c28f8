//! 评分流程 - 流程层
//!
//! 核心职责：定义"一个项目"的完整评分流程
//!
//! 流程顺序：
//! 1. 校验配置（失败时不触碰任何外部协作者）
//! 2. 构建提示词
//! 3. 调用生成器（唯一的挂起点，有超时）
//! 4. 严格按 JSON 解析回复
//! 5. 按成绩报告结构校验
//! 6. 计算统计
//! 7. 组装记录并保存
//!
//! 调用方在生成器返回前取消（drop）这个 future 时，不会保存任何记录。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{ContentError, GradingResult, PersistenceError, TransportError};
use crate::models::{
    GradeReport, ProjectConfig, ProjectRecord, ProjectRequest, ReferenceMaterial, Submission,
};
use crate::services::{prompt_builder, statistics, DiagnosticsWriter, Generator, ProjectStore};
use crate::utils::logging::truncate_text;
use crate::workflow::grading_ctx::GradingCtx;

/// 严格解析生成器回复
///
/// 只去掉首尾空白；不是 JSON 或结构不符都会整体拒绝，错误里保留原始回复。
pub fn parse_grade_report(raw_reply: &str) -> Result<GradeReport, ContentError> {
    let trimmed = raw_reply.trim();
    if trimmed.is_empty() {
        return Err(ContentError::EmptyReply {
            raw_reply: raw_reply.to_string(),
        });
    }

    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|e| ContentError::InvalidJson {
            message: e.to_string(),
            raw_reply: raw_reply.to_string(),
        })?;

    GradeReport::from_value(&value).map_err(|source| ContentError::InvalidShape {
        source,
        raw_reply: raw_reply.to_string(),
    })
}

/// 评分流程
///
/// - 编排完整的项目评分流程
/// - 每次运行恰好调用一次生成器
/// - 成功的运行最多写入一条项目记录
/// - 只依赖注入的能力（generator / store），不读取全局配置
pub struct GradingFlow {
    generator: Arc<dyn Generator>,
    store: Arc<dyn ProjectStore>,
    diagnostics: Option<DiagnosticsWriter>,
    generator_timeout: Duration,
}

impl GradingFlow {
    /// 创建新的评分流程
    pub fn new(config: &Config, generator: Arc<dyn Generator>, store: Arc<dyn ProjectStore>) -> Self {
        Self {
            generator,
            store,
            diagnostics: Some(DiagnosticsWriter::new(&config.diagnostics_file)),
            generator_timeout: config.generator_timeout,
        }
    }

    /// 替换诊断写入器；`None` 表示只记日志
    pub fn with_diagnostics(mut self, diagnostics: Option<DiagnosticsWriter>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.generator_timeout = timeout;
        self
    }

    /// 评分并保存
    ///
    /// 保存失败时返回 [`PersistenceError`]，其中带着已经评好的记录。
    pub async fn run(
        &self,
        request: &ProjectRequest,
        reference: Option<ReferenceMaterial>,
        submissions: Vec<Submission>,
    ) -> GradingResult<ProjectRecord> {
        self.run_in(GradingCtx::new(request.name.trim()), request, reference, submissions)
            .await
    }

    /// 在调用方提前分配好的上下文中评分并保存，记录 ID 即 `ctx.project_id`
    pub async fn run_in(
        &self,
        ctx: GradingCtx,
        request: &ProjectRequest,
        reference: Option<ReferenceMaterial>,
        submissions: Vec<Submission>,
    ) -> GradingResult<ProjectRecord> {
        let record = self.grade_in(ctx, request, reference, submissions).await?;

        if let Err(source) = self.store.save_project(&record).await {
            error!(
                "[项目 {}] ❌ 评分完成但保存失败: {}",
                record.config.name, source
            );
            return Err(PersistenceError {
                record: Box::new(record),
                source,
            }
            .into());
        }

        info!("[项目 {}] 💾 已保存 (ID: {})", record.config.name, record.id);
        Ok(record)
    }

    /// 评分但不保存
    pub async fn grade(
        &self,
        request: &ProjectRequest,
        reference: Option<ReferenceMaterial>,
        submissions: Vec<Submission>,
    ) -> GradingResult<ProjectRecord> {
        self.grade_in(GradingCtx::new(request.name.trim()), request, reference, submissions)
            .await
    }

    async fn grade_in(
        &self,
        ctx: GradingCtx,
        request: &ProjectRequest,
        reference: Option<ReferenceMaterial>,
        submissions: Vec<Submission>,
    ) -> GradingResult<ProjectRecord> {
        // ========== 1. 校验配置 ==========
        let config = ProjectConfig::validate(request, submissions.len()).map_err(|e| {
            warn!("{} ⚠️ 配置错误: {}", ctx, e);
            e
        })?;
        let reference = reference.filter(|r| !r.is_blank());
        log_run_start(&ctx, &config, reference.is_some(), &submissions);

        // ========== 2. 构建提示词 ==========
        let prompt = prompt_builder::build_prompt_for(&config, reference.as_ref(), &submissions);

        // ========== 3. 调用生成器 ==========
        let raw_reply = self.call_generator(&ctx, &prompt).await?;

        // ========== 4/5. 解析并校验 ==========
        let results = match parse_grade_report(&raw_reply) {
            Ok(report) => report,
            Err(e) => {
                self.record_content_failure(&ctx, &e).await;
                return Err(e.into());
            }
        };

        check_cardinality(&ctx, &config, &submissions, &results);

        // ========== 6. 统计 ==========
        let stats = statistics::summarize(&results.overall_scores());

        info!(
            "{} ✓ 评分完成: {} 名学生, 平均分 {:.2}, 中位数 {:.2}, 标准差 {:.2}",
            ctx,
            results.len(),
            stats.average,
            stats.median,
            stats.std_dev
        );

        // ========== 7. 组装记录 ==========
        Ok(ProjectRecord {
            id: ctx.project_id,
            created_at: Utc::now(),
            config,
            has_reference: reference.is_some(),
            prompt,
            results,
            stats,
        })
    }

    /// 调用生成器，超时视为传输错误
    async fn call_generator(&self, ctx: &GradingCtx, prompt: &str) -> Result<String, TransportError> {
        info!("{} 🤖 正在调用生成器 (提示词 {} 字符)...", ctx, prompt.chars().count());

        match tokio::time::timeout(self.generator_timeout, self.generator.generate(prompt)).await {
            Ok(Ok(reply)) => {
                info!("{} ✓ 收到回复 ({} 字符)", ctx, reply.chars().count());
                Ok(reply)
            }
            Ok(Err(e)) => {
                error!("{} ❌ 生成器调用失败: {}", ctx, e);
                Err(e)
            }
            Err(_) => {
                error!("{} ❌ 等待生成器超时 ({:?})", ctx, self.generator_timeout);
                Err(TransportError::Timeout {
                    limit: self.generator_timeout,
                })
            }
        }
    }

    /// 内容错误：记录日志并把原始回复写入诊断文件
    async fn record_content_failure(&self, ctx: &GradingCtx, err: &ContentError) {
        warn!("{} ⚠️ 生成器回复无法使用: {}", ctx, err);
        warn!("{} 原始回复: {}", ctx, truncate_text(err.raw_reply(), 200));

        if let Some(writer) = &self.diagnostics {
            match writer.write(ctx.project_id, &err.to_string(), err.raw_reply()).await {
                Ok(()) => info!("{} 原始回复已写入 {}", ctx, writer.path().display()),
                Err(e) => warn!("{} ⚠️ 写入诊断文件失败: {:#}", ctx, e),
            }
        }
    }
}

/// 学生数量或标签与提交不一致时只警告，不做调和
fn check_cardinality(
    ctx: &GradingCtx,
    config: &ProjectConfig,
    submissions: &[Submission],
    report: &GradeReport,
) {
    if report.len() != config.submission_count {
        warn!(
            "{} ⚠️ 生成器返回 {} 名学生，预期 {} 名",
            ctx,
            report.len(),
            config.submission_count
        );
    }

    let labels: HashSet<&str> = submissions.iter().map(|s| s.label.as_str()).collect();
    let mut seen = HashSet::new();
    for student in report.students() {
        let label = student.submitter_label.as_str();
        if !labels.contains(label) {
            warn!("{} ⚠️ 回复中的学生 '{}' 不在提交列表中", ctx, label);
        }
        if !seen.insert(label) {
            warn!("{} ⚠️ 学生 '{}' 在回复中重复出现", ctx, label);
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_run_start(
    ctx: &GradingCtx,
    config: &ProjectConfig,
    has_reference: bool,
    submissions: &[Submission],
) {
    info!("{} 开始评分", ctx);
    info!(
        "{} 科目: {} | 模式: {} | 题目数: {}",
        ctx, config.subject, config.mode, config.question_count
    );
    info!(
        "{} 答卷数: {} | 参考答案: {} | 目标平均分: {}",
        ctx,
        submissions.len(),
        if has_reference { "有" } else { "无" },
        config
            .expected_average
            .map(|a| a.to_string())
            .unwrap_or_else(|| "自然分布".to_string())
    );

    for s in submissions.iter().filter(|s| s.text.trim().is_empty()) {
        warn!("{} ⚠️ 答卷 '{}' 没有抽取到文本，仍将参与评分", ctx, s.label);
    }
}
