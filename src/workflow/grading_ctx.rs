//! 评分运行上下文
//!
//! 封装"我正在给哪个项目评分"这一信息

use std::fmt::Display;
use uuid::Uuid;

/// 评分运行上下文
///
/// 每次运行在任何 I/O 之前分配自己的项目ID，并发运行之间互不共享。
#[derive(Debug, Clone)]
pub struct GradingCtx {
    /// 项目ID
    pub project_id: Uuid,

    /// 项目名称（仅用于日志显示）
    pub project_name: String,
}

impl GradingCtx {
    /// 为一次新运行创建上下文
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_id: Uuid::new_v4(),
            project_name: project_name.into(),
        }
    }

    /// ID 前 8 位，日志里足够区分
    pub fn short_id(&self) -> String {
        self.project_id.simple().to_string()[..8].to_string()
    }
}

impl Display for GradingCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[项目 {}#{}]", self.project_name, self.short_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_ctx_gets_its_own_id() {
        let a = GradingCtx::new("Midterm");
        let b = GradingCtx::new("Midterm");
        assert_ne!(a.project_id, b.project_id);
    }

    #[test]
    fn test_display() {
        let ctx = GradingCtx::new("Midterm");
        let shown = ctx.to_string();
        assert!(shown.starts_with("[项目 Midterm#"));
        assert_eq!(ctx.short_id().len(), 8);
    }
}
