use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;
use uuid::Uuid;

use checkmate_grader::utils::logging;
use checkmate_grader::{App, Config, GradingError};

/// 借助大语言模型批量评阅学生答卷
#[derive(Parser, Debug)]
#[command(name = "checkmate-grader")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 评分单个项目清单，成功时输出评分结果 JSON
    Grade {
        /// 项目清单 (*.toml)
        manifest: PathBuf,
    },
    /// 批量评分文件夹中的所有项目清单
    Batch {
        /// 存放项目清单的文件夹
        folder: PathBuf,
    },
    /// 列出历史项目（最新的在前）
    List,
    /// 输出单个历史项目的完整记录
    Show {
        /// 项目 ID
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    let app = App::initialize(config);

    match cli.command {
        Command::Grade { manifest } => match app.grade_manifest(&manifest).await {
            Ok(record) => println!("{}", serde_json::to_string_pretty(&record.response())?),
            Err(e) => {
                match e.downcast_ref::<GradingError>() {
                    Some(grading_error) => {
                        println!("{}", serde_json::to_string_pretty(&grading_error.to_payload())?)
                    }
                    None => error!("❌ 评分失败: {:#}", e),
                }
                std::process::exit(1);
            }
        },
        Command::Batch { folder } => {
            let stats = app.run_batch(&folder).await?;
            if stats.failed > 0 {
                std::process::exit(1);
            }
        }
        Command::List => {
            let projects = app.list_projects().await?;
            println!("{}", serde_json::to_string_pretty(&projects)?);
        }
        Command::Show { id } => {
            let record = app.load_project(id).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
