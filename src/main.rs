mod cli;

use std::io::IsTerminal;
use anyhow::Result;
use clap::Parser;
use indicatif::HumanBytes;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use volv::config::Config;
use volv::{run, RunOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志，RUST_LOG 优先，否则根据 --verbose 选择级别
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 加载配置
    let mut config = if let Some(config_path) = &cli.config {
        Config::load_from_file(config_path)?
    } else {
        Config::load_or_create_default()?
    };

    if let Some(reports_dir) = cli.reports_dir {
        config.paths.reports_dir = reports_dir;
    }
    if let Some(backend) = cli.backend {
        config.vcs.backend = backend;
    }

    config.ensure_directories()?;

    let options = RunOptions {
        repository: cli.repository,
        branch: cli.branch,
        show_progress: !cli.no_progress && std::io::stderr().is_terminal(),
    };

    match run(&config, &options).await {
        Ok(outcome) => {
            let summary = &outcome.summary;
            println!("分支: {}", outcome.branch);
            println!("已分析提交: {}", summary.commit_count());
            println!("不同路径: {}", summary.distinct_paths);
            println!("最新提交总大小: {}", HumanBytes(summary.final_total_size()));
            if let Some((path, size)) = &summary.largest_final_file {
                println!("最新提交中最大的文件: {} ({})", path, HumanBytes(*size));
            }
            println!("报告目录: {}", outcome.report_dir.display());
            println!("汇总文件: {}", outcome.aggregate_path.display());
            Ok(())
        }
        Err(err) => {
            match err.commit() {
                Some((ordinal, hash)) => eprintln!(
                    "运行在 `{}` 阶段失败（第 {} 个提交 {}）: {}",
                    err.stage(),
                    ordinal,
                    hash,
                    err.root()
                ),
                None => eprintln!("运行在 `{}` 阶段失败: {}", err.stage(), err),
            }
            std::process::exit(1);
        }
    }
}
