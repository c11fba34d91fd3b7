use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::Config;
use crate::error::{VolvError, VolvResult};
use crate::models::{Aggregate, CommitReport, HistorySummary};
use crate::operations::aggregator::aggregate;
use crate::operations::commit_reporter::{write_json_atomically, CommitReporter};
use crate::operations::Workspace;
use crate::scanner::{HistoryEnumerator, TreeScanner};
use crate::utils::repo_name;
use crate::vcs::{Vcs, VersionControl};

/// 未指定分支且无法读取克隆后的当前分支时使用
pub const FALLBACK_BRANCH: &str = "master";

/// 汇总结果的文件名
pub const AGGREGATE_FILE_NAME: &str = "aggregate.json";

/// 一次运行的输入
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 仓库地址（URL 或本地路径）
    pub repository: String,

    /// 要分析的分支，`None` 表示使用默认分支
    pub branch: Option<String>,

    /// 是否显示进度条
    pub show_progress: bool,
}

/// 成功运行的结果
#[derive(Debug)]
pub struct RunOutcome {
    /// 实际分析的分支
    pub branch: String,

    /// 本项目的报告目录
    pub report_dir: PathBuf,

    /// 汇总文件路径
    pub aggregate_path: PathBuf,

    /// 按遍历顺序排列的逐提交报告
    pub reports: Vec<CommitReport>,

    pub aggregate: Aggregate,

    pub summary: HistorySummary,
}

/// 使用配置中选择的版本控制后端执行完整的历史回放
pub async fn run(config: &Config, options: &RunOptions) -> VolvResult<RunOutcome> {
    run_with(Vcs::from_config(&config.vcs), config, options).await
}

/// 使用指定的版本控制后端执行完整的历史回放
///
/// 无论成功还是失败，克隆出来的工作区都会被删除。
pub async fn run_with<V: VersionControl>(vcs: V, config: &Config, options: &RunOptions) -> VolvResult<RunOutcome> {
    vcs.ensure_available().await?;

    let name = repo_name(&options.repository);
    let report_dir = config.paths.reports_dir.join(&name);
    let workspace_root = absolute(&config.paths.tmp_dir.join(&name))?;

    let mut workspace = Workspace::clone_into(vcs, &options.repository, workspace_root).await?;
    let result = replay(&mut workspace, config, options, &report_dir).await;

    match workspace.discard().await {
        Ok(()) => result,
        Err(cleanup) => match result {
            Ok(_) => Err(cleanup),
            Err(err) => {
                tracing::warn!("清理工作区失败: {}", cleanup);
                Err(err)
            }
        },
    }
}

async fn replay<V: VersionControl>(
    workspace: &mut Workspace<V>,
    config: &Config,
    options: &RunOptions,
    report_dir: &Path,
) -> VolvResult<RunOutcome> {
    let branch = resolve_branch(workspace, config, options).await?;

    // 空仓库的分支尚未诞生，无法检出
    if !workspace.has_commits().await? {
        return Err(VolvError::EmptyHistory { branch });
    }

    // 先检出分支，确保远程分支在本地可用
    tracing::info!("检出分支 {}", branch);
    workspace.set_to(&branch).await?;

    let commits = HistoryEnumerator::list(workspace, &branch).await?;
    tracing::info!("发现 {} 个提交待分析", commits.len());

    tokio::fs::create_dir_all(report_dir)
        .await
        .map_err(|source| VolvError::Persist {
            path: report_dir.to_path_buf(),
            source,
        })?;

    let progress = create_progress_bar(commits.len() as u64, options.show_progress);
    let scanner = TreeScanner::with_config(&config.scan);
    let mut reporter = CommitReporter::new(workspace, scanner, report_dir.to_path_buf());

    let mut reports = Vec::with_capacity(commits.len());
    for commit in &commits {
        progress.set_message(commit.short_hash().to_string());

        match reporter.report_one(commit).await {
            Ok(report) => reports.push(report),
            Err(err) => {
                progress.abandon_with_message(format!("提交 {} 处理失败", commit.short_hash()));
                return Err(err.at_commit(commit.position + 1, &commit.hash));
            }
        }

        progress.inc(1);
    }
    progress.finish_with_message(format!("已分析 {} 个提交", reports.len()));

    // 汇总与统计是纯 CPU 计算（统计内部使用 rayon），放到阻塞线程池中执行
    let (reports, aggregate, summary) = tokio::task::spawn_blocking(move || {
        let aggregate = aggregate(&reports);
        let summary = HistorySummary::from_reports(&reports, &aggregate);
        (reports, aggregate, summary)
    })
    .await
    .map_err(|join_err| VolvError::Aggregate {
        message: join_err.to_string(),
    })?;

    let aggregate_path = report_dir.join(AGGREGATE_FILE_NAME);
    write_json_atomically(&aggregate_path, &aggregate).await?;

    tracing::info!(
        "汇总完成: {} 个提交，{} 个不同路径，报告目录 {}",
        summary.commit_count(),
        summary.distinct_paths,
        report_dir.display()
    );

    Ok(RunOutcome {
        branch,
        report_dir: report_dir.to_path_buf(),
        aggregate_path,
        reports,
        aggregate,
        summary,
    })
}

/// 分支优先级：命令行参数 > 配置 > 克隆后的当前分支 > `master`
async fn resolve_branch<V: VersionControl>(
    workspace: &Workspace<V>,
    config: &Config,
    options: &RunOptions,
) -> VolvResult<String> {
    if let Some(branch) = options.branch.as_ref().or(config.vcs.default_branch.as_ref()) {
        return Ok(branch.clone());
    }

    Ok(workspace
        .current_branch()
        .await?
        .unwrap_or_else(|| FALLBACK_BRANCH.to_string()))
}

fn absolute(path: &Path) -> VolvResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| VolvError::Workspace {
            path: path.to_path_buf(),
            source,
        })
}

/// 创建提交进度条
fn create_progress_bar(total: u64, visible: bool) -> ProgressBar {
    if !visible || cfg!(test) {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
