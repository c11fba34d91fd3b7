use clap::Parser;
use std::path::PathBuf;

use volv::config::VcsBackendKind;

#[derive(Parser)]
#[command(name = "volv")]
#[command(about = "回放 Git 仓库的完整历史，记录每个提交中每个文件的大小")]
#[command(version)]
pub struct Cli {
    /// 仓库地址（URL 或本地路径）
    pub repository: String,

    /// 要分析的分支（默认使用仓库的默认分支）
    pub branch: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 报告输出目录，覆盖配置文件中的设置
    #[arg(long)]
    pub reports_dir: Option<PathBuf>,

    /// 版本控制后端，覆盖配置文件中的设置
    #[arg(long, value_enum)]
    pub backend: Option<VcsBackendKind>,

    /// 不显示进度条
    #[arg(long)]
    pub no_progress: bool,

    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_repository_and_branch() {
        let cli = Cli::parse_from(["volv", "https://example.com/repo.git", "develop"]);
        assert_eq!(cli.repository, "https://example.com/repo.git");
        assert_eq!(cli.branch.as_deref(), Some("develop"));
        assert!(cli.backend.is_none());

        let cli = Cli::parse_from(["volv", "/tmp/repo", "--backend", "libgit2", "--no-progress"]);
        assert!(cli.branch.is_none());
        assert_eq!(cli.backend, Some(VcsBackendKind::Libgit2));
        assert!(cli.no_progress);
    }
}
