use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use anyhow::Result;

use crate::config::defaults::DefaultConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 目录配置
    pub paths: PathsConfig,

    /// 扫描配置
    pub scan: ScanConfig,

    /// 版本控制配置
    pub vcs: VcsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// 根目录（默认 `~/.volv`）
    pub root_dir: PathBuf,

    /// 报告输出目录
    pub reports_dir: PathBuf,

    /// 克隆仓库用的临时目录
    pub tmp_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// 扫描时跳过的目录名
    pub exclude: Vec<String>,

    /// 单个提交内并发 stat 的最大数量
    pub concurrent_stats: usize,

    /// 是否跟随符号链接
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsConfig {
    /// 使用的后端
    pub backend: VcsBackendKind,

    /// git 可执行文件
    pub git_binary: String,

    /// 未指定分支时使用的分支；为空则使用克隆后的默认分支
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VcsBackendKind {
    /// 调用 git 命令行
    Cli,
    /// 使用 libgit2
    Libgit2,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            scan: ScanConfig::default(),
            vcs: VcsConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self::under(DefaultConfig::default_root_dir())
    }
}

impl PathsConfig {
    /// 以指定目录为根构造目录配置
    pub fn under(root_dir: PathBuf) -> Self {
        Self {
            reports_dir: root_dir.join("reports"),
            tmp_dir: root_dir.join("tmp"),
            root_dir,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude: DefaultConfig::default_exclude_dirs(),
            concurrent_stats: DefaultConfig::default_concurrent_stats(),
            follow_symlinks: false,
        }
    }
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            backend: VcsBackendKind::Cli,
            git_binary: "git".to_string(),
            default_branch: None,
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// 获取默认配置文件路径
    pub fn default_config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("无法找到配置目录"))?;
        path.push("volv");
        path.push("config.toml");
        Ok(path)
    }

    /// 加载配置，如果文件不存在则创建默认配置
    pub fn load_or_create_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let config = Self::default();
            config.save_to_file(&config_path)?;
            Ok(config)
        }
    }

    /// 创建根目录、报告目录和临时目录（已存在时不报错）
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.paths.root_dir, &self.paths.reports_dir, &self.paths.tmp_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                anyhow::anyhow!("无法创建目录 \"{}\": {}", dir.display(), e)
            })?;
        }
        Ok(())
    }
}
