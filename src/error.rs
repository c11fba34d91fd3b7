use std::path::PathBuf;

use thiserror::Error;

/// 历史回放过程中可能出现的错误，每个变体对应流水线的一个阶段
#[derive(Error, Debug)]
pub enum VolvError {
    #[error("环境缺少必需的能力: {message}")]
    Setup { message: String },

    #[error("无法克隆仓库 \"{remote}\": {output}")]
    Clone { remote: String, output: String },

    #[error("无法检出 \"{reference}\": {output}")]
    Checkout { reference: String, output: String },

    #[error("无法列出分支 \"{branch}\" 的提交: {output}")]
    Enumeration { branch: String, output: String },

    #[error("分支 \"{branch}\" 上没有可分析的提交")]
    EmptyHistory { branch: String },

    #[error("遍历目录 {} 时出错: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("文件名不是合法的 UTF-8，无法作为报告中的路径: {}", .path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("无法读取文件 {} 的元数据: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("无法写入报告 {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("汇总提交报告失败: {message}")]
    Aggregate { message: String },

    #[error("工作区操作失败 ({}): {source}", .path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `ordinal` 为从 1 开始的提交序号
    #[error("第 {ordinal} 个提交 {hash} 处理失败: {source}")]
    Commit {
        ordinal: usize,
        hash: String,
        #[source]
        source: Box<VolvError>,
    },
}

pub type VolvResult<T> = Result<T, VolvError>;

impl VolvError {
    /// 失败发生的阶段名称，用于向用户报告
    pub fn stage(&self) -> &'static str {
        match self {
            VolvError::Setup { .. } => "setup",
            VolvError::Clone { .. } => "clone",
            VolvError::Checkout { .. } => "checkout",
            VolvError::Enumeration { .. } => "enumerate",
            VolvError::EmptyHistory { .. } => "enumerate",
            VolvError::Scan { .. } | VolvError::NonUtf8Path { .. } | VolvError::Stat { .. } => "scan",
            VolvError::Persist { .. } => "persist",
            VolvError::Aggregate { .. } => "aggregate",
            VolvError::Workspace { .. } => "workspace",
            VolvError::Commit { source, .. } => source.stage(),
        }
    }

    /// 失败的提交序号和哈希（如果错误发生在某个提交的处理过程中）
    pub fn commit(&self) -> Option<(usize, &str)> {
        match self {
            VolvError::Commit { ordinal, hash, .. } => Some((*ordinal, hash.as_str())),
            _ => None,
        }
    }

    /// 去掉提交上下文后的底层错误
    pub fn root(&self) -> &VolvError {
        match self {
            VolvError::Commit { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn at_commit(self, ordinal: usize, hash: &str) -> Self {
        VolvError::Commit {
            ordinal,
            hash: hash.to_string(),
            source: Box::new(self),
        }
    }
}
