use std::path::PathBuf;

pub struct DefaultConfig;

impl DefaultConfig {
    /// 默认根目录 `~/.volv`
    pub fn default_root_dir() -> PathBuf {
        dirs::home_dir()
            .map(|p| p.join(".volv"))
            .unwrap_or_else(|| PathBuf::from(".volv"))
    }

    /// 默认跳过的目录名（版本控制元数据）
    pub fn default_exclude_dirs() -> Vec<String> {
        vec![".git".to_string()]
    }

    /// 默认的并发 stat 数量
    pub fn default_concurrent_stats() -> usize {
        num_cpus::get().max(4) // 至少4个并发任务
    }
}
