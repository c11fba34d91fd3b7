//! 单元测试共用的 Git 仓库构造工具

use std::fs;
use std::path::Path;
use git2::{Oid, Repository, RepositoryInitOptions, Signature};

/// 在 `path` 初始化一个默认分支为 `main` 的仓库
pub(crate) fn init_repository(path: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    Repository::init_opts(path, &opts).unwrap()
}

/// 写入（`Some`）或删除（`None`）文件并提交，返回新提交的 id
pub(crate) fn commit_files(repo: &Repository, files: &[(&str, Option<&str>)], message: &str) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();

    for (relative, content) in files {
        let path = workdir.join(relative);
        match content {
            Some(content) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).unwrap();
                }
                fs::write(&path, content).unwrap();
                index.add_path(Path::new(relative)).unwrap();
            }
            None => {
                fs::remove_file(&path).unwrap();
                index.remove_path(Path::new(relative)).unwrap();
            }
        }
    }
    index.write().unwrap();

    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Test User", "test@example.com").unwrap();

    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents).unwrap()
}
