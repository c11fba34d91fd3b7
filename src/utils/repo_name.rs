/// 从仓库地址推导项目名：取最后一段，去掉末尾的 `/` 和 `.git`
///
/// 支持本地路径、`https://` 地址和 `git@host:owner/repo.git` 形式。
pub fn repo_name(location: &str) -> String {
    let trimmed = location.trim().trim_end_matches(|c| c == '/' || c == '\\');
    let last = trimmed
        .rsplit(|c| c == '/' || c == '\\' || c == ':')
        .next()
        .unwrap_or(trimmed);
    let name = last.strip_suffix(".git").unwrap_or(last);

    if name.is_empty() || name == "." || name == ".." {
        "repository".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_name_from_urls() {
        assert_eq!(repo_name("https://github.com/owner/project.git"), "project");
        assert_eq!(repo_name("https://github.com/owner/project"), "project");
        assert_eq!(repo_name("git@github.com:owner/project.git"), "project");
        assert_eq!(repo_name("git@host:project.git"), "project");
    }

    #[test]
    fn test_repo_name_from_paths() {
        assert_eq!(repo_name("/home/me/code/project/"), "project");
        assert_eq!(repo_name("C:\\code\\project"), "project");
        assert_eq!(repo_name("/"), "repository");
        assert_eq!(repo_name("."), "repository");
    }
}
