use crate::error::{Error, Result};
use crate::types::validate_entry_name;

/// normalize a working-tree relative path
///
/// backslashes become slashes, leading `/` and `./` are dropped, empty and
/// `.` components are skipped. `..` is rejected. the root is `""`.
pub fn normalize_path(path: &str) -> Result<String> {
    let path = path.replace('\\', "/");
    let mut parts = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                return Err(Error::InvalidEntryName(format!(
                    "path leaves the working tree: {}",
                    path
                )))
            }
            name => {
                validate_entry_name(name)?;
                parts.push(name);
            }
        }
    }

    Ok(parts.join("/"))
}

/// split a normalized path into parent directory and leaf name
pub(crate) fn split_parent(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", path),
    }
}

pub(crate) fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_path("a/b.txt").unwrap(), "a/b.txt");
        assert_eq!(normalize_path("/a/b.txt").unwrap(), "a/b.txt");
        assert_eq!(normalize_path("./a//b.txt").unwrap(), "a/b.txt");
        assert_eq!(normalize_path("a\\b\\c").unwrap(), "a/b/c");
        assert_eq!(normalize_path("dir/").unwrap(), "dir");
        assert_eq!(normalize_path("").unwrap(), "");
        assert_eq!(normalize_path("/").unwrap(), "");
    }

    #[test]
    fn test_normalize_rejects_parent_components() {
        assert!(matches!(
            normalize_path("a/../../etc/passwd"),
            Err(Error::InvalidEntryName(_))
        ));
        assert!(normalize_path("..").is_err());
        assert!(normalize_path("a/b\0c").is_err());
    }

    #[test]
    fn test_split_and_join() {
        assert_eq!(split_parent("a/b/c.txt"), ("a/b", "c.txt"));
        assert_eq!(split_parent("top"), ("", "top"));
        assert_eq!(join_path("", "x"), "x");
        assert_eq!(join_path("a/b", "x"), "a/b/x");
    }
}
