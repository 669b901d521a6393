use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{read_commit, read_tree};
use crate::ops::path::{join_path, split_parent};
use crate::repo::Repo;
use crate::types::{ObjectKind, Tree, TreeEntry};

/// listing of the directory at `dir_path` in `commit`
///
/// `commit` may be any commit, including a pending one.
pub fn read_tree_at(repo: &Repo, commit: &Hash, dir_path: &str) -> Result<Tree> {
    let root = read_commit(repo, commit)?.tree;
    read_subtree(repo, &root, dir_path)
}

/// walk from the tree `root` down to `dir_path`
pub(crate) fn read_subtree(repo: &Repo, root: &Hash, dir_path: &str) -> Result<Tree> {
    let mut tree = read_tree(repo, root)?;
    if dir_path.is_empty() {
        return Ok(tree);
    }

    let mut walked = String::new();
    for name in dir_path.split('/') {
        walked = join_path(&walked, name);
        let entry = tree
            .get(name)
            .ok_or_else(|| Error::PathNotFound(walked.clone()))?;
        if !entry.is_tree() {
            return Err(Error::NotADirectory(walked));
        }
        let next = entry.hash;
        tree = read_tree(repo, &next)?;
    }

    Ok(tree)
}

/// entry at `path` below the tree `root`, if any
///
/// a missing directory or a file in the middle of the path both mean the
/// entry does not exist.
pub(crate) fn find_entry(repo: &Repo, root: &Hash, path: &str) -> Result<Option<TreeEntry>> {
    let (dir, name) = split_parent(path);
    if name.is_empty() {
        return Ok(None);
    }

    match read_subtree(repo, root, dir) {
        Ok(tree) => Ok(tree.get(name).cloned()),
        Err(Error::PathNotFound(_)) | Err(Error::NotADirectory(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// entry at `path` in `commit`, or PathNotFound
pub fn lookup_entry(repo: &Repo, commit: &Hash, path: &str) -> Result<TreeEntry> {
    let root = read_commit(repo, commit)?.tree;
    find_entry(repo, &root, path)?.ok_or_else(|| Error::PathNotFound(path.to_string()))
}

/// kind of object at `path` in `commit`; the root is always a tree
pub fn file_type_at(repo: &Repo, commit: &Hash, path: &str) -> Result<ObjectKind> {
    if path.is_empty() {
        read_commit(repo, commit)?;
        return Ok(ObjectKind::Tree);
    }
    Ok(lookup_entry(repo, commit, path)?.kind)
}

/// the trees on the way from a path's parent directory up to the root
///
/// directories that do not exist yet resolve to empty trees, so a write to
/// `a/b/c.txt` creates `a` and `a/b` on the way.
#[derive(Clone, Debug)]
pub struct PathChain {
    path: String,
    leaf: String,
    parent: Tree,
    /// innermost first: (name of the child directory, tree containing it)
    ancestors: Vec<(String, Tree)>,
}

impl PathChain {
    /// full path of the leaf
    pub fn path(&self) -> &str {
        &self.path
    }

    /// leaf name inside the parent directory
    pub fn leaf(&self) -> &str {
        &self.leaf
    }

    /// current entry at the leaf, if any
    pub fn current(&self) -> Option<&TreeEntry> {
        self.parent.get(&self.leaf)
    }

    /// trees from the leaf's parent up to the root
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        std::iter::once(&self.parent).chain(self.ancestors.iter().map(|(_, tree)| tree))
    }

    pub(crate) fn into_parts(self) -> (String, String, Tree, Vec<(String, Tree)>) {
        (self.path, self.leaf, self.parent, self.ancestors)
    }
}

/// load every tree an edit of `file_path` has to rewrite
pub fn resolve_path_chain(repo: &Repo, commit: &Hash, file_path: &str) -> Result<PathChain> {
    let (dir, leaf) = split_parent(file_path);
    if leaf.is_empty() {
        return Err(Error::InvalidEntryName("cannot edit the root itself".to_string()));
    }

    let root = read_commit(repo, commit)?.tree;
    let mut trees = vec![read_tree(repo, &root)?];
    let mut names = Vec::new();

    if !dir.is_empty() {
        let mut walked = String::new();
        for name in dir.split('/') {
            walked = join_path(&walked, name);
            let next = match trees[trees.len() - 1].get(name) {
                Some(entry) if entry.is_tree() => read_tree(repo, &entry.hash)?,
                Some(_) => return Err(Error::NotADirectory(walked)),
                None => Tree::empty(),
            };
            trees.push(next);
            names.push(name.to_string());
        }
    }

    let parent = trees.pop().unwrap_or_default();

    // pair each remaining tree with the child directory name it holds
    let ancestors: Vec<(String, Tree)> =
        trees.into_iter().zip(names).rev().map(|(t, n)| (n, t)).collect();

    tracing::debug!(path = file_path, depth = ancestors.len(), "resolved path chain");

    Ok(PathChain {
        path: file_path.to_string(),
        leaf: leaf.to_string(),
        parent,
        ancestors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{write_blob, write_commit, write_tree};
    use crate::types::{Commit, CommitKind, Signature};
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    /// commit with a/b.txt = "hello" and top.txt = "top"
    fn sample_commit(repo: &Repo) -> Hash {
        let hello = write_blob(repo, b"hello").unwrap();
        let top = write_blob(repo, b"top").unwrap();
        let a = write_tree(repo, &Tree::new(vec![TreeEntry::file("b.txt", hello)]).unwrap()).unwrap();
        let root = write_tree(
            repo,
            &Tree::new(vec![TreeEntry::directory("a", a), TreeEntry::file("top.txt", top)]).unwrap(),
        )
        .unwrap();
        let sig = Signature::new("t", "t@x");
        write_commit(
            repo,
            &Commit::with_timestamp(root, None, CommitKind::Start, sig.clone(), sig, 1, ""),
        )
        .unwrap()
    }

    #[test]
    fn test_read_tree_at() {
        let (_dir, repo) = test_repo();
        let commit = sample_commit(&repo);

        let root = read_tree_at(&repo, &commit, "").unwrap();
        assert_eq!(root.len(), 2);

        let a = read_tree_at(&repo, &commit, "a").unwrap();
        let names: Vec<_> = a.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt"]);
        assert_eq!(a.get("b.txt").unwrap().kind, ObjectKind::Blob);
    }

    #[test]
    fn test_read_tree_at_errors() {
        let (_dir, repo) = test_repo();
        let commit = sample_commit(&repo);

        assert!(matches!(
            read_tree_at(&repo, &commit, "missing"),
            Err(Error::PathNotFound(_))
        ));
        assert!(matches!(
            read_tree_at(&repo, &commit, "top.txt"),
            Err(Error::NotADirectory(_))
        ));
    }

    #[test]
    fn test_file_type_at() {
        let (_dir, repo) = test_repo();
        let commit = sample_commit(&repo);

        assert_eq!(file_type_at(&repo, &commit, "").unwrap(), ObjectKind::Tree);
        assert_eq!(file_type_at(&repo, &commit, "a").unwrap(), ObjectKind::Tree);
        assert_eq!(file_type_at(&repo, &commit, "a/b.txt").unwrap(), ObjectKind::Blob);

        let missing = file_type_at(&repo, &commit, "a/nope.txt").unwrap_err();
        assert!(missing.is_not_found());
        let through_file = file_type_at(&repo, &commit, "top.txt/x").unwrap_err();
        assert!(through_file.is_not_found());
    }

    #[test]
    fn test_resolve_path_chain_existing() {
        let (_dir, repo) = test_repo();
        let commit = sample_commit(&repo);

        let chain = resolve_path_chain(&repo, &commit, "a/b.txt").unwrap();
        assert_eq!(chain.leaf(), "b.txt");
        assert_eq!(chain.current().unwrap().kind, ObjectKind::Blob);

        let trees: Vec<_> = chain.trees().collect();
        assert_eq!(trees.len(), 2);
        assert!(trees[0].get("b.txt").is_some());
        assert!(trees[1].get("top.txt").is_some());
    }

    #[test]
    fn test_resolve_path_chain_missing_directories() {
        let (_dir, repo) = test_repo();
        let commit = sample_commit(&repo);

        let chain = resolve_path_chain(&repo, &commit, "x/y/z.txt").unwrap();
        assert!(chain.current().is_none());

        let trees: Vec<_> = chain.trees().collect();
        assert_eq!(trees.len(), 3);
        assert!(trees[0].is_empty());
        assert!(trees[1].is_empty());
        assert_eq!(trees[2].len(), 2);
    }

    #[test]
    fn test_resolve_path_chain_through_file() {
        let (_dir, repo) = test_repo();
        let commit = sample_commit(&repo);

        assert!(matches!(
            resolve_path_chain(&repo, &commit, "top.txt/inner"),
            Err(Error::NotADirectory(_))
        ));
        assert!(resolve_path_chain(&repo, &commit, "").is_err());
    }
}
