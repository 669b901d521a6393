use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::hash::{compute_object_hash, Hash};

/// a directory tree - collection of entries sorted by name
///
/// canonical form is one line per entry, `mode SP kind SP id TAB name`,
/// sorted byte-wise by name and joined with newlines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// create a new tree, validating and sorting entries
    pub fn new(mut entries: Vec<TreeEntry>) -> Result<Self> {
        for entry in &entries {
            validate_entry_name(&entry.name)?;
        }

        // sort by name (byte-wise)
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

        for window in entries.windows(2) {
            if window[0].name == window[1].name {
                return Err(Error::DuplicateEntryName(window[0].name.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// create an empty tree
    pub fn empty() -> Self {
        Self { entries: vec![] }
    }

    /// id of the empty tree
    pub fn empty_id() -> Hash {
        Self::empty().hash()
    }

    /// get entries slice
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// consume and return entries
    pub fn into_entries(self) -> Vec<TreeEntry> {
        self.entries
    }

    /// look up entry by name
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.position(name).ok().map(|i| &self.entries[i])
    }

    /// insert an entry, replacing any existing entry with the same name
    pub fn insert(&mut self, entry: TreeEntry) -> Result<Option<TreeEntry>> {
        validate_entry_name(&entry.name)?;
        match self.position(&entry.name) {
            Ok(i) => Ok(Some(std::mem::replace(&mut self.entries[i], entry))),
            Err(i) => {
                self.entries.insert(i, entry);
                Ok(None)
            }
        }
    }

    /// remove an entry by name
    pub fn remove(&mut self, name: &str) -> Option<TreeEntry> {
        self.position(name).ok().map(|i| self.entries.remove(i))
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is tree empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// serialize to the canonical listing
    pub fn to_canonical(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// parse a listing in canonical form
    ///
    /// entry order in the input does not matter. any line that does not
    /// match `mode SP kind SP id TAB name` makes the whole listing unparseable.
    pub fn parse(listing: &str) -> Result<Self> {
        let entries = listing
            .trim_end_matches('\n')
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(TreeEntry::parse_line)
            .collect::<Result<Vec<_>>>()?;
        Tree::new(entries)
    }

    /// object id of this tree
    pub fn hash(&self) -> Hash {
        compute_object_hash("tree", self.to_canonical().as_bytes())
    }

    fn position(&self, name: &str) -> std::result::Result<usize, usize> {
        self.entries
            .binary_search_by(|e| e.name.as_bytes().cmp(name.as_bytes()))
    }
}

/// validate an entry name
pub(crate) fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidEntryName("empty name".to_string()));
    }
    if name.contains('/') {
        return Err(Error::InvalidEntryName(format!(
            "name contains '/': {}",
            name
        )));
    }
    if name.contains('\0') || name.contains('\n') || name.contains('\t') {
        return Err(Error::InvalidEntryName(format!(
            "name contains control character: {:?}",
            name
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::InvalidEntryName(format!("reserved name: {}", name)));
    }
    Ok(())
}

/// a single entry in a tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub mode: FileMode,
    pub kind: ObjectKind,
    pub hash: Hash,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, mode: FileMode, hash: Hash) -> Self {
        Self {
            name: name.into(),
            mode,
            kind: mode.kind(),
            hash,
        }
    }

    /// regular file entry
    pub fn file(name: impl Into<String>, hash: Hash) -> Self {
        Self::new(name, FileMode::Regular, hash)
    }

    /// directory entry
    pub fn directory(name: impl Into<String>, hash: Hash) -> Self {
        Self::new(name, FileMode::Directory, hash)
    }

    pub fn is_tree(&self) -> bool {
        self.kind == ObjectKind::Tree
    }

    fn parse_line(line: &str) -> Result<Self> {
        let unparseable = || Error::Unparseable(format!("tree entry: {:?}", line));

        let (meta, name) = line.split_once('\t').ok_or_else(unparseable)?;
        let mut fields = meta.split(' ');
        let (mode, kind, hash) = match (fields.next(), fields.next(), fields.next(), fields.next())
        {
            (Some(mode), Some(kind), Some(hash), None) => (mode, kind, hash),
            _ => return Err(unparseable()),
        };

        let mode: FileMode = mode.parse()?;
        let kind: ObjectKind = kind.parse()?;
        if mode.kind() != kind {
            return Err(unparseable());
        }
        let hash = Hash::from_hex(hash).map_err(|_| unparseable())?;

        Ok(Self {
            name: name.to_string(),
            mode,
            kind,
            hash,
        })
    }
}

impl fmt::Display for TreeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}\t{}", self.mode, self.kind, self.hash, self.name)
    }
}

/// object kind referenced by a tree entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            other => Err(Error::Unparseable(format!("object kind: {}", other))),
        }
    }
}

/// entry mode, written as octal text in the canonical form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// 100644
    Regular,
    /// 100755
    Executable,
    /// 040000
    Directory,
}

impl FileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::Regular => "100644",
            FileMode::Executable => "100755",
            FileMode::Directory => "040000",
        }
    }

    /// the object kind an entry with this mode points at
    pub fn kind(&self) -> ObjectKind {
        match self {
            FileMode::Directory => ObjectKind::Tree,
            FileMode::Regular | FileMode::Executable => ObjectKind::Blob,
        }
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "100644" => Ok(FileMode::Regular),
            "100755" => Ok(FileMode::Executable),
            // git prints directories without the leading zero
            "040000" | "40000" => Ok(FileMode::Directory),
            other => Err(Error::Unparseable(format!("file mode: {}", other))),
        }
    }
}
