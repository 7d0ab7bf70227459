//! Source file discovery and module attribution

use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::model::UNKNOWN_MODULE;

/// Error walking the modules tree. Any of these aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("Modules directory {0} does not exist or is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to read directory {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("Invalid module prefix {0:?}")]
    Pattern(String, #[source] regex::Error),
}

/// A source file selected for scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub dir: PathBuf,
    pub file_name: String,
    pub module: String,
}

impl SourceFile {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Decides which module a directory belongs to.
#[derive(Debug, Clone)]
pub struct ModuleMatcher {
    pattern: Regex,
}

impl ModuleMatcher {
    /// Module directories are named `<prefix>` followed by a capitalised word,
    /// such as `gmCore` or `gmGraphics`.
    pub fn new(prefix: &str) -> Result<Self, LocateError> {
        let pattern = Regex::new(&format!("^{}[A-Z][a-zA-Z]+$", regex::escape(prefix)))
            .map_err(|e| LocateError::Pattern(prefix.to_string(), e))?;
        Ok(Self { pattern })
    }

    pub fn is_module_name(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// First path component naming a module, or `Unknown`.
    pub fn module_of(&self, dir: &Path) -> String {
        dir.components()
            .filter_map(|c| c.as_os_str().to_str())
            .find(|name| self.is_module_name(name))
            .unwrap_or(UNKNOWN_MODULE)
            .to_string()
    }
}

/// Walks a modules tree yielding the source files in it.
///
/// Entries within a directory are visited in file name order, so two walks
/// over the same tree yield the same sequence.
pub struct SourceLocator<'a> {
    root: PathBuf,
    suffixes: &'a [String],
    modules: &'a ModuleMatcher,
}

impl<'a> SourceLocator<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        suffixes: &'a [String],
        modules: &'a ModuleMatcher,
    ) -> Result<Self, LocateError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(LocateError::NotADirectory(root));
        }
        Ok(Self {
            root,
            suffixes,
            modules,
        })
    }

    fn is_source(&self, file_name: &str) -> bool {
        self.suffixes.iter().any(|s| file_name.ends_with(s.as_str()))
    }

    /// Lazily enumerate source files. Yields an error and should be abandoned
    /// when a directory cannot be read.
    pub fn files(&self) -> impl Iterator<Item = Result<SourceFile, LocateError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(source) => {
                        let path = source
                            .path()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| self.root.clone());
                        return Some(Err(LocateError::Walk { path, source }));
                    }
                };
                if !entry.file_type().is_file() {
                    return None;
                }
                let file_name = entry.file_name().to_str()?;
                if !self.is_source(file_name) {
                    return None;
                }
                let dir = entry.path().parent()?.to_path_buf();
                Some(Ok(SourceFile {
                    module: self.modules.module_of(&dir),
                    file_name: file_name.to_string(),
                    dir,
                }))
            })
    }

    /// Collect every source file, failing on the first unreadable directory.
    pub fn collect(&self) -> Result<Vec<SourceFile>, LocateError> {
        self.files().collect()
    }
}
