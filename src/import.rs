// ABOUTME: Module path resolution and import-cycle tracking for `import` statements

use crate::config::{MODULESPATH_SEPARATOR, MODULESPATH_VAR, SOURCE_EXTENSION};
use crate::error::RuntimeError;
use std::env;
use std::path::{Path, PathBuf};

/// Resolves an `import` path literal to a concrete file on disk.
///
/// Search order: the directory containing the currently executing file (if
/// known; absent for the REPL or an interactive session), then the current
/// working directory, then each `;`-separated entry of `MODULESPATH`. At each
/// base directory the literal path is tried first verbatim, then with a
/// `.ms` suffix appended.
pub fn resolve_module(literal: &str, executing_file: Option<&Path>) -> Result<PathBuf, RuntimeError> {
    let mut bases: Vec<PathBuf> = Vec::new();

    if let Some(file) = executing_file {
        if let Some(dir) = file.parent() {
            bases.push(dir.to_path_buf());
        }
    }
    if let Ok(cwd) = env::current_dir() {
        bases.push(cwd);
    }
    if let Ok(modulespath) = env::var(MODULESPATH_VAR) {
        for entry in modulespath.split(MODULESPATH_SEPARATOR) {
            if !entry.is_empty() {
                bases.push(PathBuf::from(entry));
            }
        }
    }

    for base in &bases {
        let candidate = base.join(literal);
        if candidate.is_file() {
            return Ok(candidate);
        }
        let with_suffix = base.join(format!("{}.{}", literal, SOURCE_EXTENSION));
        if with_suffix.is_file() {
            return Ok(with_suffix);
        }
    }

    Err(RuntimeError::ModuleNotFound(literal.to_string()))
}

/// Tracks which module paths are currently mid-import, so a cycle can be
/// reported instead of recursing forever.
#[derive(Debug, Default)]
pub struct ImportStack {
    in_progress: Vec<PathBuf>,
}

impl ImportStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to begin importing `path`. Returns an error without mutating
    /// the stack if `path` is already being imported somewhere up the chain.
    pub fn enter(&mut self, path: PathBuf) -> Result<(), RuntimeError> {
        if self.in_progress.contains(&path) {
            return Err(RuntimeError::ImportCycle(path.display().to_string()));
        }
        self.in_progress.push(path);
        Ok(())
    }

    pub fn exit(&mut self) {
        self.in_progress.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolves_literal_path_verbatim() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("util.ms");
        fs::write(&file, "var x = 1;").unwrap();
        let resolved = resolve_module(file.to_str().unwrap(), None).unwrap();
        assert_eq!(resolved, file);
    }

    #[test]
    fn resolves_against_executing_files_directory() {
        let dir = tempdir().unwrap();
        let executing = dir.path().join("main.ms");
        fs::write(&executing, "").unwrap();
        let sibling = dir.path().join("helpers.ms");
        fs::write(&sibling, "").unwrap();
        let resolved = resolve_module("helpers.ms", Some(&executing)).unwrap();
        assert_eq!(resolved, sibling);
    }

    #[test]
    fn appends_default_extension_when_missing() {
        let dir = tempdir().unwrap();
        let executing = dir.path().join("main.ms");
        fs::write(&executing, "").unwrap();
        let sibling = dir.path().join("helpers.ms");
        fs::write(&sibling, "").unwrap();
        let resolved = resolve_module("helpers", Some(&executing)).unwrap();
        assert_eq!(resolved, sibling);
    }

    #[test]
    fn missing_module_is_reported() {
        let err = resolve_module("does_not_exist_anywhere.ms", None).unwrap_err();
        assert!(matches!(err, RuntimeError::ModuleNotFound(_)));
    }

    #[test]
    fn import_stack_detects_cycle() {
        let mut stack = ImportStack::new();
        let path = PathBuf::from("/tmp/a.ms");
        stack.enter(path.clone()).unwrap();
        let err = stack.enter(path).unwrap_err();
        assert!(matches!(err, RuntimeError::ImportCycle(_)));
    }

    #[test]
    fn import_stack_allows_reentry_after_exit() {
        let mut stack = ImportStack::new();
        let path = PathBuf::from("/tmp/a.ms");
        stack.enter(path.clone()).unwrap();
        stack.exit();
        assert!(stack.enter(path).is_ok());
    }
}
