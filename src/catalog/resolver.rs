use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::{ForgeError, ForgeResult};

/// Maps `(layer path, trait file)` to raw image bytes.
///
/// This is the only IO capability the generation core consumes. Implementations must be
/// shareable across compositing workers.
pub trait FileResolver: Send + Sync {
    /// Whether the resolver can locate the file. Used during request validation.
    fn contains(&self, layer_path: &str, file: &str) -> bool;

    /// Read the file bytes, failing with [`ForgeError::ResourceNotFound`] when unavailable.
    fn resolve(&self, layer_path: &str, file: &str) -> ForgeResult<Vec<u8>>;
}

/// Resolver reading `root/<layer path>/<file>` from the local filesystem.
#[derive(Clone, Debug)]
pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    /// Resolve files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, layer_path: &str, file: &str) -> ForgeResult<PathBuf> {
        let mut p = self.root.clone();
        if !layer_path.is_empty() {
            p.push(normalize_rel_path(layer_path)?);
        }
        p.push(normalize_rel_path(file)?);
        Ok(p)
    }
}

impl FileResolver for FsResolver {
    fn contains(&self, layer_path: &str, file: &str) -> bool {
        self.path_for(layer_path, file)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    fn resolve(&self, layer_path: &str, file: &str) -> ForgeResult<Vec<u8>> {
        let path = self.path_for(layer_path, file)?;
        std::fs::read(&path)
            .with_context(|| format!("read trait bytes from '{}'", path.display()))
            .map_err(|e| ForgeError::resource_not_found(layer_path, file, format!("{e:#}")))
    }
}

/// In-memory resolver, keyed by normalized `(layer path, file)`.
#[derive(Clone, Debug, Default)]
pub struct MemoryResolver {
    files: HashMap<(String, String), Vec<u8>>,
}

impl MemoryResolver {
    /// Empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes for `(layer path, file)`, replacing any previous entry.
    pub fn insert(&mut self, layer_path: &str, file: &str, bytes: Vec<u8>) {
        self.files
            .insert((layer_path.to_string(), file.to_string()), bytes);
    }

    /// Builder form of [`MemoryResolver::insert`].
    pub fn with(mut self, layer_path: &str, file: &str, bytes: Vec<u8>) -> Self {
        self.insert(layer_path, file, bytes);
        self
    }
}

impl FileResolver for MemoryResolver {
    fn contains(&self, layer_path: &str, file: &str) -> bool {
        self.files
            .contains_key(&(layer_path.to_string(), file.to_string()))
    }

    fn resolve(&self, layer_path: &str, file: &str) -> ForgeResult<Vec<u8>> {
        self.files
            .get(&(layer_path.to_string(), file.to_string()))
            .cloned()
            .ok_or_else(|| ForgeError::resource_not_found(layer_path, file, "not registered"))
    }
}

/// Normalize a relative path: forward slashes, no `.`/empty segments, no `..`, not absolute.
pub fn normalize_rel_path(source: &str) -> ForgeResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(ForgeError::configuration("trait paths must be relative"));
    }
    if s.is_empty() {
        return Err(ForgeError::configuration("trait path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ForgeError::configuration("trait paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ForgeError::configuration(
            "trait path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/resolver.rs"]
mod tests;
