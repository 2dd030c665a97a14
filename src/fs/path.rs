use tracing::debug;

use crate::{
    disk::BlockDevice,
    fs::{
        config::ROOT_INODE,
        directory,
        error::{FileSystemError, Result},
        inode::{validate_name, Inode},
        volume::Volume,
    },
};

/// A path split on `/` with empty segments dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath<'a> {
    pub absolute: bool,
    pub tokens: Vec<&'a str>,
}

impl<'a> ParsedPath<'a> {
    pub fn parse(path: &'a str) -> Self {
        Self {
            absolute: path.starts_with('/'),
            tokens: path.split('/').filter(|t| !t.is_empty()).collect(),
        }
    }

    /// Every token but the last, and the last. `None` for "" and "/".
    pub fn split_last(&self) -> Option<(&[&'a str], &'a str)> {
        self.tokens
            .split_last()
            .map(|(last, init)| (init, *last))
    }
}

/// Walks the directory tree from the root or from the working directory.
#[derive(Debug)]
pub struct Resolver<'v, D> {
    volume: &'v Volume<D>,
    cwd: u32,
}

impl<'v, D: BlockDevice> Resolver<'v, D> {
    pub fn new(volume: &'v Volume<D>, cwd: u32) -> Self {
        Self { volume, cwd }
    }

    // 绝对路径从根目录开始，相对路径从当前目录开始
    fn start(&self, parsed: &ParsedPath<'_>) -> Result<Inode> {
        let number = if parsed.absolute { ROOT_INODE } else { self.cwd };
        self.volume.load(number)
    }

    /// Follow `tokens` from `current`. Interior components must be
    /// directories; the last one may be a file.
    pub fn walk(&self, mut current: Inode, tokens: &[&str], path: &str) -> Result<Inode> {
        for (i, &token) in tokens.iter().enumerate() {
            let interior = i + 1 < tokens.len();
            current = match token {
                "." => current, // 当前目录
                ".." => {
                    // 根目录没有父目录
                    let parent = current.parent().ok_or(FileSystemError::NoParent)?;
                    self.volume.load(parent)?
                }
                name => {
                    let child = directory::lookup(self.volume, &current, name)?
                        .ok_or_else(|| FileSystemError::NotFound(path.to_string()))?;
                    if child.is_file() && interior {
                        return Err(FileSystemError::NotADirectory(path.to_string()));
                    }
                    child
                }
            };
        }
        Ok(current)
    }

    /// Resolve every component. "" and "/" both name the start directory
    /// (the root for "/").
    pub fn resolve(&self, path: &str) -> Result<Inode> {
        let parsed = ParsedPath::parse(path);
        let inode = self.walk(self.start(&parsed)?, &parsed.tokens, path)?;
        debug!(path, inode = inode.number, "path resolved");
        Ok(inode)
    }

    /// Resolve all but the last component to a directory and return it with
    /// the (validated) last component.
    pub fn resolve_parent<'p>(&self, path: &'p str) -> Result<(Inode, &'p str)> {
        let parsed = ParsedPath::parse(path);
        let (init, name) = parsed
            .split_last()
            .ok_or_else(|| FileSystemError::InvalidPath(path.to_string()))?;
        validate_name(name)?;

        let parent = self.walk(self.start(&parsed)?, init, path)?;
        if parent.is_file() {
            return Err(FileSystemError::NotADirectory(path.to_string()));
        }
        Ok((parent, name))
    }
}
