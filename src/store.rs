use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CardError, Result};

/// Flat directory of site pages. Names are plain file names, never paths.
#[derive(Debug, Clone)]
pub struct SiteRoot {
    root: PathBuf,
    exclude: HashSet<String>,
}

impl SiteRoot {
    pub fn new(root: impl Into<PathBuf>, exclude: impl IntoIterator<Item = String>) -> Self {
        SiteRoot {
            root: root.into(),
            exclude: exclude.into_iter().collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_hidden(&self, name: &str) -> bool {
        name.starts_with('.') || self.exclude.contains(name)
    }

    /// Browsable files, sorted case-insensitively. Dotfiles, excluded names and directories are left out.
    pub fn list_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if self.is_hidden(&name) || !entry.path().is_file() {
                continue;
            }
            files.push(name);
        }
        files.sort_by_key(|s| s.to_lowercase());
        Ok(files)
    }

    /// Validate a requested name and return its path if it is an existing browsable file.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(CardError::InvalidName(name.to_string()));
        }
        let path = self.root.join(name);
        if self.is_hidden(name) || !path.is_file() {
            return Err(CardError::NotFound(name.to_string()));
        }
        Ok(path)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }

    /// Read as UTF-8, replacing invalid sequences.
    pub fn read_text(&self, name: &str) -> Result<String> {
        let bytes = fs::read(self.root.join(name))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn write_text(&self, name: &str, content: &str) -> Result<()> {
        fs::write(self.root.join(name), content)?;
        debug!(file = name, bytes = content.len(), "wrote file");
        Ok(())
    }

    /// `<base><suffix>` if that name is free, else `<base>-1<suffix>`, `<base>-2<suffix>`, ...
    pub fn unused_name(&self, base: &str, suffix: &str) -> String {
        let mut name = format!("{}{}", base, suffix);
        let mut counter = 1;
        while self.root.join(&name).exists() {
            name = format!("{}-{}{}", base, counter, suffix);
            counter += 1;
        }
        name
    }

    /// Write `html` as a new sibling of `name`: `<stem>-<stamp><.ext>`, with
    /// `-1`, `-2`, ... appended until the name is free. Returns the new name.
    pub fn save_snapshot(&self, name: &str, html: &str, stamp: &str) -> Result<String> {
        let path = self.resolve(name)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let new_name = self.unused_name(&format!("{}-{}", stem, stamp), &suffix);
        self.write_text(&new_name, html)?;
        Ok(new_name)
    }
}

// ── Tests ──
