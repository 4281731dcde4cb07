use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

use super::loader::{read_text, AssetLoader};

/// Loads assets from files under a root directory.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `name` below the root. Absolute names and `..` are rejected.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let rel = Path::new(name);
        let plain = rel.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        plain.then(|| self.root.join(rel))
    }
}

impl AssetLoader for DirAssets {
    fn load_text(&self, name: &str) -> Option<String> {
        let Some(path) = self.resolve(name) else {
            log::error!("asset name {name:?} escapes {}", self.root.display());
            return None;
        };

        let result = File::open(&path).and_then(|f| read_text(BufReader::new(f)));
        match result {
            Ok(text) => {
                log::debug!("loaded asset {} ({} bytes)", path.display(), text.len());
                Some(text)
            }
            Err(e) => {
                log::error!("failed to read asset {}: {e}", path.display());
                None
            }
        }
    }
}

/// In-memory assets keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: HashMap<String, String>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(name.into(), text.into());
        self
    }
}

impl AssetLoader for MemoryAssets {
    fn load_text(&self, name: &str) -> Option<String> {
        let text = self.entries.get(name).cloned();
        if text.is_none() {
            log::error!("no in-memory asset named {name:?}");
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_and_normalizes_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("vertex_shader.glsl"), "attribute vec4 aPosition;\r\nvoid main(){}").unwrap();

        let assets = DirAssets::new(dir.path());
        assert_eq!(assets.root(), dir.path());
        let text = assets.load_text("vertex_shader.glsl").unwrap();
        assert_eq!(text, "attribute vec4 aPosition;\nvoid main(){}\n");
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(DirAssets::new(dir.path()).load_text("nope.glsl"), None);
    }

    #[test]
    fn parent_traversal_is_rejected() {
        let assets = DirAssets::new("/tmp/panorama");
        assert_eq!(assets.resolve("../etc/passwd"), None);
        assert_eq!(assets.resolve("/etc/passwd"), None);
        assert_eq!(assets.resolve("shaders/a.glsl"), Some(PathBuf::from("/tmp/panorama/shaders/a.glsl")));
    }

    #[test]
    fn memory_assets_serve_by_name() {
        let assets = MemoryAssets::new().with("a", "x\n");
        assert_eq!(assets.load_text("a").as_deref(), Some("x\n"));
        assert_eq!(assets.load_text("b"), None);
    }
}
