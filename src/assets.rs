use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};

const BUILTIN_VERTEX: &str = include_str!("../assets/cube.vert.wgsl");
const BUILTIN_FRAGMENT: &str = include_str!("../assets/cube.frag.wgsl");

/// Resource name of the built-in vertex stage.
pub const BUILTIN_VERTEX_NAME: &str = "cube.vert.wgsl";
/// Resource name of the built-in fragment stage.
pub const BUILTIN_FRAGMENT_NAME: &str = "cube.frag.wgsl";

/// Named text-resource lookup.
///
/// Shader sources are plain text files addressed by name; the store resolves
/// names against a directory on disk or an in-memory bundle. A compiled-in
/// bundle with the default shader pair is always available as a fallback.
#[derive(Debug, Clone)]
pub struct ResourceStore {
    backing: Backing,
}

#[derive(Debug, Clone)]
enum Backing {
    Dir(PathBuf),
    Memory {
        label: String,
        entries: HashMap<String, Arc<str>>,
    },
}

impl ResourceStore {
    /// Resolves resource names against files in `path`.
    pub fn dir<P: AsRef<Path>>(path: P) -> Self {
        Self {
            backing: Backing::Dir(path.as_ref().to_path_buf()),
        }
    }

    /// Creates a store from text already resident in memory.
    pub fn memory<I, K, V>(label: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arc<str>>,
    {
        Self {
            backing: Backing::Memory {
                label: label.into(),
                entries: entries
                    .into_iter()
                    .map(|(name, text)| (name.into(), text.into()))
                    .collect(),
            },
        }
    }

    /// The compiled-in bundle holding the default shader pair.
    pub fn builtin() -> Self {
        Self::memory(
            "builtin",
            [
                (BUILTIN_VERTEX_NAME, BUILTIN_VERTEX),
                (BUILTIN_FRAGMENT_NAME, BUILTIN_FRAGMENT),
            ],
        )
    }

    /// Returns the raw text of the named resource, no transformation.
    pub fn load_text(&self, name: &str) -> Result<String> {
        match &self.backing {
            Backing::Dir(dir) => {
                let path = dir.join(name);
                debug!("loading resource {name} from {}", path.display());
                std::fs::read_to_string(&path).map_err(|err| match err.kind() {
                    ErrorKind::NotFound => Error::ResourceNotFound {
                        name: name.to_string(),
                    },
                    _ => Error::ResourceIo {
                        name: name.to_string(),
                        source: err,
                    },
                })
            }
            Backing::Memory { label, entries } => {
                debug!("loading resource {name} from bundle {label}");
                entries
                    .get(name)
                    .map(|text| text.to_string())
                    .ok_or_else(|| Error::ResourceNotFound {
                        name: name.to_string(),
                    })
            }
        }
    }

    /// Whether the named resource can be loaded.
    pub fn contains(&self, name: &str) -> bool {
        match &self.backing {
            Backing::Dir(dir) => dir.join(name).is_file(),
            Backing::Memory { entries, .. } => entries.contains_key(name),
        }
    }

    /// Human-readable description of where resources come from.
    pub fn describe(&self) -> String {
        match &self.backing {
            Backing::Dir(dir) => format!("directory {}", dir.display()),
            Backing::Memory { label, .. } => format!("bundle {label}"),
        }
    }
}
