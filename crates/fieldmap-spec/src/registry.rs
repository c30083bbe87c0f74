use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::manifest::Manifest;
use crate::validation::ValidationError;

/// Layouts bundled with the crate, as `(id, yaml)`.
pub const BUILTIN_LAYOUTS: &[(&str, &str)] = &[
    (
        "municipal-panorama",
        include_str!("../layouts/municipal-panorama.yaml"),
    ),
    (
        "municipal-positional",
        include_str!("../layouts/municipal-positional.yaml"),
    ),
];

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read layout {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("layout `{origin}` is not valid YAML: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("layout `{id}` is invalid: {source}")]
    Invalid {
        id: String,
        #[source]
        source: ValidationError,
    },
    #[error("unknown layout `{id}` (available: {})", .available.join(", "))]
    Unknown { id: String, available: Vec<String> },
}

/// Parse and validate one layout. `origin` names the input in error messages.
pub fn load_layout_str(yaml: &str, origin: &str) -> Result<Manifest, LayoutError> {
    let manifest = Manifest::from_yaml_str(yaml).map_err(|source| LayoutError::Yaml {
        origin: origin.to_string(),
        source,
    })?;
    manifest.validate().map_err(|source| LayoutError::Invalid {
        id: manifest.layout.id.clone(),
        source,
    })?;
    Ok(manifest)
}

pub fn load_layout_path(path: impl AsRef<Path>) -> Result<Manifest, LayoutError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_layout_str(&text, &path.display().to_string())
}

/// Validated layouts keyed by id.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    layouts: BTreeMap<String, Manifest>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with [`BUILTIN_LAYOUTS`].
    pub fn builtin() -> Result<Self, LayoutError> {
        let mut registry = Self::new();
        for (id, yaml) in BUILTIN_LAYOUTS {
            registry.insert(load_layout_str(yaml, id)?)?;
        }
        Ok(registry)
    }

    /// Validate and add a layout, replacing any layout with the same id.
    pub fn insert(&mut self, manifest: Manifest) -> Result<Option<Manifest>, LayoutError> {
        manifest.validate().map_err(|source| LayoutError::Invalid {
            id: manifest.layout.id.clone(),
            source,
        })?;
        Ok(self.layouts.insert(manifest.layout.id.clone(), manifest))
    }

    /// Load a YAML file and add it.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<&Manifest, LayoutError> {
        let manifest = load_layout_path(path)?;
        let id = manifest.layout.id.clone();
        self.layouts.insert(id.clone(), manifest);
        self.require(&id)
    }

    pub fn get(&self, id: &str) -> Option<&Manifest> {
        self.layouts.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&Manifest, LayoutError> {
        self.layouts.get(id).ok_or_else(|| LayoutError::Unknown {
            id: id.to_string(),
            available: self.ids().map(str::to_string).collect(),
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Manifest> {
        self.layouts.values()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}
