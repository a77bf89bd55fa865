use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A media file referenced by an entry draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProxy {
    pub path: String,
    pub public_path: String,
    #[serde(default, skip_serializing)]
    pub file: Option<Vec<u8>>,
    /// Already stored by the backend; nothing to upload on persist.
    pub uploaded: bool,
}

impl AssetProxy {
    pub fn new(path: impl Into<String>, file: Vec<u8>) -> Self {
        let path = path.into();
        Self {
            public_path: public_path(&path),
            path,
            file: Some(file),
            uploaded: false,
        }
    }

    /// Stand-in for a path the media library does not know about.
    pub fn placeholder(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            public_path: public_path(&path),
            path,
            file: None,
            uploaded: true,
        }
    }
}

fn public_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Media files added during the editing session, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    assets: HashMap<String, AssetProxy>,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, asset: AssetProxy) {
        self.assets.insert(asset.path.clone(), asset);
    }

    pub fn remove(&mut self, path: &str) -> Option<AssetProxy> {
        self.assets.remove(path)
    }

    pub fn get_asset(&self, path: &str) -> AssetProxy {
        self.assets
            .get(path)
            .cloned()
            .unwrap_or_else(|| AssetProxy::placeholder(path))
    }

    /// Resolve every media path of a draft, in order.
    pub fn resolve<'a>(&self, paths: impl IntoIterator<Item = &'a String>) -> Vec<AssetProxy> {
        paths.into_iter().map(|path| self.get_asset(path)).collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
