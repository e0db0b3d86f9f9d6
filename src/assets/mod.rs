//! Decoded image storage and the overlay catalog.
//!
//! Scene snapshots reference pixel data by [`AssetId`] only, so the store
//! must stay alive for as long as any history that mentions its entries.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

pub type AssetId = u64;

const OVERLAY_CATALOG_FILE: &str = "overlays.json";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read overlay catalog {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("overlay catalog {path} is not a JSON array of file names: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("overlay {name} is not listed in the catalog")]
    UnknownOverlay { name: String },
}

pub type AssetResult<T> = std::result::Result<T, AssetError>;

/// One decoded image and its intrinsic dimensions.
#[derive(Debug, Clone)]
pub struct AssetRecord {
    image: RgbaImage,
}

impl AssetRecord {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[derive(Debug, Default)]
pub struct AssetStore {
    entries: HashMap<AssetId, AssetRecord>,
    next_id: AssetId,
}

impl AssetStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn insert(&mut self, image: RgbaImage) -> AssetId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        tracing::debug!(
            asset = id,
            width = image.width(),
            height = image.height(),
            "asset registered"
        );
        self.entries.insert(id, AssetRecord { image });
        id
    }

    pub fn load_from_path(&mut self, path: &Path) -> AssetResult<AssetId> {
        let image = image::open(path)
            .map_err(|source| AssetError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        Ok(self.insert(image))
    }

    pub fn get(&self, id: AssetId) -> Option<&AssetRecord> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.entries.contains_key(&id)
    }
}

/// The overlay pack listing: a directory with an `overlays.json` file naming
/// the sticker images it ships.
#[derive(Debug, Clone)]
pub struct OverlayCatalog {
    pack_dir: PathBuf,
    names: Vec<String>,
}

impl OverlayCatalog {
    pub fn load(pack_dir: &Path) -> AssetResult<Self> {
        let catalog_path = pack_dir.join(OVERLAY_CATALOG_FILE);
        let contents = fs::read_to_string(&catalog_path).map_err(|source| {
            AssetError::CatalogRead {
                path: catalog_path.clone(),
                source,
            }
        })?;
        let names = parse_catalog(&contents).map_err(|source| AssetError::CatalogParse {
            path: catalog_path,
            source,
        })?;
        tracing::debug!(pack_dir = ?pack_dir, overlays = names.len(), "overlay catalog loaded");
        Ok(Self::from_parts(pack_dir.to_path_buf(), names))
    }

    pub(crate) fn from_parts(pack_dir: PathBuf, names: Vec<String>) -> Self {
        Self { pack_dir, names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Path of a cataloged overlay, or an error for names the pack does not
    /// ship.
    pub fn resolve(&self, name: &str) -> AssetResult<PathBuf> {
        if self.names.iter().any(|entry| entry == name) {
            Ok(self.pack_dir.join(name))
        } else {
            Err(AssetError::UnknownOverlay {
                name: name.to_string(),
            })
        }
    }
}

fn parse_catalog(contents: &str) -> serde_json::Result<Vec<String>> {
    serde_json::from_str(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, image::Rgba([1, 2, 3, 255]))
    }

    #[test]
    fn insert_allocates_distinct_ids_and_stores_dimensions() {
        let mut store = AssetStore::new();
        let first = store.insert(solid_image(4, 2));
        let second = store.insert(solid_image(8, 8));
        assert_ne!(first, second);

        let record = store.get(first).expect("asset should exist");
        assert_eq!(record.width(), 4);
        assert_eq!(record.height(), 2);
        assert!(store.contains(second));
        assert!(!store.contains(999));
    }

    #[test]
    fn load_from_missing_path_reports_the_path() {
        let mut store = AssetStore::new();
        let err = store
            .load_from_path(Path::new("/nonexistent/meme.png"))
            .expect_err("load should fail");
        assert!(matches!(err, AssetError::ImageLoad { .. }));
    }

    #[test]
    fn catalog_resolves_listed_names_against_the_pack_dir() {
        let catalog = OverlayCatalog::from_parts(
            PathBuf::from("/packs/starter"),
            vec!["fire.png".to_string(), "crown.png".to_string()],
        );

        let path = catalog.resolve("crown.png").expect("name is listed");
        assert_eq!(path, PathBuf::from("/packs/starter/crown.png"));
    }

    #[test]
    fn catalog_rejects_unlisted_names() {
        let catalog = OverlayCatalog::from_parts(PathBuf::from("/packs/starter"), Vec::new());
        let err = catalog.resolve("ghost.png").expect_err("name is unlisted");
        assert!(matches!(err, AssetError::UnknownOverlay { name } if name == "ghost.png"));
    }

    #[test]
    fn parse_catalog_accepts_an_array_of_names_only() {
        let names = parse_catalog(r#"["a.png", "b.png"]"#).expect("valid catalog");
        assert_eq!(names, vec!["a.png".to_string(), "b.png".to_string()]);

        assert!(parse_catalog(r#"{"overlays": []}"#).is_err());
        assert!(parse_catalog("not json").is_err());
    }
}
