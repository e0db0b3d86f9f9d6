//! Scene rasterization and PNG export.
//!
//! Sequencing only: background fill, then per object flip, scale, rotate and
//! alpha-overlay, then the crop region. The pixel work itself belongs to the
//! `image` crate.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::assets::{AssetId, AssetStore};
use crate::scene::{Placement, Rotation, Scene};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("scene references asset {asset} which is not loaded")]
    MissingAsset { asset: AssetId },

    #[error("failed to encode png: {0}")]
    Encode(#[source] image::ImageError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Flattens the scene into one RGBA image.
pub fn compose(scene: &Scene, assets: &AssetStore) -> RenderResult<RgbaImage> {
    let size = scene.size();
    let background = image::Rgba(scene.background().channels());
    let mut output = RgbaImage::from_pixel(size.width, size.height, background);

    for object in scene.objects() {
        let record = assets
            .get(object.asset)
            .ok_or(RenderError::MissingAsset {
                asset: object.asset,
            })?;
        let sprite = rasterize(record.image(), &object.placement);
        let left = object.placement.left.round() as i64;
        let top = object.placement.top.round() as i64;
        imageops::overlay(&mut output, &sprite, left, top);
    }

    if let Some(crop) = scene.crop() {
        let crop = crop.clamped_to(size);
        output = imageops::crop_imm(&output, crop.x, crop.y, crop.width, crop.height).to_image();
    }

    tracing::debug!(
        width = output.width(),
        height = output.height(),
        objects = scene.objects().len(),
        "scene composed"
    );
    Ok(output)
}

/// Applies one object's transform chain: flip, scale, then quarter-turn
/// rotation.
fn rasterize(source: &RgbaImage, placement: &Placement) -> RgbaImage {
    let mut sprite = source.clone();
    if placement.flip_x {
        sprite = imageops::flip_horizontal(&sprite);
    }
    if placement.flip_y {
        sprite = imageops::flip_vertical(&sprite);
    }

    let target_width = scaled_dimension(sprite.width(), placement.scale_x);
    let target_height = scaled_dimension(sprite.height(), placement.scale_y);
    if target_width != sprite.width() || target_height != sprite.height() {
        sprite = imageops::resize(&sprite, target_width, target_height, FilterType::Triangle);
    }

    match placement.rotation {
        Rotation::None => sprite,
        Rotation::Quarter => imageops::rotate90(&sprite),
        Rotation::Half => imageops::rotate180(&sprite),
        Rotation::ThreeQuarter => imageops::rotate270(&sprite),
    }
}

fn scaled_dimension(pixels: u32, scale: f64) -> u32 {
    let scaled = (f64::from(pixels) * scale).round().max(1.0);
    if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

/// Composes the scene and encodes it as PNG bytes.
pub fn export_png_bytes(scene: &Scene, assets: &AssetStore) -> RenderResult<Vec<u8>> {
    let image = compose(scene, assets)?;
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(RenderError::Encode)?;
    Ok(buffer.into_inner())
}

/// Composes the scene and writes it to `path` as PNG.
pub fn export_png(scene: &Scene, assets: &AssetStore, path: &Path) -> RenderResult<()> {
    let image = compose(scene, assets)?;
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = ?path, "composition exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CanvasSize, Color, CropRect};
    use crate::scene::ObjectRole;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn scene_with(size: CanvasSize) -> Scene {
        Scene::new(size, Color::WHITE)
    }

    /// 2x2 image: left column red, right column blue.
    fn two_column_image() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(2, 2, RED);
        img.put_pixel(1, 0, BLUE);
        img.put_pixel(1, 1, BLUE);
        img
    }

    #[test]
    fn compose_fills_an_empty_scene_with_the_background() {
        let scene = scene_with(CanvasSize::new(3, 2));
        let assets = AssetStore::new();
        let image = compose(&scene, &assets).expect("compose should succeed");
        assert_eq!(image.dimensions(), (3, 2));
        assert!(image.pixels().all(|pixel| *pixel == WHITE));
    }

    #[test]
    fn compose_places_an_object_at_its_placement() {
        let mut assets = AssetStore::new();
        let asset = assets.insert(two_column_image());
        let mut scene = scene_with(CanvasSize::new(4, 4));
        scene.insert(ObjectRole::Overlay, asset, Placement::at(1.0, 1.0));

        let image = compose(&scene, &assets).expect("compose should succeed");
        assert_eq!(*image.get_pixel(0, 0), WHITE);
        assert_eq!(*image.get_pixel(1, 1), RED);
        assert_eq!(*image.get_pixel(2, 1), BLUE);
        assert_eq!(*image.get_pixel(3, 3), WHITE);
    }

    #[test]
    fn horizontal_flip_swaps_the_columns() {
        let mut assets = AssetStore::new();
        let asset = assets.insert(two_column_image());
        let mut scene = scene_with(CanvasSize::new(2, 2));
        let mut placement = Placement::at(0.0, 0.0);
        placement.toggle_flip_x();
        scene.insert(ObjectRole::Overlay, asset, placement);

        let image = compose(&scene, &assets).expect("compose should succeed");
        assert_eq!(*image.get_pixel(0, 0), BLUE);
        assert_eq!(*image.get_pixel(1, 0), RED);
    }

    #[test]
    fn quarter_turn_rotates_the_columns_into_rows() {
        let mut assets = AssetStore::new();
        let asset = assets.insert(two_column_image());
        let mut scene = scene_with(CanvasSize::new(2, 2));
        let mut placement = Placement::at(0.0, 0.0);
        placement.rotate_quarter_turn();
        scene.insert(ObjectRole::Overlay, asset, placement);

        // rotate90 maps the left column onto the top row.
        let image = compose(&scene, &assets).expect("compose should succeed");
        assert_eq!(*image.get_pixel(0, 0), RED);
        assert_eq!(*image.get_pixel(1, 0), RED);
        assert_eq!(*image.get_pixel(0, 1), BLUE);
        assert_eq!(*image.get_pixel(1, 1), BLUE);
    }

    #[test]
    fn scaling_doubles_the_sprite_footprint() {
        let mut assets = AssetStore::new();
        let asset = assets.insert(RgbaImage::from_pixel(2, 2, RED));
        let mut scene = scene_with(CanvasSize::new(4, 4));
        scene.insert(
            ObjectRole::Overlay,
            asset,
            Placement::at(0.0, 0.0).with_uniform_scale(2.0),
        );

        let image = compose(&scene, &assets).expect("compose should succeed");
        assert!(image.pixels().all(|pixel| *pixel == RED));
    }

    #[test]
    fn crop_region_trims_the_output() {
        let mut assets = AssetStore::new();
        let asset = assets.insert(RgbaImage::from_pixel(4, 4, RED));
        let mut scene = scene_with(CanvasSize::new(4, 4));
        scene.insert(ObjectRole::Base, asset, Placement::at(0.0, 0.0));
        scene.set_crop(CropRect::new(1, 1, 2, 2));

        let image = compose(&scene, &assets).expect("compose should succeed");
        assert_eq!(image.dimensions(), (2, 2));
    }

    #[test]
    fn compose_reports_missing_assets() {
        let assets = AssetStore::new();
        let mut scene = scene_with(CanvasSize::new(2, 2));
        scene.insert(ObjectRole::Base, 5, Placement::at(0.0, 0.0));

        let err = compose(&scene, &assets).expect_err("compose should fail");
        assert!(matches!(err, RenderError::MissingAsset { asset: 5 }));
    }

    #[test]
    fn export_png_bytes_produces_a_png_signature() {
        let scene = scene_with(CanvasSize::new(2, 2));
        let assets = AssetStore::new();
        let bytes = export_png_bytes(&scene, &assets).expect("export should succeed");
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);
    }
}
