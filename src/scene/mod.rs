//! The canvas object graph that snapshots serialize.
//!
//! A [`Scene`] is a plain serde document: canvas dimensions, background
//! color, the ordered object list and an optional crop region. Everything the
//! undo/redo history needs to reproduce a composition lives here; pixel data
//! stays in the asset store and is referenced by id.

mod placement;

pub use placement::{Placement, Rotation};

use crate::assets::AssetId;
use crate::geometry::{CanvasSize, Color, CropRect};
use serde::{Deserialize, Serialize};

pub type ObjectId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectRole {
    /// The uploaded base image. Pinned: cannot be targeted for editing.
    Base,
    /// A sticker/decal the user can flip, rotate, move, scale and delete.
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    pub role: ObjectRole,
    pub asset: AssetId,
    pub placement: Placement,
}

impl SceneObject {
    pub const fn is_selectable(&self) -> bool {
        matches!(self.role, ObjectRole::Overlay)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    size: CanvasSize,
    background: Color,
    objects: Vec<SceneObject>,
    crop: Option<CropRect>,
    next_id: ObjectId,
}

impl Scene {
    pub fn new(size: CanvasSize, background: Color) -> Self {
        Self {
            size,
            background,
            objects: Vec::new(),
            crop: None,
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    pub fn set_size(&mut self, size: CanvasSize) {
        self.size = size;
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|object| object.id == id)
    }

    pub fn insert(&mut self, role: ObjectRole, asset: AssetId, placement: Placement) -> ObjectId {
        let id = self.allocate_id();
        self.objects.push(SceneObject {
            id,
            role,
            asset,
            placement,
        });
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|object| object.id == id)?;
        Some(self.objects.remove(index))
    }

    /// Drops every object and the crop region. Id allocation keeps running so
    /// snapshots taken before and after a clear never reuse ids.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.crop = None;
    }

    pub fn first_with_role(&self, role: ObjectRole) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.role == role)
    }

    pub fn crop(&self) -> Option<CropRect> {
        self.crop
    }

    pub fn set_crop(&mut self, crop: CropRect) {
        self.crop = Some(crop);
    }

    pub fn clear_crop(&mut self) -> bool {
        self.crop.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_scene() -> Scene {
        Scene::new(CanvasSize::new(640, 360), Color::WHITE)
    }

    #[test]
    fn insert_allocates_monotonic_ids() {
        let mut scene = test_scene();
        let first = scene.insert(ObjectRole::Base, 1, Placement::at(0.0, 0.0));
        let second = scene.insert(ObjectRole::Overlay, 2, Placement::at(10.0, 10.0));
        assert!(second > first);
        assert_eq!(scene.objects().len(), 2);
    }

    #[test]
    fn clear_keeps_id_allocation_running() {
        let mut scene = test_scene();
        let before = scene.insert(ObjectRole::Base, 1, Placement::at(0.0, 0.0));
        scene.clear();
        assert!(scene.objects().is_empty());

        let after = scene.insert(ObjectRole::Base, 1, Placement::at(0.0, 0.0));
        assert!(after > before);
    }

    #[test]
    fn remove_returns_the_object_and_drops_it() {
        let mut scene = test_scene();
        let id = scene.insert(ObjectRole::Overlay, 7, Placement::at(5.0, 5.0));
        let removed = scene.remove(id).expect("object should exist");
        assert_eq!(removed.asset, 7);
        assert!(scene.object(id).is_none());
        assert!(scene.remove(id).is_none());
    }

    #[test]
    fn only_overlays_are_selectable() {
        let mut scene = test_scene();
        let base = scene.insert(ObjectRole::Base, 1, Placement::at(0.0, 0.0));
        let overlay = scene.insert(ObjectRole::Overlay, 2, Placement::at(0.0, 0.0));

        assert!(!scene.object(base).expect("base exists").is_selectable());
        assert!(scene.object(overlay).expect("overlay exists").is_selectable());
    }

    #[test]
    fn first_with_role_finds_the_base_object() {
        let mut scene = test_scene();
        scene.insert(ObjectRole::Overlay, 2, Placement::at(0.0, 0.0));
        let base = scene.insert(ObjectRole::Base, 1, Placement::at(0.0, 0.0));

        let found = scene
            .first_with_role(ObjectRole::Base)
            .expect("base should be found");
        assert_eq!(found.id, base);
    }

    #[test]
    fn crop_set_and_clear_round_trip() {
        let mut scene = test_scene();
        assert!(!scene.clear_crop());

        scene.set_crop(CropRect::new(10, 10, 100, 100));
        assert_eq!(scene.crop(), Some(CropRect::new(10, 10, 100, 100)));
        assert!(scene.clear_crop());
        assert!(scene.crop().is_none());
    }

    #[test]
    fn scene_serde_round_trip_preserves_the_document() {
        let mut scene = test_scene();
        scene.insert(ObjectRole::Base, 1, Placement::at(0.0, 0.0));
        let overlay = scene.insert(
            ObjectRole::Overlay,
            2,
            Placement::at(100.0, 100.0).with_uniform_scale(0.5),
        );
        scene
            .object_mut(overlay)
            .expect("overlay exists")
            .placement
            .toggle_flip_x();
        scene.set_crop(CropRect::new(0, 0, 320, 180));

        let json = serde_json::to_string(&scene).expect("scene should serialize");
        let restored: Scene = serde_json::from_str(&json).expect("scene should deserialize");
        assert_eq!(restored, scene);
    }
}
