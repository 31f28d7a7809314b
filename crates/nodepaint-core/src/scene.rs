//! Scene contract between the editor core and the external renderer.
//!
//! The scene graph itself (hit-testing, transforms, pixel rendering) is
//! owned by the host. The core only requires the operations below, plus a
//! lossless `serialize`/`load` round trip with idempotent `load`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::objects::{DrawableObject, ObjectId};
use crate::style::RgbColor;

/// Scene background descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Background {
    #[default]
    Transparent,
    Solid(RgbColor),
}

/// Opaque serialized scene, used for history snapshots and persisted
/// settings. The core never looks inside beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneSnapshot(String);

impl SceneSnapshot {
    /// Wrap an already-serialized scene produced by the external renderer.
    pub fn from_raw(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Scene contract errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Malformed scene snapshot: {0}")]
    Snapshot(String),
    #[error("Scene serialization failed: {0}")]
    Serialization(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Operations the editor core needs from the external scene graph.
pub trait SceneGraph {
    /// Insert an object at the front of the paint order, returning its id.
    fn add(&mut self, object: DrawableObject) -> ObjectId;

    /// Remove an object.
    fn remove(&mut self, id: ObjectId) -> Option<DrawableObject>;

    fn get(&self, id: ObjectId) -> Option<&DrawableObject>;

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut DrawableObject>;

    /// Ids in paint order, back to front.
    fn ids_ordered(&self) -> Vec<ObjectId>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every object and reset the background to transparent.
    fn clear(&mut self);

    fn background(&self) -> Background;

    fn set_background(&mut self, background: Background);

    /// Move an object one step toward the front. Returns false at the front.
    fn bring_forward(&mut self, id: ObjectId) -> bool;

    /// Move an object one step toward the back. Returns false at the back.
    fn send_backward(&mut self, id: ObjectId) -> bool;

    fn bring_to_front(&mut self, id: ObjectId);

    fn send_to_back(&mut self, id: ObjectId);

    /// Serialize the full scene into an opaque snapshot.
    fn serialize(&self) -> SceneResult<SceneSnapshot>;

    /// Replace the scene contents with a snapshot.
    ///
    /// Must be all-or-nothing: a malformed snapshot leaves the scene in its
    /// prior state. Loading the same snapshot twice yields the same state.
    fn load(&mut self, snapshot: &SceneSnapshot) -> SceneResult<()>;
}

/// Serialized form of [`MemoryScene`]; objects stored in paint order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SceneDoc {
    background: Background,
    objects: Vec<DrawableObject>,
}

/// Reference scene implementation backing the tests.
///
/// Objects keyed by id plus a separate paint-order list, so reordering never
/// touches the object data.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    objects: HashMap<ObjectId, DrawableObject>,
    z_order: Vec<ObjectId>,
    background: Background,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SceneGraph for MemoryScene {
    fn add(&mut self, object: DrawableObject) -> ObjectId {
        let id = object.id();
        self.z_order.push(id);
        self.objects.insert(id, object);
        id
    }

    fn remove(&mut self, id: ObjectId) -> Option<DrawableObject> {
        self.z_order.retain(|&other| other != id);
        self.objects.remove(&id)
    }

    fn get(&self, id: ObjectId) -> Option<&DrawableObject> {
        self.objects.get(&id)
    }

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut DrawableObject> {
        self.objects.get_mut(&id)
    }

    fn ids_ordered(&self) -> Vec<ObjectId> {
        self.z_order.clone()
    }

    fn len(&self) -> usize {
        self.objects.len()
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.z_order.clear();
        self.background = Background::Transparent;
    }

    fn background(&self) -> Background {
        self.background
    }

    fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    fn bring_forward(&mut self, id: ObjectId) -> bool {
        if let Some(pos) = self.z_order.iter().position(|&other| other == id) {
            if pos < self.z_order.len() - 1 {
                self.z_order.swap(pos, pos + 1);
                return true;
            }
        }
        false
    }

    fn send_backward(&mut self, id: ObjectId) -> bool {
        if let Some(pos) = self.z_order.iter().position(|&other| other == id) {
            if pos > 0 {
                self.z_order.swap(pos, pos - 1);
                return true;
            }
        }
        false
    }

    fn bring_to_front(&mut self, id: ObjectId) {
        if self.objects.contains_key(&id) {
            self.z_order.retain(|&other| other != id);
            self.z_order.push(id);
        }
    }

    fn send_to_back(&mut self, id: ObjectId) {
        if self.objects.contains_key(&id) {
            self.z_order.retain(|&other| other != id);
            self.z_order.insert(0, id);
        }
    }

    fn serialize(&self) -> SceneResult<SceneSnapshot> {
        let doc = SceneDoc {
            background: self.background,
            objects: self
                .z_order
                .iter()
                .filter_map(|id| self.objects.get(id))
                .cloned()
                .collect(),
        };
        let json =
            serde_json::to_string(&doc).map_err(|e| SceneError::Serialization(e.to_string()))?;
        Ok(SceneSnapshot(json))
    }

    fn load(&mut self, snapshot: &SceneSnapshot) -> SceneResult<()> {
        // Parse fully before touching any state.
        let doc: SceneDoc = serde_json::from_str(snapshot.as_str()).map_err(|e| {
            log::warn!("discarding malformed scene snapshot: {e}");
            SceneError::Snapshot(e.to_string())
        })?;
        self.objects.clear();
        self.z_order.clear();
        self.background = doc.background;
        for object in doc.objects {
            self.add(object);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{ObjectCommon, ObjectKind, RectData};
    use crate::style::StyleState;
    use kurbo::Point;

    fn rect(x: f64, y: f64) -> DrawableObject {
        DrawableObject::new(
            ObjectCommon::from_style(Point::new(x, y), &StyleState::default()),
            ObjectKind::Rect(RectData {
                width: 10.0,
                height: 10.0,
            }),
        )
    }

    #[test]
    fn test_add_remove() {
        let mut scene = MemoryScene::new();
        let id = scene.add(rect(0.0, 0.0));
        assert_eq!(scene.len(), 1);
        assert!(scene.remove(id).is_some());
        assert!(scene.is_empty());
        assert!(scene.ids_ordered().is_empty());
    }

    #[test]
    fn test_z_order_commands() {
        let mut scene = MemoryScene::new();
        let a = scene.add(rect(0.0, 0.0));
        let b = scene.add(rect(5.0, 5.0));
        let c = scene.add(rect(10.0, 10.0));

        assert_eq!(scene.ids_ordered(), vec![a, b, c]);
        scene.bring_to_front(a);
        assert_eq!(scene.ids_ordered(), vec![b, c, a]);
        scene.send_to_back(a);
        assert_eq!(scene.ids_ordered(), vec![a, b, c]);
        assert!(scene.bring_forward(b));
        assert_eq!(scene.ids_ordered(), vec![a, c, b]);
        assert!(!scene.bring_forward(b));
        assert!(scene.send_backward(c));
        assert_eq!(scene.ids_ordered(), vec![c, a, b]);
        assert!(!scene.send_backward(c));
    }

    #[test]
    fn test_serialize_load_roundtrip() {
        let mut scene = MemoryScene::new();
        scene.add(rect(1.0, 2.0));
        scene.add(rect(3.0, 4.0));
        scene.set_background(Background::Solid(crate::style::RgbColor::black()));

        let snapshot = scene.serialize().unwrap();

        let mut restored = MemoryScene::new();
        restored.load(&snapshot).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.background(), scene.background());
        assert_eq!(restored.ids_ordered(), scene.ids_ordered());

        // load is idempotent
        restored.load(&snapshot).unwrap();
        assert_eq!(restored.serialize().unwrap(), snapshot);
    }

    #[test]
    fn test_malformed_snapshot_leaves_scene_intact() {
        let mut scene = MemoryScene::new();
        scene.add(rect(0.0, 0.0));
        let before = scene.serialize().unwrap();

        let result = scene.load(&SceneSnapshot::from_raw("{not json".to_string()));
        assert!(matches!(result, Err(SceneError::Snapshot(_))));
        assert_eq!(scene.serialize().unwrap(), before);
    }

    #[test]
    fn test_clear_resets_background() {
        let mut scene = MemoryScene::new();
        scene.add(rect(0.0, 0.0));
        scene.set_background(Background::Solid(crate::style::RgbColor::white()));
        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.background(), Background::Transparent);
    }
}
