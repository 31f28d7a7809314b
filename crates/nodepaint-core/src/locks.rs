//! Transform locks and z-order manipulation for the active selection.

use serde::{Deserialize, Serialize};

use crate::objects::{ObjectId, ObjectKind};
use crate::scene::SceneGraph;

/// Five independent transform restrictions applied to a selected object
/// while it is being manipulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSet {
    pub move_x: bool,
    pub move_y: bool,
    pub scale_x: bool,
    pub scale_y: bool,
    pub rotate: bool,
}

/// Names for the individual lock flags, as toggled by the host controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockFlag {
    MoveX,
    MoveY,
    ScaleX,
    ScaleY,
    Rotate,
}

impl LockSet {
    /// Read a single flag by name.
    pub fn get(&self, flag: LockFlag) -> bool {
        match flag {
            LockFlag::MoveX => self.move_x,
            LockFlag::MoveY => self.move_y,
            LockFlag::ScaleX => self.scale_x,
            LockFlag::ScaleY => self.scale_y,
            LockFlag::Rotate => self.rotate,
        }
    }

    /// Flip a single flag and return its new state.
    pub fn toggle(&mut self, flag: LockFlag) -> bool {
        let slot = match flag {
            LockFlag::MoveX => &mut self.move_x,
            LockFlag::MoveY => &mut self.move_y,
            LockFlag::ScaleX => &mut self.scale_x,
            LockFlag::ScaleY => &mut self.scale_y,
            LockFlag::Rotate => &mut self.rotate,
        };
        *slot = !*slot;
        *slot
    }

    /// Reset every flag. Called when the editor leaves select mode.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Paint-order commands for the active selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrderCmd {
    BringForward,
    SendBackward,
    BringToFront,
    SendToBack,
}

/// Applies lock flags and paint-order commands to the current selection.
///
/// Every operation is a silent no-op when nothing is selected.
#[derive(Debug, Clone, Default)]
pub struct LockAndOrderController {
    locks: LockSet,
    auto_front: bool,
}

impl LockAndOrderController {
    pub fn new() -> Self {
        Self {
            locks: LockSet::default(),
            // The source surface ships with click-to-front enabled.
            auto_front: true,
        }
    }

    pub fn locks(&self) -> LockSet {
        self.locks
    }

    /// Toggle one lock flag, returning its new state for the host indicator.
    pub fn toggle_lock(&mut self, flag: LockFlag) -> bool {
        self.locks.toggle(flag)
    }

    /// Clear all five flags. Runs on every Select -> Draw transition.
    pub fn clear_locks(&mut self) {
        self.locks.clear();
    }

    /// Whether newly clicked objects jump to the front of the paint order.
    pub fn auto_front(&self) -> bool {
        self.auto_front
    }

    /// Flip the standing click-to-front preference.
    pub fn toggle_auto_front(&mut self) -> bool {
        self.auto_front = !self.auto_front;
        self.auto_front
    }

    /// Copy the current flags onto the selected objects' permissions.
    ///
    /// A textbox in live text-edit keeps its movement permissions: dragging
    /// while placing a cursor must not be blocked by a movement lock.
    pub fn apply<S: SceneGraph>(&self, scene: &mut S, selection: &[ObjectId]) {
        for &id in selection {
            let Some(object) = scene.get_mut(id) else {
                continue;
            };
            let editing = matches!(&object.kind, ObjectKind::Textbox(t) if t.editing);
            object.common.locks.scale_x = self.locks.scale_x;
            object.common.locks.scale_y = self.locks.scale_y;
            object.common.locks.rotate = self.locks.rotate;
            if !editing {
                object.common.locks.move_x = self.locks.move_x;
                object.common.locks.move_y = self.locks.move_y;
            }
        }
    }

    /// Re-stack the active object in the scene's paint order.
    pub fn reorder<S: SceneGraph>(&self, scene: &mut S, active: Option<ObjectId>, cmd: ZOrderCmd) {
        let Some(id) = active else {
            return;
        };
        match cmd {
            ZOrderCmd::BringForward => {
                scene.bring_forward(id);
            }
            ZOrderCmd::SendBackward => {
                scene.send_backward(id);
            }
            ZOrderCmd::BringToFront => scene.bring_to_front(id),
            ZOrderCmd::SendToBack => scene.send_to_back(id),
        }
    }
}
