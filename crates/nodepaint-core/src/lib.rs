//! NodePaint Core Library
//!
//! Editing-state engine for an in-node painter surface: the tool-mode state
//! machine, style binding, bounded undo/redo, lock/z-order manipulation,
//! and the commit/persistence contract. Rendering, hit-testing and the wire
//! transport stay with the host.

pub mod binder;
pub mod bridge;
pub mod editor;
pub mod history;
pub mod locks;
pub mod objects;
pub mod scene;
pub mod settings;
pub mod style;
pub mod tools;

pub use binder::{
    BrushKind, BrushSpec, StyleAttr, StyleBinder, StyleEdit, StyleValue, SymmetryOptions,
    TextIndicators,
};
pub use bridge::{
    normalize_image_ref, CommitError, CommitOutcome, CommitSeq, ImageRef, PendingCommit,
    PersistenceBridge, Rasterizer, UploadError, UploadRequest, UploadResponse, Uploader,
};
pub use editor::{ControlEvent, ControlResponse, PainterEditor, ToolPrompt};
pub use history::{HistoryStack, HistoryStep, DEFAULT_MAX_STEPS};
pub use locks::{LockAndOrderController, LockFlag, LockSet, ZOrderCmd};
pub use objects::{DrawableObject, ObjectCommon, ObjectId, ObjectKind};
pub use scene::{Background, MemoryScene, SceneError, SceneGraph, SceneSnapshot};
pub use settings::{
    CanvasSize, MemorySettings, PersistedSettings, SettingsError, SettingsRegistry, SettingsStore,
};

#[cfg(not(target_arch = "wasm32"))]
pub use settings::FileSettings;
pub use style::{FontFamily, FontStyle, FontWeight, RgbColor, StyleState};
pub use tools::{ShapeFactory, ToolKind, ToolModeController};
