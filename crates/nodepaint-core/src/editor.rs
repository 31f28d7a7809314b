//! Top-level painter editor: event dispatch and component orchestration.
//!
//! Pointer and control events enter here and fan out to the tool state
//! machine, the style binder, the lock/z-order controller, the history
//! stack, and the persistence bridge. Control handling is one exhaustive
//! dispatch table composed at construction; handlers are never reassigned
//! at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Point;

use crate::binder::{StyleBinder, StyleEdit, TextIndicators};
use crate::bridge::{
    CommitError, CommitOutcome, CommitSeq, PendingCommit, PersistenceBridge, Rasterizer,
    UploadError, UploadResponse, Uploader,
};
use crate::history::{HistoryStack, HistoryStep};
use crate::locks::{LockAndOrderController, LockFlag, ZOrderCmd};
use crate::objects::{
    CharSpan, DrawableObject, ImageData, ObjectCommon, ObjectId, ObjectKind,
};
use crate::scene::{Background, SceneGraph, SceneSnapshot};
use crate::settings::{
    BoxFuture, CanvasSize, PersistedSettings, SettingsResult, SettingsStore,
};
use crate::style::{FontFamily, RgbColor};
use crate::tools::{resize_placement, ShapeFactory, ToolKind, ToolModeController};

/// Follow-up actions a control event asks of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolPrompt {
    /// Open a file picker; feed the result to [`PainterEditor::insert_image`].
    PickImage,
}

/// Control events, keyed by control identifier.
#[derive(Debug, Clone)]
pub enum ControlEvent {
    SelectTool(ToolKind),
    ToggleMode,
    ToggleLock(LockFlag),
    ZOrder(ZOrderCmd),
    ToggleAutoFront,
    /// Control value previewed but not yet finalized.
    StylePreview(StyleEdit),
    /// Control value finalized.
    StyleCommit(StyleEdit),
    SetFontFamily(FontFamily),
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    ToggleSymmetryAxis(usize),
    Undo,
    Redo,
    ClearCanvas,
    SetBackgroundColor(RgbColor),
    ToggleTransparentBackground,
    SelectObject(ObjectId),
    RemoveActive,
    SetCanvasSize(u32, u32),
}

/// What a handled control produced.
#[derive(Default)]
pub struct ControlResponse {
    /// Upload started by a committing control; the host drives it and calls
    /// [`PainterEditor::finish_commit`].
    pub pending: Option<PendingCommit>,
    pub prompt: Option<ToolPrompt>,
}

impl ControlResponse {
    fn none() -> Self {
        Self::default()
    }

    fn committing(pending: Option<PendingCommit>) -> Self {
        Self {
            pending,
            prompt: None,
        }
    }

    fn prompting(prompt: ToolPrompt) -> Self {
        Self {
            pending: None,
            prompt: Some(prompt),
        }
    }
}

/// The editing surface for one painter node.
pub struct PainterEditor<S, R, U, T>
where
    S: SceneGraph,
    R: Rasterizer<S>,
    U: Uploader + 'static,
    T: SettingsStore + 'static,
{
    scene: S,
    rasterizer: R,
    tools: ToolModeController,
    binder: StyleBinder,
    locks: LockAndOrderController,
    history: HistoryStack,
    bridge: PersistenceBridge<U, T>,
    selection: Vec<ObjectId>,
    canvas_size: CanvasSize,
    background_color: RgbColor,
    drag_anchor: Option<Point>,
    /// Objects whose affordances were stripped for the in-flight rasterize.
    stripped: Vec<ObjectId>,
}

impl<S, R, U, T> PainterEditor<S, R, U, T>
where
    S: SceneGraph,
    R: Rasterizer<S>,
    U: Uploader + 'static,
    T: SettingsStore + 'static,
{
    pub fn new(
        scene: S,
        rasterizer: R,
        uploader: Arc<U>,
        store: Arc<T>,
        node_key: impl Into<String>,
    ) -> Self {
        let tools = ToolModeController::new();
        let mut binder = StyleBinder::new();
        binder.rebuild_brush(tools.active());
        Self {
            scene,
            rasterizer,
            tools,
            binder,
            locks: LockAndOrderController::new(),
            history: HistoryStack::default(),
            bridge: PersistenceBridge::new(uploader, store, node_key),
            selection: Vec::new(),
            canvas_size: CanvasSize::default(),
            background_color: RgbColor::black(),
            drag_anchor: None,
            stripped: Vec::new(),
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable scene access for the host renderer (e.g. inserting finished
    /// brush strokes).
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn tools(&self) -> &ToolModeController {
        &self.tools
    }

    pub fn binder(&self) -> &StyleBinder {
        &self.binder
    }

    pub fn locks(&self) -> &LockAndOrderController {
        &self.locks
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn bridge(&self) -> &PersistenceBridge<U, T> {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut PersistenceBridge<U, T> {
        &mut self.bridge
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas_size
    }

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn active_object(&self) -> Option<&DrawableObject> {
        self.selection.first().and_then(|&id| self.scene.get(id))
    }

    // ----- control dispatch -----

    /// Single dispatch table for every UI control.
    pub fn handle_control(&mut self, event: ControlEvent) -> ControlResponse {
        match event {
            ControlEvent::SelectTool(tool) => match self.select_tool(tool) {
                Some(prompt) => ControlResponse::prompting(prompt),
                None => ControlResponse::none(),
            },
            ControlEvent::ToggleMode => {
                self.toggle_mode();
                ControlResponse::none()
            }
            ControlEvent::ToggleLock(flag) => {
                self.toggle_lock(flag);
                ControlResponse::none()
            }
            ControlEvent::ZOrder(cmd) => {
                self.reorder(cmd);
                ControlResponse::none()
            }
            ControlEvent::ToggleAutoFront => {
                self.locks.toggle_auto_front();
                ControlResponse::none()
            }
            ControlEvent::StylePreview(edit) => {
                self.set_style(edit, false);
                ControlResponse::none()
            }
            ControlEvent::StyleCommit(edit) => ControlResponse::committing(self.set_style(edit, true)),
            ControlEvent::SetFontFamily(family) => {
                self.set_font_family(family);
                ControlResponse::none()
            }
            ControlEvent::ToggleBold => {
                self.toggle_bold();
                ControlResponse::none()
            }
            ControlEvent::ToggleItalic => {
                self.toggle_italic();
                ControlResponse::none()
            }
            ControlEvent::ToggleUnderline => {
                self.toggle_underline();
                ControlResponse::none()
            }
            ControlEvent::ToggleSymmetryAxis(index) => {
                self.binder.toggle_symmetry_axis(index);
                ControlResponse::none()
            }
            ControlEvent::Undo => {
                self.undo();
                ControlResponse::none()
            }
            ControlEvent::Redo => {
                self.redo();
                ControlResponse::none()
            }
            ControlEvent::ClearCanvas => ControlResponse::committing(self.clear_canvas()),
            ControlEvent::SetBackgroundColor(color) => {
                ControlResponse::committing(self.set_background_color(color))
            }
            ControlEvent::ToggleTransparentBackground => {
                ControlResponse::committing(self.toggle_transparent_background())
            }
            ControlEvent::SelectObject(id) => {
                self.select_object(id);
                ControlResponse::none()
            }
            ControlEvent::RemoveActive => ControlResponse::committing(self.remove_active()),
            ControlEvent::SetCanvasSize(width, height) => {
                self.set_canvas_size(width, height);
                ControlResponse::none()
            }
        }
    }

    // ----- tool mode -----

    /// Change the active tool.
    ///
    /// Image and Textbox require immediate placement, so selecting them
    /// while browsing forces a transition back to Draw.
    pub fn select_tool(&mut self, tool: ToolKind) -> Option<ToolPrompt> {
        if self.tools.is_selecting() && tool.is_insert() {
            self.toggle_mode();
        }
        self.tools.set_active(tool);
        match tool {
            t if t.is_free_drawing() => {
                self.binder.rebuild_brush(t);
                None
            }
            ToolKind::Image => Some(ToolPrompt::PickImage),
            ToolKind::Textbox => {
                let object = ShapeFactory::create_textbox(Point::ZERO, self.binder.state());
                // Mirror the hairline stroke back into the width control.
                self.binder.apply_edit(StyleEdit::StrokeWidth(1.0));
                let id = self.scene.add(object);
                self.selection = vec![id];
                None
            }
            _ => None,
        }
    }

    /// Flip Draw <-> Select.
    pub fn toggle_mode(&mut self) {
        if self.tools.is_selecting() {
            self.tools.enter_draw();
            self.selection.clear();
            self.locks.clear_locks();
            self.binder.rebuild_brush(self.tools.active());
        } else {
            self.tools.enter_select();
            self.locks.clear_locks();
        }
        self.drag_anchor = None;
    }

    // ----- pointer events -----

    pub fn pointer_down(&mut self, point: Point) {
        if self.tools.is_selecting() {
            if self.locks.auto_front() {
                if let Some(&id) = self.selection.first() {
                    self.scene.bring_to_front(id);
                }
            }
            self.locks.apply(&mut self.scene, &self.selection);
            self.drag_anchor = Some(point);
            return;
        }

        self.tools.engage();
        if !self.tools.is_continuous() {
            return;
        }
        let tool = self.tools.active();
        if tool.is_free_drawing() || tool.is_insert() {
            // Continuous strokes run in the external brush; inserts happen
            // at tool selection.
            return;
        }
        if let Some(object) = ShapeFactory::create(tool, point, self.binder.state()) {
            let id = self.scene.add(object);
            self.selection = vec![id];
            self.tools.begin_placement(point, id);
        }
    }

    pub fn pointer_move(&mut self, point: Point) {
        if self.tools.is_selecting() {
            self.locks.apply(&mut self.scene, &self.selection);
            if let Some(anchor) = self.drag_anchor {
                // Manipulating an existing object always leaves drawing off.
                self.tools.suspend_continuous();
                let delta = point - anchor;
                if let Some(&id) = self.selection.first() {
                    if let Some(object) = self.scene.get_mut(id) {
                        object.translate(delta);
                    }
                }
                self.drag_anchor = Some(point);
            }
            return;
        }

        if !self.tools.is_continuous() {
            return;
        }
        if self.tools.active().is_free_drawing() {
            return;
        }
        if let Some(placement) = self.tools.placement() {
            if let Some(object) = self.scene.get_mut(placement.id) {
                resize_placement(object, placement.origin, point);
            }
        }
    }

    /// Finalize the gesture and commit.
    pub fn pointer_up(&mut self) -> Option<PendingCommit> {
        for id in self.scene.ids_ordered() {
            if let Some(object) = self.scene.get_mut(id) {
                if !object.common.removable {
                    object.common.removable = true;
                }
            }
        }
        self.drag_anchor = None;
        self.tools.end_gesture();
        self.commit()
    }

    // ----- selection & object list -----

    /// Activate an object, populating the style controls from it while in
    /// Select mode.
    pub fn select_object(&mut self, id: ObjectId) {
        let Some(object) = self.scene.get(id) else {
            return;
        };
        if self.tools.is_selecting() {
            self.binder.populate_from_object(object);
        }
        self.selection = vec![id];
    }

    /// Object list for the Select panel: `{kind}_{n}` labels in paint
    /// order.
    pub fn object_list(&self) -> Vec<(String, ObjectId)> {
        let mut counts: HashMap<&'static str, usize> = HashMap::new();
        self.scene
            .ids_ordered()
            .into_iter()
            .filter_map(|id| self.scene.get(id))
            .map(|object| {
                let count = counts.entry(object.kind_name()).or_insert(0);
                *count += 1;
                (format!("{}_{}", object.kind_name(), count), object.id())
            })
            .collect()
    }

    /// Activate the object with the given list label.
    pub fn select_by_label(&mut self, label: &str) -> bool {
        let Some((_, id)) = self
            .object_list()
            .into_iter()
            .find(|(entry, _)| entry == label)
        else {
            return false;
        };
        self.select_object(id);
        true
    }

    /// Remove the active object and commit.
    pub fn remove_active(&mut self) -> Option<PendingCommit> {
        let id = self.selection.first().copied()?;
        self.scene.remove(id);
        self.selection.clear();
        self.commit()
    }

    // ----- style -----

    /// Apply a style-control change to whichever of brush/selection is
    /// live. A finalized value additionally commits, but only when a
    /// selection exists; live strokes commit through pointer-up instead.
    pub fn set_style(&mut self, edit: StyleEdit, committed: bool) -> Option<PendingCommit> {
        self.binder.apply_edit(edit);
        self.binder.rebuild_brush(self.tools.active());
        let ids = self.selection.clone();
        for id in ids {
            if let Some(object) = self.scene.get_mut(id) {
                self.binder.apply_state_to_object(object);
            }
        }
        if committed && !self.selection.is_empty() {
            self.commit()
        } else {
            None
        }
    }

    pub fn set_font_family(&mut self, family: FontFamily) {
        if let Some(&id) = self.selection.first() {
            if let Some(object) = self.scene.get_mut(id) {
                self.binder.set_font_family(object, family);
            }
        }
    }

    pub fn toggle_bold(&mut self) -> Option<bool> {
        let &id = self.selection.first()?;
        let object = self.scene.get_mut(id)?;
        self.binder.toggle_bold(object)
    }

    pub fn toggle_italic(&mut self) -> Option<bool> {
        let &id = self.selection.first()?;
        let object = self.scene.get_mut(id)?;
        self.binder.toggle_italic(object)
    }

    pub fn toggle_underline(&mut self) -> Option<bool> {
        let &id = self.selection.first()?;
        let object = self.scene.get_mut(id)?;
        self.binder.toggle_underline(object)
    }

    /// Indicator states for the textbox toggles of the active object.
    pub fn text_indicators(&self) -> Option<TextIndicators> {
        self.active_object()
            .and_then(|object| self.binder.text_indicators(object))
    }

    // ----- text editing -----

    pub fn enter_text_edit(&mut self, id: ObjectId) {
        if let Some(object) = self.scene.get_mut(id) {
            if let ObjectKind::Textbox(text) = &mut object.kind {
                text.editing = true;
            }
        }
    }

    pub fn exit_text_edit(&mut self, id: ObjectId) {
        if let Some(object) = self.scene.get_mut(id) {
            if let ObjectKind::Textbox(text) = &mut object.kind {
                text.editing = false;
                text.selection = None;
            }
        }
    }

    pub fn set_text_selection(&mut self, id: ObjectId, span: Option<CharSpan>) {
        if let Some(object) = self.scene.get_mut(id) {
            if let ObjectKind::Textbox(text) = &mut object.kind {
                text.selection = span;
            }
        }
    }

    // ----- locks & z-order -----

    pub fn toggle_lock(&mut self, flag: LockFlag) -> bool {
        let enabled = self.locks.toggle_lock(flag);
        self.locks.apply(&mut self.scene, &self.selection);
        enabled
    }

    pub fn reorder(&mut self, cmd: ZOrderCmd) {
        let active = self.selection.first().copied();
        self.locks.reorder(&mut self.scene, active, cmd);
    }

    // ----- image insertion -----

    /// Insert externally decoded image data at the origin, scaled down, and
    /// commit.
    pub fn insert_image(&mut self, data: ImageData) -> Option<PendingCommit> {
        let mut common = ObjectCommon::from_style(Point::ZERO, self.binder.state());
        common.stroke_width = 1.0;
        let id = self
            .scene
            .add(DrawableObject::new(common, ObjectKind::Image(data)));
        self.selection = vec![id];
        self.commit()
    }

    // ----- background & canvas size -----

    pub fn set_background_color(&mut self, color: RgbColor) -> Option<PendingCommit> {
        self.background_color = color;
        self.scene.set_background(Background::Solid(color));
        self.commit()
    }

    /// Flip between transparent and the last chosen solid color.
    pub fn toggle_transparent_background(&mut self) -> Option<PendingCommit> {
        match self.scene.background() {
            Background::Transparent => self
                .scene
                .set_background(Background::Solid(self.background_color)),
            Background::Solid(_) => self.scene.set_background(Background::Transparent),
        }
        self.commit()
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas_size = CanvasSize::new(width, height).clamped();
    }

    // ----- history -----

    pub fn undo(&mut self) {
        match self.history.undo() {
            HistoryStep::Unchanged => {}
            HistoryStep::Baseline => self.scene.clear(),
            HistoryStep::Restore(snapshot) => self.load_snapshot(&snapshot),
        }
    }

    pub fn redo(&mut self) {
        match self.history.redo() {
            HistoryStep::Unchanged | HistoryStep::Baseline => {}
            HistoryStep::Restore(snapshot) => self.load_snapshot(&snapshot),
        }
    }

    /// Load a snapshot as the current state. Never pushes history; a
    /// malformed snapshot aborts and leaves the scene untouched.
    fn load_snapshot(&mut self, snapshot: &SceneSnapshot) {
        if let Err(error) = self.scene.load(snapshot) {
            log::error!("snapshot load failed, keeping prior scene: {error}");
        }
    }

    /// Empty the scene and push the empty state so the clear is undoable.
    pub fn clear_canvas(&mut self) -> Option<PendingCommit> {
        self.scene.clear();
        self.selection.clear();
        self.commit()
    }

    // ----- commit pipeline -----

    /// Capture history and start the persistence side-effects.
    pub fn commit(&mut self) -> Option<PendingCommit> {
        match self.scene.serialize() {
            Ok(snapshot) => self.history.push(snapshot),
            Err(error) => log::error!("history snapshot failed: {error}"),
        }
        self.begin_upload()
    }

    fn begin_upload(&mut self) -> Option<PendingCommit> {
        self.stripped.clear();
        if !self.tools.is_continuous() {
            for &id in &self.selection {
                if let Some(object) = self.scene.get_mut(id) {
                    object.common.has_controls = false;
                    object.common.has_borders = false;
                    self.stripped.push(id);
                }
            }
        }
        let bytes = self.rasterizer.rasterize(&self.scene, self.canvas_size);
        Some(self.bridge.begin_commit(bytes))
    }

    /// Apply a completed upload: register the frame reference, restore the
    /// stripped affordances, and stage the settings for flushing.
    pub fn finish_commit(
        &mut self,
        seq: CommitSeq,
        result: Result<UploadResponse, UploadError>,
    ) -> Result<CommitOutcome, CommitError> {
        let outcome = self.bridge.finish_commit(seq, result)?;
        if let CommitOutcome::Applied(_) = outcome {
            if !self.tools.is_drawing() {
                for id in self.stripped.drain(..) {
                    if let Some(object) = self.scene.get_mut(id) {
                        object.common.has_controls = true;
                        object.common.has_borders = true;
                    }
                }
            } else {
                self.stripped.clear();
            }
            match self.scene.serialize() {
                Ok(scene) => self.bridge.stage_settings(PersistedSettings {
                    scene,
                    canvas_size: self.canvas_size,
                }),
                Err(error) => log::error!("settings snapshot failed: {error}"),
            }
        }
        Ok(outcome)
    }

    /// Write the staged settings out through the settings store.
    pub fn flush_settings(&self) -> BoxFuture<'static, SettingsResult<()>> {
        self.bridge.flush()
    }

    // ----- persisted settings -----

    /// Dispose the surface, flushing every staged settings entry.
    pub fn dispose(self) -> BoxFuture<'static, SettingsResult<()>> {
        self.bridge.close()
    }

    /// Apply previously persisted settings and make them the history
    /// baseline.
    pub fn restore(&mut self, settings: PersistedSettings) -> bool {
        if let Err(error) = self.scene.load(&settings.scene) {
            log::error!("persisted scene load failed, keeping prior scene: {error}");
            return false;
        }
        self.canvas_size = settings.canvas_size;
        self.history.push(settings.scene);
        true
    }
}
