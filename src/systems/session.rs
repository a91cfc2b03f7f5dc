//! The editing session: pointer, keyboard and host events in; zone edits,
//! notifications and host requests out
//!
//! The session owns the [`ZoneEditor`] plus the state that only matters
//! while someone is interacting with it: the gesture in progress, the
//! template preview, the viewer overlay and the steppers. Time only moves
//! through [`ZoneCreatorSession::tick`], so every timer the session owns can
//! be cleared at once on close.

use std::collections::BTreeSet;
use std::time::Duration;

use bevy::prelude::*;

use super::notifications::Notifications;
use crate::core::errors::EditorError;
use crate::core::settings::EditorSettings;
use crate::data::{PointId, ZoneId};
use crate::editing::preview::{
    MAX_PREVIEW_ROTATION, MAX_PREVIEW_SCALE, MIN_PREVIEW_SCALE, PREVIEW_ROTATION_STEP,
    PREVIEW_SCALE_STEP,
};
use crate::editing::{
    CommitPolicy, EditResult, EditType, NumberStepper, PreviewShape, SelectionRect,
    StepDirection, ZoneEditor,
};
use crate::geometry::grid::{major_grid_lines, GridLine};
use crate::geometry::measure::{edge_lengths, EdgeLength};
use crate::geometry::{nearest_edge_insert_index, MapPoint, ShapeKind, WorldPoint, WORLD_BOUNDS};
use crate::io::host::{GroundZResolved, HostMessage, HostRequest, ViewZonePayload};
use crate::io::import::lenient_number;
use crate::io::{CoordinateImporter, ExportFormat};

const THICKNESS_STEP: f64 = 0.5;
const MIN_THICKNESS: f64 = 0.5;
const GROUND_Z_STEP: f64 = 0.5;

/// Viewer telemetry defaults for fields the host leaves out
const VIEWER_START_THICKNESS: f64 = 150.0;
const VIEWER_UPDATE_THICKNESS: f64 = 4.0;

/// The pointer gesture in progress
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    DraggingPoint { zone: ZoneId, point: PointId },
    Marquee(SelectionRect),
    DraggingPreview,
}

/// A key press with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: KeyCode,
    /// Ctrl, or Cmd on macOS
    pub command: bool,
    pub shift: bool,
    /// A text field has focus; shortcuts are suppressed
    pub in_text_field: bool,
}

impl KeyPress {
    pub fn plain(key: KeyCode) -> Self {
        Self {
            key,
            command: false,
            shift: false,
            in_text_field: false,
        }
    }

    pub fn command(key: KeyCode) -> Self {
        Self {
            command: true,
            ..Self::plain(key)
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Heights shown while the in-game viewer is open
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerReadout {
    pub ground_z: f64,
    pub thickness: f64,
}

/// State of the in-game 3D zone viewer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerState {
    /// Zone the viewer was opened for
    pub viewing: Option<ZoneId>,
    pub open: bool,
    pub readout: Option<ViewerReadout>,
}

/// The numeric field a stepper is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepperTarget {
    Thickness(ZoneId),
    GroundZ(ZoneId),
    PreviewScale,
    PreviewRotation,
}

#[derive(Resource)]
pub struct ZoneCreatorSession {
    editor: ZoneEditor,
    importer: CoordinateImporter,
    notifications: Notifications,
    gesture: Gesture,
    preview: Option<PreviewShape>,
    /// Session clock, advanced by `tick`
    clock: Duration,
    last_drag_end: Option<Duration>,
    /// Centre of the map view
    view_center: MapPoint,
    cursor: Option<WorldPoint>,
    player_position: Option<WorldPoint>,
    /// The first reported player position, where the player marker sits
    initial_player_position: Option<WorldPoint>,
    search_open: bool,
    visible: bool,
    viewer: ViewerState,
    fetching_ground_z: BTreeSet<ZoneId>,
    stepper: Option<(StepperTarget, NumberStepper)>,
    template_size: f64,
    clipboard: Option<String>,
    outbox: Vec<HostRequest>,
    closed: bool,
}

impl Default for ZoneCreatorSession {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl ZoneCreatorSession {
    pub fn new(settings: EditorSettings) -> Self {
        let notifications = Notifications::new(settings.notification_duration());
        let template_size = settings.default_template_size;
        let editor = ZoneEditor::new(settings);
        let view_center = editor.projection().world_to_map(WorldPoint::ZERO);
        Self {
            editor,
            importer: CoordinateImporter::new(),
            notifications,
            gesture: Gesture::Idle,
            preview: None,
            clock: Duration::ZERO,
            last_drag_end: None,
            view_center,
            cursor: None,
            player_position: None,
            initial_player_position: None,
            search_open: false,
            visible: true,
            viewer: ViewerState::default(),
            fetching_ground_z: BTreeSet::new(),
            stepper: None,
            template_size,
            clipboard: None,
            outbox: Vec::new(),
            closed: false,
        }
    }

    // Accessors

    pub fn editor(&self) -> &ZoneEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ZoneEditor {
        &mut self.editor
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn preview(&self) -> Option<&PreviewShape> {
        self.preview.as_ref()
    }

    pub fn view_center(&self) -> MapPoint {
        self.view_center
    }

    pub fn pan_to(&mut self, center: MapPoint) {
        self.view_center = center;
    }

    /// Cursor position in world space, as shown in the coordinate readout
    pub fn cursor(&self) -> Option<WorldPoint> {
        self.cursor
    }

    pub fn player_position(&self) -> Option<WorldPoint> {
        self.player_position
    }

    pub fn player_marker(&self) -> Option<WorldPoint> {
        self.initial_player_position
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn search_open(&self) -> bool {
        self.search_open
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    pub fn is_fetching_ground_z(&self, zone: ZoneId) -> bool {
        self.fetching_ground_z.contains(&zone)
    }

    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    pub fn template_size(&self) -> f64 {
        self.template_size
    }

    pub fn set_template_size(&mut self, text: &str) {
        self.template_size = lenient_number(text)
            .filter(|size| *size != 0.0)
            .unwrap_or(self.editor.settings().default_template_size);
    }

    /// Requests queued for the host since the last drain
    pub fn drain_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub fn has_queued_requests(&self) -> bool {
        !self.outbox.is_empty()
    }

    fn send(&mut self, request: HostRequest) {
        debug!("Queueing host request {}", request.endpoint());
        self.outbox.push(request);
    }

    /// Major grid lines, shown while snapping is on
    pub fn grid_lines(&self) -> Vec<GridLine> {
        let settings = self.editor.settings();
        if !settings.snap_to_grid {
            return Vec::new();
        }
        major_grid_lines(self.editor.projection(), WORLD_BOUNDS, settings.grid_size)
    }

    /// Edge length labels for a zone, shown while distances are on
    pub fn distance_labels(&self, zone: ZoneId) -> Vec<EdgeLength> {
        if !self.editor.settings().show_distances {
            return Vec::new();
        }
        self.editor
            .zone(zone)
            .filter(|z| z.visible)
            .map(|z| edge_lengths(&z.world_outline(), &z.map_outline()))
            .unwrap_or_default()
    }

    // Time

    /// Advance every timer the session owns.
    pub fn tick(&mut self, delta: Duration) {
        self.clock += delta;
        self.editor.tick(delta);
        self.notifications.tick(delta);
        self.tick_stepper(delta);
    }

    fn within_drag_grace(&self) -> bool {
        let grace = self.editor.settings().drag_click_grace();
        self.last_drag_end
            .is_some_and(|ended| self.clock.saturating_sub(ended) < grace)
    }

    /// Tear the session down: clear every timer and ask the host to close.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.editor.cancel_pending();
        if let Some((_, stepper)) = self.stepper.as_mut() {
            stepper.release();
        }
        self.stepper = None;
        self.notifications.clear();
        self.gesture = Gesture::Idle;
        self.editor.set_gesture_active(false);
        self.preview = None;
        self.visible = false;
        self.closed = true;
        self.send(HostRequest::CloseSession);
        info!("Zone creator session closed");
    }

    // Pointer

    /// Pointer moved over the map.
    pub fn pointer_moved(&mut self, map: MapPoint) {
        let world = self.editor.world_from_map(map);
        self.cursor = Some(world);

        match self.gesture {
            Gesture::Idle => {}
            Gesture::DraggingPoint { zone, point } => {
                if let Err(err) = self.editor.move_point(zone, point, world, EditType::Drag) {
                    debug!("Drag ended early: {}", err);
                    self.end_gesture();
                }
            }
            Gesture::Marquee(mut rect) => {
                rect.end = map;
                self.gesture = Gesture::Marquee(rect);
                self.editor.select_points_in_rect(&rect);
            }
            Gesture::DraggingPreview => {
                let center = self.editor.projection().map_to_world(map);
                if let Some(preview) = self.preview.as_mut() {
                    preview.move_to(center);
                }
            }
        }
    }

    /// Plain click on the map: append a point to the active zone.
    pub fn map_click(&mut self, map: MapPoint) -> Option<PointId> {
        let zone = self.editor.active_zone_id()?;
        if self.gesture != Gesture::Idle || self.within_drag_grace() || self.preview.is_some() {
            return None;
        }
        let world = self.editor.world_from_map(map);
        self.editor.add_point(zone, world).ok()
    }

    /// Click inside a zone's body: splice a point into the nearest edge.
    pub fn polygon_click(&mut self, zone: ZoneId, map: MapPoint) -> EditResult<PointId> {
        if self.editor.active_zone_id() != Some(zone) {
            return Err(EditorError::InactiveZone(zone));
        }
        let outline = self
            .editor
            .zone(zone)
            .ok_or(EditorError::UnknownZone(zone))?
            .map_outline();
        if outline.len() < 3 {
            return Err(EditorError::NotEnoughPoints);
        }
        let index = nearest_edge_insert_index(&outline, map);
        let world = self.editor.world_from_map(map);
        self.editor.insert_point_at_edge(zone, index, world)
    }

    /// Pointer pressed on a point marker: start dragging it.
    pub fn point_pressed(&mut self, zone: ZoneId, point: PointId) -> EditResult<()> {
        if self.gesture != Gesture::Idle {
            return Err(EditorError::GestureInProgress);
        }
        let target = self
            .editor
            .zone(zone)
            .ok_or(EditorError::UnknownZone(zone))?;
        if self.editor.active_zone_id() != Some(zone) {
            return Err(EditorError::InactiveZone(zone));
        }
        target.point(point).ok_or(EditorError::UnknownPoint(point))?;
        self.gesture = Gesture::DraggingPoint { zone, point };
        self.editor.set_gesture_active(true);
        Ok(())
    }

    /// Shift-press on the map: start a marquee over the active zone's points.
    pub fn marquee_start(&mut self, map: MapPoint) -> bool {
        if self.gesture != Gesture::Idle || self.editor.active_zone_id().is_none() {
            return false;
        }
        self.gesture = Gesture::Marquee(SelectionRect::new(map));
        self.editor.set_gesture_active(true);
        true
    }

    /// Pointer pressed on the preview's centre handle.
    pub fn preview_drag_start(&mut self) -> EditResult<()> {
        if self.preview.is_none() {
            return Err(EditorError::NoPreview);
        }
        if self.gesture != Gesture::Idle {
            return Err(EditorError::GestureInProgress);
        }
        self.gesture = Gesture::DraggingPreview;
        self.editor.set_gesture_active(true);
        Ok(())
    }

    /// Pointer released anywhere.
    pub fn pointer_released(&mut self) {
        match self.gesture {
            Gesture::Idle => return,
            Gesture::DraggingPoint { .. } => {
                self.editor.commit(EditType::DragUp);
                self.last_drag_end = Some(self.clock);
            }
            Gesture::Marquee(rect) => {
                let count = self.editor.select_points_in_rect(&rect);
                debug!("Marquee selected {} points", count);
            }
            Gesture::DraggingPreview => {
                self.last_drag_end = Some(self.clock);
            }
        }
        self.end_gesture();
    }

    fn end_gesture(&mut self) {
        self.gesture = Gesture::Idle;
        self.editor.set_gesture_active(false);
    }

    /// Context click on a point marker: delete it if its zone is active.
    pub fn point_context_delete(&mut self, zone: ZoneId, point: PointId) -> EditResult<()> {
        if self.editor.active_zone_id() != Some(zone) {
            return Err(EditorError::InactiveZone(zone));
        }
        self.editor.delete_point(zone, point)
    }

    // Keyboard

    /// Global shortcuts. Returns true when the key was handled.
    pub fn key_pressed(&mut self, press: KeyPress) -> bool {
        if press.in_text_field {
            return false;
        }
        if press.command {
            match press.key {
                KeyCode::KeyZ if press.shift => {
                    self.editor.redo();
                }
                KeyCode::KeyZ => {
                    self.editor.undo();
                }
                KeyCode::KeyY => {
                    self.editor.redo();
                }
                KeyCode::KeyF => self.search_open = true,
                _ => return false,
            }
            return true;
        }
        match press.key {
            KeyCode::Delete | KeyCode::Backspace => {
                self.editor.delete_last_point();
                true
            }
            KeyCode::KeyG => {
                let settings = self.editor.settings_mut();
                settings.snap_to_grid = !settings.snap_to_grid;
                true
            }
            KeyCode::KeyD => {
                let settings = self.editor.settings_mut();
                settings.show_distances = !settings.show_distances;
                true
            }
            KeyCode::Escape => {
                self.close();
                true
            }
            _ => false,
        }
    }

    // Zone commands

    pub fn create_zone(&mut self, name: &str) -> EditResult<ZoneId> {
        let id = self.editor.create_zone(name)?;
        self.notifications
            .success(format!("Created zone \"{}\"", name.trim()));
        Ok(id)
    }

    pub fn delete_zone(&mut self, zone: ZoneId) -> EditResult<()> {
        let removed = self.editor.delete_zone(zone)?;
        self.fetching_ground_z.remove(&zone);
        self.notifications
            .info(format!("Deleted zone \"{}\"", removed.name));
        Ok(())
    }

    /// Export a zone and put the code on the clipboard.
    pub fn copy_code(&mut self, zone: ZoneId, format: ExportFormat) -> EditResult<String> {
        let target = self
            .editor
            .zone(zone)
            .ok_or(EditorError::UnknownZone(zone))?;
        let code = format.render(target);
        let message = format!(
            "Copied \"{}\" {} data to clipboard",
            target.name,
            format.label()
        );
        self.clipboard = Some(code.clone());
        self.notifications.success(message);
        Ok(code)
    }

    /// Import a zone from pasted text and pan to it.
    pub fn import(&mut self, text: &str) -> EditResult<ZoneId> {
        let parsed = self.importer.parse(text);
        match self.editor.import_zone(parsed) {
            Ok(id) => {
                if let Some(zone) = self.editor.zone(id) {
                    let message = format!(
                        "Imported zone \"{}\" with {} points",
                        zone.name,
                        zone.points.len()
                    );
                    if let Some(first) = zone.points.first() {
                        self.view_center = first.map;
                    }
                    self.notifications.success(message);
                }
                Ok(id)
            }
            Err(err) => {
                self.notifications.error(format!("Failed to import zone: {err}"));
                Err(err)
            }
        }
    }

    /// Ask the host for the ground height under a zone's centroid.
    pub fn request_ground_z(&mut self, zone: ZoneId) -> EditResult<()> {
        let at = self
            .editor
            .zone(zone)
            .ok_or(EditorError::UnknownZone(zone))?
            .centroid()
            .ok_or(EditorError::NotEnoughPoints)?;
        self.fetching_ground_z.insert(zone);
        self.send(HostRequest::FetchGroundZ { zone, at });
        Ok(())
    }

    /// The host answered a ground height request.
    pub fn ground_z_resolved(&mut self, reply: GroundZResolved) {
        self.fetching_ground_z.remove(&reply.zone);
        if self.editor.zone(reply.zone).is_none() {
            debug!("Dropping ground height for deleted zone {}", reply.zone);
            return;
        }
        match reply.result {
            Ok(response) => match response.z {
                Some(z) => {
                    if let Ok(z) = self.editor.apply_ground_z(reply.zone, z) {
                        self.notifications
                            .success(format!("Ground Z calculated: {z}"));
                    }
                }
                None => {
                    self.notifications
                        .error("Could not get ground Z at this location");
                }
            },
            Err(_) => {
                warn!("Ground height request for {} failed", reply.zone);
                self.notifications.error("Failed to calculate ground Z");
            }
        }
    }

    /// Open the in-game viewer for a zone.
    pub fn view_zone(&mut self, zone: ZoneId) -> EditResult<()> {
        let target = self
            .editor
            .zone(zone)
            .ok_or(EditorError::UnknownZone(zone))?;
        if !target.is_polygon() {
            return Err(EditorError::NotEnoughPoints);
        }
        let payload = ViewZonePayload::for_zone(target);
        self.viewer.viewing = Some(zone);
        self.send(HostRequest::ViewZone(payload));
        Ok(())
    }

    pub fn stop_view_zone(&mut self) {
        if self.viewer.viewing.is_some() || self.viewer.open {
            self.send(HostRequest::StopViewZone);
        }
    }

    // Search

    pub fn open_search(&mut self) {
        self.search_open = true;
    }

    pub fn close_search(&mut self) {
        self.search_open = false;
    }

    /// Jump to typed world coordinates.
    pub fn search(&mut self, x: &str, y: &str) -> EditResult<WorldPoint> {
        let parse = |text: &str| {
            lenient_number(text).ok_or_else(|| EditorError::InvalidSearchCoordinate(text.to_string()))
        };
        let target = WorldPoint::new(parse(x)?, parse(y)?);
        self.view_center = self.editor.projection().world_to_map(target);
        self.search_open = false;
        Ok(target)
    }

    /// Centre the map on where the player was when the session opened.
    pub fn jump_to_player(&mut self) -> Option<WorldPoint> {
        let player = self.initial_player_position?;
        self.view_center = self.editor.projection().world_to_map(player);
        Some(player)
    }

    // Templates

    /// Start placing a template at the centre of the current view.
    pub fn start_template(&mut self, kind: ShapeKind) {
        let center = self.editor.projection().map_to_world(self.view_center);
        self.preview = Some(PreviewShape::new(kind, center, self.template_size));
    }

    pub fn set_preview_scale(&mut self, scale: f64) -> EditResult<()> {
        let preview = self.preview.as_mut().ok_or(EditorError::NoPreview)?;
        preview.set_scale(scale);
        Ok(())
    }

    pub fn set_preview_rotation(&mut self, degrees: f64) -> EditResult<()> {
        let preview = self.preview.as_mut().ok_or(EditorError::NoPreview)?;
        preview.set_rotation(degrees);
        Ok(())
    }

    /// Turn the preview into a zone and pan to it.
    pub fn confirm_preview(&mut self) -> EditResult<ZoneId> {
        let preview = self.preview.take().ok_or(EditorError::NoPreview)?;
        if self.gesture == Gesture::DraggingPreview {
            self.end_gesture();
        }
        let id = self.editor.create_zone_from_template(&preview);
        if let Some(zone) = self.editor.zone(id) {
            if let Some(first) = zone.points.first() {
                self.view_center = first.map;
            }
            let message = format!("Created {}", zone.name);
            self.notifications.success(message);
        }
        Ok(id)
    }

    pub fn cancel_preview(&mut self) {
        if self.gesture == Gesture::DraggingPreview {
            self.end_gesture();
        }
        self.preview = None;
    }

    // Numeric fields

    fn stepper_for(&self, target: StepperTarget) -> NumberStepper {
        let settings = self.editor.settings();
        let (delay, repeat) = (settings.stepper_hold_delay(), settings.stepper_repeat());
        match target {
            StepperTarget::Thickness(_) => {
                NumberStepper::new(THICKNESS_STEP, delay, repeat).with_min(MIN_THICKNESS)
            }
            StepperTarget::GroundZ(_) => NumberStepper::new(GROUND_Z_STEP, delay, repeat),
            StepperTarget::PreviewScale => NumberStepper::new(PREVIEW_SCALE_STEP, delay, repeat)
                .with_min(MIN_PREVIEW_SCALE)
                .with_max(MAX_PREVIEW_SCALE),
            StepperTarget::PreviewRotation => {
                NumberStepper::new(PREVIEW_ROTATION_STEP, delay, repeat)
                    .with_min(0.0)
                    .with_max(MAX_PREVIEW_ROTATION)
            }
        }
    }

    /// Current value of a numeric field
    pub fn field_value(&self, target: StepperTarget) -> EditResult<f64> {
        let zone = |id: ZoneId| self.editor.zone(id).ok_or(EditorError::UnknownZone(id));
        let preview = || self.preview.as_ref().ok_or(EditorError::NoPreview);
        match target {
            StepperTarget::Thickness(id) => Ok(zone(id)?.thickness),
            StepperTarget::GroundZ(id) => Ok(zone(id)?.ground_z.unwrap_or(0.0)),
            StepperTarget::PreviewScale => Ok(preview()?.scale()),
            StepperTarget::PreviewRotation => Ok(preview()?.rotation()),
        }
    }

    fn set_field(
        &mut self,
        target: StepperTarget,
        value: f64,
        policy: CommitPolicy,
    ) -> EditResult<()> {
        match target {
            StepperTarget::Thickness(id) => self.editor.set_thickness(id, value, policy),
            StepperTarget::GroundZ(id) => self.editor.set_ground_z(id, Some(value), policy),
            StepperTarget::PreviewScale => self.set_preview_scale(value),
            StepperTarget::PreviewRotation => self.set_preview_rotation(value),
        }
    }

    /// Stepper button pressed: one step now, repeating while held.
    /// Whether the stepper button in `direction` can still move the field.
    /// A button at its limit is disabled.
    pub fn stepper_enabled(&self, target: StepperTarget, direction: StepDirection) -> bool {
        self.field_value(target)
            .is_ok_and(|value| self.stepper_for(target).can_step(value, direction))
    }

    pub fn stepper_pressed(
        &mut self,
        target: StepperTarget,
        direction: StepDirection,
    ) -> EditResult<f64> {
        let current = self.field_value(target)?;
        if !self.stepper_enabled(target, direction) {
            return Ok(current);
        }
        let mut stepper = self.stepper_for(target);
        let value = stepper.press(current, direction);
        self.set_field(target, value, EditType::FieldEdit.into())?;
        self.stepper = Some((target, stepper));
        Ok(value)
    }

    fn tick_stepper(&mut self, delta: Duration) {
        let Some((target, mut stepper)) = self.stepper.take() else {
            return;
        };
        let Ok(current) = self.field_value(target) else {
            // The field went away while the button was held
            return;
        };
        if let Some(value) = stepper.tick(current, delta) {
            if self
                .set_field(target, value, EditType::FieldEdit.into())
                .is_err()
            {
                return;
            }
        }
        self.stepper = Some((target, stepper));
    }

    /// Stepper button released; the final value is committed now.
    pub fn stepper_released(&mut self) {
        if let Some((target, mut stepper)) = self.stepper.take() {
            stepper.release();
            self.field_blurred(target);
        }
    }

    /// Free text typed into a numeric field.
    pub fn field_input(&mut self, target: StepperTarget, text: &str) -> EditResult<f64> {
        let current = self.field_value(target)?;
        let value = self.stepper_for(target).parse_input(text, current);
        if value != current {
            self.set_field(target, value, EditType::FieldEdit.into())?;
        }
        Ok(value)
    }

    /// Arrow keys while a numeric field has focus.
    pub fn field_key(&mut self, target: StepperTarget, key: KeyCode) -> EditResult<Option<f64>> {
        let current = self.field_value(target)?;
        let Some(value) = self.stepper_for(target).key(current, key) else {
            return Ok(None);
        };
        self.set_field(target, value, EditType::FieldEdit.into())?;
        Ok(Some(value))
    }

    /// A numeric field lost focus.
    pub fn field_blurred(&mut self, target: StepperTarget) {
        if matches!(
            target,
            StepperTarget::Thickness(_) | StepperTarget::GroundZ(_)
        ) && self.editor.history().has_pending()
        {
            self.editor.commit(EditType::FieldBlur);
        }
    }

    // Host

    pub fn handle_host_message(&mut self, message: HostMessage) {
        match message {
            HostMessage::UpdatePlayerPosition(position) => {
                self.player_position = Some(position);
                self.initial_player_position.get_or_insert(position);
            }
            HostMessage::ZoneViewerStarted(telemetry) => {
                self.viewer.open = true;
                if let Some(t) = telemetry {
                    self.viewer.readout = Some(ViewerReadout {
                        ground_z: t.ground_z.unwrap_or(0.0),
                        thickness: t.thickness.unwrap_or(VIEWER_START_THICKNESS),
                    });
                }
            }
            HostMessage::ZoneViewerUpdate(t) => {
                self.viewer.readout = Some(ViewerReadout {
                    ground_z: t.ground_z.unwrap_or(0.0),
                    thickness: t.thickness.unwrap_or(VIEWER_UPDATE_THICKNESS),
                });
            }
            HostMessage::ZoneViewerStopped { thickness } => {
                self.viewer.open = false;
                self.viewer.readout = None;
                if let (Some(zone), Some(thickness)) = (self.viewer.viewing, thickness) {
                    let changed = self
                        .editor
                        .zone(zone)
                        .is_some_and(|z| z.thickness != thickness);
                    if changed {
                        debug!("Viewer changed thickness of {} to {}", zone, thickness);
                        if let Err(e) = self
                            .editor
                            .set_thickness(zone, thickness, CommitPolicy::Immediate)
                        {
                            warn!("Failed to apply viewer thickness to {}: {}", zone, e);
                        }
                    }
                }
                self.viewer.viewing = None;
            }
            HostMessage::Show => {
                self.visible = true;
                self.closed = false;
            }
            HostMessage::Hide => self.visible = false,
            HostMessage::CopyToClipboard(text) => self.clipboard = Some(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::host::{GroundZResponse, HostCallFailed};
    use crate::systems::notifications::NotificationKind;

    fn session_with_square() -> (ZoneCreatorSession, ZoneId) {
        let mut session = ZoneCreatorSession::default();
        let id = session.create_zone("Square").unwrap();
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)] {
            let map = session.editor().projection().world_to_map(WorldPoint::new(x, y));
            session.map_click(map).unwrap();
        }
        (session, id)
    }

    fn map(session: &ZoneCreatorSession, x: f64, y: f64) -> MapPoint {
        session.editor().projection().world_to_map(WorldPoint::new(x, y))
    }

    #[test]
    fn test_click_needs_active_zone() {
        let mut session = ZoneCreatorSession::default();
        assert_eq!(session.map_click(MapPoint::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_drag_suppresses_clicks_until_grace_passes() {
        let (mut session, id) = session_with_square();
        let point = session.editor().zone(id).unwrap().points[0].id;

        session.point_pressed(id, point).unwrap();
        let target = map(&session, -20.0, -20.0);
        session.pointer_moved(target);
        assert_eq!(session.map_click(target), None);
        session.pointer_released();

        // The click that follows the release is swallowed
        assert_eq!(session.map_click(target), None);
        session.tick(Duration::from_millis(300));
        assert!(session.map_click(target).is_some());

        let zone = session.editor().zone(id).unwrap();
        assert_eq!(zone.points[0].world, WorldPoint::new(-20.0, -20.0));
        assert_eq!(zone.points.len(), 5);
    }

    #[test]
    fn test_drag_is_one_history_entry() {
        let (mut session, id) = session_with_square();
        let point = session.editor().zone(id).unwrap().points[2].id;
        let before = session.editor().history().len();

        session.point_pressed(id, point).unwrap();
        for i in 0..20 {
            let target = map(&session, 100.0 + i as f64, 100.0);
            session.pointer_moved(target);
            session.tick(Duration::from_millis(10));
        }
        session.pointer_released();
        session.tick(Duration::from_secs(1));
        assert_eq!(session.editor().history().len(), before + 1);
    }

    #[test]
    fn test_polygon_click_splices_into_nearest_edge() {
        let (mut session, id) = session_with_square();
        let click = map(&session, 50.0, 2.0);
        session.polygon_click(id, click).unwrap();
        let zone = session.editor().zone(id).unwrap();
        assert_eq!(zone.points[1].world, WorldPoint::new(50.0, 2.0));
    }

    #[test]
    fn test_marquee_then_delete_selected() {
        let (mut session, id) = session_with_square();
        assert!(session.marquee_start(map(&session, -5.0, -5.0)));
        session.pointer_moved(map(&session, 105.0, 5.0));
        session.pointer_released();
        assert_eq!(session.editor().selection().len(), 2);
        assert_eq!(session.editor_mut().delete_selected_points(), 2);
        assert_eq!(session.editor().zone(id).unwrap().points.len(), 2);
    }

    #[test]
    fn test_shortcuts() {
        let (mut session, id) = session_with_square();
        assert!(session.key_pressed(KeyPress::plain(KeyCode::Backspace)));
        assert_eq!(session.editor().zone(id).unwrap().points.len(), 3);

        session.key_pressed(KeyPress::command(KeyCode::KeyZ));
        assert_eq!(session.editor().zone(id).unwrap().points.len(), 4);
        session.key_pressed(KeyPress::command(KeyCode::KeyZ).with_shift());
        assert_eq!(session.editor().zone(id).unwrap().points.len(), 3);

        session.key_pressed(KeyPress::plain(KeyCode::KeyG));
        assert!(session.editor().settings().snap_to_grid);
        assert!(!session.grid_lines().is_empty());

        let typing = KeyPress {
            in_text_field: true,
            ..KeyPress::plain(KeyCode::Backspace)
        };
        assert!(!session.key_pressed(typing));
        assert_eq!(session.editor().zone(id).unwrap().points.len(), 3);

        session.key_pressed(KeyPress::command(KeyCode::KeyF));
        assert!(session.search_open());
    }

    #[test]
    fn test_ctrl_y_redoes() {
        let (mut session, id) = session_with_square();
        assert!(session.key_pressed(KeyPress::command(KeyCode::KeyZ)));
        assert_eq!(session.editor().zone(id).unwrap().points.len(), 3);

        assert!(session.key_pressed(KeyPress::command(KeyCode::KeyY)));
        assert_eq!(session.editor().zone(id).unwrap().points.len(), 4);
    }

    #[test]
    fn test_distance_toggle_and_labels() {
        let (mut session, id) = session_with_square();
        assert!(session.distance_labels(id).is_empty());

        assert!(session.key_pressed(KeyPress::plain(KeyCode::KeyD)));
        assert!(session.editor().settings().show_distances);
        let labels = session.distance_labels(id);
        assert_eq!(labels.len(), 4);
        assert!(labels.iter().all(|edge| edge.length == 100.0));

        session.editor_mut().toggle_visibility(id).unwrap();
        assert!(session.distance_labels(id).is_empty());

        session.key_pressed(KeyPress::plain(KeyCode::KeyD));
        assert!(!session.editor().settings().show_distances);
    }

    #[test]
    fn test_stepper_disabled_at_limit() {
        let (mut session, id) = session_with_square();
        let target = StepperTarget::Thickness(id);
        session.field_input(target, "0.5").unwrap();
        session.field_blurred(target);
        let entries = session.editor().history().len();

        assert!(!session.stepper_enabled(target, StepDirection::Down));
        assert!(session.stepper_enabled(target, StepDirection::Up));
        assert_eq!(session.stepper_pressed(target, StepDirection::Down), Ok(0.5));
        session.tick(Duration::from_secs(1));
        assert_eq!(session.editor().history().len(), entries);
    }

    #[test]
    fn test_field_input_keeps_value_on_overflow() {
        let (mut session, id) = session_with_square();
        let target = StepperTarget::Thickness(id);
        assert_eq!(session.field_input(target, "1e999"), Ok(150.0));
        assert!(!session.editor().history().has_pending());

        let code = session.copy_code(id, ExportFormat::PolyZone).unwrap();
        assert!(!code.contains("inf"));
    }

    #[test]
    fn test_escape_closes_and_clears_timers() {
        let (mut session, id) = session_with_square();
        session
            .stepper_pressed(StepperTarget::Thickness(id), StepDirection::Up)
            .unwrap();
        assert!(session.editor().history().has_pending());
        let entries = session.editor().history().len();

        session.key_pressed(KeyPress::plain(KeyCode::Escape));
        assert!(session.is_closed());
        assert!(!session.editor().history().has_pending());
        assert!(session.notifications().is_empty());
        session.tick(Duration::from_secs(2));
        assert_eq!(session.editor().history().len(), entries);
        assert_eq!(session.editor().zone(id).unwrap().thickness, 150.5);
        assert_eq!(session.drain_requests(), vec![HostRequest::CloseSession]);
    }

    #[test]
    fn test_stepper_hold_and_release() {
        let (mut session, id) = session_with_square();
        let target = StepperTarget::Thickness(id);
        let entries = session.editor().history().len();

        session.stepper_pressed(target, StepDirection::Down).unwrap();
        session.tick(Duration::from_millis(400));
        session.tick(Duration::from_millis(100));
        assert_eq!(session.field_value(target), Ok(148.5));

        session.stepper_released();
        assert!(!session.editor().history().has_pending());
        assert!(session.editor().history().len() > entries);
        let committed = session.editor().history().current().unwrap();
        assert_eq!(committed.zones[0].thickness, 148.5);

        session.tick(Duration::from_millis(200));
        assert_eq!(session.field_value(target), Ok(148.5));
    }

    #[test]
    fn test_ground_z_round_trip() {
        let (mut session, id) = session_with_square();
        session.request_ground_z(id).unwrap();
        assert!(session.is_fetching_ground_z(id));
        assert_eq!(
            session.drain_requests(),
            vec![HostRequest::FetchGroundZ {
                zone: id,
                at: WorldPoint::new(50.0, 50.0)
            }]
        );

        session.ground_z_resolved(GroundZResolved {
            zone: id,
            result: Ok(GroundZResponse { z: Some(29.876) }),
        });
        assert!(!session.is_fetching_ground_z(id));
        let zone = session.editor().zone(id).unwrap();
        assert_eq!(zone.ground_z, Some(29.88));
        assert!(zone.points.iter().all(|p| p.z == Some(29.88)));
    }

    #[test]
    fn test_ground_z_failures_notify() {
        let (mut session, id) = session_with_square();
        session.ground_z_resolved(GroundZResolved {
            zone: id,
            result: Ok(GroundZResponse { z: None }),
        });
        assert_eq!(
            session.notifications().latest().unwrap().message,
            "Could not get ground Z at this location"
        );
        session.ground_z_resolved(GroundZResolved {
            zone: id,
            result: Err(HostCallFailed),
        });
        assert_eq!(
            session.notifications().latest().unwrap().message,
            "Failed to calculate ground Z"
        );
        assert_eq!(session.editor().zone(id).unwrap().ground_z, None);
    }

    #[test]
    fn test_ground_z_for_deleted_zone_is_dropped() {
        let (mut session, id) = session_with_square();
        session.request_ground_z(id).unwrap();
        session.delete_zone(id).unwrap();
        let entries = session.editor().history().len();
        session.ground_z_resolved(GroundZResolved {
            zone: id,
            result: Ok(GroundZResponse { z: Some(1.0) }),
        });
        assert_eq!(session.editor().history().len(), entries);
    }

    #[test]
    fn test_viewer_stop_writes_back_thickness() {
        let (mut session, id) = session_with_square();
        session.view_zone(id).unwrap();
        session.handle_host_message(HostMessage::ZoneViewerStarted(None));
        assert!(session.viewer().open);
        assert_eq!(session.viewer().readout, None);

        let entries = session.editor().history().len();
        session.handle_host_message(HostMessage::ZoneViewerStopped {
            thickness: Some(42.0),
        });
        assert_eq!(session.editor().zone(id).unwrap().thickness, 42.0);
        assert_eq!(session.editor().history().len(), entries + 1);
        assert_eq!(session.viewer(), &ViewerState::default());
    }

    #[test]
    fn test_viewer_telemetry_defaults() {
        let mut session = ZoneCreatorSession::default();
        session.handle_host_message(HostMessage::ZoneViewerUpdate(Default::default()));
        assert_eq!(
            session.viewer().readout,
            Some(ViewerReadout {
                ground_z: 0.0,
                thickness: 4.0
            })
        );
    }

    #[test]
    fn test_search_rejects_non_numeric() {
        let mut session = ZoneCreatorSession::default();
        session.open_search();
        let center = session.view_center();
        assert_eq!(
            session.search("abc", "10"),
            Err(EditorError::InvalidSearchCoordinate("abc".into()))
        );
        assert_eq!(session.view_center(), center);
        assert!(session.search_open());

        assert_eq!(
            session.search("1e999", "0"),
            Err(EditorError::InvalidSearchCoordinate("1e999".into()))
        );
        assert_eq!(session.view_center(), center);

        assert_eq!(session.search("100", "-200"), Ok(WorldPoint::new(100.0, -200.0)));
        assert!(!session.search_open());
    }

    #[test]
    fn test_stop_view_zone_only_when_viewing() {
        let (mut session, id) = session_with_square();
        session.stop_view_zone();
        assert!(session.drain_requests().is_empty());

        session.view_zone(id).unwrap();
        assert!(matches!(
            session.drain_requests().as_slice(),
            [HostRequest::ViewZone(_)]
        ));
        session.stop_view_zone();
        assert_eq!(session.drain_requests(), vec![HostRequest::StopViewZone]);
    }

    #[test]
    fn test_template_size_from_text() {
        let mut session = ZoneCreatorSession::default();
        assert_eq!(session.template_size(), 50.0);

        session.set_template_size("120m");
        assert_eq!(session.template_size(), 120.0);
        session.start_template(ShapeKind::Rectangle);
        assert_eq!(session.preview().unwrap().scale(), 120.0);

        for fallback in ["", "0", "abc", "1e999"] {
            session.set_template_size(fallback);
            assert_eq!(session.template_size(), 50.0);
        }
    }

    #[test]
    fn test_host_visibility_and_clipboard() {
        let mut session = ZoneCreatorSession::default();
        session.handle_host_message(HostMessage::Hide);
        assert!(!session.is_visible());
        session.handle_host_message(HostMessage::Show);
        assert!(session.is_visible());

        session.handle_host_message(HostMessage::CopyToClipboard("vector2(1, 2)".into()));
        assert_eq!(session.clipboard(), Some("vector2(1, 2)"));
    }

    #[test]
    fn test_jump_to_first_player_position() {
        let mut session = ZoneCreatorSession::default();
        assert_eq!(session.jump_to_player(), None);
        session.handle_host_message(HostMessage::UpdatePlayerPosition(WorldPoint::new(1.0, 2.0)));
        session.handle_host_message(HostMessage::UpdatePlayerPosition(WorldPoint::new(5.0, 6.0)));
        assert_eq!(session.player_position(), Some(WorldPoint::new(5.0, 6.0)));
        assert_eq!(session.jump_to_player(), Some(WorldPoint::new(1.0, 2.0)));
    }

    #[test]
    fn test_template_preview_flow() {
        let mut session = ZoneCreatorSession::default();
        session.search("500", "500").unwrap();
        session.start_template(ShapeKind::Pentagon);
        assert_eq!(session.preview().unwrap().center(), WorldPoint::new(500.0, 500.0));

        // Clicks do not add points while a preview is showing
        assert_eq!(session.map_click(MapPoint::new(0.0, 0.0)), None);

        session.preview_drag_start().unwrap();
        session.pointer_moved(map(&session, 600.4, 700.6));
        session.pointer_released();
        assert_eq!(session.preview().unwrap().center(), WorldPoint::new(600.0, 701.0));

        session.set_preview_scale(80.0).unwrap();
        let id = session.confirm_preview().unwrap();
        assert!(session.preview().is_none());
        let zone = session.editor().zone(id).unwrap();
        assert_eq!(zone.name, "Pentagon Zone");
        assert_eq!(zone.points.len(), 5);
        assert_eq!(session.confirm_preview(), Err(EditorError::NoPreview));
    }

    #[test]
    fn test_copy_code_fills_clipboard() {
        let (mut session, id) = session_with_square();
        let code = session.copy_code(id, ExportFormat::Vec2).unwrap();
        assert_eq!(session.clipboard(), Some(code.as_str()));
        assert_eq!(
            session.notifications().latest().unwrap().message,
            "Copied \"Square\" vector2 data to clipboard"
        );
    }

    #[test]
    fn test_import_failure_notifies() {
        let mut session = ZoneCreatorSession::default();
        assert!(session.import("{x = 10, y = 20}, {x = 30, y = 40}").is_err());
        assert!(session.editor().zones().is_empty());
        assert_eq!(
            session.notifications().latest().unwrap().kind,
            NotificationKind::Error
        );
    }
}
