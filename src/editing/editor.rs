//! The zone collection and every edit that can be made to it
//!
//! `ZoneEditor` owns the zones, the active-zone id, the point selection and
//! the history. Every mutating operation validates first and mutates second,
//! so an `Err` always means nothing changed. Each operation also decides how
//! it is recorded: discrete edits commit immediately, continuous ones take
//! a commit policy from the caller.

use std::time::Duration;

use bevy::prelude::*;
use smol_str::SmolStr;

use super::edit_type::CommitPolicy;
use super::history::{History, HistoryEntry};
use super::preview::PreviewShape;
use super::selection::{PointSelection, SelectionRect};
use crate::core::errors::EditorError;
use crate::core::settings::EditorSettings;
use crate::data::{palette_color, FillPattern, IdAllocator, PointId, Zone, ZoneId, ZonePoint};
use crate::geometry::{round2, MapPoint, MapProjection, WorldPoint};
use crate::io::ImportedZone;

pub type EditResult<T> = Result<T, EditorError>;

pub struct ZoneEditor {
    zones: Vec<Zone>,
    active_zone: Option<ZoneId>,
    selection: PointSelection,
    history: History,
    ids: IdAllocator,
    projection: MapProjection,
    settings: EditorSettings,
    /// A point drag or marquee is under way
    gesture_active: bool,
}

impl Default for ZoneEditor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl ZoneEditor {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            zones: Vec::new(),
            active_zone: None,
            selection: PointSelection::default(),
            history: History::new(settings.history_limit, settings.history_debounce()),
            ids: IdAllocator::default(),
            projection: MapProjection::new(),
            settings,
            gesture_active: false,
        }
    }

    // Accessors

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn active_zone_id(&self) -> Option<ZoneId> {
        self.active_zone
    }

    pub fn active_zone(&self) -> Option<&Zone> {
        self.active_zone.and_then(|id| self.zone(id))
    }

    pub fn selection(&self) -> &PointSelection {
        &self.selection
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut EditorSettings {
        &mut self.settings
    }

    pub fn projection(&self) -> &MapProjection {
        &self.projection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn gesture_active(&self) -> bool {
        self.gesture_active
    }

    /// Mark a drag or marquee as started or finished. While set, plain
    /// point additions are refused.
    pub fn set_gesture_active(&mut self, active: bool) {
        self.gesture_active = active;
    }

    /// World position for a map position, snapped to the grid when snapping
    /// is on, then rounded to storage precision.
    pub fn world_from_map(&self, map: MapPoint) -> WorldPoint {
        let world = self.projection.map_to_world(map);
        let world = if self.settings.snap_to_grid {
            world.snapped(self.settings.grid_size)
        } else {
            world
        };
        world.rounded()
    }

    fn zone_index(&self, id: ZoneId) -> EditResult<usize> {
        self.zones
            .iter()
            .position(|z| z.id == id)
            .ok_or(EditorError::UnknownZone(id))
    }

    fn require_active(&self, id: ZoneId) -> EditResult<usize> {
        let index = self.zone_index(id)?;
        if self.active_zone != Some(id) {
            return Err(EditorError::InactiveZone(id));
        }
        Ok(index)
    }

    fn new_point(&mut self, world: WorldPoint, z: Option<f64>) -> ZonePoint {
        ZonePoint::new(self.ids.point(), world.rounded(), z, &self.projection)
    }

    // History

    /// Snapshot of the state as it is right now
    pub fn snapshot(&self) -> HistoryEntry {
        HistoryEntry {
            zones: self.zones.clone(),
            active_zone: self.active_zone,
        }
    }

    /// Record the current state under `policy`.
    pub fn commit(&mut self, policy: impl Into<CommitPolicy>) {
        let snapshot = || HistoryEntry {
            zones: self.zones.clone(),
            active_zone: self.active_zone,
        };
        self.history.request(policy.into(), snapshot);
    }

    /// Advance the debounce timer, committing if it falls due.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if self.history.tick(delta) {
            let entry = self.snapshot();
            self.history.commit(entry);
            return true;
        }
        false
    }

    /// Write a pending debounced commit now.
    pub fn flush(&mut self) {
        if self.history.has_pending() {
            let entry = self.snapshot();
            self.history.commit(entry);
        }
    }

    /// Drop a pending debounced commit; used on teardown.
    pub fn cancel_pending(&mut self) {
        self.history.cancel_pending();
    }

    fn restore(&mut self, entry: &HistoryEntry) {
        self.zones = entry.zones.clone();
        self.active_zone = entry.active_zone;
        self.selection.clear();
    }

    /// Step back one history entry. Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        self.flush();
        let Some(entry) = self.history.undo() else {
            return false;
        };
        self.restore(&entry);
        debug!("Undo to history entry {}", self.history.index());
        true
    }

    /// Step forward one history entry. Returns false at the end of history.
    pub fn redo(&mut self) -> bool {
        self.flush();
        let Some(entry) = self.history.redo() else {
            return false;
        };
        self.restore(&entry);
        debug!("Redo to history entry {}", self.history.index());
        true
    }

    // Zones

    /// Create an empty zone and make it active.
    pub fn create_zone(&mut self, name: &str) -> EditResult<ZoneId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditorError::BlankZoneName);
        }
        let zone = Zone::new(
            self.ids.zone(),
            name,
            palette_color(self.zones.len()),
            self.settings.default_thickness,
        );
        Ok(self.push_zone(zone))
    }

    fn push_zone(&mut self, zone: Zone) -> ZoneId {
        let id = zone.id;
        debug!("Created zone {} '{}' with {} points", id, zone.name, zone.points.len());
        self.zones.push(zone);
        self.active_zone = Some(id);
        self.selection.clear();
        self.commit(CommitPolicy::Immediate);
        id
    }

    /// Create a zone from importer output. Needs at least 3 points.
    pub fn import_zone(&mut self, imported: ImportedZone) -> EditResult<ZoneId> {
        if imported.points.len() < 3 {
            return Err(EditorError::TooFewImportPoints {
                found: imported.points.len(),
            });
        }
        let name = imported
            .name
            .clone()
            .unwrap_or_else(|| format!("Imported Zone {}", self.zones.len() + 1));
        let mut zone = Zone::new(
            self.ids.zone(),
            name,
            palette_color(self.zones.len()),
            imported.thickness_or(self.settings.import_default_thickness),
        );
        zone.ground_z = imported.ground_z;
        zone.points = imported
            .points
            .iter()
            .map(|p| self.new_point(p.position, p.z))
            .collect();
        Ok(self.push_zone(zone))
    }

    /// Turn a template preview into a zone.
    pub fn create_zone_from_template(&mut self, preview: &PreviewShape) -> ZoneId {
        let mut zone = Zone::new(
            self.ids.zone(),
            preview.zone_name(),
            palette_color(self.zones.len()),
            self.settings.default_thickness,
        );
        zone.points = preview
            .points()
            .iter()
            .map(|p| self.new_point(*p, None))
            .collect();
        self.push_zone(zone)
    }

    /// Delete a zone. Deleting the active zone leaves no zone active.
    pub fn delete_zone(&mut self, id: ZoneId) -> EditResult<Zone> {
        let index = self.zone_index(id)?;
        let zone = self.zones.remove(index);
        if self.active_zone == Some(id) {
            self.active_zone = None;
            self.selection.clear();
        }
        self.commit(CommitPolicy::Immediate);
        debug!("Deleted zone {} '{}'", id, zone.name);
        Ok(zone)
    }

    /// Make `id` the active zone, or deactivate it if it already is.
    pub fn select_zone(&mut self, id: ZoneId) -> EditResult<Option<ZoneId>> {
        self.zone_index(id)?;
        self.active_zone = if self.active_zone == Some(id) {
            None
        } else {
            Some(id)
        };
        self.selection.clear();
        Ok(self.active_zone)
    }

    pub fn rename_zone(
        &mut self,
        id: ZoneId,
        name: &str,
        policy: impl Into<CommitPolicy>,
    ) -> EditResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditorError::BlankZoneName);
        }
        let index = self.zone_index(id)?;
        self.zones[index].name = SmolStr::new(name);
        self.commit(policy);
        Ok(())
    }

    pub fn set_thickness(
        &mut self,
        id: ZoneId,
        thickness: f64,
        policy: impl Into<CommitPolicy>,
    ) -> EditResult<()> {
        let index = self.zone_index(id)?;
        self.zones[index].thickness = thickness;
        self.commit(policy);
        Ok(())
    }

    /// Set or clear the zone's floor height, leaving point heights alone.
    pub fn set_ground_z(
        &mut self,
        id: ZoneId,
        ground_z: Option<f64>,
        policy: impl Into<CommitPolicy>,
    ) -> EditResult<()> {
        let index = self.zone_index(id)?;
        self.zones[index].ground_z = ground_z;
        self.commit(policy);
        Ok(())
    }

    /// Apply a measured ground height to the zone and all of its points.
    pub fn apply_ground_z(&mut self, id: ZoneId, z: f64) -> EditResult<f64> {
        let index = self.zone_index(id)?;
        let z = round2(z);
        let zone = &mut self.zones[index];
        zone.ground_z = Some(z);
        for point in &mut zone.points {
            point.z = Some(z);
        }
        self.commit(CommitPolicy::Immediate);
        Ok(z)
    }

    pub fn set_fill_pattern(
        &mut self,
        id: ZoneId,
        pattern: FillPattern,
        policy: impl Into<CommitPolicy>,
    ) -> EditResult<()> {
        let index = self.zone_index(id)?;
        self.zones[index].fill_pattern = pattern;
        self.commit(policy);
        Ok(())
    }

    /// Show or hide a zone. Visibility is a view setting and is not recorded.
    pub fn toggle_visibility(&mut self, id: ZoneId) -> EditResult<bool> {
        let index = self.zone_index(id)?;
        let zone = &mut self.zones[index];
        zone.visible = !zone.visible;
        Ok(zone.visible)
    }

    // Points

    /// Append a point to the active zone in click order.
    pub fn add_point(&mut self, zone: ZoneId, world: WorldPoint) -> EditResult<PointId> {
        if self.gesture_active {
            return Err(EditorError::GestureInProgress);
        }
        let index = self.require_active(zone)?;
        let point = self.new_point(world, None);
        let id = point.id;
        self.zones[index].points.push(point);
        self.commit(CommitPolicy::Immediate);
        Ok(id)
    }

    /// Splice a point into the active zone at `at`, clamped to the end.
    pub fn insert_point_at_edge(
        &mut self,
        zone: ZoneId,
        at: usize,
        world: WorldPoint,
    ) -> EditResult<PointId> {
        let index = self.require_active(zone)?;
        let point = self.new_point(world, None);
        let id = point.id;
        let points = &mut self.zones[index].points;
        points.insert(at.min(points.len()), point);
        self.commit(CommitPolicy::Immediate);
        Ok(id)
    }

    /// Move a point of the active zone. The point's stored height is cleared.
    pub fn move_point(
        &mut self,
        zone: ZoneId,
        point: PointId,
        world: WorldPoint,
        policy: impl Into<CommitPolicy>,
    ) -> EditResult<()> {
        let index = self.require_active(zone)?;
        let projection = self.projection;
        let target = self.zones[index]
            .points
            .iter_mut()
            .find(|p| p.id == point)
            .ok_or(EditorError::UnknownPoint(point))?;
        target.relocate(world.rounded(), &projection);
        self.commit(policy);
        Ok(())
    }

    pub fn delete_point(&mut self, zone: ZoneId, point: PointId) -> EditResult<()> {
        let index = self.zone_index(zone)?;
        let position = self.zones[index]
            .point_index(point)
            .ok_or(EditorError::UnknownPoint(point))?;
        self.zones[index].points.remove(position);
        self.selection.remove(point);
        self.commit(CommitPolicy::Immediate);
        Ok(())
    }

    /// Remove the most recently added point of the active zone.
    pub fn delete_last_point(&mut self) -> Option<PointId> {
        let index = self.zone_index(self.active_zone?).ok()?;
        let point = self.zones[index].points.pop()?;
        self.selection.remove(point.id);
        self.commit(CommitPolicy::Immediate);
        Some(point.id)
    }

    /// Remove every selected point from the active zone. Returns how many
    /// points were removed.
    pub fn delete_selected_points(&mut self) -> usize {
        let Some(index) = self.active_zone.and_then(|id| self.zone_index(id).ok()) else {
            return 0;
        };
        if self.selection.is_empty() {
            return 0;
        }
        let selection = std::mem::take(&mut self.selection);
        let points = &mut self.zones[index].points;
        let before = points.len();
        points.retain(|p| !selection.contains(p.id));
        let removed = before - points.len();
        if removed > 0 {
            self.commit(CommitPolicy::Immediate);
        }
        removed
    }

    /// Select the active zone's points inside the marquee, replacing the
    /// previous selection.
    pub fn select_points_in_rect(&mut self, rect: &SelectionRect) -> usize {
        let hits = self
            .active_zone()
            .map(|zone| rect.hits(&zone.points))
            .unwrap_or_default();
        self.selection.set(hits);
        self.selection.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::edit_type::EditType;
    use crate::geometry::ShapeKind;
    use crate::io::CoordinateImporter;

    fn editor() -> ZoneEditor {
        ZoneEditor::default()
    }

    fn square(editor: &mut ZoneEditor) -> ZoneId {
        let id = editor.create_zone("Square").unwrap();
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)] {
            editor.add_point(id, WorldPoint::new(x, y)).unwrap();
        }
        id
    }

    #[test]
    fn test_blank_name_is_rejected_without_change() {
        let mut editor = editor();
        assert_eq!(editor.create_zone("   "), Err(EditorError::BlankZoneName));
        assert!(editor.zones().is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_create_zone_activates_and_commits() {
        let mut editor = editor();
        let id = editor.create_zone("  Gas Station ").unwrap();
        let zone = editor.zone(id).unwrap();
        assert_eq!(zone.name, "Gas Station");
        assert_eq!(zone.color, "#22c55e");
        assert_eq!(zone.thickness, 150.0);
        assert_eq!(editor.active_zone_id(), Some(id));
        assert_eq!(editor.history().len(), 2);

        let second = editor.create_zone("Bank").unwrap();
        assert_eq!(editor.zone(second).unwrap().color, "#3b82f6");
    }

    #[test]
    fn test_add_point_only_on_active_zone() {
        let mut editor = editor();
        let first = editor.create_zone("A").unwrap();
        let second = editor.create_zone("B").unwrap();
        assert_eq!(
            editor.add_point(first, WorldPoint::new(1.0, 1.0)),
            Err(EditorError::InactiveZone(first))
        );
        editor.set_gesture_active(true);
        assert_eq!(
            editor.add_point(second, WorldPoint::new(1.0, 1.0)),
            Err(EditorError::GestureInProgress)
        );
        editor.set_gesture_active(false);
        editor.add_point(second, WorldPoint::new(1.234, 5.678)).unwrap();
        assert_eq!(
            editor.zone(second).unwrap().points[0].world,
            WorldPoint::new(1.23, 5.68)
        );
    }

    #[test]
    fn test_points_keep_click_order_and_splice() {
        let mut editor = editor();
        let id = square(&mut editor);
        editor
            .insert_point_at_edge(id, 1, WorldPoint::new(50.0, 0.0))
            .unwrap();
        let xs: Vec<f64> = editor.zone(id).unwrap().points.iter().map(|p| p.world.x).collect();
        assert_eq!(xs, vec![0.0, 50.0, 100.0, 100.0, 0.0]);
    }

    #[test]
    fn test_drag_commits_once_after_debounce() {
        let mut editor = editor();
        let id = square(&mut editor);
        let point = editor.zone(id).unwrap().points[0].id;
        let before = editor.history().len();

        for step in 1..=10 {
            editor
                .move_point(id, point, WorldPoint::new(step as f64, 0.0), EditType::Drag)
                .unwrap();
            editor.tick(Duration::from_millis(16));
        }
        assert_eq!(editor.history().len(), before);
        assert!(editor.tick(Duration::from_millis(500)));
        assert_eq!(editor.history().len(), before + 1);
    }

    #[test]
    fn test_drag_release_commits_immediately() {
        let mut editor = editor();
        let id = square(&mut editor);
        let point = editor.zone(id).unwrap().points[0].id;
        let before = editor.history().len();

        editor
            .move_point(id, point, WorldPoint::new(-5.0, -5.0), EditType::Drag)
            .unwrap();
        editor.commit(EditType::DragUp);
        assert_eq!(editor.history().len(), before + 1);
        assert!(!editor.tick(Duration::from_secs(1)));
        assert_eq!(editor.history().len(), before + 1);
    }

    #[test]
    fn test_move_clears_point_height() {
        let mut editor = editor();
        let id = square(&mut editor);
        editor.apply_ground_z(id, 12.346).unwrap();
        let point = editor.zone(id).unwrap().points[0].id;
        editor
            .move_point(id, point, WorldPoint::new(3.0, 3.0), CommitPolicy::Immediate)
            .unwrap();
        let zone = editor.zone(id).unwrap();
        assert_eq!(zone.ground_z, Some(12.35));
        assert_eq!(zone.points[0].z, None);
        assert_eq!(zone.points[1].z, Some(12.35));
    }

    #[test]
    fn test_undo_restores_whole_state() {
        let mut editor = editor();
        let id = square(&mut editor);
        editor.delete_zone(id).unwrap();
        assert_eq!(editor.active_zone_id(), None);

        assert!(editor.undo());
        assert_eq!(editor.active_zone_id(), Some(id));
        assert_eq!(editor.zone(id).unwrap().points.len(), 4);

        assert!(editor.redo());
        assert!(editor.zones().is_empty());
        assert!(!editor.redo());
    }

    #[test]
    fn test_undo_flushes_pending_edit_first() {
        let mut editor = editor();
        let id = editor.create_zone("Field").unwrap();
        editor.set_thickness(id, 20.0, EditType::FieldEdit).unwrap();
        assert!(editor.undo());
        // The debounced thickness edit became its own entry and was undone
        assert_eq!(editor.zone(id).unwrap().thickness, 150.0);
        assert!(editor.redo());
        assert_eq!(editor.zone(id).unwrap().thickness, 20.0);
    }

    #[test]
    fn test_fill_pattern_is_recorded() {
        let mut editor = editor();
        let id = editor.create_zone("Lot").unwrap();
        let entries = editor.history().len();

        editor
            .set_fill_pattern(id, FillPattern::Stripes, CommitPolicy::Immediate)
            .unwrap();
        assert_eq!(editor.zone(id).unwrap().fill_pattern, FillPattern::Stripes);
        assert_eq!(editor.history().len(), entries + 1);

        assert!(editor.undo());
        assert_eq!(editor.zone(id).unwrap().fill_pattern, FillPattern::Solid);

        let missing = editor.create_zone("Gone").unwrap();
        editor.delete_zone(missing).unwrap();
        assert_eq!(
            editor.set_fill_pattern(missing, FillPattern::Dots, CommitPolicy::Immediate),
            Err(EditorError::UnknownZone(missing))
        );
    }

    #[test]
    fn test_select_zone_toggles_and_clears_selection() {
        let mut editor = editor();
        let id = square(&mut editor);
        let corners = SelectionRect {
            start: editor.projection().world_to_map(WorldPoint::new(-1.0, -1.0)),
            end: editor.projection().world_to_map(WorldPoint::new(101.0, 1.0)),
        };
        assert_eq!(editor.select_points_in_rect(&corners), 2);

        assert_eq!(editor.select_zone(id), Ok(None));
        assert!(editor.selection().is_empty());
        assert_eq!(editor.select_zone(id), Ok(Some(id)));
    }

    #[test]
    fn test_delete_selected_and_last_points() {
        let mut editor = editor();
        let id = square(&mut editor);
        let rect = SelectionRect {
            start: editor.projection().world_to_map(WorldPoint::new(-1.0, -1.0)),
            end: editor.projection().world_to_map(WorldPoint::new(1.0, 101.0)),
        };
        editor.select_points_in_rect(&rect);
        assert_eq!(editor.delete_selected_points(), 2);
        assert!(editor.selection().is_empty());
        assert_eq!(editor.zone(id).unwrap().points.len(), 2);

        let last = editor.zone(id).unwrap().points[1].id;
        assert_eq!(editor.delete_last_point(), Some(last));
        assert_eq!(editor.zone(id).unwrap().points.len(), 1);
    }

    #[test]
    fn test_import_needs_three_points() {
        let mut editor = editor();
        let parsed = CoordinateImporter::new().parse("{x = 10, y = 20}, {x = 30, y = 40}");
        assert_eq!(
            editor.import_zone(parsed),
            Err(EditorError::TooFewImportPoints { found: 2 })
        );
        assert!(editor.zones().is_empty());

        let parsed = CoordinateImporter::new().parse("vec2(0,0) vec2(10,0) vec2(10,10)");
        let id = editor.import_zone(parsed).unwrap();
        let zone = editor.zone(id).unwrap();
        assert_eq!(zone.name, "Imported Zone 1");
        assert_eq!(zone.thickness, 200.0);
    }

    #[test]
    fn test_template_confirm_creates_named_zone() {
        let mut editor = editor();
        let preview = PreviewShape::new(ShapeKind::Hexagon, WorldPoint::new(10.0, 10.0), 40.0);
        let id = editor.create_zone_from_template(&preview);
        let zone = editor.zone(id).unwrap();
        assert_eq!(zone.name, "Hexagon Zone");
        assert_eq!(zone.points.len(), 6);
        assert_eq!(editor.active_zone_id(), Some(id));
    }

    #[test]
    fn test_snapping_applies_before_projection() {
        let mut editor = editor();
        editor.settings_mut().snap_to_grid = true;
        let map = editor.projection().world_to_map(WorldPoint::new(104.0, 96.0));
        assert_eq!(editor.world_from_map(map), WorldPoint::new(100.0, 100.0));
    }

    #[test]
    fn test_visibility_is_not_recorded() {
        let mut editor = editor();
        let id = editor.create_zone("Hidden").unwrap();
        let before = editor.history().len();
        assert_eq!(editor.toggle_visibility(id), Ok(false));
        assert_eq!(editor.history().len(), before);
    }
}
