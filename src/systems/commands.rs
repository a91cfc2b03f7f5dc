//! commands.rs - Event-based command system for the zone creator
//!
//! UI actions arrive as events and are applied to the [`ZoneCreatorSession`]
//! resource:
//! 1. Event structs describe one user action each
//! 2. Handler systems apply them to the session
//! 3. CommandsPlugin registers the events and the handlers
//!
//! Failures are logged and surface to the user through the session's
//! notifications, never as panics.

use bevy::prelude::*;

use super::plugins::SessionSet;
use super::session::{KeyPress, ZoneCreatorSession};
use crate::data::ZoneId;
use crate::geometry::ShapeKind;
use crate::io::ExportFormat;

#[derive(Event, Debug, Clone)]
pub struct CreateZoneEvent {
    pub name: String,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct DeleteZoneEvent {
    pub zone: ZoneId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct CopyZoneCodeEvent {
    pub zone: ZoneId,
    pub format: ExportFormat,
}

#[derive(Event, Debug, Clone)]
pub struct ImportZoneEvent {
    pub text: String,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct CalculateGroundZEvent {
    pub zone: ZoneId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ViewZoneEvent {
    pub zone: ZoneId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct StartTemplateEvent {
    pub kind: ShapeKind,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct UndoEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct RedoEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct CloseSessionEvent;

/// Whether a text field has keyboard focus. Shortcuts are ignored while it
/// does.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TextInputFocus(pub bool);

pub struct CommandsPlugin;

impl Plugin for CommandsPlugin {
    fn build(&self, app: &mut App) {
        register_event_handlers(app);
    }
}

fn register_event_handlers(app: &mut App) {
    debug!("Registering zone creator command events");
    app.add_event::<CreateZoneEvent>()
        .add_event::<DeleteZoneEvent>()
        .add_event::<CopyZoneCodeEvent>()
        .add_event::<ImportZoneEvent>()
        .add_event::<CalculateGroundZEvent>()
        .add_event::<ViewZoneEvent>()
        .add_event::<StartTemplateEvent>()
        .add_event::<UndoEvent>()
        .add_event::<RedoEvent>()
        .add_event::<CloseSessionEvent>()
        .init_resource::<TextInputFocus>()
        .init_resource::<ButtonInput<KeyCode>>()
        .add_systems(
            Update,
            (
                handle_create_zone,
                handle_delete_zone,
                handle_copy_zone_code,
                handle_import_zone,
                handle_calculate_ground_z,
                handle_view_zone,
                handle_start_template,
                handle_undo_redo,
                handle_shortcuts,
                handle_close_session,
            )
                .chain()
                .in_set(SessionSet::Inbound),
        );
}

fn handle_create_zone(
    mut events: EventReader<CreateZoneEvent>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    for event in events.read() {
        if let Err(e) = session.create_zone(&event.name) {
            warn!("Failed to create zone {:?}: {}", event.name, e);
        }
    }
}

fn handle_delete_zone(
    mut events: EventReader<DeleteZoneEvent>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    for event in events.read() {
        if let Err(e) = session.delete_zone(event.zone) {
            warn!("Failed to delete {}: {}", event.zone, e);
        }
    }
}

fn handle_copy_zone_code(
    mut events: EventReader<CopyZoneCodeEvent>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    for event in events.read() {
        match session.copy_code(event.zone, event.format) {
            Ok(code) => debug!(
                "Exported {} as {} ({} bytes)",
                event.zone,
                event.format.label(),
                code.len()
            ),
            Err(e) => warn!("Failed to export {}: {}", event.zone, e),
        }
    }
}

fn handle_import_zone(
    mut events: EventReader<ImportZoneEvent>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    for event in events.read() {
        match session.import(&event.text) {
            Ok(zone) => info!("Imported {}", zone),
            Err(e) => debug!("Import rejected: {}", e),
        }
    }
}

fn handle_calculate_ground_z(
    mut events: EventReader<CalculateGroundZEvent>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    for event in events.read() {
        if let Err(e) = session.request_ground_z(event.zone) {
            warn!("Cannot calculate ground Z for {}: {}", event.zone, e);
        }
    }
}

fn handle_view_zone(
    mut events: EventReader<ViewZoneEvent>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    for event in events.read() {
        if let Err(e) = session.view_zone(event.zone) {
            warn!("Cannot view {}: {}", event.zone, e);
        }
    }
}

fn handle_start_template(
    mut events: EventReader<StartTemplateEvent>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    for event in events.read() {
        session.start_template(event.kind);
    }
}

fn handle_undo_redo(
    mut undo_events: EventReader<UndoEvent>,
    mut redo_events: EventReader<RedoEvent>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    for _ in undo_events.read() {
        if !session.editor_mut().undo() {
            debug!("Nothing to undo");
        }
    }
    for _ in redo_events.read() {
        if !session.editor_mut().redo() {
            debug!("Nothing to redo");
        }
    }
}

/// Forward freshly pressed keys, with their modifiers, to the session
pub fn handle_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    focus: Res<TextInputFocus>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    // Command on macOS, Control elsewhere
    let command = keyboard.any_pressed([
        KeyCode::SuperLeft,
        KeyCode::SuperRight,
        KeyCode::ControlLeft,
        KeyCode::ControlRight,
    ]);
    let shift = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    for key in keyboard.get_just_pressed() {
        let press = KeyPress {
            key: *key,
            command,
            shift,
            in_text_field: focus.0,
        };
        if session.key_pressed(press) {
            debug!("Handled shortcut {:?}", press);
        }
    }
}

fn handle_close_session(
    mut events: EventReader<CloseSessionEvent>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    if events.read().count() > 0 {
        session.close();
    }
}
