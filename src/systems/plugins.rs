use bevy::prelude::*;

use super::commands::CommandsPlugin;
use super::session::ZoneCreatorSession;
use crate::core::settings::EditorSettings;
use crate::io::{GroundZResolved, HostMessage, HostRequest};

/// Ordering of the session systems within a frame
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionSet {
    /// Host messages and replies are applied
    Inbound,
    /// Timers advance
    Tick,
    /// Queued host requests go out
    Outbound,
}

/// Plugin owning the session resource and its host plumbing
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<EditorSettings>()
            .cloned()
            .unwrap_or_default();
        info!(
            "Starting zone creator session (grid {}, snap {})",
            settings.grid_size, settings.snap_to_grid
        );
        app.insert_resource(ZoneCreatorSession::new(settings))
            .add_event::<HostMessage>()
            .add_event::<HostRequest>()
            .add_event::<GroundZResolved>()
            .init_resource::<Time>()
            .configure_sets(
                Update,
                (SessionSet::Inbound, SessionSet::Tick, SessionSet::Outbound).chain(),
            )
            .add_systems(
                Update,
                (apply_host_messages, apply_ground_z_replies).in_set(SessionSet::Inbound),
            )
            .add_systems(Update, tick_session.in_set(SessionSet::Tick))
            .add_systems(Update, flush_host_requests.in_set(SessionSet::Outbound));
    }
}

fn apply_host_messages(
    mut messages: EventReader<HostMessage>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    for message in messages.read() {
        debug!("Host message: {:?}", message);
        session.handle_host_message(message.clone());
    }
}

fn apply_ground_z_replies(
    mut replies: EventReader<GroundZResolved>,
    mut session: ResMut<ZoneCreatorSession>,
) {
    for reply in replies.read() {
        session.ground_z_resolved(*reply);
    }
}

fn tick_session(time: Res<Time>, mut session: ResMut<ZoneCreatorSession>) {
    session.tick(time.delta());
}

fn flush_host_requests(
    mut session: ResMut<ZoneCreatorSession>,
    mut requests: EventWriter<HostRequest>,
) {
    if session.has_queued_requests() {
        requests.write_batch(session.drain_requests());
    }
}

/// Main plugin that bundles all zone creator plugins
pub struct ZoneCreatorPlugin;

impl Plugin for ZoneCreatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((SessionPlugin, CommandsPlugin));
    }
}
