//! Payloads exchanged with the host process
//!
//! The host pushes JSON messages shaped `{ "action": ..., "data": ... }` and
//! receives fire-and-forget calls, each naming an endpoint and carrying a
//! JSON body. Only the payload shapes live here. Delivering them is the
//! embedding application's business.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::{Zone, ZoneId};
use crate::geometry::WorldPoint;

/// Heights reported by the in-game zone viewer. Either field may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerTelemetry {
    #[serde(default)]
    pub ground_z: Option<f64>,
    #[serde(default)]
    pub thickness: Option<f64>,
}

/// A message pushed by the host
#[derive(Event, Debug, Clone, PartialEq)]
pub enum HostMessage {
    UpdatePlayerPosition(WorldPoint),
    /// The viewer opened; telemetry may come later
    ZoneViewerStarted(Option<ViewerTelemetry>),
    ZoneViewerUpdate(ViewerTelemetry),
    ZoneViewerStopped { thickness: Option<f64> },
    Show,
    Hide,
    CopyToClipboard(String),
}

#[derive(Deserialize)]
struct RawMessage {
    action: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Deserialize)]
struct PositionData {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct ClipboardData {
    #[serde(default)]
    text: Option<String>,
}

impl HostMessage {
    /// Parse a message. Unknown actions, and actions that need data but
    /// arrived without any, are `Ok(None)`.
    pub fn from_json(json: &str) -> serde_json::Result<Option<HostMessage>> {
        let raw: RawMessage = serde_json::from_str(json)?;
        let data = raw.data.filter(|d| !d.is_null());

        let message = match (raw.action.as_str(), data) {
            ("updatePlayerPosition", Some(data)) => {
                let pos: PositionData = serde_json::from_value(data)?;
                Some(HostMessage::UpdatePlayerPosition(WorldPoint::new(pos.x, pos.y)))
            }
            ("zoneViewerStarted", data) => Some(HostMessage::ZoneViewerStarted(
                data.map(serde_json::from_value).transpose()?,
            )),
            ("zoneViewerUpdate", Some(data)) => {
                Some(HostMessage::ZoneViewerUpdate(serde_json::from_value(data)?))
            }
            ("zoneViewerStopped", data) => {
                let telemetry: Option<ViewerTelemetry> =
                    data.map(serde_json::from_value).transpose()?;
                Some(HostMessage::ZoneViewerStopped {
                    thickness: telemetry.and_then(|t| t.thickness),
                })
            }
            ("showZoneCreator", _) => Some(HostMessage::Show),
            ("hideZoneCreator", _) => Some(HostMessage::Hide),
            ("copyToClipboard", Some(data)) => {
                let clip: ClipboardData = serde_json::from_value(data)?;
                clip.text
                    .filter(|t| !t.is_empty())
                    .map(HostMessage::CopyToClipboard)
            }
            (action, _) => {
                debug!("Ignoring host message '{}'", action);
                None
            }
        };
        Ok(message)
    }
}

/// Reply to a ground height query
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GroundZResponse {
    #[serde(default)]
    pub z: Option<f64>,
}

/// A ground height reply matched back to the zone it was asked for
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GroundZResolved {
    pub zone: ZoneId,
    /// `Err` when the call itself failed
    pub result: Result<GroundZResponse, HostCallFailed>,
}

/// The host call did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCallFailed;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewPoint {
    pub x: f64,
    pub y: f64,
}

/// Body of the request opening the in-game zone viewer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewZonePayload {
    pub points: Vec<ViewPoint>,
    pub ground_z: f64,
    pub thickness: f64,
    pub zone_name: String,
}

impl ViewZonePayload {
    pub fn for_zone(zone: &Zone) -> Self {
        Self {
            points: zone
                .points
                .iter()
                .map(|p| ViewPoint {
                    x: p.world.x,
                    y: p.world.y,
                })
                .collect(),
            ground_z: zone.ground_z.unwrap_or(0.0),
            thickness: zone.thickness,
            zone_name: zone.name.to_string(),
        }
    }
}

/// A call out to the host
#[derive(Event, Debug, Clone, PartialEq)]
pub enum HostRequest {
    CloseSession,
    /// Ground height under `at`, answered later for `zone`
    FetchGroundZ { zone: ZoneId, at: WorldPoint },
    ViewZone(ViewZonePayload),
    StopViewZone,
}

impl HostRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            HostRequest::CloseSession => "closeZoneCreator",
            HostRequest::FetchGroundZ { .. } => "getPointZ",
            HostRequest::ViewZone(_) => "viewZone",
            HostRequest::StopViewZone => "stopViewZone",
        }
    }

    /// JSON body of the call
    pub fn body(&self) -> Value {
        match self {
            HostRequest::CloseSession | HostRequest::StopViewZone => serde_json::json!({}),
            HostRequest::FetchGroundZ { at, .. } => serde_json::json!({ "x": at.x, "y": at.y }),
            HostRequest::ViewZone(payload) => {
                serde_json::to_value(payload).unwrap_or_else(|_| serde_json::json!({}))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{palette_color, IdAllocator, ZonePoint};
    use crate::geometry::MapProjection;
    use serde_json::json;

    #[test]
    fn test_parse_player_position() {
        let msg = HostMessage::from_json(r#"{"action":"updatePlayerPosition","data":{"x":1.5,"y":-2}}"#)
            .unwrap();
        assert_eq!(msg, Some(HostMessage::UpdatePlayerPosition(WorldPoint::new(1.5, -2.0))));
        assert_eq!(
            HostMessage::from_json(r#"{"action":"updatePlayerPosition"}"#).unwrap(),
            None
        );
    }

    #[test]
    fn test_parse_viewer_lifecycle() {
        let started = HostMessage::from_json(r#"{"action":"zoneViewerStarted"}"#).unwrap();
        assert_eq!(started, Some(HostMessage::ZoneViewerStarted(None)));

        let update =
            HostMessage::from_json(r#"{"action":"zoneViewerUpdate","data":{"groundZ":31.2}}"#)
                .unwrap();
        assert_eq!(
            update,
            Some(HostMessage::ZoneViewerUpdate(ViewerTelemetry {
                ground_z: Some(31.2),
                thickness: None,
            }))
        );

        let stopped =
            HostMessage::from_json(r#"{"action":"zoneViewerStopped","data":{"thickness":12}}"#)
                .unwrap();
        assert_eq!(stopped, Some(HostMessage::ZoneViewerStopped { thickness: Some(12.0) }));
    }

    #[test]
    fn test_parse_visibility_and_clipboard() {
        assert_eq!(
            HostMessage::from_json(r#"{"action":"showZoneCreator","data":{}}"#).unwrap(),
            Some(HostMessage::Show)
        );
        assert_eq!(
            HostMessage::from_json(r#"{"action":"hideZoneCreator"}"#).unwrap(),
            Some(HostMessage::Hide)
        );
        assert_eq!(
            HostMessage::from_json(r#"{"action":"copyToClipboard","data":{"text":"vector2(1, 2)"}}"#)
                .unwrap(),
            Some(HostMessage::CopyToClipboard("vector2(1, 2)".to_string()))
        );
        // Nothing to copy
        assert_eq!(
            HostMessage::from_json(r#"{"action":"copyToClipboard","data":{"text":""}}"#).unwrap(),
            None
        );
        assert_eq!(
            HostMessage::from_json(r#"{"action":"copyToClipboard"}"#).unwrap(),
            None
        );
    }

    #[test]
    fn test_unknown_and_malformed() {
        assert_eq!(HostMessage::from_json(r#"{"action":"somethingElse"}"#).unwrap(), None);
        assert!(HostMessage::from_json("not json").is_err());
        assert!(
            HostMessage::from_json(r#"{"action":"updatePlayerPosition","data":{"x":"a"}}"#).is_err()
        );
    }

    #[test]
    fn test_view_zone_body() {
        let projection = MapProjection::new();
        let mut ids = IdAllocator::default();
        let mut zone = Zone::new(ids.zone(), "Dock", palette_color(0), 150.0);
        zone.points
            .push(ZonePoint::new(ids.point(), WorldPoint::new(1.0, 2.0), None, &projection));
        let request = HostRequest::ViewZone(ViewZonePayload::for_zone(&zone));
        assert_eq!(request.endpoint(), "viewZone");
        assert_eq!(
            request.body(),
            json!({
                "points": [{"x": 1.0, "y": 2.0}],
                "groundZ": 0.0,
                "thickness": 150.0,
                "zoneName": "Dock"
            })
        );
    }

    #[test]
    fn test_ground_z_response() {
        let reply: GroundZResponse = serde_json::from_str(r#"{"z":null}"#).unwrap();
        assert_eq!(reply.z, None);
        let reply: GroundZResponse = serde_json::from_str(r#"{"z":28.456}"#).unwrap();
        assert_eq!(reply.z, Some(28.456));
    }
}
