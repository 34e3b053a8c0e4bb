//! Wire messages exchanged with peers
//!
//! Every WebSocket text frame carries one JSON envelope:
//!
//! ```text
//! {"event": "location",          "data": {"id": "p1", "latitude": 10.0, "longitude": 20.0}}   peer -> hub
//! {"event": "locationUpdate",    "data": {"id": "p1", "latitude": 10.0, "longitude": 20.0}}   hub -> peer
//! {"event": "user-disconnected", "data": "p1"}                                                hub -> peer
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ReportError;

/// Client-chosen identity of a peer
///
/// Opaque and untrusted. The only guarantee is that it is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Create a peer id, rejecting the empty string
    pub fn new(id: impl Into<String>) -> Result<Self, ReportError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ReportError::EmptyIdentity);
        }
        Ok(Self(id))
    }

    /// Borrow the raw identity
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last-known geographic position of a peer
///
/// Stored as received; coordinates are not range checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Raw `location` payload as sent by a peer
///
/// All fields are optional on the wire so a missing field is reported as a
/// validation failure instead of an opaque decode error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl LocationReport {
    /// Build a complete report
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: Some(id.into()),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Check that identity and both coordinates are present
    pub fn validate(self) -> Result<(PeerId, Position), ReportError> {
        let id = self.id.ok_or(ReportError::MissingField("id"))?;
        let latitude = self.latitude.ok_or(ReportError::MissingField("latitude"))?;
        let longitude = self
            .longitude
            .ok_or(ReportError::MissingField("longitude"))?;

        Ok((PeerId::new(id)?, Position::new(latitude, longitude)))
    }
}

/// Payload of a `locationUpdate` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: PeerId,
    pub latitude: f64,
    pub longitude: f64,
}

impl PositionUpdate {
    pub fn new(id: PeerId, position: Position) -> Self {
        Self {
            id,
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }
}

/// Messages sent from a peer to the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    /// Position report; binds the channel to `id` on first use
    #[serde(rename = "location")]
    Location(LocationReport),
}

impl ClientMessage {
    /// Decode a text frame
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Messages sent from the hub to peers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    /// A peer's current position (catch-up or live)
    #[serde(rename = "locationUpdate")]
    LocationUpdate(PositionUpdate),
    /// A peer is gone; payload is the bare identity
    #[serde(rename = "user-disconnected")]
    UserDisconnected(PeerId),
}

impl ServerMessage {
    pub fn location_update(id: PeerId, position: Position) -> Self {
        ServerMessage::LocationUpdate(PositionUpdate::new(id, position))
    }

    /// Short event name for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::LocationUpdate(_) => "locationUpdate",
            ServerMessage::UserDisconnected(_) => "user-disconnected",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_location() {
        let msg = ClientMessage::from_json(
            r#"{"event":"location","data":{"id":"p1","latitude":10,"longitude":20.5}}"#,
        )
        .unwrap();

        let ClientMessage::Location(report) = msg;
        let (peer, position) = report.validate().unwrap();
        assert_eq!(peer.as_str(), "p1");
        assert_eq!(position, Position::new(10.0, 20.5));
    }

    #[test]
    fn test_decode_unknown_event_fails() {
        let result = ClientMessage::from_json(r#"{"event":"teleport","data":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_non_numeric_coordinate_fails() {
        let result = ClientMessage::from_json(
            r#"{"event":"location","data":{"id":"p1","latitude":"north","longitude":1}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_missing_fields() {
        let report = LocationReport {
            id: Some("p1".into()),
            latitude: None,
            longitude: Some(1.0),
        };
        assert_eq!(
            report.validate(),
            Err(ReportError::MissingField("latitude"))
        );

        let report = LocationReport {
            id: None,
            latitude: Some(1.0),
            longitude: Some(1.0),
        };
        assert_eq!(report.validate(), Err(ReportError::MissingField("id")));

        let report: LocationReport = serde_json::from_value(json!({"id": "p1", "latitude": 3})).unwrap();
        assert_eq!(
            report.validate(),
            Err(ReportError::MissingField("longitude"))
        );
    }

    #[test]
    fn test_validate_empty_identity() {
        let report = LocationReport::new("", 1.0, 2.0);
        assert_eq!(report.validate(), Err(ReportError::EmptyIdentity));
    }

    #[test]
    fn test_out_of_range_coordinates_accepted() {
        let (_, position) = LocationReport::new("p1", 500.0, -900.0).validate().unwrap();
        assert_eq!(position, Position::new(500.0, -900.0));
    }

    #[test]
    fn test_encode_location_update() {
        let msg = ServerMessage::location_update(PeerId::new("p1").unwrap(), Position::new(10.0, 20.0));
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(
            value,
            json!({"event": "locationUpdate", "data": {"id": "p1", "latitude": 10.0, "longitude": 20.0}})
        );
    }

    #[test]
    fn test_encode_user_disconnected_is_bare_identity() {
        let msg = ServerMessage::UserDisconnected(PeerId::new("p1").unwrap());
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value, json!({"event": "user-disconnected", "data": "p1"}));
        assert_eq!(msg.event_name(), "user-disconnected");
    }
}
