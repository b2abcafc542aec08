//! Wire messages exchanged with the game server.
//!
//! Outbound: `{"pos": [x, z]}` once per click.
//! Inbound: a JSON array with one entry per roster slot, `[{"pos": [x, z]}, ...]`.
//! Slot 0 is always the server's echo of the local player's confirmed move.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::world::GridCell;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub pos: GridCell,
}

impl MoveRequest {
    pub fn new(pos: GridCell) -> Self {
        Self { pos }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    #[serde(default)]
    pub pos: Option<GridCell>,
}

/// One inbound packet. Entries other than slot 0 that fail to parse are kept
/// as `None` so slot numbering stays aligned with the roster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionUpdate {
    pub players: Vec<Option<PlayerUpdate>>,
}

impl PositionUpdate {
    pub fn parse(text: &str) -> Result<Self> {
        let entries: Vec<Value> = serde_json::from_str(text)?;

        let players = entries
            .into_iter()
            .enumerate()
            .map(|(slot, entry)| match serde_json::from_value::<PlayerUpdate>(entry) {
                Ok(update) => Ok(Some(update)),
                Err(err) if slot == 0 => Err(Error::MalformedMessage(format!("slot 0: {err}"))),
                Err(err) => {
                    log::debug!("Ignoring unparseable entry for slot {slot}: {err}");
                    Ok(None)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { players })
    }

    /// Confirmed position of the local player. Every valid packet carries one.
    pub fn local_pos(&self) -> Result<GridCell> {
        self.players
            .first()
            .copied()
            .flatten()
            .and_then(|update| update.pos)
            .ok_or_else(|| Error::MalformedMessage("missing `pos` for slot 0".into()))
    }

    pub fn pos_for(&self, slot: usize) -> Option<GridCell> {
        self.players.get(slot).copied().flatten().and_then(|update| update.pos)
    }

    /// Echo the server sends for a single confirmed move.
    pub fn echo(request: &MoveRequest) -> Result<String> {
        let packet = [PlayerUpdate { pos: Some(request.pos) }];
        Ok(serde_json::to_string(&packet)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_request_wire_format() {
        let request = MoveRequest::new(GridCell::new(3, 4));
        assert_eq!(request.to_json().unwrap(), r#"{"pos":[3,4]}"#);
    }

    #[test]
    fn move_request_survives_the_wire() {
        let request = MoveRequest::new(GridCell::new(12, 250));
        let back: MoveRequest = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn parses_local_slot() {
        let update = PositionUpdate::parse(r#"[{"pos":[3,4]}]"#).unwrap();
        assert_eq!(update.local_pos().unwrap(), GridCell::new(3, 4));
        assert_eq!(update.pos_for(1), None);
    }

    #[test]
    fn keeps_remote_slots_aligned() {
        let update =
            PositionUpdate::parse(r#"[{"pos":[0,0]}, 7, {"pos":[5,6]}, {"name":"x"}]"#).unwrap();
        assert_eq!(update.players.len(), 4);
        assert_eq!(update.pos_for(1), None);
        assert_eq!(update.pos_for(2), Some(GridCell::new(5, 6)));
        assert_eq!(update.pos_for(3), None);
    }

    #[test]
    fn missing_local_pos_is_malformed() {
        let update = PositionUpdate::parse(r#"[{"id":1}]"#).unwrap();
        assert!(matches!(update.local_pos(), Err(Error::MalformedMessage(_))));

        let empty = PositionUpdate::parse("[]").unwrap();
        assert!(matches!(empty.local_pos(), Err(Error::MalformedMessage(_))));
    }

    #[test]
    fn non_array_packets_are_malformed() {
        for text in [r#"{"pos":[1,2]}"#, "not json", r#"[{"pos":"north"}]"#, "[null]"] {
            assert!(
                matches!(PositionUpdate::parse(text), Err(Error::MalformedMessage(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn echo_is_a_valid_update() {
        let request = MoveRequest::new(GridCell::new(9, 1));
        let text = PositionUpdate::echo(&request).unwrap();
        assert_eq!(text, r#"[{"pos":[9,1]}]"#);
        assert_eq!(PositionUpdate::parse(&text).unwrap().local_pos().unwrap(), GridCell::new(9, 1));
    }
}
