//! Interaction scripts
//!
//! A script is a JSON array of canvas events replayed against a document:
//!
//! ```json
//! [
//!   { "event": "connect_from", "card": "Inbox" },
//!   { "event": "drag", "x": 240, "y": 60 },
//!   { "event": "release", "x": 240, "y": 60 },
//!   { "event": "move_card", "card": "Inbox", "x": 0, "y": 200 }
//! ]
//! ```
//!
//! Cards are referenced by title or by id.

use std::path::Path;

use cardmap_core::CardWidget;
use cardmap_ir::{CardId, Document, DocumentHandle, End, Position, Rect, Size};
use cardmap_ui::{DropOutcome, Viewport};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while loading or replaying a script
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Event {index}: no card titled or identified by '{reference}'")]
    UnknownCard { index: usize, reference: String },

    #[error("Event {index} ({event}) failed: {source}")]
    Event {
        index: usize,
        event: &'static str,
        #[source]
        source: cardmap_ir::MapError,
    },
}

/// One canvas interaction
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Move a card, optionally resizing it
    MoveCard {
        card: String,
        x: f32,
        y: f32,
        #[serde(default)]
        width: Option<f32>,
        #[serde(default)]
        height: Option<f32>,
    },

    /// Delete a card and every connector attached to it
    DeleteCard { card: String },

    /// Start a new connector anchored on a card
    ConnectFrom {
        card: String,
        #[serde(default = "default_anchored_end")]
        end: End,
    },

    /// Press the pointer
    Press { x: f32, y: f32 },

    /// Move the pointer with the button held
    Drag { x: f32, y: f32 },

    /// Release the pointer
    Release { x: f32, y: f32 },
}

fn default_anchored_end() -> End {
    End::Orig
}

impl ScriptEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptEvent::MoveCard { .. } => "move_card",
            ScriptEvent::DeleteCard { .. } => "delete_card",
            ScriptEvent::ConnectFrom { .. } => "connect_from",
            ScriptEvent::Press { .. } => "press",
            ScriptEvent::Drag { .. } => "drag",
            ScriptEvent::Release { .. } => "release",
        }
    }
}

/// Parse a script from JSON text
pub fn parse_script(text: &str) -> Result<Vec<ScriptEvent>, ScriptError> {
    Ok(serde_json::from_str(text)?)
}

/// Read and parse a script file
pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<ScriptEvent>, ScriptError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_script(&text)
}

/// Tally of a replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub bound: usize,
    pub reverted: usize,
    pub discarded: usize,
}

/// Apply `events` in order to a document and its viewport
pub fn replay(
    document: &mut Document,
    viewport: &mut Viewport,
    events: &[ScriptEvent],
) -> Result<ReplaySummary, ScriptError> {
    let mut summary = ReplaySummary::default();

    for (index, event) in events.iter().enumerate() {
        let fail = |source| ScriptError::Event {
            index,
            event: event.name(),
            source,
        };
        tracing::debug!(index, event = event.name(), "Replaying event");

        match event {
            ScriptEvent::MoveCard {
                card,
                x,
                y,
                width,
                height,
            } => {
                let id = resolve_card(document, index, card)?;
                let current = viewport.card(id).map(|c| c.rect()).unwrap_or_default();
                let rect = Rect::new(
                    Position::new(*x, *y),
                    Size::new(
                        width.unwrap_or(current.width()),
                        height.unwrap_or(current.height()),
                    ),
                );
                viewport.move_card(id, rect).map_err(fail)?;
                document.move_card(id, rect).map_err(fail)?;
                document.commit().map_err(fail)?;
            }
            ScriptEvent::DeleteCard { card } => {
                let id = resolve_card(document, index, card)?;
                viewport.delete_card(id, document).map_err(fail)?;
                document.remove_card(id);
                document.commit().map_err(fail)?;
            }
            ScriptEvent::ConnectFrom { card, end } => {
                let id = resolve_card(document, index, card)?;
                viewport.begin_connector(id, *end).map_err(fail)?;
            }
            ScriptEvent::Press { x, y } => {
                viewport.pointer_down(Position::new(*x, *y)).map_err(fail)?;
            }
            ScriptEvent::Drag { x, y } => {
                viewport.pointer_move(Position::new(*x, *y)).map_err(fail)?;
            }
            ScriptEvent::Release { x, y } => {
                match viewport
                    .pointer_up(Position::new(*x, *y), document)
                    .map_err(fail)?
                {
                    DropOutcome::Bound(_) => summary.bound += 1,
                    DropOutcome::Reverted => summary.reverted += 1,
                    DropOutcome::Discarded => summary.discarded += 1,
                    DropOutcome::Ignored => {}
                }
            }
        }
        summary.events += 1;
    }

    Ok(summary)
}

/// Find a card by id or, failing that, by title
fn resolve_card(document: &Document, index: usize, reference: &str) -> Result<CardId, ScriptError> {
    Uuid::parse_str(reference)
        .ok()
        .filter(|id| document.get_card(*id).is_some())
        .or_else(|| document.get_card_by_title(reference).map(|c| c.id))
        .ok_or_else(|| ScriptError::UnknownCard {
            index,
            reference: reference.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardmap_ir::Card;
    use cardmap_ui::CanvasConfig;

    fn setup(connected: bool) -> (Document, Viewport) {
        let mut doc = Document::new("Script");
        let a = doc.add_card(Card::new("A").with_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0)));
        let b = doc.add_card(Card::new("B").with_rect(Rect::from_xywh(100.0, 0.0, 10.0, 10.0)));
        if connected {
            doc.create_edge(a, b).unwrap();
        }
        let viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();
        (doc, viewport)
    }

    #[test]
    fn test_parse_events() {
        let events = parse_script(
            r#"[
                {"event": "connect_from", "card": "A"},
                {"event": "connect_from", "card": "B", "end": "dest"},
                {"event": "move_card", "card": "A", "x": 1, "y": 2, "width": 30},
                {"event": "release", "x": 5.5, "y": 6}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            events[0],
            ScriptEvent::ConnectFrom {
                card: "A".into(),
                end: End::Orig
            }
        );
        assert_eq!(
            events[1],
            ScriptEvent::ConnectFrom {
                card: "B".into(),
                end: End::Dest
            }
        );
        assert_eq!(
            events[2],
            ScriptEvent::MoveCard {
                card: "A".into(),
                x: 1.0,
                y: 2.0,
                width: Some(30.0),
                height: None
            }
        );
        assert_eq!(events[3], ScriptEvent::Release { x: 5.5, y: 6.0 });
    }

    #[test]
    fn test_parse_rejects_unknown_event() {
        let err = parse_script(r#"[{"event": "teleport"}]"#).unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
    }

    #[test]
    fn test_replay_connects_cards() {
        let (mut doc, mut viewport) = setup(false);
        let events = parse_script(
            r#"[
                {"event": "connect_from", "card": "A"},
                {"event": "drag", "x": 105, "y": 5},
                {"event": "release", "x": 105, "y": 5},
                {"event": "connect_from", "card": "A"},
                {"event": "release", "x": 500, "y": 500}
            ]"#,
        )
        .unwrap();

        let summary = replay(&mut doc, &mut viewport, &events).unwrap();
        assert_eq!(
            summary,
            ReplaySummary {
                events: 5,
                bound: 1,
                reverted: 0,
                discarded: 1
            }
        );
        assert_eq!(doc.edge_count(), 1);
        assert_eq!(viewport.connector_count(), 1);
    }

    #[test]
    fn test_replay_move_and_delete() {
        let (mut doc, mut viewport) = setup(true);
        let a = doc.get_card_by_title("A").unwrap().id;
        let b = doc.get_card_by_title("B").unwrap().id;
        assert_eq!(viewport.connector_count(), 1);

        let events = parse_script(&format!(
            r#"[
                {{"event": "move_card", "card": "{a}", "x": 0, "y": 100}},
                {{"event": "delete_card", "card": "B"}}
            ]"#
        ))
        .unwrap();
        replay(&mut doc, &mut viewport, &events).unwrap();

        assert_eq!(doc.get_card(a).unwrap().rect, Rect::from_xywh(0.0, 100.0, 10.0, 10.0));
        assert!(doc.get_card(b).is_none());
        assert_eq!(doc.edge_count(), 0);
        assert_eq!(viewport.connector_count(), 0);
    }

    #[test]
    fn test_replay_unknown_card() {
        let (mut doc, mut viewport) = setup(false);
        let events = vec![ScriptEvent::DeleteCard { card: "Z".into() }];
        let err = replay(&mut doc, &mut viewport, &events).unwrap_err();
        assert!(matches!(err, ScriptError::UnknownCard { index: 0, .. }));
    }
}
