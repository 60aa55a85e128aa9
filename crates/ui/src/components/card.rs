//! # Card Widget
//!
//! On-canvas representation of a document card.
//!
//! The widget holds the card's current bounds and a registry of connector
//! listeners. Connectors subscribe for geometry and deletion notifications;
//! the viewport reads the registry with [`ViewportCard::listeners`] when it
//! dispatches those notifications.

use cardmap_core::{
    CardEvent, CardId, CardWidget, ConnectorId, Position, Rect, SubscriptionToken,
};
use cardmap_ir::Card;

// ============================================================================
// Constants
// ============================================================================

/// Corner radius of a card
pub const CARD_RADIUS: f32 = 6.0;

/// Card fill color
pub const CARD_FILL: &str = "#ffffff";

/// Card border color
pub const CARD_STROKE: &str = "#4a5568";

/// Border color of a card highlighted as a drop target
pub const CARD_HIGHLIGHT_STROKE: &str = "#6060ff";

// ============================================================================
// Listener Registry
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Listener {
    token: SubscriptionToken,
    event: CardEvent,
    connector: ConnectorId,
}

// ============================================================================
// Viewport Card
// ============================================================================

/// A draggable card on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportCard {
    id: CardId,
    title: String,
    rect: Rect,
    highlighted: bool,
    listeners: Vec<Listener>,
    next_token: u64,
}

impl ViewportCard {
    /// Create a widget with no listeners
    pub fn new(id: CardId, title: impl Into<String>, rect: Rect) -> Self {
        Self {
            id,
            title: title.into(),
            rect,
            highlighted: false,
            listeners: Vec::new(),
            next_token: 1,
        }
    }

    /// Create a widget displaying a document card
    pub fn from_card(card: &Card) -> Self {
        Self::new(card.id, card.title.clone(), card.rect)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Move or resize the widget.
    ///
    /// This does not notify listeners; the viewport does that after the
    /// move so that every connector sees the new bounds.
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn contains(&self, point: Position) -> bool {
        self.rect.contains(point)
    }

    /// Connectors registered for `event`, in registration order
    pub fn listeners(&self, event: CardEvent) -> Vec<ConnectorId> {
        self.listeners
            .iter()
            .filter(|l| l.event == event)
            .map(|l| l.connector)
            .collect()
    }

    /// Number of registrations for `event`
    pub fn listener_count(&self, event: CardEvent) -> usize {
        self.listeners.iter().filter(|l| l.event == event).count()
    }

    /// Whether `connector` holds any registration on this card
    pub fn has_listener(&self, connector: ConnectorId) -> bool {
        self.listeners.iter().any(|l| l.connector == connector)
    }

    /// Render as an SVG group
    pub fn to_svg(&self) -> String {
        let stroke = if self.highlighted {
            CARD_HIGHLIGHT_STROKE
        } else {
            CARD_STROKE
        };
        let stroke_width = if self.highlighted { 3 } else { 1 };
        let center = self.rect.center();

        format!(
            r#"<g data-card="{id}"><rect x="{x}" y="{y}" width="{w}" height="{h}" rx="{r}" fill="{fill}" stroke="{stroke}" stroke-width="{stroke_width}"/><text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="middle">{title}</text></g>"#,
            id = self.id,
            x = self.rect.x(),
            y = self.rect.y(),
            w = self.rect.width(),
            h = self.rect.height(),
            r = CARD_RADIUS,
            fill = CARD_FILL,
            cx = center.x,
            cy = center.y,
            title = escape_xml(&self.title),
        )
    }
}

impl CardWidget for ViewportCard {
    fn card_id(&self) -> CardId {
        self.id
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn highlight(&mut self) {
        self.highlighted = true;
    }

    fn unhighlight(&mut self) {
        self.highlighted = false;
    }

    fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    fn add_listener(&mut self, event: CardEvent, listener: ConnectorId) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;
        self.listeners.push(Listener {
            token,
            event,
            connector: listener,
        });
        token
    }

    fn remove_listener(&mut self, token: SubscriptionToken) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.token != token);
        self.listeners.len() != before
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
