//! # Viewport
//!
//! The canvas that owns card widgets, connector lines and the connectors
//! themselves.
//!
//! [`Scene`] is the drawable part: cards in z-order and the lines connectors
//! draw. It implements [`Surface`], which is all a connector sees of the
//! canvas. [`Viewport`] wraps a scene together with the connectors and
//! dispatches card notifications and pointer input to them.
//!
//! Notifications are delivered one at a time. The listener list of a card is
//! copied before delivery, so a connector that rebinds or deletes itself
//! while handling a notification cannot disturb the loop.

use std::collections::{BTreeMap, HashMap};

use cardmap_core::{
    CardEvent, CardId, CardWidget, ConnectorId, DocumentHandle, EdgeId, End, LineId, MapError,
    MapResult, Position, Rect, Surface,
};
use cardmap_ir::{Document, Edge};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::components::{LinePrimitive, LineStyle, ViewportCard};
use crate::config::CanvasConfig;
use crate::connector::{DropOutcome, EdgeController};

/// Blank space around the rendered content
const RENDER_MARGIN: f32 = 20.0;

// ============================================================================
// Scene
// ============================================================================

/// Cards and lines of a canvas
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Bottom to top
    cards: Vec<ViewportCard>,
    lines: BTreeMap<LineId, LinePrimitive>,
    next_line: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a card on top of the others
    pub fn add_card(&mut self, card: ViewportCard) -> MapResult<()> {
        if self.card(card.card_id()).is_some() {
            return Err(MapError::DuplicateCard(card.card_id()));
        }
        self.cards.push(card);
        Ok(())
    }

    pub fn remove_card(&mut self, id: CardId) -> Option<ViewportCard> {
        let index = self.cards.iter().position(|c| c.card_id() == id)?;
        Some(self.cards.remove(index))
    }

    /// Cards from bottom to top
    pub fn cards(&self) -> &[ViewportCard] {
        &self.cards
    }

    pub fn line(&self, id: LineId) -> Option<&LinePrimitive> {
        self.lines.get(&id)
    }

    /// Lines in creation order
    pub fn lines(&self) -> impl Iterator<Item = &LinePrimitive> {
        self.lines.values()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Most recently created line passing within reach of `point`
    pub fn find_line_at(&self, point: Position, style: &LineStyle, tolerance: f32) -> Option<&LinePrimitive> {
        self.lines
            .values()
            .rev()
            .find(|line| line.hit_test(point, style, tolerance))
    }

    /// Smallest rectangle covering every card and line
    pub fn bounds(&self) -> Option<Rect> {
        let points = self
            .cards
            .iter()
            .flat_map(|c| {
                let r = c.rect();
                [r.position, Position::new(r.right(), r.bottom())]
            })
            .chain(self.lines.values().flat_map(|l| l.coords));

        let mut bounds: Option<(Position, Position)> = None;
        for p in points {
            bounds = Some(match bounds {
                None => (p, p),
                Some((min, max)) => (
                    Position::new(min.x.min(p.x), min.y.min(p.y)),
                    Position::new(max.x.max(p.x), max.y.max(p.y)),
                ),
            });
        }

        bounds.map(|(min, max)| Rect::from_xywh(min.x, min.y, max.x - min.x, max.y - min.y))
    }
}

impl Surface for Scene {
    type Card = ViewportCard;

    fn card(&self, id: CardId) -> Option<&ViewportCard> {
        self.cards.iter().find(|c| c.card_id() == id)
    }

    fn card_mut(&mut self, id: CardId) -> Option<&mut ViewportCard> {
        self.cards.iter_mut().find(|c| c.card_id() == id)
    }

    fn find_card_at(&self, point: Position) -> Option<CardId> {
        self.cards
            .iter()
            .rev()
            .find(|c| c.contains(point))
            .map(|c| c.card_id())
    }

    fn create_line(&mut self, owner: ConnectorId, coords: [Position; 2]) -> LineId {
        self.next_line += 1;
        let id = LineId(self.next_line);
        self.lines.insert(id, LinePrimitive::new(id, owner, coords));
        id
    }

    fn update_line(&mut self, line: LineId, coords: [Position; 2], active: bool) {
        match self.lines.get_mut(&line) {
            Some(primitive) => {
                primitive.coords = coords;
                primitive.active = active;
            }
            None => warn!(line = line.0, "Update for unknown line"),
        }
    }

    fn remove_line(&mut self, line: LineId) {
        self.lines.remove(&line);
    }
}

// ============================================================================
// Viewport
// ============================================================================

/// An interactive canvas of cards and connectors
#[derive(Debug, Clone)]
pub struct Viewport {
    scene: Scene,
    connectors: HashMap<ConnectorId, EdgeController>,
    config: CanvasConfig,
    /// Connector that receives pointer moves and the release
    grab: Option<ConnectorId>,
}

impl Viewport {
    /// Create an empty canvas
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            scene: Scene::new(),
            connectors: HashMap::new(),
            config,
            grab: None,
        }
    }

    /// Build a canvas showing every card and edge of a document
    pub fn from_document(document: &Document, config: CanvasConfig) -> MapResult<Self> {
        let mut viewport = Self::new(config);

        for card in document.cards_in_z_order() {
            viewport.scene.add_card(ViewportCard::from_card(card))?;
        }

        let mut edges: Vec<&Edge> = document.edges().collect();
        edges.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        for edge in edges {
            viewport.connect(edge)?;
        }

        info!(
            cards = viewport.scene.cards().len(),
            connectors = viewport.connectors.len(),
            "Built viewport from document"
        );
        Ok(viewport)
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    // ========================================================================
    // Cards
    // ========================================================================

    /// Show a document card
    pub fn add_card(&mut self, card: &cardmap_ir::Card) -> MapResult<()> {
        self.scene.add_card(ViewportCard::from_card(card))?;
        debug!(card = %card.id, "Added card to viewport");
        Ok(())
    }

    pub fn card(&self, id: CardId) -> Option<&ViewportCard> {
        self.scene.card(id)
    }

    /// Move or resize a card and notify its connectors
    pub fn move_card(&mut self, card: CardId, rect: Rect) -> MapResult<()> {
        let widget = self.scene.card_mut(card).ok_or(MapError::CardNotFound(card))?;
        widget.set_rect(rect);
        let listeners = widget.listeners(CardEvent::GeometryChanged);

        for id in listeners {
            let Some(connector) = self.connectors.get_mut(&id) else {
                warn!(connector = %id, card = %card, "Stale geometry listener");
                continue;
            };
            connector
                .on_geometry_changed(&mut self.scene, card, rect)
                .inspect_err(|e| report(e, id, card))?;
        }
        Ok(())
    }

    /// Remove a card, deleting every connector attached to it
    pub fn delete_card<D: DocumentHandle>(&mut self, card: CardId, document: &mut D) -> MapResult<()> {
        let widget = self.scene.card(card).ok_or(MapError::CardNotFound(card))?;
        let listeners = widget.listeners(CardEvent::Deleted);

        for id in listeners {
            let Some(connector) = self.connectors.get_mut(&id) else {
                warn!(connector = %id, card = %card, "Stale deletion listener");
                continue;
            };
            connector
                .on_card_deleted(&mut self.scene, document, card)
                .inspect_err(|e| report(e, id, card))?;
            self.connectors.remove(&id);
            if self.grab == Some(id) {
                self.grab = None;
            }
        }

        self.scene.remove_card(card);
        debug!(card = %card, "Deleted card from viewport");
        Ok(())
    }

    // ========================================================================
    // Connectors
    // ========================================================================

    /// Create a settled connector for a model edge
    pub fn connect(&mut self, edge: &Edge) -> MapResult<ConnectorId> {
        let id = Uuid::new_v4();
        let connector = EdgeController::settled(
            id,
            &mut self.scene,
            edge.id,
            edge.orig,
            edge.dest,
            self.config.connector_options(),
        )?;
        self.connectors.insert(id, connector);
        Ok(id)
    }

    /// Start a new connector from `anchor`; the pointer takes the other end
    pub fn begin_connector(&mut self, anchor: CardId, anchored_end: End) -> MapResult<ConnectorId> {
        if let Some(grabbed) = self.grab {
            return Err(MapError::InvalidState {
                connector: grabbed,
                action: "yield the pointer to a new connector",
                state: "dragging",
            });
        }

        let id = Uuid::new_v4();
        let connector = EdgeController::dragging_from(
            id,
            &mut self.scene,
            anchored_end,
            anchor,
            self.config.connector_options(),
        )?;
        self.connectors.insert(id, connector);
        self.grab = Some(id);
        info!(connector = %id, anchor = %anchor, "Started connector");
        Ok(id)
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&EdgeController> {
        self.connectors.get(&id)
    }

    pub fn connectors(&self) -> impl Iterator<Item = &EdgeController> {
        self.connectors.values()
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    /// Connector backed by `edge`
    pub fn connector_for_edge(&self, edge: EdgeId) -> Option<&EdgeController> {
        self.connectors.values().find(|c| c.model_edge() == Some(edge))
    }

    /// Connector currently holding the pointer
    pub fn grabbed(&self) -> Option<ConnectorId> {
        self.grab
    }

    // ========================================================================
    // Pointer Input
    // ========================================================================

    /// Press on a line to grab the nearer end of its connector
    pub fn pointer_down(&mut self, point: Position) -> MapResult<Option<(ConnectorId, End)>> {
        if let Some(grabbed) = self.grab {
            return Err(MapError::InvalidState {
                connector: grabbed,
                action: "accept a second press",
                state: "dragging",
            });
        }

        let Some(owner) = self
            .scene
            .find_line_at(point, &self.config.line, self.config.hit_tolerance)
            .map(|line| line.owner)
        else {
            return Ok(None);
        };

        let connector = self
            .connectors
            .get_mut(&owner)
            .ok_or(MapError::ConnectorNotFound(owner))?;
        let end = connector.on_pointer_down(&mut self.scene, point)?;
        self.grab = Some(owner);
        Ok(Some((owner, end)))
    }

    /// Drag the grabbed end
    pub fn pointer_move(&mut self, point: Position) -> MapResult<()> {
        let Some(id) = self.grab else {
            return Ok(());
        };
        let connector = self.connectors.get_mut(&id).ok_or(MapError::ConnectorNotFound(id))?;
        connector.on_pointer_move(&mut self.scene, point)
    }

    /// Release the grabbed end
    pub fn pointer_up<D: DocumentHandle>(&mut self, point: Position, document: &mut D) -> MapResult<DropOutcome> {
        let Some(id) = self.grab else {
            return Ok(DropOutcome::Ignored);
        };
        let Some(connector) = self.connectors.get_mut(&id) else {
            self.grab = None;
            return Err(MapError::ConnectorNotFound(id));
        };

        // A connector still mid-drag after a failed drop keeps the pointer
        let result = connector.on_pointer_up(&mut self.scene, document, point);
        if result.is_err() && connector.is_dragging() {
            return result;
        }
        self.grab = None;
        let outcome = result?;

        if outcome.is_discarded() {
            self.connectors.remove(&id);
        }
        debug!(connector = %id, ?outcome, "Pointer released");
        Ok(outcome)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render the canvas as a standalone SVG document
    pub fn render_svg(&self) -> String {
        let bounds = self
            .scene
            .bounds()
            .unwrap_or_else(|| Rect::from_xywh(0.0, 0.0, 0.0, 0.0));
        let (x, y) = (bounds.x() - RENDER_MARGIN, bounds.y() - RENDER_MARGIN);
        let (w, h) = (
            bounds.width() + 2.0 * RENDER_MARGIN,
            bounds.height() + 2.0 * RENDER_MARGIN,
        );

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{x} {y} {w} {h}" width="{w}" height="{h}">"#
        );
        svg.push_str(&self.config.line.svg_defs());
        for card in self.scene.cards() {
            svg.push_str(&card.to_svg());
        }
        for line in self.scene.lines() {
            svg.push_str(&line.to_svg(&self.config.line));
        }
        svg.push_str("</svg>\n");
        svg
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

fn report(e: &MapError, connector: ConnectorId, card: CardId) {
    if e.is_contract_violation() {
        error!(%connector, %card, error = %e, "Connector rejected card notification");
    } else {
        warn!(%connector, %card, error = %e, "Connector failed to handle card notification");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ConnectorState;
    use cardmap_ir::Card;
    use pretty_assertions::assert_eq;

    fn p(x: f32, y: f32) -> Position {
        Position::new(x, y)
    }

    fn document() -> (Document, CardId, CardId, CardId) {
        let mut doc = Document::new("Viewport");
        let a = doc.add_card(Card::new("A").with_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0)));
        let b = doc.add_card(Card::new("B").with_rect(Rect::from_xywh(100.0, 0.0, 10.0, 10.0)));
        let c = doc.add_card(Card::new("C").with_rect(Rect::from_xywh(100.0, 200.0, 10.0, 10.0)));
        doc.create_edge(a, b).unwrap();
        (doc, a, b, c)
    }

    #[test]
    fn test_from_document() {
        let (doc, a, b, _) = document();
        let viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();

        assert_eq!(viewport.scene().cards().len(), 3);
        assert_eq!(viewport.connector_count(), 1);
        assert_eq!(viewport.scene().line_count(), 1);

        let edge = doc.edges().next().unwrap();
        let connector = viewport.connector_for_edge(edge.id).unwrap();
        assert_eq!(connector.endpoint(End::Orig), Some(a));
        assert_eq!(connector.endpoint(End::Dest), Some(b));
        assert_eq!(connector.coords(), [p(10.0, 5.0), p(100.0, 5.0)]);
    }

    #[test]
    fn test_from_document_with_dangling_edge() {
        let (mut doc, a, _, _) = document();
        doc.add_edge(Edge::new(a, Uuid::new_v4()));
        let err = Viewport::from_document(&doc, CanvasConfig::default()).unwrap_err();
        assert!(matches!(err, MapError::CardNotFound(_)));
    }

    #[test]
    fn test_duplicate_card() {
        let (doc, a, _, _) = document();
        let mut viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();
        let err = viewport.add_card(doc.get_card(a).unwrap()).unwrap_err();
        assert!(matches!(err, MapError::DuplicateCard(id) if id == a));
    }

    #[test]
    fn test_move_card_dispatches_to_connectors() {
        let (doc, a, _, _) = document();
        let mut viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();

        viewport.move_card(a, Rect::from_xywh(0.0, 100.0, 10.0, 10.0)).unwrap();
        let connector = viewport.connectors().next().unwrap();
        assert_eq!(connector.coords(), [p(9.0, 100.0), p(100.0, 10.0)]);

        let line = viewport.scene().lines().next().unwrap();
        assert_eq!(line.coords, connector.coords());

        let err = viewport.move_card(Uuid::new_v4(), Rect::default()).unwrap_err();
        assert!(matches!(err, MapError::CardNotFound(_)));
    }

    #[test]
    fn test_delete_card_removes_connectors() {
        let (mut doc, _, b, _) = document();
        let mut viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();

        viewport.delete_card(b, &mut doc).unwrap();
        assert_eq!(viewport.connector_count(), 0);
        assert_eq!(viewport.scene().line_count(), 0);
        assert!(viewport.card(b).is_none());
        assert_eq!(doc.edge_count(), 0);
        assert!(
            viewport
                .scene()
                .cards()
                .iter()
                .all(|c| c.listener_count(CardEvent::GeometryChanged) == 0)
        );
    }

    #[test]
    fn test_drag_existing_connector_to_new_card() {
        let (mut doc, _, b, c) = document();
        let mut viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();

        let (id, end) = viewport.pointer_down(p(99.0, 6.0)).unwrap().unwrap();
        assert_eq!(end, End::Dest);
        assert_eq!(viewport.grabbed(), Some(id));

        viewport.pointer_move(p(105.0, 205.0)).unwrap();
        assert!(viewport.card(c).unwrap().is_highlighted());

        let outcome = viewport.pointer_up(p(105.0, 205.0), &mut doc).unwrap();
        assert_eq!(outcome, DropOutcome::Bound(c));
        assert_eq!(viewport.grabbed(), None);

        let connector = viewport.connector(id).unwrap();
        assert_eq!(connector.state(), ConnectorState::Settled);
        assert_eq!(doc.get_edge(connector.model_edge().unwrap()).unwrap().dest, c);
        assert_eq!(viewport.card(b).unwrap().listener_count(CardEvent::Deleted), 0);
    }

    #[test]
    fn test_pointer_down_on_empty_space() {
        let (doc, _, _, _) = document();
        let mut viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();
        assert_eq!(viewport.pointer_down(p(50.0, 100.0)).unwrap(), None);
        assert_eq!(viewport.grabbed(), None);
    }

    #[test]
    fn test_new_connector_lifecycle() {
        let (mut doc, _, _, c) = document();
        let mut viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();

        let id = viewport.begin_connector(c, End::Orig).unwrap();
        assert_eq!(viewport.grabbed(), Some(id));
        assert!(viewport.begin_connector(c, End::Orig).is_err());

        viewport.pointer_move(p(5.0, 5.0)).unwrap();
        let outcome = viewport.pointer_up(p(5.0, 5.0), &mut doc).unwrap();
        assert!(matches!(outcome, DropOutcome::Bound(_)));
        assert_eq!(doc.edge_count(), 2);
        assert_eq!(viewport.connector_count(), 2);
    }

    #[test]
    fn test_new_connector_discarded() {
        let (mut doc, a, _, _) = document();
        let mut viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();

        viewport.begin_connector(a, End::Orig).unwrap();
        assert_eq!(viewport.scene().line_count(), 2);

        viewport.pointer_move(p(400.0, 400.0)).unwrap();
        let outcome = viewport.pointer_up(p(400.0, 400.0), &mut doc).unwrap();
        assert_eq!(outcome, DropOutcome::Discarded);
        assert_eq!(viewport.connector_count(), 1);
        assert_eq!(viewport.scene().line_count(), 1);
        assert_eq!(doc.edge_count(), 1);
    }

    struct LockedDocument;

    impl DocumentHandle for LockedDocument {
        fn create_edge(&mut self, _orig: CardId, _dest: CardId) -> MapResult<EdgeId> {
            Err(MapError::internal("document is locked"))
        }

        fn set_edge_endpoint(&mut self, _edge: EdgeId, _end: End, _card: CardId) -> MapResult<()> {
            Err(MapError::internal("document is locked"))
        }

        fn delete_edge(&mut self, _edge: EdgeId) -> MapResult<()> {
            Err(MapError::internal("document is locked"))
        }

        fn commit(&mut self) -> MapResult<()> {
            Err(MapError::internal("document is locked"))
        }
    }

    #[test]
    fn test_failed_drop_keeps_grab() {
        let (mut doc, a, b, _) = document();
        let mut viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();

        let id = viewport.begin_connector(a, End::Orig).unwrap();
        assert!(viewport.pointer_up(p(105.0, 5.0), &mut LockedDocument).is_err());
        assert_eq!(viewport.grabbed(), Some(id));
        assert!(viewport.connector(id).unwrap().is_dragging());

        let outcome = viewport.pointer_up(p(105.0, 5.0), &mut doc).unwrap();
        assert_eq!(outcome, DropOutcome::Bound(b));
        assert_eq!(viewport.grabbed(), None);
        assert_eq!(doc.edge_count(), 2);
    }

    #[test]
    fn test_release_without_grab() {
        let (mut doc, _, _, _) = document();
        let mut viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();
        viewport.pointer_move(p(1.0, 1.0)).unwrap();
        assert_eq!(viewport.pointer_up(p(1.0, 1.0), &mut doc).unwrap(), DropOutcome::Ignored);
    }

    #[test]
    fn test_topmost_card_wins() {
        let mut scene = Scene::new();
        let below = ViewportCard::new(Uuid::new_v4(), "below", Rect::from_xywh(0.0, 0.0, 50.0, 50.0));
        let above = ViewportCard::new(Uuid::new_v4(), "above", Rect::from_xywh(25.0, 25.0, 50.0, 50.0));
        let (below_id, above_id) = (below.card_id(), above.card_id());
        scene.add_card(below).unwrap();
        scene.add_card(above).unwrap();

        assert_eq!(scene.find_card_at(p(30.0, 30.0)), Some(above_id));
        assert_eq!(scene.find_card_at(p(10.0, 10.0)), Some(below_id));
        assert_eq!(scene.find_card_at(p(90.0, 90.0)), None);
    }

    #[test]
    fn test_render_svg() {
        let (doc, _, _, _) = document();
        let viewport = Viewport::from_document(&doc, CanvasConfig::default()).unwrap();
        let svg = viewport.render_svg();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="-20 -20 150 250""#));
        assert_eq!(svg.matches("<rect").count(), 3);
        assert_eq!(svg.matches("<line").count(), 1);
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_render_empty_canvas() {
        let svg = Viewport::default().render_svg();
        assert!(svg.contains(r#"viewBox="-20 -20 40 40""#));
    }
}
