//! # Edge Controller
//!
//! The interactive connector drawn between two cards.
//!
//! An [`EdgeController`] keeps its line clipped to the boundaries of the cards
//! it connects, follows those cards when they move, and lets the user drag
//! either end onto another card. A connector started from a single anchor
//! card has no model edge until its loose end is first dropped on a card;
//! released over empty space it is discarded instead.
//!
//! ## Lifecycle
//!
//! ```text
//!            settled()                      dragging_from()
//!               │                                 │
//!               ▼        pointer down             ▼
//!   ┌────────► Idle ─────────────────────► Dragging { end }
//!   │           ▲                                 │
//!   │           └──── release on card / revert ───┤
//!   │                                             │ release on empty space
//!   │                                             │ (never settled)
//!   └── delete() / endpoint card deleted ──► Deleted ◄┘
//! ```
//!
//! The controller never stores references to the canvas or the document.
//! Every operation borrows a [`Surface`] (and, where the model changes, a
//! [`DocumentHandle`]) for the duration of the call.

mod state;

pub use state::{ConnectorState, DropOutcome, Phase, Persistence};

use crate::config::ConnectorOptions;
use cardmap_core::geometry::{adjust_point_with, box_center, clip_segment};
use cardmap_core::{
    CardEvent, CardId, CardWidget, ConnectorId, DocumentHandle, EdgeId, End, LineId, MapError,
    MapResult, Position, Rect, SubscriptionToken, Surface,
};
use tracing::{debug, warn};

// ============================================================================
// Endpoint
// ============================================================================

/// A bound end: the card and the two registrations held on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Endpoint {
    card: CardId,
    geometry: SubscriptionToken,
    deletion: SubscriptionToken,
}

// ============================================================================
// Edge Controller
// ============================================================================

/// A connector line between two cards
#[derive(Debug, Clone)]
pub struct EdgeController {
    id: ConnectorId,
    line: Option<LineId>,
    ends: [Option<Endpoint>; 2],
    coords: [Position; 2],
    phase: Phase,
    persistence: Persistence,
    highlighted: Option<CardId>,
    options: ConnectorOptions,
}

impl EdgeController {
    /// Create a connector from whichever arguments are known.
    ///
    /// With a model edge both cards are required and the connector starts
    /// settled. Without one exactly one card must be given; it becomes the
    /// anchor and the other end starts out dragging.
    pub fn new<S: Surface>(
        id: ConnectorId,
        surface: &mut S,
        model_edge: Option<EdgeId>,
        orig: Option<CardId>,
        dest: Option<CardId>,
        options: ConnectorOptions,
    ) -> MapResult<Self> {
        match (model_edge, orig, dest) {
            (Some(edge), Some(orig), Some(dest)) => {
                Self::settled(id, surface, edge, orig, dest, options)
            }
            (Some(_), _, _) => Err(MapError::invalid_construction(
                "a connector loaded from a model edge needs both cards",
            )),
            (None, Some(anchor), None) => {
                Self::dragging_from(id, surface, End::Orig, anchor, options)
            }
            (None, None, Some(anchor)) => {
                Self::dragging_from(id, surface, End::Dest, anchor, options)
            }
            (None, Some(_), Some(_)) => Err(MapError::invalid_construction(
                "a new connector takes a single anchor card",
            )),
            (None, None, None) => Err(MapError::invalid_construction(
                "a connector needs a model edge or an anchor card",
            )),
        }
    }

    /// Create a connector for an existing model edge
    pub fn settled<S: Surface>(
        id: ConnectorId,
        surface: &mut S,
        edge: EdgeId,
        orig: CardId,
        dest: CardId,
        options: ConnectorOptions,
    ) -> MapResult<Self> {
        let orig_rect = card_rect(surface, orig)?;
        let dest_rect = card_rect(surface, dest)?;
        let coords = clip_segment(orig_rect, dest_rect, options.precision);

        let mut controller = Self {
            id,
            line: None,
            ends: [None, None],
            coords,
            phase: Phase::Idle,
            persistence: Persistence::Settled(edge),
            highlighted: None,
            options,
        };
        controller.subscribe(surface, End::Orig, orig)?;
        controller.subscribe(surface, End::Dest, dest)?;
        controller.line = Some(surface.create_line(id, coords));

        debug!(connector = %id, edge = %edge, "Connector settled from model edge");
        Ok(controller)
    }

    /// Start a new connector whose `anchored_end` is bound to `anchor`.
    ///
    /// The other end is pointer-controlled from the start and sits at the
    /// anchor's center plus the configured placeholder offset until the
    /// first pointer move.
    pub fn dragging_from<S: Surface>(
        id: ConnectorId,
        surface: &mut S,
        anchored_end: End,
        anchor: CardId,
        options: ConnectorOptions,
    ) -> MapResult<Self> {
        let rect = card_rect(surface, anchor)?;
        let dragged = anchored_end.other();
        let center = box_center(rect);
        let placeholder = center + options.placeholder_offset;

        let mut coords = [Position::zero(); 2];
        coords[dragged.index()] = placeholder;
        coords[anchored_end.index()] = adjust_point_with(center, rect, placeholder, options.precision);

        let mut controller = Self {
            id,
            line: None,
            ends: [None, None],
            coords,
            phase: Phase::Dragging { end: dragged },
            persistence: Persistence::Unsettled,
            highlighted: None,
            options,
        };
        controller.subscribe(surface, anchored_end, anchor)?;
        let line = surface.create_line(id, coords);
        surface.update_line(line, coords, true);
        controller.line = Some(line);

        debug!(connector = %id, anchor = %anchor, end = %dragged, "Connector started from anchor");
        Ok(controller)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> ConnectorId {
        self.id
    }

    /// Rendered orig and dest points
    pub fn coords(&self) -> [Position; 2] {
        self.coords
    }

    pub fn state(&self) -> ConnectorState {
        self.phase.into()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The pointer-controlled end, if a drag is in progress
    pub fn dragging_end(&self) -> Option<End> {
        self.phase.dragging_end()
    }

    /// Card currently highlighted as a drop target
    pub fn highlighted(&self) -> Option<CardId> {
        self.highlighted
    }

    pub fn persistence(&self) -> Persistence {
        self.persistence
    }

    /// The backing model edge, once the connector has settled
    pub fn model_edge(&self) -> Option<EdgeId> {
        self.persistence.edge()
    }

    /// Card bound to `end`
    pub fn endpoint(&self, end: End) -> Option<CardId> {
        self.ends[end.index()].map(|e| e.card)
    }

    pub fn line(&self) -> Option<LineId> {
        self.line
    }

    pub fn options(&self) -> ConnectorOptions {
        self.options
    }

    pub fn is_settled(&self) -> bool {
        self.state() == ConnectorState::Settled
    }

    pub fn is_dragging(&self) -> bool {
        self.state() == ConnectorState::Dragging
    }

    pub fn is_deleted(&self) -> bool {
        self.state() == ConnectorState::Deleted
    }

    /// Whether either end is bound to `card`
    pub fn is_subscribed_to(&self, card: CardId) -> bool {
        self.ends.iter().flatten().any(|e| e.card == card)
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Bind `end` to `card`.
    ///
    /// Registrations on the previously bound card are removed before the new
    /// ones are added. When the connector is idle with both ends bound the
    /// line is re-clipped to the new pair of cards. The model edge is not
    /// touched; drops go through [`EdgeController::on_pointer_up`].
    pub fn bind<S: Surface>(&mut self, surface: &mut S, end: End, card: CardId) -> MapResult<()> {
        self.ensure_not_deleted("bind")?;
        card_rect(surface, card)?;

        if self.endpoint(end) != Some(card) {
            self.subscribe(surface, end, card)?;
            debug!(connector = %self.id, end = %end, card = %card, "Bound connector end");
        }

        if self.phase == Phase::Idle && self.ends.iter().all(Option::is_some) {
            self.reset_coords(surface)?;
            self.redraw(surface);
        }
        Ok(())
    }

    pub fn bind_orig<S: Surface>(&mut self, surface: &mut S, card: CardId) -> MapResult<()> {
        self.bind(surface, End::Orig, card)
    }

    pub fn bind_dest<S: Surface>(&mut self, surface: &mut S, card: CardId) -> MapResult<()> {
        self.bind(surface, End::Dest, card)
    }

    // Only callers that immediately rebind or delete may leave an end unbound
    fn unbind<S: Surface>(&mut self, surface: &mut S, end: End) {
        let Some(endpoint) = self.ends[end.index()].take() else {
            return;
        };

        match surface.card_mut(endpoint.card) {
            Some(widget) => {
                widget.remove_listener(endpoint.geometry);
                widget.remove_listener(endpoint.deletion);
            }
            None => warn!(
                connector = %self.id,
                card = %endpoint.card,
                "Card vanished before its connector unsubscribed"
            ),
        }
    }

    fn subscribe<S: Surface>(&mut self, surface: &mut S, end: End, card: CardId) -> MapResult<()> {
        self.unbind(surface, end);

        let widget = surface.card_mut(card).ok_or(MapError::CardNotFound(card))?;
        let geometry = widget.add_listener(CardEvent::GeometryChanged, self.id);
        let deletion = widget.add_listener(CardEvent::Deleted, self.id);
        self.ends[end.index()] = Some(Endpoint {
            card,
            geometry,
            deletion,
        });
        Ok(())
    }

    // ========================================================================
    // Card Notifications
    // ========================================================================

    /// A bound card moved or was resized to `new_rect`.
    ///
    /// The moved end is clipped against `new_rect` toward the other end's
    /// current point, then the other end is clipped against its own card
    /// toward the moved card's center. While dragging only the anchored end
    /// is re-clipped, toward the pointer.
    pub fn on_geometry_changed<S: Surface>(
        &mut self,
        surface: &mut S,
        card: CardId,
        new_rect: Rect,
    ) -> MapResult<()> {
        let precision = self.options.precision;
        let bound: Vec<End> = End::both()
            .into_iter()
            .filter(|end| self.endpoint(*end) == Some(card))
            .collect();

        if bound.is_empty() {
            return Err(MapError::NotAnEndpoint {
                card,
                connector: self.id,
            });
        }

        if let Phase::Dragging { end: dragged } = self.phase {
            let anchored = dragged.other();
            if bound.contains(&anchored) {
                let pointer = self.coords[dragged.index()];
                self.coords[anchored.index()] =
                    adjust_point_with(box_center(new_rect), new_rect, pointer, precision);
                self.redraw(surface);
            }
            return Ok(());
        }

        if bound.len() == 2 {
            self.coords = clip_segment(new_rect, new_rect, precision);
            self.redraw(surface);
            return Ok(());
        }

        let moved = bound[0];
        let other = moved.other();
        let other_card = self
            .endpoint(other)
            .ok_or_else(|| MapError::internal("settled connector has an unbound end"))?;
        let other_rect = card_rect(surface, other_card)?;

        let point = box_center(new_rect);
        self.coords[moved.index()] =
            adjust_point_with(point, new_rect, self.coords[other.index()], precision);
        self.coords[other.index()] =
            adjust_point_with(box_center(other_rect), other_rect, point, precision);

        self.redraw(surface);
        Ok(())
    }

    /// A bound card is being removed; the connector deletes itself
    pub fn on_card_deleted<S: Surface, D: DocumentHandle>(
        &mut self,
        surface: &mut S,
        document: &mut D,
        card: CardId,
    ) -> MapResult<()> {
        if !self.is_subscribed_to(card) {
            return Err(MapError::NotAnEndpoint {
                card,
                connector: self.id,
            });
        }
        debug!(connector = %self.id, card = %card, "Endpoint card deleted");
        self.delete(surface, document)
    }

    // ========================================================================
    // Pointer Interaction
    // ========================================================================

    /// Grab the end nearest to `point` and start dragging it
    pub fn on_pointer_down<S: Surface>(&mut self, surface: &mut S, point: Position) -> MapResult<End> {
        if self.phase != Phase::Idle {
            return Err(self.invalid_state("start a drag"));
        }

        let to_orig = self.coords[0].distance_to(&point);
        let to_dest = self.coords[1].distance_to(&point);
        let end = if to_dest < to_orig {
            End::Dest
        } else {
            if to_orig == to_dest {
                debug!(connector = %self.id, "Pointer equidistant from both ends, dragging orig");
            }
            End::Orig
        };

        self.phase = Phase::Dragging { end };
        self.redraw(surface);
        debug!(connector = %self.id, end = %end, "Drag started");
        Ok(end)
    }

    /// Move the dragged end to `point` and highlight the card under it.
    ///
    /// Ignored when no drag is in progress.
    pub fn on_pointer_move<S: Surface>(&mut self, surface: &mut S, point: Position) -> MapResult<()> {
        let Phase::Dragging { end } = self.phase else {
            return Ok(());
        };

        self.coords[end.index()] = point;
        self.reclip_anchor(surface, end)?;
        self.redraw(surface);

        let target = self.drop_target(surface, end, point);
        self.set_highlight(surface, target);
        Ok(())
    }

    /// Release the dragged end at `point`.
    ///
    /// Over a card the end is bound to it and the model edge is created or
    /// updated and committed. Over empty space a connector that never settled
    /// is deleted; a settled one snaps back to its previous cards.
    pub fn on_pointer_up<S: Surface, D: DocumentHandle>(
        &mut self,
        surface: &mut S,
        document: &mut D,
        point: Position,
    ) -> MapResult<DropOutcome> {
        let Phase::Dragging { end } = self.phase else {
            return Ok(DropOutcome::Ignored);
        };

        self.coords[end.index()] = point;
        let target = self.drop_target(surface, end, point);
        self.set_highlight(surface, None);

        match (target, self.persistence) {
            (Some(card), persistence) => {
                let previous = self.endpoint(end);
                if previous != Some(card) {
                    self.subscribe(surface, end, card)?;
                }

                match persistence {
                    Persistence::Unsettled => {
                        let (orig, dest) = self.bound_pair()?;
                        let edge = document.create_edge(orig, dest)?;
                        self.persistence = Persistence::Settled(edge);
                        debug!(connector = %self.id, edge = %edge, "Created model edge");
                    }
                    Persistence::Settled(edge) if previous != Some(card) => {
                        document.set_edge_endpoint(edge, end, card)?;
                    }
                    Persistence::Settled(_) => {}
                }

                self.phase = Phase::Idle;
                self.reset_coords(surface)?;
                self.redraw(surface);
                document.commit()?;

                debug!(connector = %self.id, end = %end, card = %card, "Dropped on card");
                Ok(DropOutcome::Bound(card))
            }
            (None, Persistence::Unsettled) => {
                debug!(connector = %self.id, "Released over empty space, discarding");
                self.delete(surface, document)?;
                Ok(DropOutcome::Discarded)
            }
            (None, Persistence::Settled(_)) => {
                self.phase = Phase::Idle;
                self.reset_coords(surface)?;
                self.redraw(surface);
                debug!(connector = %self.id, "Released over empty space, reverted");
                Ok(DropOutcome::Reverted)
            }
        }
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Remove the line, release both cards and delete the model edge.
    ///
    /// Calling this on a deleted connector does nothing.
    pub fn delete<S: Surface, D: DocumentHandle>(
        &mut self,
        surface: &mut S,
        document: &mut D,
    ) -> MapResult<()> {
        if self.phase == Phase::Deleted {
            debug!(connector = %self.id, "Connector already deleted");
            return Ok(());
        }

        // Model edge first; nothing local changes until it is gone
        let edge = self.persistence.edge();
        if let Some(edge) = edge {
            match document.delete_edge(edge) {
                Ok(()) => {}
                Err(MapError::EdgeNotFound(_)) => {
                    warn!(connector = %self.id, edge = %edge, "Model edge already removed");
                }
                Err(e) => return Err(e),
            }
        }

        self.set_highlight(surface, None);
        if let Some(line) = self.line.take() {
            surface.remove_line(line);
        }
        for end in End::both() {
            self.unbind(surface, end);
        }
        self.phase = Phase::Deleted;
        self.persistence = Persistence::Unsettled;

        if edge.is_some() {
            document.commit()?;
        }

        debug!(connector = %self.id, "Connector deleted");
        Ok(())
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Move the drop-target highlight to `card`
    pub fn set_highlight<S: Surface>(&mut self, surface: &mut S, card: Option<CardId>) {
        if card == self.highlighted {
            return;
        }
        if let Some(widget) = self.highlighted.and_then(|id| surface.card_mut(id)) {
            widget.unhighlight();
        }
        if let Some(widget) = card.and_then(|id| surface.card_mut(id)) {
            widget.highlight();
        }
        self.highlighted = card;
    }

    /// Push the current coordinates to the line
    pub fn redraw<S: Surface>(&self, surface: &mut S) {
        if let Some(line) = self.line {
            surface.update_line(line, self.coords, self.is_dragging());
        }
    }

    fn reset_coords<S: Surface>(&mut self, surface: &S) -> MapResult<()> {
        let (orig, dest) = self.bound_pair()?;
        self.coords = clip_segment(
            card_rect(surface, orig)?,
            card_rect(surface, dest)?,
            self.options.precision,
        );
        Ok(())
    }

    fn reclip_anchor<S: Surface>(&mut self, surface: &S, dragged: End) -> MapResult<()> {
        let anchored = dragged.other();
        let card = self
            .endpoint(anchored)
            .ok_or_else(|| MapError::internal("dragging connector has no anchored end"))?;
        let rect = card_rect(surface, card)?;
        self.coords[anchored.index()] = adjust_point_with(
            box_center(rect),
            rect,
            self.coords[dragged.index()],
            self.options.precision,
        );
        Ok(())
    }

    /// Card under `point` that the dragged end may land on
    fn drop_target<S: Surface>(&self, surface: &S, dragged: End, point: Position) -> Option<CardId> {
        let card = surface.find_card_at(point)?;
        if !self.options.allow_self_loops && self.endpoint(dragged.other()) == Some(card) {
            return None;
        }
        Some(card)
    }

    fn bound_pair(&self) -> MapResult<(CardId, CardId)> {
        match (self.endpoint(End::Orig), self.endpoint(End::Dest)) {
            (Some(orig), Some(dest)) => Ok((orig, dest)),
            _ => Err(MapError::internal("connector end is unbound")),
        }
    }

    fn ensure_not_deleted(&self, action: &'static str) -> MapResult<()> {
        if self.phase == Phase::Deleted {
            return Err(self.invalid_state(action));
        }
        Ok(())
    }

    fn invalid_state(&self, action: &'static str) -> MapError {
        MapError::InvalidState {
            connector: self.id,
            action,
            state: self.phase.name(),
        }
    }
}

fn card_rect<S: Surface>(surface: &S, card: CardId) -> MapResult<Rect> {
    surface
        .card(card)
        .map(|widget| widget.rect())
        .ok_or(MapError::CardNotFound(card))
}

// ============================================================================
// Tests
// ============================================================================
