#![forbid(unsafe_code)]

//! Single-session drag tracker.
//!
//! [`GestureTracker`] owns the board, the hit map, the feedback coordinator
//! and the one optional drag session. Every lifecycle call returns a
//! [`GestureDispatch`] with a structured log entry; invalid input is never an
//! error, it is recorded as [`GestureLogOutcome::Ignored`].
//!
//! # Invariants
//!
//! 1. At most one [`DragSession`] exists. A start while dragging is ignored.
//! 2. Moves never mutate the board. Only the end of a gesture resolves.
//! 3. Ending a gesture stops the haptic loop, resolves, then leaves the
//!    tracker idle, whatever the resolution outcome.
//! 4. Every exit path (release, [`cancel`](GestureTracker::cancel), board
//!    reset, dropping the tracker) cancels the session's haptic loop.
//! 5. While a session is live, move and end dispatches set
//!    `prevent_default`, including those ignored for a foreign pointer.

use std::mem;

use web_time::Duration;

use crate::board::{Board, Container, TokenId};
use crate::feedback::FeedbackCoordinator;
use crate::geometry::Point;
use crate::haptics::HapticLoop;
use crate::hit_test::HitMap;
use crate::resolver::{self, Outcome};

/// The in-progress drag.
#[derive(Debug)]
pub struct DragSession {
    token: TokenId,
    origin: Container,
    pointer_id: u32,
    cursor: Point,
    haptics: HapticLoop,
}

impl DragSession {
    pub const fn token(&self) -> TokenId {
        self.token
    }

    /// Container the token was lifted from.
    pub const fn origin(&self) -> Container {
        self.origin
    }

    pub const fn pointer_id(&self) -> u32 {
        self.pointer_id
    }

    /// Last reported pointer position.
    pub const fn cursor(&self) -> Point {
        self.cursor
    }
}

/// Tracker state.
#[derive(Debug, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Lifecycle phase recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Start,
    Move,
    End,
    Cancel,
    DoubleTap,
}

/// Why an incoming signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureIgnoredReason {
    SessionActive,
    MultiContact,
    UnknownToken,
    NoActiveSession,
    PointerMismatch,
    /// Double tap on a palette-resident token.
    NotPlaced,
    /// Double tap on the token currently being dragged.
    TokenLifted,
}

/// Outcome category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureLogOutcome {
    Forwarded,
    Ignored(GestureIgnoredReason),
}

/// Structured log record for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureLogEntry {
    pub phase: GesturePhase,
    /// Set only for forwarded dispatches.
    pub sequence: Option<u64>,
    pub pointer_id: Option<u32>,
    pub token: Option<TokenId>,
    pub position: Option<Point>,
    pub outcome: GestureLogOutcome,
}

/// Result of one lifecycle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureDispatch {
    /// Drop resolution, present for forwarded ends and cancels.
    pub outcome: Option<Outcome>,
    /// The host must suppress default scroll/selection for this event.
    pub prevent_default: bool,
    pub log: GestureLogEntry,
}

impl GestureDispatch {
    fn ignored(
        phase: GesturePhase,
        reason: GestureIgnoredReason,
        pointer_id: Option<u32>,
        token: Option<TokenId>,
        position: Option<Point>,
    ) -> Self {
        tracing::trace!(?phase, ?reason, "gesture ignored");
        Self {
            outcome: None,
            prevent_default: false,
            log: GestureLogEntry {
                phase,
                sequence: None,
                pointer_id,
                token,
                position,
                outcome: GestureLogOutcome::Ignored(reason),
            },
        }
    }

    /// Keep the host from scrolling while a session owns the input stream.
    fn holding_input(mut self) -> Self {
        self.prevent_default = true;
        self
    }

    /// Whether the dispatch changed tracker or board state.
    pub const fn is_forwarded(&self) -> bool {
        matches!(self.log.outcome, GestureLogOutcome::Forwarded)
    }
}

/// Owns the drag session and everything a drop touches.
#[derive(Debug)]
pub struct GestureTracker {
    board: Board,
    hits: HitMap,
    feedback: FeedbackCoordinator,
    state: DragState,
    next_sequence: u64,
}

impl GestureTracker {
    pub fn new(board: Board, hits: HitMap, feedback: FeedbackCoordinator) -> Self {
        Self {
            board,
            hits,
            feedback,
            state: DragState::Idle,
            next_sequence: 1,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hit_map(&self) -> &HitMap {
        &self.hits
    }

    /// Hit regions, for the host to update as its layout changes.
    pub fn hit_map_mut(&mut self) -> &mut HitMap {
        &mut self.hits
    }

    pub fn feedback(&self) -> &FeedbackCoordinator {
        &self.feedback
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Token currently lifted, if any.
    pub fn lifted_token(&self) -> Option<TokenId> {
        match &self.state {
            DragState::Dragging(session) => Some(session.token),
            DragState::Idle => None,
        }
    }

    /// Render position of the lifted token.
    pub fn cursor(&self) -> Option<Point> {
        match &self.state {
            DragState::Dragging(session) => Some(session.cursor),
            DragState::Idle => None,
        }
    }

    /// Pick up `token` under `pointer_id` at `pos`.
    ///
    /// `contacts` is the number of simultaneous touch points the input source
    /// reports; more than one is ignored. Zero is accepted for sources that
    /// do not count contacts (mouse, pen).
    pub fn gesture_start(
        &mut self,
        token: TokenId,
        pointer_id: u32,
        contacts: usize,
        pos: Point,
    ) -> GestureDispatch {
        let phase = GesturePhase::Start;
        if self.is_dragging() {
            return GestureDispatch::ignored(
                phase,
                GestureIgnoredReason::SessionActive,
                Some(pointer_id),
                Some(token),
                Some(pos),
            );
        }
        if contacts > 1 {
            return GestureDispatch::ignored(
                phase,
                GestureIgnoredReason::MultiContact,
                Some(pointer_id),
                Some(token),
                Some(pos),
            );
        }
        let Some(origin) = self.board.container_of(token) else {
            return GestureDispatch::ignored(
                phase,
                GestureIgnoredReason::UnknownToken,
                Some(pointer_id),
                Some(token),
                Some(pos),
            );
        };

        let haptics = self.feedback.start_haptics(token);
        self.state = DragState::Dragging(DragSession {
            token,
            origin,
            pointer_id,
            cursor: pos,
            haptics,
        });
        tracing::debug!(token = token.0, pointer_id, ?origin, "drag session started");
        self.forwarded(phase, Some(pointer_id), Some(token), Some(pos), None, true)
    }

    /// Track the pointer. Never mutates the board.
    pub fn gesture_move(&mut self, pointer_id: u32, pos: Point) -> GestureDispatch {
        let phase = GesturePhase::Move;
        let DragState::Dragging(session) = &mut self.state else {
            return GestureDispatch::ignored(
                phase,
                GestureIgnoredReason::NoActiveSession,
                Some(pointer_id),
                None,
                Some(pos),
            );
        };
        if session.pointer_id != pointer_id {
            return GestureDispatch::ignored(
                phase,
                GestureIgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(session.token),
                Some(pos),
            )
            .holding_input();
        }
        session.cursor = pos;
        let token = session.token;
        tracing::trace!(token = token.0, x = pos.x, y = pos.y, "drag move");
        self.forwarded(phase, Some(pointer_id), Some(token), Some(pos), None, true)
    }

    /// Release the pointer at `pos` and resolve the drop.
    pub fn gesture_end(&mut self, pointer_id: u32, pos: Point) -> GestureDispatch {
        let phase = GesturePhase::End;
        // The tracker is idle from here on, whatever resolution does.
        let session = match mem::take(&mut self.state) {
            DragState::Dragging(session) if session.pointer_id == pointer_id => session,
            DragState::Dragging(session) => {
                let token = session.token;
                self.state = DragState::Dragging(session);
                return GestureDispatch::ignored(
                    phase,
                    GestureIgnoredReason::PointerMismatch,
                    Some(pointer_id),
                    Some(token),
                    Some(pos),
                )
                .holding_input();
            }
            DragState::Idle => {
                return GestureDispatch::ignored(
                    phase,
                    GestureIgnoredReason::NoActiveSession,
                    Some(pointer_id),
                    None,
                    Some(pos),
                );
            }
        };

        let _span = tracing::debug_span!("dayplan.gesture_end", token = session.token.0).entered();
        let DragSession {
            token,
            origin,
            haptics,
            ..
        } = session;
        self.feedback.stop_haptics(token, haptics);
        let outcome = resolver::resolve(&mut self.board, &self.hits, token, origin, pos);
        self.feedback.confirm_drop(token);
        tracing::debug!(token = token.0, outcome = outcome.label(), "drag session ended");
        self.forwarded(
            phase,
            Some(pointer_id),
            Some(token),
            Some(pos),
            Some(outcome),
            true,
        )
    }

    /// Abort the active drag, leaving the token in its origin container.
    ///
    /// The haptic loop is cancelled without the drop burst.
    pub fn cancel(&mut self) -> GestureDispatch {
        let DragState::Dragging(session) = mem::take(&mut self.state) else {
            return GestureDispatch::ignored(
                GesturePhase::Cancel,
                GestureIgnoredReason::NoActiveSession,
                None,
                None,
                None,
            );
        };
        let DragSession {
            token,
            origin,
            pointer_id,
            cursor,
            haptics,
        } = session;
        let pulses = haptics.cancel();
        tracing::debug!(token = token.0, pulses, "drag session cancelled");
        self.forwarded(
            GesturePhase::Cancel,
            Some(pointer_id),
            Some(token),
            Some(cursor),
            Some(Outcome::Return { origin }),
            false,
        )
    }

    /// Remove a slot-resident token outright.
    pub fn double_tap(&mut self, token: TokenId) -> GestureDispatch {
        let phase = GesturePhase::DoubleTap;
        if self.lifted_token() == Some(token) {
            return GestureDispatch::ignored(
                phase,
                GestureIgnoredReason::TokenLifted,
                None,
                Some(token),
                None,
            );
        }
        match self.board.container_of(token) {
            None => GestureDispatch::ignored(
                phase,
                GestureIgnoredReason::UnknownToken,
                None,
                Some(token),
                None,
            ),
            Some(Container::InPalette) => GestureDispatch::ignored(
                phase,
                GestureIgnoredReason::NotPlaced,
                None,
                Some(token),
                None,
            ),
            Some(Container::InSlot(_)) => {
                let slot = self.board.remove(token);
                self.feedback.forget(token);
                tracing::info!(token = token.0, ?slot, "token removed");
                self.forwarded(phase, None, Some(token), None, None, false)
            }
        }
    }

    /// Cancel any drag, then empty every slot.
    ///
    /// Returns how many tokens went back to the palette.
    pub fn reset_board(&mut self) -> usize {
        if self.is_dragging() {
            self.cancel();
        }
        self.feedback.clear();
        let relocated = self.board.reset();
        tracing::info!(relocated, "board reset");
        relocated
    }

    /// Advance host-clocked haptics and cosmetic transitions.
    pub fn tick(&mut self, dt: Duration) {
        if let DragState::Dragging(session) = &mut self.state {
            session.haptics.advance(dt);
        }
        self.feedback.tick(dt);
    }

    fn forwarded(
        &mut self,
        phase: GesturePhase,
        pointer_id: Option<u32>,
        token: Option<TokenId>,
        position: Option<Point>,
        outcome: Option<Outcome>,
        prevent_default: bool,
    ) -> GestureDispatch {
        GestureDispatch {
            outcome,
            prevent_default,
            log: GestureLogEntry {
                phase,
                sequence: Some(self.next_sequence()),
                pointer_id,
                token,
                position,
                outcome: GestureLogOutcome::Forwarded,
            },
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        sequence
    }
}
