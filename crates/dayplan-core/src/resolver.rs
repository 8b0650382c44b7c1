#![forbid(unsafe_code)]

//! Drop resolution: insert, swap, or return.
//!
//! [`resolve`] runs exactly once per completed gesture. It hit-tests the
//! release point and applies the occupancy rules:
//!
//! | Target | Origin | Outcome |
//! |--------|--------|---------|
//! | none | any | `Return`, nothing mutates |
//! | empty slot | any | `Insert`; a slot origin is vacated |
//! | origin itself | slot | no-op `Insert` |
//! | occupied slot | another slot | `Swap`; occupant moves into the origin |
//! | occupied slot | palette | `Insert`; occupant is evicted to the palette |
//!
//! A palette-origin drop never cascades the evicted occupant into another
//! slot.

use crate::board::{Board, Container, SlotId, TokenId};
use crate::geometry::Point;
use crate::hit_test::HitMap;

/// Resolved result of a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The token now lives in `slot`.
    Insert {
        slot: SlotId,
        /// Origin slot left empty by the move.
        vacated: Option<SlotId>,
        /// Previous occupant sent back to the palette.
        evicted: Option<TokenId>,
    },
    /// The token and the target's occupant traded places.
    Swap {
        origin: SlotId,
        target: SlotId,
        /// Former occupant of `target`, now in `origin`.
        displaced: TokenId,
    },
    /// Miss: the token stays in its origin container.
    Return { origin: Container },
}

impl Outcome {
    /// Short name for logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Swap { .. } => "swap",
            Self::Return { .. } => "return",
        }
    }

    /// Slot the dragged token ended in, if any.
    pub const fn placed_in(&self) -> Option<SlotId> {
        match *self {
            Self::Insert { slot, .. } => Some(slot),
            Self::Swap { target, .. } => Some(target),
            Self::Return { origin } => origin.slot(),
        }
    }
}

/// Resolve a release of `token` (picked up from `origin`) at `release`.
pub fn resolve(
    board: &mut Board,
    hits: &HitMap,
    token: TokenId,
    origin: Container,
    release: Point,
) -> Outcome {
    let outcome = match hits.hit_test(release) {
        None => Outcome::Return { origin },
        Some(target) => place(board, token, origin, target),
    };
    tracing::debug!(
        token = token.0,
        x = release.x,
        y = release.y,
        outcome = outcome.label(),
        "drop resolved"
    );
    #[cfg(debug_assertions)]
    if let Err(violation) = board.check_invariants() {
        tracing::warn!(%violation, "occupancy invariant broken after drop");
    }
    outcome
}

fn place(board: &mut Board, token: TokenId, origin: Container, target: SlotId) -> Outcome {
    let Some(occupant) = board.get(target) else {
        board.set(target, Some(token));
        return Outcome::Insert {
            slot: target,
            vacated: origin.slot(),
            evicted: None,
        };
    };

    match origin {
        Container::InSlot(from) if from == target => Outcome::Insert {
            slot: target,
            vacated: None,
            evicted: None,
        },
        Container::InSlot(from) => {
            board.swap(from, target);
            Outcome::Swap {
                origin: from,
                target,
                displaced: occupant,
            }
        }
        Container::InPalette => {
            let evicted = board.set(target, Some(token));
            Outcome::Insert {
                slot: target,
                vacated: None,
                evicted,
            }
        }
    }
}
