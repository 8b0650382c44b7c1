#![forbid(unsafe_code)]

//! Slot occupancy model.
//!
//! A [`Board`] holds three views of [`SLOTS_PER_VIEW`] single-capacity slots
//! and records, for every token minted by the palette, which [`Container`] it
//! currently lives in.
//!
//! # Invariants
//!
//! 1. A slot holds at most one token.
//! 2. No two slots reference the same token.
//! 3. The slot → token relation and the token → container relation agree in
//!    both directions after every public mutation.
//! 4. Token identity is never regenerated: [`Board::reset`] relocates live
//!    tokens to the palette, and only [`Board::remove`] destroys one.

use std::fmt;

/// Number of slots in each view.
pub const SLOTS_PER_VIEW: usize = 4;

/// One of the three mutually exclusive day views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum View {
    Morning,
    Midday,
    Evening,
}

impl View {
    /// All views in display order.
    pub const ALL: [View; 3] = [View::Morning, View::Midday, View::Evening];

    /// Dense index of this view.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Morning => 0,
            Self::Midday => 1,
            Self::Evening => 2,
        }
    }

    /// Lowercase name used in logs and host payloads.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Midday => "midday",
            Self::Evening => "evening",
        }
    }

    /// Slot identity at `index`, if in range.
    #[inline]
    pub const fn slot(self, index: usize) -> Option<SlotId> {
        SlotId::new(self, index)
    }

    /// All slots of this view, in order.
    pub fn slots(self) -> impl Iterator<Item = SlotId> {
        (0..SLOTS_PER_VIEW).map(move |index| SlotId { view: self, index })
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity of a single slot: `(view, index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId {
    view: View,
    index: usize,
}

impl SlotId {
    /// Create a slot id, returning `None` when `index` is out of range.
    #[inline]
    pub const fn new(view: View, index: usize) -> Option<Self> {
        if index < SLOTS_PER_VIEW {
            Some(Self { view, index })
        } else {
            None
        }
    }

    #[inline]
    pub const fn view(self) -> View {
        self.view
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.index
    }

    /// Every slot on the board, morning first.
    pub fn all() -> impl Iterator<Item = SlotId> {
        View::ALL.into_iter().flat_map(View::slots)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.view, self.index)
    }
}

/// Stable identity of a palette token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u32);

impl TokenId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a token currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    InSlot(SlotId),
    InPalette,
}

impl Container {
    /// The slot, if this container is one.
    #[inline]
    pub const fn slot(self) -> Option<SlotId> {
        match self {
            Self::InSlot(slot) => Some(slot),
            Self::InPalette => None,
        }
    }
}

/// A broken occupancy relation, reported by [`Board::check_invariants`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A slot references a token that was removed or never minted.
    DanglingOccupant { slot: SlotId, token: TokenId },
    /// A slot references a token whose recorded container is elsewhere.
    SlotMismatch {
        slot: SlotId,
        token: TokenId,
        recorded: Option<Container>,
    },
    /// A token records a slot that does not point back at it.
    ContainerMismatch {
        token: TokenId,
        slot: SlotId,
        occupant: Option<TokenId>,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingOccupant { slot, token } => {
                write!(f, "slot {slot} references dead token {token}")
            }
            Self::SlotMismatch {
                slot,
                token,
                recorded,
            } => write!(
                f,
                "slot {slot} holds {token} but the token records {recorded:?}"
            ),
            Self::ContainerMismatch {
                token,
                slot,
                occupant,
            } => write!(
                f,
                "token {token} records slot {slot} but the slot holds {occupant:?}"
            ),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Slot occupancy for the three views plus the token → container index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    slots: [[Option<TokenId>; SLOTS_PER_VIEW]; 3],
    /// Indexed by [`TokenId`]; `None` once the token has been removed.
    containers: Vec<Option<Container>>,
}

impl Board {
    /// Create an empty board with `token_count` palette-resident tokens.
    #[must_use]
    pub fn new(token_count: usize) -> Self {
        Self {
            slots: [[None; SLOTS_PER_VIEW]; 3],
            containers: vec![Some(Container::InPalette); token_count],
        }
    }

    /// Number of tokens ever minted for this board (live or removed).
    #[inline]
    pub fn minted(&self) -> usize {
        self.containers.len()
    }

    /// Number of tokens that have not been removed.
    pub fn live_tokens(&self) -> usize {
        self.containers.iter().filter(|c| c.is_some()).count()
    }

    /// Whether `token` exists and has not been removed.
    #[inline]
    pub fn is_live(&self, token: TokenId) -> bool {
        self.container_of(token).is_some()
    }

    /// Current occupant of `slot`.
    #[inline]
    pub fn get(&self, slot: SlotId) -> Option<TokenId> {
        self.slots[slot.view.index()][slot.index]
    }

    /// Current container of `token`, or `None` for removed/unknown tokens.
    #[inline]
    pub fn container_of(&self, token: TokenId) -> Option<Container> {
        self.containers.get(token.index()).copied().flatten()
    }

    /// Place `token` into `slot` (or clear it with `None`).
    ///
    /// Placing a token that currently sits in another slot vacates that slot.
    /// The previous occupant of `slot`, if any, is evicted to the palette and
    /// returned. Dead tokens and re-placing a token into its own slot leave
    /// the board untouched.
    pub fn set(&mut self, slot: SlotId, token: Option<TokenId>) -> Option<TokenId> {
        if let Some(token) = token {
            let Some(current) = self.container_of(token) else {
                return None;
            };
            if current == Container::InSlot(slot) {
                return None;
            }
            if let Container::InSlot(previous) = current {
                *self.cell_mut(previous) = None;
            }
        }

        let evicted = std::mem::replace(self.cell_mut(slot), token);
        if let Some(evicted) = evicted {
            self.containers[evicted.index()] = Some(Container::InPalette);
        }
        if let Some(token) = token {
            self.containers[token.index()] = Some(Container::InSlot(slot));
        }
        evicted
    }

    /// Exchange the contents of two slots, updating both tokens' containers.
    pub fn swap(&mut self, a: SlotId, b: SlotId) {
        if a == b {
            return;
        }
        let first = self.get(a);
        let second = self.get(b);
        *self.cell_mut(a) = second;
        *self.cell_mut(b) = first;
        if let Some(token) = second {
            self.containers[token.index()] = Some(Container::InSlot(a));
        }
        if let Some(token) = first {
            self.containers[token.index()] = Some(Container::InSlot(b));
        }
    }

    /// Destroy a slot-resident token.
    ///
    /// Returns the slot it was removed from. Palette-resident and already
    /// removed tokens are left alone.
    pub fn remove(&mut self, token: TokenId) -> Option<SlotId> {
        let Some(Container::InSlot(slot)) = self.container_of(token) else {
            return None;
        };
        *self.cell_mut(slot) = None;
        self.containers[token.index()] = None;
        Some(slot)
    }

    /// Empty every slot and return all live tokens to the palette.
    ///
    /// Returns how many tokens were relocated.
    pub fn reset(&mut self) -> usize {
        let mut relocated = 0;
        for row in &mut self.slots {
            for cell in row.iter_mut() {
                if cell.take().is_some() {
                    relocated += 1;
                }
            }
        }
        for container in self.containers.iter_mut().flatten() {
            *container = Container::InPalette;
        }
        relocated
    }

    /// Occupied slots with their tokens, morning first.
    pub fn occupied(&self) -> impl Iterator<Item = (SlotId, TokenId)> + '_ {
        SlotId::all().filter_map(|slot| self.get(slot).map(|token| (slot, token)))
    }

    /// Live tokens currently in the palette.
    pub fn palette_tokens(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.containers
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Some(Container::InPalette))
            .map(|(i, _)| TokenId(i as u32))
    }

    /// Verify that both sides of the occupancy relation agree.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for slot in SlotId::all() {
            let Some(token) = self.get(slot) else {
                continue;
            };
            match self.container_of(token) {
                None => return Err(InvariantViolation::DanglingOccupant { slot, token }),
                Some(Container::InSlot(recorded)) if recorded == slot => {}
                recorded => {
                    return Err(InvariantViolation::SlotMismatch {
                        slot,
                        token,
                        recorded,
                    });
                }
            }
        }
        for (i, container) in self.containers.iter().enumerate() {
            if let Some(Container::InSlot(slot)) = *container {
                let token = TokenId(i as u32);
                let occupant = self.get(slot);
                if occupant != Some(token) {
                    return Err(InvariantViolation::ContainerMismatch {
                        token,
                        slot,
                        occupant,
                    });
                }
            }
        }
        Ok(())
    }

    fn cell_mut(&mut self, slot: SlotId) -> &mut Option<TokenId> {
        &mut self.slots[slot.view.index()][slot.index]
    }
}
