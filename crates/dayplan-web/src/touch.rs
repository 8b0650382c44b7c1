#![forbid(unsafe_code)]

//! Browser touch lifecycle adapter.
//!
//! Bridges `touchstart`/`touchmove`/`touchend`/`touchcancel` and `dblclick`
//! signals into [`GestureTracker`](dayplan_core::GestureTracker) calls and
//! translates each dispatch into [`HostCommand`]s the JS side applies to the
//! DOM. The adapter enforces:
//! - one tracked touch identifier at a time,
//! - `preventDefault` on every move and end while a drag is live, even
//!   from a foreign finger, and
//! - a matching `ClearPosition` for every `SetPosition` once a drag ends.
//!
//! Haptic pulses are clocked by [`TouchAdapter::tick`]: the host calls it
//! from `requestAnimationFrame`, so pulses need no thread on wasm.

use std::sync::Arc;

use dayplan_core::board::Container;
use dayplan_core::config::PlannerConfig;
use dayplan_core::gesture::GestureDispatch;
use dayplan_core::haptics::{HapticDriver, PulseClock};
use dayplan_core::hit_test::HitMap;
use dayplan_core::palette::Palette;
use dayplan_core::{Outcome, Planner, PlannerError, Point, SlotId, TokenId};
use web_time::{Duration, Instant};

use crate::vibration::VibrationQueue;

/// One entry of a `TouchList`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub identifier: u32,
    pub page_x: i32,
    pub page_y: i32,
}

impl TouchPoint {
    #[must_use]
    pub const fn new(identifier: u32, page_x: i32, page_y: i32) -> Self {
        Self {
            identifier,
            page_x,
            page_y,
        }
    }

    pub const fn position(&self) -> Point {
        Point::new(self.page_x, self.page_y)
    }
}

/// Host-side touch signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TouchInput {
    Start {
        token: TokenId,
        touches: Vec<TouchPoint>,
    },
    Move {
        touches: Vec<TouchPoint>,
    },
    End {
        changed_touches: Vec<TouchPoint>,
    },
    Cancel,
    DoubleClick {
        token: TokenId,
    },
}

/// DOM mutation requested by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Call `preventDefault()` on the triggering event.
    PreventDefault,
    /// Mark the token element as being dragged.
    Lift { token: TokenId },
    /// Pin the token element at page coordinates.
    SetPosition { token: TokenId, position: Point },
    /// Drop inline positioning and the dragging style.
    ClearPosition { token: TokenId },
    /// Move the token element into a slot.
    Place { token: TokenId, slot: SlotId },
    /// Move the token element back into its palette category.
    ReturnToPalette { token: TokenId },
    /// Play the drop-zoom transition on the token element.
    StartDropZoom { token: TokenId },
    /// Detach the token element for good.
    Remove { token: TokenId },
}

/// Result of one touch signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchDispatch {
    /// Tracker dispatch, absent when the signal carried no usable touch.
    pub gesture: Option<GestureDispatch>,
    pub commands: Vec<HostCommand>,
}

impl TouchDispatch {
    fn none() -> Self {
        Self {
            gesture: None,
            commands: Vec::new(),
        }
    }

    pub fn is_forwarded(&self) -> bool {
        self.gesture.is_some_and(|g| g.is_forwarded())
    }
}

/// Owns a [`Planner`] and the vibration queue its haptics write to.
#[derive(Debug)]
pub struct TouchAdapter {
    planner: Planner,
    vibration: Arc<VibrationQueue>,
}

impl TouchAdapter {
    /// Build an adapter over the default catalog.
    pub fn new(
        config: &PlannerConfig,
        hits: HitMap,
        vibrate_available: bool,
    ) -> Result<Self, PlannerError> {
        Self::with_palette(config, Palette::default_catalog(), hits, vibrate_available)
    }

    /// Build an adapter over `palette`. The haptic clock is always the host's.
    pub fn with_palette(
        config: &PlannerConfig,
        palette: Palette,
        hits: HitMap,
        vibrate_available: bool,
    ) -> Result<Self, PlannerError> {
        let mut config = config.clone();
        config.haptics.clock = PulseClock::Host;
        let vibration = Arc::new(VibrationQueue::new(vibrate_available));
        let driver: Arc<dyn HapticDriver> = vibration.clone();
        let planner = Planner::with_parts(&config, palette, hits, driver)?;
        Ok(Self { planner, vibration })
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut Planner {
        &mut self.planner
    }

    /// Queue the host drains into `navigator.vibrate`.
    pub fn vibration(&self) -> &VibrationQueue {
        &self.vibration
    }

    /// Identifier of the touch currently dragging, if any.
    pub fn active_touch(&self) -> Option<u32> {
        match self.planner.tracker().state() {
            dayplan_core::gesture::DragState::Dragging(session) => Some(session.pointer_id()),
            dayplan_core::gesture::DragState::Idle => None,
        }
    }

    /// Route a decoded signal.
    pub fn dispatch(&mut self, input: &TouchInput) -> TouchDispatch {
        match input {
            TouchInput::Start { token, touches } => self.touch_start(*token, touches),
            TouchInput::Move { touches } => self.touch_move(touches),
            TouchInput::End { changed_touches } => self.touch_end(changed_touches),
            TouchInput::Cancel => self.touch_cancel(),
            TouchInput::DoubleClick { token } => self.dblclick(*token),
        }
    }

    /// `touchstart` on a token element. `touches` is the event's full list.
    pub fn touch_start(&mut self, token: TokenId, touches: &[TouchPoint]) -> TouchDispatch {
        let Some(first) = touches.first() else {
            return TouchDispatch::none();
        };
        let position = first.position();
        let gesture = self.planner.tracker_mut().gesture_start(
            token,
            first.identifier,
            touches.len(),
            position,
        );
        let commands = if gesture.is_forwarded() {
            vec![
                HostCommand::PreventDefault,
                HostCommand::Lift { token },
                HostCommand::SetPosition { token, position },
            ]
        } else {
            Vec::new()
        };
        TouchDispatch {
            gesture: Some(gesture),
            commands,
        }
    }

    /// `touchmove`. Follows the tracked identifier, falling back to the first
    /// touch so a foreign finger is reported as a pointer mismatch. Either
    /// way the page must not scroll while a drag is live.
    pub fn touch_move(&mut self, touches: &[TouchPoint]) -> TouchDispatch {
        let Some(touch) = self.pick(touches) else {
            return TouchDispatch::none();
        };
        let position = touch.position();
        let gesture = self
            .planner
            .tracker_mut()
            .gesture_move(touch.identifier, position);
        let mut commands = Vec::new();
        if gesture.prevent_default {
            commands.push(HostCommand::PreventDefault);
        }
        if let (true, Some(token)) = (gesture.is_forwarded(), gesture.log.token) {
            commands.push(HostCommand::SetPosition { token, position });
        }
        TouchDispatch {
            gesture: Some(gesture),
            commands,
        }
    }

    /// `touchend` with the event's `changedTouches`.
    pub fn touch_end(&mut self, changed_touches: &[TouchPoint]) -> TouchDispatch {
        let Some(touch) = self.pick(changed_touches) else {
            return TouchDispatch::none();
        };
        let gesture = self
            .planner
            .tracker_mut()
            .gesture_end(touch.identifier, touch.position());
        let mut commands = Vec::new();
        if gesture.prevent_default {
            commands.push(HostCommand::PreventDefault);
        }
        if let (true, Some(token), Some(outcome)) =
            (gesture.is_forwarded(), gesture.log.token, gesture.outcome)
        {
            commands.push(HostCommand::ClearPosition { token });
            settle(token, outcome, &mut commands);
            commands.push(HostCommand::StartDropZoom { token });
        }
        TouchDispatch {
            gesture: Some(gesture),
            commands,
        }
    }

    /// `touchcancel`, window blur or page hide.
    pub fn touch_cancel(&mut self) -> TouchDispatch {
        let gesture = self.planner.tracker_mut().cancel();
        let mut commands = Vec::new();
        if let (Some(token), Some(outcome)) = (gesture.log.token, gesture.outcome) {
            commands.push(HostCommand::ClearPosition { token });
            settle(token, outcome, &mut commands);
        }
        TouchDispatch {
            gesture: Some(gesture),
            commands,
        }
    }

    /// Browser `dblclick`, already recognised by the host.
    pub fn dblclick(&mut self, token: TokenId) -> TouchDispatch {
        let gesture = self.planner.tracker_mut().double_tap(token);
        removal(gesture)
    }

    /// Raw tap on a token, for hosts that recognise double taps themselves.
    pub fn tap(&mut self, token: TokenId, touch: TouchPoint, now: Instant) -> TouchDispatch {
        match self.planner.tap(token, touch.position(), now) {
            Some(gesture) => removal(gesture),
            None => TouchDispatch::none(),
        }
    }

    /// Reset button: every placed token goes back to its palette category.
    pub fn reset(&mut self) -> Vec<HostCommand> {
        let lifted = self.planner.tracker().lifted_token();
        let mut commands: Vec<HostCommand> = lifted
            .map(|token| HostCommand::ClearPosition { token })
            .into_iter()
            .collect();
        commands.extend(
            self.planner
                .board()
                .occupied()
                .map(|(_, token)| HostCommand::ReturnToPalette { token }),
        );
        let relocated = self.planner.reset_layout();
        tracing::debug!(relocated, commands = commands.len(), "touch adapter reset");
        commands
    }

    /// Advance haptic pulses and drop-zoom transitions.
    pub fn tick(&mut self, dt: Duration) {
        self.planner.tick(dt);
    }

    /// Current render scale for `token`.
    pub fn scale_of(&self, token: TokenId) -> f32 {
        self.planner.tracker().feedback().scale_of(token)
    }

    fn pick<'a>(&self, touches: &'a [TouchPoint]) -> Option<&'a TouchPoint> {
        self.active_touch()
            .and_then(|id| touches.iter().find(|t| t.identifier == id))
            .or_else(|| touches.first())
    }
}

fn settle(token: TokenId, outcome: Outcome, commands: &mut Vec<HostCommand>) {
    match outcome {
        Outcome::Insert { slot, evicted, .. } => {
            commands.push(HostCommand::Place { token, slot });
            if let Some(evicted) = evicted {
                commands.push(HostCommand::ReturnToPalette { token: evicted });
            }
        }
        Outcome::Swap {
            origin,
            target,
            displaced,
        } => {
            commands.push(HostCommand::Place {
                token: displaced,
                slot: origin,
            });
            commands.push(HostCommand::Place {
                token,
                slot: target,
            });
        }
        Outcome::Return {
            origin: Container::InSlot(slot),
        } => commands.push(HostCommand::Place { token, slot }),
        Outcome::Return {
            origin: Container::InPalette,
        } => commands.push(HostCommand::ReturnToPalette { token }),
    }
}

fn removal(gesture: GestureDispatch) -> TouchDispatch {
    let commands = match gesture.log.token {
        Some(token) if gesture.is_forwarded() => vec![HostCommand::Remove { token }],
        _ => Vec::new(),
    };
    TouchDispatch {
        gesture: Some(gesture),
        commands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dayplan_core::View;
    use dayplan_core::gesture::{GestureIgnoredReason, GestureLogOutcome};
    use pretty_assertions::assert_eq;

    fn adapter() -> TouchAdapter {
        TouchAdapter::new(
            &PlannerConfig::default(),
            HitMap::grid(Point::new(0, 0), 50, 10),
            false,
        )
        .expect("default config is valid")
    }

    fn center(adapter: &TouchAdapter, slot: SlotId) -> TouchPoint {
        let c = adapter
            .planner()
            .tracker()
            .hit_map()
            .slot_rect(slot)
            .expect("registered")
            .center();
        TouchPoint::new(0, c.x, c.y)
    }

    fn slot(view: View, index: usize) -> SlotId {
        view.slot(index).expect("slot index in range")
    }

    fn ignored_reason(dispatch: &TouchDispatch) -> Option<GestureIgnoredReason> {
        match dispatch.gesture?.log.outcome {
            GestureLogOutcome::Ignored(reason) => Some(reason),
            GestureLogOutcome::Forwarded => None,
        }
    }

    #[test]
    fn start_lifts_and_pins_token() {
        let mut adapter = adapter();
        let touch = TouchPoint::new(4, 700, 800);
        let dispatch = adapter.touch_start(TokenId(2), &[touch]);
        assert_eq!(
            dispatch.commands,
            vec![
                HostCommand::PreventDefault,
                HostCommand::Lift { token: TokenId(2) },
                HostCommand::SetPosition {
                    token: TokenId(2),
                    position: Point::new(700, 800)
                },
            ]
        );
        assert_eq!(adapter.active_touch(), Some(4));
    }

    #[test]
    fn multi_touch_start_is_ignored() {
        let mut adapter = adapter();
        let dispatch = adapter.touch_start(
            TokenId(1),
            &[TouchPoint::new(0, 1, 1), TouchPoint::new(1, 5, 5)],
        );
        assert_eq!(ignored_reason(&dispatch), Some(GestureIgnoredReason::MultiContact));
        assert!(dispatch.commands.is_empty());
        assert_eq!(adapter.active_touch(), None);
    }

    #[test]
    fn move_follows_tracked_identifier() {
        let mut adapter = adapter();
        adapter.touch_start(TokenId(0), &[TouchPoint::new(9, 500, 500)]);
        let dispatch = adapter.touch_move(&[TouchPoint::new(3, 1, 1), TouchPoint::new(9, 40, 60)]);
        assert_eq!(
            dispatch.commands,
            vec![
                HostCommand::PreventDefault,
                HostCommand::SetPosition {
                    token: TokenId(0),
                    position: Point::new(40, 60)
                },
            ]
        );
    }

    #[test]
    fn foreign_touch_move_still_blocks_scrolling() {
        let mut adapter = adapter();
        adapter.touch_start(TokenId(0), &[TouchPoint::new(1, 500, 500)]);
        let dispatch = adapter.touch_move(&[TouchPoint::new(2, 1, 1)]);
        assert_eq!(ignored_reason(&dispatch), Some(GestureIgnoredReason::PointerMismatch));
        assert_eq!(dispatch.commands, vec![HostCommand::PreventDefault]);
        assert_eq!(adapter.active_touch(), Some(1));
        assert_eq!(
            adapter.planner().tracker().cursor(),
            Some(Point::new(500, 500))
        );
    }

    #[test]
    fn foreign_touch_end_keeps_drag_and_blocks_default() {
        let mut adapter = adapter();
        adapter.touch_start(TokenId(0), &[TouchPoint::new(1, 500, 500)]);
        let dispatch = adapter.touch_end(&[TouchPoint::new(2, 1, 1)]);
        assert_eq!(dispatch.commands, vec![HostCommand::PreventDefault]);
        assert_eq!(adapter.active_touch(), Some(1));
    }

    #[test]
    fn stray_move_without_drag_lets_page_scroll() {
        let mut adapter = adapter();
        let dispatch = adapter.touch_move(&[TouchPoint::new(2, 1, 1)]);
        assert_eq!(ignored_reason(&dispatch), Some(GestureIgnoredReason::NoActiveSession));
        assert!(dispatch.commands.is_empty());
    }

    #[test]
    fn empty_touch_lists_do_nothing() {
        let mut adapter = adapter();
        assert_eq!(adapter.touch_start(TokenId(0), &[]), TouchDispatch::none());
        assert_eq!(adapter.touch_move(&[]), TouchDispatch::none());
        assert_eq!(adapter.touch_end(&[]), TouchDispatch::none());
    }

    #[test]
    fn end_on_empty_slot_places_and_zooms() {
        let mut adapter = adapter();
        let target = slot(View::Midday, 1);
        let drop_at = center(&adapter, target);
        adapter.touch_start(TokenId(5), &[TouchPoint::new(0, 900, 900)]);
        let dispatch = adapter.touch_end(&[drop_at]);
        assert_eq!(
            dispatch.commands,
            vec![
                HostCommand::PreventDefault,
                HostCommand::ClearPosition { token: TokenId(5) },
                HostCommand::Place {
                    token: TokenId(5),
                    slot: target
                },
                HostCommand::StartDropZoom { token: TokenId(5) },
            ]
        );
        assert!(adapter.scale_of(TokenId(5)) >= 1.0);
        adapter.tick(Duration::from_millis(400));
        assert_eq!(adapter.scale_of(TokenId(5)), 1.0);
    }

    #[test]
    fn end_on_occupied_slot_from_slot_swaps() {
        let mut adapter = adapter();
        let a = slot(View::Morning, 0);
        let b = slot(View::Morning, 3);
        let at_a = center(&adapter, a);
        let at_b = center(&adapter, b);
        adapter.touch_start(TokenId(1), &[TouchPoint::new(0, 900, 900)]);
        adapter.touch_end(&[at_a]);
        adapter.touch_start(TokenId(2), &[TouchPoint::new(0, 900, 900)]);
        adapter.touch_end(&[at_b]);

        adapter.touch_start(TokenId(1), &[at_a]);
        let dispatch = adapter.touch_end(&[at_b]);
        assert_eq!(
            dispatch.commands,
            vec![
                HostCommand::PreventDefault,
                HostCommand::ClearPosition { token: TokenId(1) },
                HostCommand::Place {
                    token: TokenId(2),
                    slot: a
                },
                HostCommand::Place {
                    token: TokenId(1),
                    slot: b
                },
                HostCommand::StartDropZoom { token: TokenId(1) },
            ]
        );
    }

    #[test]
    fn palette_drop_on_occupied_slot_evicts() {
        let mut adapter = adapter();
        let target = slot(View::Evening, 2);
        let at = center(&adapter, target);
        adapter.touch_start(TokenId(1), &[TouchPoint::new(0, 900, 900)]);
        adapter.touch_end(&[at]);
        adapter.touch_start(TokenId(7), &[TouchPoint::new(0, 900, 900)]);
        let dispatch = adapter.touch_end(&[at]);
        assert!(dispatch.commands.contains(&HostCommand::ReturnToPalette { token: TokenId(1) }));
        assert!(dispatch.commands.contains(&HostCommand::Place {
            token: TokenId(7),
            slot: target
        }));
    }

    #[test]
    fn miss_returns_to_palette() {
        let mut adapter = adapter();
        adapter.touch_start(TokenId(3), &[TouchPoint::new(0, 900, 900)]);
        let dispatch = adapter.touch_end(&[TouchPoint::new(0, 2_000, 2_000)]);
        assert_eq!(
            dispatch.commands[2],
            HostCommand::ReturnToPalette { token: TokenId(3) }
        );
    }

    #[test]
    fn cancel_restores_origin_without_zoom() {
        let mut adapter = adapter();
        let origin = slot(View::Morning, 2);
        let at = center(&adapter, origin);
        adapter.touch_start(TokenId(4), &[at]);
        adapter.touch_end(&[at]);
        adapter.touch_start(TokenId(4), &[at]);
        adapter.touch_move(&[TouchPoint::new(0, 1_500, 10)]);

        let dispatch = adapter.touch_cancel();
        assert_eq!(
            dispatch.commands,
            vec![
                HostCommand::ClearPosition { token: TokenId(4) },
                HostCommand::Place {
                    token: TokenId(4),
                    slot: origin
                },
            ]
        );
        assert_eq!(adapter.active_touch(), None);
    }

    #[test]
    fn dblclick_removes_only_placed_tokens() {
        let mut adapter = adapter();
        let at = center(&adapter, slot(View::Midday, 0));
        assert_eq!(
            ignored_reason(&adapter.dblclick(TokenId(6))),
            Some(GestureIgnoredReason::NotPlaced)
        );
        adapter.touch_start(TokenId(6), &[TouchPoint::new(0, 900, 900)]);
        adapter.touch_end(&[at]);
        let dispatch = adapter.dblclick(TokenId(6));
        assert_eq!(dispatch.commands, vec![HostCommand::Remove { token: TokenId(6) }]);
        assert!(!adapter.planner().board().is_live(TokenId(6)));
    }

    #[test]
    fn reset_returns_every_placed_token() {
        let mut adapter = adapter();
        let first = center(&adapter, slot(View::Morning, 0));
        let second = center(&adapter, slot(View::Evening, 3));
        adapter.touch_start(TokenId(0), &[TouchPoint::new(0, 900, 900)]);
        adapter.touch_end(&[first]);
        adapter.touch_start(TokenId(1), &[TouchPoint::new(0, 900, 900)]);
        adapter.touch_end(&[second]);
        adapter.touch_start(TokenId(0), &[first]);

        let commands = adapter.reset();
        assert_eq!(
            commands,
            vec![
                HostCommand::ClearPosition { token: TokenId(0) },
                HostCommand::ReturnToPalette { token: TokenId(0) },
                HostCommand::ReturnToPalette { token: TokenId(1) },
            ]
        );
        assert_eq!(adapter.planner().board().occupied().count(), 0);
        assert_eq!(adapter.active_touch(), None);
    }

    #[test]
    fn unavailable_vibration_queues_nothing() {
        let mut adapter = adapter();
        adapter.touch_start(TokenId(0), &[TouchPoint::new(0, 900, 900)]);
        adapter.touch_end(&[TouchPoint::new(0, 900, 900)]);
        assert_eq!(adapter.vibration().pending(), 0);
    }

    #[test]
    fn available_vibration_queues_drop_burst() {
        let mut adapter = TouchAdapter::new(
            &PlannerConfig::default(),
            HitMap::grid(Point::new(0, 0), 50, 10),
            true,
        )
        .expect("valid");
        adapter.touch_start(TokenId(0), &[TouchPoint::new(0, 900, 900)]);
        adapter.touch_end(&[TouchPoint::new(0, 900, 900)]);
        let patterns = adapter.vibration().drain();
        assert_eq!(patterns.last(), Some(&vec![10, 10, 10, 10, 10]));
    }

    #[test]
    fn tick_queues_pulses_while_dragging() {
        let mut adapter = TouchAdapter::new(
            &PlannerConfig::default(),
            HitMap::grid(Point::new(0, 0), 50, 10),
            true,
        )
        .expect("valid");
        adapter.touch_start(TokenId(0), &[TouchPoint::new(0, 900, 900)]);
        adapter.tick(Duration::from_millis(149));
        assert!(adapter.vibration().drain().is_empty());
        adapter.tick(Duration::from_millis(1));
        assert_eq!(adapter.vibration().drain(), vec![vec![10]]);
        adapter.tick(Duration::from_millis(150));
        assert_eq!(adapter.vibration().drain(), vec![vec![10]]);

        adapter.touch_end(&[TouchPoint::new(0, 900, 900)]);
        assert_eq!(adapter.vibration().drain(), vec![vec![10, 10, 10, 10, 10]]);
        adapter.tick(Duration::from_millis(300));
        assert!(adapter.vibration().drain().is_empty());
    }

    #[test]
    fn dispatch_routes_inputs() {
        let mut adapter = adapter();
        let start = adapter.dispatch(&TouchInput::Start {
            token: TokenId(2),
            touches: vec![TouchPoint::new(1, 10, 10)],
        });
        assert!(start.is_forwarded());
        let cancel = adapter.dispatch(&TouchInput::Cancel);
        assert!(cancel.is_forwarded());
        let again = adapter.dispatch(&TouchInput::Cancel);
        assert_eq!(
            ignored_reason(&again),
            Some(GestureIgnoredReason::NoActiveSession)
        );
    }
}
