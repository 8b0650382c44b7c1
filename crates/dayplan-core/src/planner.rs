#![forbid(unsafe_code)]

//! The assembled planner: palette, tracker, taps and the homework toggle.

use std::sync::Arc;

use web_time::{Duration, Instant};

use crate::board::{Board, SLOTS_PER_VIEW, TokenId, View};
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::feedback::FeedbackCoordinator;
use crate::geometry::Point;
use crate::gesture::{GestureDispatch, GestureTracker};
use crate::haptics::{HapticDriver, NoHaptics};
use crate::hit_test::HitMap;
use crate::palette::Palette;
use crate::tap::TapDetector;
use crate::toggle::{HomeworkToggle, ToggleResult};

/// Everything the host drives for one board.
#[derive(Debug)]
pub struct Planner {
    palette: Palette,
    tracker: GestureTracker,
    taps: TapDetector,
    homework: HomeworkToggle,
}

impl Planner {
    /// Default catalog, no haptics, empty hit map.
    pub fn new(config: &PlannerConfig) -> Result<Self, PlannerError> {
        Self::with_parts(config, Palette::default_catalog(), HitMap::new(), Arc::new(NoHaptics))
    }

    /// Build from explicit parts after validating `config`.
    pub fn with_parts(
        config: &PlannerConfig,
        palette: Palette,
        hits: HitMap,
        driver: Arc<dyn HapticDriver>,
    ) -> Result<Self, PlannerError> {
        config.clone().validated()?;
        let feedback = FeedbackCoordinator::new(driver)
            .with_pattern(config.haptic_pattern())
            .with_drop_pulse(config.drop_pulse_duration(), config.drop_pulse.peak_scale);
        let board = Board::new(palette.len());
        tracing::debug!(tokens = palette.len(), "planner ready");
        Ok(Self {
            tracker: GestureTracker::new(board, hits, feedback),
            taps: config.tap_detector(),
            palette,
            homework: HomeworkToggle::default(),
        })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn board(&self) -> &Board {
        self.tracker.board()
    }

    pub fn tracker(&self) -> &GestureTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut GestureTracker {
        &mut self.tracker
    }

    pub fn hit_map_mut(&mut self) -> &mut HitMap {
        self.tracker.hit_map_mut()
    }

    /// Feed a raw tap on `token`; a completed double tap removes it.
    ///
    /// Returns the removal dispatch when the tap completed a double tap.
    pub fn tap(&mut self, token: TokenId, pos: Point, now: Instant) -> Option<GestureDispatch> {
        self.taps
            .on_tap(token, pos, now)
            .then(|| self.tracker.double_tap(token))
    }

    /// Symbols shown in each slot of `view`.
    pub fn symbols_in(&self, view: View) -> [Option<&str>; SLOTS_PER_VIEW] {
        let mut out = [None; SLOTS_PER_VIEW];
        for (cell, slot) in out.iter_mut().zip(view.slots()) {
            *cell = self
                .board()
                .get(slot)
                .and_then(|token| self.palette.symbol(token));
        }
        out
    }

    /// Empty every slot, cancelling any live drag first.
    pub fn reset_layout(&mut self) -> usize {
        self.taps.reset();
        self.tracker.reset_board()
    }

    pub fn toggle_homework(&mut self) -> ToggleResult {
        self.homework.toggle()
    }

    pub fn homework(&self) -> HomeworkToggle {
        self.homework
    }

    /// Persist the layout. Not implemented.
    pub fn save(&self) -> Result<(), PlannerError> {
        tracing::warn!("save requested but persistence is not implemented");
        Err(PlannerError::Unsupported("save"))
    }

    /// Advance host-clocked haptics and cosmetic transitions.
    pub fn tick(&mut self, dt: Duration) {
        self.tracker.tick(dt);
    }
}
