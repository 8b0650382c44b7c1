#![forbid(unsafe_code)]

//! Core: gesture-driven placement engine for the dayplan board.
//!
//! # Role in dayplan
//! `dayplan-core` owns the board model and every rule that decides where a
//! dragged token ends up. Hosts (see `dayplan-web`) translate their pointer
//! events into [`gesture::GestureTracker`] calls and render whatever the
//! returned dispatches describe.
//!
//! # Primary responsibilities
//! - **Board**: three views of four single-capacity slots plus the token →
//!   container index, kept in agreement on every mutation.
//! - **Gesture tracking**: one drag session at a time; start, move, end,
//!   cancel and double-tap removal.
//! - **Placement resolution**: insert, swap or return on release.
//! - **Feedback**: session-scoped haptic pulses and the drop-confirmation
//!   scale pulse, independent of the resolution outcome.
//!
//! # Example
//!
//! ```
//! use dayplan_core::board::View;
//! use dayplan_core::config::PlannerConfig;
//! use dayplan_core::geometry::Point;
//! use dayplan_core::hit_test::HitMap;
//! use dayplan_core::planner::Planner;
//!
//! let mut planner = Planner::new(&PlannerConfig::default()).unwrap();
//! *planner.hit_map_mut() = HitMap::grid(Point::new(0, 0), 64, 8);
//!
//! let runner = planner.palette().find("🏃🏻‍♂️").unwrap();
//! let target = planner
//!     .tracker()
//!     .hit_map()
//!     .slot_rect(View::Morning.slot(0).unwrap())
//!     .unwrap()
//!     .center();
//!
//! let tracker = planner.tracker_mut();
//! tracker.gesture_start(runner, 1, 1, Point::new(400, 600));
//! tracker.gesture_move(1, target);
//! tracker.gesture_end(1, target);
//!
//! assert_eq!(planner.symbols_in(View::Morning)[0], Some("🏃🏻‍♂️"));
//! ```

pub mod animation;
pub mod board;
pub mod config;
pub mod error;
pub mod feedback;
pub mod geometry;
pub mod gesture;
pub mod haptics;
pub mod palette;
pub mod planner;
pub mod resolver;
pub mod tap;
pub mod timer;
pub mod toggle;

pub use board::{Board, Container, SLOTS_PER_VIEW, SlotId, TokenId, View};
pub use error::PlannerError;
pub use geometry::{Point, Rect};
pub use gesture::{GestureDispatch, GestureTracker};
pub use planner::Planner;
pub use resolver::Outcome;
