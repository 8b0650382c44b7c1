#![forbid(unsafe_code)]

//! Homework toggle.
//!
//! A two-state flag whose off → on transition fires a one-shot celebration
//! (the host plays its confetti burst when `fired` is set).

/// Result of one toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleResult {
    /// State after the toggle.
    pub state: bool,
    /// True only for the off → on transition.
    pub fired: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HomeworkToggle {
    on: bool,
}

impl HomeworkToggle {
    pub const fn is_on(&self) -> bool {
        self.on
    }

    pub fn toggle(&mut self) -> ToggleResult {
        self.on = !self.on;
        if self.on {
            tracing::debug!("homework done");
        }
        ToggleResult {
            state: self.on,
            fired: self.on,
        }
    }

    /// Button caption for the current state.
    pub const fn label(&self) -> &'static str {
        if self.on { "Good Job! 🎉" } else { "Homework ❗" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_on_off_to_on() {
        let mut toggle = HomeworkToggle::default();
        assert_eq!(toggle.label(), "Homework ❗");
        assert_eq!(
            toggle.toggle(),
            ToggleResult {
                state: true,
                fired: true
            }
        );
        assert_eq!(toggle.label(), "Good Job! 🎉");
        assert_eq!(
            toggle.toggle(),
            ToggleResult {
                state: false,
                fired: false
            }
        );
        assert!(toggle.toggle().fired);
        assert!(toggle.is_on());
    }
}
