//! Which informational panel the display shows.

/// Number of panels the rotor cycles through.
pub const PANEL_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRotor {
    choice: usize,
    panels: usize,
}

impl Default for DisplayRotor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DisplayRotor {
    /// `initial` is kept as given; a value outside the panel range renders
    /// the fallback panel until the first rotation.
    pub fn new(initial: usize) -> Self {
        Self {
            choice: initial,
            panels: PANEL_COUNT,
        }
    }

    pub fn choice(&self) -> usize {
        self.choice
    }

    pub fn rotate(&mut self) -> usize {
        self.choice = (self.choice % self.panels + 1) % self.panels;
        tracing::debug!(choice = self.choice, "display rotated");
        self.choice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps() {
        let mut r = DisplayRotor::default();
        let seen: Vec<_> = (0..4).map(|_| r.rotate()).collect();
        assert_eq!(seen, vec![1, 2, 0, 1]);
    }

    #[test]
    fn out_of_range_start_is_kept_until_rotated() {
        let mut r = DisplayRotor::new(7);
        assert_eq!(r.choice(), 7);
        assert!(r.rotate() < PANEL_COUNT);
    }
}
