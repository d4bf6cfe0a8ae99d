//! Per-frame input snapshot handed in by the host.

/// What the player did this frame, in tile coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Input {
    /// A tap/click/confirm press happened this frame.
    pub triggered: bool,
    /// Tapped tile, when the tap landed on the map.
    pub tap: Option<(i32, i32)>,
    /// Choice index picked from an open choices window.
    pub choice: Option<usize>,
}

impl Input {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn tap_at(x: i32, y: i32) -> Self {
        Self {
            triggered: true,
            tap: Some((x, y)),
            choice: None,
        }
    }

    pub fn trigger() -> Self {
        Self {
            triggered: true,
            tap: None,
            choice: None,
        }
    }

    pub fn choose(index: usize) -> Self {
        Self {
            triggered: true,
            tap: None,
            choice: Some(index),
        }
    }
}
