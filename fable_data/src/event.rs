//! Authored events and their pages.
//!
//! An [`Event`] is a scriptable entity placed in a room. It carries one or
//! more [`Page`]s; at runtime the highest-indexed page whose conditions all
//! hold is the active one and supplies the event's appearance, trigger and
//! command list.

use serde::{Deserialize, Serialize};

use crate::command::Commands;
use crate::condition::Condition;

/// Facing / movement direction on the 4-neighbourhood grid.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dir {
    Up,
    Right,
    #[default]
    Down,
    Left,
}

impl Dir {
    /// Grid delta for one step in this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Right => (1, 0),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
        }
    }

    /// Rotate clockwise by `quarters` 90-degree turns.
    pub fn rotated(self, quarters: i32) -> Dir {
        const RING: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];
        let start = RING.iter().position(|d| *d == self).unwrap_or(0) as i32;
        RING[(start + quarters).rem_euclid(4) as usize]
    }
}

/// Movement speed expressed as frames per grid step at 60 Hz.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    Slowest,
    Slower,
    #[default]
    Normal,
    Faster,
    Fastest,
}

impl Speed {
    /// Frame count for a single grid step.
    pub fn frames(self) -> u32 {
        match self {
            Speed::Slowest => 64,
            Speed::Slower => 32,
            Speed::Normal => 16,
            Speed::Faster => 8,
            Speed::Fastest => 4,
        }
    }
}

/// When an event's active page starts executing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageTrigger {
    #[default]
    Never,
    /// Tap on the event; the player walks adjacent first.
    Player,
    /// Tap on the event while already adjacent.
    Action,
    Auto,
    Parallel,
}

/// Draw priority of the page's character relative to other characters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagePriority {
    Bottom,
    #[default]
    Middle,
    Top,
}

/// One conditional variant of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub image_index: u32,
    #[serde(default)]
    pub dir: Dir,
    #[serde(default)]
    pub dir_fix: bool,
    #[serde(default)]
    pub walking: bool,
    #[serde(default)]
    pub stepping: bool,
    #[serde(default)]
    pub through: bool,
    #[serde(default)]
    pub speed: Speed,
    #[serde(default)]
    pub priority: PagePriority,
    #[serde(default)]
    pub trigger: PageTrigger,
    #[serde(default)]
    pub commands: Commands,
}

/// An authored event: grid position plus its pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_deltas_are_unit_steps() {
        assert_eq!(Dir::Up.delta(), (0, -1));
        assert_eq!(Dir::Right.delta(), (1, 0));
        assert_eq!(Dir::Down.delta(), (0, 1));
        assert_eq!(Dir::Left.delta(), (-1, 0));
    }

    #[test]
    fn dir_opposite_is_involution() {
        for dir in [Dir::Up, Dir::Right, Dir::Down, Dir::Left] {
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn dir_rotation_wraps() {
        assert_eq!(Dir::Up.rotated(1), Dir::Right);
        assert_eq!(Dir::Up.rotated(2), Dir::Down);
        assert_eq!(Dir::Left.rotated(1), Dir::Up);
        assert_eq!(Dir::Up.rotated(-1), Dir::Left);
        assert_eq!(Dir::Down.rotated(4), Dir::Down);
    }

    #[test]
    fn speed_frames_decrease_with_speed() {
        let frames: Vec<u32> = [
            Speed::Slowest,
            Speed::Slower,
            Speed::Normal,
            Speed::Faster,
            Speed::Fastest,
        ]
        .iter()
        .map(|s| s.frames())
        .collect();
        assert_eq!(frames, vec![64, 32, 16, 8, 4]);
    }

    #[test]
    fn page_roundtrip_with_defaults() {
        let page = Page {
            trigger: PageTrigger::Auto,
            image: "hero".into(),
            ..Page::default()
        };
        let bytes = rmp_serde::to_vec_named(&page).unwrap();
        assert_eq!(page, rmp_serde::from_slice::<Page>(&bytes).unwrap());
    }
}
