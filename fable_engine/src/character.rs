//! Grid-locked characters.
//!
//! A character occupies a tile and animates a step toward an adjacent tile
//! over `speed.frames()` frames. While `move_count > 0` the character is
//! strictly between its origin cell and `origin + move_dir`; the position
//! commits only when the counter reaches zero.

use fable_data::{Dir, Speed};
use serde::{Deserialize, Serialize};

/// Walk-cycle pose of the sprite.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attitude {
    Left,
    #[default]
    Middle,
    Right,
}

impl Attitude {
    /// The stride pose opposite this one; middle alternates to left.
    fn flipped(self) -> Attitude {
        match self {
            Attitude::Left => Attitude::Right,
            _ => Attitude::Left,
        }
    }
}

/// Frames of one full in-place stepping cycle.
const STEPPING_CYCLE: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub image_name: String,
    pub image_index: u32,
    pub dir: Dir,
    pub dir_fix: bool,
    pub stepping: bool,
    pub walking: bool,
    pub through: bool,
    pub visible: bool,
    pub speed: Speed,
    pub x: i32,
    pub y: i32,
    pub opacity: u8,
    move_count: u32,
    move_dir: Dir,
    attitude: Attitude,
    prev_attitude: Attitude,
    stepping_frame: u32,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            image_name: String::new(),
            image_index: 0,
            dir: Dir::default(),
            dir_fix: false,
            stepping: false,
            walking: true,
            through: false,
            visible: true,
            speed: Speed::default(),
            x: 0,
            y: 0,
            opacity: 255,
            move_count: 0,
            move_dir: Dir::default(),
            attitude: Attitude::Middle,
            prev_attitude: Attitude::Middle,
            stepping_frame: 0,
        }
    }
}

impl Character {
    /// True while a step animation is in flight.
    pub fn is_moving(&self) -> bool {
        self.move_count > 0
    }

    pub fn attitude(&self) -> Attitude {
        self.attitude
    }

    /// The cell this character will occupy once the current step lands.
    pub fn target_cell(&self) -> (i32, i32) {
        if self.move_count == 0 {
            return (self.x, self.y);
        }
        let (dx, dy) = self.move_dir.delta();
        (self.x + dx, self.y + dy)
    }

    /// Fractional progress of the current step, 0 at rest.
    pub fn move_progress(&self) -> f64 {
        if self.move_count == 0 {
            return 0.0;
        }
        1.0 - f64::from(self.move_count) / f64::from(self.speed.frames())
    }

    /// Face `dir` unless the page fixes direction.
    pub fn turn(&mut self, dir: Dir) {
        if !self.dir_fix {
            self.dir = dir;
        }
    }

    /// Begin one grid step in `dir`. The caller has already checked
    /// passability.
    pub fn start_move(&mut self, dir: Dir) {
        self.turn(dir);
        self.move_dir = dir;
        self.move_count = self.speed.frames();
    }

    /// Place the character without animation, cancelling any step.
    pub fn relocate(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        self.move_count = 0;
        self.attitude = Attitude::Middle;
    }

    /// One 60 Hz tick of animation state.
    pub fn update(&mut self) {
        if self.move_count > 0 {
            self.move_count -= 1;
            if self.walking && self.move_count == self.speed.frames() / 2 {
                self.attitude = self.prev_attitude.flipped();
            }
            if self.move_count == 0 {
                let (dx, dy) = self.move_dir.delta();
                self.x += dx;
                self.y += dy;
                self.prev_attitude = self.attitude;
                self.attitude = Attitude::Middle;
            }
            return;
        }
        if self.stepping {
            // 60-frame in-place cycle: middle, left, middle, right
            self.attitude = match self.stepping_frame / 15 {
                1 => Attitude::Left,
                3 => Attitude::Right,
                _ => Attitude::Middle,
            };
            self.stepping_frame = (self.stepping_frame + 1) % STEPPING_CYCLE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker() -> Character {
        Character {
            speed: Speed::Fastest, // 4 frames per step
            ..Character::default()
        }
    }

    #[test]
    fn start_move_sets_facing_and_counter() {
        let mut ch = walker();
        ch.start_move(Dir::Right);
        assert_eq!(ch.dir, Dir::Right);
        assert!(ch.is_moving());
        assert_eq!(ch.target_cell(), (1, 0));
    }

    #[test]
    fn position_commits_only_at_step_end() {
        let mut ch = walker();
        ch.start_move(Dir::Down);
        for _ in 0..3 {
            ch.update();
            assert_eq!((ch.x, ch.y), (0, 0));
            assert!(ch.is_moving());
        }
        ch.update();
        assert_eq!((ch.x, ch.y), (0, 1));
        assert!(!ch.is_moving());
        assert_eq!(ch.attitude(), Attitude::Middle);
    }

    #[test]
    fn strides_alternate_between_steps() {
        let mut ch = walker();
        ch.start_move(Dir::Right);
        ch.update();
        ch.update(); // move_count hits speed/2 = 2
        let first = ch.attitude();
        assert_ne!(first, Attitude::Middle);
        ch.update();
        ch.update();

        ch.start_move(Dir::Right);
        ch.update();
        ch.update();
        let second = ch.attitude();
        assert_ne!(second, Attitude::Middle);
        assert_ne!(first, second);
    }

    #[test]
    fn dir_fix_keeps_facing() {
        let mut ch = walker();
        ch.dir = Dir::Up;
        ch.dir_fix = true;
        ch.start_move(Dir::Left);
        assert_eq!(ch.dir, Dir::Up);
        for _ in 0..4 {
            ch.update();
        }
        assert_eq!((ch.x, ch.y), (-1, 0));
    }

    #[test]
    fn non_walking_character_slides_without_stride() {
        let mut ch = walker();
        ch.walking = false;
        ch.start_move(Dir::Right);
        for _ in 0..4 {
            ch.update();
            assert_eq!(ch.attitude(), Attitude::Middle);
        }
        assert_eq!((ch.x, ch.y), (1, 0));
    }

    #[test]
    fn stepping_cycles_poses_in_place() {
        let mut ch = walker();
        ch.stepping = true;
        let mut seen = Vec::new();
        for frame in 0..60 {
            ch.update();
            if frame % 15 == 0 {
                seen.push(ch.attitude());
            }
        }
        assert_eq!(
            seen,
            vec![Attitude::Middle, Attitude::Left, Attitude::Middle, Attitude::Right]
        );
        assert_eq!((ch.x, ch.y), (0, 0));
    }

    #[test]
    fn relocate_cancels_step() {
        let mut ch = walker();
        ch.start_move(Dir::Right);
        ch.update();
        ch.relocate(5, 6);
        assert_eq!((ch.x, ch.y), (5, 6));
        assert!(!ch.is_moving());
    }

    #[test]
    fn move_progress_is_monotonic() {
        let mut ch = walker();
        ch.start_move(Dir::Right);
        let mut prev = -1.0;
        while ch.is_moving() {
            let p = ch.move_progress();
            assert!(p > prev);
            prev = p;
            ch.update();
        }
        assert_eq!(ch.move_progress(), 0.0);
    }

    #[test]
    fn roundtrip() {
        let mut ch = walker();
        ch.start_move(Dir::Left);
        ch.update();
        let bytes = rmp_serde::to_vec_named(&ch).unwrap();
        assert_eq!(ch, rmp_serde::from_slice::<Character>(&bytes).unwrap());
    }
}
