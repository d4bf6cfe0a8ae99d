//! Tracks one in-flight character movement order.
//!
//! An interpreter holds at most one of these per `move_character` step and
//! polls it each frame until it reports terminated. The state carries its
//! own plan (counted steps or a precomputed route) so it restores with the
//! interpreter it belongs to.

use serde::{Deserialize, Serialize};

use fable_data::{Dir, MoveCharacterMotion};

use crate::character::Character;
use crate::path::{calc_route, RouteStep};
use crate::vars::{random_value, RandomSource};

/// What still needs doing, reduced from the authored motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Plan {
    /// Walk `distance_count` steps in a fixed or per-step direction.
    Step(StepDir),
    /// Follow a precomputed route, indexed from the back by
    /// `distance_count`.
    Route(Vec<RouteStep>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum StepDir {
    Fixed(Dir),
    Forward,
    Backward,
    Random,
    Toward,
    Against,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCharacterState {
    plan: Plan,
    distance_count: u32,
    route_skip: bool,
    waiting: bool,
    terminated: bool,
}

impl MoveCharacterState {
    /// Builds the state, resolving target motions to a route up front.
    /// Returns `None` when the target is unreachable and the order does
    /// not allow skipping; the caller refuses the command.
    pub fn new<F>(
        motion: &MoveCharacterMotion,
        route_skip: bool,
        character: &Character,
        passable: F,
    ) -> Option<Self>
    where
        F: Fn(i32, i32) -> bool,
    {
        let (plan, distance_count) = match motion {
            MoveCharacterMotion::Direction { dir, distance } => {
                (Plan::Step(StepDir::Fixed(*dir)), *distance)
            }
            MoveCharacterMotion::Forward { distance } => (Plan::Step(StepDir::Forward), *distance),
            MoveCharacterMotion::Backward { distance } => {
                (Plan::Step(StepDir::Backward), *distance)
            }
            MoveCharacterMotion::Target { x, y } => {
                let (route, last_x, last_y) =
                    calc_route(&passable, (character.x, character.y), (*x, *y));
                let reaches = (last_x, last_y) == (*x, *y)
                    || route.last().is_some_and(|s| matches!(s, RouteStep::Turn(_)));
                if !reaches && !route_skip {
                    return None;
                }
                let len = route.len() as u32;
                (Plan::Route(route), len)
            }
            MoveCharacterMotion::Random {} => (Plan::Step(StepDir::Random), 1),
            MoveCharacterMotion::Toward {} => (Plan::Step(StepDir::Toward), 1),
            MoveCharacterMotion::Against {} => (Plan::Step(StepDir::Against), 1),
        };
        Some(Self {
            terminated: distance_count == 0,
            plan,
            distance_count,
            route_skip,
            waiting: false,
        })
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Advances the plan by at most one step. `player` is the player's
    /// tile, used by toward/against motions.
    pub fn update<F>(
        &mut self,
        character: &mut Character,
        player: (i32, i32),
        passable: F,
        rand: &mut dyn RandomSource,
    ) where
        F: Fn(i32, i32) -> bool,
    {
        if character.is_moving() || self.terminated {
            return;
        }
        if self.distance_count > 0 && !self.waiting {
            let step = match &self.plan {
                Plan::Route(route) => route[route.len() - self.distance_count as usize],
                Plan::Step(step_dir) => {
                    RouteStep::Move(step_dir.resolve(character, player, rand))
                }
            };
            match step {
                RouteStep::Turn(dir) => {
                    character.turn(dir);
                    self.waiting = true;
                }
                RouteStep::Move(dir) => {
                    let (dx, dy) = dir.delta();
                    let (nx, ny) = (character.x + dx, character.y + dy);
                    if !character.through && !passable(nx, ny) {
                        character.turn(dir);
                        if self.route_skip {
                            self.distance_count = 0;
                            self.terminated = true;
                        }
                        return;
                    }
                    character.start_move(dir);
                    self.waiting = true;
                }
            }
        } else {
            self.distance_count = self.distance_count.saturating_sub(1);
            self.waiting = false;
            if self.distance_count == 0 {
                self.terminated = true;
            }
        }
    }
}

impl StepDir {
    fn resolve(self, character: &Character, player: (i32, i32), rand: &mut dyn RandomSource) -> Dir {
        match self {
            StepDir::Fixed(dir) => dir,
            StepDir::Forward => character.dir,
            StepDir::Backward => character.dir.opposite(),
            StepDir::Random => match random_value(rand, 0, 4) {
                0 => Dir::Up,
                1 => Dir::Right,
                2 => Dir::Down,
                _ => Dir::Left,
            },
            StepDir::Toward => toward(character, player),
            StepDir::Against => toward(character, player).opposite(),
        }
    }
}

/// Dominant-axis step from the character to the player. Ties and equal
/// positions fall back to the current facing.
fn toward(character: &Character, player: (i32, i32)) -> Dir {
    let dx = player.0 - character.x;
    let dy = player.1 - character.y;
    if dx == 0 && dy == 0 {
        return character.dir;
    }
    if dx.abs() >= dy.abs() {
        if dx > 0 { Dir::Right } else { Dir::Left }
    } else if dy > 0 {
        Dir::Down
    } else {
        Dir::Up
    }
}
