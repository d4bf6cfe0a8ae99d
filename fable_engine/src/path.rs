//! Grid pathfinding.
//!
//! Breadth-first search over the 4-neighbourhood. The goal cell is always
//! treated as enterable while searching so a route can end standing next
//! to a blocked object, facing it; when the goal is genuinely blocked the
//! final move becomes a turn.

use std::collections::{HashMap, VecDeque};

use fable_data::Dir;
use serde::{Deserialize, Serialize};

/// One directive of a computed route.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStep {
    Move(Dir),
    Turn(Dir),
}

/// Neighbour expansion order fixed for determinism.
const NEIGHBOURS: [(i32, i32, Dir); 4] = [
    (1, 0, Dir::Right),
    (-1, 0, Dir::Left),
    (0, 1, Dir::Down),
    (0, -1, Dir::Up),
];

/// Shortest route from `start` to `goal` under `passable`.
///
/// Returns the route plus the cell the walker ends on. An unreachable goal
/// yields an empty route ending at `start`. A reachable-but-blocked goal
/// yields a route whose last step is a [`RouteStep::Turn`] toward it,
/// ending on the cell just before it.
///
/// `passable` must be `false` outside some bounded region, or the search
/// for an unreachable goal never exhausts its frontier.
/// [`WalkGrid::at`](crate::gamemap::WalkGrid::at) rejects everything
/// outside the room and satisfies this.
pub fn calc_route<F>(passable: F, start: (i32, i32), goal: (i32, i32)) -> (Vec<RouteStep>, i32, i32)
where
    F: Fn(i32, i32) -> bool,
{
    if start == goal {
        return (Vec::new(), start.0, start.1);
    }

    let mut parents: HashMap<(i32, i32), ((i32, i32), Dir)> = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    let mut found = false;
    while let Some(cell) = queue.pop_front() {
        if cell == goal {
            found = true;
            break;
        }
        for (dx, dy, dir) in NEIGHBOURS {
            let next = (cell.0 + dx, cell.1 + dy);
            if next != goal && !passable(next.0, next.1) {
                continue;
            }
            if next == start || parents.contains_key(&next) {
                continue;
            }
            parents.insert(next, (cell, dir));
            queue.push_back(next);
        }
    }
    if !found {
        return (Vec::new(), start.0, start.1);
    }

    let mut steps = Vec::new();
    let mut cell = goal;
    while cell != start {
        let (prev, dir) = parents[&cell];
        steps.push(RouteStep::Move(dir));
        cell = prev;
    }
    steps.reverse();

    let (mut last_x, mut last_y) = goal;
    if !passable(goal.0, goal.1)
        && let Some(last) = steps.last_mut()
        && let RouteStep::Move(dir) = *last
    {
        *last = RouteStep::Turn(dir);
        let (dx, dy) = dir.delta();
        last_x -= dx;
        last_y -= dy;
    }
    (steps, last_x, last_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(_x: i32, _y: i32) -> bool {
        true
    }

    #[test]
    fn straight_line_is_manhattan_shortest() {
        let (steps, x, y) = calc_route(open, (0, 0), (3, 0));
        assert_eq!(
            steps,
            vec![
                RouteStep::Move(Dir::Right),
                RouteStep::Move(Dir::Right),
                RouteStep::Move(Dir::Right),
            ]
        );
        assert_eq!((x, y), (3, 0));
    }

    #[test]
    fn diagonal_goal_takes_manhattan_distance_steps() {
        let (steps, x, y) = calc_route(open, (0, 0), (2, 3));
        assert_eq!(steps.len(), 5);
        assert_eq!((x, y), (2, 3));
    }

    #[test]
    fn routes_around_a_wall() {
        // wall at x == 1 except y == 2
        let passable = |x: i32, y: i32| x != 1 || y == 2;
        let (steps, x, y) = calc_route(passable, (0, 0), (2, 0));
        assert_eq!((x, y), (2, 0));
        // down to the gap, across, back up: 2 + 2 + 2 = 6 moves
        assert_eq!(steps.len(), 6);
        assert!(steps.iter().all(|s| matches!(s, RouteStep::Move(_))));
    }

    #[test]
    fn blocked_goal_turns_instead_of_stepping() {
        let passable = |x: i32, y: i32| (x, y) != (2, 0);
        let (steps, x, y) = calc_route(passable, (0, 0), (2, 0));
        assert_eq!(
            steps,
            vec![RouteStep::Move(Dir::Right), RouteStep::Turn(Dir::Right)]
        );
        assert_eq!((x, y), (1, 0));
    }

    #[test]
    fn unreachable_goal_gives_empty_route() {
        // goal enclosed on all sides, inside a bounded room
        let passable = |x: i32, y: i32| {
            let blocked = [(4, 5), (6, 5), (5, 4), (5, 6)];
            (0..12).contains(&x) && (0..12).contains(&y) && !blocked.contains(&(x, y))
        };
        let (steps, x, y) = calc_route(passable, (0, 5), (5, 5));
        assert!(steps.is_empty());
        assert_eq!((x, y), (0, 5));
    }

    #[test]
    fn start_equals_goal_is_empty() {
        let (steps, x, y) = calc_route(open, (2, 2), (2, 2));
        assert!(steps.is_empty());
        assert_eq!((x, y), (2, 2));
    }

    #[test]
    fn adjacent_blocked_goal_is_a_single_turn() {
        let passable = |x: i32, y: i32| (x, y) != (0, 1);
        let (steps, x, y) = calc_route(passable, (0, 0), (0, 1));
        assert_eq!(steps, vec![RouteStep::Turn(Dir::Down)]);
        assert_eq!((x, y), (0, 0));
    }
}
