//! Runtime map: the player, the current room's events, and passability.
//!
//! Events carry a clone of their authored pages so a saved game restores
//! without consulting content again; page selection re-runs every frame
//! against the live stores.

use serde::{Deserialize, Serialize};

use fable_data::{Dir, Event, GameData, Page, PagePriority, PageTrigger};

use crate::character::Character;
use crate::interpreter::CondEnv;

/// A placed event with its page-selected appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEvent {
    pub id: i64,
    pub pages: Vec<Page>,
    /// Selected page, `None` when no page's conditions pass.
    pub page_index: Option<usize>,
    pub character: Character,
    /// Set by `erase_event`; cleared by leaving the room.
    pub erased: bool,
}

impl RuntimeEvent {
    pub fn new(event: &Event) -> Self {
        let mut character = Character::default();
        character.x = event.x;
        character.y = event.y;
        character.visible = false;
        Self {
            id: event.id,
            pages: event.pages.clone(),
            page_index: None,
            character,
            erased: false,
        }
    }

    pub fn page(&self) -> Option<&Page> {
        self.page_index.and_then(|i| self.pages.get(i))
    }

    /// Re-selects the highest-index page whose conditions all pass and
    /// applies its appearance when the selection changes.
    pub fn refresh(&mut self, env: &CondEnv) {
        let env = CondEnv {
            event_id: self.id,
            ..*env
        };
        let selected = self
            .pages
            .iter()
            .enumerate()
            .rev()
            .find(|(_, page)| {
                page.conditions
                    .iter()
                    .all(|c| crate::interpreter::eval_condition(c, &env))
            })
            .map(|(i, _)| i);
        if selected != self.page_index {
            self.page_index = selected;
            match self.page() {
                Some(page) => {
                    let page = page.clone();
                    self.apply_page(&page);
                }
                None => self.character.visible = false,
            }
        }
    }

    fn apply_page(&mut self, page: &Page) {
        let c = &mut self.character;
        c.image_name = page.image.clone();
        c.image_index = page.image_index;
        c.dir = page.dir;
        c.dir_fix = page.dir_fix;
        c.walking = page.walking;
        c.stepping = page.stepping;
        c.through = page.through;
        c.speed = page.speed;
        c.visible = !self.erased && !page.image.is_empty();
    }

    /// Whether the event occupies its tile for movement purposes.
    pub fn blocks(&self) -> bool {
        !self.erased
            && self
                .page()
                .is_some_and(|p| p.priority == PagePriority::Middle && !p.through)
    }

    pub fn trigger(&self) -> Option<PageTrigger> {
        if self.erased {
            return None;
        }
        self.page().map(|p| p.trigger)
    }
}

/// Owned passability snapshot, safe to consult while a character is
/// mutably borrowed.
pub struct WalkGrid {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl WalkGrid {
    pub fn at(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return false;
        }
        self.cells[(y * self.width + x) as usize]
    }
}

/// Everyone to exclude no one from a [`Map::walk_grid`] snapshot.
pub const EXCLUDE_NONE: i64 = i64::MIN;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    #[serde(rename = "mapID")]
    pub map_id: i64,
    #[serde(rename = "roomID")]
    pub room_id: i64,
    pub player: Character,
    pub events: Vec<RuntimeEvent>,
    /// Overrides set by `change_background` / `change_foreground`,
    /// dropped on transfer.
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub foreground: Option<String>,
}

impl Map {
    /// Fresh map at the content's starting position.
    pub fn new(data: &GameData) -> Self {
        let system = &data.system;
        let mut player = Character::default();
        player.image_name = system.player_image.clone();
        player.speed = system.player_speed;
        player.walking = true;
        player.dir = Dir::Down;
        player.relocate(system.initial_x, system.initial_y);
        let mut map = Self {
            map_id: system.initial_map_id,
            room_id: system.initial_room_id,
            player,
            events: Vec::new(),
            background: None,
            foreground: None,
        };
        map.rebuild_events(data);
        map
    }

    fn rebuild_events(&mut self, data: &GameData) {
        self.events = data
            .room(self.map_id, self.room_id)
            .map(|room| room.events.iter().map(RuntimeEvent::new).collect())
            .unwrap_or_default();
    }

    pub fn event(&self, id: i64) -> Option<&RuntimeEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn event_mut(&mut self, id: i64) -> Option<&mut RuntimeEvent> {
        self.events.iter_mut().find(|e| e.id == id)
    }

    /// Live event standing on `(x, y)`, if any.
    pub fn event_at(&self, x: i32, y: i32) -> Option<&RuntimeEvent> {
        self.events
            .iter()
            .find(|e| !e.erased && e.page().is_some() && e.character.x == x && e.character.y == y)
    }

    /// Character for an absolute target id; `-1` is the player.
    pub fn character_mut(&mut self, target: i64) -> Option<&mut Character> {
        if target == fable_data::command::TARGET_PLAYER {
            Some(&mut self.player)
        } else {
            self.event_mut(target).map(|e| &mut e.character)
        }
    }

    pub fn character(&self, target: i64) -> Option<&Character> {
        if target == fable_data::command::TARGET_PLAYER {
            Some(&self.player)
        } else {
            self.event(target).map(|e| &e.character)
        }
    }

    pub fn erase_event(&mut self, id: i64) {
        if let Some(event) = self.event_mut(id) {
            event.erased = true;
            event.character.visible = false;
        }
    }

    pub fn refresh_events(&mut self, env: &CondEnv) {
        for event in &mut self.events {
            event.refresh(env);
        }
    }

    pub fn room_size(&self, data: &GameData) -> (i32, i32) {
        data.room(self.map_id, self.room_id)
            .map(|r| (r.width, r.height))
            .unwrap_or((0, 0))
    }

    /// Switches rooms in place: new event set, player repositioned,
    /// background overrides dropped. Interpreter bookkeeping is the
    /// caller's problem.
    pub fn transfer_player_immediately(&mut self, data: &GameData, room_id: i64, x: i32, y: i32) {
        self.room_id = room_id;
        self.background = None;
        self.foreground = None;
        self.rebuild_events(data);
        self.player.relocate(x, y);
    }

    /// Passability snapshot of the current room. `exclude` names one
    /// character (event id or `-1` for the player) whose own tile is
    /// left walkable so it can path from where it stands.
    pub fn walk_grid(&self, data: &GameData, exclude: i64) -> WalkGrid {
        let (width, height) = self.room_size(data);
        let room = data.room(self.map_id, self.room_id);
        let mut cells = Vec::with_capacity((width.max(0) * height.max(0)) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(room.is_some_and(|r| r.tile_passable(x, y)));
            }
        }
        let mut grid = WalkGrid {
            width,
            height,
            cells,
        };
        for event in &self.events {
            if event.id != exclude && event.blocks() {
                block(&mut grid, event.character.x, event.character.y);
            }
        }
        if exclude != fable_data::command::TARGET_PLAYER {
            block(&mut grid, self.player.x, self.player.y);
        }
        grid
    }
}

fn block(grid: &mut WalkGrid, x: i32, y: i32) {
    if x >= 0 && y >= 0 && x < grid.width && y < grid.height {
        grid.cells[(y * grid.width + x) as usize] = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fable_data::{MapData, Room, System};

    fn sample_data() -> GameData {
        let page = Page {
            image: "door".into(),
            ..Page::default()
        };
        let event = Event {
            id: 7,
            x: 3,
            y: 1,
            pages: vec![page],
        };
        GameData {
            maps: vec![MapData {
                id: 1,
                rooms: vec![Room {
                    id: 2,
                    width: 5,
                    height: 4,
                    passable: Vec::new(),
                    background: String::new(),
                    foreground: String::new(),
                    events: vec![event],
                }],
            }],
            system: System {
                initial_map_id: 1,
                initial_room_id: 2,
                initial_x: 1,
                initial_y: 1,
                ..System::default()
            },
            ..GameData::default()
        }
    }

    fn env() -> (
        crate::vars::Variables,
        crate::vars::Switches,
        crate::vars::SelfSwitches,
        crate::items::Inventory,
    ) {
        Default::default()
    }

    #[test]
    fn new_map_places_the_player_and_events() {
        let data = sample_data();
        let map = Map::new(&data);
        assert_eq!((map.player.x, map.player.y), (1, 1));
        assert_eq!(map.events.len(), 1);
        assert_eq!(map.events[0].id, 7);
    }

    #[test]
    fn refresh_selects_the_page_and_shows_the_event() {
        let data = sample_data();
        let mut map = Map::new(&data);
        let (vars, switches, self_switches, inventory) = env();
        let env = CondEnv {
            variables: &vars,
            switches: &switches,
            self_switches: &self_switches,
            inventory: &inventory,
            map_id: 1,
            room_id: 2,
            event_id: 0,
        };
        map.refresh_events(&env);
        let event = map.event(7).unwrap();
        assert_eq!(event.page_index, Some(0));
        assert!(event.character.visible);
        assert_eq!(event.character.image_name, "door");
    }

    #[test]
    fn erased_events_stop_occupying_their_tile() {
        let data = sample_data();
        let mut map = Map::new(&data);
        let (vars, switches, self_switches, inventory) = env();
        let env = CondEnv {
            variables: &vars,
            switches: &switches,
            self_switches: &self_switches,
            inventory: &inventory,
            map_id: 1,
            room_id: 2,
            event_id: 0,
        };
        map.refresh_events(&env);
        assert!(map.event_at(3, 1).is_some());
        map.erase_event(7);
        assert!(map.event_at(3, 1).is_none());
    }

    #[test]
    fn walk_grid_blocks_events_and_the_player() {
        let data = sample_data();
        let mut map = Map::new(&data);
        let (vars, switches, self_switches, inventory) = env();
        let env = CondEnv {
            variables: &vars,
            switches: &switches,
            self_switches: &self_switches,
            inventory: &inventory,
            map_id: 1,
            room_id: 2,
            event_id: 0,
        };
        map.refresh_events(&env);
        let grid = map.walk_grid(&data, EXCLUDE_NONE);
        assert!(!grid.at(3, 1));
        assert!(!grid.at(1, 1));
        assert!(grid.at(0, 0));
        assert!(!grid.at(-1, 0));
        assert!(!grid.at(5, 0));
    }

    #[test]
    fn transfer_rebuilds_events_and_moves_the_player() {
        let mut data = sample_data();
        data.maps[0].rooms.push(Room {
            id: 9,
            width: 3,
            height: 3,
            passable: Vec::new(),
            background: String::new(),
            foreground: String::new(),
            events: Vec::new(),
        });
        let mut map = Map::new(&data);
        map.background = Some("cave".into());
        map.transfer_player_immediately(&data, 9, 2, 2);
        assert_eq!(map.room_id, 9);
        assert!(map.events.is_empty());
        assert_eq!((map.player.x, map.player.y), (2, 2));
        assert_eq!(map.background, None);
    }
}
