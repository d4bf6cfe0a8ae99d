//! Authored maps, rooms and top-level game content.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::command::Commands;
use crate::event::{Event, Speed};
use crate::id::TextId;
use crate::texts::Texts;

/// One room of a map: a tile grid with events placed on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub width: i32,
    pub height: i32,
    /// Row-major walkability grid; empty means every tile is walkable.
    #[serde(default)]
    pub passable: Vec<bool>,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub foreground: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Room {
    /// Tile walkability from authored data alone; out-of-bounds is blocked.
    pub fn tile_passable(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return false;
        }
        if self.passable.is_empty() {
            return true;
        }
        self.passable
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(false)
    }
}

/// A map: an ordered set of rooms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub id: i64,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

/// A shared command list callable from any event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonEvent {
    pub id: i64,
    #[serde(default)]
    pub commands: Commands,
}

/// Item definition; `name` keys into the text table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub id: i64,
    #[serde(default)]
    pub group: i64,
    pub name: TextId,
    #[serde(default)]
    pub icon: String,
}

/// System-level configuration shipped with the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    #[serde(default)]
    pub title: TextId,
    #[serde(default = "default_player_name")]
    pub player_name: String,
    #[serde(rename = "initialMapID", default)]
    pub initial_map_id: i64,
    #[serde(rename = "initialRoomID", default)]
    pub initial_room_id: i64,
    #[serde(default)]
    pub initial_x: i32,
    #[serde(default)]
    pub initial_y: i32,
    #[serde(default)]
    pub player_image: String,
    #[serde(default)]
    pub player_speed: Speed,
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_player_name() -> String {
    "You".to_string()
}

fn default_language() -> String {
    crate::texts::ENGLISH.to_string()
}

impl Default for System {
    fn default() -> Self {
        Self {
            title: TextId::default(),
            player_name: default_player_name(),
            initial_map_id: 0,
            initial_room_id: 0,
            initial_x: 0,
            initial_y: 0,
            player_image: String::new(),
            player_speed: Speed::default(),
            default_language: default_language(),
        }
    }
}

/// Top-level content bundle decoded from the asset pack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    #[serde(default)]
    pub maps: Vec<MapData>,
    #[serde(default)]
    pub common_events: Vec<CommonEvent>,
    #[serde(default)]
    pub items: Vec<ItemData>,
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<i64>>,
    #[serde(default)]
    pub texts: Texts,
    #[serde(default)]
    pub system: System,
}

impl GameData {
    pub fn map(&self, map_id: i64) -> Option<&MapData> {
        self.maps.iter().find(|m| m.id == map_id)
    }

    pub fn room(&self, map_id: i64, room_id: i64) -> Option<&Room> {
        self.map(map_id)?.rooms.iter().find(|r| r.id == room_id)
    }

    pub fn common_event(&self, id: i64) -> Option<&CommonEvent> {
        self.common_events.iter().find(|e| e.id == id)
    }

    pub fn item(&self, id: i64) -> Option<&ItemData> {
        self.items.iter().find(|i| i.id == id)
    }
}
