//! Content and save-game serialization.
//!
//! Saves and content both use MessagePack with map-encoded structs, so
//! the on-disk layout follows field names rather than positions and a
//! save round-trips bit-for-bit through [`Game`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use fable_data::GameData;

use crate::game::Game;
use crate::items::Purchases;

/// Bundle key the game content is stored under.
pub const DATA_KEY: &str = "data";

pub fn encode_game(game: &Game) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(game).context("encoding save")
}

pub fn decode_game(bytes: &[u8]) -> Result<Game> {
    rmp_serde::from_slice(bytes).context("decoding save")
}

pub fn decode_data(bytes: &[u8]) -> Result<GameData> {
    rmp_serde::from_slice(bytes).context("decoding game content")
}

pub fn load_game(path: &Path) -> Result<Game> {
    let bytes =
        fs::read(path).with_context(|| format!("reading save file {}", path.display()))?;
    let game = decode_game(&bytes)?;
    info!("loaded save from {}", path.display());
    Ok(game)
}

pub fn write_game(path: &Path, game: &Game) -> Result<()> {
    let bytes = encode_game(game)?;
    fs::write(path, bytes)
        .with_context(|| format!("writing save file {}", path.display()))?;
    info!("wrote save to {}", path.display());
    Ok(())
}

/// Purchases file: one product id per line, blank lines ignored.
pub fn load_purchases(path: &Path) -> Result<Purchases> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading purchases file {}", path.display()))?;
    let mut purchases = Purchases::default();
    for line in text.lines() {
        let product = line.trim();
        if !product.is_empty() {
            purchases.grant(product);
        }
    }
    Ok(purchases)
}

/// Language file: a single BCP 47 tag, surrounding whitespace ignored.
pub fn load_language(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading language file {}", path.display()))?;
    Ok(text.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fable_data::System;

    fn sample_data() -> GameData {
        GameData {
            system: System {
                initial_map_id: 1,
                initial_room_id: 1,
                ..System::default()
            },
            ..GameData::default()
        }
    }

    #[test]
    fn game_round_trips_through_messagepack() {
        let data = sample_data();
        let mut game = Game::new(&data);
        game.variables.set(3, 42);
        game.switches.set(1, true);
        game.self_switches.set(1, 1, 7, 0, true);
        game.inventory.add(9);
        let bytes = encode_game(&game).unwrap();
        let mut back = decode_game(&bytes).unwrap();
        back.set_language(&data, "");
        assert_eq!(back, game);
    }

    #[test]
    fn encoding_is_stable_across_round_trips() {
        let data = sample_data();
        let game = Game::new(&data);
        let bytes = encode_game(&game).unwrap();
        let again = encode_game(&decode_game(&bytes).unwrap()).unwrap();
        assert_eq!(bytes, again);
    }

    #[test]
    fn save_files_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slot0.sav");
        let data = sample_data();
        let mut game = Game::new(&data);
        game.variables.set(1, -5);
        write_game(&path, &game).unwrap();
        let mut back = load_game(&path).unwrap();
        back.set_language(&data, "");
        assert_eq!(back, game);
    }

    #[test]
    fn purchases_parse_one_product_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("purchases.txt");
        fs::write(&path, "hint_pack\n\n  full_game  \n").unwrap();
        let purchases = load_purchases(&path).unwrap();
        assert!(purchases.owns("hint_pack"));
        assert!(purchases.owns("full_game"));
        assert!(!purchases.owns("other"));
    }
}
