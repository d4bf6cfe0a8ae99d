//! Message text expansion.
//!
//! Authored text may embed escapes resolved against live game state just
//! before display:
//!
//! - `\V[n]` — value of variable `n`
//! - `\S[n]` — switch `n`, rendered `ON`/`OFF`
//! - `\N[n]` — localized name of item `n`
//! - `\P`    — the player's name

use std::sync::LazyLock;

use fable_data::GameData;
use log::warn;
use regex::{Captures, Regex};

use crate::vars::{Switches, Variables};

static ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(V|S|N)\[(\d+)\]|\\P").expect("escape pattern is valid"));

/// Expand all escapes in `text` against the current stores.
pub fn expand(
    text: &str,
    data: &GameData,
    lang: &str,
    variables: &Variables,
    switches: &Switches,
) -> String {
    ESCAPE
        .replace_all(text, |caps: &Captures| {
            let Some(kind) = caps.get(1) else {
                // bare \P
                return data.system.player_name.clone();
            };
            let id: i64 = caps[2].parse().unwrap_or(0);
            match kind.as_str() {
                "V" => variables.get(id as u32).to_string(),
                "S" => {
                    if switches.get(id as u32) { "ON" } else { "OFF" }.to_string()
                },
                "N" => match data.item(id) {
                    Some(item) => data.texts.get(item.name, lang).unwrap_or("").to_string(),
                    None => {
                        warn!("message escape \\N[{id}]: unknown item");
                        String::new()
                    },
                },
                _ => unreachable!(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fable_data::{ItemData, TextId};

    fn fixtures() -> (GameData, Variables, Switches) {
        let mut data = GameData::default();
        let name_id = TextId::new();
        data.texts.insert(name_id, "en", "Brass Key");
        data.texts.insert(name_id, "ja", "真鍮の鍵");
        data.items.push(ItemData {
            id: 7,
            group: 0,
            name: name_id,
            icon: String::new(),
        });
        data.system.player_name = "Rell".into();

        let mut variables = Variables::default();
        variables.set(3, 42);
        let mut switches = Switches::default();
        switches.set(2, true);
        (data, variables, switches)
    }

    #[test]
    fn variable_escape() {
        let (data, vars, switches) = fixtures();
        assert_eq!(expand(r"Gold: \V[3]", &data, "en", &vars, &switches), "Gold: 42");
    }

    #[test]
    fn switch_escape_renders_on_off() {
        let (data, vars, switches) = fixtures();
        assert_eq!(
            expand(r"\S[2] / \S[5]", &data, "en", &vars, &switches),
            "ON / OFF"
        );
    }

    #[test]
    fn item_name_escape_is_localized() {
        let (data, vars, switches) = fixtures();
        assert_eq!(
            expand(r"Found \N[7]!", &data, "ja", &vars, &switches),
            "Found 真鍮の鍵!"
        );
        assert_eq!(
            expand(r"Found \N[7]!", &data, "en", &vars, &switches),
            "Found Brass Key!"
        );
    }

    #[test]
    fn player_name_escape() {
        let (data, vars, switches) = fixtures();
        assert_eq!(expand(r"Hi, \P.", &data, "en", &vars, &switches), "Hi, Rell.");
    }

    #[test]
    fn unknown_item_expands_empty() {
        let (data, vars, switches) = fixtures();
        assert_eq!(expand(r"\N[99]", &data, "en", &vars, &switches), "");
    }

    #[test]
    fn plain_text_passes_through() {
        let (data, vars, switches) = fixtures();
        assert_eq!(
            expand("No escapes here", &data, "en", &vars, &switches),
            "No escapes here"
        );
    }
}
