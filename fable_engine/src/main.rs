#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Fable **
//! Headless launcher: loads the asset bundle and a save, then pumps the
//! core a few frames so load problems surface with a non-zero exit.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use fable_engine::game::{Game, NullRequester, Signal};
use fable_engine::input::Input;
use fable_engine::saves;
use fable_engine::vars::ThreadRandom;
use fable_engine::Bundle;

#[derive(Parser, Debug)]
#[command(version, about = "Fable adventure runtime")]
struct Args {
    /// Asset bundle with the game content.
    #[arg(long)]
    data: PathBuf,
    /// Save file to resume from.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Unlocked store products, one per line.
    #[arg(long)]
    purchases: Option<PathBuf>,
    /// File holding the language tag to play in.
    #[arg(long)]
    language: Option<PathBuf>,
    /// Frames to pump before exiting.
    #[arg(long, default_value_t = 60)]
    frames: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let bytes = fs::read(&args.data)
        .with_context(|| format!("reading asset bundle {}", args.data.display()))?;
    let bundle = Bundle::decode(&bytes).context("decoding asset bundle")?;
    let content = bundle
        .get(saves::DATA_KEY)
        .context("asset bundle has no game content entry")?;
    let data = saves::decode_data(content)?;
    info!(
        "loaded content: {} maps, {} items, {} bundle entries",
        data.maps.len(),
        data.items.len(),
        bundle.len()
    );

    let mut game = match &args.save {
        Some(path) => saves::load_game(path)?,
        None => Game::new(&data),
    };
    if let Some(path) = &args.purchases {
        game.purchases = saves::load_purchases(path)?;
    }
    let language = match &args.language {
        Some(path) => saves::load_language(path)?,
        None => String::new(),
    };
    game.set_language(&data, &language);
    info!("playing in {:?}", game.language());

    let mut rand = ThreadRandom;
    let mut requester = NullRequester;
    for frame in 0..args.frames {
        match game.update(&data, &Input::idle(), &mut rand, &mut requester)? {
            Signal::Continue => {}
            Signal::GotoTitle => {
                info!("script returned to title after {frame} frames");
                break;
            }
        }
    }
    info!("pumped {} frames without a fatal error", args.frames);
    Ok(())
}
