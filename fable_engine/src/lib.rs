#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const FABLE_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod bundle;
pub mod character;
pub mod game;
pub mod gamemap;
pub mod hints;
pub mod input;
pub mod interpreter;
pub mod items;
pub mod iterator;
pub mod message;
pub mod movestate;
pub mod path;
pub mod pictures;
pub mod saves;
pub mod screen;
pub mod ui;
pub mod vars;
pub mod weather;
pub mod windows;

// Re-exports for convenience
pub use bundle::Bundle;
pub use character::Character;
pub use game::{Game, NullRequester, Signal};
pub use gamemap::Map;
pub use input::Input;
pub use interpreter::{Interpreter, InterpreterKind, Requester, SaveSlot};
pub use items::{Inventory, Purchases};
pub use iterator::CommandIterator;
pub use screen::Screen;
pub use vars::{RandomSource, SelfSwitches, Switches, ThreadRandom, Variables};
pub use windows::Windows;
