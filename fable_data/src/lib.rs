//! Shared content model for the Fable runtime.
//!
//! Everything here is immutable after load and round-trips bit-stably
//! through the MessagePack-compatible encoding used by the asset bundle
//! and the save codec.

pub mod command;
pub mod condition;
pub mod event;
pub mod id;
pub mod map;
pub mod texts;

pub use command::{
    BalloonType, CharacterProperty, Command, CommandKind, Commands, ImageValue, MessagePosition,
    MoveCharacterMotion, SetVariableValue,
};
pub use condition::{Comp, Condition, ConditionValue, ItemRequirement};
pub use event::{Dir, Event, Page, PagePriority, PageTrigger, Speed};
pub use id::TextId;
pub use map::{CommonEvent, GameData, ItemData, MapData, Room, System};
pub use texts::Texts;
