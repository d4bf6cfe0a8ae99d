//! Message, choice, and balloon windows.
//!
//! Interpreters never draw anything; they open windows here and then poll
//! [`Windows::can_proceed`] / [`Windows::has_chosen_index`] between command
//! steps. The host reads the open windows back out for rendering. Window
//! state is rebuilt by the running script after a restore, so none of this
//! is serialized.

use crate::input::Input;
use crate::ui::{Anchor, AnchorRect, Rect};
use fable_data::{BalloonType, MessagePosition};

/// Virtual screen the window layout is computed against, in pixels.
pub const SCREEN_SIZE: (f64, f64) = (320.0, 240.0);

const MESSAGE_HEIGHT: f64 = 72.0;
const MESSAGE_MARGIN: f64 = 8.0;

/// An open message window.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub rect: Rect,
    released: bool,
}

/// An open choices window. Stays up until a choice is consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Choices {
    pub items: Vec<String>,
    chosen: Option<usize>,
}

/// A balloon pinned over a speaking character.
#[derive(Debug, Clone, PartialEq)]
pub struct Balloon {
    pub text: String,
    pub balloon_type: BalloonType,
    /// Speaker tile the host draws the balloon against.
    pub x: i32,
    pub y: i32,
    /// Balloon tail points up when the speaker sits in the top half.
    pub below_speaker: bool,
    released: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Windows {
    message: Option<Message>,
    choices: Option<Choices>,
    balloon: Option<Balloon>,
    hint: Option<i64>,
    hint_released: bool,
    inventory_open: bool,
}

impl Windows {
    /// True when the interpreter may step past the command that opened
    /// the current window. Choices release through
    /// [`Windows::has_chosen_index`] instead.
    pub fn can_proceed(&self) -> bool {
        if self.choices.is_some() {
            return false;
        }
        if let Some(message) = &self.message {
            return message.released;
        }
        if let Some(balloon) = &self.balloon {
            return balloon.released;
        }
        if self.hint.is_some() {
            return self.hint_released;
        }
        true
    }

    pub fn is_busy(&self) -> bool {
        self.message.is_some()
            || self.choices.is_some()
            || self.balloon.is_some()
            || self.hint.is_some()
            || self.inventory_open
    }

    pub fn has_chosen_index(&self) -> bool {
        self.choices.as_ref().is_some_and(|c| c.chosen.is_some())
    }

    pub fn chosen_index(&self) -> Option<usize> {
        self.choices.as_ref().and_then(|c| c.chosen)
    }

    /// Opens a message at an already-resolved position. Callers resolve
    /// [`MessagePosition::Auto`] against the speaker before getting here.
    pub fn show_message(&mut self, text: String, position: MessagePosition) {
        let rect = message_rect(position);
        self.message = Some(Message {
            text,
            rect,
            released: false,
        });
    }

    pub fn show_choices(&mut self, items: Vec<String>) {
        self.choices = Some(Choices {
            items,
            chosen: None,
        });
    }

    pub fn show_balloon(
        &mut self,
        text: String,
        balloon_type: BalloonType,
        x: i32,
        y: i32,
        below_speaker: bool,
    ) {
        self.balloon = Some(Balloon {
            text,
            balloon_type,
            x,
            y,
            below_speaker,
            released: false,
        });
    }

    pub fn show_hint(&mut self, id: i64) {
        self.hint = Some(id);
        self.hint_released = false;
    }

    pub fn open_inventory(&mut self) {
        self.inventory_open = true;
    }

    pub fn close_inventory(&mut self) {
        self.inventory_open = false;
    }

    pub fn inventory_open(&self) -> bool {
        self.inventory_open
    }

    pub fn close_message(&mut self) {
        self.message = None;
    }

    pub fn close_all(&mut self) {
        self.message = None;
        self.choices = None;
        self.balloon = None;
        self.hint = None;
        self.hint_released = false;
        self.inventory_open = false;
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn choices(&self) -> Option<&Choices> {
        self.choices.as_ref()
    }

    pub fn balloon(&self) -> Option<&Balloon> {
        self.balloon.as_ref()
    }

    pub fn hint(&self) -> Option<i64> {
        self.hint
    }

    /// Feeds one frame of input. A trigger releases whichever blocking
    /// window is up; a choice input lands on the choices window.
    pub fn update(&mut self, input: &Input) {
        if let Some(choices) = &mut self.choices {
            if choices.chosen.is_none() {
                choices.chosen = input.choice;
            }
            return;
        }
        if !input.triggered {
            return;
        }
        if let Some(message) = &mut self.message {
            message.released = true;
        } else if let Some(balloon) = &mut self.balloon {
            balloon.released = true;
        } else if self.hint.is_some() {
            self.hint_released = true;
        } else if self.inventory_open {
            self.inventory_open = false;
        }
    }
}

impl Choices {
    pub fn items(&self) -> &[String] {
        &self.items
    }
}

fn message_rect(position: MessagePosition) -> Rect {
    let (w, h) = SCREEN_SIZE;
    let child = match position {
        MessagePosition::Top | MessagePosition::Auto => Rect::new(
            MESSAGE_MARGIN,
            MESSAGE_MARGIN,
            w - MESSAGE_MARGIN,
            MESSAGE_MARGIN + MESSAGE_HEIGHT,
        ),
        MessagePosition::Center => Rect::new(
            MESSAGE_MARGIN,
            (h - MESSAGE_HEIGHT) / 2.0,
            w - MESSAGE_MARGIN,
            (h + MESSAGE_HEIGHT) / 2.0,
        ),
        MessagePosition::Bottom => Rect::new(
            MESSAGE_MARGIN,
            h - MESSAGE_MARGIN - MESSAGE_HEIGHT,
            w - MESSAGE_MARGIN,
            h - MESSAGE_MARGIN,
        ),
    };
    // Pin every edge to its nearest screen edge so the window tracks
    // resizes the same way balloons do.
    let anchor = match position {
        MessagePosition::Top | MessagePosition::Auto => Anchor::new(0.0, 0.0, 1.0, 0.0),
        MessagePosition::Center => Anchor::new(0.0, 0.5, 1.0, 0.5),
        MessagePosition::Bottom => Anchor::new(0.0, 1.0, 1.0, 1.0),
    };
    AnchorRect::new(child, anchor, (w, h)).resolve(Rect::new(0.0, 0.0, w, h))
}
