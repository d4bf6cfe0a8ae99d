//! Top-level game state and the per-frame orchestrator.
//!
//! The field order here is the save schema: everything up to
//! `interpreters` serializes, in order, into the MessagePack save blob.
//! Window state is rebuilt by the scripts that opened it, and purchases
//! and the language tag load from their own files, so those are skipped.

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

use fable_data::command::{
    CallEventArgs, MoveCharacterArgs, MoveCharacterMotion, TARGET_PLAYER,
};
use fable_data::{Command, CommandKind, GameData, PageTrigger};

use crate::gamemap::Map;
use crate::hints::Hints;
use crate::input::Input;
use crate::interpreter::{
    CondEnv, Ctx, Interpreter, InterpreterKind, Interpreters, Outbox, Requester,
};
use crate::items::{Inventory, Purchases};
use crate::path::calc_route;
use crate::pictures::Pictures;
use crate::saves;
use crate::screen::Screen;
use crate::vars::{RandomSource, SelfSwitches, Switches, Variables};
use crate::weather::Weather;
use crate::windows::Windows;

/// What the host scene loop should do after a frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Signal {
    Continue,
    /// A `goto_title` command ran; tear the play scene down.
    GotoTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub variables: Variables,
    pub switches: Switches,
    #[serde(rename = "selfSwitches")]
    pub self_switches: SelfSwitches,
    pub hints: Hints,
    pub inventory: Inventory,
    pub pictures: Pictures,
    pub screen: Screen,
    #[serde(default)]
    pub weather: Weather,
    pub map: Map,
    pub interpreters: Interpreters,
    #[serde(skip)]
    pub windows: Windows,
    #[serde(skip)]
    pub purchases: Purchases,
    #[serde(skip)]
    language: String,
}

impl Game {
    pub fn new(data: &GameData) -> Self {
        Self {
            variables: Variables::default(),
            switches: Switches::default(),
            self_switches: SelfSwitches::default(),
            hints: Hints::default(),
            inventory: Inventory::default(),
            pictures: Pictures::default(),
            screen: Screen::default(),
            map: Map::new(data),
            interpreters: Interpreters::default(),
            windows: Windows::default(),
            weather: Weather::default(),
            purchases: Purchases::default(),
            language: default_language(data),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Falls back to the content's default when `language` has no texts.
    pub fn set_language(&mut self, data: &GameData, language: &str) {
        if language.is_empty() {
            self.language = default_language(data);
        } else {
            self.language = language.to_owned();
        }
    }

    /// One 60 Hz frame.
    pub fn update(
        &mut self,
        data: &GameData,
        input: &Input,
        rand: &mut dyn RandomSource,
        requester: &mut dyn Requester,
    ) -> Result<Signal> {
        self.screen.update();
        self.weather.update();
        self.windows.update(input);

        let mut outbox = Outbox::default();
        self.refresh_events();
        self.handle_tap(data, input);

        self.map.player.update();
        self.run_kind(
            InterpreterKind::PlayerMoving,
            data,
            rand,
            requester,
            &mut outbox,
        )?;
        for event in &mut self.map.events {
            event.character.update();
        }
        self.run_kind(InterpreterKind::Auto, data, rand, requester, &mut outbox)?;
        self.run_kind(InterpreterKind::Parallel, data, rand, requester, &mut outbox)?;
        self.run_kind(
            InterpreterKind::Continuing,
            data,
            rand,
            requester,
            &mut outbox,
        )?;
        self.refresh_events();
        self.pick_auto_event();
        self.sync_parallels();

        self.pictures.update();

        if let Some(slot) = outbox.save {
            let bytes = saves::encode_game(self)?;
            requester.save(slot, &bytes)?;
        }
        if outbox.goto_title {
            return Ok(Signal::GotoTitle);
        }
        Ok(Signal::Continue)
    }

    fn refresh_events(&mut self) {
        let env = CondEnv {
            variables: &self.variables,
            switches: &self.switches,
            self_switches: &self.self_switches,
            inventory: &self.inventory,
            map_id: self.map.map_id,
            room_id: self.map.room_id,
            event_id: 0,
        };
        self.map.refresh_events(&env);
    }

    /// Updates every interpreter of `kind`, each taken out of the set for
    /// the duration of its burst. A room change cancels parallels and
    /// re-files the running interpreter as continuing.
    fn run_kind(
        &mut self,
        kind: InterpreterKind,
        data: &GameData,
        rand: &mut dyn RandomSource,
        requester: &mut dyn Requester,
        outbox: &mut Outbox,
    ) -> Result<()> {
        for mut interpreter in self.interpreters.take_all(kind) {
            let room_before = self.map.room_id;
            {
                let mut ctx = Ctx {
                    data,
                    language: &self.language,
                    variables: &mut self.variables,
                    switches: &mut self.switches,
                    self_switches: &mut self.self_switches,
                    hints: &mut self.hints,
                    inventory: &mut self.inventory,
                    purchases: &self.purchases,
                    pictures: &mut self.pictures,
                    screen: &mut self.screen,
                    windows: &mut self.windows,
                    weather: &mut self.weather,
                    map: &mut self.map,
                    rand,
                    requester,
                    outbox,
                };
                interpreter.update(&mut ctx)?;
            }
            if self.map.room_id != room_before {
                self.interpreters.clear_kind(InterpreterKind::Parallel);
                if !interpreter.is_finished() {
                    interpreter.kind = InterpreterKind::Continuing;
                }
            }
            if !interpreter.is_finished() {
                self.interpreters.push(interpreter);
            }
        }
        Ok(())
    }

    /// Turns a tap into a player route and, when it lands on an event,
    /// the event's script.
    fn handle_tap(&mut self, data: &GameData, input: &Input) {
        let Some((x, y)) = input.tap else { return };
        if self.interpreters.busy() || self.windows.is_busy() || self.screen.is_fading() {
            return;
        }
        let target = self.map.event_at(x, y).and_then(|event| {
            event
                .trigger()
                .filter(|t| matches!(t, PageTrigger::Player | PageTrigger::Action))
                .map(|t| (event.id, event.page_index.unwrap_or(0), t))
        });
        let grid = self.map.walk_grid(data, TARGET_PLAYER);
        let (px, py) = (self.map.player.x, self.map.player.y);
        match target {
            Some((event_id, page_index, PageTrigger::Action)) => {
                let adjacent = (px - x).abs() + (py - y).abs() <= 1;
                if !adjacent {
                    return;
                }
                self.push_player_program(
                    event_id,
                    vec![call_event_command(event_id, page_index)],
                );
            }
            Some((event_id, page_index, _)) => {
                let (route, _, _) = calc_route(|cx, cy| grid.at(cx, cy), (px, py), (x, y));
                if route.is_empty() {
                    return;
                }
                self.push_player_program(
                    event_id,
                    vec![
                        move_player_command(x, y),
                        call_event_command(event_id, page_index),
                    ],
                );
            }
            None => {
                if !grid.at(x, y) {
                    return;
                }
                self.push_player_program(TARGET_PLAYER, vec![move_player_command(x, y)]);
            }
        }
    }

    fn push_player_program(&mut self, event_id: i64, commands: Vec<Command>) {
        let commands = commands.into_iter().map(Some).collect();
        let mut interpreter = Interpreter::for_event(
            InterpreterKind::PlayerMoving,
            event_id,
            0,
            PageTrigger::Player,
            commands,
        );
        interpreter.allow_partial_routes();
        self.interpreters.push(interpreter);
    }

    /// Auto pages run whenever no scripted interpreter is active; they
    /// re-arm every frame until a condition flips their page away.
    fn pick_auto_event(&mut self) {
        if self.interpreters.busy() {
            return;
        }
        let Some((event_id, page_index, commands)) = self.map.events.iter().find_map(|event| {
            (event.trigger() == Some(PageTrigger::Auto))
                .then(|| {
                    event
                        .page()
                        .map(|p| (event.id, event.page_index.unwrap_or(0), p.commands.clone()))
                })
                .flatten()
        }) else {
            return;
        };
        self.interpreters.push(Interpreter::for_event(
            InterpreterKind::Auto,
            event_id,
            page_index,
            PageTrigger::Auto,
            commands,
        ));
    }

    /// Keeps one parallel interpreter alive per parallel-page event; a
    /// finished one is dropped above and re-created here, which is what
    /// makes parallel scripts loop.
    fn sync_parallels(&mut self) {
        let running = self.interpreters.parallel_event_ids();
        let mut fresh = Vec::new();
        for event in &self.map.events {
            if event.trigger() == Some(PageTrigger::Parallel) && !running.contains(&event.id) {
                if let Some(page) = event.page() {
                    fresh.push(Interpreter::for_event(
                        InterpreterKind::Parallel,
                        event.id,
                        event.page_index.unwrap_or(0),
                        PageTrigger::Parallel,
                        page.commands.clone(),
                    ));
                }
            }
        }
        for interpreter in fresh {
            self.interpreters.push(interpreter);
        }
    }
}

fn default_language(data: &GameData) -> String {
    let configured = &data.system.default_language;
    if configured.is_empty() {
        fable_data::texts::ENGLISH.to_owned()
    } else {
        configured.clone()
    }
}

fn move_player_command(x: i32, y: i32) -> Command {
    Command::new(CommandKind::MoveCharacter(MoveCharacterArgs {
        event_id: TARGET_PLAYER,
        motion: MoveCharacterMotion::Target { x, y },
    }))
}

fn call_event_command(event_id: i64, page_index: usize) -> Command {
    Command::new(CommandKind::CallEvent(CallEventArgs {
        event_id,
        page_index,
    }))
}

/// Requester that drops audio and refuses saves; for hosts that have no
/// side channel yet.
#[derive(Debug, Default)]
pub struct NullRequester;

impl Requester for NullRequester {
    fn play_se(&mut self, _name: &str, _volume: i32) {}

    fn play_bgm(&mut self, _name: &str, _volume: i32, _fade_time: u32) {}

    fn stop_bgm(&mut self, _fade_time: u32) {}

    fn save(&mut self, slot: crate::interpreter::SaveSlot, _bytes: &[u8]) -> Result<()> {
        warn!("dropping {slot:?} save: no save backend");
        Ok(())
    }
}
