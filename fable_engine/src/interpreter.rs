//! Command interpreter.
//!
//! One interpreter executes one event's command list cooperatively: each
//! frame it consumes commands until one needs to wait on something
//! external, then yields until the wait clears. Nested calls and movement
//! routes run as owned sub-interpreters; everything here serializes with
//! the game so a restored save resumes mid-script.

use anyhow::Result;
use log::{error, warn};
use serde::{Deserialize, Serialize};

use fable_data::command::{SetRouteArgs, SetVariableOp, SystemValueKind, TARGET_SELF};
use fable_data::{
    CharacterProperty, Command, CommandKind, Condition, ConditionValue, Dir, GameData, ImageValue,
    ItemRequirement, MessagePosition, PageTrigger, SetVariableValue, Speed, TextId,
};

use crate::character::Character;
use crate::gamemap::Map;
use crate::hints::Hints;
use crate::items::{Inventory, Purchases};
use crate::iterator::CommandIterator;
use crate::message;
use crate::movestate::MoveCharacterState;
use crate::pictures::Pictures;
use crate::screen::{Screen, Tint};
use crate::vars::{random_value, RandomSource, SelfSwitches, Switches, Variables};
use crate::weather::Weather;
use crate::windows::Windows;

/// Frames for each half of a room transfer fade.
pub const TRANSFER_FADE_FRAMES: u32 = 30;

/// Which slot an interpreter occupies in the per-frame update order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpreterKind {
    PlayerMoving,
    Auto,
    Parallel,
    /// Survives a room transfer to finish its script in the new room.
    Continuing,
}

/// Save destination requested by a `save` / `autosave` command.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveSlot {
    Manual,
    Auto,
}

/// Host services the core calls out to. Audio is fire-and-forget; save
/// hands off serialized bytes after the frame's burst completes.
pub trait Requester {
    fn play_se(&mut self, name: &str, volume: i32);
    fn play_bgm(&mut self, name: &str, volume: i32, fade_time: u32);
    fn stop_bgm(&mut self, fade_time: u32);
    fn save(&mut self, slot: SaveSlot, bytes: &[u8]) -> Result<()>;
}

/// Requests that must be acted on after the interpreter burst, once the
/// game is no longer mutably borrowed.
#[derive(Debug, Default)]
pub struct Outbox {
    pub save: Option<SaveSlot>,
    pub goto_title: bool,
}

/// Everything a command can touch, borrowed for one interpreter update.
pub struct Ctx<'a> {
    pub data: &'a GameData,
    pub language: &'a str,
    pub variables: &'a mut Variables,
    pub switches: &'a mut Switches,
    pub self_switches: &'a mut SelfSwitches,
    pub hints: &'a mut Hints,
    pub inventory: &'a mut Inventory,
    pub purchases: &'a Purchases,
    pub pictures: &'a mut Pictures,
    pub screen: &'a mut Screen,
    pub windows: &'a mut Windows,
    pub weather: &'a mut Weather,
    pub map: &'a mut Map,
    pub rand: &'a mut dyn RandomSource,
    pub requester: &'a mut dyn Requester,
    pub outbox: &'a mut Outbox,
}

/// Read-only view for condition tests, also used by event page selection.
#[derive(Clone, Copy)]
pub struct CondEnv<'a> {
    pub variables: &'a Variables,
    pub switches: &'a Switches,
    pub self_switches: &'a SelfSwitches,
    pub inventory: &'a Inventory,
    pub map_id: i64,
    pub room_id: i64,
    pub event_id: i64,
}

pub fn eval_condition(condition: &Condition, env: &CondEnv) -> bool {
    match condition {
        Condition::Switch { id, value } => env.switches.get(*id) == *value,
        Condition::SelfSwitch { id, value } => {
            env.self_switches
                .get(env.map_id, env.room_id, env.event_id, *id)
                == *value
        }
        Condition::Variable { id, comp, value } => {
            let lhs = env.variables.get(*id);
            let rhs = match value {
                ConditionValue::Constant(n) => *n,
                ConditionValue::Variable(id) => env.variables.get(*id),
            };
            comp.eval(lhs, rhs)
        }
        Condition::Item { id, requirement } => match requirement {
            ItemRequirement::Owned => env.inventory.owns(*id),
            ItemRequirement::NotOwned => !env.inventory.owns(*id),
            ItemRequirement::Active => env.inventory.active_item() == *id,
        },
        Condition::Special { raw } => {
            warn!("unsupported special condition {raw:?}");
            false
        }
    }
}

/// What a mid-flight command is waiting on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Waiting {
    Message,
    Choices,
    Transfer {
        #[serde(rename = "roomID")]
        room_id: i64,
        x: i32,
        y: i32,
        transferred: bool,
    },
    Tint,
    Shake,
    Picture(u32),
    Inventory,
}

/// Whether the burst keeps consuming commands this frame.
enum Flow {
    Continue,
    Yield,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpreter {
    pub kind: InterpreterKind,
    /// Event the script belongs to; `-1` when it drives the player.
    #[serde(rename = "eventID")]
    pub event_id: i64,
    #[serde(default)]
    pub page_index: usize,
    trigger: PageTrigger,
    iterator: Option<CommandIterator>,
    started: bool,
    waiting_count: u32,
    waiting: Option<Waiting>,
    sub: Option<Box<Interpreter>>,
    sub_blocks: bool,
    move_state: Option<MoveCharacterState>,
    move_target: i64,
    route_skip: bool,
    repeat_route: bool,
    original_dir: Option<Dir>,
}

impl Interpreter {
    pub fn for_event(
        kind: InterpreterKind,
        event_id: i64,
        page_index: usize,
        trigger: PageTrigger,
        commands: Vec<Option<Command>>,
    ) -> Self {
        Self {
            kind,
            event_id,
            page_index,
            trigger,
            iterator: Some(CommandIterator::new(commands)),
            started: false,
            waiting_count: 0,
            waiting: None,
            sub: None,
            sub_blocks: false,
            move_state: None,
            move_target: TARGET_SELF,
            route_skip: false,
            repeat_route: false,
            original_dir: None,
        }
    }

    /// Sub-interpreter for a movement route. Self-targeted commands in
    /// the route resolve against `target`.
    fn for_route(kind: InterpreterKind, target: i64, args: &SetRouteArgs) -> Self {
        let mut it = Self::for_event(
            kind,
            target,
            0,
            PageTrigger::Never,
            args.commands.clone(),
        );
        it.started = true;
        it.route_skip = args.skip;
        it.repeat_route = args.repeat;
        it
    }

    /// Lets `move_character` orders settle for a partial route instead
    /// of refusing, the behavior tap-to-walk wants.
    pub fn allow_partial_routes(&mut self) {
        self.route_skip = true;
    }

    /// Idle means no script is loaded; the slot can be dropped or reused.
    pub fn is_finished(&self) -> bool {
        self.iterator.is_none()
    }

    /// Runs one burst of commands. Returns only on fatal errors; anything
    /// recoverable is logged and skipped.
    pub fn update(&mut self, ctx: &mut Ctx) -> Result<()> {
        if self.iterator.is_none() {
            return Ok(());
        }
        if !self.started {
            self.start_event(ctx);
            self.started = true;
        }
        // Pending sub and movement work drains before the termination
        // check, so a script whose last command spawned either still
        // completes it. A non-blocking sub ticks at most once per frame.
        let mut sub_ran = false;
        loop {
            if let Some(sub) = &mut self.sub {
                if !sub_ran {
                    sub.update(ctx)?;
                    sub_ran = true;
                }
                if sub.is_finished() {
                    self.sub = None;
                    continue;
                }
                if self.sub_blocks {
                    return Ok(());
                }
            }
            if self.move_state.is_some() {
                self.update_move_state(ctx);
                if self
                    .move_state
                    .as_ref()
                    .is_some_and(MoveCharacterState::is_terminated)
                {
                    self.move_state = None;
                    continue;
                }
                return Ok(());
            }
            if self.iterator.as_ref().is_none_or(|it| it.is_terminated()) {
                if self.repeat_route {
                    self.rewind();
                    continue;
                }
                if self.sub.is_some() || ctx.windows.is_busy() {
                    return Ok(());
                }
                self.finish(ctx);
                return Ok(());
            }
            if let Some(waiting) = self.waiting.clone() {
                match self.resume(waiting, ctx) {
                    Flow::Continue => continue,
                    Flow::Yield => return Ok(()),
                }
            }
            if self.waiting_count > 0 {
                self.waiting_count -= 1;
                if self.waiting_count > 0 {
                    return Ok(());
                }
                continue;
            }
            if !ctx.windows.can_proceed() {
                return Ok(());
            }
            let Some(command) = self.current_command() else {
                self.advance();
                continue;
            };
            match self.dispatch(&command, ctx)? {
                Flow::Continue => {}
                Flow::Yield => return Ok(()),
            }
        }
    }

    fn current_command(&self) -> Option<Command> {
        self.iterator.as_ref().and_then(|it| it.command()).cloned()
    }

    fn advance(&mut self) {
        if let Some(it) = &mut self.iterator {
            it.advance();
        }
    }

    fn choose(&mut self, index: usize) {
        if let Some(it) = &mut self.iterator {
            it.choose(index);
        }
    }

    fn rewind(&mut self) {
        if let Some(it) = &mut self.iterator {
            it.rewind();
        }
    }

    /// Turns the event toward the player when it was triggered by a tap,
    /// remembering the old facing for [`Interpreter::finish`].
    fn start_event(&mut self, ctx: &mut Ctx) {
        if !matches!(self.trigger, PageTrigger::Player | PageTrigger::Action) {
            return;
        }
        let (px, py) = (ctx.map.player.x, ctx.map.player.y);
        if let Some(character) = ctx.map.character_mut(self.event_id) {
            self.original_dir = Some(character.dir);
            if let Some(dir) = facing_toward(character, (px, py)) {
                character.turn(dir);
            }
        }
    }

    fn finish(&mut self, ctx: &mut Ctx) {
        ctx.windows.close_all();
        if let Some(dir) = self.original_dir.take() {
            if let Some(character) = ctx.map.character_mut(self.event_id) {
                character.turn(dir);
            }
        }
        self.iterator = None;
        self.started = false;
    }

    fn resume(&mut self, waiting: Waiting, ctx: &mut Ctx) -> Flow {
        match waiting {
            Waiting::Message => {
                if !ctx.windows.can_proceed() {
                    return Flow::Yield;
                }
                self.advance();
                let next_is_choices = matches!(
                    self.current_command().map(|c| c.kind),
                    Some(CommandKind::ShowChoices(_))
                );
                if !next_is_choices {
                    ctx.windows.close_all();
                }
                self.waiting = None;
                Flow::Continue
            }
            Waiting::Choices => match ctx.windows.chosen_index() {
                Some(index) => {
                    ctx.windows.close_all();
                    self.choose(index);
                    self.waiting = None;
                    Flow::Continue
                }
                None => Flow::Yield,
            },
            Waiting::Transfer {
                room_id,
                x,
                y,
                transferred,
            } => {
                if !transferred {
                    if ctx.screen.is_faded_out() {
                        ctx.map.transfer_player_immediately(ctx.data, room_id, x, y);
                        ctx.screen.fade_in(TRANSFER_FADE_FRAMES);
                        self.waiting = Some(Waiting::Transfer {
                            room_id,
                            x,
                            y,
                            transferred: true,
                        });
                    }
                    return Flow::Yield;
                }
                if ctx.screen.is_fading() {
                    return Flow::Yield;
                }
                self.advance();
                self.waiting = None;
                Flow::Continue
            }
            Waiting::Tint => self.resume_when(!ctx.screen.is_changing_tint()),
            Waiting::Shake => self.resume_when(!ctx.screen.is_shaking()),
            Waiting::Picture(id) => self.resume_when(!ctx.pictures.is_animating(id)),
            Waiting::Inventory => self.resume_when(!ctx.windows.inventory_open()),
        }
    }

    fn resume_when(&mut self, done: bool) -> Flow {
        if done {
            self.advance();
            self.waiting = None;
            Flow::Continue
        } else {
            Flow::Yield
        }
    }

    /// Absolute character target for an authored event id.
    fn resolve_target(&self, event_id: i64) -> i64 {
        if event_id == TARGET_SELF {
            self.event_id
        } else {
            event_id
        }
    }

    fn cond_env<'a>(&self, ctx: &'a Ctx) -> CondEnv<'a> {
        CondEnv {
            variables: ctx.variables,
            switches: ctx.switches,
            self_switches: ctx.self_switches,
            inventory: ctx.inventory,
            map_id: ctx.map.map_id,
            room_id: ctx.map.room_id,
            event_id: self.event_id,
        }
    }

    fn update_move_state(&mut self, ctx: &mut Ctx) {
        let target = self.move_target;
        let grid = ctx.map.walk_grid(ctx.data, target);
        let player = (ctx.map.player.x, ctx.map.player.y);
        let Some(character) = ctx.map.character_mut(target) else {
            self.move_state = None;
            return;
        };
        if let Some(state) = &mut self.move_state {
            state.update(character, player, |x, y| grid.at(x, y), &mut *ctx.rand);
        }
    }

    fn resolve_text(&self, id: TextId, ctx: &Ctx) -> String {
        let Some(text) = ctx.data.texts.get(id, ctx.language) else {
            warn!("missing text {id:?}");
            return String::new();
        };
        message::expand(text, ctx.data, ctx.language, ctx.variables, ctx.switches)
    }

    /// Message slot for a speaker standing at `y`: below when the
    /// speaker is in the top half of the room, above otherwise.
    fn auto_position(&self, speaker: i64, ctx: &Ctx) -> MessagePosition {
        let (_, height) = ctx.map.room_size(ctx.data);
        let y = ctx
            .map
            .character(self.resolve_target(speaker))
            .map_or(0, |c| c.y);
        if y < height / 2 {
            MessagePosition::Bottom
        } else {
            MessagePosition::Top
        }
    }

    fn dispatch(&mut self, command: &Command, ctx: &mut Ctx) -> Result<Flow> {
        match &command.kind {
            CommandKind::Nop(_)
            | CommandKind::Label(_)
            | CommandKind::Memo(_)
            | CommandKind::Group(_) => {
                self.advance();
            }
            CommandKind::If(args) => {
                let env = self.cond_env(ctx);
                let matched = args.conditions.iter().all(|c| eval_condition(c, &env));
                if matched {
                    self.choose(0);
                } else if command.branch_count() >= 2 {
                    self.choose(1);
                } else {
                    self.advance();
                }
            }
            CommandKind::Goto(args) => {
                let jumped = self
                    .iterator
                    .as_mut()
                    .is_some_and(|it| it.goto(&args.label));
                if !jumped {
                    error!("goto: no label {:?}", args.label);
                    self.advance();
                }
            }
            CommandKind::CallEvent(args) => {
                let target = self.resolve_target(args.event_id);
                let commands = ctx
                    .map
                    .event(target)
                    .and_then(|e| e.pages.get(args.page_index))
                    .map(|p| p.commands.clone());
                self.advance();
                match commands {
                    Some(commands) => {
                        self.sub = Some(Box::new(Self::for_event(
                            self.kind,
                            target,
                            args.page_index,
                            self.trigger,
                            commands,
                        )));
                        self.sub_blocks = true;
                    }
                    None => warn!("call_event: no event {target} page {}", args.page_index),
                }
            }
            CommandKind::CallCommonEvent(args) => {
                let commands = ctx
                    .data
                    .common_event(args.event_id)
                    .map(|e| e.commands.clone());
                self.advance();
                match commands {
                    Some(commands) => {
                        let mut sub =
                            Self::for_event(self.kind, self.event_id, 0, self.trigger, commands);
                        sub.started = true;
                        self.sub = Some(Box::new(sub));
                        self.sub_blocks = true;
                    }
                    None => warn!("call_common_event: no common event {}", args.event_id),
                }
            }
            CommandKind::Wait(args) => {
                self.waiting_count = args.time * 6;
                self.advance();
                if self.waiting_count > 0 {
                    return Ok(Flow::Yield);
                }
            }
            CommandKind::ShowMessage(args) => {
                let text = self.resolve_text(args.content, ctx);
                let position = match args.position {
                    MessagePosition::Auto => self.auto_position(args.event_id, ctx),
                    other => other,
                };
                ctx.windows.show_message(text, position);
                self.waiting = Some(Waiting::Message);
                return Ok(Flow::Yield);
            }
            CommandKind::ShowBalloon(args) => {
                let text = self.resolve_text(args.content, ctx);
                let (_, height) = ctx.map.room_size(ctx.data);
                let target = self.resolve_target(args.event_id);
                let (x, y) = ctx.map.character(target).map_or((0, 0), |c| (c.x, c.y));
                ctx.windows
                    .show_balloon(text, args.balloon_type, x, y, y < height / 2);
                self.waiting = Some(Waiting::Message);
                return Ok(Flow::Yield);
            }
            CommandKind::ShowChoices(args) => {
                let items = args
                    .choices
                    .iter()
                    .map(|id| self.resolve_text(*id, ctx))
                    .collect();
                ctx.windows.show_choices(items);
                self.waiting = Some(Waiting::Choices);
                return Ok(Flow::Yield);
            }
            CommandKind::ShowHint(args) => {
                ctx.windows.show_hint(args.id);
                self.waiting = Some(Waiting::Message);
                return Ok(Flow::Yield);
            }
            CommandKind::ControlHint(args) => {
                match args.command {
                    fable_data::command::HintCommand::Read => ctx.hints.mark_read(args.id),
                    fable_data::command::HintCommand::Complete => ctx.hints.complete(args.id),
                }
                self.advance();
            }
            CommandKind::SetSwitch(args) => {
                ctx.switches.set(args.id, args.value);
                self.advance();
            }
            CommandKind::SetSelfSwitch(args) => {
                ctx.self_switches.set(
                    ctx.map.map_id,
                    ctx.map.room_id,
                    self.event_id,
                    args.id,
                    args.value,
                );
                self.advance();
            }
            CommandKind::SetVariable(args) => {
                let rhs = self.resolve_value(&args.value, ctx);
                let lhs = ctx.variables.get(args.id);
                ctx.variables.set(args.id, combine(args.op, lhs, rhs));
                self.advance();
            }
            CommandKind::Transfer(args) => {
                ctx.screen.fade_out(TRANSFER_FADE_FRAMES);
                self.waiting = Some(Waiting::Transfer {
                    room_id: args.room_id,
                    x: args.x,
                    y: args.y,
                    transferred: false,
                });
                return Ok(Flow::Yield);
            }
            CommandKind::SetRoute(args) => {
                let target = self.resolve_target(args.event_id);
                self.advance();
                self.sub = Some(Box::new(Self::for_route(self.kind, target, args)));
                self.sub_blocks = args.wait;
            }
            CommandKind::TintScreen(args) => {
                let target = Tint {
                    red: args.red,
                    green: args.green,
                    blue: args.blue,
                    gray: args.gray,
                };
                ctx.screen.start_tint(target, args.time * 6);
                if args.wait {
                    self.waiting = Some(Waiting::Tint);
                    return Ok(Flow::Yield);
                }
                self.advance();
            }
            CommandKind::Shake(args) => {
                ctx.screen
                    .start_shake(args.power, args.speed, args.time * 6, args.direction);
                if args.wait {
                    self.waiting = Some(Waiting::Shake);
                    return Ok(Flow::Yield);
                }
                self.advance();
            }
            CommandKind::Weather(args) => {
                ctx.weather.set(args.weather_type, args.power);
                self.advance();
            }
            CommandKind::PlaySe(args) => {
                ctx.requester.play_se(&args.name, args.volume);
                self.advance();
            }
            CommandKind::PlayBgm(args) => {
                ctx.requester
                    .play_bgm(&args.name, args.volume, args.fade_time);
                self.advance();
            }
            CommandKind::StopBgm(args) => {
                ctx.requester.stop_bgm(args.fade_time);
                self.advance();
            }
            CommandKind::Save(_) => {
                ctx.outbox.save = Some(SaveSlot::Manual);
                self.advance();
                return Ok(Flow::Yield);
            }
            CommandKind::Autosave(_) => {
                ctx.outbox.save = Some(SaveSlot::Auto);
                self.advance();
                return Ok(Flow::Yield);
            }
            CommandKind::GotoTitle(_) => {
                ctx.outbox.goto_title = true;
                self.advance();
                return Ok(Flow::Yield);
            }
            CommandKind::MoveCharacter(args) => {
                let target = self.resolve_target(args.event_id);
                let grid = ctx.map.walk_grid(ctx.data, target);
                self.advance();
                let Some(character) = ctx.map.character(target) else {
                    warn!("move_character: no character {target}");
                    return Ok(Flow::Continue);
                };
                match MoveCharacterState::new(&args.motion, self.route_skip, character, |x, y| {
                    grid.at(x, y)
                }) {
                    Some(state) => {
                        self.move_state = Some(state);
                        self.move_target = target;
                    }
                    None => warn!("move_character: target unreachable for {target}"),
                }
            }
            CommandKind::TurnCharacter(args) => {
                self.with_character(ctx, args.event_id, |c| c.turn(args.dir));
                self.advance();
            }
            CommandKind::RotateCharacter(args) => {
                let quarters = args.angle.div_euclid(90);
                self.with_character(ctx, args.event_id, |c| {
                    let dir = c.dir.rotated(quarters);
                    c.turn(dir);
                });
                self.advance();
            }
            CommandKind::SetCharacterProperty(args) => {
                let property = args.property.clone();
                self.with_character(ctx, args.event_id, |c| match property {
                    CharacterProperty::Visibility(v) => c.visible = v,
                    CharacterProperty::Dir(dir) => c.turn(dir),
                    CharacterProperty::DirFix(v) => c.dir_fix = v,
                    CharacterProperty::Stepping(v) => c.stepping = v,
                    CharacterProperty::Through(v) => c.through = v,
                    CharacterProperty::Walking(v) => c.walking = v,
                    CharacterProperty::Speed(s) => c.speed = s,
                });
                self.advance();
            }
            CommandKind::SetCharacterImage(args) => {
                let name = image_name(&args.image);
                let index = args.image_index;
                self.with_character(ctx, args.event_id, |c| {
                    c.image_name = name;
                    c.image_index = index;
                });
                self.advance();
            }
            CommandKind::SetCharacterOpacity(args) => {
                let opacity = args.opacity;
                self.with_character(ctx, args.event_id, |c| c.opacity = opacity);
                self.advance();
            }
            CommandKind::AddItem(args) => {
                ctx.inventory.add(args.id);
                self.advance();
            }
            CommandKind::RemoveItem(args) => {
                ctx.inventory.remove(args.id);
                self.advance();
            }
            CommandKind::ReplaceItem(args) => {
                ctx.inventory.replace(args.id, args.replace_id);
                self.advance();
            }
            CommandKind::ShowItem(args) => {
                ctx.inventory.show(args.id);
                self.advance();
            }
            CommandKind::HideItem(args) => {
                ctx.inventory.hide(args.id);
                self.advance();
            }
            CommandKind::ShowInventory(args) => {
                ctx.windows.open_inventory();
                if args.wait {
                    self.waiting = Some(Waiting::Inventory);
                    return Ok(Flow::Yield);
                }
                self.advance();
            }
            CommandKind::HideInventory(_) => {
                ctx.windows.close_inventory();
                self.advance();
            }
            CommandKind::ShowPicture(args) => {
                ctx.pictures.show(args);
                self.advance();
            }
            CommandKind::ErasePicture(args) => {
                ctx.pictures.erase(args.id);
                self.advance();
            }
            CommandKind::MovePicture(args) => {
                ctx.pictures.move_to(args.id, args.x, args.y, args.time * 6);
                if args.wait {
                    self.waiting = Some(Waiting::Picture(args.id));
                    return Ok(Flow::Yield);
                }
                self.advance();
            }
            CommandKind::ScalePicture(args) => {
                ctx.pictures
                    .scale_to(args.id, args.scale_x, args.scale_y, args.time * 6);
                if args.wait {
                    self.waiting = Some(Waiting::Picture(args.id));
                    return Ok(Flow::Yield);
                }
                self.advance();
            }
            CommandKind::RotatePicture(args) => {
                ctx.pictures.rotate_to(args.id, args.angle, args.time * 6);
                if args.wait {
                    self.waiting = Some(Waiting::Picture(args.id));
                    return Ok(Flow::Yield);
                }
                self.advance();
            }
            CommandKind::FadePicture(args) => {
                ctx.pictures.fade_to(args.id, args.opacity, args.time * 6);
                if args.wait {
                    self.waiting = Some(Waiting::Picture(args.id));
                    return Ok(Flow::Yield);
                }
                self.advance();
            }
            CommandKind::TintPicture(args) => {
                let tint = Tint {
                    red: args.red,
                    green: args.green,
                    blue: args.blue,
                    gray: args.gray,
                };
                ctx.pictures.tint_to(args.id, tint, args.time * 6);
                if args.wait {
                    self.waiting = Some(Waiting::Picture(args.id));
                    return Ok(Flow::Yield);
                }
                self.advance();
            }
            CommandKind::ChangePictureImage(args) => {
                ctx.pictures.change_image(args.id, &args.image);
                self.advance();
            }
            CommandKind::ChangeBackground(args) => {
                ctx.map.background = Some(image_name(&args.image));
                self.advance();
            }
            CommandKind::ChangeForeground(args) => {
                ctx.map.foreground = Some(image_name(&args.image));
                self.advance();
            }
            CommandKind::EraseEvent(_) => {
                ctx.map.erase_event(self.event_id);
                self.advance();
            }
        }
        Ok(Flow::Continue)
    }

    fn with_character<F>(&self, ctx: &mut Ctx, event_id: i64, f: F)
    where
        F: FnOnce(&mut Character),
    {
        let target = self.resolve_target(event_id);
        match ctx.map.character_mut(target) {
            Some(character) => f(character),
            None => warn!("no character {target}"),
        }
    }

    fn resolve_value(&self, value: &SetVariableValue, ctx: &mut Ctx) -> i64 {
        match value {
            SetVariableValue::Constant(n) => *n,
            SetVariableValue::Variable(id) => ctx.variables.get(*id),
            SetVariableValue::VariableRef(id) => {
                let indirect = ctx.variables.get(*id);
                ctx.variables.get(indirect as u32)
            }
            SetVariableValue::Switch(id) => i64::from(ctx.switches.get(*id)),
            SetVariableValue::SwitchRef(id) => {
                let indirect = ctx.variables.get(*id);
                i64::from(ctx.switches.get(indirect as u32))
            }
            SetVariableValue::Random { begin, end } => random_value(&mut *ctx.rand, *begin, *end),
            SetVariableValue::Character { kind, event_id } => {
                let target = self.resolve_target(*event_id);
                let Some(character) = ctx.map.character(target) else {
                    warn!("set_variable: no character {target}");
                    return 0;
                };
                match kind {
                    fable_data::command::CharacterValueKind::X => i64::from(character.x),
                    fable_data::command::CharacterValueKind::Y => i64::from(character.y),
                    fable_data::command::CharacterValueKind::Direction => {
                        dir_index(character.dir)
                    }
                    fable_data::command::CharacterValueKind::Speed => speed_index(character.speed),
                }
            }
            SetVariableValue::ItemGroup { kind, group } => {
                let in_group =
                    |id: &i64| ctx.data.item(*id).is_some_and(|item| item.group == *group);
                match kind {
                    fable_data::command::ItemGroupValueKind::Owned => {
                        ctx.inventory.items().iter().filter(|id| in_group(id)).count() as i64
                    }
                    fable_data::command::ItemGroupValueKind::Total => {
                        ctx.data.items.iter().filter(|i| i.group == *group).count() as i64
                    }
                }
            }
            SetVariableValue::IapProduct(product) => i64::from(ctx.purchases.owns(product)),
            SetVariableValue::System { kind } => match kind {
                SystemValueKind::HintCount => ctx.hints.completed_count(),
                SystemValueKind::ActiveItem => ctx.inventory.active_item(),
                SystemValueKind::RoomId => ctx.map.room_id,
            },
            SetVariableValue::Table {
                name,
                index_variable,
            } => {
                let index = ctx.variables.get(*index_variable);
                match ctx
                    .data
                    .tables
                    .get(name)
                    .and_then(|t| usize::try_from(index).ok().and_then(|i| t.get(i)))
                {
                    Some(value) => *value,
                    None => {
                        warn!("set_variable: no table entry {name:?}[{index}]");
                        0
                    }
                }
            }
        }
    }
}

fn combine(op: SetVariableOp, lhs: i64, rhs: i64) -> i64 {
    match op {
        SetVariableOp::Assign => rhs,
        SetVariableOp::Add => lhs.wrapping_add(rhs),
        SetVariableOp::Sub => lhs.wrapping_sub(rhs),
        SetVariableOp::Mul => lhs.wrapping_mul(rhs),
        SetVariableOp::Div => {
            if rhs == 0 {
                warn!("set_variable: division by zero");
                lhs
            } else {
                lhs.wrapping_div(rhs)
            }
        }
        SetVariableOp::Mod => {
            if rhs == 0 {
                warn!("set_variable: modulo by zero");
                lhs
            } else {
                lhs.wrapping_rem(rhs)
            }
        }
    }
}

fn image_name(image: &ImageValue) -> String {
    match image {
        ImageValue::Name(name) => name.clone(),
        ImageValue::Uuid(id) => id.0.to_string(),
    }
}

fn dir_index(dir: Dir) -> i64 {
    match dir {
        Dir::Up => 0,
        Dir::Right => 1,
        Dir::Down => 2,
        Dir::Left => 3,
    }
}

fn speed_index(speed: Speed) -> i64 {
    match speed {
        Speed::Slowest => 0,
        Speed::Slower => 1,
        Speed::Normal => 2,
        Speed::Faster => 3,
        Speed::Fastest => 4,
    }
}

/// Turn direction for a character looking at `target`, dominant axis
/// first. `None` when they share a tile.
fn facing_toward(character: &Character, target: (i32, i32)) -> Option<Dir> {
    let dx = target.0 - character.x;
    let dy = target.1 - character.y;
    if dx == 0 && dy == 0 {
        return None;
    }
    Some(if dx.abs() >= dy.abs() {
        if dx > 0 { Dir::Right } else { Dir::Left }
    } else if dy > 0 {
        Dir::Down
    } else {
        Dir::Up
    })
}

/// The top-level interpreter slots, serialized as one flat list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Interpreters {
    entries: Vec<Interpreter>,
}

impl Interpreters {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn push(&mut self, interpreter: Interpreter) {
        self.entries.push(interpreter);
    }

    pub fn has(&self, kind: InterpreterKind) -> bool {
        self.entries.iter().any(|i| i.kind == kind)
    }

    pub fn take_first(&mut self, kind: InterpreterKind) -> Option<Interpreter> {
        let at = self.entries.iter().position(|i| i.kind == kind)?;
        Some(self.entries.remove(at))
    }

    pub fn take_all(&mut self, kind: InterpreterKind) -> Vec<Interpreter> {
        let mut taken = Vec::new();
        let mut kept = Vec::new();
        for entry in self.entries.drain(..) {
            if entry.kind == kind {
                taken.push(entry);
            } else {
                kept.push(entry);
            }
        }
        self.entries = kept;
        taken
    }

    pub fn clear_kind(&mut self, kind: InterpreterKind) {
        self.entries.retain(|i| i.kind != kind);
    }

    pub fn parallel_event_ids(&self) -> Vec<i64> {
        self.entries
            .iter()
            .filter(|i| i.kind == InterpreterKind::Parallel)
            .map(|i| i.event_id)
            .collect()
    }

    /// Anything that blocks tap triggering: an active scripted event or
    /// a player route in flight.
    pub fn busy(&self) -> bool {
        self.entries.iter().any(|i| {
            matches!(
                i.kind,
                InterpreterKind::Auto | InterpreterKind::PlayerMoving | InterpreterKind::Continuing
            )
        })
    }
}
