//! Frame-accurate runs of whole scripts through `Game::update`.

use fable_data as fd;
use fable_engine as fe;

use fd::command::*;
use fd::{
    Command, CommandKind, Dir, Event, GameData, MapData, Page, PageTrigger, Room, TextId,
};

fn two_rooms() -> GameData {
    let mut data = GameData::default();
    data.system.initial_map_id = 1;
    data.system.initial_room_id = 1;
    data.system.initial_x = 1;
    data.system.initial_y = 1;
    let room = |id| Room {
        id,
        width: 5,
        height: 5,
        passable: vec![true; 25],
        ..Room::default()
    };
    data.maps.push(MapData {
        id: 1,
        rooms: vec![room(1), room(2)],
    });
    data
}

fn text(data: &mut GameData, n: u128, body: &str) -> TextId {
    let id = TextId(uuid::Uuid::from_u128(n));
    data.texts.insert(id, "en", body);
    id
}

fn push_script(game: &mut fe::Game, commands: Vec<Command>) {
    game.interpreters.push(fe::Interpreter::for_event(
        fe::InterpreterKind::Auto,
        -1,
        0,
        PageTrigger::Never,
        commands.into_iter().map(Some).collect(),
    ));
}

fn step(game: &mut fe::Game, data: &GameData, input: &fe::Input) {
    let mut rand = fe::ThreadRandom;
    let mut requester = fe::NullRequester;
    game.update(data, input, &mut rand, &mut requester).unwrap();
}

#[test]
fn transfer_fades_out_switches_rooms_then_fades_in() {
    let mut data = two_rooms();
    let arrival = text(&mut data, 1, "Made it");
    let mut game = fe::Game::new(&data);
    push_script(
        &mut game,
        vec![
            Command::new(CommandKind::Transfer(TransferArgs {
                room_id: 2,
                x: 2,
                y: 3,
            })),
            Command::new(CommandKind::ShowMessage(ShowMessageArgs {
                event_id: TARGET_PLAYER,
                content: arrival,
                position: MessagePosition::Bottom,
            })),
        ],
    );

    step(&mut game, &data, &fe::Input::idle());
    assert!(game.screen.is_fading());
    assert_eq!(game.map.room_id, 1);

    let mut room_frame = None;
    let mut message_frame = None;
    for frame in 2..=80 {
        step(&mut game, &data, &fe::Input::idle());
        if room_frame.is_none() && game.map.room_id == 2 {
            room_frame = Some(frame);
            assert_eq!((game.map.player.x, game.map.player.y), (2, 3));
            // The switch happens behind a fully black screen.
            assert!((game.screen.fade_rate() - 1.0).abs() < f64::EPSILON);
        }
        if message_frame.is_none() && game.windows.message().is_some() {
            message_frame = Some(frame);
        }
    }
    let room_frame = room_frame.expect("room never switched");
    let message_frame = message_frame.expect("message never shown");
    assert!(room_frame >= 30, "switched on frame {room_frame}");
    // One full fade-in separates the switch from the message.
    assert_eq!(message_frame - room_frame, 30);
    assert!(!game.screen.is_fading());
    assert_eq!(game.windows.message().unwrap().text, "Made it");
}

#[test]
fn tap_on_event_walks_over_and_runs_its_script() {
    let mut data = two_rooms();
    data.maps[0].rooms[0].events.push(Event {
        id: 7,
        x: 3,
        y: 1,
        pages: vec![Page {
            image: "npc".to_owned(),
            trigger: PageTrigger::Player,
            commands: vec![Some(Command::new(CommandKind::SetSwitch(SetSwitchArgs {
                id: 11,
                value: true,
            })))],
            ..Page::default()
        }],
    });
    let mut game = fe::Game::new(&data);

    step(&mut game, &data, &fe::Input::tap_at(3, 1));
    // The tapped event immediately turns toward the approaching player.
    assert_eq!(game.map.event(7).unwrap().character.dir, Dir::Left);
    assert!(!game.switches.get(11));

    for _ in 0..120 {
        step(&mut game, &data, &fe::Input::idle());
    }
    assert!(game.switches.get(11));
    // The event's tile blocks, so the walk stops one short and faces it.
    assert_eq!((game.map.player.x, game.map.player.y), (2, 1));
    assert_eq!(game.map.player.dir, Dir::Right);
    // Script over: the event goes back to its authored facing.
    assert_eq!(game.map.event(7).unwrap().character.dir, Dir::Down);
    assert!(game.interpreters.is_empty());
}

#[test]
fn tap_on_floor_walks_there() {
    let data = two_rooms();
    let mut game = fe::Game::new(&data);
    step(&mut game, &data, &fe::Input::tap_at(3, 3));
    for _ in 0..120 {
        step(&mut game, &data, &fe::Input::idle());
    }
    assert_eq!((game.map.player.x, game.map.player.y), (3, 3));
    assert!(game.interpreters.is_empty());
}

#[test]
fn nonblocking_route_ticks_once_per_frame() {
    let data = two_rooms();
    let mut game = fe::Game::new(&data);
    // The route's wait must elapse in real frames even while the parent
    // script burns through the rest of its commands in one burst.
    push_script(
        &mut game,
        vec![
            Command::new(CommandKind::SetRoute(SetRouteArgs {
                event_id: TARGET_PLAYER,
                repeat: false,
                skip: false,
                wait: false,
                commands: vec![
                    Some(Command::new(CommandKind::Wait(WaitArgs { time: 1 }))),
                    Some(Command::new(CommandKind::TurnCharacter(TurnCharacterArgs {
                        event_id: TARGET_SELF,
                        dir: Dir::Left,
                    }))),
                ],
            })),
            Command::new(CommandKind::SetSwitch(SetSwitchArgs { id: 1, value: true })),
            Command::new(CommandKind::SetSwitch(SetSwitchArgs { id: 2, value: true })),
        ],
    );
    step(&mut game, &data, &fe::Input::idle());
    // Parent burst is done, but the 6-frame wait is still pending.
    assert!(game.switches.get(2));
    assert_eq!(game.map.player.dir, Dir::Down);
    assert!(!game.interpreters.is_empty());

    for _ in 0..10 {
        step(&mut game, &data, &fe::Input::idle());
    }
    assert_eq!(game.map.player.dir, Dir::Left);
    assert!(game.interpreters.is_empty());
}

#[test]
fn save_mid_script_resumes_identically() {
    let data = two_rooms();
    let mut game = fe::Game::new(&data);
    push_script(
        &mut game,
        vec![
            Command::new(CommandKind::Wait(WaitArgs { time: 4 })),
            Command::new(CommandKind::SetVariable(SetVariableArgs {
                id: 5,
                op: SetVariableOp::Assign,
                value: SetVariableValue::Constant(9),
            })),
            Command::new(CommandKind::SetSwitch(SetSwitchArgs { id: 6, value: true })),
        ],
    );
    // Stop in the middle of the wait, with the interpreter in flight.
    for _ in 0..10 {
        step(&mut game, &data, &fe::Input::idle());
    }
    assert_eq!(game.variables.get(5), 0);

    let bytes = fe::saves::encode_game(&game).unwrap();
    let mut restored = fe::saves::decode_game(&bytes).unwrap();
    restored.set_language(&data, "");
    assert_eq!(restored, game);

    for _ in 0..40 {
        step(&mut game, &data, &fe::Input::idle());
        step(&mut restored, &data, &fe::Input::idle());
    }
    assert_eq!(restored, game);
    assert_eq!(game.variables.get(5), 9);
    assert!(game.switches.get(6));
    assert!(game.interpreters.is_empty());
}
