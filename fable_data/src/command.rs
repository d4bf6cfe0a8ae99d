//! The command tree.
//!
//! Event scripts are trees of [`Command`]s. Each command encodes as a map
//! with exactly the keys `name`, `args`, `branches`, `isFolded` in that
//! order; the shape of `args` is selected by `name`. Commands whose args
//! carry a variant value hold a second discriminator (`valueType`, `type`
//! or `imageValueType`) ahead of the payload. Nil branches, nil branch
//! lists and nil commands survive a round trip unchanged.

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::event::{Dir, Speed};
use crate::id::TextId;

/// A straight-line command list; entries may be nil placeholders.
pub type Commands = Vec<Option<Command>>;

/// Branch lists under a command; every level may be nil.
pub type Branches = Option<Vec<Option<Commands>>>;

/// One node of the command tree. Immutable after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(flatten)]
    pub kind: CommandKind,
    #[serde(default)]
    pub branches: Branches,
    #[serde(rename = "isFolded", default)]
    pub folded: bool,
}

impl Command {
    /// A command with no branches, the common case.
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            branches: None,
            folded: false,
        }
    }

    /// A command with the given branch lists.
    pub fn with_branches(kind: CommandKind, branches: Vec<Option<Commands>>) -> Self {
        Self {
            kind,
            branches: Some(branches),
            folded: false,
        }
    }

    /// Number of branch lists (nil lists count).
    pub fn branch_count(&self) -> usize {
        self.branches.as_ref().map_or(0, Vec::len)
    }

    /// The commands of branch `index`, empty for nil or missing branches.
    pub fn branch(&self, index: usize) -> &[Option<Command>] {
        self.branches
            .as_ref()
            .and_then(|b| b.get(index))
            .and_then(|b| b.as_deref())
            .unwrap_or(&[])
    }
}

/// Command payloads, discriminated by the serialized `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "args", rename_all = "snake_case")]
pub enum CommandKind {
    Nop(NopArgs),
    If(IfArgs),
    Label(LabelArgs),
    Goto(GotoArgs),
    CallEvent(CallEventArgs),
    CallCommonEvent(CallCommonEventArgs),
    Wait(WaitArgs),
    ShowBalloon(ShowBalloonArgs),
    ShowMessage(ShowMessageArgs),
    ShowHint(ShowHintArgs),
    ControlHint(ControlHintArgs),
    ShowChoices(ShowChoicesArgs),
    SetSwitch(SetSwitchArgs),
    SetSelfSwitch(SetSelfSwitchArgs),
    SetVariable(SetVariableArgs),
    Transfer(TransferArgs),
    SetRoute(SetRouteArgs),
    TintScreen(TintScreenArgs),
    Shake(ShakeArgs),
    Weather(WeatherArgs),
    PlaySe(PlaySeArgs),
    PlayBgm(PlayBgmArgs),
    StopBgm(StopBgmArgs),
    Save(SaveArgs),
    Autosave(AutosaveArgs),
    GotoTitle(GotoTitleArgs),
    MoveCharacter(MoveCharacterArgs),
    TurnCharacter(TurnCharacterArgs),
    RotateCharacter(RotateCharacterArgs),
    SetCharacterProperty(SetCharacterPropertyArgs),
    SetCharacterImage(SetCharacterImageArgs),
    SetCharacterOpacity(SetCharacterOpacityArgs),
    AddItem(AddItemArgs),
    RemoveItem(RemoveItemArgs),
    ReplaceItem(ReplaceItemArgs),
    ShowItem(ShowItemArgs),
    HideItem(HideItemArgs),
    ShowInventory(ShowInventoryArgs),
    HideInventory(HideInventoryArgs),
    ShowPicture(ShowPictureArgs),
    ErasePicture(ErasePictureArgs),
    MovePicture(MovePictureArgs),
    ScalePicture(ScalePictureArgs),
    RotatePicture(RotatePictureArgs),
    FadePicture(FadePictureArgs),
    TintPicture(TintPictureArgs),
    ChangePictureImage(ChangePictureImageArgs),
    ChangeBackground(ChangeBackgroundArgs),
    ChangeForeground(ChangeForegroundArgs),
    EraseEvent(EraseEventArgs),
    Memo(MemoArgs),
    Group(GroupArgs),
}

/// Character targeted by a command within a script: the running event.
pub const TARGET_SELF: i64 = 0;
/// Character targeted by a command within a script: the player.
pub const TARGET_PLAYER: i64 = -1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NopArgs {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IfArgs {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelArgs {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GotoArgs {
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallEventArgs {
    #[serde(rename = "eventID")]
    pub event_id: i64,
    #[serde(default)]
    pub page_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallCommonEventArgs {
    #[serde(rename = "eventID")]
    pub event_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitArgs {
    /// Tenths of a second; the engine runs at 60 Hz.
    pub time: u32,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalloonType {
    #[default]
    Normal,
    Think,
    Shout,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowBalloonArgs {
    #[serde(rename = "eventID")]
    pub event_id: i64,
    pub content: TextId,
    #[serde(default)]
    pub balloon_type: BalloonType,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePosition {
    #[default]
    Auto,
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowMessageArgs {
    #[serde(rename = "eventID")]
    pub event_id: i64,
    pub content: TextId,
    #[serde(default)]
    pub position: MessagePosition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowHintArgs {
    pub id: i64,
}

/// State change applied by `control_hint`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintCommand {
    #[default]
    Read,
    Complete,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlHintArgs {
    pub id: i64,
    pub command: HintCommand,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowChoicesArgs {
    pub choices: Vec<TextId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetSwitchArgs {
    pub id: u32,
    pub value: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetSelfSwitchArgs {
    pub id: u32,
    pub value: bool,
}

/// Combine operator for `set_variable`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetVariableOp {
    #[default]
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
}

/// Character attribute readable through `set_variable valueType=character`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterValueKind {
    #[default]
    X,
    Y,
    Direction,
    Speed,
}

/// Aggregate readable through `set_variable valueType=item_group`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemGroupValueKind {
    #[default]
    Owned,
    Total,
}

/// Engine-level value readable through `set_variable valueType=system`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemValueKind {
    #[default]
    HintCount,
    ActiveItem,
    RoomId,
}

/// Right-hand side of `set_variable`, selected by `valueType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "valueType", content = "value", rename_all = "snake_case")]
pub enum SetVariableValue {
    Constant(i64),
    Variable(u32),
    /// Value of the variable whose index is held in variable `n`.
    VariableRef(u32),
    Switch(u32),
    SwitchRef(u32),
    Random {
        begin: i64,
        end: i64,
    },
    Character {
        #[serde(rename = "type")]
        kind: CharacterValueKind,
        #[serde(rename = "eventID")]
        event_id: i64,
    },
    ItemGroup {
        #[serde(rename = "type")]
        kind: ItemGroupValueKind,
        group: i64,
    },
    IapProduct(String),
    System {
        #[serde(rename = "type")]
        kind: SystemValueKind,
    },
    Table {
        name: String,
        index_variable: u32,
    },
}

impl Default for SetVariableValue {
    fn default() -> Self {
        SetVariableValue::Constant(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetVariableArgs {
    pub id: u32,
    pub op: SetVariableOp,
    #[serde(flatten)]
    pub value: SetVariableValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferArgs {
    #[serde(rename = "roomID")]
    pub room_id: i64,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetRouteArgs {
    #[serde(rename = "eventID")]
    pub event_id: i64,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub wait: bool,
    #[serde(default)]
    pub commands: Commands,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TintScreenArgs {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub gray: f64,
    pub time: u32,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShakeDirection {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShakeArgs {
    pub power: i32,
    pub speed: i32,
    pub time: u32,
    #[serde(default)]
    pub direction: ShakeDirection,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherType {
    #[default]
    None,
    Rain,
    Snow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherArgs {
    #[serde(rename = "type")]
    pub weather_type: WeatherType,
    #[serde(default)]
    pub power: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaySeArgs {
    pub name: String,
    #[serde(default)]
    pub volume: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayBgmArgs {
    pub name: String,
    #[serde(default)]
    pub volume: i32,
    #[serde(default)]
    pub fade_time: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StopBgmArgs {
    #[serde(default)]
    pub fade_time: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveArgs {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutosaveArgs {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GotoTitleArgs {}

/// Motion selected by `move_character`'s `type` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveCharacterMotion {
    Direction { dir: Dir, distance: u32 },
    Forward { distance: u32 },
    Backward { distance: u32 },
    Target { x: i32, y: i32 },
    Random {},
    Toward {},
    Against {},
}

impl Default for MoveCharacterMotion {
    fn default() -> Self {
        MoveCharacterMotion::Forward { distance: 1 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveCharacterArgs {
    #[serde(rename = "eventID", default)]
    pub event_id: i64,
    #[serde(flatten)]
    pub motion: MoveCharacterMotion,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnCharacterArgs {
    #[serde(rename = "eventID", default)]
    pub event_id: i64,
    pub dir: Dir,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotateCharacterArgs {
    #[serde(rename = "eventID", default)]
    pub event_id: i64,
    /// Degrees clockwise, in multiples of 90.
    pub angle: i32,
}

/// Property written by `set_character_property`, selected by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CharacterProperty {
    Visibility(bool),
    Dir(Dir),
    DirFix(bool),
    Stepping(bool),
    Through(bool),
    Walking(bool),
    Speed(Speed),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCharacterPropertyArgs {
    #[serde(rename = "eventID", default)]
    pub event_id: i64,
    #[serde(flatten)]
    pub property: CharacterProperty,
}

/// Image reference discriminated by `imageValueType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "imageValueType", content = "image", rename_all = "snake_case")]
pub enum ImageValue {
    Name(String),
    Uuid(TextId),
}

impl Default for ImageValue {
    fn default() -> Self {
        ImageValue::Name(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetCharacterImageArgs {
    #[serde(rename = "eventID", default)]
    pub event_id: i64,
    #[serde(flatten)]
    pub image: ImageValue,
    #[serde(default)]
    pub image_index: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetCharacterOpacityArgs {
    #[serde(rename = "eventID", default)]
    pub event_id: i64,
    pub opacity: u8,
    #[serde(default)]
    pub time: u32,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddItemArgs {
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoveItemArgs {
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplaceItemArgs {
    pub id: i64,
    #[serde(rename = "replaceID")]
    pub replace_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowItemArgs {
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HideItemArgs {
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowInventoryArgs {
    #[serde(default)]
    pub group: i64,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HideInventoryArgs {}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PictureOrigin {
    #[default]
    TopLeft,
    Center,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendType {
    #[default]
    Normal,
    Add,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PicturePriority {
    Bottom,
    #[default]
    Overlay,
    Top,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowPictureArgs {
    pub id: u32,
    pub image: String,
    pub x: i32,
    pub y: i32,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(default = "opaque")]
    pub opacity: u8,
    #[serde(default)]
    pub origin: PictureOrigin,
    #[serde(default)]
    pub blend: BlendType,
    #[serde(default)]
    pub priority: PicturePriority,
}

fn one() -> f64 {
    1.0
}

fn opaque() -> u8 {
    255
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErasePictureArgs {
    pub id: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovePictureArgs {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub time: u32,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalePictureArgs {
    pub id: u32,
    pub scale_x: f64,
    pub scale_y: f64,
    #[serde(default)]
    pub time: u32,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RotatePictureArgs {
    pub id: u32,
    pub angle: f64,
    #[serde(default)]
    pub time: u32,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FadePictureArgs {
    pub id: u32,
    pub opacity: u8,
    #[serde(default)]
    pub time: u32,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TintPictureArgs {
    pub id: u32,
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub gray: f64,
    #[serde(default)]
    pub time: u32,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangePictureImageArgs {
    pub id: u32,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeBackgroundArgs {
    #[serde(flatten)]
    pub image: ImageValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeForegroundArgs {
    #[serde(flatten)]
    pub image: ImageValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EraseEventArgs {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoArgs {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupArgs {
    #[serde(default)]
    pub name: String,
}
