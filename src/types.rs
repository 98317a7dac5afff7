use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ===================================
// CATALOGUE
// ===================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct System {
    pub name: String,
    pub tag: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub gamelist: Vec<Game>,
}

impl System {
    pub fn new(name: &str, tag: &str, games: &[&str]) -> Self {
        System {
            name: name.to_string(),
            tag: tag.to_string(),
            description: None,
            photo: None,
            gamelist: games
                .iter()
                .map(|name| Game { name: name.to_string() })
                .collect(),
        }
    }
}

// ===================================
// ORIENTATION
// ===================================

/// The remote cursor: which system, game and menu row currently have focus.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Orientation {
    pub system_index: usize,
    pub gamelist_index: usize,
    #[serde(default)]
    pub menu_active: bool,
    #[serde(default)]
    pub menu_index: Option<usize>,
    #[serde(default)]
    pub menu_item_index: Option<usize>,
}

// ===================================
// EVENTS
// ===================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Up,
    Down,
    Left,
    Right,
    Ok,
    Cancel,
    Delete,
    Menu,
    Quit,
    PageUp,
    PageDown,
    First,
    Last,
}

/// A decoded `next_event` payload. Only input events are told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    Other(String),
}

#[derive(Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    typ: TaggedPayload,
}

#[derive(Deserialize)]
struct TaggedPayload {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    args: Value,
}

impl Event {
    /// Decodes `{ "type": { "type": <tag>, "args": ... } }`. `null` means no event was pending.
    pub fn from_value(value: Value) -> Result<Option<Event>, serde_json::Error> {
        if value.is_null() {
            return Ok(None);
        }

        let envelope: EventEnvelope = serde_json::from_value(value)?;
        let event = match envelope.typ.tag.as_str() {
            "input" => Event::Input(serde_json::from_value(envelope.typ.args)?),
            _ => Event::Other(envelope.typ.tag),
        };
        Ok(Some(event))
    }

    pub fn to_value(&self) -> Value {
        match self {
            Event::Input(input) => serde_json::json!({
                "type": { "type": "input", "args": input }
            }),
            Event::Other(tag) => serde_json::json!({ "type": { "type": tag } }),
        }
    }
}

// ===================================
// SETTINGS
// ===================================

/// Value type tag reported by `setting_types`, aligned with the settings labels.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum SettingType {
    Boolean,
    String,
    Unknown(String),
}

impl From<String> for SettingType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "boolean" => SettingType::Boolean,
            "string" => SettingType::String,
            _ => SettingType::Unknown(tag),
        }
    }
}

impl From<SettingType> for String {
    fn from(typ: SettingType) -> Self {
        match typ {
            SettingType::Boolean => "boolean".to_string(),
            SettingType::String => "string".to_string(),
            SettingType::Unknown(tag) => tag,
        }
    }
}

/// A setting value decoded from its serialized form using the type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Boolean(bool),
    Text(Option<String>),
    Raw(String),
}

impl SettingValue {
    pub fn decode(typ: Option<&SettingType>, serialized: &str) -> Self {
        match typ {
            Some(SettingType::Boolean) => match serde_json::from_str::<bool>(serialized) {
                Ok(b) => SettingValue::Boolean(b),
                Err(_) => SettingValue::Raw(serialized.to_string()),
            },
            Some(SettingType::String) => match serde_json::from_str::<Option<String>>(serialized) {
                Ok(s) => SettingValue::Text(s),
                Err(_) => SettingValue::Raw(serialized.to_string()),
            },
            _ => SettingValue::Raw(serialized.to_string()),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Boolean(true) => f.write_str("ON"),
            SettingValue::Boolean(false) => f.write_str("OFF"),
            SettingValue::Text(Some(text)) => f.write_str(text),
            SettingValue::Text(None) => f.write_str("NONE"),
            SettingValue::Raw(raw) => f.write_str(raw),
        }
    }
}

// ===================================
// ASSETS
// ===================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    #[default]
    Image,
    Thumbnail,
    Video,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TextType {
    #[default]
    Description,
    Rating,
    ReleaseDate,
    Developer,
    Publisher,
    Genre,
    Players,
    PlayCount,
    LastPlayed,
}

impl TextType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Description => "DESCRIPTION",
            Self::Rating => "RATING",
            Self::ReleaseDate => "RELEASED",
            Self::Developer => "DEVELOPER",
            Self::Publisher => "PUBLISHER",
            Self::Genre => "GENRE",
            Self::Players => "PLAYERS",
            Self::PlayCount => "PLAY COUNT",
            Self::LastPlayed => "LAST PLAYED",
        }
    }
}
