//! The request/response seam to the process that owns all state.
//!
//! [`RemoteAccessor`] is the opaque `invoke(command, args) -> value` primitive. It is
//! deliberately untyped; [`RemoteClient`] layers typed calls for each command on top.

use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::RemoteError;
use crate::types::{AssetType, Event, Orientation, SettingType, System, TextType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    CurrentSystem,
    AllSystems,
    CurrentOrientation,
    NextEvent,
    Menu,
    SettingsMenu,
    SettingTypes,
    SettingValue,
    CurrentAsset,
    CurrentText,
}

impl Command {
    pub const ALL: [Command; 10] = [
        Command::CurrentSystem,
        Command::AllSystems,
        Command::CurrentOrientation,
        Command::NextEvent,
        Command::Menu,
        Command::SettingsMenu,
        Command::SettingTypes,
        Command::SettingValue,
        Command::CurrentAsset,
        Command::CurrentText,
    ];

    /// The wire name of the command.
    pub fn name(self) -> &'static str {
        match self {
            Command::CurrentSystem => "current_system",
            Command::AllSystems => "all_systems",
            Command::CurrentOrientation => "current_orientation",
            Command::NextEvent => "next_event",
            Command::Menu => "menu",
            Command::SettingsMenu => "settings_menu",
            Command::SettingTypes => "setting_types",
            Command::SettingValue => "setting_value",
            Command::CurrentAsset => "current_asset",
            Command::CurrentText => "current_text",
        }
    }

    pub fn from_name(name: &str) -> Option<Command> {
        Command::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub command: Command,
    pub args: Value,
}

impl Request {
    pub fn new(command: Command) -> Self {
        Request {
            command,
            args: Value::Null,
        }
    }

    pub fn with_args(command: Command, args: Value) -> Self {
        Request { command, args }
    }
}

/// Opaque asynchronous call into the remote process. May fail or stall.
///
/// Implementations are driven from a single cooperative context, so the returned
/// future does not need to be `Send`.
pub trait RemoteAccessor {
    fn invoke(&self, request: Request) -> LocalBoxFuture<'_, Result<Value, RemoteError>>;
}

/// Typed calls over a shared [`RemoteAccessor`].
#[derive(Clone)]
pub struct RemoteClient {
    accessor: Rc<dyn RemoteAccessor>,
}

impl RemoteClient {
    pub fn new(accessor: Rc<dyn RemoteAccessor>) -> Self {
        RemoteClient { accessor }
    }

    async fn call<T: DeserializeOwned>(&self, request: Request) -> Result<T, RemoteError> {
        let command = request.command;
        #[cfg(feature = "dev")]
        tracing::debug!(%command, args = %request.args, "remote call");

        let value = self.accessor.invoke(request).await?;
        serde_json::from_value(value).map_err(|source| RemoteError::Decode { command, source })
    }

    pub async fn current_system(&self) -> Result<System, RemoteError> {
        self.call(Request::new(Command::CurrentSystem)).await
    }

    pub async fn all_systems(&self) -> Result<Vec<System>, RemoteError> {
        self.call(Request::new(Command::AllSystems)).await
    }

    pub async fn current_orientation(&self) -> Result<Orientation, RemoteError> {
        self.call(Request::new(Command::CurrentOrientation)).await
    }

    pub async fn next_event(&self) -> Result<Option<Event>, RemoteError> {
        let value = self.accessor.invoke(Request::new(Command::NextEvent)).await?;
        Event::from_value(value).map_err(|source| RemoteError::Decode {
            command: Command::NextEvent,
            source,
        })
    }

    pub async fn menu(&self) -> Result<Vec<String>, RemoteError> {
        self.call(Request::new(Command::Menu)).await
    }

    pub async fn settings_menu(&self) -> Result<Vec<String>, RemoteError> {
        self.call(Request::new(Command::SettingsMenu)).await
    }

    pub async fn setting_types(&self) -> Result<Vec<SettingType>, RemoteError> {
        self.call(Request::new(Command::SettingTypes)).await
    }

    /// The serialized (JSON text) value of one setting.
    pub async fn setting_value(&self, setting: usize) -> Result<String, RemoteError> {
        let request = Request::with_args(Command::SettingValue, json!({ "setting": setting }));
        self.call(request).await
    }

    pub async fn current_asset(&self, asset_type: AssetType) -> Result<Option<PathBuf>, RemoteError> {
        let request = Request::with_args(Command::CurrentAsset, json!({ "assetType": asset_type }));
        let path: Option<String> = self.call(request).await?;
        Ok(path.filter(|p| !p.is_empty()).map(PathBuf::from))
    }

    pub async fn current_text(&self, text_type: TextType) -> Result<Option<String>, RemoteError> {
        let request = Request::with_args(Command::CurrentText, json!({ "textType": text_type }));
        let text: Option<String> = self.call(request).await?;
        Ok(text.filter(|t| !t.trim().is_empty()))
    }
}
