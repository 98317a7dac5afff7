//! Client-side sync layer for the marquee launcher.
//!
//! A remote process owns the catalogue, the cursor and the menus. This crate polls it
//! at several cadences, mirrors what it answers, and renders the mirror into a view
//! tree that a window draws.

pub mod asset_cache;
pub mod config;
pub mod demo;
pub mod error;
pub mod highlight;
pub mod menu;
pub mod mirror;
pub mod navigation;
pub mod remote;
pub mod render;
pub mod scheduler;
pub mod single_flight;
pub mod sync;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use config::{Config, PollingConfig};
pub use demo::DemoBackend;
pub use error::{ConfigError, RemoteError, RenderError};
pub use remote::{Command, RemoteAccessor, RemoteClient, Request};
pub use render::{NodeKind, ViewNode};
pub use sync::SyncContext;
pub use types::{Event, InputEvent, Orientation, System};
