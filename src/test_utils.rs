//! Shared test utilities for the sync layer tests.
//!
//! Provides a [`FakeRemote`] that serves scripted responses and records every call.

use futures::future::LocalBoxFuture;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use crate::error::RemoteError;
use crate::remote::{Command, RemoteAccessor, Request};
use crate::types::{Orientation, System};

#[derive(Default)]
struct FakeState {
    responses: HashMap<Command, Value>,
    one_shots: HashMap<Command, VecDeque<Value>>,
    setting_values: Vec<String>,
    events: VecDeque<Value>,
    failing: HashSet<Command>,
    latency: HashMap<Command, Duration>,
    latency_queue: HashMap<Command, VecDeque<Duration>>,
    calls: HashMap<Command, usize>,
    in_flight: HashMap<Command, usize>,
    max_in_flight: HashMap<Command, usize>,
    requests: Vec<Request>,
}

/// A scripted remote. Responses and failures are evaluated when a call completes,
/// so a test can change them while a call is still in flight.
pub struct FakeRemote {
    state: RefCell<FakeState>,
}

#[allow(dead_code)]
impl FakeRemote {
    pub fn new() -> Self {
        FakeRemote {
            state: RefCell::new(FakeState::default()),
        }
    }

    /// A remote with three systems, the top menu and a two-entry settings menu.
    pub fn with_catalogue() -> Self {
        let remote = FakeRemote::new();
        remote.set_catalogue(&sample_catalogue());
        remote.set_orientation(&Orientation::default());
        remote.respond(Command::Menu, json!(["Settings", "Toggle Fullscreen Window", "Exit"]));
        remote.respond(Command::SettingsMenu, json!(["Start in Fullscreen", "Set Theme"]));
        remote.respond(Command::SettingTypes, json!(["boolean", "string"]));
        remote.set_setting_values(&["true", "\"Neon\""]);
        remote.respond(Command::CurrentAsset, Value::Null);
        remote.respond(Command::CurrentText, Value::Null);
        remote
    }

    pub fn respond(&self, command: Command, value: Value) {
        self.state.borrow_mut().responses.insert(command, value);
    }

    /// Answers the next call of `command` with `value`, fixed when the call is issued.
    pub fn respond_once(&self, command: Command, value: Value) {
        self.state
            .borrow_mut()
            .one_shots
            .entry(command)
            .or_default()
            .push_back(value);
    }

    pub fn set_catalogue(&self, systems: &[System]) {
        self.respond(Command::AllSystems, json!(systems));
        if let Some(first) = systems.first() {
            self.respond(Command::CurrentSystem, json!(first));
        }
    }

    pub fn set_orientation(&self, orientation: &Orientation) {
        self.respond(Command::CurrentOrientation, json!(orientation));
    }

    pub fn set_setting_values(&self, values: &[&str]) {
        self.state.borrow_mut().setting_values = values.iter().map(|v| v.to_string()).collect();
    }

    pub fn push_event(&self, event: Value) {
        self.state.borrow_mut().events.push_back(event);
    }

    pub fn fail(&self, command: Command) {
        self.state.borrow_mut().failing.insert(command);
    }

    pub fn recover(&self, command: Command) {
        self.state.borrow_mut().failing.remove(&command);
    }

    pub fn set_latency(&self, command: Command, latency: Duration) {
        self.state.borrow_mut().latency.insert(command, latency);
    }

    /// Latencies for the next calls of `command`, consumed in call order.
    pub fn queue_latencies(&self, command: Command, latencies: &[Duration]) {
        self.state
            .borrow_mut()
            .latency_queue
            .entry(command)
            .or_default()
            .extend(latencies.iter().copied());
    }

    pub fn calls(&self, command: Command) -> usize {
        self.state.borrow().calls.get(&command).copied().unwrap_or(0)
    }

    pub fn in_flight(&self, command: Command) -> usize {
        self.state.borrow().in_flight.get(&command).copied().unwrap_or(0)
    }

    pub fn max_in_flight(&self, command: Command) -> usize {
        self.state.borrow().max_in_flight.get(&command).copied().unwrap_or(0)
    }

    pub fn last_request(&self, command: Command) -> Option<Request> {
        self.requests(command).pop()
    }

    pub fn requests(&self, command: Command) -> Vec<Request> {
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|r| r.command == command)
            .cloned()
            .collect()
    }

    fn begin(&self, request: &Request) -> (Option<Duration>, Option<Value>) {
        let mut state = self.state.borrow_mut();
        let command = request.command;
        state.requests.push(request.clone());
        *state.calls.entry(command).or_default() += 1;

        let in_flight = {
            let count = state.in_flight.entry(command).or_default();
            *count += 1;
            *count
        };
        let max = state.max_in_flight.entry(command).or_default();
        *max = (*max).max(in_flight);

        let queued = state
            .latency_queue
            .get_mut(&command)
            .and_then(|queue| queue.pop_front());
        let latency = queued.or_else(|| state.latency.get(&command).copied());
        let fixed = state
            .one_shots
            .get_mut(&command)
            .and_then(|queue| queue.pop_front());
        (latency, fixed)
    }

    fn finish(&self, request: &Request, fixed: Option<Value>) -> Result<Value, RemoteError> {
        let mut state = self.state.borrow_mut();
        let command = request.command;
        if let Some(count) = state.in_flight.get_mut(&command) {
            *count -= 1;
        }

        if state.failing.contains(&command) {
            return Err(RemoteError::Call {
                command,
                message: "scripted failure".to_string(),
            });
        }

        if let Some(value) = fixed {
            return Ok(value);
        }

        match command {
            Command::NextEvent => Ok(state.events.pop_front().unwrap_or(Value::Null)),
            Command::SettingValue => request
                .args
                .get("setting")
                .and_then(Value::as_u64)
                .and_then(|i| state.setting_values.get(i as usize))
                .map(|v| Value::String(v.clone()))
                .ok_or(RemoteError::Unavailable { command }),
            _ => state
                .responses
                .get(&command)
                .cloned()
                .ok_or(RemoteError::Unavailable { command }),
        }
    }
}

impl RemoteAccessor for FakeRemote {
    fn invoke(&self, request: Request) -> LocalBoxFuture<'_, Result<Value, RemoteError>> {
        Box::pin(async move {
            let (latency, fixed) = self.begin(&request);
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            self.finish(&request, fixed)
        })
    }
}

pub fn sample_catalogue() -> Vec<System> {
    vec![
        System::new("Famicom", "fc", &["Balloon Fight", "Ice Climber", "Excitebike"]),
        System::new("Mega Drive", "md", &["Gunstar Heroes", "Ristar"]),
        System::new("Empty Shelf", "none", &[]),
    ]
}
