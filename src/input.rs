use macroquad::prelude::*;
#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, Gilrs};
use marquee::InputEvent;

#[derive(Default)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub select: bool,
    pub back: bool,
    pub menu: bool,
    pub next: bool,
    pub prev: bool,
    pub first: bool,
    pub last: bool,
    pub delete: bool,
    pub analog_was_neutral: bool,
}

impl InputState {
    #[cfg(feature = "gamepad")]
    const ANALOG_DEADZONE: f32 = 0.5;

    pub fn new() -> Self {
        InputState {
            analog_was_neutral: true,
            ..Default::default()
        }
    }

    pub fn update_keyboard(&mut self) {
        self.up = is_key_pressed(KeyCode::Up);
        self.down = is_key_pressed(KeyCode::Down);
        self.left = is_key_pressed(KeyCode::Left);
        self.right = is_key_pressed(KeyCode::Right);
        self.select = is_key_pressed(KeyCode::Enter);
        self.back = is_key_pressed(KeyCode::Backspace) || is_key_pressed(KeyCode::Escape);
        self.menu = is_key_pressed(KeyCode::Tab);
        self.next = is_key_pressed(KeyCode::PageDown) || is_key_pressed(KeyCode::RightBracket);
        self.prev = is_key_pressed(KeyCode::PageUp) || is_key_pressed(KeyCode::LeftBracket);
        self.first = is_key_pressed(KeyCode::Home);
        self.last = is_key_pressed(KeyCode::End);
        self.delete = is_key_pressed(KeyCode::Delete);
    }

    #[cfg(feature = "gamepad")]
    pub fn update_controller(&mut self, gilrs: &mut Gilrs) {
        while let Some(ev) = gilrs.next_event() {
            match ev.event {
                gilrs::EventType::ButtonPressed(Button::DPadUp, _) => self.up = true,
                gilrs::EventType::ButtonPressed(Button::DPadDown, _) => self.down = true,
                gilrs::EventType::ButtonPressed(Button::DPadLeft, _) => self.left = true,
                gilrs::EventType::ButtonPressed(Button::DPadRight, _) => self.right = true,
                gilrs::EventType::ButtonPressed(Button::South, _) => self.select = true,
                gilrs::EventType::ButtonPressed(Button::East, _) => self.back = true,
                gilrs::EventType::ButtonPressed(Button::West, _) => self.delete = true,
                gilrs::EventType::ButtonPressed(Button::Start, _) => self.menu = true,
                gilrs::EventType::ButtonPressed(Button::RightTrigger, _) => self.next = true,
                gilrs::EventType::ButtonPressed(Button::LeftTrigger, _) => self.prev = true,
                _ => {}
            }
        }

        // only the first stick that leaves neutral counts, and only once per push
        let mut any_stick_active = false;
        let was_neutral = self.analog_was_neutral;

        for (_, gamepad) in gilrs.gamepads() {
            let raw_x = gamepad.value(Axis::LeftStickX);
            let raw_y = gamepad.value(Axis::LeftStickY);

            let is_currently_neutral =
                raw_x.abs() < Self::ANALOG_DEADZONE && raw_y.abs() < Self::ANALOG_DEADZONE;
            if is_currently_neutral {
                continue;
            }

            any_stick_active = true;
            if was_neutral {
                if raw_y.abs() > raw_x.abs() {
                    // +Y is up on gilrs sticks
                    if raw_y > 0.0 {
                        self.up = true;
                    } else {
                        self.down = true;
                    }
                } else if raw_x < 0.0 {
                    self.left = true;
                } else {
                    self.right = true;
                }
            }
            break;
        }

        self.analog_was_neutral = !any_stick_active;
    }

    /// The input events pressed this frame, in a fixed order.
    pub fn events(&self) -> Vec<InputEvent> {
        [
            (self.up, InputEvent::Up),
            (self.down, InputEvent::Down),
            (self.left, InputEvent::Left),
            (self.right, InputEvent::Right),
            (self.select, InputEvent::Ok),
            (self.back, InputEvent::Cancel),
            (self.menu, InputEvent::Menu),
            (self.next, InputEvent::PageDown),
            (self.prev, InputEvent::PageUp),
            (self.first, InputEvent::First),
            (self.last, InputEvent::Last),
            (self.delete, InputEvent::Delete),
        ]
        .into_iter()
        .filter_map(|(pressed, event)| pressed.then_some(event))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_flags_become_events() {
        let state = InputState {
            down: true,
            menu: true,
            ..InputState::new()
        };
        assert_eq!(state.events(), vec![InputEvent::Down, InputEvent::Menu]);
        assert!(InputState::new().events().is_empty());
    }
}
