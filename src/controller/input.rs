/// Platform-agnostic input handling: keyboard and gamepads merged behind one polled API
use std::collections::HashMap;

use tracing::debug;

/// Standard-mapping gamepad button indices
pub const BUTTON_UP: usize = 12;
pub const BUTTON_DOWN: usize = 13;
pub const BUTTON_LEFT: usize = 14;
pub const BUTTON_RIGHT: usize = 15;
pub const BUTTON_A: usize = 3;
pub const BUTTON_B: usize = 2;
pub const BUTTON_C: usize = 1;
pub const BUTTON_D: usize = 0;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events, by physical key code ("ArrowUp", "Space", ...)
    KeyDown(String),
    KeyUp(String),

    // Gamepad lifecycle
    GamepadConnected { index: u32, button_count: usize },
    GamepadDisconnected { index: u32 },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
}

/// Live device state, read fresh on every query since the platform does not
/// push per-button events.
pub trait GamepadSource {
    /// Pressed state of `button` on the pad at `index`; `None` if either does not exist
    fn button(&self, index: u32, button: usize) -> Option<bool>;

    /// Value of `axis` on the pad at `index`; `None` if either does not exist
    fn axis(&self, index: u32, axis: usize) -> Option<f32>;

    fn button_count(&self, index: u32) -> usize;

    fn axis_count(&self, index: u32) -> usize;

    /// Every button and axis of one pad; empty when the pad does not exist.
    /// Sources that pay per device lookup should read the pad once here.
    fn snapshot(&self, index: u32) -> GamepadSnapshot {
        GamepadSnapshot {
            buttons_pressed: (0..self.button_count(index))
                .map(|b| self.button(index, b).unwrap_or(false))
                .collect(),
            axes: (0..self.axis_count(index))
                .map(|a| self.axis(index, a).unwrap_or(0.0))
                .collect(),
        }
    }
}

/// Source for platforms without a gamepad API: zero pads
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGamepads;

impl GamepadSource for NoGamepads {
    fn button(&self, _index: u32, _button: usize) -> Option<bool> {
        None
    }

    fn axis(&self, _index: u32, _axis: usize) -> Option<f32> {
        None
    }

    fn button_count(&self, _index: u32) -> usize {
        0
    }

    fn axis_count(&self, _index: u32) -> usize {
        0
    }
}

/// Cached record of a connected pad
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadSnapshot {
    pub buttons_pressed: Vec<bool>,
    pub axes: Vec<f32>,
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
    pub action: String,
    pub up_button: usize,
    pub down_button: usize,
    pub left_button: usize,
    pub right_button: usize,
    pub action_buttons: [usize; 4],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: "ArrowUp".to_string(),
            down: "ArrowDown".to_string(),
            left: "ArrowLeft".to_string(),
            right: "ArrowRight".to_string(),
            action: "Space".to_string(),
            up_button: BUTTON_UP,
            down_button: BUTTON_DOWN,
            left_button: BUTTON_LEFT,
            right_button: BUTTON_RIGHT,
            action_buttons: [BUTTON_A, BUTTON_B, BUTTON_C, BUTTON_D],
        }
    }
}

/// Input read once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub action: bool,
}

/// Unified keyboard + gamepad input state
pub struct InputController {
    key_state: HashMap<String, bool>,
    gamepads: HashMap<u32, GamepadSnapshot>,
    source: Box<dyn GamepadSource>,
    bindings: KeyBindings,
}

impl InputController {
    pub fn new(source: Box<dyn GamepadSource>) -> Self {
        Self::with_bindings(source, KeyBindings::default())
    }

    pub fn with_bindings(source: Box<dyn GamepadSource>, bindings: KeyBindings) -> Self {
        Self {
            key_state: HashMap::new(),
            gamepads: HashMap::new(),
            source,
            bindings,
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(code) => self.on_key_down(code),
            InputEvent::KeyUp(code) => self.on_key_up(code),
            InputEvent::GamepadConnected { index, button_count } => {
                self.on_gamepad_connected(*index, *button_count)
            }
            InputEvent::GamepadDisconnected { index } => self.on_gamepad_disconnected(*index),
            InputEvent::FocusLost | InputEvent::VisibilityChanged { .. } => self.clear_keys(),
        }
    }

    pub fn on_key_down(&mut self, code: &str) {
        self.key_state.insert(code.to_string(), true);
    }

    pub fn on_key_up(&mut self, code: &str) {
        self.key_state.insert(code.to_string(), false);
    }

    pub fn on_gamepad_connected(&mut self, index: u32, button_count: usize) {
        debug!(index, button_count, "gamepad connected");
        self.gamepads.insert(
            index,
            GamepadSnapshot {
                buttons_pressed: vec![false; button_count],
                axes: Vec::new(),
            },
        );
    }

    pub fn on_gamepad_disconnected(&mut self, index: u32) {
        debug!(index, "gamepad disconnected");
        self.gamepads.remove(&index);
    }

    pub fn clear_keys(&mut self) {
        self.key_state.clear();
    }

    pub fn is_key_pressed(&self, code: &str) -> bool {
        self.key_state.get(code).copied().unwrap_or(false)
    }

    pub fn connected_gamepads(&self) -> impl Iterator<Item = u32> + '_ {
        self.gamepads.keys().copied()
    }

    pub fn snapshot(&self, index: u32) -> Option<&GamepadSnapshot> {
        self.gamepads.get(&index)
    }

    /// True if any connected pad exposing `button` has it pressed
    pub fn is_button_pressed(&self, button: usize) -> bool {
        self.gamepads
            .keys()
            .any(|&index| self.source.button(index, button).unwrap_or(false))
    }

    /// Value of `axis` on the first connected pad that has it
    pub fn axis(&self, axis: usize) -> Option<f32> {
        let mut indices: Vec<u32> = self.gamepads.keys().copied().collect();
        indices.sort_unstable();
        indices.into_iter().find_map(|index| self.source.axis(index, axis))
    }

    /// Copy live device values into the cached snapshots
    pub fn refresh_snapshots(&mut self) {
        for (&index, snapshot) in self.gamepads.iter_mut() {
            *snapshot = self.source.snapshot(index);
        }
    }

    pub fn up(&self) -> bool {
        self.is_key_pressed(&self.bindings.up) || self.is_button_pressed(self.bindings.up_button)
    }

    pub fn down(&self) -> bool {
        self.is_key_pressed(&self.bindings.down) || self.is_button_pressed(self.bindings.down_button)
    }

    pub fn left(&self) -> bool {
        self.is_key_pressed(&self.bindings.left) || self.is_button_pressed(self.bindings.left_button)
    }

    pub fn right(&self) -> bool {
        self.is_key_pressed(&self.bindings.right) || self.is_button_pressed(self.bindings.right_button)
    }

    pub fn action(&self) -> bool {
        self.is_key_pressed(&self.bindings.action)
            || self
                .bindings
                .action_buttons
                .iter()
                .any(|&b| self.is_button_pressed(b))
    }

    /// Read all directions and action at once for the frame step
    pub fn poll(&self) -> MoveIntent {
        MoveIntent {
            up: self.up(),
            down: self.down(),
            left: self.left(),
            right: self.right(),
            action: self.action(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use wasm_bindgen::JsCast;
    use web_sys::{Gamepad, GamepadButton, GamepadEvent, KeyboardEvent, Navigator};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let code = e.code();
        if is_down {
            InputEvent::KeyDown(code)
        } else {
            InputEvent::KeyUp(code)
        }
    }

    pub fn gamepad_event_to_input(e: &GamepadEvent, connected: bool) -> Option<InputEvent> {
        let pad = e.gamepad()?;
        let index = pad.index();
        Some(if connected {
            InputEvent::GamepadConnected {
                index,
                button_count: pad.buttons().length() as usize,
            }
        } else {
            InputEvent::GamepadDisconnected { index }
        })
    }

    /// Reads `navigator.getGamepads()` on every query
    pub struct WebGamepads {
        navigator: Option<Navigator>,
    }

    impl WebGamepads {
        pub fn new() -> Self {
            Self {
                navigator: web_sys::window().map(|w| w.navigator()),
            }
        }

        fn pad(&self, index: u32) -> Option<Gamepad> {
            // A missing or throwing gamepad API reads as zero pads
            let pads = self.navigator.as_ref()?.get_gamepads().ok()?;
            pads.get(index).dyn_into::<Gamepad>().ok()
        }
    }

    impl GamepadSource for WebGamepads {
        fn button(&self, index: u32, button: usize) -> Option<bool> {
            let buttons = self.pad(index)?.buttons();
            if button >= buttons.length() as usize {
                return None;
            }
            buttons
                .get(button as u32)
                .dyn_into::<GamepadButton>()
                .ok()
                .map(|b| b.pressed())
        }

        fn axis(&self, index: u32, axis: usize) -> Option<f32> {
            let axes = self.pad(index)?.axes();
            if axis >= axes.length() as usize {
                return None;
            }
            axes.get(axis as u32).as_f64().map(|v| v as f32)
        }

        fn button_count(&self, index: u32) -> usize {
            self.pad(index).map(|p| p.buttons().length() as usize).unwrap_or(0)
        }

        fn axis_count(&self, index: u32) -> usize {
            self.pad(index).map(|p| p.axes().length() as usize).unwrap_or(0)
        }

        fn snapshot(&self, index: u32) -> GamepadSnapshot {
            let Some(pad) = self.pad(index) else { return GamepadSnapshot::default() };
            GamepadSnapshot {
                buttons_pressed: pad
                    .buttons()
                    .iter()
                    .map(|b| b.dyn_into::<GamepadButton>().map(|b| b.pressed()).unwrap_or(false))
                    .collect(),
                axes: pad
                    .axes()
                    .iter()
                    .map(|a| a.as_f64().unwrap_or(0.0) as f32)
                    .collect(),
            }
        }
    }
}
