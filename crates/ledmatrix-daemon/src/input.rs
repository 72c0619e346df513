//! Remote control events and the non-blocking source the loops poll.

use std::str::FromStr;
use thiserror::Error;
use tokio::sync::mpsc;

/// Buttons on the IR remote, by their key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteKey {
    BrightnessUp,
    BrightnessDown,
    Off,
    NextColor,
    PreviousColor,
    NextAnimation,
    PreviousAnimation,
    Replay,
    LoopToggle,
}

impl RemoteKey {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            9 => Some(RemoteKey::BrightnessUp),
            7 => Some(RemoteKey::BrightnessDown),
            69 => Some(RemoteKey::Off),
            67 => Some(RemoteKey::NextColor),
            68 => Some(RemoteKey::PreviousColor),
            74 => Some(RemoteKey::NextAnimation),
            66 => Some(RemoteKey::PreviousAnimation),
            28 => Some(RemoteKey::Replay),
            82 => Some(RemoteKey::LoopToggle),
            _ => None,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            RemoteKey::BrightnessUp => 9,
            RemoteKey::BrightnessDown => 7,
            RemoteKey::Off => 69,
            RemoteKey::NextColor => 67,
            RemoteKey::PreviousColor => 68,
            RemoteKey::NextAnimation => 74,
            RemoteKey::PreviousAnimation => 66,
            RemoteKey::Replay => 28,
            RemoteKey::LoopToggle => 82,
        }
    }

    /// Keys that stop whatever animation is running.
    pub fn skips_animation(&self) -> bool {
        matches!(
            self,
            RemoteKey::NextAnimation | RemoteKey::PreviousAnimation | RemoteKey::LoopToggle
        )
    }
}

/// Something the daemon should react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(RemoteKey),
    /// A print job finished.
    PrintDone,
}

impl InputEvent {
    /// True if this event should interrupt a running animation.
    pub fn skips_animation(&self) -> bool {
        matches!(self, InputEvent::Key(key) if key.skips_animation())
    }
}

/// Malformed remote message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("empty message")]
    Empty,
    #[error("unknown key code: {0}")]
    UnknownKey(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl FromStr for InputEvent {
    type Err = ParseEventError;

    /// Accepts `print_done` and `key <code>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        match words.next() {
            None => Err(ParseEventError::Empty),
            Some("print_done") => Ok(InputEvent::PrintDone),
            Some("key") => {
                let code = words.next().unwrap_or_default();
                code.parse::<u16>()
                    .ok()
                    .and_then(RemoteKey::from_code)
                    .map(InputEvent::Key)
                    .ok_or_else(|| ParseEventError::UnknownKey(code.to_string()))
            }
            Some(other) => Err(ParseEventError::UnknownCommand(other.to_string())),
        }
    }
}

/// Non-blocking event source.
pub trait InputSource {
    /// Returns the next queued event, or `None` if nothing is waiting.
    fn try_next(&mut self) -> Option<InputEvent>;

    /// Discards every queued event and returns how many were dropped.
    fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while self.try_next().is_some() {
            dropped += 1;
        }
        dropped
    }
}

/// Events forwarded by the remote listener task.
pub struct ChannelInput {
    rx: mpsc::UnboundedReceiver<InputEvent>,
}

impl ChannelInput {
    pub fn new(rx: mpsc::UnboundedReceiver<InputEvent>) -> Self {
        Self { rx }
    }
}

impl InputSource for ChannelInput {
    fn try_next(&mut self) -> Option<InputEvent> {
        self.rx.try_recv().ok()
    }
}
