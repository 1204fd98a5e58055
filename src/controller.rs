use std::time::Duration;
use tracing::trace;

use crate::directory::Directory;
use crate::domain::{AdvocatesError, AppConfig, Message};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, directory: &Directory) -> Result<Option<Message>, AdvocatesError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            if directory.raw_keyevents() {
                return Ok(Some(Message::RawKey(key)));
            }
            return Ok(Self::handle_key(key));
        }
        Ok(None)
    }

    fn handle_key(key: event::KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('r'), _) => Some(Message::Retry),
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) => Some(Message::ToggleFocus),
            (KeyCode::Left, _) => Some(Message::PreviousOption),
            (KeyCode::Right, _) | (KeyCode::Char(' '), _) => Some(Message::NextOption),
            (KeyCode::Char('o'), _) => Some(Message::EnterOrder),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::PageUp, _) => Some(Message::MovePageUp),
            (KeyCode::PageDown, _) => Some(Message::MovePageDown),
            (KeyCode::Home, _) | (KeyCode::Char('g'), _) => Some(Message::MoveBeginning),
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => Some(Message::MoveEnd),
            (KeyCode::Char('y'), _) => Some(Message::CopyRow),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
