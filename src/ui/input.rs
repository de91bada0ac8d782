use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press did to a line being edited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum InputAction {
    Submit(String),
    Cancel,
    Edited,
    Ignored,
}

/// A single line of text typed at a prompt.
#[derive(Debug, Default)]
pub(crate) struct LineInput {
    buffer: String,
}

impl LineInput {
    pub(crate) fn text(&self) -> &str {
        &self.buffer
    }

    pub(crate) fn handle(&mut self, key: KeyEvent) -> InputAction {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => InputAction::Submit(std::mem::take(&mut self.buffer)),
            KeyCode::Esc => {
                self.buffer.clear();
                InputAction::Cancel
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                InputAction::Edited
            }
            KeyCode::Char('u') if control => {
                self.buffer.clear();
                InputAction::Edited
            }
            KeyCode::Char(c) if !control => {
                self.buffer.push(c);
                InputAction::Edited
            }
            _ => InputAction::Ignored,
        }
    }
}
