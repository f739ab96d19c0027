use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Frame, layout::Rect};

use crate::{
    app::Action,
    config::{KeyBindingAction, KeyBindingsConfig},
};

pub mod palette;

/// A UI component hosted by the app: it renders itself and turns terminal input into [`Action`]s
#[async_trait]
pub trait Component: Send {
    /// Retrieves the component name, for debugging purposes
    fn name(&self) -> &'static str;

    /// Minimum number of rows required to render the component inline
    fn min_inline_height(&self) -> u16;

    /// Initializes the component before its first render
    async fn init(&mut self) -> Result<Action> {
        Ok(Action::NoOp)
    }

    /// Renders the component within the given `area` of the `frame`
    fn render(&mut self, frame: &mut Frame, area: Rect);

    /// Called once the app stopped rendering the component, to let pending work finish
    async fn exit(&mut self) -> Result<()> {
        Ok(())
    }

    /// Processes text pasted into the terminal
    fn process_paste_event(&mut self, content: String) -> Result<Action> {
        let _ = content;
        Ok(Action::NoOp)
    }

    /// Processes a key press, configurable bindings first and then the fixed ones
    async fn process_key_event(&mut self, keybindings: &KeyBindingsConfig, key: KeyEvent) -> Result<Action> {
        if let Some(action) = keybindings.get_action_matching(&key) {
            return match action {
                KeyBindingAction::Quit => self.quit(),
                KeyBindingAction::Confirm => self.confirm(),
                KeyBindingAction::SelectNext => self.select_next(),
                KeyBindingAction::SelectPrev => self.select_prev(),
            };
        }

        match key.code {
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Char('h') if key.modifiers == KeyModifiers::CONTROL => self.delete_char(),
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.insert_char(c)
            }
            _ => Ok(Action::NoOp),
        }
    }

    /// The user asked to leave the current context
    fn quit(&mut self) -> Result<Action> {
        Ok(Action::Quit)
    }

    /// The user confirmed the current selection
    fn confirm(&mut self) -> Result<Action> {
        Ok(Action::NoOp)
    }

    /// Moves the selection to the next item
    fn select_next(&mut self) -> Result<Action> {
        Ok(Action::NoOp)
    }

    /// Moves the selection to the previous item
    fn select_prev(&mut self) -> Result<Action> {
        Ok(Action::NoOp)
    }

    /// Removes the last character of the input
    fn delete_char(&mut self) -> Result<Action> {
        Ok(Action::NoOp)
    }

    /// Appends a character to the input
    fn insert_char(&mut self, c: char) -> Result<Action> {
        let _ = c;
        Ok(Action::NoOp)
    }
}
