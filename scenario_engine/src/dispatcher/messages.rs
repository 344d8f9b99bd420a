//! Blocking and non-blocking messages.

use scenario_model::{Action, MissingKind, ScenarioError, ScenarioResult};
use tracing::{debug, info};

use crate::host::Host;
use crate::interpreter::ScenarioInterpreter;

impl<H: Host> ScenarioInterpreter<H> {
    /// Open a non-blocking message. Navigation arrows stay usable.
    ///
    /// Replaces any open message. A blocking one loses its button lists, and
    /// whatever it hid stays hidden until this notice is dismissed.
    pub(crate) fn show_text(&mut self, text: &str) -> ScenarioResult<()> {
        self.model.state.next_actions = None;
        self.host.show_message(text, &[]);
        self.hide_hotspots()?;
        self.notice_open = true;
        Ok(())
    }

    /// Open a blocking message with one action list per button.
    pub(crate) fn show_blocking(
        &mut self,
        text: &str,
        buttons: Vec<String>,
        lists: Vec<Vec<Action>>,
    ) -> ScenarioResult<()> {
        self.model.state.next_actions = None;
        self.notice_open = false;

        self.host.show_message(text, &buttons);
        self.hide_interactive_elements()?;
        debug!(buttons = buttons.len(), "blocking_message_opened");
        self.model.state.next_actions = Some(lists);
        Ok(())
    }

    /// A button of the open blocking message was clicked.
    ///
    /// Consumes the pending lists and runs only the one bound to `index`.
    pub fn message_button_clicked(&mut self, index: usize) -> ScenarioResult<()> {
        let mut lists = self
            .model
            .state
            .next_actions
            .take()
            .ok_or(ScenarioError::NoOpenMessage)?;

        if index >= lists.len() {
            let count = lists.len();
            self.model.state.next_actions = Some(lists);
            return Err(ScenarioError::not_found(
                MissingKind::MessageButton,
                format!("{index} (message has {count})"),
            ));
        }

        let chosen = lists.swap_remove(index);
        info!(button = index, actions = chosen.len(), "message_button_clicked");
        self.host.hide_message();
        self.restore_interactivity()?;
        self.execute(&chosen)
    }

    /// Click anywhere while a message is open. Ignored unless it is non-blocking.
    pub fn message_dismissed(&mut self) -> ScenarioResult<()> {
        if !self.notice_open {
            return Ok(());
        }
        self.close_notice()
    }

    pub(crate) fn close_notice(&mut self) -> ScenarioResult<()> {
        self.notice_open = false;
        self.host.hide_message();
        self.restore_interactivity()
    }

    /// Show the objects and code input of the current scene again, if any.
    pub(crate) fn restore_interactivity(&mut self) -> ScenarioResult<()> {
        if self.model.state.current_scene_id.is_none() {
            return Ok(());
        }
        self.refresh_objects()?;
        self.refresh_code_input()
    }
}
