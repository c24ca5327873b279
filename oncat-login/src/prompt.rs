use crate::login::{LoginForm, LoginOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    Submit,
    Cancel,
}

/// Source of interactive credentials (terminal in production, scripted in tests)
pub trait CredentialPrompt {
    /// Fill in `form` and decide whether to submit it.
    ///
    /// Implementations must only return [`PromptAction::Submit`] when
    /// [`LoginForm::can_submit`] holds.
    fn prompt(&mut self, form: &mut LoginForm, options: &LoginOptions) -> PromptAction;

    /// Show a user-facing message (login failures and the like).
    fn show_message(&mut self, message: &str);
}
