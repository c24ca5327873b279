mod dialog;
mod form;
mod widget;

pub use dialog::{
    LoginDialog, LoginOptions, LoginOutcome, LoginState, PasswordEcho, INVALID_CREDENTIALS_MSG,
    MISSING_CREDENTIALS_MSG, NO_AGENT_MSG,
};
pub use form::LoginForm;
pub use widget::{ConnectOutcome, LoginWidget};
