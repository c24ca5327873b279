use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Stylize};
use crossterm::terminal;
use std::io::{self, BufRead, Write};

use crate::login::{LoginForm, LoginOptions, PasswordEcho};
use crate::prompt::{CredentialPrompt, PromptAction};

/// Credential prompt on the controlling terminal.
///
/// The password is read in raw mode so it is never echoed. Esc or Ctrl+C
/// while typing it cancels the dialog.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialPrompt for TerminalPrompt {
    fn prompt(&mut self, form: &mut LoginForm, options: &LoginOptions) -> PromptAction {
        match read_credentials(form, options) {
            Ok(action) => action,
            Err(e) => {
                tracing::error!("Failed to read credentials: {}", e);
                PromptAction::Cancel
            }
        }
    }

    fn show_message(&mut self, message: &str) {
        eprintln!("{}", message.with(Color::Red));
    }
}

fn read_credentials(form: &mut LoginForm, options: &LoginOptions) -> io::Result<PromptAction> {
    println!("\n=== {} ===\n", options.title);

    loop {
        let username_prompt = format!("{} [{}]: ", options.username_label, form.username());
        let Some(username) = read_line(&username_prompt)? else {
            return Ok(PromptAction::Cancel);
        };
        if !username.is_empty() {
            form.set_username(username);
        }

        let password_prompt = format!("{}: ", options.password_label);
        let password = match options.password_echo {
            PasswordEcho::Hidden => read_hidden(&password_prompt)?,
            PasswordEcho::Visible => read_line(&password_prompt)?,
        };
        let Some(password) = password else {
            return Ok(PromptAction::Cancel);
        };
        form.set_password(password);

        if form.can_submit() {
            return Ok(PromptAction::Submit);
        }

        eprintln!(
            "{} and {} are both required.",
            options.username_label, options.password_label
        );
    }
}

/// `None` on end of input
fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// `None` when the user cancels
fn read_hidden(prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut password = String::new();
    let entered = {
        let _raw = RawModeGuard::enable()?;
        loop {
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }

            match code {
                KeyCode::Enter => break true,
                KeyCode::Esc => break false,
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break false,
                KeyCode::Backspace => {
                    password.pop();
                }
                KeyCode::Char(c) => password.push(c),
                _ => {}
            }
        }
    };
    println!();

    Ok(entered.then_some(password))
}
