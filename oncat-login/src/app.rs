use crossterm::style::Stylize;
use oncat_auth::{AuthError, OncatAgent, SessionAgent, Settings};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use crate::login::{ConnectOutcome, LoginOptions, LoginWidget};
use crate::prompt::CredentialPrompt;

/// Instrument names per facility, shown once connected.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstrumentLists {
    pub sns: Vec<String>,
    pub hfir: Vec<String>,
}

impl InstrumentLists {
    /// Clear both lists and, when connected, reload them through the agent.
    pub async fn refresh<A>(&mut self, agent: &A, connected: bool)
    where
        A: SessionAgent + ?Sized,
    {
        self.sns.clear();
        self.hfir.clear();

        if connected {
            self.sns = instrument_names(agent, "SNS").await;
            self.hfir = instrument_names(agent, "HFIR").await;
        }
    }
}

async fn instrument_names<A>(agent: &A, facility: &str) -> Vec<String>
where
    A: SessionAgent + ?Sized,
{
    match agent.list_instruments(facility).await {
        Ok(instruments) => instruments.into_iter().map(|i| i.name).collect(),
        Err(e) => {
            tracing::warn!(facility, "Failed to list instruments: {}", e);
            Vec::new()
        }
    }
}

/// Host application: the login widget plus the instrument lists that
/// follow its connection status.
pub struct App<A: SessionAgent> {
    widget: LoginWidget<A>,
    updates: UnboundedReceiver<bool>,
    instruments: InstrumentLists,
}

impl App<OncatAgent> {
    pub async fn new(
        identity_key: &str,
        settings: &Settings,
        options: LoginOptions,
    ) -> Result<Self, AuthError> {
        let widget = LoginWidget::new(identity_key, settings, options).await?;
        Ok(Self::with_widget(widget))
    }
}

impl<A: SessionAgent> App<A> {
    pub fn with_widget(mut widget: LoginWidget<A>) -> Self {
        let (tx, updates) = unbounded_channel();
        widget.on_connection_updated(move |connected| {
            let _ = tx.send(connected);
        });

        Self {
            widget,
            updates,
            instruments: InstrumentLists::default(),
        }
    }

    pub fn widget(&self) -> &LoginWidget<A> {
        &self.widget
    }

    pub fn instruments(&self) -> &InstrumentLists {
        &self.instruments
    }

    /// Apply queued status broadcasts; only the latest one matters.
    pub async fn process_updates(&mut self) -> Option<bool> {
        let mut latest = None;
        while let Ok(connected) = self.updates.try_recv() {
            latest = Some(connected);
        }

        if let Some(connected) = latest {
            let agent = self.widget.agent();
            self.instruments.refresh(&*agent, connected).await;
        }
        latest
    }

    pub async fn run<P>(&mut self, prompt: &mut P) -> ConnectOutcome
    where
        P: CredentialPrompt + ?Sized,
    {
        self.widget.update_status().await;
        self.process_updates().await;
        self.print_status();

        let outcome = self.widget.connect(prompt).await;
        tracing::info!(?outcome, "Connect finished");

        self.process_updates().await;
        self.print_status();
        self.print_instruments();

        outcome
    }

    fn print_status(&self) {
        let label = self.widget.status_label();
        println!("{}", label.to_string().with(label.color()));
    }

    fn print_instruments(&self) {
        for (facility, names) in [("SNS", &self.instruments.sns), ("HFIR", &self.instruments.hfir)] {
            println!("\n{} Instruments:", facility);
            for name in names {
                println!("  {}", name);
            }
        }
    }
}
