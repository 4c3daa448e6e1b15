use std::io::Write;

use snafu::{ResultExt, Snafu};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use mira_auth::{AuthGate, AuthOutcome, AuthRequest, LoginCredentials};
use mira_session::{ConversationId, Role};

use crate::config::AppSettings;
use crate::controller::ChatController;
use crate::events::SessionEvent;

/// Shown when the voice capability flag is off, matching the affordance
/// this shim stands in for.
const VOICE_UNAVAILABLE_NOTICE: &str =
    "Speech recognition is not available in this environment. Please type your message.";
const VOICE_DISABLED_NOTICE: &str = "Voice input is currently disabled. Please type your message.";

/// Terminal input source, line by line.
pub type InputLines = Lines<BufReader<Stdin>>;

/// Builds the shared stdin line reader.
pub fn stdin_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

pub type ShellResult<T> = Result<T, ShellError>;

#[derive(Debug, Snafu)]
pub enum ShellError {
    #[snafu(display("failed to read terminal input"))]
    ReadInput {
        stage: &'static str,
        source: std::io::Error,
    },
    #[snafu(display("failed to write terminal output"))]
    WriteOutput {
        stage: &'static str,
        source: std::io::Error,
    },
}

/// Line-oriented presentation shim over the chat controller.
///
/// Deliberately thin: every rule it appears to enforce (blank sends,
/// send-while-replying, unknown ids) is enforced by the core independently;
/// the shim only mirrors the affordances and renders change events.
pub struct ChatShell {
    controller: ChatController,
    settings: AppSettings,
}

impl ChatShell {
    pub fn new(controller: ChatController, settings: AppSettings) -> Self {
        Self {
            controller,
            settings,
        }
    }

    /// Prompts for credentials and drives the auth gate until it accepts
    /// or stdin closes. Returns false when aborted by EOF.
    pub async fn sign_in(
        &mut self,
        gate: &dyn AuthGate,
        input: &mut InputLines,
    ) -> ShellResult<bool> {
        println!("Welcome back. Sign in to continue.");
        loop {
            let Some(email) = prompt_line(input, "Email: ").await? else {
                return Ok(false);
            };
            let Some(password) = prompt_line(input, "Password: ").await? else {
                return Ok(false);
            };

            let request = AuthRequest::Login(LoginCredentials::new(email, password));
            match gate.submit(request).await {
                Ok(AuthOutcome::Accepted) => {
                    println!("Signed in.");
                    return Ok(true);
                }
                Err(error) => println!("{error}"),
            }
        }
    }

    /// Runs the chat loop until `:quit` or EOF.
    pub async fn run(mut self, input: InputLines) -> ShellResult<()> {
        let mut events = self.controller.subscribe();
        let (line_tx, mut line_rx) = mpsc::unbounded_channel();
        let forwarder = spawn_line_forwarder(input, line_tx);

        println!();
        println!("Commands: :new, :open <id>, :list, :voice, :quit. Anything else is sent.");
        self.print_directory();
        self.print_prompt()?;

        loop {
            tokio::select! {
                line = line_rx.recv() => {
                    match line {
                        Some(line) => {
                            let line = line.context(ReadInputSnafu { stage: "read-command" })?;
                            if !self.handle_line(line.trim()) {
                                break;
                            }
                            self.print_prompt()?;
                        }
                        None => break,
                    }
                }
                Some(event) = events.recv() => {
                    self.render_event(event);
                    self.print_prompt()?;
                }
            }
        }

        forwarder.abort();
        self.controller.shutdown();
        Ok(())
    }

    /// Returns false when the shell should exit.
    fn handle_line(&mut self, line: &str) -> bool {
        match line {
            "" => true,
            ":quit" | ":q" => false,
            ":list" => {
                self.print_directory();
                true
            }
            ":new" => {
                self.controller.create_conversation();
                true
            }
            ":voice" => {
                if self.settings.voice_input_enabled {
                    println!("{VOICE_DISABLED_NOTICE}");
                } else {
                    println!("{VOICE_UNAVAILABLE_NOTICE}");
                }
                true
            }
            _ if line.starts_with(":open") => {
                self.handle_open(line);
                true
            }
            _ => {
                self.handle_send(line);
                true
            }
        }
    }

    fn handle_open(&mut self, line: &str) {
        let raw = line.trim_start_matches(":open").trim();
        let Ok(id) = raw.parse::<u64>() else {
            println!("Usage: :open <id>");
            return;
        };

        let id = ConversationId::new(id);
        self.controller.select_conversation(id);
        if self.controller.active_conversation_id() == Some(id) {
            self.print_transcript();
        } else {
            println!("No conversation {id}.");
        }
    }

    fn handle_send(&mut self, line: &str) {
        if self.controller.is_assistant_typing() {
            println!("The assistant is still replying. One exchange at a time.");
            return;
        }
        if self.controller.send_message(line).is_none() {
            println!("Nothing to send.");
        }
    }

    fn render_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::MessagesChanged { conversation_id } => {
                if self.controller.active_conversation_id() == Some(conversation_id) {
                    // Only assistant turns are rendered; the user just
                    // typed their own line.
                    if let Some(message) = self.controller.active_messages().last()
                        && message.role == Role::Assistant
                    {
                        println!("assistant> {}", message.content);
                    }
                } else {
                    println!("(a reply arrived in conversation {conversation_id})");
                }
            }
            SessionEvent::TypingChanged {
                conversation_id,
                is_typing: true,
            } => {
                if self.controller.active_conversation_id() == Some(conversation_id) {
                    println!("assistant is typing...");
                }
            }
            SessionEvent::TypingChanged { .. } | SessionEvent::ConversationsChanged => {}
        }
    }

    fn print_directory(&self) {
        let active = self.controller.active_conversation_id();
        for summary in self.controller.list_conversations() {
            let marker = if active == Some(summary.id) { "*" } else { " " };
            println!("{marker} {:>3}  {}", summary.id.raw(), summary.title);
        }
    }

    fn print_transcript(&self) {
        for message in self.controller.active_messages() {
            let speaker = match message.role {
                Role::User => "you",
                Role::Assistant => "assistant",
            };
            println!("{speaker}> {}", message.content);
        }
    }

    fn print_prompt(&self) -> ShellResult<()> {
        print!("> ");
        std::io::stdout()
            .flush()
            .context(WriteOutputSnafu { stage: "prompt" })
    }
}

fn spawn_line_forwarder(
    mut input: InputLines,
    tx: mpsc::UnboundedSender<std::io::Result<String>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match input.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(Ok(line)).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    let _ = tx.send(Err(error));
                    break;
                }
            }
        }
    })
}

async fn prompt_line(input: &mut InputLines, prompt: &str) -> ShellResult<Option<String>> {
    print!("{prompt}");
    std::io::stdout()
        .flush()
        .context(WriteOutputSnafu { stage: "prompt" })?;

    input
        .next_line()
        .await
        .context(ReadInputSnafu { stage: "read-field" })
}
