use std::sync::Arc;

use mira::config::AppSettings;
use mira::controller::ChatController;
use mira::repl::{ChatShell, ShellError, stdin_lines};
use mira_assistant::{ResponderConfig, SIMULATED_RESPONDER_ID, SimulatedResponder};
use mira_auth::StubAuthGate;
use mira_session::Session;

/// Application entry point.
///
/// Builds the whole object graph up front: settings, the stub auth gate,
/// the simulated responder, and the controller owning the seeded session.
/// The session lives exactly as long as this run; nothing persists.
#[tokio::main]
async fn main() -> Result<(), ShellError> {
    // Initialize tracing for development debugging
    tracing_subscriber::fmt::init();

    let settings = AppSettings::load();
    tracing::info!(?settings, "settings resolved");

    let gate = StubAuthGate::new(settings.auth_delay());
    let responder = Arc::new(SimulatedResponder::new(ResponderConfig::new(
        SIMULATED_RESPONDER_ID,
        settings.reply_delay(),
    )));
    let controller = ChatController::new(Session::with_seed_history(), responder);

    let mut input = stdin_lines();
    let mut shell = ChatShell::new(controller, settings);
    if shell.sign_in(&gate, &mut input).await? {
        shell.run(input).await?;
    }

    Ok(())
}
