#![deny(unsafe_code)]

/// Chat application coordinator and terminal shim.
///
/// This crate wires the session store, the simulated responder, and the
/// stub auth gate together: the `ChatController` owns the session for the
/// lifetime of the run, drives reply exchanges, and notifies subscribers;
/// the shim in `repl` is a deliberately thin presentation layer over it.
pub mod config;
pub mod controller;
/// Change notifications emitted to the presentation layer.
pub mod events;
pub mod repl;

pub use config::AppSettings;
pub use controller::ChatController;
pub use events::SessionEvent;
