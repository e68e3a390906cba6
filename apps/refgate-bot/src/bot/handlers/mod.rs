pub mod admin;
pub mod callback;
pub mod command;
pub mod contact;

/// Errors are logged by the dispatcher and never stop it.
pub type HandlerResult = anyhow::Result<()>;
