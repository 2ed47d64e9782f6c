//! Command handlers.

pub mod accessories;
pub mod accessory;
pub mod config_cmd;

use std::sync::Arc;

use verisure_core::{Accessory, Bridge};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Run a command that needs a connected bridge.
pub async fn dispatch(
    cmd: Command,
    bridge: &mut Bridge,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Accessories => accessories::list(bridge, global).await,
        Command::Get(args) => accessory::get(&args, bridge, global).await,
        Command::Set(args) => accessory::set(args, bridge, global).await,
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Discover accessories and look one up by display name.
async fn find_accessory(bridge: &mut Bridge, name: &str) -> Result<Arc<Accessory>, CliError> {
    bridge.discover().await?;
    bridge
        .accessory(name)
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "accessory".into(),
            identifier: name.into(),
        })
}
