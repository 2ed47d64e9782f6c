//! `verisure get` and `verisure set`

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;

use verisure_core::{AccessoryHandle, AccessoryValue, Bridge};

use crate::cli::{GetArgs, GlobalOpts, SetArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ValueView<'a> {
    name: &'a str,
    value: Value,
    display: String,
}

impl<'a> ValueView<'a> {
    fn new(name: &'a str, value: AccessoryValue) -> Self {
        Self {
            name,
            value: value.to_characteristic(),
            display: value.to_string(),
        }
    }
}

fn print_value(global: &GlobalOpts, view: &ValueView<'_>) -> Result<(), CliError> {
    let rendered = output::render_single(global.output, view, |v| {
        format!("{}: {}", v.name, v.display)
    })?;
    output::print_output(&rendered);
    Ok(())
}

pub async fn get(args: &GetArgs, bridge: &mut Bridge, global: &GlobalOpts) -> Result<(), CliError> {
    let accessory = super::find_accessory(bridge, &args.name).await?;
    let value = if args.target {
        accessory.get_target_value().await?
    } else {
        accessory.get_current_value().await?
    };
    print_value(global, &ValueView::new(accessory.name(), value))
}

/// Set through the host adapter, the same path an accessory host takes.
pub async fn set(args: SetArgs, bridge: &mut Bridge, global: &GlobalOpts) -> Result<(), CliError> {
    let accessory = super::find_accessory(bridge, &args.name).await?;
    let handle = AccessoryHandle::new(Arc::clone(&accessory));

    let (tx, rx) = oneshot::channel();
    handle.set_target_value(Value::String(args.value), move |result| {
        let _ = tx.send(result);
    });
    rx.await.map_err(|_| CliError::Internal {
        message: "set operation ended without reporting a result".into(),
    })??;

    let state = accessory.last_known();
    let value = state.target.unwrap_or(state.current);
    print_value(global, &ValueView::new(accessory.name(), value))
}
