//! `verisure accessories`

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use verisure_core::{Accessory, AccessoryValue, Bridge, ServiceKind};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct AccessoryView {
    name: String,
    service: ServiceKind,
    model: String,
    serial_number: String,
    installation: String,
    current: AccessoryValue,
    target: Option<AccessoryValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reported_at: Option<DateTime<Utc>>,
}

impl From<&Accessory> for AccessoryView {
    fn from(a: &Accessory) -> Self {
        let state = a.last_known();
        Self {
            name: a.name().to_owned(),
            service: a.info().service,
            model: a.info().model.clone(),
            serial_number: a.info().serial_number.clone(),
            installation: a.installation().address().to_owned(),
            current: state.current,
            target: state.target,
            reported_at: a.reported_at(),
        }
    }
}

#[derive(Tabled)]
struct AccessoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    service: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Installation")]
    installation: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Target")]
    target: String,
}

fn to_row(v: &AccessoryView) -> AccessoryRow {
    AccessoryRow {
        name: v.name.clone(),
        service: v.service.to_string(),
        model: v.model.clone(),
        installation: v.installation.clone(),
        current: v.current.to_string(),
        target: v.target.as_ref().map_or_else(|| "-".into(), ToString::to_string),
    }
}

pub async fn list(bridge: &mut Bridge, global: &GlobalOpts) -> Result<(), CliError> {
    let views: Vec<AccessoryView> = bridge
        .discover()
        .await?
        .iter()
        .map(|a| AccessoryView::from(a.as_ref()))
        .collect();

    let rendered = output::render_list(global.output, &views, to_row)?;
    output::print_output(&rendered);
    Ok(())
}
