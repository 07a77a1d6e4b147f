// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `skybellcl` - command line front end for `skybell_lib`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use skybell_lib::device::EVENT_MOTION;
use skybell_lib::{Device, Skybell, SkybellConfig};

/// Skybell command line utility.
#[derive(Debug, Parser)]
#[command(name = "skybellcl", version, about)]
struct Cli {
    /// Account username
    #[arg(short, long, env = "SKYBELL_USERNAME")]
    username: String,

    /// Account password
    #[arg(short, long, env = "SKYBELL_PASSWORD", hide_env_values = true)]
    password: String,

    /// Output all devices
    #[arg(long)]
    devices: bool,

    /// Output one device
    #[arg(long, value_name = "DEVICE_ID")]
    device: Vec<String>,

    /// Output the JSON for a device
    #[arg(long, value_name = "DEVICE_ID")]
    json: Vec<String>,

    /// Output the last motion activity JSON for a device
    #[arg(long, value_name = "DEVICE_ID")]
    last_json: Vec<String>,

    /// Output the last activity image URL for a device
    #[arg(long, value_name = "DEVICE_ID")]
    last_image: Vec<String>,

    /// Session cache file
    #[arg(long, value_name = "PATH", default_value = SkybellConfig::DEFAULT_CACHE_PATH)]
    cache_path: PathBuf,

    /// Enable debug logging
    #[arg(long, conflicts_with = "quiet")]
    debug: bool,

    /// Output only warnings and errors
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.debug, cli.quiet);

    if let Err(err) = run(cli).await {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool, quiet: bool) {
    let level = if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{level},reqwest=warn,hyper=warn"))),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> skybell_lib::Result<()> {
    let config = SkybellConfig::new()
        .with_credentials(cli.username, cli.password)
        .with_cache_path(cli.cache_path)
        .with_get_devices(true);
    let skybell = Skybell::connect(config).await?;

    for device_id in &cli.json {
        if let Some(device) = find(&skybell, device_id).await? {
            let json = pretty(&Value::Object(device.core_json()));
            tracing::info!("{device_id} JSON:\n{json}");
        }
    }

    if cli.devices {
        for device in skybell.get_devices(false).await? {
            tracing::info!("{}", device.desc());
        }
    }

    for device_id in &cli.device {
        if let Some(device) = find(&skybell, device_id).await? {
            tracing::info!("{}", device.desc());
        }
    }

    for device_id in &cli.last_json {
        if let Some(device) = find(&skybell, device_id).await? {
            match device.latest(Some(EVENT_MOTION)) {
                Some(activity) => tracing::info!("{}", pretty(&activity.to_value())),
                None => tracing::info!("{device_id} has no motion activity"),
            }
        }
    }

    for device_id in &cli.last_image {
        if let Some(device) = find(&skybell, device_id).await? {
            match device.image() {
                Some(url) => tracing::info!("{url}"),
                None => tracing::info!("{device_id} has no activity image"),
            }
        }
    }

    Ok(())
}

async fn find(skybell: &Skybell, device_id: &str) -> skybell_lib::Result<Option<Arc<Device>>> {
    let device = skybell.get_device(device_id, false).await?;
    if device.is_none() {
        tracing::warn!("Could not find device with id: {device_id}");
    }
    Ok(device)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
