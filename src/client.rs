// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Top-level client: a session plus the device registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Method;
use serde_json::Value;

use crate::config::SkybellConfig;
use crate::device::Device;
use crate::error::{ParseError, Result};
use crate::protocol::endpoints;
use crate::session::Session;

type Registry = HashMap<String, Arc<Device>>;

/// Skybell cloud client.
///
/// Owns the [`Session`] and a registry of [`Device`]s keyed by device id.
/// A device id maps to the same `Arc<Device>` for as long as the registry
/// lives; refreshing updates devices in place. Logging out drops the
/// registry.
///
/// # Examples
///
/// ```no_run
/// use skybell_lib::{Skybell, SkybellConfig};
///
/// #[tokio::main]
/// async fn main() -> skybell_lib::Result<()> {
///     let config = SkybellConfig::new()
///         .with_credentials("user@example.com", "hunter2")
///         .with_auto_login(true);
///     let skybell = Skybell::connect(config).await?;
///
///     for device in skybell.get_devices(false).await? {
///         println!("{}", device.desc());
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Skybell {
    session: Session,
    devices: RwLock<Option<Registry>>,
}

impl Skybell {
    /// Creates a client without any network activity.
    ///
    /// # Errors
    ///
    /// Returns error if the cache file cannot be read or the HTTP client
    /// cannot be created.
    pub fn new(config: SkybellConfig) -> Result<Self> {
        Ok(Self {
            session: Session::new(&config)?,
            devices: RwLock::new(None),
        })
    }

    /// Creates a client, then logs in and loads devices as configured.
    ///
    /// Logs in only when [`auto_login`](SkybellConfig::with_auto_login) is
    /// set and both credentials are present.
    ///
    /// # Errors
    ///
    /// Returns error if construction, the login, or the device fetch fails.
    pub async fn connect(config: SkybellConfig) -> Result<Self> {
        let skybell = Self::new(config.clone())?;

        if config.auto_login() && config.username().is_some() && config.password().is_some() {
            skybell.login(None, None).await?;
        }
        if config.get_devices() {
            skybell.get_devices(false).await?;
        }

        Ok(skybell)
    }

    /// Returns the underlying session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Logs in. See [`Session::login`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError`](crate::error::AuthenticationError) on
    /// failure.
    pub async fn login(&self, username: Option<&str>, password: Option<&str>) -> Result<()> {
        self.session.login(username, password).await
    }

    /// Logs out and drops the device registry.
    ///
    /// Does nothing if not logged in.
    ///
    /// # Errors
    ///
    /// Returns error if the cache cannot be persisted.
    pub fn logout(&self) -> Result<()> {
        if self.session.logout()? {
            *self.devices.write() = None;
        }
        Ok(())
    }

    /// Returns all devices.
    ///
    /// The device list is fetched when the registry has never been
    /// populated or `refresh` is set. Known devices get their core record
    /// updated in place; new ones are created and added.
    ///
    /// # Errors
    ///
    /// Returns error if the list request fails, the response is not an
    /// array, or a new device cannot be created.
    pub async fn get_devices(&self, refresh: bool) -> Result<Vec<Arc<Device>>> {
        let cached = if refresh {
            None
        } else {
            self.devices
                .read()
                .as_ref()
                .map(|devices| devices.values().cloned().collect::<Vec<_>>())
        };
        if let Some(devices) = cached {
            return Ok(devices);
        }

        tracing::info!("Updating all devices");
        let response = self
            .session
            .send_request(Method::GET, endpoints::DEVICES, None)
            .await?;
        tracing::debug!(body = %response.body(), "Get devices response");

        let Value::Array(records) = response.json()? else {
            return Err(ParseError::UnexpectedFormat("device list is not an array".to_string()).into());
        };

        for record in records {
            let Value::Object(core) = record else {
                tracing::warn!("Skipping device record that is not an object");
                continue;
            };
            let Some(device_id) = core.get("id").and_then(Value::as_str).map(str::to_string) else {
                tracing::warn!("Skipping device record without id");
                continue;
            };

            let existing = self
                .devices
                .read()
                .as_ref()
                .and_then(|devices| devices.get(&device_id).cloned());

            if let Some(device) = existing {
                device.update(Some(core), None, None);
            } else {
                let device = Arc::new(Device::new(core, self.session.clone()).await?);
                self.devices
                    .write()
                    .get_or_insert_with(HashMap::new)
                    .insert(device_id, device);
            }
        }

        let mut devices = self.devices.write();
        Ok(devices
            .get_or_insert_with(HashMap::new)
            .values()
            .cloned()
            .collect())
    }

    /// Returns one device, or `None` for an unknown id.
    ///
    /// If the registry has never been populated it is loaded first, and the
    /// device is not refreshed again. Otherwise, with `refresh`, only this
    /// device is refreshed.
    ///
    /// # Errors
    ///
    /// Returns error if loading the registry or refreshing the device fails.
    pub async fn get_device(&self, device_id: &str, refresh: bool) -> Result<Option<Arc<Device>>> {
        let populated = self.devices.read().is_some();
        let refresh = if populated {
            refresh
        } else {
            self.get_devices(false).await?;
            false
        };

        let device = self
            .devices
            .read()
            .as_ref()
            .and_then(|devices| devices.get(device_id).cloned());

        if refresh && let Some(device) = &device {
            device.refresh().await?;
        }

        Ok(device)
    }
}
