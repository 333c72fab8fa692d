// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vehicle list and last-known state for one account.
//!
//! Only the fields remote services depend on are modelled; the raw state
//! document is kept alongside for callers that need more.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::auth::Authenticator;
use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::remote::RemoteServices;

pub const VEHICLES_URL: &str = "/eadrax-vcs/v4/vehicles";
pub const VEHICLE_STATE_URL: &str = "/eadrax-vcs/v4/vehicles/state";

/// Brand used for the `x-user-agent` header.
pub const DEFAULT_BRAND: &str = "bmw";

/// Charging status as reported by the vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargingState {
    Charging,
    Complete,
    Error,
    FinishedFullyCharged,
    FinishedNotFull,
    Invalid,
    NotCharging,
    Plugged,
    Waiting,
    TargetReached,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricChargingState {
    #[serde(default)]
    pub is_charger_connected: bool,
    #[serde(default)]
    pub charging_status: ChargingState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Reported as an integer or a float depending on the vehicle.
    pub charging_level_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electric_charging_state: Option<ElectricChargingState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteChargingCommands {
    #[serde(default)]
    pub charging_control: Vec<String>,
}

/// Remote capabilities advertised for a vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    #[serde(default)]
    pub lock: bool,
    #[serde(default)]
    pub unlock: bool,
    #[serde(default)]
    pub horn: bool,
    #[serde(default)]
    pub lights: bool,
    #[serde(default)]
    pub vehicle_finder: bool,
    #[serde(default)]
    pub remote_charging_commands: RemoteChargingCommands,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VehicleAttributes {
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct VehicleListEntry {
    vin: String,
    #[serde(default)]
    attributes: VehicleAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VehicleStateResponse {
    #[serde(default)]
    state: serde_json::Value,
    #[serde(default)]
    capabilities: Capabilities,
}

/// Last-known snapshot of one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vin: String,
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub state: VehicleState,
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Full state document as returned by the API.
    #[serde(default)]
    pub raw_state: serde_json::Value,
}

impl Vehicle {
    pub fn is_remote_lock_enabled(&self) -> bool {
        self.capabilities.lock
    }

    pub fn is_remote_unlock_enabled(&self) -> bool {
        self.capabilities.unlock
    }

    pub fn is_remote_horn_enabled(&self) -> bool {
        self.capabilities.horn
    }

    pub fn is_remote_lights_enabled(&self) -> bool {
        self.capabilities.lights
    }

    pub fn is_remote_charge_start_enabled(&self) -> bool {
        self.has_charging_control("START")
    }

    pub fn is_remote_charge_stop_enabled(&self) -> bool {
        self.has_charging_control("STOP")
    }

    fn has_charging_control(&self, command: &str) -> bool {
        let controls = &self.capabilities.remote_charging_commands.charging_control;
        controls.iter().any(|c| c.eq_ignore_ascii_case(command))
    }

    pub fn is_charger_connected(&self) -> bool {
        self.state.electric_charging_state.as_ref().is_some_and(|s| s.is_charger_connected)
    }

    pub fn charging_status(&self) -> ChargingState {
        self.state.electric_charging_state.as_ref().map(|s| s.charging_status).unwrap_or_default()
    }
}

/// One customer account: its API client and the cached vehicles.
pub struct Account {
    client: ApiClient,
    vehicles: RwLock<Vec<Vehicle>>,
}

impl Account {
    pub fn new(auth: Arc<Authenticator>) -> Result<Self> {
        Ok(Self { client: ApiClient::new(auth, DEFAULT_BRAND)?, vehicles: RwLock::new(Vec::new()) })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn gcid(&self) -> Option<String> {
        self.client.authenticator().gcid().await
    }

    /// Fetch the vehicle list and each vehicle's state, replacing the cache.
    pub async fn get_vehicles(&self) -> Result<()> {
        let entries: Vec<VehicleListEntry> = self.client.get_json(VEHICLES_URL, &[]).await?;
        let mut fetched = Vec::with_capacity(entries.len());
        for entry in entries {
            let resp: VehicleStateResponse =
                self.client.get_json(VEHICLE_STATE_URL, &[("bmw-vin", entry.vin.as_str())]).await?;
            let state = parse_state(&entry.vin, &resp.state)?;
            fetched.push(Vehicle {
                brand: entry.attributes.brand.unwrap_or_else(|| DEFAULT_BRAND.to_owned()),
                model: entry.attributes.model,
                vin: entry.vin,
                state,
                capabilities: resp.capabilities,
                raw_state: resp.state,
            });
        }
        tracing::debug!(count = fetched.len(), "vehicle state refreshed");
        *self.vehicles.write().await = fetched;
        Ok(())
    }

    pub async fn vehicles(&self) -> Vec<Vehicle> {
        self.vehicles.read().await.clone()
    }

    /// Last-known snapshot of the vehicle with `vin`.
    pub async fn vehicle(&self, vin: &str) -> Result<Vehicle> {
        self.vehicles
            .read()
            .await
            .iter()
            .find(|v| v.vin == vin)
            .cloned()
            .ok_or_else(|| Error::VehicleNotFound(vin.to_owned()))
    }

    pub fn remote_services(&self, vin: impl Into<String>) -> RemoteServices<'_> {
        RemoteServices::new(self, vin)
    }
}

/// Parse the modelled part of a state document.
///
/// A document that does not match is an error, never an empty state.
pub(crate) fn parse_state(vin: &str, raw: &serde_json::Value) -> Result<VehicleState> {
    if raw.is_null() {
        return Ok(VehicleState::default());
    }
    VehicleState::deserialize(raw).map_err(|e| {
        tracing::warn!(vin, err = %e, "unreadable vehicle state");
        Error::api(format!("unreadable vehicle state for {vin}: {e}"))
    })
}

#[cfg(test)]
#[path = "vehicle_tests.rs"]
mod tests;
