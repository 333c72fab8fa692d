// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote services: lock, unlock, horn, light flash, charge start/stop.
//!
//! Preconditions are checked against the account's last-known vehicle
//! state before anything is sent. Services the API does not offer in this
//! mode fail without a network call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::vehicle::{Account, ChargingState, Vehicle};

pub const REMOTE_SERVICE_BASE_URL: &str = "/eadrax-vrccs/v3/presentation/remote-commands";
pub const VEHICLE_CHARGING_BASE_URL: &str = "/eadrax-crccs/v1/vehicles";

/// Remote services known to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    #[serde(rename = "light-flash")]
    LightFlash,
    #[serde(rename = "vehicle-finder")]
    VehicleFinder,
    #[serde(rename = "door-lock")]
    DoorLock,
    #[serde(rename = "door-unlock")]
    DoorUnlock,
    #[serde(rename = "horn-blow")]
    Horn,
    #[serde(rename = "climate-now")]
    AirConditioning,
    #[serde(rename = "start-charging")]
    ChargeStart,
    #[serde(rename = "stop-charging")]
    ChargeStop,
    #[serde(rename = "CHARGING_SETTINGS")]
    ChargingSettings,
    #[serde(rename = "CHARGING_PROFILE")]
    ChargingProfile,
    #[serde(rename = "SEND_POI")]
    SendPoi,
}

impl Service {
    pub const ALL: [Service; 11] = [
        Service::LightFlash,
        Service::VehicleFinder,
        Service::DoorLock,
        Service::DoorUnlock,
        Service::Horn,
        Service::AirConditioning,
        Service::ChargeStart,
        Service::ChargeStop,
        Service::ChargingSettings,
        Service::ChargingProfile,
        Service::SendPoi,
    ];

    /// Wire name used in endpoint paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LightFlash => "light-flash",
            Self::VehicleFinder => "vehicle-finder",
            Self::DoorLock => "door-lock",
            Self::DoorUnlock => "door-unlock",
            Self::Horn => "horn-blow",
            Self::AirConditioning => "climate-now",
            Self::ChargeStart => "start-charging",
            Self::ChargeStop => "stop-charging",
            Self::ChargingSettings => "CHARGING_SETTINGS",
            Self::ChargingProfile => "CHARGING_PROFILE",
            Self::SendPoi => "SEND_POI",
        }
    }

    /// Endpoint path for this service on `vin`.
    pub fn url(&self, vin: &str) -> String {
        match self {
            Self::ChargeStart | Self::ChargeStop => {
                format!("{VEHICLE_CHARGING_BASE_URL}/{vin}/{}", self.as_str())
            }
            _ => format!("{REMOTE_SERVICE_BASE_URL}/{vin}/{}", self.as_str()),
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Service::ALL
            .into_iter()
            .find(|svc| svc.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Configuration(format!("unknown remote service {s}")))
    }
}

/// State of a remote service execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    Initiated,
    Pending,
    Delivered,
    Executed,
    Error,
    Ignored,
    #[serde(other)]
    Unknown,
}

/// Outcome of a remote service call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteServiceStatus {
    pub state: ExecutionState,
    pub details: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl RemoteServiceStatus {
    /// Read `eventStatus` (and `eventId`) from a response document.
    pub fn from_response(details: serde_json::Value) -> Self {
        let state = details
            .get("eventStatus")
            .cloned()
            .and_then(|s| serde_json::from_value(s).ok())
            .unwrap_or(ExecutionState::Unknown);
        let event_id = details.get("eventId").and_then(|v| v.as_str()).map(str::to_owned);
        Self { state, details, event_id }
    }

    fn with_state(state: ExecutionState) -> Self {
        let status = serde_json::to_value(state).unwrap_or(serde_json::Value::Null);
        Self { state, details: serde_json::json!({ "eventStatus": status }), event_id: None }
    }

    pub fn executed() -> Self {
        Self::with_state(ExecutionState::Executed)
    }

    pub fn ignored() -> Self {
        Self::with_state(ExecutionState::Ignored)
    }
}

/// Triggers remote services on one vehicle of an account.
pub struct RemoteServices<'a> {
    account: &'a Account,
    vin: String,
}

impl<'a> RemoteServices<'a> {
    pub fn new(account: &'a Account, vin: impl Into<String>) -> Self {
        Self { account, vin: vin.into() }
    }

    pub fn vin(&self) -> &str {
        &self.vin
    }

    async fn vehicle(&self) -> Result<Vehicle> {
        self.account.vehicle(&self.vin).await
    }

    /// POST `data` (default `{}`) to the service endpoint as the vehicle's
    /// brand, then optionally refresh every vehicle of the account.
    ///
    /// An accepted request counts as executed unless the response reports
    /// its own `eventStatus`.
    pub async fn trigger_remote_service(
        &self,
        service: Service,
        params: &[(&str, &str)],
        data: Option<serde_json::Value>,
        refresh: bool,
    ) -> Result<RemoteServiceStatus> {
        let vehicle = self.vehicle().await?;
        let body = data.unwrap_or_else(|| serde_json::json!({}));
        tracing::info!(vin = %self.vin, service = %service, "triggering remote service");
        let resp = self
            .account
            .client()
            .post_json(&service.url(&self.vin), params, &body, &vehicle.brand)
            .await?;

        if refresh {
            self.account.get_vehicles().await?;
        }
        if resp.get("eventStatus").is_some() {
            return Ok(RemoteServiceStatus::from_response(resp));
        }
        Ok(RemoteServiceStatus::executed())
    }

    pub async fn trigger_remote_light_flash(&self) -> Result<RemoteServiceStatus> {
        let vehicle = self.vehicle().await?;
        require(Service::LightFlash, vehicle.is_remote_lights_enabled())?;
        self.trigger_remote_service(Service::LightFlash, &[], None, false).await
    }

    pub async fn trigger_remote_door_lock(&self) -> Result<RemoteServiceStatus> {
        let vehicle = self.vehicle().await?;
        require(Service::DoorLock, vehicle.is_remote_lock_enabled())?;
        self.trigger_remote_service(Service::DoorLock, &[], None, true).await
    }

    pub async fn trigger_remote_door_unlock(&self) -> Result<RemoteServiceStatus> {
        let vehicle = self.vehicle().await?;
        require(Service::DoorUnlock, vehicle.is_remote_unlock_enabled())?;
        self.trigger_remote_service(Service::DoorUnlock, &[], None, true).await
    }

    pub async fn trigger_remote_horn(&self) -> Result<RemoteServiceStatus> {
        let vehicle = self.vehicle().await?;
        require(Service::Horn, vehicle.is_remote_horn_enabled())?;
        self.trigger_remote_service(Service::Horn, &[], None, false).await
    }

    pub async fn trigger_charge_start(&self) -> Result<RemoteServiceStatus> {
        let vehicle = self.vehicle().await?;
        require(Service::ChargeStart, vehicle.is_remote_charge_start_enabled())?;
        if !vehicle.is_charger_connected() {
            tracing::warn!(vin = %self.vin, "charger not connected, cannot start charging");
            return Ok(RemoteServiceStatus::ignored());
        }
        self.trigger_remote_service(Service::ChargeStart, &[], None, true).await
    }

    pub async fn trigger_charge_stop(&self) -> Result<RemoteServiceStatus> {
        let vehicle = self.vehicle().await?;
        require(Service::ChargeStop, vehicle.is_remote_charge_stop_enabled())?;
        if !vehicle.is_charger_connected() {
            tracing::warn!(vin = %self.vin, "charger not connected, cannot stop charging");
            return Ok(RemoteServiceStatus::ignored());
        }
        if vehicle.charging_status() != ChargingState::Charging {
            tracing::warn!(vin = %self.vin, "vehicle not charging, cannot stop charging");
            return Ok(RemoteServiceStatus::ignored());
        }
        self.trigger_remote_service(Service::ChargeStop, &[], None, true).await
    }

    pub async fn trigger_remote_air_conditioning(&self) -> Result<RemoteServiceStatus> {
        Err(Error::UnsupportedService(Service::AirConditioning))
    }

    pub async fn trigger_remote_air_conditioning_stop(&self) -> Result<RemoteServiceStatus> {
        Err(Error::UnsupportedService(Service::AirConditioning))
    }

    pub async fn trigger_charging_settings_update(
        &self,
        _target_soc: Option<u8>,
        _ac_limit: Option<u16>,
    ) -> Result<RemoteServiceStatus> {
        Err(Error::UnsupportedService(Service::ChargingSettings))
    }

    pub async fn trigger_charging_profile_update(
        &self,
        _charging_mode: Option<String>,
        _precondition_climate: Option<bool>,
    ) -> Result<RemoteServiceStatus> {
        Err(Error::UnsupportedService(Service::ChargingProfile))
    }

    pub async fn trigger_send_poi(&self, _poi: serde_json::Value) -> Result<RemoteServiceStatus> {
        Err(Error::UnsupportedService(Service::SendPoi))
    }

    pub async fn trigger_remote_vehicle_finder(&self) -> Result<RemoteServiceStatus> {
        Err(Error::UnsupportedService(Service::VehicleFinder))
    }

    /// Dispatch by service name, as the CLI does.
    pub async fn trigger(&self, service: Service) -> Result<RemoteServiceStatus> {
        match service {
            Service::LightFlash => self.trigger_remote_light_flash().await,
            Service::DoorLock => self.trigger_remote_door_lock().await,
            Service::DoorUnlock => self.trigger_remote_door_unlock().await,
            Service::Horn => self.trigger_remote_horn().await,
            Service::ChargeStart => self.trigger_charge_start().await,
            Service::ChargeStop => self.trigger_charge_stop().await,
            Service::VehicleFinder
            | Service::AirConditioning
            | Service::ChargingSettings
            | Service::ChargingProfile
            | Service::SendPoi => Err(Error::UnsupportedService(service)),
        }
    }
}

fn require(service: Service, enabled: bool) -> Result<()> {
    if enabled {
        Ok(())
    } else {
        Err(Error::NotSupportedByVehicle(service))
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
