//! Domain to hub record conversion
//!
//! [`EntityConverter`] turns the operator-side view into the hub's wire
//! shape. A conversion can degrade gracefully: missing optional data
//! becomes a warning on an otherwise usable record, while a record the
//! hub could never accept fails with [`ConvertError`]. Warnings gathered
//! before the failure survive on the error so callers can still surface
//! them.

use chrono::Utc;
use thiserror::Error;

use roam_core::{ChargePointRecord, EvseStatus, EvseStatusRecord, PartnerId};

use crate::domain::{ChargePoint, OperationalState, StatusUpdate};

/// A successful conversion plus anything worth telling the operator about
#[derive(Debug, Clone)]
pub struct Conversion<T> {
    pub record: T,
    pub warnings: Vec<String>,
}

impl<T> Conversion<T> {
    pub fn clean(record: T) -> Self {
        Self {
            record,
            warnings: Vec::new(),
        }
    }
}

/// A conversion the hub could never accept
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConvertError {
    pub message: String,
    /// Warnings gathered before the conversion failed
    pub warnings: Vec<String>,
}

impl ConvertError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Converts operator domain entities into hub records
pub trait EntityConverter: Send + Sync {
    fn charge_point(&self, cp: &ChargePoint) -> Result<Conversion<ChargePointRecord>, ConvertError>;

    fn status(&self, update: &StatusUpdate) -> Result<Conversion<EvseStatusRecord>, ConvertError>;
}

/// Default mapping from the operator model to hub records
pub struct RecordMapper {
    operator: PartnerId,
}

impl RecordMapper {
    pub fn new(operator: PartnerId) -> Self {
        Self { operator }
    }

    fn check_evse_id(evse_id: &str) -> Result<(), ConvertError> {
        if evse_id.trim().is_empty() {
            return Err(ConvertError::new("EVSE id is empty"));
        }
        if !evse_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '*' || c == '-')
        {
            return Err(ConvertError::new(format!(
                "EVSE id {evse_id:?} contains characters the hub rejects"
            )));
        }
        Ok(())
    }
}

/// Map an operational state onto the hub's status vocabulary
pub fn map_state(state: OperationalState) -> EvseStatus {
    match state {
        OperationalState::Free => EvseStatus::Available,
        OperationalState::Charging => EvseStatus::Occupied,
        OperationalState::Reserved => EvseStatus::Reserved,
        OperationalState::Fault | OperationalState::Maintenance => EvseStatus::OutOfService,
    }
}

impl EntityConverter for RecordMapper {
    fn charge_point(&self, cp: &ChargePoint) -> Result<Conversion<ChargePointRecord>, ConvertError> {
        let mut warnings = Vec::new();

        if cp.name.trim().is_empty() {
            warnings.push(format!("{}: no display name, partners see the EVSE id", cp.evse_id));
        }
        let position = match (cp.latitude, cp.longitude) {
            (Some(latitude), Some(longitude)) => {
                Some(roam_core::GeoPosition { latitude, longitude })
            }
            (None, None) => {
                warnings.push(format!("{}: no geo position, map placement unavailable", cp.evse_id));
                None
            }
            _ => {
                warnings.push(format!("{}: incomplete geo position dropped", cp.evse_id));
                None
            }
        };
        if cp.max_power_kw <= 0.0 {
            return Err(
                ConvertError::new(format!("{}: non-positive max power", cp.evse_id))
                    .with_warnings(warnings),
            );
        }
        Self::check_evse_id(&cp.evse_id).map_err(|e| e.with_warnings(warnings.clone()))?;
        if cp.plugs.is_empty() {
            warnings.push(format!("{}: no plug types declared", cp.evse_id));
        }

        Ok(Conversion {
            record: ChargePointRecord {
                evse_id: cp.evse_id.clone(),
                operator: self.operator.clone(),
                name: cp.name.clone(),
                address: cp.address.clone(),
                position,
                max_power_kw: cp.max_power_kw,
                plugs: cp.plugs.clone(),
                last_update: Utc::now(),
            },
            warnings,
        })
    }

    fn status(&self, update: &StatusUpdate) -> Result<Conversion<EvseStatusRecord>, ConvertError> {
        Self::check_evse_id(&update.evse_id)?;

        Ok(Conversion::clean(EvseStatusRecord {
            evse_id: update.evse_id.clone(),
            status: map_state(update.state),
            timestamp: Utc::now(),
        }))
    }
}
