//! Hub-facing protocol records
//!
//! The wire shape of everything this operator publishes to the roaming
//! hub: charge point master data, point-in-time EVSE status, and charge
//! detail records for billing. Encoding/decoding and transport are the
//! hub client's concern; these types only fix the fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::partner::PartnerId;

/// Geographic position of a charge point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// Plug standards offered by an EVSE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlugType {
    Type2,
    Ccs,
    Chademo,
    Schuko,
}

/// Status of an EVSE as published to the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EvseStatus {
    Available,
    Occupied,
    Reserved,
    OutOfService,
    Unknown,
}

/// One charge point as published to the hub
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargePointRecord {
    /// Federation-wide EVSE identifier, e.g. `DE*VBR*E100101`
    pub evse_id: String,
    /// Operator publishing the record
    pub operator: PartnerId,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<GeoPosition>,
    pub max_power_kw: f64,
    pub plugs: Vec<PlugType>,
    pub last_update: DateTime<Utc>,
}

/// Point-in-time status record for one EVSE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvseStatusRecord {
    pub evse_id: String,
    pub status: EvseStatus,
    pub timestamp: DateTime<Utc>,
}

/// Billing-relevant record of one completed charging session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeDetailRecord {
    pub session_id: Uuid,
    pub evse_id: String,
    /// UID of the token that authorized the session
    pub token_uid: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub energy_kwh: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partner::PartnerRole;

    #[test]
    fn charge_point_record_omits_missing_position() {
        let record = ChargePointRecord {
            evse_id: "DE*VBR*E100101".to_string(),
            operator: PartnerId::new("DE", "VBR", PartnerRole::Cpo),
            name: "Depot North 1".to_string(),
            address: "Hafenstr. 12, Hamburg".to_string(),
            position: None,
            max_power_kw: 150.0,
            plugs: vec![PlugType::Ccs],
            last_update: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("position").is_none());
        assert_eq!(json["plugs"][0], "CCS");
    }

    #[test]
    fn evse_status_serde_pascal_case() {
        let json = serde_json::to_string(&EvseStatus::OutOfService).unwrap();
        assert_eq!(json, "\"OutOfService\"");
    }
}
