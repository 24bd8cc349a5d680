//! Operator-side view of the charging network
//!
//! These types mirror what the operator backend knows about its own
//! infrastructure. The pipeline converts them into hub records before
//! publishing; the full domain model (pools, stations, tariffs) stays in
//! the backend.

use serde::{Deserialize, Serialize};

/// One EVSE as the operator backend sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargePoint {
    /// Federation-wide EVSE identifier, e.g. `DE*VBR*E100101`
    pub evse_id: String,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_power_kw: f64,
    pub plugs: Vec<roam_core::PlugType>,
    /// Whether the operator wants this EVSE visible to roaming partners
    pub public: bool,
}

/// Operational state of an EVSE in the operator backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationalState {
    Free,
    Charging,
    Reserved,
    Fault,
    Maintenance,
}

/// A status change to publish for one EVSE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub evse_id: String,
    pub state: OperationalState,
}

impl StatusUpdate {
    pub fn new(evse_id: impl Into<String>, state: OperationalState) -> Self {
        Self {
            evse_id: evse_id.into(),
            state,
        }
    }
}
