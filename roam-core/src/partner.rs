//! Roaming partner identities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a party plays in the roaming federation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartnerRole {
    /// Charge point operator: owns and runs charging infrastructure
    Cpo,
    /// E-mobility provider: issues driver tokens and contracts
    Emp,
    /// Clearing house relaying between parties
    Hub,
}

impl fmt::Display for PartnerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartnerRole::Cpo => write!(f, "CPO"),
            PartnerRole::Emp => write!(f, "EMP"),
            PartnerRole::Hub => write!(f, "HUB"),
        }
    }
}

/// Identity of a roaming party: ISO 3166 country code plus party id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartnerId {
    pub country_code: String,
    pub party_id: String,
    pub role: PartnerRole,
}

impl PartnerId {
    pub fn new(
        country_code: impl Into<String>,
        party_id: impl Into<String>,
        role: PartnerRole,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            party_id: party_id.into(),
            role,
        }
    }
}

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*{} ({})", self.country_code, self.party_id, self.role)
    }
}

/// Connectivity of a partner as last observed by the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Online,
    Offline,
    Unknown,
}

/// A partner eligible for a roaming operation, as supplied by the directory.
///
/// Read-only view owned by the directory; the adapter only uses it to
/// decide who to query.
#[derive(Debug, Clone)]
pub struct CandidatePartner {
    pub id: PartnerId,
    pub name: String,
    pub connectivity: Connectivity,
}

impl CandidatePartner {
    pub fn new(id: PartnerId, name: impl Into<String>, connectivity: Connectivity) -> Self {
        Self {
            id,
            name: name.into(),
            connectivity,
        }
    }
}
