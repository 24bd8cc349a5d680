//! Capability interfaces onto the federation
//!
//! The adapter never owns a network connection, a partner directory, or
//! hub storage; it reaches all three through these traits. Implementations
//! do their own wire encoding and per-call retry policy; the adapter only
//! interprets their results.

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::{AuthorizationOutcome, AuthorizationRequest};
use crate::partner::{CandidatePartner, PartnerRole};
use crate::records::{ChargeDetailRecord, ChargePointRecord, EvseStatusRecord};

/// Errors from querying a roaming partner
#[derive(Debug, Error)]
pub enum PartnerError {
    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("partner rejected the request: {0}")]
    Rejected(String),
}

/// Errors from the roaming hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("hub rejected the record: {0}")]
    Rejected(String),

    #[error("hub unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the current set of candidate roaming partners for a role
#[async_trait]
pub trait PartnerDirectory: Send + Sync {
    async fn candidates(&self, role: PartnerRole) -> Vec<CandidatePartner>;
}

/// Queries one roaming partner for an authorization decision
#[async_trait]
pub trait PartnerClient: Send + Sync {
    /// Ask `partner` whether the request's token may charge.
    ///
    /// Read-only from the adapter's point of view; a query abandoned
    /// mid-flight must not leave partner-side state behind.
    async fn query_authorization(
        &self,
        partner: &CandidatePartner,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationOutcome, PartnerError>;
}

/// The protocol hub this operator publishes into
#[async_trait]
pub trait RoamingHub: Send + Sync {
    async fn upsert_charge_point(&self, record: &ChargePointRecord) -> Result<(), HubError>;

    async fn upsert_status(&self, record: &EvseStatusRecord) -> Result<(), HubError>;

    async fn submit_cdr(&self, record: &ChargeDetailRecord) -> Result<(), HubError>;

    /// Look up a previously published charge point by EVSE id
    async fn lookup_charge_point(
        &self,
        evse_id: &str,
    ) -> Result<Option<ChargePointRecord>, HubError>;
}
