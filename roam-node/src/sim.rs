//! In-memory simulations of the federation collaborators
//!
//! Gives the demo node a directory, partners, and a hub without any
//! network. Partner latency is jittered so authorization races finish in
//! a different order on every run.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::info;

use roam_core::{
    AuthorizationOutcome, AuthorizationRequest, AuthorizationStatus, CandidatePartner,
    ChargeDetailRecord, ChargePointRecord, Connectivity, EvseStatusRecord, HubError,
    PartnerClient, PartnerDirectory, PartnerError, PartnerId, PartnerRole, RoamingHub,
};

/// Directory over a fixed partner list
pub struct SimDirectory {
    partners: Vec<CandidatePartner>,
}

impl SimDirectory {
    pub fn new(ids: Vec<PartnerId>) -> Self {
        let partners = ids
            .into_iter()
            .map(|id| {
                let name = format!("{} (simulated)", id.party_id);
                CandidatePartner::new(id, name, Connectivity::Online)
            })
            .collect();
        Self { partners }
    }
}

#[async_trait]
impl PartnerDirectory for SimDirectory {
    async fn candidates(&self, role: PartnerRole) -> Vec<CandidatePartner> {
        self.partners
            .iter()
            .filter(|p| p.id.role == role)
            .cloned()
            .collect()
    }
}

/// Simulated partner backends with contract tables and latency jitter
pub struct SimPartnerClient {
    /// Token uids each party has a contract for
    contracts: HashMap<String, HashSet<String>>,
    /// Token uids blocked federation-wide
    blocked: HashSet<String>,
    base_latency: Duration,
}

impl SimPartnerClient {
    pub fn new(base_latency: Duration) -> Self {
        Self {
            contracts: HashMap::new(),
            blocked: HashSet::new(),
            base_latency,
        }
    }

    /// Give `party` a contract for `token_uid`
    pub fn with_contract(mut self, party: &str, token_uid: &str) -> Self {
        self.contracts
            .entry(party.to_string())
            .or_default()
            .insert(token_uid.to_string());
        self
    }

    pub fn with_blocked(mut self, token_uid: &str) -> Self {
        self.blocked.insert(token_uid.to_string());
        self
    }
}

#[async_trait]
impl PartnerClient for SimPartnerClient {
    async fn query_authorization(
        &self,
        partner: &CandidatePartner,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizationOutcome, PartnerError> {
        let jitter = rand::thread_rng().gen_range(0..30u64);
        tokio::time::sleep(self.base_latency + Duration::from_millis(jitter)).await;

        let uid = &request.token.uid;
        if self.blocked.contains(uid) {
            return Ok(AuthorizationOutcome::denied(
                AuthorizationStatus::Blocked,
                partner.id.clone(),
                "token reported stolen",
            ));
        }

        let known = self
            .contracts
            .get(&partner.id.party_id)
            .map(|tokens| tokens.contains(uid))
            .unwrap_or(false);
        if known {
            Ok(AuthorizationOutcome::allowed(
                partner.id.clone(),
                "contract valid",
            ))
        } else {
            Ok(AuthorizationOutcome::not_allowed_by(
                partner.id.clone(),
                "no contract for token",
            ))
        }
    }
}

/// Hub backed by in-memory maps
pub struct SimHub {
    charge_points: RwLock<HashMap<String, ChargePointRecord>>,
    statuses: RwLock<Vec<EvseStatusRecord>>,
    cdrs: RwLock<Vec<ChargeDetailRecord>>,
}

impl SimHub {
    pub fn new() -> Self {
        Self {
            charge_points: RwLock::new(HashMap::new()),
            statuses: RwLock::new(Vec::new()),
            cdrs: RwLock::new(Vec::new()),
        }
    }

    pub async fn counts(&self) -> (usize, usize, usize) {
        (
            self.charge_points.read().await.len(),
            self.statuses.read().await.len(),
            self.cdrs.read().await.len(),
        )
    }
}

#[async_trait]
impl RoamingHub for SimHub {
    async fn upsert_charge_point(&self, record: &ChargePointRecord) -> Result<(), HubError> {
        info!(evse_id = %record.evse_id, "hub: charge point upserted");
        self.charge_points
            .write()
            .await
            .insert(record.evse_id.clone(), record.clone());
        Ok(())
    }

    async fn upsert_status(&self, record: &EvseStatusRecord) -> Result<(), HubError> {
        info!(evse_id = %record.evse_id, status = ?record.status, "hub: status upserted");
        self.statuses.write().await.push(record.clone());
        Ok(())
    }

    async fn submit_cdr(&self, record: &ChargeDetailRecord) -> Result<(), HubError> {
        info!(session = %record.session_id, kwh = record.energy_kwh, "hub: CDR accepted");
        self.cdrs.write().await.push(record.clone());
        Ok(())
    }

    async fn lookup_charge_point(
        &self,
        evse_id: &str,
    ) -> Result<Option<ChargePointRecord>, HubError> {
        Ok(self.charge_points.read().await.get(evse_id).cloned())
    }
}
