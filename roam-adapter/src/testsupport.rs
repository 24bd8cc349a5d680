//! Shared fakes for adapter tests
//!
//! Deterministic in-memory stand-ins for the externally owned
//! collaborators. Partner behavior is scripted per party id so race and
//! timeout tests control exactly who answers what, and when.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use roam_core::{
    AuthorizationOutcome, AuthorizationRequest, AuthorizationStatus, CandidatePartner,
    ChargeDetailRecord, ChargePointRecord, Connectivity, EvseStatusRecord, HubError,
    PartnerClient, PartnerDirectory, PartnerError, PartnerId, PartnerRole, RoamingHub,
};

/// Directory returning a fixed candidate list
pub struct StaticDirectory {
    partners: Vec<CandidatePartner>,
}

impl StaticDirectory {
    /// All given partners, reported online
    pub fn online(ids: Vec<PartnerId>) -> Self {
        let partners = ids
            .into_iter()
            .map(|id| {
                let name = format!("{} roaming", id.party_id);
                CandidatePartner::new(id, name, Connectivity::Online)
            })
            .collect();
        Self { partners }
    }

    pub fn add(&mut self, id: PartnerId, connectivity: Connectivity) {
        let name = format!("{} roaming", id.party_id);
        self.partners
            .push(CandidatePartner::new(id, name, connectivity));
    }
}

#[async_trait]
impl PartnerDirectory for StaticDirectory {
    async fn candidates(&self, role: PartnerRole) -> Vec<CandidatePartner> {
        self.partners
            .iter()
            .filter(|p| p.id.role == role)
            .cloned()
            .collect()
    }
}

enum Script {
    Reply {
        status: AuthorizationStatus,
        delay: Duration,
    },
    Fail,
    Hang,
}

/// Partner client with per-party scripted behavior.
///
/// Unscripted partners deny immediately. Every issued query is recorded
/// so tests can assert that short-circuit paths stay quiet.
pub struct ScriptedPartnerClient {
    scripts: HashMap<String, Script>,
    queried: Mutex<Vec<String>>,
}

impl ScriptedPartnerClient {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            queried: Mutex::new(Vec::new()),
        }
    }

    pub fn allow(self, party: &str) -> Self {
        self.allow_after(party, Duration::ZERO)
    }

    pub fn allow_after(mut self, party: &str, delay: Duration) -> Self {
        self.scripts.insert(
            party.to_string(),
            Script::Reply {
                status: AuthorizationStatus::Allowed,
                delay,
            },
        );
        self
    }

    pub fn deny(mut self, party: &str, status: AuthorizationStatus, delay: Duration) -> Self {
        self.scripts
            .insert(party.to_string(), Script::Reply { status, delay });
        self
    }

    pub fn fail(mut self, party: &str) -> Self {
        self.scripts.insert(party.to_string(), Script::Fail);
        self
    }

    pub fn hang(mut self, party: &str) -> Self {
        self.scripts.insert(party.to_string(), Script::Hang);
        self
    }

    pub fn queries_issued(&self) -> usize {
        self.queried.lock().unwrap().len()
    }

    pub fn was_queried(&self, party: &str) -> bool {
        self.queried.lock().unwrap().iter().any(|p| p == party)
    }
}

#[async_trait]
impl PartnerClient for ScriptedPartnerClient {
    async fn query_authorization(
        &self,
        partner: &CandidatePartner,
        _request: &AuthorizationRequest,
    ) -> Result<AuthorizationOutcome, PartnerError> {
        self.queried
            .lock()
            .unwrap()
            .push(partner.id.party_id.clone());

        match self.scripts.get(&partner.id.party_id) {
            Some(Script::Reply { status, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(match status {
                    AuthorizationStatus::Allowed => {
                        AuthorizationOutcome::allowed(partner.id.clone(), "contract valid")
                    }
                    status => AuthorizationOutcome::denied(
                        *status,
                        partner.id.clone(),
                        "scripted denial",
                    ),
                })
            }
            Some(Script::Fail) => Err(PartnerError::Network("connection refused".to_string())),
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(PartnerError::Network("unreachable".to_string()))
            }
            None => Ok(AuthorizationOutcome::not_allowed_by(
                partner.id.clone(),
                "unknown token",
            )),
        }
    }
}

/// In-memory hub with failure injection and call counting
pub struct MemoryHub {
    charge_points: RwLock<HashMap<String, ChargePointRecord>>,
    statuses: RwLock<Vec<EvseStatusRecord>>,
    cdrs: RwLock<Vec<ChargeDetailRecord>>,
    reject_evse_ids: HashSet<String>,
    fail_lookups: AtomicBool,
    upsert_delay: Duration,
    upsert_calls: AtomicUsize,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self {
            charge_points: RwLock::new(HashMap::new()),
            statuses: RwLock::new(Vec::new()),
            cdrs: RwLock::new(Vec::new()),
            reject_evse_ids: HashSet::new(),
            fail_lookups: AtomicBool::new(false),
            upsert_delay: Duration::ZERO,
            upsert_calls: AtomicUsize::new(0),
        }
    }

    /// Reject every write touching this EVSE id
    pub fn rejecting(mut self, evse_id: &str) -> Self {
        self.reject_evse_ids.insert(evse_id.to_string());
        self
    }

    /// Make every write take this long (gate contention tests)
    pub fn with_upsert_delay(mut self, delay: Duration) -> Self {
        self.upsert_delay = delay;
        self
    }

    pub fn failing_lookups(self) -> Self {
        self.fail_lookups.store(true, Ordering::SeqCst);
        self
    }

    pub async fn seed_charge_point(&self, evse_id: &str) {
        let record = charge_point_record(evse_id);
        self.charge_points
            .write()
            .await
            .insert(evse_id.to_string(), record);
    }

    pub async fn contains(&self, evse_id: &str) -> bool {
        self.charge_points.read().await.contains_key(evse_id)
    }

    pub async fn status_count(&self) -> usize {
        self.statuses.read().await.len()
    }

    pub async fn cdr_count(&self) -> usize {
        self.cdrs.read().await.len()
    }

    pub fn upsert_count(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    fn check_rejected(&self, evse_id: &str) -> Result<(), HubError> {
        if self.reject_evse_ids.contains(evse_id) {
            Err(HubError::Rejected(format!("{evse_id} not acceptable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RoamingHub for MemoryHub {
    async fn upsert_charge_point(&self, record: &ChargePointRecord) -> Result<(), HubError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if !self.upsert_delay.is_zero() {
            tokio::time::sleep(self.upsert_delay).await;
        }
        self.check_rejected(&record.evse_id)?;
        self.charge_points
            .write()
            .await
            .insert(record.evse_id.clone(), record.clone());
        Ok(())
    }

    async fn upsert_status(&self, record: &EvseStatusRecord) -> Result<(), HubError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if !self.upsert_delay.is_zero() {
            tokio::time::sleep(self.upsert_delay).await;
        }
        self.check_rejected(&record.evse_id)?;
        self.statuses.write().await.push(record.clone());
        Ok(())
    }

    async fn submit_cdr(&self, record: &ChargeDetailRecord) -> Result<(), HubError> {
        self.check_rejected(&record.evse_id)?;
        self.cdrs.write().await.push(record.clone());
        Ok(())
    }

    async fn lookup_charge_point(
        &self,
        evse_id: &str,
    ) -> Result<Option<ChargePointRecord>, HubError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(HubError::Unavailable("lookup backend down".to_string()));
        }
        Ok(self.charge_points.read().await.get(evse_id).cloned())
    }
}

/// A minimal valid hub record for seeding
pub fn charge_point_record(evse_id: &str) -> ChargePointRecord {
    ChargePointRecord {
        evse_id: evse_id.to_string(),
        operator: PartnerId::new("DE", "VBR", PartnerRole::Cpo),
        name: format!("{evse_id} test point"),
        address: "Teststr. 1".to_string(),
        position: None,
        max_power_kw: 22.0,
        plugs: vec![roam_core::PlugType::Type2],
        last_update: Utc::now(),
    }
}

/// A minimal valid CDR for submission tests
pub fn charge_detail_record(evse_id: &str) -> ChargeDetailRecord {
    let ended_at = Utc::now();
    ChargeDetailRecord {
        session_id: uuid::Uuid::new_v4(),
        evse_id: evse_id.to_string(),
        token_uid: "04A2B3C4".to_string(),
        started_at: ended_at - chrono::Duration::minutes(42),
        ended_at,
        energy_kwh: 18.4,
    }
}
