//! The roaming adapter facade
//!
//! ## Architecture
//!
//! ```text
//! Operator backend (stations, sessions, CDRs)
//!       │ domain entities
//!       ▼
//! ┌──────────────────────────────────────────┐
//! │    RoamingAdapter                        │
//! │  ┌─────────────┐   ┌──────────────────┐  │
//! │  │ AuthCoord.  │   │ SyncGate         │  │
//! │  │ (race)      │   │  └─ EntityPipe.  │  │
//! │  └──────┬──────┘   └────────┬─────────┘  │
//! └─────────┼───────────────────┼────────────┘
//!           │ queries           │ records
//!           ▼                   ▼
//!    roaming partners      roaming hub
//! ```
//!
//! Authorization fans out lock-free; every hub-mutating operation goes
//! through the instance's [`SyncGate`] exactly once per call, so a bulk
//! push is one atomic unit with respect to other writers. Admin switches
//! short-circuit to `AdminDown` results before the gate, the converter,
//! or any network call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use roam_core::{
    AuthorizationHints, AuthorizationOutcome, ChargeDetailRecord, PartnerClient, PartnerDirectory,
    RoamingHub,
};

use crate::authorize::{AuthCoordinator, AuthTimeouts};
use crate::config::AdapterConfig;
use crate::convert::{EntityConverter, RecordMapper};
use crate::domain::{ChargePoint, StatusUpdate};
use crate::gate::SyncGate;
use crate::pipeline::{
    forward_all_cdrs, include_all, CdrFilter, CdrRoute, EntityPipeline, InclusionFilter,
    TransmissionMode,
};
use crate::result::{BulkResult, SingleItemResult};

/// Warning attached to every policy-filtered charge detail record
pub const CDR_FILTERED_WARNING: &str = "charge detail record filtered by policy";

/// One operator's connection to the roaming federation
pub struct RoamingAdapter {
    config: AdapterConfig,
    coordinator: AuthCoordinator,
    pipeline: EntityPipeline,
    gate: SyncGate,
    cdr_filter: CdrFilter,

    // Admin switches, independently togglable at runtime
    data_push_disabled: AtomicBool,
    auth_disabled: AtomicBool,
    cdrs_disabled: AtomicBool,
}

impl RoamingAdapter {
    /// Wire an adapter with the default converter and filters
    pub fn new(
        config: AdapterConfig,
        directory: Arc<dyn PartnerDirectory>,
        client: Arc<dyn PartnerClient>,
        hub: Arc<dyn RoamingHub>,
    ) -> Self {
        RoamingAdapterBuilder::new(config).build(directory, client, hub)
    }

    /// Start building an adapter with custom filters or converter
    pub fn builder(config: AdapterConfig) -> RoamingAdapterBuilder {
        RoamingAdapterBuilder::new(config)
    }

    pub fn operator(&self) -> &roam_core::PartnerId {
        &self.config.operator
    }

    pub fn set_data_push_disabled(&self, disabled: bool) {
        info!(disabled, "data push switch changed");
        self.data_push_disabled.store(disabled, Ordering::SeqCst);
    }

    pub fn set_auth_disabled(&self, disabled: bool) {
        info!(disabled, "authorization switch changed");
        self.auth_disabled.store(disabled, Ordering::SeqCst);
    }

    pub fn set_cdrs_disabled(&self, disabled: bool) {
        info!(disabled, "CDR switch changed");
        self.cdrs_disabled.store(disabled, Ordering::SeqCst);
    }

    pub fn data_push_disabled(&self) -> bool {
        self.data_push_disabled.load(Ordering::SeqCst)
    }

    pub fn auth_disabled(&self) -> bool {
        self.auth_disabled.load(Ordering::SeqCst)
    }

    pub fn cdrs_disabled(&self) -> bool {
        self.cdrs_disabled.load(Ordering::SeqCst)
    }

    /// Authorize one driver token against the current partner set.
    ///
    /// Lock-free; safe to call while pushes are running. `timeouts`
    /// overrides the configured defaults for this call only.
    pub async fn authorize(
        &self,
        raw_token: &str,
        hints: AuthorizationHints,
        timeouts: Option<AuthTimeouts>,
    ) -> AuthorizationOutcome {
        if self.auth_disabled() {
            debug!("authorization administratively disabled");
            return AuthorizationOutcome::admin_down();
        }
        self.coordinator
            .authorize(raw_token, hints, timeouts.unwrap_or(self.config.auth_timeouts))
            .await
    }

    /// Push one charge point to the hub
    pub async fn push_charge_point(
        &self,
        cp: &ChargePoint,
        mode: TransmissionMode,
        deadline: Option<Duration>,
    ) -> SingleItemResult {
        if self.data_push_disabled() {
            return SingleItemResult::admin_down();
        }

        let started = Instant::now();
        let max_wait = deadline.unwrap_or(self.config.gate_max_wait);
        match self
            .gate
            .with_exclusive(max_wait, move || self.pipeline.push_charge_point(cp, mode))
            .await
        {
            Some(result) => result,
            None => SingleItemResult::lock_timeout(started.elapsed()),
        }
    }

    /// Push a batch of charge points under one gate acquisition
    pub async fn push_charge_points(
        &self,
        cps: &[ChargePoint],
        mode: TransmissionMode,
        deadline: Option<Duration>,
    ) -> BulkResult {
        if self.data_push_disabled() {
            return BulkResult::admin_down(cps.len());
        }

        let started = Instant::now();
        let max_wait = deadline.unwrap_or(self.config.gate_max_wait);
        let run = self
            .gate
            .with_exclusive(max_wait, move || async move {
                let mut items = Vec::with_capacity(cps.len());
                for cp in cps {
                    items.push(self.pipeline.push_charge_point(cp, mode).await);
                }
                items
            })
            .await;

        match run {
            Some(items) => BulkResult::aggregate(items, started.elapsed()),
            None => BulkResult::lock_timeout(cps.len(), started.elapsed()),
        }
    }

    /// Publish a batch of status updates under one gate acquisition
    pub async fn update_statuses(
        &self,
        updates: &[StatusUpdate],
        deadline: Option<Duration>,
    ) -> BulkResult {
        if self.data_push_disabled() {
            return BulkResult::admin_down(updates.len());
        }

        let started = Instant::now();
        let max_wait = deadline.unwrap_or(self.config.gate_max_wait);
        let run = self
            .gate
            .with_exclusive(max_wait, move || async move {
                let mut items = Vec::with_capacity(updates.len());
                for update in updates {
                    items.push(self.pipeline.push_status(update).await);
                }
                items
            })
            .await;

        match run {
            Some(items) => BulkResult::aggregate(items, started.elapsed()),
            None => BulkResult::lock_timeout(updates.len(), started.elapsed()),
        }
    }

    /// Classify and transmit a batch of charge detail records.
    ///
    /// Classification is pure policy: a batch where every record is
    /// filtered never touches the gate. Any forwarded record puts the
    /// whole batch, filtered items included, inside one gate acquisition.
    pub async fn send_charge_detail_records(
        &self,
        records: &[ChargeDetailRecord],
        deadline: Option<Duration>,
    ) -> BulkResult {
        if self.cdrs_disabled() {
            return BulkResult::admin_down(records.len());
        }

        let started = Instant::now();
        let routes: Vec<CdrRoute> = records.iter().map(|r| (self.cdr_filter)(r)).collect();

        if routes.iter().all(|route| *route == CdrRoute::Filter) {
            let items = records
                .iter()
                .map(|_| SingleItemResult::filtered(CDR_FILTERED_WARNING, started.elapsed()))
                .collect();
            return BulkResult::aggregate(items, started.elapsed());
        }

        let max_wait = deadline.unwrap_or(self.config.gate_max_wait);
        let run = self
            .gate
            .with_exclusive(max_wait, move || async move {
                let mut items = Vec::with_capacity(records.len());
                for (record, route) in records.iter().zip(&routes) {
                    match route {
                        CdrRoute::Filter => items.push(SingleItemResult::filtered(
                            CDR_FILTERED_WARNING,
                            Duration::ZERO,
                        )),
                        CdrRoute::Forward => items.push(self.pipeline.submit_cdr(record).await),
                    }
                }
                items
            })
            .await;

        match run {
            Some(items) => BulkResult::aggregate(items, started.elapsed()),
            None => BulkResult::lock_timeout(records.len(), started.elapsed()),
        }
    }
}

/// Builder for [`RoamingAdapter`]
pub struct RoamingAdapterBuilder {
    config: AdapterConfig,
    converter: Option<Arc<dyn EntityConverter>>,
    include: InclusionFilter,
    cdr_filter: CdrFilter,
}

impl RoamingAdapterBuilder {
    pub fn new(config: AdapterConfig) -> Self {
        Self {
            config,
            converter: None,
            include: include_all(),
            cdr_filter: forward_all_cdrs(),
        }
    }

    /// Replace the default [`RecordMapper`] converter
    pub fn converter(mut self, converter: Arc<dyn EntityConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Restrict which charge points are published
    pub fn inclusion_filter(mut self, include: InclusionFilter) -> Self {
        self.include = include;
        self
    }

    /// Classify charge detail records before transmission
    pub fn cdr_filter(mut self, filter: CdrFilter) -> Self {
        self.cdr_filter = filter;
        self
    }

    /// Wire the adapter to its collaborators
    pub fn build(
        self,
        directory: Arc<dyn PartnerDirectory>,
        client: Arc<dyn PartnerClient>,
        hub: Arc<dyn RoamingHub>,
    ) -> RoamingAdapter {
        let converter = self
            .converter
            .unwrap_or_else(|| Arc::new(RecordMapper::new(self.config.operator.clone())));

        RoamingAdapter {
            data_push_disabled: AtomicBool::new(self.config.disable_data_push),
            auth_disabled: AtomicBool::new(self.config.disable_authorization),
            cdrs_disabled: AtomicBool::new(self.config.disable_cdrs),
            coordinator: AuthCoordinator::new(directory, client),
            pipeline: EntityPipeline::new(converter, hub, self.include),
            gate: SyncGate::new(),
            cdr_filter: self.cdr_filter,
            config: self.config,
        }
    }
}
