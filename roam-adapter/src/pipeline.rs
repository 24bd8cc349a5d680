//! Gated synchronization pipeline
//!
//! One entity at a time: inclusion filter, conversion, hub write. Every
//! step resolves to a [`SingleItemResult`] so callers never unwind; the
//! caller is expected to hold the adapter's gate around any method that
//! writes (the pipeline itself does not lock).

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, warn};

use roam_core::{ChargeDetailRecord, RoamingHub};

use crate::convert::EntityConverter;
use crate::domain::{ChargePoint, StatusUpdate};
use crate::result::SingleItemResult;

/// How a push reaches the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionMode {
    /// The write is the delivery
    Direct,
    /// Acceptance defines success; delivery happens on a later flush
    Enqueue,
}

/// Decides which charge points are visible to roaming partners
pub type InclusionFilter = Arc<dyn Fn(&ChargePoint) -> bool + Send + Sync>;

/// Per-record routing decision for charge detail records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdrRoute {
    Forward,
    Filter,
}

/// Classifies charge detail records before transmission
pub type CdrFilter = Arc<dyn Fn(&ChargeDetailRecord) -> CdrRoute + Send + Sync>;

/// An inclusion filter admitting everything
pub fn include_all() -> InclusionFilter {
    Arc::new(|_| true)
}

/// A CDR filter forwarding everything
pub fn forward_all_cdrs() -> CdrFilter {
    Arc::new(|_| CdrRoute::Forward)
}

/// Converts one domain entity and writes it to the hub
pub struct EntityPipeline {
    converter: Arc<dyn EntityConverter>,
    hub: Arc<dyn RoamingHub>,
    include: InclusionFilter,
}

impl EntityPipeline {
    pub fn new(
        converter: Arc<dyn EntityConverter>,
        hub: Arc<dyn RoamingHub>,
        include: InclusionFilter,
    ) -> Self {
        Self {
            converter,
            hub,
            include,
        }
    }

    /// Filter, convert, and upsert one charge point
    pub async fn push_charge_point(
        &self,
        cp: &ChargePoint,
        mode: TransmissionMode,
    ) -> SingleItemResult {
        let started = Instant::now();

        if !(self.include)(cp) {
            debug!(evse_id = %cp.evse_id, "charge point excluded by policy");
            return SingleItemResult::filtered(
                format!("{} excluded by inclusion policy", cp.evse_id),
                started.elapsed(),
            );
        }

        let conversion = match self.converter.charge_point(cp) {
            Ok(conversion) => conversion,
            Err(err) => {
                warn!(evse_id = %cp.evse_id, %err, "charge point conversion failed");
                return SingleItemResult::error(err.message.clone(), started.elapsed())
                    .with_warnings(err.warnings);
            }
        };

        match self.hub.upsert_charge_point(&conversion.record).await {
            Ok(()) => {
                debug!(evse_id = %cp.evse_id, ?mode, "charge point written to hub");
                let result = match mode {
                    TransmissionMode::Direct => SingleItemResult::success(started.elapsed()),
                    TransmissionMode::Enqueue => SingleItemResult::enqueued(started.elapsed()),
                };
                result.with_warnings(conversion.warnings)
            }
            Err(err) => {
                warn!(evse_id = %cp.evse_id, %err, "hub rejected charge point");
                SingleItemResult::error(err.to_string(), started.elapsed())
                    .with_warnings(conversion.warnings)
            }
        }
    }

    /// Publish one status update for a previously pushed EVSE.
    ///
    /// The hub only understands status for charge points it has seen, so
    /// an unknown EVSE yields `NoOperation` rather than an error.
    pub async fn push_status(&self, update: &StatusUpdate) -> SingleItemResult {
        let started = Instant::now();

        match self.hub.lookup_charge_point(&update.evse_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!(evse_id = %update.evse_id, "status for unpublished EVSE skipped");
                return SingleItemResult::no_operation(
                    format!("{} is not published to the hub", update.evse_id),
                    started.elapsed(),
                );
            }
            Err(err) => {
                warn!(evse_id = %update.evse_id, %err, "hub lookup failed");
                return SingleItemResult::error(err.to_string(), started.elapsed());
            }
        }

        let conversion = match self.converter.status(update) {
            Ok(conversion) => conversion,
            Err(err) => {
                warn!(evse_id = %update.evse_id, %err, "status conversion failed");
                return SingleItemResult::error(err.message.clone(), started.elapsed())
                    .with_warnings(err.warnings);
            }
        };

        match self.hub.upsert_status(&conversion.record).await {
            Ok(()) => SingleItemResult::success(started.elapsed()).with_warnings(conversion.warnings),
            Err(err) => {
                warn!(evse_id = %update.evse_id, %err, "hub rejected status");
                SingleItemResult::error(err.to_string(), started.elapsed())
                    .with_warnings(conversion.warnings)
            }
        }
    }

    /// Transmit one already-classified charge detail record
    pub async fn submit_cdr(&self, record: &ChargeDetailRecord) -> SingleItemResult {
        let started = Instant::now();

        match self.hub.submit_cdr(record).await {
            Ok(()) => SingleItemResult::success(started.elapsed()),
            Err(err) => {
                warn!(session = %record.session_id, %err, "hub rejected charge detail record");
                SingleItemResult::error(err.to_string(), started.elapsed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::RecordMapper;
    use crate::domain::OperationalState;
    use crate::result::PushOutcome;
    use crate::testsupport::{charge_detail_record, MemoryHub};
    use roam_core::{PartnerId, PartnerRole, PlugType};

    fn charge_point(evse_id: &str) -> ChargePoint {
        ChargePoint {
            evse_id: evse_id.to_string(),
            name: "Depot North 1".to_string(),
            address: "Hafenstr. 12, Hamburg".to_string(),
            latitude: Some(53.55),
            longitude: Some(9.99),
            max_power_kw: 150.0,
            plugs: vec![PlugType::Ccs],
            public: true,
        }
    }

    fn pipeline_with(hub: Arc<MemoryHub>, include: InclusionFilter) -> EntityPipeline {
        let mapper = RecordMapper::new(PartnerId::new("DE", "VBR", PartnerRole::Cpo));
        EntityPipeline::new(Arc::new(mapper), hub, include)
    }

    #[tokio::test]
    async fn filtered_entity_never_reaches_the_hub() {
        let hub = Arc::new(MemoryHub::new());
        let pipeline = pipeline_with(hub.clone(), Arc::new(|cp: &ChargePoint| cp.public));

        let mut cp = charge_point("DE*VBR*E1");
        cp.public = false;
        let result = pipeline
            .push_charge_point(&cp, TransmissionMode::Direct)
            .await;

        assert_eq!(result.outcome, PushOutcome::Filtered);
        assert_eq!(hub.upsert_count(), 0);
    }

    #[tokio::test]
    async fn conversion_failure_never_reaches_the_hub() {
        let hub = Arc::new(MemoryHub::new());
        let pipeline = pipeline_with(hub.clone(), include_all());

        let mut cp = charge_point("DE*VBR*E1");
        cp.max_power_kw = 0.0;
        let result = pipeline
            .push_charge_point(&cp, TransmissionMode::Direct)
            .await;

        assert_eq!(result.outcome, PushOutcome::Error);
        assert!(result.error.unwrap().contains("non-positive max power"));
        assert_eq!(hub.upsert_count(), 0);
    }

    #[tokio::test]
    async fn direct_push_succeeds_and_keeps_warnings() {
        let hub = Arc::new(MemoryHub::new());
        let pipeline = pipeline_with(hub.clone(), include_all());

        let mut cp = charge_point("DE*VBR*E1");
        cp.latitude = None;
        cp.longitude = None;
        let result = pipeline
            .push_charge_point(&cp, TransmissionMode::Direct)
            .await;

        assert_eq!(result.outcome, PushOutcome::Success);
        assert_eq!(result.warnings.len(), 1);
        assert!(hub.contains("DE*VBR*E1").await);
    }

    #[tokio::test]
    async fn enqueue_mode_reports_enqueued() {
        let hub = Arc::new(MemoryHub::new());
        let pipeline = pipeline_with(hub.clone(), include_all());

        let result = pipeline
            .push_charge_point(&charge_point("DE*VBR*E1"), TransmissionMode::Enqueue)
            .await;

        assert_eq!(result.outcome, PushOutcome::Enqueued);
    }

    #[tokio::test]
    async fn hub_rejection_is_an_error_result() {
        let hub = Arc::new(MemoryHub::new().rejecting("DE*VBR*E1"));
        let pipeline = pipeline_with(hub.clone(), include_all());

        let result = pipeline
            .push_charge_point(&charge_point("DE*VBR*E1"), TransmissionMode::Direct)
            .await;

        assert_eq!(result.outcome, PushOutcome::Error);
        assert!(result.error.unwrap().contains("not acceptable"));
    }

    #[tokio::test]
    async fn status_for_unpublished_evse_is_no_operation() {
        let hub = Arc::new(MemoryHub::new());
        let pipeline = pipeline_with(hub.clone(), include_all());

        let result = pipeline
            .push_status(&StatusUpdate::new("DE*VBR*E9", OperationalState::Free))
            .await;

        assert_eq!(result.outcome, PushOutcome::NoOperation);
        assert_eq!(hub.status_count().await, 0);
    }

    #[tokio::test]
    async fn status_for_published_evse_is_written() {
        let hub = Arc::new(MemoryHub::new());
        hub.seed_charge_point("DE*VBR*E1").await;
        let pipeline = pipeline_with(hub.clone(), include_all());

        let result = pipeline
            .push_status(&StatusUpdate::new("DE*VBR*E1", OperationalState::Charging))
            .await;

        assert_eq!(result.outcome, PushOutcome::Success);
        assert_eq!(hub.status_count().await, 1);
    }

    #[tokio::test]
    async fn status_lookup_failure_is_an_error() {
        let hub = Arc::new(MemoryHub::new().failing_lookups());
        let pipeline = pipeline_with(hub.clone(), include_all());

        let result = pipeline
            .push_status(&StatusUpdate::new("DE*VBR*E1", OperationalState::Free))
            .await;

        assert_eq!(result.outcome, PushOutcome::Error);
    }

    #[tokio::test]
    async fn cdr_submission_round_trip() {
        let hub = Arc::new(MemoryHub::new());
        let pipeline = pipeline_with(hub.clone(), include_all());

        let ok = pipeline.submit_cdr(&charge_detail_record("DE*VBR*E1")).await;
        assert_eq!(ok.outcome, PushOutcome::Success);
        assert_eq!(hub.cdr_count().await, 1);

        let hub = Arc::new(MemoryHub::new().rejecting("DE*VBR*E2"));
        let pipeline = pipeline_with(hub.clone(), include_all());
        let rejected = pipeline.submit_cdr(&charge_detail_record("DE*VBR*E2")).await;
        assert_eq!(rejected.outcome, PushOutcome::Error);
    }
}
