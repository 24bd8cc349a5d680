//! # Roam Adapter
//!
//! Roaming adapter bridging a charging-station operator's backend to the
//! roam federation: partners authorize this operator's sessions, and the
//! hub publishes this operator's infrastructure to partners.
//!
//! ## Architecture
//!
//! ```text
//! Operator backend
//!       │ domain entities / tokens
//!       ▼
//! ┌──────────────────────────────────────────┐
//! │    roam-adapter                          │
//! │  ┌─────────────┐   ┌──────────────────┐  │
//! │  │ AuthCoord.  │   │ SyncGate         │  │
//! │  │ partner race│   │  └─ EntityPipe.  │  │
//! │  └──────┬──────┘   └────────┬─────────┘  │
//! └─────────┼───────────────────┼────────────┘
//!           │                   │
//!           ▼                   ▼
//! ┌─────────────────┐   ┌─────────────────┐
//! │ roaming partners│   │ roaming hub     │
//! │ (PartnerClient) │   │ (RoamingHub)    │
//! └─────────────────┘   └─────────────────┘
//! ```
//!
//! ## Operation map
//!
//! | Operation | Path | Gate? |
//! |-----------|------|-------|
//! | `authorize` | partner race, first `Allowed` wins | No |
//! | `push_charge_point` | filter → convert → upsert | Yes |
//! | `push_charge_points` | single-item path per entity | Yes, once |
//! | `update_statuses` | lookup → convert → upsert | Yes, once |
//! | `send_charge_detail_records` | classify → submit | Yes, once* |
//!
//! *An all-filtered batch resolves without the gate.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use roam_adapter::{AdapterConfig, RoamingAdapter, TransmissionMode};
//! use roam_core::{AuthorizationHints, PartnerId, PartnerRole};
//! # async fn run(
//! #     directory: Arc<dyn roam_core::PartnerDirectory>,
//! #     client: Arc<dyn roam_core::PartnerClient>,
//! #     hub: Arc<dyn roam_core::RoamingHub>,
//! #     station: roam_adapter::ChargePoint,
//! # ) {
//! let config = AdapterConfig::new(PartnerId::new("DE", "VBR", PartnerRole::Cpo));
//! let adapter = RoamingAdapter::new(config, directory, client, hub);
//!
//! let outcome = adapter
//!     .authorize("04A2B3C4", AuthorizationHints::default(), None)
//!     .await;
//! let result = adapter
//!     .push_charge_point(&station, TransmissionMode::Direct, None)
//!     .await;
//! # }
//! ```

pub mod adapter;
pub mod authorize;
pub mod config;
pub mod convert;
pub mod domain;
pub mod gate;
pub mod pipeline;
pub mod result;

#[cfg(test)]
pub(crate) mod testsupport;

pub use adapter::{RoamingAdapter, RoamingAdapterBuilder, CDR_FILTERED_WARNING};
pub use authorize::{AuthCoordinator, AuthTimeouts};
pub use config::AdapterConfig;
pub use convert::{Conversion, ConvertError, EntityConverter, RecordMapper};
pub use domain::{ChargePoint, OperationalState, StatusUpdate};
pub use gate::SyncGate;
pub use pipeline::{
    forward_all_cdrs, include_all, CdrFilter, CdrRoute, EntityPipeline, InclusionFilter,
    TransmissionMode,
};
pub use result::{BulkResult, PushOutcome, SingleItemResult};
