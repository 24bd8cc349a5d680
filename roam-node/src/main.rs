//! Roam demo node
//!
//! Runs the roaming adapter against simulated partners and a simulated
//! hub, end to end.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: operator DE*VBR, partners DE*ICE and DE*SLO, 3 EVSEs
//! roam-node
//!
//! # Custom operator and partners
//! roam-node --operator AT*GRZ --partner AT*EMP --partner DE*ICE
//! ```
//!
//! # Demo scenario
//!
//! 1. Push the operator's charge points to the hub (one batch)
//! 2. Publish status updates for them
//! 3. Authorize three tokens: contracted, blocked, unknown
//! 4. Submit charge detail records (tiny sessions are filtered)
//! 5. Flip the data-push switch and show the AdminDown short-circuit

mod sim;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use roam_adapter::{
    AdapterConfig, CdrRoute, ChargePoint, OperationalState, RoamingAdapter, StatusUpdate,
    TransmissionMode,
};
use roam_core::{AuthorizationHints, ChargeDetailRecord, PartnerId, PartnerRole, PlugType};

use sim::{SimDirectory, SimHub, SimPartnerClient};

/// Roam federation demo node
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Operator identity as CC*PARTY
    #[arg(short, long, default_value = "DE*VBR")]
    operator: String,

    /// Roaming partner identity as CC*PARTY (can be repeated)
    #[arg(short, long = "partner")]
    partners: Vec<String>,

    /// Number of EVSEs to simulate
    #[arg(long, default_value = "3")]
    evses: u32,

    /// Simulated partner base latency in milliseconds
    #[arg(long, default_value = "40")]
    latency_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn parse_party(raw: &str, role: PartnerRole) -> Result<PartnerId, String> {
    match raw.split_once('*') {
        Some((cc, party)) if !cc.is_empty() && !party.is_empty() => {
            Ok(PartnerId::new(cc, party, role))
        }
        _ => Err(format!("expected CC*PARTY, got {raw:?}")),
    }
}

fn charge_point(operator: &PartnerId, index: u32) -> ChargePoint {
    ChargePoint {
        evse_id: format!(
            "{}*{}*E10{:02}",
            operator.country_code, operator.party_id, index
        ),
        name: format!("Depot bay {index}"),
        address: "Hafenstr. 12, Hamburg".to_string(),
        latitude: Some(53.55 + f64::from(index) * 0.001),
        longitude: Some(9.99),
        max_power_kw: 150.0,
        plugs: vec![PlugType::Ccs, PlugType::Type2],
        public: true,
    }
}

fn session_record(evse_id: &str, token_uid: &str, energy_kwh: f64) -> ChargeDetailRecord {
    let ended_at = Utc::now();
    ChargeDetailRecord {
        session_id: uuid::Uuid::new_v4(),
        evse_id: evse_id.to_string(),
        token_uid: token_uid.to_string(),
        started_at: ended_at - chrono::Duration::minutes(35),
        ended_at,
        energy_kwh,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Setup logging
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let operator = parse_party(&args.operator, PartnerRole::Cpo)?;
    let partner_args = if args.partners.is_empty() {
        vec!["DE*ICE".to_string(), "DE*SLO".to_string()]
    } else {
        args.partners.clone()
    };
    let partners = partner_args
        .iter()
        .map(|raw| parse_party(raw, PartnerRole::Emp))
        .collect::<Result<Vec<_>, _>>()?;

    info!("roam node starting: operator {}", operator);

    let first_party = partners[0].party_id.clone();
    let client = SimPartnerClient::new(Duration::from_millis(args.latency_ms))
        .with_contract(&first_party, "04AA11")
        .with_blocked("04BB22");

    let hub = Arc::new(SimHub::new());
    let adapter = RoamingAdapter::builder(AdapterConfig::new(operator.clone()))
        .cdr_filter(Arc::new(|record: &ChargeDetailRecord| {
            if record.energy_kwh < 0.5 {
                CdrRoute::Filter
            } else {
                CdrRoute::Forward
            }
        }))
        .build(
            Arc::new(SimDirectory::new(partners)),
            Arc::new(client),
            hub.clone(),
        );

    // 1. Push the charging network
    let evse_count = args.evses.max(1);
    let points: Vec<ChargePoint> = (1..=evse_count)
        .map(|i| charge_point(&operator, i))
        .collect();
    let pushed = adapter
        .push_charge_points(&points, TransmissionMode::Direct, None)
        .await;
    info!(
        outcome = ?pushed.outcome,
        items = pushed.items.len(),
        warnings = pushed.warnings.len(),
        "charge point push finished"
    );

    // 2. Publish status
    let updates: Vec<StatusUpdate> = points
        .iter()
        .enumerate()
        .map(|(i, cp)| {
            let state = if i % 2 == 0 {
                OperationalState::Free
            } else {
                OperationalState::Charging
            };
            StatusUpdate::new(cp.evse_id.clone(), state)
        })
        .collect();
    let statuses = adapter.update_statuses(&updates, None).await;
    info!(outcome = ?statuses.outcome, "status update finished");

    // 3. Authorize tokens
    for token in ["04AA11", "04BB22", "04ZZ99"] {
        let outcome = adapter
            .authorize(token, AuthorizationHints::default(), None)
            .await;
        info!(
            token,
            status = ?outcome.status,
            partner = ?outcome.partner,
            elapsed = ?outcome.elapsed,
            info = %outcome.info,
            "authorization finished"
        );
    }

    // 4. Submit charge detail records
    let records = vec![
        session_record(&points[0].evse_id, "04AA11", 18.4),
        session_record(&points[0].evse_id, "04AA11", 0.1),
    ];
    let cdrs = adapter.send_charge_detail_records(&records, None).await;
    info!(
        outcome = ?cdrs.outcome,
        warnings = ?cdrs.warnings,
        "CDR submission finished"
    );

    // 5. Admin switch demo
    adapter.set_data_push_disabled(true);
    let refused = adapter
        .push_charge_point(&points[0], TransmissionMode::Direct, None)
        .await;
    info!(outcome = ?refused.outcome, "push while disabled");
    adapter.set_data_push_disabled(false);

    let (cp_count, status_count, cdr_count) = hub.counts().await;
    info!(
        charge_points = cp_count,
        statuses = status_count,
        cdrs = cdr_count,
        "hub state at shutdown"
    );

    Ok(())
}
