//! Multi-partner authorization race
//!
//! One driver token, many roaming partners that might know it. The
//! coordinator queries every eligible partner concurrently and returns
//! as soon as one of them allows the session; everything else is damage
//! control: per-partner failures become non-winning outcomes, slow
//! partners are cut off by the per-query timeout, and the overall
//! deadline bounds the whole call.
//!
//! ## Race discipline
//!
//! - One query future per candidate in a `FuturesUnordered`; queries are
//!   read-only, so the losers are cancelled by dropping the stream once
//!   a winner is found. The winner never waits for that cleanup.
//! - A query failure (collaborator error or per-query timeout) maps to a
//!   non-winning `NotAllowed` tagged with the failing partner; it never
//!   aborts the race for the other candidates.
//! - Given the same per-candidate outcomes and arrival order, the result
//!   is deterministic: fallback selection keeps the first-arrived outcome
//!   of the highest specificity.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use roam_core::{
    AuthorizationHints, AuthorizationOutcome, AuthorizationRequest, AuthorizationStatus,
    CandidatePartner, Connectivity, PartnerClient, PartnerDirectory, PartnerRole, Token,
};

/// Timeouts bounding one authorization call
#[derive(Debug, Clone, Copy)]
pub struct AuthTimeouts {
    /// Budget for a single partner query
    pub per_partner: Duration,
    /// Budget for the whole call
    pub overall: Duration,
}

impl Default for AuthTimeouts {
    fn default() -> Self {
        Self {
            per_partner: Duration::from_secs(10),
            overall: Duration::from_secs(15),
        }
    }
}

/// Races authorization queries against the current partner set
pub struct AuthCoordinator {
    directory: Arc<dyn PartnerDirectory>,
    client: Arc<dyn PartnerClient>,
}

impl AuthCoordinator {
    pub fn new(directory: Arc<dyn PartnerDirectory>, client: Arc<dyn PartnerClient>) -> Self {
        Self { directory, client }
    }

    /// Resolve one token against all eligible partners.
    ///
    /// Always returns an outcome; the only inputs that skip the race are
    /// unparseable tokens and an empty candidate set.
    pub async fn authorize(
        &self,
        raw_token: &str,
        hints: AuthorizationHints,
        timeouts: AuthTimeouts,
    ) -> AuthorizationOutcome {
        let started = Instant::now();

        let token = match Token::parse(raw_token) {
            Ok(token) => token,
            Err(err) => {
                debug!(%err, "rejecting unparseable token without querying");
                return AuthorizationOutcome::not_allowed(format!("invalid token: {err}"))
                    .with_elapsed(started.elapsed());
            }
        };

        let candidates: Vec<CandidatePartner> = self
            .directory
            .candidates(PartnerRole::Emp)
            .await
            .into_iter()
            .filter(|c| c.connectivity != Connectivity::Offline)
            .collect();

        if candidates.is_empty() {
            debug!("no eligible roaming partners, skipping race");
            return AuthorizationOutcome::not_allowed("no roaming partners available")
                .with_elapsed(started.elapsed());
        }

        let request = AuthorizationRequest::new(token, hints);
        debug!(
            token = %request.token,
            candidates = candidates.len(),
            "starting authorization race"
        );

        let mut queries: FuturesUnordered<_> = candidates
            .into_iter()
            .map(|partner| self.query_one(partner, &request, timeouts.per_partner))
            .collect();

        let deadline = started + timeouts.overall;
        let mut observed: Vec<AuthorizationOutcome> = Vec::new();
        let mut timed_out = false;

        loop {
            match tokio::time::timeout_at(deadline, queries.next()).await {
                Err(_) => {
                    timed_out = true;
                    break;
                }
                Ok(None) => break,
                Ok(Some(outcome)) => {
                    if outcome.status.is_positive() {
                        // Dropping the stream cancels the slower queries.
                        drop(queries);
                        let elapsed = started.elapsed();
                        info!(partner = ?outcome.partner, ?elapsed, "authorization allowed");
                        return outcome.with_elapsed(elapsed);
                    }
                    observed.push(outcome);
                }
            }
        }
        drop(queries);

        let elapsed = started.elapsed();
        if timed_out && observed.is_empty() {
            warn!(?elapsed, "no partner answered before the overall deadline");
            return AuthorizationOutcome::communication_timeout(
                "no authorization service answered in time",
            )
            .with_elapsed(elapsed);
        }

        match most_specific(observed) {
            Some(best) => best.with_elapsed(elapsed),
            None => AuthorizationOutcome::not_allowed(
                "no authorization service returned a positive result",
            )
            .with_elapsed(elapsed),
        }
    }

    /// One bounded partner query; failures become non-winning outcomes.
    async fn query_one(
        &self,
        partner: CandidatePartner,
        request: &AuthorizationRequest,
        per_partner: Duration,
    ) -> AuthorizationOutcome {
        match tokio::time::timeout(
            per_partner,
            self.client.query_authorization(&partner, request),
        )
        .await
        {
            Ok(Ok(mut outcome)) => {
                if outcome.partner.is_none() {
                    outcome.partner = Some(partner.id);
                }
                outcome
            }
            Ok(Err(err)) => {
                warn!(partner = %partner.id, %err, "partner query failed");
                AuthorizationOutcome::not_allowed_by(partner.id, format!("query failed: {err}"))
            }
            Err(_) => {
                warn!(partner = %partner.id, "partner query timed out");
                AuthorizationOutcome::not_allowed_by(
                    partner.id,
                    format!("no answer within {per_partner:?}"),
                )
            }
        }
    }
}

/// Pick the most specific non-winning outcome, first arrival winning ties.
fn most_specific(observed: Vec<AuthorizationOutcome>) -> Option<AuthorizationOutcome> {
    let mut best: Option<AuthorizationOutcome> = None;
    for outcome in observed {
        let better = match &best {
            Some(current) => specificity(outcome.status) > specificity(current.status),
            None => true,
        };
        if better {
            best = Some(outcome);
        }
    }
    best
}

/// Specific denials beat a generic NotAllowed; timeouts rank last.
fn specificity(status: AuthorizationStatus) -> u8 {
    match status {
        AuthorizationStatus::Blocked
        | AuthorizationStatus::Expired
        | AuthorizationStatus::NoCredit => 2,
        AuthorizationStatus::NotAllowed => 1,
        _ => 0,
    }
}
