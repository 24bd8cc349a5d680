//! Authorization requests and outcomes
//!
//! One [`AuthorizationRequest`] is created per driver authorization call
//! and discarded after resolution. The [`AuthorizationOutcome`] is the
//! single value every authorization path resolves to; timeouts and
//! disabled features are outcomes, not errors.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::partner::PartnerId;
use crate::token::Token;

/// Decision returned for a driver token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationStatus {
    Allowed,
    NotAllowed,
    Blocked,
    Expired,
    NoCredit,
    /// No partner answered within the overall deadline
    CommunicationTimeout,
    /// Authorization is administratively disabled on this adapter
    AdminDown,
}

impl AuthorizationStatus {
    /// Whether this status authorizes a session
    pub fn is_positive(self) -> bool {
        self == AuthorizationStatus::Allowed
    }
}

/// Optional context a charge point can attach to an authorization
#[derive(Debug, Clone, Default)]
pub struct AuthorizationHints {
    /// EVSE the driver is plugged into
    pub evse_id: Option<String>,
    /// Session the authorization belongs to, if one already exists
    pub session_id: Option<String>,
}

/// A single authorization attempt for one token
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub token: Token,
    pub hints: AuthorizationHints,
}

impl AuthorizationRequest {
    pub fn new(token: Token, hints: AuthorizationHints) -> Self {
        Self { token, hints }
    }
}

/// Resolution of one authorization call.
///
/// `status` is [`AuthorizationStatus::Allowed`] only if some partner query
/// explicitly returned `Allowed`; every fallback path yields a negative or
/// timeout status.
#[derive(Debug, Clone)]
pub struct AuthorizationOutcome {
    pub status: AuthorizationStatus,
    /// Partner the decision originated from, when one did
    pub partner: Option<PartnerId>,
    /// Location-scoped restriction, e.g. "valid only at this EVSE"
    pub evse_restriction: Option<String>,
    /// Human-readable explanation
    pub info: String,
    pub elapsed: Duration,
}

impl AuthorizationOutcome {
    pub fn allowed(partner: PartnerId, info: impl Into<String>) -> Self {
        Self {
            status: AuthorizationStatus::Allowed,
            partner: Some(partner),
            evse_restriction: None,
            info: info.into(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn not_allowed(info: impl Into<String>) -> Self {
        Self {
            status: AuthorizationStatus::NotAllowed,
            partner: None,
            evse_restriction: None,
            info: info.into(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn not_allowed_by(partner: PartnerId, info: impl Into<String>) -> Self {
        Self {
            partner: Some(partner),
            ..Self::not_allowed(info)
        }
    }

    pub fn denied(status: AuthorizationStatus, partner: PartnerId, info: impl Into<String>) -> Self {
        Self {
            status,
            partner: Some(partner),
            evse_restriction: None,
            info: info.into(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn communication_timeout(info: impl Into<String>) -> Self {
        Self {
            status: AuthorizationStatus::CommunicationTimeout,
            partner: None,
            evse_restriction: None,
            info: info.into(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn admin_down() -> Self {
        Self {
            status: AuthorizationStatus::AdminDown,
            partner: None,
            evse_restriction: None,
            info: "authorization is administratively disabled".to_string(),
            elapsed: Duration::ZERO,
        }
    }

    /// Attach a location-scoped restriction
    pub fn with_restriction(mut self, evse_id: impl Into<String>) -> Self {
        self.evse_restriction = Some(evse_id.into());
        self
    }

    /// Stamp the elapsed time of the call that produced this outcome
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }
}
