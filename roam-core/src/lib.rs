//! Roam Core Library
//!
//! Shared types and capability interfaces for the roam e-mobility roaming
//! federation. A charging-station operator's adapter uses these to talk to
//! the parties it roams with:
//!
//! - **Partners**: external roaming counterparts, identified by a
//!   country/party/role tuple, queried during authorization.
//! - **Hub**: the protocol-facing store that publishes this operator's
//!   infrastructure and status data for partners to read.
//! - **Tokens**: driver/vehicle credentials presented to authorize a
//!   charging session.
//!
//! Wire encoding, transport, and partner-directory persistence live behind
//! the traits in [`federation`]; this crate only defines the shapes they
//! exchange.

pub mod auth;
pub mod federation;
pub mod partner;
pub mod records;
pub mod token;

pub use auth::{
    AuthorizationHints, AuthorizationOutcome, AuthorizationRequest, AuthorizationStatus,
};
pub use federation::{HubError, PartnerClient, PartnerDirectory, PartnerError, RoamingHub};
pub use partner::{CandidatePartner, Connectivity, PartnerId, PartnerRole};
pub use records::{
    ChargeDetailRecord, ChargePointRecord, EvseStatus, EvseStatusRecord, GeoPosition, PlugType,
};
pub use token::{Token, TokenError, TokenKind};
