//! Adapter configuration

use std::time::Duration;

use roam_core::{PartnerId, PartnerRole};

use crate::authorize::AuthTimeouts;

/// Complete adapter configuration
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Identity this operator publishes under
    pub operator: PartnerId,

    /// Default timeouts for authorization calls
    pub auth_timeouts: AuthTimeouts,

    /// Default wait for the exclusive gate on mutating operations
    pub gate_max_wait: Duration,

    /// Initial admin switch: refuse data pushes
    pub disable_data_push: bool,

    /// Initial admin switch: refuse authorizations
    pub disable_authorization: bool,

    /// Initial admin switch: refuse charge detail record submission
    pub disable_cdrs: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            operator: PartnerId::new("DE", "VBR", PartnerRole::Cpo),
            auth_timeouts: AuthTimeouts::default(),
            gate_max_wait: Duration::from_secs(120),
            disable_data_push: false,
            disable_authorization: false,
            disable_cdrs: false,
        }
    }
}

impl AdapterConfig {
    pub fn new(operator: PartnerId) -> Self {
        Self {
            operator,
            ..Default::default()
        }
    }

    /// Set authorization timeouts
    pub fn with_auth_timeouts(mut self, timeouts: AuthTimeouts) -> Self {
        self.auth_timeouts = timeouts;
        self
    }

    /// Set the default gate wait
    pub fn with_gate_max_wait(mut self, max_wait: Duration) -> Self {
        self.gate_max_wait = max_wait;
        self
    }

    /// Start with data pushes disabled
    pub fn without_data_push(mut self) -> Self {
        self.disable_data_push = true;
        self
    }

    /// Start with authorization disabled
    pub fn without_authorization(mut self) -> Self {
        self.disable_authorization = true;
        self
    }

    /// Start with CDR submission disabled
    pub fn without_cdrs(mut self) -> Self {
        self.disable_cdrs = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chain() {
        let config = AdapterConfig::new(PartnerId::new("AT", "GRZ", PartnerRole::Cpo))
            .with_gate_max_wait(Duration::from_secs(30))
            .without_cdrs();

        assert_eq!(config.operator.country_code, "AT");
        assert_eq!(config.gate_max_wait, Duration::from_secs(30));
        assert!(config.disable_cdrs);
        assert!(!config.disable_data_push);
    }
}
