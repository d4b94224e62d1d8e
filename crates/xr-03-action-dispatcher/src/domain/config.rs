//! Dispatcher configuration.

use serde::{Deserialize, Serialize};
use shared_types::{Action, Address};

/// Whether the replay guard is consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayProtection {
    /// Every identity executes at most once.
    #[default]
    Enforced,
    /// Identities are never marked. Development networks only.
    DevBypass,
}

/// Source-chain contracts whose logs authorise actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceContracts {
    /// Emitter of `BurnForBridge`.
    pub bridge: Address,
    /// Emitter of `LoanFunded` and `LoanRepaid`.
    pub loans: Address,
}

impl SourceContracts {
    /// Contract that must have emitted the log authorising `action`.
    pub fn emitter_for(&self, action: Action) -> Address {
        match action {
            Action::Mint => self.bridge,
            Action::FundLoan | Action::RepayLoan => self.loans,
        }
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Replay guard mode.
    pub replay_protection: ReplayProtection,
    /// Tracked source contracts.
    pub sources: SourceContracts,
    /// Buffered completion events per subscriber.
    pub event_channel_capacity: usize,
}

impl DispatcherConfig {
    /// Enforced replay protection for the given source contracts.
    pub fn new(sources: SourceContracts) -> Self {
        Self {
            replay_protection: ReplayProtection::Enforced,
            sources,
            event_channel_capacity: 1024,
        }
    }

    /// Configuration with the replay guard disabled.
    pub fn dev_bypass(sources: SourceContracts) -> Self {
        Self {
            replay_protection: ReplayProtection::DevBypass,
            ..Self::new(sources)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitter_per_action() {
        let sources = SourceContracts {
            bridge: [0xB1; 20],
            loans: [0x10; 20],
        };
        assert_eq!(sources.emitter_for(Action::Mint), [0xB1; 20]);
        assert_eq!(sources.emitter_for(Action::FundLoan), [0x10; 20]);
        assert_eq!(sources.emitter_for(Action::RepayLoan), [0x10; 20]);
        assert_eq!(
            DispatcherConfig::dev_bypass(sources).replay_protection,
            ReplayProtection::DevBypass
        );
    }
}
