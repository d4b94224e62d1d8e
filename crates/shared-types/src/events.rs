//! # Actions and Event Signatures
//!
//! The closed set of domain actions a proof can trigger, the source-chain
//! events that authorise them, and the execution-chain completion events
//! emitted once an action has been applied.

use crate::entities::{address_to_word, u256_to_word, Address, ChainSide, Hash, U256};
use crate::hashing::keccak256;
use crate::receipt::Log;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain action applied by the dispatcher for a verified proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Mint bridged tokens to the beneficiary of a burn.
    Mint,
    /// Confirm that a loan has been funded on the source chain.
    FundLoan,
    /// Note a repayment made on the source chain.
    RepayLoan,
}

impl Action {
    /// Source-chain event that authorises this action.
    pub fn authorising_event(&self) -> EventKind {
        match self {
            Action::Mint => EventKind::BurnForBridge,
            Action::FundLoan => EventKind::LoanFunded,
            Action::RepayLoan => EventKind::LoanRepaid,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Mint => write!(f, "mint"),
            Action::FundLoan => write!(f, "fund_loan"),
            Action::RepayLoan => write!(f, "repay_loan"),
        }
    }
}

/// Every event name the relay knows how to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Value burned on the source chain for bridging.
    BurnForBridge,
    /// Loan fully funded on the source chain.
    LoanFunded,
    /// Repayment made on the source chain.
    LoanRepaid,
    /// Execution chain minted bridged tokens.
    TokensMinted,
    /// Execution chain confirmed loan funding.
    LoanFundingConfirmed,
    /// Execution chain noted a loan repayment.
    LoanRepaymentNoted,
    /// Execution chain recorded a proof without a domain action.
    FactRecorded,
}

impl EventKind {
    /// All kinds, in a stable order.
    pub const ALL: [EventKind; 7] = [
        EventKind::BurnForBridge,
        EventKind::LoanFunded,
        EventKind::LoanRepaid,
        EventKind::TokensMinted,
        EventKind::LoanFundingConfirmed,
        EventKind::LoanRepaymentNoted,
        EventKind::FactRecorded,
    ];

    /// Canonical event declaration hashed into topic 0.
    pub fn canonical(&self) -> &'static str {
        match self {
            EventKind::BurnForBridge => "BurnForBridge(address,uint256)",
            EventKind::LoanFunded => "LoanFunded(uint256,uint256)",
            EventKind::LoanRepaid => "LoanRepaid(uint256,uint256)",
            EventKind::TokensMinted => "TokensMinted(bytes32,address,uint256)",
            EventKind::LoanFundingConfirmed => "LoanFundingConfirmed(bytes32,uint256,uint256)",
            EventKind::LoanRepaymentNoted => "LoanRepaymentNoted(bytes32,uint256,uint256)",
            EventKind::FactRecorded => "FactRecorded(bytes32)",
        }
    }

    /// Keccak-256 of the canonical declaration.
    pub fn signature(&self) -> Hash {
        keccak256(self.canonical().as_bytes())
    }

    /// Reverse lookup from topic 0.
    pub fn from_signature(topic: &Hash) -> Option<EventKind> {
        Self::ALL.into_iter().find(|kind| kind.signature() == *topic)
    }

    /// Ledger the event is emitted on.
    pub fn side(&self) -> ChainSide {
        match self {
            EventKind::BurnForBridge | EventKind::LoanFunded | EventKind::LoanRepaid => {
                ChainSide::Source
            }
            _ => ChainSide::Execution,
        }
    }

    /// Action authorised by this event, for source-chain kinds.
    pub fn action(&self) -> Option<Action> {
        match self {
            EventKind::BurnForBridge => Some(Action::Mint),
            EventKind::LoanFunded => Some(Action::FundLoan),
            EventKind::LoanRepaid => Some(Action::RepayLoan),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.canonical();
        let end = name.find('(').unwrap_or(name.len());
        write!(f, "{}", &name[..end])
    }
}

/// Completion event emitted by the dispatcher after applying an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionEvent {
    /// Tokens minted to a beneficiary.
    TokensMinted {
        /// Identity of the proven fact.
        query_id: Hash,
        /// Recipient of the mint.
        beneficiary: Address,
        /// Minted amount.
        amount: U256,
    },
    /// Loan marked funded (or funding accumulated).
    LoanFundingConfirmed {
        /// Identity of the proven fact.
        query_id: Hash,
        /// Loan identifier.
        loan_id: u64,
        /// Funding amount carried by the source event.
        amount: U256,
    },
    /// Repayment recorded against a loan.
    LoanRepaymentNoted {
        /// Identity of the proven fact.
        query_id: Hash,
        /// Loan identifier.
        loan_id: u64,
        /// Repaid amount carried by the source event.
        amount: U256,
    },
    /// Proof recorded without a domain action.
    FactRecorded {
        /// Identity of the proven fact.
        query_id: Hash,
    },
}

impl ExecutionEvent {
    /// Event kind of this completion.
    pub fn kind(&self) -> EventKind {
        match self {
            ExecutionEvent::TokensMinted { .. } => EventKind::TokensMinted,
            ExecutionEvent::LoanFundingConfirmed { .. } => EventKind::LoanFundingConfirmed,
            ExecutionEvent::LoanRepaymentNoted { .. } => EventKind::LoanRepaymentNoted,
            ExecutionEvent::FactRecorded { .. } => EventKind::FactRecorded,
        }
    }

    /// Identity of the fact this completion belongs to.
    pub fn query_id(&self) -> Hash {
        match self {
            ExecutionEvent::TokensMinted { query_id, .. }
            | ExecutionEvent::LoanFundingConfirmed { query_id, .. }
            | ExecutionEvent::LoanRepaymentNoted { query_id, .. }
            | ExecutionEvent::FactRecorded { query_id } => *query_id,
        }
    }

    /// Log entry an execution-chain contract at `emitter` would write.
    ///
    /// Topics are `[signature, query_id]`; data is the subject word followed
    /// by the amount word (empty for `FactRecorded`).
    pub fn to_log(&self, emitter: Address) -> Log {
        let topics = vec![self.kind().signature(), self.query_id()];
        let data = match self {
            ExecutionEvent::TokensMinted {
                beneficiary, amount, ..
            } => [address_to_word(beneficiary), u256_to_word(*amount)].concat(),
            ExecutionEvent::LoanFundingConfirmed {
                loan_id, amount, ..
            }
            | ExecutionEvent::LoanRepaymentNoted {
                loan_id, amount, ..
            } => [u256_to_word(U256::from(*loan_id)), u256_to_word(*amount)].concat(),
            ExecutionEvent::FactRecorded { .. } => Vec::new(),
        };
        Log {
            address: emitter,
            topics,
            data,
        }
    }
}
