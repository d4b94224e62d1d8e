//! # Event Decoder
//!
//! Closed decoder for the source-chain events that authorise an action.
//! The raw transaction must be a known envelope with a successful receipt,
//! and the first log emitted by the tracked contract whose topic 0 is the
//! action's event signature must have exactly two topics and exactly one
//! data word. Logs from any other emitter are ignored:
//!
//! | Event           | topic 1          | data   |
//! |-----------------|------------------|--------|
//! | `BurnForBridge` | beneficiary      | amount |
//! | `LoanFunded`    | loan id          | amount |
//! | `LoanRepaid`    | loan id          | amount |

use shared_types::{
    short_hex, word_to_address, word_to_u256, Action, Address, CodecError, EventKind, Hash, Log,
    TransactionEnvelope, U256,
};
use thiserror::Error;

/// Topics every authorising log carries.
pub const EVENT_TOPIC_COUNT: usize = 2;

/// Data bytes every authorising log carries.
pub const EVENT_DATA_LEN: usize = 32;

/// Why a proven transaction does not carry the expected event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Raw bytes are not a known envelope.
    #[error("Undecodable transaction: {0}")]
    Codec(#[from] CodecError),

    /// Receipt reports failure.
    #[error("Transaction receipt status is failure")]
    ReceiptFailed,

    /// No log from the tracked contract carries the expected signature.
    #[error("No {event} log from {} in receipt", short_hex(.emitter))]
    EventNotFound {
        /// Event being decoded.
        event: EventKind,
        /// Contract the log had to come from.
        emitter: Address,
    },

    /// Topic count differs from the event layout.
    #[error("{event} log has {got} topics, expected {expected}")]
    TopicCount {
        /// Event being decoded.
        event: EventKind,
        /// Required count.
        expected: usize,
        /// Actual count.
        got: usize,
    },

    /// Data length differs from the event layout.
    #[error("{event} log has {got} data bytes, expected {expected}")]
    DataLength {
        /// Event being decoded.
        event: EventKind,
        /// Required length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Address topic has non-zero upper bytes.
    #[error("Beneficiary topic is not an address word")]
    InvalidAddressWord,

    /// Loan id topic does not fit in 64 bits.
    #[error("Loan id {0} out of range")]
    LoanIdOutOfRange(U256),
}

/// Payload of an authorising event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedEvent {
    /// Burn on the source chain.
    Burn {
        /// Address to mint to.
        beneficiary: Address,
        /// Amount burned.
        amount: U256,
    },
    /// Loan funding on the source chain.
    LoanFunded {
        /// Loan id.
        loan_id: u64,
        /// Amount funded.
        amount: U256,
    },
    /// Repayment on the source chain.
    LoanRepaid {
        /// Loan id.
        loan_id: u64,
        /// Amount repaid.
        amount: U256,
    },
}

/// Decode the event authorising `action` from raw transaction bytes.
///
/// Only logs whose address is `emitter` are considered.
pub fn decode_event(
    raw_transaction: &[u8],
    action: Action,
    emitter: &Address,
) -> Result<DecodedEvent, DecodeError> {
    let envelope = TransactionEnvelope::decode(raw_transaction)?;
    if !envelope.succeeded() {
        return Err(DecodeError::ReceiptFailed);
    }

    let event = action.authorising_event();
    let signature = event.signature();
    let log = envelope
        .body
        .receipt
        .logs
        .iter()
        .find(|log| log.address == *emitter && log.topics.first() == Some(&signature))
        .ok_or(DecodeError::EventNotFound {
            event,
            emitter: *emitter,
        })?;
    check_shape(event, log)?;

    let subject = &log.topics[1];
    let amount = word_to_u256(&log.data);
    Ok(match action {
        Action::Mint => DecodedEvent::Burn {
            beneficiary: word_to_address(subject).ok_or(DecodeError::InvalidAddressWord)?,
            amount,
        },
        Action::FundLoan => DecodedEvent::LoanFunded {
            loan_id: loan_id(subject)?,
            amount,
        },
        Action::RepayLoan => DecodedEvent::LoanRepaid {
            loan_id: loan_id(subject)?,
            amount,
        },
    })
}

fn check_shape(event: EventKind, log: &Log) -> Result<(), DecodeError> {
    if log.topics.len() != EVENT_TOPIC_COUNT {
        return Err(DecodeError::TopicCount {
            event,
            expected: EVENT_TOPIC_COUNT,
            got: log.topics.len(),
        });
    }
    if log.data.len() != EVENT_DATA_LEN {
        return Err(DecodeError::DataLength {
            event,
            expected: EVENT_DATA_LEN,
            got: log.data.len(),
        });
    }
    Ok(())
}

fn loan_id(word: &Hash) -> Result<u64, DecodeError> {
    let value = word_to_u256(word);
    if value > U256::from(u64::MAX) {
        return Err(DecodeError::LoanIdOutOfRange(value));
    }
    Ok(value.low_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{
        address_to_word, u256_to_word, Receipt, ReceiptStatus, TransactionBody, TxType,
    };

    fn raw_with(status: ReceiptStatus, logs: Vec<Log>) -> Vec<u8> {
        TransactionEnvelope::new(
            TxType::DynamicFee,
            TransactionBody {
                from: [0xA1; 20],
                to: [0xB2; 20],
                nonce: 0,
                input: vec![],
                receipt: Receipt { status, logs },
            },
        )
        .encode()
        .unwrap()
    }

    const EMITTER: Address = [0xB2; 20];

    fn log(event: EventKind, subject: Hash, amount: u64) -> Log {
        Log {
            address: EMITTER,
            topics: vec![event.signature(), subject],
            data: u256_to_word(U256::from(amount)).to_vec(),
        }
    }

    #[test]
    fn test_decode_burn() {
        let raw = raw_with(
            ReceiptStatus::Success,
            vec![log(EventKind::BurnForBridge, address_to_word(&[0xCC; 20]), 42)],
        );
        assert_eq!(
            decode_event(&raw, Action::Mint, &EMITTER).unwrap(),
            DecodedEvent::Burn {
                beneficiary: [0xCC; 20],
                amount: U256::from(42u64)
            }
        );
    }

    #[test]
    fn test_decode_skips_unrelated_logs() {
        let unrelated = Log {
            address: [0xB2; 20],
            topics: vec![[0x55; 32]],
            data: vec![],
        };
        let raw = raw_with(
            ReceiptStatus::Success,
            vec![
                unrelated,
                log(EventKind::LoanRepaid, u256_to_word(U256::from(3u64)), 50),
            ],
        );
        assert_eq!(
            decode_event(&raw, Action::RepayLoan, &EMITTER).unwrap(),
            DecodedEvent::LoanRepaid {
                loan_id: 3,
                amount: U256::from(50u64)
            }
        );
    }

    #[test]
    fn test_wrong_action_not_found() {
        let raw = raw_with(
            ReceiptStatus::Success,
            vec![log(EventKind::LoanFunded, u256_to_word(U256::one()), 500)],
        );
        assert_eq!(
            decode_event(&raw, Action::RepayLoan, &EMITTER),
            Err(DecodeError::EventNotFound {
                event: EventKind::LoanRepaid,
                emitter: EMITTER
            })
        );
    }

    #[test]
    fn test_foreign_emitter_ignored() {
        let mut spoofed = log(EventKind::BurnForBridge, address_to_word(&[0xEE; 20]), 1_000_000);
        spoofed.address = [0xEE; 20];
        let genuine = log(EventKind::BurnForBridge, address_to_word(&[0xCC; 20]), 1);
        let raw = raw_with(ReceiptStatus::Success, vec![spoofed.clone(), genuine]);
        assert_eq!(
            decode_event(&raw, Action::Mint, &EMITTER).unwrap(),
            DecodedEvent::Burn {
                beneficiary: [0xCC; 20],
                amount: U256::one()
            }
        );

        let raw = raw_with(ReceiptStatus::Success, vec![spoofed]);
        assert!(matches!(
            decode_event(&raw, Action::Mint, &EMITTER),
            Err(DecodeError::EventNotFound { .. })
        ));
    }

    #[test]
    fn test_failed_receipt_rejected() {
        let raw = raw_with(
            ReceiptStatus::Failure,
            vec![log(EventKind::LoanFunded, u256_to_word(U256::one()), 500)],
        );
        assert_eq!(decode_event(&raw, Action::FundLoan, &EMITTER), Err(DecodeError::ReceiptFailed));
    }

    #[test]
    fn test_extra_topic_rejected() {
        let mut bad = log(EventKind::BurnForBridge, address_to_word(&[1u8; 20]), 1);
        bad.topics.push([0u8; 32]);
        let raw = raw_with(ReceiptStatus::Success, vec![bad]);
        assert!(matches!(
            decode_event(&raw, Action::Mint, &EMITTER),
            Err(DecodeError::TopicCount { got: 3, .. })
        ));
    }

    #[test]
    fn test_short_data_rejected() {
        let mut bad = log(EventKind::LoanFunded, u256_to_word(U256::one()), 1);
        bad.data.truncate(31);
        let raw = raw_with(ReceiptStatus::Success, vec![bad]);
        assert!(matches!(
            decode_event(&raw, Action::FundLoan, &EMITTER),
            Err(DecodeError::DataLength { got: 31, .. })
        ));
    }

    #[test]
    fn test_dirty_address_rejected() {
        let raw = raw_with(
            ReceiptStatus::Success,
            vec![log(EventKind::BurnForBridge, [0xFF; 32], 1)],
        );
        assert_eq!(
            decode_event(&raw, Action::Mint, &EMITTER),
            Err(DecodeError::InvalidAddressWord)
        );
    }

    #[test]
    fn test_loan_id_out_of_range() {
        let id = U256::from(u64::MAX) + U256::one();
        let raw = raw_with(
            ReceiptStatus::Success,
            vec![log(EventKind::LoanFunded, u256_to_word(id), 1)],
        );
        assert_eq!(
            decode_event(&raw, Action::FundLoan, &EMITTER),
            Err(DecodeError::LoanIdOutOfRange(id))
        );
    }

    #[test]
    fn test_unknown_envelope_rejected() {
        assert!(matches!(
            decode_event(&[0x09, 0x00], Action::Mint, &EMITTER),
            Err(DecodeError::Codec(CodecError::UnknownTxType(0x09)))
        ));
    }
}
