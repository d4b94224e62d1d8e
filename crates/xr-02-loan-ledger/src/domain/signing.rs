//! # Loan Signing
//!
//! Both parties sign the same keccak digest over every loan field:
//!
//! ```text
//! keccak256( "XR_LOAN_V1" ‖ ledgerKey u64 BE
//!          ‖ fund.from ‖ fund.to ‖ fund.token
//!          ‖ repay.from ‖ repay.to ‖ repay.token
//!          ‖ loanAmount u256 BE ‖ rateBps u64 BE
//!          ‖ expected u256 BE ‖ deadline u64 BE )
//! ```
//!
//! The ledger key binds a signature to one ledger deployment. Addresses are
//! the last 20 bytes of keccak over the uncompressed public key.

use super::errors::{LedgerError, LedgerResult};
use super::value_objects::{LoanFlow, LoanSignature, LoanTerms};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use shared_types::{keccak256, keccak256_concat, u256_to_word, Address, ChainKey, Hash};

/// Domain separator prefixed to every loan payload.
pub const LOAN_DOMAIN_TAG: &[u8] = b"XR_LOAN_V1";

/// Digest both parties sign.
pub fn loan_payload_hash(
    ledger_key: ChainKey,
    fund_flow: &LoanFlow,
    repay_flow: &LoanFlow,
    terms: &LoanTerms,
) -> Hash {
    keccak256_concat(&[
        LOAN_DOMAIN_TAG,
        ledger_key.to_be_bytes().as_slice(),
        fund_flow.from.as_slice(),
        fund_flow.to.as_slice(),
        fund_flow.token.as_slice(),
        repay_flow.from.as_slice(),
        repay_flow.to.as_slice(),
        repay_flow.token.as_slice(),
        u256_to_word(terms.loan_amount).as_slice(),
        terms.interest_rate_bps.to_be_bytes().as_slice(),
        u256_to_word(terms.expected_repayment_amount).as_slice(),
        terms.deadline_height.to_be_bytes().as_slice(),
    ])
}

/// Address controlled by a public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    // Skip the 0x04 SEC1 prefix.
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Recover the signer of `hash`.
pub fn recover_signer(hash: &Hash, signature: &LoanSignature) -> LedgerResult<Address> {
    recover_as("signer", hash, signature)
}

fn recover_as(
    role: &'static str,
    hash: &Hash,
    signature: &LoanSignature,
) -> LedgerResult<Address> {
    let invalid = |reason: String| LedgerError::InvalidSignature { role, reason };

    let recovery_id = match signature.v {
        0 | 27 => RecoveryId::from_byte(0),
        1 | 28 => RecoveryId::from_byte(1),
        _ => None,
    }
    .ok_or_else(|| invalid(format!("invalid recovery id {}", signature.v)))?;

    let mut bytes = [0u8; 64];
    bytes[..32].copy_from_slice(&signature.r);
    bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&bytes)
        .map_err(|e| invalid(format!("malformed signature: {e}")))?;

    let key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
        .map_err(|e| invalid(format!("recovery failed: {e}")))?;
    Ok(address_of(&key))
}

/// Check that `signature` over `hash` was produced by `expected`.
pub(crate) fn verify_party(
    role: &'static str,
    hash: &Hash,
    signature: &LoanSignature,
    expected: &Address,
) -> LedgerResult<()> {
    if recover_as(role, hash, signature)? != *expected {
        return Err(LedgerError::InvalidSignature {
            role,
            reason: "signer does not match the expected party".into(),
        });
    }
    Ok(())
}

/// Sign a loan digest with a party's key.
pub fn sign_payload(key: &SigningKey, hash: &Hash) -> LedgerResult<LoanSignature> {
    let (sig, recovery_id) = key
        .sign_prehash_recoverable(hash)
        .map_err(|e| LedgerError::InvalidSignature {
            role: "signer",
            reason: e.to_string(),
        })?;

    let bytes = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);

    Ok(LoanSignature {
        r,
        s,
        v: recovery_id.to_byte() + 27,
    })
}
