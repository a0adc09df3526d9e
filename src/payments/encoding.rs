//! Canonical msgpack encoding of payment transactions.
//!
//! The node hashes and verifies the exact bytes it receives, so the encoding
//! must be canonical: keys sorted, zero and empty values omitted, byte
//! strings as msgpack `bin`.

use data_encoding::BASE32_NOPAD;
use serde::Serialize;
use sha2::{Digest, Sha512_256};

use crate::blockchain::address::Address;
use crate::blockchain::types::TransactionId;
use crate::payments::types::{BuildError, TransactionRequest};

/// Domain separation prefix for transaction hashing and signing.
const TX_TAG: &[u8] = b"TX";

const PAYMENT_TYPE: &str = "pay";

/// Field order is the wire order.
#[derive(Serialize)]
struct PaymentFields<'a> {
    #[serde(skip_serializing_if = "is_zero")]
    amt: u64,
    #[serde(skip_serializing_if = "is_zero")]
    fee: u64,
    #[serde(skip_serializing_if = "is_zero")]
    fv: u64,
    #[serde(skip_serializing_if = "is_empty_str")]
    gen: &'a str,
    #[serde(with = "serde_bytes", skip_serializing_if = "is_empty_bytes")]
    gh: &'a [u8],
    #[serde(skip_serializing_if = "is_zero")]
    lv: u64,
    #[serde(with = "serde_bytes", skip_serializing_if = "is_empty_bytes")]
    note: &'a [u8],
    #[serde(with = "serde_bytes", skip_serializing_if = "is_zero_key")]
    rcv: &'a [u8],
    #[serde(with = "serde_bytes", skip_serializing_if = "is_zero_key")]
    snd: &'a [u8],
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Serialize)]
struct SignedFields<'a> {
    #[serde(with = "serde_bytes")]
    sig: &'a [u8],
    txn: PaymentFields<'a>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn is_empty_str(value: &&str) -> bool {
    value.is_empty()
}

fn is_empty_bytes(value: &&[u8]) -> bool {
    value.is_empty()
}

fn is_zero_key(value: &&[u8]) -> bool {
    *value == Address::ZERO.public_key().as_slice()
}

fn fields(request: &TransactionRequest) -> PaymentFields<'_> {
    PaymentFields {
        amt: request.amount,
        fee: request.fee,
        fv: request.first_valid,
        gen: &request.genesis_id,
        gh: &request.genesis_hash,
        lv: request.last_valid,
        note: &request.note,
        rcv: request.receiver.public_key(),
        snd: request.sender.public_key(),
        kind: PAYMENT_TYPE,
    }
}

fn to_msgpack<T: Serialize>(value: &T) -> Result<Vec<u8>, BuildError> {
    rmp_serde::to_vec_named(value).map_err(|e| BuildError::Encoding(e.to_string()))
}

/// Canonical encoding of the unsigned transaction.
pub fn encode_transaction(request: &TransactionRequest) -> Result<Vec<u8>, BuildError> {
    to_msgpack(&fields(request))
}

/// The bytes that are signed and hashed: `"TX" || encoded`.
pub fn bytes_to_sign(encoded: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(TX_TAG.len() + encoded.len());
    bytes.extend_from_slice(TX_TAG);
    bytes.extend_from_slice(encoded);
    bytes
}

/// Transaction id of an encoded transaction.
pub fn transaction_id(encoded: &[u8]) -> TransactionId {
    let digest = Sha512_256::digest(bytes_to_sign(encoded));
    TransactionId::new(BASE32_NOPAD.encode(&digest))
}

/// Canonical encoding of the signed transaction, as submitted.
pub fn encode_signed(
    request: &TransactionRequest,
    signature: &[u8; 64],
) -> Result<Vec<u8>, BuildError> {
    to_msgpack(&SignedFields {
        sig: signature,
        txn: fields(request),
    })
}

/// Size of the signed transaction, used for per-byte fees.
pub fn estimated_signed_size(request: &TransactionRequest) -> Result<usize, BuildError> {
    encode_signed(request, &[0u8; 64]).map(|bytes| bytes.len())
}
