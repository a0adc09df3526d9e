//! Payment construction and signing.
//!
//! # Responsibilities
//! - Reject bad input before any network call
//! - Fill in fee and validity window from the node's suggested parameters
//! - Sign with a key that lives only for the signing call

use std::sync::Arc;

use crate::blockchain::address::Address;
use crate::blockchain::client::NodeApi;
use crate::blockchain::types::{NodeError, SuggestedParams};
use crate::blockchain::wallet::Account;
use crate::config::TransactionConfig;
use crate::payments::encoding;
use crate::payments::types::{
    BuildError, FeePolicy, SendError, SignedTransaction, SubmissionError, TransactionRequest,
};

/// A send request that passed local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayment {
    pub receiver: Address,
    pub amount: u64,
    pub note: Vec<u8>,
}

/// Builds and signs payment transactions.
#[derive(Clone)]
pub struct TxBuilder {
    node: Arc<dyn NodeApi>,
    validity_rounds: u64,
    max_note_bytes: usize,
}

impl TxBuilder {
    pub fn new(node: Arc<dyn NodeApi>, config: &TransactionConfig) -> Self {
        Self {
            node,
            validity_rounds: config.validity_rounds,
            max_note_bytes: config.max_note_bytes,
        }
    }

    /// Check amount, receiver and note. Makes no network call.
    pub fn validate(
        &self,
        amount: i64,
        receiver: &str,
        note: &[u8],
    ) -> Result<ValidatedPayment, BuildError> {
        let amount = u64::try_from(amount).map_err(|_| BuildError::NegativeAmount(amount))?;

        let receiver = receiver
            .trim()
            .parse::<Address>()
            .map_err(|reason| BuildError::InvalidReceiver {
                address: receiver.to_string(),
                reason,
            })?;

        if note.len() > self.max_note_bytes {
            return Err(BuildError::NoteTooLong {
                len: note.len(),
                max: self.max_note_bytes,
            });
        }

        Ok(ValidatedPayment {
            receiver,
            amount,
            note: note.to_vec(),
        })
    }

    /// Validate, then fetch suggested parameters and assemble the request.
    pub async fn build(
        &self,
        sender: &Address,
        amount: i64,
        receiver: &str,
        note: &[u8],
        fee: FeePolicy,
    ) -> Result<TransactionRequest, SendError> {
        let payment = self.validate(amount, receiver, note)?;

        let params = self
            .node
            .suggested_params()
            .await
            .map_err(SubmissionError::Node)?;

        self.assemble(sender, payment, fee, &params)
    }

    /// Assemble a request from validated input and the node's parameters.
    ///
    /// Parameters the node got wrong are a node fault, reported as
    /// `SubmissionError::Node`.
    pub fn assemble(
        &self,
        sender: &Address,
        payment: ValidatedPayment,
        fee: FeePolicy,
        params: &SuggestedParams,
    ) -> Result<TransactionRequest, SendError> {
        let genesis_hash = params.genesis_hash_bytes().map_err(SubmissionError::Node)?;

        let first_valid = params.last_round;
        let last_valid = first_valid
            .checked_add(self.validity_rounds)
            .ok_or_else(|| {
                SubmissionError::Node(NodeError::Decode(format!(
                    "last round {} leaves no room for {} validity rounds",
                    first_valid, self.validity_rounds
                )))
            })?;

        let mut request = TransactionRequest {
            sender: *sender,
            receiver: payment.receiver,
            amount: payment.amount,
            note: payment.note,
            fee: params.fee,
            first_valid,
            last_valid,
            genesis_id: params.genesis_id.clone(),
            genesis_hash,
        };

        request.fee = match fee {
            FeePolicy::Flat(fee) => fee,
            FeePolicy::Suggested => {
                let size = encoding::estimated_signed_size(&request)? as u64;
                params.fee.saturating_mul(size).max(params.min_fee)
            }
        };

        tracing::debug!(
            sender = %request.sender,
            receiver = %request.receiver,
            amount = request.amount,
            fee = request.fee,
            first_valid = request.first_valid,
            last_valid = request.last_valid,
            "Transaction assembled"
        );
        Ok(request)
    }

    /// Sign `request` with `account`'s key.
    pub fn sign(
        &self,
        account: &Account,
        request: TransactionRequest,
    ) -> Result<SignedTransaction, BuildError> {
        let encoded = encoding::encode_transaction(&request)?;
        let signature = account.sign(&encoding::bytes_to_sign(&encoded))?.to_bytes();
        let id = encoding::transaction_id(&encoded);
        let wire = encoding::encode_signed(&request, &signature)?;

        tracing::debug!(tx_id = %id, size = wire.len(), "Transaction signed");
        Ok(SignedTransaction::new(request, signature, id, wire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::address::AddressError;
    use crate::blockchain::types::{
        AccountInfo, NodeResult, NodeStatus, PendingTransaction, TransactionId,
    };
    use crate::blockchain::wallet::Passphrase;
    use async_trait::async_trait;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    const RECEIVER: &str = "GD64YIY3TWGDMCNPP553DZPPR6LDUSFQOIJVFDPPXWEG3FVOJCCDBBHU5A";

    /// Fails every call; the builder's pure paths never touch it.
    struct UnreachableNode;

    #[async_trait]
    impl NodeApi for UnreachableNode {
        async fn status(&self) -> NodeResult<NodeStatus> {
            Err(NodeError::Transport("unreachable".into()))
        }
        async fn suggested_params(&self) -> NodeResult<SuggestedParams> {
            Err(NodeError::Transport("unreachable".into()))
        }
        async fn account_info(&self, _: &Address) -> NodeResult<AccountInfo> {
            Err(NodeError::Transport("unreachable".into()))
        }
        async fn send_raw_transaction(&self, _: &SignedTransaction) -> NodeResult<TransactionId> {
            Err(NodeError::Transport("unreachable".into()))
        }
        async fn pending_transaction(&self, _: &TransactionId) -> NodeResult<PendingTransaction> {
            Err(NodeError::Transport("unreachable".into()))
        }
        async fn wait_for_block_after(&self, _: u64) -> NodeResult<NodeStatus> {
            Err(NodeError::Transport("unreachable".into()))
        }
    }

    fn builder() -> TxBuilder {
        TxBuilder::new(Arc::new(UnreachableNode), &TransactionConfig::default())
    }

    fn params(fee_per_byte: u64) -> SuggestedParams {
        SuggestedParams {
            consensus_version: "v38".to_string(),
            fee: fee_per_byte,
            min_fee: 1000,
            genesis_id: "testnet-v1.0".to_string(),
            genesis_hash: "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=".to_string(),
            last_round: 500,
        }
    }

    fn account() -> Account {
        Account::from_passphrase(Passphrase::from_seed(&[5u8; 32])).unwrap()
    }

    #[test]
    fn test_validation_rejects_negative_amount() {
        assert_eq!(
            builder().validate(-1, RECEIVER, b"").unwrap_err(),
            BuildError::NegativeAmount(-1)
        );
    }

    #[test]
    fn test_validation_rejects_bad_receiver() {
        let err = builder().validate(1, "not-an-address", b"").unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidReceiver {
                address: "not-an-address".to_string(),
                reason: AddressError::Length(14),
            }
        );
    }

    #[test]
    fn test_validation_rejects_long_note() {
        let note = vec![0u8; 1025];
        assert_eq!(
            builder().validate(1, RECEIVER, &note).unwrap_err(),
            BuildError::NoteTooLong {
                len: 1025,
                max: 1024
            }
        );
        assert!(builder().validate(1, RECEIVER, &note[..1024]).is_ok());
    }

    #[test]
    fn test_assemble_matches_inputs() {
        let b = builder();
        let sender = *account().address();
        let payment = b.validate(1_000_000, RECEIVER, b"hello").unwrap();
        let request = b
            .assemble(&sender, payment, FeePolicy::Flat(2500), &params(0))
            .unwrap();

        assert_eq!(request.sender, sender);
        assert_eq!(request.receiver.to_string(), RECEIVER);
        assert_eq!(request.amount, 1_000_000);
        assert_eq!(request.note, b"hello");
        assert_eq!(request.fee, 2500);
        assert_eq!(request.first_valid, 500);
        assert_eq!(request.last_valid, 1500);
        assert_eq!(request.genesis_id, "testnet-v1.0");
        assert_eq!(request.genesis_hash.len(), 32);
    }

    #[test]
    fn test_suggested_fee_has_network_minimum() {
        let b = builder();
        let sender = *account().address();
        let payment = b.validate(1, RECEIVER, b"").unwrap();
        let request = b
            .assemble(&sender, payment, FeePolicy::Suggested, &params(0))
            .unwrap();
        assert_eq!(request.fee, 1000);
    }

    #[test]
    fn test_suggested_fee_scales_with_size() {
        let b = builder();
        let sender = *account().address();
        let payment = b.validate(1, RECEIVER, &[1u8; 200]).unwrap();
        let request = b
            .assemble(&sender, payment, FeePolicy::Suggested, &params(10))
            .unwrap();
        assert!(request.fee > 2000);

        let mut estimate = request.clone();
        estimate.fee = 10;
        let size = encoding::estimated_signed_size(&estimate).unwrap() as u64;
        assert_eq!(request.fee, 10 * size);
    }

    #[test]
    fn test_signature_covers_tagged_encoding() {
        let b = builder();
        let account = account();
        let payment = b.validate(42, RECEIVER, b"").unwrap();
        let request = b
            .assemble(account.address(), payment, FeePolicy::Flat(1000), &params(0))
            .unwrap();
        let signed = b.sign(&account, request.clone()).unwrap();

        let encoded = encoding::encode_transaction(&request).unwrap();
        let key = VerifyingKey::from_bytes(account.address().public_key()).unwrap();
        let signature = Signature::from_bytes(signed.signature());
        assert!(key
            .verify(&encoding::bytes_to_sign(&encoded), &signature)
            .is_ok());
        assert_eq!(signed.id(), &encoding::transaction_id(&encoded));
        assert_eq!(signed.transaction(), &request);
    }

    #[test]
    fn test_malformed_genesis_hash_is_node_fault() {
        let b = builder();
        let payment = b.validate(1, RECEIVER, b"").unwrap();
        let mut bad = params(0);
        bad.genesis_hash = "!!!not base64".to_string();

        let err = b
            .assemble(account().address(), payment, FeePolicy::Suggested, &bad)
            .unwrap_err();
        assert!(matches!(
            err,
            SendError::Submission(SubmissionError::Node(NodeError::Decode(_)))
        ));
    }

    #[test]
    fn test_validity_window_overflow_is_an_error() {
        let b = builder();
        let payment = b.validate(1, RECEIVER, b"").unwrap();
        let mut late = params(0);
        late.last_round = u64::MAX - 10;

        let err = b
            .assemble(account().address(), payment, FeePolicy::Flat(1000), &late)
            .unwrap_err();
        assert!(matches!(
            err,
            SendError::Submission(SubmissionError::Node(NodeError::Decode(_)))
        ));
    }

    #[tokio::test]
    async fn test_build_maps_param_failure_to_submission_error() {
        let err = builder()
            .build(account().address(), 1, RECEIVER, b"", FeePolicy::Suggested)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SendError::Submission(SubmissionError::Node(NodeError::Transport(_)))
        ));
    }
}
