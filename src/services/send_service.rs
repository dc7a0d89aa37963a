use sha2::{Digest, Sha512_256};
use tracing::{debug, info};

use crate::db::TransactionStore;
use crate::error::{AppError, Result};
use crate::models::{SendRequest, TransactionRecord};
use crate::network::{NetworkClient, PaymentOrder, TransactionSigner};

const ADDRESS_LENGTH: usize = 58;
const PUBLIC_KEY_BYTES: usize = 32;
const CHECKSUM_BYTES: usize = 4;
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const MNEMONIC_WORDS: usize = 25;
const MAX_NOTE_BYTES: usize = 1000;

/// Unpadded RFC 4648 base32. Trailing bits must be zero.
fn decode_base32(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u64 = 0;
    let mut bits = 0u32;
    for b in input.bytes() {
        let value = BASE32_ALPHABET.iter().position(|&c| c == b)? as u64;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1u64 << bits) - 1;
        }
    }
    (buffer == 0).then_some(out)
}

/// An Algorand address is the base32 of a 32-byte public key followed by the
/// last 4 bytes of its SHA-512/256 digest
pub fn is_valid_address(address: &str) -> bool {
    if address.len() != ADDRESS_LENGTH {
        return false;
    }
    let Some(raw) = decode_base32(address) else {
        return false;
    };
    if raw.len() != PUBLIC_KEY_BYTES + CHECKSUM_BYTES {
        return false;
    }
    let (public_key, checksum) = raw.split_at(PUBLIC_KEY_BYTES);
    let digest = Sha512_256::digest(public_key);
    digest[digest.len() - CHECKSUM_BYTES..] == *checksum
}

/// Reject malformed requests before anything touches the network
pub fn validate_send_request(request: &SendRequest) -> Result<()> {
    if request.mnemonic.trim().is_empty() || request.recipient.trim().is_empty() {
        return Err(AppError::Validation(
            "Missing required fields: mnemonic, recipient, amount".to_string(),
        ));
    }
    if !is_valid_address(request.recipient.trim()) {
        return Err(AppError::Validation("Invalid recipient address.".to_string()));
    }
    if request.amount == 0 {
        return Err(AppError::Validation("Amount must be greater than zero.".to_string()));
    }
    if request.mnemonic.split_whitespace().count() != MNEMONIC_WORDS {
        return Err(AppError::Validation(format!(
            "Invalid mnemonic: expected {} words.",
            MNEMONIC_WORDS
        )));
    }
    if let Some(note) = &request.note {
        if note.len() > MAX_NOTE_BYTES {
            return Err(AppError::Validation(format!(
                "Note must be at most {} bytes.",
                MAX_NOTE_BYTES
            )));
        }
    }
    Ok(())
}

/// Sign, broadcast and record a payment. The returned record is `pending`.
pub async fn send_transaction(
    store: &dyn TransactionStore,
    network: &dyn NetworkClient,
    signer: &dyn TransactionSigner,
    request: SendRequest,
) -> Result<TransactionRecord> {
    validate_send_request(&request)?;

    let params = network
        .suggested_params()
        .await
        .map_err(AppError::Broadcast)?;
    debug!("Suggested params at round {}", params.last_round);

    let recipient = request.recipient.trim().to_string();
    let note = request.note.unwrap_or_default();
    let order = PaymentOrder {
        mnemonic: request.mnemonic.split_whitespace().collect::<Vec<_>>().join(" "),
        to: recipient.clone(),
        amount: request.amount,
        note: note.clone(),
        params,
    };
    let signed = signer.sign_payment(&order).await?;

    let tx_id = network
        .send_raw_transaction(signed.signed_txn)
        .await
        .map_err(AppError::Broadcast)?;

    let record = TransactionRecord::pending(tx_id, signed.from, recipient, request.amount, note);
    store.insert(&record).await?;
    info!(
        "Submitted {} ({} microAlgos {} -> {})",
        record.tx_id, record.amount, record.from, record.to
    );

    Ok(record)
}
