//! Transaction submitter — signing, simulation, submission, confirmation.
//!
//! Every mutating workflow operation goes through [`TxSubmitter::submit_and_wait`],
//! which blocks until the transaction has at least one confirmation. That
//! wait is the ordering mechanism the workflow relies on: account data and
//! allowance reads that follow a mutation observe its confirmed effect.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Bytes, TxKind, B256, U256};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::TimingConfig;
use crate::errors::WorkflowError;

/// Concrete provider type: Alloy HTTP provider over Ethereum network.
pub type HttpProvider = RootProvider;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// `Error(string)` selector: `keccak256("Error(string)")[0..4]`.
const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// `Panic(uint256)` selector: `keccak256("Panic(uint256)")[0..4]`.
const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Gas price safety buffer (10% above current base price).
const GAS_PRICE_BUFFER_PCT: u128 = 10;

// ---------------------------------------------------------------------------
// TxSubmitter
// ---------------------------------------------------------------------------

/// Transaction submitter with local signing and nonce management.
pub struct TxSubmitter {
    provider: HttpProvider,
    signer: PrivateKeySigner,
    /// Async-safe nonce counter. `None` until first chain query.
    nonce: Mutex<Option<u64>>,
    /// Timeout for `eth_call` simulation.
    simulation_timeout: Duration,
    /// Timeout for waiting for transaction confirmation.
    confirmation_timeout: Duration,
    chain_id: u64,
}

impl TxSubmitter {
    /// Construct from a pre-built provider and config.
    pub fn new(
        provider: HttpProvider,
        signer: PrivateKeySigner,
        timing: &TimingConfig,
        chain_id: u64,
    ) -> Self {
        info!(
            address = %signer.address(),
            chain_id,
            simulation_timeout = timing.simulation_timeout_seconds,
            confirmation_timeout = timing.confirmation_timeout_seconds,
            "TxSubmitter initialized"
        );

        Self {
            provider,
            signer,
            nonce: Mutex::new(None),
            simulation_timeout: Duration::from_secs(timing.simulation_timeout_seconds),
            confirmation_timeout: Duration::from_secs(timing.confirmation_timeout_seconds),
            chain_id,
        }
    }

    /// Address associated with the signer.
    pub fn signer_address(&self) -> alloy::primitives::Address {
        self.signer.address()
    }

    // -----------------------------------------------------------------------
    // Public API
    // -----------------------------------------------------------------------

    /// Simulate a transaction via `eth_call` with timeout protection.
    ///
    /// Returns raw output bytes on success, which callers decode as the
    /// function's return value.
    pub async fn simulate(&self, tx: &TransactionRequest) -> Result<Bytes, WorkflowError> {
        let provider = &self.provider;
        let tx_clone = tx.clone();
        match tokio::time::timeout(self.simulation_timeout, async move {
            provider.call(tx_clone).await
        })
        .await
        {
            Ok(Ok(result)) => {
                debug!(output_len = result.len(), "simulation succeeded");
                Ok(result)
            }
            Ok(Err(e)) => Err(WorkflowError::SimulationFailed {
                reason: format!("simulation reverted: {}", simulation_reason(&e)),
            }),
            Err(_) => Err(WorkflowError::SimulationFailed {
                reason: format!(
                    "simulation timed out after {}s",
                    self.simulation_timeout.as_secs()
                ),
            }),
        }
    }

    /// Full submission flow: simulate → submit → wait for one confirmation.
    ///
    /// Returns the simulated return data, so callers can recover values
    /// (e.g. amount spent by an exact-output swap) that receipts do not carry.
    pub async fn submit_and_wait(
        &self,
        tx: TransactionRequest,
    ) -> Result<Bytes, WorkflowError> {
        let output = self.simulate(&tx).await?;
        let tx_hash = self.submit(tx).await?;
        self.wait_for_receipt(tx_hash).await?;
        Ok(output)
    }

    /// Sign and submit a transaction. Assigns nonce and gas price
    /// automatically. Returns the transaction hash.
    pub async fn submit(&self, tx: TransactionRequest) -> Result<B256, WorkflowError> {
        let nonce = self.get_next_nonce().await?;
        let gas_price = self.get_gas_price().await?;

        // Cast to u64: Alloy may return u128 but gas limits always fit in u64.
        #[allow(clippy::unnecessary_cast)]
        let gas_limit: u64 = match tx.gas {
            Some(gas) => gas as u64,
            None => {
                let estimate = self.provider.estimate_gas(tx.clone()).await.map_err(|e| {
                    WorkflowError::SimulationFailed {
                        reason: format!("gas estimation failed: {e}"),
                    }
                })?;
                estimate as u64
            }
        };

        let to = tx.to.unwrap_or(TxKind::Create);
        let value = tx.value.unwrap_or_default();
        let input = tx.input.into_input().unwrap_or_default();

        let tx_hash = self
            .sign_and_send(nonce, gas_price, gas_limit, to, value, input)
            .await?;

        info!(
            tx_hash = %tx_hash,
            nonce,
            gas_price,
            gas_limit,
            "transaction submitted"
        );

        Ok(tx_hash)
    }

    /// Poll for a transaction receipt until confirmed or timeout.
    ///
    /// Returns `WorkflowError::TxReverted` if the receipt has `status == 0`.
    /// Returns `WorkflowError::TxTimeout` if confirmation takes too long.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<alloy::rpc::types::TransactionReceipt, WorkflowError> {
        let start = tokio::time::Instant::now();

        loop {
            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    if !receipt.status() {
                        return Err(WorkflowError::TxReverted {
                            tx_hash: tx_hash.to_string(),
                            reason: "transaction reverted on-chain".into(),
                        });
                    }
                    info!(
                        tx_hash = %tx_hash,
                        gas_used = receipt.gas_used,
                        "transaction confirmed"
                    );
                    return Ok(receipt);
                }
                Ok(None) => {
                    // Not yet mined — continue polling
                }
                Err(e) => {
                    warn!(error = %e, tx_hash = %tx_hash, "receipt poll error, retrying");
                }
            }

            if start.elapsed() >= self.confirmation_timeout {
                return Err(WorkflowError::TxTimeout {
                    tx_hash: tx_hash.to_string(),
                    timeout_seconds: self.confirmation_timeout.as_secs(),
                });
            }

            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    /// Current gas price in Wei with a 10% buffer.
    pub async fn get_gas_price(&self) -> Result<u128, WorkflowError> {
        let base_price = self.provider.get_gas_price().await?;
        Ok(base_price + base_price * GAS_PRICE_BUFFER_PCT / 100)
    }

    // -----------------------------------------------------------------------
    // Revert decoding
    // -----------------------------------------------------------------------

    /// Decode a Solidity revert reason from raw return data.
    ///
    /// Handles:
    /// - `Error(string)` (0x08c379a0) — standard revert messages.
    /// - `Panic(uint256)` (0x4e487b71) — arithmetic and assertion panics.
    /// - Unknown selectors — falls back to hex encoding.
    pub fn decode_revert_reason(data: &[u8]) -> String {
        if data.is_empty() {
            return "Unknown revert".into();
        }

        if data.len() < 4 {
            return hex::encode(data);
        }

        // Error(string): selector(4) + offset(32) + length(32) + data
        if data[..4] == ERROR_SELECTOR && data.len() >= 68 {
            if let Ok(len_bytes) = <[u8; 8]>::try_from(&data[60..68]) {
                let str_len = u64::from_be_bytes(len_bytes) as usize;
                if data.len() >= 68 + str_len {
                    return String::from_utf8_lossy(&data[68..68 + str_len]).into_owned();
                }
            }
        }

        // Panic(uint256): selector(4) + code(32)
        if data[..4] == PANIC_SELECTOR && data.len() >= 36 {
            let code = U256::from_be_slice(&data[4..36]);
            return match code.to::<u64>() {
                0x01 => "Panic: assertion failed".into(),
                0x11 => "Panic: arithmetic overflow/underflow".into(),
                0x12 => "Panic: division by zero".into(),
                0x32 => "Panic: array index out of bounds".into(),
                _ => format!("Panic(0x{code:x})"),
            };
        }

        hex::encode(data)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Get the next nonce, initialising from chain on the first call.
    ///
    /// The counter advances optimistically: a failed submission leaves a
    /// gap, and the workflow aborts on any submission error, so a nonce is
    /// never reused within a run.
    async fn get_next_nonce(&self) -> Result<u64, WorkflowError> {
        let mut guard = self.nonce.lock().await;
        let nonce = match *guard {
            Some(n) => n,
            None => {
                let n = self
                    .provider
                    .get_transaction_count(self.signer.address())
                    .await?;
                info!(nonce = n, "nonce initialized from chain");
                n
            }
        };
        *guard = Some(nonce + 1);
        Ok(nonce)
    }

    /// Build a legacy transaction, sign it locally, and submit raw bytes.
    async fn sign_and_send(
        &self,
        nonce: u64,
        gas_price: u128,
        gas_limit: u64,
        to: TxKind,
        value: U256,
        input: Bytes,
    ) -> Result<B256, WorkflowError> {
        let tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            input,
        };

        let sig_hash = tx.signature_hash();
        let sig = self
            .signer
            .sign_hash_sync(&sig_hash)
            .map_err(|e| WorkflowError::SimulationFailed {
                reason: format!("transaction signing failed: {e}"),
            })?;

        let signed = tx.into_signed(sig);
        let envelope = TxEnvelope::Legacy(signed);
        let raw = envelope.encoded_2718();

        let pending = self.provider.send_raw_transaction(&raw).await?;

        Ok(*pending.tx_hash())
    }
}

// ---------------------------------------------------------------------------
// Transport error → revert reason
// ---------------------------------------------------------------------------

/// Pull a usable revert reason out of a transport error.
///
/// JSON-RPC error responses carry the raw revert bytes in their `data`
/// field; those decode to the Solidity message via
/// [`TxSubmitter::decode_revert_reason`]. Without revert data, the error
/// response message (or the transport error text) is returned as-is.
fn simulation_reason(e: &alloy::transports::TransportError) -> String {
    if let Some(payload) = e.as_error_resp() {
        if let Some(data) = &payload.data {
            if let Ok(hex_str) = serde_json::from_str::<String>(data.get()) {
                if let Ok(bytes) = hex::decode(hex_str.trim_start_matches("0x")) {
                    return TxSubmitter::decode_revert_reason(&bytes);
                }
            }
        }
        return payload.message.to_string();
    }
    e.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- decode_revert_reason -----------------------------------------------

    #[test]
    fn decode_empty_data_returns_unknown() {
        assert_eq!(TxSubmitter::decode_revert_reason(&[]), "Unknown revert");
    }

    #[test]
    fn decode_short_data_returns_hex() {
        assert_eq!(TxSubmitter::decode_revert_reason(&[0xAB, 0xCD]), "abcd");
    }

    #[test]
    fn decode_error_string() {
        let msg = b"SafeERC20: low-level call failed";
        let mut data = Vec::with_capacity(68 + msg.len());
        data.extend_from_slice(&ERROR_SELECTOR);
        data.extend_from_slice(&[0u8; 31]);
        data.push(0x20);
        data.extend_from_slice(&[0u8; 31]);
        data.push(msg.len() as u8);
        data.extend_from_slice(msg);

        assert_eq!(
            TxSubmitter::decode_revert_reason(&data),
            "SafeERC20: low-level call failed"
        );
    }

    #[test]
    fn decode_error_string_utf8_lossy() {
        // Non-UTF-8 bytes should be replaced, not panic
        let mut data = Vec::with_capacity(72);
        data.extend_from_slice(&ERROR_SELECTOR);
        data.extend_from_slice(&[0u8; 31]);
        data.push(0x20);
        data.extend_from_slice(&[0u8; 31]);
        data.push(4);
        data.extend_from_slice(&[0xFF, 0xFE, 0x41, 0x42]); // invalid UTF-8 + "AB"

        let result = TxSubmitter::decode_revert_reason(&data);
        assert!(result.contains("AB"));
    }

    #[test]
    fn decode_panic_arithmetic_overflow() {
        let mut data = vec![0u8; 36];
        data[..4].copy_from_slice(&PANIC_SELECTOR);
        data[35] = 0x11;
        assert_eq!(
            TxSubmitter::decode_revert_reason(&data),
            "Panic: arithmetic overflow/underflow"
        );
    }

    #[test]
    fn decode_panic_division_by_zero() {
        let mut data = vec![0u8; 36];
        data[..4].copy_from_slice(&PANIC_SELECTOR);
        data[35] = 0x12;
        assert_eq!(
            TxSubmitter::decode_revert_reason(&data),
            "Panic: division by zero"
        );
    }

    #[test]
    fn decode_unknown_selector_returns_hex() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03, 0x04];
        assert_eq!(
            TxSubmitter::decode_revert_reason(&data),
            "deadbeef01020304"
        );
    }

    // -- simulation_reason --------------------------------------------------

    fn error_resp(data_json: Option<String>) -> alloy::transports::TransportError {
        alloy::transports::RpcError::ErrorResp(alloy::rpc::json_rpc::ErrorPayload {
            code: 3,
            message: "execution reverted".into(),
            data: data_json.map(|d| serde_json::value::RawValue::from_string(d).unwrap()),
        })
    }

    /// Encode `Error(string)` revert data for `msg`.
    fn error_string_data(msg: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(68 + msg.len());
        data.extend_from_slice(&ERROR_SELECTOR);
        data.extend_from_slice(&[0u8; 31]);
        data.push(0x20);
        data.extend_from_slice(&[0u8; 31]);
        data.push(msg.len() as u8);
        data.extend_from_slice(msg);
        data
    }

    #[test]
    fn simulation_reason_decodes_revert_data() {
        let data = error_string_data(b"Too little received");
        let err = error_resp(Some(format!("\"0x{}\"", hex::encode(&data))));
        assert_eq!(simulation_reason(&err), "Too little received");
    }

    #[test]
    fn simulation_reason_decodes_panic_data() {
        let mut data = vec![0u8; 36];
        data[..4].copy_from_slice(&PANIC_SELECTOR);
        data[35] = 0x11;
        let err = error_resp(Some(format!("\"0x{}\"", hex::encode(&data))));
        assert_eq!(
            simulation_reason(&err),
            "Panic: arithmetic overflow/underflow"
        );
    }

    #[test]
    fn simulation_reason_without_data_uses_message() {
        let err = error_resp(None);
        assert_eq!(simulation_reason(&err), "execution reverted");
    }

    #[test]
    fn simulation_reason_with_malformed_data_uses_message() {
        let err = error_resp(Some("\"not hex at all\"".into()));
        assert_eq!(simulation_reason(&err), "execution reverted");
    }
}
