//! Typed parsing of block-explorer responses.
//!
//! Every body goes through `ExplorerResponse` first; nothing downstream reads
//! raw JSON fields.

use alloy_primitives::Address;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;

use super::models::{Balance, BlockNumber, GasPrice, Listing, Transaction, TransferEvent};
use crate::error::GatewayError;
use crate::units::{parse_hex_quantity, parse_wei_decimal};

const SUCCESS_STATUS: &str = "1";

/// Union of the explorer's two envelopes: `{status, message, result}` for
/// account endpoints and `{jsonrpc, id, result | error}` for proxy endpoints.
#[derive(Debug, Deserialize)]
pub struct ExplorerResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ExplorerResponse {
    pub fn from_body(body: &str) -> Result<Self, GatewayError> {
        serde_json::from_str(body)
            .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON body: {e}")))
    }

    pub fn into_block_number(self) -> Result<BlockNumber, GatewayError> {
        let (id, block_number_hex) = self.into_quantity("block number")?;
        Ok(BlockNumber {
            id,
            block_number_hex,
        })
    }

    pub fn into_gas_price(self) -> Result<GasPrice, GatewayError> {
        let (id, gas_price_hex) = self.into_quantity("gas price")?;
        Ok(GasPrice { id, gas_price_hex })
    }

    /// The status flag is not consulted here, only the shape of `result`.
    pub fn into_balance(self) -> Result<Balance, GatewayError> {
        self.check_rate_limit()?;
        let result = self.result_str("balance")?;
        parse_wei_decimal(&result).map_err(|_| {
            GatewayError::MalformedResponse(format!("balance is not a decimal amount: {result}"))
        })?;
        Ok(Balance {
            balance_wei: result,
        })
    }

    /// `status != "1"` is a soft failure, rate-limit messages included: empty
    /// listing plus the explorer's message.
    pub fn into_listing<R, T>(self) -> Result<Listing<T>, GatewayError>
    where
        R: DeserializeOwned,
        T: TryFrom<R, Error = GatewayError>,
    {
        if self.status.as_deref() != Some(SUCCESS_STATUS) {
            let notice = self
                .message
                .clone()
                .or_else(|| self.result.as_ref().and_then(|r| r.as_str().map(String::from)))
                .unwrap_or_else(|| "request was not successful".to_string());
            return Ok(Listing::empty(notice));
        }

        let rows: Vec<R> = match self.result {
            Some(value @ Value::Array(_)) => serde_json::from_value(value).map_err(|e| {
                GatewayError::MalformedResponse(format!("unexpected listing row shape: {e}"))
            })?,
            _ => {
                return Err(GatewayError::MalformedResponse(
                    "listing result is not an array".to_string(),
                ));
            }
        };

        let items = rows
            .into_iter()
            .map(T::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Listing::found(items))
    }

    fn into_quantity(self, what: &str) -> Result<(u64, String), GatewayError> {
        self.check_rate_limit()?;

        if let Some(error) = &self.error {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| error.to_string());
            return Err(GatewayError::MalformedResponse(format!(
                "{what} request returned an error: {message}"
            )));
        }

        let id = match &self.id {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
        .ok_or_else(|| GatewayError::MalformedResponse(format!("{what} response has no id")))?;

        let result = self.result_str(what)?;
        parse_hex_quantity(&result).map_err(|_| {
            GatewayError::MalformedResponse(format!("{what} is not a hex quantity: {result}"))
        })?;

        Ok((id, result))
    }

    fn result_str(&self, what: &str) -> Result<String, GatewayError> {
        self.result
            .as_ref()
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| GatewayError::MalformedResponse(format!("{what} result is not a string")))
    }

    fn check_rate_limit(&self) -> Result<(), GatewayError> {
        let result_text = self.result.as_ref().and_then(Value::as_str);
        for text in [self.message.as_deref(), result_text].into_iter().flatten() {
            if is_rate_limit_message(text) {
                return Err(GatewayError::RateLimited(text.to_string()));
            }
        }
        Ok(())
    }
}

pub fn is_rate_limit_message(text: &str) -> bool {
    text.to_ascii_lowercase().contains("rate limit")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub block_number: String,
    pub time_stamp: String,
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    #[serde(default)]
    pub is_error: String,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = GatewayError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let to = if raw.to.is_empty() {
            None
        } else {
            Some(parse_address("to", &raw.to)?)
        };

        Ok(Transaction {
            block_number: parse_u64("blockNumber", &raw.block_number)?,
            timestamp: parse_u64("timeStamp", &raw.time_stamp)?,
            from: parse_address("from", &raw.from)?,
            to,
            value_wei: parse_wei_decimal(&raw.value).map_err(|_| {
                GatewayError::MalformedResponse(format!("invalid transaction value: {}", raw.value))
            })?,
            is_error: raw.is_error == "1",
            hash: raw.hash,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenTransfer {
    pub block_number: String,
    pub time_stamp: String,
    pub hash: String,
    pub from: String,
    pub to: String,
    pub contract_address: String,
    #[serde(rename = "tokenID")]
    pub token_id: String,
    #[serde(default)]
    pub token_name: String,
    #[serde(default)]
    pub token_symbol: String,
    #[serde(default)]
    pub transaction_index: Option<String>,
}

impl TryFrom<RawTokenTransfer> for TransferEvent {
    type Error = GatewayError;

    fn try_from(raw: RawTokenTransfer) -> Result<Self, Self::Error> {
        if raw.token_id.is_empty() || !raw.token_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(GatewayError::MalformedResponse(format!(
                "invalid tokenID: {}",
                raw.token_id
            )));
        }

        let transaction_index = match raw.transaction_index.as_deref() {
            Some(index) if !index.is_empty() => parse_u64("transactionIndex", index)?,
            _ => 0,
        };

        Ok(TransferEvent {
            token_id: raw.token_id,
            from: parse_address("from", &raw.from)?,
            to: parse_address("to", &raw.to)?,
            contract_address: parse_address("contractAddress", &raw.contract_address)?,
            block_number: parse_u64("blockNumber", &raw.block_number)?,
            transaction_index,
            hash: raw.hash,
            timestamp: parse_u64("timeStamp", &raw.time_stamp)?,
            token_name: raw.token_name,
            token_symbol: raw.token_symbol,
        })
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, GatewayError> {
    Address::from_str(value)
        .map_err(|_| GatewayError::MalformedResponse(format!("invalid {field} address: {value}")))
}

fn parse_u64(field: &str, value: &str) -> Result<u64, GatewayError> {
    value
        .parse()
        .map_err(|_| GatewayError::MalformedResponse(format!("invalid {field}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{U256, address};
    use serde_json::json;

    fn envelope(body: Value) -> ExplorerResponse {
        ExplorerResponse::from_body(&body.to_string()).unwrap()
    }

    #[test]
    fn proxy_block_number_is_typed() {
        let block = envelope(json!({"jsonrpc": "2.0", "id": 83, "result": "0x10d4f"}))
            .into_block_number()
            .unwrap();
        assert_eq!(block.id, 83);
        assert_eq!(block.block_number_hex, "0x10d4f");
    }

    #[test]
    fn proxy_error_object_is_malformed() {
        let err = envelope(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32602, "message": "invalid argument"}
        }))
        .into_gas_price()
        .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(m) if m.contains("invalid argument")));
    }

    #[test]
    fn proxy_rate_limit_is_detected() {
        let err = envelope(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Max calls per sec rate limit reached (5/sec)"
        }))
        .into_gas_price()
        .unwrap_err();
        assert!(matches!(err, GatewayError::RateLimited(_)));
    }

    #[test]
    fn non_hex_quantity_is_malformed() {
        let err = envelope(json!({"jsonrpc": "2.0", "id": 1, "result": "latest"}))
            .into_block_number()
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[test]
    fn missing_id_is_malformed() {
        let err = envelope(json!({"jsonrpc": "2.0", "result": "0x1"}))
            .into_block_number()
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[test]
    fn balance_result_must_be_decimal() {
        let balance = envelope(json!({"status": "1", "message": "OK", "result": "2000000000000000000"}))
            .into_balance()
            .unwrap();
        assert_eq!(balance.balance_wei, "2000000000000000000");

        let err = envelope(json!({"status": "0", "message": "NOTOK", "result": "Error! Invalid address format"}))
            .into_balance()
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = ExplorerResponse::from_body("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[test]
    fn transaction_listing_is_parsed() {
        let listing: Listing<Transaction> = envelope(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "blockNumber": "14923678",
                "timeStamp": "1654646411",
                "hash": "0xabc",
                "from": "0x9AA99C23F67C81701C772B106B4F83F6E858DD2E",
                "to": "",
                "value": "1000000000000000",
                "isError": "0",
                "gas": "21000"
            }]
        }))
        .into_listing::<RawTransaction, Transaction>()
        .unwrap();

        assert_eq!(listing.notice, None);
        let tx = &listing.items[0];
        assert_eq!(tx.block_number, 14923678);
        assert_eq!(tx.from, address!("9aa99c23f67c81701c772b106b4f83f6e858dd2e"));
        assert_eq!(tx.to, None);
        assert_eq!(tx.value_wei, U256::from(1_000_000_000_000_000u64));
        assert!(!tx.is_error);
    }

    #[test]
    fn empty_listing_is_a_soft_failure() {
        let listing: Listing<TransferEvent> = envelope(json!({
            "status": "0",
            "message": "No transactions found",
            "result": []
        }))
        .into_listing::<RawTokenTransfer, TransferEvent>()
        .unwrap();
        assert!(listing.items.is_empty());
        assert_eq!(listing.notice.as_deref(), Some("No transactions found"));
    }

    #[test]
    fn rate_limited_listing_is_a_notice() {
        let listing: Listing<Transaction> = envelope(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Max calls per sec rate limit reached (5/sec)"
        }))
        .into_listing::<RawTransaction, Transaction>()
        .unwrap();
        assert!(listing.items.is_empty());
        assert_eq!(listing.notice.as_deref(), Some("NOTOK"));
    }

    #[test]
    fn token_transfer_rows_are_parsed() {
        let listing: Listing<TransferEvent> = envelope(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "blockNumber": "100",
                "timeStamp": "1700000000",
                "hash": "0xdef",
                "from": "0x0000000000000000000000000000000000000000",
                "to": "0x1111111111111111111111111111111111111111",
                "contractAddress": "0x3263925cb57481af41e397e875e51b58897f953e",
                "tokenID": "7",
                "tokenName": "DashboardNFT",
                "tokenSymbol": "DNFT",
                "tokenDecimal": "0",
                "transactionIndex": "3"
            }]
        }))
        .into_listing::<RawTokenTransfer, TransferEvent>()
        .unwrap();

        let event = &listing.items[0];
        assert_eq!(event.token_id, "7");
        assert_eq!(event.from, Address::ZERO);
        assert_eq!(event.block_order().transaction_index, 3);
        assert_eq!(event.token_symbol, "DNFT");
    }

    #[test]
    fn bad_row_fails_the_whole_listing() {
        let err = envelope(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "blockNumber": "100",
                "timeStamp": "1700000000",
                "hash": "0xdef",
                "from": "not-an-address",
                "to": "0x1111111111111111111111111111111111111111",
                "contractAddress": "0x3263925cb57481af41e397e875e51b58897f953e",
                "tokenID": "7"
            }]
        }))
        .into_listing::<RawTokenTransfer, TransferEvent>()
        .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }
}
