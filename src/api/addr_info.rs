use alloy_primitives::Address;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use std::str::FromStr;
use tracing::error;

use super::AppState;
use crate::aggregator::AddrInfo;

#[derive(Debug, Serialize)]
pub struct AddrInfoResponse {
    pub message: String,
    pub address: String,
    pub block: BlockBody,
    pub gas_price: GasPriceBody,
    pub address_balance: AddressBalanceBody,
}

#[derive(Debug, Serialize)]
pub struct BlockBody {
    pub id: u64,
    /// Hex, as returned by the explorer.
    pub block_number: String,
}

#[derive(Debug, Serialize)]
pub struct GasPriceBody {
    pub id: u64,
    pub gas_price_in_hex: String,
    pub gas_price_in_gwei: f64,
}

#[derive(Debug, Serialize)]
pub struct AddressBalanceBody {
    pub balance_in_wei: String,
    pub balance_in_eth: f64,
    pub balance_in_eth_exact: String,
}

impl From<AddrInfo> for AddrInfoResponse {
    fn from(info: AddrInfo) -> Self {
        AddrInfoResponse {
            message: "success".to_string(),
            address: format!("{:?}", info.address),
            block: BlockBody {
                id: info.block.id,
                block_number: info.block.block_number_hex,
            },
            gas_price: GasPriceBody {
                id: info.gas_price.id,
                gas_price_in_hex: info.gas_price.gas_price_hex,
                gas_price_in_gwei: info.gas_price.gas_price_gwei,
            },
            address_balance: AddressBalanceBody {
                balance_in_wei: info.balance.balance_wei,
                balance_in_eth: info.balance.balance_eth.display,
                balance_in_eth_exact: info.balance.balance_eth.exact,
            },
        }
    }
}

/// Any failure is a 500 with a single `error` string.
#[derive(Debug)]
pub struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("error at : {}", self.0) })),
        )
            .into_response()
    }
}

pub async fn get_addr_info(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AddrInfoResponse>, ApiError> {
    let parsed = Address::from_str(address.trim())
        .map_err(|_| ApiError(format!("invalid address {address}")))?;

    let info = state.addr_info.get_addr_info(parsed).await.map_err(|e| {
        error!("addrInfo request for {} failed: {}", address, e);
        ApiError(e.to_string())
    })?;

    Ok(Json(info.into()))
}
