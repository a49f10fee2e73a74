use crate::aggregator::AddrInfo;
use crate::gateway::{Transaction, TransferEvent};
use crate::repository::BalanceRecord;
use crate::units::wei_to_eth;
use comfy_table::{Cell, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use csv::Writer;
use serde_json::json;

#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Table,
        }
    }
}

pub fn format_addr_info(info: &AddrInfo, format: &OutputFormat) -> String {
    let rows = [
        ("Address", format!("{:?}", info.address)),
        ("Block Number", info.block.block_number.to_string()),
        ("Block Number (Hex)", info.block.block_number_hex.clone()),
        ("Gas Price (Gwei)", info.gas_price.gas_price_gwei.to_string()),
        ("Gas Price (Hex)", info.gas_price.gas_price_hex.clone()),
        ("Balance (ETH)", info.balance.balance_eth.exact.clone()),
        ("Balance (Wei)", info.balance.balance_wei.clone()),
    ];

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec!["Metric", "Value"]);
            for (metric, value) in rows {
                table.add_row(vec![Cell::new(metric), Cell::new(value)]);
            }
            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "address": format!("{:?}", info.address),
            "block_number": info.block.block_number,
            "block_number_hex": info.block.block_number_hex,
            "gas_price_gwei": info.gas_price.gas_price_gwei,
            "gas_price_hex": info.gas_price.gas_price_hex,
            "balance_eth": info.balance.balance_eth.exact,
            "balance_wei": info.balance.balance_wei,
        }))
        .unwrap_or_else(|_| "{}".to_string()),
        OutputFormat::Csv => {
            let mut wtr = Writer::from_writer(vec![]);
            let _ = wtr.write_record(["metric", "value"]);
            for (metric, value) in rows {
                let _ = wtr.write_record([metric, value.as_str()]);
            }
            String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
        }
    }
}

pub fn format_transactions(transactions: &[Transaction], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_transactions_table(transactions),
        OutputFormat::Json => format_transactions_json(transactions),
        OutputFormat::Csv => format_transactions_csv(transactions),
    }
}

fn format_transactions_table(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Block", "Hash", "From", "To", "Value (ETH)"]);

    for tx in transactions {
        table.add_row(vec![
            Cell::new(tx.block_number),
            Cell::new(format_tx_hash(&tx.hash)),
            Cell::new(format!("{:#}", tx.from)),
            Cell::new(format_recipient(tx)),
            Cell::new(wei_to_eth(tx.value_wei).exact),
        ]);
    }

    table.to_string()
}

fn format_transactions_json(transactions: &[Transaction]) -> String {
    let json_transactions: Vec<_> = transactions
        .iter()
        .map(|tx| {
            json!({
                "block_number": tx.block_number,
                "timestamp": tx.timestamp,
                "hash": tx.hash,
                "from": format!("{:?}", tx.from),
                "to": tx.to.map(|to| format!("{to:?}")),
                "value": wei_to_eth(tx.value_wei).exact,
                "value_wei": tx.value_wei.to_string(),
                "is_error": tx.is_error,
            })
        })
        .collect();

    serde_json::to_string_pretty(&json_transactions).unwrap_or_else(|_| "[]".to_string())
}

fn format_transactions_csv(transactions: &[Transaction]) -> String {
    let mut wtr = Writer::from_writer(vec![]);

    let _ = wtr.write_record(["block_number", "hash", "from", "to", "value", "value_wei"]);

    for tx in transactions {
        let _ = wtr.write_record([
            &tx.block_number.to_string(),
            &tx.hash,
            &format!("{:?}", tx.from),
            &tx.to.map(|to| format!("{to:?}")).unwrap_or_default(),
            &wei_to_eth(tx.value_wei).exact,
            &tx.value_wei.to_string(),
        ]);
    }

    String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
}

pub fn format_owned_tokens(tokens: &[TransferEvent], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            if tokens.is_empty() {
                return "No minted tokens found.".to_string();
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec!["Token ID", "Name", "Symbol", "Contract", "Received In"]);

            for token in tokens {
                table.add_row(vec![
                    Cell::new(&token.token_id),
                    Cell::new(&token.token_name),
                    Cell::new(&token.token_symbol),
                    Cell::new(format!("{:#}", token.contract_address)),
                    Cell::new(token.block_number),
                ]);
            }

            table.to_string()
        }
        OutputFormat::Json => {
            let json_tokens: Vec<_> = tokens
                .iter()
                .map(|token| {
                    json!({
                        "token_id": token.token_id,
                        "token_name": token.token_name,
                        "token_symbol": token.token_symbol,
                        "contract_address": format!("{:?}", token.contract_address),
                        "to": format!("{:?}", token.to),
                        "block_number": token.block_number,
                        "hash": token.hash,
                    })
                })
                .collect();
            serde_json::to_string_pretty(&json_tokens).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Csv => {
            let mut wtr = Writer::from_writer(vec![]);
            let _ = wtr.write_record([
                "token_id",
                "token_name",
                "token_symbol",
                "contract_address",
                "block_number",
                "hash",
            ]);
            for token in tokens {
                let _ = wtr.write_record([
                    &token.token_id,
                    &token.token_name,
                    &token.token_symbol,
                    &format!("{:?}", token.contract_address),
                    &token.block_number.to_string(),
                    &token.hash,
                ]);
            }
            String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
        }
    }
}

pub fn format_cached_balance(record: Option<&BalanceRecord>, format: &OutputFormat) -> String {
    let Some(record) = record else {
        return match format {
            OutputFormat::Json => "null".to_string(),
            _ => "No cached balance.".to_string(),
        };
    };

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec!["Address", "Balance (ETH)", "Balance (Wei)"]);
            table.add_row(vec![
                Cell::new(format!("{:#}", record.address)),
                Cell::new(record.balance_eth),
                Cell::new(&record.balance_wei),
            ]);
            table.to_string()
        }
        OutputFormat::Json => json!({
            "address": format!("{:?}", record.address),
            "balance_eth": record.balance_eth,
            "balance_wei": record.balance_wei,
        })
        .to_string(),
        OutputFormat::Csv => {
            let mut wtr = Writer::from_writer(vec![]);
            let _ = wtr.write_record(["address", "balance_eth", "balance_wei"]);
            let _ = wtr.write_record([
                &format!("{:?}", record.address),
                &record.balance_eth.to_string(),
                &record.balance_wei,
            ]);
            String::from_utf8(wtr.into_inner().unwrap_or_default()).unwrap_or_default()
        }
    }
}

fn format_recipient(tx: &Transaction) -> String {
    match tx.to {
        Some(to) => format!("{to:#}"),
        None => "(contract creation)".to_string(),
    }
}

fn format_tx_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() <= 12 {
        return hash.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
