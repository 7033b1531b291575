// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! Display utilities for consistent CLI output formatting

use alloy::primitives::{utils::format_ether, Address, B256, U256};
use colored::Colorize;
use functions_client::{FulfillmentCode, FulfillmentRecord, ReturnType};
use std::fmt::Display;

/// Standard display formatter for CLI output
pub struct DisplayManager {
    /// Optional DON id to display in headers
    don_id: Option<String>,
}

impl DisplayManager {
    /// Create a new display manager
    pub fn new() -> Self {
        Self { don_id: None }
    }

    /// Create a display manager with DON context
    pub fn with_don(don_id: impl Into<String>) -> Self {
        Self { don_id: Some(don_id.into()) }
    }

    /// Print a section header with optional DON badge
    pub fn header(&self, title: &str) {
        match &self.don_id {
            Some(don_id) => println!("\n{} [{}]", title.bold(), don_id.blue().bold()),
            None => println!("\n{}", title.bold()),
        }
    }

    /// Print a labeled value with standard indentation
    pub fn item(&self, label: &str, value: impl Display) {
        println!("  {:<16} {}", format!("{}:", label), value);
    }

    /// Print a labeled value with custom color
    pub fn item_colored(&self, label: &str, value: impl Display, color: &str) {
        let colored_value = match color {
            "green" => value.to_string().green().to_string(),
            "cyan" => value.to_string().cyan().to_string(),
            "yellow" => value.to_string().yellow().to_string(),
            "red" => value.to_string().red().to_string(),
            "dimmed" => value.to_string().dimmed().to_string(),
            _ => value.to_string(),
        };
        println!("  {:<16} {}", format!("{}:", label), colored_value);
    }

    /// Print an address with standard formatting
    pub fn address(&self, label: &str, address: Address) {
        self.item_colored(label, format!("{:#x}", address), "dimmed");
    }

    /// Print a transaction hash, with an explorer link when one is available
    pub fn tx_hash(&self, hash: B256, explorer_url: Option<String>) {
        self.item_colored("Transaction", format!("{:#x}", hash), "cyan");
        if let Some(url) = explorer_url {
            self.item_colored("Explorer", url, "dimmed");
        }
    }

    /// Print a LINK amount given in Juels
    pub fn link(&self, label: &str, juels: U256) {
        let amount = format_link(juels);
        println!("  {:<16} {} {}", format!("{}:", label), amount.cyan().bold(), "LINK".cyan());
    }

    /// Print the outcome of a fulfillment
    pub fn fulfillment(&self, record: &FulfillmentRecord, return_type: ReturnType) {
        for (label, value, color) in fulfillment_items(record, return_type) {
            self.item_colored(label, value, color);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("\n{} {}", "✓".green().bold(), message.green().bold());
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        println!("\n{} {}", "⚠".yellow(), message.yellow());
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("\n{} {}", "ℹ".blue(), message);
    }

    /// Print a note or additional info
    pub fn note(&self, message: &str) {
        println!("  {}", message.dimmed());
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Format an amount for display (removes trailing zeros)
pub fn format_amount(amount: &str) -> String {
    if !amount.contains('.') {
        return amount.to_string();
    }
    amount.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a LINK amount from Juels
pub fn format_link(juels: U256) -> String {
    format_amount(&format_ether(juels))
}

/// Labeled values describing a fulfillment, with the color each is shown in
pub fn fulfillment_items(
    record: &FulfillmentRecord,
    return_type: ReturnType,
) -> Vec<(&'static str, String, &'static str)> {
    let status_color = match record.code {
        FulfillmentCode::Fulfilled => "green",
        FulfillmentCode::UserCallbackError => "yellow",
        _ => "red",
    };
    let mut items = vec![
        ("Request ID", format!("{:#x}", record.request_id), "dimmed"),
        ("Status", record.code.to_string(), status_color),
        ("Total Cost", format!("{} LINK", format_link(record.total_cost_juels)), "cyan"),
    ];
    if let Some(error) = &record.error {
        items.push(("Error", error.clone(), "red"));
    }
    items.push(match record.decoded_response(return_type) {
        Ok(Some(value)) => ("Response", value.to_string(), "green"),
        Ok(None) => ("Response", "(empty)".to_string(), "dimmed"),
        Err(err) => ("Response", err.to_string(), "red"),
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("1.500000"), "1.5");
        assert_eq!(format_amount("0.100000"), "0.1");
        assert_eq!(format_amount("10.000000"), "10");
        assert_eq!(format_amount("100"), "100");
    }

    #[test]
    fn test_fulfillment_items_list_each_field_once() {
        let record = FulfillmentRecord {
            tx_hash: B256::repeat_byte(1),
            request_id: B256::repeat_byte(0x42),
            code: FulfillmentCode::UserCallbackError,
            total_cost_juels: U256::from(180_000_000_000_000_000u64),
            error: Some("callback reverted".into()),
            response: None,
        };
        let items = fulfillment_items(&record, ReturnType::Uint256);
        let labels: Vec<&str> = items.iter().map(|(label, _, _)| *label).collect();

        assert_eq!(labels, ["Request ID", "Status", "Total Cost", "Error", "Response"]);
        assert_eq!(items[1].1, "USER_CALLBACK_ERROR");
        assert_eq!(items[2].1, "0.18 LINK");
        assert_eq!(items[4].1, "(empty)");
    }

    #[test]
    fn test_format_link() {
        let juels = U256::from(200_000_000_000_000_000u64); // 0.2 LINK
        assert_eq!(format_link(juels), "0.2");
        assert_eq!(format_link(U256::ZERO), "0");
    }
}
