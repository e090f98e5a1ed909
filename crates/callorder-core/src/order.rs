//! Cart lines, finalized orders and the persistence seam.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::MenuItem;
use crate::error::{CallOrderError, Result};

/// Snapshot of one option decision, decoupled from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub option_name: String,
    pub choice_name: String,
    pub price_extra: f64,
}

/// A committed cart entry. Its total is always derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item: MenuItem,
    pub selected_options: Vec<SelectedOption>,
}

impl OrderLine {
    pub fn new(item: MenuItem, selected_options: Vec<SelectedOption>) -> Self {
        Self {
            item,
            selected_options,
        }
    }

    /// Item price plus every selected extra.
    pub fn total(&self) -> f64 {
        self.item.price
            + self
                .selected_options
                .iter()
                .map(|o| o.price_extra)
                .sum::<f64>()
    }

    /// "{name}" or "{name} with {choice}, {choice}".
    pub fn describe(&self) -> String {
        if self.selected_options.is_empty() {
            self.item.name.clone()
        } else {
            let choices: Vec<&str> = self
                .selected_options
                .iter()
                .map(|o| o.choice_name.as_str())
                .collect();
            format!("{} with {}", self.item.name, choices.join(", "))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Confirmed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Confirmed => write!(f, "CONFIRMED"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

/// Persisted option entry: `{ name, choice, extra }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecordOption {
    pub name: String,
    pub choice: String,
    pub extra: f64,
}

/// Persisted line entry with its total frozen at finalization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecordItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub options: Vec<OrderRecordOption>,
    pub total: f64,
}

impl From<&OrderLine> for OrderRecordItem {
    fn from(line: &OrderLine) -> Self {
        Self {
            id: line.item.id.clone(),
            name: line.item.name.clone(),
            price: line.item.price,
            options: line
                .selected_options
                .iter()
                .map(|o| OrderRecordOption {
                    name: o.option_name.clone(),
                    choice: o.choice_name.clone(),
                    extra: o.price_extra,
                })
                .collect(),
            total: line.total(),
        }
    }
}

/// The durable record of a confirmed call. One per order, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedOrder {
    pub order_id: String,
    pub call_id: String,
    pub timestamp: DateTime<Utc>,
    pub restaurant_name: String,
    pub items: Vec<OrderRecordItem>,
    pub total_price: f64,
    pub status: OrderStatus,
}

/// Durable sink for finalized orders.
pub trait OrderStore: Send + Sync {
    /// Record one finalized order.
    fn save(&self, order: &FinalizedOrder) -> Result<()>;
}

/// Order store that keeps everything in memory (tests and dry runs).
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<Vec<FinalizedOrder>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every order saved so far, oldest first.
    pub fn orders(&self) -> Vec<FinalizedOrder> {
        self.orders.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn save(&self, order: &FinalizedOrder) -> Result<()> {
        let mut orders = self
            .orders
            .lock()
            .map_err(|e| CallOrderError::Storage(format!("Order list lock poisoned: {}", e)))?;
        orders.push(order.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dumplings() -> MenuItem {
        MenuItem {
            id: "10".to_string(),
            name: "Dumplings".to_string(),
            price: 9.5,
            category: "Appetizers".to_string(),
            description: String::new(),
            options: vec![],
        }
    }

    fn pan_fried() -> SelectedOption {
        SelectedOption {
            option_name: "Cooking Style".to_string(),
            choice_name: "Pan-fried".to_string(),
            price_extra: 1.0,
        }
    }

    #[test]
    fn test_line_total_without_options() {
        let line = OrderLine::new(dumplings(), vec![]);
        assert!((line.total() - 9.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_line_total_adds_extras() {
        let mut extra = pan_fried();
        extra.price_extra = 0.75;
        let line = OrderLine::new(dumplings(), vec![pan_fried(), extra]);
        assert!((line.total() - 11.25).abs() < 1e-9);
    }

    #[test]
    fn test_describe() {
        assert_eq!(OrderLine::new(dumplings(), vec![]).describe(), "Dumplings");

        let mut spicy = pan_fried();
        spicy.choice_name = "Spicy".to_string();
        let line = OrderLine::new(dumplings(), vec![pan_fried(), spicy]);
        assert_eq!(line.describe(), "Dumplings with Pan-fried, Spicy");
    }

    #[test]
    fn test_record_item_from_line() {
        let line = OrderLine::new(dumplings(), vec![pan_fried()]);
        let record = OrderRecordItem::from(&line);
        assert_eq!(record.id, "10");
        assert_eq!(record.options.len(), 1);
        assert_eq!(record.options[0].name, "Cooking Style");
        assert_eq!(record.options[0].choice, "Pan-fried");
        assert!((record.total - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_order_status_serializes_uppercase() {
        let json = serde_json::to_string(&OrderStatus::Confirmed).unwrap();
        assert_eq!(json, "\"CONFIRMED\"");
        assert_eq!("CONFIRMED".parse::<OrderStatus>().unwrap(), OrderStatus::Confirmed);
        assert!("PENDING".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_finalized_order_json_shape() {
        let order = FinalizedOrder {
            order_id: "ORD-20260101_120000-abcd1234".to_string(),
            call_id: "CA123".to_string(),
            timestamp: Utc::now(),
            restaurant_name: "Lanzhou Hand Pulled Noodles".to_string(),
            items: vec![OrderRecordItem::from(&OrderLine::new(
                dumplings(),
                vec![pan_fried()],
            ))],
            total_price: 10.5,
            status: OrderStatus::Confirmed,
        };

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["status"], "CONFIRMED");
        assert_eq!(value["call_id"], "CA123");
        assert_eq!(value["items"][0]["options"][0]["choice"], "Pan-fried");
        assert_eq!(value["items"][0]["options"][0]["extra"], 1.0);
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_in_memory_store_records_orders() {
        let store = InMemoryOrderStore::new();
        let order = FinalizedOrder {
            order_id: "ORD-1".to_string(),
            call_id: "CA1".to_string(),
            timestamp: Utc::now(),
            restaurant_name: "Wok & Roll".to_string(),
            items: vec![],
            total_price: 0.0,
            status: OrderStatus::Confirmed,
        };
        store.save(&order).unwrap();
        store.save(&order).unwrap();
        assert_eq!(store.orders().len(), 2);
    }
}
