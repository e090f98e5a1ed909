//! Cart arithmetic and the finalized order record.

use chrono::Utc;
use uuid::Uuid;

use callorder_core::catalog::Catalog;
use callorder_core::order::{FinalizedOrder, OrderLine, OrderRecordItem, OrderStatus};

use crate::session::CallSession;

/// Sum of every line's derived total.
pub fn order_total(cart: &[OrderLine]) -> f64 {
    cart.iter().map(OrderLine::total).sum()
}

/// Comma-joined line descriptions, e.g. "Dumplings with Steamed, Malt Rice Tea".
pub fn summary_text(cart: &[OrderLine]) -> String {
    cart.iter()
        .map(OrderLine::describe)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `ORD-{YYYYmmdd_HHMMSS}-{8 hex}`; the suffix keeps ids unique within a second.
pub fn new_order_id() -> String {
    let ts = Utc::now().format("%Y%m%d_%H%M%S");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ORD-{}-{}", ts, &suffix[..8])
}

/// Freeze the session's cart into a confirmed order record.
pub fn finalize(session: &CallSession, catalog: &Catalog) -> FinalizedOrder {
    FinalizedOrder {
        order_id: new_order_id(),
        call_id: session.call_id.clone(),
        timestamp: Utc::now(),
        restaurant_name: catalog.name.clone(),
        items: session.current_order.iter().map(OrderRecordItem::from).collect(),
        total_price: order_total(&session.current_order),
        status: OrderStatus::Confirmed,
    }
}
