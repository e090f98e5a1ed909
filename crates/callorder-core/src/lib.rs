pub mod catalog;
pub mod config;
pub mod error;
pub mod matcher;
pub mod order;

pub use catalog::{Catalog, CatalogDirectory, MenuItem, MenuOption, OptionChoice};
pub use config::CallOrderConfig;
pub use error::{CallOrderError, Result};
pub use matcher::{ItemMatcher, MatchCandidate, MatchRequest};
pub use order::{
    FinalizedOrder, InMemoryOrderStore, OrderLine, OrderRecordItem, OrderRecordOption,
    OrderStatus, OrderStore, SelectedOption,
};
