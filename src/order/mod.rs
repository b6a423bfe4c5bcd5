mod json;
mod stored;
mod types;

pub use json::{normalize_json, parse_u256, to_json_safe, u256_dec, value_to_u256};
pub use stored::extract_order;
pub use types::{
    ConsiderationItem, CreateOrderInput, ItemType, OfferItem, Order, OrderParameters, OrderType,
};
