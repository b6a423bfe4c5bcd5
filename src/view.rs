//! Text view model of the page. Rendering never mutates state.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::config::{CatalogConfig, Config};
use crate::state::{ActionKey, InFlight, UiState};

pub const EMPTY_MESSAGE: &str = "No NFTs on this page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub token_id: String,
    pub name: String,
    pub image: String,
    pub price_label: String,
    /// What is typed into the card's price box
    pub price_input: String,
    pub listing: bool,
    pub buying: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Short address when connected; the connect button shows otherwise
    pub address: Option<String>,
    pub notice: Option<String>,
    pub cards: Vec<CardView>,
    pub empty_message: Option<&'static str>,
    pub loading: bool,
}

impl View {
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

/// A positive price, or nothing.
pub fn parse_price(price: &str) -> Option<Decimal> {
    Decimal::from_str(price.trim())
        .ok()
        .filter(|p| *p > Decimal::ZERO)
}

/// "0.5 APE" for a positive price, "-" otherwise.
pub fn price_label(price: Option<&str>, symbol: &str) -> String {
    match price.and_then(parse_price) {
        Some(p) => format!("{} {}", p.normalize(), symbol),
        None => "-".to_string(),
    }
}

/// Browser-loadable image URL for a card.
pub fn resolve_image(image: Option<&str>, catalog: &CatalogConfig) -> String {
    let image = image.map(str::trim).unwrap_or_default();
    if let Some(path) = image.strip_prefix("ipfs://") {
        let path = path.strip_prefix("ipfs/").unwrap_or(path);
        if !path.is_empty() {
            return format!("{}{}", catalog.ipfs_gateway, path);
        }
    }
    if image.starts_with("https://") || image.starts_with("http://") || image.starts_with("data:") {
        return image.to_string();
    }
    catalog.placeholder_image.clone()
}

pub fn render(state: &UiState, config: &Config, in_flight: &InFlight) -> View {
    let symbol = &config.chain.currency_symbol;
    let connected = state.session.as_ref();

    let cards = if connected.is_some() {
        state
            .catalog
            .rendered()
            .iter()
            .map(|entry| {
                let id = &entry.token_id;
                let price = state
                    .price_overrides
                    .get(id)
                    .map(String::as_str)
                    .or(entry.price.as_deref());
                CardView {
                    token_id: id.clone(),
                    name: entry
                        .name
                        .clone()
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| format!("{} #{}", config.catalog.collection_name, id)),
                    image: resolve_image(entry.image.as_deref(), &config.catalog),
                    price_label: price_label(price, symbol),
                    price_input: state.price_inputs.get(id).cloned().unwrap_or_default(),
                    listing: in_flight.is_busy(&ActionKey::List(id.clone())),
                    buying: in_flight.is_busy(&ActionKey::Buy(id.clone())),
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    View {
        address: connected.map(|s| s.short_address()),
        notice: state.notice.as_ref().map(|n| n.text.clone()),
        cards,
        empty_message: (connected.is_some() && state.catalog.show_empty()).then_some(EMPTY_MESSAGE),
        loading: in_flight.is_busy(&ActionKey::Catalog),
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Some(address) => writeln!(f, "[{}]  (disconnect)", address)?,
            None => writeln!(f, "(connect wallet)")?,
        }
        if let Some(notice) = &self.notice {
            writeln!(f, "> {}", notice)?;
        }
        for card in &self.cards {
            write!(f, "  #{:<6} {:<20} {:>12}", card.token_id, card.name, card.price_label)?;
            if !card.price_input.is_empty() {
                write!(f, "  [{}]", card.price_input)?;
            }
            if card.listing {
                write!(f, "  listing...")?;
            }
            if card.buying {
                write!(f, "  buying...")?;
            }
            writeln!(f)?;
        }
        if let Some(message) = self.empty_message {
            writeln!(f, "  {}", message)?;
        }
        if self.loading {
            writeln!(f, "  loading...")?;
        }
        Ok(())
    }
}
