//! The GargShop catalog: everything purchasable with unclaimed GARG.

use std::time::Duration;

/// Effect applied when a shop item is bought.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ItemEffect {
    /// Timed accrual-rate multiplier.
    Boost { multiplier: f64, duration: Duration },

    /// One-time unlock (fusion tokens, cosmetics). Repeat purchases are
    /// tallied per item, not rejected.
    Collectible,
}

/// A purchasable shop entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub price: f64,
    pub effect: ItemEffect,
}

pub const CATALOG: [ShopItem; 3] = [
    ShopItem {
        id: "boost",
        name: "2x Mining Boost (24h)",
        price: 50.0,
        effect: ItemEffect::Boost {
            multiplier: 2.0,
            duration: Duration::from_secs(24 * 60 * 60),
        },
    },
    ShopItem {
        id: "flair",
        name: "Fusion Token",
        price: 300.0,
        effect: ItemEffect::Collectible,
    },
    ShopItem {
        id: "raffle",
        name: "Mystery Garg Box",
        price: 100.0,
        effect: ItemEffect::Collectible,
    },
];

/// Look up a catalog item by id.
pub fn find(id: &str) -> Option<&'static ShopItem> {
    CATALOG.iter().find(|item| item.id == id)
}
