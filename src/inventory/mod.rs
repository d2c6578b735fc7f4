// inventorytool/src/inventory/mod.rs
pub mod mapper;

use std::collections::HashMap;

/// One CSV data row, keyed by column label.
pub type CsvRow = HashMap<String, String>;

/// A single catalog line item as stored in the `"Inventory"` table.
///
/// Most fields are kept as text because that is how the CSV carries them;
/// prices, costs and the boolean-like flags are never interpreted here.
/// `item_uuid` and `sku` are assigned by LightSpeed, so new items leave them
/// as `None` to stay clear of the unique constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub item_uuid: Option<String>,
    pub item_name: String,
    pub sku: Option<String>,
    pub option_name: String,
    pub option_value: String,
    pub discountable: String,
    pub upc: String,
    pub taxable: String,
    pub department: String,
    pub category: String,
    pub supplier: String,
    pub supplier_code: String,
    /// "open" or "system"
    pub price_type: String,
    pub track_inventory: String,
    /// "active" or "inactive"
    pub register_status: String,
    pub price: String,
    /// Quantity as read on import. Generally an integer but may be empty.
    pub original_qty: String,
    /// The quantity other processes adjust between import and export.
    pub updated_qty: i32,
    pub cost: String,
}

impl InventoryRecord {
    /// Short human-readable identification used in error messages.
    pub fn describe(&self) -> String {
        let mut out = format!("'{}'", self.item_name);
        if !self.option_value.is_empty() {
            out.push_str(&format!(" ({})", self.option_value));
        }
        if let Some(sku) = &self.sku {
            out.push_str(&format!(" SKU {}", sku));
        }
        if let Some(uuid) = &self.item_uuid {
            out.push_str(&format!(" UUID {}", uuid));
        }
        out
    }
}
