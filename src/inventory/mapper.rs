// inventorytool/src/inventory/mapper.rs
use super::{CsvRow, InventoryRecord};

/// The fixed CSV schema. Import and export both go through this table so the
/// exported file can be fed straight back into an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ItemUuid,
    Name,
    Sku,
    OptionName,
    OptionValue,
    Discountable,
    Upc,
    Taxable,
    Department,
    Category,
    Supplier,
    SupplierCode,
    PriceType,
    TrackInventory,
    RegisterStatus,
    Price,
    Quantity,
    Cost,
}

impl Column {
    /// Columns in file order.
    pub const ALL: [Column; 18] = [
        Column::ItemUuid,
        Column::Name,
        Column::Sku,
        Column::OptionName,
        Column::OptionValue,
        Column::Discountable,
        Column::Upc,
        Column::Taxable,
        Column::Department,
        Column::Category,
        Column::Supplier,
        Column::SupplierCode,
        Column::PriceType,
        Column::TrackInventory,
        Column::RegisterStatus,
        Column::Price,
        Column::Quantity,
        Column::Cost,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Column::ItemUuid => "Item UUID",
            Column::Name => "Name",
            Column::Sku => "SKU (Do Not Edit)",
            Column::OptionName => "Option1 Name (Do Not Edit)",
            Column::OptionValue => "Option1 Value (Do Not Edit)",
            Column::Discountable => "Discountable",
            Column::Upc => "UPC",
            Column::Taxable => "Taxable",
            Column::Department => "Department",
            Column::Category => "Category",
            Column::Supplier => "Supplier",
            Column::SupplierCode => "Supplier Code",
            Column::PriceType => "Price Type",
            Column::TrackInventory => "Track Inventory",
            Column::RegisterStatus => "Register Status",
            Column::Price => "Price",
            Column::Quantity => "Quantity",
            Column::Cost => "Cost",
        }
    }

    /// Value stored when the cell is absent or empty. Item UUID and SKU are
    /// nullable and map to `None` instead.
    pub const fn default_value(self) -> &'static str {
        match self {
            Column::Discountable | Column::Taxable | Column::TrackInventory => "true",
            Column::Department | Column::Category => "general",
            Column::PriceType => "system",
            Column::RegisterStatus => "active",
            Column::Price => "0",
            _ => "",
        }
    }

    pub fn from_label(label: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|column| column.label() == label)
    }
}

/// Header row for export, identical to what import expects.
pub fn header_row() -> Vec<&'static str> {
    Column::ALL.iter().map(|column| column.label()).collect()
}

fn cell(row: &CsvRow, column: Column) -> Option<&str> {
    row.get(column.label())
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn text(row: &CsvRow, column: Column) -> String {
    cell(row, column).unwrap_or(column.default_value()).to_string()
}

/// Builds a record from a decoded CSV row. Never fails: anything missing
/// takes the column default and every other value is stored verbatim.
pub fn to_record(row: &CsvRow) -> InventoryRecord {
    InventoryRecord {
        item_uuid: cell(row, Column::ItemUuid).map(str::to_string),
        item_name: text(row, Column::Name),
        sku: cell(row, Column::Sku).map(str::to_string),
        option_name: text(row, Column::OptionName),
        option_value: text(row, Column::OptionValue),
        discountable: text(row, Column::Discountable),
        upc: text(row, Column::Upc),
        taxable: text(row, Column::Taxable),
        department: text(row, Column::Department),
        category: text(row, Column::Category),
        supplier: text(row, Column::Supplier),
        supplier_code: text(row, Column::SupplierCode),
        price_type: text(row, Column::PriceType),
        track_inventory: text(row, Column::TrackInventory),
        register_status: text(row, Column::RegisterStatus),
        price: text(row, Column::Price),
        original_qty: text(row, Column::Quantity),
        updated_qty: 0,
        cost: text(row, Column::Cost),
    }
}

/// Export-side value for one column. `original_qty` is never written out;
/// the Quantity column carries `updated_qty`.
pub fn export_value(record: &InventoryRecord, column: Column) -> String {
    match column {
        Column::ItemUuid => record.item_uuid.clone().unwrap_or_default(),
        Column::Name => record.item_name.clone(),
        Column::Sku => record.sku.clone().unwrap_or_default(),
        Column::OptionName => record.option_name.clone(),
        Column::OptionValue => record.option_value.clone(),
        Column::Discountable => record.discountable.clone(),
        Column::Upc => record.upc.clone(),
        Column::Taxable => record.taxable.clone(),
        Column::Department => record.department.clone(),
        Column::Category => record.category.clone(),
        Column::Supplier => record.supplier.clone(),
        Column::SupplierCode => record.supplier_code.clone(),
        Column::PriceType => record.price_type.clone(),
        Column::TrackInventory => record.track_inventory.clone(),
        Column::RegisterStatus => record.register_status.clone(),
        Column::Price => record.price.clone(),
        Column::Quantity => record.updated_qty.to_string(),
        Column::Cost => record.cost.clone(),
    }
}

pub fn to_row(record: &InventoryRecord) -> CsvRow {
    Column::ALL
        .into_iter()
        .map(|column| (column.label().to_string(), export_value(record, column)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::fixtures::record;

    fn row(cells: &[(&str, &str)]) -> CsvRow {
        cells
            .iter()
            .map(|(label, value)| (label.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_labels_are_unique_and_resolve_back() {
        for column in Column::ALL {
            assert_eq!(Column::from_label(column.label()), Some(column));
        }
        assert_eq!(Column::from_label("Quantity "), None);
        assert_eq!(header_row().len(), 18);
        assert_eq!(header_row()[2], "SKU (Do Not Edit)");
    }

    #[test]
    fn test_empty_cells_take_defaults() {
        let input = row(&[
            ("Name", "Mug"),
            ("Discountable", ""),
            ("Taxable", ""),
            ("Department", ""),
        ]);
        let record = to_record(&input);

        assert_eq!(record.discountable, "true");
        assert_eq!(record.taxable, "true");
        assert_eq!(record.department, "general");
        assert_eq!(record.category, "general");
        assert_eq!(record.track_inventory, "true");
        assert_eq!(record.price_type, "system");
        assert_eq!(record.register_status, "active");
        assert_eq!(record.price, "0");
        assert_eq!(record.cost, "");
        assert_eq!(record.original_qty, "");
        assert_eq!(record.updated_qty, 0);
        assert_eq!(record.item_uuid, None);
        assert_eq!(record.sku, None);
    }

    #[test]
    fn test_values_are_stored_verbatim() {
        let input = row(&[
            ("Item UUID", "0a1b-22"),
            ("Name", "Tee"),
            ("SKU (Do Not Edit)", "210044"),
            ("Taxable", "maybe"),
            ("Price Type", "haggle"),
            ("Quantity", "twelve"),
            ("Price", "$1,299.00"),
        ]);
        let record = to_record(&input);

        assert_eq!(record.item_uuid.as_deref(), Some("0a1b-22"));
        assert_eq!(record.sku.as_deref(), Some("210044"));
        assert_eq!(record.taxable, "maybe");
        assert_eq!(record.price_type, "haggle");
        assert_eq!(record.original_qty, "twelve");
        assert_eq!(record.price, "$1,299.00");
        assert_eq!(record.updated_qty, 0);
    }

    #[test]
    fn test_to_row_writes_updated_qty_under_quantity() {
        let mut item = record("Cap", Some("33"), None);
        item.original_qty = "5".to_string();
        item.updated_qty = 3;
        let out = to_row(&item);

        assert_eq!(out.len(), 18);
        assert_eq!(out["Quantity"], "3");
        assert_eq!(out["Item UUID"], "");
        assert_eq!(out["SKU (Do Not Edit)"], "33");
        assert!(!out.values().any(|value| value == "5"));
    }

    #[test]
    fn test_row_round_trip_moves_quantity() {
        let mut item = record("Scarf", Some("501"), Some("u-1"));
        item.supplier = "Acme, \"Inc.\"".to_string();
        item.updated_qty = 7;

        let back = to_record(&to_row(&item));
        assert_eq!(back.original_qty, "7");
        assert_eq!(back.updated_qty, 0);
        assert_eq!(back.supplier, item.supplier);
        assert_eq!(back.sku, item.sku);
        assert_eq!(back.item_uuid, item.item_uuid);
    }
}
