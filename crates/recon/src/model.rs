use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One decoded spreadsheet row: column header → cell text.
pub type RawRow = HashMap<String, String>;

/// Which export a row came from. The two sides use different column semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Sales,
    Warehouse,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sales => write!(f, "sales"),
            Self::Warehouse => write!(f, "warehouse"),
        }
    }
}

/// Canonical order identifier shared by both datasets.
///
/// Never empty. Exports sometimes carry a leading `'` so spreadsheet tools keep
/// long digit strings as text; that prefix is not part of the order number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OrderKey(String);

impl OrderKey {
    /// Clean a raw order-number cell. Returns `None` when nothing usable remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let cleaned = trimmed.strip_prefix('\'').unwrap_or(trimmed).trim();
        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// A normalized row from either dataset.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub order_key: OrderKey,
    /// Sales: purchased units. Warehouse: direction-resolved shipped units.
    pub quantity: i64,
    /// Packages per unit; always 1 on the warehouse side.
    pub pack_size: u32,
    pub product_code: String,
    /// Position of the source row in its input sequence.
    pub row_index: usize,
    pub raw: RawRow,
}

impl LineItem {
    /// Units to ship for this line (`quantity * pack_size`).
    pub fn packages(&self) -> i64 {
        self.quantity * i64::from(self.pack_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// Row dropped: order-number column empty or absent.
    MissingOrderKey,
    /// Quantity treated as 0.
    UnparseableQuantity { value: String },
    /// Pack size treated as 1.
    UnmappedProductCode { code: String },
}

/// Non-fatal row-level problem. Never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub dataset: DatasetKind,
    pub row_index: usize,
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} row {}: ", self.dataset, self.row_index)?;
        match &self.kind {
            WarningKind::MissingOrderKey => write!(f, "no order number, row skipped"),
            WarningKind::UnparseableQuantity { value } => {
                write!(f, "cannot parse quantity '{value}', using 0")
            }
            WarningKind::UnmappedProductCode { code } => {
                write!(f, "product code '{code}' has no pack size, using 1")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// All line items of one dataset sharing an order key.
#[derive(Debug, Clone)]
pub struct OrderAggregate {
    pub order_key: OrderKey,
    pub kind: DatasetKind,
    /// Sales: packages to ship (post-multiplier). Warehouse: shipped units.
    pub total_quantity: i64,
    /// Sum of line quantities before any pack multiplier.
    pub units: i64,
    pub line_items: Vec<LineItem>,
}

/// Per-dataset aggregates, iterated in order-key order.
pub type Aggregates = BTreeMap<OrderKey, OrderAggregate>;

// ---------------------------------------------------------------------------
// Pair matching
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MatchedOrder<'a> {
    pub sales: &'a OrderAggregate,
    pub warehouse: &'a OrderAggregate,
}

#[derive(Debug)]
pub struct OrderMatchOutput<'a> {
    pub matched: Vec<MatchedOrder<'a>>,
    pub sales_only: Vec<&'a OrderAggregate>,
    pub warehouse_only: Vec<&'a OrderAggregate>,
}

// ---------------------------------------------------------------------------
// Report records
// ---------------------------------------------------------------------------

/// One sales line as shown in discrepancy details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubOrder {
    pub sub_order_id: String,
    pub title: String,
    pub quantity: i64,
    pub product_code: String,
    pub pack_size: u32,
    pub packages: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MismatchRecord {
    pub order_key: OrderKey,
    pub sold_quantity: i64,
    pub packages_to_ship: i64,
    pub shipped_quantity: i64,
    /// `shipped_quantity - packages_to_ship`; positive means over-shipped.
    pub difference: i64,
    pub sub_orders: Vec<SubOrder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingInWarehouse {
    pub order_key: OrderKey,
    pub sold_quantity: i64,
    pub packages_to_ship: i64,
    pub sub_orders: Vec<SubOrder>,
    pub order_info: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingInSales {
    pub order_key: OrderKey,
    pub shipped_quantity: i64,
    pub order_info: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub sales_orders: usize,
    pub warehouse_orders: usize,
    pub in_both: usize,
    pub only_in_sales: usize,
    pub only_in_warehouse: usize,
    pub matched: usize,
    pub mismatched: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconTotals {
    pub total_sold_quantity: i64,
    pub total_packages_to_ship: i64,
    pub total_shipped_quantity: i64,
    /// `total_shipped_quantity - total_packages_to_ship`.
    pub net_difference: i64,
    pub over_shipped_quantity: i64,
    pub under_shipped_quantity: i64,
}

/// Dataset-level signal that the run probably reflects a setup problem
/// (column mapping, thresholds) rather than real discrepancies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconAlert {
    AllOrdersMismatched { in_both: usize },
    NoShipments { total_shipped_quantity: i64 },
    NetDifferenceExceeded {
        net_difference: i64,
        packages_to_ship: i64,
        ratio: f64,
    },
}

impl fmt::Display for ReconAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllOrdersMismatched { in_both } => write!(
                f,
                "all {in_both} matched orders are quantity mismatches; check thresholds and column mapping"
            ),
            Self::NoShipments { total_shipped_quantity } => write!(
                f,
                "warehouse shipped total is {total_shipped_quantity}; check quantity direction handling"
            ),
            Self::NetDifferenceExceeded {
                net_difference,
                packages_to_ship,
                ratio,
            } => write!(
                f,
                "net difference {net_difference} exceeds {:.0}% of {packages_to_ship} packages to ship",
                ratio * 100.0
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub pack_table_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub totals: ReconTotals,
    pub quantity_mismatch: Vec<MismatchRecord>,
    pub missing_in_warehouse: Vec<MissingInWarehouse>,
    pub missing_in_sales: Vec<MissingInSales>,
    pub warnings: Vec<RowWarning>,
    pub alerts: Vec<ReconAlert>,
}

impl ReconReport {
    pub fn to_json_pretty(&self) -> Result<String, crate::ReconError> {
        serde_json::to_string_pretty(self).map_err(|e| crate::ReconError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_key_strips_quote_and_whitespace() {
        let a = OrderKey::parse("'ABC123").unwrap();
        let b = OrderKey::parse(" ABC123 ").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "ABC123");
    }

    #[test]
    fn order_key_strips_only_one_quote() {
        let k = OrderKey::parse("''42").unwrap();
        assert_eq!(k.as_str(), "'42");
    }

    #[test]
    fn order_key_empty_is_none() {
        assert!(OrderKey::parse("").is_none());
        assert!(OrderKey::parse("   ").is_none());
        assert!(OrderKey::parse(" ' ").is_none());
    }

    #[test]
    fn line_item_packages() {
        let item = LineItem {
            order_key: OrderKey::parse("X").unwrap(),
            quantity: 2,
            pack_size: 6,
            product_code: "bkym6".into(),
            row_index: 0,
            raw: RawRow::new(),
        };
        assert_eq!(item.packages(), 12);
    }

    #[test]
    fn warning_display() {
        let w = RowWarning {
            dataset: DatasetKind::Sales,
            row_index: 4,
            kind: WarningKind::UnmappedProductCode { code: "zz9".into() },
        };
        assert_eq!(w.to_string(), "sales row 4: product code 'zz9' has no pack size, using 1");
    }
}
