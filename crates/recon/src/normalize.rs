use crate::config::ReconConfig;
use crate::model::{DatasetKind, LineItem, OrderKey, RawRow, RowWarning, WarningKind};

/// Line items for one dataset plus the row problems met along the way.
#[derive(Debug, Default)]
pub struct Normalized {
    pub items: Vec<LineItem>,
    pub warnings: Vec<RowWarning>,
}

impl Normalized {
    fn warn(&mut self, dataset: DatasetKind, row_index: usize, kind: WarningKind) {
        let warning = RowWarning { dataset, row_index, kind };
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Turn raw rows of one dataset into line items. Best effort per row: bad
/// cells become warnings, never errors.
pub fn normalize(rows: &[RawRow], kind: DatasetKind, config: &ReconConfig) -> Normalized {
    match kind {
        DatasetKind::Sales => normalize_sales(rows, config),
        DatasetKind::Warehouse => normalize_warehouse(rows, config),
    }
}

fn normalize_sales(rows: &[RawRow], config: &ReconConfig) -> Normalized {
    let cols = &config.sales.columns;
    let mut out = Normalized::default();

    for (row_index, row) in rows.iter().enumerate() {
        let Some(order_key) = OrderKey::parse(cell(row, &cols.order_key)) else {
            out.warn(DatasetKind::Sales, row_index, WarningKind::MissingOrderKey);
            continue;
        };

        let raw_quantity = cell(row, &cols.quantity);
        let quantity = parse_quantity(raw_quantity).unwrap_or_else(|| {
            out.warn(
                DatasetKind::Sales,
                row_index,
                WarningKind::UnparseableQuantity { value: raw_quantity.to_string() },
            );
            0
        });

        let product_code = cell(row, &cols.product_code).trim().to_string();
        let pack_size = if product_code.is_empty() {
            1
        } else {
            match config.pack_sizes.lookup(&product_code) {
                Some(size) => size,
                None => {
                    out.warn(
                        DatasetKind::Sales,
                        row_index,
                        WarningKind::UnmappedProductCode { code: product_code.clone() },
                    );
                    1
                }
            }
        };

        log::debug!(
            "sales order {order_key}: code={product_code} qty={quantity} pack={pack_size}"
        );

        out.items.push(LineItem {
            order_key,
            quantity,
            pack_size,
            product_code,
            row_index,
            raw: row.clone(),
        });
    }

    out
}

fn normalize_warehouse(rows: &[RawRow], config: &ReconConfig) -> Normalized {
    let wh = &config.warehouse;
    let cols = &wh.columns;
    let mut out = Normalized::default();

    for (row_index, row) in rows.iter().enumerate() {
        if let (Some(store), Some(actual)) = (&wh.store, row.get(&cols.store)) {
            if actual.trim() != store {
                log::debug!("warehouse row {row_index}: store '{actual}' filtered out");
                continue;
            }
        }

        let Some(order_key) = OrderKey::parse(cell(row, &cols.order_key)) else {
            out.warn(DatasetKind::Warehouse, row_index, WarningKind::MissingOrderKey);
            continue;
        };

        let raw_quantity = cell(row, &cols.quantity);
        let parsed = parse_quantity(raw_quantity).unwrap_or_else(|| {
            out.warn(
                DatasetKind::Warehouse,
                row_index,
                WarningKind::UnparseableQuantity { value: raw_quantity.to_string() },
            );
            0
        });

        let movement = cell(row, &cols.movement_type);
        let quantity = resolve_direction(parsed, movement, &wh.outbound_marker);
        if quantity == 0 && parsed != 0 {
            log::debug!("warehouse order {order_key}: inbound movement '{movement}' qty={parsed} ignored");
        }

        out.items.push(LineItem {
            order_key,
            quantity,
            pack_size: 1,
            product_code: cell(row, &cols.product_code).trim().to_string(),
            row_index,
            raw: row.clone(),
        });
    }

    out
}

fn cell<'a>(row: &'a RawRow, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// Largest quantity accepted in a single cell. Together with the pack size and
/// row limits in the config this keeps every total within `i64`.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Parse an integer quantity cell. Integral decimal text such as `"3.0"` is
/// accepted because spreadsheet exports often format counts that way. Values
/// beyond `MAX_QUANTITY` in either direction are rejected.
pub fn parse_quantity(value: &str) -> Option<i64> {
    let v = value.trim();
    let n = match v.parse::<i64>() {
        Ok(n) => n,
        Err(_) => match v.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_QUANTITY as f64 => f as i64,
            _ => return None,
        },
    };
    (-MAX_QUANTITY..=MAX_QUANTITY).contains(&n).then_some(n)
}

/// Shipped units for a warehouse movement.
///
/// Negative quantities are stock leaving the warehouse. Non-negative rows
/// count only when the movement type carries the outbound marker; anything
/// else is inbound stock and ships nothing.
pub fn resolve_direction(quantity: i64, movement_type: &str, outbound_marker: &str) -> i64 {
    if quantity < 0 || movement_type.contains(outbound_marker) {
        quantity.saturating_abs()
    } else {
        0
    }
}
