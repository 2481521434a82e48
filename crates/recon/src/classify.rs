use std::collections::BTreeMap;

use crate::config::{ReconConfig, SalesColumns, ToleranceConfig};
use crate::model::{
    MismatchRecord, MissingInSales, MissingInWarehouse, OrderAggregate, OrderMatchOutput, SubOrder,
};

/// Discrepancy records for one run, each list in order-key order.
#[derive(Debug, Default)]
pub struct Classified {
    /// Matched orders within tolerance. They produce no record.
    pub matched: usize,
    pub quantity_mismatch: Vec<MismatchRecord>,
    pub missing_in_warehouse: Vec<MissingInWarehouse>,
    pub missing_in_sales: Vec<MissingInSales>,
}

/// Dual tolerance test for a matched order.
///
/// A mismatch needs the absolute difference above `absolute_units` AND the
/// difference relative to the sales total above `relative`. A sales total of
/// zero or less counts as 100% relative difference.
pub fn is_mismatch(packages_to_ship: i64, shipped: i64, tolerance: &ToleranceConfig) -> bool {
    let abs_diff = (packages_to_ship - shipped).abs();
    let rel_diff = if packages_to_ship > 0 {
        abs_diff as f64 / packages_to_ship as f64
    } else {
        1.0
    };
    abs_diff > tolerance.absolute_units && rel_diff > tolerance.relative
}

pub fn classify(pairs: &OrderMatchOutput<'_>, config: &ReconConfig) -> Classified {
    let columns = &config.sales.columns;
    let mut out = Classified::default();

    for m in &pairs.matched {
        let packages_to_ship = m.sales.total_quantity;
        let shipped = m.warehouse.total_quantity;

        if !is_mismatch(packages_to_ship, shipped, &config.tolerance) {
            out.matched += 1;
            continue;
        }

        log::debug!(
            "order {}: expected {packages_to_ship} packages, warehouse shipped {shipped}",
            m.sales.order_key
        );
        out.quantity_mismatch.push(MismatchRecord {
            order_key: m.sales.order_key.clone(),
            sold_quantity: m.sales.units,
            packages_to_ship,
            shipped_quantity: shipped,
            difference: shipped - packages_to_ship,
            sub_orders: sub_orders(m.sales, columns),
        });
    }

    for agg in &pairs.sales_only {
        out.missing_in_warehouse.push(MissingInWarehouse {
            order_key: agg.order_key.clone(),
            sold_quantity: agg.units,
            packages_to_ship: agg.total_quantity,
            sub_orders: sub_orders(agg, columns),
            order_info: first_row(agg),
        });
    }

    for agg in &pairs.warehouse_only {
        out.missing_in_sales.push(MissingInSales {
            order_key: agg.order_key.clone(),
            shipped_quantity: agg.total_quantity,
            order_info: first_row(agg),
        });
    }

    out
}

fn sub_orders(agg: &OrderAggregate, columns: &SalesColumns) -> Vec<SubOrder> {
    agg.line_items
        .iter()
        .map(|item| {
            let text = |col: &str| item.raw.get(col).cloned().unwrap_or_default();
            SubOrder {
                sub_order_id: text(&columns.sub_order_id),
                title: text(&columns.title),
                quantity: item.quantity,
                product_code: item.product_code.clone(),
                pack_size: item.pack_size,
                packages: item.packages(),
            }
        })
        .collect()
}

fn first_row(agg: &OrderAggregate) -> BTreeMap<String, String> {
    agg.line_items
        .first()
        .map(|item| item.raw.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}
