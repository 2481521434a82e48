use crate::model::{Aggregates, MatchedOrder, OrderMatchOutput};

/// Match sales and warehouse aggregates by exact order key.
///
/// Output lists follow key order, so reports are reproducible.
pub fn match_exact_key<'a>(sales: &'a Aggregates, warehouse: &'a Aggregates) -> OrderMatchOutput<'a> {
    let mut matched = Vec::new();
    let mut sales_only = Vec::new();

    for (key, sales_agg) in sales {
        if let Some(warehouse_agg) = warehouse.get(key) {
            matched.push(MatchedOrder {
                sales: sales_agg,
                warehouse: warehouse_agg,
            });
        } else {
            sales_only.push(sales_agg);
        }
    }

    let warehouse_only = warehouse
        .iter()
        .filter(|(key, _)| !sales.contains_key(*key))
        .map(|(_, agg)| agg)
        .collect();

    OrderMatchOutput {
        matched,
        sales_only,
        warehouse_only,
    }
}
