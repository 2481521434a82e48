use crate::model::{Aggregates, DatasetKind, LineItem, OrderAggregate};

/// Group line items by order key and sum quantities.
///
/// Sales totals are packages to ship (`quantity * pack_size`); warehouse totals
/// are the already direction-resolved shipped units. Line items keep input order.
pub fn aggregate(items: &[LineItem], kind: DatasetKind) -> Aggregates {
    let mut groups = Aggregates::new();

    for item in items {
        let entry = groups
            .entry(item.order_key.clone())
            .or_insert_with(|| OrderAggregate {
                order_key: item.order_key.clone(),
                kind,
                total_quantity: 0,
                units: 0,
                line_items: Vec::new(),
            });

        entry.total_quantity += match kind {
            DatasetKind::Sales => item.packages(),
            DatasetKind::Warehouse => item.quantity,
        };
        entry.units += item.quantity;
        entry.line_items.push(item.clone());
    }

    groups
}
