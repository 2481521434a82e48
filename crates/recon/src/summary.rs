use crate::classify::Classified;
use crate::config::AlertConfig;
use crate::model::{Aggregates, ReconAlert, ReconSummary, ReconTotals};

/// Order counts per bucket.
pub fn compute_summary(sales: &Aggregates, warehouse: &Aggregates, classified: &Classified) -> ReconSummary {
    let only_in_sales = classified.missing_in_warehouse.len();
    let only_in_warehouse = classified.missing_in_sales.len();
    let mismatched = classified.quantity_mismatch.len();

    ReconSummary {
        sales_orders: sales.len(),
        warehouse_orders: warehouse.len(),
        in_both: classified.matched + mismatched,
        only_in_sales,
        only_in_warehouse,
        matched: classified.matched,
        mismatched,
    }
}

/// Unit totals over every order, whatever its bucket, plus over/under
/// shipped totals over mismatches only.
pub fn compute_totals(sales: &Aggregates, warehouse: &Aggregates, classified: &Classified) -> ReconTotals {
    let total_sold_quantity: i64 = sales.values().map(|a| a.units).sum();
    let total_packages_to_ship: i64 = sales.values().map(|a| a.total_quantity).sum();
    let total_shipped_quantity: i64 = warehouse.values().map(|a| a.total_quantity).sum();

    let mut over_shipped_quantity = 0;
    let mut under_shipped_quantity = 0;
    for m in &classified.quantity_mismatch {
        if m.difference > 0 {
            over_shipped_quantity += m.difference;
        } else {
            under_shipped_quantity -= m.difference;
        }
    }

    ReconTotals {
        total_sold_quantity,
        total_packages_to_ship,
        total_shipped_quantity,
        net_difference: total_shipped_quantity - total_packages_to_ship,
        over_shipped_quantity,
        under_shipped_quantity,
    }
}

/// Flag results that look like a setup problem rather than real discrepancies.
pub fn check_health(summary: &ReconSummary, totals: &ReconTotals, alerts: &AlertConfig) -> Vec<ReconAlert> {
    let mut out = Vec::new();

    if totals.total_shipped_quantity <= 0 {
        let alert = ReconAlert::NoShipments {
            total_shipped_quantity: totals.total_shipped_quantity,
        };
        log::error!("{alert}");
        out.push(alert);
    }

    if summary.in_both > 0 && summary.mismatched == summary.in_both {
        out.push(ReconAlert::AllOrdersMismatched {
            in_both: summary.in_both,
        });
    }

    let limit = totals.total_packages_to_ship as f64 * alerts.net_difference_ratio;
    if (totals.net_difference.abs() as f64) > limit {
        out.push(ReconAlert::NetDifferenceExceeded {
            net_difference: totals.net_difference,
            packages_to_ship: totals.total_packages_to_ship,
            ratio: alerts.net_difference_ratio,
        });
    }

    for alert in out.iter().filter(|a| !matches!(a, ReconAlert::NoShipments { .. })) {
        log::warn!("{alert}");
    }

    out
}
