use crate::aggregate::aggregate;
use crate::classify::classify;
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::matcher::match_exact_key;
use crate::model::{Aggregates, DatasetKind, RawRow, ReconMeta, ReconReport};
use crate::normalize::normalize;
use crate::summary::{check_health, compute_summary, compute_totals};

/// Reconciliation engine bound to one validated config.
///
/// Holds no per-run state; a shared reference can serve concurrent runs.
#[derive(Debug, Clone)]
pub struct ReconEngine {
    config: ReconConfig,
}

impl ReconEngine {
    pub fn new(config: ReconConfig) -> Result<Self, ReconError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Normalize, aggregate and reconcile both raw datasets.
    pub fn analyze(&self, sales_rows: &[RawRow], warehouse_rows: &[RawRow]) -> Result<ReconReport, ReconError> {
        if sales_rows.is_empty() || warehouse_rows.is_empty() {
            return Err(ReconError::Precondition(format!(
                "both datasets required (sales: {} rows, warehouse: {} rows)",
                sales_rows.len(),
                warehouse_rows.len()
            )));
        }
        self.check_size(DatasetKind::Sales, sales_rows.len())?;
        self.check_size(DatasetKind::Warehouse, warehouse_rows.len())?;

        log::info!(
            "analyzing {} sales rows against {} warehouse rows",
            sales_rows.len(),
            warehouse_rows.len()
        );

        let sales = normalize(sales_rows, DatasetKind::Sales, &self.config);
        let warehouse = normalize(warehouse_rows, DatasetKind::Warehouse, &self.config);

        let sales_aggs = aggregate(&sales.items, DatasetKind::Sales);
        let warehouse_aggs = aggregate(&warehouse.items, DatasetKind::Warehouse);

        let mut report = self.reconcile(&sales_aggs, &warehouse_aggs)?;
        report.warnings = sales.warnings;
        report.warnings.extend(warehouse.warnings);
        Ok(report)
    }

    /// Cross-reference two aggregate maps into a report.
    pub fn reconcile(&self, sales: &Aggregates, warehouse: &Aggregates) -> Result<ReconReport, ReconError> {
        reconcile_validated(sales, warehouse, &self.config)
    }

    fn check_size(&self, dataset: DatasetKind, rows: usize) -> Result<(), ReconError> {
        let limit = self.config.limits.max_rows;
        if rows > limit {
            return Err(ReconError::InputTooLarge { dataset, rows, limit });
        }
        Ok(())
    }
}

/// One-shot: validate `config` and analyze both datasets.
pub fn run(config: &ReconConfig, sales_rows: &[RawRow], warehouse_rows: &[RawRow]) -> Result<ReconReport, ReconError> {
    ReconEngine::new(config.clone())?.analyze(sales_rows, warehouse_rows)
}

/// Classify every order of both aggregate maps and compute totals.
///
/// Fails on an invalid config, or when either side has no orders: there is
/// nothing to compare.
pub fn reconcile(sales: &Aggregates, warehouse: &Aggregates, config: &ReconConfig) -> Result<ReconReport, ReconError> {
    config.validate()?;
    reconcile_validated(sales, warehouse, config)
}

fn reconcile_validated(
    sales: &Aggregates,
    warehouse: &Aggregates,
    config: &ReconConfig,
) -> Result<ReconReport, ReconError> {
    if sales.is_empty() || warehouse.is_empty() {
        return Err(ReconError::Precondition(format!(
            "both datasets required (sales: {} orders, warehouse: {} orders)",
            sales.len(),
            warehouse.len()
        )));
    }

    let pairs = match_exact_key(sales, warehouse);
    let classified = classify(&pairs, config);
    let summary = compute_summary(sales, warehouse, &classified);
    let totals = compute_totals(sales, warehouse, &classified);
    let alerts = check_health(&summary, &totals, &config.alerts);

    log::info!(
        "recon '{}': {} in both ({} mismatched), {} sales only, {} warehouse only, net difference {}",
        config.name,
        summary.in_both,
        summary.mismatched,
        summary.only_in_sales,
        summary.only_in_warehouse,
        totals.net_difference,
    );

    Ok(ReconReport {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            pack_table_version: config.pack_sizes.version().to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        totals,
        quantity_mismatch: classified.quantity_mismatch,
        missing_in_warehouse: classified.missing_in_warehouse,
        missing_in_sales: classified.missing_in_sales,
        warnings: Vec::new(),
        alerts,
    })
}
