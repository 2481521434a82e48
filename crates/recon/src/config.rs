use serde::Deserialize;

use crate::error::ReconError;
use crate::pack_sizes::{PackTable, MAX_PACK_SIZE};

/// Upper bound for `limits.max_rows`.
pub const MAX_ROWS_LIMIT: usize = 10_000_000;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Everything the engine needs besides the two row sets.
///
/// Every section is optional in TOML; the defaults describe the stock Tmall
/// order export and the warehouse in/out movement export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub name: String,
    pub sales: SalesConfig,
    pub warehouse: WarehouseConfig,
    pub tolerance: ToleranceConfig,
    pub limits: LimitsConfig,
    pub alerts: AlertConfig,
    pub pack_sizes: PackTable,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: "tmall-warehouse".into(),
            sales: SalesConfig::default(),
            warehouse: WarehouseConfig::default(),
            tolerance: ToleranceConfig::default(),
            limits: LimitsConfig::default(),
            alerts: AlertConfig::default(),
            pack_sizes: PackTable::builtin(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SalesConfig {
    pub columns: SalesColumns,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SalesColumns {
    /// Primary order number.
    pub order_key: String,
    /// Purchased quantity.
    pub quantity: String,
    /// External system code, looked up in the pack table.
    pub product_code: String,
    pub sub_order_id: String,
    pub title: String,
}

impl Default for SalesColumns {
    fn default() -> Self {
        Self {
            order_key: "主订单编号".into(),
            quantity: "购买数量".into(),
            product_code: "外部系统编号".into(),
            sub_order_id: "子订单编号".into(),
            title: "标题".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Warehouse
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    pub columns: WarehouseColumns,
    /// Substring of the movement type that marks an outbound row.
    pub outbound_marker: String,
    /// When set, rows from any other store are skipped.
    pub store: Option<String>,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            columns: WarehouseColumns::default(),
            outbound_marker: "出库".into(),
            store: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarehouseColumns {
    /// Online order number.
    pub order_key: String,
    pub quantity: String,
    pub movement_type: String,
    pub store: String,
    /// Style code, reported only.
    pub product_code: String,
}

impl Default for WarehouseColumns {
    fn default() -> Self {
        Self {
            order_key: "线上订单号".into(),
            quantity: "数量".into(),
            movement_type: "进出仓类型".into(),
            store: "店铺名称".into(),
            product_code: "款式编码".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tolerance + Limits + Alerts
// ---------------------------------------------------------------------------

/// A matched order is a mismatch only when BOTH tolerances are exceeded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    pub absolute_units: i64,
    pub relative: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            absolute_units: 2,
            relative: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum rows accepted per dataset.
    pub max_rows: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_rows: 1_000_000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Alert when |net difference| exceeds this share of packages to ship.
    pub net_difference_ratio: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            net_difference_ratio: 0.3,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let s = &self.sales.columns;
        let w = &self.warehouse.columns;
        let columns = [
            ("sales.columns.order_key", &s.order_key),
            ("sales.columns.quantity", &s.quantity),
            ("sales.columns.product_code", &s.product_code),
            ("warehouse.columns.order_key", &w.order_key),
            ("warehouse.columns.quantity", &w.quantity),
            ("warehouse.columns.movement_type", &w.movement_type),
        ];
        for (field, value) in columns {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{field} must not be empty")));
            }
        }

        if self.warehouse.outbound_marker.is_empty() {
            return Err(ReconError::ConfigValidation(
                "warehouse.outbound_marker must not be empty".into(),
            ));
        }

        if self.tolerance.absolute_units < 0 {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance.absolute_units must be >= 0, got {}",
                self.tolerance.absolute_units
            )));
        }
        if !self.tolerance.relative.is_finite() || self.tolerance.relative < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance.relative must be a non-negative number, got {}",
                self.tolerance.relative
            )));
        }

        if self.limits.max_rows == 0 || self.limits.max_rows > MAX_ROWS_LIMIT {
            return Err(ReconError::ConfigValidation(format!(
                "limits.max_rows must be between 1 and {MAX_ROWS_LIMIT}, got {}",
                self.limits.max_rows
            )));
        }

        let ratio = self.alerts.net_difference_ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "alerts.net_difference_ratio must be a non-negative number, got {ratio}"
            )));
        }

        if let Some((code, size)) = self
            .pack_sizes
            .iter()
            .find(|(_, size)| *size == 0 || *size > MAX_PACK_SIZE)
        {
            return Err(ReconError::ConfigValidation(format!(
                "pack_sizes: code '{code}' has pack size {size}, expected 1..={MAX_PACK_SIZE}"
            )));
        }

        if let Some(code) = self.pack_sizes.duplicate_codes().first() {
            return Err(ReconError::ConfigValidation(format!(
                "pack_sizes: code '{code}' is listed more than once (codes are case-insensitive)"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
