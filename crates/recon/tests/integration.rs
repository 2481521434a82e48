use std::path::PathBuf;

use shipcheck_recon::model::{DatasetKind, WarningKind};
use shipcheck_recon::{run, RawRow, ReconConfig, ReconEngine, ReconError, ReconReport};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn flagship_config() -> ReconConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("flagship.recon.toml")).unwrap();
    ReconConfig::from_toml(&toml).unwrap()
}

/// Build rows from a header line and cell lines, like a decoded sheet.
fn table(headers: &[&str], cells: &[&[&str]]) -> Vec<RawRow> {
    cells
        .iter()
        .map(|line| {
            headers
                .iter()
                .zip(line.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

fn flagship_sales() -> Vec<RawRow> {
    table(
        &["order_no", "line_no", "title", "qty", "ext_code"],
        &[
            &["'1001", "L1", "Chili oil 6-pack", "2", "six"],
            &[" 1001 ", "L2", "Chili oil", "1", ""],
            &["1002", "L3", "Soy sauce", "100", ""],
            &["1003", "L4", "Vinegar", "100", ""],
            &["1004", "L5", "Pepper", "100", ""],
            &["1005", "L6", "Sesame 4-pack", "1", "FOUR"],
            &["", "L7", "Broken row", "1", ""],
            &["1006", "L8", "Bad quantity", "abc", ""],
        ],
    )
}

fn flagship_warehouse() -> Vec<RawRow> {
    let mut rows = table(
        &["online_order", "qty", "movement", "shop", "style"],
        &[
            &["1001", "-13", "SALE-OUT", "Flagship", "chili"],
            &["1002", "-102", "SALE", "Flagship", "soy"],
            &["1003", "103", "SALE-OUT", "Flagship", "vinegar"],
            &["1004", "-110", "SALE", "Flagship", "pepper"],
            &["1004", "5", "RESTOCK", "Flagship", "pepper"],
            &["2001", "-7", "SALE", "Flagship", "soy"],
            &["3001", "-50", "SALE", "Outlet", "soy"],
        ],
    );
    // Row without a shop column is kept by the store filter
    rows.extend(table(&["online_order", "qty", "movement"], &[&["2002", "4", "RETURN-IN"]]));
    rows
}

fn flagship_report() -> ReconReport {
    run(&flagship_config(), &flagship_sales(), &flagship_warehouse()).unwrap()
}

// -------------------------------------------------------------------------
// Fixture config
// -------------------------------------------------------------------------

#[test]
fn flagship_summary() {
    let report = flagship_report();
    let s = &report.summary;

    assert_eq!(report.meta.config_name, "Flagship March");
    assert_eq!(report.meta.pack_table_version, "2026-03");
    assert_eq!(s.sales_orders, 6);
    assert_eq!(s.warehouse_orders, 6);
    assert_eq!(s.in_both, 4);
    assert_eq!(s.matched, 3);
    assert_eq!(s.mismatched, 1);
    assert_eq!(s.only_in_sales, 2);
    assert_eq!(s.only_in_warehouse, 2);
}

#[test]
fn flagship_totals() {
    let t = flagship_report().totals;
    assert_eq!(t.total_sold_quantity, 304);
    assert_eq!(t.total_packages_to_ship, 317);
    assert_eq!(t.total_shipped_quantity, 335);
    assert_eq!(t.net_difference, 18);
    assert_eq!(t.over_shipped_quantity, 10);
    assert_eq!(t.under_shipped_quantity, 0);
}

#[test]
fn flagship_records() {
    let report = flagship_report();

    assert_eq!(report.quantity_mismatch.len(), 1);
    let m = &report.quantity_mismatch[0];
    assert_eq!(m.order_key.as_str(), "1004");
    assert_eq!(m.packages_to_ship, 100);
    assert_eq!(m.shipped_quantity, 110);
    assert_eq!(m.difference, 10);
    assert_eq!(m.sub_orders[0].sub_order_id, "L5");
    assert_eq!(m.sub_orders[0].title, "Pepper");

    let missing_wh: Vec<&str> = report.missing_in_warehouse.iter().map(|r| r.order_key.as_str()).collect();
    assert_eq!(missing_wh, vec!["1005", "1006"]);
    assert_eq!(report.missing_in_warehouse[0].packages_to_ship, 4);
    assert_eq!(report.missing_in_warehouse[0].sub_orders[0].pack_size, 4);
    assert_eq!(report.missing_in_warehouse[1].sold_quantity, 0);

    let missing_sales: Vec<&str> = report.missing_in_sales.iter().map(|r| r.order_key.as_str()).collect();
    assert_eq!(missing_sales, vec!["2001", "2002"]);
    assert_eq!(report.missing_in_sales[0].shipped_quantity, 7);
    assert_eq!(report.missing_in_sales[0].order_info["style"], "soy");
    assert_eq!(report.missing_in_sales[1].shipped_quantity, 0);

    assert!(report.alerts.is_empty());
}

#[test]
fn flagship_warnings() {
    let report = flagship_report();
    assert_eq!(report.warnings.len(), 2);

    assert_eq!(report.warnings[0].dataset, DatasetKind::Sales);
    assert_eq!(report.warnings[0].row_index, 6);
    assert_eq!(report.warnings[0].kind, WarningKind::MissingOrderKey);

    assert_eq!(report.warnings[1].row_index, 7);
    assert_eq!(
        report.warnings[1].kind,
        WarningKind::UnparseableQuantity { value: "abc".into() }
    );
}

#[test]
fn repeated_runs_agree() {
    let engine = ReconEngine::new(flagship_config()).unwrap();
    let first = engine.analyze(&flagship_sales(), &flagship_warehouse()).unwrap();
    let second = engine.analyze(&flagship_sales(), &flagship_warehouse()).unwrap();

    assert_eq!(first.summary, second.summary);
    assert_eq!(first.totals, second.totals);
    assert_eq!(first.quantity_mismatch, second.quantity_mismatch);
    assert_eq!(first.missing_in_warehouse, second.missing_in_warehouse);
    assert_eq!(first.missing_in_sales, second.missing_in_sales);
}

#[test]
fn json_contract() {
    let report = flagship_report();
    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["meta"]["config_name"], "Flagship March");
    assert!(json["meta"]["run_at"].is_string());
    assert_eq!(json["summary"]["in_both"], 4);
    assert_eq!(json["totals"]["net_difference"], 18);
    assert_eq!(json["quantity_mismatch"][0]["order_key"], "1004");
    assert_eq!(json["quantity_mismatch"][0]["difference"], 10);
    assert_eq!(json["missing_in_sales"][0]["order_info"]["online_order"], "2001");
    assert_eq!(json["warnings"][0]["dataset"], "sales");
    assert_eq!(json["warnings"][0]["kind"], "missing_order_key");
    assert_eq!(json["warnings"][1]["kind"], "unparseable_quantity");
    assert_eq!(json["warnings"][1]["value"], "abc");
    assert!(json["alerts"].as_array().unwrap().is_empty());
}

// -------------------------------------------------------------------------
// Default config (stock export headers)
// -------------------------------------------------------------------------

const SALES_HEADERS: &[&str] = &["主订单编号", "购买数量", "外部系统编号"];
const WAREHOUSE_HEADERS: &[&str] = &["线上订单号", "数量", "进出仓类型"];

#[test]
fn mismatch_threshold_boundaries() {
    let sales = table(SALES_HEADERS, &[&["A", "100", ""], &["B", "100", ""], &["C", "100", ""]]);
    let warehouse = table(
        WAREHOUSE_HEADERS,
        &[&["A", "-102", ""], &["B", "-103", ""], &["C", "-110", ""]],
    );
    let report = run(&ReconConfig::default(), &sales, &warehouse).unwrap();

    assert_eq!(report.summary.in_both, 3);
    assert_eq!(report.summary.matched, 2);
    assert_eq!(report.quantity_mismatch.len(), 1);
    assert_eq!(report.quantity_mismatch[0].order_key.as_str(), "C");
    assert_eq!(report.quantity_mismatch[0].difference, 10);
    assert_eq!(report.totals.over_shipped_quantity, 10);
    assert_eq!(report.totals.under_shipped_quantity, 0);
}

#[test]
fn warehouse_direction_resolution() {
    let sales = table(SALES_HEADERS, &[&["X", "15", ""]]);
    let warehouse = table(
        WAREHOUSE_HEADERS,
        &[&["X", "-5", "调整"], &["X", "5", "销售出库"], &["X", "5", "采购入库"]],
    );
    let report = run(&ReconConfig::default(), &sales, &warehouse).unwrap();

    assert_eq!(report.totals.total_shipped_quantity, 10);
    assert_eq!(report.quantity_mismatch.len(), 1);
    assert_eq!(report.quantity_mismatch[0].difference, -5);
    assert_eq!(report.totals.under_shipped_quantity, 5);
}

#[test]
fn builtin_pack_sizes_apply() {
    let sales = table(SALES_HEADERS, &[&["P", "2", "BKYM6"], &["Q", "2", "zzz"]]);
    let warehouse = table(WAREHOUSE_HEADERS, &[&["P", "-12", ""], &["Q", "-2", ""]]);
    let report = run(&ReconConfig::default(), &sales, &warehouse).unwrap();

    assert_eq!(report.totals.total_sold_quantity, 4);
    assert_eq!(report.totals.total_packages_to_ship, 14);
    assert!(report.quantity_mismatch.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(
        report.warnings[0].kind,
        WarningKind::UnmappedProductCode { code: "zzz".into() }
    );
}

#[test]
fn order_keys_normalize_across_datasets() {
    let sales = table(SALES_HEADERS, &[&["'ABC123", "1", ""]]);
    let warehouse = table(WAREHOUSE_HEADERS, &[&[" ABC123 ", "-1", ""]]);
    let report = run(&ReconConfig::default(), &sales, &warehouse).unwrap();

    assert_eq!(report.summary.in_both, 1);
    assert_eq!(report.summary.only_in_sales, 0);
    assert_eq!(report.summary.only_in_warehouse, 0);
}

#[test]
fn empty_dataset_is_precondition_error() {
    let sales = table(SALES_HEADERS, &[&["A", "1", ""]]);
    let err = run(&ReconConfig::default(), &sales, &[]).unwrap_err();
    assert!(matches!(err, ReconError::Precondition(_)));
    assert!(err.to_string().contains("both datasets required"));
}

#[test]
fn all_mismatched_raises_alert() {
    let sales = table(SALES_HEADERS, &[&["A", "10", ""], &["B", "10", ""]]);
    let warehouse = table(WAREHOUSE_HEADERS, &[&["A", "-20", ""], &["B", "-20", ""]]);
    let report = run(&ReconConfig::default(), &sales, &warehouse).unwrap();

    assert_eq!(report.summary.mismatched, 2);
    assert!(report
        .alerts
        .iter()
        .any(|a| matches!(a, shipcheck_recon::model::ReconAlert::AllOrdersMismatched { in_both: 2 })));
}

#[test]
fn inbound_only_warehouse_raises_no_shipments_alert() {
    let sales = table(SALES_HEADERS, &[&["A", "10", ""]]);
    let warehouse = table(WAREHOUSE_HEADERS, &[&["A", "10", "采购入库"]]);
    let report = run(&ReconConfig::default(), &sales, &warehouse).unwrap();

    assert_eq!(report.summary.in_both, 1);
    assert_eq!(report.totals.total_shipped_quantity, 0);
    assert!(report
        .alerts
        .iter()
        .any(|a| matches!(a, shipcheck_recon::model::ReconAlert::NoShipments { .. })));
}

#[test]
fn out_of_range_quantity_is_warning_not_panic() {
    let sales = table(SALES_HEADERS, &[&["A", "9223372036854775807", "bkym6"]]);
    let warehouse = table(WAREHOUSE_HEADERS, &[&["A", "-1", ""]]);
    let report = run(&ReconConfig::default(), &sales, &warehouse).unwrap();

    assert_eq!(report.totals.total_packages_to_ship, 0);
    assert_eq!(report.totals.total_shipped_quantity, 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].dataset, DatasetKind::Sales);
    assert_eq!(
        report.warnings[0].kind,
        WarningKind::UnparseableQuantity { value: "9223372036854775807".into() }
    );
}

#[test]
fn out_of_range_quantity_is_left_out_of_order_total() {
    let sales = table(SALES_HEADERS, &[&["A", "9223372036854775807", ""], &["A", "1", ""]]);
    let warehouse = table(WAREHOUSE_HEADERS, &[&["A", "-1", ""]]);
    let report = run(&ReconConfig::default(), &sales, &warehouse).unwrap();

    assert_eq!(report.totals.total_sold_quantity, 1);
    assert_eq!(report.totals.total_packages_to_ship, 1);
    assert_eq!(report.summary.matched, 1);
    assert_eq!(report.warnings.len(), 1);
}
