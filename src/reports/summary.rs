use tracing::info;

use crate::models::StockoutRisk;
use crate::reports::KpiReport;

/// Emits the console KPI summary through `tracing`.
pub fn log_summary(report: &KpiReport) {
    let inv = &report.inventory;
    info!(
        skus = inv.sku_count,
        total_value = %inv.total_inventory_value.round_dp(2),
        monthly_holding_cost = %inv.monthly_holding_cost.round_dp(2),
        high_risk = inv.high_risk_skus,
        high_risk_pct = inv.high_risk_pct,
        at_risk = inv.at_risk_skus,
        slow_moving = inv.slow_moving_skus,
        slow_moving_pct = inv.slow_moving_pct,
        no_demand = inv.unbounded_cover_skus,
        "Inventory KPIs"
    );

    let sales = &report.sales;
    info!(
        total_revenue = %sales.total_revenue,
        total_units = sales.total_units,
        avg_monthly_revenue = %sales.average_monthly_revenue,
        "Sales KPIs"
    );
    for (quarter, revenue) in &sales.quarterly {
        info!(%quarter, %revenue, "Quarterly revenue");
    }

    for (category, counts) in &inv.risk_by_category {
        info!(
            %category,
            high = counts.get(StockoutRisk::High),
            medium = counts.get(StockoutRisk::Medium),
            low = counts.get(StockoutRisk::Low),
            "Risk by category"
        );
    }

    for sku in &inv.top_high_risk {
        info!(
            sku = %sku.sku,
            category = %sku.category,
            stock = sku.current_stock,
            days_of_stock = sku.days_of_stock,
            "High-risk SKU"
        );
    }

    for card in &report.scorecards {
        info!(
            supplier = %card.supplier,
            otd = ?card.avg_otd_rate,
            defect = ?card.avg_defect_rate,
            lead_time_variance = ?card.avg_lead_time_variance,
            score = card.performance_score,
            rating = %card.rating,
            insufficient_data = card.insufficient_data,
            "Supplier scorecard"
        );
    }
}
