//! Dashboard, summary and report routes.

use super::{AppState, error::ApiResult};
use crate::{
    core::report::{
        self, DailySales, DashboardSummary, DateRange, DiscountUsage, ItemSales, SalesSummary,
        TopItem,
    },
    export,
};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::info;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/today-summary", get(today_summary))
        .route("/dashboard/discount-usage", get(today_discount_usage))
        .route("/summary/today", get(summary_today))
        .route("/summary/range", get(summary_range))
        .route("/reports/top-items", get(top_items))
        .route("/reports/daily-sales", get(daily_sales))
        .route("/reports/item-sales", get(item_sales))
        .route("/reports/discount-usage", get(discount_usage))
        .route("/reports/orders-xlsx", get(orders_xlsx))
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start_date: String,
    end_date: String,
}

impl RangeQuery {
    fn range(&self) -> crate::errors::Result<DateRange> {
        DateRange::parse(&self.start_date, &self.end_date)
    }
}

async fn today_summary(State(state): State<AppState>) -> ApiResult<Json<DashboardSummary>> {
    Ok(Json(report::today_dashboard(&state.db).await?))
}

async fn today_discount_usage(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DiscountUsage>>> {
    Ok(Json(
        report::discount_usage(&state.db, Some(&DateRange::today())).await?,
    ))
}

async fn summary_today(State(state): State<AppState>) -> ApiResult<Json<SalesSummary>> {
    Ok(Json(report::sales_summary(&state.db, &DateRange::today()).await?))
}

async fn summary_range(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<SalesSummary>> {
    let range = query.range()?;
    Ok(Json(report::sales_summary(&state.db, &range).await?))
}

#[derive(Debug, Deserialize)]
struct TopItemsQuery {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    limit: Option<u64>,
}

async fn top_items(
    State(state): State<AppState>,
    Query(query): Query<TopItemsQuery>,
) -> ApiResult<Json<Vec<TopItem>>> {
    // Both bounds or neither; anything else falls back to today
    let range = match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
            DateRange::parse(start, end)?
        }
        _ => DateRange::today(),
    };
    Ok(Json(report::top_items(&state.db, &range, query.limit).await?))
}

#[derive(Debug, Deserialize)]
struct DailySalesQuery {
    #[serde(default)]
    date: Option<String>,
}

async fn daily_sales(
    State(state): State<AppState>,
    Query(query): Query<DailySalesQuery>,
) -> ApiResult<Json<DailySales>> {
    let date = match query.date.as_deref().filter(|d| !d.is_empty()) {
        Some(value) => report::parse_date(value)?,
        None => Local::now().date_naive(),
    };
    Ok(Json(report::daily_sales(&state.db, date).await?))
}

#[derive(Debug, Deserialize)]
struct ItemSalesQuery {
    date: String,
    item_id: i64,
}

async fn item_sales(
    State(state): State<AppState>,
    Query(query): Query<ItemSalesQuery>,
) -> ApiResult<Json<ItemSales>> {
    let date: NaiveDate = report::parse_date(&query.date)?;
    Ok(Json(report::item_sales(&state.db, date, query.item_id).await?))
}

async fn discount_usage(State(state): State<AppState>) -> ApiResult<Json<Vec<DiscountUsage>>> {
    Ok(Json(report::discount_usage(&state.db, None).await?))
}

async fn orders_xlsx(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<impl IntoResponse> {
    let range = query.range()?;
    let rows = report::export_rows(&state.db, &range).await?;
    let bytes = export::orders_xlsx(&rows)?;
    let file_name = export::export_file_name(range.start, range.end);

    info!(%file_name, rows = rows.rows.len(), "sales report exported");
    Ok((
        [
            (header::CONTENT_TYPE, export::XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={file_name}"),
            ),
        ],
        bytes,
    ))
}
