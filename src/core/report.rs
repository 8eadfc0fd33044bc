//! Sales reporting.
//!
//! Every function here is read-only. Ranges cover whole days: a [`DateRange`]
//! from `start` to `end` includes every order created on `end`. Empty ranges
//! produce zeroed aggregates, never errors.

use crate::{
    entities::{Order, OrderItem, menu_item, order, order_item},
    errors::{Error, Result},
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use sea_orm::{Condition, JoinType, QueryOrder, QuerySelect, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::collections::HashMap;

/// Number of items [`top_items`] returns when no limit is given.
pub const DEFAULT_TOP_ITEMS_LIMIT: u64 = 10;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
/// Returns `InvalidDate` for anything else.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate {
        value: value.to_string(),
    })
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting one whose start lies after its end.
    ///
    /// # Errors
    /// Returns `InvalidDateRange` if `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parses two `YYYY-MM-DD` strings.
    ///
    /// # Errors
    /// Returns `InvalidDate` or `InvalidDateRange`.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// A range covering the single day `date`.
    #[must_use]
    pub const fn for_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Today in local time.
    #[must_use]
    pub fn today() -> Self {
        Self::for_day(Local::now().date_naive())
    }

    /// Midnight at the start of the first day.
    #[must_use]
    pub fn starts_at(&self) -> NaiveDateTime {
        self.start.and_time(chrono::NaiveTime::MIN)
    }

    /// Midnight after the last day (exclusive upper bound).
    #[must_use]
    pub fn ends_before(&self) -> NaiveDateTime {
        self.end
            .succ_opt()
            .unwrap_or(self.end)
            .and_time(chrono::NaiveTime::MIN)
    }

    fn condition(&self) -> Condition {
        Condition::all()
            .add(order::Column::CreatedAt.gte(self.starts_at()))
            .add(order::Column::CreatedAt.lt(self.ends_before()))
    }
}

/// Paid/unpaid totals for a range, split by order type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesSummary {
    /// Sum of `total` over paid orders
    pub total_paid: f64,
    /// Sum of `total` over unpaid orders
    pub total_unpaid: f64,
    /// Number of paid orders
    pub orders_paid: usize,
    /// Number of unpaid orders
    pub orders_unpaid: usize,
    /// Sum of order-level discounts over paid orders
    pub total_discount: f64,
    /// Paid dine-in orders
    pub dine_in_count: usize,
    /// Revenue of paid dine-in orders
    pub dine_in_sales: f64,
    /// Paid take-out orders
    pub take_out_count: usize,
    /// Revenue of paid take-out orders
    pub take_out_sales: f64,
    /// Paid orders that carry a cancel reason
    pub void_orders: usize,
}

/// Builds the sales summary for `range`.
pub async fn sales_summary(db: &DatabaseConnection, range: &DateRange) -> Result<SalesSummary> {
    let orders = Order::find().filter(range.condition()).all(db).await?;

    let mut summary = SalesSummary::default();
    for o in &orders {
        if !o.is_paid {
            summary.orders_unpaid += 1;
            summary.total_unpaid += o.total;
            continue;
        }

        summary.orders_paid += 1;
        summary.total_paid += o.total;
        summary.total_discount += o.discount;
        if o.cancel_reason.is_some() {
            summary.void_orders += 1;
        }
        match o.order_type.to_lowercase().as_str() {
            "dine-in" => {
                summary.dine_in_count += 1;
                summary.dine_in_sales += o.total;
            }
            "take-out" => {
                summary.take_out_count += 1;
                summary.take_out_sales += o.total;
            }
            _ => {}
        }
    }

    Ok(summary)
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Revenue of paid, non-voided orders
    pub total_sales: f64,
    /// Discounts on those orders
    pub total_discount: f64,
    /// Number of those orders
    pub total_orders: usize,
    /// `total_sales / total_orders`, 0 without orders
    pub average_order_value: f64,
    /// Orders carrying a cancel reason, paid or not
    pub void_orders: usize,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Builds the dashboard figures for `range`. Money values are rounded to cents.
#[allow(clippy::cast_precision_loss)]
pub async fn dashboard_summary(
    db: &DatabaseConnection,
    range: &DateRange,
) -> Result<DashboardSummary> {
    let orders = Order::find().filter(range.condition()).all(db).await?;

    let void_orders = orders.iter().filter(|o| o.cancel_reason.is_some()).count();
    let settled: Vec<&order::Model> = orders
        .iter()
        .filter(|o| o.is_paid && o.cancel_reason.is_none())
        .collect();

    let total_sales: f64 = settled.iter().map(|o| o.total).sum();
    let total_discount: f64 = settled.iter().map(|o| o.discount).sum();
    let total_orders = settled.len();
    let average_order_value = if total_orders == 0 {
        0.0
    } else {
        round2(total_sales / total_orders as f64)
    };

    Ok(DashboardSummary {
        total_sales: round2(total_sales),
        total_discount: round2(total_discount),
        total_orders,
        average_order_value,
        void_orders,
    })
}

/// Dashboard figures for today.
pub async fn today_dashboard(db: &DatabaseConnection) -> Result<DashboardSummary> {
    dashboard_summary(db, &DateRange::today()).await
}

/// A menu item and the units sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopItem {
    /// Menu item name
    pub item: String,
    /// Units sold on paid orders
    pub total_sold: i64,
}

/// Best sellers on paid orders in `range`, by units sold then name.
pub async fn top_items(
    db: &DatabaseConnection,
    range: &DateRange,
    limit: Option<u64>,
) -> Result<Vec<TopItem>> {
    let sold = Expr::col((OrderItem, order_item::Column::Quantity)).sum();

    let rows: Vec<(String, i64)> = OrderItem::find()
        .select_only()
        .column(menu_item::Column::Name)
        .column_as(sold.clone(), "total_sold")
        .join(JoinType::InnerJoin, order_item::menu_item_relation())
        .inner_join(Order)
        .filter(order::Column::IsPaid.eq(true))
        .filter(range.condition())
        .group_by(menu_item::Column::Name)
        .order_by(sold, sea_orm::Order::Desc)
        .order_by_asc(menu_item::Column::Name)
        .limit(limit.unwrap_or(DEFAULT_TOP_ITEMS_LIMIT))
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(item, total_sold)| TopItem { item, total_sold })
        .collect())
}

/// Units of one menu item sold on a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSales {
    /// The day
    pub date: NaiveDate,
    /// Units sold on paid orders
    pub total_sales: i64,
}

/// Units of `menu_item_id` sold on paid orders created on `date`.
pub async fn item_sales(
    db: &DatabaseConnection,
    date: NaiveDate,
    menu_item_id: i64,
) -> Result<ItemSales> {
    let range = DateRange::for_day(date);
    let total: Option<Option<i64>> = OrderItem::find()
        .select_only()
        .column_as(Expr::col((OrderItem, order_item::Column::Quantity)).sum(), "total")
        .inner_join(Order)
        .filter(order::Column::IsPaid.eq(true))
        .filter(order_item::Column::MenuItemId.eq(menu_item_id))
        .filter(range.condition())
        .into_tuple()
        .one(db)
        .await?;

    Ok(ItemSales {
        date,
        total_sales: total.flatten().unwrap_or(0),
    })
}

/// Paid orders and revenue for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    /// The day
    pub date: NaiveDate,
    /// Paid orders created that day
    pub total_orders: i64,
    /// Their summed totals
    pub total_sales: f64,
}

/// Paid orders and revenue for `date`.
pub async fn daily_sales(db: &DatabaseConnection, date: NaiveDate) -> Result<DailySales> {
    let range = DateRange::for_day(date);
    let row: Option<(Option<f64>, i64)> = Order::find()
        .select_only()
        .column_as(Expr::col((Order, order::Column::Total)).sum(), "total_sales")
        .column_as(Expr::col((Order, order::Column::Id)).count(), "total_orders")
        .filter(order::Column::IsPaid.eq(true))
        .filter(range.condition())
        .into_tuple()
        .one(db)
        .await?;

    let (total_sales, total_orders) = row.unwrap_or((None, 0));
    Ok(DailySales {
        date,
        total_orders,
        total_sales: total_sales.unwrap_or(0.0),
    })
}

/// How many line items used a discount type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountUsage {
    /// Discount category as entered (senior, pwd, coupon, ...)
    #[serde(rename = "type")]
    pub discount_type: String,
    /// Line items carrying it
    pub count: i64,
}

/// Discount types used on paid orders, optionally limited to `range`.
pub async fn discount_usage(
    db: &DatabaseConnection,
    range: Option<&DateRange>,
) -> Result<Vec<DiscountUsage>> {
    let mut query = OrderItem::find()
        .select_only()
        .column(order_item::Column::DiscountPersonType)
        .column_as(Expr::col((OrderItem, order_item::Column::Id)).count(), "count")
        .inner_join(Order)
        .filter(order::Column::IsPaid.eq(true))
        .filter(order_item::Column::DiscountPersonType.is_not_null());
    if let Some(range) = range {
        query = query.filter(range.condition());
    }

    let rows: Vec<(String, i64)> = query
        .group_by(order_item::Column::DiscountPersonType)
        .order_by_asc(order_item::Column::DiscountPersonType)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(discount_type, count)| DiscountUsage { discount_type, count })
        .collect())
}

/// Order-level cells, filled only on an order's first exported line.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOrderCells {
    /// `YYYY-MM-DD HH:MM`
    pub date: String,
    /// Order id
    pub order_id: i64,
    /// Order type, `N/A` when blank
    pub order_type: String,
    /// Discount type of the first line, coupons and vouchers shown as `Coupon`
    pub discount_type: String,
    /// Discount holder name of the first line
    pub discount_name: String,
    /// Discount ID of the first line, `Code` for coupons without one
    pub discount_id: String,
    /// Order-level discount
    pub total_discount: f64,
    /// Order total
    pub total_amount: f64,
    /// `total - discount`
    pub net_total: f64,
    /// Operator tag
    pub cashier: String,
}

/// One exported line item.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    /// Present on the first line of each order
    pub order: Option<ExportOrderCells>,
    /// Menu item name
    pub item_name: String,
    /// Line notes
    pub comments: String,
    /// Units on this line
    pub quantity: i32,
}

/// Units sold per item name across the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTotal {
    /// Menu item name
    pub item: String,
    /// Units across all exported lines
    pub total_quantity: i64,
}

/// Data behind the two-sheet spreadsheet export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderExport {
    /// One row per line item
    pub rows: Vec<ExportRow>,
    /// Per-item totals in first-seen order
    pub item_totals: Vec<ItemTotal>,
}

fn export_discount(item: &order_item::Model) -> (String, String, String) {
    let kind = item.discount_person_type.clone().unwrap_or_default();
    let name = item.discount_person_name.clone().unwrap_or_default();
    let id = item.discount_person_id.clone().unwrap_or_default();

    if matches!(kind.to_lowercase().as_str(), "coupon" | "voucher") {
        let code = if id.is_empty() { "Code".to_string() } else { id };
        return ("Coupon".to_string(), name, code);
    }
    (kind, name, id)
}

/// Collects every order created in `range`, voided ones included, with its
/// lines. Lines whose menu item was deleted are skipped.
pub async fn export_rows(db: &DatabaseConnection, range: &DateRange) -> Result<OrderExport> {
    let orders = Order::find()
        .filter(range.condition())
        .order_by_asc(order::Column::CreatedAt)
        .order_by_asc(order::Column::Id)
        .all(db)
        .await?;
    let views = crate::core::order::load_order_views(db, orders).await?;

    let mut export = OrderExport::default();
    let mut totals_index: HashMap<String, usize> = HashMap::new();

    for view in views {
        let o = &view.order;
        let mut first = true;

        for line in &view.items {
            let Some(menu) = line.menu_item.as_ref() else {
                continue;
            };

            match totals_index.get(&menu.name) {
                Some(&i) => export.item_totals[i].total_quantity += i64::from(line.item.quantity),
                None => {
                    totals_index.insert(menu.name.clone(), export.item_totals.len());
                    export.item_totals.push(ItemTotal {
                        item: menu.name.clone(),
                        total_quantity: i64::from(line.item.quantity),
                    });
                }
            }

            let cells = first.then(|| {
                let (discount_type, discount_name, discount_id) = export_discount(&line.item);
                ExportOrderCells {
                    date: o.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    order_id: o.id,
                    order_type: if o.order_type.is_empty() {
                        "N/A".to_string()
                    } else {
                        o.order_type.clone()
                    },
                    discount_type,
                    discount_name,
                    discount_id,
                    total_discount: o.discount,
                    total_amount: o.total,
                    net_total: o.total - o.discount,
                    cashier: o.cashier.clone().unwrap_or_default(),
                }
            });
            first = false;

            export.rows.push(ExportRow {
                order: cells,
                item_name: menu.name.clone(),
                comments: line.item.notes.clone().unwrap_or_default(),
                quantity: line.item.quantity,
            });
        }
    }

    Ok(export)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::order::{self as orders, NewOrder, NewOrderItem};
    use crate::test_utils::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(date: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        date.and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_date_range() {
        let range = DateRange::parse("2025-03-01", "2025-03-31").unwrap();
        assert_eq!(range.start, day(2025, 3, 1));
        assert_eq!(range.ends_before(), at(day(2025, 4, 1), 0, 0));

        assert!(matches!(
            DateRange::parse("03/01/2025", "2025-03-31"),
            Err(Error::InvalidDate { .. })
        ));
        assert!(matches!(
            DateRange::parse("2025-03-31", "2025-03-01"),
            Err(Error::InvalidDateRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_range_returns_zeroes() -> Result<()> {
        let db = setup_test_db().await?;
        let range = DateRange::for_day(day(2025, 3, 14));

        let summary = sales_summary(&db, &range).await?;
        assert_eq!(summary, SalesSummary::default());
        assert_eq!(summary.total_paid, 0.0);
        assert_eq!(summary.orders_paid, 0);

        assert_eq!(dashboard_summary(&db, &range).await?, DashboardSummary::default());
        assert!(top_items(&db, &range, None).await?.is_empty());
        assert_eq!(daily_sales(&db, range.start).await?.total_orders, 0);
        assert_eq!(item_sales(&db, range.start, 1).await?.total_sales, 0);
        assert!(discount_usage(&db, Some(&range)).await?.is_empty());
        assert_eq!(export_rows(&db, &range).await?, OrderExport::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_sales_summary_splits_by_payment_and_type() -> Result<()> {
        let db = setup_test_db().await?;
        let sisig = create_test_menu_item(&db, "Sisig", 100.0).await?;
        let target = day(2025, 3, 14);

        let dine_in = create_test_order(&db, &[(sisig.id, 2)]).await?;
        orders::set_discount(&db, dine_in.order.id, 20.0).await?;
        orders::pay_order_in_year(&db, dine_in.order.id, 180.0, 2025).await?;
        backdate_order(&db, dine_in.order.id, at(target, 23, 59)).await?;

        let take_out = orders::create_order(
            &db,
            NewOrder {
                items: vec![NewOrderItem::new(sisig.id, 1)],
                order_type: Some("Take-Out".to_string()),
                paid_amount: Some(100.0),
                ..Default::default()
            },
        )
        .await?;
        backdate_order(&db, take_out.order.id, at(target, 8, 0)).await?;

        let unpaid = create_test_order(&db, &[(sisig.id, 3)]).await?;
        backdate_order(&db, unpaid.order.id, at(target, 12, 0)).await?;

        // Outside the range
        let next_day = create_test_order(&db, &[(sisig.id, 1)]).await?;
        orders::pay_order_in_year(&db, next_day.order.id, 100.0, 2025).await?;
        backdate_order(&db, next_day.order.id, at(day(2025, 3, 15), 0, 0)).await?;

        let summary = sales_summary(&db, &DateRange::for_day(target)).await?;
        assert_eq!(summary.orders_paid, 2);
        assert_eq!(summary.total_paid, 300.0);
        assert_eq!(summary.orders_unpaid, 1);
        assert_eq!(summary.total_unpaid, 300.0);
        assert_eq!(summary.total_discount, 20.0);
        assert_eq!(summary.dine_in_count, 1);
        assert_eq!(summary.dine_in_sales, 200.0);
        assert_eq!(summary.take_out_count, 1);
        assert_eq!(summary.take_out_sales, 100.0);
        assert_eq!(summary.void_orders, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_excludes_voided_orders() -> Result<()> {
        let db = setup_test_db().await?;
        let sisig = create_test_menu_item(&db, "Sisig", 100.0).await?;
        let beer = create_test_menu_item(&db, "Red Horse", 95.5).await?;
        let today = DateRange::today();

        let first = create_test_order(&db, &[(sisig.id, 1)]).await?;
        orders::set_discount(&db, first.order.id, 10.0).await?;
        orders::pay_order(&db, first.order.id, 90.0).await?;

        let second = create_test_order(&db, &[(beer.id, 1)]).await?;
        orders::pay_order(&db, second.order.id, 95.5).await?;

        let voided = create_test_order(&db, &[(sisig.id, 5)]).await?;
        orders::pay_order(&db, voided.order.id, 500.0).await?;
        orders::cancel_order(&db, voided.order.id, None).await?;

        let summary = dashboard_summary(&db, &today).await?;
        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.total_sales, 195.5);
        assert_eq!(summary.total_discount, 10.0);
        assert_eq!(summary.average_order_value, 97.75);
        assert_eq!(summary.void_orders, 1);

        assert_eq!(today_dashboard(&db).await?, summary);
        Ok(())
    }

    #[tokio::test]
    async fn test_top_items_ranked_by_quantity_then_name() -> Result<()> {
        let db = setup_test_db().await?;
        let beer = create_test_menu_item(&db, "Red Horse", 95.0).await?;
        let sisig = create_test_menu_item(&db, "Sisig", 180.0).await?;
        let fries = create_test_menu_item(&db, "Fries", 80.0).await?;
        let today = DateRange::today();

        let paid = create_test_order(&db, &[(beer.id, 3), (sisig.id, 2), (fries.id, 2)]).await?;
        orders::pay_order(&db, paid.order.id, 1000.0).await?;
        let also_paid = create_test_order(&db, &[(beer.id, 1)]).await?;
        orders::pay_order(&db, also_paid.order.id, 95.0).await?;
        // Unpaid orders do not count
        create_test_order(&db, &[(sisig.id, 10)]).await?;

        let top = top_items(&db, &today, None).await?;
        assert_eq!(
            top,
            vec![
                TopItem {
                    item: "Red Horse".to_string(),
                    total_sold: 4
                },
                TopItem {
                    item: "Fries".to_string(),
                    total_sold: 2
                },
                TopItem {
                    item: "Sisig".to_string(),
                    total_sold: 2
                },
            ]
        );

        let limited = top_items(&db, &today, Some(1)).await?;
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].item, "Red Horse");
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_and_item_sales() -> Result<()> {
        let db = setup_test_db().await?;
        let beer = create_test_menu_item(&db, "Red Horse", 95.0).await?;
        let sisig = create_test_menu_item(&db, "Sisig", 180.0).await?;
        let target = day(2025, 3, 14);

        let paid = create_test_order(&db, &[(beer.id, 2), (sisig.id, 1)]).await?;
        orders::pay_order_in_year(&db, paid.order.id, 370.0, 2025).await?;
        backdate_order(&db, paid.order.id, at(target, 19, 30)).await?;

        let second = create_test_order(&db, &[(beer.id, 1)]).await?;
        orders::pay_order_in_year(&db, second.order.id, 95.0, 2025).await?;
        backdate_order(&db, second.order.id, at(target, 21, 0)).await?;

        let unpaid = create_test_order(&db, &[(beer.id, 7)]).await?;
        backdate_order(&db, unpaid.order.id, at(target, 22, 0)).await?;

        let daily = daily_sales(&db, target).await?;
        assert_eq!(daily.total_orders, 2);
        assert_eq!(daily.total_sales, 465.0);

        assert_eq!(item_sales(&db, target, beer.id).await?.total_sales, 3);
        assert_eq!(item_sales(&db, target, sisig.id).await?.total_sales, 1);
        assert_eq!(
            item_sales(&db, day(2025, 3, 15), beer.id).await?.total_sales,
            0
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_discount_usage_counts_paid_lines() -> Result<()> {
        let db = setup_test_db().await?;
        let sisig = create_test_menu_item(&db, "Sisig", 100.0).await?;

        let line = |kind: &str| {
            let mut line = NewOrderItem::new(sisig.id, 1);
            line.discount_person_type = Some(kind.to_string());
            line
        };

        let paid = orders::create_order(
            &db,
            NewOrder {
                items: vec![
                    line("senior"),
                    line("senior"),
                    line("pwd"),
                    NewOrderItem::new(sisig.id, 1),
                ],
                paid_amount: Some(400.0),
                ..Default::default()
            },
        )
        .await?;
        assert!(paid.order.is_paid);

        orders::create_order(
            &db,
            NewOrder {
                items: vec![line("coupon")],
                ..Default::default()
            },
        )
        .await?;

        let usage = discount_usage(&db, None).await?;
        assert_eq!(
            usage,
            vec![
                DiscountUsage {
                    discount_type: "pwd".to_string(),
                    count: 1
                },
                DiscountUsage {
                    discount_type: "senior".to_string(),
                    count: 2
                },
            ]
        );

        let yesterday = DateRange::for_day(day(2020, 1, 1));
        assert!(discount_usage(&db, Some(&yesterday)).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_export_rows_fill_order_cells_once() -> Result<()> {
        let db = setup_test_db().await?;
        let beer = create_test_menu_item(&db, "Red Horse", 95.0).await?;
        let sisig = create_test_menu_item(&db, "Sisig", 180.0).await?;
        let gone = create_test_menu_item(&db, "Seasonal Ale", 150.0).await?;
        let target = day(2025, 3, 14);

        let mut coupon = NewOrderItem::new(gone.id, 1);
        coupon.discount_person_type = Some("Voucher".to_string());
        let mut first_line = NewOrderItem::new(beer.id, 2);
        first_line.discount_person_type = Some("coupon".to_string());
        first_line.discount_person_name = Some("Promo".to_string());
        let mut second_line = NewOrderItem::new(sisig.id, 1);
        second_line.notes = Some("extra crispy".to_string());

        let first = orders::create_order(
            &db,
            NewOrder {
                items: vec![coupon, first_line, second_line],
                discount: Some(50.0),
                cashier: Some("Ana".to_string()),
                ..Default::default()
            },
        )
        .await?;
        backdate_order(&db, first.order.id, at(target, 18, 5)).await?;

        let second = create_test_order(&db, &[(beer.id, 1)]).await?;
        orders::cancel_order(&db, second.order.id, None).await?;
        backdate_order(&db, second.order.id, at(target, 20, 0)).await?;

        crate::core::menu::delete_menu_item(&db, gone.id).await?;

        let export = export_rows(&db, &DateRange::for_day(target)).await?;
        assert_eq!(export.rows.len(), 3);

        let head = export.rows[0].order.as_ref().unwrap();
        assert_eq!(export.rows[0].item_name, "Red Horse");
        assert_eq!(head.date, "2025-03-14 18:05");
        assert_eq!(head.order_id, first.order.id);
        assert_eq!(head.order_type, "dine-in");
        assert_eq!(head.discount_type, "Coupon");
        assert_eq!(head.discount_name, "Promo");
        assert_eq!(head.discount_id, "Code");
        assert_eq!(head.total_discount, 50.0);
        assert_eq!(head.total_amount, 520.0);
        assert_eq!(head.net_total, 470.0);
        assert_eq!(head.cashier, "Ana");

        assert!(export.rows[1].order.is_none());
        assert_eq!(export.rows[1].comments, "extra crispy");

        // Voided orders are exported too
        assert_eq!(
            export.rows[2].order.as_ref().map(|c| c.order_id),
            Some(second.order.id)
        );

        assert_eq!(
            export.item_totals,
            vec![
                ItemTotal {
                    item: "Red Horse".to_string(),
                    total_quantity: 3
                },
                ItemTotal {
                    item: "Sisig".to_string(),
                    total_quantity: 1
                },
            ]
        );
        Ok(())
    }
}
