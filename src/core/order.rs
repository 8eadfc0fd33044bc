//! Order business logic - Handles the order lifecycle.
//!
//! An order moves through `new`/`held` → `paid` → (optionally) `void`. Every
//! operation here runs in its own transaction: it reads the order, derives the
//! dependent fields (`total`, `is_paid`, `receipt_number`) and writes them back
//! before committing.
//!
//! Two derived values follow the rules the terminals rely on:
//! - `total` is the sum of `quantity * price` over the current line items.
//!   Per-item manual or coupon discounts are recorded but never subtracted.
//! - `is_paid` is `paid >= total - discount`, evaluated when an order is
//!   created and forced to `true` on payment. Changing the discount or saving a
//!   partial payment leaves it alone.

use crate::{
    core::receipt,
    entities::{MenuItem, Order, OrderItem, menu_item, order, order_item},
    errors::{Error, Result, ensure_amount, ensure_quantity},
};
use chrono::{Datelike, Local};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, instrument};

/// Order type used when the terminal does not send one.
pub const DEFAULT_ORDER_TYPE: &str = "dine-in";

/// Cancel reason used when the operator does not give one.
pub const DEFAULT_CANCEL_REASON: &str = "Canceled by user";

/// Lifecycle state stored in `orders.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Open order, items may still change
    New,
    /// Parked tab awaiting payment
    Held,
    /// Settled, receipt issued
    Paid,
    /// Canceled
    Void,
}

impl OrderStatus {
    /// Value stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Held => "held",
            Self::Paid => "paid",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a new order.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    /// Menu item to sell
    pub menu_item_id: i64,
    /// Units, at least 1
    pub quantity: i32,
    /// Name of the discount holder
    #[serde(default)]
    pub discount_person_name: Option<String>,
    /// ID card or coupon code
    #[serde(default)]
    pub discount_person_id: Option<String>,
    /// Discount category (senior, pwd, coupon, ...)
    #[serde(default)]
    pub discount_person_type: Option<String>,
    /// Manual discount kind
    #[serde(default)]
    pub manual_discount_type: Option<String>,
    /// Manual discount value
    #[serde(default)]
    pub manual_discount_value: Option<f64>,
    /// Notes for this line
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewOrderItem {
    /// A plain line with no discount or notes.
    #[must_use]
    pub const fn new(menu_item_id: i64, quantity: i32) -> Self {
        Self {
            menu_item_id,
            quantity,
            discount_person_name: None,
            discount_person_id: None,
            discount_person_type: None,
            manual_discount_type: None,
            manual_discount_value: None,
            notes: None,
        }
    }
}

/// Payload for creating or holding an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewOrder {
    /// Lines to ring up
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
    /// Order type, defaults to `dine-in`
    #[serde(default, rename = "type")]
    pub order_type: Option<String>,
    /// Order notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Amount tendered up front
    #[serde(default)]
    pub paid_amount: Option<f64>,
    /// Order-level discount
    #[serde(default)]
    pub discount: Option<f64>,
    /// Operator tag
    #[serde(default)]
    pub cashier: Option<String>,
}

/// Filters for [`list_orders`]. `None` means "any".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    /// Exact status to match
    #[serde(default)]
    pub status: Option<String>,
    /// Payment flag to match
    #[serde(default)]
    pub is_paid: Option<bool>,
}

/// A line item together with the menu item it sells. The menu item is `None`
/// for orphans whose menu entry was deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemView {
    /// The stored line
    #[serde(flatten)]
    pub item: order_item::Model,
    /// The menu item it references
    pub menu_item: Option<menu_item::Model>,
}

impl OrderItemView {
    /// `quantity * price`, or 0 for orphaned lines.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.menu_item
            .as_ref()
            .map_or(0.0, |m| line_total(m.price, self.item.quantity))
    }
}

/// An order with its line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    /// The stored order
    #[serde(flatten)]
    pub order: order::Model,
    /// Its line items
    pub items: Vec<OrderItemView>,
}

/// Result of marking an order paid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentReceipt {
    /// The paid order
    pub order_id: i64,
    /// Amount recorded as tendered
    pub paid: f64,
    /// Receipt printed for the order
    pub receipt_number: Option<String>,
}

/// Contribution of one line to the order total.
#[must_use]
pub fn line_total(price: f64, quantity: i32) -> f64 {
    price * f64::from(quantity)
}

/// Whether `paid` covers the amount due after the order-level discount.
#[must_use]
pub fn is_settled(paid: f64, total: f64, discount: f64) -> bool {
    paid >= total - discount
}

fn now_local() -> chrono::NaiveDateTime {
    Local::now().naive_local()
}

async fn find_order<C>(db: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })
}

async fn find_menu_item<C>(db: &C, menu_item_id: i64) -> Result<menu_item::Model>
where
    C: ConnectionTrait,
{
    MenuItem::find_by_id(menu_item_id)
        .one(db)
        .await?
        .ok_or(Error::MenuItemNotFound { id: menu_item_id })
}

async fn find_order_item<C>(db: &C, order_id: i64, item_id: i64) -> Result<order_item::Model>
where
    C: ConnectionTrait,
{
    OrderItem::find_by_id(item_id)
        .filter(order_item::Column::OrderId.eq(order_id))
        .one(db)
        .await?
        .ok_or(Error::OrderItemNotFound { order_id, item_id })
}

/// Attaches line items and their menu items to each order, keeping order.
pub(crate) async fn load_order_views<C>(
    db: &C,
    orders: Vec<order::Model>,
) -> Result<Vec<OrderView>>
where
    C: ConnectionTrait,
{
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;

    let mut menu_ids: Vec<i64> = items.iter().map(|i| i.menu_item_id).collect();
    menu_ids.sort_unstable();
    menu_ids.dedup();
    let menu: HashMap<i64, menu_item::Model> = MenuItem::find()
        .filter(menu_item::Column::Id.is_in(menu_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let mut by_order: HashMap<i64, Vec<OrderItemView>> = HashMap::new();
    for item in items {
        let menu_item = menu.get(&item.menu_item_id).cloned();
        by_order
            .entry(item.order_id)
            .or_default()
            .push(OrderItemView { item, menu_item });
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            OrderView { order, items }
        })
        .collect())
}

async fn load_order_view<C>(db: &C, order: order::Model) -> Result<OrderView>
where
    C: ConnectionTrait,
{
    let order_id = order.id;
    load_order_views(db, vec![order])
        .await?
        .pop()
        .ok_or(Error::OrderNotFound { id: order_id })
}

/// Sum of `quantity * price` over the order's current lines.
async fn recompute_total<C>(db: &C, order_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .all(db)
        .await?;
    let menu_ids: Vec<i64> = items.iter().map(|i| i.menu_item_id).collect();
    let prices: HashMap<i64, f64> = MenuItem::find()
        .filter(menu_item::Column::Id.is_in(menu_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|m| (m.id, m.price))
        .collect();

    // Lines whose menu item was deleted contribute nothing
    Ok(items
        .iter()
        .map(|item| {
            prices
                .get(&item.menu_item_id)
                .map_or(0.0, |price| line_total(*price, item.quantity))
        })
        .sum())
}

fn line_active_model(order_id: i64, line: NewOrderItem) -> order_item::ActiveModel {
    order_item::ActiveModel {
        order_id: Set(order_id),
        menu_item_id: Set(line.menu_item_id),
        quantity: Set(line.quantity),
        discount_person_name: Set(line.discount_person_name),
        discount_person_id: Set(line.discount_person_id),
        discount_person_type: Set(line.discount_person_type),
        manual_discount_type: Set(line.manual_discount_type),
        manual_discount_value: Set(line.manual_discount_value.unwrap_or(0.0)),
        notes: Set(line.notes),
        ..Default::default()
    }
}

/// Creates an order with its line items and settles `is_paid` from the amount
/// tendered.
///
/// # Errors
/// - `MenuItemNotFound` if any line references a missing menu item
/// - `InvalidQuantity` / `InvalidAmount` for bad quantities, discount or payment
#[instrument(skip(db, new_order), fields(items = new_order.items.len()))]
pub async fn create_order(db: &DatabaseConnection, new_order: NewOrder) -> Result<OrderView> {
    let discount = ensure_amount("discount", new_order.discount.unwrap_or(0.0))?;
    let paid = ensure_amount("paid_amount", new_order.paid_amount.unwrap_or(0.0))?;
    for line in &new_order.items {
        ensure_quantity(line.quantity)?;
    }

    let txn = db.begin().await?;

    let mut total = 0.0;
    for line in &new_order.items {
        let menu_item = find_menu_item(&txn, line.menu_item_id).await?;
        total += line_total(menu_item.price, line.quantity);
    }

    let order = order::ActiveModel {
        created_at: Set(now_local()),
        total: Set(total),
        discount: Set(discount),
        paid: Set(paid),
        is_paid: Set(is_settled(paid, total, discount)),
        order_type: Set(new_order
            .order_type
            .unwrap_or_else(|| DEFAULT_ORDER_TYPE.to_string())),
        notes: Set(new_order.notes),
        cancel_reason: Set(None),
        status: Set(OrderStatus::New.to_string()),
        receipt_number: Set(None),
        cashier: Set(new_order.cashier),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for line in new_order.items {
        line_active_model(order.id, line).insert(&txn).await?;
    }

    let view = load_order_view(&txn, order).await?;
    txn.commit().await?;

    info!(
        order_id = view.order.id,
        total = view.order.total,
        is_paid = view.order.is_paid,
        "order created"
    );
    Ok(view)
}

/// Opens an empty order (a running tab) to which items are added one by one.
#[instrument(skip(db))]
pub async fn create_empty_order(db: &DatabaseConnection) -> Result<order::Model> {
    let order = order::ActiveModel {
        created_at: Set(now_local()),
        total: Set(0.0),
        discount: Set(0.0),
        paid: Set(0.0),
        is_paid: Set(false),
        order_type: Set(DEFAULT_ORDER_TYPE.to_string()),
        notes: Set(None),
        cancel_reason: Set(None),
        status: Set(OrderStatus::New.to_string()),
        receipt_number: Set(None),
        cashier: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(order_id = order.id, "empty order opened");
    Ok(order)
}

/// Appends a line to an order and adds its contribution to the total.
///
/// # Errors
/// - `OrderNotFound` / `MenuItemNotFound` if either record is missing
/// - `InvalidQuantity` if `quantity` is below 1
#[instrument(skip(db))]
pub async fn add_item(
    db: &DatabaseConnection,
    order_id: i64,
    menu_item_id: i64,
    quantity: i32,
) -> Result<OrderItemView> {
    ensure_quantity(quantity)?;

    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;
    let menu_item = find_menu_item(&txn, menu_item_id).await?;

    let item = line_active_model(order_id, NewOrderItem::new(menu_item_id, quantity))
        .insert(&txn)
        .await?;

    let new_total = order.total + line_total(menu_item.price, quantity);
    let mut active: order::ActiveModel = order.into();
    active.total = Set(new_total);
    active.update(&txn).await?;

    txn.commit().await?;

    info!(order_id, item_id = item.id, total = new_total, "item added");
    Ok(OrderItemView {
        item,
        menu_item: Some(menu_item),
    })
}

/// Changes a line's quantity and recomputes the order total from all lines.
///
/// # Errors
/// - `OrderItemNotFound` if the line is missing or belongs to another order
/// - `InvalidQuantity` if `quantity` is below 1
#[instrument(skip(db))]
pub async fn update_item_quantity(
    db: &DatabaseConnection,
    order_id: i64,
    item_id: i64,
    quantity: i32,
) -> Result<order::Model> {
    ensure_quantity(quantity)?;

    let txn = db.begin().await?;
    let item = find_order_item(&txn, order_id, item_id).await?;
    let order = find_order(&txn, order_id).await?;

    let mut active_item: order_item::ActiveModel = item.into();
    active_item.quantity = Set(quantity);
    active_item.update(&txn).await?;

    let total = recompute_total(&txn, order_id).await?;
    let mut active: order::ActiveModel = order.into();
    active.total = Set(total);
    let order = active.update(&txn).await?;

    txn.commit().await?;

    info!(order_id, item_id, quantity, total, "item quantity updated");
    Ok(order)
}

/// Removes a line and subtracts its contribution from the total.
///
/// # Errors
/// Returns `OrderItemNotFound` if the line is missing or belongs to another order.
#[instrument(skip(db))]
pub async fn remove_item(
    db: &DatabaseConnection,
    order_id: i64,
    item_id: i64,
) -> Result<order::Model> {
    let txn = db.begin().await?;
    let item = find_order_item(&txn, order_id, item_id).await?;
    let order = find_order(&txn, order_id).await?;

    let contribution = MenuItem::find_by_id(item.menu_item_id)
        .one(&txn)
        .await?
        .map_or(0.0, |m| line_total(m.price, item.quantity));

    item.delete(&txn).await?;

    let total = (order.total - contribution).max(0.0);
    let mut active: order::ActiveModel = order.into();
    active.total = Set(total);
    let order = active.update(&txn).await?;

    txn.commit().await?;

    info!(order_id, item_id, total, "item removed");
    Ok(order)
}

/// Sets the order-level discount. `is_paid` is not re-evaluated.
///
/// # Errors
/// - `OrderNotFound` if the order is missing
/// - `InvalidAmount` if the discount is negative
#[instrument(skip(db))]
pub async fn set_discount(
    db: &DatabaseConnection,
    order_id: i64,
    discount: f64,
) -> Result<order::Model> {
    let discount = ensure_amount("discount", discount)?;

    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;
    let mut active: order::ActiveModel = order.into();
    active.discount = Set(discount);
    let order = active.update(&txn).await?;
    txn.commit().await?;

    info!(order_id, discount, "discount updated");
    Ok(order)
}

/// Parks a tab with `status = held`.
///
/// Lines are stored with menu item and quantity only and the total stays 0
/// until the tab is edited.
///
/// # Errors
/// - `MenuItemNotFound` if any line references a missing menu item
/// - `InvalidQuantity` for quantities below 1
#[instrument(skip(db, new_order), fields(items = new_order.items.len()))]
pub async fn hold_order(db: &DatabaseConnection, new_order: NewOrder) -> Result<order::Model> {
    for line in &new_order.items {
        ensure_quantity(line.quantity)?;
    }

    let txn = db.begin().await?;
    for line in &new_order.items {
        find_menu_item(&txn, line.menu_item_id).await?;
    }

    let order = order::ActiveModel {
        created_at: Set(now_local()),
        total: Set(0.0),
        discount: Set(0.0),
        paid: Set(0.0),
        is_paid: Set(false),
        order_type: Set(new_order
            .order_type
            .unwrap_or_else(|| DEFAULT_ORDER_TYPE.to_string())),
        notes: Set(new_order.notes),
        cancel_reason: Set(None),
        status: Set(OrderStatus::Held.to_string()),
        receipt_number: Set(None),
        cashier: Set(new_order.cashier),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for line in new_order.items {
        line_active_model(order.id, NewOrderItem::new(line.menu_item_id, line.quantity))
            .insert(&txn)
            .await?;
    }

    txn.commit().await?;

    info!(order_id = order.id, "order held");
    Ok(order)
}

/// Marks an order paid in the current calendar year.
///
/// See [`pay_order_in_year`].
///
/// # Errors
/// - `OrderNotFound` if the order is missing
/// - `InvalidAmount` if `paid` is negative
pub async fn pay_order(
    db: &DatabaseConnection,
    order_id: i64,
    paid: f64,
) -> Result<PaymentReceipt> {
    pay_order_in_year(db, order_id, paid, Local::now().year()).await
}

/// Records the payment, sets `is_paid` and `status = paid`, and allocates a
/// receipt number for `year` unless the order already has one.
///
/// # Errors
/// - `OrderNotFound` if the order is missing
/// - `InvalidAmount` if `paid` is negative
#[instrument(skip(db))]
pub async fn pay_order_in_year(
    db: &DatabaseConnection,
    order_id: i64,
    paid: f64,
    year: i32,
) -> Result<PaymentReceipt> {
    let paid = ensure_amount("paid", paid)?;

    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;

    let receipt_number = match order.receipt_number.clone() {
        Some(existing) => {
            debug!(order_id, %existing, "order already has a receipt number");
            existing
        }
        None => receipt::allocate_receipt_number(&txn, year).await?,
    };

    let mut active: order::ActiveModel = order.into();
    active.paid = Set(paid);
    active.is_paid = Set(true);
    active.status = Set(OrderStatus::Paid.to_string());
    active.receipt_number = Set(Some(receipt_number));
    let order = active.update(&txn).await?;

    txn.commit().await?;

    info!(order_id, paid, receipt_number = ?order.receipt_number, "order paid");
    Ok(PaymentReceipt {
        order_id,
        paid: order.paid,
        receipt_number: order.receipt_number,
    })
}

/// Records a partial payment without touching `status` or `is_paid`.
///
/// # Errors
/// - `OrderNotFound` if the order is missing
/// - `AlreadyPaid` if a positive payment already covers the total
/// - `InvalidAmount` if `paid` is negative
#[instrument(skip(db))]
pub async fn save_unpaid(
    db: &DatabaseConnection,
    order_id: i64,
    paid: f64,
) -> Result<order::Model> {
    let paid = ensure_amount("paid", paid)?;

    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;
    if order.paid > 0.0 && order.paid >= order.total {
        return Err(Error::AlreadyPaid { order_id });
    }

    let mut active: order::ActiveModel = order.into();
    active.paid = Set(paid);
    let order = active.update(&txn).await?;
    txn.commit().await?;

    info!(order_id, paid, "partial payment saved");
    Ok(order)
}

/// Voids an order: records the reason and clears the payment.
///
/// The receipt number, if any, stays on the order and is never reissued.
///
/// # Errors
/// Returns `OrderNotFound` if the order is missing.
#[instrument(skip(db))]
pub async fn cancel_order(
    db: &DatabaseConnection,
    order_id: i64,
    reason: Option<String>,
) -> Result<order::Model> {
    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_CANCEL_REASON.to_string());

    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;
    let mut active: order::ActiveModel = order.into();
    active.cancel_reason = Set(Some(reason));
    active.status = Set(OrderStatus::Void.to_string());
    active.is_paid = Set(false);
    active.paid = Set(0.0);
    let order = active.update(&txn).await?;
    txn.commit().await?;

    info!(order_id, reason = ?order.cancel_reason, "order canceled");
    Ok(order)
}

/// Clears the cancel reason of a voided order. The status stays `void`.
///
/// # Errors
/// - `OrderNotFound` if the order is missing
/// - `NotCanceled` if the order has no cancel reason
#[instrument(skip(db))]
pub async fn restore_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;
    if order.cancel_reason.as_deref().is_none_or(str::is_empty) {
        return Err(Error::NotCanceled { order_id });
    }

    let mut active: order::ActiveModel = order.into();
    active.cancel_reason = Set(None);
    let order = active.update(&txn).await?;
    txn.commit().await?;

    info!(order_id, "order restored");
    Ok(order)
}

/// Permanently removes an order and all of its lines.
///
/// # Errors
/// Returns `OrderNotFound` if the order is missing.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;

    let removed = OrderItem::delete_many()
        .filter(order_item::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    order.delete(&txn).await?;
    txn.commit().await?;

    info!(order_id, items = removed.rows_affected, "order deleted");
    Ok(())
}

/// Lists orders, newest first, optionally filtered by status and payment flag.
/// Without filters voided orders are included.
pub async fn list_orders(db: &DatabaseConnection, filter: &OrderFilter) -> Result<Vec<OrderView>> {
    let mut query = Order::find();
    if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(order::Column::Status.eq(status));
    }
    if let Some(is_paid) = filter.is_paid {
        query = query.filter(order::Column::IsPaid.eq(is_paid));
    }

    let orders = query.order_by_desc(order::Column::Id).all(db).await?;
    load_order_views(db, orders).await
}

/// Loads one order with its lines.
///
/// # Errors
/// Returns `OrderNotFound` if the order is missing.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<OrderView> {
    let order = find_order(db, order_id).await?;
    load_order_view(db, order).await
}

/// Loads the lines of one order.
///
/// # Errors
/// Returns `OrderNotFound` if the order is missing.
pub async fn get_order_items(db: &DatabaseConnection, order_id: i64) -> Result<Vec<OrderItemView>> {
    Ok(get_order(db, order_id).await?.items)
}
