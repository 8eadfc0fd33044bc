//! Spreadsheet export of the sales report.

pub mod xlsx;

use crate::{core::report::OrderExport, errors::Result};
use chrono::NaiveDate;
use xlsx::{Cell, Sheet, Workbook};

pub use xlsx::XLSX_CONTENT_TYPE;

const ORDERS_SHEET: &str = "Orders Report";
const TOTALS_SHEET: &str = "Item Totals";

const ORDERS_HEADER: [&str; 13] = [
    "Date",
    "Order #",
    "Order Type",
    "Order Item",
    "Comments",
    "Quantity Sold",
    "Discount Type",
    "Discount Name",
    "Discount ID",
    "Total Discount",
    "Total Amount",
    "Net Total",
    "Cashier",
];

/// File name offered for download, e.g.
/// `PubExpress_Sales_Report_2025-03-01_to_2025-03-31.xlsx`.
#[must_use]
pub fn export_file_name(start: NaiveDate, end: NaiveDate) -> String {
    format!("PubExpress_Sales_Report_{start}_to_{end}.xlsx")
}

/// Lays out the export as two sheets: one line per order item, then the units
/// sold per item.
#[must_use]
pub fn orders_workbook(export: &OrderExport) -> Workbook {
    let mut orders = Sheet::new(ORDERS_SHEET, "df4444", &ORDERS_HEADER);
    for row in &export.rows {
        let order = row.order.as_ref();
        let text = |value: Option<&String>| value.map_or(Cell::Empty, |v| Cell::Text(v.clone()));

        orders.push_row(vec![
            text(order.map(|o| &o.date)),
            order.map(|o| o.order_id).into(),
            text(order.map(|o| &o.order_type)),
            row.item_name.clone().into(),
            row.comments.clone().into(),
            row.quantity.into(),
            text(order.map(|o| &o.discount_type)),
            text(order.map(|o| &o.discount_name)),
            text(order.map(|o| &o.discount_id)),
            order.map(|o| o.total_discount).into(),
            order.map(|o| o.total_amount).into(),
            order.map(|o| o.net_total).into(),
            text(order.map(|o| &o.cashier)),
        ]);
    }

    let mut totals = Sheet::new(TOTALS_SHEET, "1dbfc1", &["Item", "Total Quantity Sold"]);
    for total in &export.item_totals {
        totals.push_row(vec![total.item.clone().into(), total.total_quantity.into()]);
    }

    let mut workbook = Workbook::new();
    workbook.add_sheet(orders);
    workbook.add_sheet(totals);
    workbook
}

/// Renders the export as `.xlsx` bytes.
///
/// # Errors
/// Returns an error if the archive cannot be written.
pub fn orders_xlsx(export: &OrderExport) -> Result<Vec<u8>> {
    orders_workbook(export).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::{ExportOrderCells, ExportRow, ItemTotal};

    fn sample_export() -> OrderExport {
        OrderExport {
            rows: vec![
                ExportRow {
                    order: Some(ExportOrderCells {
                        date: "2025-03-14 18:05".to_string(),
                        order_id: 12,
                        order_type: "dine-in".to_string(),
                        discount_type: "Coupon".to_string(),
                        discount_name: String::new(),
                        discount_id: "Code".to_string(),
                        total_discount: 50.0,
                        total_amount: 370.0,
                        net_total: 320.0,
                        cashier: "Ana".to_string(),
                    }),
                    item_name: "Red Horse".to_string(),
                    comments: String::new(),
                    quantity: 2,
                },
                ExportRow {
                    order: None,
                    item_name: "Sisig".to_string(),
                    comments: "extra crispy".to_string(),
                    quantity: 1,
                },
            ],
            item_totals: vec![
                ItemTotal {
                    item: "Red Horse".to_string(),
                    total_quantity: 2,
                },
                ItemTotal {
                    item: "Sisig".to_string(),
                    total_quantity: 1,
                },
            ],
        }
    }

    #[test]
    fn test_export_file_name() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1);
        let end = NaiveDate::from_ymd_opt(2025, 3, 31);
        if let (Some(start), Some(end)) = (start, end) {
            assert_eq!(
                export_file_name(start, end),
                "PubExpress_Sales_Report_2025-03-01_to_2025-03-31.xlsx"
            );
        }
    }

    #[test]
    fn test_orders_workbook_layout() {
        let workbook = orders_workbook(&sample_export());
        let sheets = workbook.sheets();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name(), "Orders Report");
        assert_eq!(sheets[1].name(), "Item Totals");

        let first = &sheets[0].rows()[0];
        assert_eq!(first.len(), ORDERS_HEADER.len());
        assert_eq!(first[1], Cell::Number(12.0));
        assert_eq!(first[6], Cell::Text("Coupon".to_string()));
        assert_eq!(first[11], Cell::Number(320.0));

        // Order-level cells stay blank on follow-up lines
        let second = &sheets[0].rows()[1];
        assert_eq!(second[0], Cell::Empty);
        assert_eq!(second[1], Cell::Empty);
        assert_eq!(second[3], Cell::Text("Sisig".to_string()));
        assert_eq!(second[4], Cell::Text("extra crispy".to_string()));
        assert_eq!(second[5], Cell::Number(1.0));
        assert_eq!(second[12], Cell::Empty);

        assert_eq!(
            sheets[1].rows(),
            &[
                vec![Cell::Text("Red Horse".to_string()), Cell::Number(2.0)],
                vec![Cell::Text("Sisig".to_string()), Cell::Number(1.0)],
            ]
        );
    }

    #[test]
    fn test_orders_xlsx_is_a_zip() -> Result<()> {
        let bytes = orders_xlsx(&sample_export())?;
        assert_eq!(&bytes[..2], b"PK");
        Ok(())
    }
}
