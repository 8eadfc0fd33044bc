//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cashier;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod receipt_counter;
pub mod setting;
pub mod supervisor;

// Re-export specific types to avoid conflicts
pub use cashier::{Column as CashierColumn, Entity as Cashier, Model as CashierModel};
pub use menu_item::{Column as MenuItemColumn, Entity as MenuItem, Model as MenuItemModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use receipt_counter::{
    Column as ReceiptCounterColumn, Entity as ReceiptCounter, Model as ReceiptCounterModel,
};
pub use setting::{Column as SettingColumn, Entity as Setting, Model as SettingModel};
pub use supervisor::{Column as SupervisorColumn, Entity as Supervisor, Model as SupervisorModel};
