//! Admin dashboard and export models.

use rust_decimal::Decimal;
use serde::Serialize;

use super::order::OrderWithItems;
use super::product::{Category, Product};
use super::review::Review;
use super::user::User;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Sum of `total` across paid orders.
    pub total_revenue: Decimal,
    pub total_orders: i64,
    pub total_users: i64,
    pub total_products: i64,
    /// Active products with stock at or below the low-stock threshold.
    pub low_stock_products: i64,
}

/// Full data export for backup/offline analysis.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub orders: Vec<OrderWithItems>,
    pub reviews: Vec<Review>,
}
