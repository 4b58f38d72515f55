//! Domain models for the Melula API.
//!
//! These are the JSON-facing shapes. Field names serialize as camelCase to
//! match what the web client consumes.

pub mod address;
pub mod admin;
pub mod cart;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use address::{Address, CreateAddress, UpdateAddress};
pub use admin::{DashboardStats, ExportData};
pub use cart::{AddToCart, CartItem, CartItemWithProduct, UpdateCartItem};
pub use order::{
    Order, OrderItem, OrderItemWithProduct, OrderLineInput, OrderWithItems, PlaceOrderRequest,
    ShippingAddress,
};
pub use product::{
    Category, CreateCategory, CreateProduct, Product, ProductFilter, ProductSort, SortOrder,
    UpdateCategory, UpdateProduct,
};
pub use review::{CreateReview, Review, ReviewAuthor, ReviewWithAuthor};
pub use user::{RegisterUser, UpdateProfile, User};
