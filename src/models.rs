use chrono::{DateTime, Utc};
use diesel::{
    Selectable,
    prelude::{Identifiable, Insertable, Queryable},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Shops & catalog (read-only reference data during checkout)

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::shops)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShopEntity {
    pub id: i32,
    pub name: String,
    pub acronym: String,
    pub logo_url: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::merchandises)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MerchandiseEntity {
    pub id: i32,
    pub shop_id: i32,
    pub name: String,
    pub online_payment: bool,
    pub physical_payment: bool,
    pub receiving_information: String,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::variants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VariantEntity {
    pub id: i32,
    pub merch_id: i32,
    pub name: String,
    pub original_price: f32,
    pub membership_price: Option<f32>,
}

#[derive(Queryable, Selectable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::memberships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MembershipEntity {
    pub id: i32,
    pub email: String,
    pub shop_id: i32,
    pub created_at: DateTime<Utc>,
}

// Cart

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::cart_orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartOrderEntity {
    pub id: i32,
    pub user_id: Uuid,
    pub shop_id: i32,
    pub merch_id: i32,
    pub variant_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = crate::schema::cart_orders)]
pub struct CreateCartOrderEntity {
    pub user_id: Uuid,
    pub shop_id: i32,
    pub merch_id: i32,
    pub variant_id: i32,
    pub quantity: i32,
}

// Orders

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    pub user_id: Uuid,
    pub shop_id: i32,
    pub merch_id: i32,
    pub variant_id: i32,
    pub quantity: i32,
    pub price: f32,
    pub online_payment: bool,
    pub physical_payment: bool,
    pub status_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderEntity {
    pub user_id: Uuid,
    pub shop_id: i32,
    pub merch_id: i32,
    pub variant_id: i32,
    pub quantity: i32,
    pub price: f32,
    pub online_payment: bool,
    pub physical_payment: bool,
    pub status_id: i32,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::order_statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderStatusEntity {
    pub id: i32,
    pub paid: bool,
    pub received: bool,
    pub received_at: Option<DateTime<Utc>>,
    pub cancelled: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::order_statuses)]
pub struct CreateOrderStatusEntity {
    pub paid: bool,
}

// Payments & receipts (online path only)

#[derive(Queryable, Selectable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentEntity {
    pub id: Uuid,
    pub order_id: i32,
    pub picture_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::payments)]
pub struct CreatePaymentEntity {
    pub order_id: i32,
    pub picture_url: String,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::receipts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReceiptEntity {
    pub id: i32,
    pub order_id: i32,
    pub mobile_number: String,
    pub amount: f32,
    pub reference_number: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::receipts)]
pub struct CreateReceiptEntity {
    pub order_id: i32,
    pub mobile_number: String,
    pub amount: f32,
    pub reference_number: String,
}

// Notifications

#[derive(Queryable, Selectable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::shop_notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShopNotificationEntity {
    pub id: i32,
    pub shop_id: i32,
    pub order_id: i32,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::shop_notifications)]
pub struct CreateShopNotificationEntity {
    pub shop_id: i32,
    pub order_id: i32,
    pub message: String,
    pub seen: bool,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone, ToSchema)]
#[diesel(table_name = crate::schema::user_notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserNotificationEntity {
    pub id: i32,
    pub user_id: Uuid,
    pub order_id: i32,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::user_notifications)]
pub struct CreateUserNotificationEntity {
    pub user_id: Uuid,
    pub order_id: i32,
    pub message: String,
    pub seen: bool,
}
