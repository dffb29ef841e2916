use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::models::order::{Order, OrderItem, OrderStatus};
use crate::types::{Page, PageQuery};

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found")]
    NotFound,
    #[error("Not the owner of this order")]
    Forbidden,
    #[error("An order requires at least one item")]
    EmptyOrder,
    #[error("Order is not pending")]
    NotPending,
    #[error("Course not found")]
    CourseNotFound,
    #[error("Price option not found")]
    PriceOptionNotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct OrderItemRequest {
    pub course_id: Uuid,
    pub price_option_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Purchase joined with its course title, with remaining session count.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct PurchaseSummary {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    pub quantity_total: i32,
    pub quantity_used: i32,
    pub quantity_remaining: i32,
    pub created_at: DateTime<Utc>,
}

/// Order numbers are date-prefixed with a random suffix, unique by table
/// constraint.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("ORD-{}-{}", now.format("%Y%m%d"), suffix)
}

pub struct OrderService {
    pool: PgPool,
}

impl OrderService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending order, snapshotting the course title and price of
    /// every item at order time.
    pub async fn create(
        &self,
        user_id: Uuid,
        items: &[OrderItemRequest],
    ) -> Result<OrderDetail, OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        // Resolve snapshots before opening the transaction
        let mut snapshots = Vec::with_capacity(items.len());
        for item in items {
            let row: Option<(String, i64, i32)> = sqlx::query_as(
                r#"
                SELECT c.title, o.price, o.quantity
                FROM course_price_options o
                JOIN courses c ON c.id = o.course_id
                WHERE o.id = $1 AND c.id = $2 AND c.is_active = TRUE AND c.deleted_at IS NULL
                "#,
            )
            .bind(item.price_option_id)
            .bind(item.course_id)
            .fetch_optional(&self.pool)
            .await?;

            let (title, price, quantity) = row.ok_or(OrderError::PriceOptionNotFound)?;
            snapshots.push((item, title, price, quantity));
        }

        let total: i64 = snapshots.iter().map(|(_, _, price, _)| price).sum();
        let order_id = Uuid::new_v4();
        let order_number = generate_order_number(Utc::now());

        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (id, user_id, order_number, total_amount)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(user_id)
        .bind(&order_number)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        let mut order_items = Vec::with_capacity(snapshots.len());
        for (item, title, price, quantity) in snapshots {
            let order_item = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (id, order_id, course_id, price_option_id, course_title, price, quantity)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(item.course_id)
            .bind(item.price_option_id)
            .bind(title)
            .bind(price)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await?;
            order_items.push(order_item);
        }

        tx.commit().await?;

        tracing::info!("Order {} created for user {}", order_number, user_id);
        Ok(OrderDetail {
            order,
            items: order_items,
        })
    }

    pub async fn list(&self, user_id: Uuid, page: &PageQuery) -> Result<Page<Order>, OrderError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, page))
    }

    pub async fn detail(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderDetail, OrderError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(OrderError::NotFound)?;

        if order.user_id != user_id {
            return Err(OrderError::Forbidden);
        }

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(OrderDetail { order, items })
    }

    /// Mark a pending order paid and mint one purchase per item, all in one
    /// transaction.
    pub async fn pay(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderDetail, OrderError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(OrderError::NotFound)?;

        if order.user_id != user_id {
            return Err(OrderError::Forbidden);
        }
        if order.status != OrderStatus::Pending {
            return Err(OrderError::NotPending);
        }

        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = 'paid', paid_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO user_course_purchases (id, user_id, course_id, order_item_id, quantity_total)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(item.course_id)
            .bind(item.id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!("Order {} paid, {} purchases created", order.order_number, items.len());
        Ok(OrderDetail { order, items })
    }

    /// Cancel a pending order. Paid orders are immutable.
    pub async fn cancel(&self, user_id: Uuid, order_id: Uuid) -> Result<(), OrderError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(OrderError::NotFound)?;

        if order.user_id != user_id {
            return Err(OrderError::Forbidden);
        }
        if order.status != OrderStatus::Pending {
            return Err(OrderError::NotPending);
        }

        sqlx::query("UPDATE orders SET status = 'canceled', canceled_at = now() WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn purchases(
        &self,
        user_id: Uuid,
        page: &PageQuery,
    ) -> Result<Page<PurchaseSummary>, OrderError> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_course_purchases WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, PurchaseSummary>(
            r#"
            SELECT p.id, p.course_id, c.title AS course_title,
                   p.quantity_total, p.quantity_used,
                   p.quantity_total - p.quantity_used AS quantity_remaining,
                   p.created_at
            FROM user_course_purchases p
            JOIN courses c ON c.id = p.course_id
            WHERE p.user_id = $1
            ORDER BY p.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_shape() {
        let now = "2026-08-29T10:00:00Z".parse().unwrap();
        let number = generate_order_number(now);
        assert!(number.starts_with("ORD-20260829-"));
        assert_eq!(number.len(), "ORD-20260829-".len() + 6);
    }

    #[test]
    fn order_numbers_are_unlikely_to_collide() {
        let now = Utc::now();
        let a = generate_order_number(now);
        let b = generate_order_number(now);
        // Same prefix, random suffix
        assert_eq!(&a[..13], &b[..13]);
        assert_ne!(a, b);
    }
}
