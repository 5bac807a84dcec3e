use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{PgBackend, corrupt};
use crate::order::{NewOrder, Order, OrderItem, OrderNumber, OrderStatusUpdate};
use crate::repository::{OrderRepository, RepositoryError};
use crate::types::{OrderId, OrderStatus, PaymentStatus, Price};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    items: serde_json::Value,
    total_amount: i64,
    status: String,
    payment_status: String,
    payment_method: Option<String>,
    payment_transaction_id: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderId::new(row.id),
            order_number: OrderNumber::from(row.order_number),
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            customer_email: row.customer_email,
            items: OrderItem::decode_stored(row.items).map_err(|e| corrupt("order items", e))?,
            total_amount: Price::new(row.total_amount).map_err(|e| corrupt("order total", e))?,
            status: row
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt("order row", e))?,
            payment_status: row
                .payment_status
                .parse::<PaymentStatus>()
                .map_err(|e| corrupt("order row", e))?,
            payment_method: row.payment_method,
            payment_transaction_id: row.payment_transaction_id,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Items as the `items` JSON column stores them.
fn encode_items<T: serde::Serialize + ?Sized>(
    items: &T,
) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(items).map_err(|e| corrupt("unserializable order items", e))
}

const COLUMNS: &str = "id, order_number, customer_name, customer_phone, customer_email, \
                       items, total_amount, status, payment_status, payment_method, \
                       payment_transaction_id, notes, created_at, updated_at";

#[async_trait]
impl OrderRepository for PgBackend {
    #[tracing::instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let items = encode_items(&order.items)?;

        let row: OrderRow = sqlx::query_as(&format!(
            r"
            INSERT INTO orders
                (order_number, customer_name, customer_phone, customer_email,
                 items, total_amount, status, payment_status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "
        ))
        .bind(order.order_number.as_str())
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_email)
        .bind(items)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(&order.notes)
        .fetch_one(self.pool())
        .await?;

        row.try_into()
    }

    #[tracing::instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool())
                .await?;

        row.map(Order::try_from).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn update_order_status(
        &self,
        id: OrderId,
        update: OrderStatusUpdate,
    ) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r"
            UPDATE orders
            SET status = $2,
                payment_status = COALESCE($3, payment_status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        ))
        .bind(id)
        .bind(update.status.as_str())
        .bind(update.payment_status.map(PaymentStatus::as_str))
        .fetch_optional(self.pool())
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    #[tracing::instrument(skip(self))]
    async fn delete_order(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_unserializable_items_are_not_a_conflict() {
        let items = HashMap::from([((1_u8, 2_u8), 3_u8)]);
        assert!(matches!(
            encode_items(&items),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
