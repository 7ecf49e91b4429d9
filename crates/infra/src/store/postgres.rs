//! Postgres-backed stores.
//!
//! Amounts are stored as `BIGINT` minor units. An order header and its items are
//! written inside one transaction; items keep their position in `line_no`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (check constraint violation) | `23514` | `Corrupt` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed / Io / Tls / other | N/A | `Storage` |

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use storefront_core::{Money, OrderId, OrderItemId, ProductId};
use storefront_orders::{Order, OrderItem};
use storefront_products::{NewProduct, Product};

use super::{OrderStore, ProductStore, StoreError};
use crate::config::DatabaseConfig;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        price_minor BIGINT NOT NULL CHECK (price_minor >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        order_date TIMESTAMPTZ NOT NULL,
        total_minor BIGINT NOT NULL CHECK (total_minor >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_items (
        id UUID PRIMARY KEY,
        order_id UUID NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
        line_no INTEGER NOT NULL,
        product_id UUID NOT NULL,
        product_name VARCHAR(255) NOT NULL,
        price_minor BIGINT NOT NULL CHECK (price_minor >= 0),
        quantity BIGINT NOT NULL CHECK (quantity > 0),
        UNIQUE (order_id, line_no)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS order_items_order_id_idx ON order_items (order_id)",
];

/// Open a connection pool.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create the tables both services use, if missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(*statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                Some("23514") => StoreError::Corrupt(msg),
                _ => StoreError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Storage(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn to_db_amount(amount: Money) -> Result<i64, StoreError> {
    i64::try_from(amount.minor_units())
        .map_err(|_| StoreError::Corrupt(format!("amount {amount} does not fit in BIGINT")))
}

fn from_db_amount(raw: i64) -> Result<Money, StoreError> {
    u64::try_from(raw)
        .map(Money::from_minor_units)
        .map_err(|_| StoreError::Corrupt(format!("negative amount {raw}")))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::Corrupt(format!("column {name}: {e}")))
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: ProductId::from_uuid(column(row, "id")?),
        name: column(row, "name")?,
        price: from_db_amount(column(row, "price_minor")?)?,
    })
}

/// Postgres-backed product catalog.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self, product), err)]
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        let product = product.into_product(ProductId::new())?;

        sqlx::query("INSERT INTO products (id, name, price_minor) VALUES ($1, $2, $3)")
            .bind(product.id.as_uuid())
            .bind(&product.name)
            .bind(to_db_amount(product.price)?)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_product", e))?;

        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, name, price_minor FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = sqlx::query(
            "SELECT id, name, price_minor FROM products WHERE id = ANY($1) ORDER BY created_at, id",
        )
        .bind(uuids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_products_by_ids", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT id, name, price_minor FROM products ORDER BY created_at, id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter().map(product_from_row).collect()
    }
}

/// Postgres-backed order store.
#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: Arc<PgPool>,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn load_items(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderItem>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, product_name, price_minor, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, line_no
            "#,
        )
        .bind(order_ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_order_items", e))?;

        let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in &rows {
            let order_id: Uuid = column(row, "order_id")?;
            let quantity: i64 = column(row, "quantity")?;
            let item = OrderItem {
                id: OrderItemId::from_uuid(column(row, "id")?),
                product_id: ProductId::from_uuid(column(row, "product_id")?),
                product_name: column(row, "product_name")?,
                price: from_db_amount(column(row, "price_minor")?)?,
                quantity: u32::try_from(quantity)
                    .map_err(|_| StoreError::Corrupt(format!("quantity {quantity} out of range")))?,
            };
            items.entry(order_id).or_default().push(item);
        }
        Ok(items)
    }

    async fn hydrate(&self, rows: Vec<PgRow>) -> Result<Vec<Order>, StoreError> {
        let ids = rows
            .iter()
            .map(|row| column::<Uuid>(row, "id"))
            .collect::<Result<Vec<_>, _>>()?;
        let mut items = self.load_items(&ids).await?;

        rows.iter()
            .zip(ids)
            .map(|(row, id)| -> Result<Order, StoreError> {
                let order_date: DateTime<Utc> = column(row, "order_date")?;
                let total = from_db_amount(column(row, "total_minor")?)?;
                Ok(Order::restore(
                    OrderId::from_uuid(id),
                    order_date,
                    total,
                    items.remove(&id).unwrap_or_default(),
                ))
            })
            .collect()
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(skip(self, order), fields(order_id = %order.id_typed(), items = order.items().len()), err)]
    async fn create(&self, order: Order) -> Result<Order, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("INSERT INTO orders (id, order_date, total_minor) VALUES ($1, $2, $3)")
            .bind(order.id_typed().as_uuid())
            .bind(order.order_date())
            .bind(to_db_amount(order.total())?)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order", e))?;

        for (line_no, item) in order.items().iter().enumerate() {
            let line_no = i32::try_from(line_no)
                .map_err(|_| StoreError::Corrupt("too many order items".to_string()))?;
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, line_no, product_id, product_name, price_minor, quantity
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(order.id_typed().as_uuid())
            .bind(line_no)
            .bind(item.product_id.as_uuid())
            .bind(&item.product_name)
            .bind(to_db_amount(item.price)?)
            .bind(i64::from(item.quantity))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order_item", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(order)
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let rows = sqlx::query("SELECT id, order_date, total_minor FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_order", e))?;

        Ok(self.hydrate(rows).await?.into_iter().next())
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query("SELECT id, order_date, total_minor FROM orders ORDER BY order_date, id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_orders", e))?;

        self.hydrate(rows).await
    }
}
