//! In-memory stores for tests/dev (used when no `DATABASE_URL` is configured).

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use storefront_core::{Entity, OrderId, ProductId};
use storefront_orders::Order;
use storefront_products::{NewProduct, Product};

use super::{OrderStore, ProductStore, StoreError};

/// Records keyed by id, remembering insertion order so listings are stable.
#[derive(Debug)]
struct Table<E: Entity> {
    rows: HashMap<E::Id, E>,
    order: Vec<E::Id>,
}

impl<E> Table<E>
where
    E: Entity + Clone,
{
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, record: E) -> Result<E, StoreError> {
        let id = *record.id();
        if self.rows.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("{id:?}")));
        }
        self.rows.insert(id, record.clone());
        self.order.push(id);
        Ok(record)
    }

    fn get(&self, id: &E::Id) -> Option<E> {
        self.rows.get(id).cloned()
    }

    fn all(&self) -> Vec<E> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id).cloned())
            .collect()
    }
}

fn poisoned() -> StoreError {
    StoreError::Storage("in-memory store lock poisoned".to_string())
}

/// In-memory product catalog.
#[derive(Debug)]
pub struct InMemoryProductStore {
    inner: RwLock<Table<Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Table::new()),
        }
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, product: NewProduct) -> Result<Product, StoreError> {
        let product = product.into_product(ProductId::new())?;
        self.inner.write().map_err(|_| poisoned())?.insert(product)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.inner.read().map_err(|_| poisoned())?.get(&id))
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        let mut found: Vec<Product> = Vec::with_capacity(ids.len());
        for id in ids {
            if found.iter().any(|p| p.id == *id) {
                continue;
            }
            if let Some(product) = table.get(id) {
                found.push(product);
            }
        }
        Ok(found)
    }

    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.inner.read().map_err(|_| poisoned())?.all())
    }
}

/// In-memory order store. An order and its items are inserted under one write lock.
#[derive(Debug)]
pub struct InMemoryOrderStore {
    inner: RwLock<Table<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Table::new()),
        }
    }

    /// Number of stored orders.
    pub fn len(&self) -> usize {
        self.inner.read().map(|t| t.order.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: Order) -> Result<Order, StoreError> {
        self.inner.write().map_err(|_| poisoned())?.insert(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.inner.read().map_err(|_| poisoned())?.get(&id))
    }

    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.inner.read().map_err(|_| poisoned())?.all())
    }
}
