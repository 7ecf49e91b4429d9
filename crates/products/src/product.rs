use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, Money, ProductId};

/// Upper bound on product names (matches the `products.name` column).
pub const MAX_NAME_LEN: usize = 255;

/// Catalog record.
///
/// Read-only once created: there is no update or delete path in either service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payload for creating a product; the id is assigned at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    /// Check creation rules and normalise the name.
    pub fn validate(self) -> DomainResult<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "name cannot be longer than {MAX_NAME_LEN} characters"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            price: self.price,
        })
    }

    /// Validate and attach an identifier.
    pub fn into_product(self, id: ProductId) -> DomainResult<Product> {
        let valid = self.validate()?;
        Ok(Product {
            id,
            name: valid.name,
            price: valid.price,
        })
    }
}
