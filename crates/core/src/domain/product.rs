use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::InventoryError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Checks the record-level invariants. Seed data and merged updates go
    /// through here before they reach a collection.
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.id.0.trim().is_empty() {
            return Err(InventoryError::invalid("id must not be empty"));
        }
        validate_fields(&self.name, &self.category, self.price)
    }
}

/// Fields for an administrative add. The id is assigned by the mutator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl ProductDraft {
    pub fn into_product(self, id: ProductId) -> Result<Product, InventoryError> {
        let name = self.name.trim().to_owned();
        let category = self.category.trim().to_owned();
        validate_fields(&name, &category, self.price)?;
        let quantity = quantity_from(self.quantity)?;

        Ok(Product {
            id,
            name,
            category,
            price: self.price,
            quantity,
            description: optional_text(self.description),
            image: optional_text(self.image),
        })
    }
}

/// Fields for an edit. `None` keeps the current value; a blank description
/// or image clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Produces the merged record without touching `current`.
    pub fn merge_into(&self, current: &Product) -> Result<Product, InventoryError> {
        let mut merged = current.clone();
        if let Some(name) = &self.name {
            merged.name = name.trim().to_owned();
        }
        if let Some(category) = &self.category {
            merged.category = category.trim().to_owned();
        }
        if let Some(price) = self.price {
            merged.price = price;
        }
        if let Some(quantity) = self.quantity {
            merged.quantity = quantity_from(quantity)?;
        }
        if let Some(description) = &self.description {
            merged.description = optional_text(Some(description.clone()));
        }
        if let Some(image) = &self.image {
            merged.image = optional_text(Some(image.clone()));
        }

        merged.validate()?;
        Ok(merged)
    }
}

fn validate_fields(name: &str, category: &str, price: Decimal) -> Result<(), InventoryError> {
    if name.trim().is_empty() {
        return Err(InventoryError::invalid("name must not be empty"));
    }
    if category.trim().is_empty() {
        return Err(InventoryError::invalid("category must not be empty"));
    }
    if price <= Decimal::ZERO {
        return Err(InventoryError::invalid(format!(
            "price must be greater than zero, got {price}"
        )));
    }
    Ok(())
}

fn quantity_from(value: i64) -> Result<u32, InventoryError> {
    if value < 0 {
        return Err(InventoryError::invalid(format!("quantity must not be negative, got {value}")));
    }
    u32::try_from(value).map_err(|_| {
        InventoryError::invalid(format!("quantity {value} exceeds the supported limit"))
    })
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|text| text.trim().to_owned()).filter(|text| !text.is_empty())
}
