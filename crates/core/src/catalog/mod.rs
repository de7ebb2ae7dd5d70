pub mod filter;
pub mod inventory;

use std::collections::HashSet;

use crate::domain::product::{Product, ProductId};
use crate::errors::InventoryError;

use self::filter::FilterCriteria;
use self::inventory::InventoryOp;

/// An owned product collection. Mutations go through [`Catalog::apply`] only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Builds a catalog from seed records, rejecting invalid records and
    /// duplicate ids.
    pub fn new(products: Vec<Product>) -> Result<Self, InventoryError> {
        let mut seen = HashSet::new();
        for product in &products {
            product.validate()?;
            if !seen.insert(&product.id) {
                return Err(InventoryError::invalid(format!(
                    "duplicate product id `{}`",
                    product.id
                )));
            }
        }
        Ok(Self { products })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<Product> {
        filter::filter(&self.products, criteria)
    }

    pub fn apply(&mut self, op: InventoryOp) -> Result<Product, InventoryError> {
        inventory::apply_in_place(&mut self.products, op)
    }
}
