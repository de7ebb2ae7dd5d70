use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::{Product, ProductDraft, ProductId, ProductPatch};
use crate::errors::InventoryError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InventoryOp {
    Purchase { id: ProductId },
    Restock { id: ProductId, amount: i64 },
    Create { draft: ProductDraft },
    Update { id: ProductId, patch: ProductPatch },
    Delete { id: ProductId },
}

impl InventoryOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Purchase { .. } => "purchase",
            Self::Restock { .. } => "restock",
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    /// The id the operation targets; `None` for Create, whose id is not yet assigned.
    pub fn target(&self) -> Option<&ProductId> {
        match self {
            Self::Purchase { id }
            | Self::Restock { id, .. }
            | Self::Update { id, .. }
            | Self::Delete { id } => Some(id),
            Self::Create { .. } => None,
        }
    }
}

/// Applies `op` to a copy of `products` and returns the new collection.
pub fn apply(products: &[Product], op: InventoryOp) -> Result<Vec<Product>, InventoryError> {
    let mut next = products.to_vec();
    apply_in_place(&mut next, op)?;
    Ok(next)
}

/// Applies `op` to `products` and returns the affected record: the post-state
/// for every operation except Delete, which returns the removed record.
///
/// All validation happens before the first write, so an `Err` leaves
/// `products` untouched.
pub fn apply_in_place(
    products: &mut Vec<Product>,
    op: InventoryOp,
) -> Result<Product, InventoryError> {
    match op {
        InventoryOp::Purchase { id } => {
            let product = find_mut(products, &id)?;
            if product.quantity == 0 {
                return Err(InventoryError::OutOfStock { id });
            }
            product.quantity -= 1;
            Ok(product.clone())
        }
        InventoryOp::Restock { id, amount } => {
            let index = position(products, &id)?;
            if amount < 0 {
                return Err(InventoryError::invalid(format!(
                    "restock amount must not be negative, got {amount}"
                )));
            }
            let product = &mut products[index];
            let restocked = u32::try_from(amount)
                .ok()
                .and_then(|units| product.quantity.checked_add(units))
                .ok_or_else(|| {
                    InventoryError::invalid(format!(
                        "restocking {amount} units would exceed the supported quantity"
                    ))
                })?;
            product.quantity = restocked;
            Ok(product.clone())
        }
        InventoryOp::Create { draft } => {
            let product = draft.into_product(fresh_id(products))?;
            products.push(product.clone());
            Ok(product)
        }
        InventoryOp::Update { id, patch } => {
            let product = find_mut(products, &id)?;
            let merged = patch.merge_into(product)?;
            *product = merged.clone();
            Ok(merged)
        }
        InventoryOp::Delete { id } => {
            let index = position(products, &id)?;
            Ok(products.remove(index))
        }
    }
}

fn position(products: &[Product], id: &ProductId) -> Result<usize, InventoryError> {
    products
        .iter()
        .position(|product| &product.id == id)
        .ok_or_else(|| InventoryError::NotFound { id: id.clone() })
}

fn find_mut<'a>(
    products: &'a mut [Product],
    id: &ProductId,
) -> Result<&'a mut Product, InventoryError> {
    products
        .iter_mut()
        .find(|product| &product.id == id)
        .ok_or_else(|| InventoryError::NotFound { id: id.clone() })
}

fn fresh_id(products: &[Product]) -> ProductId {
    loop {
        let candidate = ProductId(Uuid::new_v4().to_string());
        if products.iter().all(|product| product.id != candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rust_decimal::Decimal;

    use crate::domain::product::{Product, ProductDraft, ProductId, ProductPatch};
    use crate::errors::InventoryError;

    use super::{apply, InventoryOp};

    fn product(id: &str, quantity: u32) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Candy {id}"),
            category: "gummies".to_owned(),
            price: Decimal::new(250, 2),
            quantity,
            description: None,
            image: None,
        }
    }

    fn shelf() -> Vec<Product> {
        vec![product("1", 50), product("2", 0), product("3", 7)]
    }

    fn id(value: &str) -> ProductId {
        ProductId::from(value)
    }

    #[test]
    fn purchase_decrements_only_the_target() {
        let before = shelf();
        let after = apply(&before, InventoryOp::Purchase { id: id("1") }).expect("in stock");

        assert_eq!(after[0].quantity, 49);
        assert_eq!(after[0].id, before[0].id);
        assert_eq!(after[1..], before[1..]);
    }

    #[test]
    fn purchase_of_last_unit_reaches_zero_then_rejects() {
        let products = vec![product("9", 1)];
        let emptied = apply(&products, InventoryOp::Purchase { id: id("9") }).expect("last unit");
        assert_eq!(emptied[0].quantity, 0);

        let error = apply(&emptied, InventoryOp::Purchase { id: id("9") }).expect_err("sold out");
        assert_eq!(error, InventoryError::OutOfStock { id: id("9") });
    }

    #[test]
    fn purchase_of_zero_stock_is_rejected() {
        let error = apply(&shelf(), InventoryOp::Purchase { id: id("2") }).expect_err("sold out");

        assert_eq!(error, InventoryError::OutOfStock { id: id("2") });
    }

    #[test]
    fn purchase_of_unknown_id_is_not_found() {
        let error = apply(&shelf(), InventoryOp::Purchase { id: id("404") }).expect_err("missing");

        assert_eq!(error, InventoryError::NotFound { id: id("404") });
    }

    #[test]
    fn restock_adds_amount() {
        let after =
            apply(&shelf(), InventoryOp::Restock { id: id("2"), amount: 24 }).expect("restock");

        assert_eq!(after[1].quantity, 24);
    }

    #[test]
    fn restock_by_zero_is_allowed() {
        let after =
            apply(&shelf(), InventoryOp::Restock { id: id("3"), amount: 0 }).expect("restock");

        assert_eq!(after, shelf());
    }

    #[test]
    fn negative_restock_is_invalid_input() {
        let error = apply(&shelf(), InventoryOp::Restock { id: id("1"), amount: -5 })
            .expect_err("negative restock");

        assert!(matches!(error, InventoryError::InvalidInput(_)));
    }

    #[test]
    fn restock_of_unknown_id_is_not_found_even_with_bad_amount() {
        let error = apply(&shelf(), InventoryOp::Restock { id: id("x"), amount: -1 })
            .expect_err("missing");

        assert!(matches!(error, InventoryError::NotFound { .. }));
    }

    #[test]
    fn restock_overflow_is_rejected() {
        let products = vec![product("1", u32::MAX)];
        let error = apply(&products, InventoryOp::Restock { id: id("1"), amount: 1 })
            .expect_err("overflow");

        assert!(matches!(error, InventoryError::InvalidInput(_)));
    }

    #[test]
    fn create_appends_with_fresh_unique_id() {
        let before = shelf();
        let draft = ProductDraft {
            name: "Rock Candy".to_owned(),
            category: "hard-candy".to_owned(),
            price: Decimal::new(199, 2),
            quantity: 30,
            ..ProductDraft::default()
        };

        let after = apply(&before, InventoryOp::Create { draft }).expect("valid draft");

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[..before.len()], before[..]);
        let created = &after[before.len()];
        assert_eq!(created.name, "Rock Candy");
        let unique: HashSet<_> = after.iter().map(|product| &product.id).collect();
        assert_eq!(unique.len(), after.len());
    }

    #[test]
    fn create_rejects_invalid_fields() {
        let draft = ProductDraft {
            name: "Fudge".to_owned(),
            category: "chocolate".to_owned(),
            price: Decimal::ZERO,
            quantity: 3,
            ..ProductDraft::default()
        };

        let error = apply(&shelf(), InventoryOp::Create { draft }).expect_err("zero price");

        assert!(matches!(error, InventoryError::InvalidInput(_)));
    }

    #[test]
    fn update_merges_fields_and_preserves_identity_and_position() {
        let patch = ProductPatch {
            name: Some("Candy Three Deluxe".to_owned()),
            quantity: Some(11),
            ..ProductPatch::default()
        };

        let after = apply(&shelf(), InventoryOp::Update { id: id("3"), patch }).expect("update");

        assert_eq!(after[2].id, id("3"));
        assert_eq!(after[2].name, "Candy Three Deluxe");
        assert_eq!(after[2].quantity, 11);
        assert_eq!(after[2].price, Decimal::new(250, 2));
    }

    #[test]
    fn update_rejects_negative_quantity() {
        let patch = ProductPatch { quantity: Some(-2), ..ProductPatch::default() };

        let error =
            apply(&shelf(), InventoryOp::Update { id: id("1"), patch }).expect_err("negative");

        assert!(matches!(error, InventoryError::InvalidInput(_)));
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let error = apply(
            &shelf(),
            InventoryOp::Update { id: id("nope"), patch: ProductPatch::default() },
        )
        .expect_err("missing");

        assert!(matches!(error, InventoryError::NotFound { .. }));
    }

    #[test]
    fn delete_twice_reports_not_found_the_second_time() {
        let once = apply(&shelf(), InventoryOp::Delete { id: id("2") }).expect("delete");
        assert_eq!(once.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["1", "3"]);

        let error = apply(&once, InventoryOp::Delete { id: id("2") }).expect_err("second delete");
        assert_eq!(error, InventoryError::NotFound { id: id("2") });
    }

    #[test]
    fn operation_json_is_tagged_by_name() {
        let op: InventoryOp =
            serde_json::from_str(r#"{"op":"restock","id":"7","amount":3}"#).expect("parse op");

        assert_eq!(op, InventoryOp::Restock { id: id("7"), amount: 3 });
        assert_eq!(op.name(), "restock");
        assert_eq!(op.target(), Some(&id("7")));
    }
}
