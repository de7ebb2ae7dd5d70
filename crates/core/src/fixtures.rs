use rust_decimal::Decimal;

use crate::domain::product::{Product, ProductId};

/// The built-in confectionery shelf used when no seed file is configured.
pub fn seed_products() -> Vec<Product> {
    vec![
        seed(
            "1",
            "Gummy Bears",
            "gummies",
            499,
            50,
            Some("Classic fruit-flavoured gummy bears."),
            Some("https://images.example.com/candy/gummy-bears.jpg"),
        ),
        seed(
            "2",
            "Dark Chocolate Truffles",
            "chocolate",
            1299,
            20,
            Some("Ganache-filled truffles dusted with cocoa."),
            Some("https://images.example.com/candy/dark-truffles.jpg"),
        ),
        seed("3", "Sour Gummy Worms", "gummies", 399, 35, Some("Tangy, sugar-coated worms."), None),
        seed("4", "Peppermint Lollipops", "hard-candy", 199, 0, None, None),
        seed(
            "5",
            "Salted Caramel Squares",
            "caramel",
            899,
            15,
            Some("Soft caramels finished with sea salt."),
            None,
        ),
        seed("6", "Milk Chocolate Bar", "chocolate", 349, 80, None, None),
        seed(
            "7",
            "Rainbow Rock Candy",
            "hard-candy",
            599,
            12,
            Some("Crystal sugar sticks in six colours."),
            Some("https://images.example.com/candy/rock-candy.jpg"),
        ),
        seed("8", "Licorice Twists", "licorice", 449, 40, None, None),
    ]
}

fn seed(
    id: &str,
    name: &str,
    category: &str,
    price_cents: i64,
    quantity: u32,
    description: Option<&str>,
    image: Option<&str>,
) -> Product {
    Product {
        id: ProductId::from(id),
        name: name.to_owned(),
        category: category.to_owned(),
        price: Decimal::new(price_cents, 2),
        quantity,
        description: description.map(str::to_owned),
        image: image.map(str::to_owned),
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::Catalog;

    use super::seed_products;

    #[test]
    fn seed_shelf_is_a_valid_catalog() {
        let catalog = Catalog::new(seed_products()).expect("seed products satisfy invariants");

        assert_eq!(catalog.len(), 8);
    }

    #[test]
    fn seed_shelf_has_a_sold_out_item() {
        assert!(seed_products().iter().any(|product| !product.in_stock()));
    }
}
