use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_price_min")]
    pub price_min: Decimal,
    #[serde(default = "default_price_max")]
    pub price_max: Decimal,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            text: String::new(),
            category: None,
            price_min: default_price_min(),
            price_max: default_price_max(),
        }
    }
}

impl FilterCriteria {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    /// True when `product` satisfies every criterion.
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_text(product) && self.matches_category(product) && self.matches_price(product)
    }

    fn matches_text(&self, product: &Product) -> bool {
        self.text.is_empty() || product.name.to_lowercase().contains(&self.text.to_lowercase())
    }

    fn matches_category(&self, product: &Product) -> bool {
        match self.category.as_deref() {
            None | Some("") => true,
            Some(category) => product.category == category,
        }
    }

    // min > max is not corrected; the range is simply empty.
    fn matches_price(&self, product: &Product) -> bool {
        self.price_min <= product.price && product.price <= self.price_max
    }
}

fn default_price_min() -> Decimal {
    Decimal::ZERO
}

fn default_price_max() -> Decimal {
    Decimal::MAX
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Insertion,
    NameAsc,
    PriceAsc,
    PriceDesc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "insertion" | "" => Ok(Self::Insertion),
            "name" | "name_asc" => Ok(Self::NameAsc),
            "price" | "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            other => Err(format!(
                "unsupported sort order `{other}` (expected insertion|name|price|price_desc)"
            )),
        }
    }
}

/// Returns the products matching `criteria`, in their original relative order.
pub fn filter(products: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
    products.iter().filter(|product| criteria.matches(product)).cloned().collect()
}

/// Stable sort; ties keep insertion order.
pub fn sort_products(products: &mut [Product], order: SortOrder) {
    match order {
        SortOrder::Insertion => {}
        SortOrder::NameAsc => {
            products.sort_by_cached_key(|product| product.name.to_lowercase());
        }
        SortOrder::PriceAsc => products.sort_by(|left, right| left.price.cmp(&right.price)),
        SortOrder::PriceDesc => products.sort_by(|left, right| right.price.cmp(&left.price)),
    }
}

/// Distinct categories in first-seen order.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen = HashSet::new();
    products
        .iter()
        .filter(|product| seen.insert(product.category.as_str()))
        .map(|product| product.category.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::product::{Product, ProductId};

    use super::{categories, filter, sort_products, FilterCriteria, SortOrder};

    fn product(id: &str, name: &str, category: &str, cents: i64) -> Product {
        Product {
            id: ProductId::from(id),
            name: name.to_owned(),
            category: category.to_owned(),
            price: Decimal::new(cents, 2),
            quantity: 10,
            description: None,
            image: None,
        }
    }

    fn shelf() -> Vec<Product> {
        vec![
            product("1", "Gummy Bears", "gummies", 499),
            product("2", "Dark Chocolate Bar", "chocolate", 350),
            product("3", "Sour Gummy Worms", "gummies", 299),
            product("4", "Milk Chocolate Truffles", "chocolate", 1299),
            product("5", "Peppermint Lollipop", "hard-candy", 99),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|product| product.id.as_str()).collect()
    }

    #[test]
    fn single_record_example_matches_text_and_misses_other_text() {
        let products =
            vec![Product { quantity: 50, ..product("1", "Gummy Bears", "gummies", 499) }];
        let criteria =
            FilterCriteria::default().with_price_range(Decimal::ZERO, Decimal::new(100, 0));

        let hit = filter(&products, &criteria.clone().with_text("gummy"));
        let miss = filter(&products, &criteria.with_text("choco"));

        assert_eq!(hit, products);
        assert!(miss.is_empty());
    }

    #[test]
    fn default_criteria_match_everything() {
        assert_eq!(filter(&shelf(), &FilterCriteria::default()), shelf());
    }

    #[test]
    fn text_match_is_case_insensitive_substring() {
        let result = filter(&shelf(), &FilterCriteria::default().with_text("CHOCOLATE"));

        assert_eq!(ids(&result), vec!["2", "4"]);
    }

    #[test]
    fn whitespace_in_query_is_part_of_the_substring() {
        let trailing = filter(&shelf(), &FilterCriteria::default().with_text("bears "));
        let blank = filter(&shelf(), &FilterCriteria::default().with_text("  "));
        let inner = filter(&shelf(), &FilterCriteria::default().with_text("gummy w"));

        assert!(trailing.is_empty());
        assert!(blank.is_empty());
        assert_eq!(ids(&inner), vec!["3"]);
    }

    #[test]
    fn category_is_exact_and_empty_category_matches_all() {
        let exact = filter(&shelf(), &FilterCriteria::default().with_category("gummies"));
        let partial = filter(&shelf(), &FilterCriteria::default().with_category("gumm"));
        let empty = filter(&shelf(), &FilterCriteria::default().with_category(""));

        assert_eq!(ids(&exact), vec!["1", "3"]);
        assert!(partial.is_empty());
        assert_eq!(empty.len(), 5);
    }

    #[test]
    fn price_range_is_inclusive_on_both_ends() {
        let criteria =
            FilterCriteria::default().with_price_range(Decimal::new(299, 2), Decimal::new(499, 2));

        assert_eq!(ids(&filter(&shelf(), &criteria)), vec!["1", "2", "3"]);
    }

    #[test]
    fn inverted_price_range_yields_empty_result() {
        let criteria =
            FilterCriteria::default().with_price_range(Decimal::new(10, 0), Decimal::new(1, 0));

        assert!(filter(&shelf(), &criteria).is_empty());
    }

    #[test]
    fn criteria_are_anded_and_partition_the_input() {
        let criteria = FilterCriteria::default()
            .with_text("gummy")
            .with_category("gummies")
            .with_price_range(Decimal::new(3, 0), Decimal::new(10, 0));
        let products = shelf();
        let result = filter(&products, &criteria);

        assert_eq!(ids(&result), vec!["1"]);
        for product in &products {
            assert_eq!(result.contains(product), criteria.matches(product), "{}", product.id);
        }
    }

    #[test]
    fn filtering_twice_is_the_same_as_once() {
        let criteria = FilterCriteria::default().with_text("o");
        let once = filter(&shelf(), &criteria);

        assert_eq!(filter(&once, &criteria), once);
    }

    #[test]
    fn sort_orders_are_stable() {
        let mut by_price = shelf();
        sort_products(&mut by_price, SortOrder::PriceAsc);
        assert_eq!(ids(&by_price), vec!["5", "3", "2", "1", "4"]);

        let mut by_name = shelf();
        sort_products(&mut by_name, SortOrder::NameAsc);
        assert_eq!(ids(&by_name), vec!["2", "1", "4", "5", "3"]);

        let mut untouched = shelf();
        sort_products(&mut untouched, SortOrder::Insertion);
        assert_eq!(untouched, shelf());
    }

    #[test]
    fn sort_order_parses_cli_spellings() {
        assert_eq!("price-desc".parse::<SortOrder>(), Ok(SortOrder::PriceDesc));
        assert_eq!("Name".parse::<SortOrder>(), Ok(SortOrder::NameAsc));
        assert!("random".parse::<SortOrder>().is_err());
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        assert_eq!(categories(&shelf()), vec!["gummies", "chocolate", "hard-candy"]);
    }
}
