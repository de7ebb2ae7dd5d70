use clap::Args;
use rust_decimal::Decimal;
use sweetshop_core::{FilterCriteria, SortOrder};
use tracing::debug;

use crate::commands::{CommandResult, Payload, Session};

#[derive(Debug, Clone, Default, Args)]
pub struct BrowseArgs {
    #[arg(long, default_value = "", help = "Case-insensitive substring of the product name")]
    pub text: String,
    #[arg(long, help = "Exact category to show; omit for all categories")]
    pub category: Option<String>,
    #[arg(long, help = "Lowest price to include (inclusive)")]
    pub min_price: Option<Decimal>,
    #[arg(long, help = "Highest price to include (inclusive)")]
    pub max_price: Option<Decimal>,
    #[arg(long, default_value = "insertion", help = "insertion | name | price | price-desc")]
    pub sort: SortOrder,
}

impl BrowseArgs {
    pub fn criteria(&self) -> FilterCriteria {
        let defaults = FilterCriteria::default();
        FilterCriteria {
            text: self.text.clone(),
            category: self.category.clone(),
            price_min: self.min_price.unwrap_or(defaults.price_min),
            price_max: self.max_price.unwrap_or(defaults.price_max),
        }
    }
}

pub fn run(args: BrowseArgs) -> CommandResult {
    let session = match Session::open("browse") {
        Ok(session) => session,
        Err(result) => return result,
    };

    let criteria = args.criteria();
    let products = session.block_on(session.store.browse(&criteria, args.sort));
    debug!(event_name = "system.cli.browse", result_count = products.len(), "browse complete");

    let message = match products.len() {
        1 => "1 product matches".to_string(),
        count => format!("{count} products match"),
    };
    CommandResult::success_with(
        "browse",
        message,
        Payload { products: Some(products), ..Payload::default() },
    )
}

pub fn run_categories() -> CommandResult {
    let session = match Session::open("categories") {
        Ok(session) => session,
        Err(result) => return result,
    };

    let categories = session.block_on(session.store.categories());
    CommandResult::success_with(
        "categories",
        format!("{} categories", categories.len()),
        Payload { categories: Some(categories), ..Payload::default() },
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sweetshop_core::SortOrder;

    use super::BrowseArgs;

    #[test]
    fn missing_bounds_fall_back_to_open_range() {
        let args = BrowseArgs { text: "gummy".to_string(), ..BrowseArgs::default() };
        let criteria = args.criteria();

        assert_eq!(criteria.price_min, Decimal::ZERO);
        assert_eq!(criteria.price_max, Decimal::MAX);
        assert_eq!(args.sort, SortOrder::Insertion);
    }

    #[test]
    fn explicit_bounds_are_passed_through_literally() {
        let args = BrowseArgs {
            min_price: Some(Decimal::new(10, 0)),
            max_price: Some(Decimal::new(1, 0)),
            ..BrowseArgs::default()
        };
        let criteria = args.criteria();

        assert!(criteria.price_min > criteria.price_max);
    }
}
