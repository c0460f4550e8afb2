use common::grouping::{build_cards, sort_cards};
use common::model::catalog::{model_filter_matches, CardSort, ProductCard};
use common::model::stock::StockUnit;

pub struct CatalogComponent {
    pub units: Vec<StockUnit>,
    /// All cards, sorted by `sort`. Filtering happens in `visible_cards`.
    pub cards: Vec<ProductCard>,
    pub sort: CardSort,
    pub model_filter: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl CatalogComponent {
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            cards: Vec::new(),
            sort: CardSort::default(),
            model_filter: String::new(),
            loading: true,
            error: None,
        }
    }

    /// Clusters the fetched units the same way the server does and applies
    /// the current sort.
    pub fn rebuild_cards(&mut self) {
        self.cards = build_cards(&self.units);
        sort_cards(&mut self.cards, self.sort);
    }

    pub fn visible_cards(&self) -> Vec<&ProductCard> {
        self.cards
            .iter()
            .filter(|c| model_filter_matches(&c.representative.model_code, &self.model_filter))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(vin: &str, model: &str, price: f64) -> StockUnit {
        let mut u = StockUnit::new(vin, "main", model);
        u.status_code = 195;
        u.list_price = Some(price);
        u
    }

    #[test]
    fn test_rebuild_and_filter() {
        let mut catalog = CatalogComponent::new();
        catalog.units = vec![
            unit("A", "21EM", 52_000.0),
            unit("B", "21EM", 50_000.0),
            unit("C", "31AB", 41_000.0),
        ];
        catalog.sort = CardSort::PriceAsc;
        catalog.rebuild_cards();

        assert_eq!(catalog.cards.len(), 2);
        assert_eq!(catalog.cards[0].representative.model_code, "31AB");
        assert_eq!(catalog.cards[1].price, Some(50_000.0));

        catalog.model_filter = " 21e".to_string();
        let visible = catalog.visible_cards();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].vins, vec!["A", "B"]);
    }
}
