use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Food,
    Merchandise,
    Program,
    Other,
}

/// Extra sold alongside tickets: snacks, souvenirs, printed programmes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConcessionItem {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub category: ItemCategory,
    pub description: String,
}

impl ConcessionItem {
    pub fn new(id: &str, name: &str, price: i64, category: ItemCategory, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            category,
            description: description.to_string(),
        }
    }
}

/// Items on sale at the concession stand. Not stock-limited.
#[derive(Debug, Clone, Default)]
pub struct ConcessionMenu {
    items: Vec<ConcessionItem>,
}

impl ConcessionMenu {
    pub fn new(items: Vec<ConcessionItem>) -> Self {
        Self { items }
    }

    pub fn with_defaults() -> Self {
        Self::new(vec![
            ConcessionItem::new("popcorn", "Popcorn Combo", 8_000, ItemCategory::Food, "Large popcorn with a soft drink"),
            ConcessionItem::new("rolex", "Rolex Wrap", 6_000, ItemCategory::Food, "Chapati rolled with eggs and vegetables"),
            ConcessionItem::new("soda", "Soft Drink", 3_000, ItemCategory::Food, "Chilled 500ml bottle"),
            ConcessionItem::new("programme", "Souvenir Programme", 5_000, ItemCategory::Program, "Cast list, synopsis and photos"),
            ConcessionItem::new("tshirt", "Show T-Shirt", 25_000, ItemCategory::Merchandise, "Cotton tee with the season artwork"),
            ConcessionItem::new("poster", "Signed Poster", 15_000, ItemCategory::Merchandise, "A2 poster signed by the cast"),
        ])
    }

    pub fn list(&self) -> &[ConcessionItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ConcessionItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_menu() {
        let menu = ConcessionMenu::with_defaults();
        assert_eq!(menu.get("popcorn").unwrap().price, 8_000);
        assert!(menu.get("caviar").is_none());
        let merchandise = menu.list().iter().filter(|i| i.category == ItemCategory::Merchandise);
        assert_eq!(merchandise.count(), 2);
        assert!(menu.list().iter().all(|i| i.price > 0));
    }
}
