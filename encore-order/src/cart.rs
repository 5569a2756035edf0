use encore_catalog::{ConcessionItem, Seat};
use encore_core::booking::{BookedItem, BookedSeat};
use serde::{Deserialize, Serialize};

/// A concession line with its cart-local quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub item: ConcessionItem,
    pub quantity: u32,
}

impl CartItem {
    pub fn subtotal(&self) -> i64 {
        self.item.price * i64::from(self.quantity)
    }
}

impl From<&CartItem> for BookedItem {
    fn from(line: &CartItem) -> Self {
        Self {
            item_id: line.item.id.clone(),
            name: line.item.name.clone(),
            unit_price: line.item.price,
            quantity: line.quantity,
        }
    }
}

/// Uncommitted seat and concession selections for one show.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    show_id: Option<String>,
    seats: Vec<Seat>,
    /// Seat ids in the order they were picked.
    selected: Vec<String>,
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a freshly generated seat map. The seat selection starts over;
    /// concession lines are kept.
    pub fn initialize_seats(&mut self, show_id: &str, seats: Vec<Seat>) {
        self.show_id = Some(show_id.to_string());
        self.seats = seats;
        self.selected.clear();
    }

    pub fn show_id(&self) -> Option<&str> {
        self.show_id.as_deref()
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, seat_id: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.id == seat_id)
    }

    /// Only an available, not yet selected seat can be picked. Returns whether
    /// the selection changed.
    pub fn select_seat(&mut self, seat_id: &str) -> bool {
        let Some(seat) = self.seats.iter_mut().find(|s| s.id == seat_id) else {
            return false;
        };
        if !seat.is_available || seat.is_selected {
            return false;
        }
        seat.is_selected = true;
        self.selected.push(seat.id.clone());
        true
    }

    pub fn deselect_seat(&mut self, seat_id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|id| id != seat_id);
        if let Some(seat) = self.seats.iter_mut().find(|s| s.id == seat_id) {
            seat.is_selected = false;
        }
        self.selected.len() != before
    }

    pub fn selected_seats(&self) -> Vec<&Seat> {
        self.selected
            .iter()
            .filter_map(|id| self.seats.iter().find(|s| &s.id == id))
            .collect()
    }

    pub fn selected_seat_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn has_seat_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Upsert; a quantity of zero drops the line.
    pub fn set_item_quantity(&mut self, item: &ConcessionItem, quantity: u32) {
        if quantity == 0 {
            self.remove_item(&item.id);
            return;
        }
        match self.items.iter_mut().find(|line| line.item.id == item.id) {
            Some(line) => line.quantity = quantity,
            None => self.items.push(CartItem {
                item: item.clone(),
                quantity,
            }),
        }
    }

    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.item.id != item_id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn seats_total(&self) -> i64 {
        self.selected_seats().iter().map(|s| s.price).sum()
    }

    pub fn items_total(&self) -> i64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn total_amount(&self) -> i64 {
        self.seats_total() + self.items_total()
    }

    /// Sold seats leave the selection and can no longer be picked.
    pub fn mark_unavailable(&mut self, seat_ids: &[String]) {
        for seat in self.seats.iter_mut().filter(|s| seat_ids.contains(&s.id)) {
            seat.is_available = false;
            seat.is_selected = false;
        }
        self.selected.retain(|id| !seat_ids.contains(id));
    }

    pub fn clear(&mut self) {
        for seat in self.seats.iter_mut() {
            seat.is_selected = false;
        }
        self.selected.clear();
        self.items.clear();
    }

    pub fn booked_seats(&self) -> Vec<BookedSeat> {
        self.selected_seats().into_iter().map(BookedSeat::from).collect()
    }

    pub fn booked_items(&self) -> Vec<BookedItem> {
        self.items.iter().map(BookedItem::from).collect()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            show_id: self.show_id.clone(),
            seats: self.seats.clone(),
            selected_seats: self.selected_seats().into_iter().cloned().collect(),
            items: self.items.clone(),
            seats_total: self.seats_total(),
            items_total: self.items_total(),
            total_amount: self.total_amount(),
            currency: encore_shared::CURRENCY.to_string(),
        }
    }
}

/// Serializable snapshot of a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSummary {
    pub show_id: Option<String>,
    pub seats: Vec<Seat>,
    pub selected_seats: Vec<Seat>,
    pub items: Vec<CartItem>,
    pub seats_total: i64,
    pub items_total: i64,
    pub total_amount: i64,
    pub currency: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_catalog::{ConcessionMenu, SeatLayout, SeatMapGenerator, ShowCatalog};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn all_available_cart() -> Cart {
        let catalog = ShowCatalog::with_defaults();
        let show = catalog.get("2").unwrap();
        let generator = SeatMapGenerator::new(SeatLayout::standard(), 1.0).unwrap();
        let seats = generator.generate(show, &HashSet::new(), &mut StdRng::seed_from_u64(1));
        let mut cart = Cart::new();
        cart.initialize_seats(&show.id, seats);
        cart
    }

    #[test]
    fn test_kampala_nights_totals() {
        let mut cart = all_available_cart();
        let popcorn = ConcessionMenu::with_defaults().get("popcorn").unwrap().clone();

        assert!(cart.select_seat("F1"));
        assert!(cart.select_seat("A1"));
        assert_eq!(cart.seats_total(), 55_000);

        cart.set_item_quantity(&popcorn, 2);
        assert_eq!(cart.items_total(), 16_000);
        assert_eq!(cart.total_amount(), 71_000);
    }

    #[test]
    fn test_deselect_reduces_total_by_seat_price() {
        let mut cart = all_available_cart();
        cart.select_seat("A1");
        cart.select_seat("C4");
        cart.select_seat("J14");
        let before = cart.total_amount();
        let price = cart.seat("C4").unwrap().price;

        assert!(cart.deselect_seat("C4"));
        assert_eq!(cart.total_amount(), before - price);
        assert!(!cart.seat("C4").unwrap().is_selected);
        assert!(cart.seat("C4").unwrap().is_available);
        assert!(!cart.deselect_seat("C4"));
    }

    #[test]
    fn test_unavailable_seat_cannot_be_selected() {
        let mut cart = all_available_cart();
        cart.mark_unavailable(&["B2".to_string()]);

        assert!(!cart.select_seat("B2"));
        assert!(cart.selected_seat_ids().is_empty());
        assert!(!cart.select_seat("Z99"));

        assert!(cart.select_seat("B3"));
        assert!(!cart.select_seat("B3"), "double select is a no-op");
        assert_eq!(cart.selected_seat_ids(), &["B3".to_string()]);
    }

    #[test]
    fn test_item_quantity_upserts() {
        let mut cart = all_available_cart();
        let menu = ConcessionMenu::with_defaults();
        let soda = menu.get("soda").unwrap();

        cart.set_item_quantity(soda, 1);
        cart.set_item_quantity(soda, 3);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.items_total(), 9_000);

        cart.set_item_quantity(soda, 0);
        assert!(cart.items().is_empty());

        cart.set_item_quantity(soda, 2);
        assert!(cart.remove_item("soda"));
        assert!(!cart.remove_item("soda"));
    }

    #[test]
    fn test_reinitialize_resets_selection() {
        let mut cart = all_available_cart();
        let menu = ConcessionMenu::with_defaults();
        cart.select_seat("A1");
        cart.set_item_quantity(menu.get("programme").unwrap(), 1);

        let seats = cart.seats().to_vec();
        cart.initialize_seats("2", seats);
        assert!(!cart.has_seat_selection());
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_clear_and_summary() {
        let mut cart = all_available_cart();
        cart.select_seat("A1");
        cart.set_item_quantity(ConcessionMenu::with_defaults().get("tshirt").unwrap(), 1);

        let summary = cart.summary();
        assert_eq!(summary.selected_seats.len(), 1);
        assert_eq!(summary.total_amount, 40_000 + 25_000);
        assert_eq!(summary.seats.len(), 126);

        cart.clear();
        assert_eq!(cart.total_amount(), 0);
        assert!(cart.seats().iter().all(|s| !s.is_selected));
    }
}
