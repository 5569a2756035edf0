use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::cart::{Cart, CartSummary};

/// Per-user carts. Each cart sits behind its own mutex so one user's checkout
/// never blocks another user's seat clicks.
#[derive(Clone, Default)]
pub struct BookingSessions {
    carts: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Cart>>>>>,
}

impl BookingSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's cart, created empty on first use.
    pub async fn cart(&self, user_id: Uuid) -> Arc<Mutex<Cart>> {
        if let Some(cart) = self.carts.read().await.get(&user_id) {
            return cart.clone();
        }
        self.carts
            .write()
            .await
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(Cart::new())))
            .clone()
    }

    pub async fn summary(&self, user_id: Uuid) -> CartSummary {
        let cart = self.cart(user_id).await;
        let guard = cart.lock().await;
        guard.summary()
    }

    /// Runs `f` against the user's cart and returns its result.
    pub async fn update<F, T>(&self, user_id: Uuid, f: F) -> T
    where
        F: FnOnce(&mut Cart) -> T,
    {
        let cart = self.cart(user_id).await;
        let mut guard = cart.lock().await;
        f(&mut guard)
    }

    pub async fn discard(&self, user_id: Uuid) {
        self.carts.write().await.remove(&user_id);
    }

    pub async fn active_sessions(&self) -> usize {
        self.carts.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_catalog::{ConcessionMenu, Seat, Tier};

    fn seat(id: &str) -> Seat {
        Seat {
            id: id.to_string(),
            row: id[..1].to_string(),
            number: id[1..].parse().unwrap(),
            tier: Tier::Regular,
            price: 15_000,
            is_available: true,
            is_selected: false,
        }
    }

    #[tokio::test]
    async fn test_sessions_are_isolated_per_user() {
        let sessions = BookingSessions::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        sessions
            .update(alice, |cart| {
                cart.initialize_seats("2", vec![seat("F1"), seat("F2")]);
                cart.select_seat("F1")
            })
            .await;

        assert_eq!(sessions.summary(alice).await.seats_total, 15_000);
        assert_eq!(sessions.summary(bob).await.seats_total, 0);
        assert_eq!(sessions.active_sessions().await, 2);

        sessions.discard(alice).await;
        assert_eq!(sessions.active_sessions().await, 1);
        assert!(sessions.summary(alice).await.show_id.is_none());
    }

    #[tokio::test]
    async fn test_same_cart_handle_is_shared() {
        let sessions = BookingSessions::new();
        let user = Uuid::new_v4();
        let popcorn = ConcessionMenu::with_defaults().get("popcorn").unwrap().clone();

        let handle = sessions.cart(user).await;
        handle.lock().await.set_item_quantity(&popcorn, 1);

        assert_eq!(sessions.summary(user).await.items_total, 8_000);
    }
}
