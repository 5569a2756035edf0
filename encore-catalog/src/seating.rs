use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::show::{Show, Tier};

/// Probability that a free seat is drawn as available.
pub const DEFAULT_AVAILABILITY_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seat {
    pub id: String,
    pub row: String,
    pub number: u32,
    pub tier: Tier,
    pub price: i64,
    pub is_available: bool,
    pub is_selected: bool,
}

/// Block of rows belonging to one tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierLayout {
    pub tier: Tier,
    pub rows: Vec<String>,
    pub seats_per_row: u32,
}

impl TierLayout {
    pub fn new(tier: Tier, rows: &[&str], seats_per_row: u32) -> Self {
        Self {
            tier,
            rows: rows.iter().map(|r| r.to_string()).collect(),
            seats_per_row,
        }
    }

    pub fn capacity(&self) -> usize {
        self.rows.len() * self.seats_per_row as usize
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeatLayout {
    pub tiers: Vec<TierLayout>,
}

impl SeatLayout {
    /// House plan shared by every venue: A-B vip, C-E premium, F-J regular.
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                TierLayout::new(Tier::Vip, &["A", "B"], 10),
                TierLayout::new(Tier::Premium, &["C", "D", "E"], 12),
                TierLayout::new(Tier::Regular, &["F", "G", "H", "I", "J"], 14),
            ],
        }
    }

    pub fn capacity(&self) -> usize {
        self.tiers.iter().map(TierLayout::capacity).sum()
    }
}

impl Default for SeatLayout {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeatMapError {
    #[error("Availability ratio must be within 0.0..=1.0, got {0}")]
    InvalidRatio(f64),
}

/// Builds a fresh seat map every time a show is opened.
///
/// Availability of free seats is an independent draw per seat; seats listed as
/// already booked are always unavailable.
#[derive(Debug, Clone)]
pub struct SeatMapGenerator {
    layout: SeatLayout,
    availability_ratio: f64,
}

impl SeatMapGenerator {
    pub fn new(layout: SeatLayout, availability_ratio: f64) -> Result<Self, SeatMapError> {
        if !(0.0..=1.0).contains(&availability_ratio) {
            return Err(SeatMapError::InvalidRatio(availability_ratio));
        }
        Ok(Self { layout, availability_ratio })
    }

    pub fn layout(&self) -> &SeatLayout {
        &self.layout
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        show: &Show,
        booked: &HashSet<String>,
        rng: &mut R,
    ) -> Vec<Seat> {
        let mut seats = Vec::with_capacity(self.layout.capacity());

        for block in &self.layout.tiers {
            let price = show.price_for(block.tier);
            for row in &block.rows {
                for number in 1..=block.seats_per_row {
                    let id = format!("{}{}", row, number);
                    // Draw even for booked seats so the sequence stays stable per rng seed.
                    let drawn = rng.gen_bool(self.availability_ratio);
                    let is_available = drawn && !booked.contains(&id);
                    seats.push(Seat {
                        id,
                        row: row.clone(),
                        number,
                        tier: block.tier,
                        price,
                        is_available,
                        is_selected: false,
                    });
                }
            }
        }

        seats
    }
}

impl Default for SeatMapGenerator {
    fn default() -> Self {
        Self {
            layout: SeatLayout::standard(),
            availability_ratio: DEFAULT_AVAILABILITY_RATIO,
        }
    }
}
