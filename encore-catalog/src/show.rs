use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seat price category. Each tier owns a fixed block of rows in the house.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Vip,
    Premium,
    Regular,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Vip => "vip",
            Tier::Premium => "premium",
            Tier::Regular => "regular",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vip" => Ok(Tier::Vip),
            "premium" => Ok(Tier::Premium),
            "regular" => Ok(Tier::Regular),
            other => Err(format!("unknown tier: {}", other)),
        }
    }
}

/// Per-tier ticket prices for one show, in UGX.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierPrices {
    pub vip: i64,
    pub premium: i64,
    pub regular: i64,
}

impl TierPrices {
    pub fn new(vip: i64, premium: i64, regular: i64) -> Self {
        Self { vip, premium, regular }
    }

    pub fn price_for(&self, tier: Tier) -> i64 {
        match tier {
            Tier::Vip => self.vip,
            Tier::Premium => self.premium,
            Tier::Regular => self.regular,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Show {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub venue: String,
    pub duration: String,
    pub genre: String,
    pub description: String,
    pub image: String,
    pub price: TierPrices,
}

impl Show {
    pub fn price_for(&self, tier: Tier) -> i64 {
        self.price.price_for(tier)
    }
}

/// Read-only snapshot of the shows on sale.
#[derive(Debug, Clone, Default)]
pub struct ShowCatalog {
    shows: Vec<Show>,
}

impl ShowCatalog {
    pub fn new(shows: Vec<Show>) -> Self {
        Self { shows }
    }

    /// The season line-up the box office opens with.
    pub fn with_defaults() -> Self {
        Self::new(default_shows())
    }

    pub fn list(&self) -> &[Show] {
        &self.shows
    }

    pub fn get(&self, id: &str) -> Option<&Show> {
        self.shows.iter().find(|s| s.id == id)
    }

    /// Case-insensitive genre filter; `None` returns everything.
    pub fn filter_by_genre(&self, genre: Option<&str>) -> Vec<Show> {
        match genre {
            Some(g) => self
                .shows
                .iter()
                .filter(|s| s.genre.eq_ignore_ascii_case(g))
                .cloned()
                .collect(),
            None => self.shows.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn curtain(hh: u32, mm: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hh, mm, 0).unwrap_or_default()
}

pub fn default_shows() -> Vec<Show> {
    vec![
        Show {
            id: "1".into(),
            title: "The Pearl of Africa".into(),
            date: date(2025, 2, 15),
            time: curtain(19, 30),
            venue: "Main Theatre".into(),
            duration: "2h 30min".into(),
            genre: "Cultural Drama".into(),
            description: "A captivating story celebrating Uganda's rich cultural heritage and the resilience of its people.".into(),
            image: "https://images.pexels.com/photos/713149/pexels-photo-713149.jpeg".into(),
            price: TierPrices::new(50_000, 35_000, 20_000),
        },
        Show {
            id: "2".into(),
            title: "Kampala Nights".into(),
            date: date(2025, 2, 20),
            time: curtain(20, 0),
            venue: "Studio Theatre".into(),
            duration: "1h 45min".into(),
            genre: "Musical Comedy".into(),
            description: "A hilarious musical comedy about life in Uganda's bustling capital city.".into(),
            image: "https://images.pexels.com/photos/1190297/pexels-photo-1190297.jpeg".into(),
            price: TierPrices::new(40_000, 28_000, 15_000),
        },
        Show {
            id: "3".into(),
            title: "Ancestral Spirits".into(),
            date: date(2025, 2, 25),
            time: curtain(18, 0),
            venue: "Outdoor Stage".into(),
            duration: "2h 15min".into(),
            genre: "Traditional Dance".into(),
            description: "An enchanting performance showcasing traditional Ugandan dances and spiritual ceremonies.".into(),
            image: "https://images.pexels.com/photos/1387174/pexels-photo-1387174.jpeg".into(),
            price: TierPrices::new(45_000, 30_000, 18_000),
        },
    ]
}
