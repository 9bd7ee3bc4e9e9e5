//! Topic catalog
//!
//! The catalog is the read-only list of selectable topics. Topic ids are
//! slugs, which keeps every cache key built from them unambiguous.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

static SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());

/// A selectable system-design subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    /// Stable slug, e.g. `parking-lot`
    pub id: String,
    pub name: String,
    /// Display glyph
    pub icon: String,
    /// Context passed to section generation
    pub prompt: String,
}

impl Topic {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        icon: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            prompt: prompt.into(),
        }
    }

    /// Name up to the first `/`, trimmed: `"Uber / Ride Sharing"` → `"Uber"`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.name.split('/').next().unwrap_or(&self.name).trim()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate topic id '{0}'")]
    DuplicateId(String),

    #[error("topic id '{0}' is not a slug ([a-z0-9-]+)")]
    InvalidId(String),

    #[error("topic '{0}' has an empty name")]
    EmptyName(String),
}

/// Whether `id` is a valid topic slug.
#[must_use]
pub fn is_slug(id: &str) -> bool {
    SLUG.is_match(id)
}

/// Ordered, immutable list of topics.
#[derive(Debug, Clone)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    /// Validate and wrap `topics`, keeping their order.
    pub fn from_topics(topics: Vec<Topic>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for topic in &topics {
            if !is_slug(&topic.id) {
                return Err(CatalogError::InvalidId(topic.id.clone()));
            }
            if topic.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(topic.id.clone()));
            }
            if !seen.insert(topic.id.as_str()) {
                return Err(CatalogError::DuplicateId(topic.id.clone()));
            }
        }
        Ok(Self { topics })
    }

    /// The nine built-in topics.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            topics: builtin_topics(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl Default for TopicCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_topics() -> Vec<Topic> {
    vec![
        Topic::new(
            "uber",
            "Uber / Ride Sharing",
            "🚗",
            "Design a ride-sharing service like Uber. Focus on real-time location tracking, \
             matching algorithms (QuadTrees/H3), and surge pricing.",
        ),
        Topic::new(
            "zomato",
            "Zomato / Food Delivery",
            "🛵",
            "Design a food delivery system like Zomato/Swiggy. Focus on the 3-sided marketplace \
             (Customer, Restaurant, Rider), real-time order status, and routing.",
        ),
        Topic::new(
            "ticketmaster",
            "Ticketmaster / Booking",
            "🎟️",
            "Design a high-scale ticket booking system. Focus on handling flash sales, \
             concurrency (distributed locking), and ACID transactions for seat selection.",
        ),
        Topic::new(
            "paytm",
            "Paytm / Payment Gateway",
            "💳",
            "Design a payment gateway like Paytm. Focus on idempotent APIs, double-entry \
             bookkeeping, and distributed transactions (Saga pattern).",
        ),
        Topic::new(
            "parking-lot",
            "Parking Lot (Machine Coding)",
            "🅿️",
            "Machine Coding: Design a Parking Lot system. Handle multiple floors, vehicle types, \
             and automated ticketing.",
        ),
        Topic::new(
            "splitwise",
            "Splitwise (Machine Coding)",
            "⚖️",
            "Machine Coding: Design Splitwise. Focus on expense sharing, debt simplification \
             (min cash flow), and group balances.",
        ),
        Topic::new(
            "snake-ladder",
            "Snake & Ladder (Coding)",
            "🐍",
            "Machine Coding: Design Snake and Ladder game. Focus on modularity, extensible board \
             elements, and concurrency for multiple games.",
        ),
        Topic::new(
            "instagram",
            "Instagram / Photo Sharing",
            "📸",
            "Design a social media platform like Instagram. Focus on feed generation (Pull vs \
             Push), high availability, and blob storage management.",
        ),
        Topic::new(
            "spotify",
            "Spotify / Audio Streaming",
            "🎵",
            "Design a music streaming service like Spotify. Focus on CDNs, wide-column stores \
             for play-history, and recommendation pipelines.",
        ),
    ]
}
