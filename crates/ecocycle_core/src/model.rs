use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::routing::geo::Coordinate;
use crate::routing::sequencer::SellerStop;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Individual,
    Company,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Individual => "individual",
            UserType::Company => "company",
        }
    }
}

impl FromStr for UserType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" => Ok(UserType::Individual),
            "company" => Ok(UserType::Company),
            other => bail!("Unknown user type: '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Sold,
    Draft,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "sold",
            ListingStatus::Draft => "draft",
        }
    }
}

impl FromStr for ListingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ListingStatus::Active),
            "sold" => Ok(ListingStatus::Sold),
            "draft" => Ok(ListingStatus::Draft),
            other => bail!("Unknown listing status: '{other}'"),
        }
    }
}

/// Ordinal size of a seller's aggregate listed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VolumeTier {
    Low,
    Medium,
    High,
}

impl VolumeTier {
    pub fn classify(total_quantity: f64) -> Self {
        if total_quantity > 1000.0 {
            VolumeTier::High
        } else if total_quantity > 300.0 {
            VolumeTier::Medium
        } else {
            VolumeTier::Low
        }
    }
}

impl fmt::Display for VolumeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolumeTier::Low => "Low",
            VolumeTier::Medium => "Medium",
            VolumeTier::High => "High",
        };
        f.write_str(s)
    }
}

impl FromStr for VolumeTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(VolumeTier::Low),
            "medium" => Ok(VolumeTier::Medium),
            "high" => Ok(VolumeTier::High),
            other => bail!("Unknown volume tier: '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub user_name: String,
    pub phone_number: String,
    pub user_type: String,
    pub account_state: String,
    pub registered_date: String,
    pub photo_url: Option<String>,
}

/// Credentials row, never serialized.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: i64,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub category_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationInput {
    pub city: String,
    #[serde(default)]
    pub district: Option<String>,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct NewListing {
    pub category_id: i64,
    pub location: LocationInput,
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
    pub description: Option<String>,
    pub status: ListingStatus,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListingUpdate {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
    pub description: Option<String>,
    pub status: ListingStatus,
    pub category_id: i64,
}

/// One of the current user's listings.
#[derive(Debug, Clone, Serialize)]
pub struct OwnListing {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
    pub description: Option<String>,
    pub status: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Public marketplace row, joined with seller, category and location.
#[derive(Debug, Clone, Serialize)]
pub struct MarketListing {
    pub id: i64,
    pub product_name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
    pub description: Option<String>,
    pub status: String,
    pub location_id: Option<i64>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub seller_id: Option<i64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub seller: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentItem {
    pub category: Option<String>,
    pub product_id: i64,
    pub price: f64,
    pub date_added: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ListingTotals {
    pub total: i64,
    pub sum: Option<f64>,
}

/// A user with at least one active listing, aggregated for route planning.
#[derive(Debug, Clone, Serialize)]
pub struct Seller {
    pub id: i64,
    pub name: String,
    pub contact: String,
    pub location: Option<Coordinate>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub items: Vec<String>,
    pub total_quantity: f64,
    pub volume: VolumeTier,
}

impl Seller {
    pub fn stop(&self) -> SellerStop {
        SellerStop {
            id: self.id,
            location: self.location,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreEntry {
    pub id: i64,
    pub photo_url: Option<String>,
    pub user_name: String,
    pub count: i64,
    pub position: usize,
    pub points: i64,
}

/// Leaderboard points for a number of listings.
pub fn listing_points(count: i64) -> i64 {
    if count >= 5 { count * 6 } else { count + 2 }
}

/// Rank users by points, highest first. Equal points keep their input order.
pub fn rank_scores(rows: Vec<(i64, Option<String>, String, i64)>) -> Vec<ScoreEntry> {
    let mut entries: Vec<ScoreEntry> = rows
        .into_iter()
        .map(|(id, photo_url, user_name, count)| ScoreEntry {
            id,
            photo_url,
            user_name,
            count,
            position: 0,
            points: listing_points(count),
        })
        .collect();

    entries.sort_by(|a, b| b.points.cmp(&a.points));
    for (i, e) in entries.iter_mut().enumerate() {
        e.position = i + 1;
    }
    entries
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryShare {
    pub name: Option<String>,
    pub percent: f64,
}

/// Share indicator for the summed quantity a user lists in one category.
pub fn category_percent(sum: f64) -> f64 {
    if sum <= 0.0 {
        return 0.0;
    }

    const BANDS: [(f64, f64); 11] = [
        (5.0, 0.1),
        (10.0, 0.2),
        (20.0, 0.3),
        (40.0, 0.4),
        (70.0, 0.5),
        (100.0, 0.6),
        (200.0, 0.7),
        (300.0, 0.8),
        (400.0, 0.9),
        (500.0, 1.0),
        (1100.0, 1.1),
    ];

    let bonus = BANDS
        .iter()
        .find(|(limit, _)| sum <= *limit)
        .map(|(_, b)| *b)
        .unwrap_or(0.13);

    sum / 100.0 + bonus
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatThreadSummary {
    #[serde(rename = "textId")]
    pub thread_id: i64,
    pub other_user_id: i64,
    #[serde(rename = "pName")]
    pub other_user_name: String,
    pub photo_url: Option<String>,
    #[serde(rename = "lastMessage")]
    pub last_message: Option<String>,
    #[serde(rename = "lastMessageTime")]
    pub last_message_time: Option<String>,
    pub opened: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: i64,
    pub sender_id: i64,
    pub text: String,
    pub sent_at: String,
    /// `user` when sent by the viewer, `bot` otherwise.
    pub sender: String,
}
