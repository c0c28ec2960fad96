use serde::Deserialize;
use serde::Serialize;

/// Unix timestamp in seconds, the time unit of `date_added` and `updatedAt`.
pub type UnixTime = i64;

/// A single marketplace listing.
///
/// `id` is assigned by the server at creation time and is distinct from any
/// database-internal identifier (e.g. SQLite rowid). It is the decimal string
/// encoding of an integer; see `internal_api::create_item_tx` for how new
/// ids are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category: String,
    pub condition: String,
    pub description: String,
    pub price: f64,
    pub age_days: i64,
    pub age_years: f64,
    /// Public URL path of the uploaded image, `null` when no image was
    /// uploaded with the item.
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub date_added: UnixTime,
    /// Absent until the item is updated for the first time.
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<UnixTime>,
}

/// Derive `age_years` from `age_days`: days / 365, rounded to one decimal.
pub fn age_years_from_days(age_days: i64) -> f64 {
    (age_days as f64 / 365.0 * 10.0).round() / 10.0
}
