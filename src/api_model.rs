use crate::error::Result;
use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde_json::Map;
use serde_json::Value;

/// Fields accepted when creating an item. This is the explicit allow-list
/// for the create endpoint: anything else in the request is rejected.
///
/// Multipart form fields always arrive as text, so `price` and `age_days`
/// accept both their native JSON type and a string encoding of it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateItemFields {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub condition: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
    #[serde(default, deserialize_with = "deserialize_age_days")]
    pub age_days: i64,
}

/// Fields accepted when updating an item; the update endpoint overwrites
/// exactly these four properties and recomputes `age_years`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateItemFields {
    pub category: String,
    pub condition: String,
    #[serde(deserialize_with = "deserialize_age_days")]
    pub age_days: i64,
    pub description: String,
}

/// An image file extracted from the `image` part of a multipart request.
#[derive(Debug)]
pub struct UploadedImage {
    /// Client-supplied original filename, not yet sanitized.
    pub filename: String,
    pub body: Vec<u8>,
}

/// Deserialize a map of raw create-request fields into the typed allow-list.
/// Unknown fields and malformed numbers produce a 400-class error with the
/// path to the offending field in the message.
pub fn parse_create_fields(fields: Map<String, Value>) -> Result<CreateItemFields> {
    let fields = serde_path_to_error::deserialize(Value::Object(fields))?;
    Ok(fields)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FloatOrText {
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrText {
    Int(i64),
    Text(String),
}

fn deserialize_price<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    let price = match FloatOrText::deserialize(deserializer)? {
        FloatOrText::Float(f) => f,
        FloatOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("price is not a number: {}", s)))?,
    };
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(de::Error::custom(format!(
            "price must be a non-negative number, got {}",
            price
        )))
    }
}

fn deserialize_age_days<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    let age_days = match IntOrText::deserialize(deserializer)? {
        IntOrText::Int(i) => i,
        IntOrText::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("age_days is not an integer: {}", s)))?,
    };
    if age_days >= 0 {
        Ok(age_days)
    } else {
        Err(de::Error::custom(format!(
            "age_days must be non-negative, got {}",
            age_days
        )))
    }
}
