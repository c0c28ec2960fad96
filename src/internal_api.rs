use crate::api_model::CreateItemFields;
use crate::api_model::UpdateItemFields;
use crate::data_model::age_years_from_days;
use crate::data_model::Item;
use crate::database_api;
use chrono::Utc;
use log::debug;
use rusqlite::Transaction as Tx;

use crate::error::Result;

/// Get project version as seen by Cargo.
pub fn get_project_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub fn list_items_tx(tx: &Tx) -> Result<Vec<Item>> {
    debug!("Listing all items");
    database_api::get_all_items(tx)
}

pub fn get_item_tx(tx: &Tx, id: &str) -> Result<Option<Item>> {
    debug!("Getting item {}", id);
    database_api::get_item_by_id(tx, id)
}

/// Insert a new item with a server-assigned `id` and `date_added`.
///
/// The new id is one greater than the highest numeric id currently in the
/// collection, encoded back to a string. An empty collection starts at "1".
pub fn create_item_tx(
    tx: &Tx,
    fields: CreateItemFields,
    image_url: Option<String>,
) -> Result<Item> {
    let next_id = database_api::max_numeric_id(tx)?.unwrap_or(0) + 1;
    let item = Item {
        id: next_id.to_string(),
        name: fields.name,
        category: fields.category,
        condition: fields.condition,
        description: fields.description,
        price: fields.price,
        age_days: fields.age_days,
        age_years: age_years_from_days(fields.age_days),
        image_url,
        date_added: Utc::now().timestamp(),
        updated_at: None,
    };
    debug!("Creating item {}", item.id);
    database_api::insert_item(tx, &item)?;
    Ok(item)
}

/// Outcome of an update, kept distinct from transport errors: `NotPersisted`
/// is reported to clients inside a 200-class body (the "soft failure").
#[derive(Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    NotFound,
    Persisted,
    NotPersisted,
}

/// Overwrite `category`, `condition`, `age_days` and `description` of an
/// existing item, recompute `age_years` and stamp `updatedAt`.
pub fn update_item_tx(tx: &Tx, id: &str, fields: UpdateItemFields) -> Result<UpdateOutcome> {
    debug!("Updating item {}", id);
    let item = match database_api::get_item_by_id(tx, id)? {
        Some(item) => item,
        None => return Ok(UpdateOutcome::NotFound),
    };
    let item = Item {
        category: fields.category,
        condition: fields.condition,
        description: fields.description,
        age_days: fields.age_days,
        age_years: age_years_from_days(fields.age_days),
        updated_at: Some(Utc::now().timestamp()),
        ..item
    };
    let updated = database_api::update_item(tx, &item)?;
    if updated == 1 {
        Ok(UpdateOutcome::Persisted)
    } else {
        Ok(UpdateOutcome::NotPersisted)
    }
}

/// Delete an existing item.
/// Returns `false` if the collection had no item with this `id`.
pub fn delete_item_tx(tx: &Tx, id: &str) -> Result<bool> {
    debug!("Deleting item {}", id);
    if database_api::get_item_by_id(tx, id)?.is_none() {
        return Ok(false);
    }
    let deleted = database_api::delete_item(tx, id)?;
    Ok(deleted == 1)
}
