use crate::api_model;
use crate::api_model::UpdateItemFields;
use crate::api_model::UploadedImage;
use crate::data_model::Item;
use crate::database_pool::DatabasePool;
use crate::error::Result;
use crate::file_api;
use crate::internal_api;
use crate::internal_api::UpdateOutcome;
use rusqlite::Connection;
use rusqlite::Transaction;
use serde_json::Map;
use serde_json::Value;

pub fn list_items(pool: &DatabasePool) -> Result<Vec<Item>> {
    let mut conn = pool.conn()?;
    in_transaction(&mut conn, |tx| internal_api::list_items_tx(tx))
}

pub fn get_item(pool: &DatabasePool, id: &str) -> Result<Option<Item>> {
    let mut conn = pool.conn()?;
    in_transaction(&mut conn, |tx| internal_api::get_item_tx(tx, id))
}

/// Validate the multipart fields, persist the image (if any) and insert the
/// new item. The image is written before the insert; a failing insert does
/// not remove an already stored image, mirroring upload middleware that
/// runs before the handler.
pub fn create_item(
    pool: &DatabasePool,
    images_dir: &str,
    fields: Map<String, Value>,
    image: Option<UploadedImage>,
) -> Result<Item> {
    let fields = api_model::parse_create_fields(fields)?;
    let image_url = match image {
        Some(image) => Some(file_api::store_image(
            images_dir,
            &image.filename,
            &image.body,
        )?),
        None => None,
    };
    let mut conn = pool.conn()?;
    in_transaction(&mut conn, |tx| {
        internal_api::create_item_tx(tx, fields, image_url)
    })
}

pub fn update_item(pool: &DatabasePool, id: &str, fields: UpdateItemFields) -> Result<UpdateOutcome> {
    let mut conn = pool.conn()?;
    in_transaction(&mut conn, |tx| internal_api::update_item_tx(tx, id, fields))
}

pub fn delete_item(pool: &DatabasePool, id: &str) -> Result<bool> {
    let mut conn = pool.conn()?;
    in_transaction(&mut conn, |tx| internal_api::delete_item_tx(tx, id))
}

fn in_transaction<T, F: FnOnce(&Transaction) -> Result<T>>(
    conn: &mut Connection,
    func: F,
) -> Result<T> {
    let tx = conn.transaction()?;
    let result = func(&tx)?; // Note that this function needs to exit early in case of error
    tx.commit()?;
    Ok(result)
}
