use crate::data_model::Item;
use crate::error::ErrorContext;
use crate::error::Result;
use rusqlite::params;
use rusqlite::Row;
use rusqlite::Transaction as Tx;

pub fn insert_item(tx: &Tx, item: &Item) -> Result<()> {
    let mut stmt = tx
        .prepare_cached(
            "INSERT INTO secondChanceItems (\
            id, \
            name, \
            category, \
            condition, \
            description, \
            price, \
            age_days, \
            age_years, \
            imageUrl, \
            date_added, \
            updatedAt \
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);",
        )
        .context_str("Failed to prepare/compile INSERT statement")?;
    stmt.insert(params![
        item.id,
        item.name,
        item.category,
        item.condition,
        item.description,
        item.price,
        item.age_days,
        item.age_years,
        item.image_url,
        item.date_added,
        item.updated_at,
    ])
    .context_str("Failed to execute insert_item with parameters")?;
    Ok(())
}

/// All items, in insertion order (the natural order of the collection).
pub fn get_all_items(tx: &Tx) -> Result<Vec<Item>> {
    let mut stmt = tx.prepare_cached(&format!(
        "SELECT {} FROM secondChanceItems ORDER BY rowid;",
        ITEM_COLUMNS
    ))?;
    let mut rows = stmt.query(params![])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(row_to_item(row)?);
    }
    Ok(result)
}

pub fn get_item_by_id(tx: &Tx, id: &str) -> Result<Option<Item>> {
    let mut stmt = tx.prepare_cached(&format!(
        "SELECT {} FROM secondChanceItems WHERE id = ?;",
        ITEM_COLUMNS
    ))?;
    let mut rows = stmt.query(params![id])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_item(row)?))
    } else {
        Ok(None)
    }
}

/// Highest item id in the collection, interpreted numerically.
/// `None` if the collection is empty.
pub fn max_numeric_id(tx: &Tx) -> Result<Option<i64>> {
    let mut stmt =
        tx.prepare_cached("SELECT MAX(CAST(id AS INTEGER)) FROM secondChanceItems;")?;
    let max: Option<i64> = stmt.query_row(params![], |row| row.get(0))?;
    Ok(max)
}

/// Overwrite the full record with matching `id`. Returns the number of
/// matched rows (0 or 1), which callers use for the update persist check.
pub fn update_item(tx: &Tx, item: &Item) -> Result<usize> {
    let mut stmt = tx
        .prepare_cached(
            "UPDATE secondChanceItems SET \
            name = ?, \
            category = ?, \
            condition = ?, \
            description = ?, \
            price = ?, \
            age_days = ?, \
            age_years = ?, \
            imageUrl = ?, \
            date_added = ?, \
            updatedAt = ? \
        WHERE id = ?;",
        )
        .context_str("Failed to prepare/compile UPDATE statement")?;
    let updated = stmt.execute(params![
        item.name,
        item.category,
        item.condition,
        item.description,
        item.price,
        item.age_days,
        item.age_years,
        item.image_url,
        item.date_added,
        item.updated_at,
        item.id,
    ])?;
    Ok(updated)
}

/// Hard delete. Returns the number of deleted rows (0 or 1).
pub fn delete_item(tx: &Tx, id: &str) -> Result<usize> {
    let mut stmt = tx.prepare_cached("DELETE FROM secondChanceItems WHERE id = ?;")?;
    let deleted = stmt.execute(params![id])?;
    Ok(deleted)
}

const ITEM_COLUMNS: &str = "\
    id, \
    name, \
    category, \
    condition, \
    description, \
    price, \
    age_days, \
    age_years, \
    imageUrl, \
    date_added, \
    updatedAt";

fn row_to_item(row: &Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        condition: row.get(3)?,
        description: row.get(4)?,
        price: row.get(5)?,
        age_days: row.get(6)?,
        age_years: row.get(7)?,
        image_url: row.get(8)?,
        date_added: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
