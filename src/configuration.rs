// Not a real configuration, but one place that lists all environment variables with their usages.

use crate::constants;
use std::env;

pub const DATABASE_ENV_NAME: &str = "SECONDCHANCE_DATABASE";

/// Path of the SQLite database file backing the item collection.
pub fn database_file() -> String {
    env::var(DATABASE_ENV_NAME).unwrap_or_else(|_| constants::DATABASE_FILE.to_string())
}

pub const IMAGES_DIR_ENV_NAME: &str = "SECONDCHANCE_IMAGES_DIR";

/// Directory where uploaded item images are stored and served from.
pub fn images_dir() -> String {
    env::var(IMAGES_DIR_ENV_NAME).unwrap_or_else(|_| constants::IMAGES_DIR.to_string())
}
