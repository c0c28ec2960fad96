// Constants used in the project. These are "convention over configuration" for now.

pub const DATABASE_FILE: &str = "./data/secondchance.db";

/// Directory where uploaded item images are stored.
pub const IMAGES_DIR: &str = "./public/images";

/// URL path prefix under which stored images are served statically.
pub const IMAGES_URL_PREFIX: &str = "/images";

/// Maximum accepted size of a multipart create request (fields + image).
pub const MULTIPART_MAX_BYTES: u64 = 10 * 1024 * 1024;
