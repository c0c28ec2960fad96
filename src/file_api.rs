use crate::constants;
use crate::error::Error;
use crate::error::Result;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;
use std::fs;
use std::fs::create_dir_all;
use std::path::Path;
use std::path::PathBuf;
use warp::http::status::StatusCode;

/// Store an uploaded image under `images_dir` using its original filename
/// and return the public URL path the stored file is served from.
///
/// The filename is reduced to its final path component, so a client cannot
/// escape the images directory. Collisions keep the original semantics of
/// the upload endpoint: the new file silently replaces the old one, and
/// concurrent writes of the same name end with the last writer winning.
///
/// The write goes to a temporary file first and is committed with a rename,
/// so a failed or interrupted upload never leaves a half-written image
/// behind the public URL.
pub fn store_image(images_dir: &str, original_filename: &str, body: &[u8]) -> Result<String> {
    let filename = sanitize_filename(original_filename)?;
    create_dir_all(images_dir).map_err(|err| Error {
        code: StatusCode::INTERNAL_SERVER_ERROR,
        msg: format!("Failed to create images directory {}, {}", images_dir, err),
    })?;
    let final_path = Path::new(images_dir).join(&filename);
    let temp_path = temp_path(images_dir, &filename);
    fs::write(&temp_path, body)
        .and_then(|()| fs::rename(&temp_path, &final_path))
        .map_err(|err| {
            // Nothing to do about a failing cleanup beyond the error we
            // already report.
            let _ = fs::remove_file(&temp_path);
            Error {
                code: StatusCode::INTERNAL_SERVER_ERROR,
                msg: format!("Failed to store image {}, {}", filename, err),
            }
        })?;
    Ok(image_url(&filename))
}

/// Public URL path for a stored image filename.
pub fn image_url(filename: &str) -> String {
    let encoded = utf8_percent_encode(filename, URL_PATH_SEGMENT);
    format!("{}/{}", constants::IMAGES_URL_PREFIX, encoded)
}

/// Reduce a client-supplied filename to a bare filename.
/// Path separators of both flavors are treated as directory structure and
/// only the last component is kept.
fn sanitize_filename(original: &str) -> Result<String> {
    let last = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or("");
    if last.is_empty() || last == "." || last == ".." {
        Err(Error {
            code: StatusCode::BAD_REQUEST,
            msg: format!("Invalid image filename: {}", original),
        })
    } else {
        Ok(last.to_string())
    }
}

fn temp_path(images_dir: &str, filename: &str) -> PathBuf {
    let suffix: u64 = rand::random();
    Path::new(images_dir).join(format!(".{}.{:016x}.part", filename, suffix))
}

/// Characters escaped when a stored filename is embedded in a URL path.
const URL_PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');
