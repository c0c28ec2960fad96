use crate::api_model::UploadedImage;
use crate::api_model::UpdateItemFields;
use crate::command_line_interface::CliOptions;
use crate::configuration;
use crate::constants;
use crate::database_pool::DatabasePool;
use crate::error::Error;
use crate::error::Result;
use crate::internal_api;
use crate::internal_api::UpdateOutcome;
use crate::warp_endpoints;
use bytes::BufMut;
use futures::pin_mut;
use futures::TryStreamExt;
use log::error;
use log::info;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::header::HeaderMap;
use warp::http::header::HeaderValue;
use warp::http::status::StatusCode;
use warp::multipart::FormData;
use warp::multipart::Part;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

/// Start web framework with specified APIs.
pub async fn run_server(cli_options: CliOptions, pool: Arc<DatabasePool>) {
    let package_name = env!("CARGO_PKG_NAME").to_uppercase();
    info!("Starting {} HTTP server", package_name);

    let images_dir = configuration::images_dir();

    // The original frontend is served from a different origin.
    let mut headers = HeaderMap::new();
    headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    let headers = warp::reply::with::headers(headers);

    // Liveness marker for the root path.
    let liveness = warp::path::end()
        .and(warp::get())
        .map(|| "Inside the server");

    // Get version of the backend.
    let version = warp::path("version")
        .and(warp::path::end())
        .and(warp::get())
        .map(internal_api::get_project_version);

    // GET all secondChanceItems, in insertion order.
    let pool_get_all = pool.clone();
    let get_all_items = warp::path!("api" / "second-chance-items")
        .and(warp::get())
        .map(move || {
            let result = warp_endpoints::list_items(&pool_get_all);
            let boxed: Box<dyn Reply> = match result {
                Ok(items) => Box::new(warp::reply::json(&items)),
                Err(err) => error_reply(err),
            };
            boxed
        });

    // POST a new item: multipart form with the item fields as text parts
    // and an optional `image` file part.
    let pool_create = pool.clone();
    let create_item = warp::path!("api" / "second-chance-items")
        .and(warp::post())
        .and(warp::multipart::form().max_length(constants::MULTIPART_MAX_BYTES))
        .and_then(move |form: FormData| {
            let pool = pool_create.clone();
            let images_dir = images_dir.clone();
            async move {
                let result = match read_multipart(form).await {
                    Ok((fields, image)) => {
                        warp_endpoints::create_item(&pool, &images_dir, fields, image)
                    }
                    Err(err) => Err(err),
                };
                let boxed: Box<dyn Reply> = match result {
                    Ok(item) => Box::new(warp::reply::with_status(
                        warp::reply::json(&item),
                        StatusCode::CREATED,
                    )),
                    Err(err) => error_reply(err),
                };
                Ok::<_, Infallible>(boxed)
            }
        });

    // GET a single item by its `id` field (not a store-internal identifier).
    let pool_get = pool.clone();
    let get_item = warp::path!("api" / "second-chance-items" / String)
        .and(warp::get())
        .map(move |id: String| {
            let result = warp_endpoints::get_item(&pool_get, &id);
            let boxed: Box<dyn Reply> = match result {
                Ok(Some(item)) => Box::new(warp::reply::json(&item)),
                Ok(None) => Box::new(warp::reply::with_status(
                    warp::reply::json(&json!({ "message": "secondChanceItem not found" })),
                    StatusCode::NOT_FOUND,
                )),
                Err(err) => error_reply(err),
            };
            boxed
        });

    // PUT (update) a single item.
    // A confirmed update answers {"uploaded": "success"}; an update that the
    // store did not persist answers {"uploaded": "failed"} with status 200.
    // Existing clients rely on this body, so it is kept as-is.
    let pool_update = pool.clone();
    let update_item = warp::path!("api" / "second-chance-items" / String)
        .and(warp::put())
        .and(warp::body::form())
        .map(move |id: String, fields: UpdateItemFields| {
            let result = warp_endpoints::update_item(&pool_update, &id, fields);
            let boxed: Box<dyn Reply> = match result {
                Ok(UpdateOutcome::Persisted) => {
                    Box::new(warp::reply::json(&json!({ "uploaded": "success" })))
                }
                Ok(UpdateOutcome::NotPersisted) => {
                    Box::new(warp::reply::json(&json!({ "uploaded": "failed" })))
                }
                Ok(UpdateOutcome::NotFound) => item_not_found(),
                Err(err) => error_reply(err),
            };
            boxed
        });

    // DELETE a single item. Terminal: there is no archival or restore path.
    let pool_delete = pool.clone();
    let delete_item = warp::path!("api" / "second-chance-items" / String)
        .and(warp::delete())
        .map(move |id: String| {
            let result = warp_endpoints::delete_item(&pool_delete, &id);
            let boxed: Box<dyn Reply> = match result {
                Ok(true) => Box::new(warp::reply::json(&json!({ "deleted": "success" }))),
                Ok(false) => item_not_found(),
                Err(err) => error_reply(err),
            };
            boxed
        });

    // Uploaded images are served statically under /images.
    let images = warp::path("images").and(warp::fs::dir(configuration::images_dir()));

    warp::serve(
        liveness
            .with(&headers)
            .or(version.with(&headers))
            .or(get_all_items.with(&headers))
            .or(create_item.with(&headers))
            .or(get_item.with(&headers))
            .or(update_item.with(&headers))
            .or(delete_item.with(&headers))
            .or(images.with(&headers))
            .recover(handle_rejection),
    )
    .run(([0, 0, 0, 0], cli_options.port))
    .await;
}

/// Split a multipart request into its text fields and the optional image.
async fn read_multipart(form: FormData) -> Result<(Map<String, Value>, Option<UploadedImage>)> {
    let mut fields = Map::new();
    let mut image = None;
    pin_mut!(form);
    while let Some(part) = form.try_next().await? {
        if part.name() == "image" && part.filename().is_some() {
            let filename = part.filename().unwrap_or("").to_string();
            let body = part_bytes(part).await?;
            image = Some(UploadedImage { filename, body });
        } else {
            let name = part.name().to_string();
            let text = part_bytes(part).await?;
            let text = String::from_utf8(text).map_err(|err| Error {
                code: StatusCode::BAD_REQUEST,
                msg: format!("Form field {} is not valid UTF-8, {}", name, err),
            })?;
            fields.insert(name, Value::String(text));
        }
    }
    Ok((fields, image))
}

async fn part_bytes(part: Part) -> Result<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::new();
    let stream = part.stream();
    pin_mut!(stream);
    while let Some(buf) = stream.try_next().await? {
        bytes.put(buf);
    }
    Ok(bytes)
}

fn item_not_found() -> Box<dyn Reply> {
    Box::new(warp::reply::with_status(
        warp::reply::json(&json!({ "error": "secondChanceItem not found" })),
        StatusCode::NOT_FOUND,
    ))
}

/// Render a handler failure. Client errors carry their message in a
/// structured body; store failures are logged and answered with a generic
/// 500 so no database detail leaks out.
fn error_reply(err: Error) -> Box<dyn Reply> {
    if err.code.is_server_error() {
        error!("{}", err);
        Box::new(warp::reply::with_status(
            "Internal Server Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    } else {
        Box::new(warp::reply::with_status(
            warp::reply::json(&json!({ "error": err.msg })),
            err.code,
        ))
    }
}

/// Catch-all for requests no filter accepted and for malformed bodies.
async fn handle_rejection(err: Rejection) -> std::result::Result<Box<dyn Reply>, Infallible> {
    if err.is_not_found() {
        Ok(Box::new(warp::reply::with_status(
            "Not Found",
            StatusCode::NOT_FOUND,
        )))
    } else if let Some(body_err) = err.find::<warp::body::BodyDeserializeError>() {
        Ok(Box::new(warp::reply::with_status(
            warp::reply::json(&json!({ "error": body_err.to_string() })),
            StatusCode::BAD_REQUEST,
        )))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        Ok(Box::new(warp::reply::with_status(
            "Method Not Allowed",
            StatusCode::METHOD_NOT_ALLOWED,
        )))
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        Ok(Box::new(warp::reply::with_status(
            "Unsupported Media Type",
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
        )))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        Ok(Box::new(warp::reply::with_status(
            "Payload Too Large",
            StatusCode::PAYLOAD_TOO_LARGE,
        )))
    } else {
        error!("Unhandled rejection: {:?}", err);
        Ok(Box::new(warp::reply::with_status(
            "Internal Server Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )))
    }
}
