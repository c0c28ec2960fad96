use chrono::Utc;
use env_logger::Env;
use log::error;
use log::info;
use secondchance::command_line_interface;
use secondchance::configuration;
use secondchance::database_pool::DatabasePool;
use secondchance::warp_api;
use std::io::Write;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().filter_or("RUST_LOG", "info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let cli_options = command_line_interface::PARSED.clone();

    // Connect to the item store once at start. A failure here is logged but
    // not fatal: the server still starts, and requests re-attempt the
    // connection and answer 500 until the store becomes reachable.
    let pool = Arc::new(DatabasePool::new(configuration::database_file()));
    match pool.connect() {
        Ok(_) => info!("Connected to DB"),
        Err(err) => error!("Failed to connect to DB, {}", err),
    }

    // Start web framework
    warp_api::run_server(cli_options, pool).await;
}
