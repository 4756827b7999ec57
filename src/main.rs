use bike_weather_etl::{Pipeline, Settings};
use log::{error, info};
use std::error::Error;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env();
    match Pipeline::from_settings(&settings).run().await {
        Ok(summary) => {
            info!(
                "ETL run finished: {} file(s) extracted, {} row(s) loaded into {}",
                summary.files_extracted,
                summary.rows_loaded,
                summary.tables.join(", ")
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("ETL run failed: {}", e);
            let mut cause = e.source();
            while let Some(inner) = cause {
                error!("  caused by: {}", inner);
                cause = inner.source();
            }
            ExitCode::FAILURE
        }
    }
}
