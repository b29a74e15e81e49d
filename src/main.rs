use std::error;

use log::info;
use surfsup::configuration::get_configuration;
use surfsup::{routes, Dataset};

#[tokio::main]
async fn main() -> Result<(), Box<dyn error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = get_configuration()?;
    let dataset = Dataset::open(&settings.database).await?;
    dataset.verify_schema().await?;

    let address = settings.application.address();
    info!("Serving climate data on http://{}", address);

    warp::serve(routes(dataset, settings.api.duplicate_dates))
        .run(address)
        .await;

    Ok(())
}
