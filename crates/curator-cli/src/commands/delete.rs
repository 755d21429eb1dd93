//! Delete command - remove a chart version from the server

use console::style;
use curator_client::Context;

use crate::config::Config;
use crate::error::Result;

pub async fn run(ctx: &Context, config: &Config, name: &str, version: &str) -> Result<()> {
    let chart = config.chart_info(name, version);

    match config.client.charts().delete(ctx, &chart).await {
        Err(err) => println!("Error while deleting {}: {}", chart, err),
        Ok(response) if response.deleted() => println!(
            "{} {} from {:?}",
            style("Successfully deleted").green().bold(),
            chart,
            config.server
        ),
        Ok(response) => println!(
            "Unexpected ChartMuseum response (Message = {:?})",
            response.message()
        ),
    }

    Ok(())
}
