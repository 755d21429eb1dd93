//! Health command - ask the server whether it is healthy

use console::style;
use curator_client::Context;

use crate::config::Config;
use crate::error::Result;

pub async fn run(ctx: &Context, config: &Config) -> Result<()> {
    match config.client.health(ctx).await {
        Err(err) => println!("Error while checking {:?}: {}", config.server, err),
        Ok(response) if response.healthy() => {
            println!("{} {:?}", style("Healthy").green().bold(), config.server)
        }
        Ok(response) => println!(
            "Unexpected ChartMuseum response (Message = {:?})",
            response.message()
        ),
    }

    Ok(())
}
