use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use airquality::display::{self, RenderOptions};
use airquality::logging;
use airquality::{AppConfig, EnvironmentProvider, OpenWeatherClient, QueryController, QueryState};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Air quality and weather lookup for any city
#[derive(Parser, Debug)]
#[command(name = "airquality", author, version, about, long_about = None)]
struct Args {
    /// City to look up; omit to start an interactive session
    city: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the final state as JSON
    #[arg(long)]
    json: bool,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = AppConfig::load_from_path(args.config.clone())?;
    logging::init(&config.logging, args.verbose)?;
    debug!("Loaded configuration: {:?}", config.logging);

    let client = OpenWeatherClient::new(config.api)?;
    let controller = QueryController::new(client);
    let options = RenderOptions {
        color: !args.no_color && console::colors_enabled(),
        json: args.json,
    };

    if args.city.is_empty() {
        interactive(&controller, &options).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let city = args.city.join(" ");
    let state = query_and_render(&controller, &city, &options).await?;
    if state.is_error() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Submit one query and print its transitions until it settles
async fn query_and_render<P: EnvironmentProvider>(
    controller: &QueryController<P>,
    city: &str,
    options: &RenderOptions,
) -> Result<QueryState> {
    let mut rx = controller.subscribe();
    let mut stdout = std::io::stdout();

    let (_, settled) = tokio::join!(
        controller.submit(city),
        display::render_until_settled(&mut rx, options, &mut stdout)
    );
    settled.context("Failed to write output")
}

/// Read city names from stdin until `quit`, `exit` or end of input
async fn interactive<P: EnvironmentProvider>(
    controller: &QueryController<P>,
    options: &RenderOptions,
) -> Result<()> {
    info!("Starting interactive session");
    if !options.json {
        println!("{}", display::render(&controller.current(), options));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        // stdout carries only JSON documents in JSON mode
        if !options.json {
            print!("City> ");
            std::io::stdout().flush().context("Failed to write prompt")?;
        }

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            if !options.json {
                println!();
            }
            break;
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }

        query_and_render(controller, input, options).await?;
    }

    info!("Interactive session ended");
    Ok(())
}
