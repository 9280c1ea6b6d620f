mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use fareforecast::render::{ChartRenderer, SvgRenderer, TextRenderer};
use fareforecast::{ForecastConfig, ForecastError, ForecastRequester, HttpTransport, telemetry};

use crate::cli::{Cli, Command, CurveArgs, OutputArgs, PredictionArgs, RunArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            match error.downcast_ref::<ForecastError>() {
                Some(forecast_error) => {
                    eprintln!("error: {}", forecast_error.user_message());
                    eprintln!("  {forecast_error}");
                }
                None => eprintln!("error: {error:#}"),
            }
            ExitCode::from(exit_code(&error))
        }
    }
}

fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<ForecastError>() {
        Some(ForecastError::Validation { .. }) => 2,
        Some(ForecastError::Config { .. }) => 3,
        Some(ForecastError::Transport { .. }) => 4,
        Some(ForecastError::Status { .. }) => 5,
        Some(ForecastError::Parse { .. }) => 6,
        Some(ForecastError::Render { .. } | ForecastError::Io { .. }) => 7,
        None => 1,
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ForecastConfig::load_from_path(cli.config.clone())?;
    if let Some(base_url) = &cli.base_url {
        config.server.base_url = base_url.clone();
        config.apply_defaults();
        config.validate()?;
    }

    telemetry::init(&config.logging, cli.verbose)?;
    debug!(
        base_url = %config.server.base_url,
        timeout_seconds = config.server.timeout_seconds,
        "Configuration loaded"
    );

    match cli.command {
        Some(Command::Config) => {
            let rendered = serde_json::to_string_pretty(&config)
                .context("Failed to serialize configuration")?;
            println!("{rendered}");
            Ok(())
        }
        Some(Command::Summary(output)) => run_summary(&config, &output).await,
        Some(Command::Predictions(args)) => run_predictions(&config, &args).await,
        Some(Command::Curve(args)) => run_curve(&config, &args).await,
        Some(Command::Run(args)) => run_forecast(&config, &args).await,
        None => run_forecast(&config, &RunArgs::default()).await,
    }
}

fn renderer(config: &ForecastConfig, output: &OutputArgs) -> Box<dyn ChartRenderer> {
    if output.wants_svg() {
        Box::new(SvgRenderer::from_config(&config.chart))
    } else {
        Box::new(TextRenderer::default())
    }
}

async fn run_forecast(config: &ForecastConfig, args: &RunArgs) -> Result<()> {
    let query = args.to_query(&config.query)?;
    let transport = HttpTransport::new(&config.server)?;
    let requester = ForecastRequester::new(transport, renderer(config, &args.output));

    if args.json {
        let result = requester.fetch_forecast(&query).await?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    requester.run_forecast(&query, &args.output.target()).await?;
    Ok(())
}

async fn run_summary(config: &ForecastConfig, output: &OutputArgs) -> Result<()> {
    let transport = HttpTransport::new(&config.server)?;
    let requester = ForecastRequester::new(transport, renderer(config, output));
    requester.run_summary(&output.target()).await?;
    Ok(())
}

async fn run_predictions(config: &ForecastConfig, args: &PredictionArgs) -> Result<()> {
    let transport = HttpTransport::new(&config.server)?;
    let requester = ForecastRequester::new(transport, renderer(config, &args.output));
    let filter = args.filter();

    if args.json {
        let rows = requester.fetch_predictions(&filter).await?;
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    requester.run_predictions(&filter, &args.output.target()).await?;
    Ok(())
}

async fn run_curve(config: &ForecastConfig, args: &CurveArgs) -> Result<()> {
    let transport = HttpTransport::new(&config.server)?;
    let requester = ForecastRequester::new(transport, renderer(config, &args.output));

    if args.json {
        let curve = requester
            .fetch_curve(&args.flight_number, &args.class_code)
            .await?;
        println!("{}", serde_json::to_string_pretty(&curve)?);
        return Ok(());
    }

    requester
        .run_curve(&args.flight_number, &args.class_code, &args.output.target())
        .await?;
    Ok(())
}
