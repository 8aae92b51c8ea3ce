mod cli;
mod tables;

use anyhow::Result;
use clap::{Parser, crate_version};
use day_ahead::Resolver;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Args, Command},
    tables::{build_hours_table, build_quote_table, build_statistics_table},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    if let Err(error) = run(args).await {
        if error.downcast_ref::<day_ahead::Error>().is_some_and(day_ahead::Error::is_fetch_failure) {
            error!("fetch failed: {error:#}");
        }
        return Err(error);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let resolver = Resolver::try_new(&args.entsoe.config()?)?;
    let today = resolver.today();

    match args.command {
        Command::Price(price_args) => {
            let date = price_args.date.resolve(today)?;
            let interval = price_args.interval.unwrap_or_else(|| resolver.current_interval());
            match resolver.price_with_tomorrow(interval, date).await? {
                Some(pair) => println!("{}", build_quote_table(&pair)),
                None => println!("no data for {date} {interval}"),
            }
        }
        Command::Hours(date_args) => {
            let date = date_args.resolve(today)?;
            match resolver.hourly_prices(date).await? {
                Some(hours) => {
                    let statistics = resolver.statistics(date).await?;
                    println!("{}", build_hours_table(&hours, statistics.as_ref()));
                }
                None => println!("no data for {date}"),
            }
        }
        Command::Stats(date_args) => {
            let date = date_args.resolve(today)?;
            match resolver.statistics(date).await? {
                Some(statistics) => println!("{}", build_statistics_table(&statistics)),
                None => println!("no data for {date}"),
            }
        }
        Command::Diagnose(diagnose_args) => {
            println!("{}", resolver.diagnose(diagnose_args.date.unwrap_or(today))?);
        }
    }
    Ok(())
}
