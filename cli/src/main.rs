//! emicalc CLI
//!
//! Computes a loan's EMI and amortization schedule and shows it in any
//! currency the rate provider quotes.

use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emicalc_amortization::{amortize, LoanParameters};
use emicalc_common::Currency;
use emicalc_fx::{
    ConversionState, ConversionStatus, ExchangeRateApiProvider, FxServiceConfig,
    RateConversionService,
};

mod report;

use report::{render_rates, LoanReport};

/// emicalc CLI
#[derive(Parser, Debug)]
#[command(name = "emicalc")]
#[command(about = "Loan EMI and amortization calculator with live currency conversion")]
struct Args {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the monthly payment and amortization schedule
    Schedule(ScheduleArgs),
    /// List exchange rates for a base currency
    Rates(RatesArgs),
}

#[derive(clap::Args, Debug)]
struct ScheduleArgs {
    /// Amount borrowed
    #[arg(long, default_value = "100000")]
    principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long, default_value = "8.5")]
    rate: Decimal,

    /// Term in years
    #[arg(long, default_value = "5")]
    years: u32,

    /// Currency the loan is denominated in
    #[arg(long)]
    currency: Option<Currency>,

    /// Currency to display amounts in
    #[arg(long)]
    display: Option<Currency>,

    /// Zero-based page of the schedule to show
    #[arg(long, default_value = "0")]
    page: usize,

    /// Schedule rows per page
    #[arg(long, default_value = "12")]
    per_page: NonZeroUsize,

    /// Show every row of the schedule
    #[arg(long)]
    all: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct RatesArgs {
    /// Base currency of the table
    #[arg(long)]
    base: Option<Currency>,

    /// Only show codes containing this text
    #[arg(long, default_value = "")]
    search: String,

    /// Zero-based page of the listing
    #[arg(long, default_value = "0")]
    page: usize,

    /// Rates per page
    #[arg(long, default_value = "10")]
    per_page: NonZeroUsize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    ));
    if args.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config = FxServiceConfig::from_env();
    if let Err(e) = config.validate() {
        bail!("Configuration error: {}", e);
    }

    match args.command {
        Command::Schedule(schedule) => run_schedule(schedule, &config).await,
        Command::Rates(rates) => run_rates(rates, &config).await,
    }
}

async fn run_schedule(args: ScheduleArgs, config: &FxServiceConfig) -> anyhow::Result<()> {
    let params = LoanParameters::new(args.principal, args.rate, args.years);
    let quote = amortize(&params);

    if quote.is_empty() {
        warn!(
            principal = %params.principal,
            rate = %params.annual_rate_percent,
            years = params.term_years,
            "Loan inputs rejected, nothing to amortize"
        );
    }

    let base = args.currency.unwrap_or_else(|| config.initial_base.clone());
    let display = args.display.unwrap_or_else(|| base.clone());

    let state = if display == base {
        None
    } else {
        Some(load_rates(base.clone(), config).await?)
    };

    let currency = match &state {
        Some(state) if !state.convert_detailed(Decimal::ONE, &display).is_converted() => {
            let display_currency = &display;
            warn!(
                base = %base,
                display = %display_currency,
                status = %state.status,
                "No rate available, showing amounts unconverted"
            );
            base.clone()
        }
        _ => display.clone(),
    };
    let convert = |amount: Decimal| match &state {
        Some(state) => state.convert(amount, &display),
        None => amount,
    };

    let rows = if args.all {
        quote.schedule.entries()
    } else {
        let per_page = args.per_page.get();
        let pages = quote.schedule.page_count(per_page);
        if args.page >= pages && pages > 0 {
            bail!("Page {} is out of range; the schedule has {} pages", args.page, pages);
        }
        quote.schedule.page(args.page, per_page)
    };
    let report = LoanReport::build(&quote, rows, currency, convert);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }

    Ok(())
}

async fn run_rates(args: RatesArgs, config: &FxServiceConfig) -> anyhow::Result<()> {
    let base = args.base.unwrap_or_else(|| config.initial_base.clone());
    let state = load_rates(base.clone(), config).await?;

    if state.status != ConversionStatus::Ready {
        bail!(
            "Could not load rates for {}: {}",
            base,
            state.last_error.as_deref().unwrap_or("unknown error")
        );
    }

    let Some(table) = state.rates.as_deref() else {
        bail!("Rate table for {} is empty", base);
    };
    print!("{}", render_rates(table, &args.search, args.page, args.per_page.get()));

    Ok(())
}

/// Fetch the rate table for `base` and wait for the request to settle.
async fn load_rates(base: Currency, config: &FxServiceConfig) -> anyhow::Result<ConversionState> {
    let provider = ExchangeRateApiProvider::from_config(config)
        .context("Rate provider unavailable; set EXCHANGE_RATE_API_KEY")?;
    let service = RateConversionService::new(Arc::new(provider), config);

    service.set_base_currency(base);
    let state = service.settled().await;

    match &state.last_error {
        Some(error) => warn!(base = %state.base_currency, error = %error, "Rate fetch failed"),
        None => info!(
            base = %state.base_currency,
            currencies = state.rates.as_ref().map_or(0, |t| t.len()),
            "Rates ready"
        ),
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_per_page_rejected() {
        assert!(Args::try_parse_from(["emicalc", "schedule", "--per-page", "0"]).is_err());
        assert!(Args::try_parse_from(["emicalc", "rates", "--per-page", "0"]).is_err());
    }

    #[test]
    fn test_schedule_defaults() {
        let args = Args::try_parse_from(["emicalc", "schedule", "--display", "eur"]).unwrap();

        let Command::Schedule(schedule) = args.command else {
            panic!("expected schedule subcommand");
        };
        assert_eq!(schedule.per_page.get(), 12);
        assert_eq!(schedule.principal, Decimal::from(100_000));
        assert_eq!(schedule.display, Some(Currency::eur()));
    }
}
