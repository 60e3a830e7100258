use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use balance_tracker::core::{
    account_balance, monthly_expense_total, monthly_income_total, total_balance, Account,
    Projection, Revenue, Subscription,
};
use balance_tracker::rates::{CurrencyConverter, NbuClient, RateSource, StaticRates};
use balance_tracker::store::{open_store, AuthState, DataStore, StoreError};

#[derive(Deserialize, Default)]
#[serde(default)]
struct RatesConfig {
    base_url: Option<String>,
    offline: bool,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Config {
    data_dir: Option<PathBuf>,
    rates: RatesConfig,
}

#[derive(Parser)]
#[command(name = "balance", about = "Track accounts, subscriptions and revenue in USD")]
struct Cli {
    /// Signed-in owner; omit to use the shared local profile
    #[arg(long, global = true)]
    user: Option<String>,
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,
    /// Use the built-in fixed rate table instead of the live rate service
    #[arg(long, global = true)]
    offline: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage finance accounts
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Manage recurring subscriptions
    Subscription {
        #[command(subcommand)]
        command: SubscriptionCommand,
    },
    /// Manage revenue sources
    Revenue {
        #[command(subcommand)]
        command: RevenueCommand,
    },
    /// Project per-account and total balances for a date
    Balance {
        /// Target date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show monthly-normalized subscription and revenue totals
    Summary,
    /// List derived transactions within a date range
    History {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
}

#[derive(Subcommand)]
enum AccountCommand {
    /// Add an account
    Add {
        #[arg(long)]
        name: String,
        /// Base amount; may be negative for debt accounts
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        #[arg(long)]
        currency: String,
    },
    /// List all accounts
    List,
    /// Change fields of an existing account
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<f64>,
        #[arg(long)]
        currency: Option<String>,
    },
    /// Remove an account; its recurring items are kept and orphaned
    Remove {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
enum SubscriptionCommand {
    /// Add a subscription
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        currency: String,
        /// monthly or yearly
        #[arg(long)]
        period: String,
        /// Date of the first charge (YYYY-MM-DD)
        #[arg(long)]
        starts: NaiveDate,
        /// Account the charge applies to
        #[arg(long)]
        account: Option<String>,
    },
    /// List all subscriptions
    List,
    /// Change fields of an existing subscription
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        starts: Option<NaiveDate>,
        #[arg(long)]
        account: Option<String>,
    },
    /// Remove a subscription
    Remove {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
enum RevenueCommand {
    /// Add a revenue source
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        currency: String,
        /// monthly, yearly or once
        #[arg(long)]
        period: String,
        /// Date of the first (or only) payment (YYYY-MM-DD)
        #[arg(long)]
        starts: Option<NaiveDate>,
        /// Account the payment credits
        #[arg(long)]
        account: Option<String>,
    },
    /// List all revenue sources
    List,
    /// Change fields of an existing revenue source
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        starts: Option<NaiveDate>,
        #[arg(long)]
        account: Option<String>,
    },
    /// Remove a revenue source
    Remove {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug)]
enum CliError {
    InvalidConfig(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

fn load_config(path: &PathBuf) -> Result<Config, CliError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(_) => return Ok(Config::default()),
    };
    toml::from_str(&data).map_err(|e| CliError::InvalidConfig(e.to_string()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let rt = tokio::runtime::Runtime::new()?;
    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;
    let data_dir = cfg.data_dir.clone().unwrap_or_else(|| PathBuf::from("data"));
    let state = AuthState::from_user(cli.user.clone());
    let mut store = open_store(&state, &data_dir);

    match cli.command {
        Commands::Account { command } => handle_account(store.as_mut(), command)?,
        Commands::Subscription { command } => handle_subscription(store.as_mut(), command)?,
        Commands::Revenue { command } => handle_revenue(store.as_mut(), command)?,
        query => {
            if cli.offline || cfg.rates.offline {
                let converter = CurrencyConverter::new(StaticRates::new());
                rt.block_on(run_query(&converter, store.as_ref(), query))?;
            } else {
                let client = match &cfg.rates.base_url {
                    Some(base) => NbuClient::with_base_url(base)?,
                    None => NbuClient::new()?,
                };
                let converter = CurrencyConverter::new(client);
                rt.block_on(run_query(&converter, store.as_ref(), query))?;
            }
        }
    }

    Ok(())
}

async fn run_query<S: RateSource>(
    converter: &CurrencyConverter<S>,
    store: &dyn DataStore,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Balance { date } => {
            let target = date.unwrap_or_else(|| Utc::now().date_naive());
            let accounts = store.accounts()?;
            let projection = Projection::build(
                converter,
                &store.subscriptions()?,
                &store.revenues()?,
                target,
            )
            .await;
            for account in &accounts {
                let balance = account_balance(converter, account, &projection).await;
                println!("{:<28} {:>16}", account.name, format_usd(balance));
            }
            let total = total_balance(converter, &accounts, &projection).await;
            println!("{:<28} {:>16}", format!("total at {target}"), format_usd(total));
        }
        Commands::Summary => {
            let subscriptions = monthly_expense_total(converter, &store.subscriptions()?).await;
            let revenue = monthly_income_total(converter, &store.revenues()?).await;
            println!("monthly subscriptions: {}", format_usd(subscriptions));
            println!("monthly revenue:       {}", format_usd(revenue));
        }
        Commands::History { start, end } => {
            let projection =
                Projection::build(converter, &store.subscriptions()?, &store.revenues()?, end)
                    .await;
            for transaction in projection.between(start, end) {
                println!(
                    "{} {:>16}  {}",
                    transaction.date,
                    format_usd(transaction.amount_usd),
                    transaction.description
                );
            }
        }
        Commands::Account { .. } | Commands::Subscription { .. } | Commands::Revenue { .. } => {
            unreachable!()
        }
    }
    Ok(())
}

fn handle_account(
    store: &mut dyn DataStore,
    command: AccountCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        AccountCommand::Add {
            name,
            amount,
            currency,
        } => {
            let account = Account::new(name, amount, currency.parse()?)?;
            println!("added account {}", account.id);
            store.add_account(account)?;
        }
        AccountCommand::List => {
            for account in store.accounts()? {
                println!(
                    "{} | {} | {} {}",
                    account.id, account.name, account.amount, account.currency
                );
            }
        }
        AccountCommand::Edit {
            id,
            name,
            amount,
            currency,
        } => {
            let mut account = store
                .accounts()?
                .into_iter()
                .find(|a| a.id == id)
                .ok_or(StoreError::NotFound)?;
            if let Some(name) = name {
                account.name = name;
            }
            if let Some(amount) = amount {
                account.amount = amount;
            }
            if let Some(currency) = currency {
                account.currency = currency.parse()?;
            }
            store.update_account(account)?;
        }
        AccountCommand::Remove { id } => {
            store.remove_account(&id)?;
        }
    }
    Ok(())
}

fn handle_subscription(
    store: &mut dyn DataStore,
    command: SubscriptionCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        SubscriptionCommand::Add {
            name,
            amount,
            currency,
            period,
            starts,
            account,
        } => {
            let subscription = Subscription::new(
                name,
                amount,
                currency.parse()?,
                period.parse()?,
                starts,
                account,
            )?;
            println!("added subscription {}", subscription.id);
            store.add_subscription(subscription)?;
        }
        SubscriptionCommand::List => {
            for sub in store.subscriptions()? {
                println!(
                    "{} | {} | {} {} | {} from {} | account {}",
                    sub.id,
                    sub.name,
                    sub.amount,
                    sub.currency,
                    sub.period,
                    sub.anchor,
                    sub.account_id.as_deref().unwrap_or("-")
                );
            }
        }
        SubscriptionCommand::Edit {
            id,
            name,
            amount,
            currency,
            period,
            starts,
            account,
        } => {
            let mut sub = store
                .subscriptions()?
                .into_iter()
                .find(|s| s.id == id)
                .ok_or(StoreError::NotFound)?;
            if let Some(name) = name {
                sub.name = name;
            }
            if let Some(amount) = amount {
                sub.amount = amount;
            }
            if let Some(currency) = currency {
                sub.currency = currency.parse()?;
            }
            if let Some(period) = period {
                sub.period = period.parse()?;
            }
            if let Some(starts) = starts {
                sub.anchor = starts;
            }
            if let Some(account) = account {
                sub.account_id = Some(account);
            }
            store.update_subscription(sub)?;
        }
        SubscriptionCommand::Remove { id } => {
            store.remove_subscription(&id)?;
        }
    }
    Ok(())
}

fn handle_revenue(
    store: &mut dyn DataStore,
    command: RevenueCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        RevenueCommand::Add {
            name,
            amount,
            currency,
            period,
            starts,
            account,
        } => {
            let revenue = Revenue::new(
                name,
                amount,
                currency.parse()?,
                period.parse()?,
                starts,
                account,
            )?;
            println!("added revenue {}", revenue.id);
            store.add_revenue(revenue)?;
        }
        RevenueCommand::List => {
            for rev in store.revenues()? {
                println!(
                    "{} | {} | {} {} | {} from {} | account {}",
                    rev.id,
                    rev.name,
                    rev.amount,
                    rev.currency,
                    rev.recurrence,
                    rev.anchor.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                    rev.account_id.as_deref().unwrap_or("-")
                );
            }
        }
        RevenueCommand::Edit {
            id,
            name,
            amount,
            currency,
            period,
            starts,
            account,
        } => {
            let mut rev = store
                .revenues()?
                .into_iter()
                .find(|r| r.id == id)
                .ok_or(StoreError::NotFound)?;
            if let Some(name) = name {
                rev.name = name;
            }
            if let Some(amount) = amount {
                rev.amount = amount;
            }
            if let Some(currency) = currency {
                rev.currency = currency.parse()?;
            }
            if let Some(period) = period {
                rev.recurrence = period.parse()?;
            }
            if let Some(starts) = starts {
                rev.anchor = Some(starts);
            }
            if let Some(account) = account {
                rev.account_id = Some(account);
            }
            store.update_revenue(rev)?;
        }
        RevenueCommand::Remove { id } => {
            store.remove_revenue(&id)?;
        }
    }
    Ok(())
}

/// Formats a USD amount as `$1,234.56`.
fn format_usd(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let mut digits = (cents / 100).to_string();
    let fraction = cents % 100;
    let mut grouped = String::new();
    while digits.len() > 3 {
        let split = digits.len() - 3;
        grouped = format!(",{}{}", &digits[split..], grouped);
        digits.truncate(split);
    }
    let sign = if negative { "-" } else { "" };
    format!("{sign}${digits}{grouped}.{fraction:02}")
}

#[cfg(test)]
mod tests {
    use super::format_usd;

    #[test]
    fn formats_grouped_usd() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(1234.5), "$1,234.50");
        assert_eq!(format_usd(-9876543.21), "-$9,876,543.21");
    }
}
