//! Pocketbook main entry point

use anyhow::{bail, Context};
use chrono::{DateTime, FixedOffset, Local, Utc};
use clap::{Parser, Subcommand};
use pocketbook_config::{Config, ConfigError};
use pocketbook_core::{
    available_categories, category_breakdown, query, query_pockets, serialize, AmountBucket,
    CoreError, DateRange, ExportSelection, FilterConfig, PocketFilter, PocketQuery,
    PocketSortKey, PocketTypeFilter, QueryConfig, RecordSection, Snapshot, SortKey, SortOrder,
    TransactionType, TypeFilter,
};
use pocketbook_utils::{format_number, truncate_display};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "pocketbook")]
#[command(version = "0.1.0")]
#[command(
    about = "Query, filter and export personal-finance transactions and pockets",
    long_about = None
)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "pocketbook.yaml")]
    config: PathBuf,

    /// Snapshot file, overriding data.snapshot_path
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List transactions matching filters and search text
    Query {
        /// all, today, week, month, quarter, year or START..END
        #[arg(short, long)]
        range: Option<DateRange>,
        /// Category to include; repeat for several
        #[arg(short = 'C', long = "category")]
        categories: Vec<String>,
        /// all, under50, 50to100, 100to500, over500
        #[arg(short, long, default_value = "all")]
        amount: AmountBucket,
        /// Pocket id, "unlinked" or "all"
        #[arg(short, long, default_value = "all")]
        pocket: String,
        /// all, income or expense
        #[arg(short = 't', long = "type", default_value = "all")]
        transaction_type: TypeFilter,
        /// Case-insensitive text matched against title, category and pocket name
        #[arg(short = 'q', long, default_value = "")]
        search: String,
        #[arg(long)]
        sort: Option<SortKey>,
        #[arg(long)]
        order: Option<SortOrder>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List pockets with goal progress
    Pockets {
        /// all, standard or goal
        #[arg(short = 't', long = "type", default_value = "all")]
        pocket_type: PocketTypeFilter,
        #[arg(short = 'q', long, default_value = "")]
        search: String,
        /// name, balance or progress
        #[arg(long, default_value = "name")]
        sort: PocketSortKey,
        #[arg(long, default_value = "asc")]
        order: SortOrder,
        #[arg(long)]
        json: bool,
    },
    /// Per-category income and expense totals
    Categories {
        /// all, today, week, month, quarter, year or START..END
        #[arg(short, long)]
        range: Option<DateRange>,
        #[arg(long)]
        json: bool,
    },
    /// Write CSV files for the selected sections
    Export {
        #[arg(short, long)]
        range: Option<DateRange>,
        /// Sections to write (transactions, pockets, reports); defaults from config
        #[arg(long, value_delimiter = ',')]
        sections: Vec<String>,
        /// Output directory, overriding export.output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Command::InitConfig { force } = &args.command {
        env_logger::init();
        return Ok(init_config(&args.config, *force)?);
    }

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound { path }) => {
            eprintln!("[WARN] Config file not found: {}, using defaults", path);
            Config::default()
        }
        Err(e) => {
            eprintln!("{}", e.to_details());
            std::process::exit(2);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let rt = Runtime::new()?;
    let result = rt.block_on(run(args, config));

    if let Err(e) = result {
        match e.downcast_ref::<CoreError>() {
            Some(core) => eprintln!("{}", core.to_details()),
            None => eprintln!("[ERROR] {:#}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let now = local_now(&config);
    let snapshot_path = args
        .snapshot
        .unwrap_or_else(|| config.data.snapshot_path.clone());
    let snapshot = load_snapshot(&snapshot_path, now.offset()).await?;

    match args.command {
        Command::Query {
            range,
            categories,
            amount,
            pocket,
            transaction_type,
            search,
            sort,
            order,
            json,
        } => {
            let mut query_config = QueryConfig::from_defaults(&config.query);
            if let Some(range) = range {
                query_config.filter.date_range = range;
            }
            query_config.filter.categories = categories.into_iter().collect();
            query_config.filter.amount_bucket = amount;
            query_config.filter.pocket = PocketFilter::from(pocket);
            query_config.filter.transaction_type = transaction_type;
            query_config.search = search;
            if let Some(key) = sort {
                query_config.sort.key = key;
            }
            if let Some(order) = order {
                query_config.sort.order = order;
            }

            let result = query(&snapshot, &query_config, &now)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            let index = snapshot.pocket_index();
            for t in &result.results {
                println!(
                    "{}  {:<28} {:<16} {:>14}  {}",
                    t.local_date(now.offset()),
                    truncate_display(&t.title, 28),
                    truncate_display(&t.category, 16),
                    money(&config, t.signed_amount()),
                    truncate_display(index.label(t), config.display.name_max_chars)
                );
            }
            println!(
                "\n{} transactions ({} filters active, {})",
                result.summary.count,
                result.active_filter_count,
                query_config.filter.date_range.description()
            );
            println!("  income   {}", money(&config, result.summary.income));
            println!("  expenses {}", money(&config, result.summary.expenses));
            println!("  net      {}", money(&config, result.summary.net));
        }
        Command::Pockets {
            pocket_type,
            search,
            sort,
            order,
            json,
        } => {
            let pocket_query = PocketQuery {
                type_filter: pocket_type,
                search,
                sort_key: sort,
                order,
            };
            let result = query_pockets(&snapshot, &pocket_query);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            for view in &result.pockets {
                let target = view
                    .pocket
                    .target_amount
                    .map(|t| money(&config, t))
                    .unwrap_or_default();
                println!(
                    "{:<width$}  {:<8} {:>14} {:>14} {:>7}%  {} txns",
                    truncate_display(&view.pocket.name, config.display.name_max_chars),
                    view.pocket.pocket_type,
                    money(&config, view.pocket.current_balance),
                    target,
                    format!("{:.2}", view.progress),
                    view.transaction_count,
                    width = config.display.name_max_chars
                );
            }
            println!(
                "\n{} pockets, {} goals ({} completed), total {}",
                result.overview.pocket_count,
                result.overview.goal_count,
                result.overview.completed_goals,
                money(&config, result.overview.total_balance)
            );
        }
        Command::Categories { range, json } => {
            let range = range.unwrap_or_else(|| DateRange::from(config.query.default_range));
            let windowed = QueryConfig {
                filter: FilterConfig::new().with_date_range(range),
                ..QueryConfig::from_defaults(&config.query)
            };
            let result = query(&snapshot, &windowed, &now)?;
            let known = available_categories(&snapshot.transactions);
            let income = category_breakdown(&result.results, TransactionType::Income);
            let expenses = category_breakdown(&result.results, TransactionType::Expense);
            if json {
                let body = serde_json::json!({
                    "range": range.description(),
                    "categories": known,
                    "income": income,
                    "expenses": expenses,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            println!("{} ({} known categories)", range.description(), known.len());
            for (heading, rows) in [("Income", &income), ("Expenses", &expenses)] {
                println!("\n{}", heading);
                for row in rows {
                    println!(
                        "  {:<24} {:>14} {:>7}%  {} txns",
                        truncate_display(&row.category, 24),
                        money(&config, row.total),
                        format!("{:.2}", row.percentage),
                        row.count
                    );
                }
            }
        }
        Command::Export {
            range,
            sections,
            output,
        } => {
            let range = range.unwrap_or_else(|| DateRange::from(config.query.default_range));
            let selection = export_selection(&config, &sections)?;
            let record_set = serialize(
                &snapshot.transactions,
                &snapshot.pockets,
                &range,
                selection,
                &now,
            )?;

            let output_dir = output.unwrap_or_else(|| config.export.output_dir.clone());
            tokio::fs::create_dir_all(&output_dir)
                .await
                .with_context(|| format!("creating {}", output_dir.display()))?;

            let stamp = now.format("%Y-%m-%d").to_string();
            for section in &record_set.sections {
                let path = output_dir.join(format!("pocketbook-{}-{}.csv", section.kind, stamp));
                let bytes = write_csv(section, config.export.delimiter)?;
                tokio::fs::write(&path, bytes)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?;
                log::info!(
                    target: "pocketbook::export",
                    "wrote {} rows to {}",
                    section.rows.len(),
                    path.display()
                );
                println!("Wrote {}", path.display());
            }
        }
        Command::InitConfig { force } => init_config(&args.config, force)?,
    }

    Ok(())
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }
    std::fs::write(path, Config::generate_default())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn local_now(config: &Config) -> DateTime<FixedOffset> {
    match config
        .time
        .utc_offset_minutes
        .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
    {
        Some(offset) => Utc::now().with_timezone(&offset),
        None => DateTime::<FixedOffset>::from(Local::now()),
    }
}

async fn load_snapshot(path: &Path, offset: &FixedOffset) -> anyhow::Result<Snapshot> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot = Snapshot::from_json(&content, offset)?;
    log::info!(
        target: "pocketbook",
        "loaded {} transactions and {} pockets from {}",
        snapshot.transactions.len(),
        snapshot.pockets.len(),
        path.display()
    );
    Ok(snapshot)
}

fn export_selection(config: &Config, sections: &[String]) -> anyhow::Result<ExportSelection> {
    if sections.is_empty() {
        return Ok(ExportSelection::from(&config.export));
    }

    let mut selection = ExportSelection {
        transactions: false,
        pockets: false,
        reports: false,
    };
    for name in sections {
        match name.trim().to_lowercase().as_str() {
            "transactions" => selection.transactions = true,
            "pockets" => selection.pockets = true,
            "reports" => selection.reports = true,
            other => bail!("unknown export section '{}'", other),
        }
    }
    Ok(selection)
}

fn write_csv(section: &RecordSection, delimiter: char) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .from_writer(Vec::new());
    writer.write_record(&section.headers)?;
    for row in &section.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing {} csv: {}", section.kind, e))
}

fn money(config: &Config, amount: Decimal) -> String {
    let places = config.display.decimal_places as usize;
    let fixed = format!("{:.*}", places, amount);
    format!("{} {}", format_number(fixed), config.display.currency)
}
