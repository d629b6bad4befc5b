use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use order_core::models::OrderRecord;
use order_core::store::{OrderStore, StoreRegistry};
use order_store_json::JsonStoreFactory;

use order_desk::config::{self, DeskConfig};
use order_desk::filter::{Month, OrderFilter, stats};
use order_desk::input::{apply_defaults, read_draft};
use order_desk::render::{build_preview, format_amount};
use order_desk::{export, logging};

/// Purchase-order desk: register orders from draft files, browse and filter
/// the saved list, and render printable order forms.
#[derive(Parser, Debug)]
#[command(name = "order-desk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a config file (overrides ORDER_DESK_CONFIG and ./order-desk.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new order from a TOML draft file
    Register {
        /// Path to the draft file
        file: PathBuf,
    },
    /// List saved orders with optional filtering
    List {
        /// Only orders whose order date falls in this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<Month>,

        /// Case-insensitive search over supplier, order number and company
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one order in full
    Show {
        /// Order id
        id: String,
    },
    /// Render the printable order form as HTML
    Render {
        /// Order id
        id: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the (filtered) order list
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long)]
        month: Option<Month>,

        #[arg(short, long)]
        search: Option<String>,
    },
    /// Delete one order by id
    Delete {
        /// Order id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every saved order
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Order count and pre-tax item total for the (filtered) list
    Stats {
        #[arg(short, long)]
        month: Option<Month>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ExportFormat {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };
    debug!(backend = %config.store.backend, location = %config.store.location, "store configured");

    let mut registry = StoreRegistry::new();
    registry.register(Box::new(JsonStoreFactory));
    let store = registry
        .create(&config.store_config())
        .await
        .with_context(|| format!("cannot open order store '{}'", config.store.location))?;

    match cli.command {
        Command::Register { file } => register(store.as_ref(), &config, &file).await,
        Command::List { month, search } => list(store.as_ref(), OrderFilter { search, month }).await,
        Command::Show { id } => show(store.as_ref(), &config, &id).await,
        Command::Render { id, output } => render(store.as_ref(), &config, &id, output).await,
        Command::Export {
            format,
            output,
            month,
            search,
        } => {
            export_list(
                store.as_ref(),
                &config,
                format,
                output,
                OrderFilter { search, month },
            )
            .await
        }
        Command::Delete { id, yes } => delete(store.as_ref(), &id, yes).await,
        Command::Clear { yes } => clear(store.as_ref(), yes).await,
        Command::Stats { month } => {
            show_stats(
                store.as_ref(),
                OrderFilter {
                    search: None,
                    month,
                },
            )
            .await
        }
    }
}

async fn register(
    store: &dyn OrderStore,
    config: &DeskConfig,
    file: &std::path::Path,
) -> Result<()> {
    let mut draft =
        read_draft(file).with_context(|| format!("cannot load draft '{}'", file.display()))?;
    apply_defaults(&mut draft, config);

    let record = draft.normalize();
    let totals = record.totals(config.rounding);

    store.insert(&record).await.context("cannot save order")?;

    println!("Registered order {} (id {})", record.order_number, record.id);
    println!(
        "  subtotal {}  tax {}  total {}",
        format_amount(totals.subtotal),
        format_amount(totals.tax),
        format_amount(totals.total),
    );
    Ok(())
}

async fn list(
    store: &dyn OrderStore,
    filter: OrderFilter,
) -> Result<()> {
    let records = store.load_all().await.context("cannot load orders")?;
    let hits = filter.apply(&records);

    if hits.is_empty() {
        println!("No orders found.");
        return Ok(());
    }

    println!(
        "{:<14}  {:<20}  {:<10}  {:<20}  {:>12}",
        "ID", "ORDER NO", "DATE", "SUPPLIER", "ITEM TOTAL"
    );
    for record in &hits {
        let amount: rust_decimal::Decimal =
            record.items.iter().map(|item| item.subtotal()).sum();
        println!(
            "{:<14}  {:<20}  {:<10}  {:<20}  {:>12}",
            record.id,
            record.order_number,
            record.order_date,
            record.supplier_name,
            format_amount(amount),
        );
    }

    let stats = stats(hits.iter().copied());
    println!(
        "\n{} orders, pre-tax item total {}",
        stats.order_count,
        format_amount(stats.item_total)
    );
    Ok(())
}

async fn find_order(
    store: &dyn OrderStore,
    id: &str,
) -> Result<OrderRecord> {
    let records = store.load_all().await.context("cannot load orders")?;
    match records.into_iter().find(|record| record.matches_id(id)) {
        Some(record) => Ok(record),
        None => bail!("no order with id '{id}'"),
    }
}

async fn show(
    store: &dyn OrderStore,
    config: &DeskConfig,
    id: &str,
) -> Result<()> {
    let record = find_order(store, id).await?;
    let totals = record.totals(config.rounding);

    println!("Order {} (id {})", record.order_number, record.id);
    println!("  date:           {}", record.order_date);
    println!("  supplier:       {}", record.supplier_name);
    println!("  address:        {}", record.supplier_address);
    if !record.contact_person.is_empty() {
        println!("  contact:        {}", record.contact_person);
    }
    println!("  completion:     {}", record.completion_month);
    if !record.payment_terms.is_empty() {
        println!("  payment terms:  {}", record.payment_terms);
    }
    println!("  items:");
    for item in record.renderable_items() {
        println!(
            "    {} x{} {} @ {} = {}",
            item.name,
            item.quantity.normalize(),
            item.unit,
            format_amount(item.price),
            format_amount(item.subtotal()),
        );
    }
    println!(
        "  subtotal {}  tax {}  total {}",
        format_amount(totals.subtotal),
        format_amount(totals.tax),
        format_amount(totals.total),
    );
    Ok(())
}

async fn render(
    store: &dyn OrderStore,
    config: &DeskConfig,
    id: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let record = find_order(store, id).await?;
    let html = build_preview(&record, config.rounding)
        .with_context(|| format!("cannot render order '{id}'"))?;

    match output {
        Some(path) => {
            std::fs::write(&path, html)
                .with_context(|| format!("cannot write '{}'", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}

async fn export_list(
    store: &dyn OrderStore,
    config: &DeskConfig,
    format: ExportFormat,
    output: Option<PathBuf>,
    filter: OrderFilter,
) -> Result<()> {
    let records = store.load_all().await.context("cannot load orders")?;
    let hits = filter.apply(&records);

    let mut buffer = Vec::new();
    match format {
        ExportFormat::Json => export::write_json(&hits, &mut buffer)?,
        ExportFormat::Csv => export::write_csv(&hits, config.rounding, &mut buffer)?,
    }

    match output {
        Some(path) => {
            std::fs::write(&path, &buffer)
                .with_context(|| format!("cannot write '{}'", path.display()))?;
            println!("Exported {} orders to {}", hits.len(), path.display());
        }
        None => std::io::stdout().write_all(&buffer)?,
    }
    Ok(())
}

async fn delete(
    store: &dyn OrderStore,
    id: &str,
    yes: bool,
) -> Result<()> {
    let record = find_order(store, id).await?;

    if !yes && !confirm(&format!("Delete order {} (id {})?", record.order_number, id))? {
        println!("Aborted.");
        return Ok(());
    }

    store.delete_by_id(id).await.context("cannot delete order")?;
    println!("Deleted order {id}.");
    Ok(())
}

async fn clear(
    store: &dyn OrderStore,
    yes: bool,
) -> Result<()> {
    let count = store.load_all().await.context("cannot load orders")?.len();
    if count == 0 {
        println!("No orders to delete.");
        return Ok(());
    }

    if !yes && !confirm(&format!("Delete all {count} orders?"))? {
        println!("Aborted.");
        return Ok(());
    }

    store.clear().await.context("cannot clear orders")?;
    println!("Deleted {count} orders.");
    Ok(())
}

async fn show_stats(
    store: &dyn OrderStore,
    filter: OrderFilter,
) -> Result<()> {
    let records = store.load_all().await.context("cannot load orders")?;
    let stats = stats(filter.apply(&records));

    println!("orders:         {}", stats.order_count);
    println!("pre-tax total:  {}", format_amount(stats.item_total));
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
