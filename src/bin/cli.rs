use anyhow::Result;
use chrono::NaiveDate;
use colored::*;
use disclosure::{
    edgar::{
        self, filing::FilingMetadata, pager::FilingPager, query::Query, report::ReportType,
        search::SearchClient, xbrl::XbrlClient,
    },
    mapping::{EnrichedRow, MappingTable},
    reporting::{self, RankingFilter},
    upload,
    utils::dirs,
    BatchProcessor, BatchStatus, DisclosureConfig, DisclosureError, ProgressTracker,
    ReconcileConfig, RunMode, StopSignal,
};
use std::path::PathBuf;
use std::sync::Arc;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "disclosure-cli",
    about = "Analyze expense and performance disclosures in iXBRL-tagged fund filings"
)]
struct Opt {
    /// Share-class reference table (classid, Ticker, Class Name, Series Name, Series ID)
    #[structopt(long, parse(from_os_str))]
    mapping: Option<PathBuf>,

    /// Where to write the CSV results
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Ranking filter: maximum expense amount ($)
    #[structopt(long, default_value = "100")]
    max_expense: f64,

    /// Ranking filter: minimum performance
    #[structopt(long, default_value = "0")]
    min_performance: f64,

    /// Number of funds shown in each ranking
    #[structopt(long, default_value = "10")]
    top: usize,

    /// Hide the progress bar
    #[structopt(short, long)]
    quiet: bool,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Search filings by form type and filing date
    Search {
        /// Form type to include, repeatable (defaults to N-CSR and N-CSRS)
        #[structopt(long = "form-type")]
        form_types: Vec<ReportType>,
        /// First filing date, YYYY-MM-DD
        #[structopt(long)]
        from: NaiveDate,
        /// Last filing date, YYYY-MM-DD
        #[structopt(long)]
        to: NaiveDate,
        /// Restrict to these fund filers, repeatable
        #[structopt(long = "cik")]
        ciks: Vec<String>,
        /// Number of filings to check
        #[structopt(long, default_value = "20")]
        limit: usize,
        /// expenses, performance or full
        #[structopt(long, default_value = "performance")]
        mode: RunMode,
    },
    /// Process filings listed in a CSV file with a filingURL column
    Upload {
        #[structopt(parse(from_os_str))]
        file: PathBuf,
        #[structopt(long, default_value = "expenses")]
        mode: RunMode,
    },
    /// Average annual returns from the latest filing of each fund filer
    Latest {
        #[structopt(long = "cik", required = true)]
        ciks: Vec<String>,
    },
}

async fn collect_filings(
    cmd: &Command,
    search: &SearchClient,
) -> Result<(Vec<FilingMetadata>, RunMode)> {
    match cmd {
        Command::Search {
            form_types,
            from,
            to,
            ciks,
            limit,
            mode,
        } => {
            let form_types = if form_types.is_empty() {
                ReportType::shareholder_reports()
            } else {
                form_types.clone()
            };
            for rt in &form_types {
                if let ReportType::Other(form) = rt {
                    log::warn!(
                        "Unrecognized form type {} (known: {})",
                        form,
                        ReportType::list_types()
                    );
                }
            }
            println!("{}", "Searching SEC filings...".blue());
            let query = Query::new(form_types, *from, *to).with_ciks(ciks.clone());
            let filings = FilingPager::new(search).collect(&query, *limit).await?;
            Ok((filings, *mode))
        }
        Command::Upload { file, mode } => Ok((upload::read_filing_list(file)?, *mode)),
        Command::Latest { ciks } => {
            let mut filings = Vec::new();
            for cik in ciks {
                match edgar::latest_filing(search, cik).await {
                    Ok(filing) => {
                        println!("Latest filing for CIK {}: {}", cik, filing.filing_reference);
                        filings.push(filing);
                    }
                    Err(e) => println!("{} {}", "No data found for".yellow(), format!("CIK {}: {}", cik, e)),
                }
            }
            Ok((filings, RunMode::Performance))
        }
    }
}

fn label(value: Option<&str>) -> &str {
    value.unwrap_or("Data not available")
}

fn print_table(title: &str, rows: &[&EnrichedRow]) {
    println!("\n{}", title.bold());
    if rows.is_empty() {
        println!("  {}", "No funds match the filter.".dimmed());
        return;
    }
    println!(
        "  {:<30} {:<30} {:<12} {:>12} {:>12}",
        "Entity Name", "Series Name", "classid", "expense_amt", "performance"
    );
    for row in rows {
        let value = |v: &Option<disclosure::edgar::parsing::FactValue>| {
            v.as_ref().map(|v| v.to_string()).unwrap_or_default()
        };
        println!(
            "  {:<30} {:<30} {:<12} {:>12} {:>12}",
            label(row.entity_name()),
            label(row.series_name()),
            row.row.class_id,
            value(&row.row.expense_amt),
            value(&row.row.performance_pct)
        );
    }
}

fn print_report(opt: &Opt, rows: &[EnrichedRow], mode: RunMode) {
    let summary = reporting::summarize(rows);

    if mode.includes_performance() {
        println!(
            "{}",
            format!(
                "{} out of {} share classes ({}%) disclose performance information.",
                summary.disclosing,
                summary.share_classes,
                summary.class_percent()
            )
            .green()
        );
        if let (Some(entities), Some(pct)) = (&summary.entities, summary.entity_percent()) {
            println!(
                "{} out of {} entities ({}%) disclose performance information.",
                entities.disclosing, entities.total, pct
            );
            for (entity, count) in reporting::performance_by_entity(rows) {
                println!("  {:<40} {}", entity, count);
            }
        }

        let filter = RankingFilter {
            max_expense: opt.max_expense,
            min_performance: opt.min_performance,
            top_n: opt.top,
        };
        print_table(
            &format!("Lowest Expense Funds (filtered to <= ${})", filter.max_expense),
            &reporting::lowest_expense(rows, &filter),
        );
        print_table(
            &format!("Highest Performance Funds (filtered to >= {})", filter.min_performance),
            &reporting::highest_performance(rows, &filter),
        );
    } else {
        println!(
            "{}",
            format!("Extracted {} share-class rows.", summary.share_classes).green()
        );
    }
}

async fn run(opt: &Opt, stop: Arc<StopSignal>) -> Result<()> {
    let config = DisclosureConfig::from_env()?;

    let mapping_path = opt.mapping.clone().unwrap_or_else(|| config.mapping_file.clone());
    let mapping = MappingTable::from_path(&mapping_path)?;

    let http_client = config.http_client()?;
    let search = SearchClient::new(
        http_client.clone(),
        &config.api_url,
        &config.api_key,
        &config.user_agent,
    );
    let xbrl = Arc::new(XbrlClient::new(
        http_client,
        &config.api_url,
        &config.api_key,
        &config.user_agent,
    ));

    let (filings, mode) = collect_filings(&opt.cmd, &search).await?;
    if filings.is_empty() {
        println!("{}", "No filings found.".red());
        return Ok(());
    }
    println!("Checking {} filings ({} mode)...", filings.len(), mode);

    let processor = BatchProcessor::new(xbrl, ReconcileConfig::for_mode(mode))
        .with_concurrency(config.concurrency)
        .with_unit_timeout(config.unit_timeout)
        .with_stop_signal(stop);

    let mut tracker = if opt.quiet {
        ProgressTracker::hidden()
    } else {
        ProgressTracker::new(filings.len() as u64)
    };
    let result = processor.run(&filings, &mapping, &mut tracker).await?;
    tracker.finish(&result.progress);

    if result.status == BatchStatus::Aborted {
        println!(
            "{}",
            format!(
                "Stopped early: {} of {} filings processed, keeping partial results.",
                result.progress.processed, result.progress.total
            )
            .yellow()
        );
    }

    print_report(opt, &result.rows, mode);

    let output = opt
        .output
        .clone()
        .unwrap_or_else(|| dirs::default_export_path(&config.data_dir));
    reporting::export_csv(&output, &result.rows, mode.includes_performance())?;
    println!("Results written to {}", output.display());

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    log::debug!("Logger initialized");

    let opt = Opt::from_args();

    let stop = Arc::new(StopSignal::new());
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        println!("\nReceived Ctrl+C! Stopping, results of finished filings are kept.");
        handler_stop.stop();
    })?;

    if let Err(e) = run(&opt, stop).await {
        match e.downcast_ref::<DisclosureError>() {
            Some(DisclosureError::EmptyResult) => eprintln!("{}", "No valid data extracted.".red()),
            Some(DisclosureError::Configuration(message)) => eprintln!("{} {}", "Configuration error:".red().bold(), message),
            _ => eprintln!("{} {:#}", "Error:".red().bold(), e),
        }
        std::process::exit(1);
    }

    Ok(())
}
