use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Local};
use clap::Parser;
use tracing::{error, info};

use tjnj::cli::{self, Args};
use tjnj::config::{self, get_base_path};
use tjnj::directory::UrlDirectory;
use tjnj::logging::init_logging;
use tjnj::prompt::{AssumeYes, Confirm, Interactive};
use tjnj::rename::Renamed;
use tjnj::scrape;

/// Rounds allowed per year when nobody is there to say stop.
const UNATTENDED_ROUNDS: usize = 3;

fn format_duration(start: DateTime<Local>, end: DateTime<Local>) -> String {
    let duration = end.signed_duration_since(start);
    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.num_milliseconds() % 1000;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, millis)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let program_start = Local::now();
    info!("Start: {}", program_start.format("%Y-%m-%d %H:%M:%S"));

    let mut config = config::load_config(args.config.as_deref());
    args.apply(&mut config);
    if args.yes && config.max_rounds == 0 {
        config.max_rounds = UNATTENDED_ROUNDS;
    }

    let urls_path = match &args.urls {
        Some(path) => path.clone(),
        None => get_base_path(&config.urls_file),
    };
    let mut directory = UrlDirectory::load(&urls_path)
        .with_context(|| format!("unable to load yearbook URLs from {}", urls_path.display()))?;

    // ============================================================
    // Download target
    // ============================================================
    let base = match (&args.dir, args.yes) {
        (Some(dir), _) => dir.clone(),
        (None, true) => PathBuf::from(&config.download_dir),
        (None, false) => cli::ask_dir()?,
    };
    if !base.is_dir() {
        bail!("download directory {} does not exist", base.display());
    }

    let province = match &args.province {
        Some(p) if directory.contains(&p.to_lowercase()) => p.to_lowercase(),
        Some(p) if args.yes => bail!("province `{}` not recognized", p),
        _ => cli::ask_province(&directory)?,
    };
    if let Some(note) = directory.note(&province).filter(|n| !n.is_empty()) {
        println!("NOTE: {}", note);
    }

    let current_year = Local::now().year();
    let range = match &args.years {
        Some(input) => cli::parse_years(input, current_year)?,
        None if args.yes => bail!("--years is required with --yes"),
        None => cli::ask_years(current_year)?,
    };

    let proxy = match &args.proxy {
        Some(p) => Some(p.clone()),
        None if args.yes => None,
        None => cli::ask_proxy()?,
    };

    let years = cli::resolve_years(&mut directory, &province, range, !args.yes)?;

    // ============================================================
    // One browser per year
    // ============================================================
    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(Interactive)
    };
    let mut failed_years = Vec::new();
    for (year, url) in &years {
        info!("========== {} {} ==========", province, year);
        match scrape::scrape_year(
            &config,
            &base,
            &province,
            *year,
            url,
            proxy.as_deref(),
            confirm.as_mut(),
        ) {
            Ok(summary) => {
                let remaining = summary.report.as_ref().map_or(0, |r| r.remaining);
                let renamed = summary
                    .renames
                    .iter()
                    .flatten()
                    .filter(|r| matches!(r, Renamed::Renamed { .. }))
                    .count();
                info!(
                    "{} {}: {} pages listed, {} still missing, {} renamed",
                    province, year, summary.pages, remaining, renamed
                );
            }
            Err(e) => {
                error!("{} {} failed: {}", province, year, e);
                failed_years.push(*year);
            }
        }
    }

    let program_end = Local::now();
    info!("End: {}", program_end.format("%Y-%m-%d %H:%M:%S"));
    info!("Total time: {}", format_duration(program_start, program_end));
    if !failed_years.is_empty() {
        bail!("years failed: {:?}", failed_years);
    }
    Ok(())
}
