use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mf_core::{ArticleRecord, ExtractionConfig, Result};
use mf_scrapers::{
    handle_command, init_logging, HttpFetcher, OaktreeScraper, RunOptions, ScraperArgs,
    ScraperCommands, ScraperManager,
};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total = Duration::ZERO;
        let mut chars = s.trim().chars().peekable();
        let mut parsed_any = false;

        while chars.peek().is_some() {
            let number: String = std::iter::from_fn(|| chars.next_if(|c| c.is_ascii_digit())).collect();
            let unit: String = std::iter::from_fn(|| chars.next_if(|c| c.is_ascii_alphabetic())).collect();
            if number.is_empty() {
                return Err(format!("Invalid duration: {}", s));
            }
            let value: u64 = number
                .parse()
                .map_err(|_| format!("Invalid number in duration: {}", number))?;
            total += match unit.as_str() {
                "ms" => Duration::from_millis(value),
                "" | "s" => Duration::from_secs(value),
                "m" => Duration::from_secs(value * 60),
                "h" => Duration::from_secs(value * 3600),
                other => return Err(format!("Invalid duration unit: {}", other)),
            };
            parsed_any = true;
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
        }

        if !parsed_any {
            return Err("Duration must include a number".to_string());
        }
        Ok(HumanDuration(total))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Unofficial memo feed scraper", long_about = None)]
struct Cli {
    /// JSON file overriding the default extraction settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where to write the extracted records as JSON (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Maximum number of memos fetched per run
    #[arg(long)]
    limit: Option<usize>,
    /// Pause between article fetches (e.g. 300ms, 2s, 1m)
    #[arg(long)]
    delay: Option<HumanDuration>,
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
    #[command(subcommand)]
    command: ScraperCommands,
}

fn load_config(cli: &Cli) -> Result<ExtractionConfig> {
    let mut config = match &cli.config {
        Some(path) => ExtractionConfig::from_file(path)?,
        None => ExtractionConfig::default(),
    };
    if let Some(limit) = cli.limit {
        config.max_articles = limit;
    }
    if let Some(delay) = cli.delay {
        config.politeness_delay_ms = u64::try_from(delay.0.as_millis()).unwrap_or(u64::MAX);
    }
    config.validate()?;
    Ok(config)
}

fn write_records(records: &[ArticleRecord], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, records)?;
            writer.flush()?;
            info!("📝 Wrote {} records to {}", records.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, records)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let config = load_config(&cli)?;
    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    let mut manager = ScraperManager::new(RunOptions::from(&config));
    manager.add_scraper(Box::new(OaktreeScraper::new(config.clone(), fetcher.clone(), fetcher)?));
    info!("🦗 Scrapers initialized: {}", manager.scrapers().map(|s| s.source()).collect::<Vec<_>>().join(", "));

    let listing = matches!(cli.command, ScraperCommands::List);
    let records = handle_command(ScraperArgs { command: cli.command.clone() }, &manager).await?;
    if !listing {
        write_records(&records, cli.output.as_deref())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!("300ms".parse::<HumanDuration>().unwrap().0, Duration::from_millis(300));
        assert_eq!("2".parse::<HumanDuration>().unwrap().0, Duration::from_secs(2));
        assert_eq!("1m 30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert_eq!("1h15m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(4500));
        assert!("".parse::<HumanDuration>().is_err());
        assert!("5x".parse::<HumanDuration>().is_err());
        assert!("ms".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["memofeed", "--limit", "5", "--delay", "1s", "source"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.max_articles, 5);
        assert_eq!(config.politeness_delay_ms, 1000);
    }

    #[test]
    fn test_write_records_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("memofeed-test-{}", std::process::id()));
        let path = dir.join("docs").join("records.json");
        write_records(&[], Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
        fs::remove_dir_all(&dir).unwrap();
    }
}
