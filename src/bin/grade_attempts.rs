use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};

use qiraa::alignment::{AlignmentRequest, BatchGrader};
use qiraa::utils::ReportWriter;
use qiraa::{GraderConfig, Result};

const CHUNK_SIZE: usize = 1024;

/// Grade tokenized shadowing attempts read as JSON lines.
#[derive(Debug, Parser)]
#[command(name = "grade_attempts", version)]
struct Args {
    /// INI configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON lines of alignment requests ("-" for stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON lines output file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Worker threads (0 uses every core)
    #[arg(long)]
    threads: Option<usize>,

    /// Disable the edit-script cache
    #[arg(long)]
    no_cache: bool,

    /// none, error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Builds the configuration along with any INI problems, which are only
    /// logged once the logger is running.
    fn into_config(self) -> Result<(GraderConfig, Vec<String>)> {
        let (mut config, warnings) = match &self.config {
            Some(path) => GraderConfig::from_ini_with_warnings(path)?,
            None => (GraderConfig::default(), Vec::new()),
        };

        if let Some(input) = self.input {
            config.files.input_path = if input.as_os_str() == "-" { None } else { Some(input) };
        }
        if let Some(output) = self.output {
            config.files.output_path = Some(output);
        }
        if let Some(threads) = self.threads {
            config.processor.parallel_thread_count = threads;
        }
        if self.no_cache {
            config.processor.use_cache = false;
        }
        if let Some(level) = &self.log_level {
            config.processor.set_log_level(level)?;
        }

        config.validate()?;
        Ok((config, warnings))
    }
}

fn init_logging(config: &GraderConfig) -> Result<()> {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, config.processor.get_log_level());

    if let Some(log_dir) = &config.files.log_dir {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join(format!("grading_{}.log", timestamp)))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}

fn read_requests(config: &GraderConfig) -> Result<Vec<AlignmentRequest>> {
    match &config.files.input_path {
        Some(path) => {
            info!("Reading attempts from {:?}", path);
            parse_requests(BufReader::new(File::open(path)?))
        },
        None => {
            info!("Reading attempts from stdin");
            parse_requests(io::stdin().lock())
        },
    }
}

/// Reads one request per line. Lines that are not UTF-8 or not a request
/// are logged and skipped; only read failures abort.
fn parse_requests<R: BufRead>(reader: R) -> Result<Vec<AlignmentRequest>> {
    let mut requests = Vec::new();
    for (line_num, line) in reader.split(b'\n').enumerate() {
        let bytes = line?;
        let text = match std::str::from_utf8(&bytes) {
            Ok(text) => text.trim(),
            Err(e) => {
                warn!("Skipping line {}: {}", line_num + 1, e);
                continue;
            }
        };
        if text.is_empty() {
            continue;
        }
        match serde_json::from_str::<AlignmentRequest>(text) {
            Ok(request) => requests.push(request),
            Err(e) => warn!("Skipping line {}: {}", line_num + 1, e),
        }
    }
    Ok(requests)
}

fn run(config: GraderConfig) -> Result<()> {
    let start_time = Instant::now();
    let requests = read_requests(&config)?;
    info!("Loaded {} attempts", requests.len());

    let grader = BatchGrader::new(config.aligner.clone(), &config.processor)?;
    let mut writer = match &config.files.output_path {
        Some(path) => ReportWriter::with_file(path)?,
        None => ReportWriter::stdout(),
    };

    let progress = ProgressBar::new(requests.len() as u64);
    progress.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} attempts ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar()));

    let mut skipped = 0usize;
    for chunk in requests.chunks(CHUNK_SIZE) {
        for graded in grader.grade_all(chunk) {
            match graded {
                Ok(attempt) => writer.write_record(&attempt)?,
                Err(_) => skipped += 1,
            }
        }
        progress.inc(chunk.len() as u64);
    }
    writer.flush()?;
    progress.finish_and_clear();

    if let Some(cache) = grader.cache() {
        debug!("Cache hits: {}, misses: {}", cache.hits(), cache.misses());
    }
    info!(
        "Wrote {} graded attempts, skipped {}, in {:.2?}",
        writer.records_written(),
        skipped,
        start_time.elapsed()
    );
    Ok(())
}

fn main() {
    let (config, warnings) = match Args::parse().into_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }
    for warning in &warnings {
        warn!("{}", warning);
    }

    if let Err(e) = run(config) {
        error!("Grading failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"id":"1","target":["a"],"said":["a"]}"#);
        input.extend_from_slice(b"\n\xff\xfe bad\n");
        input.extend_from_slice(br#"{"id":"2","target":["b"],"said":[]}"#);
        input.push(b'\n');

        let requests = parse_requests(Cursor::new(input)).unwrap();
        let ids: Vec<_> = requests.iter().map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("1"), Some("2")]);
    }

    #[test]
    fn test_blank_and_malformed_lines_are_skipped() {
        let input = "\n{\"target\":[\"x\"],\"said\":[\"y\"]}\r\nnot json\n\n";
        let requests = parse_requests(Cursor::new(input)).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].said, vec!["y".to_string()]);
    }

    #[test]
    fn test_config_warnings_are_returned() {
        let dir = tempfile::tempdir().unwrap();
        let ini = dir.path().join("grader.ini");
        std::fs::write(&ini, "[aligner]\nmax_tokens = abc\n").unwrap();

        let args = Args::parse_from(["grade_attempts", "--config", ini.to_str().unwrap()]);
        let (config, warnings) = args.into_config().unwrap();
        assert_eq!(config.aligner.max_tokens, 5000);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("max_tokens=abc"));
    }
}
