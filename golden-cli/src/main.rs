use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use fs_err as fs;

use golden::{CollectReporter, GoldenComparator, GoldenSource, Settings};

mod output;

use output::{Output, Verdict};

const DEFAULT_CHUNK_SIZE: usize = 8192;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Streams INPUT (or stdin) into the silver file, checking it against the golden file as it
    /// goes. Uses `golden.toml` and `GOLDEN_MODE` to decide between comparing and recording.
    Check {
        #[clap(long)]
        golden: PathBuf,
        #[clap(long)]
        silver: PathBuf,
        /// File to read silver output from. Reads stdin when omitted
        input: Option<PathBuf>,
        /// Only record silver, skipping the comparison
        #[clap(long)]
        record: bool,
        /// Size of each write into the comparator. 1 writes byte by byte
        #[clap(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
    /// Compares an existing silver file against a golden file
    Compare { golden: PathBuf, silver: PathBuf },
    /// Copies the silver file over the golden file, making it the new reference
    Promote {
        #[clap(long)]
        golden: PathBuf,
        #[clap(long)]
        silver: PathBuf,
    },
}

#[derive(Parser)]
#[clap(version, author, about)]
pub struct Cli {
    /// Output results as JSON
    #[clap(long, global = true)]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Command,
}

/// Copy `reader` into `writer` in writes of at most `chunk_size` bytes.
fn copy_chunks(reader: &mut dyn Read, writer: &mut dyn Write, chunk_size: usize) -> Result<usize> {
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        writer.write_all(&buf[..n])?;
        total += n;
    }
    Ok(total)
}

fn open_input(input: Option<&Path>) -> Result<Box<dyn Read>> {
    match input {
        Some(path) => Ok(Box::new(fs::File::open(path)?)),
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn try_main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();
    let out = Output::new(cli.json);
    let current_dir = std::env::current_dir()?;

    match cli.command {
        Command::Check {
            golden,
            silver,
            input,
            record,
            chunk_size,
        } => {
            if chunk_size == 0 {
                bail!("--chunk-size must be at least 1");
            }
            let mut settings = Settings::resolve(&current_dir)
                .with_context(|| format!("Failed to load settings for {}", current_dir.display()))?;
            if record {
                settings.fail_fast = false;
            }

            let mut writer = golden::open_silver_with_reporter(
                &golden,
                &silver,
                &settings,
                CollectReporter::new(),
            )?;
            let mut reader = open_input(input.as_deref())?;
            let bytes = copy_chunks(&mut reader, &mut writer, chunk_size)?;
            writer.close()?;
            log::debug!("Wrote {} bytes to {}", bytes, silver.display());

            let verdict = Verdict::new(writer.mode(), writer.divergence(), bytes);
            out.verdict(&verdict)?;
            Ok(exit_code(&verdict))
        }
        Command::Compare { golden, silver } => {
            let settings = Settings::resolve(&current_dir)?;
            let golden_source = GoldenSource::open(&golden)?;
            let mut silver_file = fs::File::open(&silver)?;

            let mut cmp =
                GoldenComparator::with_reporter(golden_source, io::sink(), CollectReporter::new())
                    .with_options(settings.compare_options());
            let bytes = copy_chunks(&mut silver_file, &mut cmp, DEFAULT_CHUNK_SIZE)?;
            cmp.close()?;

            let verdict = Verdict::new(golden::Mode::Compare, cmp.divergence(), bytes);
            out.verdict(&verdict)?;
            Ok(exit_code(&verdict))
        }
        Command::Promote { golden, silver } => {
            let bytes = golden::promote(&silver, &golden)?;
            out.promoted(
                &silver.display().to_string(),
                &golden.display().to_string(),
                bytes,
            )?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(verdict: &Verdict<'_>) -> ExitCode {
    if verdict.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:?}");
            ExitCode::FAILURE
        }
    }
}
