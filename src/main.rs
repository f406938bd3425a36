use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use ferrous_pairhmm::compute::{
    FEATURE_NARROW_SIMD_A, FEATURE_NARROW_SIMD_B, FEATURE_WIDE_SIMD,
};
use ferrous_pairhmm::hmm::{self, compute_batch, dispatch, scalar};
use ferrous_pairhmm::hmm::context::CONTEXT_F64;
use ferrous_pairhmm::io::open_testcase_file;

#[derive(Parser)]
#[command(name = "ferrous-pairhmm")]
#[command(about = "PairHMM read-likelihood engine for short-read variant calling", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EngineArg {
    /// Best engine the CPU supports
    Auto,
    /// Force the portable scalar kernels
    Scalar,
    /// Force the 128-bit kernels (SSE4.1/NEON)
    Narrow,
    /// Force the 256-bit kernels (AVX2)
    Wide,
}

impl EngineArg {
    fn feature_mask(self) -> u64 {
        match self {
            EngineArg::Auto => ferrous_pairhmm::compute::ENABLE_ALL_FEATURES,
            EngineArg::Scalar => 0,
            EngineArg::Narrow => FEATURE_NARROW_SIMD_A | FEATURE_NARROW_SIMD_B,
            EngineArg::Wide => FEATURE_WIDE_SIMD,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute log10 likelihoods for a testcase file
    Compute {
        /// Input testcase file (one record per line; .gz ok; - for stdin)
        #[arg(value_name = "TESTCASES")]
        testcases: PathBuf,

        /// Output file (default: stdout)
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Maximum worker threads
        #[arg(short = 't', long, value_name = "INT", default_value = "1")]
        threads: usize,

        /// Kernel engine selection
        #[arg(long, value_enum, default_value = "auto")]
        engine: EngineArg,

        /// Records per in-memory batch
        #[arg(long, value_name = "INT", default_value = "100000")]
        batch_size: usize,
    },

    /// Verify the vectorized hybrid path against the scalar double-precision
    /// reference
    Check {
        /// Input testcase file (one record per line; .gz ok; - for stdin)
        #[arg(value_name = "TESTCASES")]
        testcases: PathBuf,

        /// Maximum worker threads
        #[arg(short = 't', long, value_name = "INT", default_value = "1")]
        threads: usize,

        /// Kernel engine selection
        #[arg(long, value_enum, default_value = "auto")]
        engine: EngineArg,

        /// Records per in-memory batch
        #[arg(long, value_name = "INT", default_value = "100000")]
        batch_size: usize,
    },
}

fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn install_kernels(engine: EngineArg) {
    if let Err(e) = hmm::init(engine.feature_mask()) {
        log::error!("kernel initialization failed: {e}");
        std::process::exit(1);
    }
}

fn run_compute(
    testcases: &PathBuf,
    output: Option<PathBuf>,
    threads: usize,
    batch_size: usize,
) -> std::io::Result<()> {
    let mut reader = open_testcase_file(testcases)?;
    let mut writer: BufWriter<Box<dyn Write>> = BufWriter::new(match output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    });

    let start = Instant::now();
    let mut total = 0usize;
    loop {
        let batch = reader.read_batch(batch_size)?;
        if batch.is_empty() {
            break;
        }
        let mut out = vec![0.0; batch.len()];
        compute_batch(&batch, &mut out, threads);
        for value in &out {
            writeln!(writer, "{value}")?;
        }
        total += batch.len();
    }
    writer.flush()?;
    log::info!(
        "computed {} likelihoods in {:.3}s",
        total,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

struct CheckStats {
    total: usize,
    mismatches: usize,
    double_fallbacks: usize,
    min_read_len: usize,
    max_read_len: usize,
    min_hap_len: usize,
    max_hap_len: usize,
}

fn run_check(testcases: &PathBuf, threads: usize, batch_size: usize) -> std::io::Result<()> {
    use rayon::prelude::*;

    let mut reader = open_testcase_file(testcases)?;
    let dispatch = dispatch::installed();

    let mut stats = CheckStats {
        total: 0,
        mismatches: 0,
        double_fallbacks: 0,
        min_read_len: usize::MAX,
        max_read_len: 0,
        min_hap_len: usize::MAX,
        max_hap_len: 0,
    };
    let mut hybrid_time = 0.0f64;
    let mut baseline_time = 0.0f64;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    loop {
        let batch = reader.read_batch(batch_size)?;
        if batch.is_empty() {
            break;
        }

        let start = Instant::now();
        let hybrid: Vec<(f64, bool)> = pool.install(|| {
            batch
                .par_iter()
                .map(|tc| dispatch.run_hybrid_outcome(tc))
                .collect()
        });
        hybrid_time += start.elapsed().as_secs_f64();

        let start = Instant::now();
        let baseline: Vec<f64> = pool.install(|| {
            batch
                .par_iter()
                .map(|tc| scalar::compute_log_likelihood::<f64>(tc, &CONTEXT_F64))
                .collect()
        });
        baseline_time += start.elapsed().as_secs_f64();

        let batch_start = stats.total;
        for (i, (tc, (&(value, fell_back), &reference))) in batch
            .iter()
            .zip(hybrid.iter().zip(baseline.iter()))
            .enumerate()
        {
            stats.total += 1;
            stats.double_fallbacks += fell_back as usize;
            stats.min_read_len = stats.min_read_len.min(tc.read_len());
            stats.max_read_len = stats.max_read_len.max(tc.read_len());
            stats.min_hap_len = stats.min_hap_len.min(tc.hap_len());
            stats.max_hap_len = stats.max_hap_len.max(tc.hap_len());

            let abs_error = (value - reference).abs();
            let rel_error = if reference != 0.0 {
                (abs_error / reference).abs()
            } else {
                0.0
            };
            if abs_error > 1e-5 && rel_error > 1e-5 {
                stats.mismatches += 1;
                log::warn!(
                    "record {}: hybrid {:e} vs reference {:e}",
                    batch_start + i + 1,
                    value,
                    reference
                );
            }
        }
    }

    log::info!(
        "checked {} records: read lengths {}..{}, haplotype lengths {}..{}",
        stats.total,
        stats.min_read_len,
        stats.max_read_len,
        stats.min_hap_len,
        stats.max_hap_len
    );
    log::info!(
        "double-precision fallbacks: {} ({:.2}%)",
        stats.double_fallbacks,
        100.0 * stats.double_fallbacks as f64 / stats.total.max(1) as f64
    );
    log::info!("hybrid compute time {hybrid_time:.3}s, baseline compute time {baseline_time:.3}s");

    if stats.mismatches == 0 {
        log::info!("all output values within acceptable error");
        Ok(())
    } else {
        log::error!("{} records outside acceptable error", stats.mismatches);
        std::process::exit(1);
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compute {
            testcases,
            output,
            threads,
            engine,
            batch_size,
        } => {
            install_kernels(engine);
            run_compute(&testcases, output, threads, batch_size.max(1))
        }
        Commands::Check {
            testcases,
            threads,
            engine,
            batch_size,
        } => {
            install_kernels(engine);
            run_check(&testcases, threads, batch_size.max(1))
        }
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
