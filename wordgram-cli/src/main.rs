use std::io::{self, BufRead, Write};

use clap::Parser;
use env_logger::Env;
use rand::SeedableRng;
use rand::rngs::StdRng;

use wordgram_core::corpus;
use wordgram_core::{
    ContextTotals, GenerationConfig, Generator, ModelConfig, NGramModel, SeedHandling, Smoothing, Tokenizer,
};

/// Trains a word n-gram model on a JSON corpus, then generates text from
/// two seed lines read from stdin until EOF.
#[derive(Parser, Debug)]
#[command(name = "wordgram")]
#[command(about = "Generate text from a word n-gram model trained on a JSON corpus")]
struct Args {
    /// JSON corpus: an array of {"title", "content"} objects
    #[arg(short, long, default_value = "data.json")]
    data: String,

    /// N-gram order (context length is n - 1)
    #[arg(short, long, default_value_t = 2)]
    n: usize,

    /// Smoothing factor k
    #[arg(short = 'k', long, default_value_t = 1.0)]
    smoothing_factor: f64,

    /// Estimator: interpolated, absolute-discount or laplace
    #[arg(long, default_value = "interpolated")]
    smoothing: Smoothing,

    /// Context total bookkeeping: legacy or strict
    #[arg(long, default_value = "legacy")]
    context_totals: ContextTotals,

    /// Generation budget multiplier (budget = seed length * factor)
    #[arg(short, long, default_value_t = 8)]
    length_factor: usize,

    /// Seed handling: drop-last or keep-all
    #[arg(long, default_value = "drop-last")]
    seed_handling: SeedHandling,

    /// Keep '.', '!' and '?' so generation can stop at sentence ends
    #[arg(long)]
    keep_terminals: bool,

    /// Train on worker threads
    #[arg(long)]
    parallel: bool,

    /// Fixed random seed for reproducible output
    #[arg(long)]
    rng_seed: Option<u64>,
}

/// Prompts with `label` and reads one line. Returns `None` on EOF.
fn prompt(input: &mut impl BufRead, label: &str) -> io::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = ModelConfig {
        n: args.n,
        smoothing_factor: args.smoothing_factor,
        smoothing: args.smoothing,
        context_totals: args.context_totals,
    };
    let tokenizer = if args.keep_terminals { Tokenizer::with_sentence_terminals() } else { Tokenizer::new() };
    let mut model = NGramModel::with_config(config)?.with_tokenizer(tokenizer);

    let records = corpus::load_records(&args.data)?;
    if args.parallel {
        model.train_parallel(&records)?;
    } else {
        model.train(&records);
    }
    let stats = model.stats();
    log::info!(
        "Model ready: n = {}, {} context(s), {} n-gram(s), vocabulary of {}",
        stats.n,
        stats.contexts,
        stats.ngrams,
        stats.vocabulary
    );

    let generation_config = GenerationConfig::default()
        .with_length_factor(args.length_factor)?
        .with_seed_handling(args.seed_handling);
    let rng = match args.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut generator = Generator::new(&model, generation_config, rng)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        let Some(first) = prompt(&mut input, "1")? else { break };
        let Some(second) = prompt(&mut input, "2")? else { break };

        // Seeds go through the same normalization as the corpus
        let mut seed = tokenizer.tokenize(&first);
        seed.extend(tokenizer.tokenize(&second));

        match generator.generate(&seed[..]) {
            Ok(generation) => {
                log::debug!("Stopped: {:?}", generation.stop);
                println!("nlp:");
                println!("{}", generation.text());
            }
            // A bad seed only ends this round, not the session
            Err(e) => eprintln!("{e}"),
        }
    }

    Ok(())
}
