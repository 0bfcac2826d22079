use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use env_logger::Env;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;

use wordgram_core::io::{list_files, resolve_data_dir};
use wordgram_core::{
	corpus, ContextTotals, GenerationConfig, ModelConfig, ModelError, NGramModel, SeedHandling, Smoothing,
	Tokenizer,
};

#[derive(Parser, Debug)]
#[command(name = "wordgram-server")]
#[command(about = "Serve text generation from a word n-gram model over HTTP")]
struct Args {
	/// Folder holding the JSON corpora to train on
	#[arg(short, long, default_value = "./data")]
	data: String,

	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	#[arg(short, long, default_value_t = 5000)]
	port: u16,

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

	/// Keep '.', '!' and '?' so generation can stop at sentence ends
	#[arg(long)]
	keep_terminals: bool,
}

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	seed: Option<String>, // words separated by commas or spaces
	length_factor: Option<usize>,
	seed_handling: Option<SeedHandling>,
	rng_seed: Option<u64>, // fixed seed for reproducible output
}

/// Fully trained model, shared read-only by every worker.
struct SharedData {
	model: NGramModel,
	corpora: Vec<String>,
}

impl GenerateParams {
	/// Normalizes the seed the same way the corpus was.
	fn seed_tokens(&self, tokenizer: &Tokenizer) -> Result<Vec<String>, String> {
		match &self.seed {
			Some(s) if !s.trim().is_empty() => Ok(tokenizer.tokenize(&s.replace(',', " "))),
			_ => Err("Missing or empty seed".to_owned()),
		}
	}

	fn generation_config(&self) -> Result<GenerationConfig, String> {
		let mut config = GenerationConfig::default();
		if let Some(length_factor) = self.length_factor {
			config.set_length_factor(length_factor).map_err(|e| e.to_string())?;
		}
		if let Some(seed_handling) = self.seed_handling {
			config.seed_handling = seed_handling;
		}
		Ok(config)
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates text from the seed given in the query.
/// Returns the generated text as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let seed = match query.seed_tokens(data.model.tokenizer()) {
		Ok(s) => s,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};
	let config = match query.generation_config() {
		Ok(c) => c,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	// Each request samples from its own random source
	let result = match query.rng_seed {
		Some(rng_seed) => data.model.generate(&seed[..], &config, &mut StdRng::seed_from_u64(rng_seed)),
		None => data.model.generate(&seed[..], &config, &mut rand::rng()),
	};

	match result {
		Ok(generation) => HttpResponse::Ok().body(generation.text()),
		Err(e @ (ModelError::InsufficientSeed { .. } | ModelError::InvalidParameter(_))) => {
			HttpResponse::BadRequest().body(e.to_string())
		}
		Err(e) => {
			log::error!("Generation failed: {e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(data.model.stats())
}

#[get("/v1/corpora")]
async fn get_corpora(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().body(data.corpora.join("\n").replace(".json", ""))
}

/// Main entry point for the server.
///
/// Trains the model on every corpus of the data folder before binding, so
/// no request ever sees a partially trained model. The model is never
/// mutated afterwards and needs no lock.
#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
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

	let folder = resolve_data_dir(&args.data)?;
	let corpora = list_files(&folder, "json")?;
	let records = corpus::load_folder(&folder)?;
	model.train_parallel(&records)?;

	let shared_data = web::Data::new(SharedData { model, corpora });

	log::info!("Listening on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_stats)
			.service(get_corpora)
	})
	.bind((args.host.as_str(), args.port))?
	.run()
	.await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;
	use wordgram_core::Record;

	fn shared_data() -> web::Data<SharedData> {
		let mut model = NGramModel::new(2).unwrap();
		model.train(&[Record::new("Kedi", "kedi bahçede uyudu"), Record::new("Köpek", "köpek bahçede koştu")]);
		web::Data::new(SharedData { model, corpora: vec!["animals.json".to_owned()] })
	}

	#[actix_web::test]
	async fn generates_from_seed() {
		let app = test::init_service(App::new().app_data(shared_data()).service(get_generated)).await;
		let req = test::TestRequest::get().uri("/v1/generate?seed=kedi,bah%C3%A7ede&rng_seed=7").to_request();
		let body = test::call_and_read_body(&app, req).await;
		let text = String::from_utf8(body.to_vec()).unwrap();
		assert!(text.starts_with("kedi"));
	}

	#[actix_web::test]
	async fn seeded_requests_are_reproducible() {
		let app = test::init_service(App::new().app_data(shared_data()).service(get_generated)).await;
		let uri = "/v1/generate?seed=k%C3%B6pek+x&rng_seed=99";
		let first = test::call_and_read_body(&app, test::TestRequest::get().uri(uri).to_request()).await;
		let second = test::call_and_read_body(&app, test::TestRequest::get().uri(uri).to_request()).await;
		assert_eq!(first, second);
	}

	#[actix_web::test]
	async fn missing_seed_is_bad_request() {
		let app = test::init_service(App::new().app_data(shared_data()).service(get_generated)).await;
		for uri in [
			"/v1/generate",
			"/v1/generate?seed=123",
			"/v1/generate?seed=a&length_factor=0",
			"/v1/generate?seed=a,b&length_factor=18446744073709551615",
		] {
			let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
			assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
		}
	}

	#[actix_web::test]
	async fn stats_are_json() {
		let app = test::init_service(App::new().app_data(shared_data()).service(get_stats)).await;
		let stats: serde_json::Value =
			test::call_and_read_body_json(&app, test::TestRequest::get().uri("/v1/stats").to_request()).await;
		assert_eq!(stats["n"], 2);
		assert_eq!(stats["contexts"], 3);
	}

	#[actix_web::test]
	async fn lists_corpora() {
		let app = test::init_service(App::new().app_data(shared_data()).service(get_corpora)).await;
		let body = test::call_and_read_body(&app, test::TestRequest::get().uri("/v1/corpora").to_request()).await;
		assert_eq!(body, "animals");
	}
}
