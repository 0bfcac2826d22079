use wordgram_core::corpus::parse_records;
use wordgram_core::{ContextTotals, ModelConfig, ModelError, NGramModel, Record, StopReason, Tokenizer};

use rand::SeedableRng;
use rand::rngs::StdRng;

const CORPUS: &str = r#"[
	{"title": "Kedi", "content": "Kedi bahçede uyudu. Kedi süt içti!"},
	{"title": "Köpek", "content": "Köpek bahçede koştu. Köpek kediyi gördü?"},
	{"title": 2024, "content": "yeni yıl geldi"}
]"#;

fn key(words: &[&str]) -> Vec<String> {
	words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn trains_on_parsed_corpus() {
	let records = parse_records(CORPUS).unwrap();
	let mut model = NGramModel::new(2).unwrap();
	model.train(&records);

	assert_eq!(model.frequency(&key(&["kedi"]), "bahçede"), Some(1));
	assert_eq!(model.frequency(&key(&["kedi"]), "kedi"), Some(1));
	assert_eq!(model.frequency(&key(&["bahçede"]), "uyudu"), Some(1));
	assert_eq!(model.frequency(&key(&["bahçede"]), "koştu"), Some(1));
	// the numeric title is coerced to text, then stripped entirely
	assert_eq!(model.frequency(&key(&["yeni"]), "yıl"), Some(1));
	assert_eq!(model.stats().n, 2);
}

#[test]
fn double_count_condition_across_records() {
	let records = vec![Record::new("a b", "c"), Record::new("a", "b")];

	let mut legacy = NGramModel::new(2).unwrap();
	legacy.train(&records);
	// record 1: "a" not last (+2); record 2: "a" last (+1)
	assert_eq!(legacy.context_total(&key(&["a"])), 3);
	assert_eq!(legacy.frequency(&key(&["a"]), "b"), Some(2));

	let config = ModelConfig { context_totals: ContextTotals::Strict, ..ModelConfig::default() };
	let mut strict = NGramModel::with_config(config).unwrap();
	strict.train(&records);
	assert_eq!(strict.context_total(&key(&["a"])), 2);
}

#[test]
fn generation_over_terminal_aware_corpus() {
	let records = parse_records(CORPUS).unwrap();
	let mut model = NGramModel::new(2).unwrap().with_tokenizer(Tokenizer::with_sentence_terminals());
	model.train(&records);

	let mut rng = StdRng::seed_from_u64(2024);
	for _ in 0..50 {
		let generation = model
			.generate(&["köpek", "x"], &Default::default(), &mut rng)
			.unwrap();
		assert_eq!(generation.tokens[0], "köpek");
		assert!(generation.tokens.len() <= 1 + 2 * 8);
		if generation.stop == StopReason::SentenceTerminated {
			let last = generation.tokens.last().unwrap();
			assert!(last.ends_with('.') || last.ends_with('!') || last.ends_with('?'));
		}
	}
}

#[test]
fn malformed_corpus_never_reaches_the_model() {
	let err = parse_records(r#"[{"title": "t", "content": "c"}, {"content": "c"}]"#).unwrap_err();
	assert!(matches!(err, ModelError::MalformedRecord { index: 1, .. }));
}

#[test]
fn loads_corpus_from_disk() {
	let dir = std::env::temp_dir().join(format!("wordgram-corpus-{}", std::process::id()));
	std::fs::create_dir_all(&dir).unwrap();
	std::fs::write(dir.join("one.json"), r#"[{"title": "a", "content": "b"}]"#).unwrap();
	std::fs::write(dir.join("two.json"), r#"[{"title": "b", "content": "c"}]"#).unwrap();

	let single = wordgram_core::corpus::load_records(dir.join("one.json")).unwrap();
	let all = wordgram_core::corpus::load_folder(&dir).unwrap();
	std::fs::remove_dir_all(&dir).unwrap();

	assert_eq!(single, vec![Record::new("a", "b")]);
	assert_eq!(all, vec![Record::new("a", "b"), Record::new("b", "c")]);
}
