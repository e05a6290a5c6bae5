use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_mimic_core::model::corpus_model::CorpusModel;

/// Small embedded corpus so the example runs without any data files.
/// Real corpora are loaded with `CorpusModel::from_corpus_file` instead.
static CORPUS: &[&str] = &[
    "the little boat drifted past the old lighthouse",
    "a storm rolled over the harbor before dawn",
    "the fisherman mended his nets on the quay",
    "gulls circled over the harbor all afternoon",
    "the lighthouse keeper climbed the narrow stairs",
    "a cold wind pushed the boat toward the rocks",
    "the nets came up empty again this morning",
    "lanterns flickered along the quay after sunset",
    "the old keeper watched the storm from the tower",
    "fishing boats returned to the harbor at dusk",
    "the tide carried driftwood past the rocks",
    "a narrow channel leads past the lighthouse into the harbor",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generation warnings (retry budget exhausted, etc.) go through `log`
    env_logger::init();

    // Build a model from raw statements. Normalization, sentence
    // splitting, tokenization and keyword ranking all happen here.
    let model = CorpusModel::consume("harbor", CORPUS.iter().map(|s| s.to_string()));

    println!(
        "Model '{}': {} sentences, {} distinct tokens",
        model.name(),
        model.sentence_count(),
        model.token_count()
    );

    // The most important corpus words, ranked
    println!("Top keywords: {}", model.keywords()[..5.min(model.keywords().len())].join(", "));

    // Generate 10 statements of at most 140 characters. Each call may
    // retry internally until the result fits the limit, has balanced
    // enclosers and does not reproduce a corpus sentence verbatim.
    for i in 0..10 {
        println!("Statement {}: {}", i + 1, model.make_statement(140)?);
    }

    // Generation is reproducible with a seeded randomness source
    let mut rng = StdRng::seed_from_u64(42);
    let first = model.make_statement_with(&mut rng, 140)?;
    let mut rng = StdRng::seed_from_u64(42);
    let second = model.make_statement_with(&mut rng, 140)?;
    println!("Seeded twice: {:?} / {:?}", first, second);

    // Responses are restricted to sentences sharing tokens with the input
    // when enough of them exist, and fall back to the whole corpus
    // otherwise ("mountain" appears nowhere in the corpus)
    for input in ["storm over the lighthouse", "mountain"] {
        println!("Response to {:?}: {}", input, model.make_response(input, 140)?);
    }

    Ok(())
}
