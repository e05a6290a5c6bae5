use std::error::Error;
use std::path::{Path, PathBuf};

use crate::io::normalize_folder;
use crate::model::corpus_model::CorpusModel;

/// Path a model named `name` is stored at inside `dir`.
pub fn model_path<P: AsRef<Path>>(dir: P, name: &str) -> PathBuf {
	let mut path = normalize_folder(dir).join(name);
	path.set_extension("bin");
	path
}

/// Serializes `model` to `<dir>/<name>.bin` and returns the written path.
///
/// The binary carries the full token table, sentence table, keyword list
/// and model name; `load` restores an identical model.
pub fn save<P: AsRef<Path>>(model: &CorpusModel, dir: P) -> Result<PathBuf, Box<dyn Error>> {
	let path = model_path(dir, model.name());
	let bytes = postcard::to_stdvec(model)?;
	std::fs::write(&path, bytes)?;
	Ok(path)
}

/// Loads the model stored under `name` in `dir`.
pub fn load<P: AsRef<Path>>(dir: P, name: &str) -> Result<CorpusModel, Box<dyn Error>> {
	let bytes = std::fs::read(model_path(dir, name))?;
	Ok(postcard::from_bytes(&bytes)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn model_paths_are_keyed_by_name() {
		let path = model_path("/tmp/models", "alice");
		assert_eq!(path, PathBuf::from("/tmp/models/alice.bin"));
	}

	#[test]
	fn saved_models_load_back_identically() {
		let model = CorpusModel::consume(
			"store-roundtrip",
			vec!["the cat sat on the mat.".to_owned(), "dogs sleep all day".to_owned()],
		);

		let dir = std::env::temp_dir().join(format!("rs-mimic-store-{}", std::process::id()));
		std::fs::create_dir_all(&dir).unwrap();

		let written = save(&model, &dir).unwrap();
		assert!(written.exists());

		let restored = load(&dir, model.name()).unwrap();
		assert_eq!(restored.name(), model.name());
		assert_eq!(restored.sentences(), model.sentences());
		assert_eq!(restored.keywords(), model.keywords());

		std::fs::remove_dir_all(&dir).ok();
	}
}
