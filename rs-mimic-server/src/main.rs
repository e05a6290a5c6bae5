use std::path::Path;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use rs_mimic_core::io::list_files;
use rs_mimic_core::model::corpus_model::CorpusModel;

/// Extensions recognized as corpus sources in the data directory.
const CORPUS_EXTENSIONS: &[&str] = &["txt", "csv", "json"];

/// Where corpus files (and their model binaries) live.
const DATA_DIR: &str = "./data";

/// Struct representing query parameters for the `/v1/statement` endpoint
#[derive(Deserialize)]
struct StatementParams {
	limit: Option<usize>,
}

/// Struct representing query parameters for the `/v1/response` endpoint
#[derive(Deserialize)]
struct ResponseParams {
	input: String,
	limit: Option<usize>,
}

#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
}

struct SharedData {
	model: Option<CorpusModel>,
}

/// HTTP GET endpoint `/v1/statement`
///
/// Generates a statement from the loaded model, bounded by the `limit`
/// query parameter (characters). Returns the statement as the body.
#[get("/v1/statement")]
async fn get_statement(data: web::Data<Mutex<SharedData>>, query: web::Query<StatementParams>) -> impl Responder {
	let limit = query.limit.unwrap_or(140);

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let model = match &shared_data.model {
		Some(m) => m,
		None => return HttpResponse::BadRequest().body("No model loaded"),
	};

	match model.make_statement(limit) {
		Ok(text) => HttpResponse::Ok().body(text),
		Err(e) => HttpResponse::InternalServerError().body(e),
	}
}

/// HTTP GET endpoint `/v1/response`
///
/// Generates a statement relevant to the `input` query parameter, falling
/// back to an unconstrained statement when the corpus has no coverage.
#[get("/v1/response")]
async fn get_response(data: web::Data<Mutex<SharedData>>, query: web::Query<ResponseParams>) -> impl Responder {
	let limit = query.limit.unwrap_or(140);
	if query.input.trim().is_empty() {
		return HttpResponse::BadRequest().body("Input cannot be empty");
	}

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let model = match &shared_data.model {
		Some(m) => m,
		None => return HttpResponse::BadRequest().body("No model loaded"),
	};

	match model.make_response(&query.input, limit) {
		Ok(text) => HttpResponse::Ok().body(text),
		Err(e) => HttpResponse::InternalServerError().body(e),
	}
}

#[get("/v1/models")]
async fn get_models() -> impl Responder {
	let mut names = Vec::new();
	for extension in CORPUS_EXTENSIONS {
		match list_files(DATA_DIR, extension) {
			Ok(files) => names.extend(
				files
					.into_iter()
					.map(|file| file.trim_end_matches(&format!(".{extension}")).to_owned()),
			),
			Err(_) => return HttpResponse::InternalServerError().body("Failed to list corpus files"),
		}
	}
	HttpResponse::Ok().body(names.join("\n"))
}

#[get("/v1/loaded_model")]
async fn get_loaded_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match &shared_data.model {
		Some(model) => HttpResponse::Ok().body(format!(
			"{}: {} sentences, {} tokens",
			model.name(),
			model.sentence_count(),
			model.token_count()
		)),
		None => HttpResponse::Ok().body("No model loaded"),
	}
}

#[put("/v1/load_model")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};

	let corpus_path = CORPUS_EXTENSIONS
		.iter()
		.map(|extension| format!("{DATA_DIR}/{name}.{extension}"))
		.find(|candidate| Path::new(candidate).exists());
	let corpus_path = match corpus_path {
		Some(p) => p,
		None => return HttpResponse::NotFound().body(format!("No corpus file for model '{name}'")),
	};

	let model = match CorpusModel::from_corpus_file(&corpus_path) {
		Ok(m) => m,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}")),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	shared_data.model = Some(model);

	HttpResponse::Ok().body("Model loaded successfully")
}

/// Main entry point for the server.
///
/// Starts an Actix-web HTTP server around a `Mutex`-guarded model slot;
/// models are loaded on demand through `/v1/load_model`.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Currently, the data directory is hardcoded and should be made configurable.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData { model: None };
	let shared_model = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_statement)
			.service(get_response)
			.service(get_models)
			.service(get_loaded_model)
			.service(put_model)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
