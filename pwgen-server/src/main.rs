use std::env;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};

use pwgen_core::PwgenError;
use pwgen_core::config::Settings;
use pwgen_core::random::SystemRandom;
use pwgen_core::registry::Registry;
use pwgen_core::session::{GenerationRequest, Mode, generate};
use serde::Deserialize;

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	mode: Option<Mode>,
	value: Option<String>,
	generators: Option<String> // comma separated ids, "all" or none -> settings
}

#[derive(Deserialize)]
struct SourceQuery {
	dir: Option<String>
}

struct SharedData {
	registry: Registry,
	settings: Settings
}

impl GenerateParams {
	/// Builds the generation request, falling back to the enabled list of the settings.
	fn request(&self, settings: &Settings) -> GenerationRequest {
		let ids: Vec<String> = match &self.generators {
			None => settings.generators.clone(),
			Some(s) if s.trim().eq_ignore_ascii_case("all") => Vec::new(),
			Some(s) => s
				.split(',')
				.map(|id| id.trim())
				.filter(|id| !id.is_empty())
				.map(str::to_owned)
				.collect(),
		};

		GenerationRequest {
			mode: self.mode.unwrap_or_default(),
			value: self.value.clone().unwrap_or_default(),
			enabled_generator_ids: ids,
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Runs every enabled generator once and returns the records as JSON.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Registry lock failed"),
	};

	let request = query.request(&shared_data.settings);
	match generate(&shared_data.registry, &request, &shared_data.settings, &SystemRandom) {
		Ok(records) => HttpResponse::Ok().json(records),
		Err(e @ PwgenError::InvalidTarget(_)) => HttpResponse::BadRequest().body(e.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

#[get("/v1/generators")]
async fn get_generators(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Registry lock failed"),
	};
	HttpResponse::Ok().json(shared_data.registry.descriptors())
}

#[put("/v1/load_generators")]
async fn put_generators(data: web::Data<Mutex<SharedData>>, query: web::Query<SourceQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Registry lock failed"),
	};

	let dir = match &query.dir {
		Some(s) if !s.trim().is_empty() => s.trim().to_owned(),
		_ => return HttpResponse::BadRequest().body("Missing or empty directory"),
	};

	let SharedData { registry, settings } = &mut *shared_data;
	match registry.load_user_source(&dir, settings) {
		Ok(count) => HttpResponse::Ok().body(format!("{count} generators loaded")),
		Err(e) => {
			error!("Failed to import `{dir}` : {e}");
			HttpResponse::InternalServerError().body(format!("Failed to load generators: {e}"))
		}
	}
}

/// Cross-origin access for browser front-ends.
///
/// Read-only: loading generators touches the server's filesystem, so a
/// cross-origin `PUT` fails its preflight.
fn cors() -> Cors {
	Cors::default()
		.allow_any_origin()
		.allowed_methods(vec!["GET"])
		.allowed_header(header::ACCEPT)
		.max_age(3600)
}

/// Main entry point for the server.
///
/// Discovers the generators, wraps the registry in a `Mutex`
/// and starts an Actix-web HTTP server.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Settings are read from the JSON file named by `PWGEN_SETTINGS`, defaults otherwise.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let settings = match env::var("PWGEN_SETTINGS") {
		Ok(path) => Settings::load(&path).map_err(std::io::Error::other)?,
		Err(_) => Settings::default(),
	};

	let registry = Registry::discover(&settings);
	info!("{} generators available", registry.len());

	let shared_data = SharedData { registry, settings };
	let shared_registry = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.wrap(cors())
			.app_data(shared_registry.clone())
			.service(get_generated)
			.service(get_generators)
			.service(put_generators)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::{Method, StatusCode};
	use actix_web::test;

	fn shared() -> web::Data<Mutex<SharedData>> {
		let settings = Settings::default();
		let mut registry = Registry::new();
		registry.load_builtins(&settings);
		web::Data::new(Mutex::new(SharedData { registry, settings }))
	}

	fn preflight(uri: &str, method: &str) -> test::TestRequest {
		test::TestRequest::default()
			.method(Method::OPTIONS)
			.uri(uri)
			.insert_header((header::ORIGIN, "https://example.org"))
			.insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, method))
	}

	#[actix_web::test]
	async fn test_cors_allows_only_reads() {
		let app = test::init_service(
			App::new().wrap(cors()).app_data(shared()).service(get_generators).service(put_generators),
		)
		.await;

		let resp = test::call_service(&app, preflight("/v1/generators", "GET").to_request()).await;
		assert!(resp.status().is_success());

		let resp = test::call_service(&app, preflight("/v1/load_generators", "PUT").to_request()).await;
		assert!(!resp.status().is_success());
	}

	#[actix_web::test]
	async fn test_generate_rejects_oversized_length() {
		let app = test::init_service(App::new().app_data(shared()).service(get_generated)).await;

		let req = test::TestRequest::get()
			.uri("/v1/generate?mode=length&value=18446744073709551615&generators=hex")
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

		// the registry lock is still usable afterwards
		let req = test::TestRequest::get().uri("/v1/generate?mode=length&value=12&generators=hex").to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::OK);
	}
}
