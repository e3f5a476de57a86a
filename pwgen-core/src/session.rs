//! One generation request: parse the target, pick generators, run them.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::entropy::{ENTROPY_PER_LEVEL, Strength, Target, parse_length, parse_strength};
use crate::error::Result;
use crate::random::RandomSource;
use crate::registry::Registry;

/// How the request value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	/// Value is a strength: levels (`"3"`) or bits (`"96b"`).
	#[default]
	Strength,
	/// Value is a length in characters.
	Length,
}

/// A generation request as received from the outside.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
	#[serde(default)]
	pub mode: Mode,
	/// Raw value. Empty means "use the default from the settings".
	#[serde(default)]
	pub value: String,
	/// Generators to run, in no particular order. Empty means all.
	#[serde(default)]
	pub enabled_generator_ids: Vec<String>,
}

impl GenerationRequest {
	pub fn strength(value: &str) -> Self {
		Self { mode: Mode::Strength, value: value.to_owned(), enabled_generator_ids: Vec::new() }
	}

	pub fn length(value: &str) -> Self {
		Self { mode: Mode::Length, value: value.to_owned(), enabled_generator_ids: Vec::new() }
	}

	pub fn with_generators<I, S>(mut self, ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.enabled_generator_ids = ids.into_iter().map(Into::into).collect();
		self
	}

	/// Resolves the request value into a target.
	///
	/// # Errors
	/// `InvalidTarget` if the value is not a valid strength or length.
	pub fn target(&self, settings: &Settings) -> Result<Target> {
		match self.mode {
			Mode::Strength => {
				let bits = parse_strength(&self.value)?
					.unwrap_or(settings.pw_strength as f64 * ENTROPY_PER_LEVEL as f64);
				Target::strength(bits)
			}
			Mode::Length => Target::length(parse_length(&self.value)?.unwrap_or(settings.pw_length)),
		}
	}
}

/// One generated password with the metadata of its generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordRecord {
	pub password: String,
	pub entropy_bits: f64,
	/// Rating of `entropy_bits`.
	pub strength: Strength,
	pub generator_id: String,
	pub generator_name: String,
	pub description: String,
}

/// Runs every enabled generator of `registry` once for `request`.
///
/// # Returns
/// One record per generator that succeeded, in registry order.
///
/// # Errors
/// Only `InvalidTarget`. A generator that fails is logged and left out of
/// the output; it never stops the others.
pub fn generate(
	registry: &Registry,
	request: &GenerationRequest,
	settings: &Settings,
	rng: &dyn RandomSource,
) -> Result<Vec<PasswordRecord>> {
	let target = request.target(settings)?;
	match target {
		Target::Strength(bits) => info!("Password strength: {bits} bits"),
		Target::Length(length) => info!("Password length: {length}"),
	}

	let generators = registry.filter_by_enabled(&request.enabled_generator_ids);
	debug!("{} active generators", generators.len());

	let mut records = Vec::with_capacity(generators.len());
	for generator in generators {
		match generator.password(&target, rng) {
			Ok(pw) => records.push(PasswordRecord {
				password: pw.password,
				entropy_bits: pw.entropy,
				strength: Strength::of(pw.entropy),
				generator_id: generator.id().to_owned(),
				generator_name: generator.name().to_owned(),
				description: generator.description().to_owned(),
			}),
			Err(e) => error!("Generator `{}` failed : {e}", generator.id()),
		}
	}

	Ok(records)
}
