use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, warn};

use crate::builtin::BUILTINS;
use crate::config::Settings;
use crate::error::{PwgenError, Result};
use crate::generator::{Descriptor, Generator};
use crate::io::normalize_folder;
use crate::user;

/// A registered generator with its ranking keys.
#[derive(Debug, Clone)]
struct Entry {
	generator: Arc<dyn Generator>,
	/// Per-unit entropy, computed once at registration.
	entropy: f64,
	/// Discovery order, used to break entropy ties.
	order: usize,
}

/// Ranked collection of generators.
///
/// # Responsibilities
/// - Load built-in generators (once) and user sources (once per directory)
/// - Keep ids unique: a later generator with an existing id replaces the
///   earlier one
/// - Keep generators sorted by descending entropy, ties in discovery order
///
/// # Invariants
/// - Every entry's data was materialized successfully at registration
/// - `entries` is always sorted
#[derive(Debug, Default)]
pub struct Registry {
	entries: Vec<Entry>,
	next_order: usize,
	builtins_loaded: bool,
	imported_dirs: HashSet<PathBuf>,
}

impl Registry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry holding the built-ins and, if configured, the
	/// user generators of `settings.user_generators_dir`.
	///
	/// A user directory that cannot be read is logged and ignored.
	pub fn discover(settings: &Settings) -> Self {
		let mut registry = Self::new();
		registry.load_builtins(settings);

		if let Some(dir) = &settings.user_generators_dir {
			if let Err(e) = registry.load_user_source(dir, settings) {
				error!("Error importing user generators from `{}` : {e}", dir.display());
			}
		}
		registry
	}

	/// Registers every built-in generator.
	///
	/// Only the first call does anything. A built-in whose data cannot be
	/// loaded (e.g. a missing word file) is logged and skipped.
	pub fn load_builtins(&mut self, settings: &Settings) {
		if self.builtins_loaded {
			warn!("Built-in generators already loaded");
			return;
		}
		self.builtins_loaded = true;

		for (id, factory) in BUILTINS {
			if let Err(e) = self.register(factory(settings)) {
				error!("Error loading built-in generator `{id}` : {e}");
			}
		}
		debug!("{} generators after loading built-ins", self.len());
	}

	/// Registers every generator defined in the directory `dir`.
	///
	/// Importing the same directory twice is a no-op. User generators may
	/// replace built-ins with the same id.
	///
	/// # Returns
	/// The number of generators registered by this call.
	///
	/// # Errors
	/// Only if the directory cannot be listed. Bad definitions and generators
	/// whose data cannot be loaded are logged and skipped.
	pub fn load_user_source<P: AsRef<Path>>(&mut self, dir: P, settings: &Settings) -> Result<usize> {
		let folder = normalize_folder(dir.as_ref());
		let key = folder.canonicalize().unwrap_or_else(|_| folder.clone());

		if self.imported_dirs.contains(&key) {
			warn!("Directory already imported : `{}`", key.display());
			return Ok(0);
		}

		let generators = user::load_dir(&folder, settings)?;
		self.imported_dirs.insert(key);

		let mut count = 0;
		for generator in generators {
			let id = generator.id().to_owned();
			match self.register(generator) {
				Ok(()) => count += 1,
				Err(e) => error!("Error loading user generator `{id}` : {e}"),
			}
		}
		debug!("Imported {count} user generators from `{}`", folder.display());
		Ok(count)
	}

	/// Adds a generator, replacing any generator with the same id.
	///
	/// # Errors
	/// Fails if the generator's data cannot be materialized. The registry is
	/// left unchanged in that case.
	pub fn register(&mut self, generator: Arc<dyn Generator>) -> Result<()> {
		let entropy = generator.entropy()?;

		if let Some(index) = self.position(generator.id()) {
			warn!("Generator `{}` replaces an earlier definition", generator.id());
			self.entries.remove(index);
		}
		self.insert(generator, entropy);
		Ok(())
	}

	/// Adds a generator unless its id is already taken.
	///
	/// # Errors
	/// - `DuplicateGeneratorId` if the id is registered
	/// - any error raised while materializing the generator's data
	pub fn try_register(&mut self, generator: Arc<dyn Generator>) -> Result<()> {
		if self.position(generator.id()).is_some() {
			return Err(PwgenError::DuplicateGeneratorId(generator.id().to_owned()));
		}
		let entropy = generator.entropy()?;
		self.insert(generator, entropy);
		Ok(())
	}

	fn insert(&mut self, generator: Arc<dyn Generator>, entropy: f64) {
		debug!("Loaded generator `{}` ({:0.2} bits per unit)", generator.id(), entropy);
		self.entries.push(Entry { generator, entropy, order: self.next_order });
		self.next_order += 1;
		self.entries.sort_by(|a, b| b.entropy.total_cmp(&a.entropy).then(a.order.cmp(&b.order)));
	}

	fn position(&self, id: &str) -> Option<usize> {
		self.entries.iter().position(|e| e.generator.id() == id)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Generators in ranking order.
	pub fn generators(&self) -> impl Iterator<Item = &Arc<dyn Generator>> {
		self.entries.iter().map(|e| &e.generator)
	}

	/// Ids in ranking order.
	pub fn ids(&self) -> Vec<&str> {
		self.entries.iter().map(|e| e.generator.id()).collect()
	}

	pub fn get(&self, id: &str) -> Option<&Arc<dyn Generator>> {
		self.position(id).map(|i| &self.entries[i].generator)
	}

	/// Descriptors in ranking order.
	pub fn descriptors(&self) -> Vec<Descriptor> {
		self.entries
			.iter()
			.map(|e| Descriptor {
				id: e.generator.id().to_owned(),
				name: e.generator.name().to_owned(),
				description: e.generator.description().to_owned(),
				entropy: e.entropy,
			})
			.collect()
	}

	/// Keeps the generators whose id is in `enabled_ids`, in ranking order.
	///
	/// An empty `enabled_ids` means "no filter" and keeps everything.
	/// Unknown ids are ignored.
	pub fn filter_by_enabled<S: AsRef<str>>(&self, enabled_ids: &[S]) -> Vec<Arc<dyn Generator>> {
		if enabled_ids.is_empty() {
			return self.generators().cloned().collect();
		}
		let enabled: HashSet<&str> = enabled_ids.iter().map(AsRef::as_ref).collect();
		self.generators().filter(|g| enabled.contains(g.id())).cloned().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::generator::CharsetGenerator;

	fn charset(id: &str, chars: &str) -> Arc<dyn Generator> {
		Arc::new(CharsetGenerator::new(id, id, "", chars))
	}

	#[test]
	fn test_sorted_by_entropy_then_order() {
		let mut registry = Registry::new();
		registry.register(charset("two", "ab")).unwrap();
		registry.register(charset("four", "abcd")).unwrap();
		registry.register(charset("two-again", "xy")).unwrap();
		registry.register(charset("eight", "abcdefgh")).unwrap();

		assert_eq!(registry.ids(), vec!["eight", "four", "two", "two-again"]);
	}

	#[test]
	fn test_register_replaces_same_id() {
		let mut registry = Registry::new();
		registry.register(charset("x", "ab")).unwrap();
		registry.register(charset("x", "abcd")).unwrap();

		assert_eq!(registry.len(), 1);
		assert_eq!(registry.get("x").unwrap().entropy().unwrap(), 2.0);
	}

	#[test]
	fn test_try_register_rejects_duplicate() {
		let mut registry = Registry::new();
		registry.try_register(charset("x", "ab")).unwrap();
		assert!(matches!(registry.try_register(charset("x", "abcd")), Err(PwgenError::DuplicateGeneratorId(_))));
		assert_eq!(registry.get("x").unwrap().entropy().unwrap(), 1.0);
	}

	#[test]
	fn test_failed_register_leaves_registry_unchanged() {
		let mut registry = Registry::new();
		registry.register(charset("x", "ab")).unwrap();
		assert!(registry.register(charset("x", "a")).is_err());
		assert_eq!(registry.get("x").unwrap().entropy().unwrap(), 1.0);
	}

	#[test]
	fn test_filter_by_enabled() {
		let mut registry = Registry::new();
		registry.register(charset("a", "ab")).unwrap();
		registry.register(charset("b", "abcd")).unwrap();
		registry.register(charset("c", "abcdefgh")).unwrap();

		let filtered = registry.filter_by_enabled(&["a", "c", "missing"]);
		let ids: Vec<&str> = filtered.iter().map(|g| g.id()).collect();
		assert_eq!(ids, vec!["c", "a"]);

		let none: [&str; 0] = [];
		assert_eq!(registry.filter_by_enabled(&none).len(), 3);
	}

	#[test]
	fn test_builtins_loaded_once() {
		let settings = Settings::default();
		let mut registry = Registry::new();
		registry.load_builtins(&settings);
		let first = registry.ids().iter().map(|s| s.to_string()).collect::<Vec<_>>();
		registry.load_builtins(&settings);
		assert_eq!(registry.ids(), first);
	}
}
