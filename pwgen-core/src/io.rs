use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use std::{env, fs, io};

/// Reads a whole text file into a `String`.
pub(crate) fn read_text<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Reads a word list: one entry per line, `\n` or `\r\n`.
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	Ok(read_text(filename)?.lines().map(str::to_owned).collect())
}

/// Extension of chain caches.
pub(crate) const CACHE_EXTENSION: &str = "bin";

/// Cache file of a corpus: same folder, same stem, `.bin` extension.
///
/// `data/english.txt` → `data/english.bin`
pub(crate) fn cache_path(corpus: &Path) -> io::Result<PathBuf> {
	if corpus.file_stem().is_none() {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("`{}` does not name a corpus file", corpus.display()),
		));
	}
	Ok(corpus.with_extension(CACHE_EXTENSION))
}

/// Returns `true` if `derived` exists and was modified no earlier than `source`.
///
/// Missing timestamps count as stale.
pub(crate) fn is_fresh<PS: AsRef<Path>, PD: AsRef<Path>>(source: PS, derived: PD) -> bool {
	let modified = |p: &Path| -> Option<SystemTime> { fs::metadata(p).ok()?.modified().ok() };
	match (modified(source.as_ref()), modified(derived.as_ref())) {
		(Some(src), Some(dst)) => dst >= src,
		_ => false,
	}
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder(input: &Path) -> PathBuf {
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns full paths, sorted so discovery order is stable across runs.
pub(crate) fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<PathBuf>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			files.push(path);
		}
	}

	files.sort();
	Ok(files)
}
