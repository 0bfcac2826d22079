use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads a whole text file into memory.
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	fs::read_to_string(filename)
}

/// Resolves the data directory given on the command line.
///
/// Surrounding whitespace is ignored. An empty path, `.` or `./` means the
/// current working directory; anything else is used as given.
pub fn resolve_data_dir(input: &str) -> io::Result<PathBuf> {
	match input.trim() {
		"" | "." | "./" => env::current_dir(),
		dir => Ok(PathBuf::from(dir)),
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted so that corpora are always
/// ingested in the same order.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn data_dir_defaults_to_current_dir() {
		let cwd = env::current_dir().unwrap();
		for input in ["", "  ", ".", "./", " . "] {
			assert_eq!(resolve_data_dir(input).unwrap(), cwd, "{input:?}");
		}
		assert_eq!(resolve_data_dir(" data/corpora ").unwrap(), PathBuf::from("data/corpora"));
	}

	#[test]
	fn lists_only_matching_extension() {
		let dir = env::temp_dir().join(format!("wordgram-io-{}", std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		fs::write(dir.join("b.json"), "[]").unwrap();
		fs::write(dir.join("a.json"), "[]").unwrap();
		fs::write(dir.join("notes.txt"), "").unwrap();

		let files = list_files(&dir, "json").unwrap();
		fs::remove_dir_all(&dir).unwrap();

		assert_eq!(files, vec!["a.json", "b.json"]);
	}
}
