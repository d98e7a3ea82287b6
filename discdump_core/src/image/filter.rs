/*!
# Disc Dump: File Filters
*/

use crate::DumpError;
use std::{
	fs::File,
	io::BufReader,
	path::{
		Path,
		PathBuf,
	},
};



#[derive(Debug, Clone)]
/// # File Filter.
///
/// A thin handle around an on-disk file that can hand out seekable byte
/// streams, and (crucially) resolve *sibling* files referenced by a
/// container. Those references were usually written on a case-insensitive
/// host, so resolution probes a handful of case-folded spellings before
/// giving up.
pub struct Filter {
	/// # Canonical Path.
	path: PathBuf,
}

impl Filter {
	/// # New!
	///
	/// ## Errors
	///
	/// Returns a format error if the path does not point at a readable
	/// file.
	pub fn new<P>(path: P) -> Result<Self, DumpError>
	where P: AsRef<Path> {
		let path = path.as_ref();
		if path.is_file() {
			Ok(Self { path: path.to_path_buf() })
		}
		else {
			Err(DumpError::Format(format!("no such file ({})", path.display())))
		}
	}

	#[must_use]
	/// # Path.
	pub fn path(&self) -> &Path { &self.path }

	#[must_use]
	/// # Parent Directory.
	pub fn parent(&self) -> &Path {
		self.path.parent().unwrap_or_else(|| Path::new("."))
	}

	#[must_use]
	/// # File Length (Bytes).
	pub fn len(&self) -> u64 {
		std::fs::metadata(&self.path).map_or(0, |m| m.len())
	}

	#[must_use]
	/// # Empty?
	pub fn is_empty(&self) -> bool { self.len() == 0 }

	/// # Open a Buffered Stream.
	///
	/// ## Errors
	///
	/// Returns a format error if the file has vanished since construction.
	pub fn reader(&self) -> Result<BufReader<File>, DumpError> {
		File::open(&self.path)
			.map(BufReader::new)
			.map_err(|_| DumpError::Format(format!("unreadable file ({})", self.path.display())))
	}

	/// # Resolve a Referenced Sibling.
	///
	/// `reference` is a (possibly relative, possibly foreign-separator)
	/// path recorded inside the container. Resolution tries six spellings
	/// against this filter's parent directory: the reference as written,
	/// its file name lower- and upper-cased, and the fully folded
	/// directory/name combinations.
	///
	/// ## Errors
	///
	/// Returns a format error if none of the candidates exist.
	pub fn attached(&self, reference: &str) -> Result<Self, DumpError> {
		// Normalize foreign separators and strip any drive prefix; only the
		// relative tail can possibly resolve here.
		let clean = reference.replace('\\', "/");
		let clean = clean.rsplit_once(':').map_or(clean.as_str(), |(_, tail)| tail);
		let rel = Path::new(clean.trim_start_matches('/'));

		let name = rel.file_name()
			.and_then(|n| n.to_str())
			.ok_or_else(|| DumpError::Format(format!("unresolvable reference ({reference})")))?;
		let dir = rel.parent()
			.and_then(|p| p.to_str())
			.unwrap_or("");

		let candidates = [
			(dir.to_owned(), name.to_owned()),
			(dir.to_owned(), name.to_lowercase()),
			(dir.to_owned(), name.to_uppercase()),
			(dir.to_lowercase(), name.to_lowercase()),
			(dir.to_uppercase(), name.to_uppercase()),
			(dir.to_lowercase(), name.to_owned()),
		];

		for (d, n) in candidates {
			let mut full = self.parent().to_path_buf();
			if ! d.is_empty() { full.push(d); }
			full.push(n);
			if full.is_file() { return Ok(Self { path: full }); }
		}

		Err(DumpError::Format(format!("missing data file ({reference})")))
	}
}
