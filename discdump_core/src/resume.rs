/*!
# Disc Dump: Resume Data
*/

use crate::{
	DumpError,
	Extents,
};
use serde::{
	Deserialize,
	Serialize,
};
use std::{
	io::Write,
	path::{
		Path,
		PathBuf,
	},
};



/// # Magic Bytes.
///
/// This identifies resume side-cars, as well as the format "version" used at
/// the time of their construction, making sure we don't waste time trying to
/// shove bytes into the wrong shape.
const MAGIC: &str = "DDResume02";



#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
/// # One Dump Attempt.
///
/// Each invocation of a pipeline against a given output appends one of
/// these: when it started, and the intervals it managed to read.
pub struct Attempt {
	/// # Start Time (Unix Seconds).
	pub started: u32,

	/// # Successfully-Read Intervals.
	pub extents: Extents,
}

impl Attempt {
	#[must_use]
	/// # New (Now).
	pub fn new() -> Self {
		Self {
			started: utc2k::unixtime(),
			extents: Extents::new(),
		}
	}
}

impl Default for Attempt {
	fn default() -> Self { Self::new() }
}



#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
/// # Resume Record.
///
/// The persistent ledger of a dump in progress: the next linear block to
/// read, the blocks that failed, and the per-attempt extents already safely
/// in the image. Updated after every image write (image-write-then-resume-
/// update), and kept after successful completion for forensic audit.
pub struct Resume {
	/// # Total Blocks On the Medium.
	total_blocks: u64,

	/// # Next Linear Block.
	next_block: u64,

	/// # Bad Blocks (Sorted, Unique).
	bad_blocks: Vec<u64>,

	/// # Attempt History.
	tries: Vec<Attempt>,
}

impl Resume {
	#[must_use]
	/// # New!
	///
	/// Start a fresh record for a medium of `total_blocks`, opening the
	/// first attempt.
	pub fn new(total_blocks: u64) -> Self {
		Self {
			total_blocks,
			next_block: 0,
			bad_blocks: Vec::new(),
			tries: vec![Attempt::new()],
		}
	}

	#[must_use]
	/// # Total Blocks.
	pub const fn total_blocks(&self) -> u64 { self.total_blocks }

	#[must_use]
	/// # Next Linear Block.
	pub const fn next_block(&self) -> u64 { self.next_block }

	#[must_use]
	/// # Bad Blocks.
	pub fn bad_blocks(&self) -> &[u64] { &self.bad_blocks }

	#[must_use]
	/// # Attempts.
	pub fn tries(&self) -> &[Attempt] { &self.tries }

	#[must_use]
	/// # All Covered Extents.
	///
	/// The union across every attempt.
	pub fn covered(&self) -> Extents {
		let mut out = Extents::new();
		for t in &self.tries {
			for &(s, e) in t.extents.as_pairs() { out.add_span(s, e - s); }
		}
		out
	}

	#[must_use]
	/// # Anything Dumped Yet?
	pub fn is_fresh(&self) -> bool {
		self.next_block == 0 && self.bad_blocks.is_empty() &&
		self.tries.iter().all(|t| t.extents.is_empty())
	}

	/// # Open a New Attempt.
	pub fn bump_attempt(&mut self) { self.tries.push(Attempt::new()); }

	/// # Advance the Linear Cursor.
	///
	/// The cursor only ever moves forward, and never past the end of the
	/// medium; anything else is quietly ignored.
	pub fn advance_to(&mut self, lba: u64) {
		if self.next_block < lba { self.next_block = lba.min(self.total_blocks); }
	}

	/// # Record a Good Span.
	///
	/// Adds the interval to the current attempt and drops any of its blocks
	/// from the bad list (bad and covered sets stay disjoint).
	pub fn mark_good(&mut self, lba: u64, len: u64) {
		if let Some(last) = self.tries.last_mut() { last.extents.add_span(lba, len); }
		if ! self.bad_blocks.is_empty() {
			let end = lba.saturating_add(len);
			self.bad_blocks.retain(|&b| b < lba || end <= b);
		}
	}

	/// # Record a Bad Block.
	///
	/// No-op if the block is out of range or already covered by a good
	/// extent.
	pub fn mark_bad(&mut self, lba: u64) {
		if self.total_blocks <= lba { return; }
		if self.tries.iter().any(|t| t.extents.contains(lba)) { return; }
		if let Err(idx) = self.bad_blocks.binary_search(&lba) {
			self.bad_blocks.insert(idx, lba);
		}
	}

	#[must_use]
	/// # Quick Hash.
	///
	/// A cheap crc32 over the serialized record, used to skip redundant
	/// side-car rewrites.
	pub fn quick_hash(&self) -> u32 {
		serde_json::to_vec(self).map_or(0, |v| crc32fast::hash(&v))
	}

	/// # Sanity Check.
	///
	/// Verify the invariants a well-formed record must uphold: the cursor in
	/// bounds, bad blocks sorted/unique/in-bounds, and bad blocks disjoint
	/// from every covered extent.
	///
	/// ## Errors
	///
	/// Returns [`DumpError::ResumeCorrupt`] on any violation.
	pub fn validate(&self) -> Result<(), DumpError> {
		if self.total_blocks < self.next_block { return Err(DumpError::ResumeCorrupt); }
		if ! self.bad_blocks.windows(2).all(|w| w[0] < w[1]) {
			return Err(DumpError::ResumeCorrupt);
		}
		if self.bad_blocks.last().is_some_and(|&b| self.total_blocks <= b) {
			return Err(DumpError::ResumeCorrupt);
		}

		let covered = self.covered();
		if self.bad_blocks.iter().any(|&b| covered.contains(b)) {
			return Err(DumpError::ResumeCorrupt);
		}

		Ok(())
	}
}



#[derive(Debug, Serialize, Deserialize)]
/// # On-Disk Shape.
struct ResumeDoc {
	/// # Format Magic.
	magic: String,

	/// # The Record.
	resume: Resume,
}



#[derive(Debug, Clone)]
/// # Resume Side-Car Store.
///
/// Owns the side-car path and handles (re)loading and atomic saves. Every
/// save writes to a temporary file in the same directory, then renames over
/// the target, so a crash can never leave a half-written record behind.
pub struct ResumeStore {
	/// # Side-Car Path.
	path: PathBuf,
}

impl ResumeStore {
	/// # For an Output Image.
	///
	/// The side-car sits next to the image, same file name plus a
	/// `.resume` suffix.
	///
	/// ## Errors
	///
	/// Returns an error if the image path has no usable file name.
	pub fn for_image(image: &Path) -> Result<Self, DumpError> {
		let name = image.file_name()
			.ok_or_else(|| DumpError::Write(image.to_string_lossy().into_owned()))?;
		let mut name = name.to_os_string();
		name.push(".resume");
		Ok(Self { path: image.with_file_name(name) })
	}

	#[must_use]
	/// # Side-Car Path.
	pub fn path(&self) -> &Path { &self.path }

	#[must_use]
	/// # Side-Car Present?
	pub fn exists(&self) -> bool { self.path.is_file() }

	/// # Load.
	///
	/// Returns `Ok(None)` if there is no side-car at all.
	///
	/// ## Errors
	///
	/// Returns [`DumpError::ResumeCorrupt`] if the file exists but cannot be
	/// parsed or fails validation, and [`DumpError::ResumeMismatch`] if it
	/// describes a medium of a different size.
	pub fn load(&self, total_blocks: u64) -> Result<Option<Resume>, DumpError> {
		let Ok(raw) = std::fs::read(&self.path) else { return Ok(None); };
		let doc: ResumeDoc = serde_json::from_slice(&raw)
			.map_err(|_| DumpError::ResumeCorrupt)?;
		if doc.magic != MAGIC { return Err(DumpError::ResumeCorrupt); }
		doc.resume.validate()?;
		if doc.resume.total_blocks != total_blocks {
			return Err(DumpError::ResumeMismatch);
		}
		Ok(Some(doc.resume))
	}

	/// # Save (Atomically).
	///
	/// ## Errors
	///
	/// Returns [`DumpError::ResumeSave`] if the write or rename fails.
	pub fn save(&self, resume: &Resume) -> Result<(), DumpError> {
		let doc = ResumeDoc {
			magic: MAGIC.to_owned(),
			resume: resume.clone(),
		};
		let raw = serde_json::to_vec(&doc).map_err(|_| DumpError::ResumeSave)?;

		let parent = self.path.parent().ok_or(DumpError::ResumeSave)?;
		let mut tmp = tempfile::NamedTempFile::new_in(parent)
			.map_err(|_| DumpError::ResumeSave)?;
		tmp.write_all(&raw)
			.and_then(|()| tmp.flush())
			.map_err(|_| DumpError::ResumeSave)?;
		tmp.persist(&self.path).map_err(|_| DumpError::ResumeSave)?;
		Ok(())
	}

	/// # Remove.
	pub fn remove(&self) { let _res = std::fs::remove_file(&self.path); }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_marks() {
		let mut resume = Resume::new(100);
		assert!(resume.is_fresh());

		resume.mark_bad(5);
		resume.mark_bad(3);
		resume.mark_bad(5);
		assert_eq!(resume.bad_blocks(), &[3, 5]);

		resume.mark_good(0, 3);
		resume.advance_to(6);
		assert_eq!(resume.next_block(), 6);
		assert!(! resume.is_fresh());

		// The cursor never backs up or overshoots.
		resume.advance_to(2);
		assert_eq!(resume.next_block(), 6);
		resume.advance_to(500);
		assert_eq!(resume.next_block(), 100);

		// Trim rescues: good kicks bad out.
		resume.mark_good(5, 1);
		assert_eq!(resume.bad_blocks(), &[3]);

		// Covered blocks can't be re-marked bad.
		resume.mark_bad(5);
		assert_eq!(resume.bad_blocks(), &[3]);

		// Out-of-range is ignored.
		resume.mark_bad(100);
		assert_eq!(resume.bad_blocks(), &[3]);

		assert!(resume.validate().is_ok());
		assert_eq!(resume.covered().as_pairs(), &[(0, 3), (5, 6)]);
	}

	#[test]
	fn t_store() {
		let dir = tempfile::tempdir().unwrap();
		let img = dir.path().join("disc.img");
		let store = ResumeStore::for_image(&img).unwrap();
		assert!(! store.exists());
		assert!(store.load(100).unwrap().is_none());

		let mut resume = Resume::new(100);
		resume.mark_good(0, 10);
		resume.mark_bad(10);
		resume.advance_to(11);
		store.save(&resume).unwrap();
		assert!(store.exists());

		let back = store.load(100).unwrap().unwrap();
		assert_eq!(back, resume);
		assert_eq!(back.quick_hash(), resume.quick_hash());

		// A different medium size is a mismatch.
		assert!(matches!(store.load(200), Err(DumpError::ResumeMismatch)));

		// Garbage is corrupt.
		std::fs::write(store.path(), b"not json").unwrap();
		assert!(matches!(store.load(100), Err(DumpError::ResumeCorrupt)));
	}

	#[test]
	fn t_attempts() {
		let mut resume = Resume::new(1000);
		resume.mark_good(0, 500);
		resume.bump_attempt();
		resume.mark_good(500, 100);

		assert_eq!(resume.tries().len(), 2);
		assert_eq!(resume.tries()[0].extents.as_pairs(), &[(0, 500)]);
		assert_eq!(resume.tries()[1].extents.as_pairs(), &[(500, 600)]);
		assert_eq!(resume.covered().as_pairs(), &[(0, 600)]);
	}
}
