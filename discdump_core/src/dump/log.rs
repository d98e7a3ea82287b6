/*!
# Disc Dump: Event Log
*/

use crate::DumpError;
use std::fmt::Write;
use utc2k::FmtUtc2k;



#[derive(Debug, Default)]
/// # Dump Event Log.
///
/// A plain-text running account of the interesting bits (phase changes,
/// read errors, rescues) for users who want a paper trail. Cheap to feed;
/// only rendered if somebody asks.
pub struct DumpLog {
	/// # Current Pass.
	pass: u8,

	/// # The Lines.
	buf: String,
}

impl DumpLog {
	#[must_use]
	/// # New (Empty).
	pub fn new() -> Self { Self::default() }

	/// # Start a New Pass.
	pub fn bump_pass(&mut self) {
		self.pass += 1;
		let now = FmtUtc2k::now();
		let _res = writeln!(
			&mut self.buf,
			"##\n## Pass {} ({now}).\n##",
			self.pass,
		);
	}

	/// # Note a Phase or Event.
	pub fn note(&mut self, msg: &str) {
		let _res = writeln!(&mut self.buf, "[{}]  {msg}", FmtUtc2k::now());
	}

	/// # Record a Read Error.
	pub fn err(&mut self, lba: u64, err: &DumpError) {
		let _res = writeln!(&mut self.buf, "[{}]  LBA {lba:08}  {err}", FmtUtc2k::now());
	}

	/// # Record a Rescued Block.
	pub fn rescued(&mut self, lba: u64) {
		let _res = writeln!(&mut self.buf, "[{}]  LBA {lba:08}  recovered", FmtUtc2k::now());
	}

	#[must_use]
	/// # Empty?
	pub fn is_empty(&self) -> bool { self.buf.is_empty() }

	#[must_use]
	/// # The Rendered Log.
	pub fn as_str(&self) -> &str { &self.buf }

	/// # Print to STDOUT.
	pub fn print(&self) {
		if ! self.buf.is_empty() {
			use std::io::Write as _;
			let writer = std::io::stdout();
			let mut handle = writer.lock();
			let _res = handle.write_all(self.buf.as_bytes()).and_then(|()| handle.flush());
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_log() {
		let mut log = DumpLog::new();
		assert!(log.is_empty());

		log.bump_pass();
		log.err(123, &DumpError::DeviceTimeout("READ (12)"));
		log.rescued(123);
		log.note("trim pass finished");

		let out = log.as_str();
		assert!(out.contains("## Pass 1"));
		assert!(out.contains("LBA 00000123"));
		assert!(out.contains("recovered"));
		assert!(out.contains("trim pass finished"));
	}
}
