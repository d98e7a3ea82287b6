/*!
# Disc Dump: Dump Pipelines
*/

pub(crate) mod block;
pub(crate) mod log;
pub(crate) mod opts;
pub(crate) mod speed;
pub(crate) mod tape;
pub(crate) mod xbox;

use crate::{
	Device,
	DumpError,
	DumpHardware,
	ImageWriter,
	KillSwitch,
	MediaScan,
	Resume,
	ResumeStore,
};
use dactyl::{
	NiceElapsed,
	NiceU64,
	traits::SaturatingFrom,
};
use fyi_msg::{
	Msg,
	Progless,
};
use log::DumpLog;
use opts::DumpOptions;
use speed::SpeedStat;
use std::time::{
	Duration,
	Instant,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Final Dump Status.
pub enum DumpStatus {
	/// # Everything Read.
	Success,

	/// # Finished, With Bad Blocks.
	Partial,

	/// # Aborted Or Errored Out.
	Failed,
}

#[derive(Debug, Clone, Copy)]
/// # Dump Outcome.
///
/// The final accounting handed back to the caller once a pipeline winds
/// down (cleanly or otherwise).
pub struct DumpOutcome {
	/// # Status.
	pub status: DumpStatus,

	/// # Total Blocks On the Medium.
	pub blocks: u64,

	/// # Blocks Read Successfully.
	pub good_blocks: u64,

	/// # Blocks Still Bad.
	pub bad_blocks: u64,

	/// # Wall Time.
	pub elapsed: Duration,

	/// # Slowest Observed Speed (Bytes/Sec).
	pub min_speed: f64,

	/// # Fastest Observed Speed (Bytes/Sec).
	pub max_speed: f64,
}

impl DumpOutcome {
	/// # Print a Summary.
	pub fn summarize(&self) {
		let (label, color) = match self.status {
			DumpStatus::Success => ("Success", 10),
			DumpStatus::Partial => ("Partial", 208),
			DumpStatus::Failed => ("Failed", 9),
		};
		Msg::custom(label, color, &format!(
			"{}/{} block(s) read, {} bad, in {}.",
			NiceU64::from(self.good_blocks),
			NiceU64::from(self.blocks),
			NiceU64::from(self.bad_blocks),
			NiceElapsed::from(self.elapsed),
		))
			.with_newline(true)
			.eprint();
	}
}



/// # Shared Pipeline State.
///
/// Everything the pipelines poke at besides the device and the image:
/// progress, the abort flag, the event log, speed figures, and the resume
/// ledger with its side-car store.
pub(crate) struct DumpShare<'a> {
	/// # Progress Bar.
	pub(crate) progress: &'a Progless,

	/// # Abort Flag.
	pub(crate) killed: &'a KillSwitch,

	/// # Event Log.
	pub(crate) log: DumpLog,

	/// # Speed Window.
	pub(crate) speed: SpeedStat,

	/// # Resume Ledger.
	pub(crate) resume: Resume,

	/// # Side-Car Store.
	store: ResumeStore,

	/// # Hash of the Last Saved Ledger.
	saved_hash: u32,
}

impl<'a> DumpShare<'a> {
	/// # New!
	fn new(
		store: ResumeStore,
		resume: Resume,
		progress: &'a Progless,
		killed: &'a KillSwitch,
	) -> Self {
		Self {
			progress,
			killed,
			log: DumpLog::new(),
			speed: SpeedStat::new(),
			resume,
			store,
			saved_hash: 0,
		}
	}

	/// # Persist the Resume Ledger.
	///
	/// Skipped when nothing has changed since the last save.
	///
	/// ## Errors
	///
	/// Bubbles up side-car write failures.
	pub(crate) fn save_resume(&mut self) -> Result<(), DumpError> {
		let hash = self.resume.quick_hash();
		if hash != self.saved_hash {
			self.store.save(&self.resume)?;
			self.saved_hash = hash;
		}
		Ok(())
	}

	/// # Swap In a Ledger For a Different Total.
	///
	/// The Xbox pipeline only learns the true image size after unlocking;
	/// this re-reads the side-car against that total, falling back to a
	/// fresh ledger when there is nothing (usable) saved.
	///
	/// ## Errors
	///
	/// Corrupt side-cars still refuse to load.
	pub(crate) fn reload_resume(&mut self, total: u64) -> Result<(), DumpError> {
		self.resume = match self.store.load(total) {
			Ok(Some(mut r)) => {
				if ! r.is_fresh() { r.bump_attempt(); }
				r
			},
			Ok(None) | Err(DumpError::ResumeMismatch) => Resume::new(total),
			Err(e) => return Err(e),
		};
		self.saved_hash = 0;
		Ok(())
	}

	/// # Record a Good Span.
	///
	/// Ledger first, after the image write, never before; then speed.
	pub(crate) fn mark_good(&mut self, lba: u64, len: u64, bytes: u64) {
		self.resume.mark_good(lba, len);
		self.resume.advance_to(lba + len);
		self.speed.add(bytes);
	}

	/// # Set the Progress Title.
	pub(crate) fn title(&self, msg: &str) {
		self.progress.set_title(Some(Msg::custom("Dumping", 199, msg)));
	}
}



/// # Dump Manager.
///
/// Borrows a device and a writable image (both outlive it, both
/// exclusively held for the duration), marries them to a media scan, and
/// runs whichever pipeline the media calls for.
pub struct Dumper<'a> {
	/// # The Device.
	dev: &'a mut dyn Device,

	/// # The Output Image.
	image: &'a mut dyn ImageWriter,

	/// # The Media Scan.
	scan: &'a MediaScan,

	/// # Options.
	opts: DumpOptions,

	/// # Resume Side-Car Store.
	store: ResumeStore,
}

impl<'a> Dumper<'a> {
	/// # New!
	///
	/// ## Errors
	///
	/// Returns an error if the scan reports no addressable blocks.
	pub fn new(
		dev: &'a mut dyn Device,
		image: &'a mut dyn ImageWriter,
		scan: &'a MediaScan,
		store: ResumeStore,
		opts: DumpOptions,
	) -> Result<Self, DumpError> {
		// Tapes are allowed to keep their length (and block size) to
		// themselves; everything else must have real geometry.
		if (scan.blocks == 0 || scan.block_size == 0) && ! scan.media_type.is_tape() {
			return Err(DumpError::BlankMedium);
		}
		Ok(Self {
			dev,
			image,
			scan,
			opts,
			store,
		})
	}

	/// # Dump!
	///
	/// Runs the whole show: resume pickup, tag transfer, the media-matched
	/// pipeline, trim/retry, and the final accounting. The resume side-car
	/// is written after every image write and survives both success (for
	/// audit) and failure (for resumption).
	///
	/// ## Errors
	///
	/// Transient read errors are absorbed into the bad-block list; anything
	/// structural, hardware-fatal, or abort-shaped surfaces here, with the
	/// resume side-car already safely on disk.
	pub fn dump(self, progress: &Progless, killed: &KillSwitch)
	-> Result<DumpOutcome, DumpError> {
		let started = Instant::now();

		// Sequential media of unknown length get an unbounded ledger; the
		// outcome math squares it away at the end.
		let blocks =
			if self.scan.media_type.is_tape() && self.scan.blocks == 0 { u64::MAX }
			else { self.scan.blocks };

		// Pick up (or start) the ledger.
		let resume =
			if self.opts.resume() {
				match self.store.load(blocks) {
					Ok(Some(mut r)) => {
						if ! r.is_fresh() { r.bump_attempt(); }
						r
					},
					Ok(None) => Resume::new(blocks),
					// Xbox side-cars are sized to the unlocked geometry,
					// which doesn't exist yet; the pipeline reloads.
					Err(DumpError::ResumeMismatch) if self.scan.media_type.is_xgd() =>
						Resume::new(blocks),
					Err(e) => return Err(e),
				}
			}
			else { Resume::new(blocks) };

		// Seed the image with everything the scan already knows.
		for (kind, blob) in &self.scan.tags {
			self.image.write_media_tag(*kind, blob)?;
		}
		if let Some(id) = self.dev.ident() {
			self.image.set_dump_hardware(&DumpHardware::new(*id, String::new()))?;
		}

		let _res = progress.reset(u32::saturating_from(blocks));
		let mut share = DumpShare::new(self.store, resume, progress, killed);
		share.save_resume()?;
		share.log.bump_pass();

		// Run the matching pipeline.
		let res =
			if self.scan.media_type.is_xgd() {
				xbox::run(self.dev, self.image, &mut share, self.scan, self.opts)
			}
			else if self.scan.media_type.is_tape() {
				tape::run(self.dev, self.image, &mut share, self.scan, self.opts)
			}
			else {
				block::run(self.dev, self.image, &mut share, self.scan, self.opts)
			};

		// Win or lose, the ledger and image get buttoned up before anything
		// else happens.
		share.save_resume()?;
		self.image.close()?;
		progress.finish();
		if self.opts.verbose() { share.log.print(); }
		res?;

		// The ledger knows the real total; pipelines may have refined it.
		// An unbounded (tape) ledger is squared away as read-plus-bad.
		let good_blocks = share.resume.covered().total_blocks();
		let bad_blocks = share.resume.bad_blocks().len() as u64;
		let blocks =
			if share.resume.total_blocks() == u64::MAX { good_blocks + bad_blocks }
			else { share.resume.total_blocks() };
		let status =
			if killed.killed() { DumpStatus::Failed }
			else if bad_blocks == 0 && blocks <= good_blocks { DumpStatus::Success }
			else { DumpStatus::Partial };

		Ok(DumpOutcome {
			status,
			blocks,
			good_blocks,
			bad_blocks,
			elapsed: started.elapsed(),
			min_speed: share.speed.min(),
			max_speed: share.speed.max(),
		})
	}
}
