/*!
# Disc Dump: Dump Options
*/



/// # FLAG: Resume From a Side-Car.
const FLAG_RESUME: u8 =     0b0000_0001;

/// # FLAG: Trim Pass.
const FLAG_TRIM: u8 =       0b0000_0010;

/// # FLAG: Persistent Retries.
const FLAG_PERSISTENT: u8 = 0b0000_0100;

/// # FLAG: Force Restart When Resume Is Impossible.
const FLAG_FORCE: u8 =      0b0000_1000;

/// # FLAG: Verbose Event Log.
const FLAG_VERBOSE: u8 =    0b0001_0000;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = FLAG_RESUME | FLAG_TRIM;



#[derive(Debug, Clone, Copy)]
/// # Dump Options.
///
/// Knobs for the dump pipelines: error-skip burst size, trim/retry
/// behavior, and resume policy.
///
/// Options are set using builder-style methods, like:
///
/// ```
/// use discdump_core::DumpOptions;
///
/// let opts = DumpOptions::default()
///     .with_retry_passes(2)
///     .with_skip(32);
///
/// assert_eq!(opts.retry_passes(), 2);
/// assert_eq!(opts.skip(), 32);
/// assert!(opts.resume());
/// ```
pub struct DumpOptions {
	/// # Flags.
	flags: u8,

	/// # Retry Passes.
	retry_passes: u8,

	/// # Skip Burst (Sectors).
	skip: u32,
}

impl Default for DumpOptions {
	fn default() -> Self {
		Self {
			flags: FLAG_DEFAULT,
			retry_passes: 0,
			skip: 16,
		}
	}
}

/// # Setters.
impl DumpOptions {
	#[must_use]
	/// # With Resume.
	///
	/// When `true` (the default) a matching resume side-car picks the
	/// dump up where it left off. When `false`, any existing side-car is
	/// ignored and overwritten.
	pub const fn with_resume(self, resume: bool) -> Self {
		Self {
			flags:
				if resume { self.flags | FLAG_RESUME }
				else { self.flags & ! FLAG_RESUME },
			..self
		}
	}

	#[must_use]
	/// # With Trim.
	///
	/// After the main pass, re-try each skipped sector individually,
	/// rescuing whatever the burst skip swallowed. Enabled by default.
	pub const fn with_trim(self, trim: bool) -> Self {
		Self {
			flags:
				if trim { self.flags | FLAG_TRIM }
				else { self.flags & ! FLAG_TRIM },
			..self
		}
	}

	#[must_use]
	/// # With Retry Passes.
	///
	/// Alternating forward/reverse passes over the remaining bad blocks,
	/// up to this many. The default is zero; the max is sixteen.
	pub const fn with_retry_passes(self, mut retry_passes: u8) -> Self {
		if 16 < retry_passes { retry_passes = 16; }
		Self {
			retry_passes,
			..self
		}
	}

	#[must_use]
	/// # With Persistent Retries.
	///
	/// Before the retry passes, raise the drive's read-retry count to the
	/// maximum and enable early error recovery via MODE SELECT, restoring
	/// the original page afterwards. Off by default; not every drive
	/// tolerates it.
	pub const fn with_persistent(self, persistent: bool) -> Self {
		Self {
			flags:
				if persistent { self.flags | FLAG_PERSISTENT }
				else { self.flags & ! FLAG_PERSISTENT },
			..self
		}
	}

	#[must_use]
	/// # With Force.
	///
	/// When a tape cannot be repositioned to the resume point, `true`
	/// restarts from the beginning instead of aborting.
	pub const fn with_force(self, force: bool) -> Self {
		Self {
			flags:
				if force { self.flags | FLAG_FORCE }
				else { self.flags & ! FLAG_FORCE },
			..self
		}
	}

	#[must_use]
	/// # With Verbose Logging.
	pub const fn with_verbose(self, verbose: bool) -> Self {
		Self {
			flags:
				if verbose { self.flags | FLAG_VERBOSE }
				else { self.flags & ! FLAG_VERBOSE },
			..self
		}
	}

	#[must_use]
	/// # With Skip Burst.
	///
	/// How many sectors to zero-fill and leap over when a read fails.
	/// Values are clamped to at least one here; pipelines additionally
	/// never skip less than their read stride.
	pub const fn with_skip(self, mut skip: u32) -> Self {
		if skip == 0 { skip = 1; }
		Self {
			skip,
			..self
		}
	}
}

/// # Getters.
impl DumpOptions {
	#[must_use]
	/// # Resume?
	pub const fn resume(&self) -> bool { FLAG_RESUME == self.flags & FLAG_RESUME }

	#[must_use]
	/// # Trim?
	pub const fn trim(&self) -> bool { FLAG_TRIM == self.flags & FLAG_TRIM }

	#[must_use]
	/// # Persistent Retries?
	pub const fn persistent(&self) -> bool { FLAG_PERSISTENT == self.flags & FLAG_PERSISTENT }

	#[must_use]
	/// # Force?
	pub const fn force(&self) -> bool { FLAG_FORCE == self.flags & FLAG_FORCE }

	#[must_use]
	/// # Verbose?
	pub const fn verbose(&self) -> bool { FLAG_VERBOSE == self.flags & FLAG_VERBOSE }

	#[must_use]
	/// # Retry Passes.
	pub const fn retry_passes(&self) -> u8 { self.retry_passes }

	#[must_use]
	/// # Skip Burst (Sectors).
	pub const fn skip(&self) -> u32 { self.skip }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_flags() {
		let opts = DumpOptions::default();
		assert!(opts.resume());
		assert!(opts.trim());
		assert!(! opts.persistent());
		assert!(! opts.force());
		assert_eq!(opts.retry_passes(), 0);

		let opts = opts
			.with_resume(false)
			.with_trim(false)
			.with_persistent(true)
			.with_retry_passes(99)
			.with_skip(0);
		assert!(! opts.resume());
		assert!(! opts.trim());
		assert!(opts.persistent());
		assert_eq!(opts.retry_passes(), 16);
		assert_eq!(opts.skip(), 1);
	}
}
