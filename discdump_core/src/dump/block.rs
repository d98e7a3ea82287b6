/*!
# Disc Dump: Block Pipeline

The workhorse: a linear sector-by-sector dump with a skip/trim/retry loop,
used for every random-access medium that isn't an Xbox Game Disc.
*/

use crate::{
	Device,
	DumpError,
	ImageMetadata,
	ImageWriter,
	MediaScan,
	MediaTagKind,
	ModePageControl,
};
use std::time::Duration;
use super::{
	DumpOptions,
	DumpShare,
};



/// # Per-Read Timeout.
const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// # Mode-Page Timeout.
const MODE_TIMEOUT: Duration = Duration::from_secs(10);

/// # Probe Starting Stride.
const STRIDE_START: u32 = 64;



/// # Run the Block Pipeline.
///
/// ## Errors
///
/// Read errors are absorbed as bad blocks; structural and hardware
/// failures bubble up.
pub(super) fn run(
	dev: &mut dyn Device,
	image: &mut dyn ImageWriter,
	share: &mut DumpShare<'_>,
	scan: &MediaScan,
	opts: DumpOptions,
) -> Result<(), DumpError> {
	let blocks = scan.blocks;
	let block_size = scan.block_size;

	// CDs get their catalogue numbers captured up front.
	if scan.media_type.is_cd() { capture_cd_metadata(dev, image, scan)?; }

	// Figure out the biggest read the drive will actually serve.
	share.title("Sizing up the drive…");
	let stride = probe_stride(dev, share.resume.next_block(), blocks, block_size)?;
	let skip = u64::from(opts.skip().max(stride));
	share.log.note(&format!("read stride {stride}, error skip {skip}"));

	// Catch the progress bar up with any prior attempt.
	share.progress.increment_n(u32::try_from(share.resume.next_block()).unwrap_or(u32::MAX));

	// The main pass.
	share.title("Main pass…");
	let mut new_trim = false;
	let mut lba = share.resume.next_block();
	while lba < blocks {
		if share.killed.killed() { break; }

		let batch = u64::from(stride).min(blocks - lba);
		match read_batch(dev, lba, batch, block_size) {
			Ok(data) => {
				image.write_sectors(lba, u32::try_from(batch).map_err(|_| DumpError::Overflow)?, &data)?;
				share.mark_good(lba, batch, data.len() as u64);
				share.save_resume()?;
				share.progress.increment_n(u32::try_from(batch).unwrap_or(u32::MAX));
				lba += batch;
			},
			Err(e) if e.is_transient() => {
				// Zero-fill and leap.
				let leap = skip.min(blocks - lba);
				share.log.err(lba, &e);
				write_zeroes(image, lba, leap, block_size)?;
				for bad in lba..lba + leap { share.resume.mark_bad(bad); }
				share.resume.advance_to(lba + leap);
				share.save_resume()?;
				share.progress.increment_n(u32::try_from(leap).unwrap_or(u32::MAX));
				lba += leap;
				new_trim = true;
			},
			Err(e) => return Err(e),
		}
	}

	// The trim pass rescues whatever the burst skip swallowed.
	if new_trim && opts.trim() && ! share.killed.killed() {
		share.title("Trimming the bad blocks…");
		share.log.note("trim pass");
		trim_pass(dev, image, share, block_size)?;
	}

	// And the retry passes grind on whatever is left.
	if opts.retry_passes() != 0 && ! share.killed.killed() &&
		! share.resume.bad_blocks().is_empty()
	{
		retry_passes(dev, image, share, opts, block_size)?;
	}

	Ok(())
}

/// # Probe the Read Stride.
///
/// Binary-halve from sixty-four until the drive accepts a READ (12), or
/// the count bottoms out at one. A failure at one isn't fatal here; the
/// main loop will record the sector as bad like any other.
fn probe_stride(dev: &mut dyn Device, lba: u64, blocks: u64, block_size: u32)
-> Result<u32, DumpError> {
	let mut stride = STRIDE_START;
	while 1 < stride {
		let batch = u64::from(stride).min(blocks - lba.min(blocks));
		if batch < u64::from(stride) { stride >>= 1; continue; }
		match read_batch(dev, lba, batch, block_size) {
			Ok(_) => return Ok(stride),
			Err(e) if e.is_transient() => { stride >>= 1; },
			Err(e) => return Err(e),
		}
	}
	Ok(1)
}

/// # Read a Batch.
///
/// ## Errors
///
/// CHECK CONDITION comes back as a transient read error carrying the sense
/// triple; hardware sense is upgraded to fatal.
fn read_batch(dev: &mut dyn Device, lba: u64, count: u64, block_size: u32)
-> Result<Vec<u8>, DumpError> {
	let lba32 = u32::try_from(lba).map_err(|_| DumpError::OutOfRange(lba, u64::from(u32::MAX)))?;
	let count32 = u32::try_from(count).map_err(|_| DumpError::Overflow)?;

	let reply = dev.read12(lba32, count32, block_size, false, false, READ_TIMEOUT)?;
	if let Some(sense) = reply.sense {
		if matches!(sense.class(), crate::SenseClass::Hardware) {
			return Err(DumpError::Hardware(sense.asc, sense.ascq));
		}
		return Err(reply.read_err(lba));
	}
	if reply.data.len() != count as usize * block_size as usize {
		return Err(DumpError::Read(lba, crate::SenseKey::NoSense, 0, 0));
	}
	Ok(reply.data)
}

/// # Zero-Fill a Span.
fn write_zeroes(image: &mut dyn ImageWriter, lba: u64, count: u64, block_size: u32)
-> Result<(), DumpError> {
	let data = vec![0_u8; count as usize * block_size as usize];
	image.write_sectors(lba, u32::try_from(count).map_err(|_| DumpError::Overflow)?, &data)
}

/// # Trim Pass.
///
/// Re-issue a single-sector read for every bad block; winners move from
/// the bad list to the good extents and overwrite their zero filler.
fn trim_pass(
	dev: &mut dyn Device,
	image: &mut dyn ImageWriter,
	share: &mut DumpShare<'_>,
	block_size: u32,
) -> Result<(), DumpError> {
	let bad = share.resume.bad_blocks().to_vec();
	for lba in bad {
		if share.killed.killed() { return Ok(()); }

		match read_batch(dev, lba, 1, block_size) {
			Ok(data) => {
				image.write_sector(lba, &data)?;
				share.mark_good(lba, 1, data.len() as u64);
				share.save_resume()?;
				share.log.rescued(lba);
			},
			Err(e) if e.is_transient() => (),
			Err(e) => return Err(e),
		}
	}
	Ok(())
}

/// # Retry Passes.
///
/// Alternating forward/reverse passes over the remaining bad blocks,
/// optionally with the drive's own retry behavior cranked up for the
/// duration.
fn retry_passes(
	dev: &mut dyn Device,
	image: &mut dyn ImageWriter,
	share: &mut DumpShare<'_>,
	opts: DumpOptions,
	block_size: u32,
) -> Result<(), DumpError> {
	// Crank the drive's error recovery, remembering what it was.
	let saved_page = if opts.persistent() { persistent_on(dev, share) } else { None };

	for pass in 0..opts.retry_passes() {
		if share.killed.killed() { break; }

		let mut bad = share.resume.bad_blocks().to_vec();
		if bad.is_empty() { break; }
		if pass & 1 == 1 { bad.reverse(); }

		share.title(&format!("Retry pass #{}…", pass + 1));
		share.log.bump_pass();

		for lba in bad {
			if share.killed.killed() { break; }
			match read_batch(dev, lba, 1, block_size) {
				Ok(data) => {
					image.write_sector(lba, &data)?;
					share.mark_good(lba, 1, data.len() as u64);
					share.save_resume()?;
					share.log.rescued(lba);
				},
				Err(e) if e.is_transient() => share.log.err(lba, &e),
				Err(e) => {
					// Put the drive back together before bailing.
					if let Some(ref page) = saved_page {
						let _res = dev.mode_select10(page, false, MODE_TIMEOUT);
					}
					return Err(e);
				},
			}
		}
	}

	// Restore the original recovery page.
	if let Some(ref page) = saved_page {
		let _res = dev.mode_select10(page, false, MODE_TIMEOUT);
	}

	Ok(())
}

/// # Enable Persistent Error Recovery.
///
/// Read-retry count to 255 and EER on, via the read-write error recovery
/// page. Returns the original page bytes for later restoration, or `None`
/// if the drive wouldn't play along (which is merely logged).
fn persistent_on(dev: &mut dyn Device, share: &mut DumpShare<'_>) -> Option<Vec<u8>> {
	let reply = dev.mode_sense10(0x01, 0, ModePageControl::Current, MODE_TIMEOUT).ok()?;
	if ! reply.ok() || reply.data.len() < 12 {
		share.log.note("drive refused the error recovery page; retries stay plain");
		return None;
	}

	let original = reply.data;
	let mut cranked = original.clone();
	cranked[10] |= 0x08; // EER.
	cranked[11] = 0xFF;  // Read retry count.

	match dev.mode_select10(&cranked, false, MODE_TIMEOUT) {
		Ok(r) if r.ok() => {
			share.log.note("persistent error recovery enabled");
			Some(original)
		},
		_ => {
			share.log.note("drive refused persistent error recovery");
			None
		},
	}
}

/// # Capture MCN/ISRCs.
///
/// Best-effort: absent or invalid responses simply leave the metadata
/// blank.
fn capture_cd_metadata(
	dev: &mut dyn Device,
	image: &mut dyn ImageWriter,
	scan: &MediaScan,
) -> Result<(), DumpError> {
	let mut meta = ImageMetadata::default();

	let reply = dev.read_mcn(MODE_TIMEOUT)?;
	if reply.ok() && 22 <= reply.data.len() && reply.data[8] & 0x80 != 0 {
		let raw = String::from_utf8_lossy(&reply.data[9..22]);
		let raw = raw.trim_matches(|c| c == '\0' || c == ' ');
		if ! raw.is_empty() { meta.mcn = Some(raw.to_owned()); }
	}

	// Track numbers come from the full TOC captured during identification.
	if let Some(toc) = scan.tag(MediaTagKind::CdFullToc) {
		for entry in toc.get(4..).unwrap_or(&[]).chunks_exact(11) {
			let point = entry[3];
			if ! (1..=99).contains(&point) { continue; }

			let reply = dev.read_isrc(point, MODE_TIMEOUT)?;
			if reply.ok() && 21 <= reply.data.len() && reply.data[8] & 0x80 != 0 {
				let raw = String::from_utf8_lossy(&reply.data[9..21]);
				let raw = raw.trim_matches(|c| c == '\0' || c == ' ');
				if ! raw.is_empty() {
					meta.isrcs.push((u16::from(point), raw.to_owned()));
				}
			}
		}
	}

	if meta.mcn.is_some() || ! meta.isrcs.is_empty() {
		image.set_metadata(&meta)?;
	}
	Ok(())
}
