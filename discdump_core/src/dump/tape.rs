/*!
# Disc Dump: Tape Pipeline

Sequential media can't be strided through; the pipeline rewinds, discovers
the real block size the hard way, and walks forward one block at a time,
folding filemarks into file records and end-of-medium into partition
records. Resume and retry both hinge on LOCATE support.
*/

use crate::{
	Device,
	DumpError,
	ImageWriter,
	MediaScan,
	Sense,
	SenseKey,
	SpaceKind,
	TapeFile,
	TapePartition,
};
use std::time::Duration;
use super::{
	DumpOptions,
	DumpShare,
};



/// # Command Timeout.
const CMD_TIMEOUT: Duration = Duration::from_secs(10);

/// # Per-Read Timeout.
///
/// Tapes shoe-shine; patience is mandatory.
const READ_TIMEOUT: Duration = Duration::from_secs(120);

/// # Repositioning Poll Pause.
const POLL_PAUSE: Duration = Duration::from_secs(1);

/// # Repositioning Poll Budget.
const POLL_MAX: u32 = 600;

/// # Partition Probe Ceiling.
const PARTITION_MAX: u8 = 4;



#[derive(Debug)]
/// # Classified Read Outcome.
///
/// What one READ (6) actually meant, per the SSC sense tables. Media-end
/// and filemarks are ordinary outcomes here, not errors.
enum TapeRead {
	/// # A Block of Data.
	Data(Vec<u8>),

	/// # Filemark.
	Filemark,

	/// # End of Medium/Data (No-Sense/Recovered Flavor).
	///
	/// An ordinary stop, even on the very first block; an empty tape is
	/// a successful nothing.
	EndOfMedium,

	/// # Blank Region (Blank-Check Flavor).
	///
	/// Fatal on block zero, an ordinary end-of-data anywhere else.
	Blank,

	/// # Wrong-Length Read.
	BadLength(i32),

	/// # The Drive Refused the Shape of the Read.
	Rejected,

	/// # A Plain Read Error.
	Failed(DumpError),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Pipeline State.
///
/// The old goto spaghetti, spelled out: the first read doubles as
/// block-size discovery, then the loop proper, then cleanup.
enum State {
	/// # First Read / Discovery.
	FirstRead,

	/// # Steady-State Loop.
	ReadLoop,

	/// # Wrap It Up.
	Done,
}



/// # Run the Tape Pipeline.
///
/// ## Errors
///
/// Positioning failures during setup are fatal; in-flight read errors are
/// absorbed as bad blocks.
pub(super) fn run(
	dev: &mut dyn Device,
	image: &mut dyn ImageWriter,
	share: &mut DumpShare<'_>,
	scan: &MediaScan,
	opts: DumpOptions,
) -> Result<(), DumpError> {
	// The image has to speak tape at all.
	if image.tape().is_none() {
		return Err(DumpError::NotImplemented("tape image writes"));
	}

	// Initial health check: anything beyond "ready-ish" is fatal.
	share.title("Checking the drive…");
	if let Some(s) = sense_of(dev)? {
		if s.asc != 0x00 || ! matches!(s.ascq, 0x00 | 0x04) {
			return Err(DumpError::MediumNotReady(s.asc, s.ascq));
		}
	}

	// Rewind, and wait out the repositioning.
	share.title("Rewinding…");
	let reply = dev.rewind(CMD_TIMEOUT)?;
	if ! reply.ok() {
		let (asc, ascq) = reply.sense.map_or((0, 0), |s| (s.asc, s.ascq));
		return Err(DumpError::MediumNotReady(asc, ascq));
	}
	wait_repositioned(dev)?;

	// We must be at partition zero, block zero.
	let (partition, _) = read_position(dev, false)?;
	if partition != 0 {
		locate_and_wait(dev, 0, 0)?;
		let (partition, block) = read_position(dev, false)?;
		if partition != 0 || block != 0 {
			return Err(DumpError::TapePosition(0, block));
		}
	}

	// Probe the locate capabilities, then get back to the start. A plain
	// rewind works whether or not the probe went anywhere.
	let (can_locate, can_locate_long) = probe_locate(dev)?;
	share.log.note(&format!(
		"locate support: short {can_locate}, long {can_locate_long}",
	));
	let reply = dev.rewind(CMD_TIMEOUT)?;
	if ! reply.ok() {
		let (asc, ascq) = reply.sense.map_or((0, 0), |s| (s.asc, s.ascq));
		return Err(DumpError::MediumNotReady(asc, ascq));
	}
	wait_repositioned(dev)?;

	// Resume, if there is anywhere to resume to.
	let mut block = 0_u64;
	let next = share.resume.next_block();
	if 0 < next {
		if can_locate_long {
			dev.locate_long(next, 0, CMD_TIMEOUT)?;
			wait_repositioned(dev)?;
			let (_, got) = read_position(dev, true)?;
			if got != next { return Err(DumpError::TapePosition(next, got)); }
			block = next;
		}
		else if can_locate && u32::try_from(next).is_ok() {
			locate_and_wait(dev, u32::try_from(next).unwrap_or(0), 0)?;
			let (_, got) = read_position(dev, false)?;
			if got != next { return Err(DumpError::TapePosition(next, got)); }
			block = next;
		}
		else if ! opts.force() {
			// No way back to where we were; the caller has to bless a
			// restart explicitly.
			return Err(DumpError::TapePosition(next, 0));
		}
	}

	// Block size: seeded from the scan, corrected by the drive.
	let mut block_size = if scan.block_size == 0 { 1 } else { scan.block_size };
	let mut fixed = false;

	// File/partition bookkeeping.
	let mut parts: Vec<TapePartition> = Vec::new();
	let mut partition = 0_u8;
	let mut partition_first = block;
	let mut file_number = 0_u64;
	let mut file_first = block;

	share.title("Reading the tape…");
	let mut state = if block == 0 { State::FirstRead } else { State::ReadLoop };
	while state != State::Done {
		if share.killed.killed() { break; }

		match state {
			State::FirstRead => match tape_read(dev, fixed, block_size)? {
				TapeRead::Data(data) => {
					image.write_sector(block, &data)?;
					share.mark_good(block, 1, data.len() as u64);
					share.save_resume()?;
					share.progress.increment();
					block += 1;
					state = State::ReadLoop;
				},
				// The drive wants fixed-length reads.
				TapeRead::Rejected => {
					let _res = dev.space(SpaceKind::Blocks, -1, CMD_TIMEOUT);
					fixed = true;
				},
				// The drive just told us the real block size.
				TapeRead::BadLength(residue) => {
					block_size = corrected_size(block_size, residue)?;
					share.log.note(&format!("block size corrected to {block_size}"));
					let _res = dev.space(SpaceKind::Blocks, -1, CMD_TIMEOUT);
				},
				TapeRead::Blank => return Err(DumpError::BlankMedium),
				// End-of-medium before any data, reported the polite way:
				// an empty tape, not an error.
				TapeRead::EndOfMedium => { state = State::Done; },
				TapeRead::Filemark => {
					// A tape that opens on a filemark has an empty first
					// file; record it and move along.
					file_number += 1;
					state = State::ReadLoop;
				},
				TapeRead::Failed(e) => return Err(e),
			},
			State::ReadLoop => match tape_read(dev, fixed, block_size)? {
				TapeRead::Data(data) => {
					image.write_sector(block, &data)?;
					share.mark_good(block, 1, data.len() as u64);
					share.save_resume()?;
					share.progress.increment();
					block += 1;
				},
				TapeRead::Filemark => {
					if file_first < block {
						add_file(image, TapeFile {
							file: file_number,
							partition,
							first_block: file_first,
							last_block: block - 1,
						})?;
					}
					file_number += 1;
					file_first = block;
				},
				// A blank check with nothing read at all means a blank
				// tape, whatever came before the first real read.
				TapeRead::Blank if block == 0 => return Err(DumpError::BlankMedium),
				TapeRead::EndOfMedium | TapeRead::Blank => {
					// Close out the file and partition...
					if file_first < block {
						add_file(image, TapeFile {
							file: file_number,
							partition,
							first_block: file_first,
							last_block: block - 1,
						})?;
						file_number += 1;
					}
					if partition_first < block {
						parts.push(TapePartition {
							number: partition,
							first_block: partition_first,
							last_block: block - 1,
						});
					}

					// ...and hop to the next partition, if the drive will
					// take us there.
					if can_locate && partition + 1 < PARTITION_MAX &&
						try_next_partition(dev, partition + 1)?
					{
						partition += 1;
						partition_first = block;
						file_first = block;
						share.log.note(&format!("entering partition {partition}"));
					}
					else { state = State::Done; }
				},
				TapeRead::BadLength(residue) => {
					block_size = corrected_size(block_size, residue)?;
					share.log.note(&format!("block size corrected to {block_size}"));
					let _res = dev.space(SpaceKind::Blocks, -1, CMD_TIMEOUT);
				},
				// Anything else: one bad block, zero-filled.
				TapeRead::Rejected => {
					bad_block(dev, image, share, block, block_size)?;
					block += 1;
				},
				TapeRead::Failed(e) => {
					share.log.err(block, &e);
					bad_block(dev, image, share, block, block_size)?;
					block += 1;
				},
			},
			State::Done => (),
		}
	}

	// An abort mid-loop still closes the open records.
	if state != State::Done {
		if file_first < block {
			add_file(image, TapeFile {
				file: file_number,
				partition,
				first_block: file_first,
				last_block: block - 1,
			})?;
		}
		if partition_first < block {
			parts.push(TapePartition {
				number: partition,
				first_block: partition_first,
				last_block: block - 1,
			});
		}
	}

	for p in &parts {
		if let Some(t) = image.tape() { t.add_partition(*p)?; }
	}
	if let Some(t) = image.tape() { t.set_tape(); }

	// Retries only work if the drive can seek; otherwise they're silently
	// skipped.
	if opts.retry_passes() != 0 && ! share.killed.killed() &&
		! share.resume.bad_blocks().is_empty()
	{
		if can_locate || can_locate_long {
			retry_passes(dev, image, share, opts, block_size, can_locate_long, &parts)?;
		}
		else { share.log.note("retries skipped: no locate support"); }
	}

	Ok(())
}

/// # One Classified Read.
///
/// ## Errors
///
/// Only transport failures; everything the drive *says* comes back as a
/// [`TapeRead`].
fn tape_read(dev: &mut dyn Device, fixed: bool, block_size: u32)
-> Result<TapeRead, DumpError> {
	let length = if fixed { 1 } else { block_size };
	let reply = dev.read6(fixed, length, block_size, READ_TIMEOUT)?;

	let Some(s) = reply.sense else { return Ok(TapeRead::Data(reply.data)) };

	Ok(match s.key {
		// Blank checks keep their origin; the caller treats them as fatal
		// on block zero and as end-of-data everywhere else.
		SenseKey::BlankCheck => TapeRead::Blank,
		SenseKey::NoSense | SenseKey::Recovered =>
			if matches!(s.ascq, 0x02 | 0x05) || s.eom { TapeRead::EndOfMedium }
			else if s.ascq == 0x01 || s.filemark { TapeRead::Filemark }
			else if let Some(residue) = s.ili_residue() { TapeRead::BadLength(residue) }
			else if s.key == SenseKey::Recovered { TapeRead::Data(reply.data) }
			else { TapeRead::Failed(DumpError::Read(0, s.key, s.asc, s.ascq)) },
		SenseKey::IllegalRequest =>
			if let Some(residue) = s.ili_residue() { TapeRead::BadLength(residue) }
			else { TapeRead::Rejected },
		SenseKey::HardwareError =>
			TapeRead::Failed(DumpError::Hardware(s.asc, s.ascq)),
		_ => TapeRead::Failed(DumpError::Read(0, s.key, s.asc, s.ascq)),
	})
}

/// # Apply an ILI Residue.
///
/// The true block length is `requested − residue`; anything non-positive
/// means the drive and we have irreconcilable ideas.
fn corrected_size(block_size: u32, residue: i32) -> Result<u32, DumpError> {
	let new = i64::from(block_size) - i64::from(residue);
	if 0 < new && new <= i64::from(u32::MAX >> 8) {
		Ok(u32::try_from(new).unwrap_or(block_size))
	}
	else {
		Err(DumpError::Format(format!("impossible tape block size ({new})")))
	}
}

/// # Record and Step Over a Bad Block.
///
/// The failed read is assumed not to have advanced the head, so a SPACE
/// pushes past it.
fn bad_block(
	dev: &mut dyn Device,
	image: &mut dyn ImageWriter,
	share: &mut DumpShare<'_>,
	block: u64,
	block_size: u32,
) -> Result<(), DumpError> {
	let data = vec![0_u8; block_size as usize];
	image.write_sector(block, &data)?;
	share.resume.mark_bad(block);
	share.resume.advance_to(block + 1);
	share.save_resume()?;
	share.progress.increment();
	let _res = dev.space(SpaceKind::Blocks, 1, CMD_TIMEOUT);
	Ok(())
}

/// # Current Sense, If Any.
fn sense_of(dev: &mut dyn Device) -> Result<Option<Sense>, DumpError> {
	let reply = dev.request_sense(CMD_TIMEOUT)?;
	Ok(Sense::parse(&reply.data))
}

/// # Wait Out Repositioning.
///
/// The drive reports `00h/1Ah` (or `19h`) while the servo settles; poll
/// until it stops, within reason.
fn wait_repositioned(dev: &mut dyn Device) -> Result<(), DumpError> {
	for _ in 0..POLL_MAX {
		match sense_of(dev)? {
			Some(s) if s.asc == 0x00 && matches!(s.ascq, 0x19 | 0x1A) => {
				std::thread::sleep(POLL_PAUSE);
			},
			_ => return Ok(()),
		}
	}
	Err(DumpError::DeviceTimeout("REWIND/LOCATE"))
}

/// # Locate and Settle.
fn locate_and_wait(dev: &mut dyn Device, block: u32, partition: u8)
-> Result<(), DumpError> {
	let reply = dev.locate(block, partition, CMD_TIMEOUT)?;
	if ! reply.ok() {
		return Err(DumpError::TapePosition(u64::from(block), 0));
	}
	wait_repositioned(dev)
}

/// # Decode READ POSITION.
///
/// Returns `(partition, block)`. Short form packs the partition into byte
/// one and the block into bytes four through seven; long form spreads out.
fn read_position(dev: &mut dyn Device, long: bool) -> Result<(u32, u64), DumpError> {
	let reply = dev.read_position(long, CMD_TIMEOUT)?;
	if ! reply.ok() {
		return Err(DumpError::TapePosition(0, 0));
	}

	let data = &reply.data;
	if long {
		if data.len() < 16 { return Err(DumpError::TapePosition(0, 0)); }
		Ok((
			u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
			u64::from_be_bytes([
				data[8], data[9], data[10], data[11],
				data[12], data[13], data[14], data[15],
			]),
		))
	}
	else {
		if data.len() < 8 { return Err(DumpError::TapePosition(0, 0)); }
		Ok((
			u32::from(data[1]),
			u64::from(u32::from_be_bytes([data[4], data[5], data[6], data[7]])),
		))
	}
}

/// # Probe Locate Support.
///
/// Try to land on block one both ways and see whether the drive agrees
/// about where it ended up.
fn probe_locate(dev: &mut dyn Device) -> Result<(bool, bool), DumpError> {
	let mut can_long = false;
	let reply = dev.locate_long(1, 0, CMD_TIMEOUT)?;
	if reply.ok() {
		wait_repositioned(dev)?;
		if let Ok((_, got)) = read_position(dev, true) {
			can_long = got == 1;
		}
	}

	let mut can_short = false;
	let reply = dev.locate(1, 0, CMD_TIMEOUT)?;
	if reply.ok() {
		wait_repositioned(dev)?;
		if let Ok((_, got)) = read_position(dev, false) {
			can_short = got == 1;
		}
	}

	Ok((can_short, can_long))
}

/// # Try the Next Partition.
///
/// Returns `true` if the drive actually switched.
fn try_next_partition(dev: &mut dyn Device, partition: u8) -> Result<bool, DumpError> {
	let reply = dev.locate(0, partition, CMD_TIMEOUT)?;
	if ! reply.ok() { return Ok(false); }
	wait_repositioned(dev)?;
	let (got, _) = read_position(dev, false)?;
	Ok(got == u32::from(partition))
}

/// # Record a Tape File.
fn add_file(image: &mut dyn ImageWriter, file: TapeFile) -> Result<(), DumpError> {
	image.tape()
		.ok_or(DumpError::NotImplemented("tape image writes"))?
		.add_file(file)
}

/// # Retry Passes (Locate-Based).
///
/// Seek to each bad block, take another swing, rescue what succeeds.
fn retry_passes(
	dev: &mut dyn Device,
	image: &mut dyn ImageWriter,
	share: &mut DumpShare<'_>,
	opts: DumpOptions,
	block_size: u32,
	long: bool,
	parts: &[TapePartition],
) -> Result<(), DumpError> {
	for pass in 0..opts.retry_passes() {
		if share.killed.killed() { break; }

		let mut bad = share.resume.bad_blocks().to_vec();
		if bad.is_empty() { break; }
		if pass & 1 == 1 { bad.reverse(); }

		share.title(&format!("Retry pass #{}…", pass + 1));
		share.log.bump_pass();

		for block in bad {
			if share.killed.killed() { break; }

			// Map the absolute block back into its partition.
			let Some(part) = parts.iter().find(|p| p.first_block <= block && block <= p.last_block)
			else { continue; };
			let device_block = block - part.first_block;

			if long {
				let reply = dev.locate_long(device_block, part.number, CMD_TIMEOUT)?;
				if ! reply.ok() { continue; }
			}
			else {
				let Ok(device_block) = u32::try_from(device_block) else { continue; };
				let reply = dev.locate(device_block, part.number, CMD_TIMEOUT)?;
				if ! reply.ok() { continue; }
			}
			wait_repositioned(dev)?;

			if let TapeRead::Data(data) = tape_read(dev, false, block_size)? {
				image.write_sector(block, &data)?;
				share.mark_good(block, 1, data.len() as u64);
				share.save_resume()?;
				share.log.rescued(block);
			}
		}
	}
	Ok(())
}
