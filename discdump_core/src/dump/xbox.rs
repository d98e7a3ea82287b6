/*!
# Disc Dump: Xbox Pipeline

Xbox Game Discs hide most of themselves behind Kreon firmware unlocks.
Geometry comes from three READ CAPACITY calls under three lock states, the
security sector marks the deliberately-unreadable ranges, and the video
partition is read locked, the game partition unlocked.
*/

use crate::{
	Device,
	DumpError,
	Extents,
	ImageWriter,
	MediaScan,
	MediaTagKind,
	StructureFormat,
	StructureMedia,
	media::pfi::Pfi,
};
use dactyl::traits::SaturatingFrom;
use std::time::Duration;
use super::{
	DumpOptions,
	DumpShare,
};



/// # Command Timeout (Unlocks, Capacities).
const CMD_TIMEOUT: Duration = Duration::from_secs(10);

/// # Per-Read Timeout.
const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// # Read Stride (Sectors).
const STRIDE: u64 = 32;

/// # Sector Size.
const BLOCK_SIZE: u32 = 2048;

/// # PSN Bias.
///
/// DVD physical sector numbers start `0x30000` before logical zero.
const PSN_BIAS: u64 = 0x30000;

/// # Security Sector Extent Table Offset.
const SS_EXTENTS_AT: usize = 0x200;

/// # Security Sector Extent Capacity.
const SS_EXTENTS_MAX: usize = 16;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Disc Geometry.
///
/// Everything derived from the three-state unlock dance.
pub struct XgdGeometry {
	/// # Video Layer 0 Size.
	pub l0_video: u64,

	/// # Video Layer 1 Size.
	pub l1_video: u64,

	/// # Middle Zone Size (Per Layer).
	pub middle_zone: u64,

	/// # Game Partition Size.
	pub game_size: u64,

	/// # Total Image Size.
	pub total_size: u64,

	/// # Layer Break.
	pub layer_break: u64,

	/// # Layer Zero End PSN.
	///
	/// The literal physical-format field from the wxripper-state PFI; the
	/// security-sector PSN fold pivots on this, not on the layer break.
	pub layer0_end: u64,
}

impl XgdGeometry {
	#[must_use]
	/// # Game Partition Start (Image LBA).
	pub const fn game_start(&self) -> u64 { self.l0_video + self.middle_zone }

	#[must_use]
	/// # Second Middle Zone Start (Image LBA).
	pub const fn mz2_start(&self) -> u64 { self.game_start() + self.game_size }

	#[must_use]
	/// # Video Layer 1 Start (Image LBA).
	pub const fn l1_start(&self) -> u64 { self.mz2_start() + self.middle_zone }
}



/// # Run the Xbox Pipeline.
///
/// ## Errors
///
/// Unlock failures and hardware errors are fatal; plain read errors fall
/// into the bad-block list as usual.
pub(super) fn run(
	dev: &mut dyn Device,
	image: &mut dyn ImageWriter,
	share: &mut DumpShare<'_>,
	_scan: &MediaScan,
	opts: DumpOptions,
) -> Result<(), DumpError> {
	share.title("Unlocking the drive…");
	let geo = discover_geometry(dev)?;
	share.log.note(&format!(
		"geometry: l0 {} / l1 {} / mz {} / game {} / total {} / break {}",
		geo.l0_video, geo.l1_video, geo.middle_zone, geo.game_size,
		geo.total_size, geo.layer_break,
	));

	// The ledger from identification was sized to a locked capacity; the
	// real total only exists now.
	if share.resume.total_blocks() != geo.total_size {
		share.reload_resume(geo.total_size)?;
	}
	let _res = share.progress.reset(u32::saturating_from(geo.total_size));
	let done = share.resume.covered();

	// Security sector: tagged, and mined for its unreadable ranges.
	let reply = dev.kreon_security_sector(CMD_TIMEOUT)?;
	if ! reply.ok() || reply.data.is_empty() {
		return Err(DumpError::Unlock("security sector extraction"));
	}
	let holes = ss_extents(&reply.data, &geo);
	image.write_media_tag(MediaTagKind::XboxSecuritySector, &reply.data)?;

	// Phase one: the game partition, drive still in the wxripper state
	// from geometry discovery.
	share.title("Game partition…");
	dump_span(
		dev, image, share, &done, &holes, opts,
		geo.game_start(), geo.game_size, 0,
	)?;

	// Phase two: both middle zones are unreadable by definition.
	share.title("Middle zones…");
	zero_span(image, share, &done, geo.l0_video, geo.middle_zone)?;
	zero_span(image, share, &done, geo.mz2_start(), geo.middle_zone)?;

	// Phase three: the video layers, locked again.
	if share.killed.killed() { return Ok(()); }
	let reply = dev.kreon_unlock_video(CMD_TIMEOUT)?;
	if ! reply.ok() { return Err(DumpError::Unlock("video relock")); }

	share.title("Video layer 0…");
	dump_span(dev, image, share, &done, &Extents::new(), opts, 0, geo.l0_video, 0)?;

	// Layer one reads continue the device's video addressing but land at
	// the image tail, as if the layers were continuous.
	share.title("Video layer 1…");
	let delta = geo.l1_start() - geo.l0_video;
	dump_span(
		dev, image, share, &done, &Extents::new(), opts,
		geo.l1_start(), geo.l1_video, delta,
	)?;

	Ok(())
}

/// # Discover the Geometry.
///
/// Three capacities under three lock states, with the physical-format
/// bounds glueing them together.
fn discover_geometry(dev: &mut dyn Device) -> Result<XgdGeometry, DumpError> {
	// Locked: the video partition.
	let reply = dev.kreon_unlock_video(CMD_TIMEOUT)?;
	if ! reply.ok() { return Err(DumpError::Unlock("video lock")); }
	let video_total = capacity(dev)?;
	let pfi = read_pfi(dev)?;
	let l0_video = u64::from(pfi.layer0_end) - u64::from(pfi.data_area_start) + 1;
	let l1_video = video_total - l0_video + 1;

	// Xtreme: the game partition.
	let reply = dev.kreon_unlock_xtreme(CMD_TIMEOUT)?;
	if ! reply.ok() { return Err(DumpError::Unlock("xtreme unlock")); }
	let game_size = capacity(dev)?;

	// Wxripper: the whole disc.
	let reply = dev.kreon_unlock_wxripper(CMD_TIMEOUT)?;
	if ! reply.ok() { return Err(DumpError::Unlock("wxripper unlock")); }
	let disc_total = capacity(dev)?;
	let pfi = read_pfi(dev)?;
	let middle_zone = disc_total
		- (u64::from(pfi.layer0_end) - u64::from(pfi.data_area_start) + 1)
		- game_size + 1;

	let total_size = l0_video + l1_video + 2 * middle_zone + game_size;
	let layer_break = l0_video + middle_zone + game_size / 2;
	if total_size <= layer_break {
		return Err(DumpError::Format("layer break past the end of the disc".to_owned()));
	}

	Ok(XgdGeometry {
		l0_video,
		l1_video,
		middle_zone,
		game_size,
		total_size,
		layer_break,
		layer0_end: u64::from(pfi.layer0_end),
	})
}

/// # Read Capacity As a Block Count.
fn capacity(dev: &mut dyn Device) -> Result<u64, DumpError> {
	let reply = dev.read_capacity10(CMD_TIMEOUT)?;
	if reply.ok() {
		if let Some((last, _)) = crate::device::decode_capacity10(&reply.data) {
			return Ok(u64::from(last) + 1);
		}
	}
	Err(DumpError::Unlock("capacity readback"))
}

/// # Read and Decode the PFI.
fn read_pfi(dev: &mut dyn Device) -> Result<Pfi, DumpError> {
	let reply = dev.read_disc_structure(
		StructureMedia::Dvd,
		StructureFormat::Physical,
		0,
		0,
		CMD_TIMEOUT,
	)?;
	if reply.ok() {
		if let Some(pfi) = Pfi::parse(&reply.data) { return Ok(pfi); }
	}
	Err(DumpError::Unlock("physical format readback"))
}

/// # Security-Sector Extents, As Image LBAs.
///
/// Up to sixteen `(start_psn, end_psn)` pairs; zeroed pairs are unused.
/// Layer-one PSNs count backwards in ones-complement, hence the fold.
fn ss_extents(ss: &[u8], geo: &XgdGeometry) -> Extents {
	let mut out = Extents::new();
	let Some(table) = ss.get(SS_EXTENTS_AT..SS_EXTENTS_AT + SS_EXTENTS_MAX * 8) else {
		return out;
	};

	for entry in table.chunks_exact(8) {
		let start = u64::from(u32::from_be_bytes([entry[0], entry[1], entry[2], entry[3]]));
		let end = u64::from(u32::from_be_bytes([entry[4], entry[5], entry[6], entry[7]]));
		if start == 0 && end == 0 { continue; }

		let (Some(start), Some(end)) = (psn_to_lba(start, geo), psn_to_lba(end, geo)) else {
			continue;
		};
		if start <= end { out.add_span(start, end - start + 1); }
	}
	out
}

/// # PSN to Image LBA.
///
/// Layer zero is a straight bias subtraction; layer one mirrors through
/// the ones-complement of the PSN, folding around the physical layer
/// boundary the PFI reported.
fn psn_to_lba(psn: u64, geo: &XgdGeometry) -> Option<u64> {
	if psn <= geo.layer0_end { psn.checked_sub(PSN_BIAS) }
	else {
		((geo.layer0_end + 1) * 2)
			.checked_sub((psn ^ 0x00FF_FFFF) + 1)?
			.checked_sub(PSN_BIAS)
	}
}

/// # Dump a Span.
///
/// Read `[start, start + len)` of image LBAs, fetching device LBA
/// `image_lba − device_delta`, honoring resume coverage and treating the
/// security holes as good-but-zero.
#[expect(clippy::too_many_arguments, reason = "The span takes what it takes.")]
fn dump_span(
	dev: &mut dyn Device,
	image: &mut dyn ImageWriter,
	share: &mut DumpShare<'_>,
	done: &Extents,
	holes: &Extents,
	opts: DumpOptions,
	start: u64,
	len: u64,
	device_delta: u64,
) -> Result<(), DumpError> {
	let end = start + len;
	let skip = u64::from(opts.skip()).max(STRIDE);

	let mut lba = start;
	while lba < end {
		if share.killed.killed() { return Ok(()); }

		let mut batch = STRIDE.min(end - lba);
		if done.contains_span(lba, batch) {
			share.progress.increment_n(u32::try_from(batch).unwrap_or(u32::MAX));
			lba += batch;
			continue;
		}

		// Batches straddling a hole boundary shrink to one sector so the
		// hole handling stays all-or-nothing.
		if ! holes.contains_span(lba, batch) &&
			(lba..lba + batch).any(|b| holes.contains(b))
		{
			batch = 1;
		}

		// Security holes are unreadable by design: zero-fill without
		// asking the drive, but count them good.
		if holes.contains_span(lba, batch) {
			let data = vec![0_u8; batch as usize * BLOCK_SIZE as usize];
			image.write_sectors(lba, u32::try_from(batch).map_err(|_| DumpError::Overflow)?, &data)?;
			share.mark_good(lba, batch, data.len() as u64);
			share.save_resume()?;
			share.progress.increment_n(u32::try_from(batch).unwrap_or(u32::MAX));
			lba += batch;
			continue;
		}

		let device_lba = lba - device_delta;
		match read_batch(dev, device_lba, batch) {
			Ok(data) => {
				image.write_sectors(lba, u32::try_from(batch).map_err(|_| DumpError::Overflow)?, &data)?;
				share.mark_good(lba, batch, data.len() as u64);
				share.save_resume()?;
				share.progress.increment_n(u32::try_from(batch).unwrap_or(u32::MAX));
				lba += batch;
			},
			Err(e) if e.is_transient() => {
				let leap = skip.min(end - lba);
				share.log.err(lba, &e);
				let data = vec![0_u8; leap as usize * BLOCK_SIZE as usize];
				image.write_sectors(lba, u32::try_from(leap).map_err(|_| DumpError::Overflow)?, &data)?;
				for bad in lba..lba + leap { share.resume.mark_bad(bad); }
				share.resume.advance_to(lba + leap);
				share.save_resume()?;
				share.progress.increment_n(u32::try_from(leap).unwrap_or(u32::MAX));
				lba += leap;
			},
			Err(e) => return Err(e),
		}
	}

	Ok(())
}

/// # Zero-Fill a Span, Marking It Good.
fn zero_span(
	image: &mut dyn ImageWriter,
	share: &mut DumpShare<'_>,
	done: &Extents,
	start: u64,
	len: u64,
) -> Result<(), DumpError> {
	let end = start + len;
	let mut lba = start;
	while lba < end {
		if share.killed.killed() { return Ok(()); }

		let batch = STRIDE.min(end - lba);
		if ! done.contains_span(lba, batch) {
			let data = vec![0_u8; batch as usize * BLOCK_SIZE as usize];
			image.write_sectors(lba, u32::try_from(batch).map_err(|_| DumpError::Overflow)?, &data)?;
			share.mark_good(lba, batch, 0);
			share.save_resume()?;
		}
		share.progress.increment_n(u32::try_from(batch).unwrap_or(u32::MAX));
		lba += batch;
	}
	Ok(())
}

/// # Read a Batch (READ 12, 2048-Byte Sectors).
fn read_batch(dev: &mut dyn Device, lba: u64, count: u64) -> Result<Vec<u8>, DumpError> {
	let lba32 = u32::try_from(lba).map_err(|_| DumpError::OutOfRange(lba, u64::from(u32::MAX)))?;
	let count32 = u32::try_from(count).map_err(|_| DumpError::Overflow)?;

	let reply = dev.read12(lba32, count32, BLOCK_SIZE, false, false, READ_TIMEOUT)?;
	if let Some(sense) = reply.sense {
		if matches!(sense.class(), crate::SenseClass::Hardware) {
			return Err(DumpError::Hardware(sense.asc, sense.ascq));
		}
		return Err(reply.read_err(lba));
	}
	if reply.data.len() != count as usize * BLOCK_SIZE as usize {
		return Err(DumpError::Read(lba, crate::SenseKey::NoSense, 0, 0));
	}
	Ok(reply.data)
}



#[cfg(test)]
mod test {
	use crate::{
		DeviceKind,
		DumpOptions,
		DumpStatus,
		Dumper,
		KillSwitch,
		MediaType,
		ResumeStore,
		TagMap,
	};
	use crate::testdev::{
		Kreon,
		MemImage,
		MockDevice,
		pattern,
	};
	use fyi_msg::Progless;
	use super::*;

	/// # Tiny-Disc PFI.
	///
	/// Data area starts at PSN `30000h`; layer zero holds ten blocks.
	fn tiny_pfi() -> Vec<u8> {
		let mut out = vec![0x08, 0x02, 0, 0];
		out.extend_from_slice(&[
			0x01, 0x00, 0x20, 0x00,
			0x00, 0x03, 0x00, 0x00, // Data area start.
			0x00, 0x00, 0x00, 0x00,
			0x00, 0x03, 0x00, 0x09, // Layer zero end: start + 9.
		]);
		out
	}

	#[test]
	fn t_xbox_run() {
		// Video 15 blocks over two layers (l0 = 10, l1 = 6), game 20,
		// middle zones 4 each: 44 total, break at 24. The PFI's layer
		// boundary is PSN 30009h, so the game span lives in layer-one
		// complement space.
		let mut ss = vec![0_u8; 0x300];
		// One hole: image LBAs 16-17, as complement PSNs.
		ss[SS_EXTENTS_AT..SS_EXTENTS_AT + 4].copy_from_slice(&0x00FC_FFFC_u32.to_be_bytes());
		ss[SS_EXTENTS_AT + 4..SS_EXTENTS_AT + 8].copy_from_slice(&0x00FC_FFFD_u32.to_be_bytes());

		let mut dev = MockDevice::new(DeviceKind::MultiMedia);
		dev.blocks = 40;
		dev.block_size = 2048;
		dev.kreon = Some(Kreon {
			video: (15, tiny_pfi()),
			xtreme_total: 20,
			wx: (33, tiny_pfi()),
			ss,
		});

		let scan = crate::MediaScan {
			media_type: MediaType::Xgd2,
			recognized: true,
			blocks: 15,
			block_size: 2048,
			tags: TagMap::default(),
		};

		let dir = tempfile::tempdir().unwrap();
		let store = ResumeStore::for_image(&dir.path().join("xgd.img")).unwrap();
		let mut image = MemImage::default();
		let progress = Progless::default();
		let killed = KillSwitch::new();

		let outcome = Dumper::new(&mut dev, &mut image, &scan, store.clone(), DumpOptions::default())
			.unwrap()
			.dump(&progress, &killed)
			.unwrap();

		assert_eq!(outcome.status, DumpStatus::Success);
		assert_eq!(outcome.blocks, 44);
		assert_eq!(outcome.good_blocks, 44);
		assert_eq!(outcome.bad_blocks, 0);

		// The security sector rode along as a tag.
		assert!(image.tags.iter().any(|(k, _)| *k == crate::MediaTagKind::XboxSecuritySector));

		// Layout: video L0, middle zone, game (holes zeroed), middle
		// zone, video L1 reading the device's upper layer.
		let zero = |lba: u64| image.sectors.get(&lba).unwrap().iter().all(|&b| b == 0);
		let is = |lba: u64, dev_lba: u64, state: u8|
			image.sectors.get(&lba).unwrap().iter().all(|&b| b == pattern(dev_lba, 0, state));

		for lba in 0..10 { assert!(is(lba, lba, 0), "Video L0 wrong at {lba}!"); }
		for lba in 10..14 { assert!(zero(lba), "MZ1 not zero at {lba}!"); }
		for lba in 14..34 {
			if (16..18).contains(&lba) { assert!(zero(lba), "Hole not zero at {lba}!"); }
			else { assert!(is(lba, lba, 2), "Game wrong at {lba}!"); }
		}
		for lba in 34..38 { assert!(zero(lba), "MZ2 not zero at {lba}!"); }
		for lba in 38..44 { assert!(is(lba, lba - 28, 0), "Video L1 wrong at {lba}!"); }

		// The ledger was re-sized to the unlocked geometry.
		let back = store.load(44).unwrap().unwrap();
		assert_eq!(back.covered().as_pairs(), &[(0, 44)]);
	}

	/// # A Plausible Geometry.
	///
	/// The physical layer boundary deliberately sits nowhere near the
	/// logical layer break; the fold must follow the PFI field.
	const GEO: XgdGeometry = XgdGeometry {
		l0_video: 1000,
		l1_video: 500,
		middle_zone: 100,
		game_size: 2000,
		total_size: 1000 + 500 + 200 + 2000,
		layer_break: 1000 + 100 + 1000,
		layer0_end: PSN_BIAS + 1500,
	};

	#[test]
	fn t_layout() {
		assert_eq!(GEO.game_start(), 1100);
		assert_eq!(GEO.mz2_start(), 3100);
		assert_eq!(GEO.l1_start(), 3200);
		assert_eq!(
			GEO.total_size,
			GEO.l0_video + GEO.l1_video + 2 * GEO.middle_zone + GEO.game_size,
		);
		assert!(GEO.layer_break < GEO.total_size);
	}

	#[test]
	fn t_psn_fold() {
		// Layer zero: straight bias subtraction, up to the PFI boundary.
		assert_eq!(psn_to_lba(PSN_BIAS, &GEO), Some(0));
		assert_eq!(psn_to_lba(PSN_BIAS + 1234, &GEO), Some(1234));
		assert_eq!(psn_to_lba(GEO.layer0_end, &GEO), Some(1500));

		// Layer one: the complement of layer zero's end is the very next
		// block, and complements keep counting up from there.
		let psn = GEO.layer0_end ^ 0x00FF_FFFF;
		assert_eq!(psn_to_lba(psn, &GEO), Some(1501));
		assert_eq!(psn_to_lba(psn + 1, &GEO), Some(1502));

		// Sub-bias layer-zero PSNs have no LBA.
		assert_eq!(psn_to_lba(PSN_BIAS - 1, &GEO), None);
	}

	#[test]
	fn t_ss_extents() {
		let mut ss = vec![0_u8; 0x300];

		// A layer-zero extent: PSN 0x30064..0x300C7 => LBA 100..199.
		ss[SS_EXTENTS_AT..SS_EXTENTS_AT + 4].copy_from_slice(&0x0003_0064_u32.to_be_bytes());
		ss[SS_EXTENTS_AT + 4..SS_EXTENTS_AT + 8].copy_from_slice(&0x0003_00C7_u32.to_be_bytes());

		// And a layer-one extent, folding through the complement to LBAs
		// 1501..1503.
		let start = u32::try_from(GEO.layer0_end ^ 0x00FF_FFFF).unwrap();
		ss[SS_EXTENTS_AT + 8..SS_EXTENTS_AT + 12].copy_from_slice(&start.to_be_bytes());
		ss[SS_EXTENTS_AT + 12..SS_EXTENTS_AT + 16].copy_from_slice(&(start + 2).to_be_bytes());

		let holes = ss_extents(&ss, &GEO);
		assert_eq!(holes.as_pairs(), &[(100, 200), (1501, 1504)]);

		// Too short for a table: no holes.
		assert!(ss_extents(&ss[..0x100], &GEO).is_empty());
	}
}
