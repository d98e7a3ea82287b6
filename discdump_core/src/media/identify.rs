/*!
# Disc Dump: Media Identification
*/

use crate::{
	Device,
	DeviceKind,
	DumpError,
	MediaTagKind,
	MediaType,
	SenseClass,
	StructureFormat,
	StructureMedia,
	TagMap,
};
use dactyl::{
	NiceU32,
	NiceU64,
};
use fyi_msg::Msg;
use std::time::Duration;
use super::{
	pfi::Pfi,
	profile,
	signature,
	tape,
};



/// # Command Timeout.
const CMD_TIMEOUT: Duration = Duration::from_secs(10);

/// # Ready-Poll Pause.
const READY_PAUSE: Duration = Duration::from_secs(2);

/// # Ready-Poll Retry Budget: Reset Unit Attention.
const READY_RESETS: u8 = 5;

/// # Ready-Poll Retry Budget: No Medium.
const READY_NO_MEDIUM: u8 = 5;

/// # Ready-Poll Retry Budget: Becoming Ready.
const READY_BECOMING: u8 = 10;

/// # XGD3 Block Counts.
///
/// A Kreon drive reports one of these totals for an XGD3 disc depending on
/// its lock state; the DMI alone would misfile them as XGD2.
const XGD3_BLOCKS: [u64; 3] = [25_063, 4_229_664, 4_246_304];

/// # Xbox DMI Signatures (Offset Eight, Past the Four-Byte Header).
const XGD1_MAGIC: &[u8] = b"Xbox";

/// # Second-Generation Xbox DMI Signature.
const XGD2_MAGIC: &[u8] = b"XBOX";

/// # Boot Window Sectors.
///
/// How many cooked sectors to sample from the start of the first data track
/// for the floating-signature probes.
const BOOT_WINDOW_SECTORS: u32 = 16;



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Drive Capability Snapshot (MODE PAGE 2Ah).
pub struct DriveCaps {
	/// # C2 Error Pointers Supported?
	pub c2_pointers: bool,

	/// # Buffer Size (KiB).
	pub buffer_kib: u16,

	/// # Maximum Read Speed (KB/s).
	pub max_read_speed: u16,
}

impl DriveCaps {
	/// # Parse From a Raw 2Ah Page.
	fn parse(page: &[u8]) -> Option<Self> {
		if page.len() < 14 || page[0] & 0x3F != 0x2A { return None; }
		Some(Self {
			c2_pointers: page[4] & 0x02 != 0,
			buffer_kib: u16::from_be_bytes([page[12], page[13]]),
			max_read_speed: u16::from_be_bytes([page[8], page[9]]),
		})
	}
}



#[derive(Debug, Clone)]
/// # Media Scan Result.
///
/// What the identification cascade learned: the canonical media type, the
/// medium's addressable geometry, and whatever descriptive blobs the drive
/// coughed up along the way.
///
/// An unidentifiable medium is not an error; `recognized` comes back
/// `false` but the geometry is still published so the caller can dump it
/// blind if it wants.
pub struct MediaScan {
	/// # Media Type.
	pub media_type: MediaType,

	/// # Was the Type Actually Established?
	pub recognized: bool,

	/// # Total Addressable Blocks.
	pub blocks: u64,

	/// # Logical Block Size.
	pub block_size: u32,

	/// # Media Tags.
	pub tags: TagMap,
}

impl MediaScan {
	#[must_use]
	/// # Tag Lookup.
	pub fn tag(&self, kind: MediaTagKind) -> Option<&[u8]> {
		self.tags.get(&kind).map(Vec::as_slice)
	}

	#[must_use]
	/// # Drive Capabilities, If Captured.
	pub fn drive_caps(&self) -> Option<DriveCaps> {
		self.tag(MediaTagKind::ScsiModePage2A).and_then(DriveCaps::parse)
	}

	/// # Print a Summary.
	///
	/// One line for the medium, one for the geometry, to STDERR.
	pub fn summarize(&self) {
		Msg::custom("Medium", 199, &format!(
			"{}{}",
			self.media_type,
			if self.recognized { "" } else { " (unrecognized)" },
		))
			.with_newline(true)
			.eprint();
		Msg::custom("Layout", 199, &format!(
			"{} blocks of {} bytes.",
			NiceU64::from(self.blocks),
			NiceU32::from(self.block_size),
		))
			.with_newline(true)
			.eprint();
	}
}



/// # Identify the Loaded Medium.
///
/// Run the full probe cascade against an opened device: readiness polling,
/// capacity, MMC profile, disc structures, TOC/ATIP shapes, sector
/// signatures, and (for sequential devices) the density tables.
///
/// ## Errors
///
/// Returns an error if the medium never becomes ready or the transport
/// dies. An *unidentifiable* medium is reported as `Unknown` with
/// `recognized = false`, not an error.
pub fn identify(dev: &mut dyn Device) -> Result<MediaScan, DumpError> {
	if dev.removable() { wait_ready(dev)?; }

	let mut scan = MediaScan {
		media_type: MediaType::Unknown,
		recognized: false,
		blocks: 0,
		block_size: 0,
		tags: TagMap::default(),
	};

	read_capacity(dev, &mut scan)?;

	match dev.kind() {
		DeviceKind::MultiMedia => identify_optical(dev, &mut scan)?,
		DeviceKind::Sequential => identify_tape(dev, &mut scan)?,
		DeviceKind::Block => identify_block(dev, &mut scan)?,
	}

	scan.recognized = ! matches!(
		scan.media_type,
		MediaType::Unknown | MediaType::UnknownTape,
	);
	Ok(scan)
}

/// # Poll Until Ready.
///
/// Removable devices need a moment after load: power-on resets get a quick
/// bounded retry, missing media a short wait, becoming-ready a longer one.
/// Anything else is fatal.
fn wait_ready(dev: &mut dyn Device) -> Result<(), DumpError> {
	let mut resets = READY_RESETS;
	let mut no_medium = READY_NO_MEDIUM;
	let mut becoming = READY_BECOMING;

	loop {
		let reply = dev.test_unit_ready(CMD_TIMEOUT)?;
		let Some(sense) = reply.sense else { return Ok(()); };

		match sense.class() {
			SenseClass::Good => return Ok(()),
			SenseClass::Reset if resets != 0 => { resets -= 1; },
			SenseClass::NoMedium if no_medium != 0 => {
				no_medium -= 1;
				std::thread::sleep(READY_PAUSE);
			},
			SenseClass::BecomingReady if becoming != 0 => {
				becoming -= 1;
				std::thread::sleep(READY_PAUSE);
			},
			_ => return Err(DumpError::MediumNotReady(sense.asc, sense.ascq)),
		}
	}
}

/// # Read Capacity.
///
/// READ CAPACITY (10) first, falling back to the sixteen-byte flavor when
/// the medium is empty-looking or too big to fit. SCSI reports the *last*
/// LBA, so the count is one higher.
fn read_capacity(dev: &mut dyn Device, scan: &mut MediaScan) -> Result<(), DumpError> {
	let reply = dev.read_capacity10(CMD_TIMEOUT)?;
	if reply.ok() {
		if let Some((last, size)) = crate::device::decode_capacity10(&reply.data) {
			if last == 0 || last == u32::MAX {
				let reply = dev.read_capacity16(CMD_TIMEOUT)?;
				if reply.ok() {
					if let Some((last, size)) = crate::device::decode_capacity16(&reply.data) {
						scan.blocks = last + 1;
						scan.block_size = size;
						return Ok(());
					}
				}
			}
			scan.blocks = u64::from(last) + 1;
			scan.block_size = size;
		}
	}
	Ok(())
}

/// # Identify: MMC Branch.
fn identify_optical(dev: &mut dyn Device, scan: &mut MediaScan) -> Result<(), DumpError> {
	// Capture the capabilities page while we're here.
	capture_mode2a(dev, scan)?;

	// The current profile gives us a starting point.
	let reply = dev.get_configuration(0, CMD_TIMEOUT)?;
	if reply.ok() {
		if let Some(profile) = profile::current_profile(&reply.data) {
			scan.media_type = profile::media_from_profile(profile);
		}
	}

	if scan.media_type.is_dvd() { identify_dvd(dev, scan)?; }

	if scan.media_type == MediaType::Unknown || scan.media_type.is_cd() {
		identify_cd(dev, scan)?;
	}

	// Xbox discs are unreadable without their unlock dance; everything else
	// gets fingerprinted.
	if ! scan.media_type.is_xgd() { probe_signatures(dev, scan)?; }

	Ok(())
}

/// # Identify: DVD Structures.
fn identify_dvd(dev: &mut dyn Device, scan: &mut MediaScan) -> Result<(), DumpError> {
	// Physical format information.
	let reply = dev.read_disc_structure(
		StructureMedia::Dvd,
		StructureFormat::Physical,
		0,
		0,
		CMD_TIMEOUT,
	)?;
	if reply.ok() && ! reply.data.is_empty() {
		scan.tags.insert(MediaTagKind::DvdPfi, reply.data.clone());
		if let Some(decoded) = Pfi::parse(&reply.data) {
			scan.media_type = decoded.refine(scan.media_type);
		}
	}

	// Manufacturing information, which doubles as the Xbox tell.
	if scan.media_type == MediaType::DvdRom {
		let reply = dev.read_disc_structure(
			StructureMedia::Dvd,
			StructureFormat::Manufacturing,
			0,
			0,
			CMD_TIMEOUT,
		)?;
		if reply.ok() && ! reply.data.is_empty() {
			scan.tags.insert(MediaTagKind::DvdDmi, reply.data.clone());
			if let Some(sig) = reply.data.get(8..12) {
				if sig == XGD2_MAGIC {
					scan.media_type =
						if XGD3_BLOCKS.contains(&scan.blocks) { MediaType::Xgd3 }
						else { MediaType::Xgd2 };
				}
				else if sig == XGD1_MAGIC { scan.media_type = MediaType::Xgd1; }
			}
		}
	}

	Ok(())
}

/// # Identify: CD Shapes.
fn identify_cd(dev: &mut dyn Device, scan: &mut MediaScan) -> Result<(), DumpError> {
	// A readable TOC means a CD of some kind.
	let reply = dev.read_toc(CMD_TIMEOUT)?;
	let toc = reply.ok().then_some(reply.data);
	if toc.is_some() && scan.media_type == MediaType::Unknown {
		scan.media_type = MediaType::Cd;
	}

	// ATIP only exists on burnable media; its disc-type bit splits -R
	// from -RW.
	let reply = dev.read_atip(CMD_TIMEOUT)?;
	if reply.ok() && 7 <= reply.data.len() {
		scan.media_type =
			if reply.data[6] & 0x40 == 0 { MediaType::CdR }
			else { MediaType::CdRw };
		scan.tags.insert(MediaTagKind::CdAtip, reply.data);
	}

	// The full TOC refines the session format and spots multi-session
	// arrangements.
	let reply = dev.read_full_toc(CMD_TIMEOUT)?;
	if reply.ok() && 4 <= reply.data.len() {
		refine_from_full_toc(&reply.data, scan);
		scan.tags.insert(MediaTagKind::CdFullToc, reply.data);
	}

	// PMA and CD-Text, purely for the record.
	let reply = dev.read_pma(CMD_TIMEOUT)?;
	if reply.ok() && ! reply.data.is_empty() {
		scan.tags.insert(MediaTagKind::CdPma, reply.data);
	}
	let reply = dev.read_cd_text(CMD_TIMEOUT)?;
	if reply.ok() && ! reply.data.is_empty() {
		scan.tags.insert(MediaTagKind::CdText, reply.data);
	}

	Ok(())
}

/// # Refine From the Full TOC.
///
/// The A0 point's PSEC byte encodes the session format; the session/control
/// spread distinguishes CD-Plus.
fn refine_from_full_toc(data: &[u8], scan: &mut MediaScan) {
	let mut sessions = 0_u8;
	let mut first_session_audio = false;
	let mut later_session_data = false;

	for entry in data[4..].chunks_exact(11) {
		let session = entry[0];
		let ctl = entry[1] & 0x0F;
		let point = entry[3];

		sessions = sessions.max(session);

		if point == 0xA0 && session == 1 {
			match entry[9] {
				0x10 => { scan.media_type = MediaType::CdI; },
				0x20 => { scan.media_type = MediaType::CdRomXa; },
				_ => (),
			}
		}

		// Real tracks only.
		if (1..=99).contains(&point) {
			if session == 1 && ctl & 0x04 == 0 { first_session_audio = true; }
			if 1 < session && ctl & 0x04 != 0 { later_session_data = true; }
		}
	}

	if 1 < sessions && first_session_audio && later_session_data {
		scan.media_type = MediaType::CdPlus;
	}
}

/// # Sector-Signature Probes.
///
/// Console pressings get fingerprinted from fixed magic bytes. Read errors
/// during probing are harmless; the probe simply doesn't match.
fn probe_signatures(dev: &mut dyn Device, scan: &mut MediaScan)
-> Result<(), DumpError> {
	let cd_family = scan.media_type == MediaType::Unknown || scan.media_type.is_cd();

	// Sectors zero and one carry most of the fixed magics, all CD-era.
	if cd_family {
		if let Some(sector0) = read_cooked(dev, 0, 1, scan.blocks)? {
			if signature::is_three_do(&sector0) { scan.media_type = MediaType::ThreeDo; }
			else if signature::is_fm_towns(&sector0) { scan.media_type = MediaType::FmTowns; }
			else if signature::is_playdia(&sector0) { scan.media_type = MediaType::Playdia; }
			else if signature::is_pc_fx(&sector0) { scan.media_type = MediaType::PcFx; }
			else if signature::is_mil_cd(&sector0) { scan.media_type = MediaType::MilCd; }
		}
		if let Some(sector1) = read_cooked(dev, 1, 1, scan.blocks)? {
			if signature::is_pc_engine(&sector1) { scan.media_type = MediaType::PcEngineCd; }
		}
	}

	// Late-model PlayStations park a marker further in.
	if let Some(sector) = read_cooked(dev, 4200, 1, scan.blocks)? {
		if signature::is_ps3(&sector) {
			scan.media_type =
				if scan.media_type.is_dvd() { MediaType::Ps3Dvd }
				else { MediaType::Ps3Bd };
		}
	}
	if let Some(sector) = read_cooked(dev, 4201, 1, scan.blocks)? {
		if signature::is_ps4(&sector) { scan.media_type = MediaType::Ps4Bd; }
	}

	// A window from the first data track catches the floating signatures.
	if let Some(start) = first_data_track_lba(dev)? {
		if let Some(window) = read_cooked(dev, start, BOOT_WINDOW_SECTORS, scan.blocks)? {
			if cd_family && signature::is_jaguar(&window) {
				scan.media_type = MediaType::JaguarCd;
			}
			else if signature::is_ps2(&window[..signature::PS2_REGION_SECTORS as usize * 2048]) {
				scan.media_type =
					if scan.media_type.is_dvd() { MediaType::Ps2Dvd }
					else { MediaType::Ps2Cd };
			}
			else if cd_family && signature::is_ps1(&window) {
				scan.media_type = MediaType::Ps1Cd;
			}
		}
	}

	// VideoNow Color hides a video frame marker in the first nine sectors.
	if scan.media_type == MediaType::Cd {
		if let Some(window) = read_cooked(dev, 0, 9, scan.blocks)? {
			if signature::is_videonow_color(&window) {
				scan.media_type = MediaType::VideoNowColor;
			}
		}
	}

	Ok(())
}

/// # Read Cooked Sectors, Forgivingly.
///
/// Out-of-range requests and read errors all collapse into `None`.
fn read_cooked(dev: &mut dyn Device, lba: u64, count: u32, total: u64)
-> Result<Option<Vec<u8>>, DumpError> {
	if total < lba.saturating_add(u64::from(count)) { return Ok(None); }
	let Ok(lba32) = u32::try_from(lba) else { return Ok(None); };

	let reply = dev.read12(lba32, count, 2048, false, false, CMD_TIMEOUT)?;
	if reply.ok() && reply.data.len() == count as usize * 2048 {
		Ok(Some(reply.data))
	}
	else { Ok(None) }
}

/// # First Data Track LBA.
///
/// Walk the plain TOC for the first track with the data control bit.
fn first_data_track_lba(dev: &mut dyn Device) -> Result<Option<u64>, DumpError> {
	let reply = dev.read_toc(CMD_TIMEOUT)?;
	if ! reply.ok() || reply.data.len() < 4 { return Ok(None); }

	for entry in reply.data[4..].chunks_exact(8) {
		let ctl = entry[1] & 0x0F;
		let track = entry[2];
		if (1..=99).contains(&track) && ctl & 0x04 != 0 {
			return Ok(Some(u64::from(u32::from_be_bytes([
				entry[4], entry[5], entry[6], entry[7],
			]))));
		}
	}
	Ok(None)
}

/// # Capture MODE PAGE 2Ah.
fn capture_mode2a(dev: &mut dyn Device, scan: &mut MediaScan) -> Result<(), DumpError> {
	let reply = dev.mode_sense10(0x2A, 0, crate::ModePageControl::Current, CMD_TIMEOUT)?;
	if reply.ok() && 8 < reply.data.len() {
		// Skip the eight-byte mode parameter header; the page proper is
		// what gets stored.
		let page = reply.data[8..].to_vec();
		if page.first().is_some_and(|b| b & 0x3F == 0x2A) {
			scan.tags.insert(MediaTagKind::ScsiModePage2A, page);
		}
	}
	Ok(())
}

/// # Identify: Tape Branch.
fn identify_tape(dev: &mut dyn Device, scan: &mut MediaScan) -> Result<(), DumpError> {
	let reply = dev.mode_sense6(0x3F, 0, crate::ModePageControl::Current, CMD_TIMEOUT)?;
	if reply.ok() && ! reply.data.is_empty() {
		scan.media_type = tape::media_from_mode_sense(&reply.data);
		if scan.block_size == 0 {
			if let Some(bs) = tape::block_size_from_mode_sense(&reply.data) {
				scan.block_size = bs;
			}
		}
		scan.tags.insert(MediaTagKind::ScsiModeSense6, reply.data);
	}
	else { scan.media_type = MediaType::UnknownTape; }
	Ok(())
}

/// # Identify: Direct-Access Branch.
fn identify_block(dev: &mut dyn Device, scan: &mut MediaScan) -> Result<(), DumpError> {
	// A USB device with the (long-vestigial) floppy page is a flash drive;
	// everything else is just a block device.
	if dev.usb() {
		let reply = dev.mode_sense6(0x05, 0, crate::ModePageControl::Current, CMD_TIMEOUT)?;
		if reply.ok() && ! reply.data.is_empty() {
			scan.media_type = MediaType::FlashDrive;
			return Ok(());
		}
	}
	scan.media_type = MediaType::GenericBlock;
	Ok(())
}



#[cfg(test)]
mod test {
	use crate::DeviceKind;
	use crate::SenseKey;
	use crate::testdev::{
		MockDevice,
		sense,
	};
	use super::*;

	#[test]
	fn t_blank_cdr() {
		// Profile query fails, TOC absent, ATIP present with the disc-type
		// bit clear: a blank CD-R.
		let mut dev = MockDevice::new(DeviceKind::MultiMedia);
		dev.removable = true;
		dev.ready.push_back(sense(SenseKey::UnitAttention, 0x29, 0x00));
		dev.blocks = 360_000;
		dev.capacity10 = Some((359_999, 2048));
		dev.atip = Some(vec![0, 10, 0, 0, 0x96, 0x40, 0x00, 0x32, 0x4E, 0x32]);

		let scan = identify(&mut dev).unwrap();
		assert_eq!(scan.media_type, MediaType::CdR);
		assert!(scan.recognized);
		assert_eq!(scan.blocks, 360_000);
		assert_eq!(scan.block_size, 2048);
		assert!(scan.tag(MediaTagKind::CdAtip).is_some());

		// The RW bit flips the answer.
		let mut dev = MockDevice::new(DeviceKind::MultiMedia);
		dev.blocks = 360_000;
		dev.capacity10 = Some((359_999, 2048));
		dev.atip = Some(vec![0, 10, 0, 0, 0x96, 0x40, 0x40, 0x32, 0x4E, 0x32]);
		let scan = identify(&mut dev).unwrap();
		assert_eq!(scan.media_type, MediaType::CdRw);
	}

	#[test]
	fn t_xgd3_override() {
		// DVD-ROM profile, second-generation Xbox DMI signature, but the
		// block count gives the third generation away.
		let mut pfi = vec![0x08, 0x02, 0, 0];
		pfi.extend_from_slice(&[
			0x01, 0x00, 0x20, 0x00,
			0x00, 0x03, 0x00, 0x00,
			0x00, 0x26, 0x05, 0x3F,
			0x00, 0x19, 0x27, 0xFF,
		]);
		let mut dmi = vec![0x08, 0x02, 0, 0, 0, 0, 0, 0];
		dmi.extend_from_slice(b"XBOX");

		let mut dev = MockDevice::new(DeviceKind::MultiMedia);
		dev.blocks = 4_246_304;
		dev.capacity10 = Some((4_246_303, 2048));
		dev.profile = Some(0x0010);
		dev.pfi = Some(pfi.clone());
		dev.dmi = Some(dmi.clone());

		let scan = identify(&mut dev).unwrap();
		assert_eq!(scan.media_type, MediaType::Xgd3);
		assert!(scan.tag(MediaTagKind::DvdPfi).is_some());
		assert!(scan.tag(MediaTagKind::DvdDmi).is_some());

		// An ordinary block count stays second generation.
		let mut dev = MockDevice::new(DeviceKind::MultiMedia);
		dev.blocks = 1_000_000;
		dev.capacity10 = Some((999_999, 2048));
		dev.profile = Some(0x0010);
		dev.pfi = Some(pfi);
		dev.dmi = Some(dmi);
		let scan = identify(&mut dev).unwrap();
		assert_eq!(scan.media_type, MediaType::Xgd2);
	}

	#[test]
	fn t_tape_density() {
		let mut dev = MockDevice::new(DeviceKind::Sequential);
		dev.mode6_data = Some(vec![11, 0, 0, 8, 0x25, 0, 0, 0, 0, 0, 0x02, 0]);

		let scan = identify(&mut dev).unwrap();
		assert_eq!(scan.media_type, MediaType::Dds3);
		assert!(scan.recognized);
		assert_eq!(scan.block_size, 512);
		assert!(scan.tag(MediaTagKind::ScsiModeSense6).is_some());
	}

	#[test]
	fn t_flash_drive() {
		let mut dev = MockDevice::new(DeviceKind::Block);
		dev.usb = true;
		dev.floppy_page = true;
		dev.capacity10 = Some((999, 512));

		let scan = identify(&mut dev).unwrap();
		assert_eq!(scan.media_type, MediaType::FlashDrive);

		// Without the page it's just a block device, unrecognized.
		let mut dev = MockDevice::new(DeviceKind::Block);
		dev.usb = true;
		dev.capacity10 = Some((999, 512));
		let scan = identify(&mut dev).unwrap();
		assert_eq!(scan.media_type, MediaType::GenericBlock);
	}

	#[test]
	fn t_never_ready() {
		let mut dev = MockDevice::new(DeviceKind::MultiMedia);
		dev.removable = true;
		for _ in 0..10 {
			dev.ready.push_back(sense(SenseKey::UnitAttention, 0x29, 0x00));
		}
		assert!(matches!(
			identify(&mut dev),
			Err(DumpError::MediumNotReady(0x29, 0x00)),
		));
	}

	#[test]
	fn t_caps() {
		let mut page = vec![0x2A, 18, 0, 0, 0x02, 0, 0, 0, 0x16, 0x22, 0, 0, 0x01, 0x00];
		let caps = DriveCaps::parse(&page).unwrap();
		assert!(caps.c2_pointers);
		assert_eq!(caps.buffer_kib, 256);
		assert_eq!(caps.max_read_speed, 0x1622);

		page[4] = 0;
		assert!(! DriveCaps::parse(&page).unwrap().c2_pointers);
		assert!(DriveCaps::parse(&page[..10]).is_none());
	}

	#[test]
	fn t_full_toc_refine() {
		let mut scan = MediaScan {
			media_type: MediaType::Cd,
			recognized: false,
			blocks: 1000,
			block_size: 2048,
			tags: TagMap::default(),
		};

		// A0 PSEC 0x20: CD-ROM XA.
		let mut data = vec![0, 13, 1, 1];
		data.extend_from_slice(&[1, 0x14, 0, 0xA0, 0, 0, 0, 0, 1, 0x20, 0]);
		refine_from_full_toc(&data, &mut scan);
		assert_eq!(scan.media_type, MediaType::CdRomXa);

		// Audio first session + data second session: CD-Plus.
		let mut data = vec![0, 24, 1, 2];
		data.extend_from_slice(&[1, 0x00, 0, 1, 0, 0, 0, 0, 0, 2, 0]);
		data.extend_from_slice(&[2, 0x04, 0, 2, 0, 0, 0, 0, 10, 2, 0]);
		refine_from_full_toc(&data, &mut scan);
		assert_eq!(scan.media_type, MediaType::CdPlus);
	}
}
