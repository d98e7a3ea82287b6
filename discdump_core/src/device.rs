/*!
# Disc Dump: Device Capabilities

The engine does not ship a transport; it talks to whatever implements
[`Device`]. Each operation corresponds to the identically-named MMC/SPC/SSC
command, is synchronous, may block on OS I/O, and carries a per-call timeout.

Somewhat useful documentation:
<https://www.t10.org/ftp/t10/document.97/97-117r0.pdf>
*/

use crate::{
	DumpError,
	Sense,
};
use std::{
	fmt,
	time::Duration,
};
use trimothy::NormalizeWhitespace;



/// # Max Drive Vendor Length.
const DRIVE_VENDOR_LEN: usize = 8;

/// # Max Drive Model Length.
const DRIVE_MODEL_LEN: usize = 16;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Device Kind.
///
/// The peripheral device type, pre-chewed. Identification and pipeline
/// selection branch on this rather than raw INQUIRY bytes.
pub enum DeviceKind {
	/// # Direct-Access Block Device.
	Block,

	/// # MMC (Optical) Device.
	MultiMedia,

	/// # SSC (Tape) Device.
	Sequential,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Expected CD Sector Type (READ CD).
pub enum CdSectorKind {
	/// # Whatever Is There.
	Any,

	/// # Red-Book Audio.
	CdDa,

	/// # Mode 1.
	Mode1,

	/// # Mode 2 Formless.
	Mode2,

	/// # Mode 2 Form 1.
	Mode2Form1,

	/// # Mode 2 Form 2.
	Mode2Form2,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Header Codes to Transfer (READ CD).
pub enum CdHeaderCodes {
	/// # No Header Data.
	None,

	/// # Four-Byte Header.
	HeaderOnly,

	/// # Eight-Byte Subheader.
	SubheaderOnly,

	/// # Header and Subheader.
	Both,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Subchannel Selection (READ CD).
pub enum CdSubchannel {
	/// # No Subchannel.
	None,

	/// # Formatted Q, Sixteen Bytes.
	Q16,

	/// # Packed/Raw, Ninety-Six Bytes.
	Packed96,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # READ TOC/PMA/ATIP Response Format.
pub enum TocFormat {
	/// # Plain TOC.
	Toc,

	/// # Session Info.
	SessionInfo,

	/// # Full (Raw) TOC.
	FullToc,

	/// # Program Memory Area.
	Pma,

	/// # Absolute Time In Pregroove.
	Atip,

	/// # CD-Text.
	CdText,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # READ DISC STRUCTURE Media Class.
pub enum StructureMedia {
	/// # DVD and HD DVD.
	Dvd,

	/// # Blu-ray.
	Bd,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # READ DISC STRUCTURE Format Code.
pub enum StructureFormat {
	/// # Physical Format Information (00h) / BD Disc Information.
	Physical,

	/// # Copyright Information (01h).
	Copyright,

	/// # Burst Cutting Area (03h).
	BurstCuttingArea,

	/// # Disc Manufacturing Information (04h).
	Manufacturing,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # SPACE Object Kind (SSC).
pub enum SpaceKind {
	/// # Logical Blocks.
	Blocks,

	/// # Filemarks.
	Filemarks,

	/// # Sequential Filemarks.
	SequentialFilemarks,

	/// # End of Data.
	EndOfData,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # MODE SENSE Page Control.
pub enum ModePageControl {
	/// # Current Values.
	Current,

	/// # Changeable Mask.
	Changeable,

	/// # Power-On Defaults.
	Default,

	/// # Saved Values.
	Saved,
}



#[derive(Debug, Clone)]
/// # Command Reply.
///
/// Everything a device command gives back: the transferred bytes, the
/// decoded sense (if the command finished with CHECK CONDITION), and how
/// long the round trip took.
pub struct DeviceReply {
	/// # Transferred Data.
	pub data: Vec<u8>,

	/// # Decoded Sense, If Any.
	///
	/// `None` means the command completed with GOOD status.
	pub sense: Option<Sense>,

	/// # Round-Trip Time.
	pub elapsed: Duration,
}

impl DeviceReply {
	#[must_use]
	/// # Good Status?
	pub const fn ok(&self) -> bool { self.sense.is_none() }

	#[must_use]
	/// # As a Read Error.
	///
	/// Convert a CHECK CONDITION into the transient read error for `lba`,
	/// suitable for the bad-block path.
	pub fn read_err(&self, lba: u64) -> DumpError {
		match self.sense {
			Some(s) => DumpError::Read(lba, s.key, s.asc, s.ascq),
			None => DumpError::Bug("read_err called on a good reply"),
		}
	}
}



/// # Device Capability Set.
///
/// The narrow slice of a SCSI transport the engine consumes. Methods return
/// `Ok` with a [`DeviceReply`] whenever the transport delivered the command,
/// even if the device rejected it (the rejection rides in `reply.sense`);
/// `Err` is reserved for the transport itself going away or timing out.
pub trait Device {
	/// # Device Kind.
	fn kind(&self) -> DeviceKind;

	/// # Removable Medium?
	fn removable(&self) -> bool;

	/// # USB-Attached?
	fn usb(&self) -> bool { false }

	/// # Drive Identity.
	fn ident(&self) -> Option<&DriveIdentity> { None }

	/// # TEST UNIT READY.
	fn test_unit_ready(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # REQUEST SENSE.
	fn request_sense(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # READ CAPACITY (10).
	fn read_capacity10(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # READ CAPACITY (16).
	fn read_capacity16(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # READ (6), Sequential Flavor.
	///
	/// With `fixed`, `length` counts blocks of `block_size` bytes; without,
	/// it counts bytes.
	fn read6(&mut self, fixed: bool, length: u32, block_size: u32, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # READ (10).
	fn read10(&mut self, lba: u32, blocks: u16, block_size: u32, fua: bool, dpo: bool, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # READ (12).
	fn read12(&mut self, lba: u32, blocks: u32, block_size: u32, fua: bool, dpo: bool, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # READ (16).
	fn read16(&mut self, lba: u64, blocks: u32, block_size: u32, fua: bool, dpo: bool, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # READ CD.
	#[expect(clippy::too_many_arguments, reason = "The command takes what it takes.")]
	fn read_cd(
		&mut self,
		lba: u32,
		blocks: u32,
		kind: CdSectorKind,
		headers: CdHeaderCodes,
		edc_ecc: bool,
		sub: CdSubchannel,
		timeout: Duration,
	) -> Result<DeviceReply, DumpError>;

	/// # READ LONG (10).
	///
	/// Raw sector plus ECC; `bytes` must match the drive's long-read size.
	fn read_long10(&mut self, lba: u32, bytes: u16, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # READ DISC STRUCTURE.
	fn read_disc_structure(
		&mut self,
		media: StructureMedia,
		format: StructureFormat,
		layer: u8,
		agid: u8,
		timeout: Duration,
	) -> Result<DeviceReply, DumpError>;

	/// # READ TOC/PMA/ATIP.
	fn read_toc_pma_atip(&mut self, format: TocFormat, msf: bool, track_session: u8, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # Read Media Catalogue Number.
	fn read_mcn(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # Read ISRC For a Track.
	fn read_isrc(&mut self, track: u8, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # GET CONFIGURATION.
	///
	/// `rt` selects the feature subset; the current profile rides in the
	/// response header either way.
	fn get_configuration(&mut self, rt: u8, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # MODE SENSE (6).
	fn mode_sense6(&mut self, page: u8, subpage: u8, pc: ModePageControl, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # MODE SENSE (10).
	fn mode_sense10(&mut self, page: u8, subpage: u8, pc: ModePageControl, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # MODE SELECT (10).
	fn mode_select10(&mut self, data: &[u8], save: bool, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # REWIND (SSC).
	fn rewind(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # READ POSITION (SSC).
	fn read_position(&mut self, long: bool, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # LOCATE (10) (SSC).
	fn locate(&mut self, block: u32, partition: u8, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # LOCATE (16) (SSC).
	fn locate_long(&mut self, block: u64, partition: u8, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # SPACE (SSC).
	///
	/// Negative counts move toward beginning-of-medium.
	fn space(&mut self, kind: SpaceKind, count: i32, timeout: Duration)
	-> Result<DeviceReply, DumpError>;

	/// # Kreon: Lock (Video Mode).
	fn kreon_unlock_video(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # Kreon: Unlock State 1 (Xtreme).
	fn kreon_unlock_xtreme(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # Kreon: Unlock State 2 (Wxripper).
	fn kreon_unlock_wxripper(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # Kreon: Extract Security Sector.
	fn kreon_security_sector(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError>;

	/// # Full TOC, Pre-Formatted.
	fn read_full_toc(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError> {
		self.read_toc_pma_atip(TocFormat::FullToc, false, 0, timeout)
	}

	/// # ATIP.
	fn read_atip(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError> {
		self.read_toc_pma_atip(TocFormat::Atip, false, 0, timeout)
	}

	/// # PMA.
	fn read_pma(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError> {
		self.read_toc_pma_atip(TocFormat::Pma, false, 0, timeout)
	}

	/// # CD-Text.
	fn read_cd_text(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError> {
		self.read_toc_pma_atip(TocFormat::CdText, false, 0, timeout)
	}

	/// # Plain TOC.
	fn read_toc(&mut self, timeout: Duration) -> Result<DeviceReply, DumpError> {
		self.read_toc_pma_atip(TocFormat::Toc, false, 0, timeout)
	}
}



/// # Decode READ CAPACITY (10).
///
/// Returns `(last_lba, block_size)` exactly as reported; callers wanting a
/// block _count_ must add one.
pub(crate) fn decode_capacity10(data: &[u8]) -> Option<(u32, u32)> {
	if data.len() < 8 { None }
	else {
		Some((
			u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
			u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
		))
	}
}

/// # Decode READ CAPACITY (16).
pub(crate) fn decode_capacity16(data: &[u8]) -> Option<(u64, u32)> {
	if data.len() < 12 { None }
	else {
		Some((
			u64::from_be_bytes([
				data[0], data[1], data[2], data[3],
				data[4], data[5], data[6], data[7],
			]),
			u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
		))
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
/// # Drive Identity.
///
/// INQUIRY vendor and model strings top out at eight and sixteen bytes;
/// packing both into one fixed buffer keeps the value `Copy` and makes
/// pair comparisons a single memcmp.
///
/// Bytes are uppercased and ASCII-checked on the way in; lookups shouldn't
/// care how the firmware felt about capitalization that day.
pub struct DriveIdentity {
	/// # Vendor Then Model, NUL-Padded.
	raw: [u8; DRIVE_VENDOR_LEN + DRIVE_MODEL_LEN],

	/// # Vendor Byte Count.
	vendor_len: u8,

	/// # Model Byte Count.
	model_len: u8,
}

impl fmt::Display for DriveIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		use fmt::Write;

		for c in self.vendor().chars().normalized_control_and_whitespace() {
			f.write_char(c)?;
		}
		if self.vendor_len != 0 { f.write_char(' ')?; }
		for c in self.model().chars().normalized_control_and_whitespace() {
			f.write_char(c)?;
		}

		Ok(())
	}
}

impl DriveIdentity {
	#[expect(clippy::cast_possible_truncation, reason = "Length-checked above.")]
	/// # New!
	///
	/// Validate and pack separate vendor and model strings.
	///
	/// ## Errors
	///
	/// Returns an error when either string runs long or non-ASCII, or the
	/// model is missing entirely (a vendor-less drive is tolerated).
	pub fn new(vendor: &str, model: &str) -> Result<Self, DumpError> {
		let vendor = vendor.trim();
		let model = model.trim();

		if ! vendor.is_ascii() || DRIVE_VENDOR_LEN < vendor.len() {
			return Err(DumpError::DriveVendor);
		}
		if ! model.is_ascii() || model.is_empty() || DRIVE_MODEL_LEN < model.len() {
			return Err(DumpError::DriveModel);
		}

		let mut raw = [0_u8; DRIVE_VENDOR_LEN + DRIVE_MODEL_LEN];
		raw[..vendor.len()].copy_from_slice(vendor.as_bytes());
		raw[DRIVE_VENDOR_LEN..DRIVE_VENDOR_LEN + model.len()].copy_from_slice(model.as_bytes());
		raw.make_ascii_uppercase();

		Ok(Self {
			raw,
			vendor_len: vendor.len() as u8,
			model_len: model.len() as u8,
		})
	}

	#[must_use]
	/// # Vendor.
	///
	/// Note: This may be empty.
	pub fn vendor(&self) -> &str {
		std::str::from_utf8(&self.raw[..usize::from(self.vendor_len)]).unwrap_or("")
	}

	#[must_use]
	/// # Model.
	///
	/// A model number is always present.
	pub fn model(&self) -> &str {
		let start = DRIVE_VENDOR_LEN;
		std::str::from_utf8(&self.raw[start..start + usize::from(self.model_len)]).unwrap_or("")
	}
}



#[derive(Debug, Clone)]
/// # Dump Hardware Record.
///
/// Who did the dumping: the drive identity plus firmware revision, and this
/// library's own name/version, recorded into the output image for forensic
/// audit.
pub struct DumpHardware {
	/// # Drive Vendor/Model.
	pub drive: DriveIdentity,

	/// # Firmware Revision.
	pub firmware: String,

	/// # Dumping Software.
	pub software: &'static str,

	/// # Software Version.
	pub version: &'static str,
}

impl DumpHardware {
	#[must_use]
	/// # New!
	pub const fn new(drive: DriveIdentity, firmware: String) -> Self {
		Self {
			drive,
			firmware,
			software: env!("CARGO_PKG_NAME"),
			version: env!("CARGO_PKG_VERSION"),
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_ident() {
		// Whitespace is trimmed before validation.
		let id = DriveIdentity::new(" hl-dt-st", "DVDRAM GH24NSC0 ").unwrap();
		assert_eq!(id.vendor(), "HL-DT-ST");
		assert_eq!(id.model(), "DVDRAM GH24NSC0");

		assert!(DriveIdentity::new("TOOLONGVENDOR", "X").is_err());
		assert!(DriveIdentity::new("OK", "").is_err());
		assert!(DriveIdentity::new("OK", "MODEL NAME WAY TOO LONG").is_err());
	}

	#[test]
	fn t_capacity() {
		let raw = [0, 0, 0x12, 0x33, 0, 0, 0x08, 0];
		assert_eq!(decode_capacity10(&raw), Some((0x1233, 2048)));
		assert_eq!(decode_capacity10(&raw[..7]), None);

		let raw = [0, 0, 0, 0, 0, 0, 0x12, 0x33, 0, 0, 0x02, 0, 0, 0];
		assert_eq!(decode_capacity16(&raw), Some((0x1233, 512)));
	}
}
