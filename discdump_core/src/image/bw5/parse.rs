/*!
# Disc Dump: BW5 Structure Parsing
*/

use crate::{
	DumpError,
	SECTOR_RAW_CD,
	SubchannelKind,
	Track,
	TrackMode,
};
use super::cursor::Cursor;



/// # Track Descriptor Size.
const DESCRIPTOR_SIZE: usize = 72;

/// # Short Descriptor Tail.
///
/// DVD and not-data descriptors are stored eight bytes shorter; the parser
/// reads a full descriptor, then walks the cursor back.
const DESCRIPTOR_TAIL: usize = 8;



#[derive(Debug, Clone)]
/// # Data Block.
///
/// One entry of the container's data-file table: which external file holds
/// which LBA span, and where within that file it starts.
pub(super) struct DataBlock {
	/// # Payload Length (Bytes).
	pub(super) length: u64,

	/// # Byte Offset Into the File.
	pub(super) offset: u64,

	/// # First LBA Covered.
	pub(super) start_lba: i64,

	/// # Sector Count.
	pub(super) sectors: u64,

	/// # Referenced File Name.
	pub(super) filename: String,
}

impl DataBlock {
	/// # Parse One Entry.
	pub(super) fn parse(cur: &mut Cursor<'_>) -> Result<Self, DumpError> {
		let _kind = cur.u32()?;
		let length = u64::from(cur.u32()?);
		cur.skip(16)?; // Four unknown words.
		let offset = u64::from(cur.u32()?);
		cur.skip(12)?; // Three unknown words.
		let start_lba = i64::from(cur.i32()?);
		let sectors = cur.i32()?;
		let filename_len = cur.u32()? as usize;
		let filename = cur.utf16(filename_len)?;
		let _unknown = cur.u32()?;

		if sectors <= 0 {
			return Err(DumpError::Format(format!("empty data block ({filename})")));
		}

		Ok(Self {
			length,
			offset,
			start_lba,
			sectors: sectors.unsigned_abs().into(),
			filename,
		})
	}

	/// # On-Disk Sector Stride.
	///
	/// The per-sector byte width falls out of `length / sectors`; a
	/// remainder means the table is lying about one of them.
	pub(super) fn stride(&self) -> Result<u64, DumpError> {
		if self.sectors != 0 && self.length % self.sectors == 0 {
			Ok(self.length / self.sectors)
		}
		else {
			Err(DumpError::Format(format!(
				"data block length {} does not divide into {} sectors",
				self.length, self.sectors,
			)))
		}
	}

	/// # Covers an LBA?
	pub(super) fn contains(&self, lba: i64) -> bool {
		self.start_lba <= lba &&
		lba < self.start_lba + i64::try_from(self.sectors).unwrap_or(i64::MAX)
	}
}



#[derive(Debug, Clone, Copy)]
/// # Raw Track Descriptor.
///
/// A descriptor straight off the disk, before translation into a [`Track`].
/// Points at `A0h` and above are TOC metadata rather than tracks; they
/// still matter for TOC reconstruction.
pub(super) struct RawDescriptor {
	/// # Track Type Code.
	pub(super) ttype: u8,

	/// # ADR Nibble.
	pub(super) adr: u8,

	/// # Control Nibble.
	pub(super) ctl: u8,

	/// # Point.
	pub(super) point: u8,

	/// # Running Time.
	pub(super) msf: [u8; 3],

	/// # Zero Byte.
	pub(super) zero: u8,

	/// # Point Time.
	pub(super) pmsf: [u8; 3],

	/// # Pregap (Sectors).
	pub(super) pregap: i32,

	/// # First LBA.
	pub(super) start: i64,

	/// # Sector Count.
	pub(super) sectors: i64,

	/// # Track Number.
	pub(super) sequence: u16,

	/// # Session Number.
	pub(super) session: u16,
}

impl RawDescriptor {
	/// # Parse One Descriptor.
	///
	/// Reads the full 72 bytes, then rewinds the cursor by eight for the
	/// descriptor types the container stores short. This is how the format
	/// actually works; do not "fix" it.
	pub(super) fn parse(cur: &mut Cursor<'_>) -> Result<Self, DumpError> {
		let raw = cur.take(DESCRIPTOR_SIZE)?;

		let out = Self {
			ttype: raw[0],
			adr: raw[4],
			ctl: raw[5],
			point: raw[6],
			msf: [raw[8], raw[9], raw[10]],
			zero: raw[11],
			pmsf: [raw[12], raw[13], raw[14]],
			pregap: i32::from_le_bytes([raw[16], raw[17], raw[18], raw[19]]),
			start: i64::from(i32::from_le_bytes([raw[36], raw[37], raw[38], raw[39]])),
			sectors: i64::from(i32::from_le_bytes([raw[40], raw[41], raw[42], raw[43]])),
			sequence: u16::from_le_bytes([raw[44], raw[45]]),
			session: u16::from_le_bytes([raw[46], raw[47]]),
		};

		if out.short_form() { cur.rewind(DESCRIPTOR_TAIL)?; }

		Ok(out)
	}

	/// # Stored Short?
	pub(super) const fn short_form(&self) -> bool {
		matches!(self.ttype, 0 | 6)
	}

	/// # A Real Track?
	///
	/// Points `01h–63h` are tracks; everything else is lead-in metadata.
	pub(super) const fn is_track(&self) -> bool {
		1 <= self.point && self.point <= 99 && self.ttype != 0
	}

	/// # Track Mode.
	pub(super) const fn mode(&self) -> Result<TrackMode, DumpError> {
		match self.ttype {
			1 => Ok(TrackMode::Audio),
			2 => Ok(TrackMode::Mode1),
			3 => Ok(TrackMode::Mode2),
			4 => Ok(TrackMode::Mode2Form1),
			5 => Ok(TrackMode::Mode2Form2),
			6 => Ok(TrackMode::Dvd),
			n => Err(DumpError::TrackFormat(n)),
		}
	}
}



#[derive(Debug, Clone)]
/// # Raw Session.
pub(super) struct RawSession {
	/// # Session Number.
	pub(super) sequence: u16,

	/// # Session Start.
	pub(super) start: i64,

	/// # Session End.
	pub(super) end: i64,

	/// # First Track Number.
	pub(super) first_track: u16,

	/// # Last Track Number.
	pub(super) last_track: u16,

	/// # Descriptors.
	pub(super) descriptors: Vec<RawDescriptor>,
}

impl RawSession {
	/// # Parse One Session Block.
	pub(super) fn parse(cur: &mut Cursor<'_>) -> Result<Self, DumpError> {
		let sequence = cur.u16()?;
		let entries = cur.u8()?;
		let _unknown = cur.u8()?;
		let start = i64::from(cur.i32()?);
		let end = i64::from(cur.i32()?);
		let first_track = cur.u16()?;
		let last_track = cur.u16()?;

		let mut descriptors = Vec::with_capacity(usize::from(entries));
		for _ in 0..entries {
			descriptors.push(RawDescriptor::parse(cur)?);
		}

		Ok(Self {
			sequence,
			start,
			end,
			first_track,
			last_track,
			descriptors,
		})
	}
}



#[expect(clippy::cast_sign_loss, reason = "All clamped non-negative first.")]
/// # Translate a Descriptor Into a Track.
///
/// The enclosing data block supplies the stride (and thereby the
/// subchannel arrangement) and the file placement; the descriptor supplies
/// everything else.
pub(super) fn build_track(
	desc: &RawDescriptor,
	blocks: &[DataBlock],
) -> Result<Track, DumpError> {
	let mode = desc.mode()?;

	if desc.sectors <= 0 || desc.start + desc.sectors <= 0 {
		return Err(DumpError::Format(format!(
			"track {} has no addressable sectors", desc.sequence,
		)));
	}

	let (file, block) = blocks.iter()
		.enumerate()
		.find(|(_, b)| b.contains(desc.start.max(0)))
		.ok_or_else(|| DumpError::Format(format!(
			"track {} is not covered by any data file", desc.sequence,
		)))?;

	let stride = block.stride()?;
	let subchannel =
		if matches!(mode, TrackMode::Dvd) {
			if stride != 2048 {
				return Err(DumpError::Format(format!(
					"impossible DVD sector stride ({stride})",
				)));
			}
			SubchannelKind::None
		}
		else {
			let delta = stride.checked_sub(u64::from(SECTOR_RAW_CD))
				.ok_or_else(|| DumpError::Format(format!(
					"impossible sector stride ({stride})",
				)))?;
			SubchannelKind::from_delta(u32::try_from(delta).map_err(|_| DumpError::Overflow)?)?
		};

	// Clamp lead-in starts to zero; the pregap remembers the difference.
	let start = desc.start.max(0);
	let end = desc.start + desc.sectors - 1;
	let skip = start - block.start_lba;

	Ok(Track {
		sequence: desc.sequence,
		session: u8::try_from(desc.session).map_err(|_| DumpError::Overflow)?,
		mode,
		start: start as u64,
		end: end as u64,
		pregap: desc.pregap.max(0).unsigned_abs().into(),
		raw_bps: mode.raw_size(),
		cooked_bps: mode.cooked_size(),
		subchannel,
		file_offset: block.offset + skip as u64 * stride,
		file,
	})
}
