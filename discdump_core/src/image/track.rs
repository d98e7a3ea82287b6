/*!
# Disc Dump: Tracks, Sessions, Partitions
*/

use crate::{
	DumpError,
	SECTOR_RAW_CD,
	SUBCHANNEL_PACKED,
	SUBCHANNEL_Q16,
};
use std::fmt;



/// # Lead-In Offset.
///
/// CD addressing starts two seconds (150 frames) before LBA zero.
const MSF_LEADIN: u64 = 150;



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
/// # Minute/Second/Frame Coordinate.
pub struct Msf {
	/// # Minute.
	pub m: u8,

	/// # Second.
	pub s: u8,

	/// # Frame.
	pub f: u8,
}

impl fmt::Display for Msf {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:02}:{:02}:{:02}", self.m, self.s, self.f)
	}
}

impl Msf {
	#[expect(clippy::cast_possible_truncation, reason = "Moduli keep it in range.")]
	#[must_use]
	/// # From an LBA.
	///
	/// Returns `None` past the addressable ceiling (just shy of 100
	/// minutes).
	pub const fn from_lba(lba: u64) -> Option<Self> {
		let frames = lba + MSF_LEADIN;
		let m = frames / (60 * 75);
		if 100 <= m { None }
		else {
			Some(Self {
				m: m as u8,
				s: ((frames / 75) % 60) as u8,
				f: (frames % 75) as u8,
			})
		}
	}

	#[must_use]
	/// # Back to an LBA.
	///
	/// Positions inside the lead-in have no non-negative LBA and come back
	/// `None`.
	pub const fn to_lba(self) -> Option<u64> {
		let frames = self.m as u64 * 60 * 75 + self.s as u64 * 75 + self.f as u64;
		if frames < MSF_LEADIN { None }
		else { Some(frames - MSF_LEADIN) }
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Track Mode.
///
/// The on-disc encoding of a track, which decides both the byte geometry
/// and which sector tags can exist.
pub enum TrackMode {
	/// # Red-Book Audio.
	Audio,

	/// # Mode 1 Data.
	Mode1,

	/// # Mode 2, Formless.
	Mode2,

	/// # Mode 2, Form 1.
	Mode2Form1,

	/// # Mode 2, Form 2.
	Mode2Form2,

	/// # DVD (And Friends).
	Dvd,
}

impl TrackMode {
	#[must_use]
	/// # Raw Bytes Per Sector.
	pub const fn raw_size(self) -> u16 {
		if matches!(self, Self::Dvd) { 2048 } else { SECTOR_RAW_CD }
	}

	#[must_use]
	/// # Cooked (User Data) Bytes Per Sector.
	pub const fn cooked_size(self) -> u16 {
		match self {
			Self::Audio => 2352,
			Self::Mode1 | Self::Mode2Form1 | Self::Dvd => 2048,
			Self::Mode2 => 2336,
			Self::Mode2Form2 => 2324,
		}
	}

	#[must_use]
	/// # Cooked Data Range.
	///
	/// `(offset, length)` of the user data within a raw sector.
	pub const fn cooked_range(self) -> (u16, u16) {
		match self {
			Self::Audio | Self::Dvd => (0, self.cooked_size()),
			Self::Mode1 | Self::Mode2 => (16, self.cooked_size()),
			Self::Mode2Form1 | Self::Mode2Form2 => (24, self.cooked_size()),
		}
	}

	/// # Tag Range.
	///
	/// `(offset, length)` of a structural tag within a raw sector.
	///
	/// ## Errors
	///
	/// Returns [`DumpError::SectorTagNotPresent`] when this mode simply has
	/// no such field. (Subchannel is not part of the raw sector; it is
	/// resolved by the caller from the track's subchannel kind.)
	pub const fn tag_range(self, tag: SectorTagKind) -> Result<(u16, u16), DumpError> {
		use SectorTagKind as T;

		let out = match (self, tag) {
			(Self::Mode1 | Self::Mode2 | Self::Mode2Form1 | Self::Mode2Form2, T::Sync) => (0, 12),
			(Self::Mode1 | Self::Mode2 | Self::Mode2Form1 | Self::Mode2Form2, T::Header) => (12, 4),
			(Self::Mode2Form1 | Self::Mode2Form2, T::Subheader) => (16, 8),
			(Self::Mode1, T::Edc) => (2064, 4),
			(Self::Mode2Form1, T::Edc) => (2072, 4),
			(Self::Mode2Form2, T::Edc) => (2348, 4),
			(Self::Mode1 | Self::Mode2Form1, T::Ecc) => (2076, 276),
			(Self::Mode1 | Self::Mode2Form1, T::EccP) => (2076, 172),
			(Self::Mode1 | Self::Mode2Form1, T::EccQ) => (2248, 104),
			_ => return Err(DumpError::SectorTagNotPresent(tag)),
		};
		Ok(out)
	}
}



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Subchannel Arrangement.
///
/// How (and whether) per-sector subchannel data trails the raw sector in
/// the backing file.
pub enum SubchannelKind {
	#[default]
	/// # No Subchannel.
	None,

	/// # Sixteen-Byte Formatted Q.
	Q16Interleaved,

	/// # Ninety-Six-Byte Packed.
	PackedInterleaved,
}

impl SubchannelKind {
	#[must_use]
	/// # Trailing Width (Bytes).
	pub const fn width(self) -> u16 {
		match self {
			Self::None => 0,
			Self::Q16Interleaved => SUBCHANNEL_Q16,
			Self::PackedInterleaved => SUBCHANNEL_PACKED,
		}
	}

	/// # From an On-Disk Stride Delta.
	///
	/// Container formats rarely announce subchannel explicitly; it falls
	/// out of `bytes_per_sector_on_disk − 2352`.
	///
	/// ## Errors
	///
	/// Any delta other than 0/16/96 means the file cannot be what it
	/// claims.
	pub fn from_delta(delta: u32) -> Result<Self, DumpError> {
		match delta {
			0 => Ok(Self::None),
			16 => Ok(Self::Q16Interleaved),
			96 => Ok(Self::PackedInterleaved),
			n => Err(DumpError::Format(format!("impossible subchannel width ({n})"))),
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
/// # Sector Tag Kind.
///
/// The per-sector structural fields a reader can slice out of a raw sector
/// (or its trailing subchannel).
pub enum SectorTagKind {
	/// # Twelve-Byte Sync.
	Sync,

	/// # Four-Byte Header.
	Header,

	/// # Eight-Byte Mode 2 Subheader.
	Subheader,

	/// # Error Detection Code.
	Edc,

	/// # Error Correction (P and Q Together).
	Ecc,

	/// # Error Correction, P Vector.
	EccP,

	/// # Error Correction, Q Vector.
	EccQ,

	/// # Subchannel.
	Subchannel,
}

impl fmt::Display for SectorTagKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Sync => "sync",
			Self::Header => "header",
			Self::Subheader => "subheader",
			Self::Edc => "EDC",
			Self::Ecc => "ECC",
			Self::EccP => "ECC-P",
			Self::EccQ => "ECC-Q",
			Self::Subchannel => "subchannel",
		})
	}
}



/// # Data File Handle.
///
/// Tracks reference their backing file by arena index; the image owns the
/// arena.
pub type DataFileId = usize;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Track.
pub struct Track {
	/// # Track Number.
	pub sequence: u16,

	/// # Owning Session.
	pub session: u8,

	/// # Mode.
	pub mode: TrackMode,

	/// # First LBA.
	pub start: u64,

	/// # Last LBA (Inclusive).
	pub end: u64,

	/// # Pregap (Sectors).
	pub pregap: u64,

	/// # Raw Bytes Per Sector.
	pub raw_bps: u16,

	/// # Cooked Bytes Per Sector.
	pub cooked_bps: u16,

	/// # Subchannel Arrangement.
	pub subchannel: SubchannelKind,

	/// # Byte Offset Into the Backing File.
	pub file_offset: u64,

	/// # Backing File.
	pub file: DataFileId,
}

impl Track {
	#[must_use]
	/// # Contains an LBA?
	pub const fn contains(&self, lba: u64) -> bool {
		self.start <= lba && lba <= self.end
	}

	#[must_use]
	/// # Sector Count.
	pub const fn blocks(&self) -> u64 { self.end - self.start + 1 }

	#[must_use]
	/// # On-Disk Stride (Bytes Per Stored Sector).
	pub const fn stride(&self) -> u64 {
		self.raw_bps as u64 + self.subchannel.width() as u64
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Session.
pub struct Session {
	/// # Session Number.
	pub sequence: u16,

	/// # First Track Number.
	pub first_track: u16,

	/// # Last Track Number.
	pub last_track: u16,

	/// # Lead-In Position.
	pub start: i64,

	/// # Lead-Out Position.
	pub end: i64,
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Partition.
///
/// A contiguous LBA range within one track, with its byte offset into the
/// cooked image, the unit filesystem probing works in.
pub struct Partition {
	/// # Partition Sequence.
	pub sequence: u16,

	/// # Owning Track Number.
	pub track: u16,

	/// # First LBA.
	pub start: u64,

	/// # Sector Count.
	pub blocks: u64,

	/// # Byte Offset Into the Image.
	pub byte_offset: u64,

	/// # Size In Bytes.
	pub bytes: u64,
}
