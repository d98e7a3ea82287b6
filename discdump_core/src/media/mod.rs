/*!
# Disc Dump: Media Types and Tags
*/

pub(crate) mod identify;
pub(crate) mod pfi;
pub(crate) mod profile;
pub(crate) mod signature;
pub(crate) mod tape;

use std::collections::HashMap;
use std::fmt;



/// # Media Tag Map.
///
/// Each tag kind appears at most once per medium/image.
pub type TagMap = HashMap<MediaTagKind, Vec<u8>, ahash::RandomState>;



#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
/// # Canonical Media Type.
///
/// What the identification cascade ultimately assigns to a loaded medium.
/// The list is deliberately coarser than the universe of real products;
/// entries exist because something downstream (pipeline choice, sector
/// geometry, reporting) actually branches on them.
pub enum MediaType {
	/// # Unidentified.
	Unknown,

	// CD family.
	// ---------------

	/// # Generic/Unspecified CD.
	Cd,

	/// # Audio CD.
	Cdda,

	/// # CD-ROM (Mode 1).
	CdRom,

	/// # CD-ROM XA.
	CdRomXa,

	/// # CD-Interactive.
	CdI,

	/// # CD-Plus (Enhanced CD).
	CdPlus,

	/// # CD-R.
	CdR,

	/// # CD-RW.
	CdRw,

	/// # VideoNow Color.
	VideoNowColor,

	// DVD/HD DVD family.
	// ---------------

	/// # DVD-ROM.
	DvdRom,

	/// # DVD-R.
	DvdR,

	/// # DVD-R Dual Layer.
	DvdRDl,

	/// # DVD-RW.
	DvdRw,

	/// # DVD-RW Dual Layer.
	DvdRwDl,

	/// # DVD+R.
	DvdPR,

	/// # DVD+R Dual Layer.
	DvdPRDl,

	/// # DVD+RW.
	DvdPRw,

	/// # DVD+RW Dual Layer.
	DvdPRwDl,

	/// # DVD-RAM.
	DvdRam,

	/// # HD DVD-ROM.
	HdDvdRom,

	/// # HD DVD-R.
	HdDvdR,

	/// # HD DVD-RAM.
	HdDvdRam,

	/// # HD DVD-RW.
	HdDvdRw,

	// Blu-ray family.
	// ---------------

	/// # BD-ROM.
	BdRom,

	/// # BD-R.
	BdR,

	/// # BD-RE.
	BdRe,

	// Console pressings.
	// ---------------

	/// # 3DO CD.
	ThreeDo,

	/// # FM Towns CD.
	FmTowns,

	/// # Bandai Playdia.
	Playdia,

	/// # PC Engine CD-ROM².
	PcEngineCd,

	/// # NEC PC-FX.
	PcFx,

	/// # Atari Jaguar CD.
	JaguarCd,

	/// # Dreamcast MIL-CD.
	MilCd,

	/// # PlayStation CD.
	Ps1Cd,

	/// # PlayStation 2 CD.
	Ps2Cd,

	/// # PlayStation 2 DVD.
	Ps2Dvd,

	/// # PlayStation 3 DVD.
	Ps3Dvd,

	/// # PlayStation 3 Blu-ray.
	Ps3Bd,

	/// # PlayStation 4 Blu-ray.
	Ps4Bd,

	/// # Nintendo GameCube Disc.
	GameCubeDisc,

	/// # Nintendo Wii Disc.
	WiiDisc,

	/// # Xbox Game Disc (First Generation).
	Xgd1,

	/// # Xbox Game Disc 2.
	Xgd2,

	/// # Xbox Game Disc 3.
	Xgd3,

	// Tape.
	// ---------------

	/// # DDS-2 Cartridge.
	Dds2,

	/// # DDS-3 Cartridge.
	Dds3,

	/// # DDS-4 Cartridge.
	Dds4,

	/// # DAT-72 Cartridge.
	Dat72,

	/// # LTO Ultrium 1.
	Lto1,

	/// # LTO Ultrium 2.
	Lto2,

	/// # LTO Ultrium 3.
	Lto3,

	/// # LTO Ultrium 4.
	Lto4,

	/// # LTO Ultrium 5.
	Lto5,

	/// # LTO Ultrium 6.
	Lto6,

	/// # Unidentified Tape.
	UnknownTape,

	// Solid state / generic.
	// ---------------

	/// # USB Flash Drive.
	FlashDrive,

	/// # Generic Block Device.
	GenericBlock,
}

impl fmt::Display for MediaType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl MediaType {
	#[must_use]
	/// # As String Slice.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Unknown => "unknown",
			Self::Cd => "CD",
			Self::Cdda => "CD-DA",
			Self::CdRom => "CD-ROM",
			Self::CdRomXa => "CD-ROM XA",
			Self::CdI => "CD-i",
			Self::CdPlus => "CD+",
			Self::CdR => "CD-R",
			Self::CdRw => "CD-RW",
			Self::VideoNowColor => "VideoNow Color",
			Self::DvdRom => "DVD-ROM",
			Self::DvdR => "DVD-R",
			Self::DvdRDl => "DVD-R DL",
			Self::DvdRw => "DVD-RW",
			Self::DvdRwDl => "DVD-RW DL",
			Self::DvdPR => "DVD+R",
			Self::DvdPRDl => "DVD+R DL",
			Self::DvdPRw => "DVD+RW",
			Self::DvdPRwDl => "DVD+RW DL",
			Self::DvdRam => "DVD-RAM",
			Self::HdDvdRom => "HD DVD-ROM",
			Self::HdDvdR => "HD DVD-R",
			Self::HdDvdRam => "HD DVD-RAM",
			Self::HdDvdRw => "HD DVD-RW",
			Self::BdRom => "BD-ROM",
			Self::BdR => "BD-R",
			Self::BdRe => "BD-RE",
			Self::ThreeDo => "3DO CD",
			Self::FmTowns => "FM Towns CD",
			Self::Playdia => "Playdia CD",
			Self::PcEngineCd => "PC Engine CD",
			Self::PcFx => "PC-FX CD",
			Self::JaguarCd => "Atari Jaguar CD",
			Self::MilCd => "Dreamcast MIL-CD",
			Self::Ps1Cd => "PlayStation CD",
			Self::Ps2Cd => "PlayStation 2 CD",
			Self::Ps2Dvd => "PlayStation 2 DVD",
			Self::Ps3Dvd => "PlayStation 3 DVD",
			Self::Ps3Bd => "PlayStation 3 BD",
			Self::Ps4Bd => "PlayStation 4 BD",
			Self::GameCubeDisc => "GameCube Game Disc",
			Self::WiiDisc => "Wii Optical Disc",
			Self::Xgd1 => "Xbox Game Disc",
			Self::Xgd2 => "Xbox Game Disc 2",
			Self::Xgd3 => "Xbox Game Disc 3",
			Self::Dds2 => "DDS-2",
			Self::Dds3 => "DDS-3",
			Self::Dds4 => "DDS-4",
			Self::Dat72 => "DAT-72",
			Self::Lto1 => "LTO-1",
			Self::Lto2 => "LTO-2",
			Self::Lto3 => "LTO-3",
			Self::Lto4 => "LTO-4",
			Self::Lto5 => "LTO-5",
			Self::Lto6 => "LTO-6",
			Self::UnknownTape => "unknown tape",
			Self::FlashDrive => "flash drive",
			Self::GenericBlock => "block device",
		}
	}

	#[must_use]
	/// # CD Family?
	pub const fn is_cd(self) -> bool {
		matches!(
			self,
			Self::Cd | Self::Cdda | Self::CdRom | Self::CdRomXa | Self::CdI |
			Self::CdPlus | Self::CdR | Self::CdRw | Self::VideoNowColor |
			Self::ThreeDo | Self::FmTowns | Self::Playdia | Self::PcEngineCd |
			Self::PcFx | Self::JaguarCd | Self::MilCd | Self::Ps1Cd | Self::Ps2Cd
		)
	}

	#[must_use]
	/// # DVD/HD DVD Family?
	pub const fn is_dvd(self) -> bool {
		matches!(
			self,
			Self::DvdRom | Self::DvdR | Self::DvdRDl | Self::DvdRw |
			Self::DvdRwDl | Self::DvdPR | Self::DvdPRDl | Self::DvdPRw |
			Self::DvdPRwDl | Self::DvdRam | Self::HdDvdRom | Self::HdDvdR |
			Self::HdDvdRam | Self::HdDvdRw | Self::Ps2Dvd | Self::Ps3Dvd |
			Self::GameCubeDisc | Self::WiiDisc | Self::Xgd1 | Self::Xgd2 |
			Self::Xgd3
		)
	}

	#[must_use]
	/// # Optical At All?
	pub const fn is_optical(self) -> bool {
		self.is_cd() || self.is_dvd() ||
		matches!(
			self,
			Self::BdRom | Self::BdR | Self::BdRe | Self::Ps3Bd | Self::Ps4Bd
		)
	}

	#[must_use]
	/// # Xbox Game Disc?
	pub const fn is_xgd(self) -> bool {
		matches!(self, Self::Xgd1 | Self::Xgd2 | Self::Xgd3)
	}

	#[must_use]
	/// # Tape?
	pub const fn is_tape(self) -> bool {
		matches!(
			self,
			Self::Dds2 | Self::Dds3 | Self::Dds4 | Self::Dat72 |
			Self::Lto1 | Self::Lto2 | Self::Lto3 | Self::Lto4 |
			Self::Lto5 | Self::Lto6 | Self::UnknownTape
		)
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
/// # Media Tag Kind.
///
/// Blobs published by the drive (or stored in an image) that describe the
/// medium as a whole rather than any particular sector.
pub enum MediaTagKind {
	/// # CD Program Memory Area.
	CdPma,

	/// # CD Absolute Time In Pregroove.
	CdAtip,

	/// # CD-Text.
	CdText,

	/// # CD Full (Raw) TOC.
	CdFullToc,

	/// # CD Media Catalogue Number.
	CdMcn,

	/// # DVD Physical Format Information.
	DvdPfi,

	/// # DVD Disc Manufacturing Information.
	DvdDmi,

	/// # DVD Copyright Information.
	DvdCmi,

	/// # DVD Burst Cutting Area.
	DvdBca,

	/// # Blu-ray Disc Information.
	BdDi,

	/// # Xbox Security Sector.
	XboxSecuritySector,

	/// # SCSI MODE PAGE 2Ah.
	ScsiModePage2A,

	/// # Full MODE SENSE (6) Response.
	ScsiModeSense6,

	/// # Full MODE SENSE (10) Response.
	ScsiModeSense10,
}

impl fmt::Display for MediaTagKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::CdPma => "PMA",
			Self::CdAtip => "ATIP",
			Self::CdText => "CD-Text",
			Self::CdFullToc => "full TOC",
			Self::CdMcn => "MCN",
			Self::DvdPfi => "PFI",
			Self::DvdDmi => "DMI",
			Self::DvdCmi => "CMI",
			Self::DvdBca => "BCA",
			Self::BdDi => "disc information",
			Self::XboxSecuritySector => "security sector",
			Self::ScsiModePage2A => "MODE PAGE 2Ah",
			Self::ScsiModeSense6 => "MODE SENSE (6)",
			Self::ScsiModeSense10 => "MODE SENSE (10)",
		})
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_families() {
		assert!(MediaType::CdR.is_cd());
		assert!(MediaType::CdR.is_optical());
		assert!(! MediaType::CdR.is_dvd());

		assert!(MediaType::Xgd3.is_dvd());
		assert!(MediaType::Xgd3.is_xgd());
		assert!(! MediaType::DvdRom.is_xgd());

		assert!(MediaType::Lto5.is_tape());
		assert!(! MediaType::Lto5.is_optical());

		assert!(MediaType::Ps3Bd.is_optical());
		assert!(! MediaType::FlashDrive.is_optical());
	}
}
