/*!
# Disc Dump: DVD Physical Format Information
*/

use super::MediaType;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Disk Category (Book Type).
pub enum DiskCategory {
	/// # DVD-ROM.
	DvdRom,

	/// # DVD-RAM.
	DvdRam,

	/// # DVD-R.
	DvdR,

	/// # DVD-RW.
	DvdRw,

	/// # HD DVD-ROM.
	HdDvdRom,

	/// # HD DVD-RAM.
	HdDvdRam,

	/// # HD DVD-R.
	HdDvdR,

	/// # DVD+RW.
	DvdPRw,

	/// # DVD+R.
	DvdPR,

	/// # DVD+RW Dual Layer.
	DvdPRwDl,

	/// # DVD+R Dual Layer.
	DvdPRDl,

	/// # Nintendo Pressing.
	Nintendo,

	/// # Anything Else.
	Reserved(u8),
}

impl DiskCategory {
	/// # From Nibble.
	const fn from_nibble(raw: u8) -> Self {
		match raw & 0x0F {
			0x00 => Self::DvdRom,
			0x01 => Self::DvdRam,
			0x02 => Self::DvdR,
			0x03 => Self::DvdRw,
			0x04 => Self::HdDvdRom,
			0x05 => Self::HdDvdRam,
			0x06 => Self::HdDvdR,
			0x09 => Self::DvdPRw,
			0x0A => Self::DvdPR,
			0x0D => Self::DvdPRwDl,
			0x0E => Self::DvdPRDl,
			0x0F => Self::Nintendo,
			n => Self::Reserved(n),
		}
	}
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Physical Disc Size.
pub enum DiscSize {
	/// # 120 mm.
	OneTwenty,

	/// # 80 mm.
	Eighty,

	/// # Reserved Encoding.
	Reserved(u8),
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Decoded PFI.
///
/// The handful of physical-format fields the engine consumes: the category
/// and part version drive media-type refinement, the PSN bounds drive the
/// Xbox geometry math.
pub struct Pfi {
	/// # Disk Category.
	pub category: DiskCategory,

	/// # Part Version.
	pub part_version: u8,

	/// # Disc Size.
	pub size: DiscSize,

	/// # Layer Count (1 or 2).
	pub layers: u8,

	/// # Data Area Start PSN.
	pub data_area_start: u32,

	/// # Data Area End PSN.
	pub data_area_end: u32,

	/// # Layer Zero End PSN.
	pub layer0_end: u32,
}

impl Pfi {
	/// # Parse.
	///
	/// `raw` is a READ DISC STRUCTURE payload including its four-byte
	/// header; the descriptor body starts at offset four. Returns `None`
	/// for anything too short.
	pub fn parse(raw: &[u8]) -> Option<Self> {
		let body = raw.get(4..20)?;

		let size = match body[1] >> 4 {
			0x00 => DiscSize::OneTwenty,
			0x01 => DiscSize::Eighty,
			n => DiscSize::Reserved(n),
		};

		Some(Self {
			category: DiskCategory::from_nibble(body[0] >> 4),
			part_version: body[0] & 0x0F,
			size,
			layers: ((body[2] >> 5) & 0x03) + 1,
			data_area_start: u32::from_be_bytes([0, body[5], body[6], body[7]]),
			data_area_end: u32::from_be_bytes([0, body[9], body[10], body[11]]),
			layer0_end: u32::from_be_bytes([0, body[13], body[14], body[15]]),
		})
	}

	#[must_use]
	/// # Refine a Profile-Derived Media Type.
	///
	/// The category/version/size triple knows things the profile does not,
	/// e.g. that a DVD-R is actually dual-layer, or that a "DVD-ROM" is a
	/// Nintendo pressing.
	pub fn refine(&self, media: MediaType) -> MediaType {
		match (self.category, self.part_version) {
			(DiskCategory::DvdR, 6) => MediaType::DvdRDl,
			(DiskCategory::DvdR, _) => MediaType::DvdR,
			(DiskCategory::DvdRw, 3) => MediaType::DvdRwDl,
			(DiskCategory::DvdRw, _) => MediaType::DvdRw,
			(DiskCategory::DvdRam, _) => MediaType::DvdRam,
			(DiskCategory::DvdPR, _) => MediaType::DvdPR,
			(DiskCategory::DvdPRw, _) => MediaType::DvdPRw,
			(DiskCategory::DvdPRDl, _) => MediaType::DvdPRDl,
			(DiskCategory::DvdPRwDl, _) => MediaType::DvdPRwDl,
			(DiskCategory::HdDvdRom, _) => MediaType::HdDvdRom,
			(DiskCategory::HdDvdR, _) => MediaType::HdDvdR,
			(DiskCategory::HdDvdRam, _) => MediaType::HdDvdRam,
			(DiskCategory::Nintendo, _) =>
				if matches!(self.size, DiscSize::Eighty) { MediaType::GameCubeDisc }
				else { MediaType::WiiDisc },
			_ => media,
		}
	}
}
