/*!
# Disc Dump: Tape Media Tables
*/

use super::MediaType;



/// # Known Tape Formats.
///
/// `(density_code, medium_type, media)` rows, matched against the MODE
/// SENSE header and block descriptor. A `medium_type` of zero in the table
/// is a wildcard; drives are wildly inconsistent about reporting it.
const TAPE_TABLE: [(u8, u8, MediaType); 10] = [
	(0x24, 0x00, MediaType::Dds2),
	(0x25, 0x00, MediaType::Dds3),
	(0x26, 0x00, MediaType::Dds4),
	(0x47, 0x00, MediaType::Dat72),
	(0x40, 0x18, MediaType::Lto1),
	(0x42, 0x28, MediaType::Lto2),
	(0x44, 0x38, MediaType::Lto3),
	(0x46, 0x48, MediaType::Lto4),
	(0x58, 0x58, MediaType::Lto5),
	(0x5A, 0x68, MediaType::Lto6),
];



/// # Classify From MODE SENSE (6).
///
/// The medium type sits at byte one of the header; the density code is the
/// first byte of the (first) block descriptor, if present. Returns
/// [`MediaType::UnknownTape`] for anything off the map.
pub(crate) fn media_from_mode_sense(data: &[u8]) -> MediaType {
	if data.len() < 4 { return MediaType::UnknownTape; }
	let medium_type = data[1];
	let descriptor_len = usize::from(data[3]);

	let density =
		if 8 <= descriptor_len { data.get(4).copied() }
		else { None };

	let Some(density) = density else { return MediaType::UnknownTape; };

	for (d, m, media) in TAPE_TABLE {
		if d == density && (m == 0 || m == medium_type) { return media; }
	}
	MediaType::UnknownTape
}

/// # Block Size From MODE SENSE (6).
///
/// The block length rides in the last three bytes of the block descriptor.
/// Zero means variable-length; `None` means no descriptor at all.
pub(crate) fn block_size_from_mode_sense(data: &[u8]) -> Option<u32> {
	if data.len() < 12 || usize::from(data[3]) < 8 { None }
	else {
		Some(u32::from_be_bytes([0, data[9], data[10], data[11]]))
	}
}
