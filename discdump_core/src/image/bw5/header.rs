/*!
# Disc Dump: BW5 Header
*/

use crate::DumpError;
use super::cursor::Cursor;



/// # Container Signature.
pub(super) const SIGNATURE: [u8; 12] = *b"BWT5 STREAM\0";

/// # Header Size.
pub(super) const HEADER_SIZE: usize = 260;

/// # DVD Structure Block Size.
///
/// DMI (2050 bytes) followed by PFI (2048 bytes) at offset 0x802.
pub(super) const DVD_STRUCTURE_SIZE: usize = 0x802 + 2048;

/// # PFI Offset Within the Structure Block.
pub(super) const DVD_PFI_OFFSET: usize = 0x802;



#[derive(Debug, Clone, Copy)]
/// # Parsed Header.
///
/// The fixed 260-byte preamble: signature, the recorded MMC profile, the
/// session count, and the lengths of every embedded blob that follows.
pub(super) struct Header {
	/// # Recorded MMC Profile.
	pub(super) profile: u16,

	/// # Session Count.
	pub(super) sessions: u32,

	/// # MODE PAGE 2Ah Blob Length.
	pub(super) mode2a_len: usize,

	/// # Unidentified Vendor Blob Length.
	pub(super) unknown_len: usize,

	/// # PMA Length (Sans Prefix).
	pub(super) pma_len: usize,

	/// # ATIP Length (Sans Prefix).
	pub(super) atip_len: usize,

	/// # CD-Text Length (Sans Prefix).
	pub(super) cdtext_len: usize,

	/// # BCA Length.
	pub(super) bca_len: usize,

	/// # DVD Structure Block Length.
	pub(super) dvd_structures_len: usize,

	/// # CD Disc-Info Length.
	pub(super) cd_info_len: usize,

	/// # DVD Disc-Info Length.
	pub(super) dvd_info_len: usize,
}

impl Header {
	#[expect(clippy::cast_possible_truncation, reason = "Masked first.")]
	/// # Parse.
	///
	/// ## Errors
	///
	/// Returns a format error on a bad signature, short file, or an
	/// impossible session count.
	pub(super) fn parse(cur: &mut Cursor<'_>) -> Result<Self, DumpError> {
		let sig = cur.take(SIGNATURE.len())?;
		if sig != SIGNATURE {
			return Err(DumpError::Format("bad container signature".to_owned()));
		}

		let _version = cur.u32()?;
		let profile = cur.u32()?;
		let sessions = cur.u32()?;

		let out = Self {
			profile: (profile & 0xFFFF) as u16,
			sessions,
			mode2a_len: cur.u32()? as usize,
			unknown_len: cur.u32()? as usize,
			pma_len: cur.u32()? as usize,
			atip_len: cur.u32()? as usize,
			cdtext_len: cur.u32()? as usize,
			bca_len: cur.u32()? as usize,
			dvd_structures_len: cur.u32()? as usize,
			cd_info_len: cur.u32()? as usize,
			dvd_info_len: cur.u32()? as usize,
		};

		// The rest of the 260 bytes is unknown filler.
		cur.skip(HEADER_SIZE - cur.pos())?;

		if out.sessions == 0 || 99 < out.sessions {
			return Err(DumpError::Format(format!("impossible session count ({})", out.sessions)));
		}
		if out.dvd_structures_len != 0 && out.dvd_structures_len != DVD_STRUCTURE_SIZE {
			return Err(DumpError::Format(format!(
				"impossible DVD structure length ({})", out.dvd_structures_len,
			)));
		}

		Ok(out)
	}
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Minimal Valid Header Bytes.
	fn sample_header(profile: u16, sessions: u32) -> Vec<u8> {
		let mut out = Vec::with_capacity(HEADER_SIZE);
		out.extend_from_slice(&SIGNATURE);
		out.extend_from_slice(&5_u32.to_le_bytes());                  // Version.
		out.extend_from_slice(&u32::from(profile).to_le_bytes());
		out.extend_from_slice(&sessions.to_le_bytes());
		for _ in 0..9 { out.extend_from_slice(&0_u32.to_le_bytes()); } // Blob lengths.
		out.resize(HEADER_SIZE, 0);
		out
	}

	#[test]
	fn t_header() {
		let raw = sample_header(0x0008, 1);
		let mut cur = Cursor::new(&raw);
		let header = Header::parse(&mut cur).unwrap();
		assert_eq!(header.profile, 0x0008);
		assert_eq!(header.sessions, 1);
		assert_eq!(header.mode2a_len, 0);
		assert_eq!(cur.pos(), HEADER_SIZE);
	}

	#[test]
	fn t_header_bad() {
		// Wrong signature.
		let mut raw = sample_header(0x0008, 1);
		raw[0] = b'X';
		assert!(Header::parse(&mut Cursor::new(&raw)).is_err());

		// Zero sessions.
		let raw = sample_header(0x0008, 0);
		assert!(Header::parse(&mut Cursor::new(&raw)).is_err());

		// Truncated.
		let raw = sample_header(0x0008, 1);
		assert!(Header::parse(&mut Cursor::new(&raw[..100])).is_err());
	}
}
