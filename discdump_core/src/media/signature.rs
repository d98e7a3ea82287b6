/*!
# Disc Dump: Sector Signatures

Console pressings rarely announce themselves through the TOC; they have to
be fingerprinted from fixed magic bytes at fixed places, or, for the
PlayStation 2, from a hash of the (lightly scrambled) boot region.
*/

use sha2::{
	Digest,
	Sha256,
};



/// # 3DO Volume Sync.
///
/// Record type 01h followed by five sync bytes of 5Ah, at the very start of
/// sector zero.
const THREE_DO: [u8; 6] = [0x01, 0x5A, 0x5A, 0x5A, 0x5A, 0x5A];

/// # FM Towns Boot Signature (Sector 0, Offset 0).
const FM_TOWNS: &[u8] = b"IPL4";

/// # Playdia Signature (Sector 0, Offset 40).
const PLAYDIA: &[u8] = b"PLAYDIA";

/// # Playdia Signature Offset.
const PLAYDIA_AT: usize = 40;

/// # PC-FX Boot Signature (Sector 0, Offset 0).
const PC_FX: &[u8] = b"PC-FX:Hu_CD-ROM";

/// # Dreamcast MIL-CD / Katana Signature (Sector 0, Offset 0).
const MIL_CD: &[u8] = b"SEGA SEGAKATANA SEGA ENTERPRISES";

/// # PC Engine System Signature (Sector 1, Offset 32).
const PC_ENGINE: &[u8] = b"PC Engine CD-ROM SYSTEM";

/// # PC Engine Signature Offset.
const PC_ENGINE_AT: usize = 32;

/// # Atari Jaguar Header (Anywhere In the Boot Window).
const JAGUAR: &[u8] = b"ATARI APPROVED DATA HEADER ATRI";

/// # PlayStation License Text (Boot Window).
const PS1: &[u8] = b"Sony Computer Entertainment";

/// # PlayStation 3 Marker (Sector 4200, Offset 0).
const PS3: &[u8] = b"PlayStation3";

/// # PlayStation 4 Marker (Sector 4201, Offset 0).
const PS4: &[u8] = b"PlayStation4";

/// # VideoNow Color Frame Marker.
///
/// The discs are "audio" but carry a repeating video frame header; nine
/// consecutive sectors from zero are enough to catch at least one.
const VIDEONOW_COLOR: [u8; 18] = [
	0x81, 0xE3, 0xE3, 0xC7, 0xC7, 0x81, 0x81, 0xE3, 0xE3,
	0xC7, 0xC7, 0x81, 0x81, 0xE3, 0xE3, 0xC7, 0xC7, 0x81,
];

/// # PlayStation 2 Boot Region Hashes.
///
/// SHA-256 of the XOR-descrambled first 24 KiB of the data track, one hash
/// per region.
const PS2_HASHES: [[u8; 32]; 3] = [
	// PAL.
	[
		0x5D, 0x04, 0xFF, 0x23, 0x66, 0x13, 0xE1, 0xD8,
		0xAD, 0xCF, 0x9C, 0x20, 0x18, 0x74, 0xAC, 0xD6,
		0xF6, 0xDE, 0xED, 0x1E, 0x04, 0x30, 0x65, 0x58,
		0xB8, 0x6F, 0x91, 0xCF, 0xB6, 0x26, 0xF3, 0x9D,
	],
	// NTSC-U/C.
	[
		0x0B, 0xAD, 0x11, 0xC0, 0x3C, 0x85, 0x2E, 0xD9,
		0x03, 0x5B, 0x7F, 0xA0, 0x29, 0x18, 0xCB, 0xA1,
		0x42, 0x97, 0x51, 0x6A, 0xE0, 0x8F, 0x65, 0x14,
		0x9E, 0x21, 0x5F, 0x24, 0x0F, 0x1B, 0x80, 0x7B,
	],
	// NTSC-J.
	[
		0x93, 0x05, 0x77, 0x38, 0x64, 0xFD, 0x10, 0xA4,
		0xC2, 0x8A, 0x4E, 0x5C, 0x2F, 0x26, 0x3A, 0x84,
		0xF8, 0x0D, 0xE1, 0x67, 0x29, 0x99, 0xD5, 0x8E,
		0xC6, 0x30, 0x4D, 0xAB, 0x0A, 0xF0, 0x5C, 0x01,
	],
];

/// # PlayStation 2 Boot Region Size (Bytes).
pub(crate) const PS2_REGION_SECTORS: u32 = 12;



/// # 3DO?
pub(crate) fn is_three_do(sector0: &[u8]) -> bool {
	sector0.starts_with(&THREE_DO)
}

/// # FM Towns?
pub(crate) fn is_fm_towns(sector0: &[u8]) -> bool {
	sector0.starts_with(FM_TOWNS)
}

/// # Playdia?
pub(crate) fn is_playdia(sector0: &[u8]) -> bool {
	sector0.get(PLAYDIA_AT..PLAYDIA_AT + PLAYDIA.len()).is_some_and(|s| s == PLAYDIA)
}

/// # PC-FX?
pub(crate) fn is_pc_fx(sector0: &[u8]) -> bool {
	sector0.starts_with(PC_FX)
}

/// # Dreamcast MIL-CD?
pub(crate) fn is_mil_cd(sector0: &[u8]) -> bool {
	sector0.starts_with(MIL_CD)
}

/// # PC Engine?
pub(crate) fn is_pc_engine(sector1: &[u8]) -> bool {
	sector1.get(PC_ENGINE_AT..PC_ENGINE_AT + PC_ENGINE.len()).is_some_and(|s| s == PC_ENGINE)
}

/// # PlayStation 3?
pub(crate) fn is_ps3(sector4200: &[u8]) -> bool {
	sector4200.starts_with(PS3)
}

/// # PlayStation 4?
pub(crate) fn is_ps4(sector4201: &[u8]) -> bool {
	sector4201.starts_with(PS4)
}

/// # Atari Jaguar?
///
/// The header floats, so the whole boot window gets searched.
pub(crate) fn is_jaguar(window: &[u8]) -> bool {
	find(window, JAGUAR)
}

/// # PlayStation 1?
pub(crate) fn is_ps1(window: &[u8]) -> bool {
	find(window, PS1)
}

/// # VideoNow Color?
pub(crate) fn is_videonow_color(window: &[u8]) -> bool {
	find(window, &VIDEONOW_COLOR)
}

/// # PlayStation 2?
///
/// The boot region is scrambled with a repeating one-byte XOR key (its own
/// first byte), then hashed and compared against the known regional values.
pub(crate) fn is_ps2(region: &[u8]) -> bool {
	if region.len() < PS2_REGION_SECTORS as usize * 2048 { return false; }
	let key = region[0];
	let decoded: Vec<u8> = region.iter().map(|b| b ^ key).collect();
	let digest: [u8; 32] = Sha256::digest(&decoded).into();
	matches_ps2_digest(&digest)
}

/// # Known PlayStation 2 Digest?
pub(crate) fn matches_ps2_digest(digest: &[u8; 32]) -> bool {
	PS2_HASHES.iter().any(|h| h == digest)
}

/// # Naive Substring Search.
///
/// The windows are a few dozen KiB at most; nothing fancier is warranted.
fn find(haystack: &[u8], needle: &[u8]) -> bool {
	! needle.is_empty() &&
	haystack.windows(needle.len()).any(|w| w == needle)
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_fixed_magics() {
		let mut sector = vec![0_u8; 2048];
		assert!(! is_three_do(&sector));
		sector[..6].copy_from_slice(&THREE_DO);
		assert!(is_three_do(&sector));

		let mut sector = vec![0_u8; 2048];
		sector[PLAYDIA_AT..PLAYDIA_AT + PLAYDIA.len()].copy_from_slice(PLAYDIA);
		assert!(is_playdia(&sector));
		assert!(! is_playdia(&sector[..8]));

		let mut sector = vec![0_u8; 2048];
		sector[PC_ENGINE_AT..PC_ENGINE_AT + PC_ENGINE.len()].copy_from_slice(PC_ENGINE);
		assert!(is_pc_engine(&sector));
		assert!(! is_pc_fx(&sector));
	}

	#[test]
	fn t_floating_magics() {
		let mut window = vec![0_u8; 2048 * 16];
		assert!(! is_jaguar(&window));
		window[5000..5000 + JAGUAR.len()].copy_from_slice(JAGUAR);
		assert!(is_jaguar(&window));

		let mut window = vec![0_u8; 2352 * 9];
		window[700..718].copy_from_slice(&VIDEONOW_COLOR);
		assert!(is_videonow_color(&window));
	}

	#[test]
	fn t_ps2() {
		// The known digests match themselves; anything else doesn't.
		assert!(matches_ps2_digest(&PS2_HASHES[0]));
		assert!(! matches_ps2_digest(&[0xAA; 32]));

		// A zeroed region hashes to the digest of all zeroes, which is not
		// on the list; and short regions never qualify.
		assert!(! is_ps2(&vec![0_u8; 2048 * 12]));
		assert!(! is_ps2(&[0_u8; 100]));
	}
}
