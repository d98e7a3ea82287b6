/*!
# Disc Dump: Sense Decoding

Somewhat useful documentation:
<https://www.t10.org/lists/2sensekey.htm>
*/

use std::fmt;



/// # Minimum Fixed-Format Length.
///
/// Fixed-format sense data is only trustworthy through the additional sense
/// code qualifier, which sits at byte 13.
const FIXED_MIN: usize = 14;

/// # Minimum Descriptor-Format Length.
const DESC_MIN: usize = 8;



#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
/// # Sense Key.
///
/// The four-bit sense key nibble, straight out of SPC. Vendor-specific and
/// reserved values are lumped into [`SenseKey::Reserved`].
pub enum SenseKey {
	/// # No Sense.
	NoSense,

	/// # Recovered Error.
	Recovered,

	/// # Not Ready.
	NotReady,

	/// # Medium Error.
	MediumError,

	/// # Hardware Error.
	HardwareError,

	/// # Illegal Request.
	IllegalRequest,

	/// # Unit Attention.
	UnitAttention,

	/// # Data Protect.
	DataProtect,

	/// # Blank Check.
	BlankCheck,

	/// # Vendor Specific.
	VendorSpecific,

	/// # Copy Aborted.
	CopyAborted,

	/// # Aborted Command.
	AbortedCommand,

	/// # Volume Overflow.
	VolumeOverflow,

	/// # Miscompare.
	Miscompare,

	/// # Completed.
	Completed,

	/// # Reserved.
	Reserved,
}

impl fmt::Display for SenseKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::NoSense => "NO SENSE",
			Self::Recovered => "RECOVERED ERROR",
			Self::NotReady => "NOT READY",
			Self::MediumError => "MEDIUM ERROR",
			Self::HardwareError => "HARDWARE ERROR",
			Self::IllegalRequest => "ILLEGAL REQUEST",
			Self::UnitAttention => "UNIT ATTENTION",
			Self::DataProtect => "DATA PROTECT",
			Self::BlankCheck => "BLANK CHECK",
			Self::VendorSpecific => "VENDOR SPECIFIC",
			Self::CopyAborted => "COPY ABORTED",
			Self::AbortedCommand => "ABORTED COMMAND",
			Self::VolumeOverflow => "VOLUME OVERFLOW",
			Self::Miscompare => "MISCOMPARE",
			Self::Completed => "COMPLETED",
			Self::Reserved => "RESERVED",
		})
	}
}

impl SenseKey {
	#[must_use]
	/// # From Nibble.
	///
	/// Only the low four bits are considered.
	pub const fn from_nibble(raw: u8) -> Self {
		match raw & 0x0F {
			0x00 => Self::NoSense,
			0x01 => Self::Recovered,
			0x02 => Self::NotReady,
			0x03 => Self::MediumError,
			0x04 => Self::HardwareError,
			0x05 => Self::IllegalRequest,
			0x06 => Self::UnitAttention,
			0x07 => Self::DataProtect,
			0x08 => Self::BlankCheck,
			0x09 => Self::VendorSpecific,
			0x0A => Self::CopyAborted,
			0x0B => Self::AbortedCommand,
			0x0D => Self::VolumeOverflow,
			0x0E => Self::Miscompare,
			0x0F => Self::Completed,
			_ => Self::Reserved,
		}
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Sense Classification.
///
/// The coarse buckets the dump pipelines and the media identifier actually
/// branch on. Classification looks only at `(key, asc, ascq)` so hitting the
/// same buffer twice always produces the same answer.
pub enum SenseClass {
	/// # All Good (Or Merely Recovered).
	Good,

	/// # Becoming Ready (02h/04h/01h).
	BecomingReady,

	/// # No Medium Present (02h/3Ah/xx).
	NoMedium,

	/// # Power-On/Reset Unit Attention (06h/29h/xx).
	Reset,

	/// # Blank Medium/Region.
	Blank,

	/// # The Drive Rejected the Command.
	Illegal,

	/// # Unreadable Medium Region.
	MediumError,

	/// # The Drive Itself Is Failing.
	Hardware,

	/// # Anything Else.
	Other,
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Decoded Sense.
///
/// A projection of a SCSI sense buffer, fixed or descriptor format, onto
/// the handful of fields the engine cares about. Pipelines never touch raw
/// sense bytes; they branch on this record (or its [`SenseClass`]).
pub struct Sense {
	/// # Sense Key.
	pub key: SenseKey,

	/// # Additional Sense Code.
	pub asc: u8,

	/// # Additional Sense Code Qualifier.
	pub ascq: u8,

	/// # Information Field (If Flagged Valid).
	pub info: Option<u32>,

	/// # Incorrect Length Indicator.
	pub ili: bool,

	/// # End of Medium.
	pub eom: bool,

	/// # Filemark.
	pub filemark: bool,
}

impl Sense {
	/// # Parse a Sense Buffer.
	///
	/// Accepts fixed-format (70h/71h) buffers of at least fourteen bytes, and
	/// descriptor-format (72h/73h) buffers, projecting the latter onto the
	/// same record. Returns `None` for anything shorter or stranger.
	pub fn parse(raw: &[u8]) -> Option<Self> {
		match raw.first().map(|b| b & 0x7F)? {
			0x70 | 0x71 if FIXED_MIN <= raw.len() => Some(Self::parse_fixed(raw)),
			0x72 | 0x73 if DESC_MIN <= raw.len() => Some(Self::parse_descriptor(raw)),
			_ => None,
		}
	}

	/// # Parse (Fixed Format).
	///
	/// Fields sit at the standard SPC offsets: flags and key at byte 2,
	/// information at 3–6, ASC at 12, ASCQ at 13.
	fn parse_fixed(raw: &[u8]) -> Self {
		let info =
			if raw[0] & 0x80 == 0 { None }
			else { Some(u32::from_be_bytes([raw[3], raw[4], raw[5], raw[6]])) };

		Self {
			key: SenseKey::from_nibble(raw[2]),
			asc: raw[12],
			ascq: raw[13],
			info,
			ili: raw[2] & 0x20 != 0,
			eom: raw[2] & 0x40 != 0,
			filemark: raw[2] & 0x80 != 0,
		}
	}

	/// # Parse (Descriptor Format).
	///
	/// Key/ASC/ASCQ live in the header; the ILI/EOM/filemark flags and the
	/// information field are hunted down in the descriptor list (types 00h
	/// and 04h). Unknown descriptors are skipped by their declared lengths.
	fn parse_descriptor(raw: &[u8]) -> Self {
		let mut out = Self {
			key: SenseKey::from_nibble(raw[1]),
			asc: raw[2],
			ascq: raw[3],
			info: None,
			ili: false,
			eom: false,
			filemark: false,
		};

		// Walk the descriptors, if any.
		let extra = usize::from(raw[7]);
		let mut chunk = raw.get(8..(8 + extra).min(raw.len())).unwrap_or(&[]);
		while let [kind, len, rest @ ..] = chunk {
			let len = usize::from(*len);
			if rest.len() < len { break; }
			match *kind {
				// Information descriptor; the field is eight bytes but only
				// the low four matter for our block addresses.
				0x00 if 10 <= len => {
					out.info = Some(u32::from_be_bytes([
						rest[6], rest[7], rest[8], rest[9],
					]));
				},
				// Stream commands descriptor: filemark/EOM/ILI flags.
				0x04 if 2 <= len => {
					out.filemark = rest[1] & 0x80 != 0;
					out.eom = rest[1] & 0x40 != 0;
					out.ili = rest[1] & 0x20 != 0;
				},
				_ => (),
			}
			chunk = &rest[len..];
		}

		out
	}

	#[must_use]
	/// # Classify.
	///
	/// Collapse `(key, asc, ascq)` into the coarse [`SenseClass`] buckets.
	pub const fn class(self) -> SenseClass {
		match self.key {
			SenseKey::NoSense | SenseKey::Recovered | SenseKey::Completed => SenseClass::Good,
			SenseKey::NotReady => match self.asc {
				0x04 => SenseClass::BecomingReady,
				0x3A => SenseClass::NoMedium,
				_ => SenseClass::Other,
			},
			SenseKey::UnitAttention =>
				if self.asc == 0x29 { SenseClass::Reset }
				else { SenseClass::Other },
			SenseKey::BlankCheck => SenseClass::Blank,
			SenseKey::IllegalRequest => SenseClass::Illegal,
			SenseKey::MediumError => SenseClass::MediumError,
			SenseKey::HardwareError => SenseClass::Hardware,
			_ => SenseClass::Other,
		}
	}

	#[expect(clippy::cast_possible_wrap, reason = "Two's complement residue.")]
	#[must_use]
	/// # Short (ILI) Read Delta.
	///
	/// Sequential devices report incorrect-length reads as `00h/00h` with
	/// ILI set and a valid information field holding `requested − actual`
	/// (two's complement when the read was short). Returns the raw residue
	/// when that exact shape is present.
	pub const fn ili_residue(self) -> Option<i32> {
		if self.ili && self.asc == 0x00 && self.ascq == 0x00 {
			if let Some(info) = self.info { return Some(info as i32); }
		}
		None
	}
}



#[cfg(test)]
mod test {
	use super::*;

	/// # Fixed Sense Builder.
	fn fixed(key: u8, asc: u8, ascq: u8) -> [u8; 18] {
		let mut out = [0_u8; 18];
		out[0] = 0x70;
		out[2] = key;
		out[7] = 10;
		out[12] = asc;
		out[13] = ascq;
		out
	}

	#[test]
	fn t_keys() {
		assert_eq!(SenseKey::from_nibble(0x00), SenseKey::NoSense);
		assert_eq!(SenseKey::from_nibble(0x03), SenseKey::MediumError);
		assert_eq!(SenseKey::from_nibble(0x08), SenseKey::BlankCheck);
		assert_eq!(SenseKey::from_nibble(0x0C), SenseKey::Reserved);

		// High bits (the ILI/EOM/filemark flags) are ignored.
		assert_eq!(SenseKey::from_nibble(0xF3), SenseKey::MediumError);
	}

	#[test]
	fn t_fixed() {
		let sense = Sense::parse(&fixed(0x03, 0x11, 0x05)).unwrap();
		assert_eq!(sense.key, SenseKey::MediumError);
		assert_eq!(sense.asc, 0x11);
		assert_eq!(sense.ascq, 0x05);
		assert_eq!(sense.info, None);
		assert!(! sense.ili);
		assert_eq!(sense.class(), SenseClass::MediumError);

		// Too short to trust.
		assert!(Sense::parse(&fixed(0x03, 0x11, 0x05)[..13]).is_none());
	}

	#[test]
	fn t_fixed_flags() {
		// ILI + valid information, the tape short-read shape.
		let mut raw = fixed(0x20, 0x00, 0x00);
		raw[0] |= 0x80;
		raw[3..7].copy_from_slice(&65_023_u32.to_be_bytes());
		let sense = Sense::parse(&raw).unwrap();
		assert_eq!(sense.key, SenseKey::NoSense);
		assert!(sense.ili);
		assert_eq!(sense.info, Some(65_023));
		assert_eq!(sense.ili_residue(), Some(65_023));

		// Filemark and EOM ride the same byte.
		let sense = Sense::parse(&fixed(0xC0, 0x00, 0x01)).unwrap();
		assert!(sense.filemark);
		assert!(sense.eom);
		assert_eq!(sense.ili_residue(), None);
	}

	#[test]
	fn t_descriptor() {
		// Header + stream descriptor + information descriptor.
		let mut raw = vec![0x72, 0x03, 0x11, 0x05, 0, 0, 0, 16];
		raw.extend_from_slice(&[0x04, 0x02, 0x00, 0xE0]); // filemark|eom|ili
		raw.extend_from_slice(&[0x00, 0x0A, 0x80, 0x00, 0, 0, 0, 0, 0, 0, 0x02, 0x00]);
		let sense = Sense::parse(&raw).unwrap();
		assert_eq!(sense.key, SenseKey::MediumError);
		assert_eq!(sense.asc, 0x11);
		assert_eq!(sense.ascq, 0x05);
		assert!(sense.filemark && sense.eom && sense.ili);
		assert_eq!(sense.info, Some(0x0200));
	}

	#[test]
	fn t_class_idempotent() {
		// Same buffer, same classification, every time.
		for raw in [
			fixed(0x02, 0x3A, 0x00),
			fixed(0x02, 0x04, 0x01),
			fixed(0x06, 0x29, 0x00),
			fixed(0x08, 0x00, 0x05),
			fixed(0x04, 0x44, 0x00),
		] {
			let a = Sense::parse(&raw).unwrap().class();
			let b = Sense::parse(&raw).unwrap().class();
			assert_eq!(a, b);
		}

		let sense = Sense::parse(&fixed(0x02, 0x3A, 0x00)).unwrap();
		assert_eq!(sense.class(), SenseClass::NoMedium);
		let sense = Sense::parse(&fixed(0x02, 0x04, 0x01)).unwrap();
		assert_eq!(sense.class(), SenseClass::BecomingReady);
		let sense = Sense::parse(&fixed(0x06, 0x29, 0x00)).unwrap();
		assert_eq!(sense.class(), SenseClass::Reset);
	}
}
