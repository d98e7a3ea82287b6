/*!
# Disc Dump: BW5 Byte Cursor
*/

use crate::DumpError;



/// # Little-Endian Byte Cursor.
///
/// The container is parsed entirely in memory; this keeps the offset
/// arithmetic and truncation checks in one place. Every accessor fails
/// loudly; a short read anywhere means the file is not what it claims.
pub(super) struct Cursor<'a> {
	/// # The Whole Container.
	buf: &'a [u8],

	/// # Read Position.
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// # New!
	pub(super) const fn new(buf: &'a [u8]) -> Self {
		Self { buf, pos: 0 }
	}

	/// # Current Position.
	pub(super) const fn pos(&self) -> usize { self.pos }

	/// # Bytes Left.
	pub(super) const fn remaining(&self) -> usize { self.buf.len() - self.pos }

	/// # Truncation Error.
	fn short(&self) -> DumpError {
		DumpError::Format(format!("container truncated at offset {}", self.pos))
	}

	/// # Take a Slice.
	pub(super) fn take(&mut self, len: usize) -> Result<&'a [u8], DumpError> {
		let out = self.buf.get(self.pos..self.pos + len).ok_or_else(|| self.short())?;
		self.pos += len;
		Ok(out)
	}

	/// # Skip Ahead.
	pub(super) fn skip(&mut self, len: usize) -> Result<(), DumpError> {
		self.take(len).map(|_| ())
	}

	/// # Rewind.
	///
	/// Move the position backward; used for the short (64-byte) track
	/// descriptors.
	pub(super) fn rewind(&mut self, len: usize) -> Result<(), DumpError> {
		self.pos = self.pos.checked_sub(len)
			.ok_or_else(|| DumpError::Format("container cursor underflow".to_owned()))?;
		Ok(())
	}

	/// # One Byte.
	pub(super) fn u8(&mut self) -> Result<u8, DumpError> {
		self.take(1).map(|s| s[0])
	}

	/// # Sixteen Bits.
	pub(super) fn u16(&mut self) -> Result<u16, DumpError> {
		self.take(2).map(|s| u16::from_le_bytes([s[0], s[1]]))
	}

	/// # Thirty-Two Bits.
	pub(super) fn u32(&mut self) -> Result<u32, DumpError> {
		self.take(4).map(|s| u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
	}

	/// # Thirty-Two Bits, Signed.
	pub(super) fn i32(&mut self) -> Result<i32, DumpError> {
		self.take(4).map(|s| i32::from_le_bytes([s[0], s[1], s[2], s[3]]))
	}

	/// # UTF-16 String.
	///
	/// `units` counts sixteen-bit code units, not bytes. Garbage units are
	/// replaced rather than fatal; file-name references get a second chance
	/// through case folding anyway.
	pub(super) fn utf16(&mut self, units: usize) -> Result<String, DumpError> {
		let raw = self.take(units * 2)?;
		let wide: Vec<u16> = raw.chunks_exact(2)
			.map(|c| u16::from_le_bytes([c[0], c[1]]))
			.collect();
		Ok(String::from_utf16_lossy(&wide).trim_end_matches('\0').to_owned())
	}
}
