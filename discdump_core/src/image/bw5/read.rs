/*!
# Disc Dump: BW5 Random Access
*/

use crate::{
	DumpError,
	SectorTagKind,
	SubchannelKind,
	Track,
};
use std::io::{
	Read,
	Seek,
	SeekFrom,
};
use super::Bw5Image;



#[derive(Debug, Clone, Copy)]
/// # Read Shape.
///
/// How to carve one stored sector: skip `offset` bytes, keep `size`, skip
/// `skip` more. The stored stride is always `offset + size + skip`.
pub(super) struct Shape {
	/// # Leading Skip.
	pub(super) offset: u64,

	/// # Kept Bytes.
	pub(super) size: u64,

	/// # Trailing Skip.
	pub(super) skip: u64,
}

impl Shape {
	/// # Cooked Data.
	pub(super) fn cooked(track: &Track) -> Self {
		let (off, len) = track.mode.cooked_range();
		Self {
			offset: u64::from(off),
			size: u64::from(len),
			skip: u64::from(track.raw_bps - off - len) + u64::from(track.subchannel.width()),
		}
	}

	/// # Full Raw Sector.
	pub(super) fn long(track: &Track) -> Self {
		Self {
			offset: 0,
			size: u64::from(track.raw_bps),
			skip: u64::from(track.subchannel.width()),
		}
	}

	/// # A Structural Tag.
	///
	/// ## Errors
	///
	/// Returns [`DumpError::SectorTagNotPresent`] if the track's mode (or
	/// its subchannel arrangement) lacks the field.
	pub(super) fn tag(track: &Track, tag: SectorTagKind) -> Result<Self, DumpError> {
		if matches!(tag, SectorTagKind::Subchannel) {
			if matches!(track.subchannel, SubchannelKind::None) {
				return Err(DumpError::SectorTagNotPresent(tag));
			}
			return Ok(Self {
				offset: u64::from(track.raw_bps),
				size: u64::from(track.subchannel.width()),
				skip: 0,
			});
		}

		let (off, len) = track.mode.tag_range(tag)?;
		Ok(Self {
			offset: u64::from(off),
			size: u64::from(len),
			skip: u64::from(track.raw_bps - off - len) + u64::from(track.subchannel.width()),
		})
	}
}



impl Bw5Image {
	/// # Track Covering a Span.
	///
	/// Locate the enclosing track by binary search, then make sure the
	/// whole request fits inside it.
	///
	/// ## Errors
	///
	/// Out-of-range LBAs are invalid arguments; spans poking into the next
	/// track are rejected outright.
	pub(super) fn span_track(&self, lba: u64, count: u32) -> Result<&Track, DumpError> {
		if count == 0 {
			return Err(DumpError::OutOfRange(lba, self.blocks));
		}

		let idx = self.tracks.partition_point(|t| t.start <= lba);
		let track = idx.checked_sub(1)
			.map(|i| &self.tracks[i])
			.filter(|t| t.contains(lba))
			.ok_or(DumpError::OutOfRange(lba, self.blocks))?;

		let end = lba + u64::from(count) - 1;
		if track.end < end {
			if end < self.blocks {
				return Err(DumpError::CrossTrackRead(lba, u64::from(count)));
			}
			return Err(DumpError::OutOfRange(end, self.blocks));
		}

		Ok(track)
	}

	/// # Read a Shaped Span.
	///
	/// Seek to the first stored sector and carve `count` sectors through
	/// the shape. When the shape keeps whole stored sectors, the span
	/// collapses into a single contiguous read.
	pub(super) fn read_span(
		&self,
		track: &Track,
		lba: u64,
		count: u32,
		shape: Shape,
	) -> Result<Vec<u8>, DumpError> {
		let filter = self.files.get(track.file)
			.ok_or(DumpError::Bug("track references a missing data file"))?;
		let mut reader = filter.reader()?;

		let start = track.file_offset + (lba - track.start) * track.stride();
		reader.seek(SeekFrom::Start(start))
			.map_err(|_| short_file(track))?;

		let per = usize::try_from(shape.size).map_err(|_| DumpError::Overflow)?;
		let mut out = vec![0_u8; per * count as usize];

		if shape.offset == 0 && shape.skip == 0 {
			reader.read_exact(&mut out).map_err(|_| short_file(track))?;
		}
		else {
			for chunk in out.chunks_exact_mut(per) {
				if shape.offset != 0 {
					reader.seek(SeekFrom::Current(
						i64::try_from(shape.offset).map_err(|_| DumpError::Overflow)?,
					)).map_err(|_| short_file(track))?;
				}
				reader.read_exact(chunk).map_err(|_| short_file(track))?;
				if shape.skip != 0 {
					reader.seek(SeekFrom::Current(
						i64::try_from(shape.skip).map_err(|_| DumpError::Overflow)?,
					)).map_err(|_| short_file(track))?;
				}
			}
		}

		Ok(out)
	}
}

/// # Short-File Error.
fn short_file(track: &Track) -> DumpError {
	DumpError::Format(format!("data file for track {} ended early", track.sequence))
}
