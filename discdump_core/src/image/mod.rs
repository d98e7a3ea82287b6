/*!
# Disc Dump: Image Plugins

Container formats plug in through a small family of traits: [`ImageReader`]
for anything that can be opened and read back, [`OpticalReader`] for the
formats that know about sessions/tracks/subchannels, [`ImageWriter`] for
dump targets, and [`TapeWriter`] for the sequential extras.

Capability discovery is a method call returning `Option<&mut dyn …>`, not a
downcast; a plugin that lacks a capability simply returns `None`.
*/

pub(crate) mod bw5;
pub(crate) mod filter;
pub(crate) mod track;

use crate::{
	DumpError,
	DumpHardware,
	MediaTagKind,
	MediaType,
};
use track::{
	Partition,
	SectorTagKind,
	Session,
	Track,
};



/// # Readable Image.
///
/// The baseline contract: geometry, cooked sector access, and media tags.
/// Construction is format-specific (each plugin exposes its own `open`);
/// everything after that is uniform.
///
/// Sector reads are `O(log tracks)` by LBA. Reads crossing a track boundary
/// are rejected with [`DumpError::CrossTrackRead`]; callers iterate
/// track-by-track on purpose.
pub trait ImageReader {
	/// # Media Type.
	fn media_type(&self) -> MediaType;

	/// # Total Sectors.
	fn blocks(&self) -> u64;

	/// # Largest Cooked Sector Size.
	fn block_size(&self) -> u32;

	/// # Read One Cooked Sector.
	///
	/// ## Errors
	///
	/// Out-of-range LBAs are invalid arguments; I/O problems are format
	/// errors.
	fn read_sector(&mut self, lba: u64) -> Result<Vec<u8>, DumpError>;

	/// # Read Several Cooked Sectors.
	///
	/// ## Errors
	///
	/// As [`ImageReader::read_sector`], plus cross-track rejection.
	fn read_sectors(&mut self, lba: u64, count: u32) -> Result<Vec<u8>, DumpError>;

	/// # Read a Media Tag.
	///
	/// ## Errors
	///
	/// Returns [`DumpError::MediaTagNotPresent`] if the image simply
	/// doesn't have one.
	fn read_media_tag(&self, kind: MediaTagKind) -> Result<Vec<u8>, DumpError>;

	/// # Available Media Tags.
	fn media_tags(&self) -> Vec<MediaTagKind>;

	/// # Optical Capabilities, If Any.
	fn optical(&mut self) -> Option<&mut dyn OpticalReader> { None }
}



/// # Readable Optical Image.
///
/// Everything in [`ImageReader`], plus the track/session machinery and raw
/// (2352-byte) sector access.
pub trait OpticalReader: ImageReader {
	/// # Sessions.
	fn sessions(&self) -> &[Session];

	/// # Tracks.
	fn tracks(&self) -> &[Track];

	/// # Partitions.
	fn partitions(&self) -> &[Partition];

	/// # Read One Raw Sector.
	///
	/// ## Errors
	///
	/// As cooked reads.
	fn read_sector_long(&mut self, lba: u64) -> Result<Vec<u8>, DumpError>;

	/// # Read Several Raw Sectors.
	///
	/// ## Errors
	///
	/// As cooked reads, plus cross-track rejection.
	fn read_sectors_long(&mut self, lba: u64, count: u32) -> Result<Vec<u8>, DumpError>;

	/// # Read a Sector Tag.
	///
	/// ## Errors
	///
	/// Returns [`DumpError::SectorTagNotPresent`] when the enclosing
	/// track's mode has no such field.
	fn read_sector_tag(&mut self, lba: u64, tag: SectorTagKind) -> Result<Vec<u8>, DumpError>;
}



/// # Writable Image.
///
/// The dump pipelines drive their output exclusively through this. As with
/// reading, construction (`create`) is format-specific.
///
/// Operations a format genuinely cannot express default to
/// [`DumpError::NotImplemented`] so pipelines can probe-and-degrade.
pub trait ImageWriter {
	/// # Write One Cooked Sector.
	///
	/// ## Errors
	///
	/// Out-of-range LBAs are invalid arguments; I/O problems bubble up as
	/// write errors.
	fn write_sector(&mut self, lba: u64, data: &[u8]) -> Result<(), DumpError>;

	/// # Write Several Cooked Sectors.
	///
	/// ## Errors
	///
	/// As [`ImageWriter::write_sector`].
	fn write_sectors(&mut self, lba: u64, count: u32, data: &[u8]) -> Result<(), DumpError>;

	/// # Write One Raw Sector.
	///
	/// ## Errors
	///
	/// Defaults to not-implemented.
	fn write_sector_long(&mut self, _lba: u64, _data: &[u8]) -> Result<(), DumpError> {
		Err(DumpError::NotImplemented("raw sector writes"))
	}

	/// # Write a Sector Tag.
	///
	/// ## Errors
	///
	/// Defaults to not-implemented.
	fn write_sector_tag(&mut self, _lba: u64, _tag: SectorTagKind, _data: &[u8])
	-> Result<(), DumpError> {
		Err(DumpError::NotImplemented("sector tag writes"))
	}

	/// # Write a Media Tag.
	///
	/// Each kind may be written at most once.
	///
	/// ## Errors
	///
	/// Returns an error on duplicates or I/O trouble.
	fn write_media_tag(&mut self, kind: MediaTagKind, data: &[u8]) -> Result<(), DumpError>;

	/// # Set the Track List.
	///
	/// ## Errors
	///
	/// Defaults to not-implemented; formats without track structure don't
	/// need it.
	fn set_tracks(&mut self, _tracks: &[Track]) -> Result<(), DumpError> {
		Err(DumpError::NotImplemented("track lists"))
	}

	/// # Record the Dump Hardware.
	///
	/// ## Errors
	///
	/// Optional; the default quietly accepts and discards.
	fn set_dump_hardware(&mut self, _hw: &DumpHardware) -> Result<(), DumpError> { Ok(()) }

	/// # Record Metadata.
	///
	/// ## Errors
	///
	/// Optional; the default quietly accepts and discards.
	fn set_metadata(&mut self, _meta: &ImageMetadata) -> Result<(), DumpError> { Ok(()) }

	/// # Finish and Close.
	///
	/// ## Errors
	///
	/// Returns an error if the final flush fails.
	fn close(&mut self) -> Result<(), DumpError>;

	/// # Tape Capabilities, If Any.
	fn tape(&mut self) -> Option<&mut dyn TapeWriter> { None }
}



/// # Writable Tape Image.
pub trait TapeWriter {
	/// # Flag the Image As a Tape.
	fn set_tape(&mut self);

	/// # Record a Tape File.
	///
	/// ## Errors
	///
	/// Returns an error if the record cannot be stored.
	fn add_file(&mut self, file: TapeFile) -> Result<(), DumpError>;

	/// # Record a Tape Partition.
	///
	/// ## Errors
	///
	/// Returns an error if the record cannot be stored.
	fn add_partition(&mut self, partition: TapePartition) -> Result<(), DumpError>;
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Tape File.
///
/// A filemark-delimited region of sequential blocks.
pub struct TapeFile {
	/// # File Number.
	pub file: u64,

	/// # Owning Partition.
	pub partition: u8,

	/// # First Block.
	pub first_block: u64,

	/// # Last Block (Inclusive).
	pub last_block: u64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Tape Partition.
pub struct TapePartition {
	/// # Partition Number.
	pub number: u8,

	/// # First Block.
	pub first_block: u64,

	/// # Last Block (Inclusive).
	pub last_block: u64,
}

#[derive(Debug, Clone, Default)]
/// # Image Metadata.
///
/// Free-form extras captured during a dump.
pub struct ImageMetadata {
	/// # Media Catalogue Number.
	pub mcn: Option<String>,

	/// # Per-Track ISRCs.
	pub isrcs: Vec<(u16, String)>,

	/// # Comments.
	pub comments: Option<String>,
}
