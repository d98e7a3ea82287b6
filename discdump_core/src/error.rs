/*!
# Disc Dump: Errors
*/

use crate::{
	MediaTagKind,
	SectorTagKind,
	SenseKey,
};
use std::{
	error::Error,
	fmt,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Error Kinds.
///
/// Every [`DumpError`] collapses into one of these coarse categories so
/// callers can decide what to do without matching the full variant set.
/// Transient errors are absorbed by the dump pipelines (recorded as bad
/// blocks); everything else surfaces.
pub enum ErrorKind {
	/// # Retriable Read Error.
	Transient,

	/// # Structural (Image/Container) Error.
	Format,

	/// # Feature/Tag Not Present.
	NotPresent,

	/// # Feature Not Implemented.
	NotImplemented,

	/// # Invalid Argument.
	Argument,

	/// # Unrecoverable (Device/State/IO).
	Fatal,
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum DumpError {
	/// # Blank Medium.
	BlankMedium,

	/// # Bug!
	Bug(&'static str),

	/// # Cross-Track Read.
	CrossTrackRead(u64, u64),

	/// # Device Disappeared Mid-Dump.
	DeviceGone,

	/// # Device Command Timeout.
	DeviceTimeout(&'static str),

	/// # Drive Hardware Failure.
	Hardware(u8, u8),

	/// # Invalid Drive Model.
	DriveModel,

	/// # Invalid Drive Vendor.
	DriveVendor,

	/// # Image Structure Violation.
	Format(String),

	/// # User Abort.
	Killed,

	/// # Medium Never Became Ready.
	MediumNotReady(u8, u8),

	/// # Requested Media Tag Missing.
	MediaTagNotPresent(MediaTagKind),

	/// # Known But Unimplemented Operation.
	NotImplemented(&'static str),

	/// # LBA/Length Out of Bounds.
	OutOfRange(u64, u64),

	/// # Sector Read Failure.
	Read(u64, SenseKey, u8, u8),

	/// # Resume Data Corruption.
	ResumeCorrupt,

	/// # Resume/Image Mismatch.
	ResumeMismatch,

	/// # Unable to Save Resume Data.
	ResumeSave,

	/// # Numbers Too Big For This Architecture.
	Overflow,

	/// # Requested Sector Tag Missing.
	SectorTagNotPresent(SectorTagKind),

	/// # Tape Positioning Failure.
	TapePosition(u64, u64),

	/// # Unsupported Track Type.
	TrackFormat(u8),

	/// # Kreon Unlock Failure.
	Unlock(&'static str),

	/// # Writing to Disk.
	Write(String),
}

impl Error for DumpError {}

impl fmt::Display for DumpError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::BlankMedium => f.write_str("The medium is blank."),
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::CrossTrackRead(lba, n) => write!(f, "Read of {n} sector(s) at LBA {lba} crosses a track boundary."),
			Self::DeviceGone => f.write_str("The device disappeared mid-dump."),
			Self::DeviceTimeout(s) => write!(f, "The {s} command timed out."),
			Self::Hardware(asc, ascq) => write!(f, "Drive hardware failure ({asc:02X}h/{ascq:02X}h)."),
			Self::DriveModel => f.write_str("Invalid drive model."),
			Self::DriveVendor => f.write_str("Invalid drive vendor."),
			Self::Format(s) => write!(f, "Malformed image: {s}."),
			Self::Killed => f.write_str("User abort."),
			Self::MediumNotReady(asc, ascq) => write!(f, "The medium never became ready ({asc:02X}h/{ascq:02X}h)."),
			Self::MediaTagNotPresent(kind) => write!(f, "This image/media has no {kind} data."),
			Self::NotImplemented(s) => write!(f, "Not implemented: {s}."),
			Self::OutOfRange(lba, total) => write!(f, "LBA {lba} is out of range (total {total})."),
			Self::Read(lba, key, asc, ascq) => write!(f, "Read error at LBA {lba} ({key}, {asc:02X}h/{ascq:02X}h)."),
			Self::ResumeCorrupt => f.write_str("The resume data is corrupt; pass force to start over."),
			Self::ResumeMismatch => f.write_str("The resume data belongs to a different dump."),
			Self::ResumeSave => f.write_str("Unable to save the resume data."),
			Self::Overflow => f.write_str("The numbers are too big for this system architecture."),
			Self::SectorTagNotPresent(kind) => write!(f, "This track carries no {kind} tag."),
			Self::TapePosition(wanted, got) => write!(f, "Tape positioned at block {got}, expected {wanted}."),
			Self::TrackFormat(n) => write!(f, "Unsupported track type ({n})."),
			Self::Unlock(s) => write!(f, "Drive unlock failed during {s}."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),
		}
	}
}

impl DumpError {
	#[must_use]
	/// # Error Kind.
	///
	/// Collapse the variant into its coarse category.
	pub const fn kind(&self) -> ErrorKind {
		match self {
			Self::Read(..) | Self::DeviceTimeout(_) => ErrorKind::Transient,
			Self::Format(_) => ErrorKind::Format,
			Self::MediaTagNotPresent(_) | Self::SectorTagNotPresent(_) => ErrorKind::NotPresent,
			Self::NotImplemented(_) => ErrorKind::NotImplemented,
			Self::CrossTrackRead(..) | Self::OutOfRange(..) | Self::TrackFormat(_) => ErrorKind::Argument,
			_ => ErrorKind::Fatal,
		}
	}

	#[must_use]
	/// # Transient?
	///
	/// Returns `true` for run-of-the-mill read errors the pipelines absorb
	/// into the bad-block list rather than propagate.
	pub const fn is_transient(&self) -> bool {
		matches!(self.kind(), ErrorKind::Transient)
	}
}
