/*!
# Disc Dump: Library
*/

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
	unsafe_code,
)]

#![warn(
	clippy::complexity,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::style,

	clippy::allow_attributes,
	clippy::clone_on_ref_ptr,
	clippy::create_dir,
	clippy::filetype_is_file,
	clippy::format_push_string,
	clippy::get_unwrap,
	clippy::impl_trait_in_params,
	clippy::lossy_float_literal,
	clippy::missing_assert_message,
	clippy::missing_docs_in_private_items,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::pub_without_shorthand,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::todo,
	clippy::undocumented_unsafe_blocks,
	clippy::unneeded_field_pattern,
	clippy::unseparated_literal_suffix,
	clippy::unwrap_in_result,

	macro_use_extern_crate,
	missing_copy_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![expect(clippy::redundant_pub_crate, reason = "Unresolvable.")]

mod abort;
mod device;
mod dump;
mod error;
mod extents;
mod image;
mod media;
mod resume;
mod sense;

#[cfg(test)] mod testdev;

pub use abort::KillSwitch;
pub use device::{
	CdHeaderCodes,
	CdSectorKind,
	CdSubchannel,
	Device,
	DeviceKind,
	DeviceReply,
	DriveIdentity,
	DumpHardware,
	ModePageControl,
	SpaceKind,
	StructureFormat,
	StructureMedia,
	TocFormat,
};
pub use dump::{
	DumpOutcome,
	DumpStatus,
	Dumper,
	log::DumpLog,
	opts::DumpOptions,
	speed::SpeedStat,
	xbox::XgdGeometry,
};
pub use error::{
	DumpError,
	ErrorKind,
};
pub use extents::Extents;
pub use image::{
	ImageMetadata,
	ImageReader,
	ImageWriter,
	OpticalReader,
	TapeFile,
	TapePartition,
	TapeWriter,
	bw5::{
		Bw5Image,
		Bw5Options,
	},
	filter::Filter,
	track::{
		DataFileId,
		Msf,
		Partition,
		SectorTagKind,
		Session,
		SubchannelKind,
		Track,
		TrackMode,
	},
};
pub use media::{
	MediaTagKind,
	MediaType,
	TagMap,
	identify::{
		DriveCaps,
		MediaScan,
		identify,
	},
	pfi::{
		DiscSize,
		DiskCategory,
		Pfi,
	},
};
pub use resume::{
	Attempt,
	Resume,
	ResumeStore,
};
pub use sense::{
	Sense,
	SenseClass,
	SenseKey,
};



// Sector Geometry
// ---------------

/// # Raw CD Sector Size.
///
/// Every CD sector occupies 2,352 bytes before subchannel; the cooked
/// (user data) portion varies by track mode.
pub(crate) const SECTOR_RAW_CD: u16 = 2352;

/// # Formatted Q Subchannel Width.
pub(crate) const SUBCHANNEL_Q16: u16 = 16;

/// # Packed/Raw Subchannel Width.
pub(crate) const SUBCHANNEL_PACKED: u16 = 96;
