/*!
# Disc Dump: BW5 Multi-Session Reader

The reference optical plugin: a metadata container indexing sessions,
tracks, embedded descriptor blobs, and one or more external data files
holding the actual sectors (with optional interleaved subchannel).
*/

mod cursor;
mod header;
mod parse;
mod read;
mod toc;

use crate::{
	DumpError,
	Filter,
	ImageReader,
	MediaTagKind,
	MediaType,
	OpticalReader,
	Partition,
	SectorTagKind,
	Session,
	TagMap,
	Track,
};
use cursor::Cursor;
use fyi_msg::Msg;
use header::Header;
use parse::{
	DataBlock,
	RawSession,
};



/// # Footer Size.
const FOOTER_SIZE: usize = 16;



#[derive(Debug, Clone, Copy, Default)]
/// # Reader Options.
pub struct Bw5Options {
	/// # Refuse Trailing Garbage?
	strict_footer: bool,
}

impl Bw5Options {
	#[must_use]
	/// # With Strict Footer.
	///
	/// Some mastering tools pad the container past its sixteen-byte footer.
	/// By default that earns a warning and nothing more; strict mode turns
	/// it into a format error.
	pub const fn with_strict_footer(self, strict_footer: bool) -> Self {
		Self { strict_footer }
	}
}



#[derive(Debug)]
/// # BW5 Image.
///
/// A fully-parsed, immutable view of the container. All the mutation lives
/// in `open`; afterwards only the per-read file cursors move.
pub struct Bw5Image {
	/// # Media Type.
	media_type: MediaType,

	/// # Total Sectors.
	blocks: u64,

	/// # Largest Cooked Sector Size.
	block_size: u32,

	/// # Sessions.
	sessions: Vec<Session>,

	/// # Tracks, Sorted By Start LBA.
	tracks: Vec<Track>,

	/// # Partitions.
	partitions: Vec<Partition>,

	/// # Media Tags.
	tags: TagMap,

	/// # Data File Arena.
	files: Vec<Filter>,
}

impl Bw5Image {
	/// # Open!
	///
	/// ## Errors
	///
	/// Returns a format error if the container violates its own structure
	/// anywhere, or references data files that cannot be found.
	pub fn open(filter: &Filter) -> Result<Self, DumpError> {
		Self::open_with(filter, Bw5Options::default())
	}

	/// # Open, With Options.
	///
	/// ## Errors
	///
	/// As [`Bw5Image::open`].
	pub fn open_with(filter: &Filter, opts: Bw5Options) -> Result<Self, DumpError> {
		let raw = std::fs::read(filter.path())
			.map_err(|_| DumpError::Format("unreadable container".to_owned()))?;
		let mut cur = Cursor::new(&raw);

		let head = Header::parse(&mut cur)?;
		let media_type = crate::media::profile::media_from_profile(head.profile);
		let mut tags = TagMap::default();

		// The embedded blobs, in container order.
		read_tags(&mut cur, &head, media_type, &mut tags)?;

		// The data-file table.
		let block_count = cur.u32()? as usize;
		let path_units = cur.u32()? as usize;
		let data_path = cur.utf16(path_units)?;
		let mut blocks = Vec::with_capacity(block_count);
		for _ in 0..block_count {
			blocks.push(DataBlock::parse(&mut cur)?);
		}

		// The sessions and their descriptors.
		let mut raw_sessions = Vec::with_capacity(head.sessions as usize);
		for _ in 0..head.sessions {
			raw_sessions.push(RawSession::parse(&mut cur)?);
		}

		// DPM, one orphan word, footer, and (hopefully) nothing else.
		let dpm_len = cur.u32()? as usize;
		cur.skip(dpm_len)?;
		let _unused = cur.u32()?;
		if cur.remaining() < FOOTER_SIZE {
			return Err(DumpError::Format("missing container footer".to_owned()));
		}
		cur.skip(FOOTER_SIZE)?;
		if cur.remaining() != 0 {
			if opts.strict_footer {
				return Err(DumpError::Format(format!(
					"{} byte(s) past the container footer", cur.remaining(),
				)));
			}
			Msg::warning(format!(
				"Ignoring {} byte(s) past the container footer.", cur.remaining(),
			)).eprint();
		}

		Self::assemble(filter, media_type, &data_path, &blocks, &raw_sessions, tags)
	}

	/// # Assemble the Immutable Image.
	///
	/// Resolve the data files, translate descriptors into tracks, and
	/// derive the session/partition/geometry tables.
	fn assemble(
		filter: &Filter,
		media_type: MediaType,
		data_path: &str,
		blocks: &[DataBlock],
		raw_sessions: &[RawSession],
		mut tags: TagMap,
	) -> Result<Self, DumpError> {
		// Data files first: try the bare name, then under the recorded
		// directory.
		let mut files = Vec::with_capacity(blocks.len());
		for b in blocks {
			let resolved = filter.attached(&b.filename)
				.or_else(|e|
					if data_path.is_empty() { Err(e) }
					else { filter.attached(&format!("{data_path}/{}", b.filename)) }
				)?;
			files.push(resolved);
		}

		// Tracks next.
		let mut tracks = Vec::new();
		for session in raw_sessions {
			for desc in &session.descriptors {
				if desc.is_track() {
					tracks.push(parse::build_track(desc, blocks)?);
				}
			}
		}
		if tracks.is_empty() {
			return Err(DumpError::Format("container defines no tracks".to_owned()));
		}
		tracks.sort_unstable_by_key(|t| t.start);
		for pair in tracks.windows(2) {
			if pair[1].start <= pair[0].end {
				return Err(DumpError::Format(format!(
					"tracks {} and {} overlap", pair[0].sequence, pair[1].sequence,
				)));
			}
		}

		// Sessions and partitions fall out of the above.
		let sessions: Vec<Session> = raw_sessions.iter()
			.map(|s| Session {
				sequence: s.sequence,
				first_track: s.first_track,
				last_track: s.last_track,
				start: s.start,
				end: s.end,
			})
			.collect();

		let mut partitions = Vec::with_capacity(tracks.len());
		let mut byte_offset = 0_u64;
		for (idx, t) in tracks.iter().enumerate() {
			let bytes = t.blocks() * u64::from(t.cooked_bps);
			partitions.push(Partition {
				sequence: u16::try_from(idx).map_err(|_| DumpError::Overflow)?,
				track: t.sequence,
				start: t.start,
				blocks: t.blocks(),
				byte_offset,
				bytes,
			});
			byte_offset += bytes;
		}

		// A CD without a stored TOC gets one rebuilt from the descriptors.
		if ! media_type.is_dvd() && ! tags.contains_key(&MediaTagKind::CdFullToc) {
			tags.insert(MediaTagKind::CdFullToc, toc::rebuild_full_toc(raw_sessions));
		}

		let blocks_total = tracks.iter().map(|t| t.end + 1).max().unwrap_or(0);
		let block_size = tracks.iter().map(|t| u32::from(t.cooked_bps)).max().unwrap_or(0);

		Ok(Self {
			media_type,
			blocks: blocks_total,
			block_size,
			sessions,
			tracks,
			partitions,
			tags,
			files,
		})
	}
}

/// # Extract the Embedded Tag Blobs.
///
/// Consumes everything between the header and the data-file table, in the
/// container's fixed order.
fn read_tags(
	cur: &mut Cursor<'_>,
	head: &Header,
	media_type: MediaType,
	tags: &mut TagMap,
) -> Result<(), DumpError> {
	// MODE PAGE 2Ah. The stored page-length byte runs two high in this
	// container; adjust before anyone tries to decode it.
	if head.mode2a_len != 0 {
		let mut blob = cur.take(head.mode2a_len)?.to_vec();
		if 2 <= blob.len() { blob[1] -= 2; }
		tags.insert(MediaTagKind::ScsiModePage2A, blob);
	}

	cur.skip(head.unknown_len)?;

	for (len, kind) in [
		(head.pma_len, MediaTagKind::CdPma),
		(head.atip_len, MediaTagKind::CdAtip),
		(head.cdtext_len, MediaTagKind::CdText),
	] {
		if len != 0 {
			let prefix = cur.u32()? as usize;
			if prefix != len {
				return Err(DumpError::Format(format!(
					"{kind} prefix disagrees with the header ({prefix} vs {len})",
				)));
			}
			let payload = cur.take(len)?;
			tags.insert(kind, mmc_prefix(payload));
		}
	}

	if head.bca_len != 0 {
		tags.insert(MediaTagKind::DvdBca, cur.take(head.bca_len)?.to_vec());
	}

	// The DVD structure block: DMI up front, PFI at its fixed offset, each
	// returned behind a synthetic MMC header.
	if head.dvd_structures_len != 0 {
		let block = cur.take(head.dvd_structures_len)?;
		let mut dmi = vec![0x08, 0x02, 0x00, 0x00];
		dmi.extend_from_slice(&block[..2048]);
		tags.insert(MediaTagKind::DvdDmi, dmi);

		let mut pfi = vec![0x08, 0x02, 0x00, 0x00];
		pfi.extend_from_slice(&block[header::DVD_PFI_OFFSET..header::DVD_PFI_OFFSET + 2048]);
		tags.insert(MediaTagKind::DvdPfi, pfi);
	}

	// Disc info is profile-dependent and otherwise opaque.
	let info_len =
		if media_type.is_dvd() { head.dvd_info_len }
		else { head.cd_info_len };
	cur.skip(info_len)?;

	Ok(())
}

/// # Synthesize an MMC Response Header.
///
/// `[size_be, size_be, 0, 0]` + payload, where the size field counts the
/// payload plus the two reserved bytes, the way the drive itself would.
fn mmc_prefix(payload: &[u8]) -> Vec<u8> {
	let size = u16::try_from(payload.len() + 2).unwrap_or(u16::MAX);
	let mut out = Vec::with_capacity(payload.len() + 4);
	out.extend_from_slice(&size.to_be_bytes());
	out.extend_from_slice(&[0, 0]);
	out.extend_from_slice(payload);
	out
}



impl ImageReader for Bw5Image {
	#[inline]
	fn media_type(&self) -> MediaType { self.media_type }

	#[inline]
	fn blocks(&self) -> u64 { self.blocks }

	#[inline]
	fn block_size(&self) -> u32 { self.block_size }

	fn read_sector(&mut self, lba: u64) -> Result<Vec<u8>, DumpError> {
		self.read_sectors(lba, 1)
	}

	fn read_sectors(&mut self, lba: u64, count: u32) -> Result<Vec<u8>, DumpError> {
		let track = *self.span_track(lba, count)?;
		self.read_span(&track, lba, count, read::Shape::cooked(&track))
	}

	fn read_media_tag(&self, kind: MediaTagKind) -> Result<Vec<u8>, DumpError> {
		self.tags.get(&kind)
			.cloned()
			.ok_or(DumpError::MediaTagNotPresent(kind))
	}

	fn media_tags(&self) -> Vec<MediaTagKind> {
		self.tags.keys().copied().collect()
	}

	fn optical(&mut self) -> Option<&mut dyn OpticalReader> { Some(self) }
}

impl OpticalReader for Bw5Image {
	#[inline]
	fn sessions(&self) -> &[Session] { &self.sessions }

	#[inline]
	fn tracks(&self) -> &[Track] { &self.tracks }

	#[inline]
	fn partitions(&self) -> &[Partition] { &self.partitions }

	fn read_sector_long(&mut self, lba: u64) -> Result<Vec<u8>, DumpError> {
		self.read_sectors_long(lba, 1)
	}

	fn read_sectors_long(&mut self, lba: u64, count: u32) -> Result<Vec<u8>, DumpError> {
		let track = *self.span_track(lba, count)?;
		self.read_span(&track, lba, count, read::Shape::long(&track))
	}

	fn read_sector_tag(&mut self, lba: u64, tag: SectorTagKind) -> Result<Vec<u8>, DumpError> {
		let track = *self.span_track(lba, 1)?;
		let shape = read::Shape::tag(&track, tag)?;
		self.read_span(&track, lba, 1, shape)
	}
}
