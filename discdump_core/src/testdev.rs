/*!
# Disc Dump: Test Doubles

A scripted [`Device`] and an in-memory [`ImageWriter`], shared by the
identification and pipeline tests. Everything is public-field plumbing;
tests poke in exactly the behavior they need.
*/

use crate::{
	CdHeaderCodes,
	CdSectorKind,
	CdSubchannel,
	Device,
	DeviceKind,
	DeviceReply,
	DumpError,
	DumpHardware,
	ImageMetadata,
	ImageWriter,
	KillSwitch,
	MediaTagKind,
	ModePageControl,
	Sense,
	SenseKey,
	SpaceKind,
	StructureFormat,
	StructureMedia,
	TapeFile,
	TapePartition,
	TapeWriter,
	TocFormat,
	Track,
};
use std::collections::{
	HashMap,
	VecDeque,
};
use std::time::Duration;



/// # Quick Sense.
pub(crate) const fn sense(key: SenseKey, asc: u8, ascq: u8) -> Sense {
	Sense {
		key,
		asc,
		ascq,
		info: None,
		ili: false,
		eom: false,
		filemark: false,
	}
}

/// # Deterministic Sector Pattern.
///
/// Tests recompute this to verify placement.
pub(crate) const fn pattern(lba: u64, salt: u8, state: u8) -> u8 {
	(lba as u8).wrapping_mul(3).wrapping_add(salt).wrapping_add(state)
}

/// # Good Reply.
fn good(data: Vec<u8>) -> DeviceReply {
	DeviceReply {
		data,
		sense: None,
		elapsed: Duration::from_millis(1),
	}
}

/// # Check-Condition Reply.
fn check(s: Sense) -> DeviceReply {
	DeviceReply {
		data: Vec::new(),
		sense: Some(s),
		elapsed: Duration::from_millis(1),
	}
}



#[derive(Debug, Clone)]
/// # Kreon Drive Script.
pub(crate) struct Kreon {
	/// # Locked Capacity (Blocks) and PFI.
	pub(crate) video: (u32, Vec<u8>),

	/// # Xtreme Capacity (Blocks).
	pub(crate) xtreme_total: u32,

	/// # Wxripper Capacity (Blocks) and PFI.
	pub(crate) wx: (u32, Vec<u8>),

	/// # Security Sector Payload.
	pub(crate) ss: Vec<u8>,
}

#[derive(Debug, Clone)]
/// # One Thing On a Tape.
pub(crate) enum TapeItem {
	/// # A Data Block.
	Block(Vec<u8>),

	/// # A Filemark.
	Mark,

	/// # End of Medium (No-Sense Flavor).
	Eom,

	/// # A Blank-Check Region.
	Blank,
}

#[derive(Debug, Clone, Default)]
/// # Tape Simulation.
pub(crate) struct TapeSim {
	/// # The Script.
	pub(crate) items: Vec<TapeItem>,

	/// # Head Position (Item Index).
	pub(crate) pos: usize,

	/// # Locate (10) Support.
	pub(crate) can_locate: bool,

	/// # Locate (16) Support.
	pub(crate) can_locate_long: bool,

	/// # Current Partition.
	pub(crate) partition: u32,
}

#[derive(Debug, Default)]
/// # Scripted Device.
pub(crate) struct MockDevice {
	/// # Peripheral Kind.
	pub(crate) kind: Option<DeviceKind>,

	/// # Removable?
	pub(crate) removable: bool,

	/// # USB?
	pub(crate) usb: bool,

	/// # Scripted TEST UNIT READY Senses (Drained; Empty = Good).
	pub(crate) ready: VecDeque<Sense>,

	/// # READ CAPACITY (10): (Last LBA, Block Size).
	pub(crate) capacity10: Option<(u32, u32)>,

	/// # READ CAPACITY (16).
	pub(crate) capacity16: Option<(u64, u32)>,

	/// # Current MMC Profile.
	pub(crate) profile: Option<u16>,

	/// # Canned TOC Responses.
	pub(crate) toc: Option<Vec<u8>>,

	/// # Full TOC.
	pub(crate) full_toc: Option<Vec<u8>>,

	/// # ATIP.
	pub(crate) atip: Option<Vec<u8>>,

	/// # PMA.
	pub(crate) pma: Option<Vec<u8>>,

	/// # CD-Text.
	pub(crate) cd_text: Option<Vec<u8>>,

	/// # MCN Response.
	pub(crate) mcn: Option<Vec<u8>>,

	/// # ISRC Response (Any Track).
	pub(crate) isrc: Option<Vec<u8>>,

	/// # PFI (Non-Kreon).
	pub(crate) pfi: Option<Vec<u8>>,

	/// # DMI.
	pub(crate) dmi: Option<Vec<u8>>,

	/// # MODE SENSE (10) Pages, By Page Code.
	pub(crate) mode10_pages: HashMap<u8, Vec<u8>>,

	/// # MODE SENSE (6) Response.
	pub(crate) mode6_data: Option<Vec<u8>>,

	/// # Floppy Page Present?
	pub(crate) floppy_page: bool,

	/// # Addressable Blocks (Random Access Reads).
	pub(crate) blocks: u64,

	/// # Block Size.
	pub(crate) block_size: u32,

	/// # Sector Overrides (Cooked Content).
	pub(crate) sector_override: HashMap<u64, Vec<u8>>,

	/// # Failing LBAs: Remaining Failure Count.
	pub(crate) bad: HashMap<u64, u32>,

	/// # Largest Accepted Batch.
	pub(crate) max_batch: u32,

	/// # Pattern Salt.
	pub(crate) salt: u8,

	/// # Kill the Switch After N Successful Reads.
	pub(crate) kill_after_reads: Option<(u32, KillSwitch)>,

	/// # Kreon Script.
	pub(crate) kreon: Option<Kreon>,

	/// # Kreon State: 0 Video, 1 Xtreme, 2 Wxripper.
	pub(crate) kreon_state: u8,

	/// # Tape Simulation.
	pub(crate) tape: Option<TapeSim>,

	/// # Command Log.
	pub(crate) calls: Vec<String>,
}

impl MockDevice {
	/// # New, Mostly Empty.
	pub(crate) fn new(kind: DeviceKind) -> Self {
		Self {
			kind: Some(kind),
			max_batch: u32::MAX,
			..Self::default()
		}
	}

	/// # Generate (Or Fail) a Random-Access Read.
	fn random_read(&mut self, lba: u64, count: u32, block_size: u32) -> DeviceReply {
		self.calls.push(format!("read12 {lba} {count}"));

		if self.max_batch < count {
			return check(sense(SenseKey::IllegalRequest, 0x24, 0x00));
		}
		if self.blocks < lba + u64::from(count) {
			return check(sense(SenseKey::IllegalRequest, 0x21, 0x00));
		}
		for b in lba..lba + u64::from(count) {
			if let Some(left) = self.bad.get_mut(&b) {
				if *left != 0 {
					if *left != u32::MAX { *left -= 1; }
					return check(sense(SenseKey::MediumError, 0x11, 0x05));
				}
			}
		}

		// Success; maybe trip the kill switch for abort tests.
		if let Some((ref mut left, ref killed)) = self.kill_after_reads {
			if *left == 0 { killed.kill(); }
			else { *left -= 1; }
		}

		let mut data = Vec::with_capacity(count as usize * block_size as usize);
		for b in lba..lba + u64::from(count) {
			match self.sector_override.get(&b) {
				Some(s) => {
					let mut s = s.clone();
					s.resize(block_size as usize, 0);
					data.extend_from_slice(&s);
				},
				None => {
					let byte = pattern(b, self.salt, self.kreon_state);
					data.extend(std::iter::repeat(byte).take(block_size as usize));
				},
			}
		}
		good(data)
	}

	/// # Tape Items Before an Index That Are Blocks.
	fn tape_block_index(items: &[TapeItem], pos: usize) -> u64 {
		items.iter()
			.take(pos)
			.filter(|i| matches!(i, TapeItem::Block(_)))
			.count() as u64
	}
}

impl Device for MockDevice {
	fn kind(&self) -> DeviceKind { self.kind.unwrap_or(DeviceKind::Block) }

	fn removable(&self) -> bool { self.removable }

	fn usb(&self) -> bool { self.usb }

	fn test_unit_ready(&mut self, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		self.calls.push("tur".to_owned());
		Ok(match self.ready.pop_front() {
			Some(s) => check(s),
			None => good(Vec::new()),
		})
	}

	fn request_sense(&mut self, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		// No pending condition: an all-zero buffer that decodes to nothing.
		Ok(good(vec![0_u8; 18]))
	}

	fn read_capacity10(&mut self, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		self.calls.push("capacity10".to_owned());

		let answer = match (&self.kreon, self.kreon_state) {
			(Some(k), 0) => Some((k.video.0 - 1, 2048)),
			(Some(k), 1) => Some((k.xtreme_total - 1, 2048)),
			(Some(k), _) => Some((k.wx.0 - 1, 2048)),
			(None, _) => self.capacity10,
		};
		Ok(match answer {
			Some((last, bs)) => {
				let mut data = last.to_be_bytes().to_vec();
				data.extend_from_slice(&bs.to_be_bytes());
				good(data)
			},
			None => check(sense(SenseKey::IllegalRequest, 0x20, 0x00)),
		})
	}

	fn read_capacity16(&mut self, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		Ok(match self.capacity16 {
			Some((last, bs)) => {
				let mut data = last.to_be_bytes().to_vec();
				data.extend_from_slice(&bs.to_be_bytes());
				data.extend_from_slice(&[0; 20]);
				good(data)
			},
			None => check(sense(SenseKey::IllegalRequest, 0x20, 0x00)),
		})
	}

	fn read6(&mut self, fixed: bool, length: u32, block_size: u32, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		let Some(sim) = self.tape.as_mut() else {
			return Ok(check(sense(SenseKey::IllegalRequest, 0x20, 0x00)));
		};

		let requested = if fixed { length * block_size } else { length };
		let Some(item) = sim.items.get(sim.pos) else {
			return Ok(check(Sense {
				eom: true,
				..sense(SenseKey::BlankCheck, 0x00, 0x05)
			}));
		};

		Ok(match item {
			TapeItem::Eom => check(Sense {
				eom: true,
				..sense(SenseKey::NoSense, 0x00, 0x05)
			}),
			TapeItem::Blank => check(sense(SenseKey::BlankCheck, 0x00, 0x00)),
			TapeItem::Mark => {
				sim.pos += 1;
				check(Sense {
					filemark: true,
					..sense(SenseKey::NoSense, 0x00, 0x01)
				})
			},
			TapeItem::Block(data) => {
				let actual = data.len() as u32;
				if requested == actual {
					let data = data.clone();
					sim.pos += 1;
					good(data)
				}
				else {
					// Wrong length: report the residue, position advanced.
					sim.pos += 1;
					check(Sense {
						ili: true,
						info: Some(requested.wrapping_sub(actual)),
						..sense(SenseKey::NoSense, 0x00, 0x00)
					})
				}
			},
		})
	}

	fn read10(&mut self, lba: u32, blocks: u16, block_size: u32, _fua: bool, _dpo: bool, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		Ok(self.random_read(u64::from(lba), u32::from(blocks), block_size))
	}

	fn read12(&mut self, lba: u32, blocks: u32, block_size: u32, _fua: bool, _dpo: bool, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		Ok(self.random_read(u64::from(lba), blocks, block_size))
	}

	fn read16(&mut self, lba: u64, blocks: u32, block_size: u32, _fua: bool, _dpo: bool, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		Ok(self.random_read(lba, blocks, block_size))
	}

	fn read_cd(
		&mut self,
		lba: u32,
		blocks: u32,
		_kind: CdSectorKind,
		_headers: CdHeaderCodes,
		_edc_ecc: bool,
		_sub: CdSubchannel,
		_timeout: Duration,
	) -> Result<DeviceReply, DumpError> {
		Ok(self.random_read(u64::from(lba), blocks, 2352))
	}

	fn read_long10(&mut self, lba: u32, bytes: u16, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		Ok(self.random_read(u64::from(lba), 1, u32::from(bytes)))
	}

	fn read_disc_structure(
		&mut self,
		_media: StructureMedia,
		format: StructureFormat,
		_layer: u8,
		_agid: u8,
		_timeout: Duration,
	) -> Result<DeviceReply, DumpError> {
		let blob = match format {
			StructureFormat::Physical => match (&self.kreon, self.kreon_state) {
				(Some(k), 0) => Some(k.video.1.clone()),
				(Some(k), 2) => Some(k.wx.1.clone()),
				(Some(_), _) => None,
				(None, _) => self.pfi.clone(),
			},
			StructureFormat::Manufacturing => self.dmi.clone(),
			_ => None,
		};
		Ok(match blob {
			Some(b) => good(b),
			None => check(sense(SenseKey::IllegalRequest, 0x24, 0x00)),
		})
	}

	fn read_toc_pma_atip(&mut self, format: TocFormat, _msf: bool, _track_session: u8, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		let blob = match format {
			TocFormat::Toc => self.toc.clone(),
			TocFormat::FullToc => self.full_toc.clone(),
			TocFormat::Atip => self.atip.clone(),
			TocFormat::Pma => self.pma.clone(),
			TocFormat::CdText => self.cd_text.clone(),
			TocFormat::SessionInfo => None,
		};
		Ok(match blob {
			Some(b) => good(b),
			None => check(sense(SenseKey::IllegalRequest, 0x24, 0x00)),
		})
	}

	fn read_mcn(&mut self, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		Ok(match self.mcn.clone() {
			Some(b) => good(b),
			None => check(sense(SenseKey::IllegalRequest, 0x24, 0x00)),
		})
	}

	fn read_isrc(&mut self, _track: u8, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		Ok(match self.isrc.clone() {
			Some(b) => good(b),
			None => check(sense(SenseKey::IllegalRequest, 0x24, 0x00)),
		})
	}

	fn get_configuration(&mut self, _rt: u8, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		Ok(match self.profile {
			Some(p) => {
				let mut data = vec![0, 0, 0, 4, 0, 0];
				data.extend_from_slice(&p.to_be_bytes());
				good(data)
			},
			None => check(sense(SenseKey::IllegalRequest, 0x20, 0x00)),
		})
	}

	fn mode_sense6(&mut self, page: u8, _subpage: u8, _pc: ModePageControl, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		if page == 0x05 {
			return Ok(
				if self.floppy_page { good(vec![11, 0, 0, 0, 0x05, 0x1E]) }
				else { check(sense(SenseKey::IllegalRequest, 0x24, 0x00)) }
			);
		}
		Ok(match self.mode6_data.clone() {
			Some(b) => good(b),
			None => check(sense(SenseKey::IllegalRequest, 0x24, 0x00)),
		})
	}

	fn mode_sense10(&mut self, page: u8, _subpage: u8, _pc: ModePageControl, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		Ok(match self.mode10_pages.get(&page).cloned() {
			Some(b) => good(b),
			None => check(sense(SenseKey::IllegalRequest, 0x24, 0x00)),
		})
	}

	fn mode_select10(&mut self, _data: &[u8], _save: bool, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		self.calls.push("mode_select10".to_owned());
		Ok(good(Vec::new()))
	}

	fn rewind(&mut self, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		if let Some(sim) = self.tape.as_mut() {
			sim.pos = 0;
			sim.partition = 0;
		}
		Ok(good(Vec::new()))
	}

	fn read_position(&mut self, long: bool, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		let Some(sim) = self.tape.as_ref() else {
			return Ok(check(sense(SenseKey::IllegalRequest, 0x20, 0x00)));
		};
		let block = Self::tape_block_index(&sim.items, sim.pos);

		Ok(if long {
			let mut data = vec![0_u8; 4];
			data.extend_from_slice(&sim.partition.to_be_bytes());
			data.extend_from_slice(&block.to_be_bytes());
			data.extend_from_slice(&[0; 16]);
			good(data)
		}
		else {
			let mut data = vec![0_u8, sim.partition as u8, 0, 0];
			data.extend_from_slice(&(block as u32).to_be_bytes());
			data.extend_from_slice(&[0; 12]);
			good(data)
		})
	}

	fn locate(&mut self, block: u32, partition: u8, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		let Some(sim) = self.tape.as_mut() else {
			return Ok(check(sense(SenseKey::IllegalRequest, 0x20, 0x00)));
		};
		if ! sim.can_locate {
			return Ok(check(sense(SenseKey::IllegalRequest, 0x20, 0x00)));
		}
		if u32::from(partition) != sim.partition {
			// Partition switches only succeed if the script has one.
			return Ok(check(sense(SenseKey::IllegalRequest, 0x21, 0x00)));
		}
		sim.pos = block as usize;
		Ok(good(Vec::new()))
	}

	fn locate_long(&mut self, block: u64, partition: u8, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		let can = self.tape.as_ref().is_some_and(|s| s.can_locate_long);
		if can { self.locate(block as u32, partition, _timeout) }
		else { Ok(check(sense(SenseKey::IllegalRequest, 0x20, 0x00))) }
	}

	fn space(&mut self, kind: SpaceKind, count: i32, _timeout: Duration)
	-> Result<DeviceReply, DumpError> {
		if let Some(sim) = self.tape.as_mut() {
			if matches!(kind, SpaceKind::Blocks) {
				sim.pos = sim.pos.saturating_add_signed(count as isize);
			}
		}
		Ok(good(Vec::new()))
	}

	fn kreon_unlock_video(&mut self, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		self.calls.push("kreon video".to_owned());
		if self.kreon.is_some() {
			self.kreon_state = 0;
			Ok(good(Vec::new()))
		}
		else { Ok(check(sense(SenseKey::IllegalRequest, 0x20, 0x00))) }
	}

	fn kreon_unlock_xtreme(&mut self, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		self.calls.push("kreon xtreme".to_owned());
		if self.kreon.is_some() {
			self.kreon_state = 1;
			Ok(good(Vec::new()))
		}
		else { Ok(check(sense(SenseKey::IllegalRequest, 0x20, 0x00))) }
	}

	fn kreon_unlock_wxripper(&mut self, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		self.calls.push("kreon wxripper".to_owned());
		if self.kreon.is_some() {
			self.kreon_state = 2;
			Ok(good(Vec::new()))
		}
		else { Ok(check(sense(SenseKey::IllegalRequest, 0x20, 0x00))) }
	}

	fn kreon_security_sector(&mut self, _timeout: Duration) -> Result<DeviceReply, DumpError> {
		Ok(match self.kreon.as_ref() {
			Some(k) => good(k.ss.clone()),
			None => check(sense(SenseKey::IllegalRequest, 0x20, 0x00)),
		})
	}
}



#[derive(Debug, Default)]
/// # In-Memory Image Writer.
pub(crate) struct MemImage {
	/// # Written Sectors.
	pub(crate) sectors: HashMap<u64, Vec<u8>>,

	/// # Media Tags.
	pub(crate) tags: Vec<(MediaTagKind, Vec<u8>)>,

	/// # Track List.
	pub(crate) tracks: Vec<Track>,

	/// # Metadata.
	pub(crate) meta: Option<ImageMetadata>,

	/// # Dump Hardware Recorded?
	pub(crate) hardware: bool,

	/// # Tape Capable?
	pub(crate) tape_capable: bool,

	/// # Tape Flag Set?
	pub(crate) is_tape: bool,

	/// # Tape Files.
	pub(crate) files: Vec<TapeFile>,

	/// # Tape Partitions.
	pub(crate) parts: Vec<TapePartition>,

	/// # Closed?
	pub(crate) closed: bool,
}

impl ImageWriter for MemImage {
	fn write_sector(&mut self, lba: u64, data: &[u8]) -> Result<(), DumpError> {
		self.sectors.insert(lba, data.to_vec());
		Ok(())
	}

	fn write_sectors(&mut self, lba: u64, count: u32, data: &[u8]) -> Result<(), DumpError> {
		if count == 0 || data.len() % count as usize != 0 {
			return Err(DumpError::Bug("uneven sector payload"));
		}
		let per = data.len() / count as usize;
		for (i, chunk) in data.chunks_exact(per).enumerate() {
			self.sectors.insert(lba + i as u64, chunk.to_vec());
		}
		Ok(())
	}

	fn write_media_tag(&mut self, kind: MediaTagKind, data: &[u8]) -> Result<(), DumpError> {
		if self.tags.iter().any(|(k, _)| *k == kind) {
			return Err(DumpError::Bug("duplicate media tag"));
		}
		self.tags.push((kind, data.to_vec()));
		Ok(())
	}

	fn set_tracks(&mut self, tracks: &[Track]) -> Result<(), DumpError> {
		self.tracks = tracks.to_vec();
		Ok(())
	}

	fn set_dump_hardware(&mut self, _hw: &DumpHardware) -> Result<(), DumpError> {
		self.hardware = true;
		Ok(())
	}

	fn set_metadata(&mut self, meta: &ImageMetadata) -> Result<(), DumpError> {
		self.meta = Some(meta.clone());
		Ok(())
	}

	fn close(&mut self) -> Result<(), DumpError> {
		self.closed = true;
		Ok(())
	}

	fn tape(&mut self) -> Option<&mut dyn TapeWriter> {
		if self.tape_capable { Some(self) } else { None }
	}
}

impl TapeWriter for MemImage {
	fn set_tape(&mut self) { self.is_tape = true; }

	fn add_file(&mut self, file: TapeFile) -> Result<(), DumpError> {
		self.files.push(file);
		Ok(())
	}

	fn add_partition(&mut self, partition: TapePartition) -> Result<(), DumpError> {
		self.parts.push(partition);
		Ok(())
	}
}
