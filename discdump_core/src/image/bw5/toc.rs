/*!
# Disc Dump: BW5 TOC Reconstruction
*/

use super::parse::RawSession;



#[expect(clippy::cast_possible_truncation, reason = "Clamped to ninety-nine.")]
/// # Rebuild a Full TOC.
///
/// The container stores descriptors rather than a drive-formatted TOC, so
/// one gets synthesized: eleven bytes per descriptor, metadata points
/// (`A0h+`) included, behind the standard `[size, size, first, last]`
/// preamble.
pub(super) fn rebuild_full_toc(sessions: &[RawSession]) -> Vec<u8> {
	let entries: usize = sessions.iter().map(|s| s.descriptors.len()).sum();
	let mut out = Vec::with_capacity(4 + entries * 11);

	// Lengths in TOC responses exclude the length field itself.
	let size = u16::try_from(entries * 11 + 2).unwrap_or(u16::MAX);
	out.extend_from_slice(&size.to_be_bytes());
	out.push(sessions.first().map_or(1, |s| s.sequence.min(99) as u8));
	out.push(sessions.last().map_or(1, |s| s.sequence.min(99) as u8));

	for session in sessions {
		for desc in &session.descriptors {
			out.push(session.sequence.min(99) as u8);
			out.push((desc.adr << 4) | (desc.ctl & 0x0F));
			out.push(0x00);
			out.push(desc.point);
			out.push(desc.msf[0]);
			out.push(desc.msf[1]);
			out.push(desc.msf[2]);
			out.push(desc.zero);
			out.push(desc.pmsf[0]);
			out.push(desc.pmsf[1]);
			out.push(desc.pmsf[2]);
		}
	}

	out
}



#[cfg(test)]
mod test {
	use super::*;
	use super::super::parse::RawDescriptor;

	/// # Hand-Rolled Descriptor.
	fn desc(adr: u8, ctl: u8, point: u8, pmsf: [u8; 3]) -> RawDescriptor {
		RawDescriptor {
			ttype: 2,
			adr,
			ctl,
			point,
			msf: [0, 0, 0],
			zero: 0,
			pmsf,
			pregap: 0,
			start: 0,
			sectors: 100,
			sequence: u16::from(point),
			session: 1,
		}
	}

	#[test]
	fn t_rebuild() {
		let sessions = vec![RawSession {
			sequence: 1,
			start: -150,
			end: 1000,
			first_track: 1,
			last_track: 1,
			descriptors: vec![
				desc(1, 4, 0xA0, [1, 0x20, 0]),
				desc(1, 4, 0xA1, [1, 0, 0]),
				desc(1, 4, 0xA2, [0, 44, 30]),
				desc(1, 4, 0x01, [0, 2, 0]),
			],
		}];

		let toc = rebuild_full_toc(&sessions);
		assert_eq!(toc.len(), 4 + 4 * 11);

		// Preamble: size excludes itself; one session either way.
		assert_eq!(&toc[..4], &[0, 46, 1, 1]);

		// First entry: session, packed adr/ctl, zero, point, then times.
		assert_eq!(&toc[4..15], &[1, 0x14, 0, 0xA0, 0, 0, 0, 0, 1, 0x20, 0]);

		// Last entry is the real track.
		assert_eq!(&toc[37..48], &[1, 0x14, 0, 0x01, 0, 0, 0, 0, 0, 2, 0]);
	}
}
