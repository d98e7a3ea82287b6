/*!
# Disc Dump: Extents
*/



#[derive(Debug, Clone, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<(u64, u64)>", into = "Vec<(u64, u64)>")]
/// # Extent Set.
///
/// A set of non-overlapping, non-adjacent, half-open LBA intervals, kept
/// sorted. The dump pipelines use these to record which regions have been
/// successfully read; the resume side-car stores them as plain
/// `(start, end)` pairs.
///
/// Adjacent and overlapping additions are merged on the spot, so the pair
/// representation round-trips losslessly.
pub struct Extents(Vec<(u64, u64)>);

impl Extents {
	#[must_use]
	/// # New (Empty).
	pub const fn new() -> Self { Self(Vec::new()) }

	/// # Add One Block.
	pub fn add(&mut self, lba: u64) { self.add_span(lba, 1); }

	/// # Add a Span.
	///
	/// Zero-length spans are ignored.
	pub fn add_span(&mut self, lba: u64, len: u64) {
		let Some(end) = lba.checked_add(len) else { return; };
		if end == lba { return; }

		// Find the first interval that could touch ours. Merging treats
		// adjacency as overlap, hence the off-by-one comparisons.
		let start_idx = self.0.partition_point(|&(_, e)| e < lba);
		let mut merged = (lba, end);
		let mut remove = start_idx..start_idx;

		for (idx, &(s, e)) in self.0.iter().enumerate().skip(start_idx) {
			if end < s { break; }
			merged.0 = merged.0.min(s);
			merged.1 = merged.1.max(e);
			remove.end = idx + 1;
		}

		if remove.is_empty() { self.0.insert(start_idx, merged); }
		else {
			self.0[remove.start] = merged;
			self.0.drain(remove.start + 1..remove.end);
		}
	}

	#[must_use]
	/// # Contains a Block?
	pub fn contains(&self, lba: u64) -> bool {
		let idx = self.0.partition_point(|&(_, e)| e <= lba);
		self.0.get(idx).is_some_and(|&(s, _)| s <= lba)
	}

	#[must_use]
	/// # Contains a Whole Span?
	///
	/// `true` if every block of `[lba, lba + len)` is covered by a single
	/// interval (which, post-merge, is the only way it can be covered at
	/// all). Zero-length spans are vacuously contained.
	pub fn contains_span(&self, lba: u64, len: u64) -> bool {
		let Some(end) = lba.checked_add(len) else { return false; };
		if end == lba { return true; }
		let idx = self.0.partition_point(|&(_, e)| e < end);
		self.0.get(idx).is_some_and(|&(s, e)| s <= lba && end <= e)
	}

	#[must_use]
	/// # Empty?
	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	#[must_use]
	/// # Interval Count.
	pub fn len(&self) -> usize { self.0.len() }

	#[must_use]
	/// # Covered Block Total.
	pub fn total_blocks(&self) -> u64 {
		self.0.iter().map(|&(s, e)| e - s).sum()
	}

	#[must_use]
	/// # As Sorted Pairs.
	pub fn as_pairs(&self) -> &[(u64, u64)] { &self.0 }

	#[must_use]
	/// # Into Sorted Pairs.
	pub fn into_pairs(self) -> Vec<(u64, u64)> { self.0 }

	#[must_use]
	/// # From Sorted Pairs.
	///
	/// Rebuild a set from a pair list; out-of-order, overlapping, or
	/// adjacent inputs are normalized the same way live additions are, so
	/// `from_pairs(x.into_pairs()) == x` always holds.
	pub fn from_pairs<I: IntoIterator<Item = (u64, u64)>>(src: I) -> Self {
		let mut out = Self::new();
		for (s, e) in src {
			if s < e { out.add_span(s, e - s); }
		}
		out
	}
}

impl From<Vec<(u64, u64)>> for Extents {
	#[inline]
	fn from(src: Vec<(u64, u64)>) -> Self { Self::from_pairs(src) }
}

impl From<Extents> for Vec<(u64, u64)> {
	#[inline]
	fn from(src: Extents) -> Self { src.0 }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_add_merge() {
		let mut ext = Extents::new();
		assert!(ext.is_empty());

		ext.add(5);
		ext.add(7);
		assert_eq!(ext.as_pairs(), &[(5, 6), (7, 8)]);

		// Adjacency merges.
		ext.add(6);
		assert_eq!(ext.as_pairs(), &[(5, 8)]);

		// Overlap merges, including across several intervals.
		ext.add_span(20, 5);
		ext.add_span(30, 5);
		ext.add_span(0, 100);
		assert_eq!(ext.as_pairs(), &[(0, 100)]);
		assert_eq!(ext.total_blocks(), 100);

		// Duplicates are no-ops.
		ext.add(50);
		assert_eq!(ext.as_pairs(), &[(0, 100)]);

		// Zero-length spans too.
		ext.add_span(200, 0);
		assert_eq!(ext.len(), 1);
	}

	#[test]
	fn t_contains() {
		let mut ext = Extents::new();
		ext.add_span(10, 5);
		ext.add_span(100, 1);

		assert!(! ext.contains(9));
		assert!(ext.contains(10));
		assert!(ext.contains(14));
		assert!(! ext.contains(15));
		assert!(ext.contains(100));
		assert!(! ext.contains(101));

		assert!(ext.contains_span(10, 5));
		assert!(ext.contains_span(11, 2));
		assert!(! ext.contains_span(10, 6));
		assert!(! ext.contains_span(14, 2));
		assert!(ext.contains_span(3, 0));
	}

	#[test]
	fn t_round_trip() {
		// For every sequence of additions, pairs → set → pairs must be
		// lossless.
		let scripts: [&[(u64, u64)]; 4] = [
			&[(0, 1), (1, 1), (2, 1)],
			&[(10, 5), (0, 5), (5, 5)],
			&[(100, 50), (10, 1), (60, 40)],
			&[(3, 2), (9, 2), (6, 2), (0, 2)],
		];
		for script in scripts {
			let mut ext = Extents::new();
			for &(lba, len) in script { ext.add_span(lba, len); }

			let pairs = ext.clone().into_pairs();
			assert!(pairs.windows(2).all(|w| w[0].1 < w[1].0), "Pairs disordered!");
			assert_eq!(Extents::from_pairs(pairs), ext);
		}
	}
}
