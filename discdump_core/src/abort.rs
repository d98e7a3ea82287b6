/*!
# Disc Dump: Kill Switch
*/

use std::sync::{
	Arc,
	atomic::{
		AtomicBool,
		Ordering::{
			Acquire,
			Release,
		},
	},
};



#[derive(Debug, Clone, Default)]
/// # Kill Switch.
///
/// A shared abort flag for the dump pipelines. The pipelines poll it between
/// sector batches and at every state transition; once set they flush the
/// current extent, persist the resume record, close the image, and return
/// [`DumpError::Killed`](crate::DumpError::Killed) without synthesizing any
/// further "successful" sectors.
///
/// Embedders typically set the flag from a CTRL-C intercept or UI thread.
pub struct KillSwitch(Arc<AtomicBool>);

impl KillSwitch {
	#[must_use]
	/// # New (Unset).
	pub fn new() -> Self { Self::default() }

	#[must_use]
	/// # Dead?
	pub fn killed(&self) -> bool { self.0.load(Acquire) }

	/// # Pull the Plug.
	///
	/// Idempotent; the flag can never be unset.
	pub fn kill(&self) { self.0.store(true, Release); }

	#[must_use]
	/// # Inner Clone.
	///
	/// Share the raw flag with e.g. a signal handler.
	pub fn inner(&self) -> Arc<AtomicBool> { Arc::clone(&self.0) }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_kill() {
		let k1 = KillSwitch::new();
		let k2 = k1.clone();
		assert!(! k1.killed());
		assert!(! k2.killed());

		k2.kill();
		assert!(k1.killed());
		assert!(k2.killed());
	}
}
