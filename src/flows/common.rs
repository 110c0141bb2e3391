//! Shared helpers for flow implementations (cancellation checks, pauses, in-flight leases).

// crates.io
use async_lock::MutexGuardArc;
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	flows::{FlowGuards, FlowKey},
};

/// Fails with [`Error::Cancelled`] once `cancel` has fired.
///
/// Called before every network call; calls already dispatched always run to completion.
pub(crate) fn ensure_active(cancel: &CancellationToken) -> Result<()> {
	if cancel.is_cancelled() { Err(Error::Cancelled) } else { Ok(()) }
}

/// Sleeps for `interval` unless `cancel` fires first.
pub(crate) async fn pause(interval: StdDuration, cancel: &CancellationToken) -> Result<()> {
	if interval.is_zero() {
		return ensure_active(cancel);
	}

	tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(Error::Cancelled),
		_ = tokio::time::sleep(interval) => Ok(()),
	}
}

/// Exclusive claim on one transfer, released (and its map entry pruned) on drop.
///
/// Dropping covers every exit path, including a caller abandoning the funding future.
pub(crate) struct InFlightLease<'a> {
	guards: &'a Mutex<FlowGuards>,
	key: FlowKey,
	held: Option<MutexGuardArc<()>>,
}
impl<'a> InFlightLease<'a> {
	/// Claims `key`, or returns `None` while another flow holds it.
	pub(crate) fn claim(guards: &'a Mutex<FlowGuards>, key: FlowKey) -> Option<Self> {
		let mut map = guards.lock();
		let slot = map.entry(key.clone()).or_default().clone();
		let held = slot.try_lock_arc()?;

		drop(slot);
		drop(map);

		Some(Self { guards, key, held: Some(held) })
	}
}
impl Drop for InFlightLease<'_> {
	fn drop(&mut self) {
		drop(self.held.take());

		let mut map = self.guards.lock();

		if map.get(&self.key).is_some_and(|slot| Arc::strong_count(slot) == 1) {
			map.remove(&self.key);
		}
	}
}
