//! Anchor ownership and release bookkeeping
//!
//! An [`Anchor`] is a move-only handle: whoever holds it (a pending
//! measurement endpoint, a calibration step or a completed measurement)
//! owns it, and giving it back to [`AnchorStore::release`] consumes it.
//! The store keeps the set of live ids so that a release is never sent to
//! the session twice and a released anchor is never read again.

use crate::core::Pose;
use crate::session::{AnchorId, ArSession, HitResult, SessionResult};
use std::collections::BTreeSet;

/// Owned handle to a world anchor
#[derive(Debug, PartialEq, Eq)]
pub struct Anchor {
    id: AnchorId,
}

impl Anchor {
    pub fn id(&self) -> AnchorId {
        self.id
    }
}

/// Tracks anchors created through the session
#[derive(Debug, Default)]
pub struct AnchorStore {
    live: BTreeSet<AnchorId>,
    created: u64,
    released: u64,
}

impl AnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a new anchor at the hit location
    pub fn create<S: ArSession + ?Sized>(
        &mut self,
        session: &mut S,
        hit: &HitResult,
    ) -> SessionResult<Anchor> {
        let id = session.create_anchor(hit)?;
        self.live.insert(id);
        self.created += 1;
        log::debug!("created {} at {:?}", id, hit.pose.position);
        Ok(Anchor { id })
    }

    /// Release an owned anchor
    pub fn release<S: ArSession + ?Sized>(&mut self, session: &mut S, anchor: Anchor) -> bool {
        self.release_id(session, anchor.id)
    }

    /// Release by id. Releasing an id that is not live is a no-op and
    /// returns false.
    ///
    /// A detach failure reported by the session is logged and the anchor
    /// is still dropped from the live set; the leak belongs to the
    /// session, not to engine state.
    pub fn release_id<S: ArSession + ?Sized>(&mut self, session: &mut S, id: AnchorId) -> bool {
        if !self.live.remove(&id) {
            return false;
        }

        if let Err(e) = session.detach_anchor(id) {
            log::warn!("detaching {} failed: {}", id, e);
        }
        self.released += 1;
        log::debug!("released {}", id);
        true
    }

    /// Fresh pose of a live anchor. Must be read every frame; `None` when
    /// the anchor has been released or the session cannot report it.
    pub fn pose<S: ArSession + ?Sized>(&self, session: &S, anchor: &Anchor) -> Option<Pose> {
        self.pose_of(session, anchor.id)
    }

    pub fn pose_of<S: ArSession + ?Sized>(&self, session: &S, id: AnchorId) -> Option<Pose> {
        if !self.live.contains(&id) {
            return None;
        }

        match session.anchor_pose(id) {
            Ok(pose) => Some(pose),
            Err(e) => {
                log::warn!("pose of {} unavailable: {}", id, e);
                None
            }
        }
    }

    pub fn is_live(&self, id: AnchorId) -> bool {
        self.live.contains(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn created_count(&self) -> u64 {
        self.created
    }

    pub fn released_count(&self) -> u64 {
        self.released
    }
}
