//! Completed measurements, in insertion order

use crate::api::formatting::{UnitFormatter, UnitSystem};
use crate::processing::{Anchor, AnchorStore};
use crate::session::ArSession;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic measurement identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeasurementId(pub u64);

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A distance between two anchors.
///
/// The raw distance is frozen when the measurement is created; the
/// displayed distance applies whatever calibration scale is current, so a
/// later calibration corrects history retroactively.
#[derive(Debug)]
pub struct Measurement {
    id: MeasurementId,
    start: Anchor,
    end: Anchor,
    raw_distance_m: f64,
}

impl Measurement {
    pub fn id(&self) -> MeasurementId {
        self.id
    }

    pub fn start(&self) -> &Anchor {
        &self.start
    }

    pub fn end(&self) -> &Anchor {
        &self.end
    }

    pub fn raw_distance_m(&self) -> f64 {
        self.raw_distance_m
    }

    pub fn display_distance_m(&self, scale: f64) -> f64 {
        self.raw_distance_m * scale
    }

    pub fn label(&self, scale: f64, unit: UnitSystem) -> String {
        UnitFormatter::format(self.display_distance_m(scale), unit)
    }

    /// Give both anchors back to the store
    pub fn release<S: ArSession + ?Sized>(self, anchors: &mut AnchorStore, session: &mut S) {
        anchors.release(session, self.start);
        anchors.release(session, self.end);
    }
}

/// Serializable view of a measurement for the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub id: MeasurementId,
    pub raw_distance_m: f64,
    pub display_distance_m: f64,
    pub label: String,
}

/// Append-only list of completed measurements
#[derive(Debug, Default)]
pub struct MeasurementHistory {
    entries: Vec<Measurement>,
    next_id: u64,
}

impl MeasurementHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measurement that takes ownership of both anchors.
    /// Ids keep increasing across clears.
    pub fn push(&mut self, start: Anchor, end: Anchor, raw_distance_m: f64) -> MeasurementId {
        self.next_id += 1;
        let id = MeasurementId(self.next_id);
        self.entries.push(Measurement {
            id,
            start,
            end,
            raw_distance_m,
        });
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Measurement> {
        self.entries.last()
    }

    pub fn get(&self, id: MeasurementId) -> Option<&Measurement> {
        self.entries.iter().find(|m| m.id == id)
    }

    /// Remove the most recent measurement, releasing its anchors
    pub fn remove_last<S: ArSession + ?Sized>(
        &mut self,
        anchors: &mut AnchorStore,
        session: &mut S,
    ) -> Option<MeasurementId> {
        let measurement = self.entries.pop()?;
        let id = measurement.id;
        measurement.release(anchors, session);
        Some(id)
    }

    /// Drop every measurement and release all their anchors. Returns the
    /// number of measurements removed.
    pub fn clear<S: ArSession + ?Sized>(&mut self, anchors: &mut AnchorStore, session: &mut S) -> usize {
        let count = self.entries.len();
        for measurement in self.entries.drain(..) {
            measurement.release(anchors, session);
        }
        count
    }

    /// Export for the persistence layer
    pub fn records(&self, scale: f64, unit: UnitSystem) -> Vec<MeasurementRecord> {
        self.entries
            .iter()
            .map(|m| MeasurementRecord {
                id: m.id,
                raw_distance_m: m.raw_distance_m,
                display_distance_m: m.display_distance_m(scale),
                label: m.label(scale, unit),
            })
            .collect()
    }
}
