//! Stop placement with outward-only collision resolution
//!
//! Stops sharing a bin are placed one at a time. A new stop whose scaled
//! value lands within the separation diameter of an occupied position is
//! pushed just past it, and the push cascades over every further occupied
//! position it reaches. Collisions only ever resolve outward (toward larger
//! coordinates): a dense cluster spreads monotonically instead of packing
//! symmetrically. That policy is inherited from the visual design this
//! library feeds and must not be replaced by a general packing solution.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::types::StopSlot;

/// Extra displacement beyond the separation diameter applied on each push.
pub const COLLISION_EPSILON: f64 = 1.0;

/// Layout parameters shared by every bin lane.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutConfig {
    /// Minimum visual separation between stop centres
    pub min_separation: f64,
    /// Axis bound past which pushed stops are clamped
    pub max_position: Option<f64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_separation: 4.0,
            max_position: None,
        }
    }
}

/// Accumulates placed stops for a single bin.
///
/// The slot list is kept sorted descending by final position. Placement is
/// deterministic for a given insertion sequence but not order-independent:
/// permuting the insertions may legitimately yield a different layout.
#[derive(Debug, Clone)]
pub struct StopLane {
    bin: NaiveDate,
    config: LayoutConfig,
    slots: Vec<StopSlot>,
}

impl StopLane {
    pub fn new(bin: NaiveDate, config: LayoutConfig) -> Self {
        Self {
            bin,
            config,
            slots: Vec::new(),
        }
    }

    /// Place a stop at its raw scaled value, pushing outward past occupied
    /// positions.
    ///
    /// The first stop of a lane always keeps its raw value. The collision
    /// scan walks occupied positions from smallest to largest so a push
    /// cascades past every position it lands on; each push moves the stop to
    /// `occupied + 2 * min_separation + COLLISION_EPSILON`. If the final
    /// position exceeds the configured axis bound it is clamped and the slot
    /// marked, which is the one case where the separation guarantee no
    /// longer holds.
    pub fn place(&mut self, speaker: &str, axis_value: f64) -> &StopSlot {
        let diameter = 2.0 * self.config.min_separation;
        let mut position = axis_value;
        for slot in self.slots.iter().rev() {
            if (position - slot.position).abs() <= diameter {
                position = slot.position + diameter + COLLISION_EPSILON;
            }
        }

        let mut clamped = false;
        if let Some(max) = self.config.max_position {
            if position > max {
                warn!(
                    bin = %self.bin,
                    speaker,
                    position,
                    bound = max,
                    "stop pushed past the axis bound, clamping"
                );
                position = max;
                clamped = true;
            }
        }

        let slot = StopSlot {
            speaker: speaker.to_string(),
            bin: self.bin,
            axis_value,
            position,
            clamped,
        };
        let at = self.slots.partition_point(|s| s.position > position);
        self.slots.insert(at, slot);
        &self.slots[at]
    }

    pub fn bin(&self) -> NaiveDate {
        self.bin
    }

    /// Placed slots, sorted descending by final position.
    ///
    /// A slot's index in this list is its offset step on the shared
    /// timeline lane.
    pub fn slots(&self) -> &[StopSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin() -> NaiveDate {
        NaiveDate::from_ymd_opt(2011, 1, 1).unwrap()
    }

    fn lane(min_separation: f64, max_position: Option<f64>) -> StopLane {
        StopLane::new(
            bin(),
            LayoutConfig {
                min_separation,
                max_position,
            },
        )
    }

    #[test]
    fn first_slot_keeps_raw_value() {
        let mut lane = lane(4.0, None);
        let slot = lane.place("A", 137.5);
        assert_eq!(slot.position, 137.5);
        assert_eq!(slot.offset(), 0.0);
        assert!(!slot.clamped);
    }

    #[test]
    fn colliding_slot_is_pushed_past_the_occupied_position() {
        let mut lane = lane(4.0, None);
        lane.place("A", 100.0);
        let slot = lane.place("B", 101.0).clone();
        assert!(slot.position >= 108.0);
        assert_eq!(slot.position, 109.0); // 100 + 2*4 + epsilon
        assert_eq!(slot.axis_value, 101.0);
    }

    #[test]
    fn distant_slot_is_not_displaced() {
        let mut lane = lane(4.0, None);
        lane.place("A", 100.0);
        let slot = lane.place("B", 150.0).clone();
        assert_eq!(slot.position, 150.0);
    }

    #[test]
    fn push_cascades_over_consecutive_occupied_positions() {
        let mut lane = lane(4.0, None);
        lane.place("A", 100.0);
        lane.place("B", 118.0);
        lane.place("C", 101.0); // pushed to 109, clear of 118
        let slot = lane.place("D", 104.0).clone();
        // 104 collides with 100 -> 109, with 109 -> 118, with 118 -> 127
        assert_eq!(slot.position, 127.0);
    }

    #[test]
    fn slots_stay_sorted_descending() {
        let mut lane = lane(4.0, None);
        for value in [100.0, 150.0, 101.0, 130.0] {
            lane.place("A", value);
        }
        let positions: Vec<f64> = lane.slots().iter().map(|s| s.position).collect();
        let mut sorted = positions.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(positions, sorted);
    }

    #[test]
    fn unclamped_slots_respect_minimum_separation() {
        let mut lane = lane(4.0, None);
        for value in [100.0, 101.0, 99.5, 104.0, 100.2, 150.0, 149.0, 120.0] {
            lane.place("A", value);
        }
        let slots = lane.slots();
        for i in 0..slots.len() {
            for j in (i + 1)..slots.len() {
                let gap = (slots[i].position - slots[j].position).abs();
                assert!(
                    gap >= lane.config.min_separation,
                    "slots at {} and {} are only {} apart",
                    slots[i].position,
                    slots[j].position,
                    gap
                );
            }
        }
    }

    #[test]
    fn overflow_clamps_and_marks_the_slot() {
        let mut lane = lane(4.0, Some(112.0));
        lane.place("A", 100.0);
        lane.place("B", 101.0); // pushed to 109, inside the bound
        let slot = lane.place("C", 102.0).clone(); // would cascade to 118
        assert_eq!(slot.position, 112.0);
        assert!(slot.clamped);
    }

    #[test]
    fn layout_depends_on_insertion_order() {
        let mut forward = lane(4.0, None);
        forward.place("A", 100.0);
        forward.place("B", 101.0);

        let mut reversed = lane(4.0, None);
        reversed.place("B", 101.0);
        reversed.place("A", 100.0);

        let forward_positions: Vec<f64> =
            forward.slots().iter().map(|s| s.position).collect();
        let reversed_positions: Vec<f64> =
            reversed.slots().iter().map(|s| s.position).collect();
        assert_eq!(forward_positions, vec![109.0, 100.0]);
        assert_eq!(reversed_positions, vec![110.0, 101.0]);
        assert_ne!(forward_positions, reversed_positions);
    }
}
