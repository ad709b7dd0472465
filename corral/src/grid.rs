//! The schedule grid: the authoritative allocation calendar.
//!
//! The grid is an ordered sequence of time slices, each holding one slot
//! per physical node. A slot stores the identifier of the reservation
//! occupying that node during that slice, or `0` for free.

use serde::{Deserialize, Serialize};

/// Sentinel slot value meaning "no reservation".
pub const FREE: u64 = 0;

/// One time bucket of the schedule: a slot per physical node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlice {
    nodes: Vec<u64>,
}

impl TimeSlice {
    /// Returns the slot values for this slice, one per node.
    #[must_use]
    pub fn nodes(&self) -> &[u64] {
        &self.nodes
    }
}

/// The time/node allocation grid.
///
/// Invariants:
/// - every slice has the same number of node slots;
/// - a slot holds at most one non-zero reservation identifier; allocation
///   never double-books a node within a slice.
///
/// The grid holds only identifiers, never reservation data, so deleting a
/// reservation from the store cannot leave dangling references here.
///
/// # Examples
///
/// ```
/// use corral::ScheduleGrid;
///
/// let mut grid = ScheduleGrid::new(3, 4);
/// grid.assign(0..3, 1, 7).unwrap();
/// assert!(grid.contains(7));
///
/// let cleared = grid.clear(7);
/// assert_eq!(cleared, 3);
/// assert!(!grid.contains(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleGrid {
    slices: Vec<TimeSlice>,
}

impl ScheduleGrid {
    /// Creates a grid of `num_slices` time slices, each with `num_nodes`
    /// free node slots.
    #[must_use]
    pub fn new(num_slices: usize, num_nodes: usize) -> Self {
        Self {
            slices: vec![
                TimeSlice {
                    nodes: vec![FREE; num_nodes]
                };
                num_slices
            ],
        }
    }

    /// Returns the time slices in order.
    #[must_use]
    pub fn slices(&self) -> &[TimeSlice] {
        &self.slices
    }

    /// Returns the number of time slices.
    #[must_use]
    pub fn num_slices(&self) -> usize {
        self.slices.len()
    }

    /// Returns the number of node slots per slice.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.slices.first().map_or(0, |s| s.nodes.len())
    }

    /// Marks `id` into `slot` for every slice in `slices`.
    ///
    /// This is the output shape of the (out-of-scope) allocation path: a
    /// reservation occupies one slot across a contiguous run of slices.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice range or slot is out of bounds, if
    /// `id` is the free sentinel, or if any targeted cell is already
    /// booked by a different reservation.
    pub fn assign(
        &mut self,
        slices: std::ops::Range<usize>,
        slot: usize,
        id: u64,
    ) -> crate::error::Result<()> {
        if id == FREE {
            return Err(crate::error::Error::Validation {
                field: "id".into(),
                message: "cannot assign the free sentinel to a grid cell".into(),
            });
        }
        if slices.end > self.slices.len() {
            return Err(crate::error::Error::Validation {
                field: "slices".into(),
                message: format!(
                    "slice range {}..{} exceeds grid length {}",
                    slices.start,
                    slices.end,
                    self.slices.len()
                ),
            });
        }
        if slot >= self.num_nodes() {
            return Err(crate::error::Error::Validation {
                field: "slot".into(),
                message: format!("slot {slot} exceeds node count {}", self.num_nodes()),
            });
        }

        // Check every targeted cell before mutating any of them.
        for index in slices.clone() {
            let current = self.slices[index].nodes[slot];
            if current != FREE && current != id {
                return Err(crate::error::Error::ScheduleConflict {
                    details: format!(
                        "slice {index} slot {slot} is held by reservation {current}"
                    ),
                });
            }
        }

        for index in slices {
            self.slices[index].nodes[slot] = id;
        }
        Ok(())
    }

    /// Zeroes every cell holding `id`, scanning the entire grid.
    ///
    /// Returns the number of cells cleared. Calling this with an
    /// identifier that appears nowhere is a no-op; calling it twice is
    /// equivalent to calling it once.
    pub fn clear(&mut self, id: u64) -> usize {
        let mut cleared = 0;
        for slice in &mut self.slices {
            for slot in &mut slice.nodes {
                if *slot == id {
                    *slot = FREE;
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Returns `(slice, slot)` coordinates of every cell holding `id`.
    #[must_use]
    pub fn occupancy(&self, id: u64) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for (slice_index, slice) in self.slices.iter().enumerate() {
            for (slot_index, slot) in slice.nodes.iter().enumerate() {
                if *slot == id {
                    cells.push((slice_index, slot_index));
                }
            }
        }
        cells
    }

    /// Checks whether any cell holds `id`.
    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.slices
            .iter()
            .any(|slice| slice.nodes.contains(&id))
    }

    /// Reconstructs a grid from stored cell values.
    ///
    /// Used by the persistence layer: `cells` holds `(slice, slot, id)`
    /// triples for occupied cells only.
    ///
    /// # Errors
    ///
    /// Returns an error if any cell coordinate is out of bounds for the
    /// given dimensions.
    pub fn from_cells(
        num_slices: usize,
        num_nodes: usize,
        cells: &[(usize, usize, u64)],
    ) -> crate::error::Result<Self> {
        let mut grid = Self::new(num_slices, num_nodes);
        for &(slice, slot, id) in cells {
            if slice >= num_slices || slot >= num_nodes {
                return Err(crate::error::Error::Validation {
                    field: "schedule".into(),
                    message: format!(
                        "stored cell ({slice}, {slot}) exceeds grid dimensions {num_slices}x{num_nodes}"
                    ),
                });
            }
            grid.slices[slice].nodes[slot] = id;
        }
        Ok(grid)
    }
}
