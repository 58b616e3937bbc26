//! Free-slot queue
//!
//! Binary min-heap over slot numbers. Always hands out the smallest free
//! slot so that a released low slot is reused before a never-used high one.

use super::vehicle::SlotNumber;

/// Min-priority queue of free slot numbers
///
/// Backed by a dense `Vec` laid out as an implicit binary tree:
/// children of `i` live at `2i + 1` and `2i + 2`, the parent at `(i - 1) / 2`.
/// Callers must never insert a slot that is already present.
#[derive(Debug, Clone, Default)]
pub struct FreeSlotQueue {
    heap: Vec<SlotNumber>,
}

impl FreeSlotQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self { heap: Vec::new() }
    }

    /// Create an empty queue with room for `capacity` slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
        }
    }

    /// Return a slot to the free pool
    pub fn insert(&mut self, slot: SlotNumber) {
        self.heap.push(slot);
        self.sift_up(self.heap.len() - 1);
    }

    /// Remove and return the smallest free slot
    pub fn extract_min(&mut self) -> Option<SlotNumber> {
        if self.heap.is_empty() {
            return None;
        }

        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let min = self.heap.pop();

        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        min
    }

    /// Smallest free slot, without removing it
    pub fn peek_min(&self) -> Option<SlotNumber> {
        self.heap.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether `slot` is currently free (linear scan)
    /// Iterate over free slots in heap order (not sorted)
    pub fn iter(&self) -> impl Iterator<Item = SlotNumber> + '_ {
        self.heap.iter().copied()
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index] >= self.heap[parent] {
                break;
            }
            self.heap.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();

        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.heap[left] < self.heap[smallest] {
                smallest = left;
            }
            if right < len && self.heap[right] < self.heap[smallest] {
                smallest = right;
            }

            if smallest == index {
                break;
            }
            self.heap.swap(index, smallest);
            index = smallest;
        }
    }

    /// Check the heap property over the whole backing array
    pub(crate) fn is_valid_heap(&self) -> bool {
        (1..self.heap.len()).all(|i| self.heap[(i - 1) / 2] <= self.heap[i])
    }
}

impl FromIterator<SlotNumber> for FreeSlotQueue {
    fn from_iter<I: IntoIterator<Item = SlotNumber>>(iter: I) -> Self {
        let mut queue = FreeSlotQueue::new();
        for slot in iter {
            queue.insert(slot);
        }
        queue
    }
}
