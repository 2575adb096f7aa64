/// Marker stored in the position table for insertion indices that are no longer in the heap.
pub const NOT_IN_HEAP: usize = usize::MAX;

/// Strict ordering used by [`IndexedMinHeap`].
///
/// `less` must be a strict weak order. Elements that compare equal are popped in an unspecified
/// order, so callers that need deterministic results must break ties themselves.
pub trait HeapOrder<T> {
    /// Perform `<` comparison.
    fn less(&self, lhs: &T, rhs: &T) -> bool;
}

/// Orders elements by their [`PartialOrd`] implementation.
#[derive(Copy, Clone, Debug, Default)]
pub struct Natural;

impl<T: PartialOrd> HeapOrder<T> for Natural {
    #[inline(always)]
    fn less(&self, lhs: &T, rhs: &T) -> bool {
        lhs < rhs
    }
}

impl<T, F: Fn(&T, &T) -> bool> HeapOrder<T> for F {
    #[inline(always)]
    fn less(&self, lhs: &T, rhs: &T) -> bool {
        self(lhs, rhs)
    }
}

struct Slot<T> {
    value: T,
    index: usize,
}

/// Binary min-heap whose elements can be addressed by a permanent insertion index.
///
/// Every element receives an insertion index when it enters the heap. The index never changes
/// while the element moves around the heap array, and is not reused until the heap is flushed.
/// The heap keeps a table from insertion index to array slot so that the value of an element can
/// be changed in `O(log n)` with [`IndexedMinHeap::modify`], which is the decrease-key operation
/// needed by A*-style searches.
///
/// The `blind_*` operations skip maintaining the position table. They put the heap in blind mode,
/// in which indexed operations panic until [`IndexedMinHeap::construct_where_is`] is called.
pub struct IndexedMinHeap<T, O = Natural> {
    order: O,
    heap: Vec<Slot<T>>,
    where_is: Vec<usize>,
    next_index: usize,
    blind: bool,
}

impl<T: PartialOrd> IndexedMinHeap<T> {
    /// Creates an empty heap ordered by `PartialOrd`.
    pub fn new() -> Self {
        Self::with_order(Natural)
    }
}

impl<T: PartialOrd> Default for IndexedMinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, O: HeapOrder<T>> IndexedMinHeap<T, O> {
    /// Creates an empty heap using the given ordering.
    pub fn with_order(order: O) -> Self {
        IndexedMinHeap {
            order,
            heap: vec![],
            where_is: vec![],
            next_index: 0,
            blind: false,
        }
    }

    /// Number of elements in the heap.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the heap has no elements.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether the position table is out of date.
    pub fn is_blind(&self) -> bool {
        self.blind
    }

    /// Returns the minimum element without removing it.
    pub fn top(&self) -> Option<&T> {
        self.heap.first().map(|slot| &slot.value)
    }

    /// Inserts an element and returns its insertion index.
    pub fn push(&mut self, value: T) -> usize {
        let index = self.issue_index();
        self.heap.push(Slot { value, index });
        self.sift_up(self.heap.len() - 1);
        index
    }

    /// Removes and returns the minimum element.
    pub fn pop(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let ret = self.heap.swap_remove(0);
        if !self.blind {
            self.where_is[ret.index] = NOT_IN_HEAP;
        }
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(ret.value)
    }

    /// Adds all `values` and restores heap order bottom-up.
    ///
    /// Elements receive consecutive insertion indices in iteration order. Returns the insertion
    /// index of the first element, which is also the next index to be issued if `values` is empty.
    pub fn make_heap(&mut self, values: impl IntoIterator<Item = T>) -> usize {
        let first = self.next_index;
        for value in values {
            let index = self.issue_index();
            self.heap.push(Slot { value, index });
        }
        for pos in (0..self.heap.len() / 2).rev() {
            self.sift_down(pos);
        }
        if !self.blind {
            // Leaves that never moved were not recorded by sift_down.
            for (pos, slot) in self.heap.iter().enumerate() {
                self.where_is[slot.index] = pos;
            }
        }
        first
    }

    /// [`push`](Self::push) without maintaining the position table.
    pub fn blind_push(&mut self, value: T) -> usize {
        self.blind = true;
        self.push(value)
    }

    /// [`pop`](Self::pop) without maintaining the position table.
    pub fn blind_pop(&mut self) -> Option<T> {
        self.blind = true;
        self.pop()
    }

    /// [`make_heap`](Self::make_heap) without maintaining the position table.
    pub fn blind_make_heap(&mut self, values: impl IntoIterator<Item = T>) -> usize {
        self.blind = true;
        self.make_heap(values)
    }

    /// Rebuilds the position table and leaves blind mode.
    pub fn construct_where_is(&mut self) {
        self.where_is.clear();
        self.where_is.resize(self.next_index, NOT_IN_HEAP);
        for (pos, slot) in self.heap.iter().enumerate() {
            self.where_is[slot.index] = pos;
        }
        self.blind = false;
    }

    /// Whether the element with the given insertion index is still in the heap.
    #[track_caller]
    pub fn contains(&self, index: usize) -> bool {
        self.slot_of(index).is_some()
    }

    /// Returns the value of the element with the given insertion index, if it is still in the
    /// heap.
    #[track_caller]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slot_of(index).map(|pos| &self.heap[pos].value)
    }

    /// Replaces the value of the element with the given insertion index and restores heap order.
    ///
    /// # Panics
    /// Panics if the heap is blind, or if `index` was never issued or its element has already
    /// been popped.
    #[track_caller]
    pub fn modify(&mut self, index: usize, value: T) {
        let Some(pos) = self.slot_of(index) else {
            panic!("insertion index {index} is not in the heap");
        };
        self.heap[pos].value = value;
        let pos = self.sift_up(pos);
        self.sift_down(pos);
    }

    /// Removes every element and restarts insertion indices at zero, keeping allocations.
    pub fn flush(&mut self) {
        self.heap.clear();
        self.where_is.clear();
        self.next_index = 0;
        self.blind = false;
    }

    /// Like [`flush`](Self::flush), but also releases the backing storage.
    pub fn force_flush(&mut self) {
        self.flush();
        self.heap = vec![];
        self.where_is = vec![];
    }

    /// Values in heap array order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.heap.iter().map(|slot| &slot.value)
    }

    #[track_caller]
    fn slot_of(&self, index: usize) -> Option<usize> {
        assert!(!self.blind, "indexed access to a blind heap");
        match self.where_is.get(index) {
            Some(&pos) if pos != NOT_IN_HEAP => Some(pos),
            _ => None,
        }
    }

    fn issue_index(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        if !self.blind {
            self.where_is.push(NOT_IN_HEAP);
        }
        index
    }

    #[inline(always)]
    fn record(&mut self, pos: usize) {
        if !self.blind {
            self.where_is[self.heap[pos].index] = pos;
        }
    }

    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent_index = (index - 1) / 2;
            if !self
                .order
                .less(&self.heap[index].value, &self.heap[parent_index].value)
            {
                break;
            }
            self.heap.swap(index, parent_index);
            self.record(index);
            index = parent_index;
        }
        self.record(index);
        index
    }

    fn sift_down(&mut self, mut index: usize) -> usize {
        loop {
            let child_1_index = index * 2 + 1;
            if child_1_index >= self.heap.len() {
                break;
            }

            let child_2_index = child_1_index + 1;
            let child_index = if child_2_index < self.heap.len()
                && self
                    .order
                    .less(&self.heap[child_2_index].value, &self.heap[child_1_index].value)
            {
                child_2_index
            } else {
                child_1_index
            };

            if !self
                .order
                .less(&self.heap[child_index].value, &self.heap[index].value)
            {
                break;
            }

            self.heap.swap(index, child_index);
            self.record(index);
            index = child_index;
        }
        self.record(index);
        index
    }
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;
    use rand::Rng;
    use rand_pcg::Pcg64;

    use super::*;

    fn rng() -> Pcg64 {
        Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96)
    }

    fn check_invariants<T, O: HeapOrder<T>>(heap: &IndexedMinHeap<T, O>) {
        for i in 1..heap.heap.len() {
            let parent = (i - 1) / 2;
            assert!(
                !heap.order.less(&heap.heap[i].value, &heap.heap[parent].value),
                "heap order violated at slot {i}"
            );
        }
        if !heap.blind {
            assert_eq!(heap.where_is.len(), heap.next_index);
            for (pos, slot) in heap.heap.iter().enumerate() {
                assert_eq!(heap.where_is[slot.index], pos);
            }
            let live = heap.where_is.iter().filter(|&&p| p != NOT_IN_HEAP).count();
            assert_eq!(live, heap.heap.len());
        }
    }

    #[test]
    fn pops_permutation_in_order() {
        let mut rng = rng();
        let mut values: Vec<u32> = (0..500).collect();
        values.shuffle(&mut rng);

        let mut heap = IndexedMinHeap::new();
        for &v in &values {
            heap.push(v);
        }
        check_invariants(&heap);

        let mut popped = vec![];
        while let Some(v) = heap.pop() {
            popped.push(v);
        }
        assert_eq!(popped, (0..500).collect::<Vec<_>>());
        assert!(heap.is_empty());
    }

    #[test]
    fn decrease_key() {
        let mut heap = IndexedMinHeap::new();
        heap.push(5);
        heap.push(3);
        let eight = heap.push(8);
        assert_eq!(heap.top(), Some(&3));

        heap.modify(eight, 1);
        assert_eq!(heap.top(), Some(&1));
        assert_eq!(heap.get(eight), Some(&1));
        check_invariants(&heap);
    }

    #[test]
    fn increase_key_sinks() {
        let mut heap = IndexedMinHeap::new();
        let first = heap.make_heap([1, 4, 6, 9]);
        assert_eq!(first, 0);
        heap.modify(first, 7);
        check_invariants(&heap);
        assert_eq!(heap.pop(), Some(4));
        assert_eq!(heap.pop(), Some(6));
        assert_eq!(heap.pop(), Some(7));
        assert_eq!(heap.pop(), Some(9));
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn random_operations_keep_invariants() {
        let mut rng = rng();
        let mut heap = IndexedMinHeap::new();
        let mut live = vec![];

        for _ in 0..2000 {
            match rng.gen_range(0..3) {
                0 => {
                    let index = heap.push(rng.gen_range(0..1000));
                    live.push(index);
                }
                1 => {
                    if let Some(min) = heap.top().copied() {
                        assert_eq!(heap.pop(), Some(min));
                        live.retain(|&i| heap.contains(i));
                    }
                }
                _ => {
                    if !live.is_empty() {
                        let index = live[rng.gen_range(0..live.len())];
                        heap.modify(index, rng.gen_range(0..1000));
                    }
                }
            }
            check_invariants(&heap);
        }
    }

    #[test]
    fn insertion_indices_are_not_reused() {
        let mut heap = IndexedMinHeap::new();
        let a = heap.push(2);
        assert_eq!(heap.pop(), Some(2));
        let b = heap.push(2);
        assert_ne!(a, b);
        assert!(!heap.contains(a));
        assert!(heap.contains(b));
    }

    #[test]
    fn make_heap_appends_indices() {
        let mut heap = IndexedMinHeap::new();
        heap.push(10);
        heap.push(20);
        let first = heap.make_heap([15, 3, 30]);
        assert_eq!(first, 2);
        check_invariants(&heap);
        assert_eq!(heap.get(first + 1), Some(&3));
        assert_eq!(heap.top(), Some(&3));
        assert_eq!(heap.len(), 5);
    }

    #[test]
    fn blind_mode_requires_rebuild() {
        let mut heap = IndexedMinHeap::new();
        let first = heap.blind_make_heap([9, 8, 7, 6, 5]);
        heap.blind_push(4);
        assert!(heap.is_blind());
        assert_eq!(heap.blind_pop(), Some(4));
        check_invariants(&heap);

        heap.construct_where_is();
        assert!(!heap.is_blind());
        check_invariants(&heap);

        heap.modify(first, 0);
        assert_eq!(heap.top(), Some(&0));
        check_invariants(&heap);
    }

    #[test]
    #[should_panic(expected = "blind")]
    fn blind_modify_panics() {
        let mut heap = IndexedMinHeap::new();
        let index = heap.blind_push(1);
        heap.modify(index, 0);
    }

    #[test]
    #[should_panic(expected = "not in the heap")]
    fn stale_index_panics() {
        let mut heap = IndexedMinHeap::new();
        let index = heap.push(1);
        heap.pop();
        heap.modify(index, 0);
    }

    #[test]
    fn flush_restarts_indices() {
        let mut heap = IndexedMinHeap::new();
        heap.push(1);
        heap.blind_push(2);
        heap.flush();
        assert!(heap.is_empty());
        assert!(!heap.is_blind());
        assert_eq!(heap.push(3), 0);

        heap.force_flush();
        assert!(heap.is_empty());
        assert_eq!(heap.push(4), 0);
        check_invariants(&heap);
    }

    #[test]
    fn closure_order() {
        let mut heap = IndexedMinHeap::with_order(|a: &(f64, u32), b: &(f64, u32)| {
            a.0 < b.0 || (a.0 == b.0 && a.1 > b.1)
        });
        heap.push((1.0, 1));
        heap.push((1.0, 5));
        heap.push((0.5, 0));
        assert_eq!(heap.pop(), Some((0.5, 0)));
        assert_eq!(heap.pop(), Some((1.0, 5)));
        assert_eq!(heap.pop(), Some((1.0, 1)));
    }
}
