//! Fixed-lag ring buffer.
//!
//! Keeps the last `N` values of one field so a state machine can ask for
//! "the value k bars ago" without materializing shifted copies of a whole
//! history.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagBuffer<T: Copy, const N: usize> {
    slots: [T; N],
    head: usize,
}

impl<T: Copy, const N: usize> LagBuffer<T, N> {
    const NON_EMPTY: () = assert!(N >= 1, "LagBuffer needs at least one slot");

    /// A buffer whose every lag reads as `fill`.
    pub fn filled(fill: T) -> Self {
        let () = Self::NON_EMPTY;
        Self {
            slots: [fill; N],
            head: 0,
        }
    }

    /// Record the newest value, evicting the one `N` steps old.
    pub fn push(&mut self, value: T) {
        self.head = (self.head + 1) % N;
        self.slots[self.head] = value;
    }

    /// Value pushed `k` steps ago; `lag(1)` is the most recent push.
    ///
    /// # Panics
    /// If `k` is 0 or greater than `N`.
    pub fn lag(&self, k: usize) -> T {
        assert!((1..=N).contains(&k), "lag {k} outside 1..={N}");
        self.slots[(self.head + N - (k - 1)) % N]
    }
}
