/// Issues monotonically increasing record identifiers for one run.
///
/// Seeded from the current maximum in the destination table so appended
/// rows never collide with existing ones. Single-writer only; no state
/// survives the run beyond the rows it wrote.
#[derive(Debug)]
pub struct IdTracker {
    next: i64,
}

impl IdTracker {
    /// `max_existing` is the destination table's current maximum
    /// identifier, or `None` when the table is empty or unreadable.
    pub fn new(max_existing: Option<i64>) -> Self {
        Self {
            next: max_existing.map_or(1, |max| max + 1),
        }
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }
}
