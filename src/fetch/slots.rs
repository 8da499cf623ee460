//! Index-addressed, write-once result slots.

use crate::error::{Error, Result};

/// One slot per resource, filled by input position rather than arrival order
///
/// Only the batch collector writes here, so no locking is involved. Each slot
/// accepts exactly one value.
#[derive(Debug)]
pub struct ResultSlots<T> {
    slots: Vec<Option<T>>,
    filled: usize,
}

impl<T> ResultSlots<T> {
    /// Create `len` empty slots
    pub fn new(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
            filled: 0,
        }
    }

    /// Store the value for position `index`
    ///
    /// Fails if the position is out of range or already holds a value.
    pub fn fill(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.slots.len();
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            Error::TaskFailed(format!("result index {index} out of range for batch of {len}"))
        })?;

        if slot.is_some() {
            return Err(Error::TaskFailed(format!(
                "result for index {index} reported twice"
            )));
        }

        *slot = Some(value);
        self.filled += 1;
        Ok(())
    }

    /// Number of filled slots
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Returns true once every slot holds a value
    pub fn is_complete(&self) -> bool {
        self.filled == self.slots.len()
    }

    /// Values in input order; fails if any slot is still empty
    pub fn into_ordered(self) -> Result<Vec<T>> {
        let len = self.slots.len();
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    Error::TaskFailed(format!(
                        "no result for index {index} in batch of {len}"
                    ))
                })
            })
            .collect()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_come_back_in_index_order() {
        let mut slots = ResultSlots::new(3);

        slots.fill(2, "C").unwrap();
        slots.fill(0, "A").unwrap();
        assert!(!slots.is_complete());
        slots.fill(1, "B").unwrap();

        assert!(slots.is_complete());
        assert_eq!(slots.into_ordered().unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn slot_is_write_once() {
        let mut slots = ResultSlots::new(2);
        slots.fill(0, 1).unwrap();

        assert!(slots.fill(0, 2).is_err());
        assert_eq!(slots.filled(), 1);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut slots = ResultSlots::new(1);

        assert!(slots.fill(1, 'x').is_err());
        assert_eq!(slots.filled(), 0);
    }

    #[test]
    fn incomplete_slots_cannot_be_collected() {
        let mut slots = ResultSlots::new(2);
        slots.fill(1, 10u64).unwrap();

        assert!(slots.into_ordered().is_err());
    }

    #[test]
    fn empty_slots_are_complete() {
        let slots: ResultSlots<String> = ResultSlots::new(0);

        assert!(slots.is_complete());
        assert!(slots.into_ordered().unwrap().is_empty());
    }
}
