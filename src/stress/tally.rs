use super::error::{Result, StressError};

/// Counts how many times each value in `1..=total` was forwarded.
#[derive(Debug)]
pub struct Tally {
    counts: Vec<u32>,
    forwarded: usize,
}

impl Tally {
    pub fn new(total: usize) -> Self {
        Tally {
            counts: vec![0; total],
            forwarded: 0,
        }
    }

    pub fn record(&mut self, value: usize) -> Result<()> {
        let total = self.counts.len();
        if value < 1 || value > total {
            return Err(StressError::OutOfRange { value, total });
        }
        self.counts[value - 1] += 1;
        self.forwarded += 1;
        Ok(())
    }

    pub fn forwarded(&self) -> usize {
        self.forwarded
    }

    /// Fails on the first value that was not seen exactly once.
    pub fn verify(&self) -> Result<()> {
        for (i, &times) in self.counts.iter().enumerate() {
            match times {
                1 => {}
                0 => return Err(StressError::Missing { value: i + 1 }),
                _ => return Err(StressError::Duplicate { value: i + 1, times }),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_tally_verifies() {
        let mut tally = Tally::new(5);
        for v in [3, 1, 5, 2, 4] {
            tally.record(v).unwrap();
        }
        assert_eq!(tally.forwarded(), 5);
        assert_eq!(tally.verify(), Ok(()));
    }

    #[test]
    fn test_out_of_range() {
        let mut tally = Tally::new(3);
        assert_eq!(
            tally.record(0),
            Err(StressError::OutOfRange { value: 0, total: 3 })
        );
        assert_eq!(
            tally.record(4),
            Err(StressError::OutOfRange { value: 4, total: 3 })
        );
        assert_eq!(tally.forwarded(), 0);
    }

    #[test]
    fn test_missing_and_duplicate() {
        let mut tally = Tally::new(3);
        tally.record(1).unwrap();
        tally.record(3).unwrap();
        assert_eq!(tally.verify(), Err(StressError::Missing { value: 2 }));

        tally.record(2).unwrap();
        tally.record(2).unwrap();
        assert_eq!(
            tally.verify(),
            Err(StressError::Duplicate { value: 2, times: 2 })
        );
    }
}
