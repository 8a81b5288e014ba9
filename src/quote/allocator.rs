//! Policy-wide hospital-cash allowance threaded through the person fold

use crate::error::CalcError;
use crate::money::Amount;

/// Running allocation of the shared daily-benefit cap
///
/// Persons are allocated in rating order; each allocation consumes the
/// allocator and hands back the updated one, so the order is part of the
/// call sequence rather than hidden state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HospitalCashAllocator {
    cap: Amount,
    allocations: Vec<(String, Amount)>,
}

impl HospitalCashAllocator {
    pub fn new(cap: Amount) -> Self {
        Self {
            cap,
            allocations: Vec::new(),
        }
    }

    pub fn cap(&self) -> Amount {
        self.cap
    }

    pub fn allocated(&self) -> Amount {
        self.allocations.iter().map(|(_, a)| a).sum()
    }

    pub fn remaining(&self) -> Amount {
        self.cap.saturating_sub(self.allocated())
    }

    pub fn allocations(&self) -> &[(String, Amount)] {
        &self.allocations
    }

    /// Reserve `requested` per day for a person, or reject it whole
    pub fn allocate(mut self, person_id: &str, requested: Amount) -> Result<Self, CalcError> {
        let remaining = self.remaining();
        if requested > remaining {
            return Err(CalcError::HospitalCapExceeded {
                person: person_id.to_string(),
                requested,
                remaining,
            });
        }
        self.allocations.push((person_id.to_string(), requested));
        Ok(self)
    }

    /// Post-condition: total allocation within the cap
    pub fn check(&self) -> Result<(), CalcError> {
        if self.allocated() > self.cap {
            let (person, requested) = self
                .allocations
                .last()
                .cloned()
                .unwrap_or_default();
            return Err(CalcError::HospitalCapExceeded {
                person,
                requested,
                remaining: 0,
            });
        }
        Ok(())
    }
}
