//! # Link activation counter.
//!
//! Reference count over admitted requests. Reports an [`Edge`] only when the
//! count crosses between 0 and 1; every other change is silent.
//!
//! ```text
//! increment: 0 → 1  ⇒ Some(Edge::Activated)
//!            n → n+1 ⇒ None
//! decrement: 1 → 0  ⇒ Some(Edge::Deactivated)
//!            n → n-1 ⇒ None
//!            0 → ?  ⇒ Err(ArbiterError::CounterUnderflow)
//! ```

use crate::error::ArbiterError;

/// Edge of the admitted-request count that requires a link callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Count went 0 → 1.
    Activated,
    /// Count went 1 → 0.
    Deactivated,
}

/// Non-negative count of admitted requests.
#[derive(Debug, Default)]
pub struct LinkCounter {
    count: usize,
}

impl LinkCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self) -> usize {
        self.count
    }

    /// Adds one admitted request.
    pub fn increment(&mut self) -> Option<Edge> {
        self.count += 1;
        (self.count == 1).then_some(Edge::Activated)
    }

    /// Removes one admitted request.
    ///
    /// Fails without touching the count if it is already zero.
    pub fn decrement(&mut self) -> Result<Option<Edge>, ArbiterError> {
        self.count = self
            .count
            .checked_sub(1)
            .ok_or(ArbiterError::CounterUnderflow)?;
        Ok((self.count == 0).then_some(Edge::Deactivated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_only_on_zero_one_boundary() {
        let mut c = LinkCounter::new();
        assert_eq!(c.increment(), Some(Edge::Activated));
        assert_eq!(c.increment(), None);
        assert_eq!(c.increment(), None);
        assert_eq!(c.get(), 3);

        assert_eq!(c.decrement(), Ok(None));
        assert_eq!(c.decrement(), Ok(None));
        assert_eq!(c.decrement(), Ok(Some(Edge::Deactivated)));
        assert_eq!(c.get(), 0);

        assert_eq!(c.increment(), Some(Edge::Activated));
    }

    #[test]
    fn test_underflow_is_an_error_and_keeps_zero() {
        let mut c = LinkCounter::new();
        assert_eq!(c.decrement(), Err(ArbiterError::CounterUnderflow));
        assert_eq!(c.get(), 0);
    }
}
