use std::ops::{Deref, DerefMut};

use super::pool::{BufferPool, PooledBuffer};
use crate::core::unit::Unit;

/// Largest scratch request served from the stack
pub const STACK_UNITS: usize = 2048;

/// A fixed-length work buffer: inline when small, pooled when large.
///
/// Released when dropped, on every exit path.
pub enum Scratch<U: Unit> {
    Stack([U; STACK_UNITS], usize),
    Pooled(PooledBuffer<U>),
}

impl<U: Unit> Scratch<U> {
    pub fn with_len(len: usize) -> Self {
        if len <= STACK_UNITS {
            Scratch::Stack([U::default(); STACK_UNITS], len)
        } else {
            Scratch::Pooled(BufferPool::rent(&U::shared_pool(), len))
        }
    }

    pub fn is_pooled(&self) -> bool {
        matches!(self, Scratch::Pooled(_))
    }
}

impl<U: Unit> Deref for Scratch<U> {
    type Target = [U];

    fn deref(&self) -> &[U] {
        match self {
            Scratch::Stack(buf, len) => &buf[..*len],
            Scratch::Pooled(buf) => &**buf,
        }
    }
}

impl<U: Unit> DerefMut for Scratch<U> {
    fn deref_mut(&mut self) -> &mut [U] {
        match self {
            Scratch::Stack(buf, len) => &mut buf[..*len],
            Scratch::Pooled(buf) => &mut **buf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_requests_stay_inline() {
        let scratch = Scratch::<u8>::with_len(16);
        assert!(!scratch.is_pooled());
        assert_eq!(scratch.len(), 16);
    }

    #[test]
    fn test_large_requests_use_the_pool() {
        let pool = u16::shared_pool();
        let before = pool.outstanding();
        {
            let scratch = Scratch::<u16>::with_len(STACK_UNITS + 1);
            assert!(scratch.is_pooled());
            assert_eq!(scratch.len(), STACK_UNITS + 1);
            assert_eq!(pool.outstanding(), before + 1);
        }
        assert_eq!(pool.outstanding(), before);
    }
}
