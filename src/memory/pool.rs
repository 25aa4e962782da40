use std::cell::{Cell, RefCell};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// Buffers kept around per pool once returned
pub const MAX_RETAINED: usize = 16;

thread_local! {
    static UTF8_POOL: Rc<BufferPool<u8>> = Rc::new(BufferPool::new(MAX_RETAINED));
    static UTF16_POOL: Rc<BufferPool<u16>> = Rc::new(BufferPool::new(MAX_RETAINED));
}

pub fn utf8_pool() -> Rc<BufferPool<u8>> {
    UTF8_POOL.with(Rc::clone)
}

pub fn utf16_pool() -> Rc<BufferPool<u16>> {
    UTF16_POOL.with(Rc::clone)
}

/// Reusable scratch buffers. A rented buffer goes back on drop.
#[derive(Debug)]
pub struct BufferPool<T> {
    free: RefCell<Vec<Vec<T>>>,
    max_retained: usize,
    outstanding: Cell<usize>,
}

impl<T: Copy + Default> BufferPool<T> {
    pub fn new(max_retained: usize) -> Self {
        BufferPool {
            free: RefCell::new(Vec::new()),
            max_retained,
            outstanding: Cell::new(0),
        }
    }

    /// Rent a zeroed buffer of exactly `len` elements
    pub fn rent(pool: &Rc<Self>, len: usize) -> PooledBuffer<T> {
        let reused = {
            let mut free = pool.free.borrow_mut();
            free.iter()
                .position(|buf| buf.capacity() >= len)
                .map(|i| free.swap_remove(i))
        };
        let mut buf = match reused {
            Some(buf) => buf,
            None => {
                log_debug!("buffer pool miss for {} elements", len);
                Vec::with_capacity(len)
            }
        };
        buf.resize(len, T::default());
        pool.outstanding.set(pool.outstanding.get() + 1);

        PooledBuffer {
            buf,
            pool: Rc::clone(pool),
        }
    }

    fn give_back(&self, mut buf: Vec<T>) {
        self.outstanding.set(self.outstanding.get() - 1);
        let mut free = self.free.borrow_mut();
        if free.len() < self.max_retained {
            buf.clear();
            free.push(buf);
        }
    }

    /// Buffers rented and not yet returned
    pub fn outstanding(&self) -> usize {
        self.outstanding.get()
    }

    /// Buffers waiting for reuse
    pub fn retained(&self) -> usize {
        self.free.borrow().len()
    }
}

#[derive(Debug)]
pub struct PooledBuffer<T: Copy + Default> {
    buf: Vec<T>,
    pool: Rc<BufferPool<T>>,
}

impl<T: Copy + Default> Deref for PooledBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.buf
    }
}

impl<T: Copy + Default> DerefMut for PooledBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.buf
    }
}

impl<T: Copy + Default> Drop for PooledBuffer<T> {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rent_and_return() {
        let pool = Rc::new(BufferPool::<u8>::new(2));
        {
            let mut buf = BufferPool::rent(&pool, 10);
            assert_eq!(buf.len(), 10);
            buf[0] = 7;
            assert_eq!(pool.outstanding(), 1);
            assert_eq!(pool.retained(), 0);
        }
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.retained(), 1);

        // reused and zeroed again
        let buf = BufferPool::rent(&pool, 8);
        assert_eq!(buf[0], 0);
        assert_eq!(pool.retained(), 0);
    }

    #[test]
    fn test_returned_on_early_exit() {
        fn fails(pool: &Rc<BufferPool<u16>>) -> Result<(), ()> {
            let _buf = BufferPool::rent(pool, 4096);
            Err(())
        }

        let pool = Rc::new(BufferPool::new(2));
        assert!(fails(&pool).is_err());
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.retained(), 1);
    }

    #[test]
    fn test_retention_is_capped() {
        let pool = Rc::new(BufferPool::<u8>::new(1));
        let a = BufferPool::rent(&pool, 4);
        let b = BufferPool::rent(&pool, 4);
        drop(a);
        drop(b);
        assert_eq!(pool.retained(), 1);
        assert_eq!(pool.outstanding(), 0);
    }
}
