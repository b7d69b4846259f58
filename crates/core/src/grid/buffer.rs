//! Ping-pong storage shared by the cell grid and the force field
//!
//! Two preallocated arenas; one is the readable "front", the other the
//! writable "back". `swap` flips an index, it never copies elements.

/// Two equally sized arenas with an O(1) role exchange
#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    arenas: [Vec<T>; 2],
    front: usize,
}

impl<T: Clone> DoubleBuffer<T> {
    /// Allocate both arenas with `len` copies of `fill`
    #[must_use]
    pub fn new(len: usize, fill: T) -> Self {
        Self {
            arenas: [vec![fill.clone(); len], vec![fill; len]],
            front: 0,
        }
    }
}

impl<T> DoubleBuffer<T> {
    /// Number of elements in each arena
    #[inline]
    pub fn len(&self) -> usize {
        self.arenas[0].len()
    }

    /// Whether the arenas are empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arenas[0].is_empty()
    }

    /// Readable arena
    #[inline]
    pub fn front(&self) -> &[T] {
        &self.arenas[self.front]
    }

    /// Mutable access to the writable arena
    #[inline]
    pub fn back_mut(&mut self) -> &mut [T] {
        &mut self.arenas[1 - self.front]
    }

    /// Mutable access to the readable arena.
    ///
    /// Only the simulator's edit flush uses this, between steps.
    #[inline]
    pub(crate) fn front_mut(&mut self) -> &mut [T] {
        &mut self.arenas[self.front]
    }

    /// Front for reading and back for writing at the same time
    #[inline]
    pub fn split_mut(&mut self) -> (&[T], &mut [T]) {
        let front = self.front;
        let (first, second) = self.arenas.split_at_mut(1);
        if front == 0 {
            (first[0].as_slice(), second[0].as_mut_slice())
        } else {
            (second[0].as_slice(), first[0].as_mut_slice())
        }
    }

    /// Exchange front and back roles
    #[inline]
    pub fn swap(&mut self) {
        self.front = 1 - self.front;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_exchanges_roles_without_copy() {
        let mut buffer = DoubleBuffer::new(4, 0_u32);
        buffer.back_mut().fill(7);
        assert_eq!(buffer.front(), &[0, 0, 0, 0]);

        let back_ptr = buffer.split_mut().1.as_ptr();
        buffer.swap();

        assert_eq!(buffer.front(), &[7, 7, 7, 7]);
        assert_eq!(buffer.front().as_ptr(), back_ptr);
        let (_, back) = buffer.split_mut();
        assert_eq!(back, &[0, 0, 0, 0]);
    }

    #[test]
    fn test_split_mut_reads_front_writes_back() {
        let mut buffer = DoubleBuffer::new(3, 1_i32);
        let (front, back) = buffer.split_mut();
        for (dst, src) in back.iter_mut().zip(front) {
            *dst = src * 10;
        }
        buffer.swap();
        assert_eq!(buffer.front(), &[10, 10, 10]);

        let (front, back) = buffer.split_mut();
        assert_eq!(front, &[10, 10, 10]);
        assert_eq!(back, &[1, 1, 1]);
    }
}
