//! Shared, immutable-handle wrapper for heap values.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// An `Arc` that only this crate can construct.
///
/// All heap allocations of [`Value`](super::Value) go through the factory
/// methods on `Value`, which stamp mutable objects with their domain.
/// Cloning a `Heap` shares the allocation, so a `Value` clone is cheap.
pub struct Heap<T: ?Sized>(Arc<T>);

impl<T> Heap<T> {
    #[inline]
    pub(crate) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }

    /// The value, if this was the last handle to it.
    pub(crate) fn into_inner(self) -> Option<T> {
        Arc::into_inner(self.0)
    }
}

impl<T: ?Sized> Heap<T> {
    #[inline]
    pub(crate) fn from_arc(arc: Arc<T>) -> Self {
        Heap(arc)
    }

    /// Whether both handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Address of the allocation, used as an identity for hashing.
    #[inline]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_allocation() {
        let a = Heap::new(vec![1, 2, 3]);
        let b = a.clone();
        assert!(Heap::ptr_eq(&a, &b));
        assert_eq!(a.addr(), b.addr());
    }

    #[test]
    fn distinct_allocations_differ() {
        let a: Heap<str> = Heap::from_arc(Arc::from("x"));
        let b: Heap<str> = Heap::from_arc(Arc::from("x"));
        assert!(!Heap::ptr_eq(&a, &b));
        assert_eq!(&*a, &*b);
    }
}
