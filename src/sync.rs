#[cfg(feature = "std")]
use std::sync as impl_;

#[cfg(not(feature = "std"))]
use spin as impl_;

#[repr(transparent)]
pub(crate) struct Lock<T>(impl_::Mutex<T>);

#[repr(transparent)]
pub(crate) struct LockGuard<'a, T>(impl_::MutexGuard<'a, T>);

impl<T> Lock<T> {
    #[must_use]
    pub(crate) const fn new(value: T) -> Self {
        Self(impl_::Mutex::new(value))
    }

    #[inline]
    pub(crate) fn lock(&self) -> LockGuard<'_, T> {
        #[cfg(not(feature = "std"))]
        let guard = self.0.lock();

        #[cfg(feature = "std")]
        let guard = self.0.lock().expect("Unable to acquire state lock");

        LockGuard(guard)
    }
}

impl<T> core::ops::Deref for LockGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> core::ops::DerefMut for LockGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
