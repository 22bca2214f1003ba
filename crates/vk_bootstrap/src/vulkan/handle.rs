//! Scoped ownership of native Vulkan handles
//!
//! A [`ScopedHandle`] pairs a raw handle with the call that destroys it. The
//! release call runs at most once: either when the wrapper is dropped or
//! never, if ownership was transferred out with
//! [`ScopedHandle::release_ownership`].

use ash::vk::{self, Handle};
use std::fmt;
use std::ops::Deref;

/// Owned native handle plus the function that releases it
pub struct ScopedHandle<T: Handle + Copy> {
    handle: T,
    releaser: Option<Box<dyn FnOnce(T)>>,
}

impl<T: Handle + Copy> ScopedHandle<T> {
    /// Take ownership of `handle`, releasing it with `releaser` on drop
    ///
    /// A null handle never reaches the releaser.
    pub fn new(handle: T, releaser: impl FnOnce(T) + 'static) -> Self {
        Self {
            handle,
            releaser: Some(Box::new(releaser)),
        }
    }

    /// An empty wrapper holding the null handle
    pub fn null() -> Self {
        Self {
            handle: T::from_raw(0),
            releaser: None,
        }
    }

    /// The raw handle, without affecting ownership
    pub fn get(&self) -> T {
        self.handle
    }

    /// Whether the wrapper currently holds the null handle
    pub fn is_null(&self) -> bool {
        self.handle.as_raw() == 0
    }

    /// Give up ownership and hand the raw handle to the caller
    ///
    /// After this the wrapper holds the null handle and dropping it is a
    /// no-op. A second call returns the null handle.
    pub fn release_ownership(&mut self) -> T {
        self.releaser = None;
        std::mem::replace(&mut self.handle, T::from_raw(0))
    }

    /// Release the held handle now, leaving the wrapper null
    pub fn reset(&mut self) {
        let handle = std::mem::replace(&mut self.handle, T::from_raw(0));
        if let Some(releaser) = self.releaser.take() {
            if handle.as_raw() != 0 {
                releaser(handle);
            }
        }
    }
}

impl<T: Handle + Copy> Default for ScopedHandle<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: Handle + Copy> Deref for ScopedHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.handle
    }
}

impl<T: Handle + Copy> Drop for ScopedHandle<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: Handle + Copy> fmt::Debug for ScopedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedHandle")
            .field("type", &T::TYPE)
            .field("handle", &format_args!("{:#x}", self.handle.as_raw()))
            .field("owned", &self.releaser.is_some())
            .finish()
    }
}

/// Shorthand for an owned instance handle
pub type InstanceHandle = ScopedHandle<vk::Instance>;
