//! Opaque backend handles carried by model values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A backend-specific object (a platform chat, a platform message) that the
/// model carries without knowing its type.
///
/// Only the backend that created the handle downcasts it again.
#[derive(Clone)]
pub struct RemoteHandle(Arc<dyn Any + Send + Sync>);

impl RemoteHandle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the wrapped value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl Default for RemoteHandle {
    fn default() -> Self {
        Self::new(())
    }
}

impl fmt::Debug for RemoteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RemoteHandle(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_matches_stored_type() {
        let handle = RemoteHandle::new(42u32);
        assert_eq!(handle.downcast_ref::<u32>(), Some(&42));
        assert!(handle.downcast_ref::<String>().is_none());
    }
}
