//! Browser registrations that must be released exactly once, even when an
//! effect cleanup and a later drop both try.

/// Owns a registered resource until it is handed to `release`.
///
/// Every release after the first is a no-op, including the one on drop.
pub struct Registration<T> {
    resource: Option<T>,
    release: fn(T),
}

impl<T> Registration<T> {
    pub fn new(resource: T, release: fn(T)) -> Self {
        Self {
            resource: Some(resource),
            release,
        }
    }

    pub fn is_active(&self) -> bool {
        self.resource.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.resource.as_ref()
    }

    /// Returns whether this call did the release.
    pub fn release(&mut self) -> bool {
        match self.resource.take() {
            Some(resource) => {
                (self.release)(resource);
                true
            }
            None => false,
        }
    }
}

impl<T> Drop for Registration<T> {
    fn drop(&mut self) {
        self.release();
    }
}
