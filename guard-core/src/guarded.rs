//! Hash-guarded container family
//!
//! Thin integrity-checked wrappers over native containers: a single stored
//! hash is computed from a deterministic traversal order (index order for
//! the list, dequeue order for the queue, pop order for the stack) and
//! re-verified on every guarded read or write. Raw writes to the backing
//! container are not intercepted — a foreign mutation is detected on the
//! *next* guarded call, and the structure then stays compromised for good.

use crate::hash::{compare_hashes, digest_sequence, HashAlgorithm};
use crate::monitor::{Breach, IntegrityObserver, StructureKind};
use crate::types::Content;
use std::collections::VecDeque;
use std::sync::Arc;

/// Shared guard state: stored hash, health flag, observer wiring
struct GuardState {
    stored_hash: Vec<u8>,
    algorithm: HashAlgorithm,
    has_integrity: bool,
    kind: StructureKind,
    label: String,
    observer: Option<Arc<dyn IntegrityObserver>>,
}

impl GuardState {
    fn new(kind: StructureKind, algorithm: HashAlgorithm) -> Self {
        Self {
            stored_hash: digest_sequence::<(), _>(algorithm, std::iter::empty()),
            algorithm,
            has_integrity: true,
            kind,
            label: kind.to_string(),
            observer: None,
        }
    }

    fn verify<'a, T: Content>(
        &mut self,
        values: impl Iterator<Item = &'a T>,
        operation: &str,
    ) -> bool {
        if !self.has_integrity {
            return false;
        }

        let actual = digest_sequence(self.algorithm, values);
        if !compare_hashes(&self.stored_hash, &actual) {
            self.has_integrity = false;
            let breach = Breach::new(
                self.kind,
                &self.label,
                format!("stored hash mismatch on {}", operation),
            );
            if let Some(observer) = &self.observer {
                observer.on_breach(&breach);
            }
            return false;
        }
        true
    }

    fn reseal<'a, T: Content>(&mut self, values: impl Iterator<Item = &'a T>) {
        self.stored_hash = digest_sequence(self.algorithm, values);
    }
}

/// Integrity-checked list (index-order hashing)
pub struct GuardedList<T: Content> {
    items: Vec<T>,
    guard: GuardState,
}

impl<T: Content> GuardedList<T> {
    /// Create an empty guarded list
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::default())
    }

    /// Create an empty guarded list hashed with the given algorithm
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            items: Vec::new(),
            guard: GuardState::new(StructureKind::GuardedList, algorithm),
        }
    }

    /// Attach an instance label used in breach notifications
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.guard.label = label.into();
        self
    }

    /// Inject the integrity observer notified on compromise
    pub fn with_observer(mut self, observer: Arc<dyn IntegrityObserver>) -> Self {
        self.guard.observer = Some(observer);
        self
    }

    /// Guarded append at the end
    pub fn push(&mut self, value: T) -> bool {
        if !self.guard.verify(self.items.iter(), "push") {
            return false;
        }
        self.items.push(value);
        self.guard.reseal(self.items.iter());
        true
    }

    /// Guarded in-place replacement
    ///
    /// `false` for an out-of-range index (no breach) as well as for a
    /// detected compromise.
    pub fn set(&mut self, index: usize, value: T) -> bool {
        if !self.guard.verify(self.items.iter(), "set") {
            return false;
        }
        match self.items.get_mut(index) {
            Some(slot) => *slot = value,
            None => return false,
        }
        self.guard.reseal(self.items.iter());
        true
    }

    /// Guarded removal of the last element
    pub fn remove_last(&mut self) -> bool {
        if !self.guard.verify(self.items.iter(), "remove_last") {
            return false;
        }
        if self.items.pop().is_none() {
            return false;
        }
        self.guard.reseal(self.items.iter());
        true
    }

    /// Guarded read
    pub fn get(&mut self, index: usize) -> Option<&T> {
        if !self.guard.verify(self.items.iter(), "get") {
            return None;
        }
        self.items.get(index)
    }

    /// Explicit verification
    pub fn check_integrity(&mut self) -> bool {
        self.guard.verify(self.items.iter(), "check_integrity")
    }

    /// Whether the list is still healthy (monotonic)
    pub fn has_integrity(&self) -> bool {
        self.guard.has_integrity
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Raw access to the backing container, bypassing the guarded API
    #[doc(hidden)]
    pub fn items_mut_unchecked(&mut self) -> &mut Vec<T> {
        &mut self.items
    }
}

impl<T: Content> Default for GuardedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Integrity-checked FIFO queue (dequeue-order hashing)
pub struct GuardedQueue<T: Content> {
    items: VecDeque<T>,
    guard: GuardState,
}

impl<T: Content> GuardedQueue<T> {
    /// Create an empty guarded queue
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::default())
    }

    /// Create an empty guarded queue hashed with the given algorithm
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            items: VecDeque::new(),
            guard: GuardState::new(StructureKind::GuardedQueue, algorithm),
        }
    }

    /// Attach an instance label used in breach notifications
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.guard.label = label.into();
        self
    }

    /// Inject the integrity observer notified on compromise
    pub fn with_observer(mut self, observer: Arc<dyn IntegrityObserver>) -> Self {
        self.guard.observer = Some(observer);
        self
    }

    /// Guarded enqueue at the back
    pub fn enqueue(&mut self, value: T) -> bool {
        if !self.guard.verify(self.items.iter(), "enqueue") {
            return false;
        }
        self.items.push_back(value);
        self.guard.reseal(self.items.iter());
        true
    }

    /// Guarded dequeue from the front
    pub fn dequeue(&mut self) -> Option<T> {
        if !self.guard.verify(self.items.iter(), "dequeue") {
            return None;
        }
        let value = self.items.pop_front()?;
        self.guard.reseal(self.items.iter());
        Some(value)
    }

    /// Guarded read of the front element
    pub fn peek(&mut self) -> Option<&T> {
        if !self.guard.verify(self.items.iter(), "peek") {
            return None;
        }
        self.items.front()
    }

    /// Explicit verification
    pub fn check_integrity(&mut self) -> bool {
        self.guard.verify(self.items.iter(), "check_integrity")
    }

    /// Whether the queue is still healthy (monotonic)
    pub fn has_integrity(&self) -> bool {
        self.guard.has_integrity
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Raw access to the backing container, bypassing the guarded API
    #[doc(hidden)]
    pub fn items_mut_unchecked(&mut self) -> &mut VecDeque<T> {
        &mut self.items
    }
}

impl<T: Content> Default for GuardedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Integrity-checked LIFO stack (pop-order hashing)
pub struct GuardedStack<T: Content> {
    items: Vec<T>,
    guard: GuardState,
}

impl<T: Content> GuardedStack<T> {
    /// Create an empty guarded stack
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::default())
    }

    /// Create an empty guarded stack hashed with the given algorithm
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            items: Vec::new(),
            guard: GuardState::new(StructureKind::GuardedStack, algorithm),
        }
    }

    /// Attach an instance label used in breach notifications
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.guard.label = label.into();
        self
    }

    /// Inject the integrity observer notified on compromise
    pub fn with_observer(mut self, observer: Arc<dyn IntegrityObserver>) -> Self {
        self.guard.observer = Some(observer);
        self
    }

    /// Guarded push on top
    pub fn push(&mut self, value: T) -> bool {
        if !self.guard.verify(self.items.iter().rev(), "push") {
            return false;
        }
        self.items.push(value);
        self.guard.reseal(self.items.iter().rev());
        true
    }

    /// Guarded pop from the top
    pub fn pop(&mut self) -> Option<T> {
        if !self.guard.verify(self.items.iter().rev(), "pop") {
            return None;
        }
        let value = self.items.pop()?;
        self.guard.reseal(self.items.iter().rev());
        Some(value)
    }

    /// Guarded read of the top element
    pub fn peek(&mut self) -> Option<&T> {
        if !self.guard.verify(self.items.iter().rev(), "peek") {
            return None;
        }
        self.items.last()
    }

    /// Explicit verification
    pub fn check_integrity(&mut self) -> bool {
        self.guard.verify(self.items.iter().rev(), "check_integrity")
    }

    /// Whether the stack is still healthy (monotonic)
    pub fn has_integrity(&self) -> bool {
        self.guard.has_integrity
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the stack is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Raw access to the backing container, bypassing the guarded API
    #[doc(hidden)]
    pub fn items_mut_unchecked(&mut self) -> &mut Vec<T> {
        &mut self.items
    }
}

impl<T: Content> Default for GuardedStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GuardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardState")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("algorithm", &self.algorithm)
            .field("has_integrity", &self.has_integrity)
            .finish()
    }
}

impl<T: Content> std::fmt::Debug for GuardedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedList")
            .field("len", &self.items.len())
            .field("guard", &self.guard)
            .finish()
    }
}

impl<T: Content> std::fmt::Debug for GuardedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedQueue")
            .field("len", &self.items.len())
            .field("guard", &self.guard)
            .finish()
    }
}

impl<T: Content> std::fmt::Debug for GuardedStack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedStack")
            .field("len", &self.items.len())
            .field("guard", &self.guard)
            .finish()
    }
}
