//! The typed LIFO stack every Push data kind lives on.
//!
//! Two indexing conventions coexist and must not be confused:
//! [`TypedStack::peek`] counts from the top (`peek(0)` is the top), while
//! [`TypedStack::deep_peek`] counts from the bottom (`deep_peek(0)` is the
//! oldest element). Both clamp out-of-range positions instead of failing.
//! No operation errors on underflow; shallow stacks turn operations into
//! no-ops.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A last-in-first-out stack of `T`.
///
/// The top of the stack is the last element of the backing vector.
#[derive(Debug, Clone)]
pub struct TypedStack<T> {
    items: Vec<T>,
}

impl<T> Default for TypedStack<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> TypedStack<T> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements on the stack.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the stack holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Push `value` onto the top.
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Remove and return the top element, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Discard the top element if there is one.
    pub fn pop_discard(&mut self) {
        self.items.pop();
    }

    /// The top element, or `None` if empty.
    pub fn top(&self) -> Option<&T> {
        self.items.last()
    }

    /// Element `n` positions below the top, with `n` clamped to `[0, len-1]`.
    pub fn peek(&self, n: i64) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        self.items.get(self.reverse_index(n))
    }

    /// Element `n` positions above the bottom, with `n` clamped to `[0, len-1]`.
    pub fn deep_peek(&self, n: i64) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        self.items.get(self.clamp(n))
    }

    /// Convert a top-relative position into a vector index:
    /// `clamp(len - 1 - n, 0, len - 1)`. Returns 0 for an empty stack.
    pub fn reverse_index(&self, n: i64) -> usize {
        let len = self.items.len();
        if len == 0 {
            return 0;
        }
        len - 1 - self.clamp(n)
    }

    /// Swap the top two elements. No-op with fewer than two.
    pub fn swap(&mut self) {
        let len = self.items.len();
        if len > 1 {
            self.items.swap(len - 1, len - 2);
        }
    }

    /// Move the third element to the top: `[a b c]` becomes `[b c a]`.
    /// No-op with fewer than three.
    pub fn rot(&mut self) {
        let len = self.items.len();
        if len > 2 {
            self.items[len - 3..].rotate_left(1);
        }
    }

    /// Insert `value` at top-relative position `n`.
    ///
    /// `shove(v, 0)` is a push. For `n > 0` the value is inserted just above
    /// the element at `reverse_index(n)`, so the deepest reachable slot is
    /// the second from the bottom.
    pub fn shove(&mut self, value: T, n: i64) {
        let len = self.items.len();
        let i = self.reverse_index(n);
        if len == 0 || i == len - 1 {
            self.items.push(value);
        } else {
            self.items.insert(i + 1, value);
        }
    }

    /// Move the top element down to top-relative depth `n`, clamped to
    /// `[0, len-1]`. `shove_top(len - 1)` buries it at the bottom.
    pub fn shove_top(&mut self, n: i64) {
        if self.items.is_empty() {
            return;
        }
        let target = self.reverse_index(n);
        if let Some(top) = self.items.pop() {
            self.items.insert(target, top);
        }
    }

    /// Move the element at top-relative position `n` (clamped) to the top.
    pub fn yank(&mut self, n: i64) {
        if self.items.is_empty() {
            return;
        }
        let index = self.reverse_index(n);
        let value = self.items.remove(index);
        self.items.push(value);
    }

    /// Iterate from bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The elements from bottom to top.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// The elements from bottom to top, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Consume the stack, returning its elements from bottom to top.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    fn clamp(&self, n: i64) -> usize {
        let last = self.items.len().saturating_sub(1);
        if n <= 0 {
            0
        } else {
            usize::try_from(n).map_or(last, |n| n.min(last))
        }
    }
}

impl<T: Clone> TypedStack<T> {
    /// Push a copy of the top element. No-op if empty.
    pub fn dup(&mut self) {
        if let Some(top) = self.items.last().cloned() {
            self.items.push(top);
        }
    }

    /// Push a copy of the element at top-relative position `n` (clamped).
    pub fn yank_dup(&mut self, n: i64) {
        if let Some(value) = self.peek(n).cloned() {
            self.items.push(value);
        }
    }

    /// Push every element of this stack onto `other`, top first, so that
    /// `other` ends up holding them in reverse order.
    pub fn push_all_reverse(&self, other: &mut TypedStack<T>) {
        for value in self.items.iter().rev() {
            other.push(value.clone());
        }
    }
}

impl<T> From<Vec<T>> for TypedStack<T> {
    /// Build a stack whose last vector element becomes the top.
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for TypedStack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: PartialEq> PartialEq for TypedStack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for TypedStack<T> {}

// The element type participates in the hash so that empty stacks of
// different kinds hash apart, matching `Stack::stack_eq`.
impl<T: Hash + 'static> Hash for TypedStack<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        TypeId::of::<T>().hash(state);
        self.items.hash(state);
    }
}

impl<T: fmt::Display> fmt::Display for TypedStack<T> {
    /// Renders top first: pushing 1 then 0 displays as `[0 1]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.items.iter().rev().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

/// Kind-erased view of a [`TypedStack`].
///
/// Lets callers manipulate a stack without knowing its element type, and
/// compares stacks across kinds: two stacks are equal only if they hold the
/// same element type and the same sequence, so empty stacks of different
/// kinds are unequal.
pub trait Stack: fmt::Debug {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    fn pop_discard(&mut self);

    fn dup(&mut self);

    fn swap(&mut self);

    fn rot(&mut self);

    fn shove_top(&mut self, n: i64);

    fn yank(&mut self, n: i64);

    fn yank_dup(&mut self, n: i64);

    fn as_any(&self) -> &dyn Any;

    /// Equality across element kinds.
    fn stack_eq(&self, other: &dyn Stack) -> bool;
}

impl<T> Stack for TypedStack<T>
where
    T: Clone + PartialEq + fmt::Debug + 'static,
{
    fn len(&self) -> usize {
        TypedStack::len(self)
    }

    fn clear(&mut self) {
        TypedStack::clear(self);
    }

    fn pop_discard(&mut self) {
        TypedStack::pop_discard(self);
    }

    fn dup(&mut self) {
        TypedStack::dup(self);
    }

    fn swap(&mut self) {
        TypedStack::swap(self);
    }

    fn rot(&mut self) {
        TypedStack::rot(self);
    }

    fn shove_top(&mut self, n: i64) {
        TypedStack::shove_top(self, n);
    }

    fn yank(&mut self, n: i64) {
        TypedStack::yank(self, n);
    }

    fn yank_dup(&mut self, n: i64) {
        TypedStack::yank_dup(self, n);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn stack_eq(&self, other: &dyn Stack) -> bool {
        other
            .as_any()
            .downcast_ref::<TypedStack<T>>()
            .is_some_and(|other| self == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn strings(values: &[&str]) -> TypedStack<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn push_pop_lifo() {
        let mut stack = strings(&["value 1", "value 2"]);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop().as_deref(), Some("value 2"));
        assert_eq!(stack.pop().as_deref(), Some("value 1"));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn top_of_empty_is_none() {
        let mut stack = strings(&["Hi"]);
        assert_eq!(stack.top().map(String::as_str), Some("Hi"));
        stack.pop();
        assert_eq!(stack.top(), None);
    }

    #[test]
    fn peek_counts_from_top_deep_peek_from_bottom() {
        let stack = strings(&["value 1", "value 2"]);
        assert_eq!(stack.peek(0).map(String::as_str), Some("value 2"));
        assert_eq!(stack.peek(1).map(String::as_str), Some("value 1"));
        assert_eq!(stack.deep_peek(0).map(String::as_str), Some("value 1"));
        assert_eq!(stack.deep_peek(1).map(String::as_str), Some("value 2"));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn peek_clamps() {
        let stack = strings(&["a", "b", "c"]);
        assert_eq!(stack.peek(-4).map(String::as_str), Some("c"));
        assert_eq!(stack.peek(99).map(String::as_str), Some("a"));
        assert_eq!(stack.deep_peek(99).map(String::as_str), Some("c"));
        assert_eq!(stack.deep_peek(-1).map(String::as_str), Some("a"));
        assert_eq!(TypedStack::<String>::new().peek(0), None);
    }

    #[test]
    fn reverse_index() {
        let stack = strings(&["1", "2", "3"]);
        assert_eq!(stack.reverse_index(0), 2);
        assert_eq!(stack.reverse_index(1), 1);
        assert_eq!(stack.reverse_index(2), 0);
        assert_eq!(stack.reverse_index(5), 0);
        assert_eq!(stack.reverse_index(-20), 2);
    }

    #[test]
    fn dup() {
        let mut stack = TypedStack::<String>::new();
        stack.dup();
        assert!(stack.is_empty());

        let mut stack = strings(&["value 1", "value 2"]);
        stack.dup();
        assert_eq!(stack, strings(&["value 1", "value 2", "value 2"]));
    }

    #[test]
    fn swap() {
        let mut stack = strings(&["value 1"]);
        stack.swap();
        assert_eq!(stack, strings(&["value 1"]));

        stack.push("value 2".to_string());
        stack.swap();
        assert_eq!(stack, strings(&["value 2", "value 1"]));
    }

    #[test]
    fn rot() {
        let mut stack = strings(&["value 1", "value 2"]);
        stack.rot();
        assert_eq!(stack, strings(&["value 1", "value 2"]));

        stack.push("value 3".to_string());
        stack.push("value 4".to_string());
        stack.rot();
        assert_eq!(
            stack,
            strings(&["value 1", "value 3", "value 4", "value 2"])
        );
    }

    #[test]
    fn shove_inserts_relative_to_top() {
        let mut stack = TypedStack::new();
        stack.shove("value 1".to_string(), 0);
        assert_eq!(stack, strings(&["value 1"]));
        stack.shove("value 4".to_string(), 0);
        assert_eq!(stack.peek(0).map(String::as_str), Some("value 4"));
        stack.pop();

        stack.shove("value 2".to_string(), 1);
        assert_eq!(stack, strings(&["value 1", "value 2"]));

        stack.shove("value 3".to_string(), 1);
        assert_eq!(stack, strings(&["value 1", "value 3", "value 2"]));
        assert_eq!(stack.peek(1).map(String::as_str), Some("value 3"));
    }

    #[test]
    fn shove_never_reaches_bottom() {
        let mut stack = strings(&["a", "b", "c"]);
        stack.shove("x".to_string(), 100);
        assert_eq!(stack, strings(&["a", "x", "b", "c"]));
    }

    #[test]
    fn shove_top_buries_top() {
        let mut stack = strings(&["a", "b", "c"]);
        stack.shove_top(1);
        assert_eq!(stack, strings(&["a", "c", "b"]));

        let mut stack = strings(&["a", "b", "c"]);
        stack.shove_top(50);
        assert_eq!(stack, strings(&["c", "a", "b"]));

        let mut stack = strings(&["a", "b", "c"]);
        stack.shove_top(0);
        assert_eq!(stack, strings(&["a", "b", "c"]));
    }

    #[test]
    fn yank_and_yank_dup() {
        let mut stack = strings(&["a", "b", "c"]);
        stack.yank(2);
        assert_eq!(stack, strings(&["b", "c", "a"]));

        stack.yank_dup(1);
        assert_eq!(stack, strings(&["b", "c", "a", "c"]));

        stack.yank(-3);
        assert_eq!(stack, strings(&["b", "c", "a", "c"]));

        let mut empty = TypedStack::<String>::new();
        empty.yank(0);
        empty.yank_dup(0);
        assert!(empty.is_empty());
    }

    #[test]
    fn push_all_reverse() {
        let stack = strings(&["value 1", "value 2"]);
        let mut other = TypedStack::new();
        stack.push_all_reverse(&mut other);
        assert_eq!(stack.len(), 2);
        assert_eq!(other.pop().as_deref(), Some("value 1"));
        assert_eq!(other.pop().as_deref(), Some("value 2"));
    }

    #[test]
    fn display_is_top_first() {
        let stack: TypedStack<i64> = vec![1, 0].into();
        assert_eq!(stack.to_string(), "[0 1]");
        assert_eq!(TypedStack::<i64>::new().to_string(), "[]");
    }

    #[test]
    fn equality_and_hash_same_kind() {
        let mut a = TypedStack::<String>::new();
        let mut b = TypedStack::<String>::new();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        a.push("value 1".to_string());
        assert_ne!(a, b);

        b.push("value 1".to_string());
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn different_kinds_never_equal() {
        let strings = TypedStack::<String>::new();
        let lists = TypedStack::<Vec<String>>::new();
        assert!(!strings.stack_eq(&lists));
        assert!(strings.stack_eq(&TypedStack::<String>::new()));
        assert_ne!(hash_of(&strings), hash_of(&lists));
    }

    #[test]
    fn erased_operations_match_typed_ones() {
        let mut stack: TypedStack<i64> = vec![1, 2, 3].into();
        let erased: &mut dyn Stack = &mut stack;
        erased.rot();
        erased.dup();
        erased.pop_discard();
        assert_eq!(erased.len(), 3);
        erased.clear();
        assert!(erased.is_empty());
    }
}
