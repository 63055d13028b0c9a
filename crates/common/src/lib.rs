//! Shared stack types for the Push virtual machine.
//!
//! - [`TypedStack`]: the LIFO container behind every interpreter stack
//! - [`Stack`]: a kind-erased view used for generic stack instructions and
//!   cross-kind equality
//!
//! # Dependencies
//!
//! None at runtime; `proptest` for tests.

pub mod stack;

pub use stack::{Stack, TypedStack};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Popping returns pushed values in reverse order.
        #[test]
        fn push_pop_is_lifo(values in prop::collection::vec(any::<i64>(), 0..50)) {
            let mut stack = TypedStack::new();
            for v in &values {
                stack.push(*v);
            }
            for v in values.iter().rev() {
                prop_assert_eq!(stack.pop(), Some(*v));
            }
            prop_assert_eq!(stack.pop(), None);
        }

        /// peek(n) and deep_peek(len-1-n) name the same element for every n,
        /// in range or not.
        #[test]
        fn peek_mirrors_deep_peek(
            values in prop::collection::vec(any::<i64>(), 1..30),
            n in -40i64..40,
        ) {
            let stack: TypedStack<i64> = values.clone().into();
            let len = values.len() as i64;
            let clamped = n.clamp(0, len - 1);
            prop_assert_eq!(stack.peek(n), stack.deep_peek(len - 1 - clamped));
            prop_assert_eq!(stack.peek(n), Some(&values[stack.reverse_index(n)]));
        }

        /// Positional operations never change the multiset of elements
        /// (except the copying ones) and never panic.
        #[test]
        fn positional_ops_preserve_length(
            values in prop::collection::vec(any::<i64>(), 0..20),
            n in any::<i64>(),
        ) {
            let mut stack: TypedStack<i64> = values.clone().into();
            let len = stack.len();
            stack.yank(n);
            stack.shove_top(n);
            stack.swap();
            stack.rot();
            prop_assert_eq!(stack.len(), len);

            let mut sorted = stack.clone().into_vec();
            sorted.sort_unstable();
            let mut expected = values;
            expected.sort_unstable();
            prop_assert_eq!(sorted, expected);

            stack.yank_dup(n);
            prop_assert_eq!(stack.len(), if len == 0 { 0 } else { len + 1 });
        }
    }
}
