//! Tags of the polymorphic objects being processed, for diagnostics.
//!
//! Only recorded with the `debug` feature and `debug_assertions`; otherwise
//! every function here is a no-op.

use crate::{CodecError, TypeTag};

#[cfg(all(debug_assertions, feature = "debug"))]
mod stack {
    use core::cell::RefCell;
    use core::fmt;

    use crate::TypeTag;

    /// Helper struct for managing a stack of [`TypeTag`]s.
    #[derive(Default, Clone)]
    pub(super) struct TagStack {
        stack: Vec<TypeTag>,
    }

    impl TagStack {
        pub const fn new() -> Self {
            Self { stack: Vec::new() }
        }

        pub fn push(&mut self, tag: TypeTag) {
            self.stack.push(tag);
        }

        pub fn pop(&mut self) {
            self.stack.pop();
        }

        pub fn is_empty(&self) -> bool {
            self.stack.is_empty()
        }

        #[cfg(test)]
        pub fn tags(&self) -> &[TypeTag] {
            &self.stack
        }
    }

    impl fmt::Debug for TagStack {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut iter = self.stack.iter();

            if let Some(first) = iter.next() {
                writeln!(f, "`{first}`")?;
            }

            for tag in iter {
                writeln!(f, " -> `{tag}`")?;
            }

            Ok(())
        }
    }

    std::thread_local! {
        pub(super) static TAG_STACK: RefCell<TagStack> =
            const { RefCell::new(TagStack::new()) };
    }
}

/// Keeps `tag` on the current thread's stack until dropped.
#[must_use]
pub(crate) struct TagScope {
    _private: (),
}

impl TagScope {
    #[inline]
    pub(crate) fn enter(tag: TypeTag) -> Self {
        #[cfg(all(debug_assertions, feature = "debug"))]
        stack::TAG_STACK.with_borrow_mut(|stack| stack.push(tag));
        #[cfg(not(all(debug_assertions, feature = "debug")))]
        let _ = tag;

        Self { _private: () }
    }
}

impl Drop for TagScope {
    #[inline]
    fn drop(&mut self) {
        #[cfg(all(debug_assertions, feature = "debug"))]
        stack::TAG_STACK.with_borrow_mut(|stack| stack.pop());
    }
}

/// Passes `err` through, logging it together with the current tag stack.
#[inline]
pub(crate) fn traced(err: CodecError) -> CodecError {
    #[cfg(all(debug_assertions, feature = "debug"))]
    stack::TAG_STACK.with_borrow(|stack| {
        if !stack.is_empty() {
            log::debug!("{err} (stack:\n{stack:?})");
        }
    });
    err
}
