//! Reusable pools of pre-sized bigints.
//!
//! Tight loops such as the Fermat trials of a prime search or the
//! square-and-reduce steps of a modular exponentiation would otherwise
//! allocate fresh temporaries on every pass. A [`Scratch`] is prepared
//! once and handed down; nested operations use child arenas so a caller's
//! slots are never clobbered. Arenas form a tree, and drop order (values,
//! then children, then the arena) falls out of ownership.

use alloc::vec::Vec;

use crate::numbers::Bigint;
use crate::Result;

#[derive(Default)]
pub struct Scratch {
    pub(crate) vals: Vec<Bigint>,
    pub(crate) children: Vec<Scratch>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guarantee at least `n_vals` bigints with at least `min_digits`
    /// allocated digits each. Idempotent; grows, never shrinks.
    pub fn prepare(&mut self, n_vals: usize, min_digits: usize) -> Result<()> {
        for v in self.vals.iter_mut() {
            if v.digits.len() < min_digits {
                v.grow(min_digits, true)?;
            }
        }
        while self.vals.len() < n_vals {
            self.vals.push(Bigint::with_digits(min_digits));
        }
        Ok(())
    }

    /// Guarantee a child arena at index 0 and return it.
    pub(crate) fn child(&mut self) -> &mut Scratch {
        if self.children.is_empty() {
            self.children.push(Scratch::new());
        }
        &mut self.children[0]
    }

    /// The first `N` prepared slots as an array of distinct borrows.
    pub(crate) fn array_mut<const N: usize>(&mut self) -> &mut [Bigint; N] {
        (&mut self.vals[..N]).try_into().expect("scratch not prepared")
    }
}
