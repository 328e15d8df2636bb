use std::fmt;
use std::iter::FromIterator;

use symbolic_expressions::Sexp;

/// An interned string.
///
/// This is provided by the
/// [`symbol_table`](https://crates.io/crates/symbol_table) crate.
///
/// `eqsat` compares operator names and pattern variables constantly, so
/// both are held as interned [`Symbol`]s: a 4-byte index into a global
/// string table that is `Copy`, `Eq`, `Ord`, and `Hash` for free.
///
/// The internal symbol cache leaks the strings, which should be fine if
/// you only put in things like operator names and variables.
///
/// # Example
/// ```rust
/// use eqsat::Symbol;
///
/// assert_eq!(Symbol::from("foo"), Symbol::from("foo"));
/// assert_ne!(Symbol::from("foo"), Symbol::from("bar"));
/// ```
pub use symbol_table::GlobalSymbol as Symbol;

pub(crate) type BuildHasher = fxhash::FxBuildHasher;

// Insertion-ordered maps keep every iteration in the crate (class
// enumeration, match order, extraction tie-breaks) deterministic for a
// given operation history.
pub(crate) type HashMap<K, V> = indexmap::IndexMap<K, V, BuildHasher>;
pub(crate) type HashSet<K> = indexmap::IndexSet<K, BuildHasher>;

pub(crate) fn concat_vecs<T>(to: &mut Vec<T>, mut from: Vec<T>) {
    if to.len() < from.len() {
        std::mem::swap(to, &mut from)
    }
    to.extend(from);
}

/// Renders `sexp` with line breaks: a list whose flat form exceeds
/// `width` puts every argument on its own line, indented two spaces per
/// nesting level.
pub(crate) fn pretty_print(
    buf: &mut String,
    sexp: &Sexp,
    width: usize,
    level: usize,
) -> fmt::Result {
    use std::fmt::Write;

    let flat = sexp.to_string();
    let list = match sexp {
        Sexp::List(list) => list,
        // the sexp layer may quote atoms; ops and variables print bare
        _ => return write!(buf, "{}", flat.trim_matches('"')),
    };

    write!(buf, "(")?;
    for (i, arg) in list.iter().enumerate() {
        if i > 0 {
            if flat.len() > width {
                write!(buf, "\n{:indent$}", "", indent = 2 * level)?;
            } else {
                write!(buf, " ")?;
            }
        }
        pretty_print(buf, arg, width, level + 1)?;
    }
    write!(buf, ")")
}

/** A data structure to maintain a queue of unique elements.

Notably, insert/pop operations have O(1) expected amortized runtime complexity.
*/
#[derive(Clone, Debug)]
pub(crate) struct UniqueQueue<T>
where
    T: Eq + std::hash::Hash + Clone,
{
    set: HashSet<T>,
    queue: std::collections::VecDeque<T>,
}

impl<T> Default for UniqueQueue<T>
where
    T: Eq + std::hash::Hash + Clone,
{
    fn default() -> Self {
        UniqueQueue {
            set: HashSet::default(),
            queue: std::collections::VecDeque::new(),
        }
    }
}

impl<T> UniqueQueue<T>
where
    T: Eq + std::hash::Hash + Clone,
{
    pub fn insert(&mut self, t: T) {
        if self.set.insert(t.clone()) {
            self.queue.push_back(t);
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        let res = self.queue.pop_front();
        res.as_ref().map(|t| self.set.remove(t));
        res
    }

    pub fn is_empty(&self) -> bool {
        let r = self.queue.is_empty();
        debug_assert_eq!(r, self.set.is_empty());
        r
    }
}

impl<A> FromIterator<A> for UniqueQueue<A>
where
    A: Eq + std::hash::Hash + Clone,
{
    fn from_iter<T: IntoIterator<Item = A>>(iter: T) -> Self {
        let mut queue = UniqueQueue::default();
        for t in iter {
            queue.insert(t);
        }
        queue
    }
}
