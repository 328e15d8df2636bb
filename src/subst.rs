use std::fmt;
use std::str::FromStr;

use crate::{Id, Symbol};

/// A variable for use in [`Pattern`](crate::Pattern)s or [`Subst`]s.
///
/// This implements [`FromStr`], and will only parse if it has a
/// leading `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(Symbol);

impl FromStr for Var {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('?') && s.len() > 1 {
            Ok(Var(s.into()))
        } else {
            Err(format!("{} is not a valid variable", s))
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A substitution mapping [`Var`]s to e-class [`Id`]s.
///
/// The e-matcher produces one `Subst` per match; instantiating a
/// right-hand side looks its variables up here. Indexing by an unbound
/// variable is a bug in the caller and panics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Subst {
    vec: smallvec::SmallVec<[(Var, Id); 3]>,
}

impl Subst {
    /// Insert something, returning the old `Id` if present.
    pub fn insert(&mut self, var: Var, id: Id) -> Option<Id> {
        for pair in &mut self.vec {
            if pair.0 == var {
                return Some(std::mem::replace(&mut pair.1, id));
            }
        }
        self.vec.push((var, id));
        None
    }

    /// Retrieve a `Var`, returning `None` if not present.
    pub fn get(&self, var: Var) -> Option<&Id> {
        self.vec
            .iter()
            .find_map(|(v, id)| if *v == var { Some(id) } else { None })
    }

    /// The number of bound variables.
    pub fn len(&self) -> usize {
        self.vec.len()
    }

    /// `true` if no variables are bound.
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }
}

impl std::ops::Index<Var> for Subst {
    type Output = Id;

    fn index(&self, var: Var) -> &Self::Output {
        match self.get(var) {
            Some(id) => id,
            None => panic!("var {} not found in {:?}", var, self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_parse() {
        assert!("?x".parse::<Var>().is_ok());
        assert!("?foo-bar".parse::<Var>().is_ok());
        assert!("x".parse::<Var>().is_err());
        assert!("?".parse::<Var>().is_err());
    }

    #[test]
    fn subst_insert_get() {
        let x: Var = "?x".parse().unwrap();
        let y: Var = "?y".parse().unwrap();

        let mut subst = Subst::default();
        assert_eq!(subst.insert(x, Id::from(0)), None);
        assert_eq!(subst.insert(y, Id::from(1)), None);
        assert_eq!(subst.insert(x, Id::from(2)), Some(Id::from(0)));

        assert_eq!(subst[x], Id::from(2));
        assert_eq!(subst.get(y), Some(&Id::from(1)));
    }

    #[test]
    #[should_panic]
    fn subst_unbound_var_panics() {
        let subst = Subst::default();
        let x: Var = "?x".parse().unwrap();
        let _ = subst[x];
    }
}
