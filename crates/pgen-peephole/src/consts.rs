//! The constants table the optimizer folds `LOAD_CONST` runs into and tests
//! for truthiness.
//!
//! Grounded on `Python/peephole.c`'s use of `PyObject_IsTrue` (the `LOAD_CONST
//! trueconst; POP_JUMP_IF_FALSE` fold) and `PyTuple_New`/`PyList_Append`
//! (`fold_tuple_on_constants`). A small closed enum stands in for CPython's
//! `PyObject` universe — the optimizer only ever needs to test truthiness and
//! build tuples out of existing constants, never to evaluate arbitrary
//! values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Const {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Tuple(Vec<Const>),
}

impl Const {
    /// `PyObject_IsTrue`: `None` and `False` are falsy, `0` is falsy, an
    /// empty string or tuple is falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Const::None => false,
            Const::Bool(b) => *b,
            Const::Int(n) => *n != 0,
            Const::Str(s) => !s.is_empty(),
            Const::Tuple(items) => !items.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsy_values() {
        assert!(!Const::None.is_truthy());
        assert!(!Const::Bool(false).is_truthy());
        assert!(!Const::Int(0).is_truthy());
        assert!(!Const::Str(String::new()).is_truthy());
        assert!(!Const::Tuple(Vec::new()).is_truthy());
    }

    #[test]
    fn truthy_values() {
        assert!(Const::Bool(true).is_truthy());
        assert!(Const::Int(1).is_truthy());
        assert!(Const::Int(-1).is_truthy());
        assert!(Const::Str("x".to_string()).is_truthy());
        assert!(Const::Tuple(vec![Const::None]).is_truthy());
    }
}
