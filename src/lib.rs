//! Rupaco is a RUst PAttern COllection generator for classical planning.
//!
//! Given a planning task made of finite-domain state variables, a
//! pattern collection is a set of disjoint variable subsets; projecting
//! the task onto each pattern yields a pattern database (PDB), a perfect
//! distance-to-goal table whose sum over the collection is an admissible
//! heuristic. This crate builds such collections with a
//! counterexample-guided abstraction refinement (CEGAR) loop: abstract
//! plans are executed in the concrete task, and the variables whose
//! absence made the execution fail drive the enlargement of the patterns.

#![warn(missing_docs)]

pub mod io;

pub mod pdbs;

pub mod planning;

pub mod utils;
