//! Trigger-driven mention autocomplete.
//!
//! Data flows one way: every transaction goes through [`session::reduce`],
//! [`filter::filter`] derives the candidates from the resulting session, and
//! key handling either moves the selected index (a session override) or
//! calls [`commit::commit`], whose transaction runs through the same reducer.

pub mod catalog;
pub mod command;
pub mod commit;
pub mod deletion;
pub mod filter;
pub mod popup;
pub mod session;
pub mod trigger;
