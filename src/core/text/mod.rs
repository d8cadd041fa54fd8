//! Text measurement helpers.
//!
//! Pure string-in/number-out functions that widgets use to lay out styled
//! lines without knowing which escape sequences they contain.

pub mod width;
