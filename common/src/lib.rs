//! emicalc Common Types
//!
//! Currency codes and display money shared by the amortization engine, the
//! rate conversion service and the command-line front end.

pub mod monetary;
pub mod error;

pub use monetary::*;
pub use error::*;
