//! CampusCard Student Model
//!
//! Defines the core data contracts shared by every export:
//! - **Records:** Student submissions as read from the record store
//! - **Tenants:** College identities that own a record set
//! - **Dates:** Parsing and display formats for birth dates and timestamps
//! - **Naming:** Deterministic archive entry names
//!
//! Records are immutable snapshots; nothing in this crate performs I/O.

pub mod dates;
pub mod naming;
pub mod record;
pub mod tenant;

pub use naming::*;
pub use record::*;
pub use tenant::*;
