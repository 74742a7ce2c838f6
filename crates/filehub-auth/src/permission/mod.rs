//! Permission notation and resolution.
//!
//! - `notation`: the two string encodings and the canonical matrix
//! - `table`: directory to matrix lookup
//! - `operation`: operations and the rights they require
//! - `actor`: who is asking and what they are touching
//! - `resolver`: tier selection and the grant/deny decision

pub mod actor;
pub mod notation;
pub mod operation;
pub mod resolver;
pub mod table;

pub use actor::{Actor, Principal, Resource};
pub use notation::PermissionMatrix;
pub use operation::{Operation, Transfer, first_segment};
pub use resolver::PermissionResolver;
pub use table::PermissionTable;
