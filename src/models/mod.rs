//! Data Models
//!
//! Request, response, record and configuration types.

pub mod analysis;
pub mod request;
pub mod response;
pub mod settings;

pub use analysis::*;
pub use request::*;
pub use response::*;
pub use settings::*;
