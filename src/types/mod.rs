//! Data types for the template preview.

mod input;
mod page;
mod schema;
mod template;

pub use input::*;
pub use page::*;
pub use schema::*;
pub use template::*;
