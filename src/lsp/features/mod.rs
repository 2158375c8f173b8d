//! Position-addressed LSP features
//!
//! - `completion`: intent detection, bracket handlers and catalogs
//! - `hover`: token kind under the cursor

pub mod completion;
pub mod hover;
