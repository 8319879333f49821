//! Query layer: normalized request keys, the fetch seam, and the
//! single-flight cache.

mod cache;
mod key;
mod source;

pub use cache::{QueryCache, QueryHandle, QuerySnapshot, QueryStatus};
pub use key::{ProductQuery, QueryKey};
pub use source::{ProductSource, QueryError};
