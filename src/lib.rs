#[macro_use]
extern crate derive_more;

pub mod configuration;
pub mod domain;
pub mod error;
pub mod routes;
pub mod schema;
pub mod storage;

pub use error::Error;
pub use routes::routes;
pub use storage::Dataset;
