/// Use mimalloc as the global allocator for all binaries.
/// The sort buffer holds millions of small URL allocations, freed in
/// batches on every flush.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod common;
pub mod dedup;
pub mod error;
pub mod export;
pub mod repair;
pub mod shorturl;
pub mod sort;
pub mod verify;

pub use error::{Error, Result};
