pub mod code;
pub mod compare;
pub mod record;

#[cfg(test)]
mod tests;

pub use self::code::*;
pub use self::compare::*;
pub use self::record::*;
