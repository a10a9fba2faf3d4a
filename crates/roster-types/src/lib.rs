mod field;
mod record;

pub use field::*;
pub use record::*;

pub const MAX_HUMAN_AGE: u32 = 123;
