pub mod field;
pub mod lookup;
pub mod util;
