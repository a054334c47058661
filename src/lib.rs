// studiolog - lib.rs
//
// Library entry point. The analysis engine is pure library code; the CLI
// in main.rs is a thin display shell over it.

pub mod core;
pub mod util;
