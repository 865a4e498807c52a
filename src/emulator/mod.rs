pub mod alu;
pub mod basics;
pub mod errors;
pub mod executor;
pub mod memory;
pub mod program;
pub mod registers;
pub mod trace;
pub mod vm;
