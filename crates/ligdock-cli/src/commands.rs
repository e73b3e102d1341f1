pub mod dock;
pub mod extract;
pub mod prepare;
pub mod report;
