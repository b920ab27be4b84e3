pub mod reactive;
pub mod traditional;
