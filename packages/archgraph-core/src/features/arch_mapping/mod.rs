//! Arch Mapping - raw facts to an ArchJSON document

mod mapper;

pub use mapper::ArchJsonMapper;
