pub mod ncm;

pub use ncm::Ncm;
