pub mod chunker;
pub mod interface;
pub mod mymemory;
pub mod translator;

pub use mymemory::MyMemoryClient;
pub use translator::Translator;
