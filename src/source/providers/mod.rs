pub mod demo;
pub mod files;

pub use demo::DemoSource;
pub use files::FileSource;
