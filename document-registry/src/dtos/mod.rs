pub mod documents;

pub use documents::DocumentResponse;
