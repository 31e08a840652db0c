pub mod json;

pub use json::{FormJson, FormJsonRejection};
