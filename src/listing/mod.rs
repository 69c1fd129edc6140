//! Finding the newest document on the listing page.

pub mod extractor;
pub mod model;
pub mod selector;


pub use extractor::extract_links;
pub use model::{DateToken, DocumentReference};
pub use selector::{extract_date_token, select_latest};
