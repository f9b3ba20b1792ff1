//! Turning a page URL into recipe fields: fetching, structured extraction,
//! content reduction and generative extraction.

pub mod fetchers;
pub mod html;
pub mod text;
