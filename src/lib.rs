//! appcall: send one HTTP-shaped request straight into an in-process
//! application router and print the normalized response.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
