pub mod builders;
pub mod multipart;
pub mod parsers;
pub mod services;
