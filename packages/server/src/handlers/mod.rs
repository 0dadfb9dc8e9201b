pub mod auth;
pub mod category;
pub mod content;
pub mod edition;
pub mod registration;
pub mod result;
