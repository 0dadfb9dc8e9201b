pub mod content_page;
pub mod gallery_image;
pub mod race_category;
pub mod race_edition;
pub mod race_result;
pub mod race_route;
pub mod registration;
pub mod user;
