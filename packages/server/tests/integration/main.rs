
mod content;
mod editions;
mod registrations;
