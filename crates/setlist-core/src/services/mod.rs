pub mod setlist_service;

pub use setlist_service::SetlistService;
