// Application layer - Use cases over the upstream repository
pub mod laundry_repository;
pub mod reminder_service;
pub mod room_service;
pub mod streaming_service;
