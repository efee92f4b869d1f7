// Domain layer - Pure models and the status classifier
pub mod machine;
pub mod reminder;
pub mod room;
pub mod status;
