pub mod controller;
pub mod narration_queue;
pub mod poller;
