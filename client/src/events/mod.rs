mod client_event;

pub use client_event::ClientEvent;
