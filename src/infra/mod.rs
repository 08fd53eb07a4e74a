//! Infrastructure adapters: bounded listener buffers and event fan-out.

pub mod broadcaster;
pub mod ring_buffer;

pub use broadcaster::{QueueBroadcaster, QueueListener, DEFAULT_LISTENER_CAPACITY};
pub use ring_buffer::RingBuffer;
