pub mod stdio;
pub mod websocket;
