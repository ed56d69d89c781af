mod codec;
mod message;

pub use codec::*;
pub use message::*;

pub extern crate serde;
pub extern crate serde_json;
