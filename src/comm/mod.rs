//! Request gateway: outbound action / icon / tile requests and their replies

mod error;
pub mod gateway;
pub mod messages;

pub use error::RequestError;
pub use gateway::{HttpGateway, RequestGateway};
pub use messages::{
    decode_inbound, ActionReply, ActionRequest, InboundEvent, InboundMessage, Outcome,
    RequestToken,
};
