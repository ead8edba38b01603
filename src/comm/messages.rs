//! Wire types exchanged with the request bridge

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::RequestError;
use crate::tiles::icons::decode_icon;
use crate::tiles::{IconImage, Tile, TileConfig};
use crate::windows::WindowKind;

/// Result of an action request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Good,
    Bad,
    Error,
}

/// Correlates a reply with the window session and click that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
    /// Bumped each time the window opens
    pub generation: u32,
    /// Bumped on each request within one opening
    pub sequence: u32,
}

/// Outbound action request for one tile slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRequest {
    pub window: WindowKind,
    /// Menu index the window was opened with
    pub window_index: u8,
    pub tile_id: u8,
    pub slot: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<RequestToken>,
}

/// Inbound message as sent by the bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    ActionResult {
        outcome: Outcome,
        #[serde(default)]
        token: Option<RequestToken>,
    },
    Icon {
        index: u8,
        key: String,
        /// Base64 encoded PNG/GIF bytes
        data: String,
    },
    Tiles {
        tiles: Vec<TileConfig>,
    },
}

/// Reply to an action request, routed back to the window that sent it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionReply {
    pub window: WindowKind,
    pub outcome: Outcome,
    pub token: Option<RequestToken>,
}

/// Completion notifications delivered to the event loop
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Action(ActionReply),
    IconReady {
        index: u8,
        key: String,
        image: IconImage,
    },
    Tiles(Vec<Tile>),
}

/// Parse one inbound message, refusing anything larger than the inbox
pub fn decode_inbound(bytes: &[u8], capacity: usize) -> Result<InboundMessage, RequestError> {
    if bytes.len() > capacity {
        return Err(RequestError::TooLarge {
            len: bytes.len(),
            capacity,
        });
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Decode the base64 payload of an icon message
pub fn decode_icon_data(data: &str) -> Result<IconImage, RequestError> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| RequestError::Icon(e.to_string()))?;
    let image = decode_icon(&bytes).map_err(|e| RequestError::Icon(e.to_string()))?;
    Ok(Arc::new(image))
}
