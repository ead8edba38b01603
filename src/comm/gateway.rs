use reqwest::{Client, Response, StatusCode};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::messages::decode_icon_data;
use super::{
    decode_inbound, ActionReply, ActionRequest, InboundEvent, InboundMessage, Outcome,
    RequestError,
};
use crate::tiles::TileConfig;

/// Outbound side of the transport. All calls return immediately;
/// completions come back later as `InboundEvent`s.
pub trait RequestGateway {
    fn request_action(&mut self, request: ActionRequest);
    fn request_icon(&mut self, key: &str, index: u8);
    fn request_tile_set(&mut self);
}

/// Gateway that talks to an HTTP bridge and reports back over a channel
pub struct HttpGateway {
    client: Client,
    base_url: String,
    inbox_capacity: usize,
    events: UnboundedSender<InboundEvent>,
}

impl HttpGateway {
    pub fn new(base_url: &str, inbox_capacity: usize, events: UnboundedSender<InboundEvent>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            inbox_capacity,
            events,
        }
    }
}

impl RequestGateway for HttpGateway {
    fn request_action(&mut self, request: ActionRequest) {
        debug!(
            "Action request: tile {} slot {} ({:?})",
            request.tile_id, request.slot, request.window
        );
        let client = self.client.clone();
        let url = format!("{}/action", self.base_url);
        let capacity = self.inbox_capacity;
        let events = self.events.clone();

        tokio::spawn(async move {
            let outcome = match post_action(&client, &url, &request, capacity).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Action request for slot {} failed: {}", request.slot, e);
                    e.outcome()
                }
            };
            let reply = ActionReply {
                window: request.window,
                outcome,
                token: request.token,
            };
            if events.send(InboundEvent::Action(reply)).is_err() {
                debug!("Event loop gone, dropping action reply");
            }
        });
    }

    fn request_icon(&mut self, key: &str, index: u8) {
        let client = self.client.clone();
        let url = format!(
            "{}/icons/{}?index={}",
            self.base_url,
            urlencoding::encode(key),
            index
        );
        let capacity = self.inbox_capacity;
        let events = self.events.clone();
        let key = key.to_string();

        tokio::spawn(async move {
            match fetch_icon(&client, &url, capacity).await {
                Ok(event) => {
                    let _ = events.send(event);
                }
                Err(e) => warn!("Icon request for '{}' failed: {}", key, e),
            }
        });
    }

    fn request_tile_set(&mut self) {
        info!("Requesting tile set");
        let client = self.client.clone();
        let url = format!("{}/tiles", self.base_url);
        let events = self.events.clone();

        // The tile list is not bounded by the inbox; it is split across
        // messages on constrained devices.
        tokio::spawn(async move {
            match fetch_tiles(&client, &url).await {
                Ok(tiles) => {
                    info!("Received {} tiles", tiles.len());
                    let tiles = tiles.iter().map(TileConfig::to_tile).collect();
                    let _ = events.send(InboundEvent::Tiles(tiles));
                }
                Err(e) => warn!("Tile set request failed: {}", e),
            }
        });
    }
}

async fn post_action(
    client: &Client,
    url: &str,
    request: &ActionRequest,
    capacity: usize,
) -> Result<Outcome, RequestError> {
    let response = client.post(url).json(request).send().await?;
    let body = read_capped(check_status(response)?, capacity).await?;

    if body.is_empty() {
        return Ok(Outcome::Good);
    }
    match decode_inbound(&body, capacity)? {
        InboundMessage::ActionResult { outcome, .. } => Ok(outcome),
        _ => Err(RequestError::Failed(
            "reply was not an action result".to_string(),
        )),
    }
}

async fn fetch_icon(client: &Client, url: &str, capacity: usize) -> Result<InboundEvent, RequestError> {
    let response = client.get(url).send().await?;
    let body = read_capped(check_status(response)?, capacity).await?;

    match decode_inbound(&body, capacity)? {
        InboundMessage::Icon { index, key, data } => Ok(InboundEvent::IconReady {
            index,
            key,
            image: decode_icon_data(&data)?,
        }),
        _ => Err(RequestError::Icon("reply was not an icon".to_string())),
    }
}

async fn fetch_tiles(client: &Client, url: &str) -> Result<Vec<TileConfig>, RequestError> {
    let response = check_status(client.get(url).send().await?)?;
    let body = response.bytes().await?;

    match serde_json::from_slice::<InboundMessage>(&body)? {
        InboundMessage::Tiles { tiles } => Ok(tiles),
        _ => Err(RequestError::Failed("reply was not a tile set".to_string())),
    }
}

fn check_status(response: Response) -> Result<Response, RequestError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status.is_client_error() && status != StatusCode::REQUEST_TIMEOUT {
        Err(RequestError::Rejected(status.as_u16()))
    } else {
        Err(RequestError::Failed(format!("bridge returned {}", status)))
    }
}

/// Read a response body, giving up as soon as it outgrows the inbox
async fn read_capped(mut response: Response, capacity: usize) -> Result<Vec<u8>, RequestError> {
    if let Some(len) = response.content_length() {
        if len as usize > capacity {
            return Err(RequestError::TooLarge {
                len: len as usize,
                capacity,
            });
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() > capacity {
            return Err(RequestError::TooLarge {
                len: body.len(),
                capacity,
            });
        }
    }
    Ok(body)
}
