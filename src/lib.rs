pub mod animation;
pub mod comm;
pub mod config;
pub mod feedback;
pub mod host;
pub mod input;
pub mod render;
pub mod runtime;
pub mod slots;
pub mod tiles;
pub mod view;
pub mod windows;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

use animation::SpinnerFrames;
use comm::{HttpGateway, InboundEvent, RequestGateway};
use config::Config;
use host::Navigator;
use input::console::{self, ConsoleCommand};
use input::{ClickRecognizer, InputEvent, RawInput};
use runtime::{AnyResumeStore, DeckHost, FileResumeStore, MemoryResumeStore};
use tiles::{IconCatalog, Tile, TileFile, TileSet};
use view::WindowView;
use windows::{ActionTiming, ActionWindowController, PagingController, WindowKind};

/// How long the loop sleeps when nothing is scheduled
const IDLE_WAIT: Duration = Duration::from_secs(3600);

/// Startup choices made on the command line
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Local tile file; overrides the config and skips the bridge
    pub tiles_path: Option<PathBuf>,
    /// Window to open once tiles are available
    pub open: Option<(WindowKind, u8)>,
    /// Where `snap` writes the top window
    pub snapshot_path: Option<PathBuf>,
}

/// Main application struct
pub struct App<G> {
    tiles: TileSet,
    icons: IconCatalog,
    frames: Arc<SpinnerFrames>,
    action: ActionWindowController,
    paging: PagingController,
    host: DeckHost<G>,
    recognizer: ClickRecognizer,
    inbound: UnboundedReceiver<InboundEvent>,
    pending_open: Option<(WindowKind, u8)>,
    snapshot_path: Option<PathBuf>,
}

impl App<HttpGateway> {
    /// Create the application talking to the configured bridge
    pub fn new(config: Config, options: LaunchOptions) -> Result<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let gateway = HttpGateway::new(
            &config.bridge.url,
            config.device.class.inbox_capacity(),
            events_tx,
        );

        let store = match Config::state_path().and_then(|p| FileResumeStore::open(&p)) {
            Ok(store) => AnyResumeStore::File(store),
            Err(e) => {
                warn!("Resume marker will not persist: {}", e);
                AnyResumeStore::Memory(MemoryResumeStore::default())
            }
        };

        let frames = load_spinner(&config);

        let tiles_path = options.tiles_path.clone().or(config.tiles.path.clone());
        let tiles = match tiles_path {
            Some(path) => {
                let tiles = TileFile::load(&path)?.to_tiles();
                info!("Loaded {} tiles from {:?}", tiles.len(), path);
                Some(tiles)
            }
            None => None,
        };

        let mut app = Self::with_parts(&config, gateway, store, frames, events_rx);
        app.snapshot_path = options.snapshot_path;
        app.pending_open = options.open;
        match tiles {
            Some(tiles) => app.set_tiles(tiles),
            None => app.host.request_tile_set(),
        }
        Ok(app)
    }
}

impl<G: RequestGateway> App<G> {
    /// Assemble an app from already-built collaborators
    pub fn with_parts(
        config: &Config,
        gateway: G,
        store: AnyResumeStore,
        frames: SpinnerFrames,
        inbound: UnboundedReceiver<InboundEvent>,
    ) -> Self {
        let color = config.device.class.supports_color();
        let frames = Arc::new(frames);
        Self {
            tiles: TileSet::default(),
            icons: IconCatalog::new(),
            action: ActionWindowController::new(
                Arc::clone(&frames),
                ActionTiming::from(&config.timing),
                color,
            ),
            paging: PagingController::new(color),
            frames,
            host: DeckHost::new(gateway, store),
            recognizer: ClickRecognizer::new(
                config.timing.long_press(),
                config.timing.multi_click_timeout(),
            ),
            inbound,
            pending_open: None,
            snapshot_path: None,
        }
    }

    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    pub fn top_window(&self) -> Option<WindowKind> {
        self.host.stack.top()
    }

    pub fn action(&self) -> &ActionWindowController {
        &self.action
    }

    pub fn paging(&self) -> &PagingController {
        &self.paging
    }

    pub fn host(&self) -> &DeckHost<G> {
        &self.host
    }

    /// Open `kind` on a menu index, or remember it until tiles arrive
    pub fn open(&mut self, kind: WindowKind, index: u8) -> bool {
        if self.tiles.is_empty() {
            info!("No tiles yet, will open {:?} {} when they arrive", kind, index);
            self.pending_open = Some((kind, index));
            return false;
        }

        let opened = match kind {
            WindowKind::Action => match self.tiles.borrow(index as usize) {
                Some(tile) => self.action.open(&mut self.host, tile, index),
                None => false,
            },
            WindowKind::Paging => match self.tiles.copy_owned(index as usize) {
                Some(tile) => self.paging.open(&mut self.host, tile, index),
                None => false,
            },
        };
        if !opened && index as usize >= self.tiles.len() {
            warn!("No tile at index {} ({} tiles)", index, self.tiles.len());
        }
        opened
    }

    /// Replace the tile set and fetch its icons
    pub fn set_tiles(&mut self, tiles: Vec<Tile>) {
        self.tiles = TileSet::new(tiles);
        self.icons.clear();

        let mut keys: Vec<&str> = Vec::new();
        for tile in self.tiles.iter() {
            for key in tile.distinct_icon_keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        for (index, key) in keys.iter().enumerate() {
            let Ok(index) = u8::try_from(index) else {
                warn!("{} icon keys exceed the catalog, skipping the rest", keys.len());
                break;
            };
            self.host.gateway.request_icon(key, index);
        }
        info!("Tile set ready: {} tiles, {} icons requested", self.tiles.len(), keys.len());

        if let Some((kind, index)) = self.pending_open.take() {
            self.open(kind, index);
        }
    }

    /// Apply a completion reported by the transport
    pub fn handle_inbound(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Action(reply) => match reply.window {
                WindowKind::Action => self.action.on_action_reply(&mut self.host, reply),
                WindowKind::Paging => self.paging.on_action_reply(reply),
            },
            InboundEvent::IconReady { index, key, image } => {
                self.icons.insert(index, &key, image);
                self.action.refresh_icons(&mut self.host);
            }
            InboundEvent::Tiles(tiles) => self.set_tiles(tiles),
        }
        self.reconcile();
    }

    /// Feed a raw button edge through the click recognizer
    pub fn handle_raw(&mut self, input: RawInput, now: Instant) {
        for event in self.recognizer.handle(input, now) {
            self.dispatch(event);
        }
    }

    /// Route a recognized event to the window on top
    pub fn dispatch(&mut self, event: InputEvent) {
        match self.host.stack.top() {
            Some(WindowKind::Action) => self.action.on_input(&mut self.host, event),
            Some(WindowKind::Paging) => self.paging.on_input(&mut self.host, event),
            None => debug!("No window open, ignoring {:?}", event),
        }
        self.reconcile();
    }

    /// Fire due timers, spinner frames and pending input events
    pub fn tick(&mut self, now: Instant) {
        for event in self.host.timers.due(now) {
            self.action.on_timer(&mut self.host, event, now);
        }
        self.action.poll_animation(now);
        for event in self.recognizer.poll(now) {
            self.dispatch(event);
        }
        self.reconcile();
    }

    /// Earliest instant `tick` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.host.timers.next_deadline(),
            self.action.animation_deadline(),
            self.recognizer.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Close controllers whose windows left the stack
    fn reconcile(&mut self) {
        for kind in self.host.stack.take_popped() {
            match kind {
                WindowKind::Action => self.action.close(&mut self.host),
                WindowKind::Paging => self.paging.close(&mut self.host),
            }
        }
        // Closing may pop again; those are already gone from the stack
        self.host.stack.take_popped();
    }

    fn top_view(&self) -> Option<&WindowView> {
        match self.host.stack.top()? {
            WindowKind::Action => self.action.view(),
            WindowKind::Paging => self.paging.view(),
        }
    }

    /// Log what changed on the top window since the last redraw
    fn redraw(&mut self) {
        let view = match self.host.stack.top() {
            Some(WindowKind::Action) => self.action.view_mut(),
            Some(WindowKind::Paging) => self.paging.view_mut(),
            None => None,
        };
        if let Some(view) = view {
            if view.take_dirty() {
                let labels: Vec<&str> = view.labels.iter().map(|l| l.text.as_str()).collect();
                debug!(
                    "Redraw: labels {:?} icons {:?} inset {:?}",
                    labels,
                    view.icons,
                    view.inset_row()
                );
            }
        }
    }

    fn snapshot(&self) -> Result<()> {
        let Some(path) = self.snapshot_path.as_ref() else {
            warn!("No snapshot path configured (use --snapshot)");
            return Ok(());
        };
        let Some(view) = self.top_view() else {
            warn!("No window to snapshot");
            return Ok(());
        };
        let overflow = self.action.overflow_icon().map(|i| &**i);
        let img = render::render_window(view, &self.icons, &self.frames, overflow);
        render::save_snapshot(&img, path)?;
        info!("Snapshot written to {:?}", path);
        Ok(())
    }

    /// Returns false when the app should exit
    fn handle_command(&mut self, command: ConsoleCommand) -> Result<bool> {
        let now = Instant::now();
        match command {
            ConsoleCommand::Quit => return Ok(false),
            ConsoleCommand::Open(index) => {
                self.open(WindowKind::Action, index);
            }
            ConsoleCommand::Page(index) => {
                self.open(WindowKind::Paging, index);
            }
            ConsoleCommand::Snapshot => self.snapshot()?,
            other => {
                for input in other.raw_inputs() {
                    self.handle_raw(input, now);
                }
            }
        }
        Ok(true)
    }

    /// Run the event loop until stdin closes or `quit`
    pub async fn run(&mut self) -> Result<()> {
        let (commands_tx, mut commands) = mpsc::unbounded_channel();
        tokio::spawn(console::read_commands(commands_tx));
        info!("Ready - type up/select/down/back/back2/hold/release/tap/open N/page N/snap/quit");

        loop {
            let deadline = self
                .next_deadline()
                .unwrap_or_else(|| Instant::now() + IDLE_WAIT);

            tokio::select! {
                Some(command) = commands.recv() => {
                    if !self.handle_command(command)? {
                        break;
                    }
                }
                Some(event) = self.inbound.recv() => {
                    self.handle_inbound(event);
                }
                _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                    self.tick(Instant::now());
                }
            }
            self.redraw();
        }
        Ok(())
    }

    /// Close every window, cancelling their timers
    pub fn shutdown(&mut self) {
        info!("Shutting down tile-deck...");
        self.action.close(&mut self.host);
        self.paging.close(&mut self.host);
        self.host.pop_all();
        self.host.stack.take_popped();
    }
}

fn load_spinner(config: &Config) -> SpinnerFrames {
    let delay = config.timing.frame_delay();
    match config.spinner.gif_path.as_ref() {
        Some(path) => SpinnerFrames::load(path, delay).unwrap_or_else(|e| {
            warn!("Failed to load spinner {:?}: {}, using built-in", path, e);
            SpinnerFrames::generated(delay)
        }),
        None => SpinnerFrames::generated(delay),
    }
}
