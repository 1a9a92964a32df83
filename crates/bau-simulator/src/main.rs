//! Desktop simulator for the Broadcast Audio URI QR display.
//!
//! Renders the bau-core QR view in an SDL2 window via
//! `embedded-graphics-simulator`. Keyboard input stands in for the broadcast
//! source changing its identity, so the update path can be exercised without
//! hardware. Every newly shown code is decoded again and logged the way a
//! phone-side scanner would report it.
//!
//! An optional TOML config path may be passed as the first argument.
//!
//! # Key bindings
//!
//! | Key | Action                           |
//! |-----|----------------------------------|
//! | N   | Next broadcast name              |
//! | I   | Next broadcast ID                |
//! | A   | Next device address              |
//! | L   | Try an over-long broadcast name  |
//! | R   | Redraw the whole screen          |
//! | Q   | Quit                             |

use std::convert::Infallible;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info, warn};

use bau_core::config::Config;
use bau_core::display::Panel;
use bau_core::display_manager::{DisplayManager, DisplayRequest};
use bau_core::identity::MAX_NAME_LEN;
use bau_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};
use bau_core::uri::ScanFilter;
use bau_core::{BdAddr, BroadcastIdentity, QrRenderer};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// Names cycled through with the N key.
const DEMO_NAMES: [&str; 5] = [
    "Kitchen",
    "Living Room",
    "Gate 12 Announcements",
    "Conference Room B",
    "Café Zürich",
];

// ---------------------------------------------------------------------------
// Simulated panel
// ---------------------------------------------------------------------------

/// SDL-backed panel. It is always ready and tracks blanking so the window
/// stays dark until the renderer turns the panel on.
struct SimPanel {
    display: SimulatorDisplay<Rgb565>,
    blanked: bool,
}

impl SimPanel {
    fn new() -> Self {
        Self {
            display: SimulatorDisplay::new(Size::new(
                DISPLAY_WIDTH_PX as u32,
                DISPLAY_HEIGHT_PX as u32,
            )),
            blanked: true,
        }
    }
}

impl OriginDimensions for SimPanel {
    fn size(&self) -> Size {
        self.display.size()
    }
}

impl DrawTarget for SimPanel {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.display.draw_iter(pixels)
    }
}

impl Panel for SimPanel {
    fn is_ready(&self) -> bool {
        true
    }

    fn set_blanking(&mut self, blank: bool) -> Result<(), Self::Error> {
        info!("Panel blanking {}", if blank { "on" } else { "off" });
        self.blanked = blank;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Demo broadcast source
// ---------------------------------------------------------------------------

/// Stand-in for the audio stack: owns the advertised identity and mutates
/// it on key presses.
struct DemoSource {
    identity: BroadcastIdentity,
    name_index: usize,
}

impl DemoSource {
    fn new(identity: BroadcastIdentity) -> Self {
        Self {
            identity,
            name_index: 0,
        }
    }

    fn with_name(&self, name: &[u8]) -> Option<BroadcastIdentity> {
        match BroadcastIdentity::new(self.identity.address, self.identity.broadcast_id, name) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!("Rejected broadcast name ({} bytes): {}", name.len(), e);
                None
            }
        }
    }

    /// Apply a key press, returning the request to queue if anything changed.
    fn on_key(&mut self, keycode: Keycode) -> Option<DisplayRequest> {
        let next = match keycode {
            Keycode::N => {
                let name = DEMO_NAMES[self.name_index % DEMO_NAMES.len()];
                self.name_index += 1;
                self.with_name(name.as_bytes())?
            }
            Keycode::I => {
                let mut identity = self.identity.clone();
                identity.broadcast_id = identity.broadcast_id.wrapping_next();
                identity
            }
            Keycode::A => {
                let mut bytes = *self.identity.address.as_bytes();
                bytes[0] = bytes[0].wrapping_add(1);
                let mut identity = self.identity.clone();
                identity.address = BdAddr::new(bytes);
                identity
            }
            Keycode::L => self.with_name(&[b'L'; MAX_NAME_LEN + 1])?,
            Keycode::R => return Some(DisplayRequest::Redraw),
            _ => return None,
        };

        info!(
            "Source now {} / {:06X}",
            next.address,
            next.broadcast_id.get()
        );
        self.identity = next.clone();
        Some(DisplayRequest::UpdateIdentity(next))
    }
}

// ---------------------------------------------------------------------------
// Startup helpers
// ---------------------------------------------------------------------------

/// Load the config file named on the command line, or the defaults.
fn load_config() -> Config {
    let Some(path) = std::env::args().nth(1) else {
        info!("No config file given, using defaults");
        return Config::default();
    };

    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|text| toml::from_str::<Config>(&text).map_err(|e| e.to_string()));

    match parsed {
        Ok(config) => {
            info!("Loaded config from {}", path);
            config
        }
        Err(e) => {
            warn!("Ignoring config {}: {}", path, e);
            Config::default()
        }
    }
}

/// Decode the code on screen and log it once per distinct payload.
fn report_scan(filter: &mut ScanFilter, payload: &str) {
    if let Some(fields) = filter.offer(payload) {
        info!("Scanned: {}", payload);
        for field in fields {
            info!("  {:<17} {}", field.label(), field);
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting Broadcast Audio URI simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: N=Name  I=ID  A=Address  L=LongName  R=Redraw  Q=Quit");

    let config = load_config();

    let mut panel = SimPanel::new();
    let renderer = match QrRenderer::initialize(&mut panel, &config.display) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!("Renderer init failed: {:?}", e);
            return;
        }
    };
    let mut manager = DisplayManager::new(panel, renderer);

    let identity = match config.broadcast.identity() {
        Ok(identity) => identity,
        Err(e) => {
            warn!("Invalid broadcast config ({}), using defaults", e);
            match Config::default().broadcast.identity() {
                Ok(identity) => identity,
                Err(e) => {
                    error!("Default broadcast config rejected: {}", e);
                    return;
                }
            }
        }
    };
    let mut source = DemoSource::new(identity.clone());
    let mut pending = vec![DisplayRequest::UpdateIdentity(identity)];
    let mut scanner = ScanFilter::new();

    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Broadcast Audio URI", &output_settings);

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    window.update(&manager.panel().display);

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => {
                    if keycode == Keycode::Q || keycode == Keycode::Escape {
                        break 'running;
                    }

                    if let Some(request) = source.on_key(keycode) {
                        pending.push(request);
                    }
                }

                _ => {}
            }
        }

        // --- Render -------------------------------------------------------
        if !pending.is_empty() {
            match manager.process_batch(pending.drain(..)) {
                Ok(true) => report_scan(&mut scanner, manager.renderer().payload().as_str()),
                Ok(false) => {}
                Err(e) => error!("Render error: {:?}", e),
            }
        }

        if !manager.panel().blanked {
            window.update(&manager.panel().display);
        }

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}
