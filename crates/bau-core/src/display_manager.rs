//! Display Manager for handling QR updates from other tasks
//!
//! This module provides an async task-based display management system that:
//! - Owns the panel and the [`QrRenderer`]
//! - Receives identity changes and redraw requests via a channel
//! - Stages every request already queued, then renders once
//!
//! The bounded channel is the backpressure point: producers that outrun the
//! panel wait in `send().await` (or see `try_send` fail) instead of forcing a
//! render per change.

use core::fmt::Debug;
use core::iter;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use log::{debug, error, info};

use crate::display::Panel;
use crate::error::RenderError;
use crate::identity::BroadcastIdentity;
use crate::renderer::QrRenderer;

/// Channel capacity for display requests
pub const DISPLAY_REQUEST_CAPACITY: usize = 4;

/// Request to change what the display shows
#[derive(Debug, Clone)]
pub enum DisplayRequest {
    /// Show the QR code for a new broadcast identity
    UpdateIdentity(BroadcastIdentity),
    /// Resend the whole screen, e.g. after the panel was power-cycled
    Redraw,
}

pub type DisplayReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, DisplayRequest, DISPLAY_REQUEST_CAPACITY>;

pub type DisplaySender<'a> =
    Sender<'a, CriticalSectionRawMutex, DisplayRequest, DISPLAY_REQUEST_CAPACITY>;

/// Global channel for display requests
pub static DISPLAY_CHANNEL: Channel<
    CriticalSectionRawMutex,
    DisplayRequest,
    DISPLAY_REQUEST_CAPACITY,
> = Channel::new();

/// Display manager that owns the panel and renders queued requests
pub struct DisplayManager<P: Panel> {
    panel: P,
    renderer: QrRenderer,
}

impl<P: Panel> DisplayManager<P> {
    /// Take over a panel that `renderer` was initialized on
    pub fn new(panel: P, renderer: QrRenderer) -> Self {
        Self { panel, renderer }
    }

    /// Apply one request without drawing
    fn stage(&mut self, request: DisplayRequest) {
        match request {
            DisplayRequest::UpdateIdentity(identity) => {
                if let Err(e) = self.renderer.stage(&identity) {
                    error!(" Rejected identity update: {}", e);
                }
            }
            DisplayRequest::Redraw => self.renderer.mark_dirty(),
        }
    }

    /// Stage every request, then run a single render pass
    pub fn process_batch<I>(&mut self, requests: I) -> Result<bool, RenderError<P::Error>>
    where
        I: IntoIterator<Item = DisplayRequest>,
    {
        let mut count = 0usize;
        for request in requests {
            self.stage(request);
            count += 1;
        }

        debug!(" Processing {} display request(s)", count);
        self.renderer.render(&mut self.panel)
    }

    /// Process `first` together with everything already queued behind it
    pub fn process_pending(
        &mut self,
        first: DisplayRequest,
        receiver: &DisplayReceiver<'_>,
    ) -> Result<bool, RenderError<P::Error>> {
        let queued = iter::from_fn(|| receiver.try_receive().ok());
        self.process_batch(iter::once(first).chain(queued))
    }

    /// Run the display manager task
    ///
    /// This async function processes display requests from the channel
    /// and updates the display accordingly. It never returns.
    pub async fn run(&mut self, receiver: DisplayReceiver<'_>)
    where
        P::Error: Debug,
    {
        info!(" Display manager task started");

        loop {
            let request = receiver.receive().await;

            if let Err(e) = self.process_pending(request, &receiver) {
                error!(" Error processing request: {:?}", e);
            }
        }
    }

    pub fn renderer(&self) -> &QrRenderer {
        &self.renderer
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}

/// Helper to get a display request sender
pub fn get_display_sender() -> DisplaySender<'static> {
    DISPLAY_CHANNEL.sender()
}

/// Helper to get a display request receiver
pub fn get_display_receiver() -> DisplayReceiver<'static> {
    DISPLAY_CHANNEL.receiver()
}
