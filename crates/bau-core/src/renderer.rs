//! QR payload renderer
//!
//! [`QrRenderer`] is the caller-owned context that replaces the usual pair of
//! global buffers (payload text and QR widget). It formats a
//! [`BroadcastIdentity`] into a Broadcast Audio URI, re-encodes the QR view
//! and pushes the result to a [`Panel`].
//!
//! # Render contract
//!
//! [`update`](QrRenderer::update) renders synchronously on the caller's
//! context: it returns only after the changed pixels reached the panel.
//! Callers that want to coalesce several changes use
//! [`stage`](QrRenderer::stage) followed by one [`render`](QrRenderer::render).
//!
//! A failed update leaves both the committed payload and the on-screen code
//! untouched.

use embedded_graphics::prelude::*;
use log::{debug, error, info};

use crate::config::RendererConfig;
use crate::display::Panel;
use crate::error::{RenderError, StageError};
use crate::framebuffer::FrameBuffer;
use crate::identity::{BD_ADDR_LEN, BroadcastIdentity};
use crate::ui::{Drawable, QrCodeView};
use crate::uri::QrPayload;

pub struct QrRenderer {
    payload: QrPayload,
    view: QrCodeView,
    frame: FrameBuffer,
}

impl QrRenderer {
    /// Prepare the panel and show the placeholder code.
    ///
    /// Fails with [`RenderError::DeviceNotReady`] if the panel did not come
    /// up; the caller may retry later.
    pub fn initialize<P: Panel>(
        panel: &mut P,
        config: &RendererConfig,
    ) -> Result<Self, RenderError<P::Error>> {
        if !panel.is_ready() {
            error!("Display device not ready");
            return Err(RenderError::DeviceNotReady);
        }

        let screen = panel.bounding_box();
        let payload = QrPayload::from_text(&config.placeholder)?;

        let mut view = QrCodeView::new(config.qr_size_px, config.dark(), config.light());
        view.set_text(payload.as_str())?;
        view.center_in(screen);

        let mut renderer = Self {
            payload,
            view,
            frame: FrameBuffer::new(screen.size, config.background()),
        };

        renderer.render(panel)?;
        panel.set_blanking(false).map_err(RenderError::Display)?;

        info!(
            "QR renderer ready: {}px code on {}x{} panel",
            config.qr_size_px, screen.size.width, screen.size.height
        );
        Ok(renderer)
    }

    /// Show `identity` and render immediately.
    pub fn update<P: Panel>(
        &mut self,
        panel: &mut P,
        identity: &BroadcastIdentity,
    ) -> Result<(), RenderError<P::Error>> {
        self.stage(identity)?;
        self.render(panel)?;
        Ok(())
    }

    /// [`update`](Self::update) from unvalidated parts.
    pub fn update_raw<P: Panel>(
        &mut self,
        panel: &mut P,
        address: [u8; BD_ADDR_LEN],
        broadcast_id: u32,
        name: &[u8],
    ) -> Result<(), RenderError<P::Error>> {
        let identity = BroadcastIdentity::from_raw(address, broadcast_id, name)?;
        self.update(panel, &identity)
    }

    /// Format and encode `identity` without drawing.
    ///
    /// The payload is committed only once the QR matrix was built from it.
    pub fn stage(&mut self, identity: &BroadcastIdentity) -> Result<(), StageError> {
        let payload = QrPayload::format(identity)?;
        self.view.set_text(payload.as_str())?;
        self.payload = payload;

        debug!("Staged payload {}", self.payload.as_str());
        Ok(())
    }

    /// Draw pending changes and flush them to the panel.
    ///
    /// Returns whether any pixels were sent.
    pub fn render<P: Panel>(&mut self, panel: &mut P) -> Result<bool, RenderError<P::Error>> {
        if !self.is_dirty() {
            return Ok(false);
        }

        self.view
            .draw(&mut self.frame)
            .unwrap_or_else(|never| match never {});
        self.frame.flush(panel).map_err(RenderError::Display)
    }

    /// Force the next [`render`](Self::render) to resend the whole screen.
    pub fn mark_dirty(&mut self) {
        self.view.mark_dirty();
        self.frame.invalidate();
    }

    pub fn is_dirty(&self) -> bool {
        self.view.is_dirty() || self.frame.is_dirty()
    }

    /// Last successfully staged payload.
    pub fn payload(&self) -> &QrPayload {
        &self.payload
    }

    pub fn view(&self) -> &QrCodeView {
        &self.view
    }
}
