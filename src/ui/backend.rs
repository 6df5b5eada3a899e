//! Dispatch of preview and artifact requests.

use std::sync::mpsc::Sender;

use eframe::egui;

use super::state::AppEvent;
use crate::scheduler::FetchTicket;
use crate::service::PreviewService;
use crate::types::ApiParameters;

/// Where the frame loop sends its requests.
///
/// Implementations must not block. Results are delivered as [`AppEvent`]s on
/// `events`, followed by a repaint request on `ctx`.
pub trait GeometryBackend {
    /// Starts a preview fetch for `ticket`.
    fn fetch_preview(&self, ctx: &egui::Context, ticket: FetchTicket, events: Sender<AppEvent>);

    /// Starts an artifact request.
    fn generate_artifact(&self, ctx: &egui::Context, params: ApiParameters, events: Sender<AppEvent>);
}

/// Sends requests to the geometry service on the tokio runtime.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    service: PreviewService,
}

impl HttpBackend {
    /// Wraps a service client.
    pub fn new(service: PreviewService) -> Self {
        log::info!("Using geometry service at {}", service.base_url());
        Self { service }
    }
}

impl GeometryBackend for HttpBackend {
    fn fetch_preview(&self, ctx: &egui::Context, ticket: FetchTicket, events: Sender<AppEvent>) {
        let service = self.service.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let result = service.fetch_preview(&ticket.params).await;
            let _ = events.send(AppEvent::Preview {
                generation: ticket.generation,
                stage: ticket.stage,
                result,
            });
            ctx.request_repaint();
        });
    }

    fn generate_artifact(&self, ctx: &egui::Context, params: ApiParameters, events: Sender<AppEvent>) {
        let service = self.service.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let result = service.generate_artifact(&params).await;
            let _ = events.send(AppEvent::Generated(result));
            ctx.request_repaint();
        });
    }
}
