pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;

use axum::middleware::from_fn;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use config::Config;
use services::{
    CardGatewayClient, FineService, ParkingRepository, PlateReaderClient, TicketService,
    ZoneRateResolver,
};

#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub config: Config,
    pub repository: ParkingRepository,
    pub tickets: TicketService,
    pub fines: FineService,
    pub gateway: CardGatewayClient,
    pub plate_reader: PlateReaderClient,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret()).await?;
        client_options.app_name = Some("parking-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database.db_name);

        services::init_metrics();

        let repository = ParkingRepository::new(&db);
        repository.init_indexes().await?;

        let zones = ZoneRateResolver::new(repository.clone(), config.parking.default_rate);
        let tickets = TicketService::new(repository.clone(), zones, config.parking.clone());
        let fines = FineService::new(repository.clone());

        let gateway = CardGatewayClient::new(config.gateway.clone());
        if gateway.is_configured() {
            tracing::info!("Payment gateway client initialized");
        } else {
            tracing::warn!("Gateway credentials not configured - card payments will be rejected");
        }

        let plate_reader = PlateReaderClient::new(config.ocr.clone());
        if !plate_reader.is_configured() {
            tracing::warn!("OCR credentials not configured - plate recognition will be rejected");
        }

        let state = AppState {
            db,
            config: config.clone(),
            repository,
            tickets,
            fines,
            gateway,
            plate_reader,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/metrics", get(handlers::metrics))
            // Ticket lifecycle (owner app)
            .route(
                "/tickets",
                post(handlers::tickets::create_ticket).get(handlers::tickets::list_tickets),
            )
            .route("/tickets/:id", get(handlers::tickets::get_ticket))
            .route("/tickets/:id/extend", post(handlers::tickets::extend_ticket))
            .route("/tickets/:id/cancel", post(handlers::tickets::cancel_ticket))
            .route("/tickets/:id/pay", post(handlers::tickets::pay_ticket))
            .route(
                "/tickets/:id/convert-to-fine",
                post(handlers::tickets::convert_ticket_to_fine),
            )
            // Fines (inspector app + owner payment)
            .route(
                "/fines",
                post(handlers::fines::create_fine).get(handlers::fines::list_fines),
            )
            .route("/fines/outstanding", get(handlers::fines::get_outstanding_fine))
            .route("/fines/:id/pay", post(handlers::fines::pay_fine))
            // Payment history (owner app)
            .route("/receipts", get(handlers::receipts::list_receipts))
            // Plate recognition (scan screens)
            .route("/plates/recognize", post(handlers::plates::recognize_plate))
            // Zone administration (council console)
            .route(
                "/zones",
                post(handlers::zones::create_zone).get(handlers::zones::list_zones),
            )
            .route(
                "/zones/:id",
                put(handlers::zones::update_zone).delete(handlers::zones::delete_zone),
            )
            .layer(from_fn(metrics_middleware))
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get(service_core::middleware::REQUEST_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
            .with_state(state.clone());

        // Port 0 binds a random free port, which the integration tests rely on.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> &mongodb::Database {
        &self.state.db
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on port {}", self.port);
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
