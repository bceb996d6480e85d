pub mod fines;
pub mod gateway;
pub mod metrics;
pub mod ocr;
pub mod pricing;
pub mod repository;
pub mod tickets;
pub mod zones;

pub use fines::{FineService, NewFine};
pub use gateway::{CardDetails, CardGatewayClient};
pub use metrics::{get_metrics, init_metrics};
pub use ocr::PlateReaderClient;
pub use repository::ParkingRepository;
pub use tickets::TicketService;
pub use zones::ZoneRateResolver;
