pub mod fine;
pub mod receipt;
pub mod ticket;
pub mod zone;

pub use fine::{Fine, FineStatus};
pub use receipt::{PaymentReceipt, ReceiptKind};
pub use ticket::{ParkingTicket, TicketStatus};
pub use zone::ParkingZone;
