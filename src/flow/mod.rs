pub mod amount;
pub mod controller;
pub mod preview;
pub mod state;

pub use amount::DonationAmount;
pub use controller::{FlowController, RESET_DELAY};
pub use preview::{Preview, compute_preview};
pub use state::Stage;
