//! Presentation port trait.

use crate::domain::error::PricedashError;
use crate::domain::session::DashboardView;

/// Sink for one recomputed dashboard.
pub trait ViewPort {
    fn show(&self, view: &DashboardView) -> Result<(), PricedashError>;
}
