use ecocycle_core::model::Seller;
use ecocycle_core::routing::geo::Coordinate;
use ecocycle_core::routing::sequencer::RoutePlan;
use serde::Serialize;

/// JSON document written by `route --json`.
#[derive(Debug, Serialize)]
pub struct RouteExport {
    pub generated_at: String,
    pub origin: Coordinate,
    pub cost_per_km: f64,
    pub stops: Vec<ExportStop>,
    /// Requested ids that had no active listing or no known position.
    pub skipped: Vec<i64>,
    pub plan: RoutePlan,
}

#[derive(Debug, Serialize)]
pub struct ExportStop {
    pub order: usize,
    pub seller_id: i64,
    pub name: String,
    pub contact: String,
    pub location: Coordinate,
    pub items: Vec<String>,
    pub leg_km: f64,
}

impl ExportStop {
    pub fn new(order: usize, seller: &Seller, location: Coordinate, leg_km: f64) -> Self {
        Self {
            order,
            seller_id: seller.id,
            name: seller.name.clone(),
            contact: seller.contact.clone(),
            location,
            items: seller.items.clone(),
            leg_km,
        }
    }
}
