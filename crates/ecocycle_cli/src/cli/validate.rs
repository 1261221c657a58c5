use anyhow::{Result, bail};

pub const TIP_NEGATIVE_COORDS: &str =
    "Note: southern latitudes are negative, e.g.:\n  route --lat=-15.786 --lng=35.005 --seller 3";

pub fn validate_origin(lat: f64, lng: f64) -> Result<()> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        bail!("--lat must be within [-90, 90], got {lat}\n\n{TIP_NEGATIVE_COORDS}");
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        bail!("--lng must be within [-180, 180], got {lng}");
    }
    Ok(())
}

pub fn validate_seller_ids(ids: &[i64]) -> Result<()> {
    if ids.is_empty() {
        bail!("Select at least one seller with --seller <ID>");
    }
    if let Some(bad) = ids.iter().find(|id| **id <= 0) {
        bail!("Invalid seller id: {bad} (must be > 0)");
    }
    Ok(())
}

pub fn validate_cost_per_km(cost: f64) -> Result<()> {
    if !cost.is_finite() || cost < 0.0 {
        bail!("--cost-per-km must be a non-negative number, got {cost}");
    }
    Ok(())
}

pub fn validate_limit(limit: usize, ctx: &str) -> Result<()> {
    if limit == 0 {
        bail!("Invalid limit for {ctx}: {limit} (must be > 0)");
    }
    Ok(())
}
