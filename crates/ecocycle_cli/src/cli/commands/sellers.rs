use anyhow::Result;
use ecocycle_core::db::queries::listings;
use ecocycle_core::routing::filter::SellerFilter;
use rusqlite::Connection;

use crate::cli::color::Colors;
use crate::ui::{Style, info, warning};
use crate::utils::formatting::truncate_ellipsis;

pub fn run(con: &Connection, material: Option<&str>, volume: Option<&str>) -> Result<()> {
    let filter = SellerFilter::parse(material, volume)?;
    let sellers = filter.apply(listings::list_sellers(con)?);

    if sellers.is_empty() {
        warning("No sellers match the selected filters.");
        return Ok(());
    }

    let c = Colors::new(&Style::default());

    info(format!("{} seller(s):", sellers.len()));
    println!();
    println!(
        "{:>5}  {:<20} {:<12} {:<14} {:>10}  {:<7} Materials",
        "ID", "Name", "Contact", "City", "Qty", "Volume"
    );

    for s in &sellers {
        let city = s.city.as_deref().unwrap_or("-");
        let position = match s.location {
            Some(_) => String::new(),
            None => c.dim(" (no position)"),
        };

        println!(
            "{:>5}  {:<20} {:<12} {:<14} {:>10.1}  {} {}{}",
            s.id,
            truncate_ellipsis(&s.name, 20),
            truncate_ellipsis(&s.contact, 12),
            truncate_ellipsis(city, 14),
            s.total_quantity,
            c.volume(s.volume, 7),
            s.items.join(", "),
            position
        );
    }

    Ok(())
}
