use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ecocycle_core::db::{now_utc, queries::listings};
use ecocycle_core::model::Seller;
use ecocycle_core::routing::geo::{Coordinate, haversine_km};
use ecocycle_core::routing::sequencer::{RoutePlan, SequenceOptions, SellerStop, plan_route};
use rusqlite::Connection;

use crate::cli::args::RouteArgs;
use crate::cli::color::Colors;
use crate::cli::export::{ExportStop, RouteExport};
use crate::ui::{Style, info, warning};
use crate::utils::formatting::{fmt_km, fmt_money, truncate_ellipsis};

pub fn run(con: &Connection, args: &RouteArgs) -> Result<()> {
    let origin = Coordinate::new(args.lat, args.lng);
    let sellers = listings::sellers_by_ids(con, &args.sellers)?;
    let stops: Vec<SellerStop> = sellers.iter().map(Seller::stop).collect();

    let plan = plan_route(
        Some(origin),
        &stops,
        SequenceOptions {
            cost_per_km: args.cost_per_km,
        },
    );

    let skipped = skipped_ids(&args.sellers, &plan);
    let visits = visits(&plan, &sellers);

    if args.json || args.file.is_some() {
        let export = RouteExport {
            generated_at: now_utc(),
            origin,
            cost_per_km: args.cost_per_km,
            stops: visits,
            skipped,
            plan,
        };
        return write_json(&export, args.file.as_deref());
    }

    print_plan(&plan, &visits, &skipped);
    Ok(())
}

/// Requested ids that did not make it into the plan, first occurrence only.
fn skipped_ids(requested: &[i64], plan: &RoutePlan) -> Vec<i64> {
    let mut out: Vec<i64> = Vec::new();
    for id in requested {
        if !plan.visit_order.contains(id) && !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

fn visits(plan: &RoutePlan, sellers: &[Seller]) -> Vec<ExportStop> {
    plan.visit_order
        .iter()
        .enumerate()
        .filter_map(|(i, id)| {
            let seller = sellers.iter().find(|s| s.id == *id)?;
            let from = plan.route[i];
            let to = plan.route[i + 1];
            Some(ExportStop::new(i + 1, seller, to, haversine_km(from, to)))
        })
        .collect()
}

fn print_plan(plan: &RoutePlan, visits: &[ExportStop], skipped: &[i64]) {
    let c = Colors::new(&Style::default());

    if !skipped.is_empty() {
        let ids: Vec<String> = skipped.iter().map(i64::to_string).collect();
        warning(format!(
            "Skipped (unknown, no active listing or no position yet): {}",
            ids.join(", ")
        ));
    }

    if plan.is_empty() {
        warning("Nothing to plan: none of the selected sellers has a known position.");
        return;
    }

    info(format!("Collection round over {} seller(s):", visits.len()));
    println!();
    println!(
        "{:>3}  {:>5}  {:<20} {:<12} {:>10}  {}",
        "#", "ID", "Name", "Contact", "Leg", "Position"
    );

    for v in visits {
        println!(
            "{:>3}  {:>5}  {:<20} {:<12} {:>10}  {}",
            v.order,
            v.seller_id,
            truncate_ellipsis(&v.name, 20),
            truncate_ellipsis(&v.contact, 12),
            fmt_km(v.leg_km),
            c.dim(format!("{:.5}, {:.5}", v.location.lat, v.location.lng))
        );
    }

    if let [.., last, home] = plan.route.as_slice() {
        println!(
            "{:>3}  {:>5}  {:<20} {:<12} {:>10}",
            "",
            "",
            "back to start",
            "",
            fmt_km(haversine_km(*last, *home))
        );
    }

    println!();
    println!("Total distance: {}", c.ok(fmt_km(plan.total_distance_km)));
    println!("Estimated cost: {}", c.ok(fmt_money(plan.estimated_cost)));
    println!(
        "{}",
        c.dim("Distances are straight-line (Haversine), not road distance.")
    );
}

fn write_json(export: &RouteExport, file: Option<&Path>) -> Result<()> {
    // JSON only, no colors
    let s = serde_json::to_string_pretty(export)?;

    match file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }

            let mut f = fs::File::create(path)
                .with_context(|| format!("Unable to create {}", path.display()))?;
            f.write_all(s.as_bytes())?;
            f.write_all(b"\n")?;

            // stdout stays clean for scripting
            eprintln!("JSON written to {}", path.display());
        }
        None => println!("{s}"),
    }

    Ok(())
}
