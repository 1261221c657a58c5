use anyhow::Result;
use ecocycle_core::db::queries::stats;
use rusqlite::Connection;

use crate::cli::color::Colors;
use crate::ui::{Style, warning};
use crate::utils::formatting::truncate_ellipsis;

pub fn run(con: &Connection, limit: usize) -> Result<()> {
    let board = stats::leaderboard(con)?;
    if board.is_empty() {
        warning("No users registered yet.");
        return Ok(());
    }

    let c = Colors::new(&Style::default());

    println!("{:<5} {:<24} {:>8} {:>7}", "Pos", "User", "Listings", "Points");
    for e in board.iter().take(limit) {
        println!(
            "{} {:<24} {:>8} {:>7}",
            c.position(e.position, 5),
            truncate_ellipsis(&e.user_name, 24),
            e.count,
            e.points
        );
    }

    if board.len() > limit {
        println!("{}", c.dim(format!("... {} more", board.len() - limit)));
    }

    Ok(())
}
