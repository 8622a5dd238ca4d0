//! CLI tool for running zone merging on a JSON board snapshot
//!
//! Usage:
//!   cargo run --release --bin zone_merge -- <board.json> [options]
//!
//! Options:
//!   --rules <rules.json>  Merge rules (defaults apply to missing fields)
//!   --net <code>          Merge only this net (default: every net)
//!   --zone <index>        Treat the zone at this board position as just edited
//!   --out <path>          Write the resulting board here
//!   --ledger <path>       Write the picked-items ledger here

use std::env;
use std::time::Instant;

use anyhow::{bail, Context};
use copper_zones::{
    combine_all_zones_in_net, on_area_polygon_modified, remove_degenerate_zones, Board,
    MergeRules, PickedItems,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <board.json> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --rules <rules.json>   Merge rules file");
        eprintln!("  --net <code>           Merge only this net");
        eprintln!("  --zone <index>         Run the edit hook for the zone at this position");
        eprintln!("  --out <path>           Write the resulting board");
        eprintln!("  --ledger <path>        Write deleted/created zones");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} board.json --out merged.json", args[0]);
        eprintln!("  {} board.json --zone 3 --ledger picked.json", args[0]);
        return Ok(());
    }

    let board_path = &args[1];

    let mut rules_path: Option<String> = None;
    let mut net_filter: Option<i32> = None;
    let mut zone_index: Option<usize> = None;
    let mut out_path: Option<String> = None;
    let mut ledger_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        let value = args.get(i + 1).cloned();
        match args[i].as_str() {
            "--rules" => rules_path = value,
            "--net" => {
                let text = value.context("--net needs a value")?;
                net_filter = Some(text.parse().with_context(|| format!("Bad net code '{}'", text))?);
            }
            "--zone" => {
                let text = value.context("--zone needs a value")?;
                zone_index = Some(text.parse().with_context(|| format!("Bad zone index '{}'", text))?);
            }
            "--out" => out_path = value,
            "--ledger" => ledger_path = value,
            other => bail!("Unknown option '{}'", other),
        }
        i += 2;
    }

    let rules = match &rules_path {
        Some(path) => MergeRules::load_json(path)?,
        None => MergeRules::default(),
    };

    let mut board = Board::load_json(board_path)?;
    let zones_before = board.zone_count();
    println!("Loaded {} zones on {} nets from {}", zones_before, board.nets().len(), board_path);

    let start = Instant::now();
    let mut picked = PickedItems::new();

    let changed = if let Some(index) = zone_index {
        let Some(id) = board.id_at(index) else {
            bail!("Zone index {} out of range (board has {} zones)", index, zones_before);
        };
        on_area_polygon_modified(&mut board, &mut picked, id, &rules)
    } else {
        let nets = match net_filter {
            Some(net) => vec![net],
            None => board.nets(),
        };
        let mut changed = false;
        for net in nets {
            changed |= combine_all_zones_in_net(&mut board, &mut picked, net, None);
        }
        changed |= remove_degenerate_zones(&mut board, &mut picked, rules.min_corner_count) > 0;
        changed
    };

    println!("\n=== Zone Merge Summary ===");
    println!("Changed: {}", changed);
    println!("Zones: {} -> {}", zones_before, board.zone_count());
    println!("Deleted: {}", picked.deleted_ids().count());
    println!("Created: {}", picked.new_ids().count());
    println!("Elapsed: {:.3}ms", start.elapsed().as_secs_f64() * 1000.0);

    if let Some(path) = out_path {
        board.save_json(&path)?;
        println!("Output: {}", path);
    }

    if let Some(path) = ledger_path {
        let text = serde_json::to_string_pretty(&picked)?;
        std::fs::write(&path, text).with_context(|| format!("Failed to write {}", path))?;
        println!("Ledger: {}", path);
    }

    Ok(())
}
