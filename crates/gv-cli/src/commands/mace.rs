use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use gv_mechanics::MaceRule;

pub fn run(fall: f64) -> Result<(), String> {
    if !fall.is_finite() || fall < 0.0 {
        return Err(format!("fall distance must be a non-negative number, got {fall}"));
    }

    let rule = MaceRule::default();
    let shares = rule.breakdown(fall);
    let total: f64 = shares.iter().map(|s| s.damage).sum();

    println!(
        "  {} {} {}",
        "Mace bonus".bold(),
        format!("{total:.2}").green().bold(),
        format!("(fall {fall:.2} blocks, threshold {})", rule.threshold).dimmed()
    );

    if shares.is_empty() {
        println!("  {}", "Fall too short for bonus damage.".dimmed());
        return Ok(());
    }
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Tier", "Blocks", "Damage/block", "Damage"]);
    for (i, share) in shares.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            format!("{:.2}", share.blocks),
            share.damage_per_block.to_string(),
            format!("{:.2}", share.damage),
        ]);
    }
    println!("{table}");

    Ok(())
}
