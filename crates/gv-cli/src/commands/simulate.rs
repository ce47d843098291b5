use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use gv_core::PropertyStore;
use gv_core::host::FALL_DISTANCE_PROPERTY;
use gv_simulation::{JumpEnd, JumpPhase, SimEventKind};

use super::scenario::{self, Prepared};

pub fn run(path: &Path, ticks: u64, verbose: bool) -> Result<(), String> {
    let fallback = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scenario".to_string());
    let Prepared {
        title,
        mut sim,
        actors,
        hits,
    } = scenario::load(path)?.prepare(&fallback)?;

    if actors.is_empty() {
        println!("  No entities in scenario. Nothing to simulate.");
        return Ok(());
    }

    for tick in 1..=ticks {
        for actor in &actors {
            if let Some(record) = sim.host_mut().get_mut(actor.id) {
                record.flags.jumping = actor.jump_at.contains(&tick);
            }
        }
        sim.tick();
        for (_, hit) in hits.iter().filter(|(at, _)| *at == tick) {
            sim.handle_hit(*hit);
        }
        sim.host_mut().step();
    }

    // Header
    let summary = format!(
        "({ticks} ticks = {:.1}s, standard gravity {})",
        sim.clock().elapsed_seconds(),
        sim.config().standard_gravity
    );
    println!("  {} '{title}' {}", "Simulation".bold(), summary.dimmed());
    println!(
        "  {} entities simulated, {} events logged",
        actors.len(),
        sim.events().len()
    );
    println!();

    // Events
    if verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let tick_label = format!("[tick {:>3}]", event.tick).dimmed();
            let name = actors
                .iter()
                .find(|a| event.kind.involves(a.id))
                .map_or("?", |a| a.name.as_str());
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {name}: {desc}");
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let notable: Vec<_> = sim
            .events()
            .events()
            .iter()
            .filter(|e| is_notable(&e.kind))
            .collect();

        if !notable.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in notable {
                let name = actors
                    .iter()
                    .find(|a| event.kind.involves(a.id))
                    .map_or("?", |a| a.name.as_str());
                println!("  {} {name}: {}", label(&event.kind), event.description);
            }
            println!();
        }
    }

    // Entity table
    println!("  {}", "Entity Status".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Entity",
        "Kind",
        "Position",
        "Gravity",
        "Fall velocity",
        "Fall distance",
        "Jump",
        "Health",
    ]);

    for actor in &actors {
        let Some(record) = sim.host().get(actor.id) else {
            table.add_row(vec![
                actor.name.clone(),
                "--".to_string(),
                "despawned".to_string(),
            ]);
            continue;
        };
        let state = sim.gravity_system().state(actor.id);
        let fall_distance = sim
            .host()
            .property(actor.id, FALL_DISTANCE_PROPERTY)
            .unwrap_or(0.0);
        let loc = record.location;
        table.add_row(vec![
            actor.name.clone(),
            record.kind.to_string(),
            format!("{:.2}, {:.2}, {:.2}", loc.x, loc.y, loc.z),
            format!("{:.2}", sim.gravity(actor.id)),
            state.map_or_else(|| "--".to_string(), |s| format!("{:.3}", s.fall_velocity)),
            format!("{fall_distance:.2}"),
            state.map_or_else(|| "--".to_string(), |s| jump_phase(s.jump)),
            format!("{:.1}", record.health),
        ]);
    }

    println!("{table}");
    println!();

    Ok(())
}

fn jump_phase(phase: JumpPhase) -> String {
    match phase {
        JumpPhase::Idle => "idle".to_string(),
        JumpPhase::Armed => "armed".to_string(),
        JumpPhase::Running { step, .. } => format!("step {step}"),
    }
}

fn is_notable(kind: &SimEventKind) -> bool {
    !matches!(
        kind,
        SimEventKind::GravityChanged { .. }
            | SimEventKind::JumpEnded {
                reason: JumpEnd::Completed | JumpEnd::Cancelled,
                ..
            }
    )
}

fn label(kind: &SimEventKind) -> colored::ColoredString {
    match kind {
        SimEventKind::MaceStrike { .. } => " HIT".red().bold(),
        SimEventKind::EffectFailed { .. } => "WARN".yellow().bold(),
        SimEventKind::Bounced { .. } => "BNCE".green().bold(),
        SimEventKind::Landed { .. } => "LAND".cyan().bold(),
        SimEventKind::JumpStarted { .. } | SimEventKind::JumpEnded { .. } => "JUMP".blue().bold(),
        SimEventKind::GravityChanged { .. } => "GRAV".normal(),
    }
}

fn colorize_event(kind: &SimEventKind, desc: &str) -> String {
    match kind {
        SimEventKind::MaceStrike { .. } => desc.red().bold().to_string(),
        SimEventKind::EffectFailed { .. } => desc.yellow().to_string(),
        SimEventKind::Bounced { .. } => desc.green().to_string(),
        SimEventKind::Landed { .. } => desc.cyan().to_string(),
        SimEventKind::JumpStarted { .. } | SimEventKind::JumpEnded { .. } => {
            desc.blue().to_string()
        }
        SimEventKind::GravityChanged { .. } => desc.dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_events_are_not_notable() {
        let entity = gv_core::EntityId::new();
        assert!(!is_notable(&SimEventKind::JumpEnded {
            entity,
            reason: JumpEnd::Completed,
        }));
        assert!(is_notable(&SimEventKind::JumpEnded {
            entity,
            reason: JumpEnd::ObstructedAbove,
        }));
        assert!(is_notable(&SimEventKind::Landed {
            entity,
            fall_distance: 3.0,
        }));
    }

    #[test]
    fn jump_phase_labels() {
        assert_eq!(jump_phase(JumpPhase::Armed), "armed");
        assert_eq!(jump_phase(JumpPhase::Idle), "idle");
    }
}
