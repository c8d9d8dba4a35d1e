use std::fs::File;
use std::io::{self, Write};

use crate::assign::{Channel, HardwareKind};
use crate::refresh::{BoardState, SyncStatus};
use crate::settings::AppSettings;

/// Channels whose slot falls inside the inclusive `range`
pub fn visible(channels: &[Channel], range: (u32, u32)) -> Vec<&Channel> {
    channels
        .iter()
        .filter(|c| c.slot >= range.0 && c.slot <= range.1)
        .collect()
}

/// One line per channel, e.g. `02 Vocal 2  Jane Doe (Lead Vocal)`
pub fn format_channel(channel: &Channel, settings: &AppSettings) -> String {
    let mut line = format!("{:02} {:<12}", channel.slot, channel.label);

    match &channel.assigned_to {
        Some(name) => {
            line.push_str(&format!(" {}", name));
            if let Some(role) = &channel.role {
                line.push_str(&format!(" ({})", role));
            }
        }
        None => line.push_str(" [SPARE]"),
    }

    if settings.show_tech_details {
        line.push_str(&format!("  {}  {}", channel.frequency, channel.gain));
    }
    if settings.show_battery {
        line.push_str(&format!("  {}%", channel.battery));
    }
    line
}

fn status_line(status: &SyncStatus) -> String {
    match status {
        SyncStatus::Pending => "Syncing...".to_string(),
        SyncStatus::SetupRequired => "Configuration required".to_string(),
        SyncStatus::Online => "Online".to_string(),
        SyncStatus::Offline(reason) => reason.clone(),
    }
}

/// Writes the board as plain text, honoring the visible ranges
pub fn write_board<W: Write>(out: &mut W, board: &BoardState, settings: &AppSettings) -> io::Result<()> {
    match &board.plan {
        Some(plan) => writeln!(out, "** {} · {} · {} **", plan.title, plan.series, plan.date)?,
        None => writeln!(out, "** Standby **")?,
    }
    writeln!(
        out,
        "{} · updated {}",
        status_line(&board.status),
        board.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    for (kind, heading) in [(HardwareKind::Mic, "Wireless"), (HardwareKind::Monitor, "IEM Packs")] {
        let channels = visible(board.assignments.channels(kind), settings.visible_range(kind));
        if channels.is_empty() {
            continue;
        }
        writeln!(out, "\n=== {} ===", heading)?;
        for channel in channels {
            writeln!(out, "  {}", format_channel(channel, settings))?;
        }
    }
    Ok(())
}

pub fn print_board(board: &BoardState, settings: &AppSettings) -> io::Result<()> {
    let stdout = io::stdout();
    write_board(&mut stdout.lock(), board, settings)
}

pub fn write_board_to_file(path: &str, board: &BoardState, settings: &AppSettings) -> io::Result<()> {
    let mut file = File::create(path)?;
    write_board(&mut file, board, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::resolve;
    use chrono::Utc;
    use rand::rngs::mock::StepRng;

    fn board(settings: &AppSettings) -> BoardState {
        BoardState {
            plan: None,
            assignments: resolve(None, settings, &mut StepRng::new(0, 1)),
            status: SyncStatus::Offline("PCO Offline".to_string()),
            last_updated: Utc::now(),
            generation: 1,
        }
    }

    #[test]
    fn visible_keeps_the_inclusive_range() {
        let settings = AppSettings::default();
        let board = board(&settings);
        let slots: Vec<u32> = visible(&board.assignments.mics, (3, 5)).iter().map(|c| c.slot).collect();
        assert_eq!(slots, vec![3, 4, 5]);
        assert!(visible(&board.assignments.mics, (9, 12)).is_empty());
    }

    #[test]
    fn spare_channels_are_marked() {
        let settings = AppSettings {
            show_battery: false,
            show_tech_details: false,
            ..AppSettings::default()
        };
        let board = board(&settings);
        assert_eq!(format_channel(&board.assignments.mics[0], &settings), "01 Vocal 1      [SPARE]");
    }

    #[test]
    fn board_text_lists_only_visible_kinds() {
        let settings = AppSettings {
            monitor_range: (20, 30),
            ..AppSettings::default()
        };
        let mut out = Vec::new();
        write_board(&mut out, &board(&settings), &settings).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("** Standby **\nPCO Offline"));
        assert!(text.contains("=== Wireless ==="));
        assert!(text.contains("591.425 MHz"));
        assert!(!text.contains("=== IEM Packs ==="));
    }
}
