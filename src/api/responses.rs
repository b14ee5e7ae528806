//! Console output rendering

use std::fmt::Write;

use crate::state::{CategoryGroup, HistoryEntry, Timer, TimerNotice, NoticeKind};

/// One timer card: id, name, status, time left and progress
pub fn render_timer(timer: &Timer) -> String {
    format!(
        "  [{}] {:<20} {:<9} {} {:>3.0}%",
        timer.id,
        timer.name,
        timer.status.to_string().to_uppercase(),
        timer.formatted_remaining(),
        timer.progress_percent(),
    )
}

/// Category headers with their timers when expanded
pub fn render_groups(groups: &[CategoryGroup<'_>]) -> String {
    if groups.is_empty() {
        return "No timers yet.".to_string();
    }

    let mut out = String::new();
    for group in groups {
        let marker = if group.expanded { "v" } else { ">" };
        let _ = writeln!(
            out,
            "{} {} ({} timers, {} running, {} done)",
            marker,
            group.category,
            group.timers.len(),
            group.running(),
            group.completed(),
        );
        if group.expanded {
            for timer in &group.timers {
                let _ = writeln!(out, "{}", render_timer(timer));
            }
        }
    }
    out.trim_end().to_string()
}

pub fn render_history(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return "No completed timers yet.".to_string();
    }
    history
        .iter()
        .map(|entry| {
            format!(
                "{}  completed at {}",
                entry.name,
                entry.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_notice(notice: &TimerNotice) -> String {
    match notice.kind {
        NoticeKind::Completed => format!("Timer completed: {} (ack to dismiss)", notice.name),
        NoticeKind::Halfway => format!("Halfway there: {}", notice.name),
    }
}
