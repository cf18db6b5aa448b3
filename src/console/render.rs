use crate::models::GroupStatus;
use crate::snapshot::{format_clock, AssessmentPrompt, ClassroomSnapshot};

/// One line per tick while a group is presenting.
pub fn status_line(snapshot: &ClassroomSnapshot) -> String {
    let name = snapshot
        .displayed
        .as_ref()
        .map(|d| d.name.as_str())
        .unwrap_or("-");
    format!(
        "[{}] {} | {} | {} left in phase",
        snapshot.clock,
        name,
        snapshot.phase_info.label,
        format_clock(snapshot.phase_remaining_secs)
    )
}

pub fn render(snapshot: &ClassroomSnapshot) -> String {
    let mut out = String::new();

    let tabs: Vec<String> = snapshot
        .batches
        .iter()
        .enumerate()
        .map(|(i, label)| {
            if i == snapshot.batch_index {
                format!("[{}] {}", i + 1, label)
            } else {
                format!(" {}  {}", i + 1, label)
            }
        })
        .collect();
    out.push_str(&tabs.join("   "));
    out.push('\n');

    for group in &snapshot.groups {
        let marker = match (group.displayed, group.status) {
            (true, _) => '>',
            (false, GroupStatus::Completed) => '✓',
            _ => ' ',
        };
        let duration = group
            .recorded_duration
            .map(|secs| format!(" ({})", format_clock(secs)))
            .unwrap_or_default();
        out.push_str(&format!(
            "{} {:>2}. {:<8} {:<20} {}{}\n",
            marker, group.position, group.id, group.name, group.status_label, duration
        ));
    }

    match &snapshot.displayed {
        Some(shown) => {
            out.push_str(&format!(
                "\n{}{}\n",
                shown.name,
                if shown.review { " (review)" } else { "" }
            ));
            out.push_str(&format!(
                "{}  {}: {}  [{}]\n",
                snapshot.clock,
                snapshot.phase_info.label,
                snapshot.phase_info.message,
                snapshot.primary_action
            ));
        }
        None => out.push_str("\nSelect a group to start\n"),
    }

    match &snapshot.assessment {
        AssessmentPrompt::Hidden => {}
        AssessmentPrompt::NeedsLink => {
            out.push_str("Set the peer assessment link with `link <url>`\n")
        }
        AssessmentPrompt::Open { link } => {
            out.push_str(&format!("Peer assessment: {}\n", link))
        }
    }

    out
}
