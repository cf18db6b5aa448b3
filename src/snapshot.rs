//! Read model handed to the presentation layer after every tick and command.

use serde::Serialize;

use crate::classroom::Classroom;
use crate::models::{Group, GroupStatus};
use crate::timer::{Phase, PhaseInfo, FINISH_SECS};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    /// 1-based position in the batch.
    pub position: usize,
    pub id: String,
    pub name: String,
    pub status: GroupStatus,
    pub status_label: String,
    pub recorded_duration: Option<u64>,
    pub displayed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayedGroup {
    pub id: String,
    pub name: String,
    pub review: bool,
    pub recorded_duration: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    pub can_toggle: bool,
    pub can_start: bool,
    pub can_pause: bool,
    pub can_reset: bool,
    pub can_skip: bool,
    pub can_shuffle: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum AssessmentPrompt {
    Hidden,
    NeedsLink,
    Open { link: String },
}

impl AssessmentPrompt {
    pub fn for_phase(phase: Phase, form_link: Option<&str>) -> Self {
        if !phase.shows_assessment_link() {
            return AssessmentPrompt::Hidden;
        }
        match form_link {
            Some(link) => AssessmentPrompt::Open {
                link: link.to_string(),
            },
            None => AssessmentPrompt::NeedsLink,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomSnapshot {
    pub batch_index: usize,
    pub batches: Vec<String>,
    pub groups: Vec<GroupView>,
    pub displayed: Option<DisplayedGroup>,
    pub nominal_seconds: u64,
    pub actual_elapsed_seconds: u64,
    pub clock: String,
    pub phase: Phase,
    pub phase_info: PhaseInfo,
    pub phase_remaining_secs: u64,
    pub progress: f64,
    pub running: bool,
    pub primary_action: &'static str,
    pub controls: Controls,
    pub assessment: AssessmentPrompt,
}

impl ClassroomSnapshot {
    pub fn capture(room: &Classroom, form_link: Option<&str>) -> Self {
        let registry = room.registry();
        let running = room.is_running();
        let nominal = room.nominal_seconds();
        let phase = room.phase();
        let displayed = room.displayed_group();
        let has_timer = room.timer().is_some();
        let reviewing = room.review_group().is_some();

        let groups = registry
            .groups()
            .iter()
            .enumerate()
            .map(|(index, group)| GroupView {
                position: index + 1,
                id: group.id.clone(),
                name: group.name.clone(),
                status: group.status,
                status_label: status_label(group, running),
                recorded_duration: group.recorded_duration,
                displayed: displayed.is_some_and(|d| d.id == group.id),
            })
            .collect();

        let primary_action = if running {
            "Pause"
        } else if nominal > 0 && has_timer {
            "Resume"
        } else {
            "Start Timer"
        };

        let controls = Controls {
            can_toggle: !reviewing && (has_timer || registry.first_pending().is_some()),
            can_start: has_timer && !running,
            can_pause: running,
            can_reset: has_timer,
            can_skip: has_timer,
            can_shuffle: registry.active_group().is_none(),
        };

        Self {
            batch_index: registry.selected_index(),
            batches: registry
                .batches()
                .iter()
                .map(|b| b.label().to_string())
                .collect(),
            groups,
            displayed: displayed.map(|group| DisplayedGroup {
                id: group.id.clone(),
                name: group.name.clone(),
                review: group.is_completed(),
                recorded_duration: group.recorded_duration,
            }),
            nominal_seconds: nominal,
            actual_elapsed_seconds: room.actual_elapsed_seconds(),
            clock: format_clock(nominal),
            phase,
            phase_info: phase.info(),
            phase_remaining_secs: phase.end_secs().saturating_sub(nominal),
            progress: (nominal as f64 / FINISH_SECS as f64).min(1.0),
            running,
            primary_action,
            controls,
            assessment: AssessmentPrompt::for_phase(phase, form_link),
        }
    }
}

fn status_label(group: &Group, running: bool) -> String {
    match (group.status, running) {
        (GroupStatus::Active, true) => "Presenting Now".to_string(),
        (GroupStatus::Active, false) => "Ready".to_string(),
        (status, _) => status.as_str().to_string(),
    }
}

/// Formats seconds as `mm:ss`.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_batches;

    #[test]
    fn format_clock_pads_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(840), "14:00");
    }

    #[test]
    fn assessment_prompt_follows_phase_and_link() {
        assert_eq!(
            AssessmentPrompt::for_phase(Phase::QAndA, Some("https://x")),
            AssessmentPrompt::Hidden
        );
        assert_eq!(
            AssessmentPrompt::for_phase(Phase::Assessment, None),
            AssessmentPrompt::NeedsLink
        );
        assert_eq!(
            AssessmentPrompt::for_phase(Phase::Finished, Some("https://x")),
            AssessmentPrompt::Open {
                link: "https://x".into()
            }
        );
    }

    #[test]
    fn idle_snapshot_offers_only_toggle_and_shuffle() {
        let room = Classroom::new(default_batches());
        let snap = ClassroomSnapshot::capture(&room, None);
        assert!(snap.displayed.is_none());
        assert_eq!(snap.clock, "00:00");
        assert_eq!(snap.primary_action, "Start Timer");
        assert_eq!(
            snap.controls,
            Controls {
                can_toggle: true,
                can_shuffle: true,
                ..Controls::default()
            }
        );
        assert_eq!(snap.groups.len(), 10);
        assert_eq!(snap.groups[0].position, 1);
        assert_eq!(snap.batches[1], "Week 2 (Gr 11-20)");
    }

    #[test]
    fn running_snapshot_reports_labels_and_remaining_time() {
        let mut room = Classroom::new(default_batches());
        room.select_group("b1-g1").unwrap();
        room.start().unwrap();
        for _ in 0..90 {
            room.tick();
        }

        let snap = ClassroomSnapshot::capture(&room, Some("https://forms"));
        assert_eq!(snap.clock, "01:30");
        assert_eq!(snap.phase_remaining_secs, 390);
        assert_eq!(snap.groups[0].status_label, "Presenting Now");
        assert!(snap.groups[0].displayed);
        assert_eq!(snap.primary_action, "Pause");
        assert!(!snap.controls.can_shuffle);
        assert_eq!(snap.assessment, AssessmentPrompt::Hidden);

        room.pause().unwrap();
        let snap = ClassroomSnapshot::capture(&room, None);
        assert_eq!(snap.groups[0].status_label, "Ready");
        assert_eq!(snap.primary_action, "Resume");
    }

    #[test]
    fn review_snapshot_shows_terminal_clock_and_link() {
        let mut room = Classroom::new(default_batches());
        room.select_group("b1-g1").unwrap();
        room.start().unwrap();
        for _ in 0..5 {
            room.tick();
        }
        room.skip_to_next_phase().unwrap();
        room.skip_to_next_phase().unwrap();
        room.skip_to_next_phase().unwrap();

        let snap = ClassroomSnapshot::capture(&room, Some("https://forms"));
        let shown = snap.displayed.unwrap();
        assert!(shown.review);
        assert_eq!(shown.recorded_duration, Some(5));
        assert_eq!(snap.clock, "14:00");
        assert_eq!(snap.progress, 1.0);
        assert!(!snap.controls.can_start);
        assert!(!snap.controls.can_reset);
        assert!(!snap.controls.can_toggle);
        assert_eq!(
            snap.assessment,
            AssessmentPrompt::Open {
                link: "https://forms".into()
            }
        );
    }
}
