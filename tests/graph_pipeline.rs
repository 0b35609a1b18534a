use chrono::{DateTime, Utc};

use cuff_log::graph::surface::{DrawCommand, DrawSurface, Insets, TextAnchor, Viewport};
use cuff_log::graph::{render, GraphStyle};
use cuff_log::sessions::{Reading, Session};

/// A surface that just keeps the commands it was asked to execute.
struct RecordingSurface {
    viewport: Viewport,
    executed: Vec<DrawCommand>,
}

impl RecordingSurface {
    fn new() -> Self {
        Self {
            viewport: Viewport::new(
                800.0,
                400.0,
                2.0,
                Insets {
                    top: 20.0,
                    right: 15.0,
                    bottom: 40.0,
                    left: 40.0,
                },
            ),
            executed: Vec::new(),
        }
    }
}

impl DrawSurface for RecordingSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn run(&mut self, commands: &[DrawCommand]) {
        self.executed.extend_from_slice(commands);
    }
}

fn session(ts: &str, readings: Vec<(u16, u16, Option<u16>)>) -> Session {
    let date = ts.parse::<DateTime<Utc>>().expect("valid timestamp");
    let readings = readings
        .into_iter()
        .map(|(sys, dia, pulse)| Reading::new(sys, dia, pulse).expect("valid reading"))
        .collect();
    Session::new(readings, None, date).expect("valid session")
}

fn week_of_sessions() -> Vec<Session> {
    // Newest-first, like the persisted collection.
    vec![
        session("2026-08-07T08:10:00Z", vec![(141, 92, Some(74))]),
        session("2026-08-05T21:40:00Z", vec![(132, 85, Some(70)), (128, 83, None)]),
        session("2026-08-03T08:05:00Z", vec![(118, 76, None)]),
        session("2026-08-01T08:00:00Z", vec![(112, 72, Some(61))]),
    ]
}

#[test]
fn full_redraw_executes_against_a_surface() {
    let mut surface = RecordingSurface::new();
    let commands = render(
        &week_of_sessions(),
        &surface.viewport(),
        &GraphStyle::default(),
    )
    .expect("data present");

    surface.run(&commands);
    assert_eq!(surface.executed, commands);
    assert_eq!(surface.executed.first(), Some(&DrawCommand::Clear));
}

#[test]
fn empty_collection_is_a_no_data_state() {
    let surface = RecordingSurface::new();
    assert!(render(&[], &surface.viewport(), &GraphStyle::default()).is_none());
}

#[test]
fn boundaries_and_bands_are_all_present_for_typical_data() {
    let surface = RecordingSurface::new();
    let commands = render(
        &week_of_sessions(),
        &surface.viewport(),
        &GraphStyle::default(),
    )
    .unwrap();

    let bands = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
        .count();
    let dashed = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::StrokePath { dash: Some(_), .. }))
        .count();
    assert_eq!(bands, 4);
    assert_eq!(dashed, 3);
}

#[test]
fn date_labels_are_thinned_to_the_style_cap() {
    let mut sessions = Vec::new();
    for day in 1..=20 {
        sessions.push(session(
            &format!("2026-07-{day:02}T09:00:00Z"),
            vec![(120, 80, Some(65))],
        ));
    }
    sessions.reverse();

    let surface = RecordingSurface::new();
    let style = GraphStyle::default();
    let commands = render(&sessions, &surface.viewport(), &style).unwrap();

    let date_labels = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillText { anchor: TextAnchor::Center, .. }))
        .count();
    assert_eq!(date_labels, style.max_x_labels);
}

#[test]
fn sparse_pulse_never_produces_a_solid_pulse_segment_across_the_gap() {
    // Pulse defined on the outer two sessions only: the line must have
    // exactly one segment joining them, skipping the middle.
    let sessions = vec![
        session("2026-08-05T10:00:00Z", vec![(132, 85, Some(70))]),
        session("2026-08-03T10:00:00Z", vec![(125, 80, None)]),
        session("2026-08-01T10:00:00Z", vec![(118, 76, Some(64))]),
    ];
    let surface = RecordingSurface::new();
    let style = GraphStyle::default();
    let commands = render(&sessions, &surface.viewport(), &style).unwrap();

    let pulse_lines: Vec<&Vec<(f64, f64)>> = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::StrokePath {
                points,
                shade,
                dash: None,
                ..
            } if *shade == style.pulse.shade => Some(points),
            _ => None,
        })
        .collect();
    assert_eq!(pulse_lines.len(), 1);
    assert_eq!(pulse_lines[0].len(), 2);

    let pulse_markers = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillCircle { shade, .. } if *shade == style.pulse.shade))
        .count();
    assert_eq!(pulse_markers, 2);
}

#[test]
fn series_draw_in_fixed_order_with_pulse_on_top() {
    let surface = RecordingSurface::new();
    let style = GraphStyle::default();
    let commands = render(
        &week_of_sessions(),
        &surface.viewport(),
        &style,
    )
    .unwrap();

    let order: Vec<_> = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::StrokePath {
                shade, dash: None, ..
            } if *shade == style.systolic.shade
                || *shade == style.diastolic.shade
                || *shade == style.pulse.shade =>
            {
                Some(*shade)
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        order,
        vec![style.systolic.shade, style.diastolic.shade, style.pulse.shade]
    );
}

#[test]
fn resize_re_render_matches_for_identical_input() {
    let sessions = week_of_sessions();
    let viewport = RecordingSurface::new().viewport();
    let style = GraphStyle::default();
    let before = render(&sessions, &viewport, &style);
    let after = render(&sessions, &viewport, &style);
    assert_eq!(before, after);
}
