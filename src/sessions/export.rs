use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::Session;

/// Build the plain-text report of a session collection.
///
/// Sessions arrive newest-first (display order); numbering runs the other
/// way so the oldest session is "Session 1".
pub fn report(sessions: &[Session], use_12hr: bool) -> String {
    let mut text = String::from("Blood Pressure Reading History\n");
    text.push_str("================================\n\n");

    for (index, session) in sessions.iter().enumerate() {
        let date = session.date.with_timezone(&Local);
        let date_str = date.format("%a, %b %-d, %Y");
        let time_str = if use_12hr {
            date.format("%I:%M %p").to_string()
        } else {
            date.format("%H:%M").to_string()
        };

        let _ = writeln!(
            text,
            "Session {} - {} at {}",
            sessions.len() - index,
            date_str,
            time_str
        );
        let _ = writeln!(text, "{}", "-".repeat(50));
        let _ = writeln!(text, "Average: {}", session.average.display());
        let _ = writeln!(text, "Number of readings: {}\n", session.readings.len());

        text.push_str("Individual Readings:\n");
        for (idx, reading) in session.readings.iter().enumerate() {
            let _ = writeln!(text, "  {}. {}", idx + 1, reading.display());
        }

        if let Some(notes) = &session.notes {
            let _ = writeln!(text, "\nNotes: {notes}");
        }

        text.push_str("\n\n");
    }

    text
}

/// `bp-readings-<ISO-date>.txt` for the given day.
pub fn file_name(now: DateTime<Local>) -> String {
    format!("bp-readings-{}.txt", now.format("%Y-%m-%d"))
}

/// Write the report into `dir`, returning the path of the file produced.
pub fn write_report(
    sessions: &[Session],
    dir: &Path,
    use_12hr: bool,
    now: DateTime<Local>,
) -> io::Result<PathBuf> {
    let path = dir.join(file_name(now));
    fs::write(&path, report(sessions, use_12hr))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::Reading;
    use chrono::{TimeZone, Utc};

    fn sample_sessions() -> Vec<Session> {
        let newer = Session::new(
            vec![
                Reading::new(132, 85, Some(70)).unwrap(),
                Reading::new(128, 83, None).unwrap(),
            ],
            Some("evening".to_owned()),
            Utc.with_ymd_and_hms(2026, 8, 5, 18, 30, 0).unwrap(),
        )
        .unwrap();
        let older = Session::new(
            vec![Reading::new(118, 76, None).unwrap()],
            None,
            Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(),
        )
        .unwrap();
        // Newest-first display order.
        vec![newer, older]
    }

    #[test]
    fn numbering_runs_oldest_to_newest() {
        let text = report(&sample_sessions(), true);
        let first_header = text.lines().find(|l| l.starts_with("Session ")).unwrap();
        // The newest session is displayed first but numbered last.
        assert!(first_header.starts_with("Session 2"));
        assert!(text.contains("Session 1"));
    }

    #[test]
    fn every_reading_appears_with_its_ordinal() {
        let text = report(&sample_sessions(), true);
        assert!(text.contains("  1. 132/85 • 70 bpm"));
        assert!(text.contains("  2. 128/83"));
        assert!(text.contains("Number of readings: 2"));
    }

    #[test]
    fn average_line_skips_pulse_when_absent() {
        let text = report(&sample_sessions(), true);
        assert!(text.contains("Average: 130/84 • 70 bpm"));
        assert!(text.contains("Average: 118/76\n"));
    }

    #[test]
    fn notes_render_only_when_present() {
        let text = report(&sample_sessions(), true);
        assert_eq!(text.matches("Notes:").count(), 1);
        assert!(text.contains("Notes: evening"));
    }

    #[test]
    fn twenty_four_hour_clock_is_respected() {
        let text = report(&sample_sessions(), false);
        assert!(!text.contains("AM") && !text.contains("PM"));
    }

    #[test]
    fn file_name_embeds_the_iso_date() {
        let now = Local.with_ymd_and_hms(2026, 8, 8, 12, 0, 0).unwrap();
        assert_eq!(file_name(now), "bp-readings-2026-08-08.txt");
    }

    #[test]
    fn write_report_creates_the_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let now = Local::now();
        let path = write_report(&sample_sessions(), dir.path(), true, now).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), file_name(now));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("Blood Pressure Reading History"));
    }
}
