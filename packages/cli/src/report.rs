//! Report emission: the dated CSV on disk and the email that carries it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use resend::{models::EmailMessage, ResendClient};
use screening::types::ReportRow;
use screening::RunOutcome;

use crate::settings::Settings;

const EMAIL_SUBJECT: &str = "Job Parse Results";

pub fn report_filename(started_at: DateTime<Utc>) -> String {
    format!("{}_result.csv", started_at.format("%Y%m%d_%H%M"))
}

/// Write the run's rows to a dated CSV under the results directory.
pub fn write_report(
    rows: &[ReportRow],
    results_dir: &Path,
    started_at: DateTime<Utc>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(results_dir)
        .with_context(|| format!("creating {}", results_dir.display()))?;

    let path = results_dir.join(report_filename(started_at));
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(path)
}

pub fn email_body(outcome: &RunOutcome) -> String {
    let mut body = format!(
        "Run started {}.\n\n\
         Cards extracted: {}\n\
         Newly adjudicated: {}\n\
         Fit: {}\n\
         Estimated model spend: ${:.4}\n",
        outcome.started_at.format("%Y-%m-%d %H:%M UTC"),
        outcome.cards_extracted,
        outcome.decided,
        outcome.passed,
        outcome.estimated_cost,
    );
    if outcome.degraded {
        body.push_str("\nNote: the result list never stabilized; the card set may be partial.\n");
    }
    body.push_str("\nFull details attached.\n");
    body
}

/// Email the CSV to the configured recipient.
pub async fn send_report(
    mailer: &ResendClient,
    settings: &Settings,
    outcome: &RunOutcome,
    csv_path: &Path,
) -> Result<String> {
    let bytes =
        std::fs::read(csv_path).with_context(|| format!("reading {}", csv_path.display()))?;
    let filename = csv_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("result.csv");

    let message = EmailMessage::new(
        &settings.sender_email,
        &settings.recipient_email,
        EMAIL_SUBJECT,
        email_body(outcome),
    )
    .with_attachment(filename, &bytes);

    mailer.send(&message).await.context("sending report email")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use screening::types::{CardProfile, JobCard};

    fn outcome(rows: Vec<ReportRow>) -> RunOutcome {
        RunOutcome {
            rows,
            passed: 1,
            decided: 3,
            cards_extracted: 5,
            degraded: false,
            estimated_cost: 0.0123,
            started_at: Utc.with_ymd_and_hms(2026, 8, 30, 14, 5, 0).unwrap(),
        }
    }

    fn sample_row() -> ReportRow {
        let card = JobCard::new("42", "Data Scientist", "Acme", "https://x/42");
        let profile = CardProfile {
            title: "Data Scientist".into(),
            employer: Some("Acme".into()),
            location: Some("Boston, MA".into()),
            salary: None,
            work_mode: None,
        };
        ReportRow::passed(&card, &profile, &["Python".into()], Utc::now())
    }

    #[test]
    fn filename_is_dated() {
        let at = Utc.with_ymd_and_hms(2026, 8, 30, 14, 5, 0).unwrap();
        assert_eq!(report_filename(at), "20260830_1405_result.csv");
    }

    #[test]
    fn csv_carries_expected_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2026, 8, 30, 14, 5, 0).unwrap();
        let path = write_report(&[sample_row()], dir.path(), at).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "addDate,jobId,employerName,positionTitle,location,salary,remote,skills,descriptionURL,isFit,reason"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("Data Scientist"));
        assert!(row.contains("yes"));
    }

    #[test]
    fn body_summarizes_the_run() {
        let body = email_body(&outcome(vec![sample_row()]));
        assert!(body.contains("Cards extracted: 5"));
        assert!(body.contains("Fit: 1"));
        assert!(body.contains("$0.0123"));
        assert!(!body.contains("never stabilized"));

        let mut degraded = outcome(vec![]);
        degraded.degraded = true;
        assert!(email_body(&degraded).contains("never stabilized"));
    }
}
