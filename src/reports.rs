use crate::calc::round_off_1_decimal;
use crate::model::{Group, Scores, Student, StudentId, SUBJECTS};
use crate::session::Session;
use anyhow::Context;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapRow {
    pub no: usize,
    pub student_id: Option<StudentId>,
    pub name: String,
    pub group: String,
    pub scores: Scores,
    pub total: f64,
    pub average: f64,
    pub graded: bool,
    pub examiner: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapModel {
    pub examiner_name: String,
    pub exam_date: String,
    pub group: Option<Group>,
    pub rows: Vec<RecapRow>,
}

pub fn recap_model(session: &Session, students: &[Student], group: Option<Group>) -> RecapModel {
    let rows = students
        .iter()
        .filter(|s| group.map_or(true, |g| s.group == Some(g)))
        .enumerate()
        .map(|(i, s)| {
            let total = s.scores.total();
            RecapRow {
                no: i + 1,
                student_id: s.id.clone(),
                name: s.name.clone(),
                group: s.group_label(),
                scores: s.scores.clone(),
                total,
                average: round_off_1_decimal(total / SUBJECTS.len() as f64),
                graded: s.is_graded(),
                examiner: s.examiner.clone(),
            }
        })
        .collect();

    RecapModel {
        examiner_name: session.examiner_name.clone(),
        exam_date: session.exam_date.clone(),
        group,
        rows,
    }
}

/// Writes one CSV line per row. Returns the number of data rows.
pub fn write_recap_csv(model: &RecapModel, out_path: &Path) -> anyhow::Result<usize> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
        }
    }

    let mut w = csv::Writer::from_path(out_path)
        .with_context(|| format!("failed to create {}", out_path.to_string_lossy()))?;

    let mut header: Vec<String> = vec!["No".into(), "Nama".into(), "Kelompok".into()];
    header.extend(SUBJECTS.iter().map(|s| s.label().to_string()));
    header.extend(["Jumlah".into(), "Rata-rata".into(), "Penguji".into()]);
    w.write_record(&header).context("failed to write csv header")?;

    for row in &model.rows {
        let mut record: Vec<String> = vec![
            row.no.to_string(),
            row.name.clone(),
            row.group.clone(),
        ];
        record.extend(SUBJECTS.iter().map(|s| format_number(row.scores.get(*s))));
        record.push(format_number(row.total));
        record.push(format!("{:.1}", row.average));
        record.push(row.examiner.clone().unwrap_or_default());
        w.write_record(&record)
            .with_context(|| format!("failed to write csv row for {}", row.name))?;
    }
    w.flush().context("failed to flush csv")?;
    Ok(model.rows.len())
}

fn format_number(v: f64) -> String {
    crate::model::Score(v).to_string()
}
