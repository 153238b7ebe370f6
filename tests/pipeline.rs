use std::fs;

use cardio_prep::app::{run, RunConfig};
use cardio_prep::ingest::IngestOptions;
use cardio_prep::{validate_and_enrich, Limits, PrepError, Rule};

const RAW: &str = "\
id;age;gender;height;weight;ap_hi;ap_lo;cholesterol;gluc;smoke;alco;active;cardio
0;18393;2;168;62.0;110;80;1;1;0;0;1;0
1;20228;1;156;85.0;140;90;3;1;0;0;1;1
2;18857;1;165;64.0;130;70;3;1;0;0;0;1
3;17623;2;-5;70.0;120;80;1;1;0;0;1;0
4;17474;1;156;56.0;100;100;1;1;0;0;0;0
5;21914;1;151;67.0;120;80;2;2;0;0;0;0
6;22113;1;157;93.0;130;80;3;1;0;0;1;0
7;22584;2;178;95.0;14020;80;1;1;0;0;1;1
8;17668;1;158;71.0;110;70;1;1;0;0;1;0
9;19834;1;164;68.0;110;60;1;1;0;0;0;0
";

fn config(dir: &tempfile::TempDir, output: &str) -> RunConfig {
    let input = dir.path().join("cardio_train.csv");
    fs::write(&input, RAW).unwrap();
    RunConfig {
        input,
        output: dir.path().join(output),
        ingest: IngestOptions::default(),
        limits: Limits::default(),
    }
}

#[tokio::test]
async fn test_run_writes_clean_csv() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir, "processed/cardio_clean.csv");

    let report = run(&config).await.unwrap();

    assert_eq!(report.audit.rows, 10);
    assert_eq!(report.audit.columns, 13);
    assert_eq!(report.kept + report.rejected, 10);
    assert_eq!(report.kept, 7);

    let rejected: Vec<usize> = report.rejections.iter().map(|r| r.row_index).collect();
    assert_eq!(rejected, vec![3, 4, 7]);
    assert_eq!(report.rejections[0].names(), vec!["height_cm"]);
    assert_eq!(report.rejections[1].names(), vec!["systolic_gt_diastolic"]);
    assert_eq!(report.rejections[2].names(), vec!["systolic_bp"]);
    assert_eq!(
        report.rejections_by_rule,
        vec![
            (Rule::HeightCm, 1),
            (Rule::SystolicBp, 1),
            (Rule::SystolicGtDiastolic, 1)
        ]
    );

    let text = fs::read_to_string(&config.output).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("id,age_days,gender,height_cm"));
    assert!(header.ends_with("age_years,bmi,pulse_pressure,hypertension,obesity"));
    assert_eq!(lines.count(), 7);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["rejections"][0]["violations"][0], "height_cm");
    assert_eq!(json["statistics"]["groups"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_run_parquet_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir, "cardio_clean.parquet");
    let report = run(&config).await.unwrap();
    assert_eq!(report.kept, 7);
    assert!(fs::metadata(&config.output).unwrap().len() > 0);
}

#[tokio::test]
async fn test_run_rejects_unknown_output_format() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir, "cardio_clean.xlsx");
    let err = run(&config).await.unwrap_err();
    assert!(matches!(err, PrepError::OutputFormat { .. }));
}

#[tokio::test]
async fn test_run_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&dir, "out.csv");
    config.input = dir.path().join("missing.csv");
    assert!(matches!(run(&config).await, Err(PrepError::Io { .. })));
}

#[test]
fn test_rerun_on_enriched_is_clean() {
    let dataset =
        cardio_prep::ingest::read_from(RAW.as_bytes(), &IngestOptions::default()).unwrap();
    let (enriched, rejections) = validate_and_enrich(&dataset.records);
    assert_eq!(enriched.len() + rejections.len(), dataset.records.len());

    let bases: Vec<_> = enriched.iter().map(|r| r.base().clone()).collect();
    let (again, none) = validate_and_enrich(&bases);
    assert!(none.is_empty());
    assert_eq!(again.len(), enriched.len());

    let second = &enriched[1];
    assert_eq!(second.base.id, 1);
    assert_eq!(second.age_years, 55);
    assert_eq!(second.bmi, 34.9);
    assert_eq!(second.pulse_pressure, 50);
    assert!(second.hypertension);
    assert!(second.obesity);
}

const HEADER: &str = "id;age;gender;height;weight;ap_hi;ap_lo;cholesterol;gluc;smoke;alco;active;cardio\n";

fn config_with(dir: &tempfile::TempDir, body: &str, ingest: IngestOptions) -> RunConfig {
    let input = dir.path().join("cardio_train.csv");
    fs::write(&input, format!("{}{}", HEADER, body)).unwrap();
    RunConfig {
        input,
        output: dir.path().join("out.csv"),
        ingest,
        limits: Limits::default(),
    }
}

#[tokio::test]
async fn test_run_drop_duplicates_keeps_file_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with(
        &dir,
        "0;18393;2;168;62.0;110;80;1;1;0;0;1;0\n\
         0;18393;2;168;62.0;110;80;1;1;0;0;1;0\n\
         2;18857;1;165;64.0;130;130;3;1;0;0;0;1\n",
        IngestOptions {
            drop_duplicates: true,
            ..IngestOptions::default()
        },
    );

    let report = run(&config).await.unwrap();
    assert_eq!(report.audit.rows, 3);
    assert_eq!(report.audit.duplicates, 1);
    assert_eq!(report.kept, 1);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.rejections[0].row_index, 2);
    assert_eq!(report.rejections[0].names(), vec!["systolic_gt_diastolic"]);
}

#[tokio::test]
async fn test_run_skips_unreadable_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with(
        &dir,
        "0;18393;2;168;62.0;110;80;1;1;0;0;1;0\n\
         1;20228;1;156;85.0;140;90;7;1;0;0;1;1\n\
         2;18857;1;-5;64.0;130;70;3;1;0;0;0;1\n",
        IngestOptions::default(),
    );

    let report = run(&config).await.unwrap();
    assert_eq!(report.audit.rows, 3);
    assert_eq!(report.audit.unreadable, 1);
    assert_eq!(report.skipped[0].row_index, 1);
    assert_eq!(report.kept, 1);
    assert_eq!(report.rejections[0].row_index, 2);
}
