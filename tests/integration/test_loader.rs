//! Dataset loading from files and configuration.

use std::fs::File;
use std::io::Write;

use serde_json::json;
use tempfile::TempDir;

use demografi::config::Config;
use demografi::dataset::{Column, DatasetLoader};
use demografi::engine::evaluate_raw;
use demografi::error::{DatasetError, DemografiError};

use crate::common::{raw, FIXTURE_CSV};

fn write_csv(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_fixture_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "data.csv", FIXTURE_CSV);

    let snapshot = DatasetLoader::default().load_path(&path).unwrap();
    assert_eq!(snapshot.len(), 6);
    assert!((snapshot.total_weight() - 26.5).abs() < 1e-9);

    let negeri: Vec<&str> = snapshot.distinct_values(Column::Negeri).into_iter().collect();
    assert_eq!(negeri, vec!["Johor", "Pahang", "Perak"]);
}

#[test]
fn test_missing_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = DatasetLoader::default()
        .load_path(dir.path().join("missing.csv"))
        .unwrap_err();
    assert!(matches!(
        err,
        DemografiError::Dataset(DatasetError::NotFound(_))
    ));
}

#[test]
fn test_missing_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "data.csv",
        "jantina,umur,daerah,negeri,etnik,oku,pendidikan_tertinggi,COUNT\n\
         Lelaki,20,Ipoh,Perak,Melayu,OKU,SPM,1\n",
    );

    let err = DatasetLoader::default().load_path(&path).unwrap_err();
    match err {
        DemografiError::Dataset(DatasetError::MissingColumn(column)) => {
            assert_eq!(column, "pekerjaan_utama")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_config_points_at_dataset() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir, "data.csv", FIXTURE_CSV);

    let toml = format!(
        r#"
[dataset]
csv_path = "{}"
no_data_label = "Tidak Diketahui"

[retrieval]
enabled = false
"#,
        csv.display()
    );
    let config_path = write_csv(&dir, "config.toml", &toml);

    let config = Config::from_file(&config_path).unwrap();
    assert_eq!(config.csv_path(), csv);
    assert!(!config.retrieval.enabled);

    let snapshot = DatasetLoader::new(config.dataset.no_data_label.clone())
        .load_path(config.csv_path())
        .unwrap();
    assert!(snapshot
        .distinct_values(Column::PendidikanTertinggi)
        .contains("Tidak Diketahui"));
}

#[test]
fn test_row_texts_follow_snapshot_order() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "data.csv", FIXTURE_CSV);
    let snapshot = DatasetLoader::default().load_path(&path).unwrap();

    let texts = snapshot.row_texts();
    assert_eq!(texts.len(), snapshot.len());
    assert_eq!(
        texts[3],
        "Jantina: Perempuan, Umur: Tiada Data, Daerah: Kuantan, Negeri: Pahang, Etnik: Melayu, \
         OKU: Tiada Data, Pendidikan Tertinggi: Tiada Data, Pekerjaan: Tiada Pekerjaan, Jumlah: 4"
    );
}

#[test]
fn test_fractional_age_loads_and_groups() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "data.csv",
        "jantina,umur,daerah,negeri,etnik,oku,pendidikan_tertinggi,pekerjaan_utama,COUNT\n\
         Lelaki,20,Ipoh,Perak,Melayu,OKU,SPM,Guru,1\n\
         Lelaki,30.5,Ipoh,Perak,Melayu,OKU,SPM,Guru,2\n",
    );

    let snapshot = DatasetLoader::default().load_path(&path).unwrap();
    assert_eq!(snapshot.len(), 2);

    let (answer, _) = evaluate_raw(&snapshot, &raw(json!({})));
    let umur = serde_json::to_value(answer.group("Umur").unwrap()).unwrap();
    assert_eq!(
        umur["data"],
        json!([{"Umur": 20, "COUNT": 1}, {"Umur": 30.5, "COUNT": 2}])
    );

    let (at_most_30, _) = evaluate_raw(&snapshot, &raw(json!({"umur_max": "30"})));
    assert_eq!(at_most_30.total, 1);
}
