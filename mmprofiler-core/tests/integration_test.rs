use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use mmprofiler_core::{
    load_dataset, Collaborators, ColumnOverrides, MmProfilerError, ProfileAggregator,
    ProfilerOptions,
};
use parquet::arrow::ArrowWriter;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(4, 3, image::Rgb([200, 100, 50]))
        .save(&path)
        .unwrap();
    path
}

fn write_csv(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("data.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

fn offline(dataset: mmprofiler_core::Dataset) -> ProfileAggregator {
    ProfileAggregator::new(dataset).with_collaborators(Collaborators::offline())
}

#[test]
fn csv_to_html_report() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "cat.png");
    let csv = write_csv(
        dir.path(),
        &format!(
            "caption,price,image_path,label\n\
             a cat,10,{},cat\n\
             ,,,dog\n\
             a very long descriptive caption about scenery,1000,{},cat\n",
            png.display(),
            dir.path().join("gone.png").display()
        ),
    );

    let mut agg = offline(load_dataset(&csv).unwrap());
    let profile = agg.run(&ColumnOverrides::default());

    assert_eq!(profile.general.total_rows, 3);
    let caption = profile.text["caption"].metrics().unwrap();
    assert_eq!(caption.empty_rows, 1);
    let price = profile.numeric["price"].metrics().unwrap();
    assert_eq!(price.missing, 1);
    assert_eq!(price.missing_percent, 33.33);
    assert_eq!(price.mean, Some(505.0));

    let images = profile.images["image_path"].metrics().unwrap();
    assert_eq!(images.valid_files, 1);
    assert_eq!(images.formats.get("PNG"), Some(&1));
    assert_eq!(images.avg_width, Some(4.0));

    let labels = profile.multimodal.label_distribution.as_ref().unwrap();
    assert_eq!(labels.values().sum::<u64>(), 3);
    assert_eq!(labels["cat"], 2);

    let out = dir.path().join("nested").join("deeper").join("report.html");
    let written = agg.export_html(&out).unwrap();
    let html = std::fs::read_to_string(written).unwrap();
    for section in [
        "General",
        "Text analysis",
        "Image analysis",
        "Numeric analysis",
        "Multimodal checks",
        "Recommendations",
    ] {
        assert!(html.contains(&format!("<h2>{section}</h2>")), "missing {section}");
    }
    assert!(html.contains("&quot;caption&quot;"));
}

#[test]
fn export_requires_a_completed_run() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path(), "caption\nhello\n");
    let mut agg = offline(load_dataset(&csv).unwrap());
    agg.analyze_text("caption").unwrap();

    let err = agg.export_html(&dir.path().join("report.html")).unwrap_err();
    assert!(matches!(err, MmProfilerError::NotProfiled));
    assert!(!dir.path().join("report.html").exists());
}

#[test]
fn json_export_writes_profile() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path(), "caption,price\nhello world,1\nbye,2\n");
    let mut agg = offline(load_dataset(&csv).unwrap());
    agg.run(&ColumnOverrides::default());

    let path = agg.export_json(&dir.path().join("out").join("profile.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(doc["general"]["total_rows"], 2);
    assert_eq!(doc["numeric"]["price"]["50%"], 1.5);
    assert_eq!(doc["text"]["caption"]["top_words"][0][0], "hello");
}

#[test]
fn header_only_csv_profiles_cleanly() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path(), "caption,price\n");
    let ds = load_dataset(&csv).unwrap();
    assert_eq!(ds.row_count(), 0);

    let overrides = ColumnOverrides {
        text: Some(vec!["caption".into()]),
        numeric: Some(vec!["price".into()]),
        ..Default::default()
    };
    let profile = offline(ds).run(&overrides);
    assert_eq!(profile.general.total_rows, 0);
    assert_eq!(profile.multimodal.missing_modalities_percent, 0.0);
    assert!(profile.images.is_empty());

    let text = profile.text["caption"].metrics().unwrap();
    assert_eq!(text.total, 0);
    assert_eq!(text.avg_length, 0.0);
    let num = profile.numeric["price"].metrics().unwrap();
    assert_eq!(num.total, 0);
    assert_eq!(num.missing_percent, 0.0);
    assert_eq!(num.mean, None);
    assert_eq!(num.skew, None);
}

#[test]
fn bool_csv_column_is_profiled_as_numeric() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path(), "id,flag\n1,true\n2,false\n3,\n4,true\n");
    let profile = offline(load_dataset(&csv).unwrap()).run(&ColumnOverrides::default());
    let flag = profile.numeric["flag"].metrics().unwrap();
    assert_eq!(flag.count, 3);
    assert_eq!(flag.zeros, 1);
    assert!(!profile.text.contains_key("flag"));
}

#[test]
fn parquet_input_is_profiled() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.parquet");
    let schema = Arc::new(Schema::new(vec![
        Field::new("target", DataType::Int64, true),
        Field::new("caption", DataType::Utf8, true),
        Field::new("score", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![Some(1), Some(1), None, Some(0)])),
            Arc::new(StringArray::from(vec![Some("one"), None, Some("three"), Some("four")])),
            Arc::new(Float64Array::from(vec![0.5, 0.0, 1.5, 2.0])),
        ],
    )
    .unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let mut agg = ProfileAggregator::new(load_dataset(&path).unwrap())
        .with_options(ProfilerOptions { sample_images: None, ..Default::default() })
        .with_collaborators(Collaborators::offline());
    let profile = agg.run(&ColumnOverrides::default());

    assert_eq!(profile.general.columns, vec!["target", "caption", "score"]);
    assert_eq!(profile.numeric["score"].metrics().unwrap().zeros, 1);
    assert!(profile.text.contains_key("caption"));
    let labels = profile.multimodal.label_distribution.as_ref().unwrap();
    assert_eq!(labels["1"], 2);
    assert_eq!(labels["NULL"], 1);
    assert_eq!(labels.values().sum::<u64>(), 4);
}

#[test]
fn tabular_summary_feeds_the_draft() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path(), "caption,price\na,1\nb,\n");
    let mut agg = offline(load_dataset(&csv).unwrap());
    let summary = agg.summarize_tabular(true);
    assert_eq!(summary["price"].missing, 1);
    assert_eq!(summary["caption"].unique, 2);
    let draft = agg.draft().unwrap();
    assert!(draft.numeric().contains_key("price"));
    assert!(agg.profile().is_err());
}
