use crate::dataset::{Cell, Column, Dataset, Modality};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Explicit per-modality column lists; `None` means "infer".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnOverrides {
    pub text: Option<Vec<String>>,
    pub image: Option<Vec<String>>,
    pub numeric: Option<Vec<String>>,
    pub audio: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalityColumns {
    pub text: Vec<String>,
    pub image: Vec<String>,
    pub numeric: Vec<String>,
    pub audio: Vec<String>,
}

const IMAGE_NAME_HINTS: [&str; 3] = ["img", "image", "url"];
const AUDIO_NAME_HINTS: [&str; 1] = ["audio"];

/// Resolve the column list of every modality. Lists are independent: a column
/// may land in several of them. Nothing is inferred from a zero-row dataset;
/// explicit lists still apply.
pub fn classify(dataset: &Dataset, overrides: &ColumnOverrides) -> ModalityColumns {
    ModalityColumns {
        text: resolve(dataset, overrides.text.as_deref(), Modality::Text),
        image: resolve(dataset, overrides.image.as_deref(), Modality::Image),
        numeric: resolve(dataset, overrides.numeric.as_deref(), Modality::Numeric),
        audio: resolve(dataset, overrides.audio.as_deref(), Modality::Audio),
    }
}

fn resolve(dataset: &Dataset, explicit: Option<&[String]>, modality: Modality) -> Vec<String> {
    match explicit {
        Some(names) => names
            .iter()
            .filter(|name| {
                let present = dataset.has_column(name);
                if !present {
                    warn!(column = %name, ?modality, "override names a column not in the dataset; skipping");
                }
                present
            })
            .cloned()
            .collect(),
        None if dataset.row_count() == 0 => Vec::new(),
        None => dataset
            .columns()
            .iter()
            .filter(|c| infer(c, modality))
            .map(|c| c.name.clone())
            .collect(),
    }
}

fn infer(column: &Column, modality: Modality) -> bool {
    match modality {
        Modality::Numeric => is_numeric(column),
        Modality::Text => is_string_like(column),
        Modality::Image => name_has_any(&column.name, &IMAGE_NAME_HINTS),
        Modality::Audio => name_has_any(&column.name, &AUDIO_NAME_HINTS),
    }
}

pub fn is_numeric(column: &Column) -> bool {
    let mut non_null = column.values.iter().flatten().peekable();
    non_null.peek().is_some() && non_null.all(|c| matches!(c, Cell::Number(_) | Cell::Bool(_)))
}

pub fn is_string_like(column: &Column) -> bool {
    column.values.iter().flatten().any(|c| matches!(c, Cell::Text(_)))
}

fn name_has_any(name: &str, hints: &[&str]) -> bool {
    let lower = name.to_lowercase();
    hints.iter().any(|h| lower.contains(h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::new("caption", vec![Some("a cat".into()), None]),
            Column::new("Image_URL", vec![Some("x.png".into()), Some("y.png".into())]),
            Column::new("price", vec![Some(1.0.into()), None]),
            Column::new("audio_path", vec![None, Some("a.wav".into())]),
            Column::new("flag", vec![Some(true.into()), Some(false.into())]),
        ])
        .unwrap()
    }

    #[test]
    fn infers_each_modality_independently() {
        let cols = classify(&sample(), &ColumnOverrides::default());
        assert_eq!(cols.text, vec!["caption", "Image_URL", "audio_path"]);
        assert_eq!(cols.image, vec!["Image_URL"]);
        assert_eq!(cols.numeric, vec!["price", "flag"]);
        assert_eq!(cols.audio, vec!["audio_path"]);
    }

    #[test]
    fn bool_columns_count_as_numeric() {
        let ds = Dataset::new(vec![Column::new("flag", vec![Some(true.into()), Some(false.into()), None])]).unwrap();
        let cols = classify(&ds, &ColumnOverrides::default());
        assert_eq!(cols.numeric, vec!["flag"]);
        assert!(cols.text.is_empty());

        let mixed = Column::new("m", vec![Some(1.0.into()), Some(true.into())]);
        assert!(is_numeric(&mixed));
        let texty = Column::new("t", vec![Some(1.0.into()), Some("x".into())]);
        assert!(!is_numeric(&texty));
    }

    #[test]
    fn explicit_lists_win_and_unknown_names_drop() {
        let overrides = ColumnOverrides {
            text: Some(vec!["caption".into(), "ghost".into()]),
            audio: Some(vec![]),
            ..Default::default()
        };
        let cols = classify(&sample(), &overrides);
        assert_eq!(cols.text, vec!["caption"]);
        assert!(cols.audio.is_empty());
        assert_eq!(cols.image, vec!["Image_URL"]);
    }

    #[test]
    fn empty_dataset_yields_empty_lists() {
        let ds = Dataset::new(vec![Column::new("img", vec![])]).unwrap();
        assert_eq!(classify(&ds, &ColumnOverrides::default()), ModalityColumns::default());
        assert_eq!(classify(&Dataset::default(), &ColumnOverrides::default()), ModalityColumns::default());
    }

    #[test]
    fn empty_dataset_keeps_explicit_lists() {
        let ds = Dataset::new(vec![Column::new("caption", vec![]), Column::new("price", vec![])]).unwrap();
        let overrides = ColumnOverrides {
            text: Some(vec!["caption".into()]),
            numeric: Some(vec!["price".into(), "ghost".into()]),
            ..Default::default()
        };
        let cols = classify(&ds, &overrides);
        assert_eq!(cols.text, vec!["caption"]);
        assert_eq!(cols.numeric, vec!["price"]);
        assert!(cols.image.is_empty());
        assert!(cols.audio.is_empty());
    }

    #[test]
    fn all_null_column_is_neither_numeric_nor_text() {
        let col = Column::new("x", vec![None, None]);
        assert!(!is_numeric(&col));
        assert!(!is_string_like(&col));
    }
}
