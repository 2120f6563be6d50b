//! The four validated annotation tables of one subset.

use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use hdtf_models::{AnnotationKind, CropRect, Interval, Subset};

use crate::error::{AnnotationError, AnnotationResult};
use crate::table::{AnnotationTable, Record};

/// Annotations of a single subset, checked for structural consistency.
///
/// Loaded once, consumed by [`crate::join_subset`], then dropped.
#[derive(Debug, Clone)]
pub struct SubsetAnnotations {
    pub subset: Subset,
    /// `{video}` → URL (exactly one field per record)
    pub video_urls: AnnotationTable,
    /// `{video}_{idx}.mp4` → crop
    pub crops: HashMap<String, CropRect>,
    /// `{video}.mp4` → intervals in file order
    pub intervals: HashMap<String, Vec<Interval>>,
    /// `{video}.mp4` → resolution fields, checked by the joiner
    pub resolutions: AnnotationTable,
}

impl SubsetAnnotations {
    /// Read all four annotation files of `subset` from `source_dir`.
    pub async fn load(source_dir: impl AsRef<Path>, subset: Subset) -> AnnotationResult<Self> {
        let source_dir = source_dir.as_ref();
        let read = |kind| AnnotationTable::read(subset.annotation_path(source_dir, kind));

        let video_urls = read(AnnotationKind::VideoUrl).await?;
        let crops = read(AnnotationKind::Crop).await?;
        let intervals = read(AnnotationKind::Interval).await?;
        let resolutions = read(AnnotationKind::Resolution).await?;

        let annotations = Self::from_tables(subset, video_urls, crops, intervals, resolutions)?;
        info!(
            subset = %subset,
            videos = annotations.video_urls.len(),
            clips = annotations.crops.len(),
            "Loaded subset annotations"
        );
        Ok(annotations)
    }

    /// Validate already-parsed tables.
    pub fn from_tables(
        subset: Subset,
        video_urls: AnnotationTable,
        crops: AnnotationTable,
        intervals: AnnotationTable,
        resolutions: AnnotationTable,
    ) -> AnnotationResult<Self> {
        for record in video_urls.iter() {
            if record.fields.len() != 1 {
                return Err(AnnotationError::malformed(
                    video_urls.path(),
                    record.line,
                    format!(
                        "expected exactly one URL for `{}`, got {} fields",
                        record.key,
                        record.fields.len()
                    ),
                ));
            }
        }

        Ok(Self {
            subset,
            crops: parse_crops(&crops)?,
            intervals: parse_intervals(&intervals)?,
            video_urls,
            resolutions,
        })
    }
}

fn parse_crops(table: &AnnotationTable) -> AnnotationResult<HashMap<String, CropRect>> {
    table
        .iter()
        .map(|record| {
            CropRect::from_fields(record.fields.as_slice())
                .map(|crop| (record.key.clone(), crop))
                .map_err(|e| malformed(table, record, e))
        })
        .collect()
}

fn parse_intervals(table: &AnnotationTable) -> AnnotationResult<HashMap<String, Vec<Interval>>> {
    table
        .iter()
        .map(|record| -> AnnotationResult<(String, Vec<Interval>)> {
            let intervals = record
                .fields
                .iter()
                .map(|field| field.parse::<Interval>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| malformed(table, record, e))?;
            Ok((record.key.clone(), intervals))
        })
        .collect()
}

fn malformed(table: &AnnotationTable, record: &Record, reason: impl ToString) -> AnnotationError {
    AnnotationError::malformed(
        table.path(),
        record.line,
        format!("`{}`: {}", record.key, reason.to_string()),
    )
}
