//! Dataset subsets and annotation file naming.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// A partition of the dataset's source videos.
///
/// Each subset ships its own group of four annotation files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subset {
    /// Videos with the `RD` prefix
    Rd,
    /// Videos with the `WDA` prefix
    Wda,
    /// Videos with the `WRA` prefix
    Wra,
}

impl Subset {
    /// All subsets in declaration order. Jobs are emitted in this order.
    pub const ALL: &'static [Subset] = &[Subset::Rd, Subset::Wda, Subset::Wra];

    /// Returns the subset name as used in annotation filenames and job names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Subset::Rd => "RD",
            Subset::Wda => "WDA",
            Subset::Wra => "WRA",
        }
    }

    /// Filename of this subset's annotation file of the given kind.
    pub fn annotation_file_name(&self, kind: AnnotationKind) -> String {
        format!("{}_{}.txt", self.as_str(), kind.file_suffix())
    }

    /// Path of this subset's annotation file of the given kind inside `source_dir`.
    pub fn annotation_path(&self, source_dir: impl AsRef<Path>, kind: AnnotationKind) -> PathBuf {
        source_dir.as_ref().join(self.annotation_file_name(kind))
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Subset {
    type Err = SubsetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "RD" => Ok(Subset::Rd),
            "WDA" => Ok(Subset::Wda),
            "WRA" => Ok(Subset::Wra),
            _ => Err(SubsetParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown subset: {0}")]
pub struct SubsetParseError(String);

/// The four kinds of annotation file shipped per subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// `{video} {url}`
    VideoUrl,
    /// `{video}_{idx}.mp4 {x} {w} {y} {h}`
    Crop,
    /// `{video}.mp4 {start-end} {start-end} ...`
    Interval,
    /// `{video}.mp4 {height}`
    Resolution,
}

impl AnnotationKind {
    /// Filename suffix of this kind. `annotion_time` is the dataset's own spelling.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            AnnotationKind::VideoUrl => "video_url",
            AnnotationKind::Crop => "crop_wh",
            AnnotationKind::Interval => "annotion_time",
            AnnotationKind::Resolution => "resolution",
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order() {
        let names: Vec<_> = Subset::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["RD", "WDA", "WRA"]);
    }

    #[test]
    fn test_annotation_file_names() {
        assert_eq!(
            Subset::Rd.annotation_file_name(AnnotationKind::VideoUrl),
            "RD_video_url.txt"
        );
        assert_eq!(
            Subset::Wda.annotation_file_name(AnnotationKind::Crop),
            "WDA_crop_wh.txt"
        );
        assert_eq!(
            Subset::Wra.annotation_file_name(AnnotationKind::Interval),
            "WRA_annotion_time.txt"
        );
        assert_eq!(
            Subset::Rd.annotation_path("/data/hdtf", AnnotationKind::Resolution),
            PathBuf::from("/data/hdtf/RD_resolution.txt")
        );
    }

    #[test]
    fn test_subset_from_str() {
        assert_eq!("wda".parse::<Subset>().unwrap(), Subset::Wda);
        assert_eq!("WRA".parse::<Subset>().unwrap(), Subset::Wra);
        assert!("XYZ".parse::<Subset>().is_err());
    }
}
