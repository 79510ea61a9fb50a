//! Boundary to the vision recognizers (OCR, POI detectors).
//!
//! The detectors themselves live outside this crate. They hand back
//! [`Recognition`]s, which [`locate_detections`] correlates with named
//! points of interest on the map.

use serde::{Deserialize, Serialize};

use crate::{Error, GeoPoint, MapGraph};

/// Axis-aligned detection box in image pixels with its label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
    pub label: String,
    pub confidence: f64,
}

impl Detection {
    pub fn width(&self) -> i32 {
        self.xmax - self.xmin + 1
    }

    pub fn height(&self) -> i32 {
        self.ymax - self.ymin + 1
    }
}

/// Detections of one frame. An empty list means nothing was seen, a failed
/// recognizer returns an error instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub detections: Vec<Detection>,
    /// Capture time of the frame in seconds
    pub timestamp: f64,
}

/// Raw camera frame handed to a recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
    /// Interleaved 8-bit channels, row major
    pub data: Vec<u8>,
}

pub trait Recognizer {
    fn name(&self) -> &str;

    /// Runs the detector on one frame.
    ///
    /// # Errors
    ///
    /// [`Error::RecognitionFailed`] when the detector could not process the
    /// frame.
    fn recognize(&mut self, frame: &ImageFrame, timestamp: f64) -> Result<Recognition, Error>;
}

/// A detection together with the map positions its label refers to
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedDetection {
    pub detection: Detection,
    /// Matching POI positions, nearest to the reference point first
    pub candidates: Vec<GeoPoint>,
}

/// Matches detection labels against POI names.
///
/// Detections below `min_confidence` or without a matching POI are skipped.
/// When `near` is given, candidates are ordered by distance to it.
pub fn locate_detections(
    recognition: &Recognition,
    graph: &MapGraph,
    min_confidence: f64,
    near: Option<GeoPoint>,
) -> Vec<LocatedDetection> {
    recognition
        .detections
        .iter()
        .filter(|detection| detection.confidence >= min_confidence)
        .filter_map(|detection| {
            let mut candidates = graph.pois_by_name(detection.label.trim()).to_vec();
            if candidates.is_empty() {
                return None;
            }
            if let Some(reference) = near {
                candidates.sort_by(|a, b| {
                    reference
                        .haversine_to(*a)
                        .total_cmp(&reference.haversine_to(*b))
                });
            }
            Some(LocatedDetection {
                detection: detection.clone(),
                candidates,
            })
        })
        .collect()
}
