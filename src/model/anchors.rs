//! Output of the external landmark detector.

use serde::{Deserialize, Serialize};

use crate::geom::{Point2, Rect};

/// Bounding box of the detected face, image-normalized.
pub type FaceBox = Rect;

/// Named anatomical anchors in image-normalized `[0, 1]` space.
///
/// `left`/`right` refer to image orientation (smaller/larger x).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnchors {
    pub forehead: Point2,
    pub left_eye_outer: Point2,
    pub left_eye_inner: Point2,
    pub right_eye_outer: Point2,
    pub right_eye_inner: Point2,
    pub nose_top: Point2,
    pub nose_tip: Point2,
    pub upper_lip: Point2,
    pub left_lip_corner: Point2,
    pub right_lip_corner: Point2,
    pub chin: Point2,
    pub left_cheek: Point2,
    pub right_cheek: Point2,
}

impl FaceAnchors {
    fn all(&self) -> [Point2; 13] {
        [
            self.forehead,
            self.left_eye_outer,
            self.left_eye_inner,
            self.right_eye_outer,
            self.right_eye_inner,
            self.nose_top,
            self.nose_tip,
            self.upper_lip,
            self.left_lip_corner,
            self.right_lip_corner,
            self.chin,
            self.left_cheek,
            self.right_cheek,
        ]
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.all().iter().all(|p| p.is_finite())
    }

    /// Eye level: midpoint of the two outer eye corners.
    #[must_use]
    pub fn eye_level(&self) -> f64 {
        (self.left_eye_outer.y + self.right_eye_outer.y) * 0.5
    }

    /// Mouth level: midpoint of the two lip corners.
    #[must_use]
    pub fn lip_corner_level(&self) -> f64 {
        (self.left_lip_corner.y + self.right_lip_corner.y) * 0.5
    }
}

/// One detector result for one photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub face_box: FaceBox,
    #[serde(default)]
    pub anchors: Option<FaceAnchors>,
}

impl Detection {
    /// Anchors usable for interpolation; non-finite anchor sets count as absent.
    #[must_use]
    pub fn usable_anchors(&self) -> Option<&FaceAnchors> {
        self.anchors.as_ref().filter(|anchors| anchors.is_finite())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A frontal face roughly centred in the photo.
    pub fn frontal_anchors() -> FaceAnchors {
        FaceAnchors {
            forehead: Point2::new(0.50, 0.20),
            left_eye_outer: Point2::new(0.36, 0.38),
            left_eye_inner: Point2::new(0.45, 0.385),
            right_eye_outer: Point2::new(0.64, 0.38),
            right_eye_inner: Point2::new(0.55, 0.385),
            nose_top: Point2::new(0.50, 0.39),
            nose_tip: Point2::new(0.50, 0.53),
            upper_lip: Point2::new(0.50, 0.60),
            left_lip_corner: Point2::new(0.43, 0.64),
            right_lip_corner: Point2::new(0.57, 0.64),
            chin: Point2::new(0.50, 0.78),
            left_cheek: Point2::new(0.32, 0.50),
            right_cheek: Point2::new(0.68, 0.50),
        }
    }

    pub fn frontal_box() -> FaceBox {
        Rect::new(0.28, 0.10, 0.44, 0.75)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn derived_levels() {
        let anchors = frontal_anchors();
        assert!((anchors.eye_level() - 0.38).abs() < 1e-12);
        assert!((anchors.lip_corner_level() - 0.64).abs() < 1e-12);
    }

    #[test]
    fn non_finite_anchors_are_not_usable() {
        let mut anchors = frontal_anchors();
        anchors.chin.y = f64::NAN;
        let detection = Detection {
            face_box: frontal_box(),
            anchors: Some(anchors),
        };
        assert!(detection.usable_anchors().is_none());
    }

    #[test]
    fn detection_without_anchors_deserializes() {
        let json = r#"{"faceBox":{"x":0.1,"y":0.1,"width":0.5,"height":0.6}}"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert!(detection.anchors.is_none());
        assert_eq!(detection.face_box.width, 0.5);
    }
}
