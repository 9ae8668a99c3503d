//! Template → photo mapping driven by detected anchors.
//!
//! Each axis is mapped through its own chain of anatomical breakpoints, so a point
//! follows the patient's real proportions (forehead height, eye spacing, mouth
//! position) instead of a uniform scale of the face box.

use serde::Serialize;

use super::chain::AnchorChain;
use crate::geom::{Point2, Rect};
use crate::model::{Detection, FaceAnchors, FaceBox, InjectionPoint};

/// Template positions of the vertical breakpoints: box top, upper forehead,
/// forehead center, eyebrow, eye level, nose bridge, nose tip, upper lip,
/// lip corners, lip/chin midpoint, chin, box bottom.
pub const VERTICAL_STANDARD: [f64; 12] = [
    0.00, 0.12, 0.22, 0.32, 0.40, 0.48, 0.58, 0.66, 0.72, 0.82, 0.92, 1.00,
];

/// Template positions of the horizontal breakpoints: box left, left cheek, left
/// eye outer, left eye inner, nose tip, right eye inner, right eye outer, right
/// cheek, box right.
pub const HORIZONTAL_STANDARD: [f64; 9] = [0.00, 0.12, 0.28, 0.42, 0.50, 0.58, 0.72, 0.88, 1.00];

pub type VerticalChain = AnchorChain<12>;
pub type HorizontalChain = AnchorChain<9>;

/// How a point was placed on the photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacementMethod {
    /// Both axes interpolated along the anchor chains.
    Anchored,
    /// At least one axis used proportional placement inside the face box.
    BoxFallback,
}

/// A point placed on the displayed photo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPlacement {
    pub id: String,
    /// Pixel position inside the displayed image rectangle.
    pub pixel: Point2,
    /// Image-normalized position.
    pub normalized: Point2,
    pub method: PlacementMethod,
}

#[must_use]
pub fn vertical_chain(face_box: FaceBox, anchors: &FaceAnchors) -> VerticalChain {
    let eye = anchors.eye_level();
    let lips = anchors.lip_corner_level();
    AnchorChain::new(
        &VERTICAL_STANDARD,
        [
            face_box.top(),
            (face_box.top() + anchors.forehead.y) * 0.5,
            anchors.forehead.y,
            (anchors.forehead.y + eye) * 0.5,
            eye,
            (anchors.nose_top.y + anchors.nose_tip.y) * 0.5,
            anchors.nose_tip.y,
            anchors.upper_lip.y,
            lips,
            (lips + anchors.chin.y) * 0.5,
            anchors.chin.y,
            face_box.bottom(),
        ],
    )
}

#[must_use]
pub fn horizontal_chain(face_box: FaceBox, anchors: &FaceAnchors) -> HorizontalChain {
    AnchorChain::new(
        &HORIZONTAL_STANDARD,
        [
            face_box.left(),
            anchors.left_cheek.x,
            anchors.left_eye_outer.x,
            anchors.left_eye_inner.x,
            anchors.nose_tip.x,
            anchors.right_eye_inner.x,
            anchors.right_eye_outer.x,
            anchors.right_cheek.x,
            face_box.right(),
        ],
    )
}

/// Maps template coordinates onto one photo. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoMapper {
    face_box: FaceBox,
    chains: Option<(VerticalChain, HorizontalChain)>,
}

impl PhotoMapper {
    #[must_use]
    pub fn new(face_box: FaceBox, anchors: Option<&FaceAnchors>) -> Self {
        let chains = anchors
            .filter(|anchors| anchors.is_finite())
            .map(|anchors| {
                (
                    vertical_chain(face_box, anchors),
                    horizontal_chain(face_box, anchors),
                )
            });
        Self { face_box, chains }
    }

    /// Mapper for the current detection state. Without a detection the whole image
    /// stands in for the face box.
    #[must_use]
    pub fn from_detection(detection: Option<&Detection>) -> Self {
        match detection {
            Some(detection) => Self::new(detection.face_box, detection.usable_anchors()),
            None => {
                log::debug!("no detection available; placing points on the whole image");
                Self::new(Rect::UNIT, None)
            }
        }
    }

    #[must_use]
    pub fn face_box(&self) -> FaceBox {
        self.face_box
    }

    #[must_use]
    pub fn is_anchored(&self) -> bool {
        self.chains.is_some()
    }

    /// Map a standard point (`0..=1` per axis) to image-normalized space.
    #[must_use]
    pub fn to_image(&self, x_std: f64, y_std: f64) -> (Point2, PlacementMethod) {
        let (x, y) = match &self.chains {
            Some((vertical, horizontal)) => {
                (horizontal.interpolate(x_std), vertical.interpolate(y_std))
            }
            None => (None, None),
        };
        let method = if x.is_some() && y.is_some() {
            PlacementMethod::Anchored
        } else {
            PlacementMethod::BoxFallback
        };
        let fallback = self.face_box.at_fraction(x_std, y_std);
        let point = Point2::new(x.unwrap_or(fallback.x), y.unwrap_or(fallback.y));
        (point, method)
    }

    /// Map a standard point to a pixel inside `display`, the rectangle the photo is
    /// drawn into.
    #[must_use]
    pub fn to_pixels(&self, x_std: f64, y_std: f64, display: Rect) -> Point2 {
        let (normalized, _) = self.to_image(x_std, y_std);
        display.at_fraction(normalized.x, normalized.y)
    }

    #[must_use]
    pub fn place(&self, point: &InjectionPoint, display: Rect) -> PhotoPlacement {
        let (x_std, y_std) = point.standard();
        let (normalized, method) = self.to_image(x_std, y_std);
        PhotoPlacement {
            id: point.id.clone(),
            pixel: display.at_fraction(normalized.x, normalized.y),
            normalized,
            method,
        }
    }
}
