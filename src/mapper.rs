//! Screen/model coordinate mapping.
//!
//! The renderer draws the image inside a view built from two layers:
//! 1. A stage transform: translate by `user position + fit offset`, then
//!    scale by `user scale * fit scale`.
//! 2. An image-local group transform: rotate and flip about the center of the
//!    displayed (possibly cropped) image.
//!
//! Model space is original-image pixel space. The crop origin is folded into
//! the mapping so annotations and crop rectangles share one coordinate system
//! regardless of the current crop, zoom, pan, rotation or flip.

use crate::constants::{FIT_PADDING, zoom};
use crate::model::{Point, Rect, Rotation, Size, TransformState};

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f32 = 1e-12;

/// 2D affine matrix in canvas convention:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(dx: f32, dy: f32) -> Self {
        Affine {
            e: dx,
            f: dy,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Affine {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Clockwise rotation on a y-down screen.
    pub fn rotate(rotation: Rotation) -> Self {
        let (cos, sin) = rotation.cos_sin();
        Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Compose so that `other` is applied first, then `self`.
    pub fn then(&self, other: &Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Exact inverse, `None` when the matrix is singular or non-finite.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Scale and centering offset that fit the displayed image into its container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl FitTransform {
    /// Fit `display` inside `container` with padding, centered.
    /// Returns `None` if either size is zero or unset.
    pub fn compute(container: Size, display: Size) -> Option<FitTransform> {
        if !container.is_valid() || !display.is_valid() {
            return None;
        }
        let scale_x = container.width / display.width;
        let scale_y = container.height / display.height;
        let mut scale = scale_x.min(scale_y) * FIT_PADDING;
        if !scale.is_finite() || scale <= 0.0 {
            log::warn!("Computed fit scale {scale} is invalid, falling back to 1.0");
            scale = 1.0;
        }
        Some(FitTransform {
            scale,
            offset_x: (container.width - display.width * scale) / 2.0,
            offset_y: (container.height - display.height * scale) / 2.0,
        })
    }
}

/// Forward (model -> screen) and inverse (screen -> model) mapping for one
/// combination of container size, image, and transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    fit: FitTransform,
    total_scale: f32,
    display_region: Rect,
    forward: Affine,
    inverse: Affine,
}

impl CoordinateMapper {
    /// Build the mapping. `image` is the original (uncropped) image size.
    ///
    /// Returns `None` when the container or image is not sized yet or the
    /// resulting view transform cannot be inverted; callers should treat
    /// pointer events as no-ops in that case.
    pub fn new(container: Size, image: Size, transform: &TransformState) -> Option<Self> {
        if !image.is_valid() {
            log::debug!("Mapper unavailable: image size {:?}", image);
            return None;
        }
        let display_region = transform
            .source_crop
            .filter(Rect::is_valid)
            .unwrap_or_else(|| Rect::from_size(image));
        let Some(fit) = FitTransform::compute(container, display_region.size()) else {
            log::debug!("Mapper unavailable: container size {:?}", container);
            return None;
        };

        let mut total_scale = transform.scale * fit.scale;
        if !total_scale.is_finite() || total_scale <= 0.0 {
            log::warn!("Invalid total view scale {total_scale}, defaulting to 1.0");
            total_scale = 1.0;
        }

        let stage = Affine::translate(
            transform.position.x + fit.offset_x,
            transform.position.y + fit.offset_y,
        )
        .then(&Affine::scale(total_scale, total_scale));

        let half_w = display_region.width / 2.0;
        let half_h = display_region.height / 2.0;
        let flip = Affine::scale(
            if transform.flip_x { -1.0 } else { 1.0 },
            if transform.flip_y { -1.0 } else { 1.0 },
        );
        let group = Affine::translate(half_w, half_h)
            .then(&Affine::rotate(transform.rotation))
            .then(&flip)
            .then(&Affine::translate(-half_w, -half_h));

        let content = Affine::translate(-display_region.x, -display_region.y);
        let forward = stage.then(&group).then(&content);

        let Some(inverse) = forward.invert() else {
            log::warn!("View transform is singular, pointer mapping disabled");
            return None;
        };

        Some(Self {
            fit,
            total_scale,
            display_region,
            forward,
            inverse,
        })
    }

    /// Screen (container) position to model space.
    pub fn to_model(&self, screen: Point) -> Point {
        self.inverse.apply(screen)
    }

    /// Model-space position to screen (container) position.
    pub fn to_screen(&self, model: Point) -> Point {
        self.forward.apply(model)
    }

    pub fn fit(&self) -> FitTransform {
        self.fit
    }

    /// Effective scale from model pixels to screen pixels.
    pub fn total_scale(&self) -> f32 {
        self.total_scale
    }

    /// Multiplier that keeps strokes a constant on-screen width.
    pub fn item_scale(&self) -> f32 {
        1.0 / self.total_scale
    }

    /// Region of the original image currently displayed (crop or full image).
    pub fn display_region(&self) -> Rect {
        self.display_region
    }

    pub fn forward(&self) -> Affine {
        self.forward
    }

    pub fn inverse(&self) -> Affine {
        self.inverse
    }

    /// Wheel zoom that keeps the image point under `pointer` fixed on screen.
    ///
    /// The algorithm:
    /// 1. Find the stage-space point under the cursor
    /// 2. Scale by `factor` (in or out), clamped to the zoom range relative to fit
    /// 3. Adjust the pan so that same point stays under the cursor
    ///
    /// Returns the new `(user scale, user position)`, or `None` when the clamped
    /// scale barely changes.
    pub fn zoom_at_pointer(
        &self,
        transform: &TransformState,
        pointer: Point,
        zoom_in: bool,
        factor: f32,
    ) -> Option<(f32, Point)> {
        let old_scale = self.total_scale;
        let stage_x = transform.position.x + self.fit.offset_x;
        let stage_y = transform.position.y + self.fit.offset_y;

        let new_scale = if zoom_in {
            old_scale * factor
        } else {
            old_scale / factor
        }
        .clamp(self.fit.scale * zoom::MIN, self.fit.scale * zoom::MAX);

        if (new_scale - old_scale).abs() < zoom::MIN_CHANGE {
            return None;
        }

        // Stage-local point under the cursor (before zoom)
        let local_x = (pointer.x - stage_x) / old_scale;
        let local_y = (pointer.y - stage_y) / old_scale;

        let new_stage_x = pointer.x - local_x * new_scale;
        let new_stage_y = pointer.y - local_y * new_scale;

        Some((
            new_scale / self.fit.scale,
            Point::new(
                new_stage_x - self.fit.offset_x,
                new_stage_y - self.fit.offset_y,
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.01;

    fn approx_eq(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
    }

    fn container() -> Size {
        Size::new(1000.0, 500.0)
    }

    fn image() -> Size {
        Size::new(200.0, 100.0)
    }

    #[test]
    fn test_fit_centers_with_padding() {
        let fit = FitTransform::compute(container(), image()).unwrap();
        assert!((fit.scale - 4.9).abs() < 1e-4);
        assert!((fit.offset_x - 10.0).abs() < 1e-3);
        assert!((fit.offset_y - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_unsized_inputs_yield_none() {
        let t = TransformState::default();
        assert!(CoordinateMapper::new(Size::new(0.0, 500.0), image(), &t).is_none());
        assert!(CoordinateMapper::new(container(), Size::default(), &t).is_none());
        assert!(FitTransform::compute(container(), Size::new(f32::NAN, 1.0)).is_none());
    }

    #[test]
    fn test_identity_maps_corners_to_fitted_box() {
        let m = CoordinateMapper::new(container(), image(), &TransformState::default()).unwrap();
        assert!(approx_eq(m.to_screen(Point::new(0.0, 0.0)), Point::new(10.0, 5.0)));
        assert!(approx_eq(
            m.to_screen(Point::new(200.0, 100.0)),
            Point::new(990.0, 495.0)
        ));
        assert!(approx_eq(m.to_model(Point::new(500.0, 250.0)), Point::new(100.0, 50.0)));
    }

    #[test]
    fn test_round_trip_over_all_orientations() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(123.5, 77.25),
            Point::new(-40.0, 600.0),
            Point::new(999.0, 1.0),
        ];
        let crops = [None, Some(Rect::new(20.0, 10.0, 100.0, 60.0))];
        for rotation in [
            Rotation::Deg0,
            Rotation::Deg90,
            Rotation::Deg180,
            Rotation::Deg270,
        ] {
            for (flip_x, flip_y) in [(false, false), (true, false), (false, true), (true, true)] {
                for crop in crops {
                    let t = TransformState {
                        scale: 2.5,
                        position: Point::new(-35.0, 12.0),
                        rotation,
                        flip_x,
                        flip_y,
                        source_crop: crop,
                    };
                    let m = CoordinateMapper::new(container(), image(), &t).unwrap();
                    for p in points {
                        assert!(approx_eq(m.to_screen(m.to_model(p)), p), "{t:?} {p:?}");
                        assert!(approx_eq(m.to_model(m.to_screen(p)), p), "{t:?} {p:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_rotation_about_display_center() {
        let t = TransformState {
            rotation: Rotation::Deg180,
            ..Default::default()
        };
        let m = CoordinateMapper::new(container(), image(), &t).unwrap();
        // Half-turn swaps opposite corners
        assert!(approx_eq(m.to_screen(Point::new(0.0, 0.0)), Point::new(990.0, 495.0)));
        // The center is a fixed point
        assert!(approx_eq(m.to_screen(Point::new(100.0, 50.0)), Point::new(500.0, 250.0)));
    }

    #[test]
    fn test_flip_x_mirrors_horizontally() {
        let t = TransformState {
            flip_x: true,
            ..Default::default()
        };
        let m = CoordinateMapper::new(container(), image(), &t).unwrap();
        assert!(approx_eq(m.to_screen(Point::new(0.0, 0.0)), Point::new(990.0, 5.0)));
    }

    #[test]
    fn test_crop_origin_is_folded_in() {
        let t = TransformState {
            source_crop: Some(Rect::new(50.0, 25.0, 100.0, 50.0)),
            ..Default::default()
        };
        let m = CoordinateMapper::new(container(), image(), &t).unwrap();
        // Cropped 100x50 region fits at 9.8x, crop's top-left is the fitted box's corner
        assert!(approx_eq(m.to_screen(Point::new(50.0, 25.0)), Point::new(10.0, 5.0)));
        assert_eq!(m.display_region(), Rect::new(50.0, 25.0, 100.0, 50.0));
    }

    #[test]
    fn test_affine_invert_singular() {
        assert!(Affine::scale(0.0, 1.0).invert().is_none());
        let a = Affine::translate(3.0, 4.0).then(&Affine::scale(2.0, 2.0));
        let inv = a.invert().unwrap();
        assert!(approx_eq(inv.apply(a.apply(Point::new(7.0, -2.0))), Point::new(7.0, -2.0)));
    }

    #[test]
    fn test_zoom_at_pointer_preserves_point_under_cursor() {
        let t = TransformState {
            scale: 1.5,
            position: Point::new(30.0, -20.0),
            ..Default::default()
        };
        let m = CoordinateMapper::new(container(), image(), &t).unwrap();
        let pointer = Point::new(640.0, 210.0);
        let before = m.to_model(pointer);

        let (scale, position) = m.zoom_at_pointer(&t, pointer, true, 1.1).unwrap();
        assert!((scale - 1.65).abs() < 1e-4);

        let zoomed = TransformState {
            scale,
            position,
            ..t
        };
        let m2 = CoordinateMapper::new(container(), image(), &zoomed).unwrap();
        assert!(approx_eq(m2.to_model(pointer), before));
    }

    #[test]
    fn test_zoom_at_pointer_clamps_at_max() {
        let t = TransformState {
            scale: zoom::MAX,
            ..Default::default()
        };
        let m = CoordinateMapper::new(container(), image(), &t).unwrap();
        assert!(m.zoom_at_pointer(&t, Point::new(1.0, 1.0), true, 1.1).is_none());
        let (scale, _) = m.zoom_at_pointer(&t, Point::new(1.0, 1.0), false, 1.1).unwrap();
        assert!(scale < zoom::MAX);
    }
}
