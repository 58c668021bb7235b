//! EXIF orientation handling.
//!
//! Cameras store pixels in sensor order and record how the device was held
//! in the EXIF orientation tag (values 1-8). The pipeline normalizes every
//! photo to upright before it reaches the model, so the tag is read here and
//! resolved into either an affine description of the correction or the
//! concrete rotate/flip ops that perform it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{In, Reader, Tag, Value};
use image::DynamicImage;

/// One of the eight standard rotation/mirror states an image can be stored
/// in. Variants are named after what the stored pixels look like when
/// displayed without correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// EXIF 1: already upright
    #[default]
    Upright,
    /// EXIF 2: upright, mirrored across the vertical axis
    UprightMirrored,
    /// EXIF 3: rotated 180 degrees
    UpsideDown,
    /// EXIF 4: rotated 180 degrees and mirrored (flipped vertically)
    UpsideDownMirrored,
    /// EXIF 5: on its side, mirrored (transposed across the main diagonal)
    RotatedLeftMirrored,
    /// EXIF 6: rotated 90 degrees counter-clockwise in storage
    RotatedLeft,
    /// EXIF 7: on its side, mirrored (transposed across the anti-diagonal)
    RotatedRightMirrored,
    /// EXIF 8: rotated 90 degrees clockwise in storage
    RotatedRight,
}

impl Orientation {
    /// Map a raw EXIF orientation value (1-8) to its tag.
    ///
    /// Out-of-range values read as upright; files without the tag behave the
    /// same way.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Self::UprightMirrored,
            3 => Self::UpsideDown,
            4 => Self::UpsideDownMirrored,
            5 => Self::RotatedLeftMirrored,
            6 => Self::RotatedLeft,
            7 => Self::RotatedRightMirrored,
            8 => Self::RotatedRight,
            _ => Self::Upright,
        }
    }

    /// Read the orientation tag from an image file.
    ///
    /// Intentionally lenient: any read or parse failure yields `Upright`
    /// rather than an error, matching how viewers treat missing EXIF.
    pub fn read_from(path: &Path) -> Self {
        let Ok(file) = File::open(path) else {
            return Self::Upright;
        };
        let mut reader = BufReader::new(file);
        let Ok(exif) = Reader::new().read_from_container(&mut reader) else {
            return Self::Upright;
        };

        exif.get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Short(v) => v.first().map(|&x| Self::from_exif(x as u32)),
                Value::Long(v) => v.first().map(|&x| Self::from_exif(x)),
                _ => None,
            })
            .unwrap_or(Self::Upright)
    }

    /// The affine transform that presents a stored image upright, expressed
    /// over normalized `[0,1]` coordinates of the stored frame.
    ///
    /// The upright case is an explicit identity, not a degenerate rotation.
    pub fn upright_transform(self) -> AffineTransform {
        match self {
            Self::Upright => AffineTransform::IDENTITY,
            // (x, y) -> (1 - x, y)
            Self::UprightMirrored => AffineTransform::new(-1.0, 0.0, 0.0, 1.0, 1.0, 0.0),
            // (x, y) -> (1 - x, 1 - y)
            Self::UpsideDown => AffineTransform::new(-1.0, 0.0, 0.0, -1.0, 1.0, 1.0),
            // (x, y) -> (x, 1 - y)
            Self::UpsideDownMirrored => AffineTransform::new(1.0, 0.0, 0.0, -1.0, 0.0, 0.0)
                .translated(0.0, 1.0),
            // (x, y) -> (y, x)
            Self::RotatedLeftMirrored => AffineTransform::new(0.0, 1.0, 1.0, 0.0, 0.0, 0.0),
            // (x, y) -> (1 - y, x)
            Self::RotatedLeft => AffineTransform::new(0.0, 1.0, -1.0, 0.0, 1.0, 0.0),
            // (x, y) -> (1 - y, 1 - x)
            Self::RotatedRightMirrored => AffineTransform::new(0.0, -1.0, -1.0, 0.0, 1.0, 1.0),
            // (x, y) -> (y, 1 - x)
            Self::RotatedRight => AffineTransform::new(0.0, -1.0, 1.0, 0.0, 0.0, 1.0),
        }
    }

    /// Whether correcting this orientation swaps width and height.
    pub fn transposes(self) -> bool {
        matches!(
            self,
            Self::RotatedLeft
                | Self::RotatedRight
                | Self::RotatedLeftMirrored
                | Self::RotatedRightMirrored
        )
    }

    /// Apply the upright correction to a decoded image.
    ///
    /// Performs the same mapping as [`Orientation::upright_transform`]
    /// through concrete rotate/flip ops.
    pub fn correct(self, image: &DynamicImage) -> DynamicImage {
        match self {
            Self::Upright => image.clone(),
            Self::UprightMirrored => image.fliph(),
            Self::UpsideDown => image.rotate180(),
            Self::UpsideDownMirrored => image.flipv(),
            Self::RotatedLeftMirrored => image.rotate90().fliph(),
            Self::RotatedLeft => image.rotate90(),
            Self::RotatedRightMirrored => image.rotate270().fliph(),
            Self::RotatedRight => image.rotate270(),
        }
    }

    /// All eight orientation tags, in EXIF order.
    pub const ALL: [Orientation; 8] = [
        Self::Upright,
        Self::UprightMirrored,
        Self::UpsideDown,
        Self::UpsideDownMirrored,
        Self::RotatedLeftMirrored,
        Self::RotatedLeft,
        Self::RotatedRightMirrored,
        Self::RotatedRight,
    ];
}

/// A 2D affine transform `(x, y) -> (a*x + c*y + tx, b*x + d*y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl AffineTransform {
    /// The identity transform: no rotation, no mirroring, no translation.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Construct a transform from its matrix entries.
    pub fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// Shift the transform's output by `(tx, ty)`.
    pub fn translated(self, tx: f32, ty: f32) -> Self {
        Self {
            tx: self.tx + tx,
            ty: self.ty + ty,
            ..self
        }
    }

    /// Map a point through the transform.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    /// Whether this is exactly the identity transform.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}
