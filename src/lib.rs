//! *Three parameter geocentric datum shifts between reference ellipsoids.*
//!
//! A datum shift of this kind relates two ellipsoidal datums through a
//! constant translation in the geocentric cartesian space: Geographic
//! coordinates on the source datum are converted to geocentric (X, Y, Z),
//! translated by (dx, dy, dz), and converted back to geographic coordinates
//! on the target datum.
//!
//! The crate provides the forward and inverse transformations in both their
//! 3D and 2D forms. The 2D inverse is an iterative refinement, since
//! discarding the ellipsoidal height loses information that the direct
//! algebraic inverse cannot recover.
//!
//! ```
//! use geoshift::prelude::*;
//!
//! fn main() -> Result<(), Error> {
//!     let shift = DatumShift::between(
//!         Ellipsoid::named("WGS84")?,
//!         Ellipsoid::named("intl")?,
//!         84.87, 96.49, 116.95,
//!     )?;
//!
//!     let copenhagen = Geographic::geo(55., 12., 0.);
//!     let shifted = shift.forward(&copenhagen)?;
//!     let back = shift.inverse(&shifted)?;
//!     assert!(copenhagen.hypot2(&back) < 1e-9);
//!     Ok(())
//! }
//! ```

mod coord;
mod ellipsoid;
pub mod math;
mod shift;

pub use crate::coord::Cartesian;
pub use crate::coord::Geographic;
pub use crate::ellipsoid::Ellipsoid;
pub use crate::shift::DatumShift;
pub use crate::shift::DatumShiftDef;
pub use crate::shift::Solution;
pub use crate::shift::TargetEccentricity;
pub use crate::shift::Transformation;

/// The bread-and-butter, re-exported in one go
pub mod prelude {
    pub use crate::Cartesian;
    pub use crate::DatumShift;
    pub use crate::DatumShiftDef;
    pub use crate::Direction;
    pub use crate::Direction::Fwd;
    pub use crate::Direction::Inv;
    pub use crate::Ellipsoid;
    pub use crate::Error;
    pub use crate::Geographic;
    pub use crate::Solution;
    pub use crate::TargetEccentricity;
    pub use crate::Transformation;
}

/// `Fwd`: Indicate that a two-way transformation should run in the
/// *forward* direction.
/// `Inv`: Indicate that it should run in the *inverse* direction.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Direction {
    Fwd,
    Inv,
}

pub use Direction::Fwd;
pub use Direction::Inv;

/// The grand, crate-wide error type
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum Error {
    #[error("malformed ellipsoid: {0}")]
    BadEllipsoid(String),

    #[error("malformed value for parameter {0}: {1}")]
    BadParam(String, String),

    #[error("ellipsoid {0} not found")]
    NotFound(String),

    /// Geodetic conversion failure: the coordinate cannot be represented
    /// on (or converted to) the given ellipsoid.
    #[error("coordinate outside the geodetic domain: {0}")]
    OutsideDomain(String),

    /// The 2D inverse iteration ran out of iterations with a residual
    /// exceeding the error tolerance. The last guess is still carried
    /// along, for callers willing to use an unreliable value.
    #[error("no convergence after {iterations} iterations: residual {residual:.3e} degrees")]
    Divergence {
        last: Geographic,
        residual: f64,
        iterations: u32,
    },
}
