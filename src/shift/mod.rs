//! The three parameter geocentric datum shift: Geographic coordinates on the
//! source datum are converted to geocentric cartesian coordinates, translated
//! by a constant (dx, dy, dz), and converted back to geographic coordinates
//! on the target datum.
//!
//! The forward operations and the 3D inverse are closed form. The 2D inverse
//! is a fixed point iteration: Discarding the ellipsoidal height loses
//! information, so the direct algebraic inverse is refined until the forward
//! mapping of the guess reproduces the given target position.

use crate::coord::{Cartesian, Geographic};
use crate::ellipsoid::Ellipsoid;
use crate::{Direction, Error};
use log::warn;

/// Translation components smaller than this (i.e. smaller than a millimeter)
/// leave the shift a no-op, cf. [`DatumShift::is_null`]
const NULL_DELTA: f64 = 1e-3;

/// Default cap on the magnitude of each translation component, in meters.
/// Shifts between terrestrial datums are at most a few hundred meters, so a
/// kilometer-scale translation in a definition is almost certainly a typo.
pub const MAX_DELTA: f64 = 5000.0;

// ----- D E F I N I T I O N -----------------------------------------------------------

/// Selection of the squared eccentricity used on the target side of the shift
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TargetEccentricity {
    /// Each ellipsoid contributes its own squared eccentricity. The correct
    /// formula, and the default.
    #[default]
    Proper,
    /// Reproduce the historical defect where the target side squared
    /// eccentricity was computed as the product of the *source* and *target*
    /// eccentricities. Only useful for bit-for-bit comparison against data
    /// produced by implementations carrying that defect.
    Legacy,
}

/// Definition record for a three parameter datum shift. Mirrors the way
/// such shifts are published: two ellipsoids, three translation components,
/// and the tuning knobs of the 2D inverse iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DatumShiftDef {
    pub source: Ellipsoid,
    pub target: Ellipsoid,

    /// Geocentric translation, in meters
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,

    /// Per axis stop criterion for the 2D inverse iteration, in degrees
    pub convergence_tolerance: f64,
    /// Residuals beyond this (in degrees) turn an unconverged 2D inverse
    /// from a warning into an error
    pub error_tolerance: f64,
    /// Iteration cap for the 2D inverse. At least 1.
    pub max_iterations: u32,

    /// Largest acceptable magnitude of each translation component, in meters
    pub max_delta: f64,

    pub eccentricity: TargetEccentricity,
}

impl Default for DatumShiftDef {
    fn default() -> DatumShiftDef {
        DatumShiftDef {
            source: Ellipsoid::default(),
            target: Ellipsoid::default(),
            dx: 0.,
            dy: 0.,
            dz: 0.,
            convergence_tolerance: 1e-9,
            error_tolerance: 1e-6,
            max_iterations: 10,
            max_delta: MAX_DELTA,
            eccentricity: TargetEccentricity::default(),
        }
    }
}

// ----- T H E   S H I F T -------------------------------------------------------------

/// A validated, immutable three parameter datum shift. Plain `Copy` data
/// with no per-call state, so a single instance may serve any number of
/// threads and calls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DatumShift {
    source: Ellipsoid,
    /// The target ellipsoid with the eccentricity policy already applied
    target: Ellipsoid,
    delta: Cartesian,
    convergence_tolerance: f64,
    error_tolerance: f64,
    max_iterations: u32,
}

/// Result of the iterative 2D inverse shift
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Solution {
    /// Both axes within the convergence tolerance
    Converged(Geographic),
    /// The iteration cap was reached, but the residual (in degrees) is
    /// within the error tolerance: the value is usable, though not fully
    /// converged
    Unsettled(Geographic, f64),
}

impl Solution {
    /// The resulting coordinate, converged or not
    #[must_use]
    pub fn coordinate(&self) -> Geographic {
        match *self {
            Solution::Converged(coordinate) => coordinate,
            Solution::Unsettled(coordinate, _) => coordinate,
        }
    }

    #[must_use]
    pub fn converged(&self) -> bool {
        matches!(self, Solution::Converged(_))
    }
}

// ----- C O N S T R U C T O R S -------------------------------------------------------

impl DatumShift {
    pub fn new(def: DatumShiftDef) -> Result<DatumShift, Error> {
        if def.max_iterations < 1 {
            return Err(Error::BadParam(
                "max_iterations".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if !def.convergence_tolerance.is_finite() || def.convergence_tolerance <= 0. {
            return Err(Error::BadParam(
                "convergence_tolerance".to_string(),
                def.convergence_tolerance.to_string(),
            ));
        }
        if !def.error_tolerance.is_finite() || def.error_tolerance < 0. {
            return Err(Error::BadParam(
                "error_tolerance".to_string(),
                def.error_tolerance.to_string(),
            ));
        }
        if !def.max_delta.is_finite() || def.max_delta <= 0. {
            return Err(Error::BadParam(
                "max_delta".to_string(),
                def.max_delta.to_string(),
            ));
        }
        for (key, value) in [("dx", def.dx), ("dy", def.dy), ("dz", def.dz)] {
            if !value.is_finite() || value.abs() > def.max_delta {
                return Err(Error::BadParam(
                    key.to_string(),
                    format!("{value} exceeds the delta limit {}", def.max_delta),
                ));
            }
        }

        let target = match def.eccentricity {
            TargetEccentricity::Proper => def.target,
            // The historical cross product: e_src·e_tgt in place of e_tgt²
            TargetEccentricity::Legacy => def.target.with_eccentricity_squared(
                (def.source.eccentricity_squared() * def.target.eccentricity_squared()).sqrt(),
            )?,
        };

        Ok(DatumShift {
            source: def.source,
            target,
            delta: Cartesian::new(def.dx, def.dy, def.dz),
            convergence_tolerance: def.convergence_tolerance,
            error_tolerance: def.error_tolerance,
            max_iterations: def.max_iterations,
        })
    }

    /// Shorthand for the common case: two ellipsoids, three translation
    /// components, and default iteration tuning
    pub fn between(
        source: Ellipsoid,
        target: Ellipsoid,
        dx: f64,
        dy: f64,
        dz: f64,
    ) -> Result<DatumShift, Error> {
        DatumShift::new(DatumShiftDef {
            source,
            target,
            dx,
            dy,
            dz,
            ..DatumShiftDef::default()
        })
    }

    /// The geocentric translation, in meters
    #[must_use]
    pub fn delta(&self) -> Cartesian {
        self.delta
    }

    /// True iff all translation components are below a millimeter, i.e. the
    /// shift is a no-op within sub-millimeter tolerance. Lets callers elide
    /// the transform entirely.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.delta.x.abs() < NULL_DELTA
            && self.delta.y.abs() < NULL_DELTA
            && self.delta.z.abs() < NULL_DELTA
    }
}

// ----- F O R W A R D -----------------------------------------------------------------

impl DatumShift {
    /// The full 3D shift: source geographic -> geocentric, translate,
    /// geocentric -> target geographic
    pub fn forward(&self, coordinate: &Geographic) -> Result<Geographic, Error> {
        let xyz = self.source.cartesian(coordinate)?;
        self.target.geographic(&(xyz + self.delta))
    }

    /// The 2D shift: as [`forward`](Self::forward), with the height forced
    /// to zero on input and discarded on output
    pub fn forward_2d(&self, coordinate: &Geographic) -> Result<Geographic, Error> {
        Ok(self.forward(&coordinate.flattened())?.flattened())
    }
}

// ----- I N V E R S E -----------------------------------------------------------------

impl DatumShift {
    /// The direct, non-iterative 3D inverse: target geographic -> geocentric,
    /// translate back, geocentric -> source geographic.
    ///
    /// Strictly speaking an approximation - the translation determined in the
    /// source frame is undone in the target frame - but for the sub-kilometer
    /// translations relating terrestrial datums, the discrepancy is far below
    /// the accuracy of any three parameter shift.
    pub fn inverse(&self, coordinate: &Geographic) -> Result<Geographic, Error> {
        let xyz = self.target.cartesian(coordinate)?;
        self.source.geographic(&(xyz - self.delta))
    }

    /// The iterative 2D inverse: refine an initial guess until its forward
    /// 2D shift reproduces `coordinate`, counteracting the information loss
    /// from the discarded height.
    ///
    /// Converges in a handful of iterations for any sane definition. If the
    /// iteration cap is reached, the size of the residual decides between a
    /// usable-but-unconverged [`Solution::Unsettled`] (logged as a warning)
    /// and a fatal [`Error::Divergence`], which still carries the last guess.
    pub fn inverse_2d(&self, coordinate: &Geographic) -> Result<Solution, Error> {
        let target = coordinate.flattened();
        let mut guess = target;
        let mut residual = f64::INFINITY;

        for _ in 0..self.max_iterations {
            let predicted = self.forward_2d(&guess)?;
            let epsilon_lng = target.longitude - predicted.longitude;
            let epsilon_lat = target.latitude - predicted.latitude;
            residual = epsilon_lng.abs().max(epsilon_lat.abs());

            // Adjust each axis independently, leaving settled axes alone
            let mut settled = true;
            if epsilon_lng.abs() > self.convergence_tolerance {
                guess.longitude += epsilon_lng;
                settled = false;
            }
            if epsilon_lat.abs() > self.convergence_tolerance {
                guess.latitude += epsilon_lat;
                settled = false;
            }
            if settled {
                return Ok(Solution::Converged(guess));
            }
        }

        if residual > self.error_tolerance {
            return Err(Error::Divergence {
                last: guess,
                residual,
                iterations: self.max_iterations,
            });
        }

        warn!(
            "inverse datum shift unconverged after {} iterations (residual {:.3e} degrees)",
            self.max_iterations, residual
        );
        Ok(Solution::Unsettled(guess, residual))
    }
}

// ----- T H E   R E G I S T R Y   S E A M ---------------------------------------------

/// The surface a polymorphic transformation registry wraps: one entry point
/// per dimensionality, direction selected by a [`Direction`] argument.
pub trait Transformation {
    fn apply(&self, coordinate: &Geographic, direction: Direction) -> Result<Geographic, Error>;
    fn apply_2d(&self, coordinate: &Geographic, direction: Direction) -> Result<Solution, Error>;
}

impl Transformation for DatumShift {
    fn apply(&self, coordinate: &Geographic, direction: Direction) -> Result<Geographic, Error> {
        match direction {
            Direction::Fwd => self.forward(coordinate),
            Direction::Inv => self.inverse(coordinate),
        }
    }

    fn apply_2d(&self, coordinate: &Geographic, direction: Direction) -> Result<Solution, Error> {
        match direction {
            Direction::Fwd => Ok(Solution::Converged(self.forward_2d(coordinate)?)),
            Direction::Inv => self.inverse_2d(coordinate),
        }
    }
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::angular;

    // WGS84 -> ED50 style translation, constants from the EPSG:1134
    // three parameter transformation (sign swapped: EPSG gives ED50 -> WGS84)
    fn wgs84_to_ed50() -> Result<DatumShift, Error> {
        DatumShift::between(
            Ellipsoid::named("WGS84")?,
            Ellipsoid::named("intl")?,
            87.,
            96.,
            120.,
        )
    }

    #[test]
    fn null_transform_roundtrip() -> Result<(), Error> {
        let ellps = Ellipsoid::named("GRS80")?;
        let shift = DatumShift::between(ellps, ellps, 0., 0., 0.)?;
        assert!(shift.is_null());

        let geo = Geographic::geo(55., 12., 100.);
        let fwd = shift.forward(&geo)?;
        assert!(geo.hypot2(&fwd) < 1e-9);
        assert!((geo.height - fwd.height).abs() < 1e-8);

        let fwd = shift.forward_2d(&geo)?;
        assert!(geo.hypot2(&fwd) < 1e-9);
        assert_eq!(fwd.height, 0.);
        Ok(())
    }

    #[test]
    fn is_null_boundary() -> Result<(), Error> {
        let ellps = Ellipsoid::default();
        // The boundary sits at a fixed millimeter epsilon
        assert!(DatumShift::between(ellps, ellps, 0.0009, 0., 0.)?.is_null());
        assert!(!DatumShift::between(ellps, ellps, 0.0011, 0., 0.)?.is_null());
        Ok(())
    }

    #[test]
    fn forward_inverse_consistency() -> Result<(), Error> {
        // Small translation relative to the Earth scale radii
        let shift = DatumShift::between(
            Ellipsoid::named("WGS84")?,
            Ellipsoid::named("intl")?,
            85.,
            96.,
            -117.,
        )?;

        let geo = Geographic::geo(53.8, 2.13, 73.);
        let there = shift.forward(&geo)?;

        // The shift does move the point: on the order of 100-200 m,
        // i.e. around 1e-3 degrees
        assert!(geo.hypot2(&there) > 1e-4);
        assert!(geo.hypot2(&there) < 1e-2);

        // The 3D inverse is documented as approximate. For translations of
        // this size the roundtrip discrepancy is still far below the
        // accuracy of the shift itself, so assert a bounded error rather
        // than equality.
        let back = shift.inverse(&there)?;
        assert!(geo.hypot2(&back) < 1e-7);
        assert!((geo.height - back.height).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn forward_2d_reuses_forward() -> Result<(), Error> {
        let shift = wgs84_to_ed50()?;
        let geo = Geographic::geo(55., 12., 1234.);
        let full = shift.forward(&geo.flattened())?;
        let flat = shift.forward_2d(&geo)?;
        assert_eq!(full.longitude, flat.longitude);
        assert_eq!(full.latitude, flat.latitude);
        assert_eq!(flat.height, 0.);
        Ok(())
    }

    #[test]
    fn inverse_2d_converges() -> Result<(), Error> {
        let shift = wgs84_to_ed50()?;
        let lat = angular::dms_to_dd(53, 48, 33.82);
        let lon = angular::dms_to_dd(2, 7, 46.38);
        let target = shift.forward_2d(&Geographic::geo(lat, lon, 0.))?;

        let solution = shift.inverse_2d(&target)?;
        assert!(solution.converged());

        // The refined guess reproduces the target position to within the
        // convergence tolerance on each axis
        let roundtrip = shift.forward_2d(&solution.coordinate())?;
        assert!((roundtrip.longitude - target.longitude).abs() <= 1e-9);
        assert!((roundtrip.latitude - target.latitude).abs() <= 1e-9);

        // ... and lands next to the original position
        assert!(solution.coordinate().hypot2(&Geographic::geo(lat, lon, 0.)) < 1e-7);
        Ok(())
    }

    #[test]
    fn monotonic_iteration() -> Result<(), Error> {
        // Regression guard for the update rule: replay the fixed point
        // iteration through the public forward operation, and check that
        // the residuals never grow
        let shift = wgs84_to_ed50()?;
        let target = Geographic::geo(53.8, 2.13, 0.);

        let mut guess = target;
        let mut residuals = Vec::new();
        for _ in 0..5 {
            let predicted = shift.forward_2d(&guess)?;
            let epsilon_lng = target.longitude - predicted.longitude;
            let epsilon_lat = target.latitude - predicted.latitude;
            residuals.push(epsilon_lng.abs().max(epsilon_lat.abs()));
            guess.longitude += epsilon_lng;
            guess.latitude += epsilon_lat;
        }
        for pair in residuals.windows(2) {
            // Below a picodegree we are at the floating point noise floor,
            // where the residuals may jitter
            if pair[0] > 1e-12 {
                assert!(pair[1] <= pair[0]);
            }
        }
        // And the endgame residual is tiny indeed
        assert!(residuals[4] < 1e-9);
        Ok(())
    }

    #[test]
    fn non_convergence_classification() -> Result<(), Error> {
        // One iteration cannot absorb a 4 km translation, so the 2D inverse
        // must report its failure to converge - never a silent "ok"
        let def = DatumShiftDef {
            source: Ellipsoid::named("WGS84")?,
            target: Ellipsoid::named("intl")?,
            dx: 4000.,
            max_iterations: 1,
            ..DatumShiftDef::default()
        };

        // With the default (tight) error tolerance, the residual is fatal
        let shift = DatumShift::new(def)?;
        let target = Geographic::geo(55., 12., 0.);
        match shift.inverse_2d(&target) {
            Err(Error::Divergence {
                last,
                residual,
                iterations,
            }) => {
                assert!(residual > 1e-6);
                assert_eq!(iterations, 1);
                // The last guess is still carried along
                assert!(last.is_finite());
            }
            other => panic!("expected divergence, got {other:?}"),
        }

        // With a tolerant error threshold, the same residual is just a warning
        let shift = DatumShift::new(DatumShiftDef {
            error_tolerance: 1.,
            ..def
        })?;
        match shift.inverse_2d(&target)? {
            Solution::Unsettled(coordinate, residual) => {
                assert!(residual > 1e-6);
                assert!(residual <= 1.);
                assert!(coordinate.is_finite());
            }
            other => panic!("expected an unsettled solution, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn error_propagation() -> Result<(), Error> {
        let shift = wgs84_to_ed50()?;
        let out_of_range = Geographic::geo(95., 12., 0.);
        assert!(matches!(
            shift.forward(&out_of_range),
            Err(Error::OutsideDomain(_))
        ));
        assert!(matches!(
            shift.inverse(&out_of_range),
            Err(Error::OutsideDomain(_))
        ));
        // The iteration aborts on the first geodetic failure
        assert!(matches!(
            shift.inverse_2d(&out_of_range),
            Err(Error::OutsideDomain(_))
        ));
        Ok(())
    }

    #[test]
    fn legacy_eccentricity() -> Result<(), Error> {
        let def = DatumShiftDef {
            source: Ellipsoid::named("WGS84")?,
            target: Ellipsoid::named("intl")?,
            dx: 87.,
            dy: 96.,
            dz: 120.,
            ..DatumShiftDef::default()
        };
        let proper = DatumShift::new(def)?;
        let legacy = DatumShift::new(DatumShiftDef {
            eccentricity: TargetEccentricity::Legacy,
            ..def
        })?;

        // With distinct ellipsoids, the historical cross product produces
        // a (slightly) different result than the correct formula
        let geo = Geographic::geo(55., 12., 0.);
        let a = proper.forward(&geo)?;
        let b = legacy.forward(&geo)?;
        assert!(a.hypot2(&b) > 0.);
        assert!(a.hypot2(&b) < 1e-3);

        // With identical ellipsoids the cross product degenerates to the
        // proper squared eccentricity
        let def = DatumShiftDef {
            source: Ellipsoid::named("WGS84")?,
            target: Ellipsoid::named("WGS84")?,
            dx: 87.,
            ..DatumShiftDef::default()
        };
        let proper = DatumShift::new(def)?;
        let legacy = DatumShift::new(DatumShiftDef {
            eccentricity: TargetEccentricity::Legacy,
            ..def
        })?;
        let a = proper.forward(&geo)?;
        let b = legacy.forward(&geo)?;
        assert!(a.hypot2(&b) < 1e-12);
        Ok(())
    }

    #[test]
    fn validation() -> Result<(), Error> {
        let def = DatumShiftDef {
            max_iterations: 0,
            ..DatumShiftDef::default()
        };
        assert!(matches!(DatumShift::new(def), Err(Error::BadParam(_, _))));

        // A definition with a 6 km translation is rejected by the default
        // delta limit, but accepted when the limit is raised explicitly
        let def = DatumShiftDef {
            dx: 6000.,
            ..DatumShiftDef::default()
        };
        assert!(matches!(DatumShift::new(def), Err(Error::BadParam(_, _))));
        let def = DatumShiftDef {
            dx: 6000.,
            max_delta: 10_000.,
            ..DatumShiftDef::default()
        };
        assert_eq!(DatumShift::new(def)?.delta(), Cartesian::new(6000., 0., 0.));

        let def = DatumShiftDef {
            convergence_tolerance: 0.,
            ..DatumShiftDef::default()
        };
        assert!(matches!(DatumShift::new(def), Err(Error::BadParam(_, _))));
        Ok(())
    }

    #[test]
    fn registry_seam() -> Result<(), Error> {
        let shift = wgs84_to_ed50()?;
        let geo = Geographic::geo(55., 12., 0.);

        let fwd = shift.apply(&geo, Direction::Fwd)?;
        assert_eq!(fwd, shift.forward(&geo)?);
        let inv = shift.apply(&fwd, Direction::Inv)?;
        assert_eq!(inv, shift.inverse(&fwd)?);

        let fwd2 = shift.apply_2d(&geo, Direction::Fwd)?;
        assert!(fwd2.converged());
        let inv2 = shift.apply_2d(&fwd2.coordinate(), Direction::Inv)?;
        assert!(inv2.converged());
        assert!(inv2.coordinate().hypot2(&geo) < 1e-8);
        Ok(())
    }
}
