mod cartesians;

use crate::Error;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Representation of a biaxial reference ellipsoid, reduced to the two
/// parameters the geocentric conversions consume: the semimajor axis *a*
/// and the squared eccentricity *e²*.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    a: f64,
    es: f64,
}

/// GRS80 is the default ellipsoid.
impl Default for Ellipsoid {
    fn default() -> Ellipsoid {
        BUILTIN_ELLIPSOIDS["GRS80"]
    }
}

// The builtin ellipsoids, given by semimajor axis and inverse flattening
#[rustfmt::skip]
static BUILTIN_ELLIPSOIDS: Lazy<BTreeMap<&'static str, Ellipsoid>> = Lazy::new(|| {
    BTreeMap::from([
        ("GRS80",   from_rf(6_378_137.0,   298.257_222_100_882_7)),
        ("WGS84",   from_rf(6_378_137.0,   298.257_223_563)),
        ("intl",    from_rf(6_378_388.0,   297.0)),
        ("Helmert", from_rf(6_378_200.0,   298.3)),
        ("clrk66",  from_rf(6_378_206.4,   294.978_698_2)),
        ("clrk80",  from_rf(6_378_249.145, 293.465)),
        ("bessel",  from_rf(6_377_397.155, 299.152_812_8)),
    ])
});

// Infallible companion to `Ellipsoid::from_flattening`, for the builtin
// table, where all parameters are known-good
fn from_rf(semimajor_axis: f64, inverse_flattening: f64) -> Ellipsoid {
    let f = 1. / inverse_flattening;
    Ellipsoid {
        a: semimajor_axis,
        es: f * (2. - f),
    }
}

impl Ellipsoid {
    /// User defined ellipsoid, given by semimajor axis and squared eccentricity
    pub fn new(semimajor_axis: f64, eccentricity_squared: f64) -> Result<Ellipsoid, Error> {
        if !semimajor_axis.is_finite() || semimajor_axis <= 0. {
            return Err(Error::BadEllipsoid(format!(
                "semimajor axis {semimajor_axis} must be positive"
            )));
        }
        if !eccentricity_squared.is_finite() || !(0. ..1.).contains(&eccentricity_squared) {
            return Err(Error::BadEllipsoid(format!(
                "squared eccentricity {eccentricity_squared} must be in [0, 1)"
            )));
        }
        Ok(Ellipsoid {
            a: semimajor_axis,
            es: eccentricity_squared,
        })
    }

    /// User defined ellipsoid, given by semimajor axis and flattening,
    /// the parameter pair most published datum definitions use
    pub fn from_flattening(semimajor_axis: f64, flattening: f64) -> Result<Ellipsoid, Error> {
        if !flattening.is_finite() || !(0. ..1.).contains(&flattening) {
            return Err(Error::BadEllipsoid(format!(
                "flattening {flattening} must be in [0, 1)"
            )));
        }
        Ellipsoid::new(semimajor_axis, flattening * (2. - flattening))
    }

    /// Predefined ellipsoid, from the builtin table
    pub fn named(name: &str) -> Result<Ellipsoid, Error> {
        BUILTIN_ELLIPSOIDS
            .get(name)
            .copied()
            .ok_or_else(|| Error::NotFound(String::from(name)))
    }

    /// An ellipsoid sharing this one's semimajor axis, but with another
    /// squared eccentricity. Carrier for the legacy cross product
    /// eccentricity of [`TargetEccentricity::Legacy`](crate::TargetEccentricity)
    pub fn with_eccentricity_squared(&self, eccentricity_squared: f64) -> Result<Ellipsoid, Error> {
        Ellipsoid::new(self.a, eccentricity_squared)
    }

    // ----- Shape and size ---------------------------------------------------------

    /// The semimajor axis, *a*
    #[must_use]
    pub fn semimajor_axis(&self) -> f64 {
        self.a
    }

    /// The semiminor axis, *b = a·sqrt(1 - e²)*
    #[must_use]
    pub fn semiminor_axis(&self) -> f64 {
        self.a * (1.0 - self.es).sqrt()
    }

    /// The squared eccentricity *e² = (a² - b²) / a²*
    #[must_use]
    pub fn eccentricity_squared(&self) -> f64 {
        self.es
    }

    /// The eccentricity *e*
    #[must_use]
    pub fn eccentricity(&self) -> f64 {
        self.es.sqrt()
    }

    /// The squared second eccentricity *e'² = (a² - b²) / b² = e² / (1 - e²)*
    #[must_use]
    pub fn second_eccentricity_squared(&self) -> f64 {
        self.es / (1.0 - self.es)
    }

    // ----- Curvatures -------------------------------------------------------------

    /// The radius of curvature in the prime vertical, *N*.
    /// The latitude is given in radians.
    #[must_use]
    pub fn prime_vertical_radius_of_curvature(&self, latitude: f64) -> f64 {
        if self.es == 0.0 {
            return self.a;
        }
        self.a / (1.0 - latitude.sin().powi(2) * self.es).sqrt()
    }
}

// ----- T E S T S ---------------------------------------------------------------------
