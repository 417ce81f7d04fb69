use std::fmt;
use std::ops::{Add, Sub};

/// Geographic coordinate: longitude and latitude in degrees, ellipsoidal
/// height in meters. Angular values are kept in degrees all the way to the
/// conversion routines, which handle the radian business internally.
#[derive(Debug, Default, PartialEq, Copy, Clone)]
pub struct Geographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

// ----- C O N S T R U C T O R S ---------------------------------------------

impl Geographic {
    /// A `Geographic` from latitude/longitude/height - the axis order used
    /// in most printed sources (surveyor convention)
    #[must_use]
    pub fn geo(latitude: f64, longitude: f64, height: f64) -> Geographic {
        Geographic {
            longitude,
            latitude,
            height,
        }
    }

    /// A `Geographic` from longitude/latitude/height - the axis order used
    /// in most GIS software
    #[must_use]
    pub fn gis(longitude: f64, latitude: f64, height: f64) -> Geographic {
        Geographic {
            longitude,
            latitude,
            height,
        }
    }

    /// A `Geographic` from its raw components, in the internal
    /// longitude/latitude/height order
    #[must_use]
    pub fn raw(longitude: f64, latitude: f64, height: f64) -> Geographic {
        Geographic {
            longitude,
            latitude,
            height,
        }
    }

    /// A `Geographic` consisting of 3 `NaN`s
    #[must_use]
    pub fn nan() -> Geographic {
        Geographic {
            longitude: f64::NAN,
            latitude: f64::NAN,
            height: f64::NAN,
        }
    }

    /// A `Geographic` consisting of 3 `0`s
    #[must_use]
    pub fn origin() -> Geographic {
        Geographic::default()
    }

    /// The same horizontal position, with the height forced to zero.
    /// The workhorse of the 2D variants of the datum shift.
    #[must_use]
    pub fn flattened(&self) -> Geographic {
        Geographic {
            height: 0.,
            ..*self
        }
    }

    /// Euclidean distance between the two horizontal positions, in degrees.
    /// Not a distance in the real world, but exactly what is needed for
    /// convergence checks and test assertions.
    #[must_use]
    pub fn hypot2(&self, other: &Self) -> f64 {
        (self.longitude - other.longitude).hypot(self.latitude - other.latitude)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite() && self.height.is_finite()
    }
}

impl fmt::Display for Geographic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.10} {:.10} {:.5}",
            self.longitude, self.latitude, self.height
        )
    }
}

/// Geocentric cartesian coordinate: X, Y, Z in meters, origin at the
/// ellipsoid's center of mass. The intermediate representation of the
/// datum shift.
#[derive(Debug, Default, PartialEq, Copy, Clone)]
pub struct Cartesian {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// ----- O P E R A T O R   T R A I T S ---------------------------------------

impl Add for Cartesian {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Cartesian {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Cartesian {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Cartesian {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Cartesian {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Cartesian {
        Cartesian { x, y, z }
    }

    /// A `Cartesian` consisting of 3 `0`s
    #[must_use]
    pub fn origin() -> Cartesian {
        Cartesian::default()
    }

    /// Euclidean distance between two points in the 3D space, in meters
    #[must_use]
    pub fn hypot3(&self, other: &Self) -> f64 {
        (self.x - other.x)
            .hypot(self.y - other.y)
            .hypot(self.z - other.z)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ----- T E S T S -----------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_order() {
        let geo = Geographic::geo(55., 12., 0.);
        let gis = Geographic::gis(12., 55., 0.);
        assert_eq!(geo, gis);
        assert_eq!(geo.longitude, 12.);
        assert_eq!(geo.latitude, 55.);

        // `raw` takes the components in the internal order, i.e. as `gis`
        let raw = Geographic::raw(12., 55., 0.);
        assert_eq!(raw, gis);
    }

    #[test]
    fn arithmetic() {
        let a = Cartesian::new(1., 2., 3.);
        let b = Cartesian::new(4., 3., 2.);
        assert_eq!(a + b, Cartesian::new(5., 5., 5.));
        assert_eq!((a + b) - b, a);
        assert_eq!(Cartesian::origin().hypot3(&Cartesian::new(3., 4., 0.)), 5.);
    }

    #[test]
    fn flattened() {
        let geo = Geographic::geo(55., 12., 100.);
        let flat = geo.flattened();
        assert_eq!(flat.height, 0.);
        assert_eq!(geo.hypot2(&flat), 0.);
        assert!(Geographic::nan().hypot2(&geo).is_nan());
    }
}
