use super::Ellipsoid;
use crate::coord::{Cartesian, Geographic};
use crate::Error;
use std::f64::consts::FRAC_PI_2;

impl Ellipsoid {
    // ----- Geographic <--> Cartesian conversion ----------------------------------

    /// Geographic to geocentric cartesian conversion.
    ///
    /// Input angles in degrees, heights and output in the unit of the
    /// semimajor axis (meters, for any sane ellipsoid definition).
    #[allow(non_snake_case)] // make it possible to mimic math notation from the original papers
    pub fn cartesian(&self, geographic: &Geographic) -> Result<Cartesian, Error> {
        if !geographic.is_finite() {
            return Err(Error::OutsideDomain(format!(
                "non-finite geographic coordinate {geographic:?}"
            )));
        }
        if geographic.latitude.abs() > 90. {
            return Err(Error::OutsideDomain(format!(
                "latitude {} outside [-90, 90]",
                geographic.latitude
            )));
        }

        let lam = geographic.longitude.to_radians();
        let phi = geographic.latitude.to_radians();
        let h = geographic.height;

        let N = self.prime_vertical_radius_of_curvature(phi);
        let (sinphi, cosphi) = phi.sin_cos();
        let (sinlam, coslam) = lam.sin_cos();

        let X = (N + h) * cosphi * coslam;
        let Y = (N + h) * cosphi * sinlam;
        let Z = (N * (1.0 - self.eccentricity_squared()) + h) * sinphi;

        Ok(Cartesian::new(X, Y, Z))
    }

    /// Geocentric cartesian to geographic conversion.
    ///
    /// Closed form, following the derivation given by Bowring (1976, 1985):
    /// *Transformation from spatial to geographical coordinates*, Survey
    /// Review 23(181), and *The accuracy of geodetic latitude and height
    /// equations*, Survey Review 28(218).
    #[allow(non_snake_case)] // ditto
    pub fn geographic(&self, cartesian: &Cartesian) -> Result<Geographic, Error> {
        if !cartesian.is_finite() {
            return Err(Error::OutsideDomain(format!(
                "non-finite cartesian coordinate {cartesian:?}"
            )));
        }

        let X = cartesian.x;
        let Y = cartesian.y;
        let Z = cartesian.z;

        // We need a few additional ellipsoidal parameters
        let a = self.semimajor_axis();
        let b = self.semiminor_axis();
        let es = self.eccentricity_squared();
        let eps = self.second_eccentricity_squared();

        // The longitude is straightforward
        let lam = Y.atan2(X);

        // The perpendicular distance from the point coordinate to the Z-axis
        let p = X.hypot(Y);

        // For p < 1 picometer, we simplify things to avoid numerical havoc.
        if p < 1.0e-12 {
            // The sign of Z determines the hemisphere
            let phi = FRAC_PI_2.copysign(Z);
            // We have forced phi to one of the poles, so the height is |Z| - b
            let h = Z.abs() - b;
            return Ok(Geographic::gis(lam.to_degrees(), phi.to_degrees(), h));
        }

        // Bowring's auxiliary angle theta, computed without trigonometrics,
        // following Fukushima (1999), Appendix B
        let T = (Z * a) / (p * b);
        let c = 1.0 / (1.0 + T * T).sqrt();
        let s = c * T;

        let phi_num = Z + eps * b * s.powi(3);
        let phi_denom = p - es * a * c.powi(3);
        let phi = phi_num.atan2(phi_denom);

        let lenphi = phi_num.hypot(phi_denom);
        let sinphi = phi_num / lenphi;
        let cosphi = phi_denom / lenphi;

        // We already have sinphi and es, so we can compute the radius of
        // curvature faster by inlining, rather than calling the
        // prime_vertical_radius_of_curvature() method.
        let N = a / (1.0 - sinphi * sinphi * es).sqrt();

        // Bowring (1985), as quoted by Burtch (2006), suggests this expression
        // as more accurate than the commonly used h = p / cosphi - N
        let h = p * cosphi + Z * sinphi - a * a / N;

        let geographic = Geographic::gis(lam.to_degrees(), phi.to_degrees(), h);
        if !geographic.is_finite() {
            return Err(Error::OutsideDomain(format!(
                "cartesian coordinate {cartesian:?} has no geographic representation"
            )));
        }
        Ok(geographic)
    }
}

// ----- T E S T S ---------------------------------------------------------------------
