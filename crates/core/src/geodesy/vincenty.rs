//! Vincenty inverse and direct solutions

use geo::Coord;

use super::{Ellipsoid, Geodesic};

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;

#[inline]
fn normalize_azimuth(deg: f64) -> f64 {
    let a = deg % 360.0;
    if a < 0.0 {
        a + 360.0
    } else {
        a
    }
}

/// Longitude wrapped into [-180, 180).
#[inline]
fn wrap_longitude(deg: f64) -> f64 {
    (deg + 540.0) % 360.0 - 180.0
}

/// Vincenty's correction series for (A, B) from u².
#[inline]
fn series(u2: f64) -> (f64, f64) {
    let big_a = 1.0 + u2 / 16384.0 * (4096.0 + u2 * (-768.0 + u2 * (320.0 - 175.0 * u2)));
    let big_b = u2 / 1024.0 * (256.0 + u2 * (-128.0 + u2 * (74.0 - 47.0 * u2)));
    (big_a, big_b)
}

#[inline]
fn delta_sigma(big_b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    big_b * sin_sigma
        * (cos_2sigma_m + big_b / 4.0
            * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                - big_b / 6.0 * cos_2sigma_m
                    * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                    * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)))
}

pub(super) fn inverse(e: &Ellipsoid, p: Coord<f64>, q: Coord<f64>) -> Geodesic {
    let a = e.a;
    let f = e.f;
    let b = e.b();

    let lat1 = p.y.to_radians();
    let lat2 = q.y.to_radians();
    let l = (q.x - p.x).to_radians();

    let u1 = ((1.0 - f) * lat1.tan()).atan();
    let u2 = ((1.0 - f) * lat2.tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;

    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();

        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();

        if sin_sigma < 1e-15 {
            return Geodesic { distance: 0.0, initial_azimuth: 0.0, final_azimuth: 0.0 };
        }

        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos2_alpha = 1.0 - sin_alpha * sin_alpha;

        // Equatorial line: cos²α = 0
        let cos_2sigma_m = if cos2_alpha > 1e-15 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos2_alpha
        } else {
            0.0
        };

        let c = f / 16.0 * cos2_alpha * (4.0 + f * (4.0 - 3.0 * cos2_alpha));
        let lambda_prev = lambda;
        lambda = l + (1.0 - c) * f * sin_alpha
            * (sigma + c * sin_sigma
                * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - lambda_prev).abs() < CONVERGENCE {
            let u_sq = cos2_alpha * (a * a - b * b) / (b * b);
            let (big_a, big_b) = series(u_sq);
            let ds = delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);

            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let alpha1 = (cos_u2 * sin_lambda)
                .atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
            let alpha2 = (cos_u1 * sin_lambda)
                .atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda);

            return Geodesic {
                distance: b * big_a * (sigma - ds),
                initial_azimuth: normalize_azimuth(alpha1.to_degrees()),
                final_azimuth: normalize_azimuth(alpha2.to_degrees()),
            };
        }
    }

    tracing::debug!(
        "Vincenty inverse did not converge for ({}, {}) -> ({}, {}); using great circle",
        p.x, p.y, q.x, q.y
    );
    great_circle(e, lat1, lat2, l)
}

/// Spherical fallback for nearly antipodal points.
fn great_circle(e: &Ellipsoid, lat1: f64, lat2: f64, dlon: f64) -> Geodesic {
    let dlat = lat2 - lat1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let central = 2.0 * h.sqrt().min(1.0).asin();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let initial = y.atan2(x).to_degrees();

    let y_back = (-dlon).sin() * lat1.cos();
    let x_back = lat2.cos() * lat1.sin() - lat2.sin() * lat1.cos() * (-dlon).cos();
    let back = y_back.atan2(x_back).to_degrees();

    Geodesic {
        distance: e.mean_radius() * central,
        initial_azimuth: normalize_azimuth(initial),
        final_azimuth: normalize_azimuth(back + 180.0),
    }
}

pub(super) fn direct(e: &Ellipsoid, start: Coord<f64>, azimuth: f64, distance: f64) -> Coord<f64> {
    if distance == 0.0 {
        return start;
    }

    let a = e.a;
    let f = e.f;
    let b = e.b();

    let lat1 = start.y.to_radians();
    let alpha1 = azimuth.to_radians();
    let (sin_alpha1, cos_alpha1) = alpha1.sin_cos();

    let tan_u1 = (1.0 - f) * lat1.tan();
    let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
    let sin_u1 = tan_u1 * cos_u1;

    let sigma1 = tan_u1.atan2(cos_alpha1);
    let sin_alpha = cos_u1 * sin_alpha1;
    let cos2_alpha = 1.0 - sin_alpha * sin_alpha;
    let u_sq = cos2_alpha * (a * a - b * b) / (b * b);
    let (big_a, big_b) = series(u_sq);

    let sigma0 = distance / (b * big_a);
    let mut sigma = sigma0;
    for _ in 0..MAX_ITERATIONS {
        let (s, c) = sigma.sin_cos();
        let next = sigma0 + delta_sigma(big_b, s, c, (2.0 * sigma1 + sigma).cos());
        let converged = (next - sigma).abs() < CONVERGENCE;
        sigma = next;
        if converged {
            break;
        }
    }
    let (sin_sigma, cos_sigma) = sigma.sin_cos();
    let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();

    let tmp = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
    let lat2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
        .atan2((1.0 - f) * (sin_alpha * sin_alpha + tmp * tmp).sqrt());
    let lambda =
        (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
    let c = f / 16.0 * cos2_alpha * (4.0 + f * (4.0 - 3.0 * cos2_alpha));
    let l = lambda
        - (1.0 - c) * f * sin_alpha
            * (sigma + c * sin_sigma
                * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

    Coord {
        x: wrap_longitude(start.x + l.to_degrees()),
        y: lat2.to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flinders_peak_buninyong() {
        // Vincenty's published example (GRS80 / Australian datum test line)
        let flinders = Coord {
            x: 144.0 + 25.0 / 60.0 + 29.52440 / 3600.0,
            y: -(37.0 + 57.0 / 60.0 + 3.72030 / 3600.0),
        };
        let buninyong = Coord {
            x: 143.0 + 55.0 / 60.0 + 35.38390 / 3600.0,
            y: -(37.0 + 39.0 / 60.0 + 10.15610 / 3600.0),
        };

        let g = inverse(&Ellipsoid::GRS80, flinders, buninyong);
        assert_relative_eq!(g.distance, 54_972.271, epsilon = 1e-2);
        // 306° 52' 05.37"
        assert_relative_eq!(g.initial_azimuth, 306.868_158, epsilon = 1e-4);
    }

    #[test]
    fn test_one_degree_latitude_at_equator() {
        let origin = Coord { x: 0.0, y: 0.0 };
        let d = inverse(&Ellipsoid::WGS84, origin, Coord { x: 0.0, y: 1.0 }).distance;
        assert_relative_eq!(d, 110_574.389, epsilon = 0.5);
    }

    #[test]
    fn test_coincident_points() {
        let p = Coord { x: 12.5, y: 41.9 };
        let g = inverse(&Ellipsoid::WGS84, p, p);
        assert_eq!(g.distance, 0.0);
    }

    #[test]
    fn test_direct_inverts_inverse() {
        let e = Ellipsoid::WGS84;
        let p = Coord { x: -92.86, y: 30.03 };
        let q = Coord { x: -92.84, y: 30.05 };
        let g = inverse(&e, p, q);
        let r = direct(&e, p, g.initial_azimuth, g.distance);
        assert_relative_eq!(r.x, q.x, epsilon = 1e-9);
        assert_relative_eq!(r.y, q.y, epsilon = 1e-9);
    }

    #[test]
    fn test_direct_due_north() {
        let e = Ellipsoid::WGS84;
        let start = Coord { x: 10.0, y: 45.0 };
        let end = direct(&e, start, 0.0, 1000.0);
        assert_relative_eq!(end.x, 10.0, epsilon = 1e-12);
        assert!(end.y > 45.0);
        assert_relative_eq!(inverse(&e, start, end).distance, 1000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_wrap_longitude() {
        assert_relative_eq!(wrap_longitude(181.0), -179.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_longitude(-181.0), 179.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_longitude(45.0), 45.0, epsilon = 1e-12);
    }
}
