//! Spherical geometry helpers shared by heuristics and landmark placement.

use geo::{HaversineDistance, Point};

use crate::graph::Coordinate;

/// Mean Earth radius in meters, matching the radius the haversine formula uses.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Great-circle distance in meters between two coordinates.
#[inline]
pub fn great_circle_distance(from: Coordinate, to: Coordinate) -> f64 {
    Point::new(from.lon, from.lat).haversine_distance(&Point::new(to.lon, to.lat))
}

/// Project a coordinate onto the unit sphere.
pub fn to_unit_vector(coordinate: Coordinate) -> [f64; 3] {
    let lat = coordinate.lat.to_radians();
    let lon = coordinate.lon.to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Inverse of [`to_unit_vector`]; the vector need not be normalised.
pub fn from_unit_vector(vector: [f64; 3]) -> Coordinate {
    let [x, y, z] = vector;
    let hypotenuse = (x * x + y * y).sqrt();
    Coordinate::new(z.atan2(hypotenuse).to_degrees(), y.atan2(x).to_degrees())
}

/// Geographic midpoint: mean of the unit vectors, projected back onto the sphere.
///
/// Returns `None` for an empty input.
pub fn geographic_midpoint<I>(coordinates: I) -> Option<Coordinate>
where
    I: IntoIterator<Item = Coordinate>,
{
    let mut sum = [0.0f64; 3];
    let mut count = 0usize;
    for coordinate in coordinates {
        let vector = to_unit_vector(coordinate);
        sum[0] += vector[0];
        sum[1] += vector[1];
        sum[2] += vector[2];
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let count = count as f64;
    Some(from_unit_vector([
        sum[0] / count,
        sum[1] / count,
        sum[2] / count,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let distance =
            great_circle_distance(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((distance - 111_195.0).abs() < 10.0, "distance {distance}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(51.5, -0.12);
        let b = Coordinate::new(40.7, -74.0);
        assert_eq!(great_circle_distance(a, b), great_circle_distance(b, a));
    }

    #[test]
    fn unit_vector_round_trip_preserves_position() {
        let original = Coordinate::new(-33.9, 151.2);
        let restored = from_unit_vector(to_unit_vector(original));
        assert!((restored.lat - original.lat).abs() < 1e-9);
        assert!((restored.lon - original.lon).abs() < 1e-9);
    }

    #[test]
    fn midpoint_of_equator_points() {
        let midpoint = geographic_midpoint([Coordinate::new(0.0, 10.0), Coordinate::new(0.0, 30.0)])
            .expect("non-empty");
        assert!(midpoint.lat.abs() < 1e-9);
        assert!((midpoint.lon - 20.0).abs() < 1e-9);
    }

    #[test]
    fn midpoint_of_nothing_is_none() {
        assert!(geographic_midpoint(std::iter::empty()).is_none());
    }
}
