use nalgebra::{Point3, Vector3};

/// Arithmetic mean of a set of points, or `None` when the set is empty.
pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Point3<f64>> {
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for point in points {
        sum += point.coords;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(Point3::from(sum / count as f64))
}

/// The single vector that carries `from` onto `to`.
pub fn translation_between(from: &Point3<f64>, to: &Point3<f64>) -> Vector3<f64> {
    to - from
}
