use once_cell::sync::Lazy;

const LOOKUP_TABLE_SIZE: usize = 360;

/// Fractional bits of the fixed-point values in the sine/cosine table.
pub const TRIG_SHIFT: u32 = 14;
const TRIG_ONE: f64 = (1 << TRIG_SHIFT) as f64;

/// Precomputed fixed-point sine and cosine values, one per whole degree.
static SIN_COS_TABLE: Lazy<[(i32, i32); LOOKUP_TABLE_SIZE]> = Lazy::new(|| {
    let mut arr = [(0i32, 0i32); LOOKUP_TABLE_SIZE];
    for (degree, entry) in arr.iter_mut().enumerate() {
        let angle = (degree as f64).to_radians();
        *entry = (
            (angle.sin() * TRIG_ONE).round() as i32,
            (angle.cos() * TRIG_ONE).round() as i32,
        );
    }
    arr
});

/// Fixed-point sine and cosine of a whole-degree angle. Angle normalized via rem_euclid.
#[inline(always)]
pub fn fixed_sin_cos(degrees: i32) -> (i32, i32) {
    SIN_COS_TABLE[degrees.rem_euclid(LOOKUP_TABLE_SIZE as i32) as usize]
}

/// Multiplies `length` by a table value, rounding half away from zero so that
/// opposite directions move by exactly opposite amounts.
#[inline(always)]
pub fn scale_by_trig(length: i32, trig: i32) -> i32 {
    let product = length as i64 * trig as i64;
    let half = 1i64 << (TRIG_SHIFT - 1);
    let magnitude = (product.abs() + half) >> TRIG_SHIFT;
    (magnitude * product.signum()) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 2.0 / TRIG_ONE;

    fn as_float(value: i32) -> f64 {
        value as f64 / TRIG_ONE
    }

    #[test]
    fn test_fixed_sin_cos_accuracy() {
        for degrees in [0, 30, 45, 90, 135, 180, 270, 359] {
            let (sin, cos) = fixed_sin_cos(degrees);
            let radians = (degrees as f64).to_radians();
            assert!(
                (as_float(sin) - radians.sin()).abs() < TOLERANCE,
                "Sin value inaccurate for angle: {}",
                degrees
            );
            assert!(
                (as_float(cos) - radians.cos()).abs() < TOLERANCE,
                "Cos value inaccurate for angle: {}",
                degrees
            );
        }
    }

    #[test]
    fn test_fixed_sin_cos_wraparound() {
        assert_eq!(fixed_sin_cos(370), fixed_sin_cos(10));
        assert_eq!(fixed_sin_cos(720), fixed_sin_cos(0));
    }

    #[test]
    fn test_fixed_sin_cos_negative_angles() {
        let (sin, cos) = fixed_sin_cos(-90);
        assert_eq!(sin, -(1 << TRIG_SHIFT));
        assert_eq!(cos, 0);
    }

    #[test]
    fn test_fixed_sin_cos_cardinal_points_are_exact() {
        let one = 1 << TRIG_SHIFT;
        assert_eq!(fixed_sin_cos(0), (0, one));
        assert_eq!(fixed_sin_cos(90), (one, 0));
        assert_eq!(fixed_sin_cos(180), (0, -one));
        assert_eq!(fixed_sin_cos(270), (-one, 0));
    }

    #[test]
    fn test_scale_by_trig_is_symmetric() {
        for degrees in [17, 45, 100, 233] {
            let (sin, cos) = fixed_sin_cos(degrees);
            assert_eq!(scale_by_trig(640, sin), -scale_by_trig(640, -sin));
            assert_eq!(scale_by_trig(640, cos), -scale_by_trig(-640, cos));
        }
    }

    #[test]
    fn test_scale_by_trig_full_length() {
        let (_, cos) = fixed_sin_cos(0);
        assert_eq!(scale_by_trig(640, cos), 640);
        let (sin, _) = fixed_sin_cos(30);
        assert_eq!(scale_by_trig(640, sin), 320);
    }
}
