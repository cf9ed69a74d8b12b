pub mod region;

pub use region::Region;

pub trait DivDown {
    /// Divides and rounds the result towards negative infinity.
    fn div_down(self, divisor: Self) -> Self;
}

#[macro_export]
macro_rules! convert_point {
    ($val:expr, $type:ty) => {
        cgmath::Point3 {
            x: $val.x as $type,
            y: $val.y as $type,
            z: $val.z as $type,
        }
    };
}

#[macro_export]
macro_rules! convert_vec {
    ($val:expr, $type:ty) => {
        cgmath::Vector3 {
            x: $val.x as $type,
            y: $val.y as $type,
            z: $val.z as $type,
        }
    };
}

macro_rules! impl_div_down_int {
    ($type:ty) => {
        // `0 - x` used for negation so that unsigned types can share the implementation. We will
        // never actually compute `0 - x` for an unsigned x because there is always an `x < 0`
        // check before a negation.
        impl DivDown for $type {
            #[inline]
            #[allow(unused_comparisons)]
            fn div_down(mut self, mut divisor: $type) -> $type {
                assert!(divisor != 0);
                if divisor < 0 {
                    self = 0 - self;
                    divisor = 0 - divisor;
                }

                if self >= 0 {
                    self / divisor
                } else {
                    let dividend = 0 - self;
                    let d = dividend / divisor;
                    if dividend % divisor > 0 {
                        0 - (d + 1)
                    } else {
                        0 - d
                    }
                }
            }
        }
    };
}

impl_div_down_int!(u8);
impl_div_down_int!(u16);
impl_div_down_int!(u32);
impl_div_down_int!(u64);
impl_div_down_int!(i8);
impl_div_down_int!(i16);
impl_div_down_int!(i32);
impl_div_down_int!(i64);
impl_div_down_int!(usize);
impl_div_down_int!(isize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_down() {
        assert_eq!(38u32.div_down(4), 9);
        assert_eq!(32i32.div_down(16), 2);
        assert_eq!((-38i32).div_down(4), -10);
        assert_eq!((-32i64).div_down(16), -2);
        assert_eq!((-1i32).div_down(16), -1);
        assert_eq!(38i32.div_down(-4), -10);
        assert_eq!((-38i32).div_down(-4), 9);
    }
}
