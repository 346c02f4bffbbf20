//! Three-way comparison over tagged elements.
//!
//! The result is a signed distance: positive when `a > b`, negative when
//! `a < b`, zero when equal. Containers use `== 0` as key equality.

use crate::error::{ContainerError, Result};
use crate::type_tag::{Element, Scalar, TypeTag};
use core::cmp::Ordering;

/// Compare two elements of the same type.
#[inline]
pub fn compare<T: Element + ?Sized>(a: &T, b: &T) -> Result<i64> {
    compare_scalars(T::TAG, a.scalar(), b.scalar())
}

/// Compare two scalar views under `tag`. Views of different kinds, or views
/// without a primitive representation, are `NotSupported`.
pub fn compare_scalars(tag: TypeTag, a: Scalar<'_>, b: Scalar<'_>) -> Result<i64> {
    let diff = match (a, b) {
        (Scalar::U8(a), Scalar::U8(b)) => i64::from(a) - i64::from(b),
        (Scalar::U16(a), Scalar::U16(b)) => i64::from(a) - i64::from(b),
        (Scalar::U32(a), Scalar::U32(b)) => i64::from(a) - i64::from(b),
        (Scalar::U64(a), Scalar::U64(b)) => unsigned_distance(a, b),
        (Scalar::Size(a), Scalar::Size(b)) => unsigned_distance(a as u64, b as u64),
        (Scalar::I8(a), Scalar::I8(b)) => i64::from(a) - i64::from(b),
        (Scalar::I16(a), Scalar::I16(b)) => i64::from(a) - i64::from(b),
        (Scalar::I32(a), Scalar::I32(b)) => i64::from(a) - i64::from(b),
        (Scalar::I64(a), Scalar::I64(b)) => a.saturating_sub(b),
        (Scalar::Char(a), Scalar::Char(b)) => i64::from(u32::from(a)) - i64::from(u32::from(b)),
        (Scalar::Str(a), Scalar::Str(b)) => str_distance(a, b),
        _ => return Err(ContainerError::NotSupported(tag)),
    };
    Ok(diff)
}

// Saturates to the i64 range.
fn unsigned_distance(a: u64, b: u64) -> i64 {
    if a >= b {
        i64::try_from(a - b).unwrap_or(i64::MAX)
    } else {
        let dist = b - a;
        if dist > i64::MAX as u64 {
            i64::MIN
        } else {
            -(dist as i64)
        }
    }
}

// strcmp semantics over the full byte length. When one string is a prefix
// of the other the result is the next byte of the longer one, at least 1 in
// magnitude so that embedded NUL bytes never compare equal to the end.
fn str_distance(a: &str, b: &str) -> i64 {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    for (x, y) in a.iter().zip(b) {
        if x != y {
            return i64::from(*x) - i64::from(*y);
        }
    }
    match a.len().cmp(&b.len()) {
        Ordering::Equal => 0,
        Ordering::Greater => i64::from(a[b.len()]).max(1),
        Ordering::Less => -i64::from(b[a.len()]).max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_tag::Opaque;

    #[test]
    fn small_integers_yield_plain_differences() {
        assert_eq!(compare(&5u8, &3u8), Ok(2));
        assert_eq!(compare(&3u16, &5u16), Ok(-2));
        assert_eq!(compare(&0u32, &u32::MAX), Ok(-(u32::MAX as i64)));
        assert_eq!(compare(&-128i8, &127i8), Ok(-255));
        assert_eq!(compare(&i32::MIN, &i32::MAX), Ok(i32::MIN as i64 - i32::MAX as i64));
    }

    #[test]
    fn wide_integers_saturate() {
        assert_eq!(compare(&u64::MAX, &0u64), Ok(i64::MAX));
        assert_eq!(compare(&0u64, &u64::MAX), Ok(i64::MIN));
        assert_eq!(compare(&0u64, &(i64::MAX as u64 + 1)), Ok(i64::MIN));
        assert_eq!(compare(&10usize, &4usize), Ok(6));
        assert_eq!(compare(&i64::MAX, &i64::MIN), Ok(i64::MAX));
        assert_eq!(compare(&i64::MIN, &1i64), Ok(i64::MIN));
        assert_eq!(compare(&-4i64, &-9i64), Ok(5));
    }

    #[test]
    fn strings_follow_strcmp() {
        assert_eq!(compare("a", "b"), Ok(-1));
        assert_eq!(compare("abc", "abc"), Ok(0));
        assert_eq!(compare("abd", "abc"), Ok(1));
        assert_eq!(compare("ab", "abc"), Ok(-(b'c' as i64)));
        assert_eq!(compare(&String::from("b"), &String::from("")), Ok(b'b' as i64));
        assert_eq!(compare("a\0", "a"), Ok(1));
        assert_eq!(compare("a", "a\0"), Ok(-1));
    }

    #[test]
    fn chars_compare_by_code_point() {
        assert_eq!(compare(&'b', &'a'), Ok(1));
        assert_eq!(compare(&'a', &'a'), Ok(0));
    }

    #[test]
    fn boxed_values_compare_like_their_pointee() {
        assert_eq!(compare(&Box::new(9u64), &Box::new(2u64)), Ok(7));
    }

    #[test]
    fn unsupported_tags_are_rejected() {
        assert_eq!(compare(&true, &false), Err(ContainerError::NotSupported(TypeTag::Bool)));
        assert_eq!(
            compare(&Opaque(1.5f32), &Opaque(2.5f32)),
            Err(ContainerError::NotSupported(TypeTag::Struct))
        );
        assert_eq!(
            compare_scalars(TypeTag::U8, Scalar::U8(1), Scalar::I8(1)),
            Err(ContainerError::NotSupported(TypeTag::U8))
        );
    }
}
