//! Runtime type tags and the closed element trait.
//!
//! Containers here do not take user-supplied hash or equality functions.
//! Instead every stored element reports a [`TypeTag`] and a [`Scalar`] view
//! of itself, and the comparator and hash paths dispatch on those. Types
//! outside the primitive set can still be stored (as [`Opaque`] or `bool`),
//! but comparing or hashing them fails with `NotSupported`.

/// Primitive representation of a stored element.
///
/// The `*Ptr` variants describe the same primitive held behind an owned heap
/// allocation (`Box<T>`); they compare and hash exactly like the pointee.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeTag {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Size,
    Char,
    Str,
    Enum,
    Bool,
    Struct,
    U8Ptr,
    U16Ptr,
    U32Ptr,
    U64Ptr,
    I8Ptr,
    I16Ptr,
    I32Ptr,
    I64Ptr,
    SizePtr,
    CharPtr,
    StructPtr,
    EnumPtr,
    BoolPtr,
}

impl TypeTag {
    /// Tag of the same primitive held behind an owned pointer. Strings are
    /// already a pointer representation and map to themselves.
    pub const fn as_pointer(self) -> TypeTag {
        match self {
            TypeTag::U8 => TypeTag::U8Ptr,
            TypeTag::U16 => TypeTag::U16Ptr,
            TypeTag::U32 => TypeTag::U32Ptr,
            TypeTag::U64 => TypeTag::U64Ptr,
            TypeTag::I8 => TypeTag::I8Ptr,
            TypeTag::I16 => TypeTag::I16Ptr,
            TypeTag::I32 => TypeTag::I32Ptr,
            TypeTag::I64 => TypeTag::I64Ptr,
            TypeTag::Size => TypeTag::SizePtr,
            TypeTag::Char => TypeTag::CharPtr,
            TypeTag::Enum => TypeTag::EnumPtr,
            TypeTag::Bool => TypeTag::BoolPtr,
            TypeTag::Struct => TypeTag::StructPtr,
            other => other,
        }
    }

    pub const fn is_pointer(self) -> bool {
        matches!(
            self,
            TypeTag::U8Ptr
                | TypeTag::U16Ptr
                | TypeTag::U32Ptr
                | TypeTag::U64Ptr
                | TypeTag::I8Ptr
                | TypeTag::I16Ptr
                | TypeTag::I32Ptr
                | TypeTag::I64Ptr
                | TypeTag::SizePtr
                | TypeTag::CharPtr
                | TypeTag::StructPtr
                | TypeTag::EnumPtr
                | TypeTag::BoolPtr
        )
    }

    /// Inverse of [`TypeTag::as_pointer`]; non-pointer tags map to themselves.
    pub const fn pointee(self) -> TypeTag {
        match self {
            TypeTag::U8Ptr => TypeTag::U8,
            TypeTag::U16Ptr => TypeTag::U16,
            TypeTag::U32Ptr => TypeTag::U32,
            TypeTag::U64Ptr => TypeTag::U64,
            TypeTag::I8Ptr => TypeTag::I8,
            TypeTag::I16Ptr => TypeTag::I16,
            TypeTag::I32Ptr => TypeTag::I32,
            TypeTag::I64Ptr => TypeTag::I64,
            TypeTag::SizePtr => TypeTag::Size,
            TypeTag::CharPtr => TypeTag::Char,
            TypeTag::EnumPtr => TypeTag::Enum,
            TypeTag::BoolPtr => TypeTag::Bool,
            TypeTag::StructPtr => TypeTag::Struct,
            other => other,
        }
    }
}

/// Borrowed primitive view of an element, used for comparison and hashing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scalar<'a> {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Size(usize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Char(char),
    Str(&'a str),
    /// The element has no primitive view (structs, enums, bools).
    Unsupported,
}

/// An element storable in the crate's containers.
///
/// Implemented by the crate for the fixed primitive set only; hashing and
/// comparison dispatch over [`TypeTag`].
pub trait Element {
    const TAG: TypeTag;

    fn scalar(&self) -> Scalar<'_>;
}

macro_rules! scalar_element {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const TAG: TypeTag = TypeTag::$tag;

                #[inline]
                fn scalar(&self) -> Scalar<'_> {
                    Scalar::$tag(*self)
                }
            }
        )*
    };
}

scalar_element! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Size,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    char => Char,
}

impl Element for str {
    const TAG: TypeTag = TypeTag::Str;

    #[inline]
    fn scalar(&self) -> Scalar<'_> {
        Scalar::Str(self)
    }
}

impl Element for String {
    const TAG: TypeTag = TypeTag::Str;

    #[inline]
    fn scalar(&self) -> Scalar<'_> {
        Scalar::Str(self.as_str())
    }
}

impl Element for bool {
    const TAG: TypeTag = TypeTag::Bool;

    fn scalar(&self) -> Scalar<'_> {
        Scalar::Unsupported
    }
}

impl<T: Element + ?Sized> Element for Box<T> {
    const TAG: TypeTag = T::TAG.as_pointer();

    #[inline]
    fn scalar(&self) -> Scalar<'_> {
        (**self).scalar()
    }
}

/// Wrapper for values outside the primitive set. Storable, but never
/// comparable or hashable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Opaque<T>(pub T);

impl<T> Opaque<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Element for Opaque<T> {
    const TAG: TypeTag = TypeTag::Struct;

    fn scalar(&self) -> Scalar<'_> {
        Scalar::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_tags_round_trip_through_pointee() {
        let plain = [
            TypeTag::U8,
            TypeTag::U16,
            TypeTag::U32,
            TypeTag::U64,
            TypeTag::I8,
            TypeTag::I16,
            TypeTag::I32,
            TypeTag::I64,
            TypeTag::Size,
            TypeTag::Char,
            TypeTag::Enum,
            TypeTag::Bool,
            TypeTag::Struct,
        ];
        for tag in plain {
            let ptr = tag.as_pointer();
            assert!(ptr.is_pointer(), "{:?}", tag);
            assert!(!tag.is_pointer());
            assert_eq!(ptr.pointee(), tag);
        }
        assert_eq!(TypeTag::Str.as_pointer(), TypeTag::Str);
    }

    #[test]
    fn boxed_elements_report_pointer_tags() {
        assert_eq!(<Box<u32> as Element>::TAG, TypeTag::U32Ptr);
        assert_eq!(<Box<String> as Element>::TAG, TypeTag::Str);
        assert_eq!(<Box<Opaque<()>> as Element>::TAG, TypeTag::StructPtr);
        assert_eq!(Box::new(7i16).scalar(), Scalar::I16(7));
    }

    #[test]
    fn out_of_set_values_have_no_scalar_view() {
        assert_eq!(true.scalar(), Scalar::Unsupported);
        assert_eq!(Opaque(vec![1, 2]).scalar(), Scalar::Unsupported);
        assert_eq!("abc".to_string().scalar(), Scalar::Str("abc"));
    }
}
