use std::marker::PhantomData;

use serde::de::{DeserializeSeed, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, SerializeTuple};
use serde::{Deserializer, Serialize, Serializer};

use crate::ring::*;

///
/// Trait for rings whose elements can be serialized and deserialized with `serde`.
///
/// Since elements do not carry their ring with them, the ring has to be given during
/// serialization and deserialization. In `serde` terms, this is done using
/// [`SerializeWithRing`] and the [`DeserializeSeed`] [`DeserializeWithRing`].
///
pub trait SerializableElementRing: RingBase {

    fn deserialize<'de, D>(&self, deserializer: D) -> Result<Self::Element, D::Error>
        where D: Deserializer<'de>;

    fn serialize<S>(&self, el: &Self::Element, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer;
}

///
/// Deserializes a sequence, using a clone of `base_seed` for each element, and passes
/// the elements to `collector` in order.
///
pub fn deserialize_seq_helper<'de, S, D, C>(deserializer: D, collector: C, base_seed: S) -> Result<(), D::Error>
    where D: Deserializer<'de>,
        C: FnMut(S::Value),
        S: Clone + DeserializeSeed<'de>
{
    struct SeqVisitor<'de, S: Clone + DeserializeSeed<'de>, C: FnMut(S::Value)> {
        base_seed: S,
        collector: C,
        deserializer: PhantomData<&'de ()>
    }

    impl<'de, S: Clone + DeserializeSeed<'de>, C: FnMut(S::Value)> Visitor<'de> for SeqVisitor<'de, S, C> {
        type Value = ();

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "a sequence")
        }

        fn visit_seq<A>(mut self, mut seq: A) -> Result<Self::Value, A::Error>
            where A: SeqAccess<'de>
        {
            while let Some(el) = seq.next_element_seed(self.base_seed.clone())? {
                (self.collector)(el);
            }
            return Ok(());
        }
    }

    deserializer.deserialize_seq(SeqVisitor {
        deserializer: PhantomData,
        base_seed: base_seed,
        collector: collector
    })
}

pub fn serialize_seq_helper<S, I>(serializer: S, sequence: I) -> Result<S::Ok, S::Error>
    where S: Serializer,
        I: Iterator,
        I::Item: Serialize
{
    let size_hint = sequence.size_hint();
    let mut seq = serializer.serialize_seq(if size_hint.1.is_some() && size_hint.1.unwrap() == size_hint.0 { Some(size_hint.0) } else { None })?;
    for x in sequence {
        seq.serialize_element(&x)?;
    }
    return seq.end();
}

#[derive(Clone)]
pub struct DeserializeWithRing<R: RingStore>
    where R::Type: SerializableElementRing
{
    ring: R
}

impl<R> DeserializeWithRing<R>
    where R::Type: SerializableElementRing,
        R: RingStore
{
    pub fn new(ring: R) -> Self {
        Self { ring }
    }
}

impl<'de, R> DeserializeSeed<'de> for DeserializeWithRing<R>
    where R::Type: SerializableElementRing,
        R: RingStore
{
    type Value = El<R>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where D: Deserializer<'de>
    {
        self.ring.get_ring().deserialize(deserializer)
    }
}

pub struct SerializeWithRing<'a, R: RingStore>
    where R::Type: SerializableElementRing
{
    ring: R,
    el: &'a El<R>
}

impl<'a, R: RingStore> SerializeWithRing<'a, R>
    where R::Type: SerializableElementRing
{
    pub fn new(el: &'a El<R>, ring: R) -> Self {
        Self { el, ring }
    }
}

impl<'a, R: RingStore> Serialize for SerializeWithRing<'a, R>
    where R::Type: SerializableElementRing
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        self.ring.get_ring().serialize(self.el, serializer)
    }
}

///
/// Serializes a sparse entry `(index, value)` as a 2-tuple.
///
pub(crate) struct SerializeIndexedWithRing<'a, R: RingStore>
    where R::Type: SerializableElementRing
{
    ring: R,
    index: usize,
    el: &'a El<R>
}

impl<'a, R: RingStore> SerializeIndexedWithRing<'a, R>
    where R::Type: SerializableElementRing
{
    pub(crate) fn new(index: usize, el: &'a El<R>, ring: R) -> Self {
        Self { index, el, ring }
    }
}

impl<'a, R: RingStore> Serialize for SerializeIndexedWithRing<'a, R>
    where R::Type: SerializableElementRing
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer
    {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.index)?;
        tuple.serialize_element(&SerializeWithRing::new(self.el, &self.ring))?;
        return tuple.end();
    }
}

///
/// [`DeserializeSeed`] for the entries serialized by [`SerializeIndexedWithRing`].
///
#[derive(Clone)]
pub(crate) struct DeserializeIndexedWithRing<R: RingStore>
    where R::Type: SerializableElementRing
{
    ring: R
}

impl<R> DeserializeIndexedWithRing<R>
    where R::Type: SerializableElementRing,
        R: RingStore
{
    pub(crate) fn new(ring: R) -> Self {
        Self { ring }
    }
}

impl<'de, R> DeserializeSeed<'de> for DeserializeIndexedWithRing<R>
    where R::Type: SerializableElementRing,
        R: RingStore
{
    type Value = (usize, El<R>);

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where D: Deserializer<'de>
    {
        struct TupleVisitor<R: RingStore>
            where R::Type: SerializableElementRing
        {
            ring: R
        }

        impl<'de, R: RingStore> Visitor<'de> for TupleVisitor<R>
            where R::Type: SerializableElementRing
        {
            type Value = (usize, El<R>);

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "a pair of an index and a ring element")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
                where A: SeqAccess<'de>
            {
                let index = seq.next_element::<usize>()?.ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
                let value = seq.next_element_seed(DeserializeWithRing::new(&self.ring))?.ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
                return Ok((index, value));
            }
        }

        deserializer.deserialize_tuple(2, TupleVisitor { ring: self.ring })
    }
}

#[stability::unstable(feature = "enable")]
#[cfg(any(test, feature = "generic_tests"))]
pub mod generic_tests {

    use super::*;

    #[stability::unstable(feature = "enable")]
    pub fn test_serialization<R: RingStore, I: Iterator<Item = El<R>>>(ring: R, edge_case_elements: I)
        where R::Type: SerializableElementRing
    {
        let edge_case_elements = edge_case_elements.collect::<Vec<_>>();

        let serializer = serde_assert::Serializer::builder().is_human_readable(true).build();
        for x in &edge_case_elements {
            let tokens = ring.get_ring().serialize(&x, &serializer).unwrap();
            let mut deserializer = serde_assert::Deserializer::builder(tokens).is_human_readable(true).build();
            let result = ring.get_ring().deserialize(&mut deserializer).unwrap();
            assert_el_eq!(ring, &result, &x);
        }

        let serializer = serde_assert::Serializer::builder().is_human_readable(false).build();
        for x in &edge_case_elements {
            let tokens = ring.get_ring().serialize(&x, &serializer).unwrap();
            let mut deserializer = serde_assert::Deserializer::builder(tokens).is_human_readable(false).build();
            let result = ring.get_ring().deserialize(&mut deserializer).unwrap();
            assert_el_eq!(ring, &result, &x);
        }
    }
}

#[cfg(test)]
use crate::primitive_int::StaticRing;

#[test]
fn test_serialize() {
    let value = -(1i128 << 100);
    let json = serde_json::to_string(&SerializeWithRing::new(&value, StaticRing::<i128>::RING)).unwrap();
    assert_eq!("-1267650600228229401496703205376", json);
}

#[test]
fn test_serialize_indexed() {
    let ring = StaticRing::<i64>::RING;
    let json = serde_json::to_string(&SerializeIndexedWithRing::new(3, &-7, ring)).unwrap();
    assert_eq!("[3,-7]", json);
    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let (index, value) = DeserializeIndexedWithRing::new(ring).deserialize(&mut deserializer).unwrap();
    assert_eq!(3, index);
    assert_eq!(-7, value);
}
