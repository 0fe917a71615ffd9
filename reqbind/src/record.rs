//! Records and the field walker.
//!
//! A [`Record`] lists its fields as [`FieldRef`]s, usually through
//! `#[derive(Record)]`. [`walk`] turns a record into the flat, ordered list
//! of [`BoundField`]s the decoder dispatches on: nested records bound from
//! the query are expanded in place, while body fields, deep objects, custom
//! text decoders and records tagged with any other origin are kept as a
//! single unit.

use crate::body::BodyTarget;
use crate::error::{Error, TagError};
use crate::tag::{Descriptor, Origin, QueryPolicy};
use crate::value::{Bindable, Slot};

/// A struct whose public fields take part in binding.
pub trait Record {
    /// Fields in declaration order.
    fn fields(&mut self) -> Vec<FieldRef<'_>>;
}

/// One declared field of a [`Record`].
pub struct FieldRef<'a> {
    /// Identifier the default binding name is derived from.
    pub ident: &'a str,
    /// Raw tag, see [`crate::tag`].
    pub tag: &'a str,
    pub target: FieldTarget<'a>,
}

pub enum FieldTarget<'a> {
    Value(&'a mut dyn Bindable),
    Body(&'a mut dyn BodyTarget),
}

impl<'a> FieldRef<'a> {
    /// Field bound from path, query or header values.
    pub fn value(ident: &'a str, tag: &'a str, target: &'a mut dyn Bindable) -> Self {
        Self {
            ident,
            tag,
            target: FieldTarget::Value(target),
        }
    }

    /// Field populated from the whole request body.
    pub fn body(ident: &'a str, tag: &'a str, target: &'a mut dyn BodyTarget) -> Self {
        Self {
            ident,
            tag,
            target: FieldTarget::Body(target),
        }
    }
}

/// A field ready for dispatch: where it comes from and where it goes.
pub struct BoundField<'a> {
    pub ident: &'a str,
    pub tag: &'a str,
    pub descriptor: Descriptor,
    pub target: BoundTarget<'a>,
}

pub enum BoundTarget<'a> {
    Slot(Slot<'a>),
    Body(&'a mut dyn BodyTarget),
}

/// Enumerates the bindable fields of `record` in declaration order,
/// expanding plain nested records depth-first.
///
/// Excluded fields (`-`) are skipped. A malformed tag aborts the walk, and
/// an unknown body format declared in a tag fails with
/// [`Error::UnsupportedBodyFormat`].
/// Whether a body-origin tag sits on a body target is left to the caller.
pub fn walk<'a>(
    record: &'a mut dyn Record,
    policy: QueryPolicy,
) -> Result<Vec<BoundField<'a>>, Error> {
    let mut fields = Vec::new();
    walk_into(record, policy, &mut fields)?;
    Ok(fields)
}

fn walk_into<'a>(
    record: &'a mut dyn Record,
    policy: QueryPolicy,
    out: &mut Vec<BoundField<'a>>,
) -> Result<(), Error> {
    for FieldRef { ident, tag, target } in record.fields() {
        let parsed = Descriptor::parse(tag, ident, policy).map_err(|source| match source {
            TagError::UnsupportedFormat { format, .. } => Error::UnsupportedBodyFormat(format),
            source => Error::Tag {
                field: ident.to_string(),
                source,
            },
        })?;
        let Some(mut descriptor) = parsed else {
            continue;
        };

        let target = match target {
            FieldTarget::Body(body) => {
                descriptor.origin = Origin::Body;
                BoundTarget::Body(body)
            }
            FieldTarget::Value(value) => match value.slot() {
                // only plain query records are flattened
                Slot::Record(child) if descriptor.origin == Origin::Query && !descriptor.is_deep() => {
                    walk_into(child, policy, out)?;
                    continue;
                }
                slot => BoundTarget::Slot(slot),
            },
        };
        out.push(BoundField {
            ident,
            tag,
            descriptor,
            target,
        });
    }
    Ok(())
}
