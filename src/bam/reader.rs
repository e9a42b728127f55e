//! Rebuilding a record tree from a Bam stream.

use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;

use tracing::warn;

use super::{BamRecord, DatagramIterator, ObjectId, BAM_MAGIC, BAM_MAJOR, BAM_MINOR, ROOT_ID};
use crate::error::BamError;

/// What a pointer request resolved to, handed back to
/// [`BamRecord::complete_pointers`] in request order.
#[derive(Debug)]
pub enum Resolved<T> {
    /// The pointer was null, or its target could not be found.
    Null,
    /// A completed child, now owned by the requester.
    Owned(T),
    /// A non-owning reference, left as an id.
    Link(ObjectId),
}

#[derive(Debug, Clone, Copy)]
enum Request {
    Owned(ObjectId),
    Link(ObjectId),
}

/// Reader state visible to records while they are filled in.
pub struct BamReader<T> {
    header: Vec<u8>,
    requests: Vec<Request>,
    _record: PhantomData<T>,
}

impl<T: BamRecord> BamReader<T> {
    /// Request an owned child. It arrives in `complete_pointers` as
    /// [`Resolved::Owned`] or [`Resolved::Null`].
    pub fn read_pointer(&mut self, scan: &mut DatagramIterator<'_>) -> Result<(), BamError> {
        let id = scan.get_u32()?;
        self.requests.push(Request::Owned(id));
        Ok(())
    }

    /// Request a non-owning link. It arrives as [`Resolved::Link`].
    pub fn read_link(&mut self, scan: &mut DatagramIterator<'_>) -> Result<(), BamError> {
        let id = scan.get_u32()?;
        self.requests.push(Request::Link(id));
        Ok(())
    }

    /// The caller-defined header stored ahead of the objects.
    pub fn header(&self) -> DatagramIterator<'_> {
        DatagramIterator::new(&self.header)
    }
}

fn read_header(scan: &mut DatagramIterator<'_>) -> Result<(), BamError> {
    let magic = scan.get_bytes(BAM_MAGIC.len()).map_err(|_| BamError::BadHeader)?;
    if magic != BAM_MAGIC {
        return Err(BamError::BadHeader);
    }
    let major = scan.get_u16()?;
    let minor = scan.get_u16()?;
    if major != BAM_MAJOR || minor > BAM_MINOR {
        return Err(BamError::UnsupportedVersion { major, minor });
    }
    Ok(())
}

/// Read a stream written by [`write_stream`](super::write_stream).
///
/// Returns the root object and the caller-defined header bytes.
pub fn read_stream<T: BamRecord>(bytes: &[u8]) -> Result<(T, Vec<u8>), BamError> {
    let mut scan = DatagramIterator::new(bytes);
    read_header(&mut scan)?;

    let mut reader = BamReader::<T> {
        header: scan.get_datagram()?.to_vec(),
        requests: Vec::new(),
        _record: PhantomData,
    };

    let mut filled: BTreeMap<ObjectId, (T, Vec<Request>)> = BTreeMap::new();
    while scan.remaining() > 0 {
        let type_name = scan.get_string()?;
        let id = scan.get_u32()?;
        let body = scan.get_datagram()?;
        if type_name != T::TYPE_NAME {
            return Err(BamError::UnexpectedType {
                expected: T::TYPE_NAME.to_string(),
                found: type_name,
            });
        }

        let object = T::fill_from(&mut DatagramIterator::new(body), &mut reader)?;
        filled.insert(id, (object, std::mem::take(&mut reader.requests)));
    }

    // Children carry higher ids than their parents, so completing in
    // descending id order finishes every child before its parent.
    let mut complete: HashMap<ObjectId, T> = HashMap::new();
    while let Some((id, (mut object, requests))) = filled.pop_last() {
        let requested = requests.len();
        let p_list = requests
            .into_iter()
            .map(|request| match request {
                Request::Owned(0) => Resolved::Null,
                Request::Owned(child) => match complete.remove(&child) {
                    Some(child) => Resolved::Owned(child),
                    None => {
                        warn!(target: "bam", "Object {id} refers to missing object {child}");
                        Resolved::Null
                    }
                },
                Request::Link(target) => Resolved::Link(target),
            })
            .collect();

        let consumed = object.complete_pointers(p_list, &reader);
        if consumed != requested {
            return Err(BamError::PointerCountMismatch {
                object: id,
                requested,
                consumed,
            });
        }
        complete.insert(id, object);
    }

    let root = complete.remove(&ROOT_ID).ok_or(BamError::MissingRoot)?;
    if !complete.is_empty() {
        let mut orphans: Vec<ObjectId> = complete.keys().copied().collect();
        orphans.sort_unstable();
        warn!(target: "bam", "{} objects never claimed by a parent: {:?}", orphans.len(), orphans);
    }
    Ok((root, reader.header))
}
