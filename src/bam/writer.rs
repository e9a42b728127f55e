//! Serializing a record tree into a Bam stream.

use std::collections::VecDeque;

use super::{BamRecord, Datagram, ObjectId, BAM_MAGIC, BAM_MAJOR, BAM_MINOR, ROOT_ID};

/// Hands out object ids while a tree of records is written.
///
/// Objects are written breadth-first, so every child gets a higher id than
/// its parent.
pub struct BamWriter<'a, T: BamRecord> {
    next_id: ObjectId,
    pending: VecDeque<(ObjectId, &'a T)>,
}

impl<'a, T: BamRecord> BamWriter<'a, T> {
    fn new() -> Self {
        Self {
            next_id: ROOT_ID,
            pending: VecDeque::new(),
        }
    }

    fn enqueue(&mut self, object: &'a T) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push_back((id, object));
        id
    }

    /// Write a reference to an owned child, or null.
    pub fn write_pointer(&mut self, dg: &mut Datagram, object: Option<&'a T>) {
        let id = object.map_or(0, |object| self.enqueue(object));
        dg.add_u32(id);
    }

    /// Write a non-owning reference to an object that is written anyway.
    pub fn write_link(&mut self, dg: &mut Datagram, id: ObjectId) {
        dg.add_u32(id);
    }

    /// Id of the first object in the stream.
    pub fn root_id(&self) -> ObjectId {
        ROOT_ID
    }
}

/// Write `root` and everything it points to.
///
/// `header` is stored ahead of the objects for the caller's own use.
pub fn write_stream<T: BamRecord>(root: &T, header: &Datagram) -> Vec<u8> {
    let mut out = Datagram::new();
    out.add_bytes(BAM_MAGIC);
    out.add_u16(BAM_MAJOR);
    out.add_u16(BAM_MINOR);
    out.add_datagram(header);

    let mut writer = BamWriter::new();
    writer.enqueue(root);
    while let Some((id, object)) = writer.pending.pop_front() {
        let mut dg = Datagram::new();
        object.write_record(&mut writer, &mut dg);
        out.add_string(T::TYPE_NAME);
        out.add_u32(id);
        out.add_datagram(&dg);
    }

    tracing::debug!(
        target: "bam",
        "Wrote {} objects of type {}",
        writer.next_id - ROOT_ID,
        T::TYPE_NAME
    );
    out.into_bytes()
}
