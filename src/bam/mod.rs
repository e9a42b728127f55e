//! Minimal Bam object streams.
//!
//! A stream holds a header, then a flat list of objects of one record type.
//! Each object is its type name, its id and a length-prefixed body.
//! References between objects are ids; id 0 is null. Trees are written from
//! the root down and rebuilt from the leaves up.

mod datagram;
mod reader;
mod writer;

pub use datagram::{Datagram, DatagramIterator};
pub use reader::{read_stream, BamReader, Resolved};
pub use writer::{write_stream, BamWriter};

pub use crate::error::BamError;

/// Identifies an object within one stream. 0 is the null pointer.
pub type ObjectId = u32;

pub(crate) const BAM_MAGIC: &[u8] = b"pbj\0\n\r";
pub(crate) const BAM_MAJOR: u16 = 6;
pub(crate) const BAM_MINOR: u16 = 14;
pub(crate) const ROOT_ID: ObjectId = 1;

/// A type that can be stored in a Bam stream.
pub trait BamRecord: Sized {
    /// Name written ahead of every object of this type.
    const TYPE_NAME: &'static str;

    /// Write this object's fields. Children are written through
    /// `writer`, which appends them to the stream after this object.
    fn write_record<'a>(&'a self, writer: &mut BamWriter<'a, Self>, dg: &mut Datagram);

    /// Rebuild an object from its fields. Pointers are requested through
    /// `reader` and delivered later to [`BamRecord::complete_pointers`].
    fn fill_from(scan: &mut DatagramIterator<'_>, reader: &mut BamReader<Self>)
        -> Result<Self, BamError>;

    /// Receive the pointers requested in `fill_from`, in the same order,
    /// and return how many were consumed. Null entries must be skipped.
    fn complete_pointers(
        &mut self,
        p_list: Vec<Resolved<Self>>,
        _reader: &BamReader<Self>,
    ) -> usize {
        p_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A tiny tree record: a value and owned children.
    #[derive(Debug, PartialEq)]
    struct Node {
        value: u32,
        children: Vec<Node>,
        parent_link: Option<ObjectId>,
    }

    impl BamRecord for Node {
        const TYPE_NAME: &'static str = "Node";

        fn write_record<'a>(&'a self, writer: &mut BamWriter<'a, Self>, dg: &mut Datagram) {
            dg.add_u32(self.value);
            let root = writer.root_id();
            writer.write_link(dg, root);
            dg.add_u32(self.children.len() as u32);
            for child in &self.children {
                writer.write_pointer(dg, Some(child));
            }
        }

        fn fill_from(
            scan: &mut DatagramIterator<'_>,
            reader: &mut BamReader<Self>,
        ) -> Result<Self, BamError> {
            let value = scan.get_u32()?;
            reader.read_link(scan)?;
            let num_children = scan.get_u32()?;
            for _ in 0..num_children {
                reader.read_pointer(scan)?;
            }
            Ok(Self {
                value,
                children: Vec::new(),
                parent_link: None,
            })
        }

        fn complete_pointers(
            &mut self,
            p_list: Vec<Resolved<Self>>,
            _reader: &BamReader<Self>,
        ) -> usize {
            let consumed = p_list.len();
            for resolved in p_list {
                match resolved {
                    Resolved::Owned(child) => self.children.push(child),
                    Resolved::Link(id) => self.parent_link = Some(id),
                    Resolved::Null => {}
                }
            }
            consumed
        }
    }

    fn leaf(value: u32) -> Node {
        Node {
            value,
            children: Vec::new(),
            parent_link: None,
        }
    }

    #[test]
    fn test_tree_survives_stream() {
        let tree = Node {
            value: 1,
            children: vec![
                Node {
                    value: 2,
                    children: vec![leaf(4)],
                    parent_link: None,
                },
                leaf(3),
            ],
            parent_link: None,
        };
        let mut header = Datagram::new();
        header.add_string("skeleton");

        let bytes = write_stream(&tree, &header);
        let (read, header) = read_stream::<Node>(&bytes).unwrap();

        assert_eq!(read.value, 1);
        assert_eq!(read.parent_link, Some(ROOT_ID));
        let values: Vec<_> = read.children.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![2, 3]);
        assert_eq!(read.children[0].children[0].value, 4);
        assert_eq!(DatagramIterator::new(&header).get_string().unwrap(), "skeleton");
    }

    #[test]
    fn test_bad_magic() {
        assert!(matches!(read_stream::<Node>(b"nope"), Err(BamError::BadHeader)));
    }

    #[test]
    fn test_wrong_version() {
        let mut dg = Datagram::new();
        dg.add_bytes(BAM_MAGIC);
        dg.add_u16(BAM_MAJOR + 1);
        dg.add_u16(0);
        assert!(matches!(
            read_stream::<Node>(dg.as_bytes()),
            Err(BamError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_missing_child_becomes_null() {
        // Root claims one child with an id that is never written.
        let mut body = Datagram::new();
        body.add_u32(9);
        body.add_u32(0);
        body.add_u32(1);
        body.add_u32(77);

        let mut dg = Datagram::new();
        dg.add_bytes(BAM_MAGIC);
        dg.add_u16(BAM_MAJOR);
        dg.add_u16(BAM_MINOR);
        dg.add_datagram(&Datagram::new());
        dg.add_string("Node");
        dg.add_u32(ROOT_ID);
        dg.add_datagram(&body);

        let (read, _) = read_stream::<Node>(dg.as_bytes()).unwrap();
        assert_eq!(read.value, 9);
        assert!(read.children.is_empty());
    }

    #[test]
    fn test_empty_stream_has_no_root() {
        let mut dg = Datagram::new();
        dg.add_bytes(BAM_MAGIC);
        dg.add_u16(BAM_MAJOR);
        dg.add_u16(BAM_MINOR);
        dg.add_datagram(&Datagram::new());
        assert!(matches!(read_stream::<Node>(dg.as_bytes()), Err(BamError::MissingRoot)));
    }
}
