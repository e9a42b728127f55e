//! Animation channels: time-varying sources of one joint value.

use glam::{Mat4, Quat, Vec3};

use crate::bam::{BamError, Datagram, DatagramIterator};
use crate::node::{NodeHandle, NodeSource};

/// The kind of value a channel produces or a joint consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Scalar,
    Matrix,
}

/// A channel producing one float per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarChannel {
    /// One value per frame, repeating past the end. Empty tables read 0.
    Table(Vec<f32>),
    /// The same value on every frame.
    Fixed(f32),
    /// Read from an external node each time it is sampled.
    Dynamic(NodeHandle),
}

impl ScalarChannel {
    pub fn value(&self, frame: usize, nodes: &dyn NodeSource) -> f32 {
        match self {
            ScalarChannel::Table(table) => table_value(table, frame).unwrap_or(0.0),
            ScalarChannel::Fixed(value) => *value,
            ScalarChannel::Dynamic(node) => nodes.node_scalar(*node).unwrap_or(0.0),
        }
    }
}

/// Independent scale, rotation and translation tracks.
///
/// Each track repeats modulo its own length; an empty track holds the
/// identity component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixTable {
    pub scale: Vec<Vec3>,
    pub rotation: Vec<Quat>,
    pub translation: Vec<Vec3>,
}

impl MatrixTable {
    /// A table with only a translation track.
    pub fn from_translations(translation: Vec<Vec3>) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    /// Frame count of the longest track.
    pub fn num_frames(&self) -> usize {
        self.scale
            .len()
            .max(self.rotation.len())
            .max(self.translation.len())
    }

    pub fn components(&self, frame: usize) -> (Vec3, Quat, Vec3) {
        (
            table_value(&self.scale, frame).unwrap_or(Vec3::ONE),
            table_value(&self.rotation, frame).unwrap_or(Quat::IDENTITY),
            table_value(&self.translation, frame).unwrap_or(Vec3::ZERO),
        )
    }
}

fn table_value<T: Copy>(table: &[T], frame: usize) -> Option<T> {
    if table.is_empty() {
        None
    } else {
        Some(table[frame % table.len()])
    }
}

/// A channel producing one transform per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixChannel {
    Table(MatrixTable),
    Fixed(Mat4),
    /// Read from an external node's world transform each time it is sampled.
    Dynamic(NodeHandle),
}

impl MatrixChannel {
    pub fn value(&self, frame: usize, nodes: &dyn NodeSource) -> Mat4 {
        match self {
            MatrixChannel::Table(table) => {
                let (scale, rotation, translation) = table.components(frame);
                Mat4::from_scale_rotation_translation(scale, rotation, translation)
            }
            MatrixChannel::Fixed(mat) => *mat,
            MatrixChannel::Dynamic(node) => nodes.node_transform(*node).unwrap_or(Mat4::IDENTITY),
        }
    }
}

/// Any channel an [`AnimGroup`](super::AnimGroup) can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimChannel {
    Scalar(ScalarChannel),
    Matrix(MatrixChannel),
}

const TAG_NONE: u8 = 0;
const TAG_SCALAR_TABLE: u8 = 1;
const TAG_SCALAR_FIXED: u8 = 2;
const TAG_MATRIX_TABLE: u8 = 3;
const TAG_MATRIX_FIXED: u8 = 4;

impl AnimChannel {
    pub fn value_type(&self) -> ValueType {
        match self {
            AnimChannel::Scalar(_) => ValueType::Scalar,
            AnimChannel::Matrix(_) => ValueType::Matrix,
        }
    }

    /// Frames of data held, or `None` for channels that are not tables.
    pub fn num_frames(&self) -> Option<usize> {
        match self {
            AnimChannel::Scalar(ScalarChannel::Table(table)) => Some(table.len()),
            AnimChannel::Matrix(MatrixChannel::Table(table)) => Some(table.num_frames()),
            _ => None,
        }
    }

    /// Write an optional channel. Dynamic channels refer to runtime nodes
    /// and are written as absent.
    pub(crate) fn write_optional(channel: Option<&AnimChannel>, dg: &mut Datagram) {
        match channel {
            None => dg.add_u8(TAG_NONE),
            Some(AnimChannel::Scalar(ScalarChannel::Table(table))) => {
                dg.add_u8(TAG_SCALAR_TABLE);
                dg.add_u32(table.len() as u32);
                for &value in table {
                    dg.add_f32(value);
                }
            }
            Some(AnimChannel::Scalar(ScalarChannel::Fixed(value))) => {
                dg.add_u8(TAG_SCALAR_FIXED);
                dg.add_f32(*value);
            }
            Some(AnimChannel::Matrix(MatrixChannel::Table(table))) => {
                dg.add_u8(TAG_MATRIX_TABLE);
                dg.add_u32(table.scale.len() as u32);
                for &scale in &table.scale {
                    dg.add_vec3(scale);
                }
                dg.add_u32(table.rotation.len() as u32);
                for &rotation in &table.rotation {
                    dg.add_quat(rotation);
                }
                dg.add_u32(table.translation.len() as u32);
                for &translation in &table.translation {
                    dg.add_vec3(translation);
                }
            }
            Some(AnimChannel::Matrix(MatrixChannel::Fixed(mat))) => {
                dg.add_u8(TAG_MATRIX_FIXED);
                dg.add_mat4(mat);
            }
            Some(AnimChannel::Scalar(ScalarChannel::Dynamic(node)))
            | Some(AnimChannel::Matrix(MatrixChannel::Dynamic(node))) => {
                tracing::warn!(target: "chan", "Not writing channel driven by node {:?}", node);
                dg.add_u8(TAG_NONE);
            }
        }
    }

    pub(crate) fn read_optional(
        scan: &mut DatagramIterator<'_>,
    ) -> Result<Option<AnimChannel>, BamError> {
        let channel = match scan.get_u8()? {
            TAG_NONE => return Ok(None),
            TAG_SCALAR_TABLE => {
                let len = scan.get_u32()?;
                let table = (0..len).map(|_| scan.get_f32()).collect::<Result<_, _>>()?;
                AnimChannel::Scalar(ScalarChannel::Table(table))
            }
            TAG_SCALAR_FIXED => AnimChannel::Scalar(ScalarChannel::Fixed(scan.get_f32()?)),
            TAG_MATRIX_TABLE => {
                let len = scan.get_u32()?;
                let scale = (0..len).map(|_| scan.get_vec3()).collect::<Result<_, _>>()?;
                let len = scan.get_u32()?;
                let rotation = (0..len).map(|_| scan.get_quat()).collect::<Result<_, _>>()?;
                let len = scan.get_u32()?;
                let translation = (0..len).map(|_| scan.get_vec3()).collect::<Result<_, _>>()?;
                AnimChannel::Matrix(MatrixChannel::Table(MatrixTable {
                    scale,
                    rotation,
                    translation,
                }))
            }
            TAG_MATRIX_FIXED => AnimChannel::Matrix(MatrixChannel::Fixed(scan.get_mat4()?)),
            tag => {
                return Err(BamError::UnexpectedType {
                    expected: "AnimChannel".to_string(),
                    found: format!("channel tag {tag}"),
                })
            }
        };
        Ok(Some(channel))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_scalar_table_repeats() {
        let channel = ScalarChannel::Table(vec![1.0, 2.0, 3.0]);
        assert_eq!(channel.value(0, &()), 1.0);
        assert_eq!(channel.value(2, &()), 3.0);
        assert_eq!(channel.value(4, &()), 2.0);
        assert_eq!(ScalarChannel::Table(Vec::new()).value(5, &()), 0.0);
    }

    #[test]
    fn test_matrix_tracks_have_own_lengths() {
        let table = MatrixTable {
            scale: vec![Vec3::splat(2.0)],
            rotation: Vec::new(),
            translation: vec![Vec3::X, Vec3::Y, Vec3::Z],
        };
        assert_eq!(table.num_frames(), 3);

        let channel = MatrixChannel::Table(table);
        let mat = channel.value(1, &());
        let eps = 1e-6;
        assert!((mat.transform_point3(Vec3::ZERO) - Vec3::Y).length() < eps);
        assert!((mat.transform_vector3(Vec3::X) - Vec3::new(2.0, 0.0, 0.0)).length() < eps);
    }

    #[test]
    fn test_dynamic_reads_node() {
        let node = NodeHandle(9);
        let mut nodes = HashMap::new();
        nodes.insert(node, Mat4::from_translation(Vec3::new(4.0, 0.0, 0.0)));

        assert_eq!(MatrixChannel::Dynamic(node).value(0, &nodes), nodes[&node]);
        assert_eq!(ScalarChannel::Dynamic(node).value(7, &nodes), 4.0);
        assert_eq!(MatrixChannel::Dynamic(NodeHandle(1)).value(0, &nodes), Mat4::IDENTITY);
    }

    #[test]
    fn test_channel_datagram() {
        let channel = AnimChannel::Matrix(MatrixChannel::Table(MatrixTable {
            scale: vec![Vec3::ONE],
            rotation: vec![Quat::from_rotation_z(0.5)],
            translation: vec![Vec3::X, Vec3::Y],
        }));
        let mut dg = Datagram::new();
        AnimChannel::write_optional(Some(&channel), &mut dg);
        AnimChannel::write_optional(
            Some(&AnimChannel::Scalar(ScalarChannel::Dynamic(NodeHandle(2)))),
            &mut dg,
        );

        let mut scan = DatagramIterator::new(dg.as_bytes());
        assert_eq!(AnimChannel::read_optional(&mut scan).unwrap(), Some(channel));
        assert_eq!(AnimChannel::read_optional(&mut scan).unwrap(), None);
        assert_eq!(scan.remaining(), 0);
    }
}
