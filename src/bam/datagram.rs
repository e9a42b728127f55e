//! Little-endian byte buffers for Bam records.

use glam::{Mat4, Quat, Vec3};

use crate::error::BamError;

/// A growable buffer of little-endian values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Datagram {
    data: Vec<u8>,
}

impl Datagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn add_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn add_bool(&mut self, value: bool) {
        self.add_u8(value as u8);
    }

    pub fn add_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn add_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn add_f32(&mut self, value: f32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Length-prefixed (u16) UTF-8 string.
    pub fn add_string(&mut self, value: &str) {
        debug_assert!(value.len() <= u16::MAX as usize, "string too long for datagram");
        self.add_u16(value.len() as u16);
        self.data.extend_from_slice(value.as_bytes());
    }

    pub fn add_vec3(&mut self, value: Vec3) {
        for component in value.to_array() {
            self.add_f32(component);
        }
    }

    pub fn add_quat(&mut self, value: Quat) {
        for component in value.to_array() {
            self.add_f32(component);
        }
    }

    /// Sixteen floats, column-major.
    pub fn add_mat4(&mut self, value: &Mat4) {
        for component in value.to_cols_array() {
            self.add_f32(component);
        }
    }

    /// Raw bytes without a length prefix.
    pub fn add_bytes(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    /// Length-prefixed (u32) nested datagram.
    pub fn add_datagram(&mut self, value: &Datagram) {
        self.add_u32(value.len() as u32);
        self.data.extend_from_slice(&value.data);
    }
}

/// Reads values back out of a byte slice.
#[derive(Debug, Clone)]
pub struct DatagramIterator<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> DatagramIterator<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], BamError> {
        if self.remaining() < needed {
            return Err(BamError::Truncated {
                offset: self.offset,
                needed,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + needed];
        self.offset += needed;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], BamError> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    pub fn get_u8(&mut self) -> Result<u8, BamError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn get_bool(&mut self) -> Result<bool, BamError> {
        Ok(self.get_u8()? != 0)
    }

    pub fn get_u16(&mut self) -> Result<u16, BamError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn get_u32(&mut self) -> Result<u32, BamError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn get_f32(&mut self) -> Result<f32, BamError> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    pub fn get_string(&mut self) -> Result<String, BamError> {
        let len = self.get_u16()? as usize;
        let bytes = self.take(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub fn get_vec3(&mut self) -> Result<Vec3, BamError> {
        Ok(Vec3::new(self.get_f32()?, self.get_f32()?, self.get_f32()?))
    }

    pub fn get_quat(&mut self) -> Result<Quat, BamError> {
        let mut xyzw = [0.0; 4];
        for component in &mut xyzw {
            *component = self.get_f32()?;
        }
        Ok(Quat::from_array(xyzw))
    }

    pub fn get_mat4(&mut self) -> Result<Mat4, BamError> {
        let mut cols = [0.0; 16];
        for component in &mut cols {
            *component = self.get_f32()?;
        }
        Ok(Mat4::from_cols_array(&cols))
    }

    /// A nested datagram written by [`Datagram::add_datagram`].
    pub fn get_datagram(&mut self) -> Result<&'a [u8], BamError> {
        let len = self.get_u32()? as usize;
        self.take(len)
    }

    /// Raw bytes without a length prefix.
    pub fn get_bytes(&mut self, len: usize) -> Result<&'a [u8], BamError> {
        self.take(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_values() {
        let mut dg = Datagram::new();
        dg.add_u8(7);
        dg.add_u16(0x1234);
        dg.add_string("hip");
        dg.add_vec3(Vec3::new(1.0, -2.0, 3.5));
        dg.add_mat4(&Mat4::from_translation(Vec3::X));
        assert_eq!(&dg.as_bytes()[1..3], &[0x34, 0x12]);

        let mut scan = DatagramIterator::new(dg.as_bytes());
        assert_eq!(scan.get_u8().unwrap(), 7);
        assert_eq!(scan.get_u16().unwrap(), 0x1234);
        assert_eq!(scan.get_string().unwrap(), "hip");
        assert_eq!(scan.get_vec3().unwrap(), Vec3::new(1.0, -2.0, 3.5));
        assert_eq!(scan.get_mat4().unwrap(), Mat4::from_translation(Vec3::X));
        assert_eq!(scan.remaining(), 0);
    }

    #[test]
    fn test_truncated() {
        let mut scan = DatagramIterator::new(&[1, 2]);
        match scan.get_u32() {
            Err(BamError::Truncated { needed, remaining, .. }) => {
                assert_eq!((needed, remaining), (4, 2));
            }
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8() {
        let mut scan = DatagramIterator::new(&[2, 0, 0xff, 0xfe]);
        assert!(matches!(scan.get_string(), Err(BamError::InvalidUtf8(_))));
    }
}
